use chrono::Utc;
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{DbRecipe, Page, RecipeSummary};

use super::recipes::summarize;
use super::{PER_PAGE, page_offset};

/// Idempotent: favoriting an already-favorited recipe is a no-op, and two
/// concurrent adds for the same pair both succeed leaving a single row.
#[instrument(skip(pool))]
pub async fn add_favorite(
    pool: &Pool<Sqlite>,
    user_id: i64,
    recipe_id: i64,
) -> Result<(), AppError> {
    info!("Adding favorite");
    let now = Utc::now().naive_utc();

    sqlx::query(
        "INSERT INTO favorites (user_id, recipe_id, created_at) VALUES (?, ?, ?)
         ON CONFLICT (user_id, recipe_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(recipe_id)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Idempotent: removing a favorite that does not exist still reports success.
#[instrument(skip(pool))]
pub async fn remove_favorite(
    pool: &Pool<Sqlite>,
    user_id: i64,
    recipe_id: i64,
) -> Result<(), AppError> {
    info!("Removing favorite");

    sqlx::query("DELETE FROM favorites WHERE user_id = ? AND recipe_id = ?")
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// The user's favorited recipes, most recently favorited first.
#[instrument(skip(pool))]
pub async fn list_favorites(
    pool: &Pool<Sqlite>,
    user_id: i64,
    page: i64,
) -> Result<Page<RecipeSummary>, AppError> {
    info!("Listing favorites");
    let (page, offset) = page_offset(page);

    let total =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM favorites WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    let rows = sqlx::query_as::<_, DbRecipe>(
        "SELECT r.* FROM recipes r
         JOIN favorites f ON f.recipe_id = r.id
         WHERE f.user_id = ?
         ORDER BY f.created_at DESC, f.id DESC
         LIMIT ? OFFSET ?",
    )
    .bind(user_id)
    .bind(PER_PAGE)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(Page {
        data: summarize(pool, rows).await?,
        page,
        per_page: PER_PAGE,
        total,
    })
}
