use chrono::Utc;
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{DbHistoryEntry, HistoryEntry};

/// Records a view for (user, recipe): creates the row with view_count = 1 or
/// atomically increments the existing one. The increment is applied against
/// the stored value in a single statement, so concurrent views never lose an
/// increment.
#[instrument(skip(pool))]
pub async fn record_view(
    pool: &Pool<Sqlite>,
    user_id: i64,
    recipe_id: i64,
) -> Result<(), AppError> {
    info!("Recording recipe view");
    let now = Utc::now().naive_utc();

    sqlx::query(
        "INSERT INTO recipe_histories (user_id, recipe_id, view_count, last_viewed_at)
         VALUES (?, ?, 1, ?)
         ON CONFLICT (user_id, recipe_id)
         DO UPDATE SET view_count = view_count + 1, last_viewed_at = excluded.last_viewed_at",
    )
    .bind(user_id)
    .bind(recipe_id)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// The user's viewing history, most recently viewed first.
#[instrument(skip(pool))]
pub async fn list_history(
    pool: &Pool<Sqlite>,
    user_id: i64,
) -> Result<Vec<HistoryEntry>, AppError> {
    info!("Listing recipe history");
    let rows = sqlx::query_as::<_, DbHistoryEntry>(
        "SELECT h.recipe_id, h.view_count, h.last_viewed_at, r.title, r.photo_path
         FROM recipe_histories h
         JOIN recipes r ON r.id = h.recipe_id
         WHERE h.user_id = ?
         ORDER BY h.last_viewed_at DESC, h.id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(HistoryEntry::from).collect())
}

#[instrument(skip(pool))]
pub async fn delete_history(
    pool: &Pool<Sqlite>,
    user_id: i64,
    recipe_id: i64,
) -> Result<(), AppError> {
    info!("Deleting recipe history entry");

    sqlx::query("DELETE FROM recipe_histories WHERE user_id = ? AND recipe_id = ?")
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

    Ok(())
}
