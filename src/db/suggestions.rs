use chrono::Utc;
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{DbSuggestion, Suggestion};

#[instrument(skip(pool))]
pub async fn get_all_suggestions(pool: &Pool<Sqlite>) -> Result<Vec<Suggestion>, AppError> {
    info!("Getting all suggestions");
    let rows = sqlx::query_as::<_, DbSuggestion>(
        "SELECT * FROM suggestions ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Suggestion::from).collect())
}

#[instrument(skip(pool))]
pub async fn create_suggestion(
    pool: &Pool<Sqlite>,
    name: Option<&str>,
    message: &str,
) -> Result<Suggestion, AppError> {
    info!("Creating suggestion");
    let now = Utc::now().naive_utc();

    let res = sqlx::query("INSERT INTO suggestions (name, message, created_at) VALUES (?, ?, ?)")
        .bind(name)
        .bind(message)
        .bind(now)
        .execute(pool)
        .await?;

    let row = sqlx::query_as::<_, DbSuggestion>("SELECT * FROM suggestions WHERE id = ?")
        .bind(res.last_insert_rowid())
        .fetch_one(pool)
        .await?;

    Ok(Suggestion::from(row))
}

#[instrument(skip(pool))]
pub async fn count_suggestions(pool: &Pool<Sqlite>) -> Result<i64, AppError> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM suggestions")
        .fetch_one(pool)
        .await?;

    Ok(total)
}
