use chrono::Utc;
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{DbNotification, Notification};

#[instrument(skip(pool))]
pub async fn get_all_notifications(pool: &Pool<Sqlite>) -> Result<Vec<Notification>, AppError> {
    info!("Getting all notifications");
    let rows = sqlx::query_as::<_, DbNotification>(
        "SELECT * FROM notifications ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Notification::from).collect())
}

#[instrument(skip(pool))]
pub async fn get_notification(pool: &Pool<Sqlite>, id: i64) -> Result<Notification, AppError> {
    let row = sqlx::query_as::<_, DbNotification>("SELECT * FROM notifications WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(notification) => Ok(Notification::from(notification)),
        _ => Err(AppError::NotFound(format!(
            "Notification with id {} not found",
            id
        ))),
    }
}

#[instrument(skip(pool))]
pub async fn create_notification(
    pool: &Pool<Sqlite>,
    title: Option<&str>,
    body: Option<&str>,
) -> Result<Notification, AppError> {
    info!("Creating notification");
    let now = Utc::now().naive_utc();

    let res = sqlx::query(
        "INSERT INTO notifications (title, body, created_at, updated_at) VALUES (?, ?, ?, ?)",
    )
    .bind(title)
    .bind(body)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    get_notification(pool, res.last_insert_rowid()).await
}

/// Partial update: absent fields are left untouched.
#[instrument(skip(pool))]
pub async fn update_notification(
    pool: &Pool<Sqlite>,
    id: i64,
    title: Option<&str>,
    body: Option<&str>,
) -> Result<Notification, AppError> {
    info!("Updating notification");

    let current = get_notification(pool, id).await?;
    let now = Utc::now().naive_utc();

    sqlx::query("UPDATE notifications SET title = ?, body = ?, updated_at = ? WHERE id = ?")
        .bind(title.map(str::to_string).or(current.title))
        .bind(body.map(str::to_string).or(current.body))
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

    get_notification(pool, id).await
}

#[instrument(skip(pool))]
pub async fn delete_notification(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting notification");
    let res = sqlx::query("DELETE FROM notifications WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Notification with id {} not found",
            id
        )));
    }

    Ok(())
}
