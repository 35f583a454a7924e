use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{Category, DbCategory};

#[instrument(skip(pool))]
pub async fn get_all_categories(pool: &Pool<Sqlite>) -> Result<Vec<Category>, AppError> {
    info!("Getting all categories");
    let rows =
        sqlx::query_as::<_, DbCategory>("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(Category::from).collect())
}

#[instrument(skip(pool))]
pub async fn get_category(pool: &Pool<Sqlite>, id: i64) -> Result<Category, AppError> {
    let row = sqlx::query_as::<_, DbCategory>("SELECT id, name FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(category) => Ok(Category::from(category)),
        _ => Err(AppError::NotFound(format!(
            "Category with id {} not found",
            id
        ))),
    }
}

#[instrument(skip(pool))]
pub async fn create_category(pool: &Pool<Sqlite>, name: &str) -> Result<Category, AppError> {
    info!("Creating category");
    let res = sqlx::query("INSERT INTO categories (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?;

    get_category(pool, res.last_insert_rowid()).await
}

#[instrument(skip(pool))]
pub async fn update_category(
    pool: &Pool<Sqlite>,
    id: i64,
    name: &str,
) -> Result<Category, AppError> {
    info!("Updating category");
    let res = sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Category with id {} not found",
            id
        )));
    }

    get_category(pool, id).await
}

/// Dependent recipes keep existing with a null category (FK is SET NULL).
#[instrument(skip(pool))]
pub async fn delete_category(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting category");
    let res = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Category with id {} not found",
            id
        )));
    }

    Ok(())
}
