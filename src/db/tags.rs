use sqlx::{Pool, Sqlite, Transaction};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{DbTag, Tag};

/// Canonical form of a tag name: trimmed and lower-cased. Returns `None` for
/// names that are empty after trimming.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let name = raw.trim().to_lowercase();
    if name.is_empty() { None } else { Some(name) }
}

/// Normalizes a list of raw tag names, dropping empties and case-insensitive
/// duplicates while preserving first-seen order.
pub fn normalize_tags(raw: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for name in raw.iter().filter_map(|t| normalize_tag(t)) {
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

#[instrument(skip(pool))]
pub async fn get_all_tags(pool: &Pool<Sqlite>) -> Result<Vec<Tag>, AppError> {
    info!("Getting all tags");
    let rows = sqlx::query_as::<_, DbTag>("SELECT id, name FROM tags ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Tag::from).collect())
}

#[instrument(skip(pool))]
pub async fn get_tag(pool: &Pool<Sqlite>, id: i64) -> Result<Tag, AppError> {
    let row = sqlx::query_as::<_, DbTag>("SELECT id, name FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(tag) => Ok(Tag::from(tag)),
        _ => Err(AppError::NotFound(format!("Tag with id {} not found", id))),
    }
}

#[instrument(skip(pool))]
pub async fn create_tag(pool: &Pool<Sqlite>, name: &str) -> Result<Tag, AppError> {
    info!("Creating tag");
    let name = normalize_tag(name)
        .ok_or_else(|| AppError::Validation("Tag name must not be empty".to_string()))?;

    let res = sqlx::query("INSERT INTO tags (name) VALUES (?)")
        .bind(&name)
        .execute(pool)
        .await?;

    get_tag(pool, res.last_insert_rowid()).await
}

#[instrument(skip(pool))]
pub async fn update_tag(pool: &Pool<Sqlite>, id: i64, name: &str) -> Result<Tag, AppError> {
    info!("Updating tag");
    let name = normalize_tag(name)
        .ok_or_else(|| AppError::Validation("Tag name must not be empty".to_string()))?;

    let res = sqlx::query("UPDATE tags SET name = ? WHERE id = ?")
        .bind(&name)
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Tag with id {} not found", id)));
    }

    get_tag(pool, id).await
}

#[instrument(skip(pool))]
pub async fn delete_tag(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting tag");
    let res = sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Tag with id {} not found", id)));
    }

    Ok(())
}

/// Find-or-create each normalized name on the caller's transaction, returning
/// the canonical tag ids. Tag rows are only ever created here, never deleted.
pub(crate) async fn resolve_tags(
    tx: &mut Transaction<'_, Sqlite>,
    names: &[String],
) -> Result<Vec<i64>, AppError> {
    let mut tag_ids = Vec::with_capacity(names.len());

    for name in normalize_tags(names) {
        sqlx::query("INSERT INTO tags (name) VALUES (?) ON CONFLICT (name) DO NOTHING")
            .bind(&name)
            .execute(&mut **tx)
            .await?;

        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM tags WHERE name = ?")
            .bind(&name)
            .fetch_one(&mut **tx)
            .await?;

        tag_ids.push(id);
    }

    Ok(tag_ids)
}

/// Replaces the recipe's tag link set with exactly the resolved set of the
/// supplied names (set semantics, not a merge).
pub(crate) async fn sync_recipe_tags(
    tx: &mut Transaction<'_, Sqlite>,
    recipe_id: i64,
    names: &[String],
) -> Result<(), AppError> {
    let tag_ids = resolve_tags(tx, names).await?;

    sqlx::query("DELETE FROM recipe_tag WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(&mut **tx)
        .await?;

    for tag_id in tag_ids {
        sqlx::query("INSERT INTO recipe_tag (recipe_id, tag_id) VALUES (?, ?)")
            .bind(recipe_id)
            .bind(tag_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}
