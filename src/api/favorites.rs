use rocket::State;
use rocket::http::Status;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};

use crate::auth::{Permission, User};
use crate::db::{add_favorite, get_recipe_row, list_favorites, remove_favorite};
use crate::error::AppError;
use crate::models::{Page, RecipeSummary};

use super::{MessageResponse, recipe_visible_to};

#[get("/me/favorites?<page>")]
pub async fn api_list_favorites(
    user: User,
    page: Option<i64>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Page<RecipeSummary>>, AppError> {
    let favorites = list_favorites(db, user.id, page.unwrap_or(1)).await?;

    Ok(Json(favorites))
}

#[post("/recipes/<id>/favorite")]
pub async fn api_add_favorite(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, Status> {
    user.require_permission(Permission::FavoriteRecipes)?;

    // Confirm the recipe exists (and is visible) so the favorite never
    // dangles or leaks an unpublished recipe.
    let recipe = get_recipe_row(db, id).await?;
    if !recipe_visible_to(&recipe, &user) {
        return Err(AppError::NotFound(format!("Recipe with id {} not found", id)).into());
    }

    add_favorite(db, user.id, id).await?;

    Ok(Json(MessageResponse::new("Favorited")))
}

#[delete("/recipes/<id>/favorite")]
pub async fn api_remove_favorite(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, Status> {
    remove_favorite(db, user.id, id).await?;

    Ok(Json(MessageResponse::new("Unfavorited")))
}
