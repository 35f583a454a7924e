use rocket::State;
use rocket::http::Status;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};

use crate::auth::User;
use crate::db::{delete_history, get_recipe_row, list_history, record_view};
use crate::error::AppError;
use crate::models::HistoryEntry;

use super::{MessageResponse, recipe_visible_to};

#[get("/me/history")]
pub async fn api_list_history(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let history = list_history(db, user.id).await?;

    Ok(Json(history))
}

// Views are attributed to the authenticated caller, never to an id in the
// request body.
#[post("/recipes/<id>/history")]
pub async fn api_record_view(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, Status> {
    let recipe = get_recipe_row(db, id).await?;
    if !recipe_visible_to(&recipe, &user) {
        return Err(AppError::NotFound(format!("Recipe with id {} not found", id)).into());
    }

    record_view(db, user.id, id).await?;

    Ok(Json(MessageResponse::new("Recorded")))
}

#[delete("/me/history/<recipe_id>")]
pub async fn api_delete_history(
    recipe_id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, Status> {
    delete_history(db, user.id, recipe_id).await?;

    Ok(Json(MessageResponse::new("Removed")))
}
