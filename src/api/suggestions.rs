use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, json::Json};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::{Permission, User};
use crate::db::{create_suggestion, get_all_suggestions};
use crate::models::Suggestion;
use crate::validation::{
    AppErrorExt, JsonValidateExt, PermissionCheckExt, ValidationResponse,
};

#[derive(Deserialize, Validate, Clone)]
pub struct SuggestionRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    name: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    message: String,
}

// Suggestions come from the public feedback form; no account required.
#[post("/suggestions", data = "<suggestion>")]
pub async fn api_create_suggestion(
    suggestion: Json<SuggestionRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<Suggestion>>, Custom<Json<ValidationResponse>>> {
    let validated = suggestion.validate_custom()?;

    let created = create_suggestion(db, validated.name.as_deref(), &validated.message)
        .await
        .validate_custom()?;

    Ok(Custom(Status::Created, Json(created)))
}

#[get("/suggestions")]
pub async fn api_list_suggestions(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Suggestion>>, Status> {
    user.require_permission(Permission::ViewSuggestions)?;

    let suggestions = get_all_suggestions(db).await?;

    Ok(Json(suggestions))
}
