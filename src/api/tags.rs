use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, json::Json};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::{Permission, User};
use crate::db::{create_tag, delete_tag, get_all_tags, get_tag, update_tag};
use crate::error::AppError;
use crate::models::Tag;
use crate::validation::{
    AppErrorExt, JsonValidateExt, PermissionCheckExt, ValidationResponse,
};

use super::MessageResponse;

#[derive(Deserialize, Validate, Clone)]
pub struct TagRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    name: String,
}

#[get("/tags")]
pub async fn api_list_tags(db: &State<Pool<Sqlite>>) -> Result<Json<Vec<Tag>>, AppError> {
    let tags = get_all_tags(db).await?;

    Ok(Json(tags))
}

#[get("/tags/<id>")]
pub async fn api_get_tag(id: i64, db: &State<Pool<Sqlite>>) -> Result<Json<Tag>, AppError> {
    let tag = get_tag(db, id).await?;

    Ok(Json(tag))
}

#[post("/tags", data = "<tag>")]
pub async fn api_create_tag(
    tag: Json<TagRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<Tag>>, Custom<Json<ValidationResponse>>> {
    user.require_permission(Permission::ManageTags)
        .validate_custom()?;

    let validated = tag.validate_custom()?;

    let created = create_tag(db, &validated.name).await.validate_custom()?;

    Ok(Custom(Status::Created, Json(created)))
}

#[put("/tags/<id>", data = "<tag>")]
pub async fn api_update_tag(
    id: i64,
    tag: Json<TagRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Tag>, Custom<Json<ValidationResponse>>> {
    user.require_permission(Permission::ManageTags)
        .validate_custom()?;

    let validated = tag.validate_custom()?;

    let updated = update_tag(db, id, &validated.name).await.validate_custom()?;

    Ok(Json(updated))
}

#[delete("/tags/<id>")]
pub async fn api_delete_tag(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, Status> {
    user.require_permission(Permission::ManageTags)?;

    delete_tag(db, id).await?;

    Ok(Json(MessageResponse::new("Deleted")))
}
