use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, json::Json};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::{Permission, User};
use crate::db::{
    create_category, delete_category, get_all_categories, get_category, update_category,
};
use crate::error::AppError;
use crate::models::Category;
use crate::validation::{
    AppErrorExt, JsonValidateExt, PermissionCheckExt, ValidationResponse,
};

use super::MessageResponse;

#[derive(Deserialize, Validate, Clone)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    name: String,
}

#[get("/categories")]
pub async fn api_list_categories(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = get_all_categories(db).await?;

    Ok(Json(categories))
}

#[get("/categories/<id>")]
pub async fn api_get_category(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Category>, AppError> {
    let category = get_category(db, id).await?;

    Ok(Json(category))
}

#[post("/categories", data = "<category>")]
pub async fn api_create_category(
    category: Json<CategoryRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<Category>>, Custom<Json<ValidationResponse>>> {
    user.require_permission(Permission::ManageCategories)
        .validate_custom()?;

    let validated = category.validate_custom()?;

    let created = create_category(db, &validated.name).await.validate_custom()?;

    Ok(Custom(Status::Created, Json(created)))
}

#[put("/categories/<id>", data = "<category>")]
pub async fn api_update_category(
    id: i64,
    category: Json<CategoryRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Category>, Custom<Json<ValidationResponse>>> {
    user.require_permission(Permission::ManageCategories)
        .validate_custom()?;

    let validated = category.validate_custom()?;

    let updated = update_category(db, id, &validated.name)
        .await
        .validate_custom()?;

    Ok(Json(updated))
}

#[delete("/categories/<id>")]
pub async fn api_delete_category(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, Status> {
    user.require_permission(Permission::ManageCategories)?;

    delete_category(db, id).await?;

    Ok(Json(MessageResponse::new("Deleted")))
}
