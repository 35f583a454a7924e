use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, json::Json};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::{Permission, User};
use crate::db::{
    create_notification, delete_notification, get_all_notifications, get_notification,
    update_notification,
};
use crate::error::AppError;
use crate::models::Notification;
use crate::validation::{
    AppErrorExt, JsonValidateExt, PermissionCheckExt, ValidationResponse,
};

use super::MessageResponse;

#[derive(Deserialize, Validate, Clone)]
pub struct NotificationRequest {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    title: Option<String>,
    body: Option<String>,
}

#[get("/notifications")]
pub async fn api_list_notifications(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = get_all_notifications(db).await?;

    Ok(Json(notifications))
}

#[get("/notifications/<id>")]
pub async fn api_get_notification(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Notification>, AppError> {
    let notification = get_notification(db, id).await?;

    Ok(Json(notification))
}

#[post("/notifications", data = "<notification>")]
pub async fn api_create_notification(
    notification: Json<NotificationRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<Notification>>, Custom<Json<ValidationResponse>>> {
    user.require_permission(Permission::ManageNotifications)
        .validate_custom()?;

    let validated = notification.validate_custom()?;

    let created = create_notification(db, validated.title.as_deref(), validated.body.as_deref())
        .await
        .validate_custom()?;

    Ok(Custom(Status::Created, Json(created)))
}

#[put("/notifications/<id>", data = "<notification>")]
pub async fn api_update_notification(
    id: i64,
    notification: Json<NotificationRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Notification>, Custom<Json<ValidationResponse>>> {
    user.require_permission(Permission::ManageNotifications)
        .validate_custom()?;

    let validated = notification.validate_custom()?;

    let updated = update_notification(db, id, validated.title.as_deref(), validated.body.as_deref())
        .await
        .validate_custom()?;

    Ok(Json(updated))
}

#[delete("/notifications/<id>")]
pub async fn api_delete_notification(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, Status> {
    user.require_permission(Permission::ManageNotifications)?;

    delete_notification(db, id).await?;

    Ok(Json(MessageResponse::new("Deleted")))
}
