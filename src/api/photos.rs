use rocket::State;
use rocket::data::{Data, ToByteUnit};
use rocket::http::{ContentType, Status};
use rocket::response::status::Custom;
use rocket::serde::{Serialize, json::Json};
use tracing::warn;

use crate::auth::{Permission, User};
use crate::storage::PhotoStore;
use crate::validation::{AppErrorExt, PermissionCheckExt, ValidationResponse};

const MAX_PHOTO_BYTES: u64 = 4 * 1024 * 1024;

#[derive(Serialize)]
pub struct PhotoResponse {
    pub photo_path: String,
}

fn photo_extension(content_type: &ContentType) -> Option<&'static str> {
    if content_type == &ContentType::JPEG {
        Some("jpg")
    } else if content_type == &ContentType::PNG {
        Some("png")
    } else if content_type == &ContentType::WEBP {
        Some("webp")
    } else {
        None
    }
}

/// Raw image upload. The returned path goes into a recipe's `photo_path`.
#[post("/photos", data = "<data>")]
pub async fn api_upload_photo(
    content_type: &ContentType,
    data: Data<'_>,
    user: User,
    store: &State<PhotoStore>,
) -> Result<Custom<Json<PhotoResponse>>, Custom<Json<ValidationResponse>>> {
    user.require_permission(Permission::CreateRecipes)
        .validate_custom()?;

    let Some(extension) = photo_extension(content_type) else {
        return Err(Custom(
            Status::UnprocessableEntity,
            Json(ValidationResponse::with_error(
                "photo",
                "Photos must be JPEG, PNG or WebP",
            )),
        ));
    };

    let bytes = data
        .open(MAX_PHOTO_BYTES.bytes())
        .into_bytes()
        .await
        .map_err(|e| {
            warn!("Photo body read failed: {}", e);
            Custom(
                Status::UnprocessableEntity,
                Json(ValidationResponse::with_error(
                    "photo",
                    "Could not read photo data",
                )),
            )
        })?;

    if !bytes.is_complete() {
        return Err(Custom(
            Status::PayloadTooLarge,
            Json(ValidationResponse::with_error(
                "photo",
                "Photo exceeds the 4 MiB limit",
            )),
        ));
    }

    let photo_path = store.store(extension, &bytes).await.validate_custom()?;

    Ok(Custom(Status::Created, Json(PhotoResponse { photo_path })))
}
