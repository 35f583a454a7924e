use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, Serialize, json::Json};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::{AuthToken, Permission, User};
use crate::db::{
    authenticate_user, create_api_token, create_user, get_all_users, revoke_api_token,
};
use crate::validation::{
    AppErrorExt, JsonValidateExt, PermissionCheckExt, ValidationResponse,
};

use super::{MessageResponse, UserData};

#[derive(Deserialize, Validate, Clone)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    name: String,
    #[validate(email(message = "Invalid email address"))]
    email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    password: String,
    #[validate(length(max = 20, message = "Phone number must be at most 20 characters"))]
    phone: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    email: String,
    password: String,
}

#[derive(Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserData,
    pub token: String,
}

// Self-registration always lands on the "user" role; admins are provisioned
// out of band.
#[post("/register", data = "<registration>")]
pub async fn api_register(
    registration: Json<RegisterRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<AuthResponse>>, Custom<Json<ValidationResponse>>> {
    let validated = registration.validate_custom()?;

    let user = create_user(
        db,
        &validated.name,
        &validated.email,
        &validated.password,
        validated.phone.as_deref(),
        "user",
    )
    .await
    .validate_custom()?;

    let token = create_api_token(db, user.id).await.validate_custom()?;

    Ok(Custom(
        Status::Created,
        Json(AuthResponse {
            user: UserData::from(user),
            token,
        }),
    ))
}

#[post("/login", data = "<login>")]
pub async fn api_login(
    login: Json<LoginRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<AuthResponse>, Custom<Json<ValidationResponse>>> {
    let validated = login.validate_custom()?;

    match authenticate_user(db, &validated.email, &validated.password)
        .await
        .validate_custom()?
    {
        Some(user) => {
            let token = create_api_token(db, user.id).await.validate_custom()?;

            Ok(Json(AuthResponse {
                user: UserData::from(user),
                token,
            }))
        }
        None => Err(Custom(
            Status::Unauthorized,
            Json(ValidationResponse::with_error(
                "credentials",
                "Invalid email or password",
            )),
        )),
    }
}

#[post("/logout")]
pub async fn api_logout(
    _user: User,
    token: AuthToken,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, Status> {
    revoke_api_token(db, &token.0).await?;

    Ok(Json(MessageResponse::new("Logged out")))
}

#[get("/me")]
pub async fn api_me(user: User) -> Json<UserData> {
    Json(UserData::from(user))
}

#[get("/me", rank = 2)]
pub async fn api_me_unauthorized() -> Status {
    Status::Unauthorized
}

#[get("/users")]
pub async fn api_get_all_users(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<UserData>>, Status> {
    user.require_permission(Permission::ViewAllUsers)?;

    let users = get_all_users(db).await?;

    Ok(Json(users.into_iter().map(UserData::from).collect()))
}
