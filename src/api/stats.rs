use rocket::State;
use rocket::http::Status;
use rocket::serde::{Serialize, json::Json};
use sqlx::{Pool, Sqlite};

use crate::auth::{Permission, User};
use crate::db::{count_suggestions, count_users};

#[derive(Serialize)]
pub struct UserStatsResponse {
    pub total: i64,
    pub users: i64,
    pub admins: i64,
}

#[derive(Serialize)]
pub struct SuggestionStatsResponse {
    pub total: i64,
}

/// Admin dashboard counter.
#[get("/stats/users")]
pub async fn api_user_stats(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<UserStatsResponse>, Status> {
    user.require_permission(Permission::ViewAllUsers)?;

    let counts = count_users(db).await?;

    Ok(Json(UserStatsResponse {
        total: counts.total,
        users: counts.users,
        admins: counts.admins,
    }))
}

#[get("/stats/suggestions")]
pub async fn api_suggestion_stats(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<SuggestionStatsResponse>, Status> {
    user.require_permission(Permission::ViewSuggestions)?;

    let total = count_suggestions(db).await?;

    Ok(Json(SuggestionStatsResponse { total }))
}
