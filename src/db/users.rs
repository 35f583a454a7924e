use chrono::Utc;
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::auth::{AuthToken, DbUser, User};
use crate::error::AppError;

#[instrument]
pub async fn get_user(pool: &Pool<Sqlite>, id: i64) -> Result<User, AppError> {
    info!("Fetching user by ID");
    let row = sqlx::query_as::<_, DbUser>(
        "SELECT id, name, email, password, phone, role, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(user) => Ok(User::from(user)),
        _ => Err(AppError::NotFound(format!(
            "User with id {} not found in database",
            id
        ))),
    }
}

#[instrument(skip_all, fields(email))]
pub async fn create_user(
    pool: &Pool<Sqlite>,
    name: &str,
    email: &str,
    password: &str,
    phone: Option<&str>,
    role: &str,
) -> Result<User, AppError> {
    info!("Creating new user");

    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "Email '{}' is already registered",
            email
        )));
    }

    let hashed_password = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
    let now = Utc::now().naive_utc();

    let res = sqlx::query(
        "INSERT INTO users (name, email, password, phone, role, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(name)
    .bind(email)
    .bind(&hashed_password)
    .bind(phone)
    .bind(role)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    get_user(pool, res.last_insert_rowid()).await
}

/// Verifies credentials, returning the user on success and `None` on a bad
/// email or password.
#[instrument(skip_all, fields(email))]
pub async fn authenticate_user(
    pool: &Pool<Sqlite>,
    email: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    info!("Authenticating user");
    let row = sqlx::query_as::<_, DbUser>(
        "SELECT id, name, email, password, phone, role, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(user) => match bcrypt::verify(password, &user.password) {
            Ok(true) => Ok(Some(User::from(user))),
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

#[instrument(skip(pool))]
pub async fn get_all_users(pool: &Pool<Sqlite>) -> Result<Vec<User>, AppError> {
    info!("Getting all users");
    let rows = sqlx::query_as::<_, DbUser>(
        "SELECT id, name, email, password, phone, role, created_at FROM users
         ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(User::from).collect())
}

pub struct UserCounts {
    pub total: i64,
    pub users: i64,
    pub admins: i64,
}

#[instrument(skip(pool))]
pub async fn count_users(pool: &Pool<Sqlite>) -> Result<UserCounts, AppError> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let admins = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'admin'")
        .fetch_one(pool)
        .await?;

    Ok(UserCounts {
        total,
        users: total - admins,
        admins,
    })
}

/// Issues a fresh bearer token for the user. Tokens live until logout.
#[instrument(skip(pool))]
pub async fn create_api_token(pool: &Pool<Sqlite>, user_id: i64) -> Result<String, AppError> {
    info!("Issuing API token");

    let token = AuthToken::generate();
    let now = Utc::now().naive_utc();

    sqlx::query("INSERT INTO api_tokens (user_id, token, created_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(&token)
        .bind(now)
        .execute(pool)
        .await?;

    Ok(token)
}

#[instrument(skip(pool, token))]
pub async fn get_user_by_token(pool: &Pool<Sqlite>, token: &str) -> Result<User, AppError> {
    let row = sqlx::query_as::<_, DbUser>(
        "SELECT u.id, u.name, u.email, u.password, u.phone, u.role, u.created_at
         FROM users u
         JOIN api_tokens t ON t.user_id = u.id
         WHERE t.token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(user) => Ok(User::from(user)),
        _ => Err(AppError::Authentication("Invalid API token".to_string())),
    }
}

#[instrument(skip(pool, token))]
pub async fn revoke_api_token(pool: &Pool<Sqlite>, token: &str) -> Result<(), AppError> {
    info!("Revoking API token");

    sqlx::query("DELETE FROM api_tokens WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}
