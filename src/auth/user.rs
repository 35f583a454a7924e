use chrono::{DateTime, NaiveDateTime, Utc};
use rocket::http::Status;
use serde::Serialize;

use super::{Permission, Role};

#[derive(Debug, Serialize, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// Row shape including the password hash; never leaves the db layer.
#[derive(sqlx::FromRow, Clone)]
pub struct DbUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub role: String,
    pub created_at: NaiveDateTime,
}

impl From<DbUser> for User {
    fn from(user: DbUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: Role::from_str(&user.role).unwrap_or(Role::User),
            created_at: DateTime::<Utc>::from_naive_utc_and_offset(user.created_at, Utc),
        }
    }
}

impl User {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role.has_permission(permission)
    }

    pub fn require_permission(&self, permission: Permission) -> Result<(), Status> {
        if self.role.has_permission(permission) {
            Ok(())
        } else {
            tracing::warn!(
                email = %self.email,
                role = %self.role.as_str(),
                permission = ?permission,
                "Permission denied"
            );
            Err(Status::Forbidden)
        }
    }

    /// Mutations on a recipe are allowed for its owner or any admin, and
    /// must be rejected before any side effect happens.
    pub fn require_owner_or_admin(&self, owner_id: i64) -> Result<(), Status> {
        if self.id == owner_id || self.has_permission(Permission::EditAllRecipes) {
            Ok(())
        } else {
            tracing::warn!(
                email = %self.email,
                role = %self.role.as_str(),
                owner_id = %owner_id,
                "Permission denied (not owner or admin)"
            );
            Err(Status::Forbidden)
        }
    }
}
