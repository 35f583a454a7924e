pub mod auth;
pub mod categories;
pub mod favorites;
pub mod history;
pub mod notifications;
pub mod photos;
pub mod recipes;
pub mod stats;
pub mod suggestions;
pub mod tags;

use rocket::serde::{Deserialize, Serialize};

use crate::auth::{Permission, User};
use crate::models::Recipe;

// Unpublished recipes must look nonexistent to everyone but their owner and
// admins, on every endpoint that takes a recipe id.
pub(crate) fn recipe_visible_to(recipe: &Recipe, user: &User) -> bool {
    recipe.is_published
        || user.id == recipe.user_id
        || user.has_permission(Permission::EditAllRecipes)
}

#[derive(Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UserData {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
}

impl From<User> for UserData {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role.to_string(),
        }
    }
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}
