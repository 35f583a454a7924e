#[macro_use]
extern crate rocket;

mod api;
mod auth;
mod db;
mod env;
mod error;
mod models;
mod storage;
mod telemetry;
#[cfg(test)]
mod test;
mod validation;

use api::auth::{
    api_get_all_users, api_login, api_logout, api_me, api_me_unauthorized, api_register,
};
use api::categories::{
    api_create_category, api_delete_category, api_get_category, api_list_categories,
    api_update_category,
};
use api::favorites::{api_add_favorite, api_list_favorites, api_remove_favorite};
use api::health;
use api::history::{api_delete_history, api_list_history, api_record_view};
use api::notifications::{
    api_create_notification, api_delete_notification, api_get_notification,
    api_list_notifications, api_update_notification,
};
use api::photos::api_upload_photo;
use api::recipes::{
    api_create_recipe, api_delete_recipe, api_get_recipe, api_list_recipes, api_my_recipes,
    api_patch_recipe, api_publish_recipe, api_unpublish_recipe, api_update_recipe,
};
use api::stats::{api_suggestion_stats, api_user_stats};
use api::suggestions::{api_create_suggestion, api_list_suggestions};
use api::tags::{api_create_tag, api_delete_tag, api_get_tag, api_list_tags, api_update_tag};
use auth::unauthorized_api;
use error::AppError;
use rocket::{Build, Rocket};
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;
use storage::PhotoStore;
use telemetry::{TelemetryFairing, init_tracing};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Anyhow(anyhow::Error),
    #[error("{0}")]
    Figment(rocket::figment::Error),
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Error::Anyhow(value)
    }
}

impl From<rocket::figment::Error> for Error {
    fn from(value: rocket::figment::Error) -> Self {
        Error::Figment(value)
    }
}

#[launch]
async fn rocket() -> _ {
    if let Err(e) = env::load_environment() {
        eprintln!("Failed to load environment files: {}", e);
    }

    init_tracing();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:recipes.db".to_string());

    let options = SqliteConnectOptions::from_str(&database_url)
        .expect("Invalid DATABASE_URL")
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(options)
        .await
        .expect("Failed to connect to SQLite database");

    info!("Running database migrations...");
    match sqlx::migrate!("./migrations").run(&pool).await {
        Ok(_) => info!("Migrations completed successfully"),
        Err(e) => {
            error!("Failed to run migrations: {}", e);
            panic!("Database migration failed: {}", e);
        }
    }

    init_rocket(pool, PhotoStore::from_env()).await
}

pub async fn init_rocket(pool: SqlitePool, photo_store: PhotoStore) -> Rocket<Build> {
    info!("Starting recipe share API");

    rocket::build()
        .manage(pool)
        .manage(photo_store)
        .mount(
            "/api",
            routes![
                api_register,
                api_login,
                api_logout,
                api_me,
                api_me_unauthorized,
                api_get_all_users,
                api_list_recipes,
                api_get_recipe,
                api_my_recipes,
                api_create_recipe,
                api_update_recipe,
                api_patch_recipe,
                api_delete_recipe,
                api_publish_recipe,
                api_unpublish_recipe,
                api_list_categories,
                api_get_category,
                api_create_category,
                api_update_category,
                api_delete_category,
                api_list_tags,
                api_get_tag,
                api_create_tag,
                api_update_tag,
                api_delete_tag,
                api_list_favorites,
                api_add_favorite,
                api_remove_favorite,
                api_list_history,
                api_record_view,
                api_delete_history,
                api_list_notifications,
                api_get_notification,
                api_create_notification,
                api_update_notification,
                api_delete_notification,
                api_create_suggestion,
                api_list_suggestions,
                api_user_stats,
                api_suggestion_stats,
                api_upload_photo,
            ],
        )
        .register("/api", catchers![unauthorized_api])
        .mount("/api", routes![health])
        .attach(TelemetryFairing)
}
