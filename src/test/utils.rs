#[cfg(test)]
pub mod test_utils {
    use crate::db::{
        NewRecipe, create_api_token, create_category, create_recipe, create_user,
    };
    use crate::error::AppError;
    use crate::init_rocket;
    use crate::storage::PhotoStore;
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;
    use serde_json::{Value, json};
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::{Pool, Sqlite};
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::Once;
    use uuid::Uuid;

    static INIT: Once = Once::new();
    pub static STANDARD_PASSWORD: &str = "password123";

    #[derive(Default)]
    pub struct TestDbBuilder {
        users: Vec<TestUser>,
        categories: Vec<String>,
        recipes: Vec<TestRecipe>,
    }

    pub struct TestUser {
        pub name: String,
        pub email: String,
        pub role: String,
        pub password: String,
    }

    pub struct TestRecipe {
        pub title: String,
        pub owner_email: String,
        pub category_name: Option<String>,
        pub published: bool,
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn user(mut self, name: &str, email: &str) -> Self {
            self.users.push(TestUser {
                name: name.to_string(),
                email: email.to_string(),
                role: "user".to_string(),
                password: STANDARD_PASSWORD.to_string(),
            });
            self
        }

        pub fn admin(mut self, name: &str, email: &str) -> Self {
            self.users.push(TestUser {
                name: name.to_string(),
                email: email.to_string(),
                role: "admin".to_string(),
                password: STANDARD_PASSWORD.to_string(),
            });
            self
        }

        pub fn category(mut self, name: &str) -> Self {
            self.categories.push(name.to_string());
            self
        }

        pub fn recipe(
            mut self,
            title: &str,
            owner_email: &str,
            category_name: Option<&str>,
            published: bool,
        ) -> Self {
            self.recipes.push(TestRecipe {
                title: title.to_string(),
                owner_email: owner_email.to_string(),
                category_name: category_name.map(String::from),
                published,
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            INIT.call_once(|| {
                let _ = env_logger::Builder::from_env(
                    env_logger::Env::default().default_filter_or("debug"),
                )
                .is_test(true)
                .try_init();
            });

            // A named shared-cache in-memory database, so every pool
            // connection sees the same data.
            let url = format!(
                "sqlite:file:testdb-{}?mode=memory&cache=shared",
                Uuid::new_v4()
            );
            let options = SqliteConnectOptions::from_str(&url)?.foreign_keys(true);

            let pool = SqlitePoolOptions::new()
                .min_connections(1)
                .connect_with(options)
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;

            let mut user_id_map: HashMap<String, i64> = HashMap::new();
            let mut category_id_map: HashMap<String, i64> = HashMap::new();
            let mut recipe_id_map: HashMap<String, i64> = HashMap::new();

            for user in &self.users {
                let created = create_user(
                    &pool,
                    &user.name,
                    &user.email,
                    &user.password,
                    None,
                    &user.role,
                )
                .await?;

                user_id_map.insert(user.email.clone(), created.id);
            }

            for name in &self.categories {
                let created = create_category(&pool, name).await?;
                category_id_map.insert(name.clone(), created.id);
            }

            for recipe in &self.recipes {
                let owner_id = user_id_map
                    .get(&recipe.owner_email)
                    .copied()
                    .ok_or_else(|| {
                        AppError::Internal(format!(
                            "Test recipe owner {} was not declared",
                            recipe.owner_email
                        ))
                    })?;

                let category_id = recipe
                    .category_name
                    .as_ref()
                    .and_then(|name| category_id_map.get(name).copied());

                let created = create_recipe(
                    &pool,
                    owner_id,
                    NewRecipe {
                        title: recipe.title.clone(),
                        category_id,
                        is_published: Some(recipe.published),
                        ..Default::default()
                    },
                )
                .await?;

                recipe_id_map.insert(recipe.title.clone(), created.recipe.id);
            }

            Ok(TestDb {
                pool,
                user_id_map,
                category_id_map,
                recipe_id_map,
            })
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub user_id_map: HashMap<String, i64>,
        pub category_id_map: HashMap<String, i64>,
        pub recipe_id_map: HashMap<String, i64>,
    }

    impl TestDb {
        pub fn user_id(&self, email: &str) -> Option<i64> {
            self.user_id_map.get(email).copied()
        }

        pub fn category_id(&self, name: &str) -> Option<i64> {
            self.category_id_map.get(name).copied()
        }

        pub fn recipe_id(&self, title: &str) -> Option<i64> {
            self.recipe_id_map.get(title).copied()
        }

        pub async fn token_for(&self, email: &str) -> Result<String, AppError> {
            let user_id = self
                .user_id(email)
                .ok_or_else(|| AppError::Internal(format!("Unknown test user {}", email)))?;

            create_api_token(&self.pool, user_id).await
        }
    }

    pub async fn create_standard_test_db() -> TestDb {
        TestDbBuilder::new()
            .admin("Admin", "admin@example.com")
            .user("Alice", "alice@example.com")
            .user("Bob", "bob@example.com")
            .category("Dessert")
            .category("Dinner")
            .recipe("Pancakes", "alice@example.com", Some("Dessert"), true)
            .recipe("Secret Cake", "alice@example.com", None, false)
            .recipe("Stew", "bob@example.com", Some("Dinner"), true)
            .build()
            .await
            .expect("Failed to build test database")
    }

    pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb) {
        let photo_store = PhotoStore::new(std::env::temp_dir().join("recipe-share-test-photos"));
        let rocket = init_rocket(test_db.pool.clone(), photo_store).await;

        let client = Client::tracked(rocket)
            .await
            .expect("Failed to build test client");

        (client, test_db)
    }

    /// Logs in through the API and hands back the bearer token.
    pub async fn login_test_user(client: &Client, email: &str, password: &str) -> String {
        let response = client
            .post("/api/login")
            .header(ContentType::JSON)
            .body(json!({ "email": email, "password": password }).to_string())
            .dispatch()
            .await;

        let body = response.into_string().await.expect("Empty login response");
        let parsed: Value = serde_json::from_str(&body).expect("Invalid login response");

        parsed["token"]
            .as_str()
            .expect("Login response missing token")
            .to_string()
    }
}
