#[cfg(test)]
mod tests {
    use crate::test::test_utils::{
        STANDARD_PASSWORD, create_standard_test_db, login_test_user, setup_test_client,
    };
    use rocket::http::{ContentType, Header, Status};
    use serde_json::{Value, json};

    fn bearer(token: &str) -> Header<'static> {
        Header::new("Authorization", format!("Bearer {}", token))
    }

    #[rocket::async_test]
    async fn test_register_login_me() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let response = client
            .post("/api/register")
            .header(ContentType::JSON)
            .body(
                json!({
                    "name": "Carol",
                    "email": "carol@example.com",
                    "password": "supersecret"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Created);

        let body: Value =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(body["user"]["email"], "carol@example.com");
        assert!(body["token"].as_str().is_some());

        let token = login_test_user(&client, "carol@example.com", "supersecret").await;

        let response = client
            .get("/api/me")
            .header(bearer(&token))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let me: Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(me["name"], "Carol");
        assert_eq!(me["role"], "user");
    }

    #[rocket::async_test]
    async fn test_register_validation_and_conflict() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let response = client
            .post("/api/register")
            .header(ContentType::JSON)
            .body(
                json!({
                    "name": "Carol",
                    "email": "not-an-email",
                    "password": "short"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::UnprocessableEntity);

        let body: Value =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(body["status"], "error");
        assert!(body["errors"]["email"].is_array());
        assert!(body["errors"]["password"].is_array());

        // alice@example.com is already registered.
        let response = client
            .post("/api/register")
            .header(ContentType::JSON)
            .body(
                json!({
                    "name": "Alice Again",
                    "email": "alice@example.com",
                    "password": "supersecret"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Conflict);
    }

    #[rocket::async_test]
    async fn test_login_bad_credentials() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let response = client
            .post("/api/login")
            .header(ContentType::JSON)
            .body(
                json!({
                    "email": "alice@example.com",
                    "password": "wrong_password"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn test_auth_required_endpoints() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let endpoints = vec!["/api/me", "/api/me/recipes", "/api/me/favorites", "/api/me/history"];

        for endpoint in endpoints {
            let response = client.get(endpoint).dispatch().await;
            assert_eq!(
                response.status(),
                Status::Unauthorized,
                "Endpoint {} did not require authentication",
                endpoint
            );
        }
    }

    #[rocket::async_test]
    async fn test_forged_token_rejected() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let response = client
            .get("/api/me")
            .header(bearer("forged-token"))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn test_logout_revokes_token() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let token = login_test_user(&client, "alice@example.com", STANDARD_PASSWORD).await;

        let response = client
            .post("/api/logout")
            .header(bearer(&token))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .get("/api/me")
            .header(bearer(&token))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn test_unpublished_recipe_hidden_from_others() {
        let test_db = create_standard_test_db().await;
        let secret_id = test_db.recipe_id("Secret Cake").unwrap();
        let (client, _) = setup_test_client(test_db).await;

        let uri = format!("/api/recipes/{}", secret_id);

        // Anonymous callers get a 404, not a 403, so nothing leaks.
        let response = client.get(uri.as_str()).dispatch().await;
        assert_eq!(response.status(), Status::NotFound);

        let bob = login_test_user(&client, "bob@example.com", STANDARD_PASSWORD).await;
        let response = client.get(uri.as_str()).header(bearer(&bob)).dispatch().await;
        assert_eq!(response.status(), Status::NotFound);

        let alice = login_test_user(&client, "alice@example.com", STANDARD_PASSWORD).await;
        let response = client.get(uri.as_str()).header(bearer(&alice)).dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let admin = login_test_user(&client, "admin@example.com", STANDARD_PASSWORD).await;
        let response = client.get(uri.as_str()).header(bearer(&admin)).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn test_unpublished_recipe_hidden_from_favorite_and_history() {
        let test_db = create_standard_test_db().await;
        let secret_id = test_db.recipe_id("Secret Cake").unwrap();
        let (client, _) = setup_test_client(test_db).await;

        let favorite_uri = format!("/api/recipes/{}/favorite", secret_id);
        let history_uri = format!("/api/recipes/{}/history", secret_id);

        // Bob can't tell the unpublished recipe apart from a missing one.
        let bob = login_test_user(&client, "bob@example.com", STANDARD_PASSWORD).await;
        let response = client
            .post(favorite_uri.as_str())
            .header(bearer(&bob))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);

        let response = client
            .post(history_uri.as_str())
            .header(bearer(&bob))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);

        // The owner can favorite and view their own draft.
        let alice = login_test_user(&client, "alice@example.com", STANDARD_PASSWORD).await;
        let response = client
            .post(favorite_uri.as_str())
            .header(bearer(&alice))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .post(history_uri.as_str())
            .header(bearer(&alice))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn test_recipe_crud_over_api() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let alice = login_test_user(&client, "alice@example.com", STANDARD_PASSWORD).await;

        let response = client
            .post("/api/recipes")
            .header(ContentType::JSON)
            .header(bearer(&alice))
            .body(
                json!({
                    "title": "Waffles",
                    "servings": 2,
                    "ingredients": [
                        { "name": "Flour", "quantity": "200", "unit": "g" }
                    ],
                    "steps": [
                        { "step_number": 1, "instruction": "Mix and cook" }
                    ],
                    "tags": ["Breakfast"]
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Created);
        let created: Value =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(created["title"], "Waffles");
        assert_eq!(created["tags"][0]["name"], "breakfast");

        let recipe_id = created["id"].as_i64().unwrap();

        // Bob is neither owner nor admin.
        let bob = login_test_user(&client, "bob@example.com", STANDARD_PASSWORD).await;
        let response = client
            .patch(format!("/api/recipes/{}", recipe_id))
            .header(ContentType::JSON)
            .header(bearer(&bob))
            .body(json!({ "title": "Hijacked" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);

        let response = client
            .patch(format!("/api/recipes/{}", recipe_id))
            .header(ContentType::JSON)
            .header(bearer(&alice))
            .body(json!({ "title": "Belgian Waffles" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let updated: Value =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(updated["title"], "Belgian Waffles");
        assert_eq!(updated["ingredients"].as_array().unwrap().len(), 1);

        let response = client
            .delete(format!("/api/recipes/{}", recipe_id))
            .header(bearer(&bob))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);

        let response = client
            .delete(format!("/api/recipes/{}", recipe_id))
            .header(bearer(&alice))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .get(format!("/api/recipes/{}", recipe_id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_recipe_validation_errors() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let alice = login_test_user(&client, "alice@example.com", STANDARD_PASSWORD).await;

        let response = client
            .post("/api/recipes")
            .header(ContentType::JSON)
            .header(bearer(&alice))
            .body(
                json!({
                    "title": "",
                    "servings": 0
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::UnprocessableEntity);
        let body: Value =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(body["errors"]["title"].is_array());
        assert!(body["errors"]["servings"].is_array());
    }

    #[rocket::async_test]
    async fn test_admin_only_category_management() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let alice = login_test_user(&client, "alice@example.com", STANDARD_PASSWORD).await;
        let response = client
            .post("/api/categories")
            .header(ContentType::JSON)
            .header(bearer(&alice))
            .body(json!({ "name": "Breakfast" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);

        // Denials carry the standard error body.
        let body: Value =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(body["status"], "error");
        assert!(body["errors"]["permission"].is_array());

        let admin = login_test_user(&client, "admin@example.com", STANDARD_PASSWORD).await;
        let response = client
            .post("/api/categories")
            .header(ContentType::JSON)
            .header(bearer(&admin))
            .body(json!({ "name": "Breakfast" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Created);

        // Categories are publicly readable.
        let response = client.get("/api/categories").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(
            body.as_array()
                .unwrap()
                .iter()
                .any(|c| c["name"] == "Breakfast")
        );
    }

    #[rocket::async_test]
    async fn test_publish_requires_admin() {
        let test_db = create_standard_test_db().await;
        let secret_id = test_db.recipe_id("Secret Cake").unwrap();
        let (client, _) = setup_test_client(test_db).await;

        let alice = login_test_user(&client, "alice@example.com", STANDARD_PASSWORD).await;
        let response = client
            .patch(format!("/api/recipes/{}/publish", secret_id))
            .header(bearer(&alice))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);

        let admin = login_test_user(&client, "admin@example.com", STANDARD_PASSWORD).await;
        let response = client
            .patch(format!("/api/recipes/{}/publish", secret_id))
            .header(bearer(&admin))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        // Now visible to everyone.
        let response = client
            .get(format!("/api/recipes/{}", secret_id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn test_favorite_and_history_flow() {
        let test_db = create_standard_test_db().await;
        let stew_id = test_db.recipe_id("Stew").unwrap();
        let (client, _) = setup_test_client(test_db).await;

        let alice = login_test_user(&client, "alice@example.com", STANDARD_PASSWORD).await;

        let response = client
            .post(format!("/api/recipes/{}/favorite", stew_id))
            .header(bearer(&alice))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .get("/api/me/favorites")
            .header(bearer(&alice))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["title"], "Stew");

        for _ in 0..2 {
            let response = client
                .post(format!("/api/recipes/{}/history", stew_id))
                .header(bearer(&alice))
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Ok);
        }

        let response = client
            .get("/api/me/history")
            .header(bearer(&alice))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let history: Value =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(history[0]["view_count"], 2);

        // Favoriting an unknown recipe is a 404.
        let response = client
            .post("/api/recipes/99999/favorite")
            .header(bearer(&alice))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_suggestions_and_stats() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        // Anyone can leave a suggestion.
        let response = client
            .post("/api/suggestions")
            .header(ContentType::JSON)
            .body(
                json!({
                    "name": "A fan",
                    "message": "More vegan recipes please"
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Created);

        // Only admins can read them.
        let alice = login_test_user(&client, "alice@example.com", STANDARD_PASSWORD).await;
        let response = client
            .get("/api/suggestions")
            .header(bearer(&alice))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);

        let admin = login_test_user(&client, "admin@example.com", STANDARD_PASSWORD).await;
        let response = client
            .get("/api/suggestions")
            .header(bearer(&admin))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .get("/api/stats/users")
            .header(bearer(&admin))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let stats: Value =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(stats["total"], 3);
        assert_eq!(stats["admins"], 1);

        let response = client
            .get("/api/stats/suggestions")
            .header(bearer(&admin))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let stats: Value =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(stats["total"], 1);
    }

    #[rocket::async_test]
    async fn test_health() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let response = client.get("/api/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.unwrap(), "OK");
    }
}
