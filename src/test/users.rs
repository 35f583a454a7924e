#[cfg(test)]
mod tests {
    use crate::db::{
        authenticate_user, count_users, create_api_token, create_user, get_user,
        get_user_by_token, revoke_api_token,
    };
    use crate::error::AppError;
    use crate::test::test_utils::{STANDARD_PASSWORD, TestDbBuilder};

    #[rocket::async_test]
    async fn test_create_and_get_user() {
        let test_db = TestDbBuilder::new()
            .build()
            .await
            .expect("Failed to build test database");

        let created = create_user(
            &test_db.pool,
            "Carol",
            "carol@example.com",
            "supersecret",
            Some("555-0100"),
            "user",
        )
        .await
        .expect("Failed to create user");

        let fetched = get_user(&test_db.pool, created.id)
            .await
            .expect("Failed to fetch user");

        assert_eq!(fetched.name, "Carol");
        assert_eq!(fetched.email, "carol@example.com");
        assert_eq!(fetched.phone.as_deref(), Some("555-0100"));
    }

    #[rocket::async_test]
    async fn test_duplicate_email_is_conflict() {
        let test_db = TestDbBuilder::new()
            .user("Alice", "alice@example.com")
            .build()
            .await
            .expect("Failed to build test database");

        let result = create_user(
            &test_db.pool,
            "Impostor",
            "alice@example.com",
            "supersecret",
            None,
            "user",
        )
        .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[rocket::async_test]
    async fn test_authenticate_user() {
        let test_db = TestDbBuilder::new()
            .user("Alice", "alice@example.com")
            .build()
            .await
            .expect("Failed to build test database");

        let user = authenticate_user(&test_db.pool, "alice@example.com", STANDARD_PASSWORD)
            .await
            .expect("Authentication query failed");
        assert!(user.is_some());

        let wrong_password = authenticate_user(&test_db.pool, "alice@example.com", "nope")
            .await
            .expect("Authentication query failed");
        assert!(wrong_password.is_none());

        let unknown_email = authenticate_user(&test_db.pool, "ghost@example.com", "nope")
            .await
            .expect("Authentication query failed");
        assert!(unknown_email.is_none());
    }

    #[rocket::async_test]
    async fn test_api_token_lifecycle() {
        let test_db = TestDbBuilder::new()
            .user("Alice", "alice@example.com")
            .build()
            .await
            .expect("Failed to build test database");

        let user_id = test_db.user_id("alice@example.com").unwrap();

        let token = create_api_token(&test_db.pool, user_id)
            .await
            .expect("Failed to create token");

        let user = get_user_by_token(&test_db.pool, &token)
            .await
            .expect("Token lookup failed");
        assert_eq!(user.id, user_id);

        revoke_api_token(&test_db.pool, &token)
            .await
            .expect("Failed to revoke token");

        let result = get_user_by_token(&test_db.pool, &token).await;
        assert!(matches!(result, Err(AppError::Authentication(_))));
    }

    #[rocket::async_test]
    async fn test_count_users() {
        let test_db = TestDbBuilder::new()
            .admin("Admin", "admin@example.com")
            .user("Alice", "alice@example.com")
            .user("Bob", "bob@example.com")
            .build()
            .await
            .expect("Failed to build test database");

        let counts = count_users(&test_db.pool)
            .await
            .expect("Failed to count users");

        assert_eq!(counts.total, 3);
        assert_eq!(counts.admins, 1);
        assert_eq!(counts.users, 2);
    }
}
