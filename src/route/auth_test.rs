use std::sync::Arc;

use chrono::{Duration, Local};
use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    core::security::{encode_token, get_user_from_token, Claims},
    core::test_utils::generate_test_user,
    init_openapi_route,
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_signup_api(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = Arc::new(AppState { db: pool });
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When signup
    let json_payload = json!({
        "firstName": "Jane",
        "lastName": "Doe",
        "email": "jane.doe@example.com",
        "password": "password"
    });
    let resp = cli
        .post("/api/signup")
        .body_json(&json_payload)
        .send()
        .await;

    // Expect signup
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    let token = json.value().object().get_opt("token");
    assert!(token.is_some());
    let token: String = token.unwrap().deserialize();
    let mut tx = app_state.db.begin().await?;
    let user_in_token = get_user_from_token(&mut tx, Some(token.clone()), config.clone()).await?;
    assert!(user_in_token.is_some());
    assert_eq!(user_in_token.unwrap().email, "jane.doe@example.com");

    // When signup again with the same email
    let resp = cli
        .post("/api/signup")
        .body_json(&json_payload)
        .send()
        .await;

    // Expect second signup rejected and no extra row
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({ "message": "Email already exists" }))
        .await;
    let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.users"#)
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(num_data.0, 1);
    Ok(())
}

#[sqlx::test]
async fn test_signup_api_invalid_payload(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = Arc::new(AppState { db: pool });
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When email is not email shaped
    let resp = cli
        .post("/api/signup")
        .body_json(&json!({
            "firstName": "Jane",
            "lastName": "Doe",
            "email": "not-an-email",
            "password": "password"
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When first name is blank
    let resp = cli
        .post("/api/signup")
        .body_json(&json!({
            "firstName": " ",
            "lastName": "Doe",
            "email": "jane.doe@example.com",
            "password": "password"
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.users"#)
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(num_data.0, 0);
    Ok(())
}

#[sqlx::test]
async fn test_login_api(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = Arc::new(AppState { db: pool });
    let mut db = app_state.db.acquire().await?;
    let test_user =
        generate_test_user(&mut db, config.clone(), "jane.doe@example.com", "password").await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When login
    let resp = cli
        .post("/api/login")
        .body_json(&json!({
            "email": "jane.doe@example.com",
            "password": "password"
        }))
        .send()
        .await;

    // Expect login
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let token = json.value().object().get_opt("token");
    assert!(token.is_some());
    let token: String = token.unwrap().deserialize();
    let mut tx = app_state.db.begin().await?;
    let user_in_token = get_user_from_token(&mut tx, Some(token), config.clone()).await?;
    assert!(user_in_token.is_some());
    assert_eq!(user_in_token.unwrap().id, test_user.user.id);
    Ok(())
}

#[sqlx::test]
async fn test_login_api_invalid_credentials(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = Arc::new(AppState { db: pool });
    let mut db = app_state.db.acquire().await?;
    generate_test_user(&mut db, config.clone(), "jane.doe@example.com", "password").await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When login with the wrong password
    let resp = cli
        .post("/api/login")
        .body_json(&json!({
            "email": "jane.doe@example.com",
            "password": "wrongpassword"
        }))
        .send()
        .await;

    // Expect the uniform message
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({ "message": "Invalid Credentials" }))
        .await;

    // When login with an unknown email
    let resp = cli
        .post("/api/login")
        .body_json(&json!({
            "email": "nobody@example.com",
            "password": "password"
        }))
        .send()
        .await;

    // Expect the same message, nothing leaks which part failed
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({ "message": "Invalid Credentials" }))
        .await;
    Ok(())
}

#[sqlx::test]
async fn test_expired_token_rejected(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = Arc::new(AppState { db: pool });
    let mut db = app_state.db.acquire().await?;
    let test_user =
        generate_test_user(&mut db, config.clone(), "jane.doe@example.com", "password").await?;
    let claims = Claims {
        id: test_user.user.id,
        exp: (Local::now() - Duration::hours(2)).timestamp(),
    };
    let expired_token = encode_token(&claims, config.jwt_secret.clone())?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .get("/api/users")
        .header("authorization", format!("Bearer {}", expired_token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[sqlx::test]
async fn test_missing_token_rejected(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = Arc::new(AppState { db: pool });
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli.get("/api/users").send().await;

    // Expect
    resp.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}
