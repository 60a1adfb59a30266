#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use folio_api::auth::jwt::JwtConfig;
use folio_api::config::ServerConfig;
use folio_api::router::build_app_router;
use folio_api::state::AppState;

/// Test configuration with the development defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        min_password_length: 8,
        jwt: JwtConfig {
            secret: "folio-integration-test-secret".to_string(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the production router (same middleware stack) over `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, json_request("GET", uri, None, None)).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, json_request("GET", uri, Some(token), None)).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, json_request("POST", uri, None, Some(body))).await
}

pub async fn post_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, json_request("POST", uri, Some(token), Some(body))).await
}

pub async fn post_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, json_request("POST", uri, Some(token), None)).await
}

pub async fn put_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, json_request("PUT", uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, json_request("DELETE", uri, Some(token), None)).await
}

pub async fn delete_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, json_request("DELETE", uri, Some(token), Some(body))).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and return the parsed body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> Value {
    let actual = response.status();
    let body = body_json(response).await;
    assert_eq!(actual, status, "unexpected status, body: {body}");
    body
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const PASSWORD: &str = "s3cure-passw0rd";

/// A registered user and a valid access token for it.
pub struct TestUser {
    pub id: i64,
    pub token: String,
    pub refresh_token: String,
}

/// Register through the API and return the issued tokens.
pub async fn register(app: &Router, email: &str, first_name: &str, last_name: &str) -> TestUser {
    let body = json!({
        "email": email,
        "first_name": first_name,
        "last_name": last_name,
        "password": PASSWORD,
        "password_confirmation": PASSWORD,
    });
    let json = expect_json(post_json(app, "/api/v1/auth/register", body).await, StatusCode::CREATED).await;
    TestUser {
        id: json["user"]["id"].as_i64().unwrap(),
        token: json["access_token"].as_str().unwrap().to_string(),
        refresh_token: json["refresh_token"].as_str().unwrap().to_string(),
    }
}

pub async fn login(app: &Router, email: &str, password: &str) -> Response<Body> {
    post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": email, "password": password }),
    )
    .await
}

/// Create an entity through the API and return its id.
pub async fn create_entity(app: &Router, token: &str, path: &str, body: Value) -> i64 {
    let json = expect_json(post_json_auth(app, path, token, body).await, StatusCode::CREATED).await;
    json["id"].as_i64().unwrap()
}

/// Ids of the content behind a portfolio that is ready to publish.
pub struct Publishable {
    pub portfolio_id: i64,
    pub contact_id: i64,
    pub competence_id: i64,
    pub projet_id: i64,
}

/// One contact, one competence, one public projet and a portfolio with a
/// title and description linking all three. The portfolio is still a draft.
pub async fn publishable_portfolio(app: &Router, user: &TestUser, title: &str) -> Publishable {
    let contact_id = create_entity(
        app,
        &user.token,
        "/api/v1/contacts",
        json!({ "contact_type": "email", "value": format!("{title}@example.com"), "is_primary": true }),
    )
    .await;
    let competence_id = create_entity(
        app,
        &user.token,
        "/api/v1/competences",
        json!({ "name": format!("Rust {title}"), "level": "expert", "category": "backend" }),
    )
    .await;
    let projet_id = create_entity(
        app,
        &user.token,
        "/api/v1/projets",
        json!({
            "title": format!("{title} engine"),
            "description": "A storage engine",
            "primary_language": "Rust",
            "technologies": ["tokio", "sqlx"],
            "is_public": true
        }),
    )
    .await;
    let portfolio = expect_json(
        post_json_auth(
            app,
            "/api/v1/portfolios",
            &user.token,
            json!({
                "title": title,
                "description": "Systems engineer portfolio",
                "contact_ids": [contact_id],
                "competence_ids": [competence_id],
                "projet_ids": [projet_id]
            }),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    Publishable {
        portfolio_id: portfolio["id"].as_i64().unwrap(),
        contact_id,
        competence_id,
        projet_id,
    }
}

pub async fn set_status(app: &Router, token: &str, portfolio_id: i64, status: &str) -> Response<Body> {
    post_json_auth(
        app,
        &format!("/api/v1/portfolios/{portfolio_id}/publish"),
        token,
        json!({ "status": status }),
    )
    .await
}
