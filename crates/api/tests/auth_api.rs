//! HTTP-level tests for registration, login, token rotation, account
//! management and staff-only user administration.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    body_json, delete_auth, delete_json_auth, expect_json, get, get_auth, login, post_auth, post_json,
    post_json_auth, put_json_auth, register, send, PASSWORD,
};
use folio_db::models::user::AdminUpdateUser;
use folio_db::repositories::UserRepo;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_normalises_email_and_issues_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = json!({
        "email": "  Ada@Example.COM ",
        "first_name": "Ada",
        "last_name": "Lovelace",
        "password": PASSWORD,
        "password_confirmation": PASSWORD,
    });
    let json = expect_json(post_json(&app, "/api/v1/auth/register", body).await, StatusCode::CREATED).await;

    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["expires_in"], 3600);
    assert_eq!(json["user"]["email"], "ada@example.com");
    assert_eq!(json["user"]["full_name"], "Ada Lovelace");
    assert_eq!(json["user"]["role"], "user");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_is_a_conflict(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(&app, "dup@example.com", "A", "B").await;

    let body = json!({
        "email": "DUP@example.com",
        "first_name": "C",
        "last_name": "D",
        "password": PASSWORD,
        "password_confirmation": PASSWORD,
    });
    let json = expect_json(post_json(&app, "/api/v1/auth/register", body).await, StatusCode::CONFLICT).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_bad_passwords_and_email(pool: PgPool) {
    let app = common::build_test_app(pool);

    let mismatch = json!({
        "email": "x@example.com", "first_name": "X", "last_name": "Y",
        "password": PASSWORD, "password_confirmation": "something-else",
    });
    let json = expect_json(post_json(&app, "/api/v1/auth/register", mismatch).await, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let short = json!({
        "email": "x@example.com", "first_name": "X", "last_name": "Y",
        "password": "short", "password_confirmation": "short",
    });
    expect_json(post_json(&app, "/api/v1/auth/register", short).await, StatusCode::BAD_REQUEST).await;

    let bad_email = json!({
        "email": "not-an-email", "first_name": "X", "last_name": "Y",
        "password": PASSWORD, "password_confirmation": PASSWORD,
    });
    expect_json(post_json(&app, "/api/v1/auth/register", bad_email).await, StatusCode::BAD_REQUEST).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn array_body_is_rejected_not_coerced(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(&app, "arr@example.com", "A", "B").await;

    let body = json!([{ "email": "arr@example.com", "password": PASSWORD }]);
    let response = post_json(&app, "/api/v1/auth/login", body).await;
    assert!(response.status().is_client_error());
    assert_ne!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Login / refresh / logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_failures_share_one_message(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(&app, "grace@example.com", "Grace", "Hopper").await;

    let wrong = expect_json(login(&app, "grace@example.com", "wrong-password").await, StatusCode::UNAUTHORIZED).await;
    let unknown = expect_json(login(&app, "nobody@example.com", PASSWORD).await, StatusCode::UNAUTHORIZED).await;
    assert_eq!(wrong["error"], unknown["error"]);

    let ok = expect_json(login(&app, "GRACE@example.com", PASSWORD).await, StatusCode::OK).await;
    assert_eq!(ok["user"]["email"], "grace@example.com");
    assert!(ok["user"]["last_login_at"].is_null() || ok["user"]["last_login_at"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivated_account_cannot_log_in(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let user = register(&app, "gone@example.com", "G", "One").await;

    UserRepo::admin_update(
        &pool,
        user.id,
        &AdminUpdateUser {
            is_active: Some(false),
            is_staff: None,
        },
    )
    .await
    .unwrap();

    let json = expect_json(login(&app, "gone@example.com", PASSWORD).await, StatusCode::FORBIDDEN).await;
    assert_eq!(json["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rotates_the_session(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register(&app, "rot@example.com", "R", "Ot").await;

    let body = json!({ "refresh_token": user.refresh_token });
    let first = expect_json(post_json(&app, "/api/v1/auth/refresh", body.clone()).await, StatusCode::OK).await;
    assert_ne!(first["refresh_token"], user.refresh_token.as_str());

    // The presented token was revoked by the rotation.
    expect_json(post_json(&app, "/api/v1/auth/refresh", body).await, StatusCode::UNAUTHORIZED).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_every_session(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register(&app, "out@example.com", "O", "Ut").await;

    let response = post_auth(&app, "/api/v1/auth/logout", &user.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = json!({ "refresh_token": user.refresh_token });
    expect_json(post_json(&app, "/api/v1/auth/refresh", body).await, StatusCode::UNAUTHORIZED).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn verify_requires_a_valid_bearer_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register(&app, "ver@example.com", "V", "Er").await;

    expect_json(get(&app, "/api/v1/auth/verify").await, StatusCode::UNAUTHORIZED).await;
    expect_json(get_auth(&app, "/api/v1/auth/verify", "garbage").await, StatusCode::UNAUTHORIZED).await;

    let request = Request::builder()
        .uri("/api/v1/auth/verify")
        .header("authorization", format!("Token {}", user.token))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, request).await.status(), StatusCode::UNAUTHORIZED);

    let json = expect_json(get_auth(&app, "/api/v1/auth/verify", &user.token).await, StatusCode::OK).await;
    assert_eq!(json["valid"], true);
    assert_eq!(json["user"]["id"], user.id);
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_update_keeps_email(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register(&app, "prof@example.com", "Old", "Name").await;

    let json = expect_json(
        put_json_auth(
            &app,
            "/api/v1/account/profile",
            &user.token,
            json!({ "first_name": "New", "email": "hijack@example.com" }),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["first_name"], "New");
    assert_eq!(json["last_name"], "Name");
    assert_eq!(json["email"], "prof@example.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn change_password_flow(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register(&app, "pw@example.com", "P", "W").await;
    let path = "/api/v1/account/change-password";

    let wrong_current = json!({
        "current_password": "nope-nope",
        "new_password": "brand-new-pass",
        "confirm_password": "brand-new-pass",
    });
    expect_json(post_json_auth(&app, path, &user.token, wrong_current).await, StatusCode::BAD_REQUEST).await;

    let mismatch = json!({
        "current_password": PASSWORD,
        "new_password": "brand-new-pass",
        "confirm_password": "brand-new-pazz",
    });
    expect_json(post_json_auth(&app, path, &user.token, mismatch).await, StatusCode::BAD_REQUEST).await;

    let ok = json!({
        "current_password": PASSWORD,
        "new_password": "brand-new-pass",
        "confirm_password": "brand-new-pass",
    });
    expect_json(post_json_auth(&app, path, &user.token, ok).await, StatusCode::OK).await;

    expect_json(login(&app, "pw@example.com", PASSWORD).await, StatusCode::UNAUTHORIZED).await;
    expect_json(login(&app, "pw@example.com", "brand-new-pass").await, StatusCode::OK).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn account_stats_and_export_cover_owned_content(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register(&app, "exp@example.com", "Ex", "Port").await;
    common::publishable_portfolio(&app, &user, "exporter").await;

    let stats = expect_json(get_auth(&app, "/api/v1/account/stats", &user.token).await, StatusCode::OK).await;
    assert_eq!(stats["portfolio_count"], 1);
    assert_eq!(stats["portfolio_status"], "draft");
    assert_eq!(stats["contact_count"], 1);
    assert_eq!(stats["competence_count"], 1);
    assert_eq!(stats["projet_count"], 1);

    let export = expect_json(get_auth(&app, "/api/v1/account/export", &user.token).await, StatusCode::OK).await;
    assert_eq!(export["profile"]["email"], "exp@example.com");
    assert_eq!(export["contacts"].as_array().unwrap().len(), 1);
    assert_eq!(export["competences"].as_array().unwrap().len(), 1);
    assert_eq!(export["projets"].as_array().unwrap().len(), 1);
    assert_eq!(export["portfolio"]["title"], "exporter");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn export_includes_contacts_beyond_the_creation_cap(pool: PgPool) {
    let app = common::build_test_app(pool);
    let alice = register(&app, "alice.cap@example.com", "Alice", "Cap").await;
    let source = common::publishable_portfolio(&app, &alice, "capped").await;
    expect_json(
        common::set_status(&app, &alice.token, source.portfolio_id, "published").await,
        StatusCode::OK,
    )
    .await;

    let bob = register(&app, "bob.cap@example.com", "Bob", "Cap").await;
    for n in 0..10 {
        common::create_entity(
            &app,
            &bob.token,
            "/api/v1/contacts",
            json!({ "contact_type": "phone", "value": format!("+33 6 00 00 00 {n:02}") }),
        )
        .await;
    }

    // Duplication copies Alice's contact even though Bob is at the cap.
    let response = post_auth(
        &app,
        &format!("/api/v1/portfolios/{}/duplicate", source.portfolio_id),
        &bob.token,
    )
    .await;
    expect_json(response, StatusCode::CREATED).await;

    let stats = expect_json(get_auth(&app, "/api/v1/account/stats", &bob.token).await, StatusCode::OK).await;
    assert_eq!(stats["contact_count"], 11);

    let export = expect_json(get_auth(&app, "/api/v1/account/export", &bob.token).await, StatusCode::OK).await;
    assert_eq!(export["contacts"].as_array().unwrap().len(), 11);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_account_requires_password_and_cascades(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register(&app, "bye@example.com", "B", "Ye").await;
    let content = common::publishable_portfolio(&app, &user, "farewell").await;

    let response = delete_json_auth(&app, "/api/v1/account", &user.token, json!({ "password": "wrong-one" })).await;
    expect_json(response, StatusCode::BAD_REQUEST).await;

    let response = delete_json_auth(&app, "/api/v1/account", &user.token, json!({ "password": PASSWORD })).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    expect_json(login(&app, "bye@example.com", PASSWORD).await, StatusCode::UNAUTHORIZED).await;
    let other = register(&app, "watcher@example.com", "W", "A").await;
    let response = get_auth(
        &app,
        &format!("/api/v1/portfolios/{}", content.portfolio_id),
        &other.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_endpoints_require_staff(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let user = register(&app, "plain@example.com", "P", "Lain").await;

    expect_json(get_auth(&app, "/api/v1/admin/users", &user.token).await, StatusCode::FORBIDDEN).await;

    UserRepo::admin_update(
        &pool,
        user.id,
        &AdminUpdateUser {
            is_active: None,
            is_staff: Some(true),
        },
    )
    .await
    .unwrap();

    // The role lives in the token, so a fresh login is needed.
    let login_json = expect_json(login(&app, "plain@example.com", PASSWORD).await, StatusCode::OK).await;
    assert_eq!(login_json["user"]["role"], "staff");
    let staff_token = login_json["access_token"].as_str().unwrap().to_string();

    let other = register(&app, "target@example.com", "T", "Arget").await;

    let page = expect_json(get_auth(&app, "/api/v1/admin/users?page_size=1", &staff_token).await, StatusCode::OK).await;
    assert_eq!(page["count"], 2);
    assert_eq!(page["results"].as_array().unwrap().len(), 1);
    assert!(page["next"].as_str().unwrap().ends_with("page=2"));

    let updated = expect_json(
        put_json_auth(
            &app,
            &format!("/api/v1/admin/users/{}", other.id),
            &staff_token,
            json!({ "is_active": false }),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(updated["is_active"], false);

    let missing = get_auth(&app, "/api/v1/admin/users/999999", &staff_token).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body = body_json(missing).await;
    assert_eq!(body["code"], "NOT_FOUND");

    // Deletion: plain users are refused, staff cannot remove themselves.
    let victim = register(&app, "victim@example.com", "Vic", "Tim").await;
    let content = common::publishable_portfolio(&app, &victim, "doomed").await;
    let victim_path = format!("/api/v1/admin/users/{}", victim.id);

    let response = delete_auth(&app, &victim_path, &victim.token).await;
    expect_json(response, StatusCode::FORBIDDEN).await;

    let response = delete_auth(&app, &format!("/api/v1/admin/users/{}", user.id), &staff_token).await;
    expect_json(response, StatusCode::BAD_REQUEST).await;

    let response = delete_auth(&app, &victim_path, &staff_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    expect_json(get_auth(&app, &victim_path, &staff_token).await, StatusCode::NOT_FOUND).await;
    expect_json(login(&app, "victim@example.com", PASSWORD).await, StatusCode::UNAUTHORIZED).await;
    let refresh = post_json(
        &app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": victim.refresh_token }),
    )
    .await;
    expect_json(refresh, StatusCode::UNAUTHORIZED).await;
    let response = get_auth(
        &app,
        &format!("/api/v1/portfolios/{}", content.portfolio_id),
        &staff_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(&app, &victim_path, &staff_token).await;
    expect_json(response, StatusCode::NOT_FOUND).await;
}
