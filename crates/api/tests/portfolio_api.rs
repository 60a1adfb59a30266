//! HTTP-level tests for the portfolio resource: creation, visibility,
//! the publication lifecycle, duplication, membership and pagination.

mod common;

use axum::http::StatusCode;
use common::{
    delete_auth, expect_json, get, get_auth, login, post_auth, post_json, post_json_auth,
    publishable_portfolio, put_json_auth, register, set_status, PASSWORD,
};
use folio_db::models::user::AdminUpdateUser;
use folio_db::repositories::UserRepo;
use serde_json::json;
use sqlx::PgPool;

fn portfolio_path(id: i64) -> String {
    format!("/api/v1/portfolios/{id}")
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_requires_authentication(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(&app, "/api/v1/portfolios", json!({ "title": "Nope" })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_starts_as_draft_with_slug(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register(&app, "sam@example.com", "Sam", "Lee").await;

    expect_json(get_auth(&app, "/api/v1/portfolios/mine", &user.token).await, StatusCode::NOT_FOUND).await;

    let json = expect_json(
        post_json_auth(
            &app,
            "/api/v1/portfolios",
            &user.token,
            json!({ "title": "Backend Work", "status": "published" }),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(json["status"], "draft");
    assert_eq!(json["is_published"], false);
    assert_eq!(json["can_be_published"], false);
    assert_eq!(json["slug"], "sam-lee-backend-work");
    assert_eq!(json["owner"]["id"], user.id);
    assert!(json["published_at"].is_null());

    let mine = expect_json(get_auth(&app, "/api/v1/portfolios/mine", &user.token).await, StatusCode::OK).await;
    assert_eq!(mine["id"], json["id"]);

    // One portfolio per user.
    let second = post_json_auth(&app, "/api/v1/portfolios", &user.token, json!({ "title": "Again" })).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_rejects_foreign_and_invalid_fields(pool: PgPool) {
    let app = common::build_test_app(pool);
    let alice = register(&app, "alice@example.com", "Alice", "A").await;
    let bob = register(&app, "bob@example.com", "Bob", "B").await;

    let bobs_contact = common::create_entity(
        &app,
        &bob.token,
        "/api/v1/contacts",
        json!({ "contact_type": "phone", "value": "+33 1 23 45 67 89" }),
    )
    .await;

    let foreign = post_json_auth(
        &app,
        "/api/v1/portfolios",
        &alice.token,
        json!({ "title": "Mine", "contact_ids": [bobs_contact] }),
    )
    .await;
    assert!(foreign.status().is_client_error());

    let bad_color = post_json_auth(
        &app,
        "/api/v1/portfolios",
        &alice.token,
        json!({ "title": "Mine", "theme_color": "blue" }),
    )
    .await;
    expect_json(bad_color, StatusCode::BAD_REQUEST).await;

    let blank_title = post_json_auth(&app, "/api/v1/portfolios", &alice.token, json!({ "title": "   " })).await;
    expect_json(blank_title, StatusCode::BAD_REQUEST).await;
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn publish_checks_readiness(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register(&app, "pub@example.com", "Pub", "Lisher").await;
    let content = publishable_portfolio(&app, &user, "ready").await;
    let path = portfolio_path(content.portfolio_id);

    expect_json(
        put_json_auth(&app, &path, &user.token, json!({ "description": "" })).await,
        StatusCode::OK,
    )
    .await;
    let json = expect_json(
        set_status(&app, &user.token, content.portfolio_id, "published").await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert!(json["error"].as_str().unwrap().contains("description"));

    let unknown = set_status(&app, &user.token, content.portfolio_id, "live").await;
    expect_json(unknown, StatusCode::BAD_REQUEST).await;

    put_json_auth(&app, &path, &user.token, json!({ "description": "Back again" })).await;
    let json = expect_json(
        set_status(&app, &user.token, content.portfolio_id, "published").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["status"], "published");
    assert_eq!(json["is_published"], true);
    assert!(json["published_at"].is_string());

    let draft = expect_json(
        set_status(&app, &user.token, content.portfolio_id, "draft").await,
        StatusCode::OK,
    )
    .await;
    assert!(draft["published_at"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_the_owner_changes_status(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(&app, "own@example.com", "Own", "Er").await;
    let other = register(&app, "oth@example.com", "Oth", "Er").await;
    let content = publishable_portfolio(&app, &owner, "guarded").await;

    // A draft does not exist for anyone else.
    let hidden = set_status(&app, &other.token, content.portfolio_id, "published").await;
    assert_eq!(hidden.status(), StatusCode::NOT_FOUND);

    set_status(&app, &owner.token, content.portfolio_id, "published").await;
    let forbidden = set_status(&app, &other.token, content.portfolio_id, "draft").await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let anonymous = post_json(
        &app,
        &format!("/api/v1/portfolios/{}/publish", content.portfolio_id),
        json!({ "status": "draft" }),
    )
    .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn drafts_are_hidden_and_published_views_are_counted(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(&app, "vis@example.com", "Vis", "Ible").await;
    let other = register(&app, "peek@example.com", "Peek", "Er").await;
    let content = publishable_portfolio(&app, &owner, "viewed").await;
    let path = portfolio_path(content.portfolio_id);

    assert_eq!(get(&app, &path).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get_auth(&app, &path, &other.token).await.status(), StatusCode::NOT_FOUND);

    let own = expect_json(get_auth(&app, &path, &owner.token).await, StatusCode::OK).await;
    assert_eq!(own["view_count"], 0);

    set_status(&app, &owner.token, content.portfolio_id, "published").await;

    let first = expect_json(get(&app, &path).await, StatusCode::OK).await;
    assert_eq!(first["view_count"], 1);
    let second = expect_json(get_auth(&app, &path, &other.token).await, StatusCode::OK).await;
    assert_eq!(second["view_count"], 2);
    assert_eq!(second["contacts"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_scope_depends_on_the_caller(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let alice = register(&app, "alice@example.com", "Alice", "A").await;
    let bob = register(&app, "bob@example.com", "Bob", "B").await;
    let published = publishable_portfolio(&app, &alice, "public").await;
    set_status(&app, &alice.token, published.portfolio_id, "published").await;
    publishable_portfolio(&app, &bob, "private").await;

    let anonymous = expect_json(get(&app, "/api/v1/portfolios").await, StatusCode::OK).await;
    assert_eq!(anonymous["count"], 1);

    let as_bob = expect_json(get_auth(&app, "/api/v1/portfolios", &bob.token).await, StatusCode::OK).await;
    assert_eq!(as_bob["count"], 2);

    let as_alice = expect_json(get_auth(&app, "/api/v1/portfolios", &alice.token).await, StatusCode::OK).await;
    assert_eq!(as_alice["count"], 1);

    let staff = register(&app, "staff@example.com", "Staff", "Member").await;
    UserRepo::admin_update(
        &pool,
        staff.id,
        &AdminUpdateUser {
            is_active: None,
            is_staff: Some(true),
        },
    )
    .await
    .unwrap();
    let relogin = expect_json(login(&app, "staff@example.com", PASSWORD).await, StatusCode::OK).await;
    let staff_token = relogin["access_token"].as_str().unwrap();

    let as_staff = expect_json(get_auth(&app, "/api/v1/portfolios", staff_token).await, StatusCode::OK).await;
    assert_eq!(as_staff["count"], 2);
    let drafts = expect_json(
        get_auth(&app, "/api/v1/portfolios?status=draft", staff_token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(drafts["count"], 1);
    assert_eq!(drafts["results"][0]["owner"]["id"], bob.id);

    // The dedicated published listing ignores the caller.
    let published_only = expect_json(
        get_auth(&app, "/api/v1/portfolios/published", staff_token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(published_only["count"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_archives_and_archived_is_terminal(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(&app, "arch@example.com", "Arch", "Ive").await;
    let other = register(&app, "nosy@example.com", "No", "Sy").await;
    let content = publishable_portfolio(&app, &owner, "archivable").await;
    let path = portfolio_path(content.portfolio_id);
    set_status(&app, &owner.token, content.portfolio_id, "published").await;

    assert_eq!(delete_auth(&app, &path, &other.token).await.status(), StatusCode::FORBIDDEN);

    let json = expect_json(delete_auth(&app, &path, &owner.token).await, StatusCode::OK).await;
    assert_eq!(json["message"], "Portfolio archived successfully");

    let archived = expect_json(get_auth(&app, &path, &owner.token).await, StatusCode::OK).await;
    assert_eq!(archived["status"], "archived");
    assert!(archived["published_at"].is_null());
    assert_eq!(get(&app, &path).await.status(), StatusCode::NOT_FOUND);

    let republish = set_status(&app, &owner.token, content.portfolio_id, "published").await;
    expect_json(republish, StatusCode::BAD_REQUEST).await;
    let redraft = set_status(&app, &owner.token, content.portfolio_id, "draft").await;
    expect_json(redraft, StatusCode::BAD_REQUEST).await;
}

// ---------------------------------------------------------------------------
// Duplication
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_copies_into_a_new_draft(pool: PgPool) {
    let app = common::build_test_app(pool);
    let alice = register(&app, "alice@example.com", "Alice", "A").await;
    let bob = register(&app, "bob@example.com", "Bob", "B").await;
    let source = publishable_portfolio(&app, &alice, "original").await;
    let dup_path = format!("/api/v1/portfolios/{}/duplicate", source.portfolio_id);

    // Drafts are invisible to Bob, so they cannot be copied either.
    assert_eq!(post_auth(&app, &dup_path, &bob.token).await.status(), StatusCode::NOT_FOUND);

    set_status(&app, &alice.token, source.portfolio_id, "published").await;
    let copy = expect_json(post_auth(&app, &dup_path, &bob.token).await, StatusCode::CREATED).await;

    assert_ne!(copy["id"], source.portfolio_id);
    assert_eq!(copy["owner"]["id"], bob.id);
    assert_eq!(copy["status"], "draft");
    assert_eq!(copy["title"], "original (Copy)");
    assert_eq!(copy["view_count"], 0);
    assert_eq!(copy["contacts"].as_array().unwrap().len(), 1);
    assert_ne!(copy["contacts"][0]["id"], source.contact_id);
    assert_eq!(copy["contacts"][0]["owner_id"], bob.id);
    assert_ne!(copy["competences"][0]["id"], source.competence_id);
    assert_ne!(copy["projets"][0]["id"], source.projet_id);

    // The source is untouched.
    let original = expect_json(get_auth(&app, &portfolio_path(source.portfolio_id), &alice.token).await, StatusCode::OK).await;
    assert_eq!(original["contacts"][0]["id"], source.contact_id);

    // Bob now owns a portfolio, so a second copy is refused.
    let again = post_auth(&app, &dup_path, &bob.token).await;
    expect_json(again, StatusCode::BAD_REQUEST).await;
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn add_and_remove_members(pool: PgPool) {
    let app = common::build_test_app(pool);
    let alice = register(&app, "alice@example.com", "Alice", "A").await;
    let bob = register(&app, "bob@example.com", "Bob", "B").await;
    let content = publishable_portfolio(&app, &alice, "members").await;
    let contacts_path = format!("/api/v1/portfolios/{}/contacts", content.portfolio_id);

    let extra = common::create_entity(
        &app,
        &alice.token,
        "/api/v1/contacts",
        json!({ "contact_type": "linkedin", "value": "https://linkedin.com/in/alice" }),
    )
    .await;
    let foreign = common::create_entity(
        &app,
        &bob.token,
        "/api/v1/contacts",
        json!({ "contact_type": "phone", "value": "0102030405" }),
    )
    .await;

    let missing = post_json_auth(&app, &contacts_path, &alice.token, json!({})).await;
    let json = expect_json(missing, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["error"], "contact_id is required");

    let unknown = post_json_auth(&app, &contacts_path, &alice.token, json!({ "contact_id": 999999 })).await;
    expect_json(unknown, StatusCode::NOT_FOUND).await;

    let theirs = post_json_auth(&app, &contacts_path, &alice.token, json!({ "contact_id": foreign })).await;
    expect_json(theirs, StatusCode::FORBIDDEN).await;

    let by_bob = post_json_auth(&app, &contacts_path, &bob.token, json!({ "contact_id": foreign })).await;
    assert_eq!(by_bob.status(), StatusCode::NOT_FOUND);

    for _ in 0..2 {
        let json = expect_json(
            post_json_auth(&app, &contacts_path, &alice.token, json!({ "contact_id": extra })).await,
            StatusCode::OK,
        )
        .await;
        assert_eq!(json["contacts"].as_array().unwrap().len(), 2);
    }

    let removed = delete_auth(&app, &format!("{contacts_path}/{extra}"), &alice.token).await;
    assert_eq!(removed.status(), StatusCode::NO_CONTENT);

    let detail = expect_json(get_auth(&app, &portfolio_path(content.portfolio_id), &alice.token).await, StatusCode::OK).await;
    assert_eq!(detail["contacts"].as_array().unwrap().len(), 1);

    // Removing only unlinks; the contact itself survives.
    let contact = get_auth(&app, &format!("/api/v1/contacts/{extra}"), &alice.token).await;
    assert_eq!(contact.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_owners_only_see_public_members(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(&app, "own@example.com", "Own", "Er").await;
    let content = publishable_portfolio(&app, &owner, "partial").await;

    let hidden = common::create_entity(
        &app,
        &owner.token,
        "/api/v1/competences",
        json!({ "name": "Secret skill", "level": "beginner", "is_visible": false }),
    )
    .await;
    post_json_auth(
        &app,
        &format!("/api/v1/portfolios/{}/competences", content.portfolio_id),
        &owner.token,
        json!({ "competence_id": hidden }),
    )
    .await;
    set_status(&app, &owner.token, content.portfolio_id, "published").await;

    let path = portfolio_path(content.portfolio_id);
    let own = expect_json(get_auth(&app, &path, &owner.token).await, StatusCode::OK).await;
    assert_eq!(own["competences"].as_array().unwrap().len(), 2);

    let public = expect_json(get(&app, &path).await, StatusCode::OK).await;
    assert_eq!(public["competences"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Listing parameters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_parameters_are_validated(pool: PgPool) {
    let app = common::build_test_app(pool);

    let bad_order = get(&app, "/api/v1/portfolios?ordering=password_hash").await;
    expect_json(bad_order, StatusCode::BAD_REQUEST).await;

    let bad_page = get(&app, "/api/v1/portfolios?page=0").await;
    expect_json(bad_page, StatusCode::BAD_REQUEST).await;

    let bad_status = get(&app, "/api/v1/portfolios?status=deleted").await;
    expect_json(bad_status, StatusCode::BAD_REQUEST).await;

    let empty = expect_json(get(&app, "/api/v1/portfolios?page=5").await, StatusCode::OK).await;
    assert_eq!(empty["count"], 0);
    assert_eq!(empty["results"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn pagination_links_and_ordering(pool: PgPool) {
    let app = common::build_test_app(pool);
    for (email, title) in [
        ("one@example.com", "first"),
        ("two@example.com", "second"),
        ("three@example.com", "third"),
    ] {
        let user = register(&app, email, "Page", "Test").await;
        let content = publishable_portfolio(&app, &user, title).await;
        set_status(&app, &user.token, content.portfolio_id, "published").await;
    }

    let first = expect_json(
        get(&app, "/api/v1/portfolios/published?page_size=2&ordering=title").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(first["count"], 3);
    assert_eq!(first["results"][0]["title"], "first");
    assert_eq!(first["results"][1]["title"], "second");
    assert!(first["previous"].is_null());
    assert_eq!(
        first["next"],
        "/api/v1/portfolios/published?page_size=2&ordering=title&page=2"
    );

    let second = expect_json(
        get(&app, "/api/v1/portfolios/published?page=2&page_size=2&ordering=title").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(second["results"].as_array().unwrap().len(), 1);
    assert_eq!(second["results"][0]["title"], "third");
    assert!(second["next"].is_null());
    assert_eq!(
        second["previous"],
        "/api/v1/portfolios/published?page_size=2&ordering=title&page=1"
    );

    let desc = expect_json(
        get(&app, "/api/v1/portfolios/published?ordering=-title").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(desc["results"][0]["title"], "third");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn search_filters_by_member_content(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register(&app, "find@example.com", "Find", "Me").await;
    let content = publishable_portfolio(&app, &user, "findable").await;
    set_status(&app, &user.token, content.portfolio_id, "published").await;

    let hit = expect_json(
        get(&app, "/api/v1/portfolios/search?competence=rust&language=RUST&level=expert").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(hit["count"], 1);

    let miss = expect_json(
        get(&app, "/api/v1/portfolios/search?language=python").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(miss["count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stats_follow_read_access(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(&app, "st@example.com", "St", "Ats").await;
    let content = publishable_portfolio(&app, &owner, "measured").await;
    let stats_path = format!("/api/v1/portfolios/{}/stats", content.portfolio_id);

    assert_eq!(get(&app, &stats_path).await.status(), StatusCode::NOT_FOUND);

    let stats = expect_json(get_auth(&app, &stats_path, &owner.token).await, StatusCode::OK).await;
    assert_eq!(stats["general"]["status"], "draft");
    assert_eq!(stats["content"]["contacts"], 1);
    assert_eq!(stats["content"]["public_projets"], 1);
    assert_eq!(stats["competences_by_category"]["backend"], 1);
    assert_eq!(stats["projets_by_language"]["Rust"], 1);
}
