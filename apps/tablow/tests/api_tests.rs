//! Integration tests for the Tablow HTTP API.
//!
//! Each test serves the demo tables from its own in-memory SQLite database.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::num::NonZeroU32;
use tablow::api::{AUTH_REALM, Credentials, EditGuard, MountError, TableRouter};
use tablow::cli::demo_router;
use tablow::demo::{self, User};
use tablow::store::{MEMORY_URL, Store};
use tablow_core::{TableView, ViewError};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// In-memory store with the seeded demo table.
async fn seeded_store() -> Store {
    let store = Store::connect(MEMORY_URL).await.unwrap();
    demo::install(&store).await.unwrap();
    store
}

async fn server_with(guard: EditGuard) -> TestServer {
    let app = demo_router(seeded_store().await, guard, false).unwrap();
    TestServer::new(app).unwrap()
}

async fn server() -> TestServer {
    server_with(EditGuard::open()).await
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("'{needle}' not found in page"))
}

fn basic_auth(raw: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Basic {}", STANDARD.encode(raw))).unwrap()
}

// =============================================================================
// LISTING TESTS
// =============================================================================

#[tokio::test]
async fn test_list_renders_all_rows_in_key_order() {
    let server = server().await;

    let response = server.get("/users").await;
    response.assert_status_ok();
    let page = response.text();

    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("<h1>Dynamic Table</h1>"));
    assert!(position(&page, "<td>Alice</td>") < position(&page, "<td>Bob</td>"));
    assert!(position(&page, "<td>Bob</td>") < position(&page, "<td>Charlie</td>"));
    assert!(!page.contains("Actions"));
}

#[tokio::test]
async fn test_dropdown_filter_restricts_rows() {
    let server = server().await;

    let page = server.get("/users?name=Alice").await.text();

    assert!(page.contains("<td>Alice</td>"));
    assert!(!page.contains("<td>Bob</td>"));
    assert!(!page.contains("<td>Charlie</td>"));
    assert!(page.contains(r#"<option value="Alice" selected>Alice</option>"#));
}

#[tokio::test]
async fn test_empty_filter_means_all() {
    let server = server().await;

    let page = server.get("/users?name=").await.text();

    assert!(page.contains("<td>Alice</td>"));
    assert!(page.contains("<td>Bob</td>"));
    assert!(page.contains("<td>Charlie</td>"));
}

#[tokio::test]
async fn test_checkbox_filter_keeps_active_rows() {
    let server = server().await;

    let page = server.get("/users?active=on").await.text();

    assert!(page.contains("<td>Alice</td>"));
    assert!(!page.contains("<td>Bob</td>"));
    assert!(page.contains("<td>Charlie</td>"));
    assert!(page.contains(r#"value="on" checked"#));
}

#[tokio::test]
async fn test_sort_descending_by_age() {
    let server = server().await;

    let page = server.get("/users?sort=-age").await.text();

    // Charlie (35), Alice (30), Bob (25)
    assert!(position(&page, "<td>Charlie</td>") < position(&page, "<td>Alice</td>"));
    assert!(position(&page, "<td>Alice</td>") < position(&page, "<td>Bob</td>"));
    assert!(page.contains("Age</a>▼"));
}

#[tokio::test]
async fn test_sort_links_keep_filters() {
    let server = server().await;

    let page = server.get("/users?active=on&sort=name").await.text();

    assert!(page.contains(r#"href="?sort=-name&amp;active=on""#));
    assert!(page.contains(r#"href="?sort=age&amp;active=on""#));
}

#[tokio::test]
async fn test_unlisted_sort_is_ignored() {
    let server = server().await;

    let response = server.get("/users?sort=active").await;
    response.assert_status_ok();
    let page = response.text();

    assert!(position(&page, "<td>Alice</td>") < position(&page, "<td>Bob</td>"));
    assert!(position(&page, "<td>Bob</td>") < position(&page, "<td>Charlie</td>"));
}

#[tokio::test]
async fn test_hostile_filter_value_matches_nothing() {
    let server = server().await;

    let response = server.get("/users?name=%27%20OR%201%3D1%20--").await;
    response.assert_status_ok();
    let page = response.text();

    assert!(page.contains("No rows"));
    assert!(!page.contains("<td>Alice</td>"));
}

#[tokio::test]
async fn test_missing_table_is_server_error() {
    let store = Store::connect(MEMORY_URL).await.unwrap();
    let app = demo_router(store, EditGuard::open(), true).unwrap();
    let server = TestServer::new(app).unwrap();

    let response = server.get("/users").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().contains("Failed to fetch data"));
}

// =============================================================================
// EDIT TESTS
// =============================================================================

#[tokio::test]
async fn test_editable_view_renders_edit_rows() {
    let server = server().await;

    let page = server.get("/users/edit").await.text();

    assert!(page.contains("<th>Actions</th>"));
    assert!(page.contains(r#"<form id="edit-form-1-edit-users" method="POST">"#));
    assert!(page.contains(r#"<input type="hidden" name="id" value="2">"#));
    assert!(page.contains(r#"name="col_name" value="Bob""#));
}

#[tokio::test]
async fn test_edit_updates_row_and_redirects() {
    let server = server().await;

    let response = server
        .post("/users/edit")
        .form(&vec![("id", "2"), ("col_name", "Robert"), ("col_age", "26")])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header(header::LOCATION), "/users/edit");

    let page = server.get("/users").await.text();
    assert!(page.contains("<td>Robert</td>"));
    assert!(page.contains("<td>26</td>"));
    assert!(!page.contains("<td>Bob</td>"));
}

#[tokio::test]
async fn test_edit_skips_empty_values() {
    let server = server().await;

    server
        .post("/users/edit")
        .form(&vec![("id", "1"), ("col_name", ""), ("col_age", "31")])
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let page = server.get("/users?name=Alice").await.text();
    assert!(page.contains("<td>Alice</td>"));
    assert!(page.contains("<td>31</td>"));
}

#[tokio::test]
async fn test_edit_redirect_keeps_query() {
    let server = server().await;

    let response = server
        .post("/users/edit?name=Bob&sort=-age")
        .form(&vec![("id", "2"), ("col_age", "40")])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(
        response.header(header::LOCATION),
        "/users/edit?name=Bob&sort=-age"
    );
}

#[tokio::test]
async fn test_edit_without_id_is_rejected() {
    let server = server().await;

    let response = server
        .post("/users/edit")
        .form(&vec![("col_name", "Nobody")])
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().contains("Missing record ID"));
}

#[tokio::test]
async fn test_saving_prefilled_form_keeps_table_readable() {
    let server = server().await;

    let page = server.get("/users/edit").await.text();
    assert!(page.contains(r#"name="col_active" value="true""#));

    // Every input as rendered for Alice, with only the name changed
    server
        .post("/users/edit")
        .form(&vec![
            ("id", "1"),
            ("col_name", "Alicia"),
            ("col_age", "30"),
            ("col_active", "true"),
        ])
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let response = server.get("/users").await;
    response.assert_status_ok();
    let page = response.text();
    assert!(page.contains("<td>Alicia</td>"));
    assert!(page.contains("<td>true</td>"));
    server.get("/users/edit").await.assert_status_ok();

    // Stored as a real boolean: the checkbox filter still matches it
    let page = server.get("/users?active=on").await.text();
    assert!(page.contains("<td>Alicia</td>"));
}

#[tokio::test]
async fn test_boolean_edit_flips_flag() {
    let server = server().await;

    server
        .post("/users/edit")
        .form(&vec![("id", "2"), ("col_active", "true")])
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let page = server.get("/users?active=on").await.text();
    assert!(page.contains("<td>Bob</td>"));
}

#[tokio::test]
async fn test_mistyped_edit_is_rejected() {
    let server = server().await;

    let response = server
        .post("/users/edit")
        .form(&vec![("id", "2"), ("col_age", "abc")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let page = response.text();
    assert!(page.contains("invalid value"));
    assert!(page.contains("an integer"));

    let response = server
        .post("/users/edit")
        .form(&vec![("id", "2"), ("col_name", "Robert"), ("col_active", "maybe")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Nothing was written
    let response = server.get("/users").await;
    response.assert_status_ok();
    let page = response.text();
    assert!(page.contains("<td>Bob</td>"));
    assert!(page.contains("<td>25</td>"));
}

#[tokio::test]
async fn test_non_form_body_gets_error_page() {
    let server = server().await;

    let response = server.post("/users/edit").text("id=1&col_name=Zed").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let page = response.text();
    assert!(page.contains("<h1>Something went wrong</h1>"));
    assert!(page.contains("malformed form"));
}

#[tokio::test]
async fn test_read_only_view_refuses_posts() {
    let server = server().await;

    let response = server
        .post("/users")
        .form(&vec![("id", "1"), ("col_name", "Mallory")])
        .await;

    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_edit_requires_configured_credentials() {
    let guard = EditGuard::open().with_credentials(Credentials::parse("admin:secret").unwrap());
    let server = server_with(guard).await;

    let response = server
        .post("/users/edit")
        .form(&vec![("id", "1"), ("col_name", "Mallory")])
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.header(header::WWW_AUTHENTICATE), AUTH_REALM);

    let response = server
        .post("/users/edit")
        .add_header(header::AUTHORIZATION, basic_auth("admin:secret"))
        .form(&vec![("id", "1"), ("col_name", "Alicia")])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);

    // Listing stays open
    server.get("/users").await.assert_status_ok();
}

#[tokio::test]
async fn test_edit_rate_limit() {
    let guard = EditGuard::open().with_rate_limit(NonZeroU32::MIN);
    let server = server_with(guard).await;

    server
        .post("/users/edit")
        .form(&vec![("id", "1"), ("col_age", "31")])
        .await
        .assert_status(StatusCode::SEE_OTHER);

    server
        .post("/users/edit")
        .form(&vec![("id", "1"), ("col_age", "32")])
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

// =============================================================================
// ROUTER TESTS
// =============================================================================

#[tokio::test]
async fn test_index_lists_mounted_tables() {
    let server = server().await;

    let page = server.get("/").await.text();

    assert!(page.contains(r#"<a href="/users">Dynamic Table</a>"#));
    assert!(page.contains(r#"<a href="/users/edit">Edit Users</a> (editable)"#));
}

#[tokio::test]
async fn test_health_check() {
    let server = server().await;

    let response = server.get("/health").await;

    response.assert_status_ok();
    response.assert_json(&serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_mount_rejects_bad_configuration() {
    let store = seeded_store().await;

    let err = TableRouter::new(store.clone())
        .table::<User>("/", demo::users_view())
        .err();
    assert_eq!(err, Some(MountError::ReservedPath("/".to_string())));

    let err = TableRouter::new(store.clone())
        .table::<User>("users", demo::users_view())
        .err();
    assert_eq!(err, Some(MountError::InvalidPath("users".to_string())));

    let err = TableRouter::new(store.clone())
        .table::<User>("/users", demo::users_view())
        .and_then(|r| r.table::<User>("/users", demo::editable_users_view()))
        .err();
    assert_eq!(err, Some(MountError::DuplicatePath("/users".to_string())));

    let err = TableRouter::new(store)
        .table::<User>("/empty", TableView::new("Empty"))
        .err();
    assert_eq!(
        err,
        Some(MountError::View(ViewError::NoColumns("Empty".to_string())))
    );
}
