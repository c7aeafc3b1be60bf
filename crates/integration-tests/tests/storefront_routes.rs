//! Router-level tests for the identity gate, sign-in flow, catalog and
//! product pages.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;

use axum::http::StatusCode;
use shopfront_integration_tests::{TestContext, login_form, test_config};

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new();
    let response = ctx.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
    assert!(response.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_catalog_redirects_to_login_without_session() {
    let ctx = TestContext::new();
    let response = ctx.get("/", None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/login"));
}

#[tokio::test]
async fn test_htmx_request_without_session_gets_hx_redirect() {
    let ctx = TestContext::new();
    let response = ctx
        .htmx_get(
            "/catalog/00000000-0000-0000-0000-000000000000/search?q=lamp",
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers["hx-redirect"], "/login");
}

#[tokio::test]
async fn test_login_page_renders_error_message() {
    let ctx = TestContext::new();
    let response = ctx.get("/login?error=credentials", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Invalid email or password."));
}

#[tokio::test]
async fn test_login_with_wrong_password_returns_to_form() {
    let ctx = TestContext::new();
    let response = ctx
        .post_form("/login", &login_form("jane@example.com", "nope"), None)
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/login?error=credentials"));
}

#[tokio::test]
async fn test_login_with_malformed_email_returns_to_form() {
    let ctx = TestContext::new();
    let response = ctx
        .post_form("/login", &login_form("not-an-email", "whatever"), None)
        .await;
    assert_eq!(response.location(), Some("/login?error=invalid_email"));
}

#[tokio::test]
async fn test_login_opens_catalog_with_first_page() {
    let ctx = TestContext::new();
    let cookie = ctx.sign_in().await;

    let response = ctx.get("/", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Hi, Jane"));
    assert!(response.body.contains("13 products"));
    assert!(response.body.contains("<h2>Product 1</h2>"));
    assert!(response.body.contains("<h2>Lamp 6</h2>"));
    assert!(response.body.contains(r#"<p class="description">Description of item 1</p>"#));
    assert!(!response.body.contains("<h2>Product 7</h2>"));
    assert_eq!(response.body.matches("class=\"product-card\"").count(), 6);
    assert!(response.body.contains(r#"href="/product/1""#));
}

#[tokio::test]
async fn test_catalog_last_page_holds_remainder() {
    let ctx = TestContext::new();
    let cookie = ctx.sign_in().await;

    let response = ctx.get("/?page=3", Some(&cookie)).await;
    assert_eq!(response.body.matches("class=\"product-card\"").count(), 1);
    assert!(response.body.contains("<h2>Product 13</h2>"));
}

#[tokio::test]
async fn test_catalog_page_is_clamped() {
    let ctx = TestContext::new();
    let cookie = ctx.sign_in().await;

    let response = ctx.get("/?page=99", Some(&cookie)).await;
    assert!(response.body.contains(r#"aria-current="page">3</span>"#));
}

#[tokio::test]
async fn test_submitted_search_filters_catalog() {
    let ctx = TestContext::new();
    let cookie = ctx.sign_in().await;

    let response = ctx.get("/?q=lamp", Some(&cookie)).await;
    assert!(response.body.contains("4 products"));
    assert!(response.body.contains("<h2>Lamp 3</h2>"));
    assert!(!response.body.contains("<h2>Product 1</h2>"));
    assert!(response.body.contains(r#"value="lamp""#));
}

#[tokio::test]
async fn test_search_fragment_returns_results() {
    let ctx = TestContext::new();
    let cookie = ctx.sign_in().await;

    let response = ctx
        .htmx_get(
            "/catalog/6f1c1c1e-8d9e-4a36-9f6b-1d2c3e4f5a6b/search?q=lamp",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"id="catalog-results""#));
    assert!(response.body.contains("<h2>Lamp 12</h2>"));
    assert!(!response.body.contains("<html"));
}

#[tokio::test]
async fn test_search_without_matches_shows_empty_state() {
    let ctx = TestContext::new();
    let cookie = ctx.sign_in().await;

    let response = ctx
        .htmx_get(
            "/catalog/6f1c1c1e-8d9e-4a36-9f6b-1d2c3e4f5a6b/search?q=sofa",
            Some(&cookie),
        )
        .await;
    assert!(response.body.contains("No products match"));
}

#[tokio::test]
async fn test_page_fragment_rebuilds_expired_view() {
    let ctx = TestContext::new();
    let cookie = ctx.sign_in().await;

    let response = ctx
        .htmx_get(
            "/catalog/0b7a4c55-1111-4e2f-8a3b-9c8d7e6f5a4b/page/2?q=",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<h2>Product 7</h2>"));
    assert_eq!(response.body.matches("class=\"product-card\"").count(), 6);
}

#[tokio::test]
async fn test_logout_closes_the_gate() {
    let ctx = TestContext::new();
    let cookie = ctx.sign_in().await;
    assert_eq!(ctx.get("/", Some(&cookie)).await.status, StatusCode::OK);

    let response = ctx.post_form("/logout", "", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/login"));
    assert_eq!(ctx.identity.sign_outs.load(Ordering::SeqCst), 1);

    let response = ctx.get("/", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/login"));
}

#[tokio::test]
async fn test_signup_signs_new_account_in() {
    let ctx = TestContext::new();
    let response = ctx
        .post_form(
            "/signup",
            "email=new%40example.com&password=s3cret-pass&password_confirm=s3cret-pass",
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/"));

    let cookie = response.session_cookie().unwrap();
    assert_eq!(ctx.get("/", Some(&cookie)).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_signup_rejects_mismatched_passwords() {
    let ctx = TestContext::new();
    let response = ctx
        .post_form(
            "/signup",
            "email=new%40example.com&password=s3cret-pass&password_confirm=other-pass",
            None,
        )
        .await;
    assert_eq!(response.location(), Some("/signup?error=password_mismatch"));
}

#[tokio::test]
async fn test_signup_with_existing_email() {
    let ctx = TestContext::new();
    let response = ctx
        .post_form(
            "/signup",
            "email=jane%40example.com&password=s3cret-pass&password_confirm=s3cret-pass",
            None,
        )
        .await;
    assert_eq!(response.location(), Some("/signup?error=email_taken"));
}

#[tokio::test]
async fn test_login_attempts_are_rate_limited() {
    let ctx = TestContext::new();
    let form = login_form("jane@example.com", "nope");

    for _ in 0..5 {
        let response = ctx.post_form("/login", &form, None).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
    }

    let response = ctx.post_form("/login", &form, None).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);

    // The login page itself is not limited
    assert_eq!(ctx.get("/login", None).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_product_detail_is_guarded_by_default() {
    let ctx = TestContext::new();
    let response = ctx.get("/product/1", None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/login"));
}

#[tokio::test]
async fn test_product_detail_page_and_fragment() {
    let ctx = TestContext::new();
    let cookie = ctx.sign_in().await;

    let page = ctx.get("/product/4", Some(&cookie)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Loading product"));
    assert!(page.body.contains(r#"hx-get="/product/4/details""#));

    let details = ctx.htmx_get("/product/4/details", Some(&cookie)).await;
    assert_eq!(details.status, StatusCode::OK);
    assert!(details.body.contains("<h1>Product 4</h1>"));
    assert!(details.body.contains("$40.99"));
    assert!(details.body.contains("Description of item 4"));
    assert!(details.body.contains("home-decoration"));
}

#[tokio::test]
async fn test_missing_product_stays_on_placeholder() {
    let ctx = TestContext::new();
    let cookie = ctx.sign_in().await;

    let details = ctx.htmx_get("/product/999/details", Some(&cookie)).await;
    assert_eq!(details.status, StatusCode::OK);
    assert!(details.body.contains("Loading product"));
    assert!(!details.body.contains("hx-get"));
}

#[tokio::test]
async fn test_product_detail_can_be_public() {
    let mut config = test_config();
    config.guard_product_detail = false;
    let ctx = TestContext::with_config(config);

    assert_eq!(ctx.get("/product/2", None).await.status, StatusCode::OK);
    assert_eq!(ctx.get("/", None).await.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let ctx = TestContext::new();
    let response = ctx.get("/cart", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, "Not found: /cart");
}
