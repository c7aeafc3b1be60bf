//! Integration test harness for Shopfront.
//!
//! Tests drive the real storefront [`Router`] in-process with
//! `tower::ServiceExt::oneshot`, backed by in-memory fakes of the catalog API
//! and identity provider. No network or external services are needed.
//!
//! ```rust,ignore
//! let ctx = TestContext::new();
//! let cookie = ctx.sign_in().await;
//! let page = ctx.get("/", Some(&cookie)).await;
//! assert_eq!(page.status, StatusCode::OK);
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use tower::ServiceExt;
use url::Url;

use shopfront::catalog::{Catalog, CatalogError, Product};
use shopfront::config::{CatalogConfig, IdentityConfig, StorefrontConfig};
use shopfront::identity::{Credentials, IdentityError, IdentityProvider};
use shopfront::models::{SessionToken, UserProfile, UserSession};
use shopfront::state::AppState;
use shopfront_core::{Price, ProductId};

/// Email of the account the fake identity provider knows.
pub const TEST_EMAIL: &str = "jane@example.com";

/// Password the fake identity provider accepts.
pub const TEST_PASSWORD: &str = "correct horse";

/// Number of products in the fake catalog.
pub const PRODUCT_COUNT: u32 = 13;

/// Catalog of [`PRODUCT_COUNT`] products titled `Product 1`..`Product 13`,
/// with every third one a lamp.
#[derive(Debug, Default)]
pub struct FakeCatalog;

impl FakeCatalog {
    fn product(id: u32) -> Product {
        let title = if id % 3 == 0 {
            format!("Lamp {id}")
        } else {
            format!("Product {id}")
        };
        Product {
            id: ProductId::new(id),
            title,
            description: format!("Description of item {id}"),
            price: Price::from_cents(i64::from(id) * 1000 + 99),
            category: "home-decoration".to_string(),
            thumbnail: Some(format!("https://cdn.example.com/{id}.png")),
            brand: Some("Acme".to_string()),
            rating: Some(4.2),
            stock: Some(id),
            discount_percentage: None,
            images: Vec::new(),
        }
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_all(&self) -> Result<Vec<Product>, CatalogError> {
        Ok((1..=PRODUCT_COUNT).map(Self::product).collect())
    }

    async fn search(&self, term: &str) -> Result<Vec<Product>, CatalogError> {
        let term = term.to_lowercase();
        Ok((1..=PRODUCT_COUNT)
            .map(Self::product)
            .filter(|p| p.title.to_lowercase().contains(&term))
            .collect())
    }

    async fn get_by_id(&self, id: ProductId) -> Result<Product, CatalogError> {
        if (1..=PRODUCT_COUNT).contains(&id.as_u32()) {
            Ok(Self::product(id.as_u32()))
        } else {
            Err(CatalogError::NotFound(id.to_string()))
        }
    }
}

/// Identity provider that knows one account and counts sign-outs.
#[derive(Debug, Default)]
pub struct FakeIdentity {
    pub sign_outs: AtomicUsize,
}

impl FakeIdentity {
    fn session_for(credentials: &Credentials) -> UserSession {
        UserSession {
            token: SessionToken::new(format!("id-token-{}", credentials.email)),
            user: UserProfile {
                uid: "uid-jane".to_string(),
                email: credentials.email.clone(),
                display_name: Some("Jane".to_string()),
            },
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self, credentials: &Credentials) -> Result<UserSession, IdentityError> {
        if credentials.email.as_str() == TEST_EMAIL
            && credentials.password.expose_secret() == TEST_PASSWORD
        {
            Ok(Self::session_for(credentials))
        } else {
            Err(IdentityError::InvalidCredentials)
        }
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<UserSession, IdentityError> {
        if credentials.email.as_str() == TEST_EMAIL {
            return Err(IdentityError::EmailExists);
        }
        Ok(Self::session_for(credentials))
    }

    async fn sign_out(&self, _token: &SessionToken) -> Result<(), IdentityError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Configuration pointing at unreachable services; fakes replace them.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        catalog: CatalogConfig {
            base_url: Url::parse("http://catalog.invalid").unwrap(),
            page_size: NonZeroUsize::new(6).unwrap(),
            search_debounce: Duration::from_millis(20),
        },
        identity: IdentityConfig {
            base_url: Url::parse("http://identity.invalid/v1").unwrap(),
            api_key: SecretString::from("AIzaSyTestKey0123456789abcdef"),
        },
        guard_product_detail: true,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A response with its body read to a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// The session cookie set by this response, as a `name=value` pair.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(shopfront::middleware::session::SESSION_COOKIE_NAME))
            .and_then(|v| v.split(';').next())
            .map(String::from)
    }
}

/// A storefront router over fakes.
pub struct TestContext {
    pub app: Router,
    pub identity: Arc<FakeIdentity>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Storefront with default test configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Storefront with a custom configuration.
    #[must_use]
    pub fn with_config(config: StorefrontConfig) -> Self {
        let identity = Arc::new(FakeIdentity::default());
        let state = AppState::with_services(config, Arc::new(FakeCatalog), identity.clone());
        Self {
            app: shopfront::app(state),
            identity,
        }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// `GET path`, optionally with a session cookie.
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        self.send(get_request(path, cookie, false)).await
    }

    /// `GET path` as HTMX would send it.
    pub async fn htmx_get(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        self.send(get_request(path, cookie, true)).await
    }

    /// `POST path` with a url-encoded form body.
    pub async fn post_form(&self, path: &str, form: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            // Rate limiter keys on client IP
            .header("x-forwarded-for", "203.0.113.10");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_string())).unwrap())
            .await
    }

    /// Log in as the test account and return the session cookie.
    pub async fn sign_in(&self) -> String {
        let response = self
            .post_form("/login", &login_form(TEST_EMAIL, TEST_PASSWORD), None)
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.location(), Some("/"));
        response.session_cookie().unwrap()
    }
}

/// Url-encoded login form body.
#[must_use]
pub fn login_form(email: &str, password: &str) -> String {
    format!(
        "email={}&password={}",
        encode(email),
        encode(password)
    )
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn get_request(path: &str, cookie: Option<&str>, htmx: bool) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    if htmx {
        builder = builder.header("hx-request", "true");
    }
    builder.body(Body::empty()).unwrap()
}
