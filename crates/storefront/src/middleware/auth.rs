//! Identity gate and session extractors.
//!
//! The gate only checks that session storage holds a non-empty `token`. It
//! never calls the identity provider and never verifies expiry.

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderMap, HeaderValue, StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{SessionToken, UserProfile, session_keys};
use crate::session::{SessionStorage, StorageError};

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/login";

/// Outcome of an identity gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// A token is present; let the request through.
    Allow,
    /// No usable token; send the visitor to the login page.
    RedirectToLogin,
}

/// Decide whether a visitor with this storage may pass.
///
/// # Errors
///
/// Returns an error if the storage backend cannot be read.
pub async fn check_gate(storage: &dyn SessionStorage) -> Result<GateDecision, StorageError> {
    let token = storage
        .get_item(session_keys::TOKEN)
        .await?
        .map(SessionToken::new);

    Ok(match token {
        Some(token) if token.is_present() => GateDecision::Allow,
        _ => GateDecision::RedirectToLogin,
    })
}

/// Error returned when a guarded route is requested without a session.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for full page loads).
    RedirectToLogin,
    /// Ask HTMX to navigate the whole page to the login page.
    HtmxRedirect,
}

impl AuthRejection {
    fn for_request(headers: &HeaderMap) -> Self {
        if is_htmx(headers) {
            Self::HtmxRedirect
        } else {
            Self::RedirectToLogin
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::HtmxRedirect => (
                StatusCode::UNAUTHORIZED,
                [("hx-redirect", HeaderValue::from_static(LOGIN_PATH))],
            )
                .into_response(),
        }
    }
}

/// Whether the request was issued by HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Middleware guarding routes behind a stored session token.
///
/// Apply with `route_layer(axum::middleware::from_fn(require_session))`.
pub async fn require_session(session: Session, request: Request, next: Next) -> Response {
    match check_gate(&session).await {
        Ok(GateDecision::Allow) => next.run(request).await,
        Ok(GateDecision::RedirectToLogin) => {
            tracing::debug!(path = %request.uri().path(), "No session, redirecting to login");
            AuthRejection::for_request(request.headers()).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Session unreadable, redirecting to login");
            AuthRejection::for_request(request.headers()).into_response()
        }
    }
}

/// Extractor that optionally gets the signed-in user's profile.
///
/// Does not reject the request if nobody is signed in or the stored profile
/// is malformed.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}!", u.greeting_name()),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct CurrentUser(pub Option<UserProfile>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self(None));
        };

        let user = session
            .get_item(session_keys::USER)
            .await
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str::<UserProfile>(&raw).ok());

        Ok(Self(user))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::MemoryStorage;

    #[tokio::test]
    async fn test_gate_redirects_without_token() {
        let storage = MemoryStorage::new();
        assert_eq!(
            check_gate(&storage).await.unwrap(),
            GateDecision::RedirectToLogin
        );
    }

    #[tokio::test]
    async fn test_gate_allows_any_non_empty_token() {
        let storage = MemoryStorage::new();
        storage
            .set_item(session_keys::TOKEN, "expired-but-present".to_string())
            .await
            .unwrap();
        assert_eq!(check_gate(&storage).await.unwrap(), GateDecision::Allow);
    }

    #[tokio::test]
    async fn test_gate_allows_whitespace_token() {
        let storage = MemoryStorage::new();
        storage
            .set_item(session_keys::TOKEN, "  ".to_string())
            .await
            .unwrap();
        assert_eq!(check_gate(&storage).await.unwrap(), GateDecision::Allow);
    }

    #[tokio::test]
    async fn test_gate_rejects_empty_token() {
        let storage = MemoryStorage::new();
        storage
            .set_item(session_keys::TOKEN, String::new())
            .await
            .unwrap();
        assert_eq!(
            check_gate(&storage).await.unwrap(),
            GateDecision::RedirectToLogin
        );
    }

    #[test]
    fn test_rejection_responses() {
        let response = AuthRejection::RedirectToLogin.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], LOGIN_PATH);

        let response = AuthRejection::HtmxRedirect.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["hx-redirect"], LOGIN_PATH);
    }

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("hx-request", HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
        assert!(matches!(
            AuthRejection::for_request(&headers),
            AuthRejection::HtmxRedirect
        ));
    }
}
