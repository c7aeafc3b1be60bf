//! Firebase Authentication via the Identity Toolkit REST API.
//!
//! ```text
//! POST {base}/accounts:signInWithPassword?key={api_key}
//! POST {base}/accounts:signUp?key={api_key}
//!   { "email", "password", "returnSecureToken": true }
//!   -> { "idToken", "localId", "email", "displayName"? }
//!   !  { "error": { "code": 400, "message": "EMAIL_NOT_FOUND" } }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use shopfront_core::Email;

use super::{Credentials, IdentityError, IdentityProvider};
use crate::config::IdentityConfig;
use crate::models::{SessionToken, UserProfile, UserSession};

/// Firebase email/password authentication client.
#[derive(Clone)]
pub struct FirebaseIdentity {
    inner: Arc<FirebaseIdentityInner>,
}

struct FirebaseIdentityInner {
    client: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    id_token: String,
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl FirebaseIdentity {
    /// Create a new Firebase client.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self::with_client(
            reqwest::Client::new(),
            config.base_url.clone(),
            config.api_key.clone(),
        )
    }

    /// Create a client from an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, mut base_url: Url, api_key: SecretString) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            inner: Arc::new(FirebaseIdentityInner {
                client,
                base_url,
                api_key,
            }),
        }
    }

    fn endpoint(&self, method: &str) -> Result<Url, IdentityError> {
        let mut url = self
            .inner
            .base_url
            // A bare `accounts:signUp` would parse as a URL with scheme `accounts`
            .join(&format!("./{method}"))
            .map_err(|e| IdentityError::Provider(format!("invalid endpoint: {e}")))?;
        url.query_pairs_mut()
            .append_pair("key", self.inner.api_key.expose_secret());
        Ok(url)
    }

    async fn password_call(
        &self,
        method: &str,
        credentials: &Credentials,
    ) -> Result<UserSession, IdentityError> {
        let request = PasswordRequest {
            email: credentials.email.as_str(),
            password: credentials.password.expose_secret(),
            return_secure_token: true,
        };

        let response = self
            .inner
            .client
            .post(self.endpoint(method)?)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            tracing::warn!(status = %status, message = %message, "Identity provider rejected request");
            return Err(map_provider_error(&message));
        }

        let auth: AuthResponse = serde_json::from_str(&body)?;
        Ok(session_from(auth, &credentials.email))
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    #[instrument(skip_all, fields(email = %credentials.email))]
    async fn sign_in(&self, credentials: &Credentials) -> Result<UserSession, IdentityError> {
        self.password_call("accounts:signInWithPassword", credentials)
            .await
    }

    #[instrument(skip_all, fields(email = %credentials.email))]
    async fn sign_up(&self, credentials: &Credentials) -> Result<UserSession, IdentityError> {
        self.password_call("accounts:signUp", credentials).await
    }

    async fn sign_out(&self, _token: &SessionToken) -> Result<(), IdentityError> {
        // ID tokens are stateless; revoking refresh tokens needs admin credentials
        tracing::debug!("Firebase sign-out is client-side only");
        Ok(())
    }
}

fn session_from(auth: AuthResponse, requested: &Email) -> UserSession {
    let email = auth
        .email
        .as_deref()
        .and_then(|email| Email::parse(email).ok())
        .unwrap_or_else(|| requested.clone());

    UserSession {
        token: SessionToken::new(auth.id_token),
        user: UserProfile {
            uid: auth.local_id,
            email,
            display_name: auth.display_name.filter(|name| !name.is_empty()),
        },
    }
}

/// Map a provider error message such as `WEAK_PASSWORD : Password should be
/// at least 6 characters` to an [`IdentityError`].
fn map_provider_error(message: &str) -> IdentityError {
    let (code, detail) = message
        .split_once(" : ")
        .map_or((message.trim(), ""), |(code, detail)| (code.trim(), detail.trim()));

    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL" => {
            IdentityError::InvalidCredentials
        }
        "USER_DISABLED" => IdentityError::UserDisabled,
        "EMAIL_EXISTS" => IdentityError::EmailExists,
        "WEAK_PASSWORD" => IdentityError::WeakPassword(detail.to_string()),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => IdentityError::TooManyAttempts,
        _ => IdentityError::Provider(message.to_string()),
    }
}
