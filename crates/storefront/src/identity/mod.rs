//! Third-party identity provider.
//!
//! Sign-in, sign-up and sign-out are delegated entirely to the provider;
//! the storefront never sees password hashes. [`IdentityProvider`] is the
//! seam, [`FirebaseIdentity`] the production implementation.

mod firebase;

pub use firebase::FirebaseIdentity;

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use shopfront_core::Email;

use crate::models::{SessionToken, UserSession};

/// Email and password entered on the login or sign-up form.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: Email,
    pub password: SecretString,
}

impl Credentials {
    /// Bundle an email and password.
    #[must_use]
    pub fn new(email: Email, password: impl Into<String>) -> Self {
        Self {
            email,
            password: SecretString::from(password.into()),
        }
    }
}

/// Errors reported by the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Unknown email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but has been disabled.
    #[error("user disabled")]
    UserDisabled,

    /// Sign-up with an email that already has an account.
    #[error("email already registered")]
    EmailExists,

    /// Password rejected by the provider's policy.
    #[error("password too weak: {0}")]
    WeakPassword(String),

    /// The provider is throttling this client.
    #[error("too many attempts, try again later")]
    TooManyAttempts,

    /// Any other provider-reported failure.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// HTTP request failed. The request URL is stripped since it carries the
    /// API key.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Response body was not the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}

impl IdentityError {
    /// Short code passed to the login/sign-up pages as `?error=`.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "credentials",
            Self::UserDisabled => "disabled",
            Self::EmailExists => "email_taken",
            Self::WeakPassword(_) => "weak_password",
            Self::TooManyAttempts => "too_many_attempts",
            Self::Provider(_) | Self::Http(_) | Self::Parse(_) => "provider",
        }
    }
}

/// Account operations offered by the identity service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in with email and password.
    async fn sign_in(&self, credentials: &Credentials) -> Result<UserSession, IdentityError>;

    /// Create an account and sign it in.
    async fn sign_up(&self, credentials: &Credentials) -> Result<UserSession, IdentityError>;

    /// End the provider-side session for `token`.
    async fn sign_out(&self, token: &SessionToken) -> Result<(), IdentityError>;
}
