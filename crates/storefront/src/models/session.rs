//! Session-related types.
//!
//! Types stored in the visitor's session after signing in.

use core::fmt;

use serde::{Deserialize, Serialize};

use shopfront_core::Email;

/// Opaque token issued by the identity provider.
///
/// Its presence in session storage is the only thing the identity gate
/// checks; it is never validated or refreshed. `Debug` is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token.
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// The raw token value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// A token is usable when it is non-empty.
    #[must_use]
    pub fn is_present(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// Profile of the signed-in user, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Provider-assigned user ID.
    pub uid: String,
    /// Sign-in email address.
    pub email: Email,
    /// Display name, if the account has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl UserProfile {
    /// Name to greet the user with.
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.email.as_str())
    }
}

/// A signed-in session: the provider token plus the user's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub token: SessionToken,
    pub user: UserProfile,
}

/// Session storage keys.
pub mod keys {
    /// Key for the identity provider token.
    pub const TOKEN: &str = "token";

    /// Key for the serialized [`UserProfile`](super::UserProfile) JSON.
    pub const USER: &str = "user";
}
