//! Session client: mirrors the identity provider's session into session storage.
//!
//! The identity gate and the pages only ever look at storage; the provider
//! is consulted on sign-in, sign-up and sign-out.
//!
//! # Storage layout
//!
//! | key     | value                               |
//! |---------|-------------------------------------|
//! | `token` | opaque provider token               |
//! | `user`  | [`UserProfile`] serialized as JSON  |

mod storage;

pub use storage::{MemoryStorage, SessionStorage, StorageError};

use thiserror::Error;

use crate::identity::{Credentials, IdentityError, IdentityProvider};
use crate::models::{SessionToken, UserProfile, UserSession, session_keys};

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The identity provider rejected or failed the call.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Session storage could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Signs users in and out, keeping session storage in step with the provider.
pub struct SessionClient<'a> {
    identity: &'a dyn IdentityProvider,
    storage: &'a dyn SessionStorage,
}

impl<'a> SessionClient<'a> {
    /// Create a session client over a provider and a storage backend.
    #[must_use]
    pub const fn new(identity: &'a dyn IdentityProvider, storage: &'a dyn SessionStorage) -> Self {
        Self { identity, storage }
    }

    /// Sign in and persist the resulting session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Identity` with the provider's error if sign-in
    /// fails (storage is left untouched), or `SessionError::Storage` if the
    /// session cannot be persisted.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<UserSession, SessionError> {
        let session = self.identity.sign_in(credentials).await?;
        self.persist(&session).await?;
        tracing::info!(uid = %session.user.uid, "User signed in");
        Ok(session)
    }

    /// Create an account, then persist its session.
    ///
    /// # Errors
    ///
    /// Same as [`sign_in`](Self::sign_in).
    pub async fn sign_up(&self, credentials: &Credentials) -> Result<UserSession, SessionError> {
        let session = self.identity.sign_up(credentials).await?;
        self.persist(&session).await?;
        tracing::info!(uid = %session.user.uid, "User signed up");
        Ok(session)
    }

    /// Sign out with the provider and clear `token` and `user` from storage.
    ///
    /// Storage is cleared even when the provider call fails, so the identity
    /// gate closes regardless.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if storage cannot be cleared.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let token = self
            .storage
            .get_item(session_keys::TOKEN)
            .await?
            .map(SessionToken::new);

        if let Some(token) = token
            && let Err(e) = self.identity.sign_out(&token).await
        {
            tracing::warn!(error = %e, "Identity provider sign-out failed");
        }

        self.storage.remove_item(session_keys::TOKEN).await?;
        self.storage.remove_item(session_keys::USER).await?;
        tracing::info!("User signed out");
        Ok(())
    }

    /// The stored session, if any.
    ///
    /// A missing or empty token, or a `user` entry that does not parse, counts
    /// as signed out.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if storage cannot be read.
    pub async fn current(&self) -> Result<Option<UserSession>, SessionError> {
        let Some(token) = self.token().await? else {
            return Ok(None);
        };

        let Some(raw) = self.storage.get_item(session_keys::USER).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(user) => Ok(Some(UserSession { token, user })),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding malformed user profile in session");
                Ok(None)
            }
        }
    }

    /// The stored token, if present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if storage cannot be read.
    pub async fn token(&self) -> Result<Option<SessionToken>, SessionError> {
        Ok(self
            .storage
            .get_item(session_keys::TOKEN)
            .await?
            .map(SessionToken::new)
            .filter(SessionToken::is_present))
    }

    async fn persist(&self, session: &UserSession) -> Result<(), SessionError> {
        let user = serde_json::to_string(&session.user).map_err(StorageError::from)?;
        self.storage
            .set_item(session_keys::TOKEN, session.token.expose().to_string())
            .await?;
        self.storage.set_item(session_keys::USER, user).await?;
        Ok(())
    }
}
