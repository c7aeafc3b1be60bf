//! Domain models for the storefront.
//!
//! - [`session`] - Signed-in user identity and the storage keys it lives under

pub mod session;

pub use session::{SessionToken, UserProfile, UserSession, keys as session_keys};
