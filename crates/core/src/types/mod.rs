//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod pagination;
pub mod price;

pub use email::{Email, EmailError};
pub use id::ProductId;
pub use pagination::Pagination;
pub use price::Price;
