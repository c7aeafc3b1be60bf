//! Shopfront Core - Shared types library.
//!
//! Types used by the storefront binary and its integration tests:
//! product identifiers, prices, validated email addresses and the
//! pagination arithmetic behind the catalog grid.
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async. This keeps it lightweight and trivially testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers and pagination math

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
