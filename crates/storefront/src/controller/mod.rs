//! View-state controllers for the catalog and product detail pages.
//!
//! Controllers own the state a page renders from and decide when to hit the
//! catalog API. Route handlers feed them user input (search keystrokes, page
//! clicks, route parameters) and render whatever state they settle on.
//!
//! # Fetch ordering
//!
//! Every fetch intent takes a generation number from a per-controller
//! counter. A response is applied only if its generation is still the latest
//! issued, so a slow stale response can never overwrite a newer one. Superseded
//! in-flight requests are also aborted.

pub mod catalog;
pub mod detail;
pub mod views;

pub use catalog::{CatalogController, CatalogSettings, Navigation, Settled, ViewState};
pub use detail::{DetailController, DetailState};
pub use views::CatalogViews;
