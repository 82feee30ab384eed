//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analytics;
pub mod audit;
pub mod auth;
pub mod categories;
pub mod expenses;

// Re-export all handlers for use in router
pub use analytics::*;
pub use audit::*;
pub use auth::*;
pub use categories::*;
pub use expenses::*;
