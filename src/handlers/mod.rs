//! HTTP request handlers for API endpoints.
//!
//! Handlers are the only place gateway errors turn into responses; each one
//! returns `Result<_, actix_web::Error>` and lets [`crate::error::ApiError`]
//! render itself.

pub mod health;
pub mod history;
pub mod index;
pub mod location;
pub mod metrics;
pub mod openapi;
pub mod version;
pub mod weather;

pub use health::*;
pub use history::*;
pub use index::*;
pub use location::*;
pub use metrics::*;
pub use openapi::*;
pub use version::*;
pub use weather::*;
