//! Request inspection helpers.

pub mod http;
pub mod route;

pub use http::*;
pub use route::*;
