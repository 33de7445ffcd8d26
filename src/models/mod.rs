//! Data models: provider payloads, derived weather shapes, history records and
//! the request/response types of the HTTP surface.

pub mod api;
pub mod history;
pub mod location;
pub mod weather;

pub use api::*;
pub use history::*;
pub use location::*;
pub use weather::*;
