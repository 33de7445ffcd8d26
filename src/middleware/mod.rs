//! Cross-cutting middleware: request IDs and request metrics.

pub mod metrics;
pub mod request_id;

pub use metrics::*;
pub use request_id::*;
