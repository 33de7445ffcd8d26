//! Route pattern extraction for metric labels.

use actix_web::dev::ServiceRequest;

/// Matched route pattern, so metric labels stay bounded.
///
/// Unmatched paths are grouped under `/unknown`.
pub fn extract_route_pattern(req: &ServiceRequest) -> String {
    req.match_pattern()
        .filter(|pattern| pattern.starts_with('/'))
        .unwrap_or_else(|| "/unknown".to_string())
}
