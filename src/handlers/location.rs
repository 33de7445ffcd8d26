//! Location search endpoint handler.

use crate::{
    models::LocationQuery,
    services::{
        rate_limit::{RateLimiter, enforce_rate_limit},
        weather::{DEFAULT_LOCATION_LIMIT, WeatherGateway},
    },
};
use actix_web::{Error, HttpRequest, HttpResponse, Result, http::header, web};
use paperclip::actix::api_v2_operation;

/// Geocoding results change rarely; shared caches may keep them for a day.
const LOCATION_CACHE_CONTROL: &str = "public, s-maxage=86400";

#[api_v2_operation(
    summary = "Location Search Endpoint",
    description = "Resolves a place name to candidate coordinates (e.g. ?q=Springfield&limit=3), in provider ranking order. Rate limited per client.",
    tags("Location"),
    responses(
        (status = 200, description = "Matching locations", body = Vec<LocationMatch>),
        (status = 400, description = "Bad Request - Missing query or invalid limit"),
        (status = 429, description = "Too Many Requests"),
        (status = 500, description = "Internal Server Error - Geocoding provider not configured"),
        (status = 502, description = "Bad Gateway - Geocoding provider failed")
    )
)]
pub async fn search_locations(
    req: HttpRequest,
    query: web::Query<LocationQuery>,
    gateway: web::Data<WeatherGateway>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, Error> {
    let decision = enforce_rate_limit(&req, &limiter).await?;

    let matches = gateway
        .search_locations(
            query.q.as_deref().unwrap_or_default(),
            query.limit.unwrap_or(DEFAULT_LOCATION_LIMIT),
        )
        .await?;

    let mut response = HttpResponse::Ok();
    response.insert_header((header::CACHE_CONTROL, LOCATION_CACHE_CONTROL));
    for pair in decision.header_pairs() {
        response.insert_header(pair);
    }
    Ok(response.json(matches))
}
