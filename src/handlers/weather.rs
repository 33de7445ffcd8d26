//! Weather endpoint handler.

use crate::{
    models::{Coordinates, WeatherQuery},
    services::{
        rate_limit::{RateLimiter, enforce_rate_limit},
        weather::{Freshness, WeatherGateway},
    },
};
use actix_web::{Error, HttpRequest, HttpResponse, Result, http::header, web};
use paperclip::actix::api_v2_operation;

/// Weather endpoint
///
/// Returns current conditions plus a daily forecast for a coordinate pair.
/// Both upstream lookups must succeed; there are no partial responses.
#[api_v2_operation(
    summary = "Weather Information Endpoint",
    description = "Returns current conditions and up to five daily forecast summaries for the given latitude/longitude (e.g. ?lat=51.5&lon=-0.12). Pass refresh=true to bypass cached data. Rate limited per client.",
    tags("Weather"),
    responses(
        (status = 200, description = "Successful response", body = WeatherPayload),
        (status = 400, description = "Bad Request - Missing or out-of-range coordinates"),
        (status = 429, description = "Too Many Requests"),
        (status = 500, description = "Internal Server Error - Weather provider not configured"),
        (status = 502, description = "Bad Gateway - Weather provider failed")
    )
)]
pub async fn weather(
    req: HttpRequest,
    query: web::Query<WeatherQuery>,
    gateway: web::Data<WeatherGateway>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, Error> {
    let decision = enforce_rate_limit(&req, &limiter).await?;

    let coordinates = Coordinates::new(query.lat, query.lon)?;
    let freshness = Freshness::from_refresh_flag(query.refresh.as_deref());

    let payload = gateway.fetch_weather(coordinates, freshness).await?;

    tracing::debug!(
        lat = coordinates.lat,
        lon = coordinates.lon,
        forecast_days = payload.forecast.len(),
        ?freshness,
        "Returning weather"
    );

    let mut response = HttpResponse::Ok();
    response.insert_header((header::CACHE_CONTROL, freshness.response_cache_control()));
    for pair in decision.header_pairs() {
        response.insert_header(pair);
    }
    Ok(response.json(payload))
}
