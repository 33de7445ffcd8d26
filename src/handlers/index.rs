//! API index endpoint handler.

use crate::models::{ApiEndpoints, ApiIndexResponse};
use actix_web::{Error, Result, web};
use paperclip::actix::api_v2_operation;

#[api_v2_operation(
    summary = "API Index",
    description = "Welcome message and a catalogue of the available endpoints.",
    tags("Index"),
    responses(
        (status = 200, description = "Successful response", body = ApiIndexResponse)
    )
)]
pub async fn api_index() -> Result<web::Json<ApiIndexResponse>, Error> {
    Ok(web::Json(ApiIndexResponse {
        message: "Welcome to WeatherScope API".to_string(),
        description: "Weather lookup service: location search, current conditions with a daily forecast, and search history.".to_string(),
        endpoints: ApiEndpoints {
            weather: "/api/weather?lat={latitude}&lon={longitude}".to_string(),
            location: "/api/location?q={query}&limit={limit}".to_string(),
            history: "/api/history".to_string(),
            health: "/api/health".to_string(),
            version: "/api/version".to_string(),
            documentation: "/api/spec/v2".to_string(),
        },
    }))
}
