//! Health check endpoint handler.

use crate::{
    config::DeploymentEnvironment,
    models::HealthResponse,
    services::{history::HistoryGateway, rate_limit::RateLimiter},
};
use actix_web::{Error, Result, web};
use paperclip::actix::api_v2_operation;

/// Health check endpoint
///
/// Reports liveness plus which backends this instance was wired with. Never
/// calls third-party services, so load balancer probes stay cheap.
#[api_v2_operation(
    summary = "Health Check Endpoint",
    description = "Returns the current health status of the API in JSON format.",
    tags("Health"),
    responses(
        (status = 200, description = "Successful response", body = HealthResponse)
    )
)]
pub async fn health(
    environment: web::Data<DeploymentEnvironment>,
    limiter: web::Data<RateLimiter>,
    history: web::Data<HistoryGateway>,
) -> Result<web::Json<HealthResponse>, Error> {
    Ok(web::Json(HealthResponse {
        status: "healthy".to_string(),
        environment: environment.as_str().to_string(),
        rate_limiter: limiter.backend_name().to_string(),
        history_store: history.is_configured(),
    }))
}
