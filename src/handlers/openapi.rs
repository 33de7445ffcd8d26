//! OpenAPI specification and app factory.

use crate::{
    config::{AppConfig, ConfigError, DeploymentEnvironment},
    error::ApiError,
    handlers::{
        api_index, create_history, delete_history, get_metrics, health, list_history,
        search_locations, version, weather,
    },
    middleware::{MetricsMiddleware, RequestIdMiddleware},
    services::{
        history::HistoryGateway, metrics::AppMetrics, rate_limit::RateLimiter,
        upstream_client::UpstreamClient, weather::WeatherGateway,
    },
};
use actix_web::{
    App, HttpRequest,
    error::{JsonPayloadError, QueryPayloadError},
    web::{JsonConfig, QueryConfig},
};
use paperclip::actix::{OpenApiExt, web};
use paperclip::v2::models::{DefaultApiRaw, Info};

/// Creates the OpenAPI specification served at `/api/spec/v2`
pub fn create_openapi_spec() -> DefaultApiRaw {
    DefaultApiRaw {
        info: Info {
            title: "WeatherScope API".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: Some(
                "Weather lookup service built with Actix and Paperclip.\n\n\
                ## Rate limiting\n\
                `/api/weather` and `/api/location` allow 5 requests per 10 seconds per client, \
                keyed on the first `X-Forwarded-For` address. Responses carry:\n\
                - `X-RateLimit-Limit`: requests allowed per window\n\
                - `X-RateLimit-Remaining`: requests left in the current window\n\
                - `X-RateLimit-Reset`: when the window resets, epoch milliseconds\n\
                \n\
                Rejected requests get `429` with `Retry-After` and a body of \
                `{error, limit, remaining, reset}`.\n\
                \n\
                ## Errors\n\
                Errors are JSON `{error, details?, upstream_status?}`. Invalid input is `400`, \
                a failing weather provider or history store is `502`, missing server \
                configuration is `500`.\n\
                \n\
                ## Caching\n\
                Weather responses may be cached for an hour (`?refresh=true` opts out). \
                Location results may be cached by shared caches for a day."
                    .into(),
            ),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Services shared by every worker.
#[derive(Clone)]
pub struct AppServices {
    pub environment: DeploymentEnvironment,
    pub weather: WeatherGateway,
    pub history: HistoryGateway,
    pub limiter: web::Data<RateLimiter>,
    /// `None` when metrics are disabled
    pub metrics: Option<AppMetrics>,
}

impl AppServices {
    /// Wire gateways and the rate limiter from configuration.
    ///
    /// Fails when the rate limiter cannot be built for the deployment
    /// environment, so a misconfigured production instance never starts.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let metrics = if config.server.metrics_enabled {
            Some(AppMetrics::new()?)
        } else {
            None
        };

        let client = UpstreamClient::new(config.upstream_client.clone(), metrics.clone())
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        let limiter =
            RateLimiter::from_config(&config.rate_limit, config.server.environment, client.clone())?;

        Ok(Self {
            environment: config.server.environment,
            weather: WeatherGateway::new(config.weather.clone(), client.clone()),
            history: HistoryGateway::new(config.history.clone(), client),
            limiter: web::Data::new(limiter),
            metrics,
        })
    }
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::validation(format!("Invalid request body: {err}")).into()
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::validation(format!("Invalid query parameters: {err}")).into()
}

/// Builds the application with every route and middleware.
///
/// Used by `main` for each worker and by integration tests.
pub fn create_app(
    services: AppServices,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let mut app = App::new()
        .wrap(RequestIdMiddleware)
        .wrap(MetricsMiddleware)
        .wrap_api_with_spec(create_openapi_spec())
        .app_data(JsonConfig::default().error_handler(json_error_handler))
        .app_data(QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::Data::new(services.environment))
        .app_data(web::Data::new(services.weather))
        .app_data(web::Data::new(services.history))
        .app_data(services.limiter);

    if let Some(metrics) = services.metrics {
        app = app.app_data(web::Data::new(metrics));
    }

    app.service(web::resource("/api").route(web::get().to(api_index)))
        .service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/api/version").route(web::get().to(version)))
        .service(web::resource("/api/metrics").route(web::get().to(get_metrics)))
        .service(web::resource("/api/weather").route(web::get().to(weather)))
        .service(web::resource("/api/location").route(web::get().to(search_locations)))
        .service(
            web::resource("/api/history")
                .route(web::get().to(list_history))
                .route(web::post().to(create_history))
                .route(web::delete().to(delete_history)),
        )
        .with_json_spec_at("/api/spec/v2")
        .build()
}
