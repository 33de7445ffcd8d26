use actix_web::HttpServer;
use std::io;
use weatherscope_api::{AppConfig, AppServices, create_app, telemetry::init_tracing};

#[actix_web::main]
async fn main() -> io::Result<()> {
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Invalid configuration: {e}");
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_tracing(&config.logging);

    // Refuses to start with a rate limiter that is not allowed in this environment
    let services = AppServices::from_config(&config).map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize services");
        io::Error::other(e.to_string())
    })?;

    tracing::info!(
        bind_address = %config.server.bind_address,
        environment = config.server.environment.as_str(),
        rate_limiter = services.limiter.backend_name(),
        metrics_enabled = config.server.metrics_enabled,
        "Server starting"
    );

    HttpServer::new(move || create_app(services.clone()))
        .bind(config.server.bind_address.as_str())?
        .run()
        .await
}
