//! Server binding, deployment environment and metrics toggles.

use super::{ConfigError, flag_var, non_empty_var};
use std::path::Path;

const LOCAL_BIND_ADDRESS: &str = "127.0.0.1:8080";
const CONTAINER_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Where the service is deployed. Production forbids the always-allow limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentEnvironment {
    #[default]
    Development,
    Production,
}

impl DeploymentEnvironment {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" | "test" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidValue {
                var: "APP_ENV",
                value: value.to_string(),
            }),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub environment: DeploymentEnvironment,
    pub metrics_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: LOCAL_BIND_ADDRESS.to_string(),
            environment: DeploymentEnvironment::Development,
            metrics_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match non_empty_var("APP_ENV") {
            Some(value) => DeploymentEnvironment::parse(&value)?,
            None => DeploymentEnvironment::default(),
        };

        let in_container = is_container_environment(
            non_empty_var("KUBERNETES_SERVICE_HOST").as_deref(),
            non_empty_var("DOCKER_CONTAINER").as_deref(),
            Path::new("/.dockerenv").exists(),
        );

        Ok(Self {
            bind_address: resolve_bind_address(non_empty_var("BIND_ADDRESS").as_deref(), in_container),
            environment,
            metrics_enabled: flag_var("METRICS_ENABLED", true),
        })
    }
}

/// Containers need to listen on every interface to be reachable from outside.
pub fn is_container_environment(
    k8s_service_host: Option<&str>,
    docker_container: Option<&str>,
    dockerenv_exists: bool,
) -> bool {
    k8s_service_host.is_some() || docker_container.is_some() || dockerenv_exists
}

/// An explicit override always wins over container detection.
pub fn resolve_bind_address(bind_override: Option<&str>, in_container: bool) -> String {
    match bind_override {
        Some(bind) => bind.to_string(),
        None if in_container => CONTAINER_BIND_ADDRESS.to_string(),
        None => LOCAL_BIND_ADDRESS.to_string(),
    }
}
