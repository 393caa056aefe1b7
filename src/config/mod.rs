use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Process configuration, loaded once at startup and injected through
/// application state rather than read from globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the remote data store, e.g. https://xyz.supabase.co
    pub base_url: String,
    /// Service key sent as both `apikey` and bearer credential.
    pub service_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    /// Whether token expiry is verified. Defaults to true; the legacy
    /// behavior of skipping expiry checks can be restored via
    /// JWT_VERIFY_EXP=false.
    pub verify_expiry: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),
}

impl AppConfig {
    /// Build configuration from the environment. A missing signing key or
    /// store URL is startup-fatal, not a per-request condition.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = required("JWT_KEY")?;
        let base_url = required("STORE_URL")?;
        let service_key = required("STORE_SERVICE_KEY")?;

        let port = env::var("TRIP_API_PORT")
            .or_else(|_| env::var("PORT"))
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(3000);

        let jwt_audience =
            env::var("JWT_AUDIENCE").unwrap_or_else(|_| "authenticated".to_string());

        let verify_expiry = env::var("JWT_VERIFY_EXP")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);

        Ok(Self {
            server: ServerConfig { port },
            store: StoreConfig { base_url, service_key },
            security: SecurityConfig { jwt_secret, jwt_audience, verify_expiry },
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name)),
    }
}
