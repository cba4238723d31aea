use std::env;
use std::net::{IpAddr, SocketAddr};

use crate::matching::{FactorWeights, WeightsError};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub matching: MatchingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let batch_workers = positive_from_env("MATCHING_BATCH_WORKERS", DEFAULT_BATCH_WORKERS)?;
        let default_top_limit = positive_from_env("MATCHING_TOP_LIMIT", DEFAULT_TOP_LIMIT)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            matching: MatchingConfig {
                weights: FactorWeights::STANDARD,
                batch_workers,
                default_top_limit,
            }
            .validated()?,
        })
    }
}

fn positive_from_env(key: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::InvalidCount { key, value: raw }),
        },
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

pub const DEFAULT_BATCH_WORKERS: usize = 4;
pub const DEFAULT_TOP_LIMIT: usize = 5;

/// Scoring weights and throughput dials for the matching engine.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingConfig {
    pub weights: FactorWeights,
    /// Concurrent users processed by a batch recompute.
    pub batch_workers: usize,
    /// Number of matches returned when a caller gives no limit.
    pub default_top_limit: usize,
}

impl MatchingConfig {
    pub fn validated(self) -> Result<Self, ConfigError> {
        let weights = self.weights.validated()?;
        if self.batch_workers == 0 {
            return Err(ConfigError::InvalidCount {
                key: "MATCHING_BATCH_WORKERS",
                value: "0".to_string(),
            });
        }
        if self.default_top_limit == 0 {
            return Err(ConfigError::InvalidCount {
                key: "MATCHING_TOP_LIMIT",
                value: "0".to_string(),
            });
        }
        Ok(Self { weights, ..self })
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            weights: FactorWeights::STANDARD,
            batch_workers: DEFAULT_BATCH_WORKERS,
            default_top_limit: DEFAULT_TOP_LIMIT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost {
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("{key} must be a positive integer (found '{value}')")]
    InvalidCount { key: &'static str, value: String },
    #[error(transparent)]
    Weights(#[from] WeightsError),
}
