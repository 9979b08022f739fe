use crate::analytics::{AnalyticsEngine, QuadrantThresholds};
use crate::economics::ChannelEconomics;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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
    pub engine: EngineConfig,
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
        let format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw)?,
            Err(_) => LogFormat::Compact,
        };
        let ansi = match env::var("APP_LOG_ANSI") {
            Ok(raw) => parse_flag("APP_LOG_ANSI", &raw)?,
            Err(_) => false,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format,
                ansi,
            },
            engine: EngineConfig::from_env()?,
        })
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Full,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "full" | "pretty" => Ok(Self::Full),
            _ => Err(ConfigError::InvalidLogFormat(raw.to_string())),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
    pub ansi: bool,
}

/// Population defaults and tunable reducer thresholds.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub population_size: usize,
    pub seed: Option<u64>,
    pub quadrant: QuadrantThresholds,
}

impl EngineConfig {
    pub const DEFAULT_POPULATION_SIZE: usize = 1_000;
    pub const MAX_POPULATION_SIZE: usize = 100_000;

    fn from_env() -> Result<Self, ConfigError> {
        let population_size = match env::var("LEAD_POPULATION_SIZE") {
            Ok(raw) => Self::checked_population_size(
                raw.trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidPopulationSize(raw.clone()))?,
            )?,
            Err(_) => Self::DEFAULT_POPULATION_SIZE,
        };

        let seed = match env::var("LEAD_SEED") {
            Ok(raw) if raw.trim().is_empty() => None,
            Ok(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidSeed(raw.clone()))?,
            ),
            Err(_) => None,
        };

        let defaults = QuadrantThresholds::default();
        let quadrant = QuadrantThresholds {
            min_conversion_rate: threshold_var(
                "QUADRANT_MIN_CONVERSION_RATE",
                defaults.min_conversion_rate,
            )?,
            max_cost_per_high_quality_lead: threshold_var(
                "QUADRANT_MAX_COST_PER_HQ_LEAD",
                defaults.max_cost_per_high_quality_lead,
            )?,
        };

        Ok(Self {
            population_size,
            seed,
            quadrant,
        })
    }

    /// Rejects populations above [`EngineConfig::MAX_POPULATION_SIZE`].
    pub fn checked_population_size(requested: usize) -> Result<usize, ConfigError> {
        if requested > Self::MAX_POPULATION_SIZE {
            Err(ConfigError::PopulationTooLarge {
                requested,
                max: Self::MAX_POPULATION_SIZE,
            })
        } else {
            Ok(requested)
        }
    }

    pub fn analytics_engine(&self) -> AnalyticsEngine {
        AnalyticsEngine::new(ChannelEconomics::standard(), self.quadrant)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            population_size: Self::DEFAULT_POPULATION_SIZE,
            seed: None,
            quadrant: QuadrantThresholds::default(),
        }
    }
}

fn threshold_var(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .ok_or(ConfigError::InvalidThreshold { name, value: raw }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidFlag { name: &'static str, value: String },
    InvalidPopulationSize(String),
    PopulationTooLarge { requested: usize, max: usize },
    InvalidSeed(String),
    InvalidThreshold { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'full', got '{value}'")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be a boolean flag, got '{value}'")
            }
            ConfigError::InvalidPopulationSize(value) => {
                write!(f, "LEAD_POPULATION_SIZE must be a non-negative integer, got '{value}'")
            }
            ConfigError::PopulationTooLarge { requested, max } => {
                write!(f, "population size {requested} exceeds the limit of {max} leads")
            }
            ConfigError::InvalidSeed(value) => {
                write!(f, "LEAD_SEED must be a valid u64, got '{value}'")
            }
            ConfigError::InvalidThreshold { name, value } => {
                write!(f, "{name} must be a non-negative number, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "APP_LOG_ANSI",
            "LEAD_POPULATION_SIZE",
            "LEAD_SEED",
            "QUADRANT_MIN_CONVERSION_RATE",
            "QUADRANT_MAX_COST_PER_HQ_LEAD",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert!(!config.telemetry.ansi);
        assert_eq!(config.engine.population_size, 1_000);
        assert_eq!(config.engine.seed, None);
        assert_eq!(config.engine.quadrant, QuadrantThresholds::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_engine_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LEAD_POPULATION_SIZE", "2500");
        env::set_var("LEAD_SEED", "42");
        env::set_var("QUADRANT_MIN_CONVERSION_RATE", "12.5");
        env::set_var("APP_LOG_FORMAT", "full");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.engine.population_size, 2_500);
        assert_eq!(config.engine.seed, Some(42));
        assert_eq!(config.engine.quadrant.min_conversion_rate, 12.5);
        assert_eq!(config.engine.quadrant.max_cost_per_high_quality_lead, 100.0);
        assert_eq!(config.telemetry.format, LogFormat::Full);
        reset_env();
    }

    #[test]
    fn rejects_oversized_population() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LEAD_POPULATION_SIZE", "100001");
        let err = AppConfig::load().expect_err("population too large");
        assert!(matches!(
            err,
            ConfigError::PopulationTooLarge {
                requested: 100_001,
                max: 100_000
            }
        ));
        reset_env();
    }

    #[test]
    fn rejects_malformed_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LEAD_SEED", "abc");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidSeed(_))));

        reset_env();
        env::set_var("QUADRANT_MAX_COST_PER_HQ_LEAD", "-5");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidThreshold {
                name: "QUADRANT_MAX_COST_PER_HQ_LEAD",
                ..
            })
        ));

        reset_env();
        env::set_var("APP_LOG_FORMAT", "json");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidLogFormat(_))));
        reset_env();
    }
}
