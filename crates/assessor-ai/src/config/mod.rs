use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use chrono::Datelike;
use regex::Regex;

use crate::assessment::validation::{
    DEFAULT_COUNTY_CODE, DEFAULT_COUNTY_ZIP_PREFIX, DEFAULT_MAX_PROPERTY_VALUE,
    DEFAULT_MIN_PROPERTY_VALUE, DEFAULT_PARCEL_ID_PATTERN, DEFAULT_STATE_CODE,
};
use crate::assessment::{PricingTables, ValidationRules};

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
    pub assessment: AssessmentConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            assessment: AssessmentConfig::from_env()?,
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Jurisdiction settings the validation rules and pricing tables are built from.
#[derive(Debug, Clone)]
pub struct AssessmentConfig {
    pub state_code: String,
    pub county_code: String,
    pub zip_prefix: String,
    pub parcel_id_pattern: Regex,
    pub min_property_value: f64,
    pub max_property_value: f64,
    pub reference_year: i64,
}

impl AssessmentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let text = |key: &str, default: &str| env::var(key).unwrap_or_else(|_| default.to_string());

        let pattern = text("ASSESSOR_PARCEL_ID_PATTERN", DEFAULT_PARCEL_ID_PATTERN);
        let parcel_id_pattern =
            Regex::new(&pattern).map_err(|source| ConfigError::InvalidParcelPattern { source })?;

        let min_property_value =
            parse_var("ASSESSOR_MIN_PROPERTY_VALUE", DEFAULT_MIN_PROPERTY_VALUE)?;
        let max_property_value =
            parse_var("ASSESSOR_MAX_PROPERTY_VALUE", DEFAULT_MAX_PROPERTY_VALUE)?;
        if min_property_value >= max_property_value {
            return Err(ConfigError::InvalidValueRange {
                min: min_property_value,
                max: max_property_value,
            });
        }

        Ok(Self {
            state_code: text("ASSESSOR_STATE_CODE", DEFAULT_STATE_CODE),
            county_code: text("ASSESSOR_COUNTY_CODE", DEFAULT_COUNTY_CODE),
            zip_prefix: text("ASSESSOR_ZIP_PREFIX", DEFAULT_COUNTY_ZIP_PREFIX),
            parcel_id_pattern,
            min_property_value,
            max_property_value,
            reference_year: parse_var("ASSESSOR_REFERENCE_YEAR", current_year())?,
        })
    }

    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules {
            parcel_id_pattern: self.parcel_id_pattern.clone(),
            min_property_value: self.min_property_value,
            max_property_value: self.max_property_value,
            state_code: self.state_code.clone(),
            county_code: self.county_code.clone(),
            county_zip_prefix: self.zip_prefix.clone(),
            ..ValidationRules::benton_county(self.reference_year)
        }
    }

    pub fn pricing_tables(&self) -> PricingTables {
        PricingTables::benton_county(self.reference_year)
    }
}

fn current_year() -> i64 {
    i64::from(chrono::Local::now().year())
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    InvalidParcelPattern { source: regex::Error },
    InvalidValueRange { min: f64, max: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be numeric, got '{value}'")
            }
            ConfigError::InvalidParcelPattern { .. } => {
                write!(f, "ASSESSOR_PARCEL_ID_PATTERN must be a valid regular expression")
            }
            ConfigError::InvalidValueRange { min, max } => write!(
                f,
                "ASSESSOR_MIN_PROPERTY_VALUE ({min}) must be below ASSESSOR_MAX_PROPERTY_VALUE ({max})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidParcelPattern { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidValueRange { .. } => None,
        }
    }
}
