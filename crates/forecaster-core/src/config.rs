use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable that overrides the configuration file location
pub const CONFIG_PATH_ENV: &str = "FORECASTER_CONFIG";

/// Configuration file used when nothing else is specified
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// All errors joined into a single line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Geocoding (city name to coordinates) upstream
    #[serde(default = "UpstreamConfig::geocoder_default")]
    pub geocoder: UpstreamConfig,

    /// Forecast upstream
    #[serde(default = "UpstreamConfig::weather_default")]
    pub weather: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Grace period for in-flight requests on shutdown, in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Deadline for a single forecast request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Base URL and timeout of an upstream HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

fn default_upstream_timeout() -> u64 {
    10
}

impl UpstreamConfig {
    fn geocoder_default() -> Self {
        Self {
            url: "https://nominatim.openstreetmap.org/search".to_string(),
            timeout_secs: default_upstream_timeout(),
        }
    }

    fn weather_default() -> Self {
        Self {
            url: "https://api.weather.gov".to_string(),
            timeout_secs: default_upstream_timeout(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            geocoder: UpstreamConfig::geocoder_default(),
            weather: UpstreamConfig::weather_default(),
        }
    }
}

impl Config {
    /// Resolve the configuration path: explicit argument, then
    /// `FORECASTER_CONFIG`, then `config.toml` in the working directory.
    pub fn resolve_path(explicit: Option<&str>) -> PathBuf {
        explicit
            .map(PathBuf::from)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults so the service can start with no
    /// configuration at all.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config file")
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: &Path) -> Result<(Self, ValidationResult)> {
        let config = Self::load(path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.api.port == 0 {
            result.add_error("api.port", "Port cannot be 0");
        }

        if self.api.request_timeout_secs == 0 {
            result.add_error(
                "api.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.api.shutdown_timeout_secs == 0 {
            result.add_warning(
                "api.shutdown_timeout_secs",
                "In-flight requests will be dropped immediately on shutdown",
            );
        }

        self.validate_upstream(&self.geocoder, "geocoder", &mut result);
        self.validate_upstream(&self.weather, "weather", &mut result);

        result
    }

    fn validate_upstream(&self, upstream: &UpstreamConfig, section: &str, result: &mut ValidationResult) {
        self.validate_url(&upstream.url, &format!("{}.url", section), result);

        if upstream.timeout_secs == 0 {
            result.add_error(
                format!("{}.timeout_secs", section),
                "Timeout must be greater than 0",
            );
        }
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use std::io::Write;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
        assert_eq!(config.weather.url, "https://api.weather.gov");
    }

    #[test]
    fn test_partial_file_uses_section_defaults() {
        let config = Config::from_toml(
            r#"
            [api]
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.shutdown_timeout_secs, 5);
        assert_eq!(config.geocoder.url, "https://nominatim.openstreetmap.org/search");
        assert_eq!(config.weather.url, "https://api.weather.gov");
    }

    #[test]
    fn test_full_file() {
        let config = Config::from_toml(
            r#"
            [api]
            port = 8081
            shutdown_timeout_secs = 2
            request_timeout_secs = 15

            [geocoder]
            url = "http://localhost:9001/search"
            timeout_secs = 3

            [weather]
            url = "http://localhost:9002"
            timeout_secs = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.api.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.geocoder.timeout(), Duration::from_secs(3));
        assert_eq!(config.weather.url, "http://localhost:9002");
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.weather.url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather.url"));
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.geocoder.url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "geocoder.url"));
    }

    #[test]
    fn test_zero_timeouts() {
        let mut config = Config::default();
        config.geocoder.timeout_secs = 0;
        config.api.request_timeout_secs = 0;
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "geocoder.timeout_secs"));
        assert!(result.errors.iter().any(|e| e.field == "api.request_timeout_secs"));
    }

    #[test]
    fn test_zero_shutdown_timeout_is_warning() {
        let mut config = Config::default();
        config.api.shutdown_timeout_secs = 0;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "api.shutdown_timeout_secs"));
    }

    #[test]
    fn test_zero_port() {
        let mut config = Config::default();
        config.api.port = 0;
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.api.port, 8080);
    }

    #[test]
    fn test_load_validated_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[weather]\nurl = \"not-a-url\"").unwrap();

        let err = Config::load_validated(file.path()).unwrap_err();
        assert!(err.to_string().contains("weather.url"));
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nport = ").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_resolve_path_prefers_explicit() {
        assert_eq!(
            Config::resolve_path(Some("/etc/forecaster.toml")),
            PathBuf::from("/etc/forecaster.toml")
        );
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
