//! Environment-driven service configuration.

use std::env;
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Place served when `STREETROUTE_PLACE` is not set.
pub const DEFAULT_PLACE: &str = "Puno, Peru";

/// Default port when `SERVICE_PORT` is not set or invalid.
pub const DEFAULT_PORT: u16 = 8080;

/// Route the Prometheus exposition is served on by default.
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Runtime configuration for the routing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Place name to load the street graph for.
    pub place: String,
    /// Graph cache directory; `None` falls back to the library's resolution order.
    pub data_dir: Option<PathBuf>,
    /// Directory holding `index.html` and other static assets.
    pub static_dir: PathBuf,
    pub port: u16,
    pub log_format: LogFormat,
    /// Install the Prometheus recorder at startup.
    pub metrics_enabled: bool,
    pub metrics_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            place: DEFAULT_PLACE.to_string(),
            data_dir: None,
            static_dir: PathBuf::from("static"),
            port: DEFAULT_PORT,
            log_format: LogFormat::default(),
            metrics_enabled: true,
            metrics_path: DEFAULT_METRICS_PATH.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    ///
    /// - `STREETROUTE_PLACE`: place name (default: `Puno, Peru`)
    /// - `STREETROUTE_DATA_DIR`: graph cache directory
    /// - `STREETROUTE_STATIC_DIR`: static asset directory (default: `static`)
    /// - `SERVICE_PORT`: listen port (default: 8080)
    /// - `LOG_FORMAT`: `json` (default) or `text`
    /// - `METRICS_ENABLED`: `false` or `0` turns the recorder off
    /// - `METRICS_PATH`: exposition route, must start with `/` (default: `/metrics`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            place: env::var("STREETROUTE_PLACE")
                .ok()
                .filter(|place| !place.trim().is_empty())
                .unwrap_or(defaults.place),
            data_dir: env::var_os("STREETROUTE_DATA_DIR").map(PathBuf::from),
            static_dir: env::var_os("STREETROUTE_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            port: env::var("SERVICE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_format: env::var("LOG_FORMAT")
                .ok()
                .and_then(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.log_format),
            metrics_enabled: env::var("METRICS_ENABLED")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0"))
                .unwrap_or(defaults.metrics_enabled),
            metrics_path: env::var("METRICS_PATH")
                .ok()
                .filter(|path| path.starts_with('/'))
                .unwrap_or(defaults.metrics_path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.place, "Puno, Peru");
        assert_eq!(config.port, 8080);
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert!(config.data_dir.is_none());
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.metrics_enabled);
        assert_eq!(config.metrics_path, "/metrics");
    }
}
