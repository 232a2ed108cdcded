use crate::core::SessionOptions;
use crate::services::LocationOptions;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub location: LocationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_storage_backend")]
    pub backend: StorageBackend,
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: default_storage_path(),
        }
    }
}

fn default_storage_backend() -> StorageBackend { StorageBackend::File }
fn default_storage_path() -> String { "data/store.json".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_text_latency_ms")]
    pub text_latency_ms: u64,
    #[serde(default = "default_nearby_latency_ms")]
    pub nearby_latency_ms: u64,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            text_latency_ms: default_text_latency_ms(),
            nearby_latency_ms: default_nearby_latency_ms(),
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
            suggestion_limit: default_suggestion_limit(),
        }
    }
}

impl SearchSettings {
    pub fn text_latency(&self) -> Duration {
        Duration::from_millis(self.text_latency_ms)
    }

    pub fn nearby_latency(&self) -> Duration {
        Duration::from_millis(self.nearby_latency_ms)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            debounce: Duration::from_millis(self.debounce_ms),
            min_query_len: self.min_query_len,
            suggestion_limit: self.suggestion_limit,
        }
    }
}

fn default_text_latency_ms() -> u64 { 800 }
fn default_nearby_latency_ms() -> u64 { 1000 }
fn default_debounce_ms() -> u64 { 300 }
fn default_min_query_len() -> usize { 3 }
fn default_suggestion_limit() -> usize { 5 }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSourceKind {
    Fixed,
    Unavailable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationSettings {
    #[serde(default = "default_location_source")]
    pub source: LocationSourceKind,
    #[serde(default = "default_true")]
    pub high_accuracy: bool,
    /// Zero disables the bound
    #[serde(default = "default_location_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_maximum_age_ms")]
    pub maximum_age_ms: u64,
    #[serde(default = "default_fallback_latitude")]
    pub fallback_latitude: f64,
    #[serde(default = "default_fallback_longitude")]
    pub fallback_longitude: f64,
    #[serde(default = "default_fixed_delay_ms")]
    pub fixed_delay_ms: u64,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            source: default_location_source(),
            high_accuracy: default_true(),
            timeout_ms: default_location_timeout_ms(),
            maximum_age_ms: default_maximum_age_ms(),
            fallback_latitude: default_fallback_latitude(),
            fallback_longitude: default_fallback_longitude(),
            fixed_delay_ms: default_fixed_delay_ms(),
        }
    }
}

impl LocationSettings {
    pub fn options(&self) -> LocationOptions {
        LocationOptions {
            high_accuracy: self.high_accuracy,
            timeout: (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms)),
            maximum_age: Duration::from_millis(self.maximum_age_ms),
        }
    }
}

fn default_location_source() -> LocationSourceKind { LocationSourceKind::Fixed }
fn default_true() -> bool { true }
fn default_location_timeout_ms() -> u64 { 10_000 }
fn default_maximum_age_ms() -> u64 { 300_000 }
fn default_fallback_latitude() -> f64 { 37.7749 }
fn default_fallback_longitude() -> f64 { -122.4194 }
fn default_fixed_delay_ms() -> u64 { 1000 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with PLACES_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., PLACES__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("PLACES")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("PLACES")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the short-form overrides deployments commonly set
///
/// `STORE_PATH`, `LOG_LEVEL` and `LOG_FORMAT` win over file values when present.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(path) = env::var("STORE_PATH") {
        builder = builder.set_override("storage.path", path)?;
    }
    if let Ok(level) = env::var("LOG_LEVEL") {
        builder = builder.set_override("logging.level", level)?;
    }
    if let Ok(format) = env::var("LOG_FORMAT") {
        builder = builder.set_override("logging.format", format)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_search_settings() {
        let search = SearchSettings::default();
        assert_eq!(search.text_latency(), Duration::from_millis(800));
        assert_eq!(search.nearby_latency(), Duration::from_millis(1000));

        let session = search.session_options();
        assert_eq!(session.debounce, Duration::from_millis(300));
        assert_eq!(session.min_query_len, 3);
        assert_eq!(session.suggestion_limit, 5);
    }

    #[test]
    fn test_default_location_options() {
        let options = LocationSettings::default().options();
        assert!(options.high_accuracy);
        assert_eq!(options.timeout, Some(Duration::from_secs(10)));
        assert_eq!(options.maximum_age, Duration::from_secs(300));
    }

    #[test]
    fn test_zero_timeout_disables_bound() {
        let settings = LocationSettings {
            timeout_ms: 0,
            ..LocationSettings::default()
        };
        assert_eq!(settings.options().timeout, None);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_load_from_partial_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[storage]\nbackend = \"memory\"\n\n[location]\nsource = \"unavailable\""
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.location.source, LocationSourceKind::Unavailable);
        assert_eq!(config.search.min_query_len, 3);
    }
}
