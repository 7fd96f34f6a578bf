//! `ParamSource` backed by the `config` crate

use std::path::Path;
use std::time::Duration;

use application::ApplicationError;
use application::ports::{
    ParamSource, duration_from_float_millis, duration_from_millis, parse_duration, split_list,
};
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::telemetry::TelemetryConfig;

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "AFTERSHOCK";

/// Separator between nested key segments in environment overrides
pub const ENV_SEPARATOR: &str = "__";

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawList {
    Items(Vec<String>),
    Text(String),
}

/// Layered configuration: file first, environment on top
#[derive(Debug, Clone)]
pub struct ConfigParamSource {
    config: Config,
}

impl ConfigParamSource {
    /// Load a TOML file plus environment overrides
    pub fn from_file(path: &Path) -> Result<Self, ApplicationError> {
        debug!(path = %path.display(), "Loading policy configuration");
        let builder = Config::builder().add_source(File::from(path).format(FileFormat::Toml));
        Self::build(builder)
    }

    /// Parse TOML text plus environment overrides
    pub fn from_toml_str(toml: &str) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
        Self::build(builder)
    }

    /// Wrap an already built configuration
    pub const fn from_config(config: Config) -> Self {
        Self { config }
    }

    fn build(
        builder: ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ApplicationError> {
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self { config })
    }

    /// Logging settings from the `[telemetry]` table, defaults when absent
    pub fn telemetry(&self) -> Result<TelemetryConfig, ApplicationError> {
        match self.config.get::<TelemetryConfig>("telemetry") {
            Ok(telemetry) => Ok(telemetry),
            Err(ConfigError::NotFound(_)) => Ok(TelemetryConfig::default()),
            Err(e) => Err(ApplicationError::Configuration(format!("telemetry: {e}"))),
        }
    }

    /// Keys are tried lower-cased first (how environment overrides arrive),
    /// then as written
    fn candidates(key: &str) -> Vec<String> {
        let lower = key.to_lowercase();
        if lower == key {
            vec![lower]
        } else {
            vec![lower, key.to_string()]
        }
    }

    fn lookup<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ApplicationError> {
        for candidate in Self::candidates(key) {
            match self.config.get::<T>(&candidate) {
                Ok(value) => return Ok(Some(value)),
                Err(ConfigError::NotFound(_)) => {},
                Err(e) => return Err(ApplicationError::invalid_parameter(key, e.to_string())),
            }
        }
        Ok(None)
    }

    fn require<T: DeserializeOwned>(&self, key: &str) -> Result<T, ApplicationError> {
        self.lookup(key)?
            .ok_or_else(|| ApplicationError::invalid_parameter(key, "not set"))
    }
}

impl ParamSource for ConfigParamSource {
    fn is_set(&self, key: &str) -> bool {
        matches!(self.lookup::<config::Value>(key), Ok(Some(_)))
    }

    fn get_string(&self, key: &str) -> Result<String, ApplicationError> {
        self.require(key)
    }

    fn get_duration(&self, key: &str) -> Result<Duration, ApplicationError> {
        match self.require::<RawDuration>(key)? {
            RawDuration::Millis(millis) => duration_from_millis(key, millis),
            RawDuration::FractionalMillis(millis) => duration_from_float_millis(key, millis),
            RawDuration::Text(text) => parse_duration(key, &text),
        }
    }

    fn get_f64(&self, key: &str) -> Result<f64, ApplicationError> {
        self.require(key)
    }

    fn get_string_list(&self, key: &str) -> Result<Vec<String>, ApplicationError> {
        match self.require::<RawList>(key)? {
            RawList::Items(items) => Ok(items),
            RawList::Text(text) => Ok(split_list(&text)),
        }
    }
}
