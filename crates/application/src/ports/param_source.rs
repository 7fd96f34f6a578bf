//! Named-parameter source port
//!
//! A policy reads its parameters through this interface, so it does not care
//! whether they come from a config file, environment variables or a test.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::ApplicationError;

/// Source of named, typed parameters
///
/// Getters return an error when the key is absent or its value cannot be
/// converted; callers check [`ParamSource::is_set`] first for optional keys.
pub trait ParamSource: Send + Sync {
    /// Whether the key is present
    fn is_set(&self, key: &str) -> bool;

    /// Read a string value
    fn get_string(&self, key: &str) -> Result<String, ApplicationError>;

    /// Read a non-negative duration
    fn get_duration(&self, key: &str) -> Result<Duration, ApplicationError>;

    /// Read a float value
    fn get_f64(&self, key: &str) -> Result<f64, ApplicationError>;

    /// Read a list of strings
    fn get_string_list(&self, key: &str) -> Result<Vec<String>, ApplicationError>;
}

/// Parse a duration given as text
///
/// Accepts plain integers (milliseconds) and humantime expressions such as
/// `"250ms"` or `"1s 500ms"`. Negative values are rejected.
pub fn parse_duration(key: &str, raw: &str) -> Result<Duration, ApplicationError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('-') {
        return Err(ApplicationError::invalid_parameter(
            key,
            format!("must be non-negative, got {trimmed}"),
        ));
    }
    if let Ok(millis) = trimmed.parse::<u64>() {
        return Ok(Duration::from_millis(millis));
    }
    humantime::parse_duration(trimmed)
        .map_err(|e| ApplicationError::invalid_parameter(key, format!("bad duration {trimmed:?}: {e}")))
}

/// Convert an integer number of milliseconds into a duration
pub fn duration_from_millis(key: &str, millis: i64) -> Result<Duration, ApplicationError> {
    u64::try_from(millis).map(Duration::from_millis).map_err(|_| {
        ApplicationError::invalid_parameter(key, format!("must be non-negative, got {millis}ms"))
    })
}

/// Convert a float number of milliseconds into a duration
pub fn duration_from_float_millis(key: &str, millis: f64) -> Result<Duration, ApplicationError> {
    if !millis.is_finite() || millis < 0.0 {
        return Err(ApplicationError::invalid_parameter(
            key,
            format!("must be a non-negative number of milliseconds, got {millis}"),
        ));
    }
    Ok(Duration::from_secs_f64(millis / 1000.0))
}

/// A single in-memory parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Float(f64),
    List(Vec<String>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Duration> for ParamValue {
    fn from(value: Duration) -> Self {
        Self::Text(humantime::format_duration(value).to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(str::to_string).collect())
    }
}

/// In-memory parameter source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamMap {
    values: HashMap<String, ParamValue>,
}

impl ParamMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace a value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(key.into(), value.into());
    }

    fn value(&self, key: &str) -> Result<&ParamValue, ApplicationError> {
        self.values
            .get(key)
            .ok_or_else(|| ApplicationError::invalid_parameter(key, "not set"))
    }
}

impl ParamSource for ParamMap {
    fn is_set(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn get_string(&self, key: &str) -> Result<String, ApplicationError> {
        match self.value(key)? {
            ParamValue::Text(s) => Ok(s.clone()),
            ParamValue::Integer(i) => Ok(i.to_string()),
            ParamValue::Float(f) => Ok(f.to_string()),
            ParamValue::List(_) => Err(ApplicationError::invalid_parameter(
                key,
                "expected a string, got a list",
            )),
        }
    }

    fn get_duration(&self, key: &str) -> Result<Duration, ApplicationError> {
        match self.value(key)? {
            ParamValue::Text(s) => parse_duration(key, s),
            ParamValue::Integer(i) => duration_from_millis(key, *i),
            ParamValue::Float(f) => duration_from_float_millis(key, *f),
            ParamValue::List(_) => Err(ApplicationError::invalid_parameter(
                key,
                "expected a duration, got a list",
            )),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn get_f64(&self, key: &str) -> Result<f64, ApplicationError> {
        match self.value(key)? {
            ParamValue::Float(f) => Ok(*f),
            ParamValue::Integer(i) => Ok(*i as f64),
            ParamValue::Text(s) => s.trim().parse::<f64>().map_err(|e| {
                ApplicationError::invalid_parameter(key, format!("bad number {s:?}: {e}"))
            }),
            ParamValue::List(_) => Err(ApplicationError::invalid_parameter(
                key,
                "expected a number, got a list",
            )),
        }
    }

    fn get_string_list(&self, key: &str) -> Result<Vec<String>, ApplicationError> {
        match self.value(key)? {
            ParamValue::List(items) => Ok(items.clone()),
            ParamValue::Text(s) => Ok(split_list(s)),
            other => Err(ApplicationError::invalid_parameter(
                key,
                format!("expected a list, got {other:?}"),
            )),
        }
    }
}

/// Split a comma separated list, dropping blank entries
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
