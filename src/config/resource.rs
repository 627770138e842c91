//! Per-service configuration snapshot.
//!
//! A `ResourceConfig` is what an owner hands to `reconfigure`: a name, the
//! model that should serve it, and a free-form attribute map. Services pull
//! the fields they need through the typed accessors below.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, StartStopError};

/// Configuration for a single loop service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Instance name, used for logging and thread naming.
    pub name: String,

    /// Model triplet selecting the service implementation.
    #[serde(default)]
    pub model: String,

    /// Free-form attributes consumed by the service.
    #[serde(default)]
    pub attributes: Map<String, Value>,

    /// Names of resources this service depends on.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl ResourceConfig {
    /// Create an empty config for the given name and model.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            attributes: Map::new(),
            depends_on: Vec::new(),
        }
    }

    /// Set an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Add a dependency name.
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(name.into());
        self
    }

    /// Raw attribute lookup.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Required numeric attribute.
    pub fn require_f64(&self, key: &str) -> Result<f64> {
        match self.attributes.get(key) {
            None => Err(StartStopError::MissingAttribute(key.to_string())),
            Some(value) => as_number(key, value),
        }
    }

    /// Optional numeric attribute, `default` when absent.
    pub fn optional_f64(&self, key: &str, default: f64) -> Result<f64> {
        match self.attributes.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(value) => as_number(key, value),
        }
    }

    /// Optional integer attribute. Fractional numbers are truncated toward zero.
    pub fn optional_i64(&self, key: &str, default: i64) -> Result<i64> {
        match self.attributes.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(value) => value
                .as_i64()
                .or_else(|| value.as_f64().map(|n| n.trunc() as i64))
                .ok_or_else(|| invalid(key, "integer")),
        }
    }

    /// Optional boolean attribute, `default` when absent.
    pub fn optional_bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.attributes.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(invalid(key, "boolean")),
        }
    }
}

fn as_number(key: &str, value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| invalid(key, "number"))
}

fn invalid(key: &str, expected: &'static str) -> StartStopError {
    StartStopError::InvalidAttribute {
        name: key.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> ResourceConfig {
        ResourceConfig::new("osc", "test:model")
            .with_attribute("rpm", 10)
            .with_attribute("revolutions", 1.5)
            .with_attribute("secs_between_loop", 2.9)
            .with_attribute("home_on_start", false)
            .with_attribute("label", "hello")
    }

    #[test]
    fn test_require_f64_present() {
        let cfg = config();
        assert_eq!(cfg.require_f64("rpm").unwrap(), 10.0);
        assert_eq!(cfg.require_f64("revolutions").unwrap(), 1.5);
    }

    #[test]
    fn test_require_f64_missing() {
        let err = config().require_f64("speed").unwrap_err();
        assert!(matches!(err, StartStopError::MissingAttribute(ref k) if k == "speed"));
    }

    #[test]
    fn test_require_f64_wrong_type() {
        let err = config().require_f64("label").unwrap_err();
        assert!(matches!(err, StartStopError::InvalidAttribute { expected: "number", .. }));
    }

    #[test]
    fn test_optional_i64_truncates() {
        let cfg = config();
        assert_eq!(cfg.optional_i64("secs_between_loop", 0).unwrap(), 2);
        assert_eq!(cfg.optional_i64("secs_between_reverse", 0).unwrap(), 0);
    }

    #[test]
    fn test_optional_bool() {
        let cfg = config();
        assert!(!cfg.optional_bool("home_on_start", true).unwrap());
        assert!(cfg.optional_bool("missing", true).unwrap());
        assert!(cfg.optional_bool("rpm", true).is_err());
    }

    #[test]
    fn test_null_counts_as_absent() {
        let cfg = ResourceConfig::new("osc", "").with_attribute("secs_between_loop", Value::Null);
        assert_eq!(cfg.optional_i64("secs_between_loop", 7).unwrap(), 7);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let cfg: ResourceConfig = serde_json::from_value(json!({"name": "bare"})).unwrap();
        assert_eq!(cfg.name, "bare");
        assert!(cfg.model.is_empty());
        assert!(cfg.attributes.is_empty());
        assert!(cfg.depends_on.is_empty());
    }
}
