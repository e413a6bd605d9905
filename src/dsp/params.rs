//! Parameter descriptions and value coercion
//!
//! Every filter describes its parameters with a static [`ParamSpec`] table.
//! Incoming values may be JSON numbers or numeric strings (text fields,
//! command-line JSON); anything else is rejected with `InvalidParameter`.

use serde_json::{Map, Value};

use crate::error::{Result, SndfxError};

/// Static description of one numeric filter parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Canonical key used in JSON parameter objects
    pub name: &'static str,
    /// Additional accepted keys
    pub aliases: &'static [&'static str],
    /// Label shown next to the input field
    pub label: &'static str,
    /// Lower bound
    pub min: f32,
    /// Upper bound (inclusive)
    pub max: f32,
    /// Whether `min` itself is excluded
    pub min_exclusive: bool,
}

impl ParamSpec {
    /// Check whether `key` names this parameter
    pub fn matches(&self, key: &str) -> bool {
        self.name == key || self.aliases.contains(&key)
    }

    /// Human-readable valid range
    pub fn expected(&self) -> String {
        let open = if self.min_exclusive { "(" } else { "[" };
        format!("a number in {}{}, {}]", open, self.min, self.max)
    }

    /// Check that `value` lies in range
    pub fn check(&self, value: f32) -> Result<f32> {
        let above_min = if self.min_exclusive {
            value > self.min
        } else {
            value >= self.min
        };
        if value.is_finite() && above_min && value <= self.max {
            Ok(value)
        } else {
            Err(SndfxError::invalid_param(self.name, value, self.expected()))
        }
    }

    /// Coerce a JSON value and check its range
    pub fn coerce(&self, value: &Value) -> Result<f32> {
        let number = coerce_number(self.name, value)?;
        self.check(number)
    }
}

/// Find the spec for `key` in `specs`
pub fn find_spec<'a>(specs: &'a [ParamSpec], key: &str) -> Result<&'a ParamSpec> {
    specs.iter().find(|spec| spec.matches(key)).ok_or_else(|| {
        let names: Vec<&str> = specs.iter().map(|s| s.name).collect();
        SndfxError::invalid_param(key, "<unknown key>", format!("one of: {}", names.join(", ")))
    })
}

/// Interpret a JSON number or numeric string as `f32`
///
/// # Errors
/// `InvalidParameter` for non-numeric strings, non-finite numbers and
/// non-scalar JSON values.
pub fn coerce_number(param: &str, value: &Value) -> Result<f32> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() && v.abs() <= f32::MAX as f64 => Ok(v as f32),
        _ => Err(SndfxError::invalid_param(param, value, "a number")),
    }
}

/// Parse a JSON object of parameter values
///
/// # Errors
/// `Serialization` for malformed JSON, `InvalidParameter` when the document
/// is valid JSON but not an object.
pub fn parse_object(json: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(json)? {
        Value::Object(map) => Ok(map),
        other => Err(SndfxError::invalid_param("params", other, "a JSON object")),
    }
}
