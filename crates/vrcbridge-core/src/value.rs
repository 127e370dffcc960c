//! Parameter types, values, and the coercion rules between them.
//!
//! Coercion follows what control panels actually send: numbers may arrive as
//! JSON numbers or numeric strings, booleans as anything truthy. Bounds are
//! never applied here; they are advisory metadata on [`crate::Parameter`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CoercionError;

/// Declared type of a parameter, spelled the way VRChat definition files spell it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamType {
    /// 32-bit float on the wire.
    Float,
    /// 32-bit integer on the wire.
    Int,
    /// OSC `T` / `F`.
    Bool,
    /// OSC string.
    String,
}

impl ParamType {
    /// Convert `value` to this type.
    pub fn coerce(self, value: &ParamValue) -> Result<ParamValue, CoercionError> {
        match self {
            Self::Float => value.to_f64().map(ParamValue::Float),
            Self::Int => value.to_i64().map(ParamValue::Int),
            Self::Bool => Ok(ParamValue::Bool(value.is_truthy())),
            Self::String => Ok(ParamValue::String(value.to_string())),
        }
    }

    /// Convert a raw JSON value (as sent by a control panel) to this type.
    pub fn coerce_json(self, value: &Value) -> Result<ParamValue, CoercionError> {
        self.coerce(&ParamValue::from_json(value)?)
    }

    /// Type name as used in definition files and the wire protocol.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Float => "Float",
            Self::Int => "Int",
            Self::Bool => "Bool",
            Self::String => "String",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A live parameter value.
///
/// Serialized untagged so the JSON form is the bare scalar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// Text.
    String(String),
}

impl ParamValue {
    /// Build a value from a JSON scalar.
    pub fn from_json(value: &Value) -> Result<Self, CoercionError> {
        match value {
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Int(i)),
                None => Ok(Self::Float(n.as_f64().unwrap_or(f64::NAN))),
            },
            Value::String(s) => Ok(Self::String(s.clone())),
            Value::Null => Err(CoercionError::Unsupported { kind: "null" }),
            Value::Array(_) => Err(CoercionError::Unsupported { kind: "array" }),
            Value::Object(_) => Err(CoercionError::Unsupported { kind: "object" }),
        }
    }

    /// The type this value currently holds.
    pub fn param_type(&self) -> ParamType {
        match self {
            Self::Bool(_) => ParamType::Bool,
            Self::Int(_) => ParamType::Int,
            Self::Float(_) => ParamType::Float,
            Self::String(_) => ParamType::String,
        }
    }

    /// Numeric view, if the value is a number or a boolean.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::String(_) => None,
        }
    }

    /// Truthiness: non-zero numbers, `true`, and non-empty strings other than
    /// the usual "off" words.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) => {
                let s = s.trim();
                !s.is_empty()
                    && !matches!(
                        s.to_ascii_lowercase().as_str(),
                        "false" | "0" | "off" | "no"
                    )
            }
        }
    }

    fn to_f64(&self) -> Result<f64, CoercionError> {
        match self {
            Self::String(s) => s.trim().parse::<f64>().map_err(|_| CoercionError::NotNumeric {
                value: s.clone(),
            }),
            other => Ok(other.as_f64().unwrap_or_default()),
        }
    }

    fn to_i64(&self) -> Result<i64, CoercionError> {
        match self {
            Self::Int(i) => Ok(*i),
            Self::String(s) => match s.trim().parse::<i64>() {
                Ok(i) => Ok(i),
                Err(_) => truncate(self.to_f64()?),
            },
            other => truncate(other.as_f64().unwrap_or_default()),
        }
    }
}

fn truncate(value: f64) -> Result<i64, CoercionError> {
    if value.is_finite() {
        Ok(value.trunc() as i64)
    } else {
        Err(CoercionError::NonFinite { value })
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn float_from_numeric_string() {
        let v = ParamType::Float.coerce_json(&json!("0.25")).unwrap();
        assert_eq!(v, ParamValue::Float(0.25));
    }

    #[test]
    fn float_from_int() {
        let v = ParamType::Float.coerce_json(&json!(2)).unwrap();
        assert_eq!(v, ParamValue::Float(2.0));
    }

    #[test]
    fn float_rejects_text() {
        let err = ParamType::Float.coerce_json(&json!("loud")).unwrap_err();
        assert_matches!(err, CoercionError::NotNumeric { .. });
    }

    #[test]
    fn int_truncates_float() {
        assert_eq!(
            ParamType::Int.coerce_json(&json!(3.9)).unwrap(),
            ParamValue::Int(3)
        );
        assert_eq!(
            ParamType::Int.coerce_json(&json!(-3.9)).unwrap(),
            ParamValue::Int(-3)
        );
    }

    #[test]
    fn int_from_strings() {
        assert_eq!(
            ParamType::Int.coerce_json(&json!("7")).unwrap(),
            ParamValue::Int(7)
        );
        assert_eq!(
            ParamType::Int.coerce_json(&json!("7.5")).unwrap(),
            ParamValue::Int(7)
        );
    }

    #[test]
    fn int_rejects_non_finite() {
        let err = ParamType::Int.coerce(&ParamValue::Float(f64::NAN)).unwrap_err();
        assert_matches!(err, CoercionError::NonFinite { .. });
    }

    #[test]
    fn bool_truthiness() {
        assert_eq!(
            ParamType::Bool.coerce_json(&json!(1)).unwrap(),
            ParamValue::Bool(true)
        );
        assert_eq!(
            ParamType::Bool.coerce_json(&json!(0.0)).unwrap(),
            ParamValue::Bool(false)
        );
        assert_eq!(
            ParamType::Bool.coerce_json(&json!("yes")).unwrap(),
            ParamValue::Bool(true)
        );
        assert_eq!(
            ParamType::Bool.coerce_json(&json!("false")).unwrap(),
            ParamValue::Bool(false)
        );
        assert_eq!(
            ParamType::Bool.coerce_json(&json!("")).unwrap(),
            ParamValue::Bool(false)
        );
    }

    #[test]
    fn bool_passes_through() {
        assert_eq!(
            ParamType::Bool.coerce_json(&json!(true)).unwrap(),
            ParamValue::Bool(true)
        );
    }

    #[test]
    fn string_stringifies() {
        assert_eq!(
            ParamType::String.coerce(&ParamValue::Int(12)).unwrap(),
            ParamValue::String("12".into())
        );
    }

    #[test]
    fn null_is_unsupported() {
        let err = ParamType::Float.coerce_json(&Value::Null).unwrap_err();
        assert_eq!(err, CoercionError::Unsupported { kind: "null" });
    }

    #[test]
    fn untagged_json_shape() {
        assert_eq!(serde_json::to_value(ParamValue::Bool(true)).unwrap(), json!(true));
        assert_eq!(serde_json::to_value(ParamValue::Int(4)).unwrap(), json!(4));
        assert_eq!(serde_json::to_value(ParamValue::Float(0.5)).unwrap(), json!(0.5));
        assert_eq!(
            serde_json::from_value::<ParamValue>(json!("avtr_1")).unwrap(),
            ParamValue::String("avtr_1".into())
        );
        assert_eq!(
            serde_json::from_value::<ParamValue>(json!(3)).unwrap(),
            ParamValue::Int(3)
        );
    }

    #[test]
    fn type_names_match_definition_files() {
        let t: ParamType = serde_json::from_value(json!("Float")).unwrap();
        assert_eq!(t, ParamType::Float);
        assert_eq!(ParamType::Bool.to_string(), "Bool");
    }
}
