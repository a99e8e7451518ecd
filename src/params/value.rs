use std::fmt;

use serde_json::Value;

use crate::error::{LaunchError, LaunchResult};
use crate::params::schema::{ParameterDescriptor, SemanticType};

/// A typed parameter value supplied for one execution
///
/// File and directory references are kept as written (local paths or object store URIs), the
/// runner resolves them itself.
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    File(String),
    Directory(String),
}

impl ParameterValue {
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            ParameterValue::String(_) => SemanticType::String,
            ParameterValue::Integer(_) => SemanticType::Integer,
            ParameterValue::Float(_) => SemanticType::Float,
            ParameterValue::Boolean(_) => SemanticType::Boolean,
            ParameterValue::File(_) => SemanticType::File,
            ParameterValue::Directory(_) => SemanticType::Directory,
        }
    }

    /// Read a JSON value as the type declared by `param`, `null` means not provided
    pub fn from_json(param: &ParameterDescriptor, json: &Value) -> LaunchResult<Option<ParameterValue>> {
        if json.is_null() {
            return Ok(None);
        }

        let value = match param.semantic_type {
            SemanticType::String => json.as_str().map(|s| ParameterValue::String(s.to_string())),
            SemanticType::File => json.as_str().map(|s| ParameterValue::File(s.to_string())),
            SemanticType::Directory => json.as_str().map(|s| ParameterValue::Directory(s.to_string())),
            SemanticType::Integer => as_integer(json).map(ParameterValue::Integer),
            SemanticType::Float => json.as_f64().map(ParameterValue::Float),
            SemanticType::Boolean => json.as_bool().map(ParameterValue::Boolean),
        };

        value.map(Some).ok_or_else(|| LaunchError::InvalidParameterType {
            name: param.name.to_string(),
            expected: param.semantic_type,
            found: json_kind(json),
        })
    }

    pub fn to_json(&self) -> Value {
        match self {
            ParameterValue::String(s) | ParameterValue::File(s) | ParameterValue::Directory(s) => Value::from(s.as_str()),
            ParameterValue::Integer(i) => Value::from(*i),
            ParameterValue::Float(x) => Value::from(*x),
            ParameterValue::Boolean(b) => Value::from(*b),
        }
    }
}

/// JSON schema counts `2.0` as an integer, so accept integral floats too
fn as_integer(json: &Value) -> Option<i64> {
    json.as_i64().or_else(|| {
        json.as_f64()
            .filter(|x| x.fract() == 0.0 && *x >= i64::MIN as f64 && *x < i64::MAX as f64)
            .map(|x| x as i64)
    })
}

/// Closest semantic type for a JSON value that failed to parse
fn json_kind(json: &Value) -> SemanticType {
    match json {
        Value::Bool(_) => SemanticType::Boolean,
        Value::Number(n) if n.is_i64() || n.is_u64() => SemanticType::Integer,
        Value::Number(_) => SemanticType::Float,
        _ => SemanticType::String,
    }
}

/// Token form passed to the runner
impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParameterValue::String(s) | ParameterValue::File(s) | ParameterValue::Directory(s) => f.write_str(s),
            ParameterValue::Integer(i) => write!(f, "{i}"),
            // integral floats keep a fractional part so they still read as floats
            ParameterValue::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            ParameterValue::Float(x) => write!(f, "{x}"),
            ParameterValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::params::schema::ParameterSchema;

    #[test]
    fn floats_render_in_canonical_decimal() {
        assert_eq!(ParameterValue::Float(0.05).to_string(), "0.05");
        assert_eq!(ParameterValue::Float(0.01).to_string(), "0.01");
        assert_eq!(ParameterValue::Float(2.0).to_string(), "2.0");
        assert_eq!(ParameterValue::Integer(300).to_string(), "300");
    }

    #[test]
    fn strings_are_not_escaped() {
        let value = ParameterValue::String("Oxidation (M);Carbamidomethyl (C)".into());
        assert_eq!(value.to_string(), "Oxidation (M);Carbamidomethyl (C)");
    }

    #[test]
    fn json_numbers_follow_the_declared_type() {
        let schema = ParameterSchema::mhcquant();
        let tolerance = schema.get("fragment_mass_tolerance").unwrap();
        assert_eq!(ParameterValue::from_json(tolerance, &json!(1)).unwrap(), Some(ParameterValue::Float(1.0)));

        let hits = schema.get("num_hits").unwrap();
        assert_eq!(ParameterValue::from_json(hits, &json!(4)).unwrap(), Some(ParameterValue::Integer(4)));
    }

    #[test]
    fn integral_floats_are_integers() {
        let hits = ParameterSchema::mhcquant().get("num_hits").unwrap();
        assert_eq!(ParameterValue::from_json(hits, &json!(2.0)).unwrap(), Some(ParameterValue::Integer(2)));
        assert!(ParameterValue::from_json(hits, &json!(2.5)).is_err());
    }

    #[test]
    fn null_is_not_provided() {
        let email = ParameterSchema::mhcquant().get("email").unwrap();
        assert_eq!(ParameterValue::from_json(email, &Value::Null).unwrap(), None);
    }

    #[test]
    fn mismatched_json_is_rejected() {
        let quantify = ParameterSchema::mhcquant().get("quantify").unwrap();
        let err = ParameterValue::from_json(quantify, &json!("yes")).unwrap_err();
        assert!(matches!(err, LaunchError::InvalidParameterType { expected: SemanticType::Boolean, found: SemanticType::String, .. }));
    }
}
