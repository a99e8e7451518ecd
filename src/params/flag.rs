use crate::error::{LaunchError, LaunchResult};
use crate::params::schema::ParameterSchema;
use crate::params::value::ParameterValue;

/// Turn one parameter into nextflow command line tokens
///
/// - missing values and values equal to the declared default are omitted
/// - booleans are presence flags: `true` gives `--name`, `false` gives nothing
/// - everything else is `--name <value>`, the value is one token and is never escaped
pub fn translate(schema: &ParameterSchema, name: &str, value: Option<&ParameterValue>) -> LaunchResult<Vec<String>> {
    let param = schema.get(name)
        .ok_or_else(|| LaunchError::UnknownParameter { name: name.to_string() })?;

    let value = match value {
        Some(value) => value,
        None => return Ok(Vec::new()),
    };

    if value.semantic_type() != param.semantic_type {
        return Err(LaunchError::InvalidParameterType {
            name: name.to_string(),
            expected: param.semantic_type,
            found: value.semantic_type(),
        });
    }

    if param.default_value().as_ref() == Some(value) {
        return Ok(Vec::new());
    }

    let flag = format!("--{name}");
    Ok(match value {
        ParameterValue::Boolean(true) => vec![flag],
        ParameterValue::Boolean(false) => Vec::new(),
        other => vec![flag, other.to_string()],
    })
}
