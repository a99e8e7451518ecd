use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use log::{info, warn};
use serde_json::Value;

use crate::error::{LaunchError, LaunchResult};
use crate::params::schema::ParameterSchema;
use crate::params::value::ParameterValue;

/// Parameter values supplied for one execution, keyed by parameter name
pub type ParameterValues = HashMap<String, ParameterValue>;

/// A JSON file of parameter values, e.g. `{"input": "samples.tsv", "quantify": true}`
pub struct ParameterFile {
    pub path: PathBuf,
}

impl ParameterFile {
    pub fn new(path: impl Into<PathBuf>) -> ParameterFile {
        ParameterFile { path: path.into() }
    }

    /// Read, validate against the schema, then convert into typed values
    pub fn read(&self, schema: &ParameterSchema) -> LaunchResult<ParameterValues> {
        let json = self.parse_untyped_json()?;
        parse_values(schema, &json).map_err(|err| match err {
            LaunchError::InvalidParameterFile { reasons, .. } => {
                warn!("Parameter file fails validation");
                self.invalid(reasons)
            }
            err @ LaunchError::InvalidParameterType { .. } => {
                warn!("Parameter file fails validation");
                self.invalid(vec![err.to_string()])
            }
            other => other,
        })
    }

    fn parse_untyped_json(&self) -> LaunchResult<Value> {
        let path: &Path = self.path.as_path();
        info!("Reading parameters from {}", path.display());
        let json_string = fs::read_to_string(path)
            .map_err(|err| LaunchError::io(format!("can't read parameter file {}", path.display()), err))?;
        serde_json::from_str::<Value>(&json_string)
            .map_err(|err| self.invalid(vec![err.to_string()]))
    }

    fn invalid(&self, reasons: Vec<String>) -> LaunchError {
        LaunchError::InvalidParameterFile { path: self.path.clone(), reasons }
    }
}

/// Validate an untyped JSON object and read every provided value as its declared type
pub fn parse_values(schema: &ParameterSchema, json: &Value) -> LaunchResult<ParameterValues> {
    validate(schema, json)?;

    let mut values = ParameterValues::new();
    if let Value::Object(map) = json {
        for param in schema.iter() {
            if let Some(raw) = map.get(param.name) {
                if let Some(value) = ParameterValue::from_json(param, raw)? {
                    values.insert(param.name.to_string(), value);
                }
            }
        }
    }
    info!("Read {} parameter values", values.len());
    Ok(values)
}

fn validate(schema: &ParameterSchema, json: &Value) -> LaunchResult<()> {
    info!("Validating parameters against JSON schema");
    let schema_json = schema.json_schema();
    let compiled = JSONSchema::compile(&schema_json)
        .map_err(|err| invalid_input(vec![format!("schema does not compile: {err}")]))?;

    let result = compiled.validate(json);
    if let Err(errors) = result {
        let reasons: Vec<String> = errors
            .map(|err| format!("{}: {}", err.instance_path, err))
            .collect();
        return Err(invalid_input(reasons));
    }
    Ok(())
}

fn invalid_input(reasons: Vec<String>) -> LaunchError {
    LaunchError::InvalidParameterFile { path: PathBuf::from("<inline>"), reasons }
}
