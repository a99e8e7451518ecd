use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::params::schema::SemanticType;

/// Everything that can abort a launch
///
/// Skipped log uploads are not errors, see [`crate::runtime::log_upload::UploadOutcome`].
#[derive(Debug)]
pub enum LaunchError {
    MissingExecutionToken { variable: String },
    ProvisioningError { status: Option<u16>, message: String },
    UnknownParameter { name: String },
    InvalidParameterType { name: String, expected: SemanticType, found: SemanticType },
    InvalidParameterFile { path: PathBuf, reasons: Vec<String> },
    PipelineExecutionFailed { command: String, code: Option<i32> },
    Io { context: String, source: io::Error },
}

pub type LaunchResult<T> = Result<T, LaunchError>;

impl LaunchError {
    pub fn io(context: impl Into<String>, source: io::Error) -> LaunchError {
        LaunchError::Io { context: context.into(), source }
    }
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LaunchError::MissingExecutionToken { variable } => {
                write!(f, "failed to get execution token (${variable} is not set)")
            }
            LaunchError::ProvisioningError { status: Some(status), message } => {
                write!(f, "storage provisioning failed with HTTP {status}: {message}")
            }
            LaunchError::ProvisioningError { status: None, message } => {
                write!(f, "storage provisioning failed: {message}")
            }
            LaunchError::UnknownParameter { name } => {
                write!(f, "unknown parameter '{name}'")
            }
            LaunchError::InvalidParameterType { name, expected, found } => {
                write!(f, "parameter '{name}' expects {expected}, got {found}")
            }
            LaunchError::InvalidParameterFile { path, reasons } => {
                write!(f, "invalid parameter file {}: {}", path.display(), reasons.join("; "))
            }
            LaunchError::PipelineExecutionFailed { command, code: Some(code) } => {
                write!(f, "pipeline exited with status {code}: {command}")
            }
            LaunchError::PipelineExecutionFailed { command, code: None } => {
                write!(f, "pipeline terminated by signal: {command}")
            }
            LaunchError::Io { context, source } => write!(f, "{context}: {source}"),
        }
    }
}

impl std::error::Error for LaunchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LaunchError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
