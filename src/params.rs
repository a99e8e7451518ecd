//! Pipeline parameters: declaration, typed values, and their nextflow flags

/// Static parameter declarations
pub mod schema;
/// Typed parameter values
pub mod value;
/// Parameter to command line flag translation
pub mod flag;
/// Read and validate JSON parameter files
pub mod input;
/// Render a markdown parameter reference
pub mod docs;
