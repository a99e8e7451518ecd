use std::fmt;

use serde_json::{json, Map, Value};

use crate::params::value::ParameterValue;
use self::Literal::{Bool, Float, Int, Str};
use self::SemanticType as T;

/// What kind of value a parameter carries
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SemanticType {
    String,
    Integer,
    Float,
    Boolean,
    File,
    Directory,
}

impl SemanticType {
    /// JSON schema primitive used to validate parameter files
    pub fn json_type(&self) -> &'static str {
        match self {
            SemanticType::String | SemanticType::File | SemanticType::Directory => "string",
            SemanticType::Integer => "integer",
            SemanticType::Float => "number",
            SemanticType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SemanticType::String => write!(f, "string"),
            SemanticType::Integer => write!(f, "integer"),
            SemanticType::Float => write!(f, "float"),
            SemanticType::Boolean => write!(f, "boolean"),
            SemanticType::File => write!(f, "file"),
            SemanticType::Directory => write!(f, "directory"),
        }
    }
}

/// A default as written in the static declaration
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Literal {
    Str(&'static str),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// Everything the launcher knows about one pipeline parameter
#[derive(Debug)]
pub struct ParameterDescriptor {
    pub name: &'static str,
    pub semantic_type: SemanticType,
    /// `optional<T>`: a null / missing value is acceptable
    pub optional: bool,
    pub default: Option<Literal>,
    /// Starts a new UI group when present
    pub section_title: Option<&'static str>,
    pub description: &'static str,
    /// The value names a path the pipeline writes results to
    pub output: bool,
}

impl ParameterDescriptor {
    const fn new(name: &'static str, semantic_type: SemanticType, optional: bool, description: &'static str) -> Self {
        ParameterDescriptor {
            name,
            semantic_type,
            optional,
            default: None,
            section_title: None,
            description,
            output: false,
        }
    }

    const fn default(mut self, literal: Literal) -> Self {
        self.default = Some(literal);
        self
    }

    const fn section(mut self, title: &'static str) -> Self {
        self.section_title = Some(title);
        self
    }

    const fn output(mut self) -> Self {
        self.output = true;
        self
    }

    /// A value must be supplied for the launch to go ahead
    pub fn is_required(&self) -> bool {
        !self.optional && self.default.is_none()
    }

    /// The declared default as a typed value
    pub fn default_value(&self) -> Option<ParameterValue> {
        let literal = self.default?;
        Some(match (self.semantic_type, literal) {
            (SemanticType::File, Literal::Str(s)) => ParameterValue::File(s.into()),
            (SemanticType::Directory, Literal::Str(s)) => ParameterValue::Directory(s.into()),
            (_, Literal::Str(s)) => ParameterValue::String(s.to_string()),
            (SemanticType::Float, Literal::Int(i)) => ParameterValue::Float(i as f64),
            (_, Literal::Int(i)) => ParameterValue::Integer(i),
            (_, Literal::Float(x)) => ParameterValue::Float(x),
            (_, Literal::Bool(b)) => ParameterValue::Boolean(b),
        })
    }
}

const fn required(name: &'static str, semantic_type: SemanticType, description: &'static str) -> ParameterDescriptor {
    ParameterDescriptor::new(name, semantic_type, false, description)
}

const fn optional(name: &'static str, semantic_type: SemanticType, description: &'static str) -> ParameterDescriptor {
    ParameterDescriptor::new(name, semantic_type, true, description)
}

/// nf-core/mhcquant parameters, in the order they are presented and passed to nextflow
static MHCQUANT: &[ParameterDescriptor] = &[
    required("input", T::File, "Input raw / mzML files listed in a tsv file (see help for details)")
        .section("Input/output options"),
    required("outdir", T::Directory, "The output directory where the results will be saved. You have to use absolute paths to storage on Cloud infrastructure.")
        .output(),
    optional("email", T::String, "Email address for completion summary."),
    optional("multiqc_title", T::String, "MultiQC report title. Printed as page header, used for filename if not otherwise specified."),
    required("fasta", T::String, "Input FASTA protein database")
        .section("Database Options"),
    optional("skip_decoy_generation", T::Boolean, "Add this parameter when you want to skip the generation of the decoy database."),
    optional("run_centroidisation", T::Boolean, "Include the flag when the specified ms level is not centroided (default=false). ")
        .default(Bool(false))
        .section("Spectrum preprocessing"),
    optional("pick_ms_levels", T::Integer, "Specify the MS levels for which the peak picking is applied (unless you use `--run_centroidisation`).")
        .default(Int(2)),
    optional("filter_mzml", T::Boolean, "Clean up spectrum files and remove artificial charge 0 peptides.")
        .default(Bool(false)),
    optional("activation_method", T::String, "Specify which fragmentation method was used in the MS acquisition")
        .default(Str("ALL"))
        .section("Database Search Settings"),
    optional("digest_mass_range", T::String, "Specify the mass range in Dalton that peptides should fulfill to be considered for peptide spectrum matching."),
    optional("prec_charge", T::String, "Specify the precursor charge range that peptides should fulfill to be considered for peptide spectrum matching."),
    optional("precursor_mass_tolerance", T::Integer, "Specify the precursor mass tolerance to be used for the Comet database search.")
        .default(Int(5)),
    optional("precursor_error_units", T::String, "Specify the unit of the precursor mass tolerance to be used for the Comet database search.")
        .default(Str("ppm")),
    optional("fragment_mass_tolerance", T::Float, "Specify the fragment mass tolerance to be used for the comet database search.")
        .default(Float(0.01)),
    optional("number_mods", T::Integer, "Specify the maximum number of modifications that should be contained in a peptide sequence match.")
        .default(Int(3)),
    optional("fixed_mods", T::String, "Specify which fixed modifications should be applied to the database search"),
    optional("variable_mods", T::String, "Specify which variable modifications should be applied to the database search")
        .default(Str("Oxidation (M)")),
    optional("num_hits", T::Integer, "Specify the number of hits that should be reported for each spectrum.")
        .default(Int(1)),
    optional("use_x_ions", T::Boolean, "Include x ions into the peptide spectrum matching"),
    optional("use_z_ions", T::Boolean, "Include z ions into the peptide spectrum matching"),
    optional("use_a_ions", T::Boolean, "Include a ions into the peptide spectrum matching"),
    optional("use_c_ions", T::Boolean, "Include c ions into the peptide spectrum matching"),
    optional("use_NL_ions", T::Boolean, "Include NL ions into the peptide spectrum matching"),
    optional("remove_precursor_peak", T::Boolean, "Include if you want to remove all peaks around precursor m/z")
        .default(Bool(false)),
    optional("rescoring_engine", T::String, "Specify the rescoring engine that should be used for rescoring. Either percolator or mokapot")
        .default(Str("percolator"))
        .section("Rescoring settings"),
    optional("feature_generators", T::String, "Specify the feature generator that should be used for rescoring. One or multiple of basic,ms2pip,deeplc,ionmob")
        .default(Str("deeplc,ms2pip")),
    optional("ms2pip_model", T::String, "Specify the MS²PIP model that should be used for rescoring. Checkout the MS²PIP documentation for available models.")
        .default(Str("Immuno-HCD")),
    optional("fdr_level", T::String, "Specify the level at which the false discovery rate should be computed.")
        .default(Str("peptide_level_fdrs")),
    optional("fdr_threshold", T::Float, "Specify the false discovery rate threshold at which peptide hits should be selected.")
        .default(Float(0.01)),
    optional("quantify", T::Boolean, "Turn on quantification mode")
        .default(Bool(false))
        .section("Quantification Options"),
    optional("max_rt_alignment_shift", T::Integer, "Set a maximum retention time shift for the linear RT alignment")
        .default(Int(300)),
    optional("peptide_min_length", T::Integer, "Specify the minimum length of peptides to be considered after processing")
        .default(Int(8))
        .section("Post Processing"),
    optional("peptide_max_length", T::Integer, "Specify the maximum length of peptides to be considered after processing")
        .default(Int(12)),
    optional("annotate_ions", T::Boolean, "Create tsv files containing information about the MS2 ion annotations after processing.")
        .default(Bool(false)),
    optional("multiqc_methods_description", T::String, "Custom MultiQC yaml file containing HTML including a methods description.")
        .section("Generic options"),
];

/// Read-only registry of parameter descriptors
#[derive(Copy, Clone, Debug)]
pub struct ParameterSchema {
    parameters: &'static [ParameterDescriptor],
}

impl ParameterSchema {
    pub fn mhcquant() -> ParameterSchema {
        ParameterSchema { parameters: MHCQUANT }
    }

    /// Descriptors in declaration order
    pub fn iter(&self) -> std::slice::Iter<'static, ParameterDescriptor> {
        self.parameters.iter()
    }

    pub fn get(&self, name: &str) -> Option<&'static ParameterDescriptor> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// JSON schema accepted for parameter files
    ///
    /// Optional parameters also accept `null`, unknown keys are rejected.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in self.iter() {
            let primitive = param.semantic_type.json_type();
            let kind = match param.optional {
                true => json!([primitive, "null"]),
                false => json!(primitive),
            };
            let mut property = json!({ "type": kind, "description": param.description });
            if let Some(default) = param.default_value() {
                property["default"] = default.to_json();
            }
            properties.insert(param.name.to_string(), property);
        }

        let required: Vec<&str> = self.iter()
            .filter(|p| p.is_required())
            .map(|p| p.name)
            .collect();

        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "nf-core/mhcquant parameters",
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}
