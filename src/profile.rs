use std::fmt;
use clap::ValueEnum;

/// Nextflow `-profile` the pipeline is launched with
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum ExecutionProfile {
    #[default]
    Docker,
    Singularity,
    Conda
}

impl fmt::Display for ExecutionProfile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecutionProfile::Docker => write!(f, "docker"),
            ExecutionProfile::Singularity => write!(f, "singularity"),
            ExecutionProfile::Conda => write!(f, "conda")
        }
    }
}
