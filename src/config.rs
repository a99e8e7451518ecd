//! Fixed launch settings and their defaults
//!
//! Everything here can be overridden from the command line, see `main.rs`.

use std::path::PathBuf;

use crate::profile::ExecutionProfile;

/// Storage provisioning endpoint inside the cluster
pub static PROVISION_URL: &str = "http://nf-dispatcher-service.flyte.svc.cluster.local/provision-storage";
/// Environment variable holding the execution token
pub static EXECUTION_TOKEN_VAR: &str = "FLYTE_INTERNAL_EXECUTION_ID";
/// Top level entries of the source tree that are never copied to the shared directory
pub static IGNORED_ENTRIES: [&str; 9] = [
    "latch",
    ".latch",
    "nextflow",
    ".nextflow",
    "work",
    "results",
    "miniconda",
    "anaconda3",
    "mambaforge",
];
/// Log file nextflow writes in its launch directory
pub static RUNNER_LOG: &str = ".nextflow.log";
/// Pipeline segment of the remote log path
pub static PIPELINE_ID: &str = "nf_nf_core_mhcquant";
/// File name of the uploaded log
pub static REMOTE_LOG_NAME: &str = "nextflow.log";
pub static DEFAULT_LOG_BASE: &str = "s3://your-log-bucket/your_log_dir";

pub static DEFAULT_SOURCE_DIR: &str = "/root";
pub static DEFAULT_SHARED_DIR: &str = "/nf-workdir";
pub static DEFAULT_RUNNER: &str = "/root/nextflow";
pub static DEFAULT_CONFIG_FILE: &str = "latch.config";
pub const DEFAULT_CPUS: u32 = 4;
pub const DEFAULT_MEMORY_GIB: u32 = 8;
pub const DEFAULT_STORAGE_GIB: u32 = 100;

/// CPU and memory allocated to the runtime task
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Resources {
    pub cpus: u32,
    pub memory_gib: u32,
}

impl Default for Resources {
    fn default() -> Self {
        Resources { cpus: DEFAULT_CPUS, memory_gib: DEFAULT_MEMORY_GIB }
    }
}

impl Resources {
    /// JVM options for nextflow: a quarter of the memory as initial heap, all of it as maximum
    pub fn nxf_opts(&self) -> String {
        let initial_mib = self.memory_gib as u64 * 1024 / 4;
        format!("-Xms{}M -Xmx{}G -XX:ActiveProcessorCount={}", initial_mib, self.memory_gib, self.cpus)
    }
}

/// Everything needed to provision storage and launch the runner
#[derive(Clone, Debug)]
pub struct LaunchConfig {
    /// Tree copied into the shared directory before launch
    pub source_dir: PathBuf,
    pub shared_dir: PathBuf,
    /// Nextflow executable
    pub runner: PathBuf,
    /// Pipeline entry file, relative to the shared directory
    pub pipeline_entry: String,
    pub profile: ExecutionProfile,
    pub config_file: String,
    pub nxf_home: PathBuf,
    pub resources: Resources,
    pub storage_gib: u32,
    pub provision_url: String,
    pub token_var: String,
    /// `s3://bucket/prefix` that run logs are uploaded under
    pub log_base: String,
    pub execution_name: Option<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        LaunchConfig {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            shared_dir: PathBuf::from(DEFAULT_SHARED_DIR),
            runner: PathBuf::from(DEFAULT_RUNNER),
            pipeline_entry: "main.nf".to_string(),
            profile: ExecutionProfile::default(),
            config_file: DEFAULT_CONFIG_FILE.to_string(),
            nxf_home: PathBuf::from("/root/.nextflow"),
            resources: Resources::default(),
            storage_gib: DEFAULT_STORAGE_GIB,
            provision_url: PROVISION_URL.to_string(),
            token_var: EXECUTION_TOKEN_VAR.to_string(),
            log_base: DEFAULT_LOG_BASE.to_string(),
            execution_name: None,
        }
    }
}
