use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use log::info;

use crate::config::LaunchConfig;
use crate::params::docs::render_markdown;
use crate::params::input::ParameterFile;
use crate::params::schema::ParameterSchema;
use crate::profile::ExecutionProfile;
use crate::runtime::command::CommandLine;
use crate::runtime::log_upload::{s3_region, S3LogStore};
use crate::workflow::Workflow;

mod config;
mod error;
mod params;
mod profile;
mod provision;
mod runtime;
mod workflow;

#[derive(Parser, Debug)]
#[command(author, version, about = "Launch nf-core/mhcquant on a provisioned shared volume", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Provision storage, run the pipeline and upload its log
    Run(RunArgs),
    /// Print a markdown reference of the pipeline parameters
    Describe,
    /// Print the JSON schema parameter files are validated against
    Schema,
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// JSON file of pipeline parameter values
    #[arg(long)]
    params: PathBuf,
    /// Validate parameters and print the nextflow command, without provisioning or running anything
    #[arg(long)]
    dry_run: bool,
    /// Tree copied into the shared directory
    #[arg(long, default_value = config::DEFAULT_SOURCE_DIR)]
    source_dir: PathBuf,
    /// Shared directory nextflow runs in
    #[arg(long, default_value = config::DEFAULT_SHARED_DIR)]
    shared_dir: PathBuf,
    /// Path to the nextflow executable
    #[arg(long, default_value = config::DEFAULT_RUNNER)]
    runner: PathBuf,
    #[arg(long, value_enum, default_value_t = ExecutionProfile::Docker)]
    profile: ExecutionProfile,
    /// Nextflow configuration file passed with -c
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE)]
    config_file: String,
    /// CPUs allocated to the runtime task
    #[arg(long, default_value_t = config::DEFAULT_CPUS)]
    cpus: u32,
    /// Memory allocated to the runtime task, in GiB
    #[arg(long, default_value_t = config::DEFAULT_MEMORY_GIB)]
    memory_gib: u32,
    /// Size of the shared volume to provision, in GiB
    #[arg(long, default_value_t = config::DEFAULT_STORAGE_GIB)]
    storage_gib: u32,
    #[arg(long, default_value = config::PROVISION_URL)]
    provision_url: String,
    /// s3://bucket/prefix that run logs are uploaded under
    #[arg(long, default_value = config::DEFAULT_LOG_BASE)]
    log_base: String,
    /// Endpoint of an S3 compatible object store
    #[arg(long)]
    s3_endpoint: Option<String>,
    #[arg(long)]
    s3_region: Option<String>,
    /// Name of this execution, used in the remote log path
    #[arg(long, env = "EXECUTION_NAME")]
    execution_name: Option<String>,
}

impl From<&RunArgs> for LaunchConfig {
    fn from(args: &RunArgs) -> Self {
        let defaults = LaunchConfig::default();
        LaunchConfig {
            source_dir: args.source_dir.clone(),
            shared_dir: args.shared_dir.clone(),
            runner: args.runner.clone(),
            profile: args.profile,
            config_file: args.config_file.clone(),
            resources: config::Resources { cpus: args.cpus, memory_gib: args.memory_gib },
            storage_gib: args.storage_gib,
            provision_url: args.provision_url.clone(),
            log_base: args.log_base.clone(),
            execution_name: args.execution_name.clone(),
            ..defaults
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    info!("mhcquant launcher starting up");

    let args = Args::parse();
    let schema = ParameterSchema::mhcquant();
    match args.command {
        Commands::Run(run) => launch(run, schema).await,
        Commands::Describe => {
            let markdown = render_markdown(&schema)
                .map_err(|err| anyhow!("can't render parameter reference: {err}"))?;
            print!("{markdown}");
            Ok(())
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&schema.json_schema())?);
            Ok(())
        }
    }
}

async fn launch(args: RunArgs, schema: ParameterSchema) -> anyhow::Result<()> {
    let values = ParameterFile::new(&args.params).read(&schema)?;
    let config = LaunchConfig::from(&args);

    if args.dry_run {
        info!("--dry-run set, not provisioning storage or launching nextflow");
        let cmd = CommandLine::build(&config, &schema, &values)?;
        println!("{}", serde_json::to_string_pretty(cmd.tokens())?);
        return Ok(());
    }

    let region = s3_region(args.s3_region.as_deref(), args.s3_endpoint.as_deref())?;
    let store = S3LogStore::new(region)?;
    let workflow = Workflow::new(&config, &store);
    info!("Launching with {} of {} declared parameters set", values.len(), workflow.entrypoint().count());

    let context = workflow.execute(values).await?;
    info!("Execution on volume {} finished", context.volume_handle);
    Ok(())
}
