//! The externally invocable nf-core/mhcquant workflow: provision storage, then run nextflow

use std::path::PathBuf;

use log::info;

use crate::config::LaunchConfig;
use crate::error::LaunchResult;
use crate::params::input::ParameterValues;
use crate::params::schema::{ParameterDescriptor, ParameterSchema};
use crate::provision::StorageProvisioner;
use crate::runtime::invoke::RuntimeInvoker;
use crate::runtime::log_upload::LogStore;

/// State of one workflow execution
#[derive(Debug)]
pub struct ExecutionContext {
    pub volume_handle: String,
    pub working_directory: PathBuf,
    pub parameter_values: ParameterValues,
}

pub struct Workflow<'a, S> {
    config: &'a LaunchConfig,
    schema: ParameterSchema,
    store: &'a S,
}

impl<'a, S: LogStore> Workflow<'a, S> {
    pub fn new(config: &'a LaunchConfig, store: &'a S) -> Self {
        Workflow { config, schema: ParameterSchema::mhcquant(), store }
    }

    /// Entrypoint parameters in the order they are declared
    pub fn entrypoint(&self) -> impl Iterator<Item = &'static ParameterDescriptor> {
        self.schema.iter()
    }

    /// Provision the shared volume once, then hand it to the runtime step
    pub async fn execute(&self, parameter_values: ParameterValues) -> LaunchResult<ExecutionContext> {
        let config = self.config;
        let provisioner = StorageProvisioner::from_env(config.provision_url.as_str(), &config.token_var)?;
        let volume_handle = provisioner.provision(config.storage_gib).await?;

        let context = ExecutionContext {
            volume_handle,
            working_directory: config.shared_dir.clone(),
            parameter_values,
        };
        info!("Running in {} on volume {}", context.working_directory.display(), context.volume_handle);

        RuntimeInvoker::new(config, self.schema, self.store)
            .run(&context.volume_handle, &context.parameter_values)
            .await?;
        Ok(context)
    }
}
