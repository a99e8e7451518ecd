//! Shared storage provisioning
//!
//! One authenticated POST per execution. Any failure here aborts the launch, nothing useful can
//! run without the shared volume.

use std::env;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{LaunchError, LaunchResult};

#[derive(Debug, Serialize)]
struct ProvisionRequest {
    storage_gib: u32,
}

#[derive(Debug, Deserialize)]
struct ProvisionResponse {
    name: String,
}

/// Read the execution token from the environment variable `var`
pub fn read_execution_token(var: &str) -> LaunchResult<String> {
    env::var(var).map_err(|_| LaunchError::MissingExecutionToken { variable: var.to_string() })
}

pub struct StorageProvisioner {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl StorageProvisioner {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> StorageProvisioner {
        StorageProvisioner { client: reqwest::Client::new(), url: url.into(), token: token.into() }
    }

    /// Fails with `MissingExecutionToken` before any request is made
    pub fn from_env(url: impl Into<String>, token_var: &str) -> LaunchResult<StorageProvisioner> {
        let token = read_execution_token(token_var)?;
        Ok(StorageProvisioner::new(url, token))
    }

    /// Request a volume of `size_gib` and return its handle (the volume claim name)
    pub async fn provision(&self, size_gib: u32) -> LaunchResult<String> {
        info!("Provisioning shared storage volume ({size_gib} GiB)");
        let response = self.client
            .post(&self.url)
            .header(reqwest::header::AUTHORIZATION, format!("Latch-Execution-Token {}", self.token))
            .json(&ProvisionRequest { storage_gib: size_gib })
            .send()
            .await
            .map_err(|err| LaunchError::ProvisioningError { status: None, message: err.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LaunchError::ProvisioningError { status: Some(status.as_u16()), message: body });
        }

        let volume: ProvisionResponse = response.json().await
            .map_err(|err| LaunchError::ProvisioningError {
                status: Some(status.as_u16()),
                message: format!("unexpected response: {err}"),
            })?;
        info!("Provisioned shared volume {}", volume.name);
        Ok(volume.name)
    }
}
