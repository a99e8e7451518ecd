//! Best effort upload of the nextflow log once a run is over
//!
//! Nothing in here returns an error to the caller: the outcome of the pipeline run is what the
//! execution reports, a missing or failed log upload only shows up in our own log.

use std::fmt;
use std::path::Path;

use anyhow::{anyhow, bail, Result};
use log::{info, warn};
use rusoto_core::{HttpClient, Region};
use rusoto_credential::DefaultCredentialsProvider;
use rusoto_s3::{PutObjectRequest, S3, S3Client};
use url::Url;

use crate::config::{PIPELINE_ID, REMOTE_LOG_NAME, RUNNER_LOG};

/// Object store location of one execution's log
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteLogPath {
    pub bucket: String,
    pub key: String,
}

impl RemoteLogPath {
    /// `<base>/nf_nf_core_mhcquant/<execution name>/nextflow.log`, `base` is `s3://bucket[/prefix]`
    pub fn resolve(base: &str, execution_name: &str) -> Result<RemoteLogPath> {
        let url = Url::parse(base)?;
        if url.scheme() != "s3" {
            bail!("log base {base} is not an s3:// URL");
        }
        let bucket = url.host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| anyhow!("log base {base} has no bucket"))?
            .to_string();

        let key = url.path()
            .split('/')
            .chain([PIPELINE_ID, execution_name, REMOTE_LOG_NAME])
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<&str>>()
            .join("/");

        Ok(RemoteLogPath { bucket, key })
    }
}

impl fmt::Display for RemoteLogPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Somewhere run logs can be put
#[allow(async_fn_in_trait)]
pub trait LogStore {
    async fn upload(&self, local: &Path, remote: &RemoteLogPath) -> Result<()>;
}

pub struct S3LogStore {
    client: S3Client,
}

impl S3LogStore {
    /// Credentials come from the usual AWS chain (environment, profile, instance metadata)
    pub fn new(region: Region) -> Result<S3LogStore> {
        let dispatcher = HttpClient::new()?;
        let credentials = DefaultCredentialsProvider::new()?;
        Ok(S3LogStore { client: S3Client::new_with(dispatcher, credentials, region) })
    }
}

impl LogStore for S3LogStore {
    async fn upload(&self, local: &Path, remote: &RemoteLogPath) -> Result<()> {
        let body = tokio::fs::read(local).await?;
        let request = PutObjectRequest {
            bucket: remote.bucket.clone(),
            key: remote.key.clone(),
            body: Some(body.into()),
            content_type: Some("text/plain".to_string()),
            ..Default::default()
        };
        self.client.put_object(request).await?;
        Ok(())
    }
}

/// Region for the log store, a custom endpoint selects an S3 compatible service
pub fn s3_region(name: Option<&str>, endpoint: Option<&str>) -> Result<Region> {
    Ok(match (name, endpoint) {
        (name, Some(endpoint)) => Region::Custom {
            name: name.unwrap_or("us-east-1").to_string(),
            endpoint: endpoint.to_string(),
        },
        (Some(name), None) => name.parse::<Region>()?,
        (None, None) => Region::default(),
    })
}

/// What happened to the runner log
#[derive(Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded(RemoteLogPath),
    NoLogFile,
    /// The execution name could not be resolved, nothing was attempted
    Skipped,
    Failed(String),
}

/// Upload `<shared dir>/.nextflow.log` if there is one
pub async fn upload_runner_log<S: LogStore>(
    store: &S,
    shared_dir: &Path,
    log_base: &str,
    execution_name: Option<&str>,
) -> UploadOutcome {
    let log = shared_dir.join(RUNNER_LOG);
    if !log.exists() {
        info!("No {} in {}, nothing to upload", RUNNER_LOG, shared_dir.display());
        return UploadOutcome::NoLogFile;
    }

    let name = match execution_name.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => {
            warn!("Skipping logs upload, failed to get execution name");
            return UploadOutcome::Skipped;
        }
    };

    let remote = match RemoteLogPath::resolve(log_base, name) {
        Ok(remote) => remote,
        Err(err) => return UploadOutcome::Failed(err.to_string()),
    };

    info!("Uploading {} to {}", RUNNER_LOG, remote);
    match store.upload(&log, &remote).await {
        Ok(()) => UploadOutcome::Uploaded(remote),
        Err(err) => UploadOutcome::Failed(format!("{remote}: {err:#}")),
    }
}
