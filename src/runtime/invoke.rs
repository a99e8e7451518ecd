use std::env;

use log::{info, warn};
use tokio::process::Command;

use crate::config::{LaunchConfig, IGNORED_ENTRIES};
use crate::error::{LaunchError, LaunchResult};
use crate::params::input::ParameterValues;
use crate::params::schema::ParameterSchema;
use crate::runtime::command::{runner_environment, CommandLine};
use crate::runtime::copy::copy_tree;
use crate::runtime::log_upload::{upload_runner_log, LogStore, UploadOutcome};

/// Runs nextflow in the shared directory and uploads its log afterwards
pub struct RuntimeInvoker<'a, S> {
    config: &'a LaunchConfig,
    schema: ParameterSchema,
    store: &'a S,
}

impl<'a, S: LogStore> RuntimeInvoker<'a, S> {
    pub fn new(config: &'a LaunchConfig, schema: ParameterSchema, store: &'a S) -> Self {
        RuntimeInvoker { config, schema, store }
    }

    /// Launch the pipeline, then try to upload `.nextflow.log` whatever the launch returned
    ///
    /// The upload never changes the result: a failed run stays failed, a successful run stays
    /// successful even when the upload is skipped or fails.
    pub async fn run(&self, volume_handle: &str, values: &ParameterValues) -> LaunchResult<()> {
        let result = self.launch(volume_handle, values).await;
        if let Err(err) = &result {
            warn!("Launch failed: {err}");
        }

        let config = self.config;
        let outcome = upload_runner_log(
            self.store,
            &config.shared_dir,
            &config.log_base,
            config.execution_name.as_deref(),
        ).await;
        match outcome {
            UploadOutcome::Uploaded(remote) => info!("Uploaded runner log to {remote}"),
            UploadOutcome::Failed(reason) => warn!("Runner log not uploaded: {reason}"),
            UploadOutcome::NoLogFile | UploadOutcome::Skipped => {}
        }

        result
    }

    async fn launch(&self, volume_handle: &str, values: &ParameterValues) -> LaunchResult<()> {
        let config = self.config;
        let cmd = CommandLine::build(config, &self.schema, values)?;

        copy_tree(&config.source_dir, &config.shared_dir, &IGNORED_ENTRIES)?;

        info!("Launching Nextflow Runtime");
        info!("{cmd}");

        let child_env = runner_environment(env::vars_os(), config, volume_handle);

        let status = Command::new(cmd.program())
            .args(cmd.args())
            .env_clear()
            .envs(&child_env)
            .current_dir(&config.shared_dir)
            .status()
            .await
            .map_err(|err| LaunchError::io(format!("can't start {}", cmd.program()), err))?;

        if status.success() {
            info!("Nextflow finished successfully");
            Ok(())
        } else {
            Err(LaunchError::PipelineExecutionFailed { command: cmd.to_string(), code: status.code() })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::params::value::ParameterValue;
    use crate::runtime::log_upload::fake::MemoryStore;
    use crate::runtime::log_upload::RemoteLogPath;
    use crate::runtime::testing::fake_runner;

    struct Fixture {
        _dirs: Vec<TempDir>,
        config: LaunchConfig,
    }

    fn fixture(code: i32) -> Fixture {
        let source = tempfile::tempdir().unwrap();
        let shared = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        fs::write(source.path().join("main.nf"), "workflow {}").unwrap();
        fs::create_dir(source.path().join("work")).unwrap();
        fs::write(source.path().join("work/stale"), "old").unwrap();

        let config = LaunchConfig {
            source_dir: source.path().to_path_buf(),
            shared_dir: shared.path().to_path_buf(),
            runner: fake_runner(bin.path(), code),
            log_base: "s3://logs/your_log_dir".to_string(),
            execution_name: Some("exec-1".to_string()),
            ..LaunchConfig::default()
        };
        Fixture { _dirs: vec![source, shared, bin], config }
    }

    fn values() -> ParameterValues {
        let mut values = ParameterValues::new();
        values.insert("input".into(), ParameterValue::File("samples.tsv".into()));
        values.insert("quantify".into(), ParameterValue::Boolean(true));
        values
    }

    fn uploaded_log() -> RemoteLogPath {
        RemoteLogPath { bucket: "logs".into(), key: "your_log_dir/nf_nf_core_mhcquant/exec-1/nextflow.log".into() }
    }

    #[tokio::test]
    async fn successful_run() {
        let fx = fixture(0);
        let store = MemoryStore::default();
        let invoker = RuntimeInvoker::new(&fx.config, ParameterSchema::mhcquant(), &store);

        invoker.run("pvc-1", &values()).await.unwrap();

        let shared = &fx.config.shared_dir;
        assert!(shared.join("main.nf").exists());
        assert!(!shared.join("work").exists());

        let args = fs::read_to_string(shared.join("args.txt")).unwrap();
        let expected = format!(
            "run {0}/main.nf -work-dir {0} -profile docker -c latch.config --input samples.tsv --quantify\n",
            shared.display()
        );
        assert_eq!(args, expected);
        assert_eq!(fs::read_to_string(shared.join("env.txt")).unwrap(), "pvc-1 true\n");

        let uploads = store.uploads.lock().unwrap();
        assert_eq!(uploads.as_slice(), [(uploaded_log(), "runner log\n".to_string())]);
    }

    #[tokio::test]
    async fn failed_run_still_uploads_log() {
        let fx = fixture(1);
        let store = MemoryStore::default();
        let invoker = RuntimeInvoker::new(&fx.config, ParameterSchema::mhcquant(), &store);

        let err = invoker.run("pvc-1", &values()).await.unwrap_err();

        assert!(matches!(err, LaunchError::PipelineExecutionFailed { code: Some(1), .. }));
        assert_eq!(store.uploads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upload_failure_keeps_success() {
        let fx = fixture(0);
        let store = MemoryStore { fail: true, ..MemoryStore::default() };
        let invoker = RuntimeInvoker::new(&fx.config, ParameterSchema::mhcquant(), &store);

        assert!(invoker.run("pvc-1", &values()).await.is_ok());
    }

    #[tokio::test]
    async fn missing_execution_name_keeps_failure() {
        let mut fx = fixture(3);
        fx.config.execution_name = None;
        let store = MemoryStore::default();
        let invoker = RuntimeInvoker::new(&fx.config, ParameterSchema::mhcquant(), &store);

        let err = invoker.run("pvc-1", &values()).await.unwrap_err();
        assert!(matches!(err, LaunchError::PipelineExecutionFailed { code: Some(3), .. }));
        assert!(store.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn runner_inherits_non_utf8_environment() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        use std::os::unix::fs::PermissionsExt;

        let fx = fixture(0);
        let runner = fx.config.runner.with_file_name("report-env");
        fs::write(&runner, "#!/bin/sh\necho \"${MHCQUANT_TEST_RAW_LABEL:+set}\" > raw.txt\n").unwrap();
        fs::set_permissions(&runner, fs::Permissions::from_mode(0o755)).unwrap();
        env::set_var("MHCQUANT_TEST_RAW_LABEL", OsStr::from_bytes(b"caf\xe9"));

        let config = LaunchConfig { runner, ..fx.config.clone() };
        let store = MemoryStore::default();
        RuntimeInvoker::new(&config, ParameterSchema::mhcquant(), &store)
            .run("pvc-1", &values())
            .await
            .unwrap();

        assert_eq!(fs::read_to_string(config.shared_dir.join("raw.txt")).unwrap(), "set\n");
    }

    #[tokio::test]
    async fn wrong_value_type_never_starts_runner() {
        let fx = fixture(0);
        let store = MemoryStore::default();
        let invoker = RuntimeInvoker::new(&fx.config, ParameterSchema::mhcquant(), &store);
        let mut values = values();
        values.insert("num_hits".into(), ParameterValue::Float(2.5));

        let err = invoker.run("pvc-1", &values).await.unwrap_err();
        assert!(matches!(err, LaunchError::InvalidParameterType { .. }));
        assert!(!fx.config.shared_dir.join("args.txt").exists());
    }
}
