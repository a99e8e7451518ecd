//! Everything that happens on the runtime task once storage is provisioned

/// Copy the launch tree into the shared directory
pub mod copy;
/// Build the nextflow command line and child environment
pub mod command;
/// Remote log locations and the best effort upload
pub mod log_upload;
/// Copy, run, upload
pub mod invoke;

#[cfg(all(test, unix))]
pub mod testing {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    /// A stand-in for nextflow that records how it was called, writes a log and exits with `code`
    pub fn fake_runner(dir: &Path, code: i32) -> PathBuf {
        let path = dir.join("nextflow");
        let script = format!(
            "#!/bin/sh\n\
             echo \"$@\" > args.txt\n\
             echo \"$K8S_STORAGE_CLAIM_NAME $NXF_DISABLE_CHECK_LATEST\" > env.txt\n\
             echo \"runner log\" > .nextflow.log\n\
             exit {code}\n"
        );
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}
