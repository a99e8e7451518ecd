use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;

use crate::config::LaunchConfig;
use crate::error::LaunchResult;
use crate::params::flag::translate;
use crate::params::input::ParameterValues;
use crate::params::schema::ParameterSchema;

/// Full nextflow invocation: runner tokens first, then parameter flags in declaration order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLine {
    tokens: Vec<String>,
}

impl CommandLine {
    pub fn build(config: &LaunchConfig, schema: &ParameterSchema, values: &ParameterValues) -> LaunchResult<CommandLine> {
        let shared = config.shared_dir.display().to_string();
        let mut tokens = vec![
            config.runner.display().to_string(),
            "run".to_string(),
            config.shared_dir.join(&config.pipeline_entry).display().to_string(),
            "-work-dir".to_string(),
            shared,
            "-profile".to_string(),
            config.profile.to_string(),
            "-c".to_string(),
            config.config_file.clone(),
        ];

        for param in schema.iter() {
            tokens.extend(translate(schema, param.name, values.get(param.name))?);
        }

        Ok(CommandLine { tokens })
    }

    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

/// Space separated, for logs only: tokens are passed to the child unsplit
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

/// Child environment: everything inherited from `base`, with nextflow settings on top
///
/// Names and values are kept as OS strings, inherited variables that aren't UTF-8 are passed on
/// untouched.
pub fn runner_environment<I>(base: I, config: &LaunchConfig, volume_handle: &str) -> BTreeMap<OsString, OsString>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut env: BTreeMap<OsString, OsString> = base.into_iter().collect();
    env.insert("NXF_HOME".into(), config.nxf_home.clone().into_os_string());
    env.insert("NXF_OPTS".into(), config.resources.nxf_opts().into());
    env.insert("K8S_STORAGE_CLAIM_NAME".into(), volume_handle.into());
    env.insert("NXF_DISABLE_CHECK_LATEST".into(), "true".into());
    env
}
