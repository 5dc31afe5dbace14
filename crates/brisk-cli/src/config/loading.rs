use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use path_clean::PathClean;
use serde::Serialize;

use crate::cli::{DevArgs, OptimizeArgs, ProjectArgs};
use crate::config::BriskConfig;
use crate::error::{ConfigError, Result};

/// Config file looked up in the project directory.
pub const CONFIG_FILE: &str = "brisk.config.json";

/// `BRISK_*` variables read as configuration. Others, such as `BRISK_LOG`,
/// are left to whoever set them.
const ENV_KEYS: &[&str] = &["root", "host", "port", "cache_dir", "index_html", "mode"];

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(skip)]
    pub config: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl From<&ProjectArgs> for ConfigOverrides {
    fn from(args: &ProjectArgs) -> Self {
        Self {
            config: args.config.clone(),
            root: args.root.clone(),
            mode: args.mode.clone(),
            ..Self::default()
        }
    }
}

impl From<&DevArgs> for ConfigOverrides {
    fn from(args: &DevArgs) -> Self {
        Self {
            host: args.host.clone(),
            port: args.port,
            ..Self::from(&args.project)
        }
    }
}

impl From<&OptimizeArgs> for ConfigOverrides {
    fn from(args: &OptimizeArgs) -> Self {
        Self::from(&args.project)
    }
}

impl BriskConfig {
    /// Load configuration for a project.
    ///
    /// The config file is `overrides.config` when given, otherwise
    /// `brisk.config.json` in the project directory (`--root` or `cwd`) if it
    /// exists. Relative paths are resolved against `cwd`; `root` is returned
    /// absolute and cleaned.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotFound`] when an explicit config file is missing and
    /// [`ConfigError::InvalidValue`] when any source has a malformed value.
    pub fn load(cwd: &Path, overrides: &ConfigOverrides) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = match &overrides.config {
            Some(path) => {
                let path = cwd.join(path);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Some(path)
            }
            None => {
                let project_dir = cwd.join(overrides.root.as_deref().unwrap_or(Path::new(".")));
                let default_path = project_dir.join(CONFIG_FILE);
                default_path.is_file().then_some(default_path)
            }
        };

        if let Some(path) = &config_file {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Json::file(path));
        }

        // BRISK_PORT, BRISK_CACHE_DIR, ...
        figment = figment.merge(Env::prefixed("BRISK_").only(ENV_KEYS));
        figment = figment.merge(Serialized::defaults(overrides));

        let mut config: Self = figment.extract().map_err(|e| {
            let field = if e.path.is_empty() {
                "configuration".to_string()
            } else {
                e.path.join(".")
            };
            ConfigError::invalid(
                field,
                e.to_string(),
                "Check brisk.config.json and BRISK_* variables for typos and field types",
            )
        })?;

        config.root = cwd.join(&config.root).clean();
        Ok(config)
    }
}
