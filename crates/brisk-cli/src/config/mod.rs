//! Configuration for the brisk dev server.
//!
//! Settings are merged from several sources, later ones winning:
//! defaults < `brisk.config.json` < `BRISK_*` environment variables < CLI flags.

mod defaults;
mod loading;
mod tests;
mod validation;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use brisk_optimizer::OptimizerOptions;
use serde::{Deserialize, Serialize};

pub use defaults::*;
pub use loading::{CONFIG_FILE, ConfigOverrides};

use crate::error::ConfigError;

/// brisk configuration, loaded from `brisk.config.json`, the environment and
/// CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BriskConfig {
    /// Project root: served files, `package.json` and `node_modules` live here
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Interface to listen on (an IP address or `localhost`)
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Pre-bundle cache directory, relative to `root`
    #[serde(default = "default_cache_dir", alias = "cache_dir")]
    pub cache_dir: PathBuf,

    /// HTML entry served for `/`, relative to `root`
    #[serde(default = "default_index_html", alias = "index_html")]
    pub index_html: PathBuf,

    /// Value of `process.env.NODE_ENV` in pre-bundled dependencies
    #[serde(default = "default_mode")]
    pub mode: String,
}

impl Default for BriskConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            host: default_host(),
            port: default_port(),
            cache_dir: default_cache_dir(),
            index_html: default_index_html(),
            mode: default_mode(),
        }
    }
}

impl BriskConfig {
    /// Address the server binds to.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] when `host` is neither an IP address nor
    /// `localhost`.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host.parse::<IpAddr>().map_err(|_| {
                ConfigError::invalid(
                    "host",
                    &self.host,
                    "Use an IP address such as 127.0.0.1 or 0.0.0.0, or localhost",
                )
            })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }

    /// URL printed in the startup banner.
    pub fn server_url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }

    /// Absolute path of the HTML entry.
    pub fn index_html_path(&self) -> PathBuf {
        self.root.join(&self.index_html)
    }

    /// Pre-bundler options for this project.
    pub fn optimizer_options(&self) -> OptimizerOptions {
        OptimizerOptions::new(&self.root)
            .with_cache_dir(&self.cache_dir)
            .with_mode(&self.mode)
    }
}
