//! `brisk dev`: pre-bundle dependencies, then serve the project.

use std::sync::Arc;
use std::time::Instant;

use crate::cli::DevArgs;
use crate::commands::{current_dir, prebundle};
use crate::config::{BriskConfig, ConfigOverrides};
use crate::dev::{DevContext, DevServer};
use crate::error::Result;
use crate::ui;

/// Execute the dev command.
///
/// 1. Load and validate configuration
/// 2. Pre-bundle dependencies unless the cache directory exists (fatal on failure)
/// 3. Serve until Ctrl+C
pub async fn execute(args: DevArgs) -> Result<()> {
    let started = Instant::now();

    let config = BriskConfig::load(&current_dir()?, &ConfigOverrides::from(&args))?;
    config.validate()?;
    let addr = config.socket_addr()?;
    tracing::debug!(?config, "loaded configuration");

    ui::info(&format!("Project root: {}", config.root.display()));
    if !config.index_html_path().is_file() {
        ui::warning(&format!(
            "{} not found, `/` will return 404",
            config.index_html_path().display()
        ));
    }

    prebundle(&config).await?;

    let context = Arc::new(DevContext::from_config(&config));
    ui::print_banner(&config.server_url(), started.elapsed());

    DevServer::new(addr, context).start().await
}
