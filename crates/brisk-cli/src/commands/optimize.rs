//! `brisk optimize`: pre-bundle dependencies ahead of time.

use crate::cli::OptimizeArgs;
use crate::commands::{current_dir, prebundle};
use crate::config::{BriskConfig, ConfigOverrides};
use crate::error::Result;

/// Execute the optimize command.
pub async fn execute(args: OptimizeArgs) -> Result<()> {
    let config = BriskConfig::load(&current_dir()?, &ConfigOverrides::from(&args))?;
    config.validate()?;

    let outcome = prebundle(&config).await?;
    if outcome.skipped {
        crate::ui::info("Delete the cache directory to pre-bundle again");
    }
    Ok(())
}
