pub mod compile;
pub mod create;
pub mod install;
pub mod pdf;
pub mod preview;
pub mod status;

use anyhow::Context;
use qd_core::config::Config;
use qd_core::locator::Locator;
use qd_core::platform::PlatformFamily;
use qd_core::provision::{Provisioner, StdinConfirm};
use qd_core::runner::SystemRunner;
use std::path::Path;

/// Load config, surfacing validation errors before any work starts.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let config = Config::load(explicit).context("failed to load config")?;
    for warning in config.validate() {
        tracing::warn!("config: {}", warning.message);
    }
    Ok(config)
}

pub fn provisioner(config: &Config) -> Provisioner<'_, SystemRunner, StdinConfirm> {
    Provisioner::new(
        config,
        Locator::from_config(&config.tool),
        SystemRunner,
        StdinConfirm,
        PlatformFamily::detect(),
    )
}
