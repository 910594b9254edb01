//! Config command - print the effective settings as TOML.

use anyhow::{Context, Result};

use crate::config::Settings;

/// Run the config command.
pub fn run(settings: &Settings) -> Result<()> {
    let rendered = toml::to_string_pretty(settings).context("Failed to render settings")?;
    print!("{rendered}");
    Ok(())
}
