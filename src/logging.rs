//! Session log file.
//!
//! The UI owns the terminal while the app runs, so diagnostics go to a log
//! file in the config directory instead of stdout/stderr. Error details the
//! user only sees as a generic toast land here in full.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use log::LevelFilter;
use simplelog::{Config, ConfigBuilder, WriteLogger};

pub fn initialize(log_path: &Path) -> Result<()> {
    let file = File::create(log_path)
        .with_context(|| format!("Failed to create log file at {}", log_path.display()))?;

    WriteLogger::init(LevelFilter::Info, build_config(), file)
        .context("Failed to install logger")?;

    Ok(())
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}
