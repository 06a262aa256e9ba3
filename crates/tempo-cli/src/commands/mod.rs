//! CLI command implementations

pub mod config;
pub mod simulate;

use anyhow::{Context, Result};
use std::path::Path;
use tempo_core::TempoConfig;

/// Load an explicit config file, or layer defaults, `./tempo.toml` and env vars
pub fn resolve_config(path: Option<&str>) -> Result<TempoConfig> {
    match path {
        Some(path) => TempoConfig::load_from_file(Path::new(path))
            .with_context(|| format!("Failed to load config {}", path)),
        None => TempoConfig::load(Path::new(".")).context("Failed to load project config"),
    }
}
