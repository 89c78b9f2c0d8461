//! CLI command implementations.

pub mod batch;
pub mod config;
pub mod run;

use std::path::Path;

use gner_core::GnerConfig;

/// Load the effective configuration, falling back to defaults when no
/// file is given.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<GnerConfig> {
    match config_path {
        Some(path) => Ok(GnerConfig::from_file(Path::new(path))?),
        None => Ok(GnerConfig::default()),
    }
}
