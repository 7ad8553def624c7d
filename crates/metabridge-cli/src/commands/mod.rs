//! CLI command implementations.

pub mod check;
pub mod serve;
pub mod tools;

use anyhow::{Context, Result};
use metabridge_core::MetabridgeConfig;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `-c` is omitted.
pub const DEFAULT_CONFIG_FILE: &str = "metabridge.yaml";

/// Load the configuration from `path`, or from `metabridge.yaml` in the
/// working directory, or fall back to defaults when neither exists.
pub fn load_config(path: Option<PathBuf>) -> Result<MetabridgeConfig> {
    match path {
        Some(path) => load_file(&path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                load_file(default)
            } else {
                tracing::info!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Ok(MetabridgeConfig::default())
            }
        }
    }
}

fn load_file(path: &Path) -> Result<MetabridgeConfig> {
    let config = MetabridgeConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration from {:?}", path))?;
    tracing::debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}
