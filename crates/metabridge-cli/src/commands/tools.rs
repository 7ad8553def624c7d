//! `metabridge tools` - print the tool catalog.

use anyhow::Result;
use metabridge_mcp::catalog;
use serde_json::json;
use std::path::PathBuf;

pub fn run(config: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config)?;
    let tools = catalog::registry(config.retrieval.max_ids_per_request);

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "tools": tools.list() }))?
    );
    Ok(())
}
