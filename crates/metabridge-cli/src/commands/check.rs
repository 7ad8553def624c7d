//! `metabridge check` command implementation.
//!
//! Loads the configuration (which runs the structural validation) and then
//! looks for settings that are legal but probably unintended.

use anyhow::{Context, Result};
use metabridge_client::MetabaseClient;
use metabridge_core::{MetabridgeConfig, ResourceType};
use std::path::PathBuf;
use url::Url;

/// Severity level for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single check finding.
#[derive(Debug, Clone)]
pub struct CheckFinding {
    pub severity: Severity,
    pub category: &'static str,
    pub message: String,
}

impl CheckFinding {
    fn error(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            category,
            message: message.into(),
        }
    }

    fn warning(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            category,
            message: message.into(),
        }
    }

    fn info(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            category,
            message: message.into(),
        }
    }
}

pub fn run(config: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config).context("Configuration is invalid")?;
    let findings = check(&config);

    for finding in &findings {
        println!(
            "[{}] {}: {}",
            finding.severity, finding.category, finding.message
        );
    }

    let errors = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("{} error(s) found in configuration", errors);
    }

    println!("Configuration OK");
    Ok(())
}

/// Inspect a loaded configuration.
pub fn check(config: &MetabridgeConfig) -> Vec<CheckFinding> {
    let mut findings = Vec::new();

    if let Err(e) = MetabaseClient::new(&config.upstream) {
        findings.push(CheckFinding::error("upstream", e.to_string()));
    }

    match (&config.upstream.api_key_env, config.upstream.resolve_api_key()) {
        (Some(var), None) => findings.push(CheckFinding::warning(
            "upstream",
            format!("environment variable {} is not set and no inline api_key is given", var),
        )),
        (None, None) => findings.push(CheckFinding::warning(
            "upstream",
            "no API key configured; requests will be unauthenticated",
        )),
        (None, Some(_)) => findings.push(CheckFinding::info(
            "upstream",
            "api_key is stored inline; prefer api_key_env",
        )),
        (Some(_), Some(_)) => {}
    }

    if config.mcp.is_http() && same_local_port(config) {
        findings.push(CheckFinding::warning(
            "mcp",
            format!(
                "HTTP transport binds {} which is also the upstream base_url",
                config.mcp.bind_addr()
            ),
        ));
    }

    let r = &config.retrieval;
    if r.medium_chunk_size > r.medium_batch_max {
        findings.push(CheckFinding::info(
            "retrieval",
            format!(
                "medium_chunk_size ({}) exceeds medium_batch_max ({}); medium batches run in one wave",
                r.medium_chunk_size, r.medium_batch_max
            ),
        ));
    }

    for resource in ResourceType::ALL {
        let ttl = config.cache.ttl_for(resource);
        if ttl.as_millis() < 1_000 {
            findings.push(CheckFinding::warning(
                "cache",
                format!("{} TTL is under one second ({} ms)", resource, ttl.as_millis()),
            ));
        }
    }

    findings
}

fn same_local_port(config: &MetabridgeConfig) -> bool {
    let Ok(base) = Url::parse(&config.upstream.base_url) else {
        return false;
    };
    let local = matches!(base.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));
    local && base.port_or_known_default() == Some(config.mcp.port)
}
