//! Client configuration, read from JSON. Missing fields take their defaults.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// How long to wait for ledger inclusion after a broadcast is acknowledged
    pub confirmation_timeout_ms: u64,
    /// Delay between confirmation polls
    pub poll_interval_ms: u64,
    /// Validate locally before touching the network and ask the ledger to simulate
    pub preflight: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_ms: 30_000,
            poll_interval_ms: 500,
            preflight: true,
        }
    }
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid client config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&json)
    }
}
