//! Build configuration loaded from JSON and overlaid with CLI flags.
use crate::args::EntryArgs;
use crate::entry::ResizePolicy;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    pub schema_version: u32,
    /// Directories searched for bintools before `PATH`.
    #[serde(default)]
    pub toolpaths: Vec<PathBuf>,
    #[serde(default)]
    pub entry_args: BTreeMap<String, String>,
    /// Keep scratch files here instead of a temporary directory.
    #[serde(default)]
    pub outdir: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub allow_entry_expansion: bool,
    #[serde(default)]
    pub allow_entry_contraction: bool,
    /// Exit successfully even if bintools were missing.
    #[serde(default)]
    pub ignore_missing: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            schema_version: CONFIG_SCHEMA_VERSION,
            toolpaths: Vec::new(),
            entry_args: BTreeMap::new(),
            outdir: None,
            allow_entry_expansion: true,
            allow_entry_contraction: false,
            ignore_missing: false,
        }
    }
}

impl BuildConfig {
    pub fn resize_policy(&self) -> ResizePolicy {
        ResizePolicy {
            allow_expansion: self.allow_entry_expansion,
            allow_contraction: self.allow_entry_contraction,
        }
    }

    pub fn entry_args(&self) -> EntryArgs {
        EntryArgs::from(self.entry_args.clone())
    }
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<BuildConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: BuildConfig =
        serde_json::from_slice(&bytes).context("parse build config JSON")?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &BuildConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported build config schema_version {}",
            config.schema_version
        ));
    }
    if let Some(name) = config.entry_args.keys().find(|name| name.trim().is_empty()) {
        return Err(anyhow!("entry_args contains an empty name ({name:?})"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
