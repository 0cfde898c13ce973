//! JSON description of a vblock entry and the entries it signs.
//!
//! ```json
//! {
//!   "entry": {"path": "/binman/rw-a/vblock", "props": {"content": [1, 2]}},
//!   "contents": [
//!     {"phandle": 1, "name": "u-boot", "file": "u-boot.bin"},
//!     {"phandle": 2, "name": "u-boot-dtb", "file": "u-boot.dtb"}
//!   ]
//! }
//! ```
use crate::collection::SectionContents;
use crate::node::Node;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubEntry {
    pub phandle: u32,
    pub name: String,
    /// Relative paths are resolved against the description's directory.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Description {
    pub entry: Node,
    #[serde(default)]
    pub contents: Vec<SubEntry>,
}

pub fn load_description(path: &Path) -> Result<Description> {
    let bytes = fs::read(path).with_context(|| format!("read description {}", path.display()))?;
    serde_json::from_slice(&bytes).context("parse description JSON")
}

impl Description {
    /// Load sub-entry data. An entry with no file, or whose file does not
    /// exist yet, has no contents; any other read failure is an error.
    pub fn section(&self, base: &Path) -> Result<SectionContents> {
        let mut section = SectionContents::new();
        for sub in &self.contents {
            let data = match &sub.file {
                Some(file) => read_sub_entry(&sub.name, &base.join(file))?,
                None => None,
            };
            section.add_entry(sub.phandle, &sub.name, data);
        }
        Ok(section)
    }
}

fn read_sub_entry(name: &str, path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(data) => Ok(Some(data)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(entry = name, path = %path.display(), "no contents yet");
            Ok(None)
        }
        Err(err) => {
            Err(err).with_context(|| format!("read entry '{name}' from {}", path.display()))
        }
    }
}

#[cfg(test)]
#[path = "description_tests.rs"]
mod tests;
