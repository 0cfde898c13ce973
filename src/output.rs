//! Output directory for scratch files produced while building an image.
//!
//! Without an explicit directory a temporary one is created and removed when
//! the `OutputDir` is dropped.
use crate::error::{Result, VblockError};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Debug)]
pub struct OutputDir {
    root: PathBuf,
    temp: Option<TempDir>,
}

impl OutputDir {
    /// Use (and create if needed) `root`; files are kept after the build.
    pub fn preserved(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| VblockError::io("create", &root, err))?;
        Ok(OutputDir { root, temp: None })
    }

    /// Create a fresh temporary directory.
    pub fn temporary() -> Result<Self> {
        let temp = tempfile::Builder::new()
            .prefix("binman.")
            .tempdir()
            .map_err(|err| VblockError::io("create", std::env::temp_dir(), err))?;
        Ok(OutputDir {
            root: temp.path().to_path_buf(),
            temp: Some(temp),
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Path of a named file inside the output directory.
    pub fn output_filename(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "write file");
    fs::write(path, bytes).map_err(|err| VblockError::io("write", path, err))
}

pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path).map_err(|err| VblockError::io("read", path, err))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read file");
    Ok(bytes)
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
