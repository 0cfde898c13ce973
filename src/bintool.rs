//! External tools (bintools) invoked as subprocesses.
//!
//! A tool is looked up once per registry; a tool that cannot be found stays
//! registered as missing so callers can fall back instead of failing.
use crate::error::{Result, VblockError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Instant;

/// Directory under `$HOME` where fetched bintools are installed.
pub const BINMAN_TOOLS_DIR: &str = ".binman-tools";

/// Bintools this crate knows how to drive, with a short description.
pub const KNOWN_BINTOOLS: &[(&str, &str)] = &[("futility", "Chromium OS firmware utility")];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bintool {
    name: String,
    path: Option<PathBuf>,
}

impl Bintool {
    pub fn new(name: &str, path: Option<PathBuf>) -> Self {
        Bintool {
            name: name.to_string(),
            path,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.path.is_some()
    }

    /// Run the tool with `args`.
    ///
    /// Returns `Ok(None)` if the tool is missing and the captured stdout
    /// otherwise. A non-zero exit is an error carrying the tool's stderr.
    pub fn run_cmd(&self, args: &[String]) -> Result<Option<String>> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        let mut argv = vec![path.display().to_string()];
        argv.extend(args.iter().cloned());
        let command = shell_words::join(&argv);
        tracing::debug!(%command, "run bintool");

        let start = Instant::now();
        let output = Command::new(path)
            .args(args)
            .output()
            .map_err(|source| VblockError::ToolSpawn {
                command: command.clone(),
                source,
            })?;
        let elapsed_ms = start.elapsed().as_millis();
        tracing::debug!(
            tool = %self.name,
            elapsed_ms,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "bintool complete"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VblockError::ToolFailed {
                command,
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }

    /// First line printed by the tool for `args`, if it runs successfully.
    pub fn version(&self, args: &[&str]) -> Option<String> {
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        let stdout = self.run_cmd(&args).ok()??;
        stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    }
}

/// Registry resolving bintool names to handles, once per name.
#[derive(Debug, Default)]
pub struct Bintools {
    toolpaths: Vec<PathBuf>,
    tools: BTreeMap<String, Arc<Bintool>>,
}

impl Bintools {
    /// Search `toolpaths` (in order) before `PATH`.
    pub fn new(toolpaths: Vec<PathBuf>) -> Self {
        Bintools {
            toolpaths,
            tools: BTreeMap::new(),
        }
    }

    /// Like [`Bintools::new`], also searching `~/.binman-tools`.
    pub fn with_default_toolpaths(mut toolpaths: Vec<PathBuf>) -> Self {
        if let Some(home) = dirs::home_dir() {
            toolpaths.push(home.join(BINMAN_TOOLS_DIR));
        }
        Self::new(toolpaths)
    }

    /// Handle for `name`; looked up on first use, then shared.
    pub fn bind(&mut self, name: &str) -> Arc<Bintool> {
        if let Some(tool) = self.tools.get(name) {
            return Arc::clone(tool);
        }
        let path = self.lookup(name);
        match &path {
            Some(path) => tracing::debug!(tool = name, path = %path.display(), "found bintool"),
            None => tracing::debug!(tool = name, "bintool not found"),
        }
        let tool = Arc::new(Bintool::new(name, path));
        self.tools.insert(name.to_string(), Arc::clone(&tool));
        tool
    }

    /// Toolpath candidates are checked as explicit paths, so a directory whose
    /// name holds the `PATH` separator is still usable.
    fn lookup(&self, name: &str) -> Option<PathBuf> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let in_toolpaths = self
            .toolpaths
            .iter()
            .find_map(|dir| which::which_in(dir.join(name), None::<&str>, &cwd).ok());
        in_toolpaths.or_else(|| {
            let path_var = std::env::var_os("PATH")?;
            which::which_in(name, Some(path_var), &cwd).ok()
        })
    }
}

#[cfg(test)]
#[path = "bintool_tests.rs"]
mod tests;
