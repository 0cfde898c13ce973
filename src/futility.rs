//! Firmware signing through the `futility` bintool.
use crate::bintool::{Bintool, Bintools};
use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;

pub const FUTILITY: &str = "futility";

/// Arguments for signing a firmware body into a vblock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignFirmware {
    /// Output vblock file.
    pub vblock: PathBuf,
    pub keyblock: PathBuf,
    pub signprivate: PathBuf,
    pub version: String,
    /// Firmware body to sign.
    pub firmware: PathBuf,
    pub kernelkey: PathBuf,
    pub flags: String,
}

/// Something that can produce a vblock for a firmware body.
pub trait FirmwareSigner {
    /// Tool name, recorded when the signer is missing.
    fn name(&self) -> &str;

    /// Sign `request.firmware` into `request.vblock`.
    ///
    /// `Ok(None)` means the signer is not installed and nothing was written.
    fn sign_firmware(&self, request: &SignFirmware) -> Result<Option<String>>;
}

/// `futility vbutil_firmware` wrapper.
#[derive(Debug, Clone)]
pub struct Futility {
    tool: Arc<Bintool>,
}

impl Futility {
    pub fn new(tool: Arc<Bintool>) -> Self {
        Futility { tool }
    }

    pub fn bind(btools: &mut Bintools) -> Self {
        Futility::new(btools.bind(FUTILITY))
    }

    pub fn tool(&self) -> &Bintool {
        &self.tool
    }

    pub fn version(&self) -> Option<String> {
        self.tool.version(&["version"])
    }
}

impl FirmwareSigner for Futility {
    fn name(&self) -> &str {
        self.tool.name()
    }

    fn sign_firmware(&self, request: &SignFirmware) -> Result<Option<String>> {
        self.tool.run_cmd(&vbutil_firmware_args(request))
    }
}

/// Command-line arguments for `futility vbutil_firmware`.
pub fn vbutil_firmware_args(request: &SignFirmware) -> Vec<String> {
    vec![
        "vbutil_firmware".to_string(),
        "--vblock".to_string(),
        request.vblock.display().to_string(),
        "--keyblock".to_string(),
        request.keyblock.display().to_string(),
        "--signprivate".to_string(),
        request.signprivate.display().to_string(),
        "--version".to_string(),
        request.version.clone(),
        "--fv".to_string(),
        request.firmware.display().to_string(),
        "--kernelkey".to_string(),
        request.kernelkey.display().to_string(),
        "--flags".to_string(),
        request.flags.clone(),
    ]
}

#[cfg(test)]
#[path = "futility_tests.rs"]
mod tests;
