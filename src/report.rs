//! Build summary printed after signing.
use crate::build::BuildOutcome;
use crate::vblock::{VblockEntry, VblockState};
use serde::Serialize;
use std::path::Path;

/// Exit code when the image was written but bintools were missing.
pub const EXIT_MISSING_BINTOOLS: u8 = 103;

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub entry: String,
    pub unique_name: String,
    pub state: VblockState,
    pub size: usize,
    pub repack_required: bool,
    pub missing_bintools: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outdir: Option<String>,
}

impl BuildReport {
    pub fn new(
        entry: &VblockEntry,
        outcome: &BuildOutcome,
        output: Option<&Path>,
        outdir: Option<&Path>,
    ) -> Self {
        BuildReport {
            entry: entry.node().path.clone(),
            unique_name: entry.unique_name().to_string(),
            state: entry.state(),
            size: outcome.data.len(),
            repack_required: outcome.repack_required,
            missing_bintools: outcome.missing_bintools.clone(),
            output: output.map(|path| path.display().to_string()),
            outdir: outdir.map(|path| path.display().to_string()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.missing_bintools.is_empty()
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("entry: {} ({})\n", self.entry, self.unique_name));
        out.push_str(&format!("state: {}\n", self.state));
        out.push_str(&format!("size: {:#x} ({} bytes)\n", self.size, self.size));
        if self.repack_required {
            out.push_str("layout: entry changed size, image must be repacked\n");
        }
        if let Some(output) = &self.output {
            out.push_str(&format!("output: {output}\n"));
        }
        if let Some(outdir) = &self.outdir {
            out.push_str(&format!("outdir: {outdir}\n"));
        }
        if !self.is_valid() {
            out.push_str(&format!(
                "Image is missing bintools: {}\n",
                self.missing_bintools.join(" ")
            ));
            out.push_str("Some images are invalid\n");
        }
        out
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
