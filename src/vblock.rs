//! Chromium OS verified-boot block (vblock) entry.
//!
//! The entry signs the concatenated contents of other entries with
//! `futility vbutil_firmware` and uses the resulting vblock as its own
//! contents. Signing runs twice: a best-effort first pass so the entry has a
//! size for layout, and a final pass once symbols have been written into the
//! signed entries.
//!
//! Scratch files, in the output directory:
//! - `input.<unique_name>`: data passed to futility
//! - `vblock.<unique_name>`: vblock written by futility
//!
//! When futility is not installed the entry records it as a missing bintool
//! and uses 4KB of zeros instead, so the image keeps its final layout.
use crate::args::{resolve_args_or_props, ArgKind, ArgValue, EntryArg, EntryArgs};
use crate::bintool::Bintools;
use crate::build::BuildContext;
use crate::collection::Collection;
use crate::entry::EntryContents;
use crate::error::{Result, VblockError};
use crate::futility::{FirmwareSigner, Futility, SignFirmware, FUTILITY};
use crate::node::Node;
use crate::output::{read_file, write_file};
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Size of the zero-filled stand-in used when futility is missing.
pub const PLACEHOLDER_SIZE: usize = 4096;

const VBLOCK_ARGS: [EntryArg; 6] = [
    EntryArg::required("keydir", ArgKind::Str),
    EntryArg::required("keyblock", ArgKind::Str),
    EntryArg::required("signprivate", ArgKind::Str),
    EntryArg::required("version", ArgKind::Int),
    EntryArg::required("kernelkey", ArgKind::Str),
    EntryArg::required("preamble-flags", ArgKind::Int),
];

/// Signing parameters, fixed when the entry is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VblockArgs {
    /// Directory holding the keys; the other key names are inside it.
    pub keydir: String,
    pub keyblock: String,
    pub signprivate: String,
    pub version: u32,
    pub kernelkey: String,
    pub preamble_flags: u32,
}

impl VblockArgs {
    pub fn resolve(node: &Node, overrides: &EntryArgs) -> Result<Self> {
        let mut values = resolve_args_or_props(node, overrides, &VBLOCK_ARGS)?.into_iter();
        let mut next = || values.next().flatten();
        Ok(VblockArgs {
            keydir: string_arg(node, &VBLOCK_ARGS[0], next())?,
            keyblock: string_arg(node, &VBLOCK_ARGS[1], next())?,
            signprivate: string_arg(node, &VBLOCK_ARGS[2], next())?,
            version: u32_arg(node, &VBLOCK_ARGS[3], next())?,
            kernelkey: string_arg(node, &VBLOCK_ARGS[4], next())?,
            preamble_flags: u32_arg(node, &VBLOCK_ARGS[5], next())?,
        })
    }

    fn key_path(&self, name: &str) -> PathBuf {
        PathBuf::from(format!("{}/{}", self.keydir, name))
    }
}

fn string_arg(node: &Node, spec: &EntryArg, value: Option<ArgValue>) -> Result<String> {
    match value {
        Some(ArgValue::Str(value)) => Ok(value),
        Some(ArgValue::Int(value)) => Err(VblockError::BadArgType {
            node: node.path.clone(),
            name: spec.name.to_string(),
            value: value.to_string(),
            expected: "string",
        }),
        None => Err(missing(node, spec)),
    }
}

fn u32_arg(node: &Node, spec: &EntryArg, value: Option<ArgValue>) -> Result<u32> {
    let bad = |value: String| VblockError::BadArgType {
        node: node.path.clone(),
        name: spec.name.to_string(),
        value,
        expected: "32-bit unsigned integer",
    };
    match value {
        Some(ArgValue::Int(value)) => u32::try_from(value).map_err(|_| bad(value.to_string())),
        Some(ArgValue::Str(value)) => Err(bad(value)),
        None => Err(missing(node, spec)),
    }
}

fn missing(node: &Node, spec: &EntryArg) -> VblockError {
    VblockError::MissingArg {
        node: node.path.clone(),
        name: spec.name.to_string(),
    }
}

/// Where the entry is in the two-pass signing protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VblockState {
    /// No contents yet; the first pass has not succeeded.
    Unresolved,
    /// Signed (or placeholder) contents from the first pass.
    Provisional,
    /// Re-signed after symbol writing; never changes again.
    Final,
}

impl fmt::Display for VblockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VblockState::Unresolved => "unresolved",
            VblockState::Provisional => "provisional",
            VblockState::Final => "final",
        };
        f.write_str(label)
    }
}

pub struct VblockEntry {
    node: Node,
    unique_name: String,
    args: VblockArgs,
    collection: Collection,
    futility: Option<Arc<dyn FirmwareSigner>>,
    contents: EntryContents,
    state: VblockState,
    missing_bintools: Vec<String>,
}

impl fmt::Debug for VblockEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VblockEntry")
            .field("node", &self.node.path)
            .field("unique_name", &self.unique_name)
            .field("args", &self.args)
            .field("content", &self.collection.phandles())
            .field("signer", &self.futility.as_ref().map(|signer| signer.name()))
            .field("state", &self.state)
            .field("contents_size", &self.contents.contents_size())
            .finish()
    }
}

impl VblockEntry {
    /// Create the entry, resolving every signing parameter up front.
    pub fn new(node: Node, entry_args: &EntryArgs) -> Result<Self> {
        let unique_name = node.unique_name()?;
        let collection = Collection::from_node(&node)?;
        let args = VblockArgs::resolve(&node, entry_args)?;
        Ok(VblockEntry {
            node,
            unique_name,
            args,
            collection,
            futility: None,
            contents: EntryContents::default(),
            state: VblockState::Unresolved,
            missing_bintools: Vec::new(),
        })
    }

    /// Bind futility from the registry unless a signer is already bound.
    pub fn add_bintools(&mut self, btools: &mut Bintools) {
        if self.futility.is_none() {
            self.futility = Some(Arc::new(Futility::bind(btools)));
        }
    }

    /// Bind an alternative signer; returns false if one is already bound.
    pub fn bind_signer(&mut self, signer: Arc<dyn FirmwareSigner>) -> bool {
        if self.futility.is_some() {
            return false;
        }
        self.futility = Some(signer);
        true
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn unique_name(&self) -> &str {
        &self.unique_name
    }

    pub fn args(&self) -> &VblockArgs {
        &self.args
    }

    pub fn state(&self) -> VblockState {
        self.state
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.contents.data()
    }

    pub fn contents_size(&self) -> usize {
        self.contents.contents_size()
    }

    /// Bintools found missing, one record per signing attempt.
    pub fn missing_bintools(&self) -> &[String] {
        &self.missing_bintools
    }

    /// Futility arguments for signing `input` into `output`.
    pub fn sign_request(&self, input: &Path, output: &Path) -> SignFirmware {
        SignFirmware {
            vblock: output.to_path_buf(),
            keyblock: self.args.key_path(&self.args.keyblock),
            signprivate: self.args.key_path(&self.args.signprivate),
            version: self.args.version.to_string(),
            firmware: input.to_path_buf(),
            kernelkey: self.args.key_path(&self.args.kernelkey),
            flags: self.args.preamble_flags.to_string(),
        }
    }

    /// Sign the collected contents.
    ///
    /// Returns `Ok(None)` if the contents are not ready and `required` is
    /// false. Otherwise returns the vblock written by futility, or
    /// [`PLACEHOLDER_SIZE`] zero bytes if futility is missing.
    pub fn get_vblock(&mut self, ctx: &BuildContext<'_>, required: bool) -> Result<Option<Vec<u8>>> {
        let Some(input_data) = self.collection.get_contents(ctx.section, required)? else {
            return Ok(None);
        };

        let output_fname = ctx
            .outdir
            .output_filename(&format!("vblock.{}", self.unique_name));
        let input_fname = ctx
            .outdir
            .output_filename(&format!("input.{}", self.unique_name));
        write_file(&input_fname, &input_data)?;
        remove_stale(&output_fname)?;

        let request = self.sign_request(&input_fname, &output_fname);
        let signer = self.futility.clone();
        let start = Instant::now();
        let stdout = match &signer {
            Some(signer) => signer.sign_firmware(&request)?,
            None => None,
        };

        let data = if stdout.is_some() {
            let data = read_file(&output_fname)?;
            tracing::info!(
                node = %self.node.path,
                elapsed_ms = start.elapsed().as_millis(),
                input_bytes = input_data.len(),
                output_bytes = data.len(),
                "vblock signed"
            );
            data
        } else {
            let name = signer
                .as_ref()
                .map_or_else(|| FUTILITY.to_string(), |signer| signer.name().to_string());
            self.record_missing_bintool(&name);
            vec![0; PLACEHOLDER_SIZE]
        };
        Ok(Some(data))
    }

    /// First pass: sign whatever is available.
    ///
    /// Returns false, leaving the entry unresolved, if the signed entries
    /// have no contents yet.
    pub fn obtain_contents(&mut self, ctx: &BuildContext<'_>) -> Result<bool> {
        if self.state == VblockState::Final {
            return Ok(true);
        }
        let Some(data) = self.get_vblock(ctx, false)? else {
            tracing::debug!(node = %self.node.path, "vblock contents not yet obtainable");
            return Ok(false);
        };
        self.contents.set_contents(data);
        self.state = VblockState::Provisional;
        Ok(true)
    }

    /// Final pass: sign again, since symbol writing may have changed the
    /// signed entries.
    ///
    /// Returns false if the entry changed size and the image layout must be
    /// recomputed.
    pub fn process_contents(&mut self, ctx: &BuildContext<'_>) -> Result<bool> {
        match self.state {
            VblockState::Unresolved => Err(VblockError::PassOrder {
                node: self.node.path.clone(),
                message: "final pass before contents were obtained".to_string(),
            }),
            VblockState::Final => Ok(true),
            VblockState::Provisional => {
                let data = self
                    .get_vblock(ctx, true)?
                    .ok_or_else(|| VblockError::PassOrder {
                        node: self.node.path.clone(),
                        message: "no contents in final pass".to_string(),
                    })?;
                let size_ok =
                    self.contents
                        .update_contents_and_resize(&self.node.path, data, ctx.policy)?;
                self.state = VblockState::Final;
                Ok(size_ok)
            }
        }
    }

    fn record_missing_bintool(&mut self, name: &str) {
        tracing::warn!(
            node = %self.node.path,
            tool = name,
            "missing bintool, using {PLACEHOLDER_SIZE} bytes of zeros for vblock"
        );
        self.missing_bintools.push(name.to_string());
    }
}

fn remove_stale(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(VblockError::io("remove", path, err)),
    }
}

#[cfg(test)]
#[path = "vblock_tests.rs"]
mod tests;
