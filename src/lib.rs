//! # binman-vblock
//!
//! A Chromium OS verified-boot block (vblock) entry for firmware image
//! assembly. The entry joins the contents of other entries, signs them with
//! `futility`, and uses the signature block as its own contents, signing
//! once provisionally and again after symbols have been written.

pub mod args;
pub mod bintool;
pub mod build;
pub mod collection;
pub mod config;
pub mod description;
pub mod entry;
pub mod error;
pub mod futility;
pub mod node;
pub mod output;
pub mod report;
pub mod vblock;

#[cfg(test)]
mod test_support;

pub use args::{ArgKind, ArgValue, EntryArg, EntryArgs};
pub use bintool::{Bintool, Bintools};
pub use build::{build_vblock, BuildContext, BuildOutcome, BuildPass};
pub use collection::{Collection, ContentSource, SectionContents};
pub use entry::{EntryContents, ResizePolicy};
pub use error::{Result, VblockError};
pub use futility::{FirmwareSigner, Futility, SignFirmware};
pub use node::{Node, PropValue};
pub use output::OutputDir;
pub use vblock::{VblockArgs, VblockEntry, VblockState, PLACEHOLDER_SIZE};
