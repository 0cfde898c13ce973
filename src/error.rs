//! Error types for vblock entry processing.
//!
//! A missing bintool is not an error: signer invocations report it as
//! `Ok(None)` so the entry can fall back to placeholder contents.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VblockError {
    #[error("Node '{node}': Missing required property/entry arg '{name}'")]
    MissingArg { node: String, name: String },

    #[error("Node '{node}': Cannot convert {name} value {value:?} to {expected}")]
    BadArgType {
        node: String,
        name: String,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid entry argument {raw:?} (expected name=value)")]
    BadEntryArg { raw: String },

    #[error("Invalid node path {path:?}")]
    InvalidNode { path: String },

    #[error("Node '{node}': Collection must have a 'content' property")]
    EmptyCollection { node: String },

    #[error("Node '{node}': Cannot find entry for phandle {phandle}")]
    UnknownPhandle { node: String, phandle: u32 },

    #[error("Node '{node}': Entry '{entry}' has no contents")]
    ContentNotReady { node: String, entry: String },

    #[error("Error {status} running '{command}': {stderr}")]
    ToolFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Cannot run '{command}': {source}")]
    ToolSpawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Node '{node}': Cannot update entry size from {old} to {new}")]
    SizeChange { node: String, old: usize, new: usize },

    #[error("Node '{node}': {message}")]
    PassOrder { node: String, message: String },
}

impl VblockError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        VblockError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// True for failures caused by the image description or entry arguments.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            VblockError::MissingArg { .. }
                | VblockError::BadArgType { .. }
                | VblockError::BadEntryArg { .. }
                | VblockError::InvalidNode { .. }
                | VblockError::EmptyCollection { .. }
                | VblockError::UnknownPhandle { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, VblockError>;
