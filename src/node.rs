//! Entry nodes from the image description.
//!
//! Only the pieces an entry consumes are modelled here: the node path and its
//! properties. Parsing the description language itself happens elsewhere.
use crate::error::{Result, VblockError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Node name that roots the image description.
const BINMAN_NODE: &str = "binman";

/// A property value as it appears on a description node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Int(i64),
    Str(String),
    Cells(Vec<u32>),
}

impl PropValue {
    /// Text form used in error messages.
    pub fn describe(&self) -> String {
        match self {
            PropValue::Int(value) => value.to_string(),
            PropValue::Str(value) => value.clone(),
            PropValue::Cells(cells) => format!("{cells:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Node {
    pub path: String,
    #[serde(default)]
    pub props: BTreeMap<String, PropValue>,
}

impl Node {
    pub fn new(path: impl Into<String>) -> Self {
        Node {
            path: path.into(),
            props: BTreeMap::new(),
        }
    }

    pub fn with_prop(mut self, name: &str, value: PropValue) -> Self {
        self.props.insert(name.to_string(), value);
        self
    }

    pub fn prop(&self, name: &str) -> Option<&PropValue> {
        self.props.get(name)
    }

    /// Last path component, e.g. `vblock` for `/binman/vblock`.
    pub fn name(&self) -> Result<&str> {
        self.components()
            .next_back()
            .ok_or_else(|| VblockError::InvalidNode {
                path: self.path.clone(),
            })
    }

    /// Name that is unique within the image, used for scratch files.
    ///
    /// Ancestors are prepended with `.` up to (not including) the nearest
    /// `binman` node, so `/binman/section@0/vblock` becomes
    /// `section@0.vblock`.
    pub fn unique_name(&self) -> Result<String> {
        let mut parts = Vec::new();
        for (idx, component) in self.components().rev().enumerate() {
            if idx > 0 && component == BINMAN_NODE {
                break;
            }
            parts.push(component);
        }
        if parts.is_empty() {
            return Err(VblockError::InvalidNode {
                path: self.path.clone(),
            });
        }
        parts.reverse();
        Ok(parts.join("."))
    }

    /// Read a phandle list property; an absent property yields an empty list.
    pub fn phandles(&self, name: &str) -> Result<Vec<u32>> {
        match self.prop(name) {
            None => Ok(Vec::new()),
            Some(PropValue::Cells(cells)) => Ok(cells.clone()),
            Some(PropValue::Int(value)) => {
                u32::try_from(*value).map(|phandle| vec![phandle]).map_err(|_| {
                    VblockError::BadArgType {
                        node: self.path.clone(),
                        name: name.to_string(),
                        value: value.to_string(),
                        expected: "phandle list",
                    }
                })
            }
            Some(other) => Err(VblockError::BadArgType {
                node: self.path.clone(),
                name: name.to_string(),
                value: other.describe(),
                expected: "phandle list",
            }),
        }
    }

    fn components(&self) -> impl DoubleEndedIterator<Item = &str> + '_ {
        self.path.split('/').filter(|part| !part.is_empty())
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
