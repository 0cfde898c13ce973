//! Concatenation of referenced sub-entry contents.
use crate::error::{Result, VblockError};
use crate::node::Node;
use std::collections::BTreeMap;

/// Property listing the phandles of the entries to collect.
pub const CONTENT_PROP: &str = "content";

/// Looks up sub-entry contents by phandle.
pub trait ContentSource {
    /// Contents of the entry with `phandle`.
    ///
    /// Returns `Ok(None)` when the entry has no data yet and `required` is
    /// false; with `required` set, missing data is an error.
    fn contents_by_phandle(
        &self,
        phandle: u32,
        requester: &str,
        required: bool,
    ) -> Result<Option<Vec<u8>>>;
}

/// The ordered list of entries whose contents are joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    node: String,
    content: Vec<u32>,
}

impl Collection {
    pub fn from_node(node: &Node) -> Result<Self> {
        let content = node.phandles(CONTENT_PROP)?;
        if content.is_empty() {
            return Err(VblockError::EmptyCollection {
                node: node.path.clone(),
            });
        }
        Ok(Collection {
            node: node.path.clone(),
            content,
        })
    }

    pub fn phandles(&self) -> &[u32] {
        &self.content
    }

    /// Join the referenced contents in declared order.
    ///
    /// `Ok(None)` means at least one entry is not ready (only possible when
    /// `required` is false).
    pub fn get_contents(
        &self,
        source: &dyn ContentSource,
        required: bool,
    ) -> Result<Option<Vec<u8>>> {
        let mut data = Vec::new();
        for &phandle in &self.content {
            match source.contents_by_phandle(phandle, &self.node, required)? {
                Some(entry_data) => data.extend_from_slice(&entry_data),
                None if required => {
                    return Err(VblockError::ContentNotReady {
                        node: self.node.clone(),
                        entry: format!("phandle {phandle}"),
                    })
                }
                None => return Ok(None),
            }
        }
        Ok(Some(data))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SectionEntry {
    name: String,
    data: Option<Vec<u8>>,
}

/// In-memory section holding sub-entries keyed by phandle.
#[derive(Debug, Clone, Default)]
pub struct SectionContents {
    entries: BTreeMap<u32, SectionEntry>,
}

impl SectionContents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry; `data` of `None` means its contents are not ready.
    pub fn add_entry(&mut self, phandle: u32, name: &str, data: Option<Vec<u8>>) {
        self.entries.insert(
            phandle,
            SectionEntry {
                name: name.to_string(),
                data,
            },
        );
    }

    /// Replace an entry's data, e.g. after symbols have been written into it.
    pub fn set_data(&mut self, phandle: u32, data: Vec<u8>) -> bool {
        match self.entries.get_mut(&phandle) {
            Some(entry) => {
                entry.data = Some(data);
                true
            }
            None => false,
        }
    }
}

impl ContentSource for SectionContents {
    fn contents_by_phandle(
        &self,
        phandle: u32,
        requester: &str,
        required: bool,
    ) -> Result<Option<Vec<u8>>> {
        let entry = self
            .entries
            .get(&phandle)
            .ok_or_else(|| VblockError::UnknownPhandle {
                node: requester.to_string(),
                phandle,
            })?;
        match &entry.data {
            Some(data) => Ok(Some(data.clone())),
            None if required => Err(VblockError::ContentNotReady {
                node: requester.to_string(),
                entry: entry.name.clone(),
            }),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod tests;
