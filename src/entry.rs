//! Entry contents and the size rules applied when they are updated.
use crate::error::{Result, VblockError};

/// Whether an entry may change size once the image has been laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePolicy {
    pub allow_expansion: bool,
    pub allow_contraction: bool,
}

impl Default for ResizePolicy {
    fn default() -> Self {
        ResizePolicy {
            allow_expansion: true,
            allow_contraction: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryContents {
    data: Option<Vec<u8>>,
    contents_size: usize,
}

impl EntryContents {
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    pub fn contents_size(&self) -> usize {
        self.contents_size
    }

    pub fn set_contents(&mut self, data: Vec<u8>) {
        self.contents_size = data.len();
        self.data = Some(data);
    }

    /// Replace the contents after layout.
    ///
    /// Returns `false` if the entry changed size and the image must be laid
    /// out again. Growth without `allow_expansion` is an error; shrinking
    /// without `allow_contraction` pads with zeros to keep the old size.
    pub fn update_contents_and_resize(
        &mut self,
        node: &str,
        mut data: Vec<u8>,
        policy: ResizePolicy,
    ) -> Result<bool> {
        let old = self.contents_size;
        let new = data.len();
        let expanded = policy.allow_expansion && new > old;
        let contracted = policy.allow_contraction && new < old;
        let size_ok = !expanded && !contracted;
        if size_ok {
            if new > old {
                return Err(VblockError::SizeChange {
                    node: node.to_string(),
                    old,
                    new,
                });
            }
            data.resize(old, 0);
        } else {
            tracing::debug!(node, old, new, "entry size change");
        }
        self.set_contents(data);
        Ok(size_ok)
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
