//! Fake signers and fixtures shared by unit tests.
use crate::error::{Result, VblockError};
use crate::futility::{FirmwareSigner, SignFirmware};
use crate::node::{Node, PropValue};
use std::cell::RefCell;

/// Signs by writing `VBLK`, the input length, then the input reversed.
#[derive(Default)]
pub(crate) struct FakeSigner {
    pub(crate) calls: RefCell<Vec<SignFirmware>>,
}

impl FakeSigner {
    pub(crate) fn expected_vblock(input: &[u8]) -> Vec<u8> {
        let mut out = b"VBLK".to_vec();
        out.extend_from_slice(&(input.len() as u32).to_le_bytes());
        out.extend(input.iter().rev());
        out
    }
}

impl FirmwareSigner for FakeSigner {
    fn name(&self) -> &str {
        "fake-futility"
    }

    fn sign_firmware(&self, request: &SignFirmware) -> Result<Option<String>> {
        self.calls.borrow_mut().push(request.clone());
        let input = std::fs::read(&request.firmware)
            .map_err(|err| VblockError::io("read", &request.firmware, err))?;
        std::fs::write(&request.vblock, Self::expected_vblock(&input))
            .map_err(|err| VblockError::io("write", &request.vblock, err))?;
        Ok(Some(String::new()))
    }
}

/// A signer that is registered but not installed.
#[derive(Default)]
pub(crate) struct MissingSigner {
    pub(crate) calls: RefCell<usize>,
}

impl FirmwareSigner for MissingSigner {
    fn name(&self) -> &str {
        "futility"
    }

    fn sign_firmware(&self, _request: &SignFirmware) -> Result<Option<String>> {
        *self.calls.borrow_mut() += 1;
        Ok(None)
    }
}

/// An installed signer that always exits with an error.
pub(crate) struct FailingSigner;

impl FirmwareSigner for FailingSigner {
    fn name(&self) -> &str {
        "futility"
    }

    fn sign_firmware(&self, _request: &SignFirmware) -> Result<Option<String>> {
        Err(VblockError::ToolFailed {
            command: "futility vbutil_firmware".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "Error reading key block".to_string(),
        })
    }
}

/// A vblock node at `path` signing `content`, with every argument set.
pub(crate) fn vblock_node(path: &str, content: Vec<u32>) -> Node {
    Node::new(path)
        .with_prop("content", PropValue::Cells(content))
        .with_prop("keydir", PropValue::Str("devkeys".to_string()))
        .with_prop("keyblock", PropValue::Str("firmware.keyblock".to_string()))
        .with_prop(
            "signprivate",
            PropValue::Str("firmware_data_key.vbprivk".to_string()),
        )
        .with_prop("version", PropValue::Int(1))
        .with_prop("kernelkey", PropValue::Str("kernel_subkey.vbpubk".to_string()))
        .with_prop("preamble-flags", PropValue::Int(0))
}
