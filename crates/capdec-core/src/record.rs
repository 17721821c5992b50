//! Owned copy of one engine instruction record.

use crate::{Detail, InsnId};

/// One decoded instruction record, independent of engine memory.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    /// Engine instruction id.
    pub id: InsnId,
    /// Virtual address of this instruction.
    pub address: u64,
    /// Number of bytes consumed.
    pub size: u16,
    /// Raw bytes, exactly `size` of them.
    pub bytes: Vec<u8>,
    /// Mnemonic string (e.g., "mov", "push").
    pub mnemonic: String,
    /// Operand text (e.g., "rax, qword ptr [rip + 0x13b8]").
    pub op_str: String,
    /// Detail block, present when detail mode was on.
    pub detail: Option<Detail>,
}

impl Record {
    /// Creates a record without detail.
    pub fn new(
        id: InsnId,
        address: u64,
        bytes: Vec<u8>,
        mnemonic: impl Into<String>,
        op_str: impl Into<String>,
    ) -> Self {
        Self {
            id,
            address,
            size: bytes.len() as u16,
            bytes,
            mnemonic: mnemonic.into(),
            op_str: op_str.into(),
            detail: None,
        }
    }

    /// Attaches a detail block.
    pub fn with_detail(mut self, detail: Detail) -> Self {
        self.detail = Some(detail);
        self
    }
}
