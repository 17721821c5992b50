//! Detail blocks: the architecture-neutral part and the per-architecture payload.

use crate::{GroupId, RegId, X86Operand};

/// Optional enrichment attached to a record when detail mode is on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Detail {
    /// Registers implicitly read.
    pub regs_read: Vec<RegId>,
    /// Registers implicitly written.
    pub regs_write: Vec<RegId>,
    /// Groups this instruction belongs to.
    pub groups: Vec<GroupId>,
    /// Architecture-specific payload, when the architecture has a decoder.
    pub arch: Option<ArchDetail>,
}

impl Detail {
    /// Returns the x86 payload, if this detail carries one.
    pub fn x86(&self) -> Option<&X86Detail> {
        match &self.arch {
            Some(ArchDetail::X86(x86)) => Some(x86),
            None => None,
        }
    }
}

/// Architecture-specific detail payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ArchDetail {
    X86(X86Detail),
}

/// The 64-bit word shared by the EFLAGS and FPU-flags readings.
///
/// The engine stores either an EFLAGS update mask or an FPU flags mask in the
/// same slot and records no discriminant. Both readings are offered; which one
/// applies depends on the instruction (x87 instructions use the FPU reading).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlagsWord(pub u64);

impl FlagsWord {
    /// Reads the word as an EFLAGS update mask.
    pub fn eflags(&self) -> u64 {
        self.0
    }

    /// Reads the word as an FPU flags update mask.
    pub fn fpu_flags(&self) -> u64 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Byte offsets and sizes of the instruction's encoded fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct X86Encoding {
    pub modrm_offset: u8,
    pub disp_offset: u8,
    pub disp_size: u8,
    pub imm_offset: u8,
    pub imm_size: u8,
}

/// x86-specific detail.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct X86Detail {
    /// Legacy prefixes (REP/LOCK, segment, operand size, address size); 0 if absent.
    pub prefix: [u8; 4],
    /// Opcode bytes, zero padded.
    pub opcode: [u8; 4],
    pub rex: u8,
    pub addr_size: u8,
    pub modrm: u8,
    pub sib: u8,
    pub disp: i64,
    pub sib_index: RegId,
    pub sib_scale: i8,
    pub sib_base: RegId,
    pub xop_cc: i32,
    pub sse_cc: i32,
    pub avx_cc: i32,
    pub avx_sae: bool,
    pub avx_rm: i32,
    pub flags: FlagsWord,
    /// Operands, exactly as many as the engine reported.
    pub operands: Vec<X86Operand>,
    pub encoding: X86Encoding,
}

impl X86Detail {
    /// Maximum number of operands an x86 record can carry.
    pub const MAX_OPERANDS: usize = 8;

    /// Number of operands.
    pub fn op_count(&self) -> usize {
        self.operands.len()
    }

    /// Returns the non-zero prefix bytes.
    pub fn prefixes(&self) -> impl Iterator<Item = u8> + '_ {
        self.prefix.iter().copied().filter(|&b| b != 0)
    }
}
