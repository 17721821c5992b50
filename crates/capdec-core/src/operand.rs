//! x86 operand types.

use crate::{Access, RegId};

/// Operand type tag as carried on the wire (`x86_op_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperandType {
    Invalid,
    Reg,
    Imm,
    Mem,
}

impl OperandType {
    /// Maps a raw tag to an operand type; unknown tags yield `None`.
    pub fn from_raw(tag: i32) -> Option<Self> {
        match tag {
            0 => Some(Self::Invalid),
            1 => Some(Self::Reg),
            2 => Some(Self::Imm),
            3 => Some(Self::Mem),
            _ => None,
        }
    }

    /// Returns the raw wire tag.
    pub fn raw(&self) -> i32 {
        match self {
            Self::Invalid => 0,
            Self::Reg => 1,
            Self::Imm => 2,
            Self::Mem => 3,
        }
    }
}

/// Operand payload, selected by the operand's type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperandValue {
    /// Uninitialized operand; carries no payload.
    Invalid,
    /// Register operand.
    Reg(RegId),
    /// Immediate value.
    Imm(i64),
    /// Memory reference.
    Mem(MemoryOperand),
}

/// Memory reference operand: `segment:[base + index*scale + disp]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryOperand {
    /// Segment override, or [`RegId::INVALID`].
    pub segment: RegId,
    /// Base register, or [`RegId::INVALID`].
    pub base: RegId,
    /// Index register, or [`RegId::INVALID`].
    pub index: RegId,
    /// Scale applied to the index (1, 2, 4 or 8; 0 or 1 without an index).
    pub scale: i32,
    pub disp: i64,
}

impl MemoryOperand {
    /// Returns the base register, if any.
    pub fn base(&self) -> Option<RegId> {
        self.base.valid()
    }

    /// Returns the index register, if any.
    pub fn index(&self) -> Option<RegId> {
        self.index.valid()
    }

    /// Returns the segment override, if any.
    pub fn segment(&self) -> Option<RegId> {
        self.segment.valid()
    }
}

/// AVX broadcast kind (`x86_avx_bcast`), kept as its raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AvxBroadcast(pub i32);

impl AvxBroadcast {
    pub const NONE: AvxBroadcast = AvxBroadcast(0);
    pub const B2: AvxBroadcast = AvxBroadcast(1);
    pub const B4: AvxBroadcast = AvxBroadcast(2);
    pub const B8: AvxBroadcast = AvxBroadcast(3);
    pub const B16: AvxBroadcast = AvxBroadcast(4);

    /// Returns the broadcast factor (`{1toN}`), if any.
    pub fn factor(&self) -> Option<u8> {
        match self.0 {
            1 => Some(2),
            2 => Some(4),
            3 => Some(8),
            4 => Some(16),
            _ => None,
        }
    }
}

/// One decoded x86 operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct X86Operand {
    pub value: OperandValue,
    /// Operand size in bytes.
    pub size: u8,
    pub access: Access,
    pub avx_bcast: AvxBroadcast,
    /// AVX zero opmask `{z}`.
    pub avx_zero_opmask: bool,
}

impl X86Operand {
    /// Creates an operand with the given payload and no size/access metadata.
    pub fn new(value: OperandValue) -> Self {
        Self {
            value,
            size: 0,
            access: Access::default(),
            avx_bcast: AvxBroadcast::NONE,
            avx_zero_opmask: false,
        }
    }

    /// Creates a register operand.
    pub fn reg(reg: RegId, size: u8) -> Self {
        Self::new(OperandValue::Reg(reg)).with_size(size)
    }

    /// Creates an immediate operand.
    pub fn imm(value: i64, size: u8) -> Self {
        Self::new(OperandValue::Imm(value)).with_size(size)
    }

    /// Creates a memory operand.
    pub fn mem(mem: MemoryOperand, size: u8) -> Self {
        Self::new(OperandValue::Mem(mem)).with_size(size)
    }

    /// Sets the operand size.
    pub fn with_size(mut self, size: u8) -> Self {
        self.size = size;
        self
    }

    /// Sets the access flags.
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Returns the type tag matching the payload.
    pub fn op_type(&self) -> OperandType {
        match self.value {
            OperandValue::Invalid => OperandType::Invalid,
            OperandValue::Reg(_) => OperandType::Reg,
            OperandValue::Imm(_) => OperandType::Imm,
            OperandValue::Mem(_) => OperandType::Mem,
        }
    }

    pub fn reg_id(&self) -> Option<RegId> {
        match self.value {
            OperandValue::Reg(reg) => Some(reg),
            _ => None,
        }
    }

    pub fn imm_value(&self) -> Option<i64> {
        match self.value {
            OperandValue::Imm(imm) => Some(imm),
            _ => None,
        }
    }

    pub fn mem_ref(&self) -> Option<&MemoryOperand> {
        match &self.value {
            OperandValue::Mem(mem) => Some(mem),
            _ => None,
        }
    }

    /// Returns true if this is a register operand.
    pub fn is_register(&self) -> bool {
        matches!(self.value, OperandValue::Reg(_))
    }

    /// Returns true if this is an immediate operand.
    pub fn is_immediate(&self) -> bool {
        matches!(self.value, OperandValue::Imm(_))
    }

    /// Returns true if this is a memory operand.
    pub fn is_memory(&self) -> bool {
        matches!(self.value, OperandValue::Mem(_))
    }
}
