//! Engine-assigned numeric identifiers for registers, instructions and groups.
//!
//! Ids are architecture-specific; a session's name lookups turn them into text.

use std::fmt;

/// Register identifier (`x86_reg`, `arm64_reg`, ...). Zero means "no register".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegId(pub u32);

impl RegId {
    pub const INVALID: RegId = RegId(0);

    /// Returns `None` for the invalid register, `Some(self)` otherwise.
    pub fn valid(self) -> Option<RegId> {
        (self != Self::INVALID).then_some(self)
    }
}

impl From<u16> for RegId {
    fn from(id: u16) -> Self {
        RegId(u32::from(id))
    }
}

impl fmt::Display for RegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reg#{}", self.0)
    }
}

/// Instruction identifier (`x86_insn`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InsnId(pub u32);

/// Instruction group identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupId(pub u8);

impl GroupId {
    pub const INVALID: GroupId = GroupId(0);
    pub const JUMP: GroupId = GroupId(1);
    pub const CALL: GroupId = GroupId(2);
    pub const RET: GroupId = GroupId(3);
    pub const INT: GroupId = GroupId(4);
    pub const IRET: GroupId = GroupId(5);
    pub const PRIVILEGE: GroupId = GroupId(6);
    pub const BRANCH_RELATIVE: GroupId = GroupId(7);
}

/// Operand access flags (`cs_ac_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Access(pub u8);

impl Access {
    pub const READ: u8 = 1 << 0;
    pub const WRITE: u8 = 1 << 1;

    pub fn is_read(&self) -> bool {
        self.0 & Self::READ != 0
    }

    pub fn is_write(&self) -> bool {
        self.0 & Self::WRITE != 0
    }
}

// x86 register ids as assigned by the 4.0 engine.
pub mod x86 {
    use super::RegId;

    pub const AH: RegId = RegId(1);
    pub const AL: RegId = RegId(2);
    pub const AX: RegId = RegId(3);
    pub const BH: RegId = RegId(4);
    pub const BL: RegId = RegId(5);
    pub const BP: RegId = RegId(6);
    pub const BPL: RegId = RegId(7);
    pub const BX: RegId = RegId(8);
    pub const CH: RegId = RegId(9);
    pub const CL: RegId = RegId(10);
    pub const CS: RegId = RegId(11);
    pub const CX: RegId = RegId(12);
    pub const DH: RegId = RegId(13);
    pub const DI: RegId = RegId(14);
    pub const DIL: RegId = RegId(15);
    pub const DL: RegId = RegId(16);
    pub const DS: RegId = RegId(17);
    pub const DX: RegId = RegId(18);
    pub const EAX: RegId = RegId(19);
    pub const EBP: RegId = RegId(20);
    pub const EBX: RegId = RegId(21);
    pub const ECX: RegId = RegId(22);
    pub const EDI: RegId = RegId(23);
    pub const EDX: RegId = RegId(24);
    pub const EFLAGS: RegId = RegId(25);
    pub const EIP: RegId = RegId(26);
    pub const EIZ: RegId = RegId(27);
    pub const ES: RegId = RegId(28);
    pub const ESI: RegId = RegId(29);
    pub const ESP: RegId = RegId(30);
    pub const FPSW: RegId = RegId(31);
    pub const FS: RegId = RegId(32);
    pub const GS: RegId = RegId(33);
    pub const IP: RegId = RegId(34);
    pub const RAX: RegId = RegId(35);
    pub const RBP: RegId = RegId(36);
    pub const RBX: RegId = RegId(37);
    pub const RCX: RegId = RegId(38);
    pub const RDI: RegId = RegId(39);
    pub const RDX: RegId = RegId(40);
    pub const RIP: RegId = RegId(41);
    pub const RIZ: RegId = RegId(42);
    pub const RSI: RegId = RegId(43);
    pub const RSP: RegId = RegId(44);
    pub const SI: RegId = RegId(45);
    pub const SIL: RegId = RegId(46);
    pub const SP: RegId = RegId(47);
    pub const SPL: RegId = RegId(48);
    pub const SS: RegId = RegId(49);
}
