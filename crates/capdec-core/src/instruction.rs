//! The public instruction model.

use crate::mnemonic::MnemonicTable;
use crate::{Architecture, Detail, GroupId, InsnId, Record, RegId, X86Detail, X86Operand};

/// A decoded instruction.
///
/// Wraps one [`Record`] together with the architecture it was decoded for.
/// Classification predicates are case-insensitive lookups of the mnemonic in
/// the architecture's [`MnemonicTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instruction {
    arch: Architecture,
    record: Record,
}

impl Instruction {
    pub fn new(arch: Architecture, record: Record) -> Self {
        Self { arch, record }
    }

    pub fn arch(&self) -> Architecture {
        self.arch
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    pub fn id(&self) -> InsnId {
        self.record.id
    }

    pub fn address(&self) -> u64 {
        self.record.address
    }

    pub fn size(&self) -> usize {
        usize::from(self.record.size)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.record.bytes
    }

    pub fn mnemonic(&self) -> &str {
        &self.record.mnemonic
    }

    pub fn op_str(&self) -> &str {
        &self.record.op_str
    }

    pub fn detail(&self) -> Option<&Detail> {
        self.record.detail.as_ref()
    }

    // ── Formatting ──────────────────────────────────────────────

    /// Returns the bytes as space-separated lower-case hex, e.g. `"48 89 d8"`.
    pub fn hex_bytes(&self) -> String {
        self.record
            .bytes
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Formats the instruction as `"mnemonic op_str"`.
    pub fn text(&self) -> String {
        self.to_string()
    }

    /// Returns the end address (address + size).
    pub fn end_address(&self) -> u64 {
        self.record.address.wrapping_add(u64::from(self.record.size))
    }

    // ── Classification ──────────────────────────────────────────

    fn table(&self) -> &'static MnemonicTable {
        MnemonicTable::for_arch(self.arch)
    }

    fn mnemonic_in(&self, set: &[&str]) -> bool {
        let m = self.record.mnemonic.to_ascii_lowercase();
        set.contains(&m.as_str())
    }

    pub fn is_call(&self) -> bool {
        self.mnemonic_in(self.table().call)
    }

    /// Any jump, conditional or not (loops included).
    pub fn is_jump(&self) -> bool {
        self.mnemonic_in(self.table().jump)
    }

    pub fn is_conditional_jump(&self) -> bool {
        self.is_jump() && !self.mnemonic_in(self.table().unconditional_jump)
    }

    /// RET and IRET forms.
    pub fn is_ret(&self) -> bool {
        self.mnemonic_in(self.table().ret)
    }

    pub fn is_nop(&self) -> bool {
        self.mnemonic_in(self.table().nop)
    }

    pub fn is_push(&self) -> bool {
        self.mnemonic_in(self.table().push)
    }

    pub fn is_pop(&self) -> bool {
        self.mnemonic_in(self.table().pop)
    }

    /// MOV family, including string moves and extensions.
    pub fn is_mov(&self) -> bool {
        self.mnemonic_in(self.table().mov)
    }

    pub fn is_lea(&self) -> bool {
        self.mnemonic_in(self.table().lea)
    }

    /// INT forms and system call entry.
    pub fn is_interrupt(&self) -> bool {
        self.mnemonic_in(self.table().interrupt)
    }

    pub fn is_compare(&self) -> bool {
        self.mnemonic_in(self.table().compare)
    }

    /// True if this instruction changes execution flow (call, jump, ret, int).
    pub fn is_branch(&self) -> bool {
        self.is_call() || self.is_jump() || self.is_ret() || self.is_interrupt()
    }

    /// Returns the classification category of this instruction.
    pub fn category(&self) -> Category {
        if self.is_call() {
            Category::Call
        } else if self.is_conditional_jump() {
            Category::ConditionalJump
        } else if self.is_jump() {
            Category::Jump
        } else if self.is_ret() {
            Category::Return
        } else if self.is_interrupt() {
            Category::Interrupt
        } else if self.is_nop() {
            Category::Nop
        } else if self.is_push() {
            Category::Push
        } else if self.is_pop() {
            Category::Pop
        } else if self.is_lea() {
            Category::LoadEffectiveAddress
        } else if self.is_mov() {
            Category::Move
        } else if self.is_compare() {
            Category::Compare
        } else {
            Category::Other
        }
    }

    // ── Detail helpers ──────────────────────────────────────────

    /// Registers read by this instruction (empty without detail).
    pub fn regs_read(&self) -> &[RegId] {
        self.detail().map(|d| d.regs_read.as_slice()).unwrap_or(&[])
    }

    /// Registers written by this instruction (empty without detail).
    pub fn regs_write(&self) -> &[RegId] {
        self.detail().map(|d| d.regs_write.as_slice()).unwrap_or(&[])
    }

    /// Groups this instruction belongs to (empty without detail).
    pub fn groups(&self) -> &[GroupId] {
        self.detail().map(|d| d.groups.as_slice()).unwrap_or(&[])
    }

    pub fn in_group(&self, group: GroupId) -> bool {
        self.groups().contains(&group)
    }

    pub fn x86(&self) -> Option<&X86Detail> {
        self.detail().and_then(Detail::x86)
    }

    /// x86 operands (empty without x86 detail).
    pub fn x86_operands(&self) -> &[X86Operand] {
        self.x86().map(|x| x.operands.as_slice()).unwrap_or(&[])
    }
}

/// Classification categories derived from the mnemonic tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    Call,
    Jump,
    ConditionalJump,
    Return,
    Interrupt,
    Nop,
    Push,
    Pop,
    Move,
    LoadEffectiveAddress,
    Compare,
    Other,
}

impl Category {
    /// Returns the name of this category.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Jump => "jump",
            Self::ConditionalJump => "cond_jump",
            Self::Return => "return",
            Self::Interrupt => "interrupt",
            Self::Nop => "nop",
            Self::Push => "push",
            Self::Pop => "pop",
            Self::Move => "move",
            Self::LoadEffectiveAddress => "lea",
            Self::Compare => "compare",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.record.mnemonic)?;
        if !self.record.op_str.is_empty() {
            write!(f, " {}", self.record.op_str)?;
        }
        Ok(())
    }
}
