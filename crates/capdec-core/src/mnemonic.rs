//! Static mnemonic tables used for instruction classification.

use crate::Architecture;

/// Mnemonic sets for one architecture. All entries are lower case.
#[derive(Debug)]
pub struct MnemonicTable {
    pub call: &'static [&'static str],
    pub jump: &'static [&'static str],
    /// Jumps that are never conditional (subset of `jump`).
    pub unconditional_jump: &'static [&'static str],
    pub ret: &'static [&'static str],
    pub nop: &'static [&'static str],
    pub push: &'static [&'static str],
    pub pop: &'static [&'static str],
    pub mov: &'static [&'static str],
    pub lea: &'static [&'static str],
    pub interrupt: &'static [&'static str],
    pub compare: &'static [&'static str],
}

impl MnemonicTable {
    /// Returns the table for an architecture.
    pub fn for_arch(arch: Architecture) -> &'static MnemonicTable {
        match arch {
            Architecture::X86 => &X86,
            _ => &EMPTY,
        }
    }
}

pub static X86: MnemonicTable = MnemonicTable {
    call: &["call", "lcall"],
    jump: &[
        "jmp", "ljmp", "je", "jne", "jz", "jnz", "ja", "jae", "jb", "jbe", "jg", "jge", "jl",
        "jle", "jo", "jno", "js", "jns", "jp", "jnp", "jpe", "jpo", "jcxz", "jecxz", "jrcxz",
        "loop", "loope", "loopne", "loopz", "loopnz",
    ],
    unconditional_jump: &["jmp", "ljmp"],
    ret: &["ret", "retf", "retn", "iret", "iretd", "iretq"],
    nop: &["nop"],
    push: &["push", "pusha", "pushad", "pushf", "pushfd", "pushfq"],
    pop: &["pop", "popa", "popad", "popf", "popfd", "popfq"],
    mov: &[
        "mov", "movs", "movsb", "movsw", "movsd", "movsq", "movzx", "movsx", "movsxd", "movabs",
    ],
    lea: &["lea"],
    interrupt: &["int", "int1", "int3", "into", "syscall", "sysenter"],
    compare: &["cmp", "test"],
};

// Architectures without a profile classify nothing.
pub static EMPTY: MnemonicTable = MnemonicTable {
    call: &[],
    jump: &[],
    unconditional_jump: &[],
    ret: &[],
    nop: &[],
    push: &[],
    pop: &[],
    mov: &[],
    lea: &[],
    interrupt: &[],
    compare: &[],
};
