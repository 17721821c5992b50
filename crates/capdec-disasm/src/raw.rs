//! Fixed-layout records as written by the engine (4.0 ABI).
//!
//! These mirror `cs_insn`, `cs_detail` and the x86 detail structs field for
//! field. C `bool` fields are declared `u8` so that any bit pattern the engine
//! (or a corrupted buffer) leaves behind is still a valid Rust value.

use std::fmt;

/// Capacity of `RawInsn::bytes`.
pub const INSN_BYTES: usize = 16;
/// Capacity of `RawInsn::mnemonic`.
pub const MNEMONIC_SIZE: usize = 32;
/// Capacity of `RawInsn::op_str`.
pub const OP_STR_SIZE: usize = 160;
/// Capacity of `RawDetail::regs_read`.
pub const REGS_READ_MAX: usize = 12;
/// Capacity of `RawDetail::regs_write`.
pub const REGS_WRITE_MAX: usize = 20;
/// Capacity of `RawDetail::groups`.
pub const GROUPS_MAX: usize = 8;
/// Capacity of `RawX86::operands`.
pub const X86_OPERANDS_MAX: usize = 8;

/// `cs_insn`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawInsn {
    pub id: u32,
    pub address: u64,
    pub size: u16,
    pub bytes: [u8; INSN_BYTES],
    pub mnemonic: [u8; MNEMONIC_SIZE],
    pub op_str: [u8; OP_STR_SIZE],
    /// Null unless detail mode was on.
    pub detail: *mut RawDetail,
}

impl RawInsn {
    /// A record with every field zeroed and no detail.
    pub fn zeroed() -> Self {
        Self {
            id: 0,
            address: 0,
            size: 0,
            bytes: [0; INSN_BYTES],
            mnemonic: [0; MNEMONIC_SIZE],
            op_str: [0; OP_STR_SIZE],
            detail: std::ptr::null_mut(),
        }
    }
}

impl fmt::Debug for RawInsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawInsn")
            .field("id", &self.id)
            .field("address", &format_args!("{:#x}", self.address))
            .field("size", &self.size)
            .field("detail", &self.detail)
            .finish_non_exhaustive()
    }
}

/// `cs_detail`, restricted to the architectures this crate decodes.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawDetail {
    pub regs_read: [u16; REGS_READ_MAX],
    pub regs_read_count: u8,
    pub regs_write: [u16; REGS_WRITE_MAX],
    pub regs_write_count: u8,
    pub groups: [u8; GROUPS_MAX],
    pub groups_count: u8,
    /// Architecture payload; which member is live depends on the session's architecture.
    pub arch: RawArchDetail,
}

impl RawDetail {
    pub fn zeroed() -> Self {
        Self {
            regs_read: [0; REGS_READ_MAX],
            regs_read_count: 0,
            regs_write: [0; REGS_WRITE_MAX],
            regs_write_count: 0,
            groups: [0; GROUPS_MAX],
            groups_count: 0,
            arch: RawArchDetail {
                x86: RawX86::zeroed(),
            },
        }
    }
}

impl fmt::Debug for RawDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let read = usize::from(self.regs_read_count).min(REGS_READ_MAX);
        let write = usize::from(self.regs_write_count).min(REGS_WRITE_MAX);
        let groups = usize::from(self.groups_count).min(GROUPS_MAX);
        f.debug_struct("RawDetail")
            .field("regs_read_count", &self.regs_read_count)
            .field("regs_read", &&self.regs_read[..read])
            .field("regs_write_count", &self.regs_write_count)
            .field("regs_write", &&self.regs_write[..write])
            .field("groups_count", &self.groups_count)
            .field("groups", &&self.groups[..groups])
            .finish_non_exhaustive()
    }
}

/// The architecture union inside `cs_detail`.
#[repr(C)]
#[derive(Clone, Copy)]
pub union RawArchDetail {
    pub x86: RawX86,
}

/// `x86_op_mem`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawX86OpMem {
    pub segment: u32,
    pub base: u32,
    pub index: u32,
    pub scale: i32,
    pub disp: i64,
}

/// Payload union of `cs_x86_op`, discriminated by `RawX86Op::op_type`.
#[repr(C)]
#[derive(Clone, Copy)]
pub union RawX86OpValue {
    pub reg: u32,
    pub imm: i64,
    pub mem: RawX86OpMem,
}

/// `cs_x86_op`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawX86Op {
    /// `x86_op_type`: 0 invalid, 1 register, 2 immediate, 3 memory.
    pub op_type: i32,
    pub value: RawX86OpValue,
    pub size: u8,
    pub access: u8,
    pub avx_bcast: i32,
    pub avx_zero_opmask: u8,
}

impl RawX86Op {
    pub fn zeroed() -> Self {
        Self {
            op_type: 0,
            value: RawX86OpValue {
                mem: RawX86OpMem::default(),
            },
            size: 0,
            access: 0,
            avx_bcast: 0,
            avx_zero_opmask: 0,
        }
    }

    /// Register operand.
    pub fn reg(reg: u32, size: u8, access: u8) -> Self {
        let mut op = Self::zeroed();
        op.op_type = 1;
        op.value.reg = reg;
        op.size = size;
        op.access = access;
        op
    }

    /// Immediate operand.
    pub fn imm(imm: i64, size: u8) -> Self {
        let mut op = Self::zeroed();
        op.op_type = 2;
        op.value.imm = imm;
        op.size = size;
        op
    }

    /// Memory operand.
    pub fn mem(mem: RawX86OpMem, size: u8, access: u8) -> Self {
        let mut op = Self::zeroed();
        op.op_type = 3;
        op.value.mem = mem;
        op.size = size;
        op.access = access;
        op
    }
}

impl fmt::Debug for RawX86Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("RawX86Op");
        out.field("op_type", &self.op_type);
        // SAFETY: every member is plain integers, so any member can be read.
        match self.op_type {
            1 => out.field("reg", &unsafe { self.value.reg }),
            2 => out.field("imm", &unsafe { self.value.imm }),
            3 => out.field("mem", &unsafe { self.value.mem }),
            _ => &mut out,
        };
        out.field("size", &self.size)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

/// `cs_x86_encoding`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawX86Encoding {
    pub modrm_offset: u8,
    pub disp_offset: u8,
    pub disp_size: u8,
    pub imm_offset: u8,
    pub imm_size: u8,
}

/// Untagged union of `cs_x86`: EFLAGS or FPU flags, same storage.
#[repr(C)]
#[derive(Clone, Copy)]
pub union RawX86Flags {
    pub eflags: u64,
    pub fpu_flags: u64,
}

/// `cs_x86`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawX86 {
    pub prefix: [u8; 4],
    pub opcode: [u8; 4],
    pub rex: u8,
    pub addr_size: u8,
    pub modrm: u8,
    pub sib: u8,
    pub disp: i64,
    pub sib_index: u32,
    pub sib_scale: i8,
    pub sib_base: u32,
    pub xop_cc: i32,
    pub sse_cc: i32,
    pub avx_cc: i32,
    pub avx_sae: u8,
    pub avx_rm: i32,
    pub flags: RawX86Flags,
    pub op_count: u8,
    pub operands: [RawX86Op; X86_OPERANDS_MAX],
    pub encoding: RawX86Encoding,
}

impl RawX86 {
    pub fn zeroed() -> Self {
        Self {
            prefix: [0; 4],
            opcode: [0; 4],
            rex: 0,
            addr_size: 0,
            modrm: 0,
            sib: 0,
            disp: 0,
            sib_index: 0,
            sib_scale: 0,
            sib_base: 0,
            xop_cc: 0,
            sse_cc: 0,
            avx_cc: 0,
            avx_sae: 0,
            avx_rm: 0,
            flags: RawX86Flags { eflags: 0 },
            op_count: 0,
            operands: [RawX86Op::zeroed(); X86_OPERANDS_MAX],
            encoding: RawX86Encoding::default(),
        }
    }
}

impl fmt::Debug for RawX86 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ops = usize::from(self.op_count).min(X86_OPERANDS_MAX);
        f.debug_struct("RawX86")
            .field("prefix", &self.prefix)
            .field("opcode", &self.opcode)
            .field("rex", &self.rex)
            .field("modrm", &self.modrm)
            // SAFETY: both members are the same `u64`.
            .field("flags", &format_args!("{:#x}", unsafe { self.flags.eflags }))
            .field("op_count", &self.op_count)
            .field("operands", &&self.operands[..ops])
            .finish_non_exhaustive()
    }
}

/// Copies `text` into a zero-padded fixed array, truncating to leave room for a NUL.
pub fn c_text<const N: usize>(text: &str) -> [u8; N] {
    let mut out = [0u8; N];
    let len = text.len().min(N.saturating_sub(1));
    out[..len].copy_from_slice(&text.as_bytes()[..len]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, offset_of, size_of};

    #[test]
    fn test_operand_layout() {
        assert_eq!(size_of::<RawX86OpMem>(), 24);
        assert_eq!(size_of::<RawX86Op>(), 48);
        assert_eq!(align_of::<RawX86Op>(), 8);
        assert_eq!(offset_of!(RawX86Op, value), 8);
        assert_eq!(offset_of!(RawX86Op, avx_bcast), 36);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_insn_layout() {
        assert_eq!(size_of::<RawInsn>(), 240);
        assert_eq!(offset_of!(RawInsn, address), 8);
        assert_eq!(offset_of!(RawInsn, bytes), 18);
        assert_eq!(offset_of!(RawInsn, mnemonic), 34);
        assert_eq!(offset_of!(RawInsn, op_str), 66);
        assert_eq!(offset_of!(RawInsn, detail), 232);
    }

    #[test]
    fn test_detail_layout() {
        assert_eq!(offset_of!(RawDetail, regs_read_count), 24);
        assert_eq!(offset_of!(RawDetail, regs_write), 26);
        assert_eq!(offset_of!(RawDetail, groups), 67);
        assert_eq!(offset_of!(RawDetail, arch), 80);

        assert_eq!(size_of::<RawX86>(), 464);
        assert_eq!(offset_of!(RawX86, disp), 16);
        assert_eq!(offset_of!(RawX86, sib_base), 32);
        assert_eq!(offset_of!(RawX86, avx_rm), 52);
        assert_eq!(offset_of!(RawX86, flags), 56);
        assert_eq!(offset_of!(RawX86, op_count), 64);
        assert_eq!(offset_of!(RawX86, operands), 72);
        assert_eq!(offset_of!(RawX86, encoding), 456);
    }

    #[test]
    fn test_debug_shows_live_payload() {
        let text = format!("{:?}", RawX86Op::imm(-4, 8));
        assert!(text.contains("imm: -4"));
        let mut detail = RawDetail::zeroed();
        detail.regs_read_count = 200;
        // Counts past capacity are clamped for display only.
        assert!(format!("{:?}", detail).contains("regs_read_count: 200"));
    }

    #[test]
    fn test_c_text_truncates() {
        let text: [u8; 4] = c_text("pushfq");
        assert_eq!(&text, b"pus\0");
        let text: [u8; 8] = c_text("nop");
        assert_eq!(&text, b"nop\0\0\0\0\0");
    }
}
