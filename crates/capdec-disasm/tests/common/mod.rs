//! Scripted x86-64 fixtures shared by the integration tests and benches.

#![allow(dead_code)]

use capdec_core::register::x86;
use capdec_core::{Access, GroupId, RegId};
use capdec_disasm::raw::{RawDetail, RawX86Op, RawX86OpMem};
use capdec_disasm::{ReplayEngine, ReplayInsn};

/// A small function: prologue, arithmetic, a conditional, epilogue.
pub const X86_64_CODE: &[u8] = &[
    0x55, // push rbp
    0x48, 0x89, 0xe5, // mov rbp, rsp
    0x48, 0x83, 0xec, 0x20, // sub rsp, 0x20
    0x48, 0x89, 0x7d, 0xf8, // mov qword ptr [rbp - 8], rdi
    0x48, 0x8b, 0x45, 0xf8, // mov rax, qword ptr [rbp - 8]
    0x48, 0x83, 0xc0, 0x01, // add rax, 1
    0x48, 0x83, 0x7d, 0xf8, 0x0a, // cmp qword ptr [rbp - 8], 0xa
    0x7e, 0x07, // jle 0x1022
    0xe8, 0x10, 0x00, 0x00, 0x00, // call 0x1030
    0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00, // mov rax, qword ptr [rip + 0x13b8]
    0x5d, // pop rbp
    0xc3, // ret
];

pub const MOV_RIP_RELATIVE: &[u8] = &[0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00];

pub fn detail(read: &[RegId], write: &[RegId], groups: &[GroupId], ops: &[RawX86Op]) -> RawDetail {
    let mut detail = RawDetail::zeroed();
    for (slot, reg) in detail.regs_read.iter_mut().zip(read) {
        *slot = reg.0 as u16;
    }
    detail.regs_read_count = read.len() as u8;
    for (slot, reg) in detail.regs_write.iter_mut().zip(write) {
        *slot = reg.0 as u16;
    }
    detail.regs_write_count = write.len() as u8;
    for (slot, group) in detail.groups.iter_mut().zip(groups) {
        *slot = group.0;
    }
    detail.groups_count = groups.len() as u8;

    // SAFETY: writing the x86 member of a Copy union.
    let payload = unsafe { &mut detail.arch.x86 };
    payload.op_count = ops.len() as u8;
    payload.operands[..ops.len()].copy_from_slice(ops);
    detail
}

fn reg(r: RegId, access: u8) -> RawX86Op {
    RawX86Op::reg(r.0, 8, access)
}

fn rbp_slot(disp: i64) -> RawX86Op {
    RawX86Op::mem(
        RawX86OpMem {
            base: x86::RBP.0,
            scale: 1,
            disp,
            ..Default::default()
        },
        8,
        Access::READ,
    )
}

const R: u8 = Access::READ;
const W: u8 = Access::WRITE;

pub fn x86_script() -> Vec<ReplayInsn> {
    vec![
        ReplayInsn::new(588, &[0x55], "push", "rbp").with_detail(detail(
            &[x86::RSP],
            &[x86::RSP],
            &[],
            &[reg(x86::RBP, R)],
        )),
        ReplayInsn::new(449, &[0x48, 0x89, 0xe5], "mov", "rbp, rsp")
            .with_detail(detail(&[], &[], &[], &[reg(x86::RBP, W), reg(x86::RSP, R)])),
        ReplayInsn::new(738, &[0x48, 0x83, 0xec, 0x20], "sub", "rsp, 0x20").with_detail(detail(
            &[],
            &[x86::EFLAGS],
            &[],
            &[reg(x86::RSP, R | W), RawX86Op::imm(0x20, 8)],
        )),
        ReplayInsn::new(449, &[0x48, 0x89, 0x7d, 0xf8], "mov", "qword ptr [rbp - 8], rdi")
            .with_detail(detail(&[], &[], &[], &[rbp_slot(-8), reg(x86::RDI, R)])),
        ReplayInsn::new(449, &[0x48, 0x8b, 0x45, 0xf8], "mov", "rax, qword ptr [rbp - 8]")
            .with_detail(detail(&[], &[], &[], &[reg(x86::RAX, W), rbp_slot(-8)])),
        ReplayInsn::new(8, &[0x48, 0x83, 0xc0, 0x01], "add", "rax, 1").with_detail(detail(
            &[],
            &[x86::EFLAGS],
            &[],
            &[reg(x86::RAX, R | W), RawX86Op::imm(1, 8)],
        )),
        ReplayInsn::new(93, &[0x48, 0x83, 0x7d, 0xf8, 0x0a], "cmp", "qword ptr [rbp - 8], 0xa").with_detail(detail(
            &[],
            &[x86::EFLAGS],
            &[],
            &[rbp_slot(-8), RawX86Op::imm(0xa, 8)],
        )),
        ReplayInsn::new(262, &[0x7e, 0x07], "jle", "0x1022").with_detail(detail(
            &[x86::EFLAGS],
            &[],
            &[GroupId::JUMP, GroupId::BRANCH_RELATIVE],
            &[RawX86Op::imm(0x1022, 8)],
        )),
        ReplayInsn::new(56, &[0xe8, 0x10, 0x00, 0x00, 0x00], "call", "0x1030").with_detail(detail(
            &[x86::RSP, x86::RIP],
            &[x86::RSP],
            &[GroupId::CALL, GroupId::BRANCH_RELATIVE],
            &[RawX86Op::imm(0x1030, 8)],
        )),
        ReplayInsn::new(449, MOV_RIP_RELATIVE, "mov", "rax, qword ptr [rip + 0x13b8]").with_detail(detail(
            &[],
            &[],
            &[],
            &[
                reg(x86::RAX, W),
                RawX86Op::mem(
                    RawX86OpMem {
                        base: x86::RIP.0,
                        scale: 1,
                        disp: 0x13b8,
                        ..Default::default()
                    },
                    8,
                    R,
                ),
            ],
        )),
        ReplayInsn::new(566, &[0x5d], "pop", "rbp").with_detail(detail(
            &[x86::RSP],
            &[x86::RSP],
            &[],
            &[reg(x86::RBP, W)],
        )),
        ReplayInsn::new(634, &[0xc3], "ret", "").with_detail(detail(&[x86::RSP], &[x86::RSP], &[GroupId::RET], &[])),
    ]
}

/// A replay engine serving [`x86_script`], with register and group names.
pub fn x86_engine() -> ReplayEngine {
    ReplayEngine::new()
        .with_script(x86_script())
        .with_reg_name(x86::EFLAGS.0, "rflags")
        .with_reg_name(x86::RIP.0, "rip")
        .with_reg_name(x86::RSP.0, "rsp")
        .with_insn_name(588, "push")
        .with_group_name(u32::from(GroupId::JUMP.0), "jump")
        .with_group_name(u32::from(GroupId::CALL.0), "call")
        .with_group_name(u32::from(GroupId::RET.0), "ret")
        .with_group_name(u32::from(GroupId::BRANCH_RELATIVE.0), "branch_relative")
}
