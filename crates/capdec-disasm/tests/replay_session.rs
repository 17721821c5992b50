//! End-to-end decoding through a session backed by the replay engine.

mod common;

use std::sync::Arc;
use std::thread;

use capdec_core::register::x86;
use capdec_core::{Architecture, Category, GroupId, InsnId, Mode, OperandType, RegId};
use capdec_disasm::{Disassembler, Error, ErrorCode, Session, SessionConfig};

use common::{x86_engine, MOV_RIP_RELATIVE, X86_64_CODE};

#[test]
fn test_function_walk() {
    let engine = x86_engine();
    let mut session = Session::x86_64(&engine).unwrap();
    let insns = session.decode_all(X86_64_CODE, 0x1000).unwrap();

    assert_eq!(insns.len(), 12);
    assert_eq!(insns[0].address(), 0x1000);
    for pair in insns.windows(2) {
        assert_eq!(pair[0].end_address(), pair[1].address());
    }
    let last = insns.last().unwrap();
    assert_eq!(last.end_address(), 0x1000 + X86_64_CODE.len() as u64);
    let total: usize = insns.iter().map(|i| i.size()).sum();
    assert_eq!(total, X86_64_CODE.len());

    let categories: Vec<Category> = insns.iter().map(|i| i.category()).collect();
    assert_eq!(categories[0], Category::Push);
    assert_eq!(categories[6], Category::Compare);
    assert_eq!(categories[7], Category::ConditionalJump);
    assert_eq!(categories[8], Category::Call);
    assert_eq!(categories[10], Category::Pop);
    assert_eq!(categories[11], Category::Return);

    session.release().unwrap();
    assert_eq!(engine.live_buffers(), 0);
    assert_eq!(engine.open_handles(), 0);
}

#[test]
fn test_hex_and_text() {
    let engine = x86_engine();
    let mut session = Session::x86_64(&engine).unwrap();
    let mov = session.decode_one(MOV_RIP_RELATIVE, 0x1000).unwrap().unwrap();
    assert_eq!(mov.hex_bytes(), "48 8b 05 b8 13 00 00");
    assert_eq!(mov.text(), "mov rax, qword ptr [rip + 0x13b8]");
    assert_eq!(mov.end_address(), 0x1007);

    let ret = session.decode_one(&[0xc3], 0x2000).unwrap().unwrap();
    assert_eq!(ret.text(), "ret");
    session.release().unwrap();
}

#[test]
fn test_detail_lists_and_groups() {
    let engine = x86_engine();
    let mut session = Session::x86_64(&engine).unwrap();
    let insns = session.decode_all(X86_64_CODE, 0x1000).unwrap();

    let call = &insns[8];
    assert_eq!(call.regs_read(), &[x86::RSP, x86::RIP]);
    assert_eq!(call.regs_write(), &[x86::RSP]);
    assert!(call.in_group(GroupId::CALL));
    assert!(call.in_group(GroupId::BRANCH_RELATIVE));
    assert!(!call.in_group(GroupId::JUMP));
    assert_eq!(session.group_name(GroupId::CALL).unwrap().as_deref(), Some("call"));
    assert_eq!(
        session.regs_read_names(call).unwrap(),
        vec!["rsp".to_string(), "rip".to_string()]
    );

    let jle = &insns[7];
    assert!(jle.in_group(GroupId::JUMP));
    assert_eq!(jle.x86_operands()[0].imm_value(), Some(0x1022));

    let mov = &insns[9];
    let ops = mov.x86_operands();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0].op_type(), OperandType::Reg);
    assert_eq!(ops[1].op_type(), OperandType::Mem);
    let mem = ops[1].mem_ref().unwrap();
    assert_ne!(mem.base, RegId::INVALID);
    assert_eq!(mem.disp, 0x13b8);
    session.release().unwrap();
}

#[test]
fn test_detail_off_gives_empty_lists() {
    let engine = x86_engine();
    let config = SessionConfig::x86_64().with_detail(false);
    let mut session = Session::with_config(&engine, config).unwrap();
    let insns = session.decode_all(X86_64_CODE, 0x1000).unwrap();
    for insn in &insns {
        assert!(insn.detail().is_none());
        assert!(insn.regs_read().is_empty());
        assert!(insn.regs_write().is_empty());
        assert!(insn.groups().is_empty());
        assert!(insn.x86_operands().is_empty());
    }
    // Classification does not need detail.
    assert!(insns[8].is_call());
    session.release().unwrap();
}

#[test]
fn test_garbage_then_valid() {
    let engine = x86_engine();
    let mut session = Session::x86_64(&engine).unwrap();
    assert!(session.decode(&[0xff, 0xff, 0xff, 0xff], 0, 0).unwrap().is_empty());
    assert_eq!(session.errno().unwrap(), ErrorCode::Ok);

    let mut code = vec![0x55, 0xc3];
    code.extend_from_slice(&[0xff, 0xff]);
    let insns = session.decode(&code, 0, 0).unwrap();
    assert_eq!(insns.len(), 2);
    session.release().unwrap();
}

#[test]
fn test_session_per_thread() {
    let engine = Arc::new(x86_engine());
    let workers: Vec<_> = (0..4u64)
        .map(|n| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let mut session = Session::x86_64(engine).unwrap();
                let base = 0x1000 * (n + 1);
                let insns = session.decode_all(X86_64_CODE, base).unwrap();
                session.release().unwrap();
                (base, insns)
            })
        })
        .collect();

    for worker in workers {
        let (base, insns) = worker.join().unwrap();
        assert_eq!(insns.len(), 12);
        assert_eq!(insns[0].address(), base);
    }
    assert_eq!(engine.open_handles(), 0);
    assert_eq!(engine.live_buffers(), 0);
    assert_eq!(engine.stats().closes, 4);
}

#[test]
fn test_instructions_outlive_session() {
    let engine = x86_engine();
    let insns = {
        let mut session = Session::x86_64(&engine).unwrap();
        let insns = session.decode_all(X86_64_CODE, 0x1000).unwrap();
        session.release().unwrap();
        insns
    };
    assert_eq!(insns[0].text(), "push rbp");
    assert_eq!(insns[9].x86_operands().len(), 2);
}

#[test]
fn test_non_x86_session_has_no_arch_payload() {
    let engine = x86_engine();
    let config = SessionConfig::new(Architecture::Arm64, Mode::ARM).with_detail(true);
    let mut session = Session::with_config(&engine, config).unwrap();
    // The script is served whatever the architecture; only the payload differs.
    let insns = session.decode(&[0x55], 0, 0).unwrap();
    let detail = insns[0].detail().unwrap();
    assert!(detail.arch.is_none());
    assert_eq!(detail.regs_read, vec![x86::RSP]);
    assert!(!insns[0].is_push());
    session.release().unwrap();
}

#[test]
fn test_errors_after_release() {
    let engine = x86_engine();
    let mut session = Session::x86_64(&engine).unwrap();
    session.release().unwrap();
    assert!(session.is_released());
    assert!(matches!(session.decode_all(X86_64_CODE, 0), Err(Error::UseAfterRelease)));
    assert!(matches!(session.errno(), Err(Error::UseAfterRelease)));
    assert!(matches!(session.group_name(GroupId::RET), Err(Error::UseAfterRelease)));
    assert!(matches!(session.insn_name(InsnId(588)), Err(Error::UseAfterRelease)));
    assert_eq!(engine.stats().disasm_calls, 0);
}

#[test]
fn test_insn_names() {
    let engine = x86_engine();
    let mut session = Session::x86_64(&engine).unwrap();
    let push = session.decode_one(&[0x55], 0x1000).unwrap().unwrap();
    assert_eq!(session.insn_name(push.id()).unwrap().as_deref(), Some("push"));
    assert_eq!(session.insn_name(InsnId(588)).unwrap().as_deref(), Some("push"));
    assert_eq!(session.insn_name(InsnId(9999)).unwrap(), None);
    session.release().unwrap();
    assert!(matches!(session.insn_name(InsnId(588)), Err(Error::UseAfterRelease)));
}
