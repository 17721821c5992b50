//! Property-based tests for the record and detail decoders.
//!
//! These tests verify invariants that should hold for any record the engine
//! could hand back:
//! - Decoding never panics, whatever the counts and tags say
//! - Lists are exactly as long as their counts, or the record is rejected
//! - Operand payloads always agree with their tags
//! - Every buffer is freed exactly once, on success and on failure

mod common;

use proptest::prelude::*;

use capdec_core::{Architecture, OperandType};
use capdec_disasm::decoder::decode_record;
use capdec_disasm::raw::{
    RawDetail, RawInsn, RawX86Op, GROUPS_MAX, INSN_BYTES, MNEMONIC_SIZE, OP_STR_SIZE, REGS_READ_MAX,
    REGS_WRITE_MAX, X86_OPERANDS_MAX,
};
use capdec_disasm::{DecodeError, Error, Session};

use common::x86_engine;

fn arb_insn() -> impl Strategy<Value = RawInsn> {
    (
        any::<u64>(),
        any::<u16>(),
        prop::array::uniform16(any::<u8>()),
        prop::collection::vec(any::<u8>(), MNEMONIC_SIZE),
        prop::collection::vec(any::<u8>(), OP_STR_SIZE),
    )
        .prop_map(|(address, size, bytes, mnemonic, op_str)| {
            let mut insn = RawInsn::zeroed();
            insn.address = address;
            insn.size = size % (INSN_BYTES as u16 + 4);
            insn.bytes = bytes;
            insn.mnemonic.copy_from_slice(&mnemonic);
            insn.op_str.copy_from_slice(&op_str);
            insn
        })
}

fn arb_op() -> impl Strategy<Value = RawX86Op> {
    (-2i32..6, any::<i64>(), any::<u8>(), any::<u8>()).prop_map(|(tag, imm, size, access)| {
        let mut op = RawX86Op::imm(imm, size);
        op.op_type = tag;
        op.access = access;
        op
    })
}

fn arb_detail() -> impl Strategy<Value = RawDetail> {
    (
        0u8..=REGS_READ_MAX as u8 + 2,
        0u8..=REGS_WRITE_MAX as u8 + 2,
        0u8..=GROUPS_MAX as u8 + 2,
        0u8..=X86_OPERANDS_MAX as u8 + 2,
        prop::collection::vec(arb_op(), X86_OPERANDS_MAX),
        any::<u64>(),
    )
        .prop_map(|(read, write, groups, op_count, ops, flags)| {
            let mut detail = RawDetail::zeroed();
            detail.regs_read_count = read;
            detail.regs_write_count = write;
            detail.groups_count = groups;
            // SAFETY: writing the x86 member of a Copy union.
            let payload = unsafe { &mut detail.arch.x86 };
            payload.op_count = op_count;
            payload.operands.copy_from_slice(&ops);
            payload.flags.eflags = flags;
            detail
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Record decoding never panics and keeps size and bytes in step.
    #[test]
    fn record_bytes_match_size(insn in arb_insn()) {
        match decode_record(&insn, None, Architecture::X86) {
            Ok(record) => {
                prop_assert!(usize::from(record.size) <= INSN_BYTES);
                prop_assert_eq!(record.bytes.len(), usize::from(record.size));
                prop_assert_eq!(&record.bytes[..], &insn.bytes[..record.bytes.len()]);
                prop_assert!(record.mnemonic.len() < MNEMONIC_SIZE + 1);
                prop_assert!(!record.mnemonic.contains('\0'));
                prop_assert!(!record.op_str.contains('\0'));
            }
            Err(DecodeError::CountOverflow { field, .. }) => {
                prop_assert_eq!(field, "bytes");
                prop_assert!(usize::from(insn.size) > INSN_BYTES);
            }
            Err(DecodeError::InvalidText { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }

    /// Detail lists match their counts; anything over capacity is rejected.
    #[test]
    fn detail_lengths_match_counts(detail in arb_detail()) {
        let mut insn = RawInsn::zeroed();
        insn.size = 1;
        let overflow = usize::from(detail.regs_read_count) > REGS_READ_MAX
            || usize::from(detail.regs_write_count) > REGS_WRITE_MAX
            || usize::from(detail.groups_count) > GROUPS_MAX;

        match decode_record(&insn, Some(&detail), Architecture::X86) {
            Ok(record) => {
                prop_assert!(!overflow);
                let decoded = record.detail.unwrap();
                prop_assert_eq!(decoded.regs_read.len(), usize::from(detail.regs_read_count));
                prop_assert_eq!(decoded.regs_write.len(), usize::from(detail.regs_write_count));
                prop_assert_eq!(decoded.groups.len(), usize::from(detail.groups_count));

                let x86 = decoded.x86().unwrap();
                let raw = unsafe { &detail.arch.x86 };
                prop_assert_eq!(x86.operands.len(), usize::from(raw.op_count));
                prop_assert!(x86.operands.len() <= X86_OPERANDS_MAX);
                prop_assert_eq!(x86.flags.eflags(), x86.flags.fpu_flags());
                for (op, raw_op) in x86.operands.iter().zip(&raw.operands) {
                    prop_assert_eq!(op.op_type().raw(), raw_op.op_type);
                    prop_assert_eq!(op.imm_value().is_some(), op.op_type() == OperandType::Imm);
                    prop_assert_eq!(op.reg_id().is_some(), op.op_type() == OperandType::Reg);
                    prop_assert_eq!(op.mem_ref().is_some(), op.op_type() == OperandType::Mem);
                }
            }
            Err(DecodeError::CountOverflow { count, capacity, .. }) => {
                prop_assert!(count > capacity);
            }
            Err(DecodeError::UnknownOperandType { tag, index, .. }) => {
                prop_assert!(!(0..=3).contains(&tag));
                let raw = unsafe { &detail.arch.x86 };
                prop_assert!(index < usize::from(raw.op_count));
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Arbitrary input never leaks a buffer or a handle.
    #[test]
    fn session_frees_every_buffer(
        bytes in prop::collection::vec(any::<u8>(), 0..64),
        address in any::<u64>(),
        max_count in 0usize..8,
    ) {
        let engine = x86_engine();
        let mut session = Session::x86_64(&engine).unwrap();
        let insns = session.decode(&bytes, address, max_count).unwrap();
        if max_count > 0 {
            prop_assert!(insns.len() <= max_count);
        }
        let mut next = address;
        for insn in &insns {
            prop_assert_eq!(insn.address(), next);
            prop_assert_eq!(insn.size(), insn.bytes().len());
            next = insn.end_address();
        }
        session.release().unwrap();
        prop_assert_eq!(engine.live_buffers(), 0);
        prop_assert_eq!(engine.open_handles(), 0);
        let stats = engine.stats();
        prop_assert_eq!(stats.bad_frees, 0);
        prop_assert_eq!(stats.frees, usize::from(!insns.is_empty()));
        prop_assert!(matches!(session.decode(&bytes, address, 0), Err(Error::UseAfterRelease)));
    }
}
