//! Property-based tests for the instruction model.

use proptest::prelude::*;

use capdec_core::mnemonic::X86;
use capdec_core::{Architecture, InsnId, Instruction, Record};

fn x86_insn(mnemonic: &str, bytes: Vec<u8>, address: u64) -> Instruction {
    Instruction::new(
        Architecture::X86,
        Record::new(InsnId(0), address, bytes, mnemonic, ""),
    )
}

fn any_table_mnemonic() -> impl Strategy<Value = String> {
    let all: Vec<&'static str> = [
        X86.call, X86.jump, X86.ret, X86.nop, X86.push, X86.pop, X86.mov, X86.lea,
        X86.interrupt, X86.compare,
    ]
    .concat();
    prop::sample::select(all).prop_map(str::to_string)
}

proptest! {
    /// Hex rendering has one two-digit group per byte.
    #[test]
    fn hex_bytes_shape(bytes in prop::collection::vec(any::<u8>(), 0..16)) {
        let insn = x86_insn("nop", bytes.clone(), 0);
        let hex = insn.hex_bytes();
        if bytes.is_empty() {
            prop_assert_eq!(hex, "");
        } else {
            let groups: Vec<&str> = hex.split(' ').collect();
            prop_assert_eq!(groups.len(), bytes.len());
            for (group, byte) in groups.iter().zip(&bytes) {
                prop_assert_eq!(group.len(), 2);
                prop_assert_eq!(u8::from_str_radix(group, 16).unwrap(), *byte);
                prop_assert_eq!(group.to_ascii_lowercase(), group.to_string());
            }
        }
    }

    /// The end address is the start address plus the size.
    #[test]
    fn end_address_adds_size(
        address in 0u64..0xFFFF_FFFF_FFFF_0000u64,
        bytes in prop::collection::vec(any::<u8>(), 0..16)
    ) {
        let len = bytes.len() as u64;
        let insn = x86_insn("nop", bytes, address);
        prop_assert_eq!(insn.end_address(), address + len);
    }

    /// Classification ignores mnemonic case.
    #[test]
    fn classification_is_case_insensitive(m in any_table_mnemonic()) {
        let lower = x86_insn(&m, vec![0x90], 0);
        let upper = x86_insn(&m.to_ascii_uppercase(), vec![0x90], 0);
        prop_assert_eq!(lower.category(), upper.category());
        prop_assert_eq!(lower.is_branch(), upper.is_branch());
    }

    /// `is_branch` is exactly call ∨ jump ∨ ret ∨ interrupt.
    #[test]
    fn branch_is_union_of_flow_predicates(m in "[a-z]{1,8}") {
        let insn = x86_insn(&m, vec![0x90], 0);
        prop_assert_eq!(
            insn.is_branch(),
            insn.is_call() || insn.is_jump() || insn.is_ret() || insn.is_interrupt()
        );
        if insn.is_conditional_jump() {
            prop_assert!(insn.is_jump());
        }
    }
}
