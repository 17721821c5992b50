#![no_main]

use libfuzzer_sys::fuzz_target;

use capdec_core::Architecture;
use capdec_disasm::decoder::decode_record;
use capdec_disasm::raw::{RawDetail, RawInsn};

/// Overlays `data` onto a zeroed value, leaving the rest zero.
fn overlay<T: Copy>(mut value: T, data: &[u8]) -> T {
    let len = data.len().min(std::mem::size_of::<T>());
    // SAFETY: `T` here is a plain repr(C) record made of integers and
    // integer unions, so every byte pattern is a valid value.
    unsafe {
        std::ptr::copy_nonoverlapping(data.as_ptr(), &mut value as *mut T as *mut u8, len);
    }
    value
}

fuzz_target!(|data: &[u8]| {
    let split = data.len().min(std::mem::size_of::<RawInsn>());
    let (insn_bytes, detail_bytes) = data.split_at(split);

    let mut insn = overlay(RawInsn::zeroed(), insn_bytes);
    // The pointer bytes are fuzz data; never follow them.
    insn.detail = std::ptr::null_mut();
    let detail = overlay(RawDetail::zeroed(), detail_bytes);

    // Corrupt records must be rejected, never panic.
    for arch in [Architecture::X86, Architecture::Arm64] {
        let _ = decode_record(&insn, None, arch);
        let _ = decode_record(&insn, Some(&detail), arch);
    }
});
