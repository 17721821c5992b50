#![no_main]

use libfuzzer_sys::fuzz_target;

use capdec_disasm::{ReplayEngine, ReplayInsn, Session};

fuzz_target!(|data: &[u8]| {
    let engine = ReplayEngine::new()
        .with_insn(ReplayInsn::new(1, &[0x55], "push", "rbp"))
        .with_insn(ReplayInsn::new(2, &[0x48, 0x89, 0xe5], "mov", "rbp, rsp"))
        .with_insn(ReplayInsn::new(3, &[0xc3], "ret", ""));

    let Ok(mut session) = Session::x86_64(&engine) else {
        return;
    };
    let max_count = data.first().map(|&b| usize::from(b % 8)).unwrap_or(0);
    let _ = session.decode(data, 0x1000, max_count);
    let _ = session.release();

    assert_eq!(engine.live_buffers(), 0);
    assert_eq!(engine.open_handles(), 0);
});
