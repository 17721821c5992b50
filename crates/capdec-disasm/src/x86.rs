//! x86 detail decoder.

use capdec_core::{
    Access, AvxBroadcast, FlagsWord, MemoryOperand, OperandType, OperandValue, RegId, X86Detail,
    X86Encoding, X86Operand,
};

use crate::decoder::slice_counted;
use crate::error::DecodeError;
use crate::raw::{RawX86, RawX86Op};

/// Decodes the x86 payload of a detail block.
///
/// Only the first `op_count` operands are read; the remaining slots are
/// never inspected.
pub fn decode_x86(raw: &RawX86, address: u64) -> Result<X86Detail, DecodeError> {
    let operands = slice_counted(&raw.operands, usize::from(raw.op_count), address, "operands")?
        .iter()
        .enumerate()
        .map(|(index, op)| decode_operand(op, address, index))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(X86Detail {
        prefix: raw.prefix,
        opcode: raw.opcode,
        rex: raw.rex,
        addr_size: raw.addr_size,
        modrm: raw.modrm,
        sib: raw.sib,
        disp: raw.disp,
        sib_index: RegId(raw.sib_index),
        sib_scale: raw.sib_scale,
        sib_base: RegId(raw.sib_base),
        xop_cc: raw.xop_cc,
        sse_cc: raw.sse_cc,
        avx_cc: raw.avx_cc,
        avx_sae: raw.avx_sae != 0,
        avx_rm: raw.avx_rm,
        // SAFETY: both members are the same u64.
        flags: FlagsWord(unsafe { raw.flags.eflags }),
        operands,
        encoding: X86Encoding {
            modrm_offset: raw.encoding.modrm_offset,
            disp_offset: raw.encoding.disp_offset,
            disp_size: raw.encoding.disp_size,
            imm_offset: raw.encoding.imm_offset,
            imm_size: raw.encoding.imm_size,
        },
    })
}

/// Decodes one operand, reading only the union member its tag selects.
pub fn decode_operand(raw: &RawX86Op, address: u64, index: usize) -> Result<X86Operand, DecodeError> {
    let op_type = OperandType::from_raw(raw.op_type)
        .ok_or_else(|| DecodeError::unknown_operand_type(address, index, raw.op_type))?;

    // SAFETY: each arm reads the member the tag names; all members are
    // plain integers, so any bit pattern is a valid value.
    let value = unsafe {
        match op_type {
            OperandType::Invalid => OperandValue::Invalid,
            OperandType::Reg => OperandValue::Reg(RegId(raw.value.reg)),
            OperandType::Imm => OperandValue::Imm(raw.value.imm),
            OperandType::Mem => {
                let mem = raw.value.mem;
                OperandValue::Mem(MemoryOperand {
                    segment: RegId(mem.segment),
                    base: RegId(mem.base),
                    index: RegId(mem.index),
                    scale: mem.scale,
                    disp: mem.disp,
                })
            }
        }
    };

    Ok(X86Operand {
        value,
        size: raw.size,
        access: Access(raw.access),
        avx_bcast: AvxBroadcast(raw.avx_bcast),
        avx_zero_opmask: raw.avx_zero_opmask != 0,
    })
}
