//! Raw record decoder: engine buffer in, owned records out.

use log::trace;

use capdec_core::{Architecture, InsnId, Record};

use crate::detail::decode_detail;
use crate::engine::{Engine, RawHandle};
use crate::error::{DecodeError, Error, ErrorCode};
use crate::raw::{RawDetail, RawInsn};

/// A record buffer owned by the engine, freed exactly once on drop.
///
/// Records are only reachable through borrows of the guard, so nothing read
/// from the buffer can outlive the call to [`Engine::free`].
pub struct NativeBuffer<'e, E: Engine + ?Sized> {
    engine: &'e E,
    ptr: *mut RawInsn,
    count: usize,
}

impl<'e, E: Engine + ?Sized> NativeBuffer<'e, E> {
    /// Runs the engine and takes ownership of what it returns.
    pub fn disasm(
        engine: &'e E,
        handle: RawHandle,
        code: &[u8],
        address: u64,
        max_count: usize,
    ) -> Self {
        let (ptr, count) = engine.disasm(handle, code, address, max_count);
        // A null buffer holds nothing, whatever count came with it.
        let count = if ptr.is_null() { 0 } else { count };
        Self { engine, ptr, count }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The records in engine order.
    pub fn records(&self) -> &[RawInsn] {
        if self.count == 0 {
            return &[];
        }
        // SAFETY: the Engine contract guarantees `count` initialised records
        // at `ptr` until `free`, which only happens in `drop`.
        unsafe { std::slice::from_raw_parts(self.ptr, self.count) }
    }

    /// Follows a record's detail pointer.
    pub fn detail<'a>(&'a self, insn: &'a RawInsn) -> Option<&'a RawDetail> {
        // SAFETY: `insn` is borrowed from this buffer, and the Engine contract
        // makes its non-null detail pointer valid for the buffer's lifetime.
        unsafe { insn.detail.as_ref() }
    }
}

impl<E: Engine + ?Sized> Drop for NativeBuffer<'_, E> {
    fn drop(&mut self) {
        if self.count > 0 {
            // SAFETY: `ptr`/`count` came from one `disasm` call and this is
            // the only place they are freed.
            unsafe { self.engine.free(self.ptr, self.count) };
        }
    }
}

/// Reads a NUL-terminated string out of a fixed-capacity array.
///
/// Text stops at the first NUL; an array with no NUL is used whole.
pub fn decode_c_text(backing: &[u8], address: u64, field: &'static str) -> Result<String, DecodeError> {
    let end = backing.iter().position(|&b| b == 0).unwrap_or(backing.len());
    std::str::from_utf8(&backing[..end])
        .map(str::to_owned)
        .map_err(|_| DecodeError::invalid_text(address, field))
}

/// Slices a fixed-capacity array to its reported count.
pub fn slice_counted<'a, T>(
    backing: &'a [T],
    count: usize,
    address: u64,
    field: &'static str,
) -> Result<&'a [T], DecodeError> {
    backing
        .get(..count)
        .ok_or_else(|| DecodeError::count_overflow(address, field, count, backing.len()))
}

/// Copies one record (and its detail, if given) into owned values.
pub fn decode_record(
    insn: &RawInsn,
    detail: Option<&RawDetail>,
    arch: Architecture,
) -> Result<Record, DecodeError> {
    let address = insn.address;
    let bytes = slice_counted(&insn.bytes, usize::from(insn.size), address, "bytes")?;
    let mnemonic = decode_c_text(&insn.mnemonic, address, "mnemonic")?;
    let op_str = decode_c_text(&insn.op_str, address, "op_str")?;
    let detail = detail
        .map(|raw| decode_detail(raw, arch, address))
        .transpose()?;

    Ok(Record {
        id: InsnId(insn.id),
        address,
        size: insn.size,
        bytes: bytes.to_vec(),
        mnemonic,
        op_str,
        detail,
    })
}

/// Disassembles `code` and copies every record out before the buffer is freed.
///
/// Zero records is a valid result unless the engine reports it ran out of
/// memory. A corrupted record aborts the call; the buffer is still freed.
pub fn disassemble<E: Engine + ?Sized>(
    engine: &E,
    handle: RawHandle,
    arch: Architecture,
    code: &[u8],
    address: u64,
    max_count: usize,
) -> Result<Vec<Record>, Error> {
    let buffer = NativeBuffer::disasm(engine, handle, code, address, max_count);
    trace!(
        "disassembled {} record(s) from {} byte(s) at {:#x}",
        buffer.len(),
        code.len(),
        address
    );

    if buffer.is_empty() {
        return match engine.errno(handle) {
            code @ (ErrorCode::Mem | ErrorCode::MemSetup) => {
                Err(Error::from_engine(code, engine.strerror(code)))
            }
            _ => Ok(Vec::new()),
        };
    }

    buffer
        .records()
        .iter()
        .map(|insn| decode_record(insn, buffer.detail(insn), arch).map_err(Error::from))
        .collect()
}
