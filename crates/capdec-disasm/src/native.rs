//! The system Capstone library (4.0 ABI), linked directly.

use std::collections::BTreeSet;
use std::ffi::CStr;
use std::sync::{PoisonError, RwLock};

use libc::{c_char, c_int, c_uint, size_t};
use log::debug;

use capdec_core::{Architecture, Mode};

use crate::engine::{Engine, OptionKind, RawHandle, Version};
use crate::error::ErrorCode;
use crate::raw::RawInsn;

#[link(name = "capstone")]
extern "C" {
    fn cs_version(major: *mut c_int, minor: *mut c_int) -> c_uint;
    fn cs_support(query: c_int) -> bool;
    fn cs_open(arch: c_int, mode: c_int, handle: *mut size_t) -> c_int;
    fn cs_close(handle: *mut size_t) -> c_int;
    fn cs_option(handle: size_t, kind: c_int, value: size_t) -> c_int;
    fn cs_disasm(
        handle: size_t,
        code: *const u8,
        code_size: size_t,
        address: u64,
        count: size_t,
        insn: *mut *mut RawInsn,
    ) -> size_t;
    fn cs_free(insn: *mut RawInsn, count: size_t);
    fn cs_errno(handle: size_t) -> c_int;
    fn cs_strerror(code: c_int) -> *const c_char;
    fn cs_reg_name(handle: size_t, reg_id: c_uint) -> *const c_char;
    fn cs_insn_name(handle: size_t, insn_id: c_uint) -> *const c_char;
    fn cs_group_name(handle: size_t, group_id: c_uint) -> *const c_char;
}

/// Handles opened through this binding and not yet closed.
///
/// Calls hold the read lock across the library call, so `close` cannot free a
/// handle that another call is still using.
static LIVE: RwLock<BTreeSet<usize>> = RwLock::new(BTreeSet::new());

/// Runs `call` on the handle value if the handle is live.
fn with_live<T>(handle: RawHandle, call: impl FnOnce(size_t) -> T) -> Option<T> {
    let live = LIVE.read().unwrap_or_else(PoisonError::into_inner);
    if live.contains(&handle.0) {
        Some(call(handle.0))
    } else {
        None
    }
}

/// Copies a static C string owned by the library.
fn owned_text(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: the library returns pointers into its static string tables.
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

fn status(code: c_int) -> Result<(), ErrorCode> {
    match ErrorCode::from_raw(code) {
        ErrorCode::Ok => Ok(()),
        err => Err(err),
    }
}

/// The linked engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEngine;

impl NativeEngine {
    pub fn new() -> Self {
        Self
    }
}

// SAFETY: `cs_disasm` returns `count` records allocated by the library that
// stay valid until `cs_free`; their detail pointers point into the same
// allocation, and the 4.x layout is checked by `Handle::open`. Handles are
// checked against `LIVE` before any call that passes them to the library.
unsafe impl Engine for NativeEngine {
    fn version(&self) -> Version {
        let (mut major, mut minor) = (0, 0);
        // SAFETY: both out-pointers are valid locals.
        unsafe { cs_version(&mut major, &mut minor) };
        Version {
            major: major as u32,
            minor: minor as u32,
        }
    }

    fn support(&self, query: i32) -> bool {
        // SAFETY: pure query.
        unsafe { cs_support(query) }
    }

    fn open(&self, arch: Architecture, mode: Mode) -> Result<RawHandle, ErrorCode> {
        let mut handle: size_t = 0;
        // SAFETY: `handle` is a valid out-pointer.
        status(unsafe { cs_open(arch.code(), mode.bits() as c_int, &mut handle) })?;
        LIVE.write().unwrap_or_else(PoisonError::into_inner).insert(handle);
        debug!("cs_open({}) -> {:#x}", arch, handle);
        Ok(RawHandle(handle))
    }

    fn close(&self, handle: RawHandle) -> ErrorCode {
        let mut live = LIVE.write().unwrap_or_else(PoisonError::into_inner);
        if !live.remove(&handle.0) {
            return ErrorCode::Csh;
        }
        let mut raw = handle.0 as size_t;
        // SAFETY: the handle was live and no other call holds it while the
        // write lock is held.
        ErrorCode::from_raw(unsafe { cs_close(&mut raw) })
    }

    fn option(&self, handle: RawHandle, kind: OptionKind, value: usize) -> Result<(), ErrorCode> {
        // SAFETY: live handle; every `OptionKind` takes a plain value.
        with_live(handle, |raw| status(unsafe { cs_option(raw, kind.raw(), value) }))
            .unwrap_or(Err(ErrorCode::Csh))
    }

    fn disasm(&self, handle: RawHandle, code: &[u8], address: u64, count: usize) -> (*mut RawInsn, usize) {
        with_live(handle, |raw| {
            let mut insn: *mut RawInsn = std::ptr::null_mut();
            // SAFETY: live handle; `code` is valid for `code.len()` bytes and
            // `insn` is a valid out-pointer.
            let n = unsafe { cs_disasm(raw, code.as_ptr(), code.len(), address, count, &mut insn) };
            (insn, n)
        })
        .unwrap_or((std::ptr::null_mut(), 0))
    }

    unsafe fn free(&self, insn: *mut RawInsn, count: usize) {
        unsafe { cs_free(insn, count) }
    }

    fn errno(&self, handle: RawHandle) -> ErrorCode {
        // SAFETY: live handle.
        with_live(handle, |raw| ErrorCode::from_raw(unsafe { cs_errno(raw) })).unwrap_or(ErrorCode::Csh)
    }

    fn strerror(&self, code: ErrorCode) -> String {
        // SAFETY: plain value; the result is static.
        owned_text(unsafe { cs_strerror(code.raw()) }).unwrap_or_else(|| code.description().to_string())
    }

    fn reg_name(&self, handle: RawHandle, reg: u32) -> Option<String> {
        // SAFETY: live handle.
        with_live(handle, |raw| owned_text(unsafe { cs_reg_name(raw, reg) })).flatten()
    }

    fn insn_name(&self, handle: RawHandle, insn: u32) -> Option<String> {
        // SAFETY: live handle.
        with_live(handle, |raw| owned_text(unsafe { cs_insn_name(raw, insn) })).flatten()
    }

    fn group_name(&self, handle: RawHandle, group: u32) -> Option<String> {
        // SAFETY: live handle.
        with_live(handle, |raw| owned_text(unsafe { cs_group_name(raw, group) })).flatten()
    }
}
