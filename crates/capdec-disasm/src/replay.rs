//! An in-memory engine that serves scripted records.
//!
//! [`ReplayEngine`] hands out buffers laid out exactly like the native
//! engine's, so everything above the [`Engine`] trait runs unchanged against
//! it. It counts handle and buffer traffic so ownership can be checked.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::trace;

use capdec_core::{Architecture, Mode};

use crate::engine::{
    Engine, OptionKind, RawHandle, Syntax, Version, ABI_MAJOR, OPT_OFF, OPT_ON, SUPPORT_ALL,
};
use crate::error::ErrorCode;
use crate::raw::{c_text, RawDetail, RawInsn, INSN_BYTES};

/// One scripted instruction.
#[derive(Clone)]
pub struct ReplayInsn {
    pub id: u32,
    pub bytes: Vec<u8>,
    pub mnemonic: String,
    pub op_str: String,
    /// Detail served when the handle has detail on; a zeroed block otherwise.
    pub detail: Option<RawDetail>,
}

impl ReplayInsn {
    /// A scripted instruction. Bytes past the 16-byte record capacity are dropped.
    pub fn new(id: u32, bytes: &[u8], mnemonic: &str, op_str: &str) -> Self {
        Self {
            id,
            bytes: bytes[..bytes.len().min(INSN_BYTES)].to_vec(),
            mnemonic: mnemonic.to_string(),
            op_str: op_str.to_string(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: RawDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    fn to_raw(&self, address: u64) -> RawInsn {
        let mut insn = RawInsn::zeroed();
        let len = self.bytes.len().min(INSN_BYTES);
        insn.id = self.id;
        insn.address = address;
        insn.size = len as u16;
        insn.bytes[..len].copy_from_slice(&self.bytes[..len]);
        insn.mnemonic = c_text(&self.mnemonic);
        insn.op_str = c_text(&self.op_str);
        insn
    }
}

impl std::fmt::Debug for ReplayInsn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayInsn")
            .field("id", &self.id)
            .field("bytes", &self.bytes)
            .field("mnemonic", &self.mnemonic)
            .field("op_str", &self.op_str)
            .field("detail", &self.detail.is_some())
            .finish()
    }
}

/// Traffic counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplayStats {
    pub opens: usize,
    pub closes: usize,
    pub disasm_calls: usize,
    pub frees: usize,
    /// Frees of a pointer that was never handed out or was already freed.
    pub bad_frees: usize,
}

#[derive(Debug, Clone)]
struct HandleState {
    arch: Architecture,
    mode: Mode,
    detail: bool,
    syntax: Syntax,
    unsigned: bool,
    errno: ErrorCode,
}

/// A buffer handed out by `disasm`, keyed by its address.
#[derive(Debug)]
struct Allocation {
    count: usize,
    details: Vec<usize>,
}

#[derive(Debug, Default)]
struct ReplayState {
    next_handle: usize,
    handles: HashMap<usize, HandleState>,
    live: HashMap<usize, Allocation>,
    fail_next: Option<ErrorCode>,
    stats: ReplayStats,
}

/// Scripted in-memory engine.
#[derive(Debug)]
pub struct ReplayEngine {
    script: Vec<ReplayInsn>,
    version: Version,
    supported: HashSet<Architecture>,
    reg_names: HashMap<u32, String>,
    insn_names: HashMap<u32, String>,
    group_names: HashMap<u32, String>,
    state: Mutex<ReplayState>,
}

impl Default for ReplayEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayEngine {
    /// An engine with an empty script that accepts every architecture.
    pub fn new() -> Self {
        Self {
            script: Vec::new(),
            version: Version {
                major: ABI_MAJOR,
                minor: 0,
            },
            supported: Architecture::ALL.into_iter().collect(),
            reg_names: HashMap::new(),
            insn_names: HashMap::new(),
            group_names: HashMap::new(),
            state: Mutex::new(ReplayState {
                next_handle: 1,
                ..Default::default()
            }),
        }
    }

    /// Adds a scripted instruction. Earlier entries win when several match.
    pub fn with_insn(mut self, insn: ReplayInsn) -> Self {
        self.script.push(insn);
        self
    }

    pub fn with_script(mut self, insns: impl IntoIterator<Item = ReplayInsn>) -> Self {
        self.script.extend(insns);
        self
    }

    pub fn with_version(mut self, major: u32, minor: u32) -> Self {
        self.version = Version { major, minor };
        self
    }

    /// Restricts the architectures `open` accepts.
    pub fn with_supported(mut self, archs: &[Architecture]) -> Self {
        self.supported = archs.iter().copied().collect();
        self
    }

    pub fn with_reg_name(mut self, reg: u32, name: &str) -> Self {
        self.reg_names.insert(reg, name.to_string());
        self
    }

    pub fn with_insn_name(mut self, insn: u32, name: &str) -> Self {
        self.insn_names.insert(insn, name.to_string());
        self
    }

    pub fn with_group_name(mut self, group: u32, name: &str) -> Self {
        self.group_names.insert(group, name.to_string());
        self
    }

    /// Makes the next `disasm` call return nothing and report `code`.
    pub fn fail_next_disasm(&self, code: ErrorCode) {
        self.state().fail_next = Some(code);
    }

    pub fn stats(&self) -> ReplayStats {
        self.state().stats
    }

    /// Number of handles opened and not yet closed.
    pub fn open_handles(&self) -> usize {
        self.state().handles.len()
    }

    /// Number of buffers handed out and not yet freed.
    pub fn live_buffers(&self) -> usize {
        self.state().live.len()
    }

    /// Whether detail is on for `handle`.
    pub fn detail_enabled(&self, handle: RawHandle) -> bool {
        self.state()
            .handles
            .get(&handle.0)
            .map(|h| h.detail)
            .unwrap_or(false)
    }

    /// Current syntax of `handle`.
    pub fn syntax(&self, handle: RawHandle) -> Option<Syntax> {
        self.state().handles.get(&handle.0).map(|h| h.syntax)
    }

    /// Whether unsigned immediates are on for `handle`.
    pub fn unsigned_enabled(&self, handle: RawHandle) -> bool {
        self.state()
            .handles
            .get(&handle.0)
            .map(|h| h.unsigned)
            .unwrap_or(false)
    }

    fn state(&self) -> MutexGuard<'_, ReplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_mode(arch: Architecture, mode: Mode) -> Result<(), ErrorCode> {
        match arch {
            Architecture::X86 if mode.x86_bits().is_none() => Err(ErrorCode::Mode),
            _ => Ok(()),
        }
    }

    fn lookup(&self, code: &[u8]) -> Option<&ReplayInsn> {
        self.script
            .iter()
            .find(|insn| !insn.bytes.is_empty() && code.starts_with(&insn.bytes))
    }

    fn switch(value: usize) -> Result<bool, ErrorCode> {
        match value {
            OPT_ON => Ok(true),
            OPT_OFF => Ok(false),
            _ => Err(ErrorCode::Option),
        }
    }
}

// SAFETY: `disasm` hands out leaked boxes that stay untouched until `free`
// reclaims them, and a detail pointer is only set to a leaked `RawDetail`
// built for the handle's architecture.
unsafe impl Engine for ReplayEngine {
    fn version(&self) -> Version {
        self.version
    }

    fn support(&self, query: i32) -> bool {
        match query {
            SUPPORT_ALL => Architecture::ALL.iter().all(|a| self.supported.contains(a)),
            _ => Architecture::from_code(query).is_some_and(|a| self.supported.contains(&a)),
        }
    }

    fn open(&self, arch: Architecture, mode: Mode) -> Result<RawHandle, ErrorCode> {
        if !self.supported.contains(&arch) {
            return Err(ErrorCode::Arch);
        }
        Self::check_mode(arch, mode)?;

        let mut state = self.state();
        let id = state.next_handle;
        state.next_handle += 1;
        state.handles.insert(
            id,
            HandleState {
                arch,
                mode,
                detail: false,
                syntax: Syntax::Default,
                unsigned: false,
                errno: ErrorCode::Ok,
            },
        );
        state.stats.opens += 1;
        Ok(RawHandle(id))
    }

    fn close(&self, handle: RawHandle) -> ErrorCode {
        let mut state = self.state();
        match state.handles.remove(&handle.0) {
            Some(_) => {
                state.stats.closes += 1;
                ErrorCode::Ok
            }
            None => ErrorCode::Csh,
        }
    }

    fn option(&self, handle: RawHandle, kind: OptionKind, value: usize) -> Result<(), ErrorCode> {
        let mut state = self.state();
        let h = state.handles.get_mut(&handle.0).ok_or(ErrorCode::Csh)?;
        let outcome = match kind {
            OptionKind::Detail => Self::switch(value).map(|on| h.detail = on),
            OptionKind::Unsigned => Self::switch(value).map(|on| h.unsigned = on),
            OptionKind::Syntax => match value {
                0 => Ok(Syntax::Default),
                1 => Ok(Syntax::Intel),
                2 => Ok(Syntax::Att),
                3 => Ok(Syntax::NoRegName),
                4 => Ok(Syntax::Masm),
                _ => Err(ErrorCode::Option),
            }
            .and_then(|syntax| match (h.arch, syntax) {
                (Architecture::X86, _) | (_, Syntax::Default | Syntax::NoRegName) => {
                    h.syntax = syntax;
                    Ok(())
                }
                _ => Err(ErrorCode::Option),
            }),
            OptionKind::Mode => {
                let mode = Mode(value as u32);
                Self::check_mode(h.arch, mode).map(|()| h.mode = mode)
            }
            _ => Err(ErrorCode::Option),
        };
        h.errno = outcome.err().unwrap_or(ErrorCode::Ok);
        outcome
    }

    fn disasm(&self, handle: RawHandle, code: &[u8], address: u64, count: usize) -> (*mut RawInsn, usize) {
        let mut state = self.state();
        state.stats.disasm_calls += 1;
        let fail = state.fail_next.take();
        let Some(h) = state.handles.get_mut(&handle.0) else {
            return (std::ptr::null_mut(), 0);
        };
        if let Some(code) = fail {
            h.errno = code;
            return (std::ptr::null_mut(), 0);
        }
        h.errno = ErrorCode::Ok;
        let detail = h.detail;

        let mut insns = Vec::new();
        let mut details = Vec::new();
        let mut offset = 0usize;
        while offset < code.len() && (count == 0 || insns.len() < count) {
            let Some(entry) = self.lookup(&code[offset..]) else {
                break;
            };
            let mut raw = entry.to_raw(address.wrapping_add(offset as u64));
            if detail {
                let block = Box::new(entry.detail.unwrap_or_else(RawDetail::zeroed));
                raw.detail = Box::into_raw(block);
                details.push(raw.detail as usize);
            }
            offset += usize::from(raw.size);
            insns.push(raw);
        }

        if insns.is_empty() {
            return (std::ptr::null_mut(), 0);
        }
        let count = insns.len();
        let ptr = Box::into_raw(insns.into_boxed_slice()) as *mut RawInsn;
        state.live.insert(ptr as usize, Allocation { count, details });
        trace!("replay: served {} record(s) at {:#x}", count, address);
        (ptr, count)
    }

    unsafe fn free(&self, insn: *mut RawInsn, count: usize) {
        let mut state = self.state();
        match state.live.remove(&(insn as usize)) {
            Some(alloc) if alloc.count == count => {
                state.stats.frees += 1;
                // SAFETY: both came from `Box::into_raw` in `disasm` and were
                // removed from `live`, so they are reclaimed once.
                unsafe { reclaim(insn, alloc) };
            }
            Some(alloc) => {
                // Wrong count: keep the buffer so it is reclaimed on drop.
                state.stats.bad_frees += 1;
                state.live.insert(insn as usize, alloc);
            }
            None => state.stats.bad_frees += 1,
        }
    }

    fn errno(&self, handle: RawHandle) -> ErrorCode {
        self.state()
            .handles
            .get(&handle.0)
            .map(|h| h.errno)
            .unwrap_or(ErrorCode::Csh)
    }

    fn strerror(&self, code: ErrorCode) -> String {
        code.description().to_string()
    }

    fn reg_name(&self, handle: RawHandle, reg: u32) -> Option<String> {
        self.state().handles.get(&handle.0)?;
        self.reg_names.get(&reg).cloned()
    }

    fn insn_name(&self, handle: RawHandle, insn: u32) -> Option<String> {
        self.state().handles.get(&handle.0)?;
        self.insn_names.get(&insn).cloned()
    }

    fn group_name(&self, handle: RawHandle, group: u32) -> Option<String> {
        self.state().handles.get(&handle.0)?;
        self.group_names.get(&group).cloned()
    }
}

/// # Safety
///
/// `insn` and every pointer in `alloc.details` must come from `Box::into_raw`
/// in [`ReplayEngine::disasm`] and not have been reclaimed yet.
unsafe fn reclaim(insn: *mut RawInsn, alloc: Allocation) {
    for detail in alloc.details {
        drop(unsafe { Box::from_raw(detail as *mut RawDetail) });
    }
    drop(unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(insn, alloc.count)) });
}

impl Drop for ReplayEngine {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (ptr, alloc) in state.live.drain() {
            // SAFETY: still in `live`, so never reclaimed.
            unsafe { reclaim(ptr as *mut RawInsn, alloc) };
        }
    }
}
