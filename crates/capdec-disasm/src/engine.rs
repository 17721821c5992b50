//! The boundary to the external disassembly engine.

use std::sync::Arc;

use capdec_core::{Architecture, Mode};

use crate::error::ErrorCode;
use crate::raw::RawInsn;

/// Opaque engine session handle (`csh`).
///
/// Only an engine's `open` creates one; the value is not reachable from
/// outside the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(pub(crate) usize);

/// Option kinds accepted by [`Engine::option`] (`cs_opt_type`).
///
/// Only options whose value is a plain number are listed. `CS_OPT_MEM`,
/// `CS_OPT_SKIPDATA_SETUP` and `CS_OPT_MNEMONIC` take a pointer the engine
/// dereferences, so they are not exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Syntax,
    Detail,
    Mode,
    SkipData,
    Unsigned,
}

impl OptionKind {
    pub fn raw(&self) -> i32 {
        match self {
            Self::Syntax => 1,
            Self::Detail => 2,
            Self::Mode => 3,
            Self::SkipData => 5,
            Self::Unsigned => 8,
        }
    }
}

/// Value that switches an option off.
pub const OPT_OFF: usize = 0;
/// Value that switches an option on.
pub const OPT_ON: usize = 3;

/// Assembly output syntax (`CS_OPT_SYNTAX` values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Syntax {
    #[default]
    Default,
    Intel,
    Att,
    /// Registers printed as numbers only.
    NoRegName,
    Masm,
}

impl Syntax {
    pub fn raw(&self) -> usize {
        match self {
            Self::Default => 0,
            Self::Intel => 1,
            Self::Att => 2,
            Self::NoRegName => 3,
            Self::Masm => 4,
        }
    }

    /// Parses a syntax name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "default" => Some(Self::Default),
            "intel" => Some(Self::Intel),
            "att" | "at&t" => Some(Self::Att),
            "noregname" => Some(Self::NoRegName),
            "masm" => Some(Self::Masm),
            _ => None,
        }
    }
}

/// Engine library version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

/// Major version whose record layout [`crate::raw`] mirrors.
pub const ABI_MAJOR: u32 = 4;

/// `cs_support` query for "all architectures compiled in".
pub const SUPPORT_ALL: i32 = 0xffff;
/// `cs_support` query for a diet build.
pub const SUPPORT_DIET: i32 = SUPPORT_ALL + 1;
/// `cs_support` query for a reduced x86 build.
pub const SUPPORT_X86_REDUCE: i32 = SUPPORT_ALL + 2;

/// Operations consumed from the disassembly engine.
///
/// Calls are blocking and must not be made concurrently on the same handle.
///
/// # Safety
///
/// Implementors guarantee that a pointer returned by [`Engine::disasm`] with a
/// positive count addresses that many initialised [`RawInsn`] records, that
/// every non-null `detail` pointer in them addresses an initialised
/// [`crate::raw::RawDetail`] whose architecture member matches the handle's
/// architecture, and that all of it stays valid and unaliased by writers
/// until the pointer is passed to [`Engine::free`].
///
/// Every method taking a [`RawHandle`] must accept one that was already
/// closed: `close` and `errno` report [`ErrorCode::Csh`], `option` fails with
/// it, `disasm` returns no records and the name lookups return `None`. A
/// closed handle is never passed on to the library.
pub unsafe trait Engine {
    fn version(&self) -> Version;

    fn support(&self, query: i32) -> bool;

    fn open(&self, arch: Architecture, mode: Mode) -> Result<RawHandle, ErrorCode>;

    fn close(&self, handle: RawHandle) -> ErrorCode;

    fn option(&self, handle: RawHandle, kind: OptionKind, value: usize) -> Result<(), ErrorCode>;

    /// Disassembles up to `count` instructions (0 = unbounded).
    ///
    /// Returns the record buffer and the number of records; a count of 0
    /// means nothing was decoded and no buffer was allocated.
    fn disasm(&self, handle: RawHandle, code: &[u8], address: u64, count: usize)
        -> (*mut RawInsn, usize);

    /// Releases a buffer returned by [`Engine::disasm`].
    ///
    /// # Safety
    ///
    /// `insn` and `count` must come from one `disasm` call, and the buffer
    /// must not have been freed already.
    unsafe fn free(&self, insn: *mut RawInsn, count: usize);

    fn errno(&self, handle: RawHandle) -> ErrorCode;

    fn strerror(&self, code: ErrorCode) -> String;

    fn reg_name(&self, handle: RawHandle, reg: u32) -> Option<String>;

    fn insn_name(&self, handle: RawHandle, insn: u32) -> Option<String>;

    fn group_name(&self, handle: RawHandle, group: u32) -> Option<String>;
}

macro_rules! forward_engine {
    ($ty:ty) => {
        unsafe impl<E: Engine + ?Sized> Engine for $ty {
            fn version(&self) -> Version {
                (**self).version()
            }
            fn support(&self, query: i32) -> bool {
                (**self).support(query)
            }
            fn open(&self, arch: Architecture, mode: Mode) -> Result<RawHandle, ErrorCode> {
                (**self).open(arch, mode)
            }
            fn close(&self, handle: RawHandle) -> ErrorCode {
                (**self).close(handle)
            }
            fn option(&self, handle: RawHandle, kind: OptionKind, value: usize) -> Result<(), ErrorCode> {
                (**self).option(handle, kind, value)
            }
            fn disasm(&self, handle: RawHandle, code: &[u8], address: u64, count: usize) -> (*mut RawInsn, usize) {
                (**self).disasm(handle, code, address, count)
            }
            unsafe fn free(&self, insn: *mut RawInsn, count: usize) {
                (**self).free(insn, count)
            }
            fn errno(&self, handle: RawHandle) -> ErrorCode {
                (**self).errno(handle)
            }
            fn strerror(&self, code: ErrorCode) -> String {
                (**self).strerror(code)
            }
            fn reg_name(&self, handle: RawHandle, reg: u32) -> Option<String> {
                (**self).reg_name(handle, reg)
            }
            fn insn_name(&self, handle: RawHandle, insn: u32) -> Option<String> {
                (**self).insn_name(handle, insn)
            }
            fn group_name(&self, handle: RawHandle, group: u32) -> Option<String> {
                (**self).group_name(handle, group)
            }
        }
    };
}

forward_engine!(&E);
forward_engine!(Arc<E>);
forward_engine!(Box<E>);
