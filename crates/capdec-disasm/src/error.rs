//! Error types for the engine boundary and record decoding.

use std::fmt;

use thiserror::Error;

/// Engine status codes (`cs_err`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Ok,
    /// Out of memory.
    Mem,
    /// Unsupported architecture.
    Arch,
    /// Invalid handle.
    Handle,
    /// Invalid handle argument.
    Csh,
    /// Invalid or unsupported mode.
    Mode,
    /// Invalid or unsupported option.
    Option,
    /// Information unavailable because detail is off.
    Detail,
    /// Dynamic memory management uninitialized.
    MemSetup,
    /// Unsupported version.
    Version,
    /// Access to data that a diet engine does not carry.
    Diet,
    /// Access to data irrelevant for a skipped-data record.
    SkipData,
    X86Att,
    X86Intel,
    X86Masm,
    /// A code this binding does not know.
    Unknown(i32),
}

/// How an engine status is surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Success,
    Configuration,
    Resource,
    Engine,
}

impl ErrorCode {
    pub fn from_raw(code: i32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::Mem,
            2 => Self::Arch,
            3 => Self::Handle,
            4 => Self::Csh,
            5 => Self::Mode,
            6 => Self::Option,
            7 => Self::Detail,
            8 => Self::MemSetup,
            9 => Self::Version,
            10 => Self::Diet,
            11 => Self::SkipData,
            12 => Self::X86Att,
            13 => Self::X86Intel,
            14 => Self::X86Masm,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Mem => 1,
            Self::Arch => 2,
            Self::Handle => 3,
            Self::Csh => 4,
            Self::Mode => 5,
            Self::Option => 6,
            Self::Detail => 7,
            Self::MemSetup => 8,
            Self::Version => 9,
            Self::Diet => 10,
            Self::SkipData => 11,
            Self::X86Att => 12,
            Self::X86Intel => 13,
            Self::X86Masm => 14,
            Self::Unknown(code) => *code,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn classify(&self) -> ErrorClass {
        match self {
            Self::Ok => ErrorClass::Success,
            Self::Arch
            | Self::Mode
            | Self::Option
            | Self::Version
            | Self::X86Att
            | Self::X86Intel
            | Self::X86Masm => ErrorClass::Configuration,
            Self::Mem | Self::MemSetup => ErrorClass::Resource,
            _ => ErrorClass::Engine,
        }
    }

    /// Static description, used when the engine offers no text of its own.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Ok => "OK (CS_ERR_OK)",
            Self::Mem => "Out of memory (CS_ERR_MEM)",
            Self::Arch => "Invalid/unsupported architecture(CS_ERR_ARCH)",
            Self::Handle => "Invalid handle (CS_ERR_HANDLE)",
            Self::Csh => "Invalid csh (CS_ERR_CSH)",
            Self::Mode => "Invalid mode (CS_ERR_MODE)",
            Self::Option => "Invalid option (CS_ERR_OPTION)",
            Self::Detail => "Details are unavailable (CS_ERR_DETAIL)",
            Self::MemSetup => "Dynamic memory management uninitialized (CS_ERR_MEMSETUP)",
            Self::Version => "Different API version between core & binding (CS_ERR_VERSION)",
            Self::Diet => "Information irrelevant in diet engine (CS_ERR_DIET)",
            Self::SkipData => "Information irrelevant for 'data' instruction in SKIPDATA mode (CS_ERR_SKIPDATA)",
            Self::X86Att => "AT&T syntax is unavailable (CS_ERR_X86_ATT)",
            Self::X86Intel => "INTEL syntax is unavailable (CS_ERR_X86_INTEL)",
            Self::X86Masm => "MASM syntax is unavailable (CS_ERR_X86_MASM)",
            Self::Unknown(_) => "Unknown error code",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code {}", self.raw())
    }
}

/// A record that does not satisfy the wire-format invariants.
///
/// Indicates a corrupted record or an engine built against another ABI.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A count field exceeds the capacity of its backing array.
    #[error("corrupt record at {address:#x}: {field} count {count} exceeds capacity {capacity}")]
    CountOverflow {
        address: u64,
        field: &'static str,
        count: usize,
        capacity: usize,
    },

    /// An operand carries a type tag outside the known set.
    #[error("corrupt record at {address:#x}: operand {index} has unknown type tag {tag}")]
    UnknownOperandType { address: u64, index: usize, tag: i32 },

    /// A text field is not valid UTF-8.
    #[error("corrupt record at {address:#x}: {field} is not valid UTF-8")]
    InvalidText { address: u64, field: &'static str },
}

impl DecodeError {
    /// Creates a new CountOverflow error.
    pub fn count_overflow(address: u64, field: &'static str, count: usize, capacity: usize) -> Self {
        Self::CountOverflow {
            address,
            field,
            count,
            capacity,
        }
    }

    /// Creates a new UnknownOperandType error.
    pub fn unknown_operand_type(address: u64, index: usize, tag: i32) -> Self {
        Self::UnknownOperandType {
            address,
            index,
            tag,
        }
    }

    /// Creates a new InvalidText error.
    pub fn invalid_text(address: u64, field: &'static str) -> Self {
        Self::InvalidText { address, field }
    }

    /// Address of the offending record.
    pub fn address(&self) -> u64 {
        match self {
            Self::CountOverflow { address, .. }
            | Self::UnknownOperandType { address, .. }
            | Self::InvalidText { address, .. } => *address,
        }
    }
}

/// Error type for sessions.
#[derive(Error, Debug)]
pub enum Error {
    /// The engine rejected an architecture, mode, option or version.
    #[error("configuration rejected by engine: {message} ({code})")]
    Configuration { code: ErrorCode, message: String },

    /// The engine ran out of memory.
    #[error("engine out of resources: {message} ({code})")]
    Resource { code: ErrorCode, message: String },

    /// A record violated the wire-format invariants.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The session handle was already released.
    #[error("session handle used after release")]
    UseAfterRelease,

    /// Any other engine failure.
    #[error("engine error: {message} ({code})")]
    Engine { code: ErrorCode, message: String },
}

impl Error {
    /// Translates an engine status into an error, keeping its code and text.
    pub fn from_engine(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match code.classify() {
            ErrorClass::Configuration => Self::Configuration { code, message },
            ErrorClass::Resource => Self::Resource { code, message },
            ErrorClass::Success | ErrorClass::Engine => Self::Engine { code, message },
        }
    }

    /// Returns the engine status behind this error, if it came from the engine.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Configuration { code, .. }
            | Self::Resource { code, .. }
            | Self::Engine { code, .. } => Some(*code),
            Self::Decode(_) | Self::UseAfterRelease => None,
        }
    }
}
