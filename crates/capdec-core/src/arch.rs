//! Architecture and mode identification, using the engine's numeric tags.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// CPU architectures known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Architecture {
    /// ARM (including Thumb and Thumb-2)
    Arm,
    /// ARM 64-bit (AArch64)
    Arm64,
    Mips,
    /// x86 and x86-64
    X86,
    PowerPc,
    Sparc,
    SystemZ,
    XCore,
    M68k,
    Tms320c64x,
    M680x,
    /// Ethereum virtual machine
    Evm,
}

impl Architecture {
    /// Every architecture, in engine tag order.
    pub const ALL: [Architecture; 12] = [
        Self::Arm,
        Self::Arm64,
        Self::Mips,
        Self::X86,
        Self::PowerPc,
        Self::Sparc,
        Self::SystemZ,
        Self::XCore,
        Self::M68k,
        Self::Tms320c64x,
        Self::M680x,
        Self::Evm,
    ];

    /// Returns the engine's numeric tag for this architecture.
    pub fn code(&self) -> i32 {
        match self {
            Self::Arm => 0,
            Self::Arm64 => 1,
            Self::Mips => 2,
            Self::X86 => 3,
            Self::PowerPc => 4,
            Self::Sparc => 5,
            Self::SystemZ => 6,
            Self::XCore => 7,
            Self::M68k => 8,
            Self::Tms320c64x => 9,
            Self::M680x => 10,
            Self::Evm => 11,
        }
    }

    /// Looks up an architecture by its engine tag.
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Returns the name of this architecture.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Arm => "arm",
            Self::Arm64 => "arm64",
            Self::Mips => "mips",
            Self::X86 => "x86",
            Self::PowerPc => "ppc",
            Self::Sparc => "sparc",
            Self::SystemZ => "sysz",
            Self::XCore => "xcore",
            Self::M68k => "m68k",
            Self::Tms320c64x => "tms320c64x",
            Self::M680x => "m680x",
            Self::Evm => "evm",
        }
    }

    /// Longest instruction the engine can emit for this architecture, in bytes.
    pub fn max_instruction_size(&self) -> usize {
        match self {
            Self::X86 => 15,
            Self::SystemZ => 6,
            Self::M68k => 10,
            Self::M680x => 5,
            Self::Evm => 33,
            _ => 4,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Engine mode flags.
///
/// Several flags share a bit across architectures (e.g. `THUMB` and
/// `MICRO`), so a mode only has meaning together with its [`Architecture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mode(pub u32);

impl Mode {
    pub const LITTLE_ENDIAN: Mode = Mode(0);
    pub const ARM: Mode = Mode(0);
    pub const MODE_16: Mode = Mode(1 << 1);
    pub const MODE_32: Mode = Mode(1 << 2);
    pub const MODE_64: Mode = Mode(1 << 3);
    pub const THUMB: Mode = Mode(1 << 4);
    pub const MCLASS: Mode = Mode(1 << 5);
    pub const V8: Mode = Mode(1 << 6);
    pub const MICRO: Mode = Mode(1 << 4);
    pub const MIPS3: Mode = Mode(1 << 5);
    pub const MIPS32R6: Mode = Mode(1 << 6);
    pub const MIPS2: Mode = Mode(1 << 7);
    pub const V9: Mode = Mode(1 << 4);
    pub const QPX: Mode = Mode(1 << 4);
    pub const BIG_ENDIAN: Mode = Mode(1 << 31);

    /// Returns the raw flag bits.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Returns true if every bit of `other` is set in `self`.
    pub fn contains(&self, other: Mode) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the x86 word size selected by this mode, if exactly one is set.
    pub fn x86_bits(&self) -> Option<u8> {
        let word = self.0 & (Self::MODE_16.0 | Self::MODE_32.0 | Self::MODE_64.0);
        match word {
            w if w == Self::MODE_16.0 => Some(16),
            w if w == Self::MODE_32.0 => Some(32),
            w if w == Self::MODE_64.0 => Some(64),
            _ => None,
        }
    }
}

impl BitOr for Mode {
    type Output = Mode;

    fn bitor(self, rhs: Mode) -> Mode {
        Mode(self.0 | rhs.0)
    }
}

impl BitOrAssign for Mode {
    fn bitor_assign(&mut self, rhs: Mode) {
        self.0 |= rhs.0;
    }
}
