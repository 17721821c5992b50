//! Session configuration.

use capdec_core::{Architecture, Mode};

use crate::engine::Syntax;

/// Everything a session needs at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub arch: Architecture,
    pub mode: Mode,
    /// Request detail blocks on every record.
    pub detail: bool,
    /// Output syntax; `None` keeps the engine default.
    pub syntax: Option<Syntax>,
    /// Print immediates as unsigned.
    pub unsigned: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::x86_64()
    }
}

impl SessionConfig {
    /// Creates a configuration for `arch`/`mode` with every option off.
    pub fn new(arch: Architecture, mode: Mode) -> Self {
        Self {
            arch,
            mode,
            detail: false,
            syntax: None,
            unsigned: false,
        }
    }

    /// 64-bit x86 with detail on.
    pub fn x86_64() -> Self {
        Self::new(Architecture::X86, Mode::MODE_64).with_detail(true)
    }

    /// 32-bit x86 with detail on.
    pub fn x86_32() -> Self {
        Self::new(Architecture::X86, Mode::MODE_32).with_detail(true)
    }

    pub fn with_detail(mut self, detail: bool) -> Self {
        self.detail = detail;
        self
    }

    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = Some(syntax);
        self
    }

    /// Sets the syntax by name (`intel`, `att`, `masm`, ...); unknown names are ignored.
    pub fn with_syntax_name(self, name: &str) -> Self {
        match Syntax::parse(name) {
            Some(syntax) => self.with_syntax(syntax),
            None => self,
        }
    }

    pub fn with_unsigned(mut self, unsigned: bool) -> Self {
        self.unsigned = unsigned;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
}
