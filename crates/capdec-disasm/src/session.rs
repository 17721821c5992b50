//! The public disassembly session.

use std::cell::Cell;
use std::marker::PhantomData;

use log::{debug, warn};

use capdec_core::{Architecture, GroupId, InsnId, Instruction, Mode, RegId};

use crate::config::SessionConfig;
use crate::decoder::disassemble;
use crate::engine::{Engine, OptionKind, Syntax, Version, OPT_OFF, OPT_ON};
use crate::error::{Error, ErrorCode};
use crate::handle::Handle;
use crate::traits::Disassembler;

/// One open engine session.
///
/// A session may move between threads but not be shared by them; open one
/// per worker. Call [`Session::release`] when done; dropping an open session
/// also closes it but logs a warning.
pub struct Session<E: Engine> {
    handle: Handle<E>,
    detail: bool,
    _not_sync: PhantomData<Cell<()>>,
}

impl<E: Engine> Session<E> {
    /// Opens a session with every option at its engine default.
    pub fn open(engine: E, arch: Architecture, mode: Mode) -> Result<Self, Error> {
        Ok(Self {
            handle: Handle::open(engine, arch, mode)?,
            detail: false,
            _not_sync: PhantomData,
        })
    }

    /// Opens a session and applies `config`.
    ///
    /// If an option is rejected, the handle is released before returning.
    pub fn with_config(engine: E, config: SessionConfig) -> Result<Self, Error> {
        let mut session = Self::open(engine, config.arch, config.mode)?;
        if let Err(err) = session.apply(&config) {
            if let Err(close) = session.release() {
                warn!("releasing rejected session failed: {}", close);
            }
            return Err(err);
        }
        Ok(session)
    }

    /// Opens a 64-bit x86 session with detail on.
    pub fn x86_64(engine: E) -> Result<Self, Error> {
        Self::with_config(engine, SessionConfig::x86_64())
    }

    fn apply(&mut self, config: &SessionConfig) -> Result<(), Error> {
        if config.detail {
            self.set_detail(true)?;
        }
        if let Some(syntax) = config.syntax {
            self.set_syntax(syntax)?;
        }
        if config.unsigned {
            self.set_unsigned(true)?;
        }
        Ok(())
    }

    pub fn engine(&self) -> &E {
        self.handle.engine()
    }

    pub fn arch(&self) -> Architecture {
        self.handle.arch()
    }

    pub fn mode(&self) -> Mode {
        self.handle.mode()
    }

    pub fn detail_enabled(&self) -> bool {
        self.detail
    }

    pub fn is_released(&self) -> bool {
        self.handle.is_released()
    }

    /// Turns detail blocks on or off for later decodes.
    pub fn set_detail(&mut self, on: bool) -> Result<(), Error> {
        self.handle
            .configure(OptionKind::Detail, if on { OPT_ON } else { OPT_OFF })?;
        self.detail = on;
        Ok(())
    }

    pub fn set_syntax(&mut self, syntax: Syntax) -> Result<(), Error> {
        self.handle.configure(OptionKind::Syntax, syntax.raw())
    }

    /// Switches the mode of an open session.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error> {
        self.handle.configure(OptionKind::Mode, mode.bits() as usize)
    }

    /// Prints immediates as unsigned.
    pub fn set_unsigned(&mut self, on: bool) -> Result<(), Error> {
        self.handle
            .configure(OptionKind::Unsigned, if on { OPT_ON } else { OPT_OFF })
    }

    /// Decodes up to `max_count` instructions (0 for no bound) from `code`.
    ///
    /// Every returned instruction is owned; the engine's buffer is freed
    /// before this returns.
    pub fn decode(&self, code: &[u8], address: u64, max_count: usize) -> Result<Vec<Instruction>, Error> {
        let raw = self.handle.get()?;
        let arch = self.arch();
        let records = disassemble(self.engine(), raw, arch, code, address, max_count)?;
        Ok(records
            .into_iter()
            .map(|record| Instruction::new(arch, record))
            .collect())
    }

    pub fn decode_all(&self, code: &[u8], address: u64) -> Result<Vec<Instruction>, Error> {
        self.decode(code, address, 0)
    }

    pub fn reg_name(&self, reg: RegId) -> Result<Option<String>, Error> {
        let raw = self.handle.get()?;
        Ok(self.engine().reg_name(raw, reg.0))
    }

    pub fn insn_name(&self, insn: InsnId) -> Result<Option<String>, Error> {
        let raw = self.handle.get()?;
        Ok(self.engine().insn_name(raw, insn.0))
    }

    pub fn group_name(&self, group: GroupId) -> Result<Option<String>, Error> {
        let raw = self.handle.get()?;
        Ok(self.engine().group_name(raw, u32::from(group.0)))
    }

    /// Names of the registers an instruction reads implicitly.
    pub fn regs_read_names(&self, insn: &Instruction) -> Result<Vec<String>, Error> {
        insn.regs_read()
            .iter()
            .map(|&reg| Ok(self.reg_name(reg)?.unwrap_or_else(|| reg.to_string())))
            .collect()
    }

    /// Last status the engine recorded for this session.
    pub fn errno(&self) -> Result<ErrorCode, Error> {
        let raw = self.handle.get()?;
        Ok(self.engine().errno(raw))
    }

    pub fn strerror(&self, code: ErrorCode) -> String {
        self.engine().strerror(code)
    }

    pub fn version(&self) -> Version {
        self.engine().version()
    }

    /// Closes the session. Later calls on it fail with [`Error::UseAfterRelease`].
    pub fn release(&mut self) -> Result<(), Error> {
        self.handle.release()?;
        debug!("session for {} released", self.arch());
        Ok(())
    }
}

impl<E: Engine> Disassembler for Session<E> {
    fn decode(&self, bytes: &[u8], address: u64, max_count: usize) -> Result<Vec<Instruction>, Error> {
        Session::decode(self, bytes, address, max_count)
    }

    fn architecture(&self) -> Architecture {
        self.arch()
    }
}

impl<E: Engine> std::fmt::Debug for Session<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("handle", &self.handle)
            .field("detail", &self.detail)
            .finish()
    }
}
