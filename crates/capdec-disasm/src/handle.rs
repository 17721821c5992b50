//! Ownership of one engine session handle.

use log::{debug, warn};

use capdec_core::{Architecture, Mode};

use crate::engine::{Engine, OptionKind, RawHandle, ABI_MAJOR};
use crate::error::{Error, ErrorCode};

/// Owns an open engine handle and closes it exactly once.
///
/// [`Handle::release`] closes deterministically. `Drop` closes a handle that
/// is still open, so a handle is never leaked on an early return; a handle
/// already released is left alone.
pub struct Handle<E: Engine> {
    engine: E,
    raw: Option<RawHandle>,
    arch: Architecture,
    mode: Mode,
}

impl<E: Engine> Handle<E> {
    /// Opens a handle for `arch`/`mode`.
    ///
    /// Fails with [`Error::Configuration`] when the engine's record layout
    /// does not match [`crate::raw`] or when it rejects the architecture or mode.
    pub fn open(engine: E, arch: Architecture, mode: Mode) -> Result<Self, Error> {
        let version = engine.version();
        if version.major != ABI_MAJOR {
            return Err(Error::Configuration {
                code: ErrorCode::Version,
                message: format!(
                    "engine {}.{} does not use the {}.x record layout",
                    version.major, version.minor, ABI_MAJOR
                ),
            });
        }

        let raw = engine
            .open(arch, mode)
            .map_err(|code| Error::from_engine(code, engine.strerror(code)))?;
        debug!("opened {} handle {:#x} (mode {:#x})", arch, raw.0, mode.bits());

        Ok(Self {
            engine,
            raw: Some(raw),
            arch,
            mode,
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn arch(&self) -> Architecture {
        self.arch
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_released(&self) -> bool {
        self.raw.is_none()
    }

    /// Returns the live handle, or [`Error::UseAfterRelease`].
    pub fn get(&self) -> Result<RawHandle, Error> {
        self.raw.ok_or(Error::UseAfterRelease)
    }

    /// Sets an engine option on this handle.
    pub fn configure(&mut self, kind: OptionKind, value: usize) -> Result<(), Error> {
        let raw = self.get()?;
        self.engine
            .option(raw, kind, value)
            .map_err(|code| Error::from_engine(code, self.engine.strerror(code)))?;
        debug!("handle {:#x}: option {:?} = {}", raw.0, kind, value);
        if kind == OptionKind::Mode {
            self.mode = Mode(value as u32);
        }
        Ok(())
    }

    /// Closes the handle. A second call fails with [`Error::UseAfterRelease`].
    pub fn release(&mut self) -> Result<(), Error> {
        let raw = self.raw.take().ok_or(Error::UseAfterRelease)?;
        debug!("releasing handle {:#x}", raw.0);
        match self.engine.close(raw) {
            ErrorCode::Ok => Ok(()),
            code => Err(Error::from_engine(code, self.engine.strerror(code))),
        }
    }
}

impl<E: Engine> Drop for Handle<E> {
    fn drop(&mut self) {
        if let Some(raw) = self.raw.take() {
            warn!(
                "handle {:#x} was not released explicitly; closing on drop",
                raw.0
            );
            let code = self.engine.close(raw);
            if !code.is_ok() {
                warn!("closing handle {:#x} on drop failed: {}", raw.0, code.description());
            }
        }
    }
}

impl<E: Engine> std::fmt::Debug for Handle<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("raw", &self.raw)
            .field("arch", &self.arch)
            .field("mode", &self.mode)
            .finish()
    }
}
