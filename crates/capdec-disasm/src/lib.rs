//! # capdec-disasm
//!
//! Marshalling between the Capstone engine and the capdec instruction model.
//!
//! The engine writes fixed-layout records into a buffer it owns. This crate
//! copies them into owned [`capdec_core::Record`] values, validates every
//! count against its backing array, resolves tagged unions into sum types,
//! and frees the buffer exactly once:
//!
//! - [`Engine`]: the boundary trait, implemented by [`ReplayEngine`] and, with
//!   the `system-capstone` feature, by `NativeEngine`
//! - [`Handle`]: one open engine handle, closed exactly once
//! - [`decoder`], [`detail`], [`x86`]: the record, detail and x86 decoders
//! - [`Session`]: the public entry point

pub mod config;
pub mod decoder;
pub mod detail;
pub mod engine;
pub mod error;
pub mod handle;
pub mod raw;
pub mod replay;
pub mod session;
pub mod traits;

#[cfg(feature = "x86")]
pub mod x86;

#[cfg(feature = "system-capstone")]
pub mod native;

pub use config::SessionConfig;
pub use engine::{Engine, OptionKind, RawHandle, Syntax, Version};
pub use error::{DecodeError, Error, ErrorClass, ErrorCode};
pub use handle::Handle;
pub use replay::{ReplayEngine, ReplayInsn, ReplayStats};
pub use session::Session;
pub use traits::Disassembler;

#[cfg(feature = "system-capstone")]
pub use native::NativeEngine;
