//! # capdec-core
//!
//! Safe value types for instructions decoded by the Capstone engine:
//! architecture and mode tags, engine ids, owned records, detail blocks with
//! the x86 operand model, and the [`Instruction`] classification API.
//!
//! Nothing in this crate refers to engine memory; every value is owned.

pub mod arch;
pub mod detail;
pub mod instruction;
pub mod mnemonic;
pub mod operand;
pub mod record;
pub mod register;

pub use arch::{Architecture, Mode};
pub use detail::{ArchDetail, Detail, FlagsWord, X86Detail, X86Encoding};
pub use instruction::{Category, Instruction};
pub use mnemonic::MnemonicTable;
pub use operand::{AvxBroadcast, MemoryOperand, OperandType, OperandValue, X86Operand};
pub use record::Record;
pub use register::{Access, GroupId, InsnId, RegId};
