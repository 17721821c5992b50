//! Disassembler traits.

use capdec_core::{Architecture, Instruction};

use crate::Error;

/// Anything that turns machine code into instructions.
pub trait Disassembler {
    /// Decode instructions starting at the given address.
    ///
    /// # Arguments
    /// * `bytes` - The raw bytes to decode
    /// * `address` - The virtual address of the first byte
    /// * `max_count` - Upper bound on the number of instructions, 0 for no bound
    ///
    /// # Returns
    /// The decoded instructions in address order. Decoding stops at the first
    /// byte sequence that is not a valid instruction; that is not an error.
    fn decode(&self, bytes: &[u8], address: u64, max_count: usize) -> Result<Vec<Instruction>, Error>;

    /// Returns the target architecture.
    fn architecture(&self) -> Architecture;

    /// Returns the maximum instruction size for this architecture.
    fn max_instruction_size(&self) -> usize {
        self.architecture().max_instruction_size()
    }

    /// Decode as many instructions as the bytes hold.
    fn decode_all(&self, bytes: &[u8], address: u64) -> Result<Vec<Instruction>, Error> {
        self.decode(bytes, address, 0)
    }

    /// Decode the first instruction, if the bytes start with one.
    fn decode_one(&self, bytes: &[u8], address: u64) -> Result<Option<Instruction>, Error> {
        Ok(self.decode(bytes, address, 1)?.into_iter().next())
    }
}
