//! Opcode gadgets.
//!
//! Each gadget computes one family of operations, records its own event
//! stream and reports failures with its own error type. Gadgets record the
//! event of a failing operation before returning the error.

pub mod alu;
pub mod bitwise;
pub mod data_copy;
pub mod keccakf1600;
pub mod poseidon2;
mod poseidon2_params;
pub mod range_check;
pub mod sha256;

pub use self::{
    alu::{Alu, AluError, AluInterface},
    bitwise::{Bitwise, BitwiseError, BitwiseInterface},
    data_copy::{DataCopy, DataCopyError, DataCopyInterface},
    keccakf1600::{KeccakF1600, KeccakF1600Error},
    poseidon2::{Poseidon2, Poseidon2Error, Poseidon2Interface},
    range_check::RangeCheck,
    sha256::{Sha256, Sha256CompressionError},
};
