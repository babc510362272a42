//! Consensus constants shared by the simulator and the circuit.

use crate::memory::MemoryAddress;

/// Memory slot holding the stack pointer used by relative addressing.
pub const STACK_POINTER_ADDRESS: MemoryAddress = 0;

/// Number of bits of a memory address.
pub const MEMORY_ADDRESS_BITS: u32 = 32;

/// Exclusive upper bound of the memory address space.
pub const MEMORY_ADDRESS_SPACE: u64 = 1 << MEMORY_ADDRESS_BITS;

/// Maximum number of bytes the instruction decoder looks ahead.
///
/// This matches the size of the largest instruction (`SET_FF`). The check is
/// done against `min(DECODE_WINDOW_SIZE, remaining)` and must stay that way.
pub const DECODE_WINDOW_SIZE: usize = 37;

/// Maximum number of operands of any instruction.
pub const MAX_OPERANDS: usize = 7;

/// L2 gas surcharged for every indirect address operand.
pub const ADDRESSING_INDIRECT_L2_GAS: u32 = 3;
/// L2 gas surcharged for every relative address operand.
pub const ADDRESSING_RELATIVE_L2_GAS: u32 = 3;

/// Bit width of the range checks backing gas comparisons.
pub const GAS_COMPARISON_BITS: u8 = 64;

/// Bit width of the range checks backing nested-call gas clamping.
pub const GAS_CLAMP_COMPARISON_BITS: u8 = 32;

/// Bit width of the range checks backing data-copy bound checks.
pub const DATA_COPY_COMPARISON_BITS: u8 = 64;

/// Number of bytes packed into one field element of the bytecode commitment.
pub const BYTES_PER_BYTECODE_FIELD: usize = 31;

/// Number of lanes of the Keccak-f[1600] state.
pub const KECCAKF1600_STATE_SIZE: u32 = 25;
/// Number of 32-bit words of the SHA-256 state.
pub const SHA256_STATE_SIZE: u32 = 8;
/// Number of 32-bit words of one SHA-256 message block.
pub const SHA256_INPUT_SIZE: u32 = 16;
/// Width of the Poseidon2 permutation.
pub const POSEIDON2_STATE_SIZE: u32 = 4;

/// Default maximum length of a debug log message.
pub const DEBUG_LOG_MESSAGE_MAX_LEN: usize = 100;
/// Default maximum number of fields of a debug log.
pub const DEBUG_LOG_MAX_FIELDS: u32 = 1024;
