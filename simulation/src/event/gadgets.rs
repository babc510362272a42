use crate::{
    gadgets::{
        alu::AluError, bitwise::BitwiseError, data_copy::DataCopyError,
        keccakf1600::KeccakF1600Error, poseidon2::Poseidon2Error,
        sha256::Sha256CompressionError,
    },
    memory::MemoryAddress,
    tagged_value::{MemoryValue, FF},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOperation {
    Add,
    Sub,
    Mul,
    Div,
    FDiv,
    Eq,
    Lt,
    Lte,
    Not,
    Shl,
    Shr,
    Truncate,
}

/// Event for one ALU operation.
///
/// Logic:
///   1. c = a `operation` b
///
/// Unary operations leave `b` at its default. A failed operation records the
/// error and leaves `c` at its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluEvent {
    pub operation: AluOperation,
    pub a: MemoryValue,
    pub b: MemoryValue,
    pub c: MemoryValue,
    pub error: Option<AluError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitwiseOperation {
    And,
    Or,
    Xor,
}

/// Event for one bitwise operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitwiseEvent {
    pub operation: BitwiseOperation,
    pub a: MemoryValue,
    pub b: MemoryValue,
    pub result: MemoryValue,
    pub error: Option<BitwiseError>,
}

/// Event asserting that `value < 2^num_bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeCheckEvent {
    pub value: u128,
    pub num_bits: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataCopyOperation {
    CalldataCopy,
    ReturndataCopy,
}

/// Event for CALLDATACOPY and RETURNDATACOPY.
///
/// Logic:
///   1. Read `copy_size` values from the source starting at `data_offset`,
///      padding with zeroes past `data_size`.
///   2. Write them to the destination memory starting at `dst_addr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataCopyEvent {
    pub execution_clk: u32,
    pub operation: DataCopyOperation,
    pub copying_data: Vec<MemoryValue>,
    pub read_context_id: u32,
    pub write_context_id: u32,
    pub data_copy_size: u32,
    pub data_offset: u32,
    /// Where the source data starts in the memory of the reading context.
    pub data_addr: MemoryAddress,
    /// Number of values available at the source.
    pub data_size: u32,
    /// Enqueued calls read calldata from outside memory.
    pub is_nested: bool,
    pub dst_addr: MemoryAddress,
    pub error: Option<DataCopyError>,
}

/// Event for one Keccak-f[1600] permutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeccakF1600Event {
    pub execution_clk: u32,
    pub space_id: u32,
    pub src_addr: MemoryAddress,
    pub dst_addr: MemoryAddress,
    pub src: Vec<MemoryValue>,
    pub dst: Option<[u64; 25]>,
    pub error: Option<KeccakF1600Error>,
}

/// Event for one SHA-256 compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sha256CompressionEvent {
    pub execution_clk: u32,
    pub space_id: u32,
    pub state_addr: MemoryAddress,
    pub input_addr: MemoryAddress,
    pub output_addr: MemoryAddress,
    pub state: Vec<MemoryValue>,
    pub input: Vec<MemoryValue>,
    pub output: Option<[u32; 8]>,
    pub error: Option<Sha256CompressionError>,
}

/// Event for one Poseidon2 permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poseidon2PermutationEvent {
    pub input: [FF; 4],
    pub output: [FF; 4],
}

/// Event for one sponge hash built on the Poseidon2 permutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poseidon2HashEvent {
    pub inputs: Vec<FF>,
    /// Sponge state after each absorbed block.
    pub intermediate_states: Vec<[FF; 4]>,
    pub output: FF,
}

/// Event for the POSEIDON2PERM opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poseidon2PermutationMemoryEvent {
    pub execution_clk: u32,
    pub space_id: u32,
    pub src_addr: MemoryAddress,
    pub dst_addr: MemoryAddress,
    pub input: Vec<MemoryValue>,
    pub output: Option<[FF; 4]>,
    pub error: Option<Poseidon2Error>,
}
