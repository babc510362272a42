use std::sync::Arc;

use crate::{
    db::{AztecAddress, ContractClassId, TreeRoots},
    execution::bytecode::{BytecodeId, BytecodeRetrievalError},
    serialization::{InstrDeserializationError, Instruction},
    tagged_value::FF,
};

/// Event for resolving a contract address to its bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytecodeRetrievalEvent {
    pub bytecode_id: BytecodeId,
    pub address: AztecAddress,
    pub current_class_id: ContractClassId,
    pub tree_roots: TreeRoots,
    pub error: Option<BytecodeRetrievalError>,
}

/// Event for committing to a bytecode. Emitted once per distinct bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytecodeHashingEvent {
    pub bytecode_id: BytecodeId,
    pub bytecode_length: u32,
    /// The bytecode packed into 31-byte field elements.
    pub bytecode_fields: Vec<FF>,
}

/// Event exposing the raw bytes of a bytecode. Emitted once per distinct
/// bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytecodeDecompositionEvent {
    pub bytecode_id: BytecodeId,
    pub bytecode: Arc<Vec<u8>>,
}

/// Event for decoding the instruction at `pc`. Emitted once per `(bytecode_id,
/// pc)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionFetchingEvent {
    pub bytecode_id: BytecodeId,
    pub pc: u32,
    pub instruction: Option<Instruction>,
    pub bytecode: Arc<Vec<u8>>,
    pub error: Option<InstrDeserializationError>,
}
