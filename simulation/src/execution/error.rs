use thiserror::Error;

use super::{
    addressing::AddressingError, bytecode::BytecodeRetrievalError,
    context::InternalCallStackError, gas::OutOfGasError,
};
use crate::{
    error::InternalError,
    event::ExecutionErrorKind,
    gadgets::{
        AluError, BitwiseError, DataCopyError, KeccakF1600Error, Poseidon2Error,
        Sha256CompressionError,
    },
    serialization::InstrDeserializationError,
    tagged_value::{TaggedValueError, ValueTag},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Register {index} has tag {found}, expected {expected}")]
pub struct RegisterValidationError {
    pub index: usize,
    pub expected: ValueTag,
    pub found: ValueTag,
}

/// Failures of the effect of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OpcodeExecutionError {
    #[error(transparent)]
    Alu(#[from] AluError),
    #[error(transparent)]
    Bitwise(#[from] BitwiseError),
    #[error(transparent)]
    DataCopy(#[from] DataCopyError),
    #[error(transparent)]
    KeccakF1600(#[from] KeccakF1600Error),
    #[error(transparent)]
    Sha256Compression(#[from] Sha256CompressionError),
    #[error(transparent)]
    Poseidon2(#[from] Poseidon2Error),
    #[error(transparent)]
    InternalCallStack(#[from] InternalCallStackError),
    #[error("Invalid environment variable {0}")]
    InvalidEnvironmentVariable(u8),
    /// The returned region leaves the address space.
    #[error("Returndata out of range")]
    ReturndataOutOfRange,
}

/// Everything that can interrupt a step.
///
/// All variants but `Internal` are recoverable: the dispatch loop reverts the
/// current context and carries on. `Internal` aborts the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("Bytecode not found: {0}")]
    BytecodeNotFound(#[from] BytecodeRetrievalError),
    #[error("Instruction fetching failed: {0}")]
    InstructionFetching(#[from] InstrDeserializationError),
    #[error(transparent)]
    Addressing(#[from] AddressingError),
    #[error(transparent)]
    RegisterValidation(#[from] RegisterValidationError),
    #[error(transparent)]
    OutOfGas(#[from] OutOfGasError),
    #[error("Opcode execution failed: {0}")]
    OpcodeExecution(#[from] OpcodeExecutionError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl ExecutionError {
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, ExecutionError::Internal(_))
    }

    pub const fn kind(&self) -> ExecutionErrorKind {
        match self {
            ExecutionError::BytecodeNotFound(_) => ExecutionErrorKind::BytecodeNotFound,
            ExecutionError::InstructionFetching(_) => ExecutionErrorKind::InstructionFetching,
            ExecutionError::Addressing(_) => ExecutionErrorKind::Addressing,
            ExecutionError::RegisterValidation(_) => ExecutionErrorKind::RegisterRead,
            ExecutionError::OutOfGas(_) => ExecutionErrorKind::Gas,
            ExecutionError::OpcodeExecution(_) | ExecutionError::Internal(_) => {
                ExecutionErrorKind::OpcodeExecution
            }
        }
    }
}

impl From<TaggedValueError> for ExecutionError {
    fn from(error: TaggedValueError) -> Self {
        ExecutionError::Internal(InternalError::TaggedValue(error))
    }
}

macro_rules! impl_from_opcode_error {
    ($($error:ty),* $(,)?) => {
        $(
            impl From<$error> for ExecutionError {
                fn from(error: $error) -> Self {
                    ExecutionError::OpcodeExecution(error.into())
                }
            }
        )*
    };
}

impl_from_opcode_error!(
    AluError,
    BitwiseError,
    DataCopyError,
    KeccakF1600Error,
    Sha256CompressionError,
    Poseidon2Error,
    InternalCallStackError,
);

/// Errors surfacing from a simulation. Only simulator defects end up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("Internal simulator error: {0}")]
    Internal(#[from] InternalError),
}
