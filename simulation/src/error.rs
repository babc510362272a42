use thiserror::Error;

use crate::{
    opcodes::{ExecutionOpCode, WireOpCode},
    serialization::Operand,
    tagged_value::{TaggedValueError, FF},
};

/// Errors that reveal a defect of the simulator itself.
///
/// These are never caught by the dispatch loop: they abort the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    /// An operand was read with a narrower type than its encoding.
    #[error("Operand {operand:?} cannot be narrowed to {target}")]
    OperandNarrowing {
        operand: Operand,
        target: &'static str,
    },
    #[error("Operand {0} is not a valid tag")]
    InvalidTagOperand(u8),
    /// An instruction has fewer operands than its wire format.
    #[error("Missing operand while serializing {0}")]
    MissingOperand(WireOpCode),
    /// The indirection mask does not fit in the format of the opcode.
    #[error("Indirect mask does not fit the format of {0}")]
    IndirectOverflow(WireOpCode),
    /// A range check was requested on a value that does not fit.
    #[error("Range check failed: {value} does not fit in {num_bits} bits")]
    RangeCheckFailed { value: u128, num_bits: u8 },
    #[error("Unknown bytecode id {0}")]
    UnknownBytecodeId(FF),
    #[error("The call stack is empty")]
    EmptyCallStack,
    /// A handler asked for an operand the instruction does not have.
    #[error("Missing resolved operand {0}")]
    MissingResolvedOperand(usize),
    /// A handler asked for an input that was not read from memory.
    #[error("Missing input register {0}")]
    MissingInput(usize),
    /// An opcode with an output register produced no value.
    #[error("{0} produced no output")]
    MissingOutput(ExecutionOpCode),
    /// A context was popped without an execution result.
    #[error("Context {0} halted without a result")]
    MissingExecutionResult(u32),
    /// A tagged operation failed after its operands were validated.
    #[error(transparent)]
    TaggedValue(#[from] TaggedValueError),
}
