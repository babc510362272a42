use smallvec::SmallVec;

use crate::{
    constants::MAX_OPERANDS,
    db::AztecAddress,
    execution::{
        addressing::AddressingError,
        bytecode::BytecodeId,
        gas::{Gas, GasPhase},
    },
    memory::MemoryAddress,
    serialization::{Instruction, Operand},
    tagged_value::{MemoryValue, FF},
};

/// Snapshot of a context, taken before and after every step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextEvent {
    pub id: u32,
    pub parent_id: u32,
    pub pc: u32,
    pub next_pc: u32,
    pub msg_sender: AztecAddress,
    pub contract_address: AztecAddress,
    pub is_static: bool,
    pub parent_cd_addr: MemoryAddress,
    pub parent_cd_size: u32,
    pub last_child_rd_addr: MemoryAddress,
    pub last_child_rd_size: u32,
    pub last_child_success: bool,
    pub gas_used: Gas,
    pub gas_limit: Gas,
    pub parent_gas_used: Gas,
    pub parent_gas_limit: Gas,
    pub internal_call_id: u32,
    pub internal_call_return_id: u32,
    pub next_internal_call_id: u32,
}

/// Event recording the state of a context at the moment it enters a nested
/// call. Restored when the child context exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextStackEvent {
    pub entered_context_id: u32,
    pub parent: ContextEvent,
}

/// Which stage of a step failed, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExecutionErrorKind {
    #[default]
    None,
    BytecodeNotFound,
    InstructionFetching,
    Addressing,
    RegisterRead,
    Gas,
    OpcodeExecution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingEventError {
    BaseAddressInvalid,
    RelativeComputationOutOfBounds,
    IndirectTargetInvalid,
    FinalAddressInvalid,
}

/// Resolution trace of one operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandResolutionInfo {
    pub after_relative: Operand,
    pub resolved_operand: Operand,
    pub error: Option<AddressingEventError>,
}

/// Event for resolving the operands of one instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressingEvent {
    pub instruction: Option<Instruction>,
    /// Value of the stack pointer, read only if some operand is relative.
    pub base_address: MemoryValue,
    pub resolution_info: SmallVec<[OperandResolutionInfo; MAX_OPERANDS]>,
    pub error: Option<AddressingError>,
}

/// Outcome of one gas limit comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasCheck {
    pub out_of_gas_l2: bool,
    pub out_of_gas_da: bool,
    /// `limit - used` when within the limit, `used - limit - 1` otherwise.
    pub limit_used_l2_comparison_witness: u64,
    pub limit_used_da_comparison_witness: u64,
}

impl GasCheck {
    pub const fn out_of_gas(&self) -> bool {
        self.out_of_gas_l2 || self.out_of_gas_da
    }
}

/// Event for the gas charged by one instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasEvent {
    pub prev_gas_used: Gas,
    pub opcode_gas: u32,
    pub addressing_gas: u32,
    pub base_gas: Gas,
    pub base_check: GasCheck,
    pub dynamic_gas_factor: Gas,
    pub dynamic_gas: Gas,
    pub dynamic_check: GasCheck,
    /// Phase that ran out of gas, if any.
    pub out_of_gas_phase: Option<GasPhase>,
}

/// Event for one executed step.
///
/// This is the unit consumed by the execution trace: the instruction, its
/// resolution, inputs and output, the gas charged and the state of the
/// context before and after the step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionEvent {
    pub execution_clk: u32,
    pub error: ExecutionErrorKind,
    pub bytecode_id: BytecodeId,
    pub wire_instruction: Option<Instruction>,
    pub addressing_event: AddressingEvent,
    pub resolved_operands: SmallVec<[Operand; MAX_OPERANDS]>,
    pub inputs: Vec<MemoryValue>,
    pub output: MemoryValue,
    pub gas_event: GasEvent,
    /// Id the next nested context would take.
    pub next_context_id: u32,
    pub before_context_event: ContextEvent,
    pub after_context_event: ContextEvent,
}

impl ExecutionEvent {
    pub fn success(&self) -> bool {
        self.error == ExecutionErrorKind::None
    }
}

/// A message emitted by the DEBUGLOG opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugLog {
    pub contract_address: AztecAddress,
    pub level: FF,
    pub message: String,
    pub fields: Vec<FF>,
}
