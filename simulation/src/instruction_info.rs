//! Static instruction tables.
//!
//! Wire opcodes collapse into execution opcodes, and each execution opcode
//! carries the number of address operands, the gas schedule and the register
//! layout. Both tables are shared with the circuit and must not change without
//! a matching circuit change.

use crate::{
    opcodes::{ExecutionOpCode, WireOpCode},
    tagged_value::ValueTag,
};

/// Gas schedule of one execution opcode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasCost {
    pub base_l2: u32,
    pub base_da: u32,
    pub dyn_l2: u32,
    pub dyn_da: u32,
}

/// Register layout of one execution opcode.
///
/// The first `inputs.len()` resolved operands are read from memory as inputs.
/// A `Some(tag)` entry must carry exactly that tag; `None` accepts any tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterInfo {
    pub inputs: &'static [Option<ValueTag>],
    pub has_output: bool,
}

impl RegisterInfo {
    pub const fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn expected_tag(&self, index: usize) -> Option<ValueTag> {
        self.inputs.get(index).copied().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionSpec {
    pub num_addresses: usize,
    pub gas_cost: GasCost,
    pub register_info: RegisterInfo,
}

const fn gas(base_l2: u32, dyn_l2: u32) -> GasCost {
    GasCost {
        base_l2,
        base_da: 0,
        dyn_l2,
        dyn_da: 0,
    }
}

const fn spec(
    num_addresses: usize,
    gas_cost: GasCost,
    inputs: &'static [Option<ValueTag>],
    has_output: bool,
) -> InstructionSpec {
    InstructionSpec {
        num_addresses,
        gas_cost,
        register_info: RegisterInfo { inputs, has_output },
    }
}

const ANY: Option<ValueTag> = None;
const U1: Option<ValueTag> = Some(ValueTag::U1);
const U32: Option<ValueTag> = Some(ValueTag::U32);
const FF: Option<ValueTag> = Some(ValueTag::FF);

const fn execution_opcode_of(wire: WireOpCode) -> ExecutionOpCode {
    use ExecutionOpCode as E;
    use WireOpCode as W;

    match wire {
        W::Add8 | W::Add16 => E::Add,
        W::Sub8 | W::Sub16 => E::Sub,
        W::Mul8 | W::Mul16 => E::Mul,
        W::Div8 | W::Div16 => E::Div,
        W::FDiv8 | W::FDiv16 => E::FDiv,
        W::Eq8 | W::Eq16 => E::Eq,
        W::Lt8 | W::Lt16 => E::Lt,
        W::Lte8 | W::Lte16 => E::Lte,
        W::And8 | W::And16 => E::And,
        W::Or8 | W::Or16 => E::Or,
        W::Xor8 | W::Xor16 => E::Xor,
        W::Not8 | W::Not16 => E::Not,
        W::Shl8 | W::Shl16 => E::Shl,
        W::Shr8 | W::Shr16 => E::Shr,
        W::Cast8 | W::Cast16 => E::Cast,
        W::GetEnvVar16 => E::GetEnvVar,
        W::CalldataCopy => E::CalldataCopy,
        W::SuccessCopy => E::SuccessCopy,
        W::ReturndataSize => E::ReturndataSize,
        W::ReturndataCopy => E::ReturndataCopy,
        W::Jump32 => E::Jump,
        W::JumpI32 => E::JumpI,
        W::InternalCall => E::InternalCall,
        W::InternalReturn => E::InternalReturn,
        W::Set8 | W::Set16 | W::Set32 | W::Set64 | W::Set128 | W::SetFF => E::Set,
        W::Mov8 | W::Mov16 => E::Mov,
        W::Call => E::Call,
        W::StaticCall => E::StaticCall,
        W::Return => E::Return,
        W::Revert8 | W::Revert16 => E::Revert,
        W::DebugLog => E::DebugLog,
        W::Poseidon2Perm => E::Poseidon2Perm,
        W::Sha256Compression => E::Sha256Compression,
        W::KeccakF1600 => E::KeccakF1600,
    }
}

const fn instruction_spec_of(opcode: ExecutionOpCode) -> InstructionSpec {
    use ExecutionOpCode as E;

    match opcode {
        E::Add
        | E::Sub
        | E::Mul
        | E::Div
        | E::FDiv
        | E::Eq
        | E::Lt
        | E::Lte
        | E::And
        | E::Or
        | E::Xor
        | E::Shl
        | E::Shr => spec(3, gas(27, 0), &[ANY, ANY], true),
        E::Not | E::Cast => spec(2, gas(27, 0), &[ANY], true),
        E::GetEnvVar => spec(1, gas(9, 0), &[], true),
        E::CalldataCopy | E::ReturndataCopy => spec(3, gas(9, 3), &[U32, U32], false),
        E::SuccessCopy | E::ReturndataSize => spec(1, gas(9, 0), &[], true),
        E::Jump | E::InternalCall | E::InternalReturn => spec(0, gas(9, 0), &[], false),
        E::JumpI => spec(1, gas(9, 0), &[U1], false),
        E::Set => spec(1, gas(9, 0), &[], true),
        E::Mov => spec(2, gas(9, 0), &[ANY], true),
        E::Call | E::StaticCall => spec(5, gas(9, 0), &[U32, U32, FF, U32], false),
        E::Return | E::Revert => spec(2, gas(9, 3), &[U32], false),
        E::DebugLog => spec(4, gas(9, 0), &[], false),
        E::Poseidon2Perm => spec(2, gas(360, 0), &[], false),
        E::Sha256Compression => spec(3, gas(261, 0), &[], false),
        E::KeccakF1600 => spec(2, gas(2010, 0), &[], false),
    }
}

/// Read access to the instruction tables.
pub trait InstructionInfo {
    fn execution_opcode(&self, wire: WireOpCode) -> ExecutionOpCode;
    fn spec(&self, opcode: ExecutionOpCode) -> InstructionSpec;
}

/// The consensus instruction tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstructionInfoDb;

impl InstructionInfo for InstructionInfoDb {
    fn execution_opcode(&self, wire: WireOpCode) -> ExecutionOpCode {
        execution_opcode_of(wire)
    }

    fn spec(&self, opcode: ExecutionOpCode) -> InstructionSpec {
        instruction_spec_of(opcode)
    }
}
