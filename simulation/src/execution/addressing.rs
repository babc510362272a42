//! Resolution of address operands.
//!
//! Only the first `num_addresses` operands of an instruction are addresses;
//! the others are immediates and pass through untouched. An address operand
//! flagged relative is first offset by the stack pointer, then, if flagged
//! indirect, replaced by the value it points to.

use thiserror::Error;

use crate::{
    constants::{MEMORY_ADDRESS_SPACE, STACK_POINTER_ADDRESS},
    event::{AddressingEvent, AddressingEventError, EventEmitter, MemoryEvent, OperandResolutionInfo},
    memory::Memory,
    serialization::{Instruction, Operand, Operands},
    tagged_value::TaggedValue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Addressing failed at operand {operand_idx}: {kind:?}")]
pub struct AddressingError {
    pub operand_idx: usize,
    pub kind: AddressingEventError,
}

fn fail(
    event: &mut AddressingEvent,
    operand_idx: usize,
    kind: AddressingEventError,
) -> Result<Operands, AddressingError> {
    let error = AddressingError { operand_idx, kind };
    if let Some(info) = event.resolution_info.get_mut(operand_idx) {
        info.error = Some(kind);
    }
    event.error = Some(error);
    Err(error)
}

/// Resolves the operands of `instruction` against `memory`.
///
/// `event` is filled as resolution progresses, so it describes the failing
/// operand when an error is returned.
pub fn resolve(
    instruction: &Instruction,
    num_addresses: usize,
    memory: &Memory,
    execution_clk: u32,
    memory_events: &mut impl EventEmitter<MemoryEvent>,
    event: &mut AddressingEvent,
) -> Result<Operands, AddressingError> {
    let num_addresses = num_addresses.min(instruction.operands.len());
    *event = AddressingEvent {
        instruction: Some(instruction.clone()),
        resolution_info: instruction
            .operands
            .iter()
            .map(|operand| OperandResolutionInfo {
                after_relative: *operand,
                resolved_operand: *operand,
                error: None,
            })
            .collect(),
        ..Default::default()
    };

    if (0..num_addresses).any(|i| instruction.is_relative(i)) {
        event.base_address = memory.get(STACK_POINTER_ADDRESS, execution_clk, memory_events);
    }

    for i in 0..num_addresses {
        if !instruction.is_relative(i) {
            continue;
        }
        let TaggedValue::U32(base) = event.base_address else {
            return fail(event, i, AddressingEventError::BaseAddressInvalid);
        };
        let offset = instruction.operands[i].as_address();
        match offset.map(|offset| base as u64 + offset as u64) {
            Some(address) if address < MEMORY_ADDRESS_SPACE => {
                let after_relative = Operand::U32(address as u32);
                event.resolution_info[i].after_relative = after_relative;
                event.resolution_info[i].resolved_operand = after_relative;
            }
            _ => return fail(event, i, AddressingEventError::RelativeComputationOutOfBounds),
        }
    }

    for i in 0..num_addresses {
        if !instruction.is_indirect(i) {
            continue;
        }
        let Some(pointer) = event.resolution_info[i].after_relative.as_address() else {
            return fail(event, i, AddressingEventError::IndirectTargetInvalid);
        };
        let value = memory.get(pointer, execution_clk, memory_events);
        match value {
            TaggedValue::U32(address) => {
                event.resolution_info[i].resolved_operand = Operand::U32(address);
            }
            _ => return fail(event, i, AddressingEventError::IndirectTargetInvalid),
        }
    }

    // Decoded bytecode only carries 8 and 16-bit address operands, which the
    // steps above keep within 32 bits. A hand-built instruction may put a wider
    // literal in a direct address slot.
    for i in 0..num_addresses {
        if event.resolution_info[i].resolved_operand.as_address().is_none() {
            return fail(event, i, AddressingEventError::FinalAddressInvalid);
        }
    }

    Ok(event
        .resolution_info
        .iter()
        .map(|info| info.resolved_operand)
        .collect())
}
