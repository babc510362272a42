use sha2::digest::generic_array::GenericArray;
use thiserror::Error;

use super::range_check::RangeCheck;
use crate::{
    constants::{SHA256_INPUT_SIZE, SHA256_STATE_SIZE},
    error::InternalError,
    event::{EventEmitter, MemoryEvent, Sha256CompressionEvent},
    memory::{Memory, MemoryAddress},
    tagged_value::{MemoryValue, TaggedValue, ValueTag},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Sha256CompressionError {
    #[error("SHA-256 state out of range")]
    StateOutOfRange,
    #[error("SHA-256 input out of range")]
    InputOutOfRange,
    #[error("SHA-256 output out of range")]
    OutputOutOfRange,
    /// A state or input word is not tagged `U32`.
    #[error("SHA-256 word at {addr} has tag {tag}")]
    InvalidWordTag { addr: MemoryAddress, tag: ValueTag },
}

/// The SHA-256 compression function over a `U32` state and input block.
#[derive(Debug, Default, Clone)]
pub struct Sha256 {
    pub(crate) events: Vec<Sha256CompressionEvent>,
}

fn words<const N: usize>(
    base: MemoryAddress,
    values: &[MemoryValue],
) -> Result<[u32; N], Sha256CompressionError> {
    let mut words = [0u32; N];
    for (i, value) in values.iter().enumerate() {
        match value {
            TaggedValue::U32(word) => words[i] = *word,
            other => {
                return Err(Sha256CompressionError::InvalidWordTag {
                    addr: base + i as u32,
                    tag: other.tag(),
                })
            }
        }
    }
    Ok(words)
}

impl Sha256 {
    pub fn events(&self) -> &[Sha256CompressionEvent] {
        &self.events
    }

    /// Compresses the 16-word block at `input_addr` into the 8-word state at
    /// `state_addr`, writing the new state at `output_addr`.
    #[allow(clippy::too_many_arguments)]
    pub fn compression(
        &mut self,
        memory: &mut Memory,
        output_addr: MemoryAddress,
        state_addr: MemoryAddress,
        input_addr: MemoryAddress,
        execution_clk: u32,
        memory_events: &mut impl EventEmitter<MemoryEvent>,
        range_check: &mut RangeCheck,
    ) -> Result<Result<(), Sha256CompressionError>, InternalError> {
        let mut event = Sha256CompressionEvent {
            execution_clk,
            space_id: memory.space_id(),
            state_addr,
            input_addr,
            output_addr,
            state: Vec::new(),
            input: Vec::new(),
            output: None,
            error: None,
        };

        let state_size = SHA256_STATE_SIZE as u64;
        let input_size = SHA256_INPUT_SIZE as u64;
        let error = if !range_check.check_region_end(state_addr as u64 + state_size)? {
            Some(Sha256CompressionError::StateOutOfRange)
        } else if !range_check.check_region_end(input_addr as u64 + input_size)? {
            Some(Sha256CompressionError::InputOutOfRange)
        } else if !range_check.check_region_end(output_addr as u64 + state_size)? {
            Some(Sha256CompressionError::OutputOutOfRange)
        } else {
            None
        };
        if let Some(error) = error {
            event.error = Some(error);
            self.events.push(event);
            return Ok(Err(error));
        }

        for i in 0..SHA256_STATE_SIZE {
            event
                .state
                .push(memory.get(state_addr + i, execution_clk, memory_events));
        }
        for i in 0..SHA256_INPUT_SIZE {
            event
                .input
                .push(memory.get(input_addr + i, execution_clk, memory_events));
        }

        let words = words::<8>(state_addr, &event.state)
            .and_then(|state| Ok((state, words::<16>(input_addr, &event.input)?)));
        let (mut state, input) = match words {
            Ok(words) => words,
            Err(error) => {
                event.error = Some(error);
                self.events.push(event);
                return Ok(Err(error));
            }
        };

        let block: Vec<u8> = input.iter().flat_map(|word| word.to_be_bytes()).collect();
        sha2::compress256(&mut state, &[GenericArray::clone_from_slice(&block)]);

        for (i, word) in state.iter().enumerate() {
            memory.set(
                output_addr + i as u32,
                TaggedValue::U32(*word),
                execution_clk,
                memory_events,
            );
        }
        event.output = Some(state);
        self.events.push(event);
        Ok(Ok(()))
    }
}
