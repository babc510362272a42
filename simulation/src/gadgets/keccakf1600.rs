use thiserror::Error;

use super::range_check::RangeCheck;
use crate::{
    constants::KECCAKF1600_STATE_SIZE,
    error::InternalError,
    event::{EventEmitter, KeccakF1600Event, MemoryEvent},
    memory::{Memory, MemoryAddress},
    tagged_value::{TaggedValue, ValueTag},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KeccakF1600Error {
    #[error("Keccak-f[1600] source out of range")]
    SrcOutOfRange,
    #[error("Keccak-f[1600] destination out of range")]
    DstOutOfRange,
    /// A state lane is not tagged `U64`.
    #[error("Keccak-f[1600] lane {index} has tag {tag}")]
    InvalidLaneTag { index: usize, tag: ValueTag },
}

/// The Keccak-f[1600] permutation over 25 `U64` lanes in memory.
#[derive(Debug, Default, Clone)]
pub struct KeccakF1600 {
    pub(crate) events: Vec<KeccakF1600Event>,
}

impl KeccakF1600 {
    pub fn events(&self) -> &[KeccakF1600Event] {
        &self.events
    }

    /// Reads the state at `src_addr`, permutes it and writes the result at
    /// `dst_addr`.
    pub fn permutation(
        &mut self,
        memory: &mut Memory,
        dst_addr: MemoryAddress,
        src_addr: MemoryAddress,
        execution_clk: u32,
        memory_events: &mut impl EventEmitter<MemoryEvent>,
        range_check: &mut RangeCheck,
    ) -> Result<Result<(), KeccakF1600Error>, InternalError> {
        let mut event = KeccakF1600Event {
            execution_clk,
            space_id: memory.space_id(),
            src_addr,
            dst_addr,
            src: Vec::new(),
            dst: None,
            error: None,
        };

        let size = KECCAKF1600_STATE_SIZE as u64;
        let error = if !range_check.check_region_end(src_addr as u64 + size)? {
            Some(KeccakF1600Error::SrcOutOfRange)
        } else if !range_check.check_region_end(dst_addr as u64 + size)? {
            Some(KeccakF1600Error::DstOutOfRange)
        } else {
            None
        };

        let mut state = [0u64; 25];
        if error.is_none() {
            for i in 0..KECCAKF1600_STATE_SIZE {
                event
                    .src
                    .push(memory.get(src_addr + i, execution_clk, memory_events));
            }
        }
        let error = error.or_else(|| {
            event.src.iter().enumerate().find_map(|(index, value)| match value {
                TaggedValue::U64(lane) => {
                    state[index] = *lane;
                    None
                }
                other => Some(KeccakF1600Error::InvalidLaneTag {
                    index,
                    tag: other.tag(),
                }),
            })
        });

        if let Some(error) = error {
            event.error = Some(error);
            self.events.push(event);
            return Ok(Err(error));
        }

        tiny_keccak::keccakf(&mut state);

        for (i, lane) in state.iter().enumerate() {
            memory.set(
                dst_addr + i as u32,
                TaggedValue::U64(*lane),
                execution_clk,
                memory_events,
            );
        }
        event.dst = Some(state);
        self.events.push(event);
        Ok(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MemoryMode;

    #[test]
    fn test_permutation_of_zero_state() {
        let mut keccak = KeccakF1600::default();
        let mut range_check = RangeCheck::default();
        let mut memory = Memory::new(1);
        let mut memory_events: Vec<MemoryEvent> = Vec::new();
        for i in 0..25 {
            memory.set(i, TaggedValue::U64(0), 0, &mut memory_events);
        }
        memory_events.clear();

        keccak
            .permutation(&mut memory, 100, 0, 1, &mut memory_events, &mut range_check)
            .unwrap()
            .unwrap();

        let mut expected = [0u64; 25];
        tiny_keccak::keccakf(&mut expected);
        // First lane of Keccak-f[1600] applied to the zero state.
        assert_eq!(expected[0], 0xF1258F7940E1DDE7);
        assert_eq!(keccak.events()[0].dst, Some(expected));

        let writes: Vec<_> = memory_events
            .iter()
            .filter(|event| event.mode == MemoryMode::Write)
            .collect();
        assert_eq!(writes.len(), 25);
        assert_eq!(writes[0].addr, 100);
        assert_eq!(writes[0].value, TaggedValue::U64(expected[0]));
    }

    #[test]
    fn test_invalid_lane_tag() {
        let mut keccak = KeccakF1600::default();
        let mut range_check = RangeCheck::default();
        let mut memory = Memory::new(1);
        let mut memory_events: Vec<MemoryEvent> = Vec::new();
        for i in 0..25 {
            memory.set(i, TaggedValue::U64(0), 0, &mut memory_events);
        }
        memory.set(3, TaggedValue::U32(0), 0, &mut memory_events);

        let result = keccak
            .permutation(&mut memory, 100, 0, 1, &mut memory_events, &mut range_check)
            .unwrap();
        assert_eq!(
            result,
            Err(KeccakF1600Error::InvalidLaneTag {
                index: 3,
                tag: ValueTag::U32
            })
        );
        assert!(keccak.events()[0].dst.is_none());
    }

    #[test]
    fn test_out_of_range() {
        let mut keccak = KeccakF1600::default();
        let mut range_check = RangeCheck::default();
        let mut memory = Memory::new(1);
        let mut memory_events: Vec<MemoryEvent> = Vec::new();

        let result = keccak
            .permutation(
                &mut memory,
                0,
                u32::MAX - 10,
                1,
                &mut memory_events,
                &mut range_check,
            )
            .unwrap();
        assert_eq!(result, Err(KeccakF1600Error::SrcOutOfRange));
        assert!(memory_events.is_empty());
    }
}
