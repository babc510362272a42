//! Per-context tagged memory.

use ahash::AHashMap;

use crate::{
    event::{EventEmitter, MemoryEvent, MemoryMode},
    tagged_value::{MemoryValue, ValueTag},
};

pub type MemoryAddress = u32;

/// The memory of one context.
///
/// Every access is recorded. Unset cells read as field element zero. Address
/// bounds are checked by callers: the address type already covers the whole
/// address space.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    /// Identifier of the owning context.
    space_id: u32,
    values: AHashMap<MemoryAddress, MemoryValue>,
}

impl Memory {
    pub fn new(space_id: u32) -> Self {
        Self {
            space_id,
            values: AHashMap::new(),
        }
    }

    pub const fn space_id(&self) -> u32 {
        self.space_id
    }

    /// A value is usable as an address iff it is tagged `U32`.
    pub fn is_valid_address(value: &MemoryValue) -> bool {
        value.tag() == ValueTag::U32
    }

    pub fn get(
        &self,
        addr: MemoryAddress,
        execution_clk: u32,
        events: &mut impl EventEmitter<MemoryEvent>,
    ) -> MemoryValue {
        let value = self.values.get(&addr).copied().unwrap_or_default();
        events.emit(MemoryEvent {
            execution_clk,
            mode: MemoryMode::Read,
            addr,
            value,
            space_id: self.space_id,
        });
        value
    }

    pub fn set(
        &mut self,
        addr: MemoryAddress,
        value: MemoryValue,
        execution_clk: u32,
        events: &mut impl EventEmitter<MemoryEvent>,
    ) {
        self.values.insert(addr, value);
        events.emit(MemoryEvent {
            execution_clk,
            mode: MemoryMode::Write,
            addr,
            value,
            space_id: self.space_id,
        });
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::tagged_value::{TaggedValue, FF};

    #[test]
    fn test_set_and_get_value() {
        let mut memory = Memory::new(3);
        let mut events: Vec<MemoryEvent> = Vec::new();

        memory.set(10, TaggedValue::U32(42), 1, &mut events);
        assert_eq!(memory.get(10, 2, &mut events), TaggedValue::U32(42));

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].mode, MemoryMode::Write);
        assert_eq!(events[1].mode, MemoryMode::Read);
        assert_eq!(events[1].execution_clk, 2);
        assert_eq!(events[1].space_id, 3);
    }

    #[test]
    fn test_unset_reads_field_zero() {
        let memory = Memory::new(1);
        let mut events: Vec<MemoryEvent> = Vec::new();
        let value = memory.get(u32::MAX, 0, &mut events);
        assert_eq!(value, TaggedValue::FF(FF::from(0u64)));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_valid_address() {
        assert!(Memory::is_valid_address(&TaggedValue::U32(0)));
        assert!(!Memory::is_valid_address(&TaggedValue::U64(0)));
        assert!(!Memory::is_valid_address(&TaggedValue::FF(FF::from(1u64))));
    }

    proptest! {
        #[test]
        fn prop_get_after_set(addr in any::<u32>(), raw in any::<u64>(), tag in 0u8..7) {
            let tag = ValueTag::try_from(tag).unwrap();
            let value = TaggedValue::from_tag_truncating(tag, FF::from(raw));
            let mut memory = Memory::new(1);
            let mut events: Vec<MemoryEvent> = Vec::new();
            memory.set(addr, value, 0, &mut events);
            prop_assert_eq!(memory.get(addr, 1, &mut events), value);
        }
    }
}
