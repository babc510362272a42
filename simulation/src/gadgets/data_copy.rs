use thiserror::Error;

use super::range_check::RangeCheck;
use crate::{
    error::InternalError,
    event::{DataCopyEvent, DataCopyOperation, EventEmitter, MemoryEvent},
    memory::{Memory, MemoryAddress},
    tagged_value::{MemoryValue, TaggedValue, FF},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DataCopyError {
    /// The destination range leaves the address space.
    #[error("Data copy destination out of range")]
    DstOutOfRange,
    /// The source range leaves the address space.
    #[error("Data copy source out of range")]
    SrcOutOfRange,
}

/// Where the copied data is read from.
#[derive(Debug, Clone, Copy)]
pub enum DataSource<'a> {
    /// Calldata of an enqueued call, held outside of memory.
    Calldata(&'a [FF]),
    /// A region of another context's memory.
    Memory {
        memory: &'a Memory,
        addr: MemoryAddress,
        size: u32,
    },
}

impl DataSource<'_> {
    fn size(&self) -> u32 {
        match self {
            DataSource::Calldata(data) => data.len() as u32,
            DataSource::Memory { size, .. } => *size,
        }
    }
}

/// A copy request of one CALLDATACOPY or RETURNDATACOPY.
#[derive(Debug, Clone, Copy)]
pub struct CopyRequest<'a> {
    pub execution_clk: u32,
    pub source: DataSource<'a>,
    pub copy_size: u32,
    pub offset: u32,
    pub dst_addr: MemoryAddress,
}

pub trait DataCopyInterface {
    fn cd_copy(
        &mut self,
        request: CopyRequest<'_>,
        dst: &mut Memory,
        memory_events: &mut impl EventEmitter<MemoryEvent>,
        range_check: &mut RangeCheck,
    ) -> Result<Result<(), DataCopyError>, InternalError>;

    fn rd_copy(
        &mut self,
        request: CopyRequest<'_>,
        dst: &mut Memory,
        memory_events: &mut impl EventEmitter<MemoryEvent>,
        range_check: &mut RangeCheck,
    ) -> Result<Result<(), DataCopyError>, InternalError>;
}

#[derive(Debug, Default, Clone)]
pub struct DataCopy {
    pub(crate) events: Vec<DataCopyEvent>,
}

impl DataCopy {
    pub fn events(&self) -> &[DataCopyEvent] {
        &self.events
    }

    fn copy(
        &mut self,
        operation: DataCopyOperation,
        request: CopyRequest<'_>,
        dst: &mut Memory,
        memory_events: &mut impl EventEmitter<MemoryEvent>,
        range_check: &mut RangeCheck,
    ) -> Result<Result<(), DataCopyError>, InternalError> {
        let CopyRequest {
            execution_clk,
            source,
            copy_size,
            offset,
            dst_addr,
        } = request;

        let (read_context_id, data_addr, is_nested) = match source {
            DataSource::Calldata(_) => (0, 0, false),
            DataSource::Memory { memory, addr, .. } => (memory.space_id(), addr, true),
        };
        let data_size = source.size();

        let mut event = DataCopyEvent {
            execution_clk,
            operation,
            copying_data: Vec::new(),
            read_context_id,
            write_context_id: dst.space_id(),
            data_copy_size: copy_size,
            data_offset: offset,
            data_addr,
            data_size,
            is_nested,
            dst_addr,
            error: None,
        };

        let error = if !range_check.check_region_end(dst_addr as u64 + copy_size as u64)? {
            Some(DataCopyError::DstOutOfRange)
        } else if is_nested
            && !range_check.check_region_end(data_addr as u64 + data_size as u64)?
        {
            Some(DataCopyError::SrcOutOfRange)
        } else {
            None
        };
        if let Some(error) = error {
            event.error = Some(error);
            self.events.push(event);
            return Ok(Err(error));
        }

        let mut values = Vec::with_capacity(copy_size as usize);
        for i in 0..copy_size as u64 {
            let index = offset as u64 + i;
            let value = if index >= data_size as u64 {
                MemoryValue::default()
            } else {
                match source {
                    DataSource::Calldata(data) => TaggedValue::FF(data[index as usize]),
                    DataSource::Memory { memory, addr, .. } => {
                        memory.get(addr + index as u32, execution_clk, memory_events)
                    }
                }
            };
            values.push(value);
        }

        for (i, value) in values.iter().enumerate() {
            dst.set(dst_addr + i as u32, *value, execution_clk, memory_events);
        }

        event.copying_data = values;
        self.events.push(event);
        Ok(Ok(()))
    }
}

impl DataCopyInterface for DataCopy {
    fn cd_copy(
        &mut self,
        request: CopyRequest<'_>,
        dst: &mut Memory,
        memory_events: &mut impl EventEmitter<MemoryEvent>,
        range_check: &mut RangeCheck,
    ) -> Result<Result<(), DataCopyError>, InternalError> {
        self.copy(
            DataCopyOperation::CalldataCopy,
            request,
            dst,
            memory_events,
            range_check,
        )
    }

    fn rd_copy(
        &mut self,
        request: CopyRequest<'_>,
        dst: &mut Memory,
        memory_events: &mut impl EventEmitter<MemoryEvent>,
        range_check: &mut RangeCheck,
    ) -> Result<Result<(), DataCopyError>, InternalError> {
        self.copy(
            DataCopyOperation::ReturndataCopy,
            request,
            dst,
            memory_events,
            range_check,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MemoryMode;

    fn ff(v: u64) -> FF {
        FF::from(v)
    }

    #[test]
    fn test_calldata_copy_zero_pads() {
        let calldata = [ff(1), ff(2), ff(3)];
        let mut data_copy = DataCopy::default();
        let mut range_check = RangeCheck::default();
        let mut memory = Memory::new(1);
        let mut memory_events: Vec<MemoryEvent> = Vec::new();

        let request = CopyRequest {
            execution_clk: 0,
            source: DataSource::Calldata(&calldata),
            copy_size: 4,
            offset: 1,
            dst_addr: 100,
        };
        data_copy
            .cd_copy(request, &mut memory, &mut memory_events, &mut range_check)
            .unwrap()
            .unwrap();

        let written: Vec<_> = memory_events
            .iter()
            .filter(|event| event.mode == MemoryMode::Write)
            .map(|event| (event.addr, event.value))
            .collect();
        assert_eq!(
            written,
            vec![
                (100, TaggedValue::FF(ff(2))),
                (101, TaggedValue::FF(ff(3))),
                (102, TaggedValue::FF(ff(0))),
                (103, TaggedValue::FF(ff(0))),
            ]
        );
        assert_eq!(data_copy.events().len(), 1);
        assert!(!data_copy.events()[0].is_nested);
    }

    #[test]
    fn test_destination_out_of_range_writes_nothing() {
        let calldata = [ff(1), ff(2)];
        let mut data_copy = DataCopy::default();
        let mut range_check = RangeCheck::default();
        let mut memory = Memory::new(1);
        let mut memory_events: Vec<MemoryEvent> = Vec::new();

        let request = CopyRequest {
            execution_clk: 0,
            source: DataSource::Calldata(&calldata),
            copy_size: 2,
            offset: 0,
            dst_addr: u32::MAX,
        };
        let result = data_copy
            .cd_copy(request, &mut memory, &mut memory_events, &mut range_check)
            .unwrap();
        assert_eq!(result, Err(DataCopyError::DstOutOfRange));
        assert!(memory_events.is_empty());
        assert_eq!(
            data_copy.events()[0].error,
            Some(DataCopyError::DstOutOfRange)
        );
    }

    #[test]
    fn test_copy_up_to_last_address() {
        let calldata = [ff(7)];
        let mut data_copy = DataCopy::default();
        let mut range_check = RangeCheck::default();
        let mut memory = Memory::new(1);
        let mut memory_events: Vec<MemoryEvent> = Vec::new();

        let request = CopyRequest {
            execution_clk: 0,
            source: DataSource::Calldata(&calldata),
            copy_size: 1,
            offset: 0,
            dst_addr: u32::MAX,
        };
        let result = data_copy
            .cd_copy(request, &mut memory, &mut memory_events, &mut range_check)
            .unwrap();
        assert_eq!(result, Ok(()));
        assert_eq!(memory_events[0].addr, u32::MAX);
    }

    #[test]
    fn test_nested_copy_reads_source_memory() {
        let mut parent = Memory::new(1);
        let mut child = Memory::new(2);
        let mut memory_events: Vec<MemoryEvent> = Vec::new();
        parent.set(50, TaggedValue::U8(9), 0, &mut memory_events);
        parent.set(51, TaggedValue::U16(10), 0, &mut memory_events);
        memory_events.clear();

        let mut data_copy = DataCopy::default();
        let mut range_check = RangeCheck::default();
        let request = CopyRequest {
            execution_clk: 3,
            source: DataSource::Memory {
                memory: &parent,
                addr: 50,
                size: 2,
            },
            copy_size: 2,
            offset: 0,
            dst_addr: 0,
        };
        data_copy
            .rd_copy(request, &mut child, &mut memory_events, &mut range_check)
            .unwrap()
            .unwrap();

        assert_eq!(memory_events.len(), 4);
        assert_eq!(memory_events[0].space_id, 1);
        assert_eq!(memory_events[2].space_id, 2);
        assert_eq!(
            data_copy.events()[0].copying_data,
            vec![TaggedValue::U8(9), TaggedValue::U16(10)]
        );
        assert_eq!(
            data_copy.events()[0].operation,
            DataCopyOperation::ReturndataCopy
        );
    }
}
