//! Reading of `DEBUGLOG` messages.
//!
//! A debug log never reverts the calling context. Its memory reads are
//! recorded like any other read of the step.

use thiserror::Error;

use crate::{
    config::ExecutionSettings,
    constants::MEMORY_ADDRESS_SPACE,
    db::AztecAddress,
    event::{DebugLog, EventEmitter, MemoryEvent},
    memory::{Memory, MemoryAddress},
    tagged_value::{TaggedValue, ValueTag},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DebugLogError {
    #[error("Debug log fields size has tag {0}, expected U32")]
    InvalidFieldsSizeTag(ValueTag),
    #[error("Debug log region at {addr} of size {size} leaves the address space")]
    RegionOutOfRange { addr: MemoryAddress, size: u32 },
    #[error("Debug log has {size} fields, at most {max} are read")]
    TooManyFields { size: u32, max: u32 },
}

/// Operands of one `DEBUGLOG`, already resolved.
#[derive(Debug, Clone, Copy)]
pub struct DebugLogRequest {
    pub contract_address: AztecAddress,
    pub level_addr: MemoryAddress,
    pub message_addr: MemoryAddress,
    pub fields_addr: MemoryAddress,
    pub fields_size_addr: MemoryAddress,
    pub message_size: u32,
}

fn check_region(addr: MemoryAddress, size: u32) -> Result<(), DebugLogError> {
    if addr as u64 + size as u64 > MEMORY_ADDRESS_SPACE {
        return Err(DebugLogError::RegionOutOfRange { addr, size });
    }
    Ok(())
}

/// Reads the message and fields of a debug log. Message characters are the
/// low bytes of the stored values; at most
/// `settings.debug_log_message_max_len` are kept. Reads done before a failure
/// stay recorded.
pub fn read_debug_log(
    memory: &Memory,
    request: DebugLogRequest,
    execution_clk: u32,
    settings: &ExecutionSettings,
    events: &mut impl EventEmitter<MemoryEvent>,
) -> Result<DebugLog, DebugLogError> {
    let level = memory.get(request.level_addr, execution_clk, events).as_ff();
    let fields_size = match memory.get(request.fields_size_addr, execution_clk, events) {
        TaggedValue::U32(size) => size,
        other => return Err(DebugLogError::InvalidFieldsSizeTag(other.tag())),
    };
    if fields_size > settings.debug_log_max_fields {
        return Err(DebugLogError::TooManyFields {
            size: fields_size,
            max: settings.debug_log_max_fields,
        });
    }
    check_region(request.message_addr, request.message_size)?;
    check_region(request.fields_addr, fields_size)?;

    let message = (0..request.message_size)
        .take(settings.debug_log_message_max_len)
        .map(|i| {
            let value = memory
                .get(request.message_addr + i, execution_clk, events)
                .as_ff();
            let byte = TaggedValue::from_tag_truncating(ValueTag::U8, value)
                .as_u8()
                .unwrap_or_default();
            char::from(byte)
        })
        .collect();
    let fields = (0..fields_size)
        .map(|i| memory.get(request.fields_addr + i, execution_clk, events).as_ff())
        .collect();

    Ok(DebugLog {
        contract_address: request.contract_address,
        level,
        message,
        fields,
    })
}
