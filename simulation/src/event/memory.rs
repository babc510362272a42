use crate::{memory::MemoryAddress, tagged_value::MemoryValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryMode {
    Read,
    Write,
}

/// Event for a single memory access.
///
/// The memory consistency check orders these by `(space_id, addr,
/// execution_clk)`, so every access is recorded, including reads of unset
/// cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryEvent {
    pub execution_clk: u32,
    pub mode: MemoryMode,
    pub addr: MemoryAddress,
    pub value: MemoryValue,
    pub space_id: u32,
}
