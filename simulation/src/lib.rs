//! Deterministic simulator of the AVM.
//!
//! The simulator interprets public bytecode over a tagged, per-context memory
//! and records every state transition as an event. The [`EventsContainer`]
//! produced by an [`Execution`] is the only input of trace generation.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod event;
pub mod execution;
pub mod gadgets;
pub mod instruction_info;
pub mod memory;
pub mod opcodes;
pub mod serialization;
pub mod stats;
pub mod tagged_value;
pub mod util;

pub use config::ExecutionSettings;
pub use db::{
    AztecAddress, ContractClass, ContractDb, ContractInstance, FixedWorldState, GasFees,
    GlobalVariables, RawContractDb, TreeRoots, WorldStateDb,
};
pub use error::InternalError;
pub use event::EventsContainer;
pub use execution::{
    simulate_transaction, EnqueuedCall, EnqueuedCallResult, EnvironmentVariable, Execution,
    ExecutionError, Gas, SimulationError,
};
pub use memory::{Memory, MemoryAddress};
pub use opcodes::{ExecutionOpCode, WireOpCode};
pub use serialization::{Instruction, Operand};
pub use stats::ExecutionStats;
pub use tagged_value::{MemoryValue, TaggedValue, ValueTag, FF};
