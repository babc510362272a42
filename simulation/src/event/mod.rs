//! Events recorded by the simulator.
//!
//! Every observable state transition of a simulation (memory accesses, gas
//! charges, address resolutions, context switches and gadget computations)
//! is recorded as an immutable event. Each kind of event is appended to its
//! own stream in execution order; the resulting [`EventsContainer`] is the
//! only output consumed by trace generation.

pub mod bytecode;
pub mod execution;
pub mod gadgets;
pub mod memory;

pub use self::{
    bytecode::{
        BytecodeDecompositionEvent, BytecodeHashingEvent, BytecodeRetrievalEvent,
        InstructionFetchingEvent,
    },
    execution::{
        AddressingEvent, AddressingEventError, ContextEvent, ContextStackEvent, DebugLog,
        ExecutionErrorKind, ExecutionEvent, GasCheck, GasEvent, OperandResolutionInfo,
    },
    gadgets::{
        AluEvent, AluOperation, BitwiseEvent, BitwiseOperation, DataCopyEvent, DataCopyOperation,
        KeccakF1600Event, Poseidon2HashEvent, Poseidon2PermutationEvent,
        Poseidon2PermutationMemoryEvent, RangeCheckEvent, Sha256CompressionEvent,
    },
    memory::{MemoryEvent, MemoryMode},
};

/// A sink for events of type `E`.
pub trait EventEmitter<E> {
    fn emit(&mut self, event: E);
}

impl<E> EventEmitter<E> for Vec<E> {
    fn emit(&mut self, event: E) {
        self.push(event);
    }
}

/// A sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventEmitter;

impl<E> EventEmitter<E> for NoopEventEmitter {
    fn emit(&mut self, _event: E) {}
}

/// All event streams of one simulation, in append order.
#[derive(Debug, Default, Clone)]
pub struct EventsContainer {
    pub execution: Vec<ExecutionEvent>,
    pub context_stack: Vec<ContextStackEvent>,
    pub alu: Vec<AluEvent>,
    pub bitwise: Vec<BitwiseEvent>,
    pub memory: Vec<MemoryEvent>,
    pub addressing: Vec<AddressingEvent>,
    pub gas: Vec<GasEvent>,
    pub range_check: Vec<RangeCheckEvent>,
    pub bytecode_retrieval: Vec<BytecodeRetrievalEvent>,
    pub bytecode_hashing: Vec<BytecodeHashingEvent>,
    pub bytecode_decomposition: Vec<BytecodeDecompositionEvent>,
    pub instruction_fetching: Vec<InstructionFetchingEvent>,
    pub data_copy: Vec<DataCopyEvent>,
    pub keccakf1600: Vec<KeccakF1600Event>,
    pub sha256_compression: Vec<Sha256CompressionEvent>,
    pub poseidon2_hash: Vec<Poseidon2HashEvent>,
    pub poseidon2_perm: Vec<Poseidon2PermutationEvent>,
    pub poseidon2_perm_mem: Vec<Poseidon2PermutationMemoryEvent>,
    pub debug_log: Vec<DebugLog>,
}

impl EventsContainer {
    /// Total number of events over all streams.
    pub fn len(&self) -> usize {
        self.execution.len()
            + self.context_stack.len()
            + self.alu.len()
            + self.bitwise.len()
            + self.memory.len()
            + self.addressing.len()
            + self.gas.len()
            + self.range_check.len()
            + self.bytecode_retrieval.len()
            + self.bytecode_hashing.len()
            + self.bytecode_decomposition.len()
            + self.instruction_fetching.len()
            + self.data_copy.len()
            + self.keccakf1600.len()
            + self.sha256_compression.len()
            + self.poseidon2_hash.len()
            + self.poseidon2_perm.len()
            + self.poseidon2_perm_mem.len()
            + self.debug_log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

macro_rules! impl_event_emitter {
    ($($field:ident: $event:ty),* $(,)?) => {
        $(
            impl EventEmitter<$event> for EventsContainer {
                fn emit(&mut self, event: $event) {
                    self.$field.push(event);
                }
            }
        )*
    };
}

impl_event_emitter!(
    execution: ExecutionEvent,
    context_stack: ContextStackEvent,
    alu: AluEvent,
    bitwise: BitwiseEvent,
    memory: MemoryEvent,
    addressing: AddressingEvent,
    gas: GasEvent,
    range_check: RangeCheckEvent,
    bytecode_retrieval: BytecodeRetrievalEvent,
    bytecode_hashing: BytecodeHashingEvent,
    bytecode_decomposition: BytecodeDecompositionEvent,
    instruction_fetching: InstructionFetchingEvent,
    data_copy: DataCopyEvent,
    keccakf1600: KeccakF1600Event,
    sha256_compression: Sha256CompressionEvent,
    poseidon2_hash: Poseidon2HashEvent,
    poseidon2_perm: Poseidon2PermutationEvent,
    poseidon2_perm_mem: Poseidon2PermutationMemoryEvent,
    debug_log: DebugLog,
);
