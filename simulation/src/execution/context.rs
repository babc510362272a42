//! Call frames and the internal call stack.

use thiserror::Error;

use super::{bytecode::BytecodeId, gas::Gas};
use crate::{
    db::{AztecAddress, GlobalVariables},
    event::ContextEvent,
    memory::{Memory, MemoryAddress},
    tagged_value::FF,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InternalCallStackError {
    #[error("INTERNALRETURN with an empty internal call stack")]
    EmptyStack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InternalCallFrame {
    return_id: u32,
    return_pc: u32,
}

/// The subroutine stack of `INTERNALCALL` and `INTERNALRETURN`.
///
/// Every internal call gets a fresh id; popping restores the id of the caller
/// and the id the caller itself returns to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalCallStack {
    frames: Vec<InternalCallFrame>,
    call_id: u32,
    return_id: u32,
    next_call_id: u32,
}

impl Default for InternalCallStack {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            call_id: 1,
            return_id: 0,
            next_call_id: 2,
        }
    }
}

impl InternalCallStack {
    pub fn push(&mut self, return_pc: u32) {
        self.frames.push(InternalCallFrame {
            return_id: self.return_id,
            return_pc,
        });
        self.return_id = self.call_id;
        self.call_id = self.next_call_id;
        self.next_call_id += 1;
    }

    /// Pops the innermost call and returns the pc to resume at.
    pub fn pop(&mut self) -> Result<u32, InternalCallStackError> {
        let frame = self.frames.pop().ok_or(InternalCallStackError::EmptyStack)?;
        self.call_id = self.return_id;
        self.return_id = frame.return_id;
        Ok(frame.return_pc)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// Where the calldata of a context lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Calldata {
    /// Calldata of an enqueued call, held by the context itself.
    Enqueued(Vec<FF>),
    /// A region of the parent's memory.
    Nested { addr: MemoryAddress, size: u32 },
}

/// The outcome of a halted context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub rd_addr: MemoryAddress,
    pub rd_size: u32,
    pub gas_used: Gas,
    pub success: bool,
}

/// One call frame.
#[derive(Debug, Clone)]
pub struct Context {
    pub(crate) id: u32,
    pub(crate) parent_id: u32,
    pub(crate) contract_address: AztecAddress,
    pub(crate) msg_sender: AztecAddress,
    pub(crate) transaction_fee: FF,
    pub(crate) is_static: bool,
    pub(crate) globals: GlobalVariables,
    pub(crate) calldata: Calldata,
    pub(crate) bytecode_id: Option<BytecodeId>,
    pub(crate) pc: u32,
    pub(crate) next_pc: u32,
    pub(crate) gas_used: Gas,
    pub(crate) gas_limit: Gas,
    pub(crate) parent_gas_used: Gas,
    pub(crate) parent_gas_limit: Gas,
    pub(crate) memory: Memory,
    pub(crate) internal_call_stack: InternalCallStack,
    pub(crate) last_child_rd_addr: MemoryAddress,
    pub(crate) last_child_rd_size: u32,
    pub(crate) last_child_success: bool,
    pub(crate) last_child_memory: Memory,
    pub(crate) result: Option<ExecutionResult>,
}

impl Context {
    pub const fn id(&self) -> u32 {
        self.id
    }

    pub const fn parent_id(&self) -> u32 {
        self.parent_id
    }

    pub const fn is_nested(&self) -> bool {
        self.parent_id != 0
    }

    pub const fn pc(&self) -> u32 {
        self.pc
    }

    pub const fn gas_used(&self) -> Gas {
        self.gas_used
    }

    pub const fn gas_limit(&self) -> Gas {
        self.gas_limit
    }

    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    pub const fn is_halted(&self) -> bool {
        self.result.is_some()
    }

    pub fn halt(&mut self, result: ExecutionResult) {
        self.result = Some(result);
    }

    /// Halts with failure, charging the whole gas limit.
    pub fn halt_exceptionally(&mut self) {
        self.gas_used = self.gas_limit;
        self.halt(ExecutionResult {
            gas_used: self.gas_limit,
            ..Default::default()
        });
    }

    /// Takes over the results of a child that halted.
    pub fn absorb_child(&mut self, child: Context, result: ExecutionResult) {
        self.gas_used = self.gas_used + result.gas_used;
        self.last_child_rd_addr = result.rd_addr;
        self.last_child_rd_size = result.rd_size;
        self.last_child_success = result.success;
        self.last_child_memory = child.memory;
    }

    pub fn to_event(&self) -> ContextEvent {
        let (parent_cd_addr, parent_cd_size) = match &self.calldata {
            Calldata::Enqueued(calldata) => (0, calldata.len() as u32),
            Calldata::Nested { addr, size } => (*addr, *size),
        };
        ContextEvent {
            id: self.id,
            parent_id: self.parent_id,
            pc: self.pc,
            next_pc: self.next_pc,
            msg_sender: self.msg_sender,
            contract_address: self.contract_address,
            is_static: self.is_static,
            parent_cd_addr,
            parent_cd_size,
            last_child_rd_addr: self.last_child_rd_addr,
            last_child_rd_size: self.last_child_rd_size,
            last_child_success: self.last_child_success,
            gas_used: self.gas_used,
            gas_limit: self.gas_limit,
            parent_gas_used: self.parent_gas_used,
            parent_gas_limit: self.parent_gas_limit,
            internal_call_id: self.internal_call_stack.call_id,
            internal_call_return_id: self.internal_call_stack.return_id,
            next_internal_call_id: self.internal_call_stack.next_call_id,
        }
    }
}

/// Parameters of a nested call.
#[derive(Debug, Clone, Copy)]
pub struct NestedCall {
    pub contract_address: AztecAddress,
    pub cd_addr: MemoryAddress,
    pub cd_size: u32,
    pub is_static: bool,
    pub gas_limit: Gas,
}

/// Creates contexts with increasing ids, starting at 1.
#[derive(Debug, Clone)]
pub struct ContextProvider {
    next_context_id: u32,
}

impl Default for ContextProvider {
    fn default() -> Self {
        Self { next_context_id: 1 }
    }
}

impl ContextProvider {
    pub const fn next_context_id(&self) -> u32 {
        self.next_context_id
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_context_id;
        self.next_context_id += 1;
        id
    }

    #[allow(clippy::too_many_arguments)]
    pub fn make_enqueued_context(
        &mut self,
        contract_address: AztecAddress,
        msg_sender: AztecAddress,
        transaction_fee: FF,
        calldata: Vec<FF>,
        is_static: bool,
        gas_limit: Gas,
        globals: GlobalVariables,
    ) -> Context {
        let id = self.allocate_id();
        Context {
            id,
            parent_id: 0,
            contract_address,
            msg_sender,
            transaction_fee,
            is_static,
            globals,
            calldata: Calldata::Enqueued(calldata),
            bytecode_id: None,
            pc: 0,
            next_pc: 0,
            gas_used: Gas::default(),
            gas_limit,
            parent_gas_used: Gas::default(),
            parent_gas_limit: Gas::default(),
            memory: Memory::new(id),
            internal_call_stack: InternalCallStack::default(),
            last_child_rd_addr: 0,
            last_child_rd_size: 0,
            last_child_success: false,
            last_child_memory: Memory::default(),
            result: None,
        }
    }

    pub fn make_nested_context(&mut self, parent: &Context, call: NestedCall) -> Context {
        let id = self.allocate_id();
        Context {
            id,
            parent_id: parent.id,
            contract_address: call.contract_address,
            msg_sender: parent.contract_address,
            transaction_fee: parent.transaction_fee,
            is_static: parent.is_static || call.is_static,
            globals: parent.globals,
            calldata: Calldata::Nested {
                addr: call.cd_addr,
                size: call.cd_size,
            },
            bytecode_id: None,
            pc: 0,
            next_pc: 0,
            gas_used: Gas::default(),
            gas_limit: call.gas_limit,
            parent_gas_used: parent.gas_used,
            parent_gas_limit: parent.gas_limit,
            memory: Memory::new(id),
            internal_call_stack: InternalCallStack::default(),
            last_child_rd_addr: 0,
            last_child_rd_size: 0,
            last_child_success: false,
            last_child_memory: Memory::default(),
            result: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ff(v: u64) -> FF {
        FF::from(v)
    }

    fn enqueued(provider: &mut ContextProvider, is_static: bool) -> Context {
        provider.make_enqueued_context(
            ff(1),
            ff(2),
            ff(0),
            vec![ff(7)],
            is_static,
            Gas::new(100, 10),
            GlobalVariables::default(),
        )
    }

    #[test]
    fn test_internal_call_stack_ids() {
        let mut stack = InternalCallStack::default();
        stack.push(10);
        assert_eq!((stack.call_id, stack.return_id, stack.next_call_id), (2, 1, 3));
        stack.push(20);
        assert_eq!((stack.call_id, stack.return_id, stack.next_call_id), (3, 2, 4));

        assert_eq!(stack.pop(), Ok(20));
        assert_eq!((stack.call_id, stack.return_id), (2, 1));
        assert_eq!(stack.pop(), Ok(10));
        assert_eq!((stack.call_id, stack.return_id), (1, 0));
        // Ids are never reused.
        stack.push(30);
        assert_eq!(stack.call_id, 4);
    }

    #[test]
    fn test_pop_empty_internal_call_stack() {
        let mut stack = InternalCallStack::default();
        assert_eq!(stack.pop(), Err(InternalCallStackError::EmptyStack));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_context_ids_and_static_propagation() {
        let mut provider = ContextProvider::default();
        let parent = enqueued(&mut provider, true);
        assert_eq!(parent.id(), 1);
        assert_eq!(parent.memory().space_id(), 1);

        let child = provider.make_nested_context(
            &parent,
            NestedCall {
                contract_address: ff(3),
                cd_addr: 5,
                cd_size: 2,
                is_static: false,
                gas_limit: Gas::new(50, 5),
            },
        );
        assert_eq!(child.id(), 2);
        assert_eq!(child.parent_id(), 1);
        assert!(child.is_static);
        assert!(child.is_nested());
        assert_eq!(child.msg_sender, ff(1));
        assert_eq!(provider.next_context_id(), 3);

        let event = child.to_event();
        assert_eq!((event.parent_cd_addr, event.parent_cd_size), (5, 2));
        assert_eq!(event.parent_gas_limit, Gas::new(100, 10));
    }

    #[test]
    fn test_exceptional_halt_charges_limit() {
        let mut provider = ContextProvider::default();
        let mut context = enqueued(&mut provider, false);
        context.gas_used = Gas::new(3, 0);
        context.halt_exceptionally();
        assert!(context.is_halted());
        assert_eq!(context.gas_used(), context.gas_limit());
        assert_eq!(
            context.result,
            Some(ExecutionResult {
                rd_addr: 0,
                rd_size: 0,
                gas_used: Gas::new(100, 10),
                success: false,
            })
        );
    }

    #[test]
    fn test_absorb_child() {
        let mut provider = ContextProvider::default();
        let mut parent = enqueued(&mut provider, false);
        parent.gas_used = Gas::new(20, 0);
        let child = enqueued(&mut provider, false);
        let result = ExecutionResult {
            rd_addr: 4,
            rd_size: 2,
            gas_used: Gas::new(30, 1),
            success: true,
        };
        parent.absorb_child(child, result);
        assert_eq!(parent.gas_used(), Gas::new(50, 1));
        assert!(parent.last_child_success);
        assert_eq!(parent.last_child_memory.space_id(), 2);
        assert_eq!(parent.to_event().last_child_rd_size, 2);
    }
}
