//! The dispatch loop.
//!
//! An [`Execution`] runs the enqueued calls of one transaction. Nested calls
//! never recurse: every call frame is a [`Context`] on an explicit call stack
//! and the loop always steps the topmost one. A failing step reverts its
//! context, which then returns to its parent like any other halted context.

pub mod addressing;
pub mod bytecode;
pub mod context;
pub mod debug_log;
pub mod error;
pub mod gas;

use num_enum::TryFromPrimitive;
use tracing::{debug, instrument, trace, warn};

pub use self::{
    addressing::AddressingError,
    bytecode::{BytecodeId, BytecodeManager, BytecodeRetrievalError},
    context::{
        Calldata, Context, ContextProvider, ExecutionResult, InternalCallStack,
        InternalCallStackError, NestedCall,
    },
    error::{ExecutionError, OpcodeExecutionError, RegisterValidationError, SimulationError},
    gas::{Gas, GasPhase, GasTracker, OutOfGasError},
};
use self::debug_log::{read_debug_log, DebugLogRequest};
use crate::{
    config::ExecutionSettings,
    db::{AztecAddress, ContractDb, GlobalVariables, WorldStateDb},
    error::InternalError,
    event::{
        AddressingEvent, ContextStackEvent, DebugLog, EventsContainer, ExecutionErrorKind,
        ExecutionEvent, GasEvent, MemoryEvent, NoopEventEmitter,
    },
    gadgets::{
        data_copy::{CopyRequest, DataSource},
        Alu, AluInterface, Bitwise, BitwiseInterface, DataCopy, DataCopyInterface, KeccakF1600,
        Poseidon2, RangeCheck, Sha256,
    },
    instruction_info::{InstructionInfo, InstructionInfoDb},
    memory::MemoryAddress,
    opcodes::ExecutionOpCode,
    serialization::{Operand, Operands},
    stats::ExecutionStats,
    tagged_value::{MemoryValue, TaggedValue, FF},
};

/// Values readable through `GETENVVAR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum EnvironmentVariable {
    Address = 0,
    Sender,
    TransactionFee,
    ChainId,
    Version,
    BlockNumber,
    Timestamp,
    FeePerL2Gas,
    FeePerDaGas,
    IsStaticCall,
    L2GasLeft,
    DaGasLeft,
}

/// A top-level call of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueuedCall {
    pub contract_address: AztecAddress,
    pub msg_sender: AztecAddress,
    pub calldata: Vec<FF>,
    pub is_static: bool,
    pub gas_limit: Gas,
    pub transaction_fee: FF,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueuedCallResult {
    pub success: bool,
    pub gas_used: Gas,
    pub returndata: Vec<MemoryValue>,
}

fn operand(operands: &Operands, index: usize) -> Result<Operand, InternalError> {
    operands
        .get(index)
        .copied()
        .ok_or(InternalError::MissingResolvedOperand(index))
}

fn address(operands: &Operands, index: usize) -> Result<MemoryAddress, InternalError> {
    operand(operands, index)?.as_u32()
}

fn input(inputs: &[MemoryValue], index: usize) -> Result<MemoryValue, InternalError> {
    inputs
        .get(index)
        .copied()
        .ok_or(InternalError::MissingInput(index))
}

/// The execution engine of one transaction.
pub struct Execution<'a, C, W> {
    settings: ExecutionSettings,
    globals: GlobalVariables,
    instruction_info: InstructionInfoDb,
    bytecode_manager: BytecodeManager<'a, C, W>,
    context_provider: ContextProvider,
    call_stack: Vec<Context>,
    execution_clk: u32,

    alu: Alu,
    bitwise: Bitwise,
    data_copy: DataCopy,
    keccakf1600: KeccakF1600,
    sha256: Sha256,
    poseidon2: Poseidon2,
    range_check: RangeCheck,

    execution_events: Vec<ExecutionEvent>,
    context_stack_events: Vec<ContextStackEvent>,
    memory_events: Vec<MemoryEvent>,
    addressing_events: Vec<AddressingEvent>,
    gas_events: Vec<GasEvent>,
    debug_logs: Vec<DebugLog>,
    stats: ExecutionStats,
}

impl<'a, C: ContractDb, W: WorldStateDb> Execution<'a, C, W> {
    pub fn new(
        contract_db: &'a C,
        world_state: &'a W,
        globals: GlobalVariables,
        settings: ExecutionSettings,
    ) -> Self {
        Self {
            settings,
            globals,
            instruction_info: InstructionInfoDb,
            bytecode_manager: BytecodeManager::new(contract_db, world_state),
            context_provider: ContextProvider::default(),
            call_stack: Vec::new(),
            execution_clk: 0,
            alu: Alu::default(),
            bitwise: Bitwise::default(),
            data_copy: DataCopy::default(),
            keccakf1600: KeccakF1600::default(),
            sha256: Sha256::default(),
            poseidon2: Poseidon2::default(),
            range_check: RangeCheck::default(),
            execution_events: Vec::new(),
            context_stack_events: Vec::new(),
            memory_events: Vec::new(),
            addressing_events: Vec::new(),
            gas_events: Vec::new(),
            debug_logs: Vec::new(),
            stats: ExecutionStats::default(),
        }
    }

    pub const fn execution_clk(&self) -> u32 {
        self.execution_clk
    }

    pub const fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    pub fn execution_events(&self) -> &[ExecutionEvent] {
        &self.execution_events
    }

    /// Runs an enqueued call to completion.
    ///
    /// Reverts are part of the returned result; an error means the simulator
    /// itself is broken.
    #[instrument(level = "debug", skip_all, fields(contract_address = %call.contract_address))]
    pub fn execute(&mut self, call: EnqueuedCall) -> Result<EnqueuedCallResult, SimulationError> {
        let context = self.context_provider.make_enqueued_context(
            call.contract_address,
            call.msg_sender,
            call.transaction_fee,
            call.calldata,
            call.is_static,
            call.gas_limit,
            self.globals,
        );
        debug!(context_id = context.id(), "entering enqueued call");
        self.call_stack.push(context);

        loop {
            let top = self.call_stack.last().ok_or(InternalError::EmptyCallStack)?;
            if top.is_halted() {
                if let Some(result) = self.pop_context()? {
                    debug!(
                        success = result.success,
                        l2_gas_used = result.gas_used.l2_gas,
                        "enqueued call finished"
                    );
                    return Ok(result);
                }
                continue;
            }
            self.step()?;
        }
    }

    /// Pops the halted top context. Returns the result of the enqueued call
    /// once the call stack is empty.
    fn pop_context(&mut self) -> Result<Option<EnqueuedCallResult>, InternalError> {
        let child = self.call_stack.pop().ok_or(InternalError::EmptyCallStack)?;
        let result = child
            .result
            .ok_or(InternalError::MissingExecutionResult(child.id()))?;

        if let Some(parent) = self.call_stack.last_mut() {
            debug!(
                child_id = child.id(),
                parent_id = parent.id(),
                success = result.success,
                "returning to parent context"
            );
            parent.absorb_child(child, result);
            return Ok(None);
        }

        let returndata = (0..result.rd_size)
            .map(|i| {
                child
                    .memory
                    .get(result.rd_addr + i, self.execution_clk, &mut NoopEventEmitter)
            })
            .collect();
        Ok(Some(EnqueuedCallResult {
            success: result.success,
            gas_used: result.gas_used,
            returndata,
        }))
    }

    /// Executes one instruction of the top context and records its event.
    #[instrument(level = "trace", skip_all, fields(clk = self.execution_clk))]
    fn step(&mut self) -> Result<(), InternalError> {
        let depth = self
            .call_stack
            .len()
            .checked_sub(1)
            .ok_or(InternalError::EmptyCallStack)?;

        let mut event = ExecutionEvent {
            execution_clk: self.execution_clk,
            next_context_id: self.context_provider.next_context_id(),
            before_context_event: self.call_stack[depth].to_event(),
            ..Default::default()
        };

        match self.execute_instruction(depth, &mut event) {
            Ok(()) => {}
            Err(ExecutionError::Internal(error)) => return Err(error),
            Err(error) => {
                debug!(%error, context_id = self.call_stack[depth].id(), "reverting context");
                event.error = error.kind();
                self.call_stack[depth].halt_exceptionally();
            }
        }

        // Addressing only ran once an instruction was fetched, and gas only
        // once the registers were validated.
        if !matches!(
            event.error,
            ExecutionErrorKind::BytecodeNotFound | ExecutionErrorKind::InstructionFetching
        ) {
            self.addressing_events.push(event.addressing_event.clone());
        }
        if matches!(
            event.error,
            ExecutionErrorKind::None | ExecutionErrorKind::Gas | ExecutionErrorKind::OpcodeExecution
        ) {
            self.gas_events.push(event.gas_event);
        }

        let context = &mut self.call_stack[depth];
        context.pc = context.next_pc;
        event.after_context_event = context.to_event();

        if let Some(instruction) = &event.wire_instruction {
            let opcode = self.instruction_info.execution_opcode(instruction.opcode);
            let gas = event.gas_event.base_gas + event.gas_event.dynamic_gas;
            self.stats.record(opcode, gas, event.success());
            trace!(%opcode, pc = event.before_context_event.pc, error = ?event.error, "step");
        }

        self.execution_clk += 1;
        self.execution_events.push(event);
        Ok(())
    }

    fn execute_instruction(
        &mut self,
        depth: usize,
        event: &mut ExecutionEvent,
    ) -> Result<(), ExecutionError> {
        let clk = self.execution_clk;

        let bytecode_id = match self.call_stack[depth].bytecode_id {
            Some(bytecode_id) => bytecode_id,
            None => {
                let contract_address = self.call_stack[depth].contract_address;
                let bytecode_id = self
                    .bytecode_manager
                    .get_bytecode(contract_address, &mut self.poseidon2)?;
                self.call_stack[depth].bytecode_id = Some(bytecode_id);
                bytecode_id
            }
        };
        event.bytecode_id = bytecode_id;

        let pc = self.call_stack[depth].pc;
        let instruction = self.bytecode_manager.read_instruction(bytecode_id, pc)??;
        self.call_stack[depth].next_pc = pc + instruction.size_in_bytes() as u32;
        event.wire_instruction = Some(instruction.clone());

        let opcode = self.instruction_info.execution_opcode(instruction.opcode);
        let spec = self.instruction_info.spec(opcode);

        let operands = addressing::resolve(
            &instruction,
            spec.num_addresses,
            &self.call_stack[depth].memory,
            clk,
            &mut self.memory_events,
            &mut event.addressing_event,
        )?;
        event.resolved_operands = operands.clone();

        let register_info = spec.register_info;
        for i in 0..register_info.num_inputs() {
            let addr = address(&operands, i)?;
            let value = self.call_stack[depth]
                .memory
                .get(addr, clk, &mut self.memory_events);
            event.inputs.push(value);
        }
        for (index, value) in event.inputs.iter().enumerate() {
            if let Some(expected) = register_info.expected_tag(index) {
                if value.tag() != expected {
                    return Err(RegisterValidationError {
                        index,
                        expected,
                        found: value.tag(),
                    }
                    .into());
                }
            }
        }

        let context = &self.call_stack[depth];
        let mut gas_tracker = GasTracker::new(
            spec.gas_cost,
            gas::addressing_gas(&instruction, spec.num_addresses),
            context.gas_used,
            context.gas_limit,
        );
        let dynamic_factor = dynamic_gas_factor(opcode, &event.inputs)?;
        let charged = gas_tracker.consume_gas(dynamic_factor, &mut self.range_check)?;
        event.gas_event = *gas_tracker.event();
        charged?;
        self.call_stack[depth].gas_used = gas_tracker.gas_used();

        let output = self.dispatch(depth, opcode, &operands, &event.inputs, &gas_tracker)?;

        if register_info.has_output {
            let output = output.ok_or(InternalError::MissingOutput(opcode))?;
            let dst = address(&operands, spec.num_addresses.saturating_sub(1))?;
            self.call_stack[depth]
                .memory
                .set(dst, output, clk, &mut self.memory_events);
            event.output = output;
        }
        Ok(())
    }

    /// Performs the effect of `opcode`, returning the value of its output
    /// register if it has one.
    fn dispatch(
        &mut self,
        depth: usize,
        opcode: ExecutionOpCode,
        operands: &Operands,
        inputs: &[MemoryValue],
        gas_tracker: &GasTracker,
    ) -> Result<Option<MemoryValue>, ExecutionError> {
        use ExecutionOpCode as Op;

        let clk = self.execution_clk;
        let output = match opcode {
            Op::Add => self.alu.add(input(inputs, 0)?, input(inputs, 1)?)?,
            Op::Sub => self.alu.sub(input(inputs, 0)?, input(inputs, 1)?)?,
            Op::Mul => self.alu.mul(input(inputs, 0)?, input(inputs, 1)?)?,
            Op::Div => self.alu.div(input(inputs, 0)?, input(inputs, 1)?)?,
            Op::FDiv => self.alu.fdiv(input(inputs, 0)?, input(inputs, 1)?)?,
            Op::Eq => self.alu.eq(input(inputs, 0)?, input(inputs, 1)?)?,
            Op::Lt => self.alu.lt(input(inputs, 0)?, input(inputs, 1)?)?,
            Op::Lte => self.alu.lte(input(inputs, 0)?, input(inputs, 1)?)?,
            Op::Shl => self.alu.shl(input(inputs, 0)?, input(inputs, 1)?)?,
            Op::Shr => self.alu.shr(input(inputs, 0)?, input(inputs, 1)?)?,
            Op::Not => self.alu.op_not(input(inputs, 0)?)?,
            Op::Cast => {
                let tag = operand(operands, 2)?.as_tag()?;
                self.alu.truncate(input(inputs, 0)?.as_ff(), tag)
            }
            Op::And => self.bitwise.and(input(inputs, 0)?, input(inputs, 1)?)?,
            Op::Or => self.bitwise.or(input(inputs, 0)?, input(inputs, 1)?)?,
            Op::Xor => self.bitwise.xor(input(inputs, 0)?, input(inputs, 1)?)?,
            Op::GetEnvVar => {
                let variable = operand(operands, 1)?.as_u8()?;
                self.get_env_var(depth, variable, gas_tracker.gas_left())?
            }
            Op::SuccessCopy => TaggedValue::U1(self.call_stack[depth].last_child_success),
            Op::ReturndataSize => TaggedValue::U32(self.call_stack[depth].last_child_rd_size),
            Op::Set => {
                let tag = operand(operands, 1)?.as_tag()?;
                self.alu.truncate(operand(operands, 2)?.as_ff(), tag)
            }
            Op::Mov => input(inputs, 0)?,
            Op::CalldataCopy => {
                let copy_size = input(inputs, 0)?.as_u32()?;
                let offset = input(inputs, 1)?.as_u32()?;
                self.calldata_copy(depth, copy_size, offset, address(operands, 2)?)?;
                return Ok(None);
            }
            Op::ReturndataCopy => {
                let context = &mut self.call_stack[depth];
                let request = CopyRequest {
                    execution_clk: clk,
                    source: DataSource::Memory {
                        memory: &context.last_child_memory,
                        addr: context.last_child_rd_addr,
                        size: context.last_child_rd_size,
                    },
                    copy_size: input(inputs, 0)?.as_u32()?,
                    offset: input(inputs, 1)?.as_u32()?,
                    dst_addr: address(operands, 2)?,
                };
                self.data_copy.rd_copy(
                    request,
                    &mut context.memory,
                    &mut self.memory_events,
                    &mut self.range_check,
                )??;
                return Ok(None);
            }
            Op::Jump => {
                self.call_stack[depth].next_pc = operand(operands, 0)?.as_u32()?;
                return Ok(None);
            }
            Op::JumpI => {
                if input(inputs, 0)?.as_bool()? {
                    self.call_stack[depth].next_pc = operand(operands, 1)?.as_u32()?;
                }
                return Ok(None);
            }
            Op::InternalCall => {
                let context = &mut self.call_stack[depth];
                context.internal_call_stack.push(context.next_pc);
                context.next_pc = operand(operands, 0)?.as_u32()?;
                return Ok(None);
            }
            Op::InternalReturn => {
                let context = &mut self.call_stack[depth];
                context.next_pc = context.internal_call_stack.pop()?;
                return Ok(None);
            }
            Op::Call | Op::StaticCall => {
                let call = NestedCall {
                    contract_address: input(inputs, 2)?.as_ff(),
                    cd_addr: address(operands, 4)?,
                    cd_size: input(inputs, 3)?.as_u32()?,
                    is_static: opcode == Op::StaticCall,
                    gas_limit: Gas::new(input(inputs, 0)?.as_u32()?, input(inputs, 1)?.as_u32()?),
                };
                self.call(depth, call, gas_tracker)?;
                return Ok(None);
            }
            Op::Return | Op::Revert => {
                let rd_size = input(inputs, 0)?.as_u32()?;
                let rd_addr = address(operands, 1)?;
                self.halt(depth, rd_addr, rd_size, opcode == Op::Return)?;
                return Ok(None);
            }
            Op::DebugLog => {
                self.debug_log(depth, operands)?;
                return Ok(None);
            }
            Op::Poseidon2Perm => {
                let memory = &mut self.call_stack[depth].memory;
                self.poseidon2.permutation_with_memory(
                    memory,
                    address(operands, 0)?,
                    address(operands, 1)?,
                    clk,
                    &mut self.memory_events,
                    &mut self.range_check,
                )??;
                return Ok(None);
            }
            Op::Sha256Compression => {
                let memory = &mut self.call_stack[depth].memory;
                self.sha256.compression(
                    memory,
                    address(operands, 0)?,
                    address(operands, 1)?,
                    address(operands, 2)?,
                    clk,
                    &mut self.memory_events,
                    &mut self.range_check,
                )??;
                return Ok(None);
            }
            Op::KeccakF1600 => {
                let memory = &mut self.call_stack[depth].memory;
                self.keccakf1600.permutation(
                    memory,
                    address(operands, 0)?,
                    address(operands, 1)?,
                    clk,
                    &mut self.memory_events,
                    &mut self.range_check,
                )??;
                return Ok(None);
            }
        };
        Ok(Some(output))
    }

    fn get_env_var(
        &self,
        depth: usize,
        variable: u8,
        gas_left: Gas,
    ) -> Result<MemoryValue, ExecutionError> {
        let context = &self.call_stack[depth];
        let globals = &context.globals;
        let variable = EnvironmentVariable::try_from(variable)
            .map_err(|_| OpcodeExecutionError::InvalidEnvironmentVariable(variable))?;

        Ok(match variable {
            EnvironmentVariable::Address => TaggedValue::FF(context.contract_address),
            EnvironmentVariable::Sender => TaggedValue::FF(context.msg_sender),
            EnvironmentVariable::TransactionFee => TaggedValue::FF(context.transaction_fee),
            EnvironmentVariable::ChainId => TaggedValue::FF(globals.chain_id),
            EnvironmentVariable::Version => TaggedValue::FF(globals.version),
            EnvironmentVariable::BlockNumber => TaggedValue::U32(globals.block_number),
            EnvironmentVariable::Timestamp => TaggedValue::U64(globals.timestamp),
            EnvironmentVariable::FeePerL2Gas => TaggedValue::U128(globals.gas_fees.fee_per_l2_gas),
            EnvironmentVariable::FeePerDaGas => TaggedValue::U128(globals.gas_fees.fee_per_da_gas),
            EnvironmentVariable::IsStaticCall => TaggedValue::U1(context.is_static),
            EnvironmentVariable::L2GasLeft => TaggedValue::U32(gas_left.l2_gas),
            EnvironmentVariable::DaGasLeft => TaggedValue::U32(gas_left.da_gas),
        })
    }

    /// Copies calldata into the current context. The calldata of a nested
    /// context lives in its parent's memory.
    fn calldata_copy(
        &mut self,
        depth: usize,
        copy_size: u32,
        offset: u32,
        dst_addr: MemoryAddress,
    ) -> Result<(), ExecutionError> {
        let execution_clk = self.execution_clk;
        let (parents, current) = self.call_stack.split_at_mut(depth);
        let context = current.first_mut().ok_or(InternalError::EmptyCallStack)?;
        let source = match &context.calldata {
            Calldata::Enqueued(calldata) => DataSource::Calldata(calldata.as_slice()),
            Calldata::Nested { addr, size } => {
                let parent = parents.last().ok_or(InternalError::EmptyCallStack)?;
                DataSource::Memory {
                    memory: &parent.memory,
                    addr: *addr,
                    size: *size,
                }
            }
        };
        let request = CopyRequest {
            execution_clk,
            source,
            copy_size,
            offset,
            dst_addr,
        };
        self.data_copy.cd_copy(
            request,
            &mut context.memory,
            &mut self.memory_events,
            &mut self.range_check,
        )??;
        Ok(())
    }

    fn call(
        &mut self,
        depth: usize,
        mut call: NestedCall,
        gas_tracker: &GasTracker,
    ) -> Result<(), ExecutionError> {
        call.gas_limit = gas_tracker.compute_gas_limit_for_call(call.gas_limit, &mut self.range_check)?;

        let parent = &self.call_stack[depth];
        let child = self.context_provider.make_nested_context(parent, call);
        self.context_stack_events.push(ContextStackEvent {
            entered_context_id: child.id(),
            parent: parent.to_event(),
        });
        debug!(
            parent_id = parent.id(),
            child_id = child.id(),
            contract_address = %call.contract_address,
            l2_gas_limit = call.gas_limit.l2_gas,
            is_static = child.is_static,
            "entering nested call"
        );
        self.call_stack.push(child);
        Ok(())
    }

    fn halt(
        &mut self,
        depth: usize,
        rd_addr: MemoryAddress,
        rd_size: u32,
        success: bool,
    ) -> Result<(), ExecutionError> {
        if !self
            .range_check
            .check_region_end(rd_addr as u64 + rd_size as u64)?
        {
            return Err(OpcodeExecutionError::ReturndataOutOfRange.into());
        }
        let context = &mut self.call_stack[depth];
        let gas_used = context.gas_used;
        context.halt(ExecutionResult {
            rd_addr,
            rd_size,
            gas_used,
            success,
        });
        Ok(())
    }

    fn debug_log(&mut self, depth: usize, operands: &Operands) -> Result<(), ExecutionError> {
        if !self.settings.collect_debug_logs {
            return Ok(());
        }
        let context = &self.call_stack[depth];
        let request = DebugLogRequest {
            contract_address: context.contract_address,
            level_addr: address(operands, 0)?,
            message_addr: address(operands, 1)?,
            fields_addr: address(operands, 2)?,
            fields_size_addr: address(operands, 3)?,
            message_size: operand(operands, 4)?.as_u32()?,
        };
        match read_debug_log(
            &context.memory,
            request,
            self.execution_clk,
            &self.settings,
            &mut self.memory_events,
        ) {
            Ok(log) => {
                debug!(message = %log.message, fields = log.fields.len(), "debug log");
                self.debug_logs.push(log);
            }
            Err(error) => warn!(%error, "ignoring unreadable debug log"),
        }
        Ok(())
    }

    /// Consumes the engine, returning every recorded event stream.
    pub fn into_events(self) -> EventsContainer {
        EventsContainer {
            execution: self.execution_events,
            context_stack: self.context_stack_events,
            alu: self.alu.events,
            bitwise: self.bitwise.events,
            memory: self.memory_events,
            addressing: self.addressing_events,
            gas: self.gas_events,
            range_check: self.range_check.events,
            bytecode_retrieval: self.bytecode_manager.retrieval_events,
            bytecode_hashing: self.bytecode_manager.hashing_events,
            bytecode_decomposition: self.bytecode_manager.decomposition_events,
            instruction_fetching: self.bytecode_manager.fetching_events,
            data_copy: self.data_copy.events,
            keccakf1600: self.keccakf1600.events,
            sha256_compression: self.sha256.events,
            poseidon2_hash: self.poseidon2.hash_events,
            poseidon2_perm: self.poseidon2.perm_events,
            poseidon2_perm_mem: self.poseidon2.perm_mem_events,
            debug_log: self.debug_logs,
        }
    }
}

/// Units of dynamic gas charged by `opcode`, computed from its validated
/// inputs.
fn dynamic_gas_factor(opcode: ExecutionOpCode, inputs: &[MemoryValue]) -> Result<Gas, ExecutionError> {
    match opcode {
        ExecutionOpCode::CalldataCopy
        | ExecutionOpCode::ReturndataCopy
        | ExecutionOpCode::Return
        | ExecutionOpCode::Revert => Ok(Gas::new(input(inputs, 0)?.as_u32()?, 0)),
        _ => Ok(Gas::default()),
    }
}

/// Runs the enqueued calls of a transaction in order on one engine, so that
/// bytecode work is shared between them.
pub fn simulate_transaction<C: ContractDb, W: WorldStateDb>(
    contract_db: &C,
    world_state: &W,
    globals: GlobalVariables,
    settings: ExecutionSettings,
    calls: impl IntoIterator<Item = EnqueuedCall>,
) -> Result<(Vec<EnqueuedCallResult>, EventsContainer), SimulationError> {
    let mut execution = Execution::new(contract_db, world_state, globals, settings);
    let results = calls
        .into_iter()
        .map(|call| execution.execute(call))
        .collect::<Result<Vec<_>, _>>()?;
    execution.stats().log_summary();
    Ok((results, execution.into_events()))
}
