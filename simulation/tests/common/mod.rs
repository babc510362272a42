#![allow(dead_code)]

use anyhow::Result;
use avm_simulation::{
    simulate_transaction, util::init_logger, EnqueuedCall, EnqueuedCallResult, EventsContainer,
    ExecutionSettings, FixedWorldState, Gas, GlobalVariables, Instruction, Operand,
    RawContractDb, ValueTag, WireOpCode, FF,
};

pub const DEFAULT_GAS_LIMIT: Gas = Gas::new(100_000, 100_000);

pub fn ff(value: u64) -> FF {
    FF::from(value)
}

/// Serializes `instructions` back to back.
pub fn assemble(instructions: &[Instruction]) -> Vec<u8> {
    instructions
        .iter()
        .flat_map(|instruction| {
            instruction
                .serialize()
                .expect("test instructions should be well formed")
        })
        .collect()
}

/// Byte offset of every instruction of a program.
pub fn pcs(instructions: &[Instruction]) -> Vec<u32> {
    instructions
        .iter()
        .scan(0u32, |pc, instruction| {
            let current = *pc;
            *pc += instruction.size_in_bytes() as u32;
            Some(current)
        })
        .collect()
}

fn tag(tag: ValueTag) -> Operand {
    Operand::U8(tag.into())
}

pub fn set8(dst: u8, value_tag: ValueTag, value: u8) -> Instruction {
    Instruction::new(
        WireOpCode::Set8,
        0,
        [Operand::U8(dst), tag(value_tag), Operand::U8(value)],
    )
}

pub fn set32(dst: u16, value: u32) -> Instruction {
    Instruction::new(
        WireOpCode::Set32,
        0,
        [Operand::U16(dst), tag(ValueTag::U32), Operand::U32(value)],
    )
}

pub fn set_ff(dst: u16, value: FF) -> Instruction {
    Instruction::new(
        WireOpCode::SetFF,
        0,
        [Operand::U16(dst), tag(ValueTag::FF), Operand::FF(value)],
    )
}

/// Three-operand instruction with 16-bit direct operands.
pub fn binary(opcode: WireOpCode, a: u16, b: u16, dst: u16) -> Instruction {
    Instruction::new(
        opcode,
        0,
        [Operand::U16(a), Operand::U16(b), Operand::U16(dst)],
    )
}

pub fn ret(size_addr: u16, rd_addr: u16) -> Instruction {
    Instruction::new(
        WireOpCode::Return,
        0,
        [Operand::U16(size_addr), Operand::U16(rd_addr)],
    )
}

pub fn revert(size_addr: u16, rd_addr: u16) -> Instruction {
    Instruction::new(
        WireOpCode::Revert16,
        0,
        [Operand::U16(size_addr), Operand::U16(rd_addr)],
    )
}

/// `CALL` or `STATICCALL` reading its arguments from consecutive addresses
/// starting at `args`: L2 gas, DA gas, contract address, calldata size. The
/// calldata itself starts at `cd_addr`.
pub fn call(opcode: WireOpCode, args: u16, cd_addr: u16) -> Instruction {
    Instruction::new(
        opcode,
        0,
        [
            Operand::U16(args),
            Operand::U16(args + 1),
            Operand::U16(args + 2),
            Operand::U16(args + 3),
            Operand::U16(cd_addr),
        ],
    )
}

pub fn get_env_var(dst: u16, variable: u8) -> Instruction {
    Instruction::new(
        WireOpCode::GetEnvVar16,
        0,
        [Operand::U16(dst), Operand::U8(variable)],
    )
}

pub fn enqueued(address: u64, calldata: Vec<FF>, gas_limit: Gas) -> EnqueuedCall {
    EnqueuedCall {
        contract_address: ff(address),
        msg_sender: ff(0xa11ce),
        calldata,
        is_static: false,
        gas_limit,
        transaction_fee: ff(0),
    }
}

/// Deploys programs and runs enqueued calls against them.
pub struct TestRunner {
    pub contract_db: RawContractDb,
    pub world_state: FixedWorldState,
    pub globals: GlobalVariables,
    pub settings: ExecutionSettings,
}

impl Default for TestRunner {
    fn default() -> Self {
        init_logger();
        Self {
            contract_db: RawContractDb::new(),
            world_state: FixedWorldState::default(),
            globals: GlobalVariables::default(),
            settings: ExecutionSettings::default(),
        }
    }
}

impl TestRunner {
    /// Deploys `instructions` at `address`, under a class of the same id.
    pub fn deploy(&mut self, address: u64, instructions: &[Instruction]) -> &mut Self {
        self.contract_db
            .deploy(ff(address), ff(address), assemble(instructions));
        self
    }

    pub fn try_run(
        &self,
        calls: Vec<EnqueuedCall>,
    ) -> Result<(Vec<EnqueuedCallResult>, EventsContainer)> {
        Ok(simulate_transaction(
            &self.contract_db,
            &self.world_state,
            self.globals,
            self.settings,
            calls,
        )?)
    }

    pub fn run(&self, calls: Vec<EnqueuedCall>) -> (Vec<EnqueuedCallResult>, EventsContainer) {
        self.try_run(calls)
            .expect("simulation should not hit an internal error")
    }

    pub fn try_run_one(&self, call: EnqueuedCall) -> Result<(EnqueuedCallResult, EventsContainer)> {
        let (mut results, events) = self.try_run(vec![call])?;
        anyhow::ensure!(results.len() == 1, "expected one result, got {}", results.len());
        Ok((results.remove(0), events))
    }

    pub fn run_one(&self, call: EnqueuedCall) -> (EnqueuedCallResult, EventsContainer) {
        let (mut results, events) = self.run(vec![call]);
        assert_eq!(results.len(), 1);
        (results.remove(0), events)
    }
}
