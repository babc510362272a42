//! Nested calls between contracts and bytecode sharing across enqueued calls.

pub mod common;

use anyhow::{Context, Result};
use avm_simulation::{
    event::{ExecutionErrorKind, ExecutionEvent, EventsContainer},
    ContractInstance, Gas, Instruction, Operand, TaggedValue, WireOpCode,
};
use common::*;

const PARENT: u64 = 0x1000;
const CHILD: u64 = 0x2000;

fn find_step(events: &EventsContainer, opcode: WireOpCode) -> Result<&ExecutionEvent> {
    events
        .execution
        .iter()
        .find(|event| {
            event
                .wire_instruction
                .as_ref()
                .is_some_and(|instruction| instruction.opcode == opcode)
        })
        .with_context(|| format!("no {opcode} step"))
}

fn first_step_of(events: &EventsContainer, context_id: u32) -> Result<&ExecutionEvent> {
    events
        .execution
        .iter()
        .find(|event| event.before_context_event.id == context_id)
        .with_context(|| format!("context {context_id} never ran"))
}

/// Stores the arguments of a call at addresses 1 to 4.
fn call_args(l2_gas: u32, da_gas: u32, address: u64, cd_size: u32) -> Vec<Instruction> {
    vec![
        set32(1, l2_gas),
        set32(2, da_gas),
        set_ff(3, ff(address)),
        set32(4, cd_size),
    ]
}

#[test]
fn test_call_to_missing_contract() -> Result<()> {
    let mut program = call_args(100, 0, 0xdead, 0);
    program.extend([
        call(WireOpCode::Call, 1, 0),
        Instruction::new(WireOpCode::SuccessCopy, 0, [Operand::U16(6)]),
        set32(7, 1),
        ret(7, 6),
    ]);
    let mut runner = TestRunner::default();
    runner.deploy(PARENT, &program);

    let gas_limit = Gas::new(1_000, 1_000);
    let (result, events) = runner.try_run_one(enqueued(PARENT, vec![], gas_limit))?;

    // The parent carries on after its child reverted.
    assert!(result.success);
    assert_eq!(result.returndata, vec![TaggedValue::U1(false)]);
    // 4 SETs and CALL, the whole child limit, SUCCESSCOPY, SET and RETURN.
    assert_eq!(result.gas_used, Gas::new(9 * 5 + 100 + 9 + 9 + 12, 0));

    let child_steps: Vec<_> = events
        .execution
        .iter()
        .filter(|event| event.before_context_event.id == 2)
        .collect();
    assert_eq!(child_steps.len(), 1);
    assert_eq!(child_steps[0].error, ExecutionErrorKind::BytecodeNotFound);
    assert_eq!(child_steps[0].before_context_event.parent_id, 1);
    assert_eq!(child_steps[0].after_context_event.gas_used, Gas::new(100, 0));
    assert_eq!(child_steps[0].after_context_event.gas_limit, Gas::new(100, 0));

    assert_eq!(events.context_stack.len(), 1);
    assert_eq!(events.context_stack[0].entered_context_id, 2);
    assert_eq!(events.context_stack[0].parent.id, 1);

    let success_copy = find_step(&events, WireOpCode::SuccessCopy)?;
    assert!(!success_copy.before_context_event.last_child_success);
    assert_eq!(success_copy.before_context_event.id, 1);

    Ok(())
}

#[test]
fn test_call_gas_is_clamped() -> Result<()> {
    let mut program = call_args(u32::MAX, u32::MAX, 0xdead, 0);
    program.extend([call(WireOpCode::Call, 1, 0), set32(5, 0), ret(5, 0)]);
    let mut runner = TestRunner::default();
    runner.deploy(PARENT, &program);

    let gas_limit = Gas::new(1_000, 50);
    let (result, events) = runner.try_run_one(enqueued(PARENT, vec![], gas_limit))?;

    // The child gets everything left after the CALL itself was charged.
    let child = first_step_of(&events, 2)?;
    assert_eq!(child.before_context_event.gas_limit, Gas::new(1_000 - 45, 50));
    assert_eq!(child.before_context_event.parent_gas_used, Gas::new(45, 0));

    // The failing child consumed all of it, so the parent cannot go on.
    assert!(!result.success);
    assert_eq!(result.gas_used, gas_limit);
    let last = events.execution.last().context("no steps")?;
    assert_eq!(last.before_context_event.id, 1);
    assert_eq!(last.error, ExecutionErrorKind::Gas);

    Ok(())
}

#[test]
fn test_static_call_returns_data() -> Result<()> {
    // The child returns whether it runs in a static context.
    let child = [get_env_var(1, 9), set32(2, 1), ret(2, 1)];

    let mut parent = call_args(10_000, 0, CHILD, 0);
    parent.extend([
        call(WireOpCode::StaticCall, 1, 0),
        Instruction::new(WireOpCode::ReturndataSize, 0, [Operand::U16(6)]),
        set32(7, 0),
        binary(WireOpCode::ReturndataCopy, 6, 7, 10),
        ret(6, 10),
    ]);

    let mut runner = TestRunner::default();
    runner.deploy(PARENT, &parent).deploy(CHILD, &child);
    let (result, events) = runner.try_run_one(enqueued(PARENT, vec![], DEFAULT_GAS_LIMIT))?;
    assert!(result.success);
    assert_eq!(result.returndata, vec![TaggedValue::U1(true)]);

    let copy = &events.data_copy[0];
    assert_eq!(copy.read_context_id, 2);
    assert_eq!(copy.write_context_id, 1);
    assert!(copy.is_nested);
    assert_eq!(copy.copying_data, vec![TaggedValue::U1(true)]);

    Ok(())
}

#[test]
fn test_nested_calldata_and_revert() -> Result<()> {
    // The child copies its two calldata values and reverts with them.
    let child = [
        set32(1, 2),
        set32(2, 0),
        binary(WireOpCode::CalldataCopy, 1, 2, 10),
        revert(1, 10),
    ];

    let mut parent = vec![set32(20, 11), set32(21, 22)];
    parent.extend(call_args(10_000, 0, CHILD, 2));
    parent.extend([
        call(WireOpCode::Call, 1, 20),
        Instruction::new(WireOpCode::SuccessCopy, 0, [Operand::U16(30)]),
        Instruction::new(WireOpCode::ReturndataSize, 0, [Operand::U16(31)]),
        set32(32, 2),
        ret(32, 30),
    ]);

    let mut runner = TestRunner::default();
    runner.deploy(PARENT, &parent).deploy(CHILD, &child);
    let (result, events) = runner.try_run_one(enqueued(PARENT, vec![], DEFAULT_GAS_LIMIT))?;
    assert!(result.success);
    assert_eq!(
        result.returndata,
        vec![TaggedValue::U1(false), TaggedValue::U32(2)]
    );

    let copy = &events.data_copy[0];
    assert_eq!(copy.read_context_id, 1);
    assert_eq!(copy.data_addr, 20);
    assert_eq!(
        copy.copying_data,
        vec![TaggedValue::U32(11), TaggedValue::U32(22)]
    );

    // A REVERT does not consume the whole child limit.
    let revert_step = find_step(&events, WireOpCode::Revert16)?;
    assert!(revert_step.success());
    assert_eq!(
        revert_step.after_context_event.gas_used,
        Gas::new(9 + 9 + (9 + 6) + (9 + 6), 0)
    );

    Ok(())
}

#[test]
fn test_bytecode_work_is_shared_between_enqueued_calls() -> Result<()> {
    let program = [set32(1, 0), ret(1, 0)];
    let mut runner = TestRunner::default();
    runner.deploy(PARENT, &program);
    // A second instance of the same class.
    runner.contract_db.add_contract_instance(ContractInstance {
        address: ff(CHILD),
        current_class_id: ff(PARENT),
        original_class_id: ff(PARENT),
        ..Default::default()
    });

    let (results, events) = runner.try_run(vec![
        enqueued(PARENT, vec![], DEFAULT_GAS_LIMIT),
        enqueued(CHILD, vec![], DEFAULT_GAS_LIMIT),
        enqueued(PARENT, vec![], DEFAULT_GAS_LIMIT),
    ])?;
    assert!(results.iter().all(|result| result.success));

    assert_eq!(events.bytecode_retrieval.len(), 3);
    assert_eq!(events.bytecode_hashing.len(), 1);
    assert_eq!(events.bytecode_decomposition.len(), 1);
    assert_eq!(events.instruction_fetching.len(), 2);
    let ids: Vec<_> = events
        .bytecode_retrieval
        .iter()
        .map(|event| event.bytecode_id)
        .collect();
    assert!(ids.iter().all(|id| *id == ids[0]));

    // Context ids keep increasing across enqueued calls.
    let context_ids: Vec<_> = events
        .execution
        .iter()
        .map(|event| event.before_context_event.id)
        .collect();
    assert_eq!(context_ids, vec![1, 1, 2, 2, 3, 3]);

    Ok(())
}
