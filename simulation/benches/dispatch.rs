use avm_simulation::{
    event::{MemoryEvent, NoopEventEmitter}, simulate_transaction, EnqueuedCall, ExecutionSettings,
    FixedWorldState, Gas, GlobalVariables, Instruction, Memory, Operand, RawContractDb,
    TaggedValue, ValueTag, WireOpCode, FF,
};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

const STEP_COUNTS: [usize; 3] = [100, 1_000, 10_000];
const REGISTERS: u16 = 8;
const CONTRACT: u64 = 0xbe4c;

// Closed over U32 so that random programs never hit a tag mismatch.
const ALU_OPCODES: [WireOpCode; 6] = [
    WireOpCode::Add16,
    WireOpCode::Sub16,
    WireOpCode::Mul16,
    WireOpCode::And16,
    WireOpCode::Or16,
    WireOpCode::Xor16,
];

fn random_program(rng: &mut StdRng, steps: usize) -> Vec<u8> {
    let mut instructions = (1..=REGISTERS)
        .map(|dst| {
            Instruction::new(
                WireOpCode::Set32,
                0,
                [
                    Operand::U16(dst),
                    Operand::U8(ValueTag::U32.into()),
                    Operand::U32(rng.random_range(0..=u32::MAX)),
                ],
            )
        })
        .collect::<Vec<_>>();

    for _ in 0..steps {
        let opcode = ALU_OPCODES[rng.random_range(0..ALU_OPCODES.len())];
        instructions.push(Instruction::new(
            opcode,
            0,
            [
                Operand::U16(rng.random_range(1..=REGISTERS)),
                Operand::U16(rng.random_range(1..=REGISTERS)),
                Operand::U16(rng.random_range(1..=REGISTERS)),
            ],
        ));
    }
    // Returns the first register.
    instructions.push(Instruction::new(
        WireOpCode::Set32,
        0,
        [
            Operand::U16(REGISTERS + 1),
            Operand::U8(ValueTag::U32.into()),
            Operand::U32(1),
        ],
    ));
    instructions.push(Instruction::new(
        WireOpCode::Return,
        0,
        [Operand::U16(REGISTERS + 1), Operand::U16(1)],
    ));

    instructions
        .iter()
        .flat_map(|instruction| instruction.serialize().unwrap())
        .collect()
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("ALU Dispatch");

    for &n in &STEP_COUNTS {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_batched(
                || {
                    let mut rng = StdRng::seed_from_u64(42);
                    let mut contract_db = RawContractDb::new();
                    let address = FF::from(CONTRACT);
                    contract_db.deploy(address, address, random_program(&mut rng, n));
                    contract_db
                },
                |contract_db| {
                    let call = EnqueuedCall {
                        contract_address: FF::from(CONTRACT),
                        msg_sender: FF::from(0u64),
                        calldata: vec![],
                        is_static: false,
                        gas_limit: Gas::new(1 << 30, 1 << 30),
                        transaction_fee: FF::from(0u64),
                    };
                    let (results, _events) = simulate_transaction(
                        &contract_db,
                        &FixedWorldState::default(),
                        GlobalVariables::default(),
                        ExecutionSettings::default(),
                        [call],
                    )
                    .unwrap();
                    assert!(results[0].success);
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn bench_memory_accesses(c: &mut Criterion) {
    let mut group = c.benchmark_group("Memory Accesses");

    for &n in &STEP_COUNTS {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_batched(
                || {
                    let mut rng = StdRng::seed_from_u64(123);
                    (0..n)
                        .map(|_| {
                            (
                                rng.random_range(0..=u32::MAX),
                                TaggedValue::U32(rng.random_range(0..=u32::MAX)),
                            )
                        })
                        .collect::<Vec<_>>()
                },
                |accesses| {
                    let mut memory = Memory::new(1);
                    let mut events: Vec<MemoryEvent> = Vec::with_capacity(2 * accesses.len());
                    for (clk, &(addr, value)) in accesses.iter().enumerate() {
                        memory.set(addr, value, clk as u32, &mut events);
                        let _ = memory.get(addr, clk as u32, &mut NoopEventEmitter);
                    }
                    events
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(dispatch, bench_dispatch, bench_memory_accesses);
criterion_main!(dispatch);
