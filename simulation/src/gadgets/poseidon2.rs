//! Poseidon2 over BN254 with width 4, as used for bytecode commitments and the
//! POSEIDON2PERM opcode.

use ark_ff::{AdditiveGroup, Field};
use thiserror::Error;

use super::{
    poseidon2_params::{INTERNAL_DIAGONAL, ROUND_CONSTANTS},
    range_check::RangeCheck,
};
use crate::{
    constants::POSEIDON2_STATE_SIZE,
    error::InternalError,
    event::{
        EventEmitter, MemoryEvent, Poseidon2HashEvent, Poseidon2PermutationEvent,
        Poseidon2PermutationMemoryEvent,
    },
    memory::{Memory, MemoryAddress},
    tagged_value::{TaggedValue, ValueTag, FF},
};

const WIDTH: usize = 4;
const RATE: usize = 3;
const FULL_ROUNDS: usize = 8;
const PARTIAL_ROUNDS: usize = 56;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Poseidon2Error {
    #[error("Poseidon2 source out of range")]
    SrcOutOfRange,
    #[error("Poseidon2 destination out of range")]
    DstOutOfRange,
    /// A state element is not a field element.
    #[error("Poseidon2 input at {addr} has tag {tag}")]
    InvalidInputTag { addr: MemoryAddress, tag: ValueTag },
}

const fn is_full_round(round: usize) -> bool {
    round < FULL_ROUNDS / 2 || round >= FULL_ROUNDS / 2 + PARTIAL_ROUNDS
}

fn sbox(x: &mut FF) {
    let x2 = x.square();
    let x4 = x2.square();
    *x *= x4;
}

/// Multiplication by the 4x4 MDS matrix of the external rounds.
fn external_matmul(state: &mut [FF; WIDTH]) {
    let [x0, x1, x2, x3] = *state;
    let t0 = x0 + x1;
    let t1 = x2 + x3;
    let t2 = x1.double() + t1;
    let t3 = x3.double() + t0;
    let t4 = t1.double().double() + t3;
    let t5 = t0.double().double() + t2;
    let t6 = t3 + t5;
    let t7 = t2 + t4;
    *state = [t6, t5, t7, t4];
}

fn internal_matmul(state: &mut [FF; WIDTH], diagonal: &[FF; WIDTH]) {
    let sum: FF = state.iter().sum();
    for (x, d) in state.iter_mut().zip(diagonal) {
        *x = *x * d + sum;
    }
}

/// Applies the Poseidon2 permutation, without recording anything.
pub fn permute(input: [FF; WIDTH]) -> [FF; WIDTH] {
    let mut state = input;
    external_matmul(&mut state);

    for (round, constants) in ROUND_CONSTANTS.iter().enumerate() {
        if is_full_round(round) {
            for (x, c) in state.iter_mut().zip(constants) {
                *x += c;
                sbox(x);
            }
            external_matmul(&mut state);
        } else {
            state[0] += constants[0];
            sbox(&mut state[0]);
            internal_matmul(&mut state, &INTERNAL_DIAGONAL);
        }
    }
    state
}

pub trait Poseidon2Interface {
    fn permutation(&mut self, input: [FF; WIDTH]) -> [FF; WIDTH];

    /// Sponge hash with rate 3, the input length being the domain separator.
    fn hash(&mut self, inputs: &[FF]) -> FF;
}

#[derive(Debug, Default, Clone)]
pub struct Poseidon2 {
    pub(crate) perm_events: Vec<Poseidon2PermutationEvent>,
    pub(crate) hash_events: Vec<Poseidon2HashEvent>,
    pub(crate) perm_mem_events: Vec<Poseidon2PermutationMemoryEvent>,
}

impl Poseidon2 {
    pub fn perm_events(&self) -> &[Poseidon2PermutationEvent] {
        &self.perm_events
    }

    pub fn hash_events(&self) -> &[Poseidon2HashEvent] {
        &self.hash_events
    }

    pub fn perm_mem_events(&self) -> &[Poseidon2PermutationMemoryEvent] {
        &self.perm_mem_events
    }

    /// Permutes the four field elements at `src_addr` into `dst_addr`.
    pub fn permutation_with_memory(
        &mut self,
        memory: &mut Memory,
        src_addr: MemoryAddress,
        dst_addr: MemoryAddress,
        execution_clk: u32,
        memory_events: &mut impl EventEmitter<MemoryEvent>,
        range_check: &mut RangeCheck,
    ) -> Result<Result<(), Poseidon2Error>, InternalError> {
        let mut event = Poseidon2PermutationMemoryEvent {
            execution_clk,
            space_id: memory.space_id(),
            src_addr,
            dst_addr,
            input: Vec::new(),
            output: None,
            error: None,
        };

        let size = POSEIDON2_STATE_SIZE as u64;
        let error = if !range_check.check_region_end(src_addr as u64 + size)? {
            Some(Poseidon2Error::SrcOutOfRange)
        } else if !range_check.check_region_end(dst_addr as u64 + size)? {
            Some(Poseidon2Error::DstOutOfRange)
        } else {
            None
        };

        let mut input = [FF::from(0u64); WIDTH];
        if error.is_none() {
            for i in 0..POSEIDON2_STATE_SIZE {
                event
                    .input
                    .push(memory.get(src_addr + i, execution_clk, memory_events));
            }
        }
        let error = error.or_else(|| {
            event.input.iter().enumerate().find_map(|(i, value)| match value {
                TaggedValue::FF(x) => {
                    input[i] = *x;
                    None
                }
                other => Some(Poseidon2Error::InvalidInputTag {
                    addr: src_addr + i as u32,
                    tag: other.tag(),
                }),
            })
        });
        if let Some(error) = error {
            event.error = Some(error);
            self.perm_mem_events.push(event);
            return Ok(Err(error));
        }

        let output = self.permutation(input);
        for (i, x) in output.iter().enumerate() {
            memory.set(
                dst_addr + i as u32,
                TaggedValue::FF(*x),
                execution_clk,
                memory_events,
            );
        }
        event.output = Some(output);
        self.perm_mem_events.push(event);
        Ok(Ok(()))
    }
}

impl Poseidon2Interface for Poseidon2 {
    fn permutation(&mut self, input: [FF; WIDTH]) -> [FF; WIDTH] {
        let output = permute(input);
        self.perm_events
            .push(Poseidon2PermutationEvent { input, output });
        output
    }

    fn hash(&mut self, inputs: &[FF]) -> FF {
        let mut state = [FF::from(0u64); WIDTH];
        state[RATE] = FF::from((inputs.len() as u128) << 64);

        let mut intermediate_states = Vec::with_capacity(inputs.len().div_ceil(RATE).max(1));
        let mut blocks = inputs.chunks(RATE).peekable();
        if blocks.peek().is_none() {
            state = self.permutation(state);
            intermediate_states.push(state);
        }
        for block in blocks {
            for (x, input) in state.iter_mut().zip(block) {
                *x += input;
            }
            state = self.permutation(state);
            intermediate_states.push(state);
        }

        let output = state[0];
        self.hash_events.push(Poseidon2HashEvent {
            inputs: inputs.to_vec(),
            intermediate_states,
            output,
        });
        output
    }
}

#[cfg(test)]
mod tests {
    use ark_ff::MontFp;

    use super::*;
    use crate::event::MemoryMode;

    fn ff(v: u64) -> FF {
        FF::from(v)
    }

    #[test]
    fn test_reference_vector() {
        let output = permute([ff(0), ff(1), ff(2), ff(3)]);
        let expected: [FF; WIDTH] = [
            MontFp!("786823568102245344938517132468097745676732687098822989626730198331658606391"),
            MontFp!("16105493617470833344375945651585194737369509580406730765188791202038211593826"),
            MontFp!("2169165722086073256768101917994796590773204847633762971322389403847680713675"),
            MontFp!("20837792685223053096472825292260687493226094382304778455120670180090619921530"),
        ];
        assert_eq!(output, expected);
    }

    #[test]
    fn test_round_constants_shape() {
        assert_eq!(ROUND_CONSTANTS.len(), FULL_ROUNDS + PARTIAL_ROUNDS);
        for (round, constants) in ROUND_CONSTANTS.iter().enumerate() {
            if !is_full_round(round) {
                assert!(constants[1..].iter().all(|c| *c == FF::ZERO));
            }
        }
    }

    #[test]
    fn test_external_matmul() {
        // The MDS matrix is [[5,7,1,3],[4,6,1,1],[1,3,5,7],[1,1,4,6]].
        let mut state = [ff(1), ff(0), ff(0), ff(0)];
        external_matmul(&mut state);
        assert_eq!(state, [ff(5), ff(4), ff(1), ff(1)]);

        let mut state = [ff(0), ff(0), ff(0), ff(1)];
        external_matmul(&mut state);
        assert_eq!(state, [ff(3), ff(1), ff(7), ff(6)]);
    }

    #[test]
    fn test_permutation_records_events() {
        let mut poseidon2 = Poseidon2::default();
        let input = [ff(0), ff(1), ff(2), ff(3)];
        let output = poseidon2.permutation(input);
        assert_eq!(output, permute(input));
        assert_ne!(output, input);
        assert_eq!(
            poseidon2.perm_events(),
            &[Poseidon2PermutationEvent { input, output }]
        );
    }

    #[test]
    fn test_hash_is_length_separated() {
        let mut poseidon2 = Poseidon2::default();
        let short = poseidon2.hash(&[ff(1), ff(2)]);
        let padded = poseidon2.hash(&[ff(1), ff(2), ff(0)]);
        assert_ne!(short, padded);

        let events = poseidon2.hash_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].intermediate_states.len(), 1);
        assert_eq!(events[0].output, short);
    }

    #[test]
    fn test_hash_absorbs_in_blocks() {
        let mut poseidon2 = Poseidon2::default();
        let inputs: Vec<FF> = (1..=7).map(ff).collect();
        poseidon2.hash(&inputs);
        assert_eq!(poseidon2.hash_events()[0].intermediate_states.len(), 3);
        assert_eq!(poseidon2.perm_events().len(), 3);

        poseidon2.hash(&[]);
        assert_eq!(poseidon2.perm_events().len(), 4);
    }

    #[test]
    fn test_permutation_with_memory() {
        let mut poseidon2 = Poseidon2::default();
        let mut range_check = RangeCheck::default();
        let mut memory = Memory::new(1);
        let mut memory_events: Vec<MemoryEvent> = Vec::new();
        for i in 0..4 {
            memory.set(i, TaggedValue::FF(ff(i as u64)), 0, &mut memory_events);
        }
        memory_events.clear();

        poseidon2
            .permutation_with_memory(&mut memory, 0, 10, 1, &mut memory_events, &mut range_check)
            .unwrap()
            .unwrap();

        let expected = permute([ff(0), ff(1), ff(2), ff(3)]);
        assert_eq!(memory_events.len(), 8);
        assert_eq!(memory_events[4].mode, MemoryMode::Write);
        assert_eq!(memory_events[4].value, TaggedValue::FF(expected[0]));
        assert_eq!(poseidon2.perm_mem_events()[0].output, Some(expected));
    }

    #[test]
    fn test_permutation_with_memory_rejects_integers() {
        let mut poseidon2 = Poseidon2::default();
        let mut range_check = RangeCheck::default();
        let mut memory = Memory::new(1);
        let mut memory_events: Vec<MemoryEvent> = Vec::new();
        memory.set(2, TaggedValue::U8(1), 0, &mut memory_events);

        let result = poseidon2
            .permutation_with_memory(&mut memory, 0, 10, 1, &mut memory_events, &mut range_check)
            .unwrap();
        assert_eq!(
            result,
            Err(Poseidon2Error::InvalidInputTag {
                addr: 2,
                tag: ValueTag::U8
            })
        );
        assert!(poseidon2.perm_events().is_empty());
    }
}
