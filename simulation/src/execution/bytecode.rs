use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use ark_ff::PrimeField;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    constants::BYTES_PER_BYTECODE_FIELD,
    db::{AztecAddress, ContractClassId, ContractDb, WorldStateDb},
    error::InternalError,
    event::{
        BytecodeDecompositionEvent, BytecodeHashingEvent, BytecodeRetrievalEvent,
        InstructionFetchingEvent,
    },
    gadgets::Poseidon2Interface,
    serialization::{deserialize_instruction, InstrDeserializationError, Instruction},
    tagged_value::FF,
};

/// Commitment to a packed bytecode.
pub type BytecodeId = FF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BytecodeRetrievalError {
    #[error("No contract instance is deployed at the address")]
    InstanceNotFound,
    #[error("The contract class of the instance is unknown")]
    ClassNotFound,
}

/// Packs `bytecode` into field elements of 31 big-endian bytes, the last one
/// padded with zeros on the right.
pub fn encode_bytecode(bytecode: &[u8]) -> Vec<FF> {
    bytecode
        .chunks(BYTES_PER_BYTECODE_FIELD)
        .map(|chunk| {
            let mut padded = [0u8; BYTES_PER_BYTECODE_FIELD];
            padded[..chunk.len()].copy_from_slice(chunk);
            FF::from_be_bytes_mod_order(&padded)
        })
        .collect()
}

/// Computes the id of `bytecode`: the Poseidon2 hash of its length followed by
/// its packed fields.
pub fn compute_bytecode_id(
    bytecode_fields: &[FF],
    bytecode_length: u32,
    poseidon2: &mut impl Poseidon2Interface,
) -> BytecodeId {
    let mut inputs = Vec::with_capacity(bytecode_fields.len() + 1);
    inputs.push(FF::from(bytecode_length));
    inputs.extend_from_slice(bytecode_fields);
    poseidon2.hash(&inputs)
}

/// Retrieves, commits to and decodes the bytecodes of one transaction.
///
/// Work is shared by every context of the transaction: a contract class is
/// hashed once, a bytecode is decomposed once and each `(bytecode_id, pc)`
/// is fetched once.
pub struct BytecodeManager<'a, C, W> {
    contract_db: &'a C,
    world_state: &'a W,
    bytecodes: AHashMap<BytecodeId, Arc<Vec<u8>>>,
    class_bytecode_ids: AHashMap<ContractClassId, BytecodeId>,
    fetched: AHashSet<(BytecodeId, u32)>,
    pub(crate) retrieval_events: Vec<BytecodeRetrievalEvent>,
    pub(crate) hashing_events: Vec<BytecodeHashingEvent>,
    pub(crate) decomposition_events: Vec<BytecodeDecompositionEvent>,
    pub(crate) fetching_events: Vec<InstructionFetchingEvent>,
}

impl<'a, C: ContractDb, W: WorldStateDb> BytecodeManager<'a, C, W> {
    pub fn new(contract_db: &'a C, world_state: &'a W) -> Self {
        Self {
            contract_db,
            world_state,
            bytecodes: AHashMap::new(),
            class_bytecode_ids: AHashMap::new(),
            fetched: AHashSet::new(),
            retrieval_events: Vec::new(),
            hashing_events: Vec::new(),
            decomposition_events: Vec::new(),
            fetching_events: Vec::new(),
        }
    }

    /// Resolves the bytecode deployed at `address`.
    pub fn get_bytecode(
        &mut self,
        address: AztecAddress,
        poseidon2: &mut impl Poseidon2Interface,
    ) -> Result<BytecodeId, BytecodeRetrievalError> {
        let mut event = BytecodeRetrievalEvent {
            bytecode_id: FF::from(0u64),
            address,
            current_class_id: FF::from(0u64),
            tree_roots: self.world_state.tree_roots(),
            error: None,
        };

        let Some(instance) = self.contract_db.get_contract_instance(&address) else {
            debug!(%address, "contract instance not found");
            return self.fail_retrieval(event, BytecodeRetrievalError::InstanceNotFound);
        };
        event.current_class_id = instance.current_class_id;

        if let Some(&bytecode_id) = self.class_bytecode_ids.get(&instance.current_class_id) {
            event.bytecode_id = bytecode_id;
            self.retrieval_events.push(event);
            return Ok(bytecode_id);
        }

        let Some(class) = self
            .contract_db
            .get_contract_class(&instance.current_class_id)
        else {
            debug!(class_id = %instance.current_class_id, "contract class not found");
            return self.fail_retrieval(event, BytecodeRetrievalError::ClassNotFound);
        };

        let bytecode_fields = encode_bytecode(&class.packed_bytecode);
        let bytecode_length = class.packed_bytecode.len() as u32;
        let bytecode_id = compute_bytecode_id(&bytecode_fields, bytecode_length, poseidon2);
        self.hashing_events.push(BytecodeHashingEvent {
            bytecode_id,
            bytecode_length,
            bytecode_fields,
        });
        self.class_bytecode_ids
            .insert(instance.current_class_id, bytecode_id);

        if !self.bytecodes.contains_key(&bytecode_id) {
            trace!(%bytecode_id, bytecode_length, "decomposing bytecode");
            let bytecode = Arc::new(class.packed_bytecode);
            self.decomposition_events.push(BytecodeDecompositionEvent {
                bytecode_id,
                bytecode: Arc::clone(&bytecode),
            });
            self.bytecodes.insert(bytecode_id, bytecode);
        }

        event.bytecode_id = bytecode_id;
        self.retrieval_events.push(event);
        Ok(bytecode_id)
    }

    fn fail_retrieval(
        &mut self,
        mut event: BytecodeRetrievalEvent,
        error: BytecodeRetrievalError,
    ) -> Result<BytecodeId, BytecodeRetrievalError> {
        event.error = Some(error);
        self.retrieval_events.push(event);
        Err(error)
    }

    /// Decodes the instruction at `pc` of an already retrieved bytecode.
    pub fn read_instruction(
        &mut self,
        bytecode_id: BytecodeId,
        pc: u32,
    ) -> Result<Result<Instruction, InstrDeserializationError>, InternalError> {
        let bytecode = self
            .bytecodes
            .get(&bytecode_id)
            .ok_or(InternalError::UnknownBytecodeId(bytecode_id))?;
        let result = deserialize_instruction(bytecode, pc as usize);

        if self.fetched.insert((bytecode_id, pc)) {
            self.fetching_events.push(InstructionFetchingEvent {
                bytecode_id,
                pc,
                instruction: result.as_ref().ok().cloned(),
                bytecode: Arc::clone(bytecode),
                error: result.as_ref().err().copied(),
            });
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{FixedWorldState, RawContractDb},
        gadgets::Poseidon2,
        opcodes::WireOpCode,
        serialization::Operand,
    };

    fn ff(v: u64) -> FF {
        FF::from(v)
    }

    fn sample_bytecode() -> Vec<u8> {
        let mut bytecode = Instruction::new(
            WireOpCode::Set8,
            0,
            [Operand::U8(1), Operand::U8(4), Operand::U8(5)],
        )
        .serialize()
        .unwrap();
        bytecode.extend(
            Instruction::new(WireOpCode::Return, 0, [Operand::U16(0), Operand::U16(1)])
                .serialize()
                .unwrap(),
        );
        bytecode
    }

    #[test]
    fn test_encode_bytecode() {
        let bytecode: Vec<u8> = (1..=32).collect();
        let fields = encode_bytecode(&bytecode);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], FF::from_be_bytes_mod_order(&bytecode[..31]));
        let mut last = [0u8; 31];
        last[0] = 32;
        assert_eq!(fields[1], FF::from_be_bytes_mod_order(&last));
        assert!(encode_bytecode(&[]).is_empty());
    }

    #[test]
    fn test_retrieval_is_deduplicated() {
        let mut db = RawContractDb::new();
        db.deploy(ff(1), ff(10), sample_bytecode());
        // A second instance of the same class.
        db.deploy(ff(2), ff(10), sample_bytecode());
        let world_state = FixedWorldState::default();
        let mut poseidon2 = Poseidon2::default();
        let mut manager = BytecodeManager::new(&db, &world_state);

        let id_a = manager.get_bytecode(ff(1), &mut poseidon2).unwrap();
        let id_b = manager.get_bytecode(ff(2), &mut poseidon2).unwrap();
        assert_eq!(id_a, id_b);
        assert_eq!(manager.retrieval_events.len(), 2);
        assert_eq!(manager.hashing_events.len(), 1);
        assert_eq!(manager.decomposition_events.len(), 1);
        assert_eq!(
            manager.hashing_events[0].bytecode_length as usize,
            sample_bytecode().len()
        );
    }

    #[test]
    fn test_same_bytecode_in_two_classes_is_decomposed_once() {
        let mut db = RawContractDb::new();
        db.deploy(ff(1), ff(10), sample_bytecode());
        db.deploy(ff(2), ff(11), sample_bytecode());
        let world_state = FixedWorldState::default();
        let mut poseidon2 = Poseidon2::default();
        let mut manager = BytecodeManager::new(&db, &world_state);

        manager.get_bytecode(ff(1), &mut poseidon2).unwrap();
        manager.get_bytecode(ff(2), &mut poseidon2).unwrap();
        assert_eq!(manager.hashing_events.len(), 2);
        assert_eq!(manager.decomposition_events.len(), 1);
    }

    #[test]
    fn test_missing_instance() {
        let db = RawContractDb::new();
        let world_state = FixedWorldState::default();
        let mut poseidon2 = Poseidon2::default();
        let mut manager = BytecodeManager::new(&db, &world_state);

        let result = manager.get_bytecode(ff(3), &mut poseidon2);
        assert_eq!(result, Err(BytecodeRetrievalError::InstanceNotFound));
        assert_eq!(
            manager.retrieval_events[0].error,
            Some(BytecodeRetrievalError::InstanceNotFound)
        );
        assert!(manager.hashing_events.is_empty());
    }

    #[test]
    fn test_fetching_is_deduplicated() {
        let mut db = RawContractDb::new();
        db.deploy(ff(1), ff(10), sample_bytecode());
        let world_state = FixedWorldState::default();
        let mut poseidon2 = Poseidon2::default();
        let mut manager = BytecodeManager::new(&db, &world_state);
        let id = manager.get_bytecode(ff(1), &mut poseidon2).unwrap();

        let first = manager.read_instruction(id, 0).unwrap().unwrap();
        assert_eq!(first.opcode, WireOpCode::Set8);
        manager.read_instruction(id, 0).unwrap().unwrap();
        let second = manager
            .read_instruction(id, first.size_in_bytes() as u32)
            .unwrap()
            .unwrap();
        assert_eq!(second.opcode, WireOpCode::Return);
        assert_eq!(manager.fetching_events.len(), 2);

        let out_of_range = manager.read_instruction(id, 1000).unwrap();
        assert_eq!(out_of_range, Err(InstrDeserializationError::PcOutOfRange));
        assert_eq!(
            manager.fetching_events[2].error,
            Some(InstrDeserializationError::PcOutOfRange)
        );
    }

    #[test]
    fn test_unknown_bytecode_is_internal() {
        let db = RawContractDb::new();
        let world_state = FixedWorldState::default();
        let mut manager = BytecodeManager::new(&db, &world_state);
        assert_eq!(
            manager.read_instruction(ff(5), 0),
            Err(InternalError::UnknownBytecodeId(ff(5)))
        );
    }
}
