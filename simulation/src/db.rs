//! Inbound collaborators: contract storage, world state and globals.

use ahash::AHashMap;

use crate::tagged_value::FF;

pub type AztecAddress = FF;
pub type ContractClassId = FF;

/// A deployed contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractInstance {
    pub address: AztecAddress,
    pub salt: FF,
    pub deployer: AztecAddress,
    pub current_class_id: ContractClassId,
    pub original_class_id: ContractClassId,
    pub initialisation_hash: FF,
}

/// A contract class and its public bytecode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractClass {
    pub id: ContractClassId,
    pub artifact_hash: FF,
    pub private_functions_root: FF,
    pub packed_bytecode: Vec<u8>,
}

/// Read access to deployed contracts.
pub trait ContractDb {
    fn get_contract_instance(&self, address: &AztecAddress) -> Option<ContractInstance>;
    fn get_contract_class(&self, class_id: &ContractClassId) -> Option<ContractClass>;
}

/// Tree roots attached to bytecode retrieval events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeRoots {
    pub nullifier_tree_root: FF,
    pub public_data_tree_root: FF,
}

pub trait WorldStateDb {
    fn tree_roots(&self) -> TreeRoots;
}

/// A world state frozen at fixed roots.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedWorldState(pub TreeRoots);

impl WorldStateDb for FixedWorldState {
    fn tree_roots(&self) -> TreeRoots {
        self.0
    }
}

/// An in-memory contract database.
#[derive(Debug, Clone, Default)]
pub struct RawContractDb {
    instances: AHashMap<AztecAddress, ContractInstance>,
    classes: AHashMap<ContractClassId, ContractClass>,
}

impl RawContractDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_contract_class(&mut self, class: ContractClass) {
        self.classes.insert(class.id, class);
    }

    pub fn add_contract_instance(&mut self, instance: ContractInstance) {
        self.instances.insert(instance.address, instance);
    }

    /// Registers a class holding `bytecode` and an instance of it at
    /// `address`.
    pub fn deploy(&mut self, address: AztecAddress, class_id: ContractClassId, bytecode: Vec<u8>) {
        self.add_contract_class(ContractClass {
            id: class_id,
            packed_bytecode: bytecode,
            ..Default::default()
        });
        self.add_contract_instance(ContractInstance {
            address,
            current_class_id: class_id,
            original_class_id: class_id,
            ..Default::default()
        });
    }
}

impl ContractDb for RawContractDb {
    fn get_contract_instance(&self, address: &AztecAddress) -> Option<ContractInstance> {
        self.instances.get(address).cloned()
    }

    fn get_contract_class(&self, class_id: &ContractClassId) -> Option<ContractClass> {
        self.classes.get(class_id).cloned()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasFees {
    pub fee_per_da_gas: u128,
    pub fee_per_l2_gas: u128,
}

/// Block-level values readable through `GETENVVAR`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalVariables {
    pub chain_id: FF,
    pub version: FF,
    pub block_number: u32,
    pub timestamp: u64,
    pub gas_fees: GasFees,
}
