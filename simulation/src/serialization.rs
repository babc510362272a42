//! Instruction encoding and decoding.

use std::fmt;

use ark_ff::PrimeField;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    constants::{DECODE_WINDOW_SIZE, MAX_OPERANDS},
    error::InternalError,
    instruction_info::{InstructionInfo, InstructionInfoDb},
    opcodes::{ExecutionOpCode, OperandType, WireOpCode, LAST_OPCODE_SENTINEL},
    tagged_value::{ff_to_be_bytes, ff_to_u128, ValueTag, FF},
};

/// A raw operand, sized to its wire encoding.
///
/// Accessors widen freely; narrowing a value fails with an internal error.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum Operand {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    FF(FF),
}

impl fmt::Debug for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::U8(v) => write!(f, "{v}u8"),
            Operand::U16(v) => write!(f, "{v}u16"),
            Operand::U32(v) => write!(f, "{v}u32"),
            Operand::U64(v) => write!(f, "{v}u64"),
            Operand::U128(v) => write!(f, "{v}u128"),
            Operand::FF(v) => write!(f, "{v}ff"),
        }
    }
}

macro_rules! widening_accessor {
    ($name:ident, $ty:ty, $($variant:ident),+) => {
        pub fn $name(&self) -> Result<$ty, InternalError> {
            match self {
                $(Operand::$variant(v) => Ok(<$ty>::from(*v)),)+
                _ => Err(InternalError::OperandNarrowing {
                    operand: *self,
                    target: stringify!($ty),
                }),
            }
        }
    };
}

impl Operand {
    widening_accessor!(as_u8, u8, U8);
    widening_accessor!(as_u16, u16, U8, U16);
    widening_accessor!(as_u32, u32, U8, U16, U32);
    widening_accessor!(as_u64, u64, U8, U16, U32, U64);
    widening_accessor!(as_u128, u128, U8, U16, U32, U64, U128);

    pub fn as_ff(&self) -> FF {
        match self {
            Operand::FF(v) => *v,
            _ => FF::from(self.to_u128_lossless()),
        }
    }

    fn to_u128_lossless(self) -> u128 {
        match self {
            Operand::U8(v) => v as u128,
            Operand::U16(v) => v as u128,
            Operand::U32(v) => v as u128,
            Operand::U64(v) => v as u128,
            Operand::U128(v) => v,
            Operand::FF(v) => ff_to_u128(&v).unwrap_or(u128::MAX),
        }
    }

    /// Returns the value as a memory address if it fits in 32 bits.
    pub fn as_address(&self) -> Option<u32> {
        u32::try_from(self.to_u128_lossless()).ok()
    }

    /// Interprets the operand as a tag byte.
    pub fn as_tag(&self) -> Result<ValueTag, InternalError> {
        let raw = self.as_u8()?;
        ValueTag::try_from(raw).map_err(|_| InternalError::InvalidTagOperand(raw))
    }
}

/// Operands of one instruction.
pub type Operands = SmallVec<[Operand; MAX_OPERANDS]>;

/// A decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: WireOpCode,
    /// Two bits per operand: bit `2i` marks operand `i` indirect, bit `2i + 1`
    /// marks it relative.
    pub indirect: u16,
    pub operands: Operands,
}

impl Instruction {
    pub fn new(opcode: WireOpCode, indirect: u16, operands: impl IntoIterator<Item = Operand>) -> Self {
        Self {
            opcode,
            indirect,
            operands: operands.into_iter().collect(),
        }
    }

    pub fn size_in_bytes(&self) -> usize {
        self.opcode.instruction_size()
    }

    pub fn execution_opcode(&self) -> ExecutionOpCode {
        InstructionInfoDb.execution_opcode(self.opcode)
    }

    pub const fn is_indirect(&self, operand_idx: usize) -> bool {
        (self.indirect >> (2 * operand_idx)) & 1 == 1
    }

    pub const fn is_relative(&self, operand_idx: usize) -> bool {
        (self.indirect >> (2 * operand_idx + 1)) & 1 == 1
    }

    /// Serializes the instruction following the wire format of its opcode.
    pub fn serialize(&self) -> Result<Vec<u8>, InternalError> {
        let mut bytes = Vec::with_capacity(self.size_in_bytes());
        bytes.push(u8::from(self.opcode));

        let mut operands = self.operands.iter();
        let mut next_operand = || {
            operands
                .next()
                .ok_or(InternalError::MissingOperand(self.opcode))
        };

        for operand_type in self.opcode.format() {
            match operand_type {
                OperandType::Indirect8 => {
                    let indirect = u8::try_from(self.indirect)
                        .map_err(|_| InternalError::IndirectOverflow(self.opcode))?;
                    bytes.push(indirect);
                }
                OperandType::Indirect16 => bytes.extend(self.indirect.to_be_bytes()),
                OperandType::Tag | OperandType::UInt8 => bytes.push(next_operand()?.as_u8()?),
                OperandType::UInt16 => bytes.extend(next_operand()?.as_u16()?.to_be_bytes()),
                OperandType::UInt32 => bytes.extend(next_operand()?.as_u32()?.to_be_bytes()),
                OperandType::UInt64 => bytes.extend(next_operand()?.as_u64()?.to_be_bytes()),
                OperandType::UInt128 => bytes.extend(next_operand()?.as_u128()?.to_be_bytes()),
                OperandType::FF => {
                    let value = next_operand()?.as_ff();
                    let encoded = ff_to_be_bytes(&value);
                    bytes.resize(bytes.len() + 32 - encoded.len(), 0);
                    bytes.extend(encoded);
                }
            }
        }

        Ok(bytes)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} indirect: {}", self.opcode, self.indirect)?;
        for operand in &self.operands {
            write!(f, " {operand:?}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InstrDeserializationError {
    /// The program counter points past the end of the bytecode.
    #[error("PC out of range")]
    PcOutOfRange,
    /// The opcode byte does not name a wire opcode.
    #[error("Opcode out of range")]
    OpcodeOutOfRange,
    /// The instruction does not fit in the bytes left in the decode window.
    #[error("Instruction out of range")]
    InstructionOutOfRange,
    /// A tag operand does not name a known tag.
    #[error("Tag out of range")]
    TagOutOfRange,
}

fn read_be<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut buffer = [0u8; N];
    buffer.copy_from_slice(&bytes[..N]);
    buffer
}

/// Decodes the instruction starting at `pc`.
pub fn deserialize_instruction(
    bytecode: &[u8],
    pc: usize,
) -> Result<Instruction, InstrDeserializationError> {
    if pc >= bytecode.len() {
        return Err(InstrDeserializationError::PcOutOfRange);
    }

    let opcode_byte = bytecode[pc];
    if opcode_byte >= LAST_OPCODE_SENTINEL {
        return Err(InstrDeserializationError::OpcodeOutOfRange);
    }
    let opcode = WireOpCode::try_from(opcode_byte)
        .map_err(|_| InstrDeserializationError::OpcodeOutOfRange)?;

    let remaining = bytecode.len() - pc;
    let window = remaining.min(DECODE_WINDOW_SIZE);
    if opcode.instruction_size() > window {
        return Err(InstrDeserializationError::InstructionOutOfRange);
    }

    let mut indirect = 0u16;
    let mut operands = Operands::new();
    let mut cursor = pc + 1;

    for operand_type in opcode.format() {
        let bytes = &bytecode[cursor..];
        match operand_type {
            OperandType::Indirect8 => indirect = bytes[0] as u16,
            OperandType::Indirect16 => indirect = u16::from_be_bytes(read_be(bytes)),
            OperandType::Tag => {
                if ValueTag::try_from(bytes[0]).is_err() {
                    return Err(InstrDeserializationError::TagOutOfRange);
                }
                operands.push(Operand::U8(bytes[0]));
            }
            OperandType::UInt8 => operands.push(Operand::U8(bytes[0])),
            OperandType::UInt16 => operands.push(Operand::U16(u16::from_be_bytes(read_be(bytes)))),
            OperandType::UInt32 => operands.push(Operand::U32(u32::from_be_bytes(read_be(bytes)))),
            OperandType::UInt64 => operands.push(Operand::U64(u64::from_be_bytes(read_be(bytes)))),
            OperandType::UInt128 => {
                operands.push(Operand::U128(u128::from_be_bytes(read_be(bytes))))
            }
            OperandType::FF => {
                operands.push(Operand::FF(FF::from_be_bytes_mod_order(&bytes[..32])))
            }
        }
        cursor += operand_type.size_in_bytes();
    }

    Ok(Instruction {
        opcode,
        indirect,
        operands,
    })
}
