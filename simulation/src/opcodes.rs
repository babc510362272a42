use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display, EnumCount, EnumIter};

/// Opcodes as encoded in bytecode.
///
/// Several wire opcodes may differ only in the width of their operands; they
/// all map to the same [`ExecutionOpCode`] through the instruction database.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumCount,
    EnumIter,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[repr(u8)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum WireOpCode {
    // Compute
    Add8 = 0,
    Add16,
    Sub8,
    Sub16,
    Mul8,
    Mul16,
    Div8,
    Div16,
    FDiv8,
    FDiv16,
    Eq8,
    Eq16,
    Lt8,
    Lt16,
    Lte8,
    Lte16,
    And8,
    And16,
    Or8,
    Or16,
    Xor8,
    Xor16,
    Not8,
    Not16,
    Shl8,
    Shl16,
    Shr8,
    Shr16,
    Cast8,
    Cast16,

    // Execution environment
    GetEnvVar16,
    CalldataCopy,
    SuccessCopy,
    ReturndataSize,
    ReturndataCopy,

    // Control flow
    Jump32,
    JumpI32,
    InternalCall,
    InternalReturn,

    // Memory
    Set8,
    Set16,
    Set32,
    Set64,
    Set128,
    SetFF,
    Mov8,
    Mov16,

    // Nested calls
    Call,
    StaticCall,
    Return,
    Revert8,
    Revert16,

    // Misc
    DebugLog,

    // Gadgets
    Poseidon2Perm,
    Sha256Compression,
    KeccakF1600,
}

/// First byte value that does not name a wire opcode.
pub const LAST_OPCODE_SENTINEL: u8 = WireOpCode::KeccakF1600 as u8 + 1;

/// Canonical, width-independent operations dispatched by the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionOpCode {
    Add,
    Sub,
    Mul,
    Div,
    FDiv,
    Eq,
    Lt,
    Lte,
    And,
    Or,
    Xor,
    Not,
    Shl,
    Shr,
    Cast,
    GetEnvVar,
    CalldataCopy,
    SuccessCopy,
    ReturndataSize,
    ReturndataCopy,
    Jump,
    JumpI,
    InternalCall,
    InternalReturn,
    Set,
    Mov,
    Call,
    StaticCall,
    Return,
    Revert,
    DebugLog,
    Poseidon2Perm,
    Sha256Compression,
    KeccakF1600,
}

/// Kinds of operands appearing in the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    /// 8-bit indirection mask, merged into the instruction's mask.
    Indirect8,
    /// 16-bit indirection mask, merged into the instruction's mask.
    Indirect16,
    /// One byte naming a value tag.
    Tag,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt128,
    FF,
}

impl OperandType {
    /// Encoded size in bytes.
    pub const fn size_in_bytes(self) -> usize {
        match self {
            OperandType::Indirect8 | OperandType::Tag | OperandType::UInt8 => 1,
            OperandType::Indirect16 | OperandType::UInt16 => 2,
            OperandType::UInt32 => 4,
            OperandType::UInt64 => 8,
            OperandType::UInt128 => 16,
            OperandType::FF => 32,
        }
    }
}

impl WireOpCode {
    /// The operand layout of this opcode in bytecode, excluding the opcode
    /// byte itself.
    pub fn format(self) -> &'static [OperandType] {
        use OperandType::*;
        use WireOpCode::*;

        const THREE_OPERANDS_8: &[OperandType] = &[Indirect8, UInt8, UInt8, UInt8];
        const THREE_OPERANDS_16: &[OperandType] = &[Indirect8, UInt16, UInt16, UInt16];
        const TWO_OPERANDS_8: &[OperandType] = &[Indirect8, UInt8, UInt8];
        const TWO_OPERANDS_16: &[OperandType] = &[Indirect8, UInt16, UInt16];
        const ONE_OPERAND_16: &[OperandType] = &[Indirect8, UInt16];
        const CALL_FORMAT: &[OperandType] = &[Indirect16, UInt16, UInt16, UInt16, UInt16, UInt16];

        match self {
            Add8 | Sub8 | Mul8 | Div8 | FDiv8 | Eq8 | Lt8 | Lte8 | And8 | Or8 | Xor8 | Shl8
            | Shr8 => THREE_OPERANDS_8,
            Add16 | Sub16 | Mul16 | Div16 | FDiv16 | Eq16 | Lt16 | Lte16 | And16 | Or16
            | Xor16 | Shl16 | Shr16 => THREE_OPERANDS_16,
            Not8 | Mov8 | Revert8 => TWO_OPERANDS_8,
            Not16 | Mov16 | Revert16 | Return | Poseidon2Perm | KeccakF1600 => TWO_OPERANDS_16,
            Cast8 => &[Indirect8, UInt8, UInt8, Tag],
            Cast16 => &[Indirect8, UInt16, UInt16, Tag],
            GetEnvVar16 => &[Indirect8, UInt16, UInt8],
            CalldataCopy | ReturndataCopy | Sha256Compression => THREE_OPERANDS_16,
            SuccessCopy | ReturndataSize => ONE_OPERAND_16,
            Jump32 | InternalCall => &[UInt32],
            JumpI32 => &[Indirect8, UInt16, UInt32],
            InternalReturn => &[],
            Set8 => &[Indirect8, UInt8, Tag, UInt8],
            Set16 => &[Indirect8, UInt16, Tag, UInt16],
            Set32 => &[Indirect8, UInt16, Tag, UInt32],
            Set64 => &[Indirect8, UInt16, Tag, UInt64],
            Set128 => &[Indirect8, UInt16, Tag, UInt128],
            SetFF => &[Indirect8, UInt16, Tag, FF],
            Call | StaticCall => CALL_FORMAT,
            DebugLog => &[Indirect8, UInt16, UInt16, UInt16, UInt16, UInt16],
        }
    }

    /// Total encoded size of the instruction, opcode byte included.
    pub fn instruction_size(self) -> usize {
        1 + self
            .format()
            .iter()
            .map(|operand| operand.size_in_bytes())
            .sum::<usize>()
    }
}
