use thiserror::Error;

use crate::{
    event::{BitwiseEvent, BitwiseOperation},
    tagged_value::{MemoryValue, TaggedValueError, ValueTag},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BitwiseError {
    #[error("Bitwise tag mismatch: {0} vs {1}")]
    TagMismatch(ValueTag, ValueTag),
    /// Bitwise operations are not defined on field elements.
    #[error("Bitwise operation on field element")]
    FieldElement,
}

impl From<TaggedValueError> for BitwiseError {
    fn from(error: TaggedValueError) -> Self {
        match error {
            TaggedValueError::TagMismatch(a, b) => BitwiseError::TagMismatch(a, b),
            _ => BitwiseError::FieldElement,
        }
    }
}

pub trait BitwiseInterface {
    fn and(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, BitwiseError>;
    fn or(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, BitwiseError>;
    fn xor(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, BitwiseError>;
}

#[derive(Debug, Default, Clone)]
pub struct Bitwise {
    pub(crate) events: Vec<BitwiseEvent>,
}

impl Bitwise {
    pub fn events(&self) -> &[BitwiseEvent] {
        &self.events
    }

    fn record(
        &mut self,
        operation: BitwiseOperation,
        a: MemoryValue,
        b: MemoryValue,
        result: Result<MemoryValue, TaggedValueError>,
    ) -> Result<MemoryValue, BitwiseError> {
        let result = result.map_err(BitwiseError::from);
        self.events.push(BitwiseEvent {
            operation,
            a,
            b,
            result: result.unwrap_or_default(),
            error: result.err(),
        });
        result
    }
}

impl BitwiseInterface for Bitwise {
    fn and(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, BitwiseError> {
        self.record(BitwiseOperation::And, a, b, a.and(&b))
    }

    fn or(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, BitwiseError> {
        self.record(BitwiseOperation::Or, a, b, a.or(&b))
    }

    fn xor(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, BitwiseError> {
        self.record(BitwiseOperation::Xor, a, b, a.xor(&b))
    }
}
