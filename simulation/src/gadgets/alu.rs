use thiserror::Error;

use crate::{
    event::{AluEvent, AluOperation},
    tagged_value::{MemoryValue, TaggedValue, TaggedValueError, ValueTag, FF},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AluError {
    #[error("ALU tag mismatch: {0} vs {1}")]
    TagMismatch(ValueTag, ValueTag),
    #[error("ALU operation not supported for tag {0}")]
    UnsupportedTag(ValueTag),
    #[error("ALU division by zero")]
    DivisionByZero,
}

impl From<TaggedValueError> for AluError {
    fn from(error: TaggedValueError) -> Self {
        match error {
            TaggedValueError::TagMismatch(a, b) => AluError::TagMismatch(a, b),
            TaggedValueError::DivisionByZero => AluError::DivisionByZero,
            TaggedValueError::UnsupportedTag(tag) | TaggedValueError::ValueOutOfRange(tag) => {
                AluError::UnsupportedTag(tag)
            }
            TaggedValueError::InvalidTag(_) => AluError::UnsupportedTag(ValueTag::FF),
        }
    }
}

pub trait AluInterface {
    fn add(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError>;
    fn sub(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError>;
    fn mul(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError>;
    fn div(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError>;
    fn fdiv(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError>;
    fn eq(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError>;
    fn lt(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError>;
    fn lte(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError>;
    fn op_not(&mut self, a: MemoryValue) -> Result<MemoryValue, AluError>;
    fn shl(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError>;
    fn shr(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError>;
    /// Reduces `value` to the width of `tag`. Never fails.
    fn truncate(&mut self, value: FF, tag: ValueTag) -> MemoryValue;
}

/// Arithmetic and comparison gadget.
#[derive(Debug, Default, Clone)]
pub struct Alu {
    pub(crate) events: Vec<AluEvent>,
}

impl Alu {
    pub fn events(&self) -> &[AluEvent] {
        &self.events
    }

    fn record(
        &mut self,
        operation: AluOperation,
        a: MemoryValue,
        b: MemoryValue,
        result: Result<MemoryValue, TaggedValueError>,
    ) -> Result<MemoryValue, AluError> {
        let result = result.map_err(AluError::from);
        self.events.push(AluEvent {
            operation,
            a,
            b,
            c: result.unwrap_or_default(),
            error: result.err(),
        });
        result
    }
}

impl AluInterface for Alu {
    fn add(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError> {
        self.record(AluOperation::Add, a, b, a.add(&b))
    }

    fn sub(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError> {
        self.record(AluOperation::Sub, a, b, a.sub(&b))
    }

    fn mul(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError> {
        self.record(AluOperation::Mul, a, b, a.mul(&b))
    }

    fn div(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError> {
        self.record(AluOperation::Div, a, b, a.div(&b))
    }

    fn fdiv(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError> {
        self.record(AluOperation::FDiv, a, b, a.fdiv(&b))
    }

    fn eq(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError> {
        self.record(AluOperation::Eq, a, b, a.equals(&b))
    }

    fn lt(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError> {
        self.record(AluOperation::Lt, a, b, a.less_than(&b))
    }

    fn lte(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError> {
        self.record(AluOperation::Lte, a, b, a.less_than_or_equal(&b))
    }

    fn op_not(&mut self, a: MemoryValue) -> Result<MemoryValue, AluError> {
        self.record(AluOperation::Not, a, MemoryValue::default(), a.not())
    }

    fn shl(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError> {
        self.record(AluOperation::Shl, a, b, a.shl(&b))
    }

    fn shr(&mut self, a: MemoryValue, b: MemoryValue) -> Result<MemoryValue, AluError> {
        self.record(AluOperation::Shr, a, b, a.shr(&b))
    }

    fn truncate(&mut self, value: FF, tag: ValueTag) -> MemoryValue {
        let c = TaggedValue::from_tag_truncating(tag, value);
        self.events.push(AluEvent {
            operation: AluOperation::Truncate,
            a: TaggedValue::FF(value),
            b: TaggedValue::U8(tag.into()),
            c,
            error: None,
        });
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_emits_event() {
        let mut alu = Alu::default();
        let c = alu.add(TaggedValue::U32(5), TaggedValue::U32(7)).unwrap();
        assert_eq!(c, TaggedValue::U32(12));
        assert_eq!(
            alu.events(),
            &[AluEvent {
                operation: AluOperation::Add,
                a: TaggedValue::U32(5),
                b: TaggedValue::U32(7),
                c: TaggedValue::U32(12),
                error: None,
            }]
        );
    }

    #[test]
    fn test_error_is_recorded() {
        let mut alu = Alu::default();
        let result = alu.add(TaggedValue::U8(1), TaggedValue::U32(1));
        assert_eq!(result, Err(AluError::TagMismatch(ValueTag::U8, ValueTag::U32)));
        assert_eq!(alu.events().len(), 1);
        assert_eq!(
            alu.events()[0].error,
            Some(AluError::TagMismatch(ValueTag::U8, ValueTag::U32))
        );

        let result = alu.div(TaggedValue::U16(1), TaggedValue::U16(0));
        assert_eq!(result, Err(AluError::DivisionByZero));
        assert_eq!(alu.events().len(), 2);
    }

    #[test]
    fn test_not_rejects_field() {
        let mut alu = Alu::default();
        assert_eq!(
            alu.op_not(TaggedValue::FF(FF::from(1u64))),
            Err(AluError::UnsupportedTag(ValueTag::FF))
        );
    }

    #[test]
    fn test_comparisons_return_u1() {
        let mut alu = Alu::default();
        assert_eq!(
            alu.lt(TaggedValue::U8(1), TaggedValue::U8(2)).unwrap(),
            TaggedValue::U1(true)
        );
        assert_eq!(
            alu.lte(TaggedValue::U8(2), TaggedValue::U8(2)).unwrap(),
            TaggedValue::U1(true)
        );
        assert_eq!(
            alu.eq(TaggedValue::U8(2), TaggedValue::U8(3)).unwrap(),
            TaggedValue::U1(false)
        );
    }

    #[test]
    fn test_truncate() {
        let mut alu = Alu::default();
        let value = alu.truncate(FF::from(0x1_0000_0005u64), ValueTag::U32);
        assert_eq!(value, TaggedValue::U32(5));
        assert_eq!(alu.events()[0].operation, AluOperation::Truncate);
    }
}
