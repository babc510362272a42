//! Tagged values stored in AVM memory.
//!
//! Every memory cell holds a value together with a [`ValueTag`] describing its
//! width. Arithmetic only happens between values of the same tag; integer
//! operations wrap modulo `2^bits`, field operations follow the BN254 scalar
//! field.

use std::cmp::Ordering;
use std::fmt;

use ark_ff::{BigInteger, Field, PrimeField};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use num_traits::Zero;
use strum_macros::{Display, EnumCount, EnumIter};
use thiserror::Error;

/// The native field of the AVM.
pub type FF = ark_bn254::Fr;

/// Width tag of a memory value.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumCount,
    EnumIter,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[repr(u8)]
#[allow(clippy::upper_case_acronyms)]
pub enum ValueTag {
    #[default]
    FF = 0,
    U1 = 1,
    U8 = 2,
    U16 = 3,
    U32 = 4,
    U64 = 5,
    U128 = 6,
}

impl ValueTag {
    /// Number of bits of an integer tag. Field elements report 254.
    pub const fn bits(self) -> u32 {
        match self {
            ValueTag::FF => 254,
            ValueTag::U1 => 1,
            ValueTag::U8 => 8,
            ValueTag::U16 => 16,
            ValueTag::U32 => 32,
            ValueTag::U64 => 64,
            ValueTag::U128 => 128,
        }
    }

    pub const fn is_integer(self) -> bool {
        !matches!(self, ValueTag::FF)
    }

    /// Reduces `value` modulo `2^bits`.
    const fn mask(self, value: u128) -> u128 {
        match self.bits() {
            bits if bits >= 128 => value,
            bits => value & ((1u128 << bits) - 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TaggedValueError {
    /// The operands of a binary operation carry different tags.
    #[error("Tag mismatch: {0} vs {1}")]
    TagMismatch(ValueTag, ValueTag),
    /// A raw byte does not name a known tag.
    #[error("Invalid tag: {0}")]
    InvalidTag(u8),
    /// The value does not fit in the requested tag.
    #[error("Value does not fit in tag {0}")]
    ValueOutOfRange(ValueTag),
    /// The operation is not defined for values with this tag.
    #[error("Operation not supported for tag {0}")]
    UnsupportedTag(ValueTag),
    #[error("Division by zero")]
    DivisionByZero,
}

/// A value together with its width tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum TaggedValue {
    FF(FF),
    U1(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
}

/// Values as stored in memory.
pub type MemoryValue = TaggedValue;

impl Default for TaggedValue {
    fn default() -> Self {
        TaggedValue::FF(FF::zero())
    }
}

impl fmt::Debug for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.tag(), self)
    }
}

impl fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaggedValue::FF(v) => write!(f, "{v}"),
            TaggedValue::U1(v) => write!(f, "{}", *v as u8),
            TaggedValue::U8(v) => write!(f, "{v}"),
            TaggedValue::U16(v) => write!(f, "{v}"),
            TaggedValue::U32(v) => write!(f, "{v}"),
            TaggedValue::U64(v) => write!(f, "{v}"),
            TaggedValue::U128(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! impl_from_native {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for TaggedValue {
                fn from(value: $ty) -> Self {
                    TaggedValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_native!(
    FF => FF,
    bool => U1,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
);

/// Returns the canonical integer of `value` if it fits in 128 bits.
pub(crate) fn ff_to_u128(value: &FF) -> Option<u128> {
    let limbs = value.into_bigint().0;
    if limbs[2] != 0 || limbs[3] != 0 {
        return None;
    }
    Some(limbs[0] as u128 | (limbs[1] as u128) << 64)
}

/// Returns the low 128 bits of the canonical integer of `value`.
fn ff_low_u128(value: &FF) -> u128 {
    let limbs = value.into_bigint().0;
    limbs[0] as u128 | (limbs[1] as u128) << 64
}

/// Big-endian canonical encoding of a field element.
pub(crate) fn ff_to_be_bytes(value: &FF) -> Vec<u8> {
    value.into_bigint().to_bytes_be()
}

impl TaggedValue {
    pub const fn tag(&self) -> ValueTag {
        match self {
            TaggedValue::FF(_) => ValueTag::FF,
            TaggedValue::U1(_) => ValueTag::U1,
            TaggedValue::U8(_) => ValueTag::U8,
            TaggedValue::U16(_) => ValueTag::U16,
            TaggedValue::U32(_) => ValueTag::U32,
            TaggedValue::U64(_) => ValueTag::U64,
            TaggedValue::U128(_) => ValueTag::U128,
        }
    }

    /// Builds an integer value from a `u128` already reduced to the tag width.
    fn from_masked(tag: ValueTag, value: u128) -> Self {
        match tag {
            ValueTag::FF => TaggedValue::FF(FF::from(value)),
            ValueTag::U1 => TaggedValue::U1(value != 0),
            ValueTag::U8 => TaggedValue::U8(value as u8),
            ValueTag::U16 => TaggedValue::U16(value as u16),
            ValueTag::U32 => TaggedValue::U32(value as u32),
            ValueTag::U64 => TaggedValue::U64(value as u64),
            ValueTag::U128 => TaggedValue::U128(value),
        }
    }

    /// Builds a value of `tag` from a field element, failing if it does not
    /// fit.
    pub fn from_tag(tag: ValueTag, value: FF) -> Result<Self, TaggedValueError> {
        if tag == ValueTag::FF {
            return Ok(TaggedValue::FF(value));
        }
        let int = ff_to_u128(&value).ok_or(TaggedValueError::ValueOutOfRange(tag))?;
        if tag.mask(int) != int {
            return Err(TaggedValueError::ValueOutOfRange(tag));
        }
        Ok(Self::from_masked(tag, int))
    }

    /// Builds a value of `tag` from a field element, keeping only the low
    /// `bits` of its canonical integer.
    pub fn from_tag_truncating(tag: ValueTag, value: FF) -> Self {
        match tag {
            ValueTag::FF => TaggedValue::FF(value),
            _ => Self::from_masked(tag, tag.mask(ff_low_u128(&value))),
        }
    }

    pub fn as_ff(&self) -> FF {
        match self {
            TaggedValue::FF(v) => *v,
            _ => FF::from(self.as_u128_unchecked()),
        }
    }

    /// Integer view of an integer-tagged value. Field elements are truncated.
    fn as_u128_unchecked(&self) -> u128 {
        match self {
            TaggedValue::FF(v) => ff_low_u128(v),
            TaggedValue::U1(v) => *v as u128,
            TaggedValue::U8(v) => *v as u128,
            TaggedValue::U16(v) => *v as u128,
            TaggedValue::U32(v) => *v as u128,
            TaggedValue::U64(v) => *v as u128,
            TaggedValue::U128(v) => *v,
        }
    }

    pub fn as_bool(&self) -> Result<bool, TaggedValueError> {
        match self {
            TaggedValue::U1(v) => Ok(*v),
            _ => Err(TaggedValueError::TagMismatch(ValueTag::U1, self.tag())),
        }
    }

    pub fn as_u8(&self) -> Result<u8, TaggedValueError> {
        match self {
            TaggedValue::U8(v) => Ok(*v),
            _ => Err(TaggedValueError::TagMismatch(ValueTag::U8, self.tag())),
        }
    }

    pub fn as_u32(&self) -> Result<u32, TaggedValueError> {
        match self {
            TaggedValue::U32(v) => Ok(*v),
            _ => Err(TaggedValueError::TagMismatch(ValueTag::U32, self.tag())),
        }
    }

    pub fn as_u64(&self) -> Result<u64, TaggedValueError> {
        match self {
            TaggedValue::U64(v) => Ok(*v),
            _ => Err(TaggedValueError::TagMismatch(ValueTag::U64, self.tag())),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            TaggedValue::FF(v) => v.is_zero(),
            _ => self.as_u128_unchecked() == 0,
        }
    }

    fn check_same_tag(&self, other: &Self) -> Result<ValueTag, TaggedValueError> {
        if self.tag() != other.tag() {
            return Err(TaggedValueError::TagMismatch(self.tag(), other.tag()));
        }
        Ok(self.tag())
    }

    /// Applies an integer operation to two values of the same integer tag.
    fn integer_op(
        &self,
        other: &Self,
        op: impl FnOnce(u128, u128, u32) -> u128,
    ) -> Result<Self, TaggedValueError> {
        let tag = self.check_same_tag(other)?;
        if !tag.is_integer() {
            return Err(TaggedValueError::UnsupportedTag(tag));
        }
        let result = op(self.as_u128_unchecked(), other.as_u128_unchecked(), tag.bits());
        Ok(Self::from_masked(tag, tag.mask(result)))
    }

    pub fn add(&self, other: &Self) -> Result<Self, TaggedValueError> {
        match (self, other) {
            (TaggedValue::FF(a), TaggedValue::FF(b)) => Ok(TaggedValue::FF(*a + b)),
            _ => self.integer_op(other, |a, b, _| a.wrapping_add(b)),
        }
    }

    pub fn sub(&self, other: &Self) -> Result<Self, TaggedValueError> {
        match (self, other) {
            (TaggedValue::FF(a), TaggedValue::FF(b)) => Ok(TaggedValue::FF(*a - b)),
            _ => self.integer_op(other, |a, b, _| a.wrapping_sub(b)),
        }
    }

    pub fn mul(&self, other: &Self) -> Result<Self, TaggedValueError> {
        match (self, other) {
            (TaggedValue::FF(a), TaggedValue::FF(b)) => Ok(TaggedValue::FF(*a * b)),
            _ => self.integer_op(other, |a, b, _| a.wrapping_mul(b)),
        }
    }

    /// Integer division. Not defined for field elements.
    pub fn div(&self, other: &Self) -> Result<Self, TaggedValueError> {
        self.check_same_tag(other)?;
        if other.tag().is_integer() && other.is_zero() {
            return Err(TaggedValueError::DivisionByZero);
        }
        self.integer_op(other, |a, b, _| a / b)
    }

    /// Field division. Only defined for field elements.
    pub fn fdiv(&self, other: &Self) -> Result<Self, TaggedValueError> {
        let tag = self.check_same_tag(other)?;
        match (self, other) {
            (TaggedValue::FF(a), TaggedValue::FF(b)) => {
                let inverse = b.inverse().ok_or(TaggedValueError::DivisionByZero)?;
                Ok(TaggedValue::FF(*a * inverse))
            }
            _ => Err(TaggedValueError::UnsupportedTag(tag)),
        }
    }

    pub fn and(&self, other: &Self) -> Result<Self, TaggedValueError> {
        self.integer_op(other, |a, b, _| a & b)
    }

    pub fn or(&self, other: &Self) -> Result<Self, TaggedValueError> {
        self.integer_op(other, |a, b, _| a | b)
    }

    pub fn xor(&self, other: &Self) -> Result<Self, TaggedValueError> {
        self.integer_op(other, |a, b, _| a ^ b)
    }

    /// Left shift. Shifting by the bit width or more yields zero.
    pub fn shl(&self, other: &Self) -> Result<Self, TaggedValueError> {
        self.integer_op(
            other,
            |a, b, bits| if b >= bits as u128 { 0 } else { a << b },
        )
    }

    /// Right shift. Shifting by the bit width or more yields zero.
    pub fn shr(&self, other: &Self) -> Result<Self, TaggedValueError> {
        self.integer_op(
            other,
            |a, b, bits| if b >= bits as u128 { 0 } else { a >> b },
        )
    }

    pub fn not(&self) -> Result<Self, TaggedValueError> {
        let tag = self.tag();
        if !tag.is_integer() {
            return Err(TaggedValueError::UnsupportedTag(tag));
        }
        Ok(Self::from_masked(tag, tag.mask(!self.as_u128_unchecked())))
    }

    fn compare(&self, other: &Self) -> Result<Ordering, TaggedValueError> {
        self.check_same_tag(other)?;
        Ok(match (self, other) {
            (TaggedValue::FF(a), TaggedValue::FF(b)) => a.cmp(b),
            _ => self.as_u128_unchecked().cmp(&other.as_u128_unchecked()),
        })
    }

    pub fn equals(&self, other: &Self) -> Result<Self, TaggedValueError> {
        Ok(TaggedValue::U1(self.compare(other)? == Ordering::Equal))
    }

    pub fn less_than(&self, other: &Self) -> Result<Self, TaggedValueError> {
        Ok(TaggedValue::U1(self.compare(other)? == Ordering::Less))
    }

    pub fn less_than_or_equal(&self, other: &Self) -> Result<Self, TaggedValueError> {
        Ok(TaggedValue::U1(self.compare(other)? != Ordering::Greater))
    }
}
