use crate::{
    constants::{DATA_COPY_COMPARISON_BITS, MEMORY_ADDRESS_SPACE},
    error::InternalError,
    event::RangeCheckEvent,
};

/// Records assertions that values fit in a number of bits.
///
/// Callers only ask for checks they expect to hold: a failing check means the
/// caller computed a wrong witness.
#[derive(Debug, Default, Clone)]
pub struct RangeCheck {
    pub(crate) events: Vec<RangeCheckEvent>,
}

impl RangeCheck {
    pub fn assert_range(&mut self, value: u128, num_bits: u8) -> Result<(), InternalError> {
        if num_bits < 128 && value >> num_bits != 0 {
            return Err(InternalError::RangeCheckFailed { value, num_bits });
        }
        self.events.push(RangeCheckEvent { value, num_bits });
        Ok(())
    }

    /// Proves whether a memory region ending at `end` (exclusive) stays in
    /// the address space, returning the outcome.
    ///
    /// The witness is `2^32 - end` when it does and `end - 2^32 - 1` when it
    /// does not, so both outcomes are provable with the same check.
    pub fn check_region_end(&mut self, end: u64) -> Result<bool, InternalError> {
        let in_range = end <= MEMORY_ADDRESS_SPACE;
        let witness = if in_range {
            MEMORY_ADDRESS_SPACE - end
        } else {
            end - MEMORY_ADDRESS_SPACE - 1
        };
        self.assert_range(witness as u128, DATA_COPY_COMPARISON_BITS)?;
        Ok(in_range)
    }

    pub fn events(&self) -> &[RangeCheckEvent] {
        &self.events
    }
}
