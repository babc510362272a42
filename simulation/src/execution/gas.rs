use std::ops::{Add, Sub};

use strum_macros::Display;
use thiserror::Error;

use crate::{
    constants::{
        ADDRESSING_INDIRECT_L2_GAS, ADDRESSING_RELATIVE_L2_GAS, GAS_CLAMP_COMPARISON_BITS,
        GAS_COMPARISON_BITS,
    },
    error::InternalError,
    event::{GasCheck, GasEvent},
    gadgets::RangeCheck,
    instruction_info::GasCost,
    serialization::Instruction,
};

/// Two-dimensional gas: L2 compute gas and data-availability gas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Gas {
    pub l2_gas: u32,
    pub da_gas: u32,
}

impl Gas {
    pub const fn new(l2_gas: u32, da_gas: u32) -> Self {
        Self { l2_gas, da_gas }
    }
}

impl Add for Gas {
    type Output = Gas;

    fn add(self, rhs: Self) -> Self::Output {
        Gas::new(
            self.l2_gas.wrapping_add(rhs.l2_gas),
            self.da_gas.wrapping_add(rhs.da_gas),
        )
    }
}

impl Sub for Gas {
    type Output = Gas;

    fn sub(self, rhs: Self) -> Self::Output {
        Gas::new(
            self.l2_gas.wrapping_sub(rhs.l2_gas),
            self.da_gas.wrapping_sub(rhs.da_gas),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum GasPhase {
    Base,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Out of gas in the {phase} phase")]
pub struct OutOfGasError {
    pub phase: GasPhase,
}

/// L2 gas surcharged for the indirect and relative address operands of
/// `instruction`.
pub fn addressing_gas(instruction: &Instruction, num_addresses: usize) -> u32 {
    (0..num_addresses)
        .map(|i| {
            let indirect = if instruction.is_indirect(i) {
                ADDRESSING_INDIRECT_L2_GAS
            } else {
                0
            };
            let relative = if instruction.is_relative(i) {
                ADDRESSING_RELATIVE_L2_GAS
            } else {
                0
            };
            indirect + relative
        })
        .sum()
}

/// Compares `used` against `limit`, proving the outcome with a range check.
fn check_limit(
    used: u64,
    limit: u32,
    range_check: &mut RangeCheck,
) -> Result<(bool, u64), InternalError> {
    let limit = limit as u64;
    let out_of_gas = used > limit;
    let witness = if out_of_gas {
        used - limit - 1
    } else {
        limit - used
    };
    range_check.assert_range(witness as u128, GAS_COMPARISON_BITS)?;
    Ok((out_of_gas, witness))
}

fn check_gas(
    used_l2: u64,
    used_da: u64,
    limit: Gas,
    range_check: &mut RangeCheck,
) -> Result<GasCheck, InternalError> {
    let (out_of_gas_l2, limit_used_l2_comparison_witness) =
        check_limit(used_l2, limit.l2_gas, range_check)?;
    let (out_of_gas_da, limit_used_da_comparison_witness) =
        check_limit(used_da, limit.da_gas, range_check)?;
    Ok(GasCheck {
        out_of_gas_l2,
        out_of_gas_da,
        limit_used_l2_comparison_witness,
        limit_used_da_comparison_witness,
    })
}

/// Charges the gas of one instruction against a context.
///
/// Usage is only committed when every check passes. On failure the caller is
/// expected to charge the whole limit.
#[derive(Debug, Clone)]
pub struct GasTracker {
    gas_cost: GasCost,
    gas_used: Gas,
    gas_limit: Gas,
    event: GasEvent,
}

impl GasTracker {
    pub fn new(gas_cost: GasCost, addressing_gas: u32, gas_used: Gas, gas_limit: Gas) -> Self {
        Self {
            gas_cost,
            gas_used,
            gas_limit,
            event: GasEvent {
                prev_gas_used: gas_used,
                opcode_gas: gas_cost.base_l2,
                addressing_gas,
                ..Default::default()
            },
        }
    }

    pub const fn gas_used(&self) -> Gas {
        self.gas_used
    }

    pub const fn gas_limit(&self) -> Gas {
        self.gas_limit
    }

    pub fn gas_left(&self) -> Gas {
        self.gas_limit - self.gas_used
    }

    pub const fn event(&self) -> &GasEvent {
        &self.event
    }

    /// Charges the base gas, then `dynamic_factor` units of dynamic gas.
    pub fn consume_gas(
        &mut self,
        dynamic_factor: Gas,
        range_check: &mut RangeCheck,
    ) -> Result<Result<(), OutOfGasError>, InternalError> {
        let base_l2 = self.gas_cost.base_l2 as u64 + self.event.addressing_gas as u64;
        let base_da = self.gas_cost.base_da as u64;
        self.event.base_gas = Gas::new(base_l2 as u32, base_da as u32);

        let used_l2 = self.gas_used.l2_gas as u64 + base_l2;
        let used_da = self.gas_used.da_gas as u64 + base_da;
        self.event.base_check = check_gas(used_l2, used_da, self.gas_limit, range_check)?;
        if self.event.base_check.out_of_gas() {
            self.event.out_of_gas_phase = Some(GasPhase::Base);
            return Ok(Err(OutOfGasError {
                phase: GasPhase::Base,
            }));
        }

        let dynamic_l2 = dynamic_factor.l2_gas as u64 * self.gas_cost.dyn_l2 as u64;
        let dynamic_da = dynamic_factor.da_gas as u64 * self.gas_cost.dyn_da as u64;
        self.event.dynamic_gas_factor = dynamic_factor;
        self.event.dynamic_gas = Gas::new(dynamic_l2 as u32, dynamic_da as u32);

        let used_l2 = used_l2 + dynamic_l2;
        let used_da = used_da + dynamic_da;
        self.event.dynamic_check = check_gas(used_l2, used_da, self.gas_limit, range_check)?;
        if self.event.dynamic_check.out_of_gas() {
            self.event.out_of_gas_phase = Some(GasPhase::Dynamic);
            return Ok(Err(OutOfGasError {
                phase: GasPhase::Dynamic,
            }));
        }

        // Both values are bounded by the limit here.
        self.gas_used = Gas::new(used_l2 as u32, used_da as u32);
        Ok(Ok(()))
    }

    /// Clamps the gas allocated to a nested call to what is left, per
    /// dimension.
    pub fn compute_gas_limit_for_call(
        &self,
        allocated: Gas,
        range_check: &mut RangeCheck,
    ) -> Result<Gas, InternalError> {
        let left = self.gas_left();
        let mut clamp = |allocated: u32, left: u32| -> Result<u32, InternalError> {
            let witness = if allocated < left {
                left - allocated - 1
            } else {
                allocated - left
            };
            range_check.assert_range(witness as u128, GAS_CLAMP_COMPARISON_BITS)?;
            Ok(allocated.min(left))
        };
        Ok(Gas::new(
            clamp(allocated.l2_gas, left.l2_gas)?,
            clamp(allocated.da_gas, left.da_gas)?,
        ))
    }
}
