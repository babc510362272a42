use strum::{EnumCount, IntoEnumIterator};
use tracing::info;

use crate::{execution::Gas, opcodes::ExecutionOpCode};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeStats {
    pub count: u64,
    pub failures: u64,
    pub l2_gas: u64,
    pub da_gas: u64,
}

impl OpcodeStats {
    pub fn average_l2_gas(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.l2_gas as f64 / self.count as f64
        }
    }
}

/// Per-opcode step counters and gas totals of an execution.
#[derive(Debug, Clone)]
pub struct ExecutionStats {
    stats: [OpcodeStats; ExecutionOpCode::COUNT],
}

impl Default for ExecutionStats {
    fn default() -> Self {
        Self {
            stats: [OpcodeStats::default(); ExecutionOpCode::COUNT],
        }
    }
}

impl ExecutionStats {
    pub(crate) fn record(&mut self, opcode: ExecutionOpCode, gas: Gas, success: bool) {
        let stats = &mut self.stats[opcode as usize];
        stats.count += 1;
        stats.l2_gas += gas.l2_gas as u64;
        stats.da_gas += gas.da_gas as u64;
        if !success {
            stats.failures += 1;
        }
    }

    pub fn get(&self, opcode: ExecutionOpCode) -> &OpcodeStats {
        &self.stats[opcode as usize]
    }

    pub fn total_steps(&self) -> u64 {
        self.stats.iter().map(|stats| stats.count).sum()
    }

    /// Logs the stats of every executed opcode.
    pub fn log_summary(&self) {
        for opcode in ExecutionOpCode::iter() {
            let stats = self.get(opcode);
            if stats.count == 0 {
                continue;
            }
            info!(
                %opcode,
                count = stats.count,
                failures = stats.failures,
                average_l2_gas = format!("{:.2}", stats.average_l2_gas()),
                "opcode stats"
            );
        }
    }
}
