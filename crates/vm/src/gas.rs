//! Gas schedule and meter.

use crate::config::GasConfig;
use crate::error::{ConfigError, Fault};
use regvm_common::Opcode;

/// Per-opcode gas cost, indexed by opcode byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasSchedule {
    costs: [u64; 256],
}

impl Default for GasSchedule {
    /// One unit per instruction.
    fn default() -> Self {
        Self { costs: [1; 256] }
    }
}

impl GasSchedule {
    /// Every opcode costs `cost`, which must be at least 1.
    pub fn flat(cost: u64) -> Result<Self, ConfigError> {
        if cost == 0 {
            return Err(ConfigError::ZeroCost("default".into()));
        }
        Ok(Self { costs: [cost; 256] })
    }

    /// Build from a config table: `default` for every opcode, overridden
    /// per mnemonic.
    pub fn from_config(config: &GasConfig) -> Result<Self, ConfigError> {
        let mut schedule = Self::flat(config.default)?;
        for (name, &cost) in &config.opcodes {
            let opcode = Opcode::from_mnemonic(name)
                .ok_or_else(|| ConfigError::UnknownOpcode(name.clone()))?;
            if cost == 0 {
                return Err(ConfigError::ZeroCost(opcode.mnemonic().into()));
            }
            schedule.costs[opcode as usize] = cost;
        }
        Ok(schedule)
    }

    pub fn cost(&self, opcode: Opcode) -> u64 {
        self.costs[opcode as usize]
    }
}

/// Remaining gas for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasMeter {
    limit: u64,
    remaining: u64,
}

impl GasMeter {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn used(&self) -> u64 {
        self.limit - self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Deduct `cost`, or fault without deducting anything.
    pub fn charge(&mut self, cost: u64) -> Result<(), Fault> {
        if cost > self.remaining {
            return Err(Fault::InsufficientGas);
        }
        self.remaining -= cost;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn default_is_one_per_opcode() {
        let schedule = GasSchedule::default();
        assert_eq!(schedule.cost(Opcode::Move), 1);
        assert_eq!(schedule.cost(Opcode::Jmp), 1);
    }

    #[test]
    fn flat_rejects_zero() {
        assert!(matches!(GasSchedule::flat(0), Err(ConfigError::ZeroCost(_))));
        let schedule = GasSchedule::flat(4).unwrap();
        assert_eq!(schedule.cost(Opcode::Jmp), 4);
        assert_eq!(schedule.cost(Opcode::Send), 4);
    }

    #[test]
    fn overrides_by_mnemonic() {
        let config = GasConfig {
            default: 2,
            opcodes: BTreeMap::from([("div".to_string(), 5), ("SEND".to_string(), 10)]),
        };
        let schedule = GasSchedule::from_config(&config).unwrap();
        assert_eq!(schedule.cost(Opcode::Div), 5);
        assert_eq!(schedule.cost(Opcode::Send), 10);
        assert_eq!(schedule.cost(Opcode::Add), 2);
    }

    #[test]
    fn rejects_unknown_and_zero() {
        let unknown = GasConfig {
            default: 1,
            opcodes: BTreeMap::from([("FROB".to_string(), 3)]),
        };
        assert!(matches!(
            GasSchedule::from_config(&unknown),
            Err(ConfigError::UnknownOpcode(name)) if name == "FROB"
        ));
        let zero = GasConfig {
            default: 1,
            opcodes: BTreeMap::from([("ADD".to_string(), 0)]),
        };
        assert!(matches!(
            GasSchedule::from_config(&zero),
            Err(ConfigError::ZeroCost(_))
        ));
        let zero_default = GasConfig {
            default: 0,
            opcodes: BTreeMap::new(),
        };
        assert!(GasSchedule::from_config(&zero_default).is_err());
    }

    #[test]
    fn meter_never_partially_charges() {
        let mut meter = GasMeter::new(3);
        assert_eq!(meter.charge(2), Ok(()));
        assert_eq!(meter.charge(2), Err(Fault::InsufficientGas));
        assert_eq!(meter.remaining(), 1);
        assert_eq!(meter.used(), 2);
        assert_eq!(meter.charge(1), Ok(()));
        assert!(meter.is_exhausted());
    }
}
