//! Engine configuration, loaded from TOML.
//!
//! ```toml
//! validate_on_load = true
//!
//! [gas]
//! default = 1
//!
//! [gas.opcodes]
//! DIV = 4
//! SEND = 20
//! ```

use crate::error::ConfigError;
use crate::gas::GasSchedule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VmConfig {
    /// Validate records when they are loaded for a run.
    pub validate_on_load: bool,
    pub gas: GasConfig,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            validate_on_load: true,
            gas: GasConfig::default(),
        }
    }
}

/// Gas cost table. Keys are opcode mnemonics, case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GasConfig {
    pub default: u64,
    pub opcodes: BTreeMap<String, u64>,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            default: 1,
            opcodes: BTreeMap::new(),
        }
    }
}

impl VmConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: VmConfig = toml::from_str(s)?;
        // Gas table errors are reported here, not at first run.
        config.schedule()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn schedule(&self) -> Result<GasSchedule, ConfigError> {
        GasSchedule::from_config(&self.gas)
    }
}
