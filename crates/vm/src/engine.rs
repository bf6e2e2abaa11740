//! The execution engine: load, validate, run, count, persist.

use crate::config::VmConfig;
use crate::error::{ConfigError, EngineError, ResultCode};
use crate::execute::{execute, Invocation};
use crate::gas::GasSchedule;
use crate::host::{Host, NullHost};
use crate::store::ContractStore;
use regvm_common::ContractRecord;
use regvm_validator::validate;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Summary of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub result: ResultCode,
    pub gas_used: u64,
    pub gas_remaining: u64,
    /// Program counter when the loop stopped.
    pub pc: usize,
    pub steps: u64,
    /// Whether the updated record was written back to the store.
    pub persisted: bool,
}

/// Runs contracts from a [`ContractStore`] against a [`Host`].
pub struct Engine<S, H = NullHost> {
    store: S,
    host: H,
    config: VmConfig,
    schedule: GasSchedule,
    /// Code hashes of records that passed validation.
    validated: HashSet<[u8; 32]>,
}

impl<S: ContractStore, H: Host> Engine<S, H> {
    /// Engine with the default configuration.
    pub fn new(store: S, host: H) -> Self {
        Self {
            store,
            host,
            config: VmConfig::default(),
            schedule: GasSchedule::default(),
            validated: HashSet::new(),
        }
    }

    pub fn with_config(store: S, host: H, config: VmConfig) -> Result<Self, ConfigError> {
        let schedule = config.schedule()?;
        Ok(Self {
            store,
            host,
            config,
            schedule,
            validated: HashSet::new(),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn into_parts(self) -> (S, H) {
        (self.store, self.host)
    }

    /// Validate `record` and save it under `address`.
    pub fn deploy(&mut self, address: &str, record: &ContractRecord) -> Result<(), EngineError> {
        self.check(record)?;
        self.store.save(address, record)?;
        debug!(address, functions = record.functions.len(), "deployed contract");
        Ok(())
    }

    /// Run the contract at `address` from offset 0.
    pub fn run(
        &mut self,
        address: &str,
        params: &[String],
        amount_sent: i64,
        gas: u64,
    ) -> Result<Outcome, EngineError> {
        let record = self.load(address)?;
        self.invoke(address, record, 0, params, amount_sent, gas)
    }

    /// Run the function `name` of the contract at `address`.
    pub fn run_function(
        &mut self,
        address: &str,
        name: &str,
        params: &[String],
        amount_sent: i64,
        gas: u64,
    ) -> Result<Outcome, EngineError> {
        let record = self.load(address)?;
        let entry = record
            .function(name)
            .map(|f| f.offset)
            .ok_or_else(|| EngineError::UnknownFunction(name.to_string()))?;
        self.invoke(address, record, entry, params, amount_sent, gas)
    }

    fn load(&mut self, address: &str) -> Result<ContractRecord, EngineError> {
        let record = self.store.load(address)?;
        if self.config.validate_on_load {
            self.check(&record)?;
        }
        Ok(record)
    }

    fn invoke(
        &mut self,
        address: &str,
        mut record: ContractRecord,
        entry: usize,
        params: &[String],
        amount_sent: i64,
        gas: u64,
    ) -> Result<Outcome, EngineError> {
        debug!(address, entry, gas, params = params.len(), "run start");

        let invocation = Invocation {
            address,
            params,
            amount_sent,
        };
        let exec = execute(
            &mut record,
            entry,
            &invocation,
            gas,
            &self.schedule,
            &mut self.host,
        );
        record.exec_count_lifetime = record.exec_count_lifetime.saturating_add(1);
        self.host.on_complete(address, exec.result);

        let persisted = match self.check(&record) {
            Ok(()) => {
                self.store
                    .save(address, &record)
                    .map_err(|source| EngineError::Persist {
                        result: exec.result,
                        source,
                    })?;
                true
            }
            Err(_) => {
                warn!(address, "record failed validation after run; not persisted");
                false
            }
        };

        debug!(
            address,
            result = %exec.result,
            gas_used = exec.gas_used,
            steps = exec.steps,
            persisted,
            "run finished"
        );

        Ok(Outcome {
            result: exec.result,
            gas_used: exec.gas_used,
            gas_remaining: exec.gas_remaining,
            pc: exec.state.pc(),
            steps: exec.steps,
            persisted,
        })
    }

    /// Validate, skipping records whose code hash already passed.
    fn check(&mut self, record: &ContractRecord) -> Result<(), EngineError> {
        let hash = record.code_hash();
        if self.validated.contains(&hash) {
            return Ok(());
        }
        validate(record).map_err(EngineError::Validation)?;
        self.validated.insert(hash);
        Ok(())
    }
}
