//! Faults, result codes and engine errors.
//!
//! A [`Fault`] is a terminal condition inside one invocation; it never
//! escapes as a Rust error from the engine but is reported through
//! [`ResultCode`]. [`EngineError`] covers failures around the invocation
//! (load, validation, persistence).

use regvm_validator::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Conditions that halt the fetch-decode-execute loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Fault {
    /// Gas ran out before END was reached.
    #[error("insufficient gas")]
    InsufficientGas,

    /// Byte at the program counter is not an executable opcode.
    #[error("illegal opcode")]
    IllegalOpcode,

    /// PUSH or CALL on a full stack.
    #[error("stack overflow")]
    StackOverflow,

    /// POP or RETURN on an empty stack.
    #[error("stack underflow")]
    StackUnderflow,

    /// A multi-cell memory write ran past the last address.
    #[error("access outside ram")]
    AccessOutsideRam,

    /// DIV with a zero divisor.
    #[error("divide by zero")]
    DivideByZero,

    /// Write to an immediate-mode destination.
    #[error("store to immediate")]
    StoreToImmediate,

    /// Destination cannot take the value (wrong mode, bit out of range,
    /// transfer refused by the host).
    #[error("illegal destination")]
    IllegalDestination,

    /// Program counter or operand bytes past the logical code length.
    #[error("access outside rom")]
    AccessOutsideRom,
}

/// Terminal result of an invocation. Exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCode {
    Ok,
    InsufficientGas,
    IllegalOpcode,
    StackOverflow,
    StackUnderflow,
    AccessOutsideRam,
    DivideByZero,
    StoreToImmediate,
    IllegalDestination,
    AccessOutsideRom,
}

impl ResultCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultCode::Ok => "ok",
            ResultCode::InsufficientGas => "insufficient_gas",
            ResultCode::IllegalOpcode => "illegal_opcode",
            ResultCode::StackOverflow => "stack_overflow",
            ResultCode::StackUnderflow => "stack_underflow",
            ResultCode::AccessOutsideRam => "access_outside_ram",
            ResultCode::DivideByZero => "divide_by_zero",
            ResultCode::StoreToImmediate => "store_to_immediate",
            ResultCode::IllegalDestination => "illegal_destination",
            ResultCode::AccessOutsideRom => "access_outside_rom",
        }
    }

    pub fn is_ok(&self) -> bool {
        *self == ResultCode::Ok
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Fault> for ResultCode {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::InsufficientGas => ResultCode::InsufficientGas,
            Fault::IllegalOpcode => ResultCode::IllegalOpcode,
            Fault::StackOverflow => ResultCode::StackOverflow,
            Fault::StackUnderflow => ResultCode::StackUnderflow,
            Fault::AccessOutsideRam => ResultCode::AccessOutsideRam,
            Fault::DivideByZero => ResultCode::DivideByZero,
            Fault::StoreToImmediate => ResultCode::StoreToImmediate,
            Fault::IllegalDestination => ResultCode::IllegalDestination,
            Fault::AccessOutsideRom => ResultCode::AccessOutsideRom,
        }
    }
}

impl From<Result<(), Fault>> for ResultCode {
    fn from(result: Result<(), Fault>) -> Self {
        match result {
            Ok(()) => ResultCode::Ok,
            Err(fault) => fault.into(),
        }
    }
}

/// Contract store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("contract '{0}' not found")]
    NotFound(String),

    #[error("contract '{address}' is malformed: {reason}")]
    Malformed { address: String, reason: String },

    #[error("invalid contract address '{0}'")]
    InvalidAddress(String),

    #[error("ledger file is malformed: {0}")]
    MalformedLedger(String),

    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown opcode mnemonic '{0}' in gas table")]
    UnknownOpcode(String),

    #[error("gas cost for {0} must be at least 1")]
    ZeroCost(String),
}

/// Errors around an invocation. Faults inside the loop are not errors;
/// they come back as an `Outcome` with a non-ok [`ResultCode`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("contract failed validation with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),

    #[error("contract has no function named '{0}'")]
    UnknownFunction(String),

    /// The run finished but the updated record could not be saved.
    #[error("run finished with {result} but persisting failed: {source}")]
    Persist {
        result: ResultCode,
        #[source]
        source: StoreError,
    },
}
