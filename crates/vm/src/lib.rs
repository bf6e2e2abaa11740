//! regvm virtual machine: executes contract bytecode under a gas budget.
//!
//! The VM is a register machine with:
//! - 256 general-purpose 64-bit registers
//! - a 1024-slot value stack, shared by PUSH/POP and CALL/RETURN
//! - 65536 cells of word-addressed memory
//! - six compare flags set by CMP
//!
//! Every run gets fresh state. Only the contract record (balance, lifetime
//! execution count) and whatever the [`Host`] keeps survive a run.
//!
//! # Usage
//!
//! ```
//! use regvm_common::{encode_all, ContractRecord, Instruction, Opcode, Operand};
//! use regvm_vm::{run, ResultCode};
//!
//! let code = encode_all(&[
//!     Instruction::source_dest(Opcode::Move, Operand::Immediate(4), Operand::Register(0)),
//!     Instruction::source_dest(Opcode::Add, Operand::Immediate(6), Operand::Register(0)),
//!     Instruction::bare(Opcode::End),
//! ]);
//! let mut record = ContractRecord::new(code, "owner");
//!
//! let exec = run(&mut record, 100);
//! assert_eq!(exec.result, ResultCode::Ok);
//! assert_eq!(exec.state.register(0), 10);
//! ```
//!
//! For stored contracts, counters and persistence, use [`Engine`].

pub mod alu;
pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod execute;
pub mod gas;
pub mod host;
pub mod machine;
pub mod resolve;
pub mod store;

pub use alu::CompareFlags;
pub use config::{GasConfig, VmConfig};
pub use engine::{Engine, Outcome};
pub use error::{ConfigError, EngineError, Fault, ResultCode, StoreError};
pub use execute::{execute, Execution, Invocation};
pub use gas::{GasMeter, GasSchedule};
pub use host::{Host, MemoryHost, NullHost};
pub use machine::ExecutionState;
pub use store::{ContractStore, FileStore, MemoryStore, LEDGER_FILE};

use regvm_common::ContractRecord;

/// Run a record from offset 0 with the default gas schedule and no host.
///
/// The record is not validated and its counters are not touched; see
/// [`Engine`] for the full load/validate/persist cycle.
pub fn run(record: &mut ContractRecord, gas: u64) -> Execution {
    execute(
        record,
        0,
        &Invocation::new(""),
        gas,
        &GasSchedule::default(),
        &mut NullHost,
    )
}
