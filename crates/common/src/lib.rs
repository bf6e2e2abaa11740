//! regvm common types and instruction encoding.
//!
//! This crate holds the data shared by the validator, the VM and the
//! tooling:
//!
//! - [`Opcode`] and [`Shape`]: the instruction catalog and operand layouts
//! - [`AddressingMode`], [`ModeByte`], [`Operand`]: operand encoding
//! - [`Instruction`]: decoded instructions with a byte encoder
//! - [`ContractRecord`]: the persisted contract
//! - [`DecodeError`]: errors from decoding byte streams

pub mod contract;
pub mod error;
pub mod instruction;
pub mod mode;
pub mod opcode;

pub use contract::{ContractRecord, Function};
pub use error::DecodeError;
pub use instruction::{encode_all, Instruction};
pub use mode::{AddressingMode, ModeByte, Operand, Slot};
pub use opcode::{Opcode, Shape};

/// Number of general-purpose registers.
pub const NUM_REGISTERS: usize = 256;

/// Value stack depth.
pub const STACK_SIZE: usize = 1024;

/// Addressable memory cells.
pub const RAM_SIZE: usize = 65_536;
