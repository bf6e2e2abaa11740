//! Contract records: the persisted unit the engine executes.

use serde::{Deserialize, Serialize};

/// A named entry point into a contract's bytecode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    /// Byte offset of the first instruction.
    pub offset: usize,
}

impl Function {
    pub fn new(name: impl Into<String>, offset: usize) -> Self {
        Self {
            name: name.into(),
            offset,
        }
    }
}

/// A deployed contract.
///
/// `byte_code_len` is the logical code length and may be shorter than the
/// `bytecode` buffer. All bounds checks use the logical length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRecord {
    /// Function table, in declaration order. Names are not required to be unique.
    pub functions: Vec<Function>,
    pub bytecode: Vec<u8>,
    pub byte_code_len: usize,
    /// Opaque owner identity.
    pub owner: String,
    pub balance: i64,
    /// Incremented once per completed run, faulted runs included.
    pub exec_count_lifetime: i64,
}

impl ContractRecord {
    /// A record whose logical length covers the whole buffer.
    pub fn new(bytecode: Vec<u8>, owner: impl Into<String>) -> Self {
        Self {
            functions: Vec::new(),
            byte_code_len: bytecode.len(),
            bytecode,
            owner: owner.into(),
            balance: 0,
            exec_count_lifetime: 0,
        }
    }

    /// Builder-style function table entry.
    pub fn with_function(mut self, name: impl Into<String>, offset: usize) -> Self {
        self.functions.push(Function::new(name, offset));
        self
    }

    pub fn with_balance(mut self, balance: i64) -> Self {
        self.balance = balance;
        self
    }

    /// The logical code: `bytecode[..byte_code_len]`, clamped to the buffer.
    pub fn code(&self) -> &[u8] {
        let len = self.byte_code_len.min(self.bytecode.len());
        &self.bytecode[..len]
    }

    /// First function declared under `name`.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// blake3 hash over the logical code and the function table.
    ///
    /// Balance, owner and counters are excluded: they change between runs
    /// without affecting what the validator sees.
    pub fn code_hash(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.byte_code_len as u64).to_le_bytes());
        hasher.update(&(self.bytecode.len() as u64).to_le_bytes());
        hasher.update(self.code());
        for f in &self.functions {
            hasher.update(&(f.name.len() as u64).to_le_bytes());
            hasher.update(f.name.as_bytes());
            hasher.update(&(f.offset as u64).to_le_bytes());
        }
        *hasher.finalize().as_bytes()
    }
}
