//! Host interface: the services a contract reaches outside its own state.
//!
//! SEND, STORE, READ, SENDER, PREVHASH and EXECCOUNTB go through a [`Host`].
//! [`NullHost`] refuses the side-effecting operations; [`MemoryHost`] keeps
//! everything in maps and is what tests and the CLI use.

use crate::error::{Fault, ResultCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Services provided to a running contract.
pub trait Host {
    /// Identity of the party invoking the contract.
    fn sender(&self) -> [u8; 32] {
        [0; 32]
    }

    /// Hash of the previous block.
    fn prev_hash(&self) -> [u8; 32] {
        [0; 32]
    }

    /// Executions of `contract` in the current block.
    fn block_exec_count(&self, _contract: &str) -> i64 {
        0
    }

    /// Move `amount` from `from` to the account `to`.
    ///
    /// The engine has already checked `0 <= amount <= balance` and debits
    /// the contract only when this returns `Ok`.
    fn send(&mut self, from: &str, to: i64, amount: i64) -> Result<(), Fault>;

    /// Write `value` under `key` in the storage of `contract`.
    fn store(&mut self, contract: &str, key: i64, value: i64) -> Result<(), Fault>;

    /// Read `key` from the storage of `contract`.
    fn read(&self, contract: &str, key: i64) -> Result<i64, Fault>;

    /// Called once after every run of `contract`, faulted runs included.
    fn on_complete(&mut self, _contract: &str, _result: ResultCode) {}
}

impl<H: Host + ?Sized> Host for &mut H {
    fn sender(&self) -> [u8; 32] {
        (**self).sender()
    }

    fn prev_hash(&self) -> [u8; 32] {
        (**self).prev_hash()
    }

    fn block_exec_count(&self, contract: &str) -> i64 {
        (**self).block_exec_count(contract)
    }

    fn send(&mut self, from: &str, to: i64, amount: i64) -> Result<(), Fault> {
        (**self).send(from, to, amount)
    }

    fn store(&mut self, contract: &str, key: i64, value: i64) -> Result<(), Fault> {
        (**self).store(contract, key, value)
    }

    fn read(&self, contract: &str, key: i64) -> Result<i64, Fault> {
        (**self).read(contract, key)
    }

    fn on_complete(&mut self, contract: &str, result: ResultCode) {
        (**self).on_complete(contract, result)
    }
}

/// A host with no ledger and no storage.
///
/// Side-effecting host opcodes fault with `IllegalOpcode`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl Host for NullHost {
    fn send(&mut self, _from: &str, _to: i64, _amount: i64) -> Result<(), Fault> {
        Err(Fault::IllegalOpcode)
    }

    fn store(&mut self, _contract: &str, _key: i64, _value: i64) -> Result<(), Fault> {
        Err(Fault::IllegalOpcode)
    }

    fn read(&self, _contract: &str, _key: i64) -> Result<i64, Fault> {
        Err(Fault::IllegalOpcode)
    }
}

/// An in-memory host.
///
/// Transfers credit `accounts`; storage is per contract; reads of a
/// missing key yield zero. Block execution counts grow by one per
/// completed run until [`MemoryHost::new_block`] resets them.
///
/// The whole ledger serialises, so a [`FileStore`](crate::FileStore) can
/// keep it between processes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryHost {
    pub sender: [u8; 32],
    pub prev_hash: [u8; 32],
    pub accounts: HashMap<i64, i64>,
    /// Per-contract key/value storage.
    pub storage: HashMap<String, HashMap<i64, i64>>,
    pub block_counts: HashMap<String, i64>,
    /// When set, transfers to accounts not already in `accounts` are refused.
    pub known_accounts_only: bool,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sender(mut self, sender: [u8; 32]) -> Self {
        self.sender = sender;
        self
    }

    pub fn with_prev_hash(mut self, prev_hash: [u8; 32]) -> Self {
        self.prev_hash = prev_hash;
        self
    }

    pub fn with_account(mut self, account: i64, balance: i64) -> Self {
        self.accounts.insert(account, balance);
        self
    }

    /// Start a new block: record its predecessor and zero the per-block counts.
    pub fn new_block(&mut self, prev_hash: [u8; 32]) {
        self.prev_hash = prev_hash;
        self.block_counts.clear();
    }

    pub fn balance_of(&self, account: i64) -> i64 {
        self.accounts.get(&account).copied().unwrap_or(0)
    }

    /// Stored value, if `contract` ever wrote `key`.
    pub fn stored(&self, contract: &str, key: i64) -> Option<i64> {
        self.storage.get(contract)?.get(&key).copied()
    }
}

impl Host for MemoryHost {
    fn sender(&self) -> [u8; 32] {
        self.sender
    }

    fn prev_hash(&self) -> [u8; 32] {
        self.prev_hash
    }

    fn block_exec_count(&self, contract: &str) -> i64 {
        self.block_counts.get(contract).copied().unwrap_or(0)
    }

    fn send(&mut self, _from: &str, to: i64, amount: i64) -> Result<(), Fault> {
        if self.known_accounts_only && !self.accounts.contains_key(&to) {
            return Err(Fault::IllegalDestination);
        }
        let entry = self.accounts.entry(to).or_insert(0);
        *entry = entry.checked_add(amount).ok_or(Fault::IllegalDestination)?;
        Ok(())
    }

    fn store(&mut self, contract: &str, key: i64, value: i64) -> Result<(), Fault> {
        self.storage
            .entry(contract.to_string())
            .or_default()
            .insert(key, value);
        Ok(())
    }

    fn read(&self, contract: &str, key: i64) -> Result<i64, Fault> {
        Ok(self.stored(contract, key).unwrap_or(0))
    }

    fn on_complete(&mut self, contract: &str, _result: ResultCode) {
        let count = self.block_counts.entry(contract.to_string()).or_insert(0);
        *count = count.saturating_add(1);
    }
}

/// Split 32 bytes into four little-endian cells.
pub fn words(bytes: &[u8; 32]) -> [i64; 4] {
    let mut out = [0i64; 4];
    for (cell, chunk) in out.iter_mut().zip(bytes.chunks_exact(8)) {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(chunk);
        *cell = i64::from_le_bytes(buf);
    }
    out
}
