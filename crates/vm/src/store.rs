//! Contract persistence.

use crate::error::StoreError;
use crate::host::MemoryHost;
use regvm_common::ContractRecord;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Loads and saves contract records by address.
pub trait ContractStore {
    fn load(&self, address: &str) -> Result<ContractRecord, StoreError>;
    fn save(&mut self, address: &str, record: &ContractRecord) -> Result<(), StoreError>;
}

/// A store backed by a map. Used in tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<String, ContractRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, address: &str) -> Option<&ContractRecord> {
        self.records.get(address)
    }

    /// Insert without validation.
    pub fn insert(&mut self, address: impl Into<String>, record: ContractRecord) {
        self.records.insert(address.into(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ContractStore for MemoryStore {
    fn load(&self, address: &str) -> Result<ContractRecord, StoreError> {
        self.records
            .get(address)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(address.to_string()))
    }

    fn save(&mut self, address: &str, record: &ContractRecord) -> Result<(), StoreError> {
        self.records.insert(address.to_string(), record.clone());
        Ok(())
    }
}

/// File holding the [`MemoryHost`] ledger inside a [`FileStore`] directory.
pub const LEDGER_FILE: &str = "ledger.json";

/// A store that keeps one JSON file per contract: `<dir>/<address>.dat`,
/// plus the host ledger in `<dir>/ledger.json`.
///
/// Saves go through a temporary file and a rename so a crash never leaves
/// a half-written record behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for `address`.
    pub fn path_for(&self, address: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_address(address) {
            return Err(StoreError::InvalidAddress(address.to_string()));
        }
        Ok(self.dir.join(format!("{address}.dat")))
    }

    /// Load the ledger kept next to the records; an empty one if none was
    /// saved yet.
    pub fn load_ledger(&self) -> Result<MemoryHost, StoreError> {
        let text = match fs::read_to_string(self.dir.join(LEDGER_FILE)) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(MemoryHost::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text).map_err(|e| StoreError::MalformedLedger(e.to_string()))
    }

    pub fn save_ledger(&self, ledger: &MemoryHost) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(ledger)
            .map_err(|e| StoreError::MalformedLedger(e.to_string()))?;
        write_replacing(&self.dir.join(LEDGER_FILE), &json)
    }
}

/// Write through a sibling `.tmp` file and rename over `path`.
fn write_replacing(path: &Path, contents: &str) -> Result<(), StoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Addresses become file names: ASCII alphanumerics, `_`, `-` and `.`,
/// not starting with `.`.
fn is_valid_address(address: &str) -> bool {
    !address.is_empty()
        && !address.starts_with('.')
        && address
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
}

impl ContractStore for FileStore {
    fn load(&self, address: &str) -> Result<ContractRecord, StoreError> {
        let path = self.path_for(address)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(address.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text).map_err(|e| StoreError::Malformed {
            address: address.to_string(),
            reason: e.to_string(),
        })
    }

    fn save(&mut self, address: &str, record: &ContractRecord) -> Result<(), StoreError> {
        let path = self.path_for(address)?;
        let json = serde_json::to_string_pretty(record).map_err(|e| StoreError::Malformed {
            address: address.to_string(),
            reason: e.to_string(),
        })?;
        write_replacing(&path, &json)
    }
}
