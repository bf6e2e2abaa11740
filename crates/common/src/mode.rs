//! Addressing modes and the packed mode byte.
//!
//! ```text
//! bit  7 6 5 4 | 3 2      | 1 0
//!      unused  | src mode | dst mode
//! ```

/// Number of bytes in an immediate literal.
pub const IMMEDIATE_LEN: usize = 8;

/// How an operand's value or storage location is found.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// 8-byte little-endian literal. Cannot be written.
    Immediate = 0,
    /// 1-byte register index.
    Register = 1,
    /// 2-byte big-endian absolute memory address.
    Memory = 2,
    /// 1-byte register index; the register's low 16 bits address memory.
    Indirect = 3,
}

impl AddressingMode {
    /// Decode the two low bits of `bits`. Every 2-bit value is a mode.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => AddressingMode::Immediate,
            1 => AddressingMode::Register,
            2 => AddressingMode::Memory,
            _ => AddressingMode::Indirect,
        }
    }

    /// Operand bytes consumed by this mode.
    pub fn operand_len(self) -> usize {
        match self {
            AddressingMode::Immediate => IMMEDIATE_LEN,
            AddressingMode::Register | AddressingMode::Indirect => 1,
            AddressingMode::Memory => 2,
        }
    }

    /// Whether the operand names a memory cell.
    pub fn addresses_memory(self) -> bool {
        matches!(self, AddressingMode::Memory | AddressingMode::Indirect)
    }
}

/// Selects which field of a mode byte applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Source,
    Dest,
}

/// A packed mode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModeByte(pub u8);

impl ModeByte {
    /// Pack a source and destination mode.
    pub fn new(source: AddressingMode, dest: AddressingMode) -> Self {
        Self(((source as u8) << 2) | dest as u8)
    }

    /// Mode in bits 2-3.
    pub fn source(self) -> AddressingMode {
        AddressingMode::from_bits(self.0 >> 2)
    }

    /// Mode in bits 0-1.
    pub fn dest(self) -> AddressingMode {
        AddressingMode::from_bits(self.0)
    }

    pub fn get(self, slot: Slot) -> AddressingMode {
        match slot {
            Slot::Source => self.source(),
            Slot::Dest => self.dest(),
        }
    }
}

/// A decoded operand, as written in the instruction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Immediate(i64),
    Register(u8),
    Memory(u16),
    Indirect(u8),
}

#[allow(clippy::len_without_is_empty)]
impl Operand {
    pub fn mode(&self) -> AddressingMode {
        match self {
            Operand::Immediate(_) => AddressingMode::Immediate,
            Operand::Register(_) => AddressingMode::Register,
            Operand::Memory(_) => AddressingMode::Memory,
            Operand::Indirect(_) => AddressingMode::Indirect,
        }
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.mode().operand_len()
    }

    /// Append the operand bytes to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match *self {
            Operand::Immediate(v) => out.extend_from_slice(&v.to_le_bytes()),
            Operand::Register(r) | Operand::Indirect(r) => out.push(r),
            Operand::Memory(addr) => out.extend_from_slice(&addr.to_be_bytes()),
        }
    }

    /// Decode an operand of `mode` from the start of `bytes`.
    ///
    /// Returns `None` if `bytes` is shorter than the mode requires.
    pub fn decode(mode: AddressingMode, bytes: &[u8]) -> Option<Self> {
        let raw = bytes.get(..mode.operand_len())?;
        Some(match mode {
            AddressingMode::Immediate => {
                let mut lit = [0u8; IMMEDIATE_LEN];
                lit.copy_from_slice(raw);
                Operand::Immediate(i64::from_le_bytes(lit))
            }
            AddressingMode::Register => Operand::Register(raw[0]),
            AddressingMode::Memory => Operand::Memory(u16::from_be_bytes([raw[0], raw[1]])),
            AddressingMode::Indirect => Operand::Indirect(raw[0]),
        })
    }
}
