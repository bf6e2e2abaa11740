//! Addressing resolver: turns the operand bytes at the program counter into
//! a value or a writable location.
//!
//! Every resolve step consumes exactly the operand bytes of its mode and
//! advances the program counter past them. Indirect operands are turned
//! into memory locations here, so the rest of the machine only ever sees
//! registers and absolute addresses.

use crate::error::Fault;
use crate::machine::ExecutionState;
use regvm_common::mode::IMMEDIATE_LEN;
use regvm_common::{AddressingMode, ModeByte, Slot};

/// A writable storage cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Register(u8),
    Memory(u16),
}

/// A resolved operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    Immediate(i64),
    Location(Location),
}

impl ExecutionState {
    /// Consume the mode byte.
    pub(crate) fn fetch_mode(&mut self, code: &[u8]) -> Result<ModeByte, Fault> {
        Ok(ModeByte(self.fetch_byte(code)?))
    }

    /// Consume one operand of `mode`.
    pub(crate) fn resolve(&mut self, code: &[u8], mode: AddressingMode) -> Result<Resolved, Fault> {
        let bytes = self.take(code, mode.operand_len())?;
        Ok(match mode {
            AddressingMode::Immediate => {
                let mut lit = [0u8; IMMEDIATE_LEN];
                lit.copy_from_slice(bytes);
                Resolved::Immediate(i64::from_le_bytes(lit))
            }
            AddressingMode::Register => Resolved::Location(Location::Register(bytes[0])),
            AddressingMode::Memory => {
                Resolved::Location(Location::Memory(u16::from_be_bytes([bytes[0], bytes[1]])))
            }
            AddressingMode::Indirect => {
                let base = self.registers[bytes[0] as usize];
                Resolved::Location(Location::Memory(base as u16))
            }
        })
    }

    /// Consume the operand in `slot` and return its value.
    pub(crate) fn resolve_read(
        &mut self,
        code: &[u8],
        mode: ModeByte,
        slot: Slot,
    ) -> Result<i64, Fault> {
        let operand = self.resolve(code, mode.get(slot))?;
        Ok(self.load(operand))
    }

    /// Consume the destination operand and return where it points.
    ///
    /// An immediate destination faults before its literal is read.
    pub(crate) fn resolve_location(
        &mut self,
        code: &[u8],
        mode: ModeByte,
    ) -> Result<Location, Fault> {
        match self.resolve(code, writable(mode.dest())?)? {
            Resolved::Location(loc) => Ok(loc),
            Resolved::Immediate(_) => Err(Fault::StoreToImmediate),
        }
    }

    /// Consume the destination operand and write `value` to it.
    pub(crate) fn resolve_write(
        &mut self,
        code: &[u8],
        mode: ModeByte,
        value: i64,
    ) -> Result<(), Fault> {
        let loc = self.resolve_location(code, mode)?;
        self.store(loc, value);
        Ok(())
    }

    pub(crate) fn load(&self, operand: Resolved) -> i64 {
        match operand {
            Resolved::Immediate(v) => v,
            Resolved::Location(loc) => self.read_at(loc),
        }
    }

    pub(crate) fn read_at(&self, loc: Location) -> i64 {
        match loc {
            Location::Register(r) => self.registers[r as usize],
            Location::Memory(a) => self.memory[a as usize],
        }
    }

    pub(crate) fn store(&mut self, loc: Location, value: i64) {
        match loc {
            Location::Register(r) => self.registers[r as usize] = value,
            Location::Memory(a) => self.memory[a as usize] = value,
        }
    }
}

fn writable(mode: AddressingMode) -> Result<AddressingMode, Fault> {
    match mode {
        AddressingMode::Immediate => Err(Fault::StoreToImmediate),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regvm_common::Operand;

    fn bytes(mode: u8, operands: &[Operand]) -> Vec<u8> {
        let mut out = vec![mode];
        for op in operands {
            op.encode_into(&mut out);
        }
        out
    }

    #[test]
    fn immediate_is_little_endian() {
        let code = bytes(0, &[Operand::Immediate(0x0102)]);
        let mut state = ExecutionState::new(0);
        let mode = state.fetch_mode(&code).unwrap();
        assert_eq!(state.resolve_read(&code, mode, Slot::Source), Ok(0x0102));
        assert_eq!(state.pc(), 9);
    }

    #[test]
    fn memory_address_is_big_endian() {
        let code = [0b1000, 0x12, 0x34];
        let mut state = ExecutionState::new(0);
        state.memory[0x1234] = 77;
        let mode = state.fetch_mode(&code).unwrap();
        assert_eq!(state.resolve_read(&code, mode, Slot::Source), Ok(77));
        assert_eq!(state.pc(), 3);
    }

    #[test]
    fn indirect_uses_low_sixteen_bits() {
        let code = [0b1100, 4];
        let mut state = ExecutionState::new(0);
        state.registers[4] = 0x7_0010;
        state.memory[0x0010] = -5;
        let mode = state.fetch_mode(&code).unwrap();
        assert_eq!(state.resolve_read(&code, mode, Slot::Source), Ok(-5));
    }

    #[test]
    fn write_to_immediate_faults_without_reading_literal() {
        let code = [0b0100, 0];
        let mut state = ExecutionState::new(0);
        let mode = state.fetch_mode(&code).unwrap();
        assert_eq!(
            state.resolve_write(&code, mode, 1),
            Err(Fault::StoreToImmediate)
        );
        assert_eq!(state.pc(), 1);
    }

    #[test]
    fn truncated_operand_is_rom_fault() {
        let code = [0b0010, 0x00];
        let mut state = ExecutionState::new(0);
        let mode = state.fetch_mode(&code).unwrap();
        assert_eq!(
            state.resolve_write(&code, mode, 1),
            Err(Fault::AccessOutsideRom)
        );
        assert!(state.is_pristine());
    }

    #[test]
    fn register_write_then_read() {
        let code = bytes(0b0101, &[Operand::Register(9), Operand::Register(9)]);
        let mut state = ExecutionState::new(0);
        let mode = state.fetch_mode(&code).unwrap();
        state.registers[9] = 3;
        let v = state.resolve_read(&code, mode, Slot::Source).unwrap();
        state.resolve_write(&code, mode, v * 2).unwrap();
        assert_eq!(state.register(9), 6);
        assert_eq!(state.pc(), code.len());
    }
}
