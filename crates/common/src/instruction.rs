//! Decoded instructions and their byte encoding.
//!
//! Layout by shape (see [`Shape`]):
//! ```text
//! None           op
//! Source         op mode src
//! Dest           op mode dst
//! SourceDest     op mode src dst
//! SourceDestBit  op mode bit src dst
//! ```
//! Operand widths depend on the mode fields of `mode`.

use crate::error::DecodeError;
use crate::mode::{AddressingMode, ModeByte, Operand};
use crate::opcode::{Opcode, Shape};

/// A single decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Literal bit index / shift count for ROL, ROR, SET and CLR.
    pub bit: Option<u8>,
    pub source: Option<Operand>,
    pub dest: Option<Operand>,
}

#[allow(clippy::len_without_is_empty)]
impl Instruction {
    /// An instruction with no operands (`END`, `RETURN`).
    pub fn bare(opcode: Opcode) -> Self {
        Self {
            opcode,
            bit: None,
            source: None,
            dest: None,
        }
    }

    pub fn source_dest(opcode: Opcode, source: Operand, dest: Operand) -> Self {
        Self {
            opcode,
            bit: None,
            source: Some(source),
            dest: Some(dest),
        }
    }

    pub fn with_bit(opcode: Opcode, bit: u8, source: Operand, dest: Operand) -> Self {
        Self {
            opcode,
            bit: Some(bit),
            source: Some(source),
            dest: Some(dest),
        }
    }

    pub fn source_only(opcode: Opcode, source: Operand) -> Self {
        Self {
            opcode,
            bit: None,
            source: Some(source),
            dest: None,
        }
    }

    pub fn dest_only(opcode: Opcode, dest: Operand) -> Self {
        Self {
            opcode,
            bit: None,
            source: None,
            dest: Some(dest),
        }
    }

    /// The mode byte this instruction encodes with. Absent operands
    /// contribute zero bits.
    pub fn mode_byte(&self) -> ModeByte {
        let source = self
            .source
            .map(|op| op.mode())
            .unwrap_or(AddressingMode::Immediate);
        let dest = self
            .dest
            .map(|op| op.mode())
            .unwrap_or(AddressingMode::Immediate);
        ModeByte::new(source, dest)
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        encoded_len(self.opcode.shape(), self.mode_byte())
    }

    /// Encode to bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.push(self.opcode as u8);
        if self.opcode.shape() == Shape::None {
            return bytes;
        }
        bytes.push(self.mode_byte().0);
        if let Some(bit) = self.bit {
            bytes.push(bit);
        }
        if let Some(source) = &self.source {
            source.encode_into(&mut bytes);
        }
        if let Some(dest) = &self.dest {
            dest.encode_into(&mut bytes);
        }
        bytes
    }

    /// Decode the instruction starting at `code[at]`.
    ///
    /// Operands the shape does not declare are left as `None`, whatever
    /// the unused mode bits say.
    pub fn decode(code: &[u8], at: usize) -> Result<Self, DecodeError> {
        let byte = *code.get(at).ok_or(DecodeError::OutOfRange {
            at,
            len: code.len(),
        })?;
        let opcode = Opcode::try_from(byte)?;
        let shape = opcode.shape();
        let mut instr = Instruction::bare(opcode);
        if shape == Shape::None {
            return Ok(instr);
        }

        let available = code.len() - at;
        let truncated = |needed: usize| DecodeError::Truncated {
            at,
            opcode,
            needed,
            available,
        };

        let mode = ModeByte(*code.get(at + 1).ok_or_else(|| truncated(2))?);
        let needed = encoded_len(shape, mode);
        if needed > available {
            return Err(truncated(needed));
        }

        let mut cursor = at + 2;
        if shape.has_bit() {
            instr.bit = Some(code[cursor]);
            cursor += 1;
        }
        if shape.has_source() {
            let source = Operand::decode(mode.source(), &code[cursor..])
                .ok_or_else(|| truncated(needed))?;
            cursor += source.len();
            instr.source = Some(source);
        }
        if shape.has_dest() {
            let dest =
                Operand::decode(mode.dest(), &code[cursor..]).ok_or_else(|| truncated(needed))?;
            instr.dest = Some(dest);
        }
        Ok(instr)
    }
}

/// Size of an instruction with `shape` encoded under `mode`.
pub fn encoded_len(shape: Shape, mode: ModeByte) -> usize {
    if shape == Shape::None {
        return 1;
    }
    let mut len = 2;
    if shape.has_bit() {
        len += 1;
    }
    if shape.has_source() {
        len += mode.source().operand_len();
    }
    if shape.has_dest() {
        len += mode.dest().operand_len();
    }
    len
}

/// Encode a sequence of instructions back to back.
pub fn encode_all(instrs: &[Instruction]) -> Vec<u8> {
    instrs.iter().flat_map(|i| i.encode()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_immediate_to_register_layout() {
        let instr = Instruction::source_dest(
            Opcode::Move,
            Operand::Immediate(5),
            Operand::Register(0),
        );
        assert_eq!(
            instr.encode(),
            vec![0x00, 0x01, 5, 0, 0, 0, 0, 0, 0, 0, 0x00]
        );
        assert_eq!(instr.len(), 11);
    }

    #[test]
    fn bit_byte_precedes_operands() {
        let instr = Instruction::with_bit(
            Opcode::Rol,
            3,
            Operand::Register(1),
            Operand::Memory(0x0102),
        );
        assert_eq!(instr.encode(), vec![13, 0b0110, 3, 1, 0x01, 0x02]);
    }

    #[test]
    fn end_is_one_byte() {
        assert_eq!(Instruction::bare(Opcode::End).encode(), vec![26]);
    }

    #[test]
    fn decode_reads_back_encoded_operands() {
        let instr =
            Instruction::source_dest(Opcode::Add, Operand::Indirect(7), Operand::Memory(9));
        let mut code = vec![0xAA];
        code.extend(instr.encode());
        assert_eq!(Instruction::decode(&code, 1), Ok(instr));
    }

    #[test]
    fn decode_ignores_unused_mode_bits() {
        // PUSH with dest bits set: only the source operand is read.
        let code = [1, 0b0111, 4];
        let instr = Instruction::decode(&code, 0).unwrap();
        assert_eq!(instr.source, Some(Operand::Register(4)));
        assert_eq!(instr.dest, None);
    }

    #[test]
    fn decode_truncated_literal() {
        let code = [0, 0x01, 1, 2, 3];
        assert_eq!(
            Instruction::decode(&code, 0),
            Err(DecodeError::Truncated {
                at: 0,
                opcode: Opcode::Move,
                needed: 11,
                available: 5
            })
        );
    }

    #[test]
    fn decode_missing_mode_byte() {
        assert_eq!(
            Instruction::decode(&[2], 0),
            Err(DecodeError::Truncated {
                at: 0,
                opcode: Opcode::Pop,
                needed: 2,
                available: 1
            })
        );
    }

    #[test]
    fn decode_unknown_and_out_of_range() {
        assert_eq!(
            Instruction::decode(&[255], 0),
            Err(DecodeError::UnknownOpcode(255))
        );
        assert_eq!(
            Instruction::decode(&[26], 1),
            Err(DecodeError::OutOfRange { at: 1, len: 1 })
        );
    }
}
