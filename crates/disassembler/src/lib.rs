//! regvm disassembler: bytecode to listing text.
//!
//! The listing is one line per instruction, prefixed with its byte offset.
//! Bytes that do not start a decodable instruction are shown as `.byte`
//! and the walk resumes at the next byte.
//!
//! # Usage
//!
//! ```
//! use regvm_common::{encode_all, Instruction, Opcode, Operand};
//! use regvm_disassembler::disassemble;
//!
//! let code = encode_all(&[
//!     Instruction::source_dest(Opcode::Move, Operand::Immediate(4), Operand::Register(0)),
//!     Instruction::bare(Opcode::End),
//! ]);
//! assert_eq!(disassemble(&code), "0000  MOVE #4, r0\n000b  END\n");
//! ```

pub mod format;

use regvm_common::{ContractRecord, Instruction};
use std::collections::BTreeSet;
use std::fmt::Write;

/// One decoded line of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Instruction { at: usize, instr: Instruction },
    /// A byte that does not begin a decodable instruction.
    Byte { at: usize, byte: u8 },
}

impl Line {
    pub fn offset(&self) -> usize {
        match self {
            Line::Instruction { at, .. } | Line::Byte { at, .. } => *at,
        }
    }

    pub fn text(&self) -> String {
        match self {
            Line::Instruction { instr, .. } => format::instruction(instr),
            Line::Byte { byte, .. } => format!(".byte {byte:#04x}"),
        }
    }
}

/// Walk `code` from offset 0.
pub fn decode_lines(code: &[u8]) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut at = 0;
    while at < code.len() {
        match Instruction::decode(code, at) {
            Ok(instr) => {
                let len = instr.len();
                lines.push(Line::Instruction { at, instr });
                at += len;
            }
            Err(_) => {
                lines.push(Line::Byte { at, byte: code[at] });
                at += 1;
            }
        }
    }
    lines
}

/// Listing of raw bytecode.
pub fn disassemble(code: &[u8]) -> String {
    let mut out = String::new();
    for line in decode_lines(code) {
        let _ = writeln!(out, "{:04x}  {}", line.offset(), line.text());
    }
    out
}

/// Listing of a contract record: a header, then the logical code with
/// function labels at their entry offsets.
///
/// Entries that do not land on an instruction boundary of the linear walk
/// are noted in the header.
pub fn disassemble_record(record: &ContractRecord) -> String {
    let code = record.code();
    let lines = decode_lines(code);
    let starts: BTreeSet<usize> = lines.iter().map(Line::offset).collect();

    let mut out = String::new();
    let _ = writeln!(out, "; owner: {}", record.owner);
    let _ = writeln!(out, "; balance: {}", record.balance);
    let _ = writeln!(out, "; executions: {}", record.exec_count_lifetime);
    let _ = writeln!(
        out,
        "; code: {} bytes (buffer {})",
        record.byte_code_len,
        record.bytecode.len()
    );
    for f in &record.functions {
        if !starts.contains(&f.offset) {
            let _ = writeln!(
                out,
                "; entry '{}' at {:#06x} is not on an instruction boundary",
                f.name, f.offset
            );
        }
    }

    for line in &lines {
        for f in record.functions.iter().filter(|f| f.offset == line.offset()) {
            let _ = writeln!(out, "{}:", f.name);
        }
        let _ = writeln!(out, "{:04x}  {}", line.offset(), line.text());
    }
    out
}
