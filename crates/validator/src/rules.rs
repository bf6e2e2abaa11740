//! Per-shape operand rules.
//!
//! The structural scan calls one hook per instruction, chosen by the
//! opcode's [`Shape`]. [`PermissiveRules`] approves every operand pattern
//! the scan could decode; [`StrictRules`] rejects encodings that can only
//! fault at runtime.

use regvm_common::{AddressingMode, Instruction, Opcode, Operand, Shape};

/// Result of a rule hook: `Err` carries a human-readable reason.
pub type RuleResult = Result<(), String>;

/// Operand rules, one hook per instruction shape. Every hook approves by
/// default.
pub trait OperandRules {
    /// MOVE, arithmetic, logic, CMP, and the bit-indexed ROL/ROR/SET/CLR.
    fn source_and_dest(&self, _instr: &Instruction) -> RuleResult {
        Ok(())
    }

    /// PUSH.
    fn source_only(&self, _instr: &Instruction) -> RuleResult {
        Ok(())
    }

    /// POP, CALL, jumps, BALANCE, DYN, EXECCOUNTC, EXECCOUNTB.
    fn dest_only(&self, _instr: &Instruction) -> RuleResult {
        Ok(())
    }

    /// DATA, SENDER, PREVHASH.
    fn memory_dest_only(&self, _instr: &Instruction) -> RuleResult {
        Ok(())
    }

    fn send(&self, _instr: &Instruction) -> RuleResult {
        Ok(())
    }

    fn read(&self, _instr: &Instruction) -> RuleResult {
        Ok(())
    }

    fn store(&self, _instr: &Instruction) -> RuleResult {
        Ok(())
    }
}

/// Approves everything that decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveRules;

impl OperandRules for PermissiveRules {}

/// Rejects encodings that are guaranteed to fault when executed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictRules;

fn writable(dest: Option<Operand>) -> RuleResult {
    match dest {
        Some(Operand::Immediate(_)) => Err("immediate destination".into()),
        _ => Ok(()),
    }
}

impl OperandRules for StrictRules {
    fn source_and_dest(&self, instr: &Instruction) -> RuleResult {
        if let (Opcode::Set | Opcode::Clr, Some(bit)) = (instr.opcode, instr.bit) {
            if bit >= 64 {
                return Err(format!("bit index {bit} out of range"));
            }
        }
        if instr.opcode == Opcode::Cmp {
            return Ok(());
        }
        writable(instr.dest)
    }

    fn dest_only(&self, instr: &Instruction) -> RuleResult {
        if instr.opcode.is_jump() || instr.opcode == Opcode::Call {
            return Ok(());
        }
        writable(instr.dest)
    }

    fn memory_dest_only(&self, instr: &Instruction) -> RuleResult {
        match instr.dest.map(|d| d.mode()) {
            Some(mode) if mode.addresses_memory() => Ok(()),
            Some(AddressingMode::Immediate) => Err("immediate destination".into()),
            _ => Err("destination must address memory".into()),
        }
    }

    fn read(&self, instr: &Instruction) -> RuleResult {
        writable(instr.dest)
    }
}

/// Dispatch `instr` to the hook for its shape.
pub fn check_operands<R: OperandRules + ?Sized>(rules: &R, instr: &Instruction) -> RuleResult {
    match instr.opcode.shape() {
        Shape::None => Ok(()),
        Shape::SourceDest | Shape::SourceDestBit => rules.source_and_dest(instr),
        Shape::Source => rules.source_only(instr),
        Shape::Dest => rules.dest_only(instr),
        Shape::MemoryDest => rules.memory_dest_only(instr),
        Shape::Send => rules.send(instr),
        Shape::Read => rules.read(instr),
        Shape::Store => rules.store(instr),
    }
}
