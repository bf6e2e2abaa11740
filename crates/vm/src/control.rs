//! Branch conditions and jump targets.

use crate::alu::CompareFlags;
use regvm_common::Opcode;

/// Whether `opcode` branches given the current flags.
///
/// JMP and CALL always branch; non-jump opcodes never do.
pub fn branch_taken(opcode: Opcode, flags: CompareFlags) -> bool {
    match opcode {
        Opcode::Jmp | Opcode::Call => true,
        Opcode::Jz => flags.eq,
        Opcode::Jnz => flags.ne,
        Opcode::Jlt => flags.lt,
        Opcode::Jlte => flags.le,
        Opcode::Jgt => flags.gt,
        Opcode::Jgte => flags.ge,
        _ => false,
    }
}

/// Program counter for a jump operand: its low 16 bits.
pub fn jump_target(value: i64) -> usize {
    (value as u64 & 0xFFFF) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditions_follow_flags() {
        let lt = CompareFlags::compare(1, 2);
        assert!(branch_taken(Opcode::Jlt, lt));
        assert!(branch_taken(Opcode::Jlte, lt));
        assert!(branch_taken(Opcode::Jnz, lt));
        assert!(!branch_taken(Opcode::Jz, lt));
        assert!(!branch_taken(Opcode::Jgt, lt));
        assert!(!branch_taken(Opcode::Jgte, lt));
    }

    #[test]
    fn default_flags_only_take_unconditional() {
        let flags = CompareFlags::default();
        assert!(branch_taken(Opcode::Jmp, flags));
        assert!(ALL_JCC.iter().all(|op| !branch_taken(*op, flags)));
    }

    const ALL_JCC: [Opcode; 6] = [
        Opcode::Jz,
        Opcode::Jnz,
        Opcode::Jlt,
        Opcode::Jlte,
        Opcode::Jgt,
        Opcode::Jgte,
    ];

    #[test]
    fn target_masks_to_sixteen_bits() {
        assert_eq!(jump_target(0x1_0005), 5);
        assert_eq!(jump_target(-1), 0xFFFF);
    }
}
