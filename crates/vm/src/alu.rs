//! Arithmetic and logic on 64-bit signed cells, plus the compare flags.
//!
//! All operations take `a` (the source value) and `b` (the destination's
//! current value) and produce the value written back to the destination.

use crate::error::Fault;
use regvm_common::Opcode;

/// Flags set by CMP and read by the conditional jumps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareFlags {
    pub eq: bool,
    pub ne: bool,
    pub lt: bool,
    pub le: bool,
    pub gt: bool,
    pub ge: bool,
}

impl CompareFlags {
    /// Flags for `a` compared against `b`.
    pub fn compare(a: i64, b: i64) -> Self {
        Self {
            eq: a == b,
            ne: a != b,
            lt: a < b,
            le: a <= b,
            gt: a > b,
            ge: a >= b,
        }
    }
}

/// Number of bits in a cell. Bit and shift operands index below this.
pub const CELL_BITS: u8 = 64;

/// Compute `opcode` over `a` and `b`.
///
/// `bit` is the literal bit byte of SET, CLR, ROL and ROR and is ignored by
/// the other operations. CMP has no result value and is rejected here.
pub fn compute(opcode: Opcode, a: i64, b: i64, bit: u8) -> Result<i64, Fault> {
    Ok(match opcode {
        Opcode::Add => a.wrapping_add(b),
        Opcode::Sub => a.wrapping_sub(b),
        Opcode::Mul => a.wrapping_mul(b),
        Opcode::Div => {
            if b == 0 {
                return Err(Fault::DivideByZero);
            }
            a.wrapping_div(b)
        }
        Opcode::And => a & b,
        Opcode::Or => a | b,
        Opcode::Xor => a ^ b,
        Opcode::Not => !a,
        Opcode::Inc => a.wrapping_add(1),
        Opcode::Dec => a.wrapping_sub(1),
        Opcode::Rol => a.wrapping_shl(shift_count(bit)),
        Opcode::Ror => ((a as u64).wrapping_shr(shift_count(bit))) as i64,
        Opcode::Set => a | (1i64 << bit_index(bit)?),
        Opcode::Clr => a & !(1i64 << bit_index(bit)?),
        _ => return Err(Fault::IllegalOpcode),
    })
}

fn shift_count(bit: u8) -> u32 {
    (bit & (CELL_BITS - 1)) as u32
}

fn bit_index(bit: u8) -> Result<u32, Fault> {
    if bit >= CELL_BITS {
        return Err(Fault::IllegalDestination);
    }
    Ok(bit as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_wraps() {
        assert_eq!(compute(Opcode::Add, i64::MAX, 1, 0), Ok(i64::MIN));
        assert_eq!(compute(Opcode::Sub, i64::MIN, 1, 0), Ok(i64::MAX));
        assert_eq!(compute(Opcode::Mul, i64::MAX, 2, 0), Ok(-2));
        assert_eq!(compute(Opcode::Inc, i64::MAX, 0, 0), Ok(i64::MIN));
        assert_eq!(compute(Opcode::Dec, i64::MIN, 0, 0), Ok(i64::MAX));
    }

    #[test]
    fn sub_is_source_minus_dest() {
        assert_eq!(compute(Opcode::Sub, 10, 3, 0), Ok(7));
    }

    #[test]
    fn div_truncates_and_guards_zero() {
        assert_eq!(compute(Opcode::Div, -7, 2, 0), Ok(-3));
        assert_eq!(compute(Opcode::Div, 1, 0, 0), Err(Fault::DivideByZero));
        assert_eq!(compute(Opcode::Div, i64::MIN, -1, 0), Ok(i64::MIN));
    }

    #[test]
    fn bitwise() {
        assert_eq!(compute(Opcode::And, 0b1100, 0b1010, 0), Ok(0b1000));
        assert_eq!(compute(Opcode::Or, 0b1100, 0b1010, 0), Ok(0b1110));
        assert_eq!(compute(Opcode::Xor, 0b1100, 0b1010, 0), Ok(0b0110));
        assert_eq!(compute(Opcode::Not, 0, 99, 0), Ok(-1));
    }

    #[test]
    fn shifts_are_logical_and_masked() {
        assert_eq!(compute(Opcode::Rol, 1, 0, 4), Ok(16));
        assert_eq!(compute(Opcode::Ror, -1, 0, 60), Ok(0xF));
        assert_eq!(compute(Opcode::Rol, 1, 0, 65), Ok(2));
    }

    #[test]
    fn set_and_clear_bits() {
        assert_eq!(compute(Opcode::Set, 0, 0, 63), Ok(i64::MIN));
        assert_eq!(compute(Opcode::Clr, -1, 0, 0), Ok(-2));
        assert_eq!(
            compute(Opcode::Set, 0, 0, 64),
            Err(Fault::IllegalDestination)
        );
    }

    #[test]
    fn compare_sets_all_six() {
        let f = CompareFlags::compare(1, 2);
        assert!(f.ne && f.lt && f.le && !f.eq && !f.gt && !f.ge);
        let f = CompareFlags::compare(5, 5);
        assert!(f.eq && f.le && f.ge && !f.ne && !f.lt && !f.gt);
    }

    #[test]
    fn non_alu_opcode_rejected() {
        assert_eq!(compute(Opcode::Cmp, 1, 1, 0), Err(Fault::IllegalOpcode));
    }
}
