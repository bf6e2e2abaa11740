//! Opcode definitions for the regvm instruction set.
//!
//! Byte values are fixed: existing contracts are encoded against them.

use crate::error::DecodeError;

/// Byte formerly used by `EXECUTE`. It is not part of the catalog.
pub const RESERVED_EXECUTE: u8 = 34;

/// Identifies the operation to perform.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    // Data movement
    /// Copy source to destination.
    Move = 0,
    /// Push source onto the value stack.
    Push = 1,
    /// Pop the value stack into destination.
    Pop = 2,

    // Arithmetic & logic: `dst <- src OP dst`
    /// Wrapping addition.
    Add = 3,
    /// Wrapping subtraction (source minus destination).
    Sub = 4,
    /// Bitwise AND.
    And = 5,
    /// Bitwise XOR.
    Xor = 6,
    /// Bitwise OR.
    Or = 7,
    /// Bitwise complement of source.
    Not = 8,
    /// Wrapping multiplication.
    Mul = 9,
    /// Truncating division. Divisor zero is a fault.
    Div = 10,
    /// Source plus one.
    Inc = 11,
    /// Source minus one.
    Dec = 12,
    /// Logical shift left by the literal bit byte.
    Rol = 13,
    /// Logical shift right by the literal bit byte.
    Ror = 14,
    /// Set all six compare flags from source vs destination.
    Cmp = 15,
    /// Set one bit of source, selected by the literal bit byte.
    Set = 16,
    /// Clear one bit of source, selected by the literal bit byte.
    Clr = 17,

    // Control flow
    /// Push return address and jump.
    Call = 18,
    /// Return from CALL, or finish the invocation at depth zero.
    Return = 19,
    /// Jump if equal.
    Jz = 20,
    /// Jump if not equal.
    Jnz = 21,
    /// Jump if less than.
    Jlt = 22,
    /// Jump if less than or equal.
    Jlte = 23,
    /// Jump if greater than.
    Jgt = 24,
    /// Jump if greater than or equal.
    Jgte = 25,
    /// Terminate the invocation.
    End = 26,

    // Host mediated
    /// Transfer value out of the contract.
    Send = 27,
    /// Write a key/value pair to contract storage.
    Store = 28,
    /// Read a key from contract storage.
    Read = 29,
    /// Contract balance into destination.
    Balance = 30,
    /// Invocation parameters into memory.
    Data = 31,
    /// Amount sent with the invocation into destination.
    Dyn = 32,
    /// Sender identity (32 bytes) into memory.
    Sender = 33,
    /// Previous block hash (32 bytes) into memory.
    PrevHash = 35,
    /// Lifetime execution count of the contract into destination.
    ExecCountC = 36,
    /// Execution count reported by the host into destination.
    ExecCountB = 37,

    /// Unconditional jump.
    Jmp = 38,
}

/// Operand layout of an instruction, following the opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// No operand bytes.
    None,
    /// `mode src dst`.
    SourceDest,
    /// `mode bit src dst`.
    SourceDestBit,
    /// `mode src`.
    Source,
    /// `mode dst`.
    Dest,
    /// `mode dst`, destination must address memory.
    MemoryDest,
    /// `mode src dst` for SEND.
    Send,
    /// `mode src dst` for STORE.
    Store,
    /// `mode src dst` for READ.
    Read,
}

impl Shape {
    /// Whether the layout includes a source operand.
    pub fn has_source(self) -> bool {
        matches!(
            self,
            Shape::SourceDest
                | Shape::SourceDestBit
                | Shape::Source
                | Shape::Send
                | Shape::Store
                | Shape::Read
        )
    }

    /// Whether the layout includes a destination operand.
    pub fn has_dest(self) -> bool {
        !matches!(self, Shape::None | Shape::Source)
    }

    /// Whether the layout includes the literal bit byte.
    pub fn has_bit(self) -> bool {
        self == Shape::SourceDestBit
    }
}

/// All catalog opcodes, in byte order.
pub const ALL_OPCODES: [Opcode; 38] = [
    Opcode::Move,
    Opcode::Push,
    Opcode::Pop,
    Opcode::Add,
    Opcode::Sub,
    Opcode::And,
    Opcode::Xor,
    Opcode::Or,
    Opcode::Not,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Inc,
    Opcode::Dec,
    Opcode::Rol,
    Opcode::Ror,
    Opcode::Cmp,
    Opcode::Set,
    Opcode::Clr,
    Opcode::Call,
    Opcode::Return,
    Opcode::Jz,
    Opcode::Jnz,
    Opcode::Jlt,
    Opcode::Jlte,
    Opcode::Jgt,
    Opcode::Jgte,
    Opcode::End,
    Opcode::Send,
    Opcode::Store,
    Opcode::Read,
    Opcode::Balance,
    Opcode::Data,
    Opcode::Dyn,
    Opcode::Sender,
    Opcode::PrevHash,
    Opcode::ExecCountC,
    Opcode::ExecCountB,
    Opcode::Jmp,
];

impl TryFrom<u8> for Opcode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Opcode::Move),
            1 => Ok(Opcode::Push),
            2 => Ok(Opcode::Pop),
            3 => Ok(Opcode::Add),
            4 => Ok(Opcode::Sub),
            5 => Ok(Opcode::And),
            6 => Ok(Opcode::Xor),
            7 => Ok(Opcode::Or),
            8 => Ok(Opcode::Not),
            9 => Ok(Opcode::Mul),
            10 => Ok(Opcode::Div),
            11 => Ok(Opcode::Inc),
            12 => Ok(Opcode::Dec),
            13 => Ok(Opcode::Rol),
            14 => Ok(Opcode::Ror),
            15 => Ok(Opcode::Cmp),
            16 => Ok(Opcode::Set),
            17 => Ok(Opcode::Clr),
            18 => Ok(Opcode::Call),
            19 => Ok(Opcode::Return),
            20 => Ok(Opcode::Jz),
            21 => Ok(Opcode::Jnz),
            22 => Ok(Opcode::Jlt),
            23 => Ok(Opcode::Jlte),
            24 => Ok(Opcode::Jgt),
            25 => Ok(Opcode::Jgte),
            26 => Ok(Opcode::End),
            27 => Ok(Opcode::Send),
            28 => Ok(Opcode::Store),
            29 => Ok(Opcode::Read),
            30 => Ok(Opcode::Balance),
            31 => Ok(Opcode::Data),
            32 => Ok(Opcode::Dyn),
            33 => Ok(Opcode::Sender),
            RESERVED_EXECUTE => Err(DecodeError::ReservedOpcode(value)),
            35 => Ok(Opcode::PrevHash),
            36 => Ok(Opcode::ExecCountC),
            37 => Ok(Opcode::ExecCountB),
            38 => Ok(Opcode::Jmp),
            _ => Err(DecodeError::UnknownOpcode(value)),
        }
    }
}

impl Opcode {
    /// Returns the mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::And => "AND",
            Opcode::Xor => "XOR",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Inc => "INC",
            Opcode::Dec => "DEC",
            Opcode::Rol => "ROL",
            Opcode::Ror => "ROR",
            Opcode::Cmp => "CMP",
            Opcode::Set => "SET",
            Opcode::Clr => "CLR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::Jz => "JZ",
            Opcode::Jnz => "JNZ",
            Opcode::Jlt => "JLT",
            Opcode::Jlte => "JLTE",
            Opcode::Jgt => "JGT",
            Opcode::Jgte => "JGTE",
            Opcode::End => "END",
            Opcode::Send => "SEND",
            Opcode::Store => "STORE",
            Opcode::Read => "READ",
            Opcode::Balance => "BALANCE",
            Opcode::Data => "DATA",
            Opcode::Dyn => "DYN",
            Opcode::Sender => "SENDER",
            Opcode::PrevHash => "PREVHASH",
            Opcode::ExecCountC => "EXECCOUNTC",
            Opcode::ExecCountB => "EXECCOUNTB",
            Opcode::Jmp => "JMP",
        }
    }

    /// Look an opcode up by its mnemonic (case-insensitive).
    pub fn from_mnemonic(name: &str) -> Option<Opcode> {
        ALL_OPCODES
            .iter()
            .copied()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name))
    }

    /// Operand layout that follows the opcode byte.
    pub fn shape(&self) -> Shape {
        match self {
            Opcode::Return | Opcode::End => Shape::None,

            Opcode::Move
            | Opcode::Add
            | Opcode::Sub
            | Opcode::And
            | Opcode::Xor
            | Opcode::Or
            | Opcode::Not
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Inc
            | Opcode::Dec
            | Opcode::Cmp => Shape::SourceDest,

            Opcode::Rol | Opcode::Ror | Opcode::Set | Opcode::Clr => Shape::SourceDestBit,

            Opcode::Push => Shape::Source,

            Opcode::Pop
            | Opcode::Call
            | Opcode::Jz
            | Opcode::Jnz
            | Opcode::Jlt
            | Opcode::Jlte
            | Opcode::Jgt
            | Opcode::Jgte
            | Opcode::Jmp
            | Opcode::Balance
            | Opcode::Dyn
            | Opcode::ExecCountC
            | Opcode::ExecCountB => Shape::Dest,

            Opcode::Data | Opcode::Sender | Opcode::PrevHash => Shape::MemoryDest,

            Opcode::Send => Shape::Send,
            Opcode::Store => Shape::Store,
            Opcode::Read => Shape::Read,
        }
    }

    /// True for opcodes that end a validator scan.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Opcode::Return | Opcode::End)
    }

    /// True for the conditional and unconditional jumps.
    pub fn is_jump(&self) -> bool {
        matches!(
            self,
            Opcode::Jz
                | Opcode::Jnz
                | Opcode::Jlt
                | Opcode::Jlte
                | Opcode::Jgt
                | Opcode::Jgte
                | Opcode::Jmp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_valid_opcodes() {
        for &opcode in &ALL_OPCODES {
            let byte = opcode as u8;
            assert_eq!(
                Opcode::try_from(byte),
                Ok(opcode),
                "roundtrip failed for {opcode:?} ({byte})"
            );
        }
    }

    #[test]
    fn execute_byte_is_reserved() {
        assert_eq!(
            Opcode::try_from(RESERVED_EXECUTE),
            Err(DecodeError::ReservedOpcode(34))
        );
    }

    #[test]
    fn bytes_past_jmp_are_unknown() {
        for byte in 39..=255u8 {
            assert_eq!(
                Opcode::try_from(byte),
                Err(DecodeError::UnknownOpcode(byte)),
                "byte {byte} should be outside the catalog"
            );
        }
    }

    #[test]
    fn catalog_covers_every_byte_below_39_except_execute() {
        let decoded = (0..39u8).filter(|b| Opcode::try_from(*b).is_ok()).count();
        assert_eq!(decoded, ALL_OPCODES.len());
    }

    #[test]
    fn mnemonics_are_uppercase_and_resolvable() {
        for &opcode in &ALL_OPCODES {
            let m = opcode.mnemonic();
            assert_eq!(m, m.to_uppercase(), "mnemonic should be uppercase: {m}");
            assert_eq!(Opcode::from_mnemonic(&m.to_lowercase()), Some(opcode));
        }
        assert_eq!(Opcode::from_mnemonic("EXECUTE"), None);
    }

    #[test]
    fn shapes_match_catalog_groups() {
        assert_eq!(Opcode::End.shape(), Shape::None);
        assert_eq!(Opcode::Return.shape(), Shape::None);
        assert_eq!(Opcode::Cmp.shape(), Shape::SourceDest);
        assert_eq!(Opcode::Set.shape(), Shape::SourceDestBit);
        assert_eq!(Opcode::Push.shape(), Shape::Source);
        assert_eq!(Opcode::Jmp.shape(), Shape::Dest);
        assert_eq!(Opcode::PrevHash.shape(), Shape::MemoryDest);
        assert_eq!(Opcode::Read.shape(), Shape::Read);
    }

    #[test]
    fn jumps_are_dest_only() {
        for op in ALL_OPCODES.iter().filter(|op| op.is_jump()) {
            assert_eq!(op.shape(), Shape::Dest, "{op:?}");
        }
    }
}
