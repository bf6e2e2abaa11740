//! Per-invocation execution state: registers, value stack, memory, program
//! counter and compare flags.

use crate::alu::CompareFlags;
use crate::error::Fault;
use regvm_common::{NUM_REGISTERS, RAM_SIZE, STACK_SIZE};

/// Execution state for one invocation.
///
/// Created fresh by every run and handed to each unit by `&mut`; it is
/// dropped (or returned to the caller for inspection) when the run ends.
#[derive(Clone)]
pub struct ExecutionState {
    pub(crate) registers: [i64; NUM_REGISTERS],
    pub(crate) stack: Box<[i64]>,
    /// Number of live stack slots, in `0..=STACK_SIZE`.
    pub(crate) sp: usize,
    pub(crate) memory: Box<[i64]>,
    /// Byte offset into the code.
    pub(crate) pc: usize,
    pub(crate) flags: CompareFlags,
    /// CALLs not yet matched by a RETURN.
    pub(crate) call_depth: usize,
}

impl std::fmt::Debug for ExecutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionState")
            .field("pc", &self.pc)
            .field("sp", &self.sp)
            .field("flags", &self.flags)
            .field("call_depth", &self.call_depth)
            .finish_non_exhaustive()
    }
}

impl ExecutionState {
    /// Zeroed state with the program counter at `entry`.
    pub fn new(entry: usize) -> Self {
        Self {
            registers: [0; NUM_REGISTERS],
            stack: vec![0; STACK_SIZE].into_boxed_slice(),
            sp: 0,
            memory: vec![0; RAM_SIZE].into_boxed_slice(),
            pc: entry,
            flags: CompareFlags::default(),
            call_depth: 0,
        }
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn sp(&self) -> usize {
        self.sp
    }

    pub fn register(&self, index: u8) -> i64 {
        self.registers[index as usize]
    }

    pub fn registers(&self) -> &[i64] {
        &self.registers
    }

    pub fn memory(&self, address: u16) -> i64 {
        self.memory[address as usize]
    }

    /// Live stack contents, bottom first.
    pub fn stack(&self) -> &[i64] {
        &self.stack[..self.sp]
    }

    pub fn flags(&self) -> CompareFlags {
        self.flags
    }

    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// True if no register, stack slot or memory cell has been touched.
    pub fn is_pristine(&self) -> bool {
        self.sp == 0
            && self.registers.iter().all(|&r| r == 0)
            && self.stack.iter().all(|&s| s == 0)
            && self.memory.iter().all(|&m| m == 0)
    }

    /// Push a value, checking for overflow.
    pub(crate) fn push(&mut self, value: i64) -> Result<(), Fault> {
        if self.sp >= STACK_SIZE {
            return Err(Fault::StackOverflow);
        }
        self.stack[self.sp] = value;
        self.sp += 1;
        Ok(())
    }

    /// Pop a value, checking for underflow.
    pub(crate) fn pop(&mut self) -> Result<i64, Fault> {
        if self.sp == 0 {
            return Err(Fault::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    /// Consume `n` code bytes at the program counter.
    pub(crate) fn take<'c>(&mut self, code: &'c [u8], n: usize) -> Result<&'c [u8], Fault> {
        let end = self.pc.checked_add(n).ok_or(Fault::AccessOutsideRom)?;
        let bytes = code.get(self.pc..end).ok_or(Fault::AccessOutsideRom)?;
        self.pc = end;
        Ok(bytes)
    }

    /// Consume one code byte at the program counter.
    pub(crate) fn fetch_byte(&mut self, code: &[u8]) -> Result<u8, Fault> {
        Ok(self.take(code, 1)?[0])
    }

    /// Write consecutive memory cells starting at `start`.
    ///
    /// Nothing is written if the run would pass the last address.
    pub(crate) fn write_cells(&mut self, start: u16, words: &[i64]) -> Result<(), Fault> {
        let start = start as usize;
        let end = start + words.len();
        if end > RAM_SIZE {
            return Err(Fault::AccessOutsideRam);
        }
        self.memory[start..end].copy_from_slice(words);
        Ok(())
    }
}
