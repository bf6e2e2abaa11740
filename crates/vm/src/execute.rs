//! Fetch-decode-execute loop and opcode dispatch.

use crate::alu::{self, CompareFlags};
use crate::control::{branch_taken, jump_target};
use crate::error::{Fault, ResultCode};
use crate::gas::{GasMeter, GasSchedule};
use crate::host::{words, Host};
use crate::machine::ExecutionState;
use crate::resolve::Location;
use regvm_common::{AddressingMode, ContractRecord, Opcode, Slot};
use tracing::trace;

/// Caller-supplied inputs to one run.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// Address the contract is stored under. Host calls are keyed by it.
    pub address: &'a str,
    pub params: &'a [String],
    /// Value sent along with the call, reported by DYN.
    pub amount_sent: i64,
}

impl<'a> Invocation<'a> {
    pub fn new(address: &'a str) -> Self {
        Self {
            address,
            params: &[],
            amount_sent: 0,
        }
    }

    /// Cells written by DATA: the parameter count, then one cell per
    /// parameter.
    pub fn data_words(&self) -> Vec<i64> {
        std::iter::once(self.params.len() as i64)
            .chain(self.params.iter().map(|p| param_word(p)))
            .collect()
    }
}

/// A parameter as a cell: its decimal value if it parses as an `i64`,
/// otherwise the first eight bytes of its blake3 hash.
pub fn param_word(param: &str) -> i64 {
    param.parse::<i64>().unwrap_or_else(|_| {
        let hash = blake3::hash(param.as_bytes());
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&hash.as_bytes()[..8]);
        i64::from_le_bytes(buf)
    })
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct Execution {
    pub result: ResultCode,
    /// Final machine state, as it was when the loop stopped.
    pub state: ExecutionState,
    pub gas_used: u64,
    pub gas_remaining: u64,
    /// Instructions dispatched (END not counted).
    pub steps: u64,
}

/// Run `record` from byte offset `entry`.
///
/// Only the balance is modified on the record; counters and persistence
/// are the engine's concern.
pub fn execute<H: Host + ?Sized>(
    record: &mut ContractRecord,
    entry: usize,
    invocation: &Invocation<'_>,
    gas: u64,
    schedule: &GasSchedule,
    host: &mut H,
) -> Execution {
    let len = record.byte_code_len.min(record.bytecode.len());
    let mut meter = GasMeter::new(gas);
    let mut machine = Machine {
        code: &record.bytecode[..len],
        balance: &mut record.balance,
        exec_count: record.exec_count_lifetime,
        invocation,
        host,
        state: ExecutionState::new(entry),
        steps: 0,
    };
    let result = ResultCode::from(machine.run(&mut meter, schedule));
    trace!(
        address = invocation.address,
        %result,
        pc = machine.state.pc,
        "loop stopped"
    );
    Execution {
        result,
        state: machine.state,
        gas_used: meter.used(),
        gas_remaining: meter.remaining(),
        steps: machine.steps,
    }
}

enum Flow {
    Continue,
    Halt,
}

struct Machine<'a, H: ?Sized> {
    code: &'a [u8],
    balance: &'a mut i64,
    exec_count: i64,
    invocation: &'a Invocation<'a>,
    host: &'a mut H,
    state: ExecutionState,
    steps: u64,
}

impl<H: Host + ?Sized> Machine<'_, H> {
    fn run(&mut self, meter: &mut GasMeter, schedule: &GasSchedule) -> Result<(), Fault> {
        loop {
            if meter.is_exhausted() {
                return Err(Fault::InsufficientGas);
            }
            let at = self.state.pc;
            let byte = *self.code.get(at).ok_or(Fault::AccessOutsideRom)?;
            if byte == Opcode::End as u8 {
                return Ok(());
            }
            let opcode = Opcode::try_from(byte).map_err(|_| Fault::IllegalOpcode)?;
            meter.charge(schedule.cost(opcode))?;
            self.steps += 1;
            trace!(pc = at, op = opcode.mnemonic(), gas = meter.remaining(), "step");

            if let Flow::Halt = self.step(opcode)? {
                return Ok(());
            }
        }
    }

    fn step(&mut self, opcode: Opcode) -> Result<Flow, Fault> {
        self.state.pc += 1;

        match opcode {
            Opcode::End => return Ok(Flow::Halt),
            Opcode::Return => return self.exec_return(),

            // Data movement
            Opcode::Move => self.exec_move()?,
            Opcode::Push => self.exec_push()?,
            Opcode::Pop => self.exec_pop()?,

            // Arithmetic & logic
            Opcode::Add
            | Opcode::Sub
            | Opcode::And
            | Opcode::Xor
            | Opcode::Or
            | Opcode::Not
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Inc
            | Opcode::Dec
            | Opcode::Rol
            | Opcode::Ror
            | Opcode::Set
            | Opcode::Clr => self.exec_alu(opcode)?,
            Opcode::Cmp => self.exec_cmp()?,

            // Control flow
            Opcode::Call => self.exec_call()?,
            Opcode::Jmp
            | Opcode::Jz
            | Opcode::Jnz
            | Opcode::Jlt
            | Opcode::Jlte
            | Opcode::Jgt
            | Opcode::Jgte => self.exec_jump(opcode)?,

            // Host mediated
            Opcode::Send => self.exec_send()?,
            Opcode::Store => self.exec_store()?,
            Opcode::Read => self.exec_read()?,
            Opcode::Balance => {
                let balance = *self.balance;
                self.write_dest(balance)?
            }
            Opcode::Dyn => {
                let amount = self.invocation.amount_sent;
                self.write_dest(amount)?
            }
            Opcode::ExecCountC => {
                let count = self.exec_count;
                self.write_dest(count)?
            }
            Opcode::ExecCountB => {
                let count = self.host.block_exec_count(self.invocation.address);
                self.write_dest(count)?
            }
            Opcode::Data => {
                let cells = self.invocation.data_words();
                self.write_memory_dest(&cells)?
            }
            Opcode::Sender => {
                let cells = words(&self.host.sender());
                self.write_memory_dest(&cells)?
            }
            Opcode::PrevHash => {
                let cells = words(&self.host.prev_hash());
                self.write_memory_dest(&cells)?
            }
        }

        Ok(Flow::Continue)
    }

    // ---- Data movement ----

    fn exec_move(&mut self) -> Result<(), Fault> {
        let code = self.code;
        let mode = self.state.fetch_mode(code)?;
        let value = self.state.resolve_read(code, mode, Slot::Source)?;
        self.state.resolve_write(code, mode, value)
    }

    fn exec_push(&mut self) -> Result<(), Fault> {
        let code = self.code;
        let mode = self.state.fetch_mode(code)?;
        let value = self.state.resolve_read(code, mode, Slot::Source)?;
        self.state.push(value)
    }

    fn exec_pop(&mut self) -> Result<(), Fault> {
        let code = self.code;
        let mode = self.state.fetch_mode(code)?;
        let loc = self.state.resolve_location(code, mode)?;
        let value = self.state.pop()?;
        self.state.store(loc, value);
        Ok(())
    }

    // ---- Arithmetic & logic ----

    fn exec_alu(&mut self, opcode: Opcode) -> Result<(), Fault> {
        let code = self.code;
        let mode = self.state.fetch_mode(code)?;
        let bit = if opcode.shape().has_bit() {
            self.state.fetch_byte(code)?
        } else {
            0
        };
        let a = self.state.resolve_read(code, mode, Slot::Source)?;
        let dst = self.state.resolve_location(code, mode)?;
        let b = self.state.read_at(dst);
        let value = alu::compute(opcode, a, b, bit)?;
        self.state.store(dst, value);
        Ok(())
    }

    fn exec_cmp(&mut self) -> Result<(), Fault> {
        let code = self.code;
        let mode = self.state.fetch_mode(code)?;
        let a = self.state.resolve_read(code, mode, Slot::Source)?;
        let b = self.state.resolve_read(code, mode, Slot::Dest)?;
        self.state.flags = CompareFlags::compare(a, b);
        Ok(())
    }

    // ---- Control flow ----

    fn exec_jump(&mut self, opcode: Opcode) -> Result<(), Fault> {
        let code = self.code;
        let mode = self.state.fetch_mode(code)?;
        let target = self.state.resolve_read(code, mode, Slot::Dest)?;
        if branch_taken(opcode, self.state.flags) {
            self.state.pc = jump_target(target);
        }
        Ok(())
    }

    fn exec_call(&mut self) -> Result<(), Fault> {
        let code = self.code;
        let mode = self.state.fetch_mode(code)?;
        let target = self.state.resolve_read(code, mode, Slot::Dest)?;
        self.state.push(self.state.pc as i64)?;
        self.state.call_depth += 1;
        self.state.pc = jump_target(target);
        Ok(())
    }

    fn exec_return(&mut self) -> Result<Flow, Fault> {
        if self.state.call_depth == 0 {
            return Ok(Flow::Halt);
        }
        let ret = self.state.pop()?;
        self.state.call_depth -= 1;
        self.state.pc = jump_target(ret);
        Ok(Flow::Continue)
    }

    // ---- Host mediated ----

    fn exec_send(&mut self) -> Result<(), Fault> {
        let code = self.code;
        let mode = self.state.fetch_mode(code)?;
        let amount = self.state.resolve_read(code, mode, Slot::Source)?;
        let to = self.state.resolve_read(code, mode, Slot::Dest)?;
        if amount < 0 || amount > *self.balance {
            return Err(Fault::IllegalDestination);
        }
        self.host.send(self.invocation.address, to, amount)?;
        *self.balance -= amount;
        Ok(())
    }

    fn exec_store(&mut self) -> Result<(), Fault> {
        let code = self.code;
        let mode = self.state.fetch_mode(code)?;
        let value = self.state.resolve_read(code, mode, Slot::Source)?;
        let key = self.state.resolve_read(code, mode, Slot::Dest)?;
        self.host.store(self.invocation.address, key, value)
    }

    fn exec_read(&mut self) -> Result<(), Fault> {
        let code = self.code;
        let mode = self.state.fetch_mode(code)?;
        let key = self.state.resolve_read(code, mode, Slot::Source)?;
        let loc = self.state.resolve_location(code, mode)?;
        let value = self.host.read(self.invocation.address, key)?;
        self.state.store(loc, value);
        Ok(())
    }

    /// Write one cell to the destination operand.
    fn write_dest(&mut self, value: i64) -> Result<(), Fault> {
        let code = self.code;
        let mode = self.state.fetch_mode(code)?;
        self.state.resolve_write(code, mode, value)
    }

    /// Write consecutive cells starting at a memory destination.
    fn write_memory_dest(&mut self, cells: &[i64]) -> Result<(), Fault> {
        let code = self.code;
        let mode = self.state.fetch_mode(code)?;
        if mode.dest() == AddressingMode::Register {
            return Err(Fault::IllegalDestination);
        }
        match self.state.resolve_location(code, mode)? {
            Location::Memory(start) => self.state.write_cells(start, cells),
            Location::Register(_) => Err(Fault::IllegalDestination),
        }
    }
}
