//! Text form of operands and instructions.
//!
//! ```text
//! #5          immediate
//! r0          register
//! [0x0010]    absolute memory
//! [r3]        register-indirect memory
//! ```

use regvm_common::{Instruction, Operand};

/// Render one operand.
pub fn operand(op: &Operand) -> String {
    match *op {
        Operand::Immediate(v) => format!("#{v}"),
        Operand::Register(r) => format!("r{r}"),
        Operand::Memory(a) => format!("[{a:#06x}]"),
        Operand::Indirect(r) => format!("[r{r}]"),
    }
}

/// Render one instruction: mnemonic, then bit, source and destination in
/// encoding order, comma separated.
pub fn instruction(instr: &Instruction) -> String {
    let mut parts = Vec::with_capacity(3);
    if let Some(bit) = instr.bit {
        parts.push(bit.to_string());
    }
    if let Some(src) = &instr.source {
        parts.push(operand(src));
    }
    if let Some(dst) = &instr.dest {
        parts.push(operand(dst));
    }

    let mnemonic = instr.opcode.mnemonic();
    if parts.is_empty() {
        mnemonic.to_string()
    } else {
        format!("{mnemonic} {}", parts.join(", "))
    }
}
