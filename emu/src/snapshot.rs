//! The final processor-state dump emitted when a run terminates.
//!
//! ```text
//! Registers:
//! X00 = 0000000000000005
//! ...
//! X30 = 0000000000000000
//! PC = 0000000000000004
//!
//! PSTATE : -ZC-
//! Non-Zero Memory:
//! 0x00000000: 0xd28000a0
//! ```
//!
//! PC is the address of the instruction that terminated execution.
//! Every format detail here is load-bearing: test suites diff this
//! output byte for byte.

use std::io::{self, Write};

use crate::cpu::Armv8;

pub fn write_state<W: Write>(cpu: &Armv8, out: &mut W) -> io::Result<()> {
    writeln!(out, "Registers:")?;
    for reg in 0..31 {
        writeln!(out, "X{reg:02} = {:016x}", cpu.registers.read(reg))?;
    }
    writeln!(out, "PC = {:016x}", cpu.pc)?;
    writeln!(out)?;
    writeln!(out, "PSTATE : {}", cpu.pstate)?;
    writeln!(out, "Non-Zero Memory:")?;
    for (address, word) in cpu.memory.non_zero_words() {
        writeln!(out, "0x{address:08x}: 0x{word:08x}")?;
    }
    Ok(())
}
