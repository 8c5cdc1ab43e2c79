//! The emulated processor: a 64-bit core executing the fixed-width
//! instruction subset this crate supports.
//!
//! Architectural state lives in [`armv8::Armv8`]: 31 general-purpose
//! registers with zero-register semantics for index 31
//! ([`registers::Registers`]), the program counter, and the four
//! condition flags ([`pstate::Pstate`]). Decoding
//! ([`instructions::Instruction`]) turns a raw word into one typed
//! variant per encoding family; the executors live next to the state
//! they touch ([`data_processing`], [`single_data_transfer`]).

pub mod armv8;
pub mod condition;
pub mod data_processing;
pub mod flags;
pub mod instructions;
pub mod pstate;
pub mod registers;
pub mod single_data_transfer;

pub use armv8::{Armv8, ExecutionState};
