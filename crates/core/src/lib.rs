//! NES CPU core: a cycle-stepped Ricoh 2A03 (6502) interpreter.
//!
//! The owning console provides the bus by implementing
//! [`cpu_2a03::Memory6502`] and drives the CPU one clock at a time through
//! [`Cpu::tick`], interleaving PPU/APU clocks as it sees fit.

pub mod cpu_2a03;
pub mod logging;

pub use cpu_2a03::{
    ArrayMemory, Cpu2A03, CpuConfig, CpuError, IllegalOpcodePolicy, Memory6502, Registers, Status,
};

/// A CPU that can be clocked by its owning system.
pub trait Cpu {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reset to the power-on register state and load the reset vector.
    fn reset(&mut self);

    /// Advance one clock cycle.
    fn tick(&mut self) -> Result<(), Self::Error>;

    /// Run until the next whole instruction retires; returns cycles consumed.
    fn step(&mut self) -> Result<u32, Self::Error>;
}
