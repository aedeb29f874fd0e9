//! Ricoh 2A03 CPU core
//!
//! The NES CPU is a 6502 without the decimal-mode adder. This module provides a
//! cycle-stepped implementation that any owner can drive one clock at a time by
//! implementing the `Memory6502` trait for its bus.
//!
//! Execution model: on the first tick of an instruction the opcode is fetched,
//! decoded, its operand resolved and its effects applied in full. The remaining
//! ticks only count down the instruction's cycle cost, so the owner can clock
//! the PPU and APU in lockstep with the CPU.

mod addressing;
mod disasm;
mod instructions;
pub mod opcodes;
pub mod registers;

#[cfg(test)]
mod tests;

pub use addressing::{Operand, Resolved};
pub use disasm::{disassemble, Disassembly};
pub use opcodes::{decode, AddressingMode, Instruction, OpcodeEntry, OPCODE_TABLE};
pub use registers::{
    Registers, Status, FLAG_BREAK, FLAG_CARRY, FLAG_DECIMAL, FLAG_IRQ_DISABLE, FLAG_NEGATIVE,
    FLAG_OVERFLOW, FLAG_RESERVED, FLAG_ZERO,
};

use crate::logging::{log, LogCategory, LogLevel};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// NMI vector ($FFFA-$FFFB)
pub const NMI_VECTOR: u16 = 0xFFFA;
/// Reset vector ($FFFC-$FFFD)
pub const RESET_VECTOR: u16 = 0xFFFC;
/// IRQ/BRK vector ($FFFE-$FFFF)
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Cycles taken by the NMI/IRQ entry sequence
pub const INTERRUPT_CYCLES: u32 = 7;

/// Memory interface trait for the 6502 CPU
///
/// The owning system implements this for its bus. Reads take `&mut self`
/// because reading device registers on the console has side effects.
pub trait Memory6502 {
    /// Read a byte from memory at the given address
    fn read(&mut self, addr: u16) -> u8;

    /// Write a byte to memory at the given address
    fn write(&mut self, addr: u16, val: u8);

    /// Read a byte for debugging purposes (disassembly, traces).
    ///
    /// Buses whose reads have side effects should override this.
    fn peek(&mut self, addr: u16) -> u8 {
        self.read(addr)
    }
}

/// Errors surfaced by the execution engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    /// The fetched byte has no entry in the decode table.
    #[error("illegal opcode ${opcode:02X} at ${pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },
}

/// What to do when an undefined opcode is fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IllegalOpcodePolicy {
    /// Report `CpuError::IllegalOpcode` and stay idle
    #[default]
    Trap,
    /// Log a warning and treat the byte as a one-byte, two-cycle NOP
    Nop,
}

/// CPU configuration chosen by the owning system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    pub illegal_opcodes: IllegalOpcodePolicy,
    /// Start execution here on reset instead of reading $FFFC-$FFFD
    pub reset_vector_override: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    Nmi,
    Irq,
}

/// Serialized form of the engine state
#[derive(Debug, Serialize, Deserialize)]
struct CpuSnapshot {
    registers: Registers,
    latency: u32,
    cycles: u64,
    nmi_line: bool,
    nmi_pending: bool,
    irq_line: bool,
}

/// Ricoh 2A03 CPU state and execution engine
#[derive(Debug)]
pub struct Cpu2A03<M: Memory6502> {
    /// Register file
    pub regs: Registers,
    /// Memory interface
    pub memory: M,
    /// Cycles left before the in-flight instruction retires (0 = idle)
    latency: u32,
    /// Total clock ticks since reset
    cycles: u64,
    nmi_line: bool,
    nmi_pending: bool,
    irq_line: bool,
    config: CpuConfig,
}

impl<M: Memory6502> Cpu2A03<M> {
    /// Create a new CPU with the given memory interface.
    ///
    /// Registers hold their reset values; call `reset` to load the reset vector.
    pub fn new(memory: M) -> Self {
        Self::with_config(memory, CpuConfig::default())
    }

    pub fn with_config(memory: M, config: CpuConfig) -> Self {
        Self {
            regs: Registers::RESET,
            memory,
            latency: 0,
            cycles: 0,
            nmi_line: false,
            nmi_pending: false,
            irq_line: false,
            config,
        }
    }

    /// Reset the CPU (preserves memory)
    pub fn reset(&mut self) {
        self.regs = Registers::RESET;
        self.latency = 0;
        self.cycles = 0;
        self.nmi_line = false;
        self.nmi_pending = false;
        self.irq_line = false;

        self.regs.pc = match self.config.reset_vector_override {
            Some(pc) => pc,
            None => self.read_u16(RESET_VECTOR),
        };
        let pc = self.regs.pc;
        log(LogCategory::CPU, LogLevel::Info, || {
            format!("CPU: reset, PC={:04X}", pc)
        });
    }

    /// Replace the memory interface while preserving CPU state
    pub fn with_memory<N: Memory6502>(self, new_memory: N) -> Cpu2A03<N> {
        Cpu2A03 {
            regs: self.regs,
            memory: new_memory,
            latency: self.latency,
            cycles: self.cycles,
            nmi_line: self.nmi_line,
            nmi_pending: self.nmi_pending,
            irq_line: self.irq_line,
            config: self.config,
        }
    }

    pub fn config(&self) -> &CpuConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: CpuConfig) {
        self.config = config;
    }

    /// Advance the CPU by one clock cycle.
    ///
    /// When idle this services a pending interrupt or executes the next
    /// instruction in full; otherwise it only counts down the in-flight
    /// instruction's remaining cycles.
    pub fn tick(&mut self) -> Result<(), CpuError> {
        self.cycles = self.cycles.wrapping_add(1);

        if self.latency > 0 {
            self.latency -= 1;
            return Ok(());
        }

        let total = match self.poll_interrupt() {
            Some(kind) => self.enter_interrupt(kind),
            None => self.execute_next()?,
        };
        self.latency = total.saturating_sub(1);
        Ok(())
    }

    /// Run whole instructions: finish the in-flight one, then tick until the
    /// next instruction (or interrupt entry) retires. Returns its cycle count.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        while self.latency > 0 {
            self.tick()?;
        }
        let start = self.cycles;
        self.tick()?;
        while self.latency > 0 {
            self.tick()?;
        }
        Ok(self.cycles.wrapping_sub(start) as u32)
    }

    /// True when the next tick will fetch (or take an interrupt)
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.latency == 0
    }

    /// Remaining cycles of the in-flight instruction
    #[inline]
    pub fn latency(&self) -> u32 {
        self.latency
    }

    /// Clock ticks since reset
    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Drive the NMI line. NMI is edge triggered: a low-to-high transition
    /// latches a request that the next idle tick services.
    pub fn set_nmi_line(&mut self, level: bool) {
        if level && !self.nmi_line {
            self.nmi_pending = true;
        }
        self.nmi_line = level;
    }

    /// Drive the IRQ line. IRQ is level triggered and masked by the I flag.
    pub fn set_irq_line(&mut self, level: bool) {
        self.irq_line = level;
    }

    /// Latch an NMI directly, regardless of the line level
    pub fn trigger_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Assert the IRQ line. It stays asserted until `set_irq_line(false)`.
    pub fn trigger_irq(&mut self) {
        self.irq_line = true;
    }

    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    pub fn irq_line(&self) -> bool {
        self.irq_line
    }

    // Register accessors

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    pub fn pc(&self) -> u16 {
        self.regs.pc
    }
    pub fn set_pc(&mut self, pc: u16) {
        self.regs.pc = pc;
    }
    pub fn sp(&self) -> u8 {
        self.regs.sp
    }
    pub fn set_sp(&mut self, sp: u8) {
        self.regs.sp = sp;
    }
    pub fn a(&self) -> u8 {
        self.regs.a
    }
    pub fn set_a(&mut self, a: u8) {
        self.regs.a = a;
    }
    pub fn x(&self) -> u8 {
        self.regs.x
    }
    pub fn set_x(&mut self, x: u8) {
        self.regs.x = x;
    }
    pub fn y(&self) -> u8 {
        self.regs.y
    }
    pub fn set_y(&mut self, y: u8) {
        self.regs.y = y;
    }
    pub fn status(&self) -> u8 {
        self.regs.p.bits()
    }
    pub fn set_status(&mut self, bits: u8) {
        self.regs.p = Status::from_bits(bits);
    }

    /// Read one status flag (`FLAG_*` mask)
    pub fn flag(&self, mask: u8) -> bool {
        self.regs.p.get(mask)
    }

    /// Set or clear one status flag (`FLAG_*` mask)
    pub fn set_flag(&mut self, mask: u8, on: bool) {
        self.regs.p.set(mask, on);
    }

    /// One-line trace of the instruction at PC and the current registers
    pub fn trace_line(&mut self) -> String {
        let pc = self.regs.pc;
        let dis = disassemble(&mut self.memory, pc);
        let bytes = dis
            .bytes
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "{:04X}  {:<8}  {:<14}A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            pc,
            bytes,
            dis.text,
            self.regs.a,
            self.regs.x,
            self.regs.y,
            self.regs.p.bits(),
            self.regs.sp,
            self.cycles
        )
    }

    /// Return a JSON save state of the CPU (memory is not included)
    pub fn save_state(&self) -> Value {
        serde_json::json!({
            "registers": self.regs,
            "latency": self.latency,
            "cycles": self.cycles,
            "nmi_line": self.nmi_line,
            "nmi_pending": self.nmi_pending,
            "irq_line": self.irq_line,
        })
    }

    /// Restore a state produced by `save_state`
    pub fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error> {
        let snap = CpuSnapshot::deserialize(v)?;
        self.regs = snap.registers;
        self.regs.p = Status::from_bits(self.regs.p.bits());
        self.latency = snap.latency;
        self.cycles = snap.cycles;
        self.nmi_line = snap.nmi_line;
        self.nmi_pending = snap.nmi_pending;
        self.irq_line = snap.irq_line;
        Ok(())
    }

    fn poll_interrupt(&mut self) -> Option<Interrupt> {
        if self.nmi_pending {
            self.nmi_pending = false;
            Some(Interrupt::Nmi)
        } else if self.irq_line && !self.regs.p.irq_disable() {
            Some(Interrupt::Irq)
        } else {
            None
        }
    }

    fn enter_interrupt(&mut self, kind: Interrupt) -> u32 {
        let vector = match kind {
            Interrupt::Nmi => NMI_VECTOR,
            Interrupt::Irq => IRQ_VECTOR,
        };
        let return_pc = self.regs.pc;
        self.push_u16(return_pc);
        self.push_u8(self.regs.p.pushed(false));
        self.regs.p.set(FLAG_IRQ_DISABLE, true);
        self.regs.pc = self.read_u16(vector);

        let target = self.regs.pc;
        log(LogCategory::Interrupts, LogLevel::Debug, || {
            format!(
                "CPU: {:?} taken at PC={:04X}, jumping to {:04X}",
                kind, return_pc, target
            )
        });
        INTERRUPT_CYCLES
    }

    /// Fetch, decode, resolve and execute one instruction. Returns its total
    /// cycle cost including page-cross and branch penalties.
    fn execute_next(&mut self) -> Result<u32, CpuError> {
        log(LogCategory::CPU, LogLevel::Trace, || self.trace_line());

        let pc = self.regs.pc;
        let opcode = self.fetch_u8();
        let entry = decode(opcode);

        if !entry.is_defined() {
            return self.illegal_opcode(opcode, pc);
        }

        let resolved = self.resolve(entry.mode);
        let mut total = entry.cycles as u32;
        if resolved.page_crossed && entry.instruction.pays_page_penalty() {
            total += 1;
        }
        total += self.execute(entry.instruction, resolved);
        Ok(total)
    }

    fn illegal_opcode(&mut self, opcode: u8, pc: u16) -> Result<u32, CpuError> {
        let policy = self.config.illegal_opcodes;
        log(LogCategory::CPU, LogLevel::Warn, || {
            format!(
                "UNKNOWN OPCODE: pc=0x{:04X} op=0x{:02X} a=0x{:02X} x=0x{:02X} y=0x{:02X} sp=0x{:02X} p=0x{:02X} ({:?})",
                pc,
                opcode,
                self.regs.a,
                self.regs.x,
                self.regs.y,
                self.regs.sp,
                self.regs.p.bits(),
                policy
            )
        });
        match policy {
            IllegalOpcodePolicy::Trap => Err(CpuError::IllegalOpcode { opcode, pc }),
            IllegalOpcodePolicy::Nop => Ok(2),
        }
    }

    #[inline]
    fn read(&mut self, addr: u16) -> u8 {
        self.memory.read(addr)
    }

    #[inline]
    fn write(&mut self, addr: u16, val: u8) {
        self.memory.write(addr, val);
    }

    fn read_u16(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    #[inline]
    fn fetch_u8(&mut self) -> u8 {
        let v = self.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        v
    }

    #[inline]
    fn fetch_u16(&mut self) -> u16 {
        let lo = self.fetch_u8() as u16;
        let hi = self.fetch_u8() as u16;
        (hi << 8) | lo
    }

    #[inline]
    fn push_u8(&mut self, v: u8) {
        let addr = 0x0100 | self.regs.sp as u16;
        self.write(addr, v);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
    }

    #[inline]
    fn pop_u8(&mut self) -> u8 {
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let addr = 0x0100 | self.regs.sp as u16;
        self.read(addr)
    }

    #[inline]
    fn push_u16(&mut self, v: u16) {
        self.push_u8((v >> 8) as u8);
        self.push_u8(v as u8);
    }

    #[inline]
    fn pop_u16(&mut self) -> u16 {
        let lo = self.pop_u8() as u16;
        let hi = self.pop_u8() as u16;
        (hi << 8) | lo
    }
}

impl<M: Memory6502> crate::Cpu for Cpu2A03<M> {
    type Error = CpuError;

    fn reset(&mut self) {
        Cpu2A03::reset(self);
    }

    fn tick(&mut self) -> Result<(), CpuError> {
        Cpu2A03::tick(self)
    }

    fn step(&mut self) -> Result<u32, CpuError> {
        Cpu2A03::step(self)
    }
}

/// Simple array-based memory implementation for testing
#[derive(Debug)]
pub struct ArrayMemory {
    pub data: Box<[u8; 0x10000]>,
}

impl ArrayMemory {
    pub fn new() -> Self {
        Self {
            data: Box::new([0; 0x10000]),
        }
    }

    /// Load a program into memory and point the reset vector at it
    pub fn load_program(&mut self, offset: u16, data: &[u8]) {
        let off = offset as usize;
        self.data[off..off + data.len()].copy_from_slice(data);
        self.data[RESET_VECTOR as usize] = (offset & 0xFF) as u8;
        self.data[RESET_VECTOR as usize + 1] = (offset >> 8) as u8;
    }

    /// Store a little-endian vector (e.g. `NMI_VECTOR`, `IRQ_VECTOR`)
    pub fn set_vector(&mut self, vector: u16, target: u16) {
        self.data[vector as usize] = (target & 0xFF) as u8;
        self.data[vector.wrapping_add(1) as usize] = (target >> 8) as u8;
    }
}

impl Default for ArrayMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory6502 for ArrayMemory {
    fn read(&mut self, addr: u16) -> u8 {
        self.data[addr as usize]
    }

    fn write(&mut self, addr: u16, val: u8) {
        self.data[addr as usize] = val;
    }
}
