//! Tests for the 2A03 CPU core
//!
//! - `tests_load_store`: loads, stores, transfers and page-cross timing
//! - `tests_arithmetic`: ADC/SBC, compares, logic, BIT, increments
//! - `tests_shifts`: ASL/LSR/ROL/ROR on A and memory
//! - `tests_jumps`: branches, JMP, JSR/RTS, BRK/RTI
//! - `tests_stack`: push/pull and stack pointer wraparound
//! - `tests_engine`: tick state machine, interrupts, reset, illegal opcodes, save states

mod tests_arithmetic;

use super::{ArrayMemory, Cpu2A03, Memory6502};

/// CPU over flat RAM with `program` at $8000 and PC reset to it
fn cpu_with_program(program: &[u8]) -> Cpu2A03<ArrayMemory> {
    cpu_with_program_at(0x8000, program)
}

fn cpu_with_program_at(origin: u16, program: &[u8]) -> Cpu2A03<ArrayMemory> {
    let mut mem = ArrayMemory::new();
    mem.load_program(origin, program);
    let mut cpu = Cpu2A03::new(mem);
    cpu.reset();
    cpu
}

/// Step one instruction, panicking on an illegal opcode
fn step(cpu: &mut Cpu2A03<impl Memory6502>) -> u32 {
    cpu.step().expect("legal opcode")
}

/// Bus that records every access
#[derive(Debug, Default)]
struct CountingMemory {
    inner: ArrayMemory,
    reads: usize,
    writes: Vec<(u16, u8)>,
}

impl CountingMemory {
    fn with_program(origin: u16, program: &[u8]) -> Self {
        let mut inner = ArrayMemory::new();
        inner.load_program(origin, program);
        Self {
            inner,
            ..Default::default()
        }
    }

    fn clear(&mut self) {
        self.reads = 0;
        self.writes.clear();
    }
}

impl Memory6502 for CountingMemory {
    fn read(&mut self, addr: u16) -> u8 {
        self.reads += 1;
        self.inner.read(addr)
    }

    fn write(&mut self, addr: u16, val: u8) {
        self.writes.push((addr, val));
        self.inner.write(addr, val);
    }

    fn peek(&mut self, addr: u16) -> u8 {
        self.inner.read(addr)
    }
}
