//! Addressing-mode resolution
//!
//! Turns an addressing mode plus the operand bytes after the opcode into an
//! `Operand`. PC is advanced past every operand byte consumed here.

use super::opcodes::AddressingMode;
use super::{Cpu2A03, Memory6502};

/// Where an instruction's operand lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// No operand
    Implied,
    /// The accumulator
    Accumulator,
    /// The byte following the opcode
    Immediate(u8),
    /// Effective address (branch target for relative mode)
    Address(u16),
}

/// Result of resolving an addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub operand: Operand,
    /// Indexing or branching crossed a 256-byte page
    pub page_crossed: bool,
}

impl Resolved {
    fn new(operand: Operand) -> Self {
        Self {
            operand,
            page_crossed: false,
        }
    }

    fn indexed(base: u16, addr: u16) -> Self {
        Self {
            operand: Operand::Address(addr),
            page_crossed: (base & 0xFF00) != (addr & 0xFF00),
        }
    }
}

impl<M: Memory6502> Cpu2A03<M> {
    pub(super) fn resolve(&mut self, mode: AddressingMode) -> Resolved {
        use AddressingMode::*;
        match mode {
            Implied | Undefined => Resolved::new(Operand::Implied),
            Accumulator => Resolved::new(Operand::Accumulator),
            Immediate => Resolved::new(Operand::Immediate(self.fetch_u8())),
            ZeroPage => Resolved::new(Operand::Address(self.fetch_u8() as u16)),
            ZeroPageX => {
                let zp = self.fetch_u8().wrapping_add(self.regs.x);
                Resolved::new(Operand::Address(zp as u16))
            }
            ZeroPageY => {
                let zp = self.fetch_u8().wrapping_add(self.regs.y);
                Resolved::new(Operand::Address(zp as u16))
            }
            Absolute => Resolved::new(Operand::Address(self.fetch_u16())),
            AbsoluteX => {
                let base = self.fetch_u16();
                Resolved::indexed(base, base.wrapping_add(self.regs.x as u16))
            }
            AbsoluteY => {
                let base = self.fetch_u16();
                Resolved::indexed(base, base.wrapping_add(self.regs.y as u16))
            }
            Relative => {
                let offset = self.fetch_u8() as i8;
                let next = self.regs.pc;
                let target = next.wrapping_add(offset as u16);
                Resolved::indexed(next, target)
            }
            Indirect => {
                let ptr = self.fetch_u16();
                Resolved::new(Operand::Address(self.read_indirect_u16_bug(ptr)))
            }
            IndirectX => {
                let zp = self.fetch_u8().wrapping_add(self.regs.x);
                Resolved::new(Operand::Address(self.read_zero_page_u16(zp)))
            }
            IndirectY => {
                let zp = self.fetch_u8();
                let base = self.read_zero_page_u16(zp);
                Resolved::indexed(base, base.wrapping_add(self.regs.y as u16))
            }
        }
    }

    /// Read a pointer from page zero; the high byte wraps within the page.
    #[inline]
    fn read_zero_page_u16(&mut self, zp: u8) -> u16 {
        let lo = self.read(zp as u16) as u16;
        let hi = self.read(zp.wrapping_add(1) as u16) as u16;
        (hi << 8) | lo
    }

    /// Read a 16-bit pointer for JMP (indirect) with the 6502 page-wrapping bug.
    #[inline]
    fn read_indirect_u16_bug(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
        let hi = self.read(hi_addr) as u16;
        (hi << 8) | lo
    }
}
