//! Instruction semantics
//!
//! One arm per instruction kind. Each handler receives the resolved operand,
//! applies its effect and returns any extra cycles beyond the opcode's base
//! count (only branches add cycles here).

use super::addressing::{Operand, Resolved};
use super::opcodes::Instruction;
use super::registers::{
    Registers, Status, FLAG_CARRY, FLAG_DECIMAL, FLAG_IRQ_DISABLE, FLAG_NEGATIVE, FLAG_OVERFLOW,
    FLAG_ZERO,
};
use super::{Cpu2A03, Memory6502, IRQ_VECTOR};
use crate::logging::{log, LogCategory, LogLevel};

impl<M: Memory6502> Cpu2A03<M> {
    pub(super) fn execute(&mut self, instruction: Instruction, resolved: Resolved) -> u32 {
        use Instruction::*;
        let operand = resolved.operand;
        match instruction {
            // Loads, stores and transfers
            Lda => {
                self.regs.a = self.load(operand);
                self.regs.set_zn(self.regs.a);
            }
            Ldx => {
                self.regs.x = self.load(operand);
                self.regs.set_zn(self.regs.x);
            }
            Ldy => {
                self.regs.y = self.load(operand);
                self.regs.set_zn(self.regs.y);
            }
            Sta => self.store(operand, self.regs.a),
            Stx => self.store(operand, self.regs.x),
            Sty => self.store(operand, self.regs.y),
            Tax => {
                self.regs.x = self.regs.a;
                self.regs.set_zn(self.regs.x);
            }
            Tay => {
                self.regs.y = self.regs.a;
                self.regs.set_zn(self.regs.y);
            }
            Txa => {
                self.regs.a = self.regs.x;
                self.regs.set_zn(self.regs.a);
            }
            Tya => {
                self.regs.a = self.regs.y;
                self.regs.set_zn(self.regs.a);
            }
            Tsx => {
                self.regs.x = self.regs.sp;
                self.regs.set_zn(self.regs.x);
            }
            Txs => self.regs.sp = self.regs.x,

            // Stack
            Pha => self.push_u8(self.regs.a),
            Php => self.push_u8(self.regs.p.pushed(true)),
            Pla => {
                self.regs.a = self.pop_u8();
                self.regs.set_zn(self.regs.a);
            }
            Plp => {
                // All flags come back, B included; bit 5 stays set.
                self.regs.p = Status::from_bits(self.pop_u8());
            }

            // Logic and arithmetic
            And => {
                let m = self.load(operand);
                self.regs.a &= m;
                self.regs.set_zn(self.regs.a);
            }
            Ora => {
                let m = self.load(operand);
                self.regs.a |= m;
                self.regs.set_zn(self.regs.a);
            }
            Eor => {
                let m = self.load(operand);
                self.regs.a ^= m;
                self.regs.set_zn(self.regs.a);
            }
            Adc => {
                let m = self.load(operand);
                self.add_with_carry(m);
            }
            Sbc => {
                // A - M - (1 - C) == A + !M + C
                let m = self.load(operand);
                self.add_with_carry(!m);
            }
            Cmp => {
                let m = self.load(operand);
                self.compare(self.regs.a, m);
            }
            Cpx => {
                let m = self.load(operand);
                self.compare(self.regs.x, m);
            }
            Cpy => {
                let m = self.load(operand);
                self.compare(self.regs.y, m);
            }
            Bit => {
                let m = self.load(operand);
                self.regs.p.set(FLAG_ZERO, (self.regs.a & m) == 0);
                self.regs.p.set(FLAG_OVERFLOW, (m & 0x40) != 0);
                self.regs.p.set(FLAG_NEGATIVE, (m & 0x80) != 0);
            }

            // Increments and decrements
            Inc => self.read_modify_write(operand, |r, v| {
                let res = v.wrapping_add(1);
                r.set_zn(res);
                res
            }),
            Dec => self.read_modify_write(operand, |r, v| {
                let res = v.wrapping_sub(1);
                r.set_zn(res);
                res
            }),
            Inx => {
                self.regs.x = self.regs.x.wrapping_add(1);
                self.regs.set_zn(self.regs.x);
            }
            Iny => {
                self.regs.y = self.regs.y.wrapping_add(1);
                self.regs.set_zn(self.regs.y);
            }
            Dex => {
                self.regs.x = self.regs.x.wrapping_sub(1);
                self.regs.set_zn(self.regs.x);
            }
            Dey => {
                self.regs.y = self.regs.y.wrapping_sub(1);
                self.regs.set_zn(self.regs.y);
            }

            // Shifts and rotates
            Asl => self.read_modify_write(operand, |r, v| {
                let res = v << 1;
                r.p.set(FLAG_CARRY, (v & 0x80) != 0);
                r.set_zn(res);
                res
            }),
            Lsr => self.read_modify_write(operand, |r, v| {
                let res = v >> 1;
                r.p.set(FLAG_CARRY, (v & 0x01) != 0);
                r.set_zn(res);
                res
            }),
            Rol => self.read_modify_write(operand, |r, v| {
                let res = (v << 1) | r.p.carry() as u8;
                r.p.set(FLAG_CARRY, (v & 0x80) != 0);
                r.set_zn(res);
                res
            }),
            Ror => self.read_modify_write(operand, |r, v| {
                let res = (v >> 1) | ((r.p.carry() as u8) << 7);
                r.p.set(FLAG_CARRY, (v & 0x01) != 0);
                r.set_zn(res);
                res
            }),

            // Flags
            Clc => self.regs.p.set(FLAG_CARRY, false),
            Sec => self.regs.p.set(FLAG_CARRY, true),
            Cli => self.regs.p.set(FLAG_IRQ_DISABLE, false),
            Sei => self.regs.p.set(FLAG_IRQ_DISABLE, true),
            Clv => self.regs.p.set(FLAG_OVERFLOW, false),
            Cld => self.regs.p.set(FLAG_DECIMAL, false),
            Sed => self.regs.p.set(FLAG_DECIMAL, true),

            // Branches
            Bcc => return self.branch(!self.regs.p.carry(), resolved),
            Bcs => return self.branch(self.regs.p.carry(), resolved),
            Bne => return self.branch(!self.regs.p.zero(), resolved),
            Beq => return self.branch(self.regs.p.zero(), resolved),
            Bpl => return self.branch(!self.regs.p.negative(), resolved),
            Bmi => return self.branch(self.regs.p.negative(), resolved),
            Bvc => return self.branch(!self.regs.p.overflow(), resolved),
            Bvs => return self.branch(self.regs.p.overflow(), resolved),

            // Jumps, calls and interrupts
            Jmp => {
                if let Operand::Address(addr) = operand {
                    self.regs.pc = addr;
                }
            }
            Jsr => {
                if let Operand::Address(addr) = operand {
                    // PC points past the operand; the pushed address is its last byte.
                    let ret = self.regs.pc.wrapping_sub(1);
                    self.push_u16(ret);
                    self.regs.pc = addr;
                }
            }
            Rts => {
                let ret = self.pop_u16();
                self.regs.pc = ret.wrapping_add(1);
            }
            Rti => {
                self.regs.p = Status::from_bits(self.pop_u8());
                self.regs.pc = self.pop_u16();
            }
            Brk => self.brk(),
            Nop => {}

            // Filtered out by the engine before dispatch.
            Undefined => {}
        }
        0
    }

    /// Fetch the operand value for read instructions
    #[inline]
    fn load(&mut self, operand: Operand) -> u8 {
        match operand {
            Operand::Immediate(v) => v,
            Operand::Address(addr) => self.read(addr),
            Operand::Accumulator => self.regs.a,
            Operand::Implied => 0,
        }
    }

    #[inline]
    fn store(&mut self, operand: Operand, v: u8) {
        match operand {
            Operand::Address(addr) => self.write(addr, v),
            Operand::Accumulator => self.regs.a = v,
            Operand::Immediate(_) | Operand::Implied => {}
        }
    }

    /// Read-modify-write on A or memory. Memory targets see the unmodified
    /// value written back before the result, as on hardware.
    fn read_modify_write<F>(&mut self, operand: Operand, f: F)
    where
        F: FnOnce(&mut Registers, u8) -> u8,
    {
        match operand {
            Operand::Accumulator => {
                let v = self.regs.a;
                self.regs.a = f(&mut self.regs, v);
            }
            Operand::Address(addr) => {
                let v = self.read(addr);
                self.write(addr, v);
                let res = f(&mut self.regs, v);
                self.write(addr, res);
            }
            Operand::Immediate(_) | Operand::Implied => {}
        }
    }

    /// Binary add with carry. The decimal flag has no effect on the 2A03.
    fn add_with_carry(&mut self, m: u8) {
        let a = self.regs.a;
        let sum = a as u16 + m as u16 + self.regs.p.carry() as u16;
        let result = sum as u8;
        self.regs.p.set(FLAG_CARRY, sum > 0xFF);
        // overflow: both inputs share a sign that the result does not
        self.regs
            .p
            .set(FLAG_OVERFLOW, ((a ^ result) & (m ^ result) & 0x80) != 0);
        self.regs.a = result;
        self.regs.set_zn(result);
    }

    fn compare(&mut self, reg: u8, m: u8) {
        self.regs.p.set(FLAG_CARRY, reg >= m);
        self.regs.set_zn(reg.wrapping_sub(m));
    }

    /// Take a branch if `cond` holds. +1 cycle when taken, +1 more when the
    /// target is in another page.
    fn branch(&mut self, cond: bool, resolved: Resolved) -> u32 {
        if !cond {
            return 0;
        }
        if let Operand::Address(target) = resolved.operand {
            self.regs.pc = target;
        }
        if resolved.page_crossed {
            2
        } else {
            1
        }
    }

    fn brk(&mut self) {
        // BRK is two bytes long; the second one is padding.
        let brk_pc = self.regs.pc.wrapping_sub(1);
        let pc_to_push = self.regs.pc.wrapping_add(1);
        self.push_u16(pc_to_push);
        self.push_u8(self.regs.p.pushed(true));
        self.regs.p.set(FLAG_IRQ_DISABLE, true);
        self.regs.pc = self.read_u16(IRQ_VECTOR);

        let target = self.regs.pc;
        let status = self.regs.p.bits();
        log(LogCategory::Interrupts, LogLevel::Debug, || {
            format!(
                "CPU: BRK executed at PC={:04X}, pushing {:04X}, status={:02X}, jumping to {:04X}",
                brk_pc, pc_to_push, status, target
            )
        });
    }
}
