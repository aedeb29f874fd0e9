//! Register file and status flags for the 2A03 CPU

use serde::{Deserialize, Serialize};

/// Negative flag (bit 7)
pub const FLAG_NEGATIVE: u8 = 0b1000_0000;
/// Overflow flag (bit 6)
pub const FLAG_OVERFLOW: u8 = 0b0100_0000;
/// Unused bit 5, always reads as 1
pub const FLAG_RESERVED: u8 = 0b0010_0000;
/// Break flag (bit 4)
pub const FLAG_BREAK: u8 = 0b0001_0000;
/// Decimal flag (bit 3). Stored and pushed, but the 2A03 has no BCD unit.
pub const FLAG_DECIMAL: u8 = 0b0000_1000;
/// Interrupt disable flag (bit 2)
pub const FLAG_IRQ_DISABLE: u8 = 0b0000_0100;
/// Zero flag (bit 1)
pub const FLAG_ZERO: u8 = 0b0000_0010;
/// Carry flag (bit 0)
pub const FLAG_CARRY: u8 = 0b0000_0001;

/// Status register (NV1BDIZC) held as a plain byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(u8);

impl Status {
    /// Power-up value: I set, reserved bit set.
    pub const POWER_ON: Status = Status(FLAG_RESERVED | FLAG_IRQ_DISABLE);

    /// Build a status value from a raw byte. The reserved bit is forced on.
    pub fn from_bits(bits: u8) -> Self {
        Status(bits | FLAG_RESERVED)
    }

    /// Raw byte, reserved bit always set
    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn get(self, mask: u8) -> bool {
        (self.0 & mask) != 0
    }

    /// Set or clear the flags in `mask`. The reserved bit cannot be cleared.
    #[inline]
    pub fn set(&mut self, mask: u8, on: bool) {
        if on {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
        self.0 |= FLAG_RESERVED;
    }

    /// Byte pushed to the stack. `brk` selects B=1 (BRK/PHP) or B=0 (NMI/IRQ).
    #[inline]
    pub fn pushed(self, brk: bool) -> u8 {
        if brk {
            self.0 | FLAG_BREAK | FLAG_RESERVED
        } else {
            (self.0 & !FLAG_BREAK) | FLAG_RESERVED
        }
    }

    pub fn negative(self) -> bool {
        self.get(FLAG_NEGATIVE)
    }
    pub fn overflow(self) -> bool {
        self.get(FLAG_OVERFLOW)
    }
    pub fn brk(self) -> bool {
        self.get(FLAG_BREAK)
    }
    pub fn decimal(self) -> bool {
        self.get(FLAG_DECIMAL)
    }
    pub fn irq_disable(self) -> bool {
        self.get(FLAG_IRQ_DISABLE)
    }
    pub fn zero(self) -> bool {
        self.get(FLAG_ZERO)
    }
    pub fn carry(self) -> bool {
        self.get(FLAG_CARRY)
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::POWER_ON
    }
}

/// CPU registers
///
/// Widths are carried by the field types, so every update wraps the way the
/// hardware does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// Program counter
    pub pc: u16,
    /// Stack pointer (points to 0x0100 + sp)
    pub sp: u8,
    /// Accumulator
    pub a: u8,
    /// X index register
    pub x: u8,
    /// Y index register
    pub y: u8,
    /// Status register
    pub p: Status,
}

impl Registers {
    /// Register values after reset, before the reset vector is loaded.
    pub const RESET: Registers = Registers {
        pc: 0,
        sp: 0xFD,
        a: 0,
        x: 0,
        y: 0,
        p: Status::POWER_ON,
    };

    /// Update Z and N from a result byte.
    #[inline]
    pub fn set_zn(&mut self, v: u8) {
        self.p.set(FLAG_ZERO, v == 0);
        self.p.set(FLAG_NEGATIVE, (v & 0x80) != 0);
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::RESET
    }
}
