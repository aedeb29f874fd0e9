//! Single-instruction disassembler used by the CPU trace log

use super::opcodes::{decode, AddressingMode};
use super::Memory6502;

/// A decoded instruction in assembler syntax
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disassembly {
    /// Raw bytes: opcode followed by its operand bytes
    pub bytes: Vec<u8>,
    /// e.g. `LDA #$05`, `STA ($20),Y`, `BEQ $8010`
    pub text: String,
}

impl Disassembly {
    pub fn len(&self) -> u16 {
        self.bytes.len() as u16
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Disassemble the instruction at `addr` using side-effect free reads.
pub fn disassemble<M: Memory6502>(memory: &mut M, addr: u16) -> Disassembly {
    let opcode = memory.peek(addr);
    let entry = decode(opcode);
    let mut bytes = vec![opcode];
    for i in 1..=entry.mode.operand_len() {
        bytes.push(memory.peek(addr.wrapping_add(i)));
    }

    if !entry.is_defined() {
        return Disassembly {
            bytes,
            text: format!(".db ${:02X}", opcode),
        };
    }

    let b1 = bytes.get(1).copied().unwrap_or(0);
    let word = u16::from_le_bytes([b1, bytes.get(2).copied().unwrap_or(0)]);
    let name = entry.instruction.mnemonic();

    let text = match entry.mode {
        AddressingMode::Implied | AddressingMode::Undefined => name.to_string(),
        AddressingMode::Accumulator => format!("{} A", name),
        AddressingMode::Immediate => format!("{} #${:02X}", name, b1),
        AddressingMode::ZeroPage => format!("{} ${:02X}", name, b1),
        AddressingMode::ZeroPageX => format!("{} ${:02X},X", name, b1),
        AddressingMode::ZeroPageY => format!("{} ${:02X},Y", name, b1),
        AddressingMode::Absolute => format!("{} ${:04X}", name, word),
        AddressingMode::AbsoluteX => format!("{} ${:04X},X", name, word),
        AddressingMode::AbsoluteY => format!("{} ${:04X},Y", name, word),
        AddressingMode::Indirect => format!("{} (${:04X})", name, word),
        AddressingMode::IndirectX => format!("{} (${:02X},X)", name, b1),
        AddressingMode::IndirectY => format!("{} (${:02X}),Y", name, b1),
        AddressingMode::Relative => {
            let target = addr.wrapping_add(2).wrapping_add(b1 as i8 as u16);
            format!("{} ${:04X}", name, target)
        }
    };

    Disassembly { bytes, text }
}
