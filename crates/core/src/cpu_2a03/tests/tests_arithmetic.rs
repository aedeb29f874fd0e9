//! ADC/SBC, compares, logic ops, BIT and increments

use super::{cpu_with_program, step};
use crate::cpu_2a03::{
    Memory6502, FLAG_CARRY, FLAG_DECIMAL, FLAG_IRQ_DISABLE, FLAG_NEGATIVE, FLAG_OVERFLOW, FLAG_ZERO,
};

#[test]
fn adc_without_overflow() {
    let mut cpu = cpu_with_program(&[0x69, 0x10]);
    cpu.set_a(0x50);
    cpu.set_flag(FLAG_CARRY, false);
    assert_eq!(step(&mut cpu), 2);
    assert_eq!(cpu.a(), 0x60);
    assert!(!cpu.flag(FLAG_OVERFLOW));
    assert!(!cpu.flag(FLAG_CARRY));
    assert!(!cpu.flag(FLAG_NEGATIVE));
}

#[test]
fn adc_signed_overflow() {
    let mut cpu = cpu_with_program(&[0x69, 0x50]);
    cpu.set_a(0x50);
    cpu.set_flag(FLAG_CARRY, false);
    step(&mut cpu);
    assert_eq!(cpu.a(), 0xA0);
    assert!(cpu.flag(FLAG_OVERFLOW));
    assert!(!cpu.flag(FLAG_CARRY));
    assert!(cpu.flag(FLAG_NEGATIVE));
}

#[test]
fn adc_carry_in_and_out() {
    let mut cpu = cpu_with_program(&[0x69, 0x01]);
    cpu.set_a(0xFF);
    cpu.set_flag(FLAG_CARRY, true);
    step(&mut cpu);
    assert_eq!(cpu.a(), 0x01);
    assert!(cpu.flag(FLAG_CARRY));
    assert!(!cpu.flag(FLAG_OVERFLOW));
    assert!(!cpu.flag(FLAG_ZERO));
}

#[test]
fn adc_ignores_decimal_flag() {
    // SED ; ADC #$01 with A=$09 stays binary: $0A, not $10
    let mut cpu = cpu_with_program(&[0xF8, 0x69, 0x01]);
    cpu.set_a(0x09);
    cpu.set_flag(FLAG_CARRY, false);
    step(&mut cpu);
    assert!(cpu.flag(FLAG_DECIMAL));
    step(&mut cpu);
    assert_eq!(cpu.a(), 0x0A);
}

#[test]
fn adc_all_addressing_modes() {
    // ADC $10,X
    let mut cpu = cpu_with_program(&[0x75, 0x10]);
    cpu.memory.write(0x0015, 0x10);
    cpu.set_a(0x05);
    cpu.set_x(0x05);
    assert_eq!(step(&mut cpu), 4);
    assert_eq!(cpu.a(), 0x15);

    // ADC $2000,X
    let mut cpu = cpu_with_program(&[0x7D, 0x00, 0x20]);
    cpu.memory.write(0x2005, 0x20);
    cpu.set_a(0x10);
    cpu.set_x(0x05);
    assert_eq!(step(&mut cpu), 4);
    assert_eq!(cpu.a(), 0x30);

    // ADC $2000,Y
    let mut cpu = cpu_with_program(&[0x79, 0x00, 0x20]);
    cpu.memory.write(0x2003, 0x0F);
    cpu.set_a(0x01);
    cpu.set_y(0x03);
    assert_eq!(step(&mut cpu), 4);
    assert_eq!(cpu.a(), 0x10);

    // ADC ($10,X)
    let mut cpu = cpu_with_program(&[0x61, 0x10]);
    cpu.memory.write(0x0015, 0x00);
    cpu.memory.write(0x0016, 0x30);
    cpu.memory.write(0x3000, 0x42);
    cpu.set_a(0x08);
    cpu.set_x(0x05);
    assert_eq!(step(&mut cpu), 6);
    assert_eq!(cpu.a(), 0x4A);

    // ADC ($20),Y
    let mut cpu = cpu_with_program(&[0x71, 0x20]);
    cpu.memory.write(0x0020, 0x00);
    cpu.memory.write(0x0021, 0x30);
    cpu.memory.write(0x3002, 0x33);
    cpu.set_a(0x0D);
    cpu.set_y(0x02);
    assert_eq!(step(&mut cpu), 5);
    assert_eq!(cpu.a(), 0x40);

    // ADC $10 / ADC $1234
    let mut cpu = cpu_with_program(&[0x65, 0x10, 0x6D, 0x34, 0x12]);
    cpu.memory.write(0x0010, 0x01);
    cpu.memory.write(0x1234, 0x02);
    assert_eq!(step(&mut cpu), 3);
    assert_eq!(step(&mut cpu), 4);
    assert_eq!(cpu.a(), 0x03);
}

#[test]
fn sbc_borrow_and_overflow() {
    // 0x10 - 0x01 with no borrow
    let mut cpu = cpu_with_program(&[0xE9, 0x01]);
    cpu.set_a(0x10);
    cpu.set_flag(FLAG_CARRY, true);
    assert_eq!(step(&mut cpu), 2);
    assert_eq!(cpu.a(), 0x0F);
    assert!(cpu.flag(FLAG_CARRY));

    // 0x50 - 0xF0: borrow, no signed overflow
    let mut cpu = cpu_with_program(&[0xE9, 0xF0]);
    cpu.set_a(0x50);
    cpu.set_flag(FLAG_CARRY, true);
    step(&mut cpu);
    assert_eq!(cpu.a(), 0x60);
    assert!(!cpu.flag(FLAG_CARRY));
    assert!(!cpu.flag(FLAG_OVERFLOW));

    // 0x50 - 0xB0: borrow and signed overflow
    let mut cpu = cpu_with_program(&[0xE9, 0xB0]);
    cpu.set_a(0x50);
    cpu.set_flag(FLAG_CARRY, true);
    step(&mut cpu);
    assert_eq!(cpu.a(), 0xA0);
    assert!(!cpu.flag(FLAG_CARRY));
    assert!(cpu.flag(FLAG_OVERFLOW));

    // Borrow in: 0x05 - 0x05 - 1 = 0xFF
    let mut cpu = cpu_with_program(&[0xE9, 0x05]);
    cpu.set_a(0x05);
    cpu.set_flag(FLAG_CARRY, false);
    step(&mut cpu);
    assert_eq!(cpu.a(), 0xFF);
    assert!(!cpu.flag(FLAG_CARRY));
    assert!(cpu.flag(FLAG_NEGATIVE));
}

#[test]
fn sbc_indexed_modes() {
    // SBC $10,X
    let mut cpu = cpu_with_program(&[0xF5, 0x10]);
    cpu.memory.write(0x0015, 0x05);
    cpu.set_a(0x10);
    cpu.set_x(0x05);
    cpu.set_flag(FLAG_CARRY, true);
    assert_eq!(step(&mut cpu), 4);
    assert_eq!(cpu.a(), 0x0B);

    // SBC $20F0,Y crossing a page
    let mut cpu = cpu_with_program(&[0xF9, 0xF0, 0x20]);
    cpu.memory.write(0x2105, 0x0A);
    cpu.set_a(0x1A);
    cpu.set_y(0x15);
    cpu.set_flag(FLAG_CARRY, true);
    assert_eq!(step(&mut cpu), 5);
    assert_eq!(cpu.a(), 0x10);
}

#[test]
fn cmp_sets_carry_zero_negative() {
    // A > M
    let mut cpu = cpu_with_program(&[0xC9, 0x0F]);
    cpu.set_a(0x10);
    step(&mut cpu);
    assert!(cpu.flag(FLAG_CARRY));
    assert!(!cpu.flag(FLAG_ZERO));

    // A == M
    let mut cpu = cpu_with_program(&[0xC9, 0x10]);
    cpu.set_a(0x10);
    step(&mut cpu);
    assert!(cpu.flag(FLAG_CARRY));
    assert!(cpu.flag(FLAG_ZERO));

    // A < M
    let mut cpu = cpu_with_program(&[0xC9, 0x20]);
    cpu.set_a(0x10);
    cpu.set_flag(FLAG_OVERFLOW, true);
    step(&mut cpu);
    assert!(!cpu.flag(FLAG_CARRY));
    assert!(!cpu.flag(FLAG_ZERO));
    assert!(cpu.flag(FLAG_NEGATIVE));
    assert!(cpu.flag(FLAG_OVERFLOW), "compare must not touch V");
    assert_eq!(cpu.a(), 0x10);
}

#[test]
fn cpx_cpy() {
    let mut cpu = cpu_with_program(&[0xE0, 0x05, 0xC4, 0x10, 0xCC, 0x00, 0x20]);
    cpu.set_x(0x05);
    cpu.set_y(0x03);
    cpu.memory.write(0x0010, 0x03);
    cpu.memory.write(0x2000, 0x04);
    assert_eq!(step(&mut cpu), 2);
    assert!(cpu.flag(FLAG_ZERO));
    assert_eq!(step(&mut cpu), 3);
    assert!(cpu.flag(FLAG_ZERO));
    assert!(cpu.flag(FLAG_CARRY));
    assert_eq!(step(&mut cpu), 4);
    assert!(!cpu.flag(FLAG_CARRY));
    assert!(cpu.flag(FLAG_NEGATIVE));
}

#[test]
fn and_ora_eor() {
    let mut cpu = cpu_with_program(&[0x29, 0x0F]);
    cpu.set_a(0xF0);
    step(&mut cpu);
    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag(FLAG_ZERO));

    let mut cpu = cpu_with_program(&[0x09, 0xF0]);
    cpu.set_a(0x0F);
    step(&mut cpu);
    assert_eq!(cpu.a(), 0xFF);
    assert!(cpu.flag(FLAG_NEGATIVE));

    let mut cpu = cpu_with_program(&[0x49, 0x0F]);
    cpu.set_a(0xFF);
    step(&mut cpu);
    assert_eq!(cpu.a(), 0xF0);
}

#[test]
fn logical_ops_absolute_x() {
    let mut cpu = cpu_with_program(&[0x1D, 0x00, 0x20]);
    cpu.memory.write(0x2005, 0xF0);
    cpu.set_a(0x0F);
    cpu.set_x(0x05);
    assert_eq!(step(&mut cpu), 4);
    assert_eq!(cpu.a(), 0xFF);

    let mut cpu = cpu_with_program(&[0x5D, 0x00, 0x20]);
    cpu.memory.write(0x2010, 0xAA);
    cpu.set_a(0xFF);
    cpu.set_x(0x10);
    assert_eq!(step(&mut cpu), 4);
    assert_eq!(cpu.a(), 0x55);
}

#[test]
fn bit_copies_high_bits_and_tests_mask() {
    let mut cpu = cpu_with_program(&[0x24, 0x10, 0x2C, 0x00, 0x20]);
    cpu.memory.write(0x0010, 0xC0);
    cpu.memory.write(0x2000, 0x01);
    cpu.set_a(0x01);

    assert_eq!(step(&mut cpu), 3);
    assert!(cpu.flag(FLAG_ZERO));
    assert!(cpu.flag(FLAG_NEGATIVE));
    assert!(cpu.flag(FLAG_OVERFLOW));
    assert_eq!(cpu.a(), 0x01);

    assert_eq!(step(&mut cpu), 4);
    assert!(!cpu.flag(FLAG_ZERO));
    assert!(!cpu.flag(FLAG_NEGATIVE));
    assert!(!cpu.flag(FLAG_OVERFLOW));
}

#[test]
fn inc_dec_memory() {
    // INC $10 ; DEC $2000,X ; INC $10,X ; DEC $2000
    let mut cpu = cpu_with_program(&[0xE6, 0x10, 0xDE, 0x00, 0x20, 0xF6, 0x10, 0xCE, 0x00, 0x20]);
    cpu.memory.write(0x0010, 0xFF);
    cpu.memory.write(0x2001, 0x00);
    cpu.memory.write(0x0011, 0x7F);
    cpu.memory.write(0x2000, 0x01);
    cpu.set_x(0x01);

    assert_eq!(step(&mut cpu), 5);
    assert_eq!(cpu.memory.read(0x0010), 0x00);
    assert!(cpu.flag(FLAG_ZERO));

    assert_eq!(step(&mut cpu), 7);
    assert_eq!(cpu.memory.read(0x2001), 0xFF);
    assert!(cpu.flag(FLAG_NEGATIVE));

    assert_eq!(step(&mut cpu), 6);
    assert_eq!(cpu.memory.read(0x0011), 0x80);

    assert_eq!(step(&mut cpu), 6);
    assert_eq!(cpu.memory.read(0x2000), 0x00);
    assert!(cpu.flag(FLAG_ZERO));
}

#[test]
fn register_increments_wrap() {
    // INX ; INY ; DEX ; DEY
    let mut cpu = cpu_with_program(&[0xE8, 0xC8, 0xCA, 0x88]);
    cpu.set_x(0xFF);
    cpu.set_y(0x7F);
    step(&mut cpu);
    assert_eq!(cpu.x(), 0x00);
    assert!(cpu.flag(FLAG_ZERO));
    step(&mut cpu);
    assert_eq!(cpu.y(), 0x80);
    assert!(cpu.flag(FLAG_NEGATIVE));
    step(&mut cpu);
    assert_eq!(cpu.x(), 0xFF);
    step(&mut cpu);
    assert_eq!(cpu.y(), 0x7F);
    assert!(!cpu.flag(FLAG_NEGATIVE));
}

#[test]
fn flag_instructions_touch_only_their_flag() {
    // SEC ; CLC ; SED ; CLD ; SEI ; CLI ; CLV
    let mut cpu = cpu_with_program(&[0x38, 0x18, 0xF8, 0xD8, 0x78, 0x58, 0xB8]);
    cpu.set_status(0x00);
    let mut expected = cpu.status();

    let effects: [(u8, bool); 7] = [
        (FLAG_CARRY, true),
        (FLAG_CARRY, false),
        (FLAG_DECIMAL, true),
        (FLAG_DECIMAL, false),
        (FLAG_IRQ_DISABLE, true),
        (FLAG_IRQ_DISABLE, false),
        (FLAG_OVERFLOW, false),
    ];
    for (mask, on) in effects {
        assert_eq!(step(&mut cpu), 2);
        if on {
            expected |= mask;
        } else {
            expected &= !mask;
        }
        assert_eq!(cpu.status(), expected);
    }

    let mut cpu = cpu_with_program(&[0xB8]);
    cpu.set_flag(FLAG_OVERFLOW, true);
    step(&mut cpu);
    assert!(!cpu.flag(FLAG_OVERFLOW));
}
