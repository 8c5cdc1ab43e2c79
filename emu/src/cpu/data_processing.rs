//! ALU execution: arithmetic (immediate and shifted-register), bitwise
//! logic, wide moves and multiply-accumulate, with the condition-flag
//! rules the flag-setting variants require.

use crate::bitwise::Bits;
use crate::cpu::armv8::Armv8;
use crate::cpu::flags::{
    ArithmeticKind, LogicalKind, MultiplyKind, OperandWidth, ShiftKind, WideMoveKind,
};

/// The value an ALU operation produced, already truncated to the
/// operation width, together with the four flags it would set.
pub struct ArithmeticOpResult {
    pub result: u64,
    pub carry: bool,
    pub overflow: bool,
    pub sign: bool,
    pub zero: bool,
}

pub(crate) fn add_with_flags(width: OperandWidth, op1: u64, op2: u64) -> ArithmeticOpResult {
    match width {
        OperandWidth::Word => {
            let (op1, op2) = (op1 as u32, op2 as u32);
            let (result, carry) = op1.overflowing_add(op2);
            let same_sign = op1.get_bit(31) == op2.get_bit(31);
            ArithmeticOpResult {
                result: result.into(),
                carry,
                overflow: same_sign && op1.get_bit(31) != result.get_bit(31),
                sign: result.get_bit(31),
                zero: result == 0,
            }
        }
        OperandWidth::Doubleword => {
            let (result, carry) = op1.overflowing_add(op2);
            let same_sign = op1.get_bit(63) == op2.get_bit(63);
            ArithmeticOpResult {
                result,
                carry,
                overflow: same_sign && op1.get_bit(63) != result.get_bit(63),
                sign: result.get_bit(63),
                zero: result == 0,
            }
        }
    }
}

pub(crate) fn sub_with_flags(width: OperandWidth, op1: u64, op2: u64) -> ArithmeticOpResult {
    match width {
        OperandWidth::Word => {
            let (op1, op2) = (op1 as u32, op2 as u32);
            let result = op1.wrapping_sub(op2);
            let different_sign = op1.get_bit(31) != op2.get_bit(31);
            ArithmeticOpResult {
                result: result.into(),
                // C on a subtraction means "no borrow".
                carry: op1 >= op2,
                overflow: different_sign && result.get_bit(31) != op1.get_bit(31),
                sign: result.get_bit(31),
                zero: result == 0,
            }
        }
        OperandWidth::Doubleword => {
            let result = op1.wrapping_sub(op2);
            let different_sign = op1.get_bit(63) != op2.get_bit(63);
            ArithmeticOpResult {
                result,
                carry: op1 >= op2,
                overflow: different_sign && result.get_bit(63) != op1.get_bit(63),
                sign: result.get_bit(63),
                zero: result == 0,
            }
        }
    }
}

/// Applies the shift operator to a register operand. The input is
/// truncated to the operation width first and the output stays inside
/// it.
pub(crate) fn shift_operand(
    width: OperandWidth,
    kind: ShiftKind,
    amount: u32,
    value: u64,
) -> u64 {
    let value = width.truncate(value);
    match kind {
        ShiftKind::Lsl => {
            if amount >= width.bits() {
                0
            } else {
                width.truncate(value << amount)
            }
        }
        ShiftKind::Lsr => {
            if amount >= width.bits() {
                0
            } else {
                value >> amount
            }
        }
        ShiftKind::Asr => match width {
            // Shifting by width-1 floods the value with the sign bit, so
            // amounts past the width clamp to it.
            OperandWidth::Word => {
                let shifted = (value as u32 as i32) >> amount.min(31);
                width.truncate(shifted as u32 as u64)
            }
            OperandWidth::Doubleword => ((value as i64) >> amount.min(63)) as u64,
        },
        ShiftKind::Ror => match width {
            OperandWidth::Word => (value as u32).rotate_right(amount).into(),
            OperandWidth::Doubleword => value.rotate_right(amount),
        },
    }
}

impl Armv8 {
    pub(crate) fn arithmetic_immediate(
        &mut self,
        width: OperandWidth,
        kind: ArithmeticKind,
        shifted: bool,
        imm12: u32,
        rn: u32,
        rd: u32,
    ) {
        // imm12 is zero-extended, optionally moved up by 12 bits.
        let op2 = u64::from(imm12) << if shifted { 12 } else { 0 };
        self.arithmetic(width, kind, rn, op2, rd);
    }

    pub(crate) fn arithmetic_register(
        &mut self,
        width: OperandWidth,
        kind: ArithmeticKind,
        shift: ShiftKind,
        amount: u32,
        rm: u32,
        rn: u32,
        rd: u32,
    ) {
        let op2 = shift_operand(width, shift, amount, self.registers.read(rm));
        self.arithmetic(width, kind, rn, op2, rd);
    }

    fn arithmetic(&mut self, width: OperandWidth, kind: ArithmeticKind, rn: u32, op2: u64, rd: u32) {
        let op1 = width.truncate(self.registers.read(rn));
        match kind {
            ArithmeticKind::Add => {
                self.registers.write(rd, width.truncate(op1.wrapping_add(op2)));
            }
            ArithmeticKind::Sub => {
                self.registers.write(rd, width.truncate(op1.wrapping_sub(op2)));
            }
            ArithmeticKind::Adds => {
                let outcome = add_with_flags(width, op1, op2);
                self.registers.write(rd, outcome.result);
                self.pstate.set_flags(&outcome);
            }
            ArithmeticKind::Subs => {
                let outcome = sub_with_flags(width, op1, op2);
                self.registers.write(rd, outcome.result);
                self.pstate.set_flags(&outcome);
            }
        }
    }

    pub(crate) fn wide_move(
        &mut self,
        width: OperandWidth,
        kind: WideMoveKind,
        hw: u32,
        imm16: u32,
        rd: u32,
    ) {
        let shifted = u64::from(imm16) << (hw * 16);
        let result = match kind {
            WideMoveKind::Movn => !shifted,
            WideMoveKind::Movz => shifted,
            WideMoveKind::Movk => {
                let keep_mask = !(0xFFFF_u64 << (hw * 16));
                (self.registers.read(rd) & keep_mask) | shifted
            }
        };
        self.registers.write(rd, width.truncate(result));
    }

    pub(crate) fn logical_register(
        &mut self,
        width: OperandWidth,
        kind: LogicalKind,
        shift: ShiftKind,
        amount: u32,
        rm: u32,
        rn: u32,
        rd: u32,
    ) {
        let op1 = width.truncate(self.registers.read(rn));
        let op2 = shift_operand(width, shift, amount, self.registers.read(rm));
        let result = width.truncate(match kind {
            LogicalKind::And | LogicalKind::Ands => op1 & op2,
            LogicalKind::Bic | LogicalKind::Bics => op1 & !op2,
            LogicalKind::Orr => op1 | op2,
            LogicalKind::Orn => op1 | !op2,
            LogicalKind::Eor => op1 ^ op2,
            LogicalKind::Eon => op1 ^ !op2,
        });
        self.registers.write(rd, result);

        if kind.sets_flags() {
            self.pstate.set_sign_flag(result.get_bit(width.bits() as u8 - 1));
            self.pstate.set_zero_flag(result == 0);
            self.pstate.set_carry_flag(false);
            self.pstate.set_overflow_flag(false);
        }
    }

    pub(crate) fn multiply(
        &mut self,
        width: OperandWidth,
        kind: MultiplyKind,
        rm: u32,
        ra: u32,
        rn: u32,
        rd: u32,
    ) {
        let op1 = width.truncate(self.registers.read(rn));
        let op2 = width.truncate(self.registers.read(rm));
        // ra = 31 reads the zero register, which realises mul and mneg.
        let accumulator = width.truncate(self.registers.read(ra));
        let product = op1.wrapping_mul(op2);
        let result = match kind {
            MultiplyKind::Madd => accumulator.wrapping_add(product),
            MultiplyKind::Msub => accumulator.wrapping_sub(product),
        };
        self.registers.write(rd, width.truncate(result));
    }
}
