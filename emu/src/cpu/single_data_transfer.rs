//! Loads and stores: effective-address resolution for the four
//! register-indexed addressing modes, the PC-relative literal load, and
//! the transfers themselves.

use crate::cpu::armv8::Armv8;
use crate::cpu::flags::{LoadStoreKind, OperandWidth};
use crate::cpu::instructions::AddressingMode;

impl Armv8 {
    pub(crate) fn load_store_register(
        &mut self,
        width: OperandWidth,
        kind: LoadStoreKind,
        mode: AddressingMode,
        rn: u32,
        rt: u32,
    ) {
        let base = self.registers.read(rn);
        let (address, write_back) = match mode {
            AddressingMode::UnsignedOffset { imm12 } => (
                base.wrapping_add(u64::from(imm12) * width.transfer_size()),
                None,
            ),
            AddressingMode::RegisterOffset { rm } => {
                (base.wrapping_add(self.registers.read(rm)), None)
            }
            AddressingMode::PreIndex { simm9 } => {
                let address = base.wrapping_add_signed(simm9);
                (address, Some(address))
            }
            AddressingMode::PostIndex { simm9 } => (base, Some(base.wrapping_add_signed(simm9))),
        };

        self.transfer(width, kind, address, rt);

        // The base register updates only after the transfer completed.
        if let Some(updated) = write_back {
            self.registers.write(rn, updated);
        }
    }

    /// Loads from `PC + simm19 * 4`, independent of any base register.
    pub(crate) fn load_literal(&mut self, width: OperandWidth, simm19: i64, rt: u32) {
        let address = self.pc.wrapping_add_signed(simm19 * 4);
        self.transfer(width, LoadStoreKind::Load, address, rt);
    }

    fn transfer(&mut self, width: OperandWidth, kind: LoadStoreKind, address: u64, rt: u32) {
        match (kind, width) {
            (LoadStoreKind::Load, OperandWidth::Word) => {
                let value = self.memory.read_word(address);
                self.registers.write(rt, value.into());
            }
            (LoadStoreKind::Load, OperandWidth::Doubleword) => {
                let value = self.memory.read_doubleword(address);
                self.registers.write(rt, value);
            }
            (LoadStoreKind::Store, OperandWidth::Word) => {
                self.memory.write_word(address, self.registers.read(rt) as u32);
            }
            (LoadStoreKind::Store, OperandWidth::Doubleword) => {
                self.memory.write_doubleword(address, self.registers.read(rt));
            }
        }
    }
}
