/*++

Licensed under the Apache-2.0 license.

File Name:

    khazad_regs.rs

Abstract:

    File contains register definitions for the KHAZAD accelerator

--*/

use crate::{Block, CipherKey};
use tock_registers::fields::FieldValue;
use tock_registers::{register_bitfields, LocalRegisterCopy};
use ureg::{Mmio, MmioMut};

/// Default AXI base address of the accelerator
pub const KHAZAD_BASE: usize = 0x4120_0000;

pub(crate) const CONTROL_OFFSET: usize = 0x00;
pub(crate) const STATUS_OFFSET: usize = 0x04;
pub(crate) const DATA_DIR_OFFSET: usize = 0x08;
pub(crate) const KEY_OFFSET: usize = 0x10;
pub(crate) const IV_OFFSET: usize = 0x20;
pub(crate) const DATA_OFFSET: usize = 0x30;

register_bitfields! [
    u32,

    /// Control Register Fields
    pub(crate) CONTROL [
        SEM OFFSET(0) NUMBITS(1) [],
        FIRST OFFSET(1) NUMBITS(1) [],
        CBC OFFSET(2) NUMBITS(1) [],
        ENC OFFSET(3) NUMBITS(1) [],
        ONLY_DATA OFFSET(4) NUMBITS(1) [],
        RST OFFSET(5) NUMBITS(1) [],
    ],

    /// Status Register Fields
    pub(crate) STATUS [
        ACK OFFSET(0) NUMBITS(1) [],
        BUSY OFFSET(1) NUMBITS(1) [],
    ],

    /// Data Direction Register Fields
    pub(crate) DATA_DIR [
        DIR OFFSET(0) NUMBITS(1) [
            Input = 0,
            Output = 1,
        ],
    ],
];

/// Register window of one accelerator instance.
pub struct KhazadRegs<TMmio: Mmio + MmioMut> {
    base: usize,
    mmio: TMmio,
}

impl<TMmio: Mmio + MmioMut> KhazadRegs<TMmio> {
    /// # Safety
    ///
    /// `base` must be the address of the accelerator's register window and
    /// the returned object must be the only user of that window.
    pub unsafe fn new(base: *mut u32, mmio: TMmio) -> Self {
        Self {
            base: base as usize,
            mmio,
        }
    }

    pub fn mmio(&self) -> &TMmio {
        &self.mmio
    }

    fn read(&self, offset: usize) -> u32 {
        // SAFETY: the window was handed to `new` under its contract.
        unsafe { self.mmio.read_volatile((self.base + offset) as *const u32) }
    }

    fn write(&self, offset: usize, val: u32) {
        // SAFETY: the window was handed to `new` under its contract.
        unsafe {
            self.mmio
                .write_volatile((self.base + offset) as *mut u32, val)
        }
    }

    pub(crate) fn status(&self) -> LocalRegisterCopy<u32, STATUS::Register> {
        LocalRegisterCopy::new(self.read(STATUS_OFFSET))
    }

    pub(crate) fn write_control(&self, val: FieldValue<u32, CONTROL::Register>) {
        self.write(CONTROL_OFFSET, val.value)
    }

    pub(crate) fn set_data_dir(&self, val: FieldValue<u32, DATA_DIR::Register>) {
        self.write(DATA_DIR_OFFSET, val.value)
    }

    pub(crate) fn write_key(&self, key: &CipherKey) {
        for (i, word) in key.0.iter().enumerate() {
            self.write(KEY_OFFSET + 4 * i, *word);
        }
    }

    pub(crate) fn write_iv(&self, iv: &Block) {
        for (i, word) in iv.0.iter().enumerate() {
            self.write(IV_OFFSET + 4 * i, *word);
        }
    }

    pub(crate) fn write_data(&self, block: &Block) {
        for (i, word) in block.0.iter().enumerate() {
            self.write(DATA_OFFSET + 4 * i, *word);
        }
    }

    pub(crate) fn read_data(&self) -> Block {
        Block::from([self.read(DATA_OFFSET), self.read(DATA_OFFSET + 4)])
    }
}
