/*++

Licensed under the Apache-2.0 license.

File Name:

    testing.rs

Abstract:

    File contains the emulated board and a faulty engine for harness tests.

--*/

use khazad_drivers::{
    Block, BlockCipherEngine, CipherKey, HwKhazad, KhazadAccel, KhazadRegs, KhazadResult,
    WaitPolicy, KHAZAD_BASE,
};
use khazad_emu_bus::BusMmio;
use khazad_emu_periph::KhazadRootBus;

pub(crate) fn board() -> BusMmio<KhazadRootBus> {
    BusMmio::new(KhazadRootBus::default())
}

pub(crate) fn accel(mmio: &BusMmio<KhazadRootBus>) -> KhazadAccel<&BusMmio<KhazadRootBus>> {
    // SAFETY: the board maps the accelerator at its default base.
    let regs = unsafe { KhazadRegs::new(KHAZAD_BASE as *mut u32, mmio) };
    KhazadAccel::new(regs, WaitPolicy::default())
}

pub(crate) fn hw_engine(mmio: &BusMmio<KhazadRootBus>) -> HwKhazad<&BusMmio<KhazadRootBus>> {
    HwKhazad::new(accel(mmio))
}

/// Flips the low bit of every `period`-th encryption result.
pub(crate) struct Corrupting<E> {
    inner: E,
    period: u32,
    count: u32,
}

impl<E> Corrupting<E> {
    pub(crate) fn new(inner: E, period: u32) -> Self {
        Self {
            inner,
            period,
            count: 0,
        }
    }
}

impl<E: BlockCipherEngine> BlockCipherEngine for Corrupting<E> {
    fn load_key(&mut self, key: &CipherKey) -> KhazadResult<()> {
        self.inner.load_key(key)
    }

    fn encrypt_block(&mut self, block: &Block) -> KhazadResult<Block> {
        let out = self.inner.encrypt_block(block)?;
        self.count += 1;
        if self.count % self.period == 0 {
            return Ok(out ^ Block::from([0u32, 1]));
        }
        Ok(out)
    }

    fn decrypt_block(&mut self, block: &Block) -> KhazadResult<Block> {
        self.inner.decrypt_block(block)
    }
}
