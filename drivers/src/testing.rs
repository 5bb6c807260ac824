/*++

Licensed under the Apache-2.0 license.

File Name:

    testing.rs

Abstract:

    File contains helpers that attach the drivers to the emulated board.

--*/

use crate::{KhazadAccel, KhazadRegs, WaitPolicy, KHAZAD_BASE};
use khazad_emu_bus::{Bus, BusMmio};
use khazad_emu_periph::KhazadRootBus;

pub(crate) fn board() -> BusMmio<KhazadRootBus> {
    BusMmio::new(KhazadRootBus::default())
}

pub(crate) fn accel<TBus: Bus>(
    mmio: &BusMmio<TBus>,
    policy: WaitPolicy,
) -> KhazadAccel<&BusMmio<TBus>> {
    // SAFETY: the bus maps the accelerator at its default base.
    let regs = unsafe { KhazadRegs::new(KHAZAD_BASE as *mut u32, mmio) };
    KhazadAccel::new(regs, policy)
}
