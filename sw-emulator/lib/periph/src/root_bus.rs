/*++

Licensed under the Apache-2.0 license.

File Name:

    root_bus.rs

Abstract:

    File contains the root bus of the emulated board: the AXI interconnect
    from the processing system to the KHAZAD accelerator.

--*/

use crate::{KhazadPl, KhazadTiming};
use khazad_emu_bus::{Bus, BusError, Clock, TimerAction};
use khazad_emu_types::{AccessSize, BusAddr, BusData};

/// Board configuration
#[derive(Debug, Clone)]
pub struct KhazadRootBusArgs {
    /// Base address of the accelerator's AXI window
    pub accel_base: BusAddr,

    /// Accelerator latency
    pub timing: KhazadTiming,
}

impl Default for KhazadRootBusArgs {
    fn default() -> Self {
        Self {
            accel_base: KhazadRootBus::ACCEL_BASE,
            timing: KhazadTiming::default(),
        }
    }
}

/// Every access through the root bus costs one clock cycle; timer actions
/// that come due are delivered to the accelerator before the access.
pub struct KhazadRootBus {
    pub clock: Clock,
    pub accel: KhazadPl,
    accel_base: BusAddr,
}

impl KhazadRootBus {
    /// Default AXI base address of the accelerator
    pub const ACCEL_BASE: BusAddr = 0x4120_0000;

    pub fn new(args: KhazadRootBusArgs) -> Self {
        let clock = Clock::new();
        let accel = KhazadPl::new(&clock, args.timing);
        Self {
            clock,
            accel,
            accel_base: args.accel_base,
        }
    }

    pub fn accel_base(&self) -> BusAddr {
        self.accel_base
    }

    /// Reset push button: reinitializes the accelerator immediately.
    pub fn press_reset_button(&mut self) {
        self.accel.warm_reset();
    }

    /// Press the reset push button `ticks` cycles from now.
    pub fn schedule_reset_in(&mut self, ticks: u64) {
        // Fire-and-forget; the handle is only needed for cancellation.
        let _ = self
            .clock
            .timer()
            .schedule_action_in(ticks, TimerAction::WarmReset);
    }

    /// Let `ticks` cycles pass without bus traffic.
    pub fn idle(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    fn tick(&mut self) {
        self.clock
            .increment_and_process_timer_actions(1, &mut self.accel);
    }

    fn accel_offset(&self, addr: BusAddr) -> Option<BusAddr> {
        addr.checked_sub(self.accel_base)
            .filter(|offset| *offset < KhazadPl::MMAP_SIZE)
    }
}

impl Default for KhazadRootBus {
    fn default() -> Self {
        Self::new(KhazadRootBusArgs::default())
    }
}

impl Bus for KhazadRootBus {
    fn read(&mut self, size: AccessSize, addr: BusAddr) -> Result<BusData, BusError> {
        self.tick();
        match self.accel_offset(addr) {
            Some(offset) => self.accel.read(size, offset),
            None => Err(BusError::LoadAccessFault),
        }
    }

    fn write(&mut self, size: AccessSize, addr: BusAddr, val: BusData) -> Result<(), BusError> {
        self.tick();
        match self.accel_offset(addr) {
            Some(offset) => self.accel.write(size, offset, val),
            None => Err(BusError::StoreAccessFault),
        }
    }

    fn poll(&mut self) {
        self.accel.poll();
    }

    fn warm_reset(&mut self) {
        self.accel.warm_reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTROL: BusAddr = KhazadRootBus::ACCEL_BASE;
    const STATUS: BusAddr = KhazadRootBus::ACCEL_BASE + 0x04;
    const DATA_DIR: BusAddr = KhazadRootBus::ACCEL_BASE + 0x08;
    const DATA0: BusAddr = KhazadRootBus::ACCEL_BASE + 0x30;
    const DATA1: BusAddr = KhazadRootBus::ACCEL_BASE + 0x34;

    fn start_zero_key_encrypt(bus: &mut KhazadRootBus) {
        bus.write(AccessSize::Word, CONTROL, 0b1001).unwrap();
    }

    #[test]
    fn test_access_advances_clock() {
        let mut bus = KhazadRootBus::default();
        assert_eq!(bus.clock.now(), 0);
        bus.read(AccessSize::Word, STATUS).unwrap();
        bus.write(AccessSize::Word, DATA_DIR, 0).unwrap();
        assert_eq!(bus.clock.now(), 2);
        bus.idle(10);
        assert_eq!(bus.clock.now(), 12);
    }

    #[test]
    fn test_unmapped_address() {
        let mut bus = KhazadRootBus::default();
        assert_eq!(
            bus.read(AccessSize::Word, 0x4120_0040),
            Err(BusError::LoadAccessFault)
        );
        assert_eq!(
            bus.write(AccessSize::Word, 0x4110_0000, 0),
            Err(BusError::StoreAccessFault)
        );
    }

    #[test]
    fn test_operation_completes_by_polling() {
        let mut bus = KhazadRootBus::default();
        start_zero_key_encrypt(&mut bus);
        let mut polls = 0;
        while bus.read(AccessSize::Word, STATUS).unwrap() != 1 {
            polls += 1;
            assert!(polls < 100);
        }
        bus.write(AccessSize::Word, DATA_DIR, 1).unwrap();
        assert_eq!(bus.read(AccessSize::Word, DATA0), Ok(0x2325_d00f));
        assert_eq!(bus.read(AccessSize::Word, DATA1), Ok(0x3e76_a22d));
    }

    #[test]
    fn test_relocated_window() {
        let mut bus = KhazadRootBus::new(KhazadRootBusArgs {
            accel_base: 0x8000_0000,
            ..Default::default()
        });
        assert_eq!(bus.accel_base(), 0x8000_0000);
        assert_eq!(bus.write(AccessSize::Word, 0x8000_0008, 1), Ok(()));
        assert_eq!(bus.read(AccessSize::Word, 0x8000_0008), Ok(1));
        assert_eq!(
            bus.read(AccessSize::Word, DATA_DIR),
            Err(BusError::LoadAccessFault)
        );
    }

    #[test]
    fn test_reset_button() {
        let mut bus = KhazadRootBus::default();
        start_zero_key_encrypt(&mut bus);
        bus.idle(100);
        assert_eq!(bus.read(AccessSize::Word, STATUS), Ok(1));
        bus.press_reset_button();
        assert_eq!(bus.read(AccessSize::Word, STATUS), Ok(0));
        assert_eq!(bus.read(AccessSize::Word, CONTROL), Ok(0));
    }

    #[test]
    fn test_scheduled_reset_aborts_operation() {
        let mut bus = KhazadRootBus::default();
        bus.schedule_reset_in(5);
        start_zero_key_encrypt(&mut bus);
        assert_eq!(bus.read(AccessSize::Word, STATUS), Ok(2));
        bus.idle(100);
        assert_eq!(bus.read(AccessSize::Word, STATUS), Ok(0));
        assert!(!bus.accel.is_busy());
    }
}
