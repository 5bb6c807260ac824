/*++

Licensed under the Apache-2.0 license.

File Name:

    fake_bus.rs

Abstract:

    File contains code for a fake implementation of the Bus trait.

--*/
use khazad_emu_types::{AccessSize, BusAddr, BusData};

use crate::{testing::Log, Bus, BusError};
use std::fmt::Write;

/// A Bus implementation that logs all calls, and allows the user to override
/// the return value of the methods.
///
/// # Example
///
/// ```
/// use khazad_emu_bus::{Bus, testing::FakeBus};
/// use khazad_emu_types::AccessSize;
///
/// let mut fake_bus = FakeBus::new();
/// fake_bus.read_result = Ok(35);
/// assert_eq!(fake_bus.read(AccessSize::Word, 0x4120_0004), Ok(35));
/// assert_eq!("read(Word, 0x41200004)\n", fake_bus.log.take());
/// ```
pub struct FakeBus {
    pub log: Log,
    pub read_result: Result<BusData, BusError>,
    pub write_result: Result<(), BusError>,
}
impl FakeBus {
    pub fn new() -> Self {
        Self {
            log: Log::new(),
            read_result: Ok(0),
            write_result: Ok(()),
        }
    }
}
impl Default for FakeBus {
    fn default() -> Self {
        Self::new()
    }
}
impl Bus for FakeBus {
    fn read(&mut self, size: AccessSize, addr: BusAddr) -> Result<BusData, BusError> {
        writeln!(self.log.w(), "read({size}, {addr:#x})").unwrap();
        self.read_result
    }

    fn write(&mut self, size: AccessSize, addr: BusAddr, val: BusData) -> Result<(), BusError> {
        writeln!(self.log.w(), "write({size}, {addr:#x}, {val:#x})").unwrap();
        self.write_result
    }

    fn poll(&mut self) {
        writeln!(self.log.w(), "poll()").unwrap();
    }

    fn warm_reset(&mut self) {
        writeln!(self.log.w(), "warm_reset()").unwrap();
    }
}

/// Wraps another Bus and records every access it forwards. Used to assert
/// the order in which a driver touches registers.
pub struct TraceBus<TBus: Bus> {
    pub log: Log,
    pub inner: TBus,
}
impl<TBus: Bus> TraceBus<TBus> {
    pub fn new(inner: TBus) -> Self {
        Self {
            log: Log::new(),
            inner,
        }
    }
}
impl<TBus: Bus> Bus for TraceBus<TBus> {
    fn read(&mut self, size: AccessSize, addr: BusAddr) -> Result<BusData, BusError> {
        let result = self.inner.read(size, addr);
        writeln!(self.log.w(), "read({size}, {addr:#x})").unwrap();
        result
    }

    fn write(&mut self, size: AccessSize, addr: BusAddr, val: BusData) -> Result<(), BusError> {
        writeln!(self.log.w(), "write({size}, {addr:#x}, {val:#x})").unwrap();
        self.inner.write(size, addr, val)
    }

    fn poll(&mut self) {
        self.inner.poll()
    }

    fn warm_reset(&mut self) {
        self.inner.warm_reset()
    }
}
