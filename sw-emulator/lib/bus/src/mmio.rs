// Licensed under the Apache-2.0 license

use std::cell::RefCell;

use khazad_emu_types::{AccessSize, BusAddr};

use crate::Bus;

const fn access_size<T>() -> AccessSize {
    match core::mem::size_of::<T>() {
        1 => AccessSize::Byte,
        2 => AccessSize::HalfWord,
        4 => AccessSize::Word,
        _ => panic!("Unsupported access size"),
    }
}

fn bus_addr<T>(ptr: *const T) -> BusAddr {
    BusAddr::try_from(ptr as usize).unwrap_or_else(|_| panic!("{ptr:?} is outside the AXI window"))
}

/// An MMIO implementation that forwards volatile accesses to a
/// `khazad_emu_bus::Bus`, letting register-level drivers run against the
/// emulated programmable logic.
pub struct BusMmio<TBus: Bus> {
    bus: RefCell<TBus>,
}
impl<TBus: Bus> BusMmio<TBus> {
    pub fn new(bus: TBus) -> Self {
        Self {
            bus: RefCell::new(bus),
        }
    }

    /// Run `f` with mutable access to the wrapped bus.
    pub fn with_bus<R>(&self, f: impl FnOnce(&mut TBus) -> R) -> R {
        f(&mut self.bus.borrow_mut())
    }

    pub fn into_inner(self) -> TBus {
        self.bus.into_inner()
    }
}
impl<TBus: Bus> ureg::Mmio for BusMmio<TBus> {
    /// Loads from address `src` on the bus and returns the value.
    ///
    /// # Panics
    ///
    /// This function panics if the bus faults.
    ///
    /// # Safety
    ///
    /// The pointer is only used as a bus address and is never dereferenced.
    unsafe fn read_volatile<T: Clone + Copy + Sized>(&self, src: *const T) -> T {
        let val = self
            .bus
            .borrow_mut()
            .read(access_size::<T>(), bus_addr(src))
            .unwrap_or_else(|e| panic!("bus fault {e:?} reading {src:?}"));
        match core::mem::size_of::<T>() {
            1 => core::mem::transmute_copy::<u8, T>(&(val as u8)),
            2 => core::mem::transmute_copy::<u16, T>(&(val as u16)),
            4 => core::mem::transmute_copy::<u32, T>(&val),
            _ => panic!("Unsupported read size"),
        }
    }
}

impl<TBus: Bus> ureg::MmioMut for BusMmio<TBus> {
    /// Stores `src` to address `dst` on the bus.
    ///
    /// # Panics
    ///
    /// This function panics if the bus faults.
    ///
    /// # Safety
    ///
    /// The pointer is only used as a bus address and is never dereferenced.
    unsafe fn write_volatile<T: Clone + Copy>(&self, dst: *mut T, src: T) {
        let val = match core::mem::size_of::<T>() {
            1 => u32::from(core::mem::transmute_copy::<T, u8>(&src)),
            2 => u32::from(core::mem::transmute_copy::<T, u16>(&src)),
            4 => core::mem::transmute_copy::<T, u32>(&src),
            _ => panic!("Unsupported write size"),
        };
        self.bus
            .borrow_mut()
            .write(access_size::<T>(), bus_addr(dst), val)
            .unwrap_or_else(|e| panic!("bus fault {e:?} writing {dst:?}"))
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::FakeBus;
    use ureg::{Mmio, MmioMut};

    use super::*;

    #[test]
    fn test_bus_mmio() {
        let mut fake = FakeBus::new();
        fake.read_result = Ok(0x3abc_9321);
        let log = fake.log.clone();
        let mmio = BusMmio::new(fake);
        unsafe {
            mmio.write_volatile(0x4120_0010 as *mut u32, 0x0001_0203);
            assert_eq!(mmio.read_volatile(0x4120_0034 as *const u32), 0x3abc_9321);
            assert_eq!(mmio.read_volatile(0x4120_0034 as *const u16), 0x9321);
        }
        assert_eq!(
            log.take(),
            "write(Word, 0x41200010, 0x10203)\nread(Word, 0x41200034)\nread(HalfWord, 0x41200034)\n"
        );
        mmio.with_bus(|bus| bus.read_result = Ok(7));
        assert_eq!(unsafe { mmio.read_volatile(0x4120_0004 as *const u32) }, 7);
    }

    #[test]
    #[should_panic(expected = "bus fault StoreAccessFault")]
    fn test_bus_fault_panics() {
        let mut fake = FakeBus::new();
        fake.write_result = Err(crate::BusError::StoreAccessFault);
        let mmio = BusMmio::new(fake);
        unsafe { mmio.write_volatile(0x4120_0004 as *mut u32, 1) };
    }
}
