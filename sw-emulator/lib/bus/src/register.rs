/*++

Licensed under the Apache-2.0 license.

File Name:

    register.rs

Abstract:

    File contains the register cells used by emulated peripherals. Every
    register in the accelerator's AXI window is 32 bits wide and must be
    accessed with word-sized loads and stores.

--*/

use crate::BusError;
use khazad_emu_types::{AccessSize, BusData};
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::InMemoryRegister;
use tock_registers::RegisterLongName;

pub trait Register {
    /// Read the register with an access of `size`
    ///
    /// # Error
    ///
    /// * `BusError` - `BusError::LoadAccessFault` on a non-word access
    fn read(&self, size: AccessSize) -> Result<BusData, BusError>;

    /// Write `val` to the register with an access of `size`
    ///
    /// # Error
    ///
    /// * `BusError` - `BusError::StoreAccessFault` on a non-word access or
    ///   when the register is read-only
    fn write(&mut self, size: AccessSize, val: BusData) -> Result<(), BusError>;
}

impl Register for u32 {
    fn read(&self, size: AccessSize) -> Result<BusData, BusError> {
        match size {
            AccessSize::Word => Ok(*self),
            _ => Err(BusError::LoadAccessFault),
        }
    }

    fn write(&mut self, size: AccessSize, val: BusData) -> Result<(), BusError> {
        match size {
            AccessSize::Word => {
                *self = val;
                Ok(())
            }
            _ => Err(BusError::StoreAccessFault),
        }
    }
}

/// Read Write Register
pub struct ReadWriteRegister<R: RegisterLongName = ()> {
    pub reg: InMemoryRegister<u32, R>,
}

impl<R: RegisterLongName> ReadWriteRegister<R> {
    pub fn new(val: u32) -> Self {
        Self {
            reg: InMemoryRegister::new(val),
        }
    }
}

impl<R: RegisterLongName> Register for ReadWriteRegister<R> {
    fn read(&self, size: AccessSize) -> Result<BusData, BusError> {
        if size != AccessSize::Word {
            Err(BusError::LoadAccessFault)?
        }
        Ok(self.reg.get())
    }

    fn write(&mut self, size: AccessSize, val: BusData) -> Result<(), BusError> {
        if size != AccessSize::Word {
            Err(BusError::StoreAccessFault)?
        }
        self.reg.set(val);
        Ok(())
    }
}

/// Read Only Register. The peripheral updates `reg` directly; bus writes fault.
pub struct ReadOnlyRegister<R: RegisterLongName = ()> {
    pub reg: InMemoryRegister<u32, R>,
}

impl<R: RegisterLongName> ReadOnlyRegister<R> {
    pub fn new(val: u32) -> Self {
        Self {
            reg: InMemoryRegister::new(val),
        }
    }
}

impl<R: RegisterLongName> Register for ReadOnlyRegister<R> {
    fn read(&self, size: AccessSize) -> Result<BusData, BusError> {
        if size != AccessSize::Word {
            Err(BusError::LoadAccessFault)?
        }
        Ok(self.reg.get())
    }

    fn write(&mut self, _size: AccessSize, _val: BusData) -> Result<(), BusError> {
        Err(BusError::StoreAccessFault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tock_registers::register_bitfields;

    register_bitfields! [
        u32,
        Flags [
            ACK OFFSET(0) NUMBITS(1) [],
        ],
    ];

    #[test]
    fn test_read_write_register() {
        let mut reg = ReadWriteRegister::<Flags::Register>::new(0);
        reg.write(AccessSize::Word, 1).unwrap();
        assert!(reg.reg.is_set(Flags::ACK));
        assert_eq!(reg.read(AccessSize::Word), Ok(1));
        assert_eq!(
            reg.read(AccessSize::HalfWord),
            Err(BusError::LoadAccessFault)
        );
        assert_eq!(
            reg.write(AccessSize::Byte, 0),
            Err(BusError::StoreAccessFault)
        );
    }

    #[test]
    fn test_read_only_register() {
        let mut reg = ReadOnlyRegister::<Flags::Register>::new(0);
        reg.reg.write(Flags::ACK::SET);
        assert_eq!(reg.read(AccessSize::Word), Ok(1));
        assert_eq!(
            reg.write(AccessSize::Word, 0),
            Err(BusError::StoreAccessFault)
        );
        assert_eq!(reg.read(AccessSize::Word), Ok(1));
    }

    #[test]
    fn test_plain_word() {
        let mut word = 0u32;
        word.write(AccessSize::Word, 0x0102_0304).unwrap();
        assert_eq!(Register::read(&word, AccessSize::Word), Ok(0x0102_0304));
        assert_eq!(
            word.write(AccessSize::HalfWord, 0),
            Err(BusError::StoreAccessFault)
        );
    }
}
