/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the KHAZAD Emulator Bus library.

--*/
mod bus;
mod clock;
mod mmio;
mod register;
pub mod testing;

pub use crate::bus::{Bus, BusError};
pub use crate::clock::{ActionHandle, Clock, Timer, TimerAction};
pub use crate::mmio::BusMmio;
pub use crate::register::{ReadOnlyRegister, ReadWriteRegister, Register};
