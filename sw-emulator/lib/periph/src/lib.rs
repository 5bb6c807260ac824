/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the KHAZAD Emulator Peripheral library.

--*/

mod khazad_pl;
mod root_bus;

pub use khazad_pl::{KhazadPl, KhazadTiming};
pub use root_bus::{KhazadRootBus, KhazadRootBusArgs};
