/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the KHAZAD Emulator Types library.

--*/

mod macros;

/// AXI data width
pub type BusData = u32;

/// AXI address width
pub type BusAddr = u32;

emu_enum!(
    /// AXI access size
    #[derive(Debug, Eq, PartialEq, Copy, Clone)]
    pub AccessSize;
    usize;
    {
        Byte = 1,
        HalfWord = 2,
        Word = 4,
    };
    Invalid
);
