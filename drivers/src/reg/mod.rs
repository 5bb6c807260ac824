/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains register definitions for the KHAZAD accelerator

--*/

pub(crate) mod khazad_regs;
