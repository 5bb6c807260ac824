/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the KHAZAD Emulator Crypto library.

--*/

mod khazad;
mod sbox;

pub use khazad::Khazad;
pub use khazad::KhazadMode;
