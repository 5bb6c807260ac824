/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the KHAZAD reference cipher library.

--*/
#![no_std]

mod khazad;
mod tables;

pub use cipher;
pub use khazad::Khazad;

/// KHAZAD block size in bytes
pub const BLOCK_SIZE: usize = 8;

/// KHAZAD key size in bytes
pub const KEY_SIZE: usize = 16;

/// Number of rounds
pub const ROUNDS: usize = 8;
