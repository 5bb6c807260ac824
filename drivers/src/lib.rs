/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the KHAZAD accelerator driver library.

--*/

#![cfg_attr(not(test), no_std)]

mod reg;

mod array;
mod engine;
mod khazad_accel;
mod modes;
mod prng;
mod wait;

pub use array::{Array4x2, Array4x4, Block, CipherKey, BLOCK_SIZE};
pub use engine::{BlockCipherEngine, HwKhazad, SoftKhazad};
pub use khazad_accel::{
    Chain, Direction, IvSource, KeySource, KhazadAccel, ModeSelect, WaitPolicy,
};
pub use khazad_error::{KhazadError, KhazadResult};
pub use modes::{cbc_mac, padded_len, CbcDecryptor, CbcEncryptor, CbcStream, Ecb, Envelope};
pub use prng::{CtrPrng, DEFAULT_PRNG_NONCE};
pub use reg::khazad_regs::{KhazadRegs, KHAZAD_BASE};

#[cfg(test)]
mod testing;
