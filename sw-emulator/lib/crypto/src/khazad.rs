/*++

Licensed under the Apache-2.0 license.

File Name:

    khazad.rs

Abstract:

    File contains a byte-serial model of the KHAZAD datapath implemented
    by the programmable logic. It shares no tables with the software
    reference so the two can be checked against each other.

--*/

use crate::sbox::SBOX;

/// KHAZAD Mode
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KhazadMode {
    Encrypt,
    Decrypt,
}

/// KHAZAD datapath with a loaded key schedule
#[derive(Clone)]
pub struct Khazad {
    /// Encryption round keys
    enc_keys: [[u8; 8]; Self::ROUNDS + 1],

    /// Decryption round keys
    dec_keys: [[u8; 8]; Self::ROUNDS + 1],
}

impl Khazad {
    /// Block Size
    pub const BLOCK_SIZE: usize = 8;

    /// Key Size
    pub const KEY_SIZE: usize = 16;

    /// Rounds
    pub const ROUNDS: usize = 8;

    /// First row of the diffusion matrix
    const H: [u8; 8] = [0x01, 0x03, 0x04, 0x05, 0x06, 0x08, 0x0b, 0x07];

    /// Run the key schedule
    ///
    /// # Arguments
    ///
    /// * `key` - 128-bit cipher key
    pub fn new(key: &[u8; Self::KEY_SIZE]) -> Self {
        let mut k2 = [0u8; 8];
        let mut k1 = [0u8; 8];
        k2.copy_from_slice(&key[..8]);
        k1.copy_from_slice(&key[8..]);

        let mut enc_keys = [[0u8; 8]; Self::ROUNDS + 1];
        for r in 0..=Self::ROUNDS {
            let mut next = Self::theta(&Self::gamma(&k1));
            for i in 0..8 {
                next[i] ^= SBOX[8 * r + i] ^ k2[i];
            }
            enc_keys[r] = next;
            k2 = k1;
            k1 = next;
        }

        let mut dec_keys = [[0u8; 8]; Self::ROUNDS + 1];
        dec_keys[0] = enc_keys[Self::ROUNDS];
        for r in 1..Self::ROUNDS {
            dec_keys[r] = Self::theta(&enc_keys[Self::ROUNDS - r]);
        }
        dec_keys[Self::ROUNDS] = enc_keys[0];

        Self { enc_keys, dec_keys }
    }

    /// Process one block
    ///
    /// # Arguments
    ///
    /// * `mode` - Direction of the operation
    /// * `block` - Input block
    pub fn crypt(&self, mode: KhazadMode, block: &[u8; Self::BLOCK_SIZE]) -> [u8; Self::BLOCK_SIZE] {
        let keys = match mode {
            KhazadMode::Encrypt => &self.enc_keys,
            KhazadMode::Decrypt => &self.dec_keys,
        };

        let mut state = Self::sigma(block, &keys[0]);
        for key in &keys[1..Self::ROUNDS] {
            state = Self::sigma(&Self::theta(&Self::gamma(&state)), key);
        }
        Self::sigma(&Self::gamma(&state), &keys[Self::ROUNDS])
    }

    pub fn encrypt(&self, block: &[u8; Self::BLOCK_SIZE]) -> [u8; Self::BLOCK_SIZE] {
        self.crypt(KhazadMode::Encrypt, block)
    }

    pub fn decrypt(&self, block: &[u8; Self::BLOCK_SIZE]) -> [u8; Self::BLOCK_SIZE] {
        self.crypt(KhazadMode::Decrypt, block)
    }

    /// Nonlinear layer
    fn gamma(state: &[u8; 8]) -> [u8; 8] {
        state.map(|b| SBOX[b as usize])
    }

    /// Linear diffusion layer
    fn theta(state: &[u8; 8]) -> [u8; 8] {
        let mut out = [0u8; 8];
        for (j, o) in out.iter_mut().enumerate() {
            for (i, s) in state.iter().enumerate() {
                *o ^= Self::gf_mul(*s, Self::H[i ^ j]);
            }
        }
        out
    }

    /// Key addition
    fn sigma(state: &[u8; 8], key: &[u8; 8]) -> [u8; 8] {
        let mut out = *state;
        out.iter_mut().zip(key).for_each(|(o, k)| *o ^= k);
        out
    }

    /// Multiply in GF(2^8) reduced by 0x11d
    fn gf_mul(a: u8, b: u8) -> u8 {
        let mut a = a;
        let mut b = b;
        let mut product = 0;
        while b != 0 {
            if b & 1 != 0 {
                product ^= a;
            }
            a = (a << 1) ^ if a & 0x80 != 0 { 0x1d } else { 0 };
            b >>= 1;
        }
        product
    }
}
