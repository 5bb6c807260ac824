/*++

Licensed under the Apache-2.0 license.

File Name:

    khazad.rs

Abstract:

    File contains the table-driven KHAZAD reference cipher and its
    RustCrypto `cipher` trait implementations.

--*/

use core::fmt;

use cipher::{
    consts::{U1, U16, U8},
    inout::InOut,
    AlgorithmName, Block, BlockBackend, BlockCipher, BlockClosure, BlockDecrypt, BlockEncrypt,
    BlockSizeUser, Key, KeyInit, KeySizeUser, ParBlocksSizeUser,
};

use crate::tables::{RC, SBOX, T};
use crate::{BLOCK_SIZE, KEY_SIZE, ROUNDS};

/// KHAZAD block cipher with expanded encryption and decryption round keys.
#[derive(Clone)]
pub struct Khazad {
    enc_keys: [u64; ROUNDS + 1],
    dec_keys: [u64; ROUNDS + 1],
}

#[inline(always)]
fn byte(x: u64, i: usize) -> usize {
    ((x >> (56 - 8 * i)) & 0xff) as usize
}

/// Substitution followed by diffusion.
#[inline(always)]
fn round(state: u64) -> u64 {
    T[0][byte(state, 0)]
        ^ T[1][byte(state, 1)]
        ^ T[2][byte(state, 2)]
        ^ T[3][byte(state, 3)]
        ^ T[4][byte(state, 4)]
        ^ T[5][byte(state, 5)]
        ^ T[6][byte(state, 6)]
        ^ T[7][byte(state, 7)]
}

/// Substitution only: the last round omits diffusion.
#[inline(always)]
fn substitute(state: u64) -> u64 {
    (0..8).fold(0u64, |acc, i| {
        acc | ((SBOX[byte(state, i)] as u64) << (56 - 8 * i))
    })
}

/// Diffusion only. Because the S-box is an involution, running a byte
/// through it twice before the table lookup cancels the substitution.
#[inline(always)]
fn diffuse(state: u64) -> u64 {
    (0..8).fold(0u64, |acc, i| acc ^ T[i][SBOX[byte(state, i)] as usize])
}

fn crypt(round_keys: &[u64; ROUNDS + 1], block: u64) -> u64 {
    let mut state = block ^ round_keys[0];
    for key in &round_keys[1..ROUNDS] {
        state = round(state) ^ key;
    }
    substitute(state) ^ round_keys[ROUNDS]
}

impl Khazad {
    /// Expand a 128-bit key.
    ///
    /// # Arguments
    ///
    /// * `key` - Key bytes; the first half is the older schedule word.
    pub fn new_from_bytes(key: &[u8; KEY_SIZE]) -> Self {
        let mut k2 = u64::from_be_bytes([
            key[0], key[1], key[2], key[3], key[4], key[5], key[6], key[7],
        ]);
        let mut k1 = u64::from_be_bytes([
            key[8], key[9], key[10], key[11], key[12], key[13], key[14], key[15],
        ]);

        let mut enc_keys = [0u64; ROUNDS + 1];
        for (r, enc_key) in enc_keys.iter_mut().enumerate() {
            *enc_key = round(k1) ^ RC[r] ^ k2;
            k2 = k1;
            k1 = *enc_key;
        }

        let mut dec_keys = [0u64; ROUNDS + 1];
        dec_keys[0] = enc_keys[ROUNDS];
        for r in 1..ROUNDS {
            dec_keys[r] = diffuse(enc_keys[ROUNDS - r]);
        }
        dec_keys[ROUNDS] = enc_keys[0];

        Self { enc_keys, dec_keys }
    }

    /// Encrypt one block.
    pub fn encrypt_bytes(&self, block: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
        crypt(&self.enc_keys, u64::from_be_bytes(*block)).to_be_bytes()
    }

    /// Decrypt one block.
    pub fn decrypt_bytes(&self, block: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
        crypt(&self.dec_keys, u64::from_be_bytes(*block)).to_be_bytes()
    }

    #[inline(always)]
    fn enc_backend(&self) -> KhazadEncBackend<'_> {
        KhazadEncBackend(self)
    }

    #[inline(always)]
    fn dec_backend(&self) -> KhazadDecBackend<'_> {
        KhazadDecBackend(self)
    }
}

impl KeySizeUser for Khazad {
    type KeySize = U16;
}

impl KeyInit for Khazad {
    #[inline]
    fn new(key: &Key<Self>) -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(key);
        Self::new_from_bytes(&bytes)
    }
}

impl BlockSizeUser for Khazad {
    type BlockSize = U8;
}

impl BlockCipher for Khazad {}

impl BlockEncrypt for Khazad {
    fn encrypt_with_backend(&self, f: impl BlockClosure<BlockSize = U8>) {
        f.call(&mut self.enc_backend())
    }
}

impl BlockDecrypt for Khazad {
    fn decrypt_with_backend(&self, f: impl BlockClosure<BlockSize = U8>) {
        f.call(&mut self.dec_backend())
    }
}

impl fmt::Debug for Khazad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str("Khazad { .. }")
    }
}

impl AlgorithmName for Khazad {
    fn write_alg_name(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Khazad")
    }
}

struct KhazadEncBackend<'a>(&'a Khazad);

impl BlockSizeUser for KhazadEncBackend<'_> {
    type BlockSize = U8;
}

impl ParBlocksSizeUser for KhazadEncBackend<'_> {
    type ParBlocksSize = U1;
}

impl BlockBackend for KhazadEncBackend<'_> {
    #[inline(always)]
    fn proc_block(&mut self, mut block: InOut<'_, '_, Block<Self>>) {
        let input = u64::from_be_bytes(block.clone_in().into());
        let output = crypt(&self.0.enc_keys, input).to_be_bytes();
        block.get_out().copy_from_slice(&output);
    }
}

struct KhazadDecBackend<'a>(&'a Khazad);

impl BlockSizeUser for KhazadDecBackend<'_> {
    type BlockSize = U8;
}

impl ParBlocksSizeUser for KhazadDecBackend<'_> {
    type ParBlocksSize = U1;
}

impl BlockBackend for KhazadDecBackend<'_> {
    #[inline(always)]
    fn proc_block(&mut self, mut block: InOut<'_, '_, Block<Self>>) {
        let input = u64::from_be_bytes(block.clone_in().into());
        let output = crypt(&self.0.dec_keys, input).to_be_bytes();
        block.get_out().copy_from_slice(&output);
    }
}
