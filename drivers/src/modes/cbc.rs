/*++

Licensed under the Apache-2.0 license.

File Name:

    cbc.rs

Abstract:

    File contains the cipher block chaining mode over any
    `BlockCipherEngine`, with the chaining register kept in software.

--*/

use super::map_blocks;
use crate::{Block, BlockCipherEngine, CipherKey};
use khazad_error::KhazadResult;

/// CBC encryption session
pub struct CbcEncryptor<'a, E: BlockCipherEngine> {
    engine: &'a mut E,
    chain: Block,
}

impl<'a, E: BlockCipherEngine> CbcEncryptor<'a, E> {
    pub fn new(engine: &'a mut E, key: &CipherKey, iv: &Block) -> KhazadResult<Self> {
        engine.load_key(key)?;
        Ok(Self { engine, chain: *iv })
    }

    /// `c = E(p ^ chain)`; the ciphertext becomes the new chain value.
    pub fn encrypt_block(&mut self, block: &Block) -> KhazadResult<Block> {
        let out = self.engine.encrypt_block(&(*block ^ self.chain))?;
        self.chain = out;
        Ok(out)
    }

    pub fn encrypt_in_place(&mut self, buf: &mut [u8]) -> KhazadResult<()> {
        map_blocks(buf, |block| self.encrypt_block(block))
    }

    /// Current chaining value: the last ciphertext block, or the IV.
    pub fn chain(&self) -> Block {
        self.chain
    }
}

/// CBC decryption session
pub struct CbcDecryptor<'a, E: BlockCipherEngine> {
    engine: &'a mut E,
    chain: Block,
}

impl<'a, E: BlockCipherEngine> CbcDecryptor<'a, E> {
    pub fn new(engine: &'a mut E, key: &CipherKey, iv: &Block) -> KhazadResult<Self> {
        engine.load_key(key)?;
        Ok(Self { engine, chain: *iv })
    }

    /// `p = D(c) ^ chain`; the ciphertext becomes the new chain value.
    pub fn decrypt_block(&mut self, block: &Block) -> KhazadResult<Block> {
        let out = self.engine.decrypt_block(block)? ^ self.chain;
        self.chain = *block;
        Ok(out)
    }

    pub fn decrypt_in_place(&mut self, buf: &mut [u8]) -> KhazadResult<()> {
        map_blocks(buf, |block| self.decrypt_block(block))
    }

    pub fn chain(&self) -> Block {
        self.chain
    }
}
