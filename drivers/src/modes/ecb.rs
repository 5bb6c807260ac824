/*++

Licensed under the Apache-2.0 license.

File Name:

    ecb.rs

Abstract:

    File contains the electronic codebook mode.

--*/

use super::map_blocks;
use crate::{Block, BlockCipherEngine, CipherKey};
use khazad_error::KhazadResult;

/// ECB session: every block is processed independently under one key.
pub struct Ecb<'a, E: BlockCipherEngine> {
    engine: &'a mut E,
}

impl<'a, E: BlockCipherEngine> Ecb<'a, E> {
    pub fn new(engine: &'a mut E, key: &CipherKey) -> KhazadResult<Self> {
        engine.load_key(key)?;
        Ok(Self { engine })
    }

    pub fn encrypt_block(&mut self, block: &Block) -> KhazadResult<Block> {
        self.engine.encrypt_block(block)
    }

    pub fn decrypt_block(&mut self, block: &Block) -> KhazadResult<Block> {
        self.engine.decrypt_block(block)
    }

    /// Encrypt `buf`, whose length must be a multiple of the block size.
    pub fn encrypt_in_place(&mut self, buf: &mut [u8]) -> KhazadResult<()> {
        map_blocks(buf, |block| self.engine.encrypt_block(block))
    }

    /// Decrypt `buf`, whose length must be a multiple of the block size.
    pub fn decrypt_in_place(&mut self, buf: &mut [u8]) -> KhazadResult<()> {
        map_blocks(buf, |block| self.engine.decrypt_block(block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SoftKhazad;
    use khazad_error::KhazadError;

    fn seq_key() -> CipherKey {
        CipherKey::from([0x0001_0203u32, 0x0405_0607, 0x0809_0a0b, 0x0c0d_0e0f])
    }

    #[test]
    fn test_ecb_message() {
        let mut engine = SoftKhazad::new();
        let mut ecb = Ecb::new(&mut engine, &seq_key()).unwrap();
        let mut buf = [0u8; 24];
        buf[..20].copy_from_slice(b"KHAZAD block cipher!");
        let plain = buf;

        ecb.encrypt_in_place(&mut buf).unwrap();
        assert_eq!(
            buf,
            [
                0xea, 0x73, 0x90, 0x74, 0xd1, 0xa6, 0x87, 0x77, 0x7a, 0x9d, 0x65, 0x64, 0x85,
                0xb9, 0x53, 0xa1, 0x13, 0x8c, 0xdb, 0x04, 0xf5, 0x7d, 0x70, 0xc1
            ]
        );
        ecb.decrypt_in_place(&mut buf).unwrap();
        assert_eq!(buf, plain);
    }

    #[test]
    fn test_identical_blocks_identical_ciphertext() {
        let mut engine = SoftKhazad::new();
        let mut ecb = Ecb::new(&mut engine, &seq_key()).unwrap();
        let mut buf = [0x5au8; 16];
        ecb.encrypt_in_place(&mut buf).unwrap();
        assert_eq!(buf[..8], buf[8..]);
    }

    #[test]
    fn test_partial_block_rejected() {
        let mut engine = SoftKhazad::new();
        let mut ecb = Ecb::new(&mut engine, &seq_key()).unwrap();
        let mut buf = [0u8; 12];
        assert_eq!(
            ecb.encrypt_in_place(&mut buf),
            Err(KhazadError::DRIVER_KHAZAD_INVALID_SLICE)
        );
        assert_eq!(buf, [0u8; 12]);
    }
}
