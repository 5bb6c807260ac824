/*++

Licensed under the Apache-2.0 license.

File Name:

    prng.rs

Abstract:

    File contains the counter mode pseudo-random generator used to derive
    keys, IVs and messages for the random vector tests.

--*/

use crate::{Block, BlockCipherEngine, CipherKey, BLOCK_SIZE};
use khazad_error::{KhazadError, KhazadResult};

/// Default nonce of the random vector tests
pub const DEFAULT_PRNG_NONCE: [u8; 4] = [0x01, 0x02, 0x03, 0x04];

/// Output block `n` is `E(key, nonce || n)`, with `n` a 32-bit big-endian
/// counter that is never reused for one `(nonce, key)` pair.
#[derive(Debug, Clone)]
pub struct CtrPrng {
    nonce: [u8; 4],
    key: CipherKey,

    /// Counter of the next output; `None` once the counter space is used up
    next: Option<u32>,
}

impl CtrPrng {
    pub fn new(nonce: [u8; 4], key: CipherKey) -> Self {
        Self::with_counter(nonce, key, 0)
    }

    /// Start the generator at `counter` instead of zero.
    pub fn with_counter(nonce: [u8; 4], key: CipherKey, counter: u32) -> Self {
        Self {
            nonce,
            key,
            next: Some(counter),
        }
    }

    /// Counter of the next output, or `None` when exhausted.
    pub fn counter(&self) -> Option<u32> {
        self.next
    }

    /// Restart the counter under new seed material.
    pub fn reseed(&mut self, nonce: [u8; 4], key: CipherKey) {
        *self = Self::new(nonce, key);
    }

    /// Produce the next output block. The engine is left keyed with the
    /// generator key; an engine that already holds it is not rekeyed.
    pub fn next_block<E: BlockCipherEngine>(&mut self, engine: &mut E) -> KhazadResult<Block> {
        let Some(counter) = self.next else {
            return Err(KhazadError::DRIVER_KHAZAD_PRNG_EXHAUSTED);
        };
        engine.load_key(&self.key)?;
        let input = Block::from([u32::from_be_bytes(self.nonce), counter]);
        let out = engine.encrypt_block(&input)?;
        self.next = counter.checked_add(1);
        Ok(out)
    }

    /// Fill `buf` with output bytes; a trailing partial block discards the
    /// rest of its output block.
    pub fn fill_bytes<E: BlockCipherEngine>(
        &mut self,
        engine: &mut E,
        buf: &mut [u8],
    ) -> KhazadResult<()> {
        for chunk in buf.chunks_mut(BLOCK_SIZE) {
            let block = self.next_block(engine)?.to_bytes();
            chunk.copy_from_slice(&block[..chunk.len()]);
        }
        Ok(())
    }

    pub fn next_key<E: BlockCipherEngine>(&mut self, engine: &mut E) -> KhazadResult<CipherKey> {
        let mut key = [0u8; 16];
        self.fill_bytes(engine, &mut key)?;
        Ok(CipherKey::from(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SoftKhazad;

    #[test]
    fn test_known_outputs() {
        let mut engine = SoftKhazad::new();
        let mut prng = CtrPrng::new(DEFAULT_PRNG_NONCE, CipherKey::default());
        assert_eq!(
            prng.next_block(&mut engine).unwrap(),
            Block::from([0xbb37_2d90u32, 0x3358_1991])
        );
        assert_eq!(
            prng.next_block(&mut engine).unwrap(),
            Block::from([0x275e_d8beu32, 0x9cfa_395d])
        );
        assert_eq!(
            prng.next_block(&mut engine).unwrap(),
            Block::from([0xa828_a593u32, 0x124a_8de5])
        );
        assert_eq!(prng.counter(), Some(3));
    }

    #[test]
    fn test_fill_bytes_matches_blocks() {
        let mut engine = SoftKhazad::new();
        let mut prng = CtrPrng::new(DEFAULT_PRNG_NONCE, CipherKey::default());
        let mut buf = [0u8; 12];
        prng.fill_bytes(&mut engine, &mut buf).unwrap();
        assert_eq!(buf[..8], [0xbb, 0x37, 0x2d, 0x90, 0x33, 0x58, 0x19, 0x91]);
        assert_eq!(buf[8..], [0x27, 0x5e, 0xd8, 0xbe]);
        assert_eq!(prng.counter(), Some(2));
    }

    #[test]
    fn test_no_repeats() {
        let mut engine = SoftKhazad::new();
        let mut prng = CtrPrng::new(DEFAULT_PRNG_NONCE, CipherKey::from([9u32, 8, 7, 6]));
        let mut seen = std::collections::HashSet::new();
        for _ in 0..4096 {
            assert!(seen.insert(prng.next_block(&mut engine).unwrap()));
        }
    }

    #[test]
    fn test_exhaustion_and_reseed() {
        let mut engine = SoftKhazad::new();
        let key = CipherKey::default();
        let mut prng = CtrPrng::with_counter(DEFAULT_PRNG_NONCE, key, u32::MAX);
        assert!(prng.next_block(&mut engine).is_ok());
        assert_eq!(prng.counter(), None);
        assert_eq!(
            prng.next_block(&mut engine),
            Err(KhazadError::DRIVER_KHAZAD_PRNG_EXHAUSTED)
        );
        assert_eq!(
            prng.next_block(&mut engine),
            Err(KhazadError::DRIVER_KHAZAD_PRNG_EXHAUSTED)
        );

        prng.reseed(DEFAULT_PRNG_NONCE, key);
        assert_eq!(
            prng.next_block(&mut engine).unwrap(),
            Block::from([0xbb37_2d90u32, 0x3358_1991])
        );
    }
}
