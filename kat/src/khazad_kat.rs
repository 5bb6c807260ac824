/*++

Licensed under the Apache-2.0 license.

File Name:

    khazad_kat.rs

Abstract:

    File contains the Known Answer Tests (KAT) for KHAZAD block cipher
    operations.

--*/

use crate::vector_sets_kat::fixed_key_chain;
use khazad_drivers::{
    cbc_mac, Block, BlockCipherEngine, CbcDecryptor, CbcEncryptor, CipherKey, CtrPrng,
    DEFAULT_PRNG_NONCE,
};
use khazad_error::{KhazadError, KhazadResult};

// NESSIE set 3, vector 0
const ZERO_CT: Block = Block::new([0x2325_d00f, 0x3e76_a22d]);
const ZERO_CT_100: Block = Block::new([0x4956_61da, 0xed40_3f46]);
const ZERO_CT_1000: Block = Block::new([0xf3bf_aa4c, 0xee29_2ded]);

// NESSIE set 1, vector 0
const BIT_KEY: CipherKey = CipherKey::new([0x8000_0000, 0, 0, 0]);
const BIT_KEY_CT: Block = Block::new([0x49a4_ce32, 0xac19_0e3f]);

const SEQ_KEY: CipherKey = CipherKey::new([0x0001_0203, 0x0405_0607, 0x0809_0a0b, 0x0c0d_0e0f]);
const SEQ_IV: Block = Block::new([0x0001_0203, 0x0405_0607]);

// "KHAZAD block cipher!" zero-padded to three blocks
const MSG: [u8; 24] = *b"KHAZAD block cipher!\0\0\0\0";
const CBC_CT: [u8; 24] = [
    0x36, 0xbb, 0x41, 0x04, 0xfc, 0x3a, 0xa1, 0x47, 0x6d, 0x6d, 0xca, 0x34, 0xae, 0xfe, 0xb2, 0xad,
    0xd7, 0x2d, 0x0a, 0x06, 0x5e, 0xdd, 0x31, 0xe7,
];
const MAC: Block = Block::new([0xa068_4a26, 0x8f6e_e5e7]);

// CTR generator with the default nonce and an all-zero key
const PRNG_OUT: [Block; 3] = [
    Block::new([0xbb37_2d90, 0x3358_1991]),
    Block::new([0x275e_d8be, 0x9cfa_395d]),
    Block::new([0xa828_a593, 0x124a_8de5]),
];

#[derive(Default, Debug)]
pub struct KhazadKat {}

impl KhazadKat {
    /// This function executes the Known Answer Tests (aka KAT) for KHAZAD.
    ///
    /// Test vector source:
    /// NESSIE test vectors for the tweaked KHAZAD
    ///
    /// # Arguments
    ///
    /// * `engine` - Block cipher engine
    ///
    /// # Returns
    ///
    /// * `KhazadResult` - Result denoting the KAT outcome.
    pub fn execute<E: BlockCipherEngine>(&self, engine: &mut E) -> KhazadResult<()> {
        self.kat_zero_vector(engine)?;
        self.kat_single_bit_key(engine)?;
        self.kat_iterated(engine)?;
        self.kat_cbc(engine)?;
        self.kat_mac(engine)?;
        self.kat_prng(engine)?;
        Ok(())
    }

    fn kat_zero_vector<E: BlockCipherEngine>(&self, engine: &mut E) -> KhazadResult<()> {
        engine.load_key(&CipherKey::default())?;
        if engine.encrypt_block(&Block::default())? != ZERO_CT {
            Err(KhazadError::KAT_KHAZAD_CIPHERTEXT_MISMATCH)?;
        }
        if engine.decrypt_block(&ZERO_CT)? != Block::default() {
            Err(KhazadError::KAT_KHAZAD_PLAINTEXT_MISMATCH)?;
        }
        Ok(())
    }

    fn kat_single_bit_key<E: BlockCipherEngine>(&self, engine: &mut E) -> KhazadResult<()> {
        engine.load_key(&BIT_KEY)?;
        if engine.encrypt_block(&Block::default())? != BIT_KEY_CT {
            Err(KhazadError::KAT_KHAZAD_CIPHERTEXT_MISMATCH)?;
        }
        if engine.decrypt_block(&BIT_KEY_CT)? != Block::default() {
            Err(KhazadError::KAT_KHAZAD_PLAINTEXT_MISMATCH)?;
        }
        Ok(())
    }

    fn kat_iterated<E: BlockCipherEngine>(&self, engine: &mut E) -> KhazadResult<()> {
        let key = CipherKey::default();
        let x100 = fixed_key_chain(engine, &key, &Block::default(), 100)?;
        if x100 != ZERO_CT_100 {
            Err(KhazadError::KAT_KHAZAD_CIPHERTEXT_MISMATCH)?;
        }
        if fixed_key_chain(engine, &key, &x100, 900)? != ZERO_CT_1000 {
            Err(KhazadError::KAT_KHAZAD_CIPHERTEXT_MISMATCH)?;
        }
        Ok(())
    }

    fn kat_cbc<E: BlockCipherEngine>(&self, engine: &mut E) -> KhazadResult<()> {
        let mut buf = MSG;
        CbcEncryptor::new(engine, &SEQ_KEY, &SEQ_IV)?.encrypt_in_place(&mut buf)?;
        if buf != CBC_CT {
            Err(KhazadError::KAT_KHAZAD_CBC_MISMATCH)?;
        }
        CbcDecryptor::new(engine, &SEQ_KEY, &SEQ_IV)?.decrypt_in_place(&mut buf)?;
        if buf != MSG {
            Err(KhazadError::KAT_KHAZAD_CBC_MISMATCH)?;
        }
        Ok(())
    }

    fn kat_mac<E: BlockCipherEngine>(&self, engine: &mut E) -> KhazadResult<()> {
        if cbc_mac(engine, &SEQ_KEY, &Block::default(), &MSG[..20])? != MAC {
            Err(KhazadError::KAT_KHAZAD_MAC_MISMATCH)?;
        }
        Ok(())
    }

    fn kat_prng<E: BlockCipherEngine>(&self, engine: &mut E) -> KhazadResult<()> {
        let mut prng = CtrPrng::new(DEFAULT_PRNG_NONCE, CipherKey::default());
        for expected in PRNG_OUT {
            if prng.next_block(engine)? != expected {
                Err(KhazadError::KAT_KHAZAD_PRNG_MISMATCH)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{board, hw_engine, Corrupting};
    use khazad_drivers::SoftKhazad;

    #[test]
    fn test_reference_passes() {
        assert_eq!(KhazadKat::default().execute(&mut SoftKhazad::new()), Ok(()));
    }

    #[test]
    fn test_accelerator_passes() {
        let mmio = board();
        assert_eq!(KhazadKat::default().execute(&mut hw_engine(&mmio)), Ok(()));
    }

    #[test]
    fn test_faulty_engine_fails() {
        let mut engine = Corrupting::new(SoftKhazad::new(), 1);
        assert_eq!(
            KhazadKat::default().execute(&mut engine),
            Err(KhazadError::KAT_KHAZAD_CIPHERTEXT_MISMATCH)
        );
    }
}
