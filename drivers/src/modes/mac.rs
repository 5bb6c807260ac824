/*++

Licensed under the Apache-2.0 license.

File Name:

    mac.rs

Abstract:

    File contains the CBC-MAC.

--*/

use super::CbcEncryptor;
use crate::{Block, BlockCipherEngine, CipherKey, BLOCK_SIZE};
use khazad_error::{KhazadError, KhazadResult};

/// CBC-MAC of `msg`, zero-padding the last partial block.
///
/// # Arguments
///
/// * `engine` - Block cipher
/// * `key` - MAC key
/// * `iv` - Initial chain value, normally all zero
/// * `msg` - Message, at least one byte
///
/// # Returns
///
/// * `Block` - Final chain value
pub fn cbc_mac<E: BlockCipherEngine>(
    engine: &mut E,
    key: &CipherKey,
    iv: &Block,
    msg: &[u8],
) -> KhazadResult<Block> {
    if msg.is_empty() {
        Err(KhazadError::DRIVER_KHAZAD_MAC_EMPTY_MESSAGE)?
    }
    let mut cbc = CbcEncryptor::new(engine, key, iv)?;
    for chunk in msg.chunks(BLOCK_SIZE) {
        let mut block = [0u8; BLOCK_SIZE];
        block[..chunk.len()].copy_from_slice(chunk);
        cbc.encrypt_block(&Block::from(block))?;
    }
    Ok(cbc.chain())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SoftKhazad;

    fn seq_key() -> CipherKey {
        CipherKey::from([0x0001_0203u32, 0x0405_0607, 0x0809_0a0b, 0x0c0d_0e0f])
    }

    #[test]
    fn test_mac_vector() {
        let mut engine = SoftKhazad::new();
        let mac = cbc_mac(
            &mut engine,
            &seq_key(),
            &Block::default(),
            b"KHAZAD block cipher!",
        )
        .unwrap();
        assert_eq!(mac, Block::from([0xa068_4a26u32, 0x8f6e_e5e7]));
    }

    #[test]
    fn test_mac_is_deterministic_and_sensitive() {
        let mut engine = SoftKhazad::new();
        let key = seq_key();
        let iv = Block::default();
        let msg = *b"the quick brown fox jumps over the lazy dog";
        let mac = cbc_mac(&mut engine, &key, &iv, &msg).unwrap();
        assert_eq!(cbc_mac(&mut engine, &key, &iv, &msg).unwrap(), mac);

        for i in 0..msg.len() {
            let mut tampered = msg;
            tampered[i] ^= 0x01;
            assert_ne!(cbc_mac(&mut engine, &key, &iv, &tampered).unwrap(), mac);
        }
    }

    #[test]
    fn test_mac_iv_changes_tag() {
        let mut engine = SoftKhazad::new();
        let key = seq_key();
        let a = cbc_mac(&mut engine, &key, &Block::default(), b"abc").unwrap();
        let b = cbc_mac(&mut engine, &key, &Block::from([0u32, 1]), b"abc").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_mac_empty_message() {
        let mut engine = SoftKhazad::new();
        assert_eq!(
            cbc_mac(&mut engine, &seq_key(), &Block::default(), b""),
            Err(KhazadError::DRIVER_KHAZAD_MAC_EMPTY_MESSAGE)
        );
    }
}
