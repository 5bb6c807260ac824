/*++

Licensed under the Apache-2.0 license.

File Name:

   input.rs

Abstract:

    File contains parsing of user supplied keys, IVs, messages and
    ciphertexts.

--*/

use anyhow::{bail, Context};
use khazad_drivers::{Block, CipherKey, BLOCK_SIZE};

/// Longest message accepted from the user
pub(crate) const MAX_MESSAGE_LEN: usize = 100;

/// Decode exactly `N` bytes from hex digits, ignoring whitespace so keys
/// can be entered as separate 8-digit words.
fn parse_hex<const N: usize>(s: &str) -> anyhow::Result<[u8; N]> {
    let digits: String = s.split_whitespace().collect();
    let digits = digits.strip_prefix("0x").unwrap_or(&digits);
    if digits.len() != 2 * N {
        bail!("expected {} hex digits, got {}", 2 * N, digits.len());
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out).with_context(|| format!("invalid hex {s:?}"))?;
    Ok(out)
}

pub(crate) fn parse_key(s: &str) -> anyhow::Result<CipherKey> {
    Ok(CipherKey::from(parse_hex::<16>(s)?))
}

pub(crate) fn parse_iv(s: &str) -> anyhow::Result<Block> {
    Ok(Block::from(parse_hex::<8>(s)?))
}

pub(crate) fn parse_nonce(s: &str) -> anyhow::Result<[u8; 4]> {
    parse_hex::<4>(s)
}

/// Ciphertext as hex pairs, a whole number of blocks.
pub(crate) fn parse_ciphertext(s: &str) -> anyhow::Result<Vec<u8>> {
    let digits: String = s.split_whitespace().collect();
    if digits.is_empty() || digits.len() % (2 * BLOCK_SIZE) != 0 {
        bail!(
            "ciphertext must be a non-empty multiple of {} hex digits",
            2 * BLOCK_SIZE
        );
    }
    hex::decode(&digits).with_context(|| format!("invalid hex {s:?}"))
}

/// Message bytes, at most `MAX_MESSAGE_LEN` of them.
pub(crate) fn check_message(msg: &[u8]) -> anyhow::Result<&[u8]> {
    if msg.is_empty() {
        bail!("message is empty");
    }
    if msg.len() > MAX_MESSAGE_LEN {
        bail!(
            "message is {} bytes, at most {MAX_MESSAGE_LEN} are accepted",
            msg.len()
        );
    }
    Ok(msg)
}

/// Render decrypted bytes as characters, escaping what is not printable.
pub(crate) fn printable(bytes: &[u8]) -> String {
    bytes.escape_ascii().to_string()
}

pub(crate) fn key_hex(key: &CipherKey) -> String {
    hex::encode_upper(key.to_bytes())
}

pub(crate) fn block_hex(block: &Block) -> String {
    hex::encode_upper(block.to_bytes())
}
