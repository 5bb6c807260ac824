/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains the modes of operation built on `BlockCipherEngine`.

--*/

mod cbc;
mod cbc_stream;
mod ecb;
mod mac;
mod padding;

pub use self::cbc::{CbcDecryptor, CbcEncryptor};
pub use self::cbc_stream::CbcStream;
pub use ecb::Ecb;
pub use mac::cbc_mac;
pub use padding::{padded_len, Envelope};

use crate::{Block, BLOCK_SIZE};
use khazad_error::{KhazadError, KhazadResult};

/// Replace every block of `buf` with `f(block)`.
pub(crate) fn map_blocks<F>(buf: &mut [u8], mut f: F) -> KhazadResult<()>
where
    F: FnMut(&Block) -> KhazadResult<Block>,
{
    if buf.len() % BLOCK_SIZE != 0 {
        Err(KhazadError::DRIVER_KHAZAD_INVALID_SLICE)?
    }
    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        let block = Block::from_slice(chunk).ok_or(KhazadError::DRIVER_KHAZAD_INVALID_SLICE)?;
        chunk.copy_from_slice(&f(&block)?.to_bytes());
    }
    Ok(())
}
