/*++

Licensed under the Apache-2.0 license.

File Name:

    padding.rs

Abstract:

    File contains zero padding with an explicit message length, so a
    message ending in NUL bytes survives the round trip.

--*/

use crate::BLOCK_SIZE;
use khazad_error::{KhazadError, KhazadResult};

/// Length of `len` bytes rounded up to whole blocks.
pub const fn padded_len(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}

/// Zero-padded blocks together with the length of the message they carry.
#[derive(Debug)]
pub struct Envelope<'a> {
    msg_len: usize,
    blocks: &'a mut [u8],
}

impl<'a> Envelope<'a> {
    /// Copy `msg` into `buf` and zero-pad it to whole blocks.
    ///
    /// # Error
    ///
    /// * `DRIVER_KHAZAD_INVALID_SLICE` - `buf` cannot hold the padded message
    pub fn seal(msg: &[u8], buf: &'a mut [u8]) -> KhazadResult<Self> {
        let padded = padded_len(msg.len());
        let Some(blocks) = buf.get_mut(..padded) else {
            return Err(KhazadError::DRIVER_KHAZAD_INVALID_SLICE);
        };
        blocks[..msg.len()].copy_from_slice(msg);
        blocks[msg.len()..].fill(0);
        Ok(Self {
            msg_len: msg.len(),
            blocks,
        })
    }

    /// Pair received blocks with the message length sent alongside them.
    ///
    /// # Error
    ///
    /// * `DRIVER_KHAZAD_ENVELOPE_MISMATCH` - `msg_len` does not pad to
    ///   exactly `blocks.len()`
    pub fn wrap(msg_len: usize, blocks: &'a mut [u8]) -> KhazadResult<Self> {
        if padded_len(msg_len) != blocks.len() {
            Err(KhazadError::DRIVER_KHAZAD_ENVELOPE_MISMATCH)?
        }
        Ok(Self { msg_len, blocks })
    }

    pub fn msg_len(&self) -> usize {
        self.msg_len
    }

    pub fn blocks(&self) -> &[u8] {
        &*self.blocks
    }

    /// Blocks to encrypt or decrypt in place.
    pub fn blocks_mut(&mut self) -> &mut [u8] {
        &mut *self.blocks
    }

    /// Strip the padding and return the message.
    ///
    /// # Error
    ///
    /// * `DRIVER_KHAZAD_PADDING_MISMATCH` - a stripped byte is not zero
    pub fn open(self) -> KhazadResult<&'a [u8]> {
        let blocks: &'a [u8] = self.blocks;
        let (msg, pad) = blocks.split_at(self.msg_len);
        if pad.iter().any(|b| *b != 0) {
            Err(KhazadError::DRIVER_KHAZAD_PADDING_MISMATCH)?
        }
        Ok(msg)
    }
}
