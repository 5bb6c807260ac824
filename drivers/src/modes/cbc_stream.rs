/*++

Licensed under the Apache-2.0 license.

File Name:

    cbc_stream.rs

Abstract:

    File contains CBC driven by the accelerator's own chaining register.

--*/

use super::map_blocks;
use crate::{Block, Chain, Direction, IvSource, KeySource, KhazadAccel, ModeSelect};
use khazad_error::KhazadResult;
use ureg::{Mmio, MmioMut};

/// CBC session kept in the accelerator: the first block seeds the chaining
/// register from the IV, later blocks continue it with the key reused.
pub struct CbcStream<'a, TMmio: Mmio + MmioMut> {
    accel: &'a mut KhazadAccel<TMmio>,
    key: KeySource<'a>,
    iv: IvSource<'a>,
    direction: Direction,
    started: bool,
}

impl<'a, TMmio: Mmio + MmioMut> CbcStream<'a, TMmio> {
    /// # Arguments
    ///
    /// * `accel` - Accelerator channel
    /// * `key` - Key for the first block; later blocks reuse it
    /// * `iv` - IV that seeds the chain
    /// * `direction` - Encrypt or decrypt
    pub fn new(
        accel: &'a mut KhazadAccel<TMmio>,
        key: KeySource<'a>,
        iv: IvSource<'a>,
        direction: Direction,
    ) -> Self {
        Self {
            accel,
            key,
            iv,
            direction,
            started: false,
        }
    }

    pub fn process_block(&mut self, block: &Block) -> KhazadResult<Block> {
        let out = if self.started {
            self.accel.submit(
                block,
                KeySource::Reuse,
                ModeSelect::Cbc(Chain::Continuing),
                self.direction,
            )?
        } else {
            self.accel.submit(
                block,
                self.key,
                ModeSelect::Cbc(Chain::Fresh(self.iv)),
                self.direction,
            )?
        };
        self.started = true;
        Ok(out)
    }

    /// Process `buf`, whose length must be a multiple of the block size.
    pub fn process_in_place(&mut self, buf: &mut [u8]) -> KhazadResult<()> {
        map_blocks(buf, |block| self.process_block(block))
    }
}
