/*++

Licensed under the Apache-2.0 license.

File Name:

    engine.rs

Abstract:

    File contains the block cipher capability shared by the software
    reference and the accelerator, so every mode of operation runs on
    either.

--*/

use crate::{Block, CipherKey, Direction, KeySource, KhazadAccel, ModeSelect};
use khazad_crypto::Khazad;
use khazad_error::{KhazadError, KhazadResult};
use ureg::{Mmio, MmioMut};

/// A keyed 64-bit block cipher.
pub trait BlockCipherEngine {
    /// Key every following block operation with `key`.
    fn load_key(&mut self, key: &CipherKey) -> KhazadResult<()>;

    fn encrypt_block(&mut self, block: &Block) -> KhazadResult<Block>;

    fn decrypt_block(&mut self, block: &Block) -> KhazadResult<Block>;
}

/// Software reference realization
#[derive(Default)]
pub struct SoftKhazad {
    cipher: Option<Khazad>,
}

impl SoftKhazad {
    pub fn new() -> Self {
        Self::default()
    }

    fn cipher(&self) -> KhazadResult<&Khazad> {
        self.cipher
            .as_ref()
            .ok_or(KhazadError::DRIVER_KHAZAD_NO_KEY)
    }
}

impl BlockCipherEngine for SoftKhazad {
    fn load_key(&mut self, key: &CipherKey) -> KhazadResult<()> {
        self.cipher = Some(Khazad::new_from_bytes(&key.to_bytes()));
        Ok(())
    }

    fn encrypt_block(&mut self, block: &Block) -> KhazadResult<Block> {
        Ok(self.cipher()?.encrypt_bytes(&block.to_bytes()).into())
    }

    fn decrypt_block(&mut self, block: &Block) -> KhazadResult<Block> {
        Ok(self.cipher()?.decrypt_bytes(&block.to_bytes()).into())
    }
}

/// Accelerator realization. The key registers are only rewritten when the
/// requested key differs from the one the accelerator already holds.
pub struct HwKhazad<TMmio: Mmio + MmioMut> {
    accel: KhazadAccel<TMmio>,
    key: Option<CipherKey>,
    key_changed: bool,
}

impl<TMmio: Mmio + MmioMut> HwKhazad<TMmio> {
    pub fn new(accel: KhazadAccel<TMmio>) -> Self {
        Self {
            accel,
            key: None,
            key_changed: false,
        }
    }

    pub fn accel(&self) -> &KhazadAccel<TMmio> {
        &self.accel
    }

    /// Direct access to the channel, e.g. for native CBC. The next block
    /// operation reloads the key since the caller may have replaced it.
    pub fn accel_mut(&mut self) -> &mut KhazadAccel<TMmio> {
        self.key_changed = true;
        &mut self.accel
    }

    pub fn into_inner(self) -> KhazadAccel<TMmio> {
        self.accel
    }

    fn crypt(&mut self, block: &Block, direction: Direction) -> KhazadResult<Block> {
        let Some(key) = self.key else {
            return Err(KhazadError::DRIVER_KHAZAD_NO_KEY);
        };
        // The channel may have been reset or used with another key since.
        let source = if self.key_changed || !self.accel.holds_key() {
            KeySource::Load(&key)
        } else {
            KeySource::Reuse
        };
        let out = self
            .accel
            .submit(block, source, ModeSelect::Ecb, direction)?;
        self.key_changed = false;
        Ok(out)
    }
}

impl<TMmio: Mmio + MmioMut> BlockCipherEngine for HwKhazad<TMmio> {
    fn load_key(&mut self, key: &CipherKey) -> KhazadResult<()> {
        if self.key.as_ref() != Some(key) {
            self.key = Some(*key);
            self.key_changed = true;
        }
        Ok(())
    }

    fn encrypt_block(&mut self, block: &Block) -> KhazadResult<Block> {
        self.crypt(block, Direction::Encrypt)
    }

    fn decrypt_block(&mut self, block: &Block) -> KhazadResult<Block> {
        self.crypt(block, Direction::Decrypt)
    }
}
