/*++

Licensed under the Apache-2.0 license.

File Name:

   session.rs

Abstract:

    File contains the emulated board together with the software reference,
    and the operations the command line and the menu run on them.

--*/

use crate::cli::ArgsEngine;
use crate::config::EmuConfig;
use anyhow::Context;
use khazad_drivers::{
    cbc_mac, padded_len, Block, BlockCipherEngine, CbcDecryptor, CbcEncryptor, CbcStream,
    CipherKey, CtrPrng, Direction, Ecb, Envelope, HwKhazad, IvSource, KeySource, KhazadAccel,
    KhazadRegs, SoftKhazad, BLOCK_SIZE,
};
use khazad_emu_bus::BusMmio;
use khazad_emu_periph::KhazadRootBus;
use khazad_kat::{
    CrossReport, FixedVectorsKat, KhazadKat, RandomMode, RandomVectorsConfig, RandomVectorsKat,
};

pub(crate) type HwEngine = HwKhazad<BusMmio<KhazadRootBus>>;

/// Mode of operation of a message
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Mode {
    Ecb,

    /// CBC from this IV
    Cbc(Block),
}

/// A sealed message: zero-padded ciphertext and the plaintext length.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct Sealed {
    pub blocks: Vec<u8>,
    pub msg_len: usize,
}

/// One block of the ECB demonstration
#[derive(Debug, Copy, Clone)]
pub(crate) struct DemoBlock {
    pub plain: Block,
    pub sw_cipher: Block,
    pub sw_decrypted: Block,
    pub hw_cipher: Block,
    pub hw_decrypted: Block,
}

pub(crate) struct Session {
    config: EmuConfig,
    hw: HwEngine,
    sw: SoftKhazad,
    prng: CtrPrng,
}

impl Session {
    pub fn new(config: EmuConfig) -> anyhow::Result<Self> {
        let args = config.accel.bus_args();
        let base = args.accel_base as usize;
        let mmio = BusMmio::new(KhazadRootBus::new(args));
        // SAFETY: BusMmio only uses the pointer as a bus address.
        let regs = unsafe { KhazadRegs::new(base as *mut u32, mmio) };
        let hw = HwKhazad::new(KhazadAccel::new(regs, config.accel.wait_policy()));
        let prng = CtrPrng::new(config.prng.nonce()?, config.prng.key()?);
        Ok(Self {
            config,
            hw,
            sw: SoftKhazad::new(),
            prng,
        })
    }

    pub fn config(&self) -> &EmuConfig {
        &self.config
    }

    pub fn hw(&mut self) -> &mut HwEngine {
        &mut self.hw
    }

    pub fn sw(&mut self) -> &mut SoftKhazad {
        &mut self.sw
    }

    /// Emulated clock cycles since power-on.
    pub fn cycles(&self) -> u64 {
        self.hw
            .accel()
            .regs()
            .mmio()
            .with_bus(|bus| bus.clock.now())
    }

    /// Operator reset push button.
    #[cfg(test)]
    pub fn press_reset_button(&self) {
        self.hw
            .accel()
            .regs()
            .mmio()
            .with_bus(|bus| bus.press_reset_button());
    }

    /// Reset the channel if the last operation left it out of step with
    /// the accelerator.
    pub fn recover(&mut self) {
        if !self.hw.accel().is_synchronized() {
            log::warn!("Accelerator out of step; resetting the channel");
            self.hw.accel_mut().reset();
        }
    }

    /// Pad and encrypt `msg`.
    pub fn encrypt(
        &mut self,
        engine: ArgsEngine,
        mode: Mode,
        key: &CipherKey,
        msg: &[u8],
    ) -> anyhow::Result<Sealed> {
        let mut blocks = vec![0u8; padded_len(msg.len())];
        let mut env = Envelope::seal(msg, &mut blocks)?;
        let msg_len = env.msg_len();
        self.crypt(engine, mode, key, env.blocks_mut(), Direction::Encrypt)?;
        Ok(Sealed { blocks, msg_len })
    }

    /// Decrypt `blocks`. With `msg_len` the padding is checked and removed;
    /// without it the zero padding stays, since a message may itself end in
    /// NUL bytes.
    pub fn decrypt(
        &mut self,
        engine: ArgsEngine,
        mode: Mode,
        key: &CipherKey,
        mut blocks: Vec<u8>,
        msg_len: Option<usize>,
    ) -> anyhow::Result<Vec<u8>> {
        self.crypt(engine, mode, key, &mut blocks, Direction::Decrypt)?;
        match msg_len {
            Some(len) => {
                let msg = Envelope::wrap(len, &mut blocks)
                    .context("Message length does not match the ciphertext")?
                    .open()?;
                Ok(msg.to_vec())
            }
            None => Ok(blocks),
        }
    }

    fn crypt(
        &mut self,
        engine: ArgsEngine,
        mode: Mode,
        key: &CipherKey,
        buf: &mut [u8],
        direction: Direction,
    ) -> anyhow::Result<()> {
        let result = match (engine, mode) {
            (ArgsEngine::Sw, mode) => Self::crypt_with(&mut self.sw, mode, key, buf, direction),
            (ArgsEngine::Hw, Mode::Ecb) => {
                Self::crypt_with(&mut self.hw, mode, key, buf, direction)
            }
            // The accelerator chains natively; only the first block carries
            // the key and the IV.
            (ArgsEngine::Hw, Mode::Cbc(iv)) => CbcStream::new(
                self.hw.accel_mut(),
                KeySource::Load(key),
                IvSource::Load(&iv),
                direction,
            )
            .process_in_place(buf),
        };
        if result.is_err() {
            self.recover();
        }
        Ok(result?)
    }

    fn crypt_with<E: BlockCipherEngine>(
        engine: &mut E,
        mode: Mode,
        key: &CipherKey,
        buf: &mut [u8],
        direction: Direction,
    ) -> khazad_error::KhazadResult<()> {
        match (mode, direction) {
            (Mode::Ecb, Direction::Encrypt) => Ecb::new(engine, key)?.encrypt_in_place(buf),
            (Mode::Ecb, Direction::Decrypt) => Ecb::new(engine, key)?.decrypt_in_place(buf),
            (Mode::Cbc(iv), Direction::Encrypt) => {
                CbcEncryptor::new(engine, key, &iv)?.encrypt_in_place(buf)
            }
            (Mode::Cbc(iv), Direction::Decrypt) => {
                CbcDecryptor::new(engine, key, &iv)?.decrypt_in_place(buf)
            }
        }
    }

    /// Encrypt and decrypt `msg` block by block on both paths.
    pub fn demonstration(&mut self, key: &CipherKey, msg: &[u8]) -> anyhow::Result<Vec<DemoBlock>> {
        let mut padded = vec![0u8; padded_len(msg.len())];
        Envelope::seal(msg, &mut padded)?;

        self.sw.load_key(key)?;
        self.hw.load_key(key)?;
        let mut out = Vec::with_capacity(padded.len() / BLOCK_SIZE);
        for chunk in padded.chunks_exact(BLOCK_SIZE) {
            let plain = Block::from_slice(chunk).context("Block split")?;
            let sw_cipher = self.sw.encrypt_block(&plain)?;
            let sw_decrypted = self.sw.decrypt_block(&sw_cipher)?;
            let hw_cipher = self.hw.encrypt_block(&plain)?;
            let hw_decrypted = self.hw.decrypt_block(&hw_cipher)?;
            out.push(DemoBlock {
                plain,
                sw_cipher,
                sw_decrypted,
                hw_cipher,
                hw_decrypted,
            });
        }
        Ok(out)
    }

    /// Known answer tests on both engines, then the fixed vector sets.
    pub fn kat(&mut self, full: bool) -> anyhow::Result<CrossReport> {
        KhazadKat::default()
            .execute(&mut self.sw)
            .context("Reference known answer test failed")?;
        KhazadKat::default()
            .execute(&mut self.hw)
            .context("Accelerator known answer test failed")?;
        log::info!("Known answer tests passed");

        let mut report = CrossReport::new();
        let fixed = self.config.harness.fixed_vectors(full);
        let result = FixedVectorsKat::new(fixed).execute(&mut self.sw, &mut self.hw, &mut report);
        if result.is_err() {
            self.recover();
        }
        result?;
        report.log_summary("Test vectors");
        Ok(report)
    }

    /// Random vectors test under one mode, or both when `mode` is `None`.
    /// The vectors come from the session generator, so no two runs and no
    /// later `prng_next` see the same counter values.
    pub fn random(
        &mut self,
        keys: u32,
        messages: u32,
        mode: Option<RandomMode>,
    ) -> anyhow::Result<CrossReport> {
        let modes = match mode {
            Some(mode) => vec![mode],
            None => vec![RandomMode::Ecb, RandomMode::Cbc],
        };
        // The generator encrypts on its own software engine here so the
        // accelerator under test never produces its own inputs.
        let mut prng_engine = SoftKhazad::new();
        let mut total = CrossReport::new();
        for mode in modes {
            let config = RandomVectorsConfig {
                keys,
                messages,
                mode,
            };
            let mut report = CrossReport::new();
            let result = RandomVectorsKat::new(config).execute(
                &mut self.prng,
                &mut prng_engine,
                &mut self.sw,
                &mut self.hw,
                &mut report,
            );
            if result.is_err() {
                self.recover();
            }
            result?;
            report.log_summary(match mode {
                RandomMode::Ecb => "Random vectors (ECB)",
                RandomMode::Cbc => "Random vectors (CBC)",
            });
            total.merge(&report);
        }
        Ok(total)
    }

    /// CBC-MAC of `msg` on the accelerator.
    pub fn mac(&mut self, key: &CipherKey, iv: &Block, msg: &[u8]) -> anyhow::Result<Block> {
        let result = cbc_mac(&mut self.hw, key, iv, msg);
        if result.is_err() {
            self.recover();
        }
        Ok(result?)
    }

    /// Next generator block, computed on the accelerator.
    pub fn prng_next(&mut self) -> anyhow::Result<Block> {
        let result = self.prng.next_block(&mut self.hw);
        if result.is_err() {
            self.recover();
        }
        Ok(result?)
    }
}
