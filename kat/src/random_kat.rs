/*++

Licensed under the Apache-2.0 license.

File Name:

    random_kat.rs

Abstract:

    File contains the random vectors test: keys, IVs and messages drawn
    from the CTR generator, run through the reference and the accelerator
    under ECB or native accelerator CBC.

--*/

use crate::report::{Check, CrossReport, HexBlock, Position, Regime};
use khazad_drivers::{
    Block, BlockCipherEngine, CbcDecryptor, CbcEncryptor, CbcStream, CipherKey, CtrPrng,
    Direction, HwKhazad, IvSource, KeySource,
};
use khazad_error::KhazadResult;
use ureg::{Mmio, MmioMut};

/// Blocks in every random message
pub const BLOCKS_PER_MESSAGE: usize = 4;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RandomMode {
    Ecb,
    Cbc,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RandomVectorsConfig {
    /// Number of random keys
    pub keys: u32,

    /// Number of messages under each key
    pub messages: u32,

    pub mode: RandomMode,
}

impl Default for RandomVectorsConfig {
    fn default() -> Self {
        Self {
            keys: 8,
            messages: 8,
            mode: RandomMode::Cbc,
        }
    }
}

type Message = [Block; BLOCKS_PER_MESSAGE];

#[derive(Default, Debug)]
pub struct RandomVectorsKat {
    config: RandomVectorsConfig,
}

impl RandomVectorsKat {
    pub fn new(config: RandomVectorsConfig) -> Self {
        Self { config }
    }

    /// Run the random vectors test.
    ///
    /// Keys, IVs and messages are drawn from `prng`, which continues from
    /// wherever its counter stands; every run sees fresh vectors.
    ///
    /// # Arguments
    ///
    /// * `prng` - Generator shared with the rest of the program
    /// * `prng_engine` - Engine the generator encrypts its counter with;
    ///   keep it apart from `dut` so a faulty accelerator cannot shape its
    ///   own inputs
    /// * `reference` - Engine whose results are taken as correct
    /// * `dut` - Accelerator under test
    /// * `report` - Comparison tally
    pub fn execute<G, R, TMmio>(
        &self,
        prng: &mut CtrPrng,
        prng_engine: &mut G,
        reference: &mut R,
        dut: &mut HwKhazad<TMmio>,
        report: &mut CrossReport,
    ) -> KhazadResult<()>
    where
        G: BlockCipherEngine,
        R: BlockCipherEngine,
        TMmio: Mmio + MmioMut,
    {
        let regime = match self.config.mode {
            RandomMode::Ecb => Regime::RandomEcb,
            RandomMode::Cbc => Regime::RandomCbc,
        };

        for i in 0..self.config.keys {
            let key = prng.next_key(prng_engine)?;
            let iv = match self.config.mode {
                RandomMode::Ecb => None,
                RandomMode::Cbc => Some(prng.next_block(prng_engine)?),
            };
            log::info!(
                "key #{} = {:08X}{:08X}{:08X}{:08X}",
                i + 1,
                key.0[0],
                key.0[1],
                key.0[2],
                key.0[3]
            );
            if let Some(iv) = &iv {
                log::info!("IV #{} = {}", i + 1, HexBlock(iv));
            }

            for j in 0..self.config.messages {
                let mut plain = Message::default();
                for block in plain.iter_mut() {
                    *block = prng.next_block(prng_engine)?;
                }

                let (cipher, decrypted, dut_cipher, dut_decrypted) = match &iv {
                    None => {
                        let cipher = Self::ecb(reference, &key, &plain, Direction::Encrypt)?;
                        let decrypted = Self::ecb(reference, &key, &cipher, Direction::Decrypt)?;
                        let dut_cipher = Self::ecb(dut, &key, &plain, Direction::Encrypt)?;
                        let dut_decrypted = Self::ecb(dut, &key, &dut_cipher, Direction::Decrypt)?;
                        (cipher, decrypted, dut_cipher, dut_decrypted)
                    }
                    Some(iv) => {
                        // The first message of a key writes the IV; later
                        // ones restart the chain from the IV registers.
                        let iv_source = if j == 0 {
                            IvSource::Load(iv)
                        } else {
                            IvSource::Reuse
                        };
                        let cipher =
                            Self::cbc_reference(reference, &key, iv, &plain, Direction::Encrypt)?;
                        let decrypted =
                            Self::cbc_reference(reference, &key, iv, &cipher, Direction::Decrypt)?;
                        let dut_cipher = Self::cbc_dut(
                            dut,
                            KeySource::Load(&key),
                            iv_source,
                            &plain,
                            Direction::Encrypt,
                        )?;
                        let dut_decrypted = Self::cbc_dut(
                            dut,
                            KeySource::Reuse,
                            IvSource::Reuse,
                            &dut_cipher,
                            Direction::Decrypt,
                        )?;
                        (cipher, decrypted, dut_cipher, dut_decrypted)
                    }
                };

                for k in 0..BLOCKS_PER_MESSAGE {
                    let pos = |check| Position {
                        regime,
                        vector: i + 1,
                        message: j + 1,
                        block: k as u32 + 1,
                        check,
                    };
                    report.check(pos(Check::ReferenceRoundTrip), &plain[k], &decrypted[k]);
                    report.check(pos(Check::Decrypt), &plain[k], &dut_decrypted[k]);
                    report.check(pos(Check::Encrypt), &cipher[k], &dut_cipher[k]);
                }
            }
        }

        log::info!(
            "Number of data blocks tested: {}",
            u64::from(self.config.keys) * u64::from(self.config.messages) * BLOCKS_PER_MESSAGE as u64
        );
        Ok(())
    }

    fn ecb<E: BlockCipherEngine>(
        engine: &mut E,
        key: &CipherKey,
        msg: &Message,
        direction: Direction,
    ) -> KhazadResult<Message> {
        engine.load_key(key)?;
        let mut out = Message::default();
        for (o, block) in out.iter_mut().zip(msg) {
            *o = match direction {
                Direction::Encrypt => engine.encrypt_block(block)?,
                Direction::Decrypt => engine.decrypt_block(block)?,
            };
        }
        Ok(out)
    }

    fn cbc_reference<E: BlockCipherEngine>(
        engine: &mut E,
        key: &CipherKey,
        iv: &Block,
        msg: &Message,
        direction: Direction,
    ) -> KhazadResult<Message> {
        let mut out = Message::default();
        match direction {
            Direction::Encrypt => {
                let mut cbc = CbcEncryptor::new(engine, key, iv)?;
                for (o, block) in out.iter_mut().zip(msg) {
                    *o = cbc.encrypt_block(block)?;
                }
            }
            Direction::Decrypt => {
                let mut cbc = CbcDecryptor::new(engine, key, iv)?;
                for (o, block) in out.iter_mut().zip(msg) {
                    *o = cbc.decrypt_block(block)?;
                }
            }
        }
        Ok(out)
    }

    fn cbc_dut<TMmio: Mmio + MmioMut>(
        dut: &mut HwKhazad<TMmio>,
        key: KeySource,
        iv: IvSource,
        msg: &Message,
        direction: Direction,
    ) -> KhazadResult<Message> {
        let mut stream = CbcStream::new(dut.accel_mut(), key, iv, direction);
        let mut out = Message::default();
        for (o, block) in out.iter_mut().zip(msg) {
            *o = stream.process_block(block)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{board, hw_engine};
    use khazad_drivers::{SoftKhazad, DEFAULT_PRNG_NONCE};

    fn small(mode: RandomMode) -> RandomVectorsConfig {
        RandomVectorsConfig {
            keys: 3,
            messages: 3,
            mode,
        }
    }

    fn seeded() -> CtrPrng {
        CtrPrng::new(DEFAULT_PRNG_NONCE, CipherKey::default())
    }

    #[test]
    fn test_random_ecb() {
        let mmio = board();
        let mut dut = hw_engine(&mmio);
        let mut report = CrossReport::new();
        RandomVectorsKat::new(small(RandomMode::Ecb))
            .execute(
                &mut seeded(),
                &mut SoftKhazad::new(),
                &mut SoftKhazad::new(),
                &mut dut,
                &mut report,
            )
            .unwrap();
        assert_eq!(report.checks(), 3 * 3 * 4 * 3);
        assert_eq!(report.result(), Ok(()));
    }

    #[test]
    fn test_random_cbc() {
        let mmio = board();
        let mut dut = hw_engine(&mmio);
        let mut report = CrossReport::new();
        RandomVectorsKat::new(small(RandomMode::Cbc))
            .execute(
                &mut seeded(),
                &mut SoftKhazad::new(),
                &mut SoftKhazad::new(),
                &mut dut,
                &mut report,
            )
            .unwrap();
        assert_eq!(report.checks(), 3 * 3 * 4 * 3);
        assert_eq!(report.result(), Ok(()));
    }

    #[test]
    fn test_generator_counter_carries_over() {
        let mmio = board();
        let mut dut = hw_engine(&mmio);
        let mut report = CrossReport::new();
        let mut prng = seeded();
        let mut prng_engine = SoftKhazad::new();

        // CBC: per key 2 + 1 blocks of key and IV, then 4 per message.
        RandomVectorsKat::new(small(RandomMode::Cbc))
            .execute(
                &mut prng,
                &mut prng_engine,
                &mut SoftKhazad::new(),
                &mut dut,
                &mut report,
            )
            .unwrap();
        assert_eq!(prng.counter(), Some(3 * (3 + 3 * 4)));

        RandomVectorsKat::new(small(RandomMode::Ecb))
            .execute(
                &mut prng,
                &mut prng_engine,
                &mut SoftKhazad::new(),
                &mut dut,
                &mut report,
            )
            .unwrap();
        assert_eq!(prng.counter(), Some(3 * (3 + 3 * 4) + 3 * (2 + 3 * 4)));
        assert!(report.is_clean());
    }

    #[test]
    fn test_operator_reset_aborts_run() {
        let mmio = board();
        let mut dut = hw_engine(&mmio);
        let mut report = CrossReport::new();
        dut.load_key(&CipherKey::default()).unwrap();
        dut.encrypt_block(&Block::default()).unwrap();

        // The acknowledge bit drops back to zero while the channel
        // expects one.
        mmio.with_bus(|bus| bus.press_reset_button());
        assert_eq!(
            RandomVectorsKat::new(small(RandomMode::Cbc)).execute(
                &mut seeded(),
                &mut SoftKhazad::new(),
                &mut SoftKhazad::new(),
                &mut dut,
                &mut report
            ),
            Err(khazad_error::KhazadError::DRIVER_KHAZAD_HANDSHAKE_DESYNC)
        );
    }
}
