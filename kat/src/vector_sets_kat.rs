/*++

Licensed under the Apache-2.0 license.

File Name:

    vector_sets_kat.rs

Abstract:

    File contains the structured vector sets (NESSIE sets 1 to 3 and the
    long feedback set 4) run on the reference and the accelerator side by
    side.

--*/

use crate::report::{Check, CrossReport, HexBlock, Position, Regime};
use khazad_drivers::{Block, BlockCipherEngine, CipherKey, BLOCK_SIZE};
use khazad_error::KhazadResult;

/// Set 4 length of the short run
pub const SHORT_SET4_ITERATIONS: u32 = 1_000_000;

/// Set 4 length of the full run
pub const FULL_SET4_ITERATIONS: u32 = 100_000_000;

const KEY_BITS: u32 = 128;
const BLOCK_BITS: u32 = 64;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FixedVectorsConfig {
    /// Number of vectors run from each of sets 1 to 4
    pub vector_limit: u32,

    /// Encryption counts at which the iterated chains are compared
    pub checkpoints: [u32; 2],

    /// Length of the set 4 feedback chains
    pub set4_iterations: u32,
}

impl FixedVectorsConfig {
    pub const fn short() -> Self {
        Self {
            vector_limit: u32::MAX,
            checkpoints: [100, 1000],
            set4_iterations: SHORT_SET4_ITERATIONS,
        }
    }

    pub const fn full() -> Self {
        Self {
            set4_iterations: FULL_SET4_ITERATIONS,
            ..Self::short()
        }
    }
}

impl Default for FixedVectorsConfig {
    fn default() -> Self {
        Self::short()
    }
}

/// Encrypt `block` `iterations` times under `key`.
pub fn fixed_key_chain<E: BlockCipherEngine>(
    engine: &mut E,
    key: &CipherKey,
    block: &Block,
    iterations: u32,
) -> KhazadResult<Block> {
    engine.load_key(key)?;
    let mut block = *block;
    for _ in 0..iterations {
        block = engine.encrypt_block(&block)?;
    }
    Ok(block)
}

/// Key made of sixteen copies of the last byte of `block`.
pub(crate) fn feedback_key(block: &Block) -> CipherKey {
    CipherKey::from([block.to_bytes()[BLOCK_SIZE - 1]; 16])
}

/// Encrypt `block` `iterations` times; the first encryption uses `key`,
/// each later one the feedback key of the previous ciphertext.
pub fn feedback_chain<E: BlockCipherEngine>(
    engine: &mut E,
    key: &CipherKey,
    block: &Block,
    iterations: u32,
) -> KhazadResult<Block> {
    let mut key = *key;
    let mut block = *block;
    for _ in 0..iterations {
        engine.load_key(&key)?;
        block = engine.encrypt_block(&block)?;
        key = feedback_key(&block);
    }
    Ok(block)
}

#[derive(Default, Debug)]
pub struct FixedVectorsKat {
    config: FixedVectorsConfig,
}

impl FixedVectorsKat {
    pub fn new(config: FixedVectorsConfig) -> Self {
        Self { config }
    }

    /// Run sets 1 to 4 on `reference` and `dut`, recording every comparison
    /// in `report`.
    ///
    /// # Arguments
    ///
    /// * `reference` - Engine whose results are taken as correct
    /// * `dut` - Engine under test
    /// * `report` - Comparison tally
    ///
    /// # Returns
    ///
    /// * `KhazadResult` - Engine failures only; mismatches go to `report`
    pub fn execute<R, D>(
        &self,
        reference: &mut R,
        dut: &mut D,
        report: &mut CrossReport,
    ) -> KhazadResult<()>
    where
        R: BlockCipherEngine,
        D: BlockCipherEngine,
    {
        log::info!("Test vectors -- set 1");
        for v in 0..KEY_BITS.min(self.config.vector_limit) {
            let mut key = [0u8; 16];
            key[(v >> 3) as usize] = 0x80 >> (v & 7);
            self.vector(
                reference,
                dut,
                report,
                (1, v),
                &CipherKey::from(key),
                &Block::default(),
            )?;
        }

        log::info!("Test vectors -- set 2");
        for v in 0..BLOCK_BITS.min(self.config.vector_limit) {
            let mut block = [0u8; BLOCK_SIZE];
            block[(v >> 3) as usize] = 0x80 >> (v & 7);
            self.vector(
                reference,
                dut,
                report,
                (2, v),
                &CipherKey::default(),
                &Block::from(block),
            )?;
        }

        log::info!("Test vectors -- set 3");
        for v in 0..256u32.min(self.config.vector_limit) {
            let b = v as u8;
            self.vector(
                reference,
                dut,
                report,
                (3, v),
                &CipherKey::from([b; 16]),
                &Block::from([b; BLOCK_SIZE]),
            )?;
        }

        log::info!("Test vectors -- set 4");
        for v in 0..4u32.min(self.config.vector_limit) {
            let b = v as u8;
            let key = CipherKey::from([b; 16]);
            let block = Block::from([b; BLOCK_SIZE]);
            let n = self.config.set4_iterations;
            let expected = feedback_chain(reference, &key, &block, n)?;
            let actual = feedback_chain(dut, &key, &block, n)?;
            log::info!("Set 4, vector#{v}: iterated {n} times {}", HexBlock(&expected));
            report.check(
                Position::vector(Regime::Set(4), v, Check::Feedback(n)),
                &expected,
                &actual,
            );
        }
        Ok(())
    }

    fn vector<R, D>(
        &self,
        reference: &mut R,
        dut: &mut D,
        report: &mut CrossReport,
        (set, v): (u8, u32),
        key: &CipherKey,
        plain: &Block,
    ) -> KhazadResult<()>
    where
        R: BlockCipherEngine,
        D: BlockCipherEngine,
    {
        let pos = |check| Position::vector(Regime::Set(set), v, check);

        reference.load_key(key)?;
        let cipher = reference.encrypt_block(plain)?;
        let decrypted = reference.decrypt_block(&cipher)?;
        log::debug!(
            "Set {set}, vector#{v}: plain {} cipher {}",
            HexBlock(plain),
            HexBlock(&cipher)
        );
        report.check(pos(Check::ReferenceRoundTrip), plain, &decrypted);

        dut.load_key(key)?;
        let dut_cipher = dut.encrypt_block(plain)?;
        let dut_decrypted = dut.decrypt_block(&dut_cipher)?;
        report.check(pos(Check::Encrypt), &cipher, &dut_cipher);
        report.check(pos(Check::Decrypt), plain, &dut_decrypted);

        // Both chains continue from their own first ciphertext.
        let mut expected = cipher;
        let mut actual = dut_cipher;
        let mut done = 1;
        for n in self.config.checkpoints {
            let steps = n.saturating_sub(done);
            expected = fixed_key_chain(reference, key, &expected, steps)?;
            actual = fixed_key_chain(dut, key, &actual, steps)?;
            done = done.max(n);
            report.check(pos(Check::FixedKey(n)), &expected, &actual);
        }

        let mut expected = *plain;
        let mut actual = *plain;
        let mut expected_key = *key;
        let mut actual_key = *key;
        let mut done = 0;
        for n in self.config.checkpoints {
            let steps = n.saturating_sub(done);
            expected = feedback_chain(reference, &expected_key, &expected, steps)?;
            actual = feedback_chain(dut, &actual_key, &actual, steps)?;
            if steps > 0 {
                expected_key = feedback_key(&expected);
                actual_key = feedback_key(&actual);
            }
            done = done.max(n);
            report.check(pos(Check::Feedback(n)), &expected, &actual);
        }
        Ok(())
    }
}
