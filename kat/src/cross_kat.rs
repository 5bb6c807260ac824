/*++

Licensed under the Apache-2.0 license.

File Name:

    cross_kat.rs

Abstract:

    File contains function to execute the Known Answer Tests and every
    cross-validation regime against an accelerator.

--*/

use crate::{
    CrossReport, FixedVectorsConfig, FixedVectorsKat, KhazadKat, RandomMode, RandomVectorsConfig,
    RandomVectorsKat,
};
use khazad_drivers::{BlockCipherEngine, CtrPrng, HwKhazad, SoftKhazad};
use khazad_error::KhazadResult;
use ureg::{Mmio, MmioMut};

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct CrossValidationConfig {
    pub fixed: FixedVectorsConfig,

    /// Random regime sizes; it runs once per mode
    pub random: RandomVectorsConfig,
}

#[derive(Default, Debug)]
pub struct CrossValidationKat {
    config: CrossValidationConfig,
}

impl CrossValidationKat {
    pub fn new(config: CrossValidationConfig) -> Self {
        Self { config }
    }

    /// Executes the Known Answer Tests on both engines, then the fixed and
    /// random regimes.
    ///
    /// # Arguments
    ///
    /// * `prng` - Generator for the random regime; the ECB and CBC runs
    ///   draw consecutive vectors from it
    /// * `reference` - Engine whose results are taken as correct
    /// * `dut` - Accelerator under test
    ///
    /// # Returns
    ///
    /// * `CrossReport` - Tally of all comparisons. A known answer failure
    ///   or an engine failure aborts with an error instead.
    pub fn execute<R, TMmio>(
        &self,
        prng: &mut CtrPrng,
        reference: &mut R,
        dut: &mut HwKhazad<TMmio>,
    ) -> KhazadResult<CrossReport>
    where
        R: BlockCipherEngine,
        TMmio: Mmio + MmioMut,
    {
        KhazadKat::default().execute(reference)?;
        KhazadKat::default().execute(dut)?;

        let mut total = CrossReport::new();

        let mut report = CrossReport::new();
        FixedVectorsKat::new(self.config.fixed).execute(reference, dut, &mut report)?;
        report.log_summary("Test vectors");
        total.merge(&report);

        let mut prng_engine = SoftKhazad::new();
        for mode in [RandomMode::Ecb, RandomMode::Cbc] {
            let mut report = CrossReport::new();
            RandomVectorsKat::new(RandomVectorsConfig {
                mode,
                ..self.config.random
            })
            .execute(prng, &mut prng_engine, reference, dut, &mut report)?;
            report.log_summary(match mode {
                RandomMode::Ecb => "Random vectors (ECB)",
                RandomMode::Cbc => "Random vectors (CBC)",
            });
            total.merge(&report);
        }

        total.log_summary("Cross-validation");
        Ok(total)
    }
}
