/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the KHAZAD Known Answer Tests and the
    cross-validation harness.

--*/

#![cfg_attr(not(test), no_std)]

mod cross_kat;
mod khazad_kat;
mod random_kat;
mod report;
mod round_trip;
mod vector_sets_kat;

#[cfg(test)]
mod testing;

pub use cross_kat::{CrossValidationConfig, CrossValidationKat};
pub use khazad_kat::KhazadKat;
pub use random_kat::{RandomMode, RandomVectorsConfig, RandomVectorsKat, BLOCKS_PER_MESSAGE};
pub use report::{Check, CrossReport, Mismatch, Position, Regime};
pub use round_trip::{compare_paths, round_trip, RoundTripPath};
pub use vector_sets_kat::{
    feedback_chain, fixed_key_chain, FixedVectorsConfig, FixedVectorsKat, FULL_SET4_ITERATIONS,
    SHORT_SET4_ITERATIONS,
};
