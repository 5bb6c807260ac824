/*++

Licensed under the Apache-2.0 license.

File Name:

    round_trip.rs

Abstract:

    File contains the single message checks: encrypt then decrypt on one
    engine, or encrypt on two engines and compare.

--*/

use crate::report::{Check, CrossReport, Position, Regime};
use khazad_drivers::{
    Block, BlockCipherEngine, CbcDecryptor, CbcEncryptor, CipherKey, Ecb, KhazadError,
    BLOCK_SIZE,
};
use khazad_error::KhazadResult;

/// Mode a single message is processed under
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RoundTripPath {
    Ecb,

    /// CBC from this IV
    Cbc(Block),
}

fn encrypt<E: BlockCipherEngine>(
    engine: &mut E,
    key: &CipherKey,
    path: RoundTripPath,
    buf: &mut [u8],
) -> KhazadResult<()> {
    match path {
        RoundTripPath::Ecb => Ecb::new(engine, key)?.encrypt_in_place(buf),
        RoundTripPath::Cbc(iv) => CbcEncryptor::new(engine, key, &iv)?.encrypt_in_place(buf),
    }
}

fn decrypt<E: BlockCipherEngine>(
    engine: &mut E,
    key: &CipherKey,
    path: RoundTripPath,
    buf: &mut [u8],
) -> KhazadResult<()> {
    match path {
        RoundTripPath::Ecb => Ecb::new(engine, key)?.decrypt_in_place(buf),
        RoundTripPath::Cbc(iv) => CbcDecryptor::new(engine, key, &iv)?.decrypt_in_place(buf),
    }
}

fn compare_blocks(report: &mut CrossReport, check: Check, expected: &[u8], actual: &[u8]) {
    for (k, (e, a)) in expected
        .chunks_exact(BLOCK_SIZE)
        .zip(actual.chunks_exact(BLOCK_SIZE))
        .enumerate()
    {
        let (Some(e), Some(a)) = (Block::from_slice(e), Block::from_slice(a)) else {
            continue;
        };
        let position = Position {
            regime: Regime::RoundTrip,
            vector: 0,
            message: 0,
            block: k as u32,
            check,
        };
        report.check(position, &e, &a);
    }
}

/// Encrypt `msg` into `scratch`, decrypt it again and compare with `msg`.
///
/// # Arguments
///
/// * `engine` - Engine to run both directions on
/// * `key` - Cipher key
/// * `path` - Mode of operation
/// * `msg` - Padded message
/// * `scratch` - Buffer of the same length as `msg`
/// * `report` - Comparison tally
///
/// # Error
///
/// * `DRIVER_KHAZAD_INVALID_SLICE` - `msg` is not whole blocks or `scratch`
///   differs in length
pub fn round_trip<E: BlockCipherEngine>(
    engine: &mut E,
    key: &CipherKey,
    path: RoundTripPath,
    msg: &[u8],
    scratch: &mut [u8],
    report: &mut CrossReport,
) -> KhazadResult<()> {
    if scratch.len() != msg.len() {
        Err(KhazadError::DRIVER_KHAZAD_INVALID_SLICE)?
    }
    scratch.copy_from_slice(msg);
    encrypt(engine, key, path, scratch)?;
    decrypt(engine, key, path, scratch)?;
    compare_blocks(report, Check::Decrypt, msg, scratch);
    Ok(())
}

/// Encrypt `msg` on both engines and compare the ciphertexts block for
/// block. On return `reference_out` holds the reference ciphertext and
/// `dut_out` the other one.
#[allow(clippy::too_many_arguments)]
pub fn compare_paths<R, D>(
    reference: &mut R,
    dut: &mut D,
    key: &CipherKey,
    path: RoundTripPath,
    msg: &[u8],
    reference_out: &mut [u8],
    dut_out: &mut [u8],
    report: &mut CrossReport,
) -> KhazadResult<()>
where
    R: BlockCipherEngine,
    D: BlockCipherEngine,
{
    if reference_out.len() != msg.len() || dut_out.len() != msg.len() {
        Err(KhazadError::DRIVER_KHAZAD_INVALID_SLICE)?
    }
    reference_out.copy_from_slice(msg);
    encrypt(reference, key, path, reference_out)?;
    dut_out.copy_from_slice(msg);
    encrypt(dut, key, path, dut_out)?;
    compare_blocks(report, Check::Encrypt, reference_out, dut_out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{board, hw_engine, Corrupting};
    use khazad_drivers::SoftKhazad;

    const MSG: [u8; 24] = *b"KHAZAD block cipher!\0\0\0\0";

    fn seq_key() -> CipherKey {
        CipherKey::from([0x0001_0203u32, 0x0405_0607, 0x0809_0a0b, 0x0c0d_0e0f])
    }

    #[test]
    fn test_round_trip_on_accelerator() {
        let mmio = board();
        let mut hw = hw_engine(&mmio);
        let mut report = CrossReport::new();
        let mut scratch = [0u8; 24];
        for path in [RoundTripPath::Ecb, RoundTripPath::Cbc(Block::from([7u32, 9]))] {
            round_trip(&mut hw, &seq_key(), path, &MSG, &mut scratch, &mut report).unwrap();
        }
        assert_eq!(report.checks(), 6);
        assert!(report.is_clean());
    }

    #[test]
    fn test_compare_paths() {
        let mmio = board();
        let mut hw = hw_engine(&mmio);
        let mut report = CrossReport::new();
        let mut sw_out = [0u8; 24];
        let mut hw_out = [0u8; 24];
        compare_paths(
            &mut SoftKhazad::new(),
            &mut hw,
            &seq_key(),
            RoundTripPath::Cbc(Block::from([0x0001_0203u32, 0x0405_0607])),
            &MSG,
            &mut sw_out,
            &mut hw_out,
            &mut report,
        )
        .unwrap();
        assert!(report.is_clean());
        assert_eq!(sw_out[..8], [0x36, 0xbb, 0x41, 0x04, 0xfc, 0x3a, 0xa1, 0x47]);
        assert_eq!(sw_out, hw_out);
    }

    #[test]
    fn test_compare_paths_reports_every_block() {
        let mut report = CrossReport::new();
        let mut sw_out = [0u8; 24];
        let mut bad_out = [0u8; 24];
        compare_paths(
            &mut SoftKhazad::new(),
            &mut Corrupting::new(SoftKhazad::new(), 1),
            &seq_key(),
            RoundTripPath::Ecb,
            &MSG,
            &mut sw_out,
            &mut bad_out,
            &mut report,
        )
        .unwrap();
        assert_eq!(report.checks(), 3);
        assert_eq!(report.errors(), 3);
    }

    #[test]
    fn test_scratch_length() {
        let mut report = CrossReport::new();
        assert_eq!(
            round_trip(
                &mut SoftKhazad::new(),
                &seq_key(),
                RoundTripPath::Ecb,
                &MSG,
                &mut [0u8; 16],
                &mut report
            ),
            Err(KhazadError::DRIVER_KHAZAD_INVALID_SLICE)
        );
    }
}
