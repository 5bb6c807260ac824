/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains API and macros used by the library for error handling

--*/
#![cfg_attr(not(any(feature = "std", test)), no_std)]
use core::convert::From;
use core::num::{NonZeroU32, TryFromIntError};

/// KHAZAD Error Type
/// Derives debug, copy, clone, eq, and partial eq
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KhazadError(pub NonZeroU32);

/// Macro to define error constants ensuring uniqueness
///
/// This macro takes a list of (name, value, doc) tuples and generates
/// constant definitions for each error code.
#[macro_export]
macro_rules! define_error_constants {
    ($(($name:ident, $value:expr, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            pub const $name: KhazadError = KhazadError::new_const($value);
        )*

        /// Returns the name of a defined error constant, if `val` is one.
        pub fn name(val: u32) -> Option<&'static str> {
            $(
                if val == $value {
                    return Some(stringify!($name));
                }
            )*
            None
        }

        #[cfg(test)]
        /// Returns a vector of all defined error constants for testing uniqueness
        pub fn all_constants() -> Vec<(& 'static str, u32)> {
            vec![
                $(
                    (stringify!($name), $value),
                )*
            ]
        }
    };
}

impl KhazadError {
    /// Create an error; intended to only be used from const contexts, as we don't want
    /// runtime panics if val is zero. The preferred way to get a KhazadError from a u32 is to
    /// use `KhazadError::try_from()` from the `TryFrom` trait impl.
    const fn new_const(val: u32) -> Self {
        match NonZeroU32::new(val) {
            Some(val) => Self(val),
            None => panic!("KhazadError cannot be 0"),
        }
    }

    define_error_constants![
        (
            DRIVER_KHAZAD_ACCEL_TIMEOUT,
            0x0001_0001,
            "Accelerator did not acknowledge the issued command"
        ),
        (
            DRIVER_KHAZAD_HANDSHAKE_DESYNC,
            0x0001_0002,
            "Accelerator acknowledge bit does not match the remembered semaphore"
        ),
        (
            DRIVER_KHAZAD_NO_KEY,
            0x0001_0003,
            "Key reuse requested before any key was loaded"
        ),
        (
            DRIVER_KHAZAD_NO_IV,
            0x0001_0004,
            "IV reuse requested before any IV was loaded"
        ),
        (
            DRIVER_KHAZAD_CHAIN_NOT_STARTED,
            0x0001_0005,
            "Chained block issued without a live chain in the same direction"
        ),
        (
            DRIVER_KHAZAD_INVALID_SLICE,
            0x0002_0001,
            "Buffer is not a whole number of blocks or is too small"
        ),
        (
            DRIVER_KHAZAD_PADDING_MISMATCH,
            0x0002_0002,
            "Stripped padding bytes are not zero"
        ),
        (
            DRIVER_KHAZAD_ENVELOPE_MISMATCH,
            0x0002_0003,
            "Block count does not match the message envelope"
        ),
        (
            DRIVER_KHAZAD_MAC_EMPTY_MESSAGE,
            0x0002_0004,
            "CBC-MAC requires at least one block"
        ),
        (
            DRIVER_KHAZAD_PRNG_EXHAUSTED,
            0x0003_0001,
            "PRNG counter space exhausted, reseed required"
        ),
        (
            KAT_KHAZAD_CIPHERTEXT_MISMATCH,
            0x0004_0001,
            "KAT ciphertext mismatch"
        ),
        (
            KAT_KHAZAD_PLAINTEXT_MISMATCH,
            0x0004_0002,
            "KAT plaintext mismatch"
        ),
        (KAT_KHAZAD_CBC_MISMATCH, 0x0004_0003, "KAT CBC mismatch"),
        (KAT_KHAZAD_MAC_MISMATCH, 0x0004_0004, "KAT CBC-MAC mismatch"),
        (KAT_KHAZAD_PRNG_MISMATCH, 0x0004_0005, "KAT PRNG mismatch"),
        (
            KAT_KHAZAD_CROSS_VALIDATION_FAILED,
            0x0004_0006,
            "Accelerator and reference outputs diverged"
        ),
    ];
}

impl From<core::num::NonZeroU32> for crate::KhazadError {
    fn from(val: core::num::NonZeroU32) -> Self {
        crate::KhazadError(val)
    }
}

impl From<KhazadError> for core::num::NonZeroU32 {
    fn from(val: KhazadError) -> Self {
        val.0
    }
}

impl From<KhazadError> for u32 {
    fn from(val: KhazadError) -> Self {
        core::num::NonZeroU32::from(val).get()
    }
}

impl TryFrom<u32> for KhazadError {
    type Error = TryFromIntError;
    fn try_from(val: u32) -> Result<Self, TryFromIntError> {
        match NonZeroU32::try_from(val) {
            Ok(val) => Ok(KhazadError(val)),
            Err(err) => Err(err),
        }
    }
}

impl core::fmt::Display for KhazadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let val = u32::from(*self);
        match KhazadError::name(val) {
            Some(name) => write!(f, "{name} ({val:#010x})"),
            None => write!(f, "unknown error ({val:#010x})"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for KhazadError {}

pub type KhazadResult<T> = Result<T, KhazadError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_try_from() {
        assert!(KhazadError::try_from(0).is_err());
        assert_eq!(
            Ok(KhazadError::DRIVER_KHAZAD_NO_KEY),
            KhazadError::try_from(0x0001_0003)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            KhazadError::DRIVER_KHAZAD_ACCEL_TIMEOUT.to_string(),
            "DRIVER_KHAZAD_ACCEL_TIMEOUT (0x00010001)"
        );
        assert_eq!(
            KhazadError::try_from(0xdead).unwrap().to_string(),
            "unknown error (0x0000dead)"
        );
    }

    #[test]
    fn test_error_constants_uniqueness() {
        let constants = KhazadError::all_constants();
        let mut error_values = HashSet::new();
        let mut duplicates = Vec::new();

        for (name, value) in constants {
            if !error_values.insert(value) {
                duplicates.push((name, value));
            }
        }

        assert!(
            duplicates.is_empty(),
            "Found duplicate error codes: {:?}",
            duplicates
        );
    }
}
