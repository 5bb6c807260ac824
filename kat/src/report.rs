/*++

Licensed under the Apache-2.0 license.

File Name:

    report.rs

Abstract:

    File contains the mismatch bookkeeping of the cross-validation harness.

--*/

use core::fmt;
use khazad_drivers::Block;
use khazad_error::{KhazadError, KhazadResult};

/// Which part of the harness produced a comparison
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Regime {
    /// Fixed structured vectors, set 1 to 4
    Set(u8),
    RandomEcb,
    RandomCbc,
    RoundTrip,
}

/// What was compared
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Check {
    /// Reference decryption of the reference ciphertext
    ReferenceRoundTrip,

    /// Accelerator ciphertext against the reference ciphertext
    Encrypt,

    /// Accelerator decryption against the plaintext
    Decrypt,

    /// Fixed-key iteration after this many encryptions
    FixedKey(u32),

    /// Last-byte key feedback after this many encryptions
    Feedback(u32),
}

/// Location of a comparison within a run
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Position {
    pub regime: Regime,

    /// Vector number within a set, or key number of the random regime
    pub vector: u32,

    /// Message number under one random key
    pub message: u32,

    /// Block number within a message
    pub block: u32,

    pub check: Check,
}

impl Position {
    pub fn vector(regime: Regime, vector: u32, check: Check) -> Self {
        Self {
            regime,
            vector,
            message: 0,
            block: 0,
            check,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.regime {
            Regime::Set(set) => write!(f, "set {set}, vector #{}", self.vector)?,
            Regime::RandomEcb | Regime::RandomCbc => write!(
                f,
                "{} key #{}, message #{}, block #{}",
                if self.regime == Regime::RandomEcb {
                    "ECB"
                } else {
                    "CBC"
                },
                self.vector,
                self.message,
                self.block
            )?,
            Regime::RoundTrip => write!(f, "round trip, block #{}", self.block)?,
        }
        match self.check {
            Check::ReferenceRoundTrip => write!(f, ": reference decryption"),
            Check::Encrypt => write!(f, ": accelerator ciphertext"),
            Check::Decrypt => write!(f, ": accelerator decryption"),
            Check::FixedKey(n) => write!(f, ": iterated {n} times"),
            Check::Feedback(n) => write!(f, ": last-byte feedback {n} times"),
        }
    }
}

/// Two divergent values at one position
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Mismatch {
    pub position: Position,
    pub expected: Block,
    pub actual: Block,
}

pub(crate) struct HexBlock<'a>(pub &'a Block);

impl fmt::Display for HexBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}{:08X}", self.0 .0[0], self.0 .0[1])
    }
}

/// Tally of one harness run. A mismatch is logged and counted; it never
/// stops the run.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrossReport {
    checks: u64,
    errors: u64,
    first: Option<Mismatch>,
}

impl CrossReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `actual` to `expected` and record the outcome.
    ///
    /// # Returns
    ///
    /// * `bool` - True if the values match
    pub fn check(&mut self, position: Position, expected: &Block, actual: &Block) -> bool {
        self.checks += 1;
        if expected == actual {
            return true;
        }
        self.errors += 1;
        log::error!(
            "{position}: expected {} got {} ({} errors so far)",
            HexBlock(expected),
            HexBlock(actual),
            self.errors
        );
        if self.first.is_none() {
            self.first = Some(Mismatch {
                position,
                expected: *expected,
                actual: *actual,
            });
        }
        false
    }

    /// Fold the counts of another run into this one.
    pub fn merge(&mut self, other: &CrossReport) {
        self.checks += other.checks;
        self.errors += other.errors;
        if self.first.is_none() {
            self.first = other.first;
        }
    }

    pub fn checks(&self) -> u64 {
        self.checks
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }

    pub fn first_mismatch(&self) -> Option<&Mismatch> {
        self.first.as_ref()
    }

    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }

    pub fn log_summary(&self, name: &str) {
        if self.is_clean() {
            log::info!("{name}: {} comparisons, all matched", self.checks);
        } else {
            log::error!(
                "{name}: {} comparisons, {} errors detected",
                self.checks,
                self.errors
            );
        }
    }

    /// # Error
    ///
    /// * `KAT_KHAZAD_CROSS_VALIDATION_FAILED` - at least one comparison failed
    pub fn result(&self) -> KhazadResult<()> {
        if !self.is_clean() {
            Err(KhazadError::KAT_KHAZAD_CROSS_VALIDATION_FAILED)?
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_first_mismatch() {
        let mut report = CrossReport::new();
        let a = Block::from([1u32, 2]);
        let b = Block::from([1u32, 3]);
        let pos = |vector| Position::vector(Regime::Set(3), vector, Check::Encrypt);

        assert!(report.check(pos(0), &a, &a));
        assert!(!report.check(pos(1), &a, &b));
        assert!(!report.check(pos(2), &b, &a));
        assert_eq!(report.checks(), 3);
        assert_eq!(report.errors(), 2);
        assert_eq!(
            report.first_mismatch(),
            Some(&Mismatch {
                position: pos(1),
                expected: a,
                actual: b
            })
        );
        assert_eq!(
            report.result(),
            Err(KhazadError::KAT_KHAZAD_CROSS_VALIDATION_FAILED)
        );
    }

    #[test]
    fn test_merge() {
        let mut total = CrossReport::new();
        let mut clean = CrossReport::new();
        clean.check(
            Position::vector(Regime::RoundTrip, 0, Check::Decrypt),
            &Block::default(),
            &Block::default(),
        );
        total.merge(&clean);
        assert!(total.is_clean());
        assert_eq!(total.result(), Ok(()));
        assert_eq!(total.checks(), 1);
    }

    #[test]
    fn test_position_display() {
        let pos = Position {
            regime: Regime::RandomCbc,
            vector: 2,
            message: 5,
            block: 3,
            check: Check::Encrypt,
        };
        assert_eq!(
            pos.to_string(),
            "CBC key #2, message #5, block #3: accelerator ciphertext"
        );
        assert_eq!(
            Position::vector(Regime::Set(1), 17, Check::FixedKey(1000)).to_string(),
            "set 1, vector #17: iterated 1000 times"
        );
        assert_eq!(
            HexBlock(&Block::from([0x2325_d00fu32, 0x3e76_a22d])).to_string(),
            "2325D00F3E76A22D"
        );
    }
}
