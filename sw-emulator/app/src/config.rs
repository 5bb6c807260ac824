/*++

Licensed under the Apache-2.0 license.

File Name:

   config.rs

Abstract:

    File contains utilities for parsing the emulator configuration file

--*/

use crate::input;
use anyhow::Context;
use khazad_drivers::{CipherKey, WaitPolicy, DEFAULT_PRNG_NONCE};
use khazad_emu_periph::{KhazadRootBus, KhazadRootBusArgs, KhazadTiming};
use khazad_kat::{FixedVectorsConfig, FULL_SET4_ITERATIONS, SHORT_SET4_ITERATIONS};
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

/// Emulated accelerator configuration
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AccelConfig {
    /// AXI base address
    pub base: u32,

    pub key_schedule_ticks: u64,

    pub crypt_ticks: u64,

    /// Status reads before an operation is declared lost
    pub max_polls: u32,
}

impl Default for AccelConfig {
    fn default() -> Self {
        let timing = KhazadTiming::default();
        Self {
            base: KhazadRootBus::ACCEL_BASE,
            key_schedule_ticks: timing.key_schedule_ticks,
            crypt_ticks: timing.crypt_ticks,
            max_polls: WaitPolicy::default().max_polls,
        }
    }
}

impl AccelConfig {
    pub fn bus_args(&self) -> KhazadRootBusArgs {
        KhazadRootBusArgs {
            accel_base: self.base,
            timing: KhazadTiming {
                key_schedule_ticks: self.key_schedule_ticks,
                crypt_ticks: self.crypt_ticks,
            },
        }
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            max_polls: self.max_polls,
        }
    }
}

/// Harness sizes
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct HarnessConfig {
    /// Set 4 length of `kat`
    pub short_iterations: u32,

    /// Set 4 length of `kat --full`
    pub full_iterations: u32,

    pub random_keys: u32,

    pub random_messages: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            short_iterations: SHORT_SET4_ITERATIONS,
            full_iterations: FULL_SET4_ITERATIONS,
            random_keys: 8,
            random_messages: 8,
        }
    }
}

impl HarnessConfig {
    pub fn fixed_vectors(&self, full: bool) -> FixedVectorsConfig {
        FixedVectorsConfig {
            set4_iterations: if full {
                self.full_iterations
            } else {
                self.short_iterations
            },
            ..FixedVectorsConfig::short()
        }
    }
}

/// Generator seed material as hex strings
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PrngConfig {
    pub nonce: String,

    pub key: String,
}

impl Default for PrngConfig {
    fn default() -> Self {
        Self {
            nonce: hex::encode(DEFAULT_PRNG_NONCE),
            key: hex::encode([0u8; 16]),
        }
    }
}

impl PrngConfig {
    pub fn nonce(&self) -> anyhow::Result<[u8; 4]> {
        input::parse_nonce(&self.nonce).context("Invalid PRNG nonce")
    }

    pub fn key(&self) -> anyhow::Result<CipherKey> {
        input::parse_key(&self.key).context("Invalid PRNG key")
    }
}

// Emulator Configuration
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct EmuConfig {
    pub accel: AccelConfig,

    pub harness: HarnessConfig,

    pub prng: PrngConfig,
}

/// Load Emulator Configuration from file
pub(crate) fn load_config(path: &Path) -> anyhow::Result<EmuConfig> {
    let config_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read the config file {}", path.display()))?;

    let config: EmuConfig = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    // Catch bad seed material before any run starts.
    config.prng.nonce()?;
    config.prng.key()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: EmuConfig = toml::from_str(
            r#"
            [accel]
            crypt_ticks = 4

            [prng]
            nonce = "deadbeef"
            "#,
        )
        .unwrap();
        assert_eq!(config.accel.crypt_ticks, 4);
        assert_eq!(config.accel.key_schedule_ticks, 18);
        assert_eq!(config.accel.base, 0x4120_0000);
        assert_eq!(config.harness.short_iterations, 1_000_000);
        assert_eq!(config.prng.nonce().unwrap(), [0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(config.prng.key().unwrap(), CipherKey::default());
    }

    #[test]
    fn test_fixed_vectors_length() {
        let harness = HarnessConfig {
            short_iterations: 10,
            full_iterations: 20,
            ..Default::default()
        };
        assert_eq!(harness.fixed_vectors(false).set4_iterations, 10);
        assert_eq!(harness.fixed_vectors(true).set4_iterations, 20);
        assert_eq!(harness.fixed_vectors(true).checkpoints, [100, 1000]);
    }

    #[test]
    fn test_load_rejects_bad_seed() {
        let path = std::env::temp_dir().join(format!("khazad-emu-{}.toml", std::process::id()));
        std::fs::write(&path, "[prng]\nkey = \"xyz\"\n").unwrap();
        let err = load_config(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(format!("{err:#}").contains("Invalid PRNG key"));
    }
}
