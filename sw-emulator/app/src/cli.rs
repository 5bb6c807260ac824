// Licensed under the Apache-2.0 license

use clap::{ArgAction, ArgGroup, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "KHAZAD accelerator emulator", long_about = None)]
pub struct Args {
    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Raise the log level; repeat for handshake traces
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive menu (default)
    Menu,

    /// Known answer tests and the fixed vector sets
    Kat {
        /// Run set 4 for 10^8 iterations instead of 10^6
        #[arg(long)]
        full: bool,
    },

    /// Compare accelerator and reference on generated vectors
    Random {
        /// Number of random keys
        #[arg(long)]
        keys: Option<u32>,

        /// Number of four-block messages per key
        #[arg(long)]
        messages: Option<u32>,

        /// Mode of operation; both when omitted
        #[arg(long, value_enum)]
        mode: Option<ArgsMode>,
    },

    /// Encrypt a message
    Encrypt(CryptArgs),

    /// Decrypt a ciphertext
    Decrypt(CryptArgs),

    /// CBC-MAC of a text message on the accelerator
    Mac {
        /// 32 hex digits or four 8-digit words
        #[arg(long)]
        key: String,

        /// 16 hex digits; all zero when omitted
        #[arg(long)]
        iv: Option<String>,

        #[arg(long)]
        text: String,
    },

    /// Print generator output blocks
    Prng {
        #[arg(long, default_value_t = 1)]
        count: u32,
    },

    /// Measure a bounded run of block operations
    Bench(BenchArgs),
}

#[derive(clap::Args, Debug)]
#[command(group(ArgGroup::new("input").required(true).args(["text", "hex"])))]
pub struct CryptArgs {
    /// 32 hex digits or four 8-digit words
    #[arg(long)]
    pub key: String,

    /// 16 hex digits or two 8-digit words, required for CBC
    #[arg(long)]
    pub iv: Option<String>,

    #[arg(long, value_enum, default_value_t = ArgsMode::Ecb)]
    pub mode: ArgsMode,

    #[arg(long, value_enum, default_value_t = ArgsEngine::Hw)]
    pub engine: ArgsEngine,

    /// Message as characters
    #[arg(long)]
    pub text: Option<String>,

    /// Message or ciphertext as hex pairs
    #[arg(long)]
    pub hex: Option<String>,

    /// Message length printed by encrypt; strips the padding on decrypt
    #[arg(long)]
    pub len: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct BenchArgs {
    #[arg(long, value_enum, default_value_t = ArgsEngine::Hw)]
    pub engine: ArgsEngine,

    #[arg(long, value_enum, default_value_t = ArgsMode::Ecb)]
    pub mode: ArgsMode,

    #[arg(long, value_enum, default_value_t = ArgsDirection::Encrypt)]
    pub direction: ArgsDirection,

    /// Load the key with every operation instead of reusing it
    #[arg(long)]
    pub rekey: bool,

    /// Number of block operations
    #[arg(long, default_value_t = 10_000)]
    pub ops: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ArgsMode {
    Ecb,
    Cbc,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ArgsEngine {
    /// Emulated accelerator
    Hw,

    /// Software reference
    Sw,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ArgsDirection {
    Encrypt,
    Decrypt,
}

impl From<ArgsDirection> for khazad_drivers::Direction {
    fn from(value: ArgsDirection) -> Self {
        match value {
            ArgsDirection::Encrypt => khazad_drivers::Direction::Encrypt,
            ArgsDirection::Decrypt => khazad_drivers::Direction::Decrypt,
        }
    }
}
