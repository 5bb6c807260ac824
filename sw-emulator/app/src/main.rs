/*++

Licensed under the Apache-2.0 license.

File Name:

    main.rs

Abstract:

    File contains main entrypoint for the KHAZAD accelerator emulator.

--*/

mod bench;
mod cli;
mod config;
mod input;
mod menu;
mod session;

use anyhow::{bail, Context};
use clap::Parser;
use cli::{Args, ArgsMode, Commands, CryptArgs};
use config::EmuConfig;
use khazad_kat::RandomMode;
use log::LevelFilter;
use menu::{write_report, Menu};
use session::{Mode, Session};
use simple_logger::SimpleLogger;
use std::io;

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn crypt_mode(args: &CryptArgs) -> anyhow::Result<Mode> {
    match (args.mode, &args.iv) {
        (ArgsMode::Ecb, None) => Ok(Mode::Ecb),
        (ArgsMode::Ecb, Some(_)) => {
            log::warn!("ECB ignores --iv");
            Ok(Mode::Ecb)
        }
        (ArgsMode::Cbc, Some(iv)) => Ok(Mode::Cbc(input::parse_iv(iv)?)),
        (ArgsMode::Cbc, None) => bail!("CBC requires --iv"),
    }
}

fn encrypt(session: &mut Session, args: &CryptArgs) -> anyhow::Result<()> {
    let key = input::parse_key(&args.key)?;
    let mode = crypt_mode(args)?;
    let msg = match (&args.text, &args.hex) {
        (Some(text), _) => text.as_bytes().to_vec(),
        (None, Some(hex)) => hex::decode(hex).context("Invalid message hex")?,
        (None, None) => bail!("no message given"),
    };
    if args.len.is_some() {
        log::warn!("encrypt ignores --len");
    }
    let sealed = session.encrypt(args.engine, mode, &key, input::check_message(&msg)?)?;
    println!("{}", hex::encode_upper(&sealed.blocks));
    println!("Message length: {}", sealed.msg_len);
    Ok(())
}

fn decrypt(session: &mut Session, args: &CryptArgs) -> anyhow::Result<()> {
    let key = input::parse_key(&args.key)?;
    let mode = crypt_mode(args)?;
    let Some(hex) = &args.hex else {
        bail!("decrypt takes the ciphertext as --hex");
    };
    let blocks = input::parse_ciphertext(hex)?;
    if args.len.is_none() {
        log::warn!("Without --len the zero padding is kept");
    }
    let msg = session.decrypt(args.engine, mode, &key, blocks, args.len)?;
    println!("{}", input::printable(&msg));
    Ok(())
}

fn run(args: Args, config: EmuConfig) -> anyhow::Result<()> {
    let mut session = Session::new(config)?;
    match args.command.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            let stdin = io::stdin();
            Menu::new(&mut session, stdin.lock(), io::stdout()).run()
        }
        Commands::Kat { full } => {
            let report = session.kat(full)?;
            write_report(&mut io::stdout(), "Test vectors", &report)?;
            Ok(report.result()?)
        }
        Commands::Random {
            keys,
            messages,
            mode,
        } => {
            let harness = &session.config().harness;
            let keys = keys.unwrap_or(harness.random_keys);
            let messages = messages.unwrap_or(harness.random_messages);
            let mode = mode.map(|mode| match mode {
                ArgsMode::Ecb => RandomMode::Ecb,
                ArgsMode::Cbc => RandomMode::Cbc,
            });
            let report = session.random(keys, messages, mode)?;
            write_report(&mut io::stdout(), "Random vectors", &report)?;
            Ok(report.result()?)
        }
        Commands::Encrypt(args) => encrypt(&mut session, &args),
        Commands::Decrypt(args) => decrypt(&mut session, &args),
        Commands::Mac { key, iv, text } => {
            let key = input::parse_key(&key)?;
            let iv = match iv {
                Some(iv) => input::parse_iv(&iv)?,
                None => Default::default(),
            };
            let mac = session.mac(&key, &iv, input::check_message(text.as_bytes())?)?;
            println!("{}", input::block_hex(&mac));
            Ok(())
        }
        Commands::Prng { count } => {
            for _ in 0..count {
                println!("{}", input::block_hex(&session.prng_next()?));
            }
            Ok(())
        }
        Commands::Bench(args) => {
            let result = bench::run(&mut session, &args)?;
            let secs = result.elapsed.as_secs_f64();
            println!("Operations:      {}", result.ops);
            println!("Wall time:       {secs:.3} s");
            if secs > 0.0 {
                println!("Throughput:      {:.0} ops/s", f64::from(result.ops) / secs);
            }
            println!("Emulated cycles: {}", result.cycles);
            println!("Last output:     {}", input::block_hex(&result.last));
            Ok(())
        }
    }
}

fn main() {
    let args = Args::parse();
    let _ = SimpleLogger::new()
        .with_level(log_level(args.verbose))
        .init();

    let config = match &args.config {
        Some(path) => config::load_config(path),
        None => Ok(EmuConfig::default()),
    };
    let result = config.and_then(|config| run(args, config));
    result.unwrap_or_else(|e| {
        log::error!("Error: {e:#}");
        std::process::exit(1);
    });
}
