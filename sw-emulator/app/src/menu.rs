/*++

Licensed under the Apache-2.0 license.

File Name:

    menu.rs

Abstract:

    File contains the interactive text menu of the emulator.

--*/

use crate::cli::ArgsEngine;
use crate::input::{self, block_hex, MAX_MESSAGE_LEN};
use crate::session::{Mode, Session};
use anyhow::bail;
use khazad_drivers::{Block, CipherKey};
use khazad_kat::{CrossReport, RandomMode};
use std::io::{BufRead, Write};

const MENU: &str = "\
------------------------------------------------------------
 KHAZAD accelerator
------------------------------------------------------------
 1. Accelerator encrypt / decrypt
 2. Software encrypt / decrypt
 3. ECB demonstration (software and accelerator)
 4. Test vectors
 5. Random vectors test
 6. CBC-MAC generator
 7. PRNG output
 8. About
 0. Exit
------------------------------------------------------------";

/// Print the outcome of a harness run.
pub(crate) fn write_report<W: Write>(
    out: &mut W,
    name: &str,
    report: &CrossReport,
) -> std::io::Result<()> {
    writeln!(
        out,
        "{name}: {} comparisons, {} errors",
        report.checks(),
        report.errors()
    )?;
    if let Some(m) = report.first_mismatch() {
        writeln!(
            out,
            "First mismatch at {}: expected {} got {}",
            m.position,
            block_hex(&m.expected),
            block_hex(&m.actual)
        )?;
    }
    Ok(())
}

pub(crate) struct Menu<'a, R: BufRead, W: Write> {
    session: &'a mut Session,
    input: R,
    out: W,

    /// Key and IV of the last MAC, offered for reuse
    mac: Option<(CipherKey, Block)>,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(session: &'a mut Session, input: R, out: W) -> Self {
        Self {
            session,
            input,
            out,
            mac: None,
        }
    }

    /// Run until option 0 or the end of input.
    pub fn run(&mut self) -> anyhow::Result<()> {
        loop {
            writeln!(self.out, "{MENU}")?;
            let Some(choice) = self.prompt("Option: ")? else {
                return Ok(());
            };
            let result = match choice.trim() {
                "1" => self.crypt(ArgsEngine::Hw),
                "2" => self.crypt(ArgsEngine::Sw),
                "3" => self.demonstration(),
                "4" => self.test_vectors(),
                "5" => self.random_vectors(),
                "6" => self.mac(),
                "7" => self.prng(),
                "8" => self.about(),
                "0" => return Ok(()),
                other => {
                    writeln!(self.out, "Unknown option {other:?}")?;
                    continue;
                }
            };
            if let Err(err) = result {
                log::error!("{err:#}");
                writeln!(self.out, "Error: {err:#}")?;
            }
        }
    }

    /// One line without its line ending, or `None` at the end of input.
    fn prompt(&mut self, text: &str) -> anyhow::Result<Option<String>> {
        write!(self.out, "{text}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Ask until `parse` accepts the answer.
    fn ask<T>(
        &mut self,
        text: &str,
        parse: impl Fn(&str) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        loop {
            let Some(line) = self.prompt(text)? else {
                bail!("end of input");
            };
            match parse(&line) {
                Ok(val) => return Ok(val),
                Err(err) => writeln!(self.out, "Invalid input: {err:#}")?,
            }
        }
    }

    fn ask_choice(&mut self, text: &str, count: u32) -> anyhow::Result<u32> {
        self.ask(text, |s| match s.trim().parse::<u32>() {
            Ok(n) if (1..=count).contains(&n) => Ok(n),
            _ => bail!("enter a number from 1 to {count}"),
        })
    }

    /// A number, or `default` for an empty answer.
    fn ask_count(&mut self, text: &str, default: u32) -> anyhow::Result<u32> {
        self.ask(text, |s| match s.trim() {
            "" => Ok(default),
            s => Ok(s.parse::<u32>()?),
        })
    }

    fn ask_key(&mut self) -> anyhow::Result<CipherKey> {
        self.ask("Key (four 8-digit hex words): ", input::parse_key)
    }

    fn ask_iv(&mut self) -> anyhow::Result<Block> {
        self.ask("IV (two 8-digit hex words): ", input::parse_iv)
    }

    fn ask_message(&mut self) -> anyhow::Result<Vec<u8>> {
        let text = format!("Message (at most {MAX_MESSAGE_LEN} characters): ");
        self.ask(&text, |s| Ok(input::check_message(s.as_bytes())?.to_vec()))
    }

    fn crypt(&mut self, engine: ArgsEngine) -> anyhow::Result<()> {
        let encrypt = self.ask_choice("1. Encrypt  2. Decrypt: ", 2)? == 1;
        let cbc = self.ask_choice("1. ECB  2. CBC: ", 2)? == 2;
        let key = self.ask_key()?;
        let mode = if cbc {
            Mode::Cbc(self.ask_iv()?)
        } else {
            Mode::Ecb
        };

        if encrypt {
            let msg = self.ask_message()?;
            let sealed = self.session.encrypt(engine, mode, &key, &msg)?;
            writeln!(self.out, "Ciphertext: {}", hex::encode_upper(&sealed.blocks))?;
            writeln!(self.out, "Message length: {}", sealed.msg_len)?;
        } else {
            let blocks = self.ask("Ciphertext (hex pairs): ", input::parse_ciphertext)?;
            let msg_len = self.ask("Message length (empty keeps the padding): ", |s| {
                match s.trim() {
                    "" => Ok(None),
                    s => Ok(Some(s.parse::<usize>()?)),
                }
            })?;
            let msg = self
                .session
                .decrypt(engine, mode, &key, blocks, msg_len)?;
            writeln!(self.out, "Plaintext: {}", input::printable(&msg))?;
        }
        Ok(())
    }

    fn demonstration(&mut self) -> anyhow::Result<()> {
        let key = self.ask_key()?;
        let msg = self.ask_message()?;
        let blocks = self.session.demonstration(&key, &msg)?;

        let mut sw_text = Vec::new();
        let mut hw_text = Vec::new();
        for (k, b) in blocks.iter().enumerate() {
            writeln!(
                self.out,
                "Block {k}: plain {} | software {} -> {} | accelerator {} -> {}{}",
                block_hex(&b.plain),
                block_hex(&b.sw_cipher),
                block_hex(&b.sw_decrypted),
                block_hex(&b.hw_cipher),
                block_hex(&b.hw_decrypted),
                if b.sw_cipher == b.hw_cipher {
                    ""
                } else {
                    "  MISMATCH"
                }
            )?;
            sw_text.extend_from_slice(&b.sw_decrypted.to_bytes());
            hw_text.extend_from_slice(&b.hw_decrypted.to_bytes());
        }
        sw_text.truncate(msg.len());
        hw_text.truncate(msg.len());
        writeln!(self.out, "Software decrypted:    {}", input::printable(&sw_text))?;
        writeln!(self.out, "Accelerator decrypted: {}", input::printable(&hw_text))?;
        writeln!(
            self.out,
            "{}",
            if sw_text == msg && hw_text == msg {
                "Both paths restored the message"
            } else {
                "Decrypted message differs"
            }
        )?;
        Ok(())
    }

    fn test_vectors(&mut self) -> anyhow::Result<()> {
        let full = self.ask_choice("1. Short (set 4 10^6)  2. Full (set 4 10^8): ", 2)? == 2;
        let report = self.session.kat(full)?;
        write_report(&mut self.out, "Test vectors", &report)?;
        Ok(report.result()?)
    }

    fn random_vectors(&mut self) -> anyhow::Result<()> {
        let harness = &self.session.config().harness;
        let (default_keys, default_messages) = (harness.random_keys, harness.random_messages);
        let keys = self.ask_count(&format!("Keys [{default_keys}]: "), default_keys)?;
        let messages =
            self.ask_count(&format!("Messages per key [{default_messages}]: "), default_messages)?;
        let mode = match self.ask_choice("1. ECB  2. CBC  3. Both: ", 3)? {
            1 => Some(RandomMode::Ecb),
            2 => Some(RandomMode::Cbc),
            _ => None,
        };
        let report = self.session.random(keys, messages, mode)?;
        write_report(&mut self.out, "Random vectors", &report)?;
        Ok(report.result()?)
    }

    fn mac(&mut self) -> anyhow::Result<()> {
        let reuse = match self.mac {
            Some(_) => self.ask_choice("1. Reuse key and IV  2. New key and IV: ", 2)? == 1,
            None => false,
        };
        let (key, iv) = match self.mac {
            Some(saved) if reuse => saved,
            _ => {
                let key = self.ask_key()?;
                let iv = self.ask("IV (empty for zero): ", |s| match s.trim() {
                    "" => Ok(Block::default()),
                    s => input::parse_iv(s),
                })?;
                (key, iv)
            }
        };
        self.mac = Some((key, iv));
        let msg = self.ask_message()?;
        let mac = self.session.mac(&key, &iv, &msg)?;
        writeln!(self.out, "MAC: {}", block_hex(&mac))?;
        Ok(())
    }

    fn prng(&mut self) -> anyhow::Result<()> {
        let block = self.session.prng_next()?;
        writeln!(self.out, "PRNG: {}", block_hex(&block))?;
        Ok(())
    }

    fn about(&mut self) -> anyhow::Result<()> {
        let accel = &self.session.config().accel;
        writeln!(
            self.out,
            "khazad-emu {}: KHAZAD (128-bit key, 64-bit block, 8 rounds)",
            env!("CARGO_PKG_VERSION")
        )?;
        writeln!(
            self.out,
            "Accelerator at {:#010x}, key schedule {} cycles, block {} cycles",
            accel.base, accel.key_schedule_ticks, accel.crypt_ticks
        )?;
        let prng = &self.session.config().prng;
        writeln!(
            self.out,
            "PRNG nonce {}, key {}",
            prng.nonce.to_uppercase(),
            input::key_hex(&prng.key()?)
        )?;
        writeln!(self.out, "Emulated cycles so far: {}", self.session.cycles())?;
        Ok(())
    }
}
