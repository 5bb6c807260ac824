/*++

Licensed under the Apache-2.0 license.

File Name:

    khazad_accel.rs

Abstract:

    File contains the control channel of the KHAZAD accelerator: the
    semaphore handshake, key and IV staging, and the session knowledge
    that decides when loading them can be skipped.

--*/

use crate::reg::khazad_regs::{KhazadRegs, CONTROL, DATA_DIR, STATUS};
use crate::{wait, Block, CipherKey};
use khazad_error::{KhazadError, KhazadResult};
use tock_registers::fields::FieldValue;
use ureg::{Mmio, MmioMut};

/// Direction of a block operation
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Where the accelerator takes the key from
#[derive(Debug, Copy, Clone)]
pub enum KeySource<'a> {
    /// Write the key registers and expand the key
    Load(&'a CipherKey),

    /// Keep the key expanded by the previous operation
    Reuse,
}

/// Where a fresh chain takes its IV from
#[derive(Debug, Copy, Clone)]
pub enum IvSource<'a> {
    /// Write the IV registers
    Load(&'a Block),

    /// Use the IV registers as last written
    Reuse,
}

/// Position of a block in a CBC chain
#[derive(Debug, Copy, Clone)]
pub enum Chain<'a> {
    /// First block: the chaining register is seeded from the IV
    Fresh(IvSource<'a>),

    /// Later block: the chaining register holds the previous block
    Continuing,
}

/// Mode of operation implemented by the accelerator
#[derive(Debug, Copy, Clone)]
pub enum ModeSelect<'a> {
    Ecb,
    Cbc(Chain<'a>),
}

/// Bounds the busy-wait for the acknowledge bit.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct WaitPolicy {
    /// Number of status reads before giving up
    pub max_polls: u32,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self { max_polls: 100_000 }
    }
}

/// Control channel to one accelerator. Owns the semaphore bit and what the
/// accelerator is known to hold.
pub struct KhazadAccel<TMmio: Mmio + MmioMut> {
    regs: KhazadRegs<TMmio>,

    /// Semaphore bit of the last acknowledged operation
    sem: bool,

    key_loaded: bool,

    iv_loaded: bool,

    /// Direction of the live CBC chain, if any
    chain: Option<Direction>,

    desync: bool,

    policy: WaitPolicy,
}

impl<TMmio: Mmio + MmioMut> KhazadAccel<TMmio> {
    /// Take control of an accelerator that has just been reset.
    ///
    /// # Arguments
    ///
    /// * `regs` - Register window
    /// * `policy` - Busy-wait bound
    pub fn new(regs: KhazadRegs<TMmio>, policy: WaitPolicy) -> Self {
        Self {
            regs,
            sem: false,
            key_loaded: false,
            iv_loaded: false,
            chain: None,
            desync: false,
            policy,
        }
    }

    pub fn regs(&self) -> &KhazadRegs<TMmio> {
        &self.regs
    }

    pub fn policy(&self) -> WaitPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: WaitPolicy) {
        self.policy = policy;
    }

    /// True while the accelerator holds an expanded key from this session.
    pub fn holds_key(&self) -> bool {
        self.key_loaded
    }

    /// True while the IV registers hold an IV from this session.
    pub fn holds_iv(&self) -> bool {
        self.iv_loaded
    }

    /// Direction of the live CBC chain, if any.
    pub fn chain(&self) -> Option<Direction> {
        self.chain
    }

    /// False after a handshake mismatch or a timeout; cleared by `reset`.
    pub fn is_synchronized(&self) -> bool {
        !self.desync
    }

    /// Pulse the accelerator's reset line and forget all session knowledge.
    pub fn reset(&mut self) {
        log::trace!("khazad: reset channel");
        self.regs.write_control(CONTROL::RST::SET);
        self.regs.write_control(CONTROL::RST::CLEAR);
        self.sem = false;
        self.key_loaded = false;
        self.iv_loaded = false;
        self.chain = None;
        self.desync = false;
    }

    /// Run one block through the accelerator.
    ///
    /// # Arguments
    ///
    /// * `block` - Input block
    /// * `key` - Key to load or reuse
    /// * `mode` - ECB, or CBC with the block's position in the chain
    /// * `direction` - Encrypt or decrypt
    ///
    /// # Returns
    ///
    /// * `Block` - Output block
    pub fn submit(
        &mut self,
        block: &Block,
        key: KeySource,
        mode: ModeSelect,
        direction: Direction,
    ) -> KhazadResult<Block> {
        if self.desync {
            Err(KhazadError::DRIVER_KHAZAD_HANDSHAKE_DESYNC)?
        }
        self.check_request(key, mode, direction)?;

        let ack = self.regs.status().is_set(STATUS::ACK);
        if ack != self.sem {
            log::warn!(
                "khazad: status ack={} but last acknowledged sem={}",
                ack as u8,
                self.sem as u8
            );
            self.desync = true;
            Err(KhazadError::DRIVER_KHAZAD_HANDSHAKE_DESYNC)?
        }

        self.regs.set_data_dir(DATA_DIR::DIR::Input);
        if let KeySource::Load(key) = key {
            self.regs.write_key(key);
        }
        if let ModeSelect::Cbc(Chain::Fresh(IvSource::Load(iv))) = mode {
            self.regs.write_iv(iv);
        }
        self.regs.write_data(block);

        let next = !self.sem;
        let control = Self::control_word(next, key, mode, direction);
        log::trace!("khazad: issue control {:#04x}", control.value);
        self.regs.write_control(control);

        let regs = &self.regs;
        let polls = wait::until_bounded(self.policy.max_polls, || {
            regs.status().is_set(STATUS::ACK) == next
        });
        let Some(polls) = polls else {
            log::warn!(
                "khazad: no acknowledge after {} polls",
                self.policy.max_polls
            );
            self.desync = true;
            return Err(KhazadError::DRIVER_KHAZAD_ACCEL_TIMEOUT);
        };
        log::trace!("khazad: acknowledged after {polls} polls");
        self.sem = next;

        self.regs.set_data_dir(DATA_DIR::DIR::Output);
        let out = self.regs.read_data();

        if let KeySource::Load(_) = key {
            self.key_loaded = true;
        }
        // Only a CBC operation keeps a chain alive; a key load or an ECB
        // block in between leaves the chaining register unrelated to it.
        self.chain = match mode {
            ModeSelect::Cbc(chain) => {
                if let Chain::Fresh(IvSource::Load(_)) = chain {
                    self.iv_loaded = true;
                }
                Some(direction)
            }
            ModeSelect::Ecb => None,
        };

        Ok(out)
    }

    /// Reject requests whose reuse flags would silently corrupt the output.
    fn check_request(
        &self,
        key: KeySource,
        mode: ModeSelect,
        direction: Direction,
    ) -> KhazadResult<()> {
        if let KeySource::Reuse = key {
            if !self.key_loaded {
                Err(KhazadError::DRIVER_KHAZAD_NO_KEY)?
            }
        }
        match mode {
            ModeSelect::Cbc(Chain::Fresh(IvSource::Reuse)) if !self.iv_loaded => {
                Err(KhazadError::DRIVER_KHAZAD_NO_IV)?
            }
            ModeSelect::Cbc(Chain::Continuing) if self.chain != Some(direction) => {
                Err(KhazadError::DRIVER_KHAZAD_CHAIN_NOT_STARTED)?
            }
            // A new key invalidates the chaining register's meaning.
            ModeSelect::Cbc(Chain::Continuing) if matches!(key, KeySource::Load(_)) => {
                Err(KhazadError::DRIVER_KHAZAD_CHAIN_NOT_STARTED)?
            }
            _ => {}
        }
        Ok(())
    }

    fn control_word(
        sem: bool,
        key: KeySource,
        mode: ModeSelect,
        direction: Direction,
    ) -> FieldValue<u32, CONTROL::Register> {
        let mut control = CONTROL::SEM.val(sem as u32);
        if let KeySource::Reuse = key {
            control += CONTROL::ONLY_DATA::SET;
        }
        if let Direction::Encrypt = direction {
            control += CONTROL::ENC::SET;
        }
        if let ModeSelect::Cbc(chain) = mode {
            control += CONTROL::CBC::SET;
            if let Chain::Fresh(_) = chain {
                control += CONTROL::FIRST::SET;
            }
        }
        control
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{accel, board};
    use crate::Array4x4;
    use khazad_emu_bus::testing::TraceBus;
    use khazad_emu_bus::BusMmio;
    use khazad_emu_periph::KhazadRootBus;
    use rand::{Rng, SeedableRng};

    const ZERO_KEY: CipherKey = Array4x4([0; 4]);
    const SEQ_KEY: CipherKey = Array4x4([0x0001_0203, 0x0405_0607, 0x0809_0a0b, 0x0c0d_0e0f]);

    #[test]
    fn test_ecb_with_key_reuse() {
        let mmio = board();
        let mut accel = accel(&mmio, WaitPolicy::default());
        assert!(!accel.holds_key());

        let ct = accel
            .submit(
                &Block::default(),
                KeySource::Load(&ZERO_KEY),
                ModeSelect::Ecb,
                Direction::Encrypt,
            )
            .unwrap();
        assert_eq!(ct, Block::from([0x2325_d00fu32, 0x3e76_a22d]));
        assert!(accel.holds_key());

        let pt = accel
            .submit(&ct, KeySource::Reuse, ModeSelect::Ecb, Direction::Decrypt)
            .unwrap();
        assert_eq!(pt, Block::default());
        assert!(accel.is_synchronized());
    }

    #[test]
    fn test_register_access_order() {
        let mmio = BusMmio::new(TraceBus::new(KhazadRootBus::default()));
        let mut accel = accel(&mmio, WaitPolicy::default());
        accel
            .submit(
                &Block::from([0x0102_0304u32, 0x0506_0708]),
                KeySource::Load(&SEQ_KEY),
                ModeSelect::Cbc(Chain::Fresh(IvSource::Load(&Block::from([
                    0xaaaa_aaaau32,
                    0x5555_5555,
                ])))),
                Direction::Encrypt,
            )
            .unwrap();

        let polls = "read(Word, 0x41200004)\n".repeat(27);
        let expected = format!(
            "read(Word, 0x41200004)\n\
             write(Word, 0x41200008, 0x0)\n\
             write(Word, 0x41200010, 0x10203)\n\
             write(Word, 0x41200014, 0x4050607)\n\
             write(Word, 0x41200018, 0x8090a0b)\n\
             write(Word, 0x4120001c, 0xc0d0e0f)\n\
             write(Word, 0x41200020, 0xaaaaaaaa)\n\
             write(Word, 0x41200024, 0x55555555)\n\
             write(Word, 0x41200030, 0x1020304)\n\
             write(Word, 0x41200034, 0x5060708)\n\
             write(Word, 0x41200000, 0xf)\n\
             {polls}\
             write(Word, 0x41200008, 0x1)\n\
             read(Word, 0x41200030)\n\
             read(Word, 0x41200034)\n"
        );
        assert_eq!(mmio.with_bus(|bus| bus.log.take()), expected);

        accel
            .submit(
                &Block::default(),
                KeySource::Reuse,
                ModeSelect::Cbc(Chain::Continuing),
                Direction::Encrypt,
            )
            .unwrap();
        let log = mmio.with_bus(|bus| bus.log.take());
        assert!(!log.contains("0x41200010"));
        assert!(!log.contains("0x41200020"));
        assert!(log.contains("write(Word, 0x41200000, 0x1c)\n"));
    }

    #[test]
    fn test_rejects_unrepresentable_reuse() {
        let mmio = board();
        let mut accel = accel(&mmio, WaitPolicy::default());
        let block = Block::default();

        assert_eq!(
            accel.submit(&block, KeySource::Reuse, ModeSelect::Ecb, Direction::Encrypt),
            Err(KhazadError::DRIVER_KHAZAD_NO_KEY)
        );
        assert_eq!(
            accel.submit(
                &block,
                KeySource::Load(&SEQ_KEY),
                ModeSelect::Cbc(Chain::Fresh(IvSource::Reuse)),
                Direction::Encrypt
            ),
            Err(KhazadError::DRIVER_KHAZAD_NO_IV)
        );
        assert_eq!(
            accel.submit(
                &block,
                KeySource::Load(&SEQ_KEY),
                ModeSelect::Cbc(Chain::Continuing),
                Direction::Encrypt
            ),
            Err(KhazadError::DRIVER_KHAZAD_CHAIN_NOT_STARTED)
        );

        accel
            .submit(
                &block,
                KeySource::Load(&SEQ_KEY),
                ModeSelect::Cbc(Chain::Fresh(IvSource::Load(&block))),
                Direction::Encrypt,
            )
            .unwrap();
        assert_eq!(accel.chain(), Some(Direction::Encrypt));
        assert_eq!(
            accel.submit(
                &block,
                KeySource::Reuse,
                ModeSelect::Cbc(Chain::Continuing),
                Direction::Decrypt
            ),
            Err(KhazadError::DRIVER_KHAZAD_CHAIN_NOT_STARTED)
        );
        assert_eq!(
            accel.submit(
                &block,
                KeySource::Load(&ZERO_KEY),
                ModeSelect::Cbc(Chain::Continuing),
                Direction::Encrypt
            ),
            Err(KhazadError::DRIVER_KHAZAD_CHAIN_NOT_STARTED)
        );
        // Rejected requests never reach the accelerator.
        assert!(accel.is_synchronized());
    }

    #[test]
    fn test_ecb_block_ends_chain() {
        let mmio = board();
        let mut accel = accel(&mmio, WaitPolicy::default());
        let block = Block::default();
        let continuing = ModeSelect::Cbc(Chain::Continuing);

        accel
            .submit(
                &block,
                KeySource::Load(&SEQ_KEY),
                ModeSelect::Cbc(Chain::Fresh(IvSource::Load(&block))),
                Direction::Encrypt,
            )
            .unwrap();
        accel
            .submit(&block, KeySource::Reuse, continuing, Direction::Encrypt)
            .unwrap();

        // ECB under another key, then an attempt to resume the old chain.
        accel
            .submit(&block, KeySource::Load(&ZERO_KEY), ModeSelect::Ecb, Direction::Encrypt)
            .unwrap();
        assert_eq!(accel.chain(), None);
        assert_eq!(
            accel.submit(&block, KeySource::Reuse, continuing, Direction::Encrypt),
            Err(KhazadError::DRIVER_KHAZAD_CHAIN_NOT_STARTED)
        );

        // ECB under the same key ends the chain too.
        accel
            .submit(
                &block,
                KeySource::Load(&SEQ_KEY),
                ModeSelect::Cbc(Chain::Fresh(IvSource::Reuse)),
                Direction::Encrypt,
            )
            .unwrap();
        accel
            .submit(&block, KeySource::Reuse, ModeSelect::Ecb, Direction::Encrypt)
            .unwrap();
        assert_eq!(
            accel.submit(&block, KeySource::Reuse, continuing, Direction::Encrypt),
            Err(KhazadError::DRIVER_KHAZAD_CHAIN_NOT_STARTED)
        );
        assert!(accel.is_synchronized());
    }

    #[test]
    fn test_native_cbc_message() {
        let mmio = board();
        let mut accel = accel(&mmio, WaitPolicy::default());
        let iv = Block::from([0x0001_0203u32, 0x0405_0607]);
        let msg = [
            Block::from(*b"KHAZAD b"),
            Block::from(*b"lock cip"),
            Block::from(*b"her!\0\0\0\0"),
        ];
        let expected = [
            Block::from([0x36bb_4104u32, 0xfc3a_a147]),
            Block::from([0x6d6d_ca34u32, 0xaefe_b2ad]),
            Block::from([0xd72d_0a06u32, 0x5edd_31e7]),
        ];

        for (i, (m, c)) in msg.iter().zip(&expected).enumerate() {
            let (key, chain) = if i == 0 {
                (KeySource::Load(&SEQ_KEY), Chain::Fresh(IvSource::Load(&iv)))
            } else {
                (KeySource::Reuse, Chain::Continuing)
            };
            let out = accel
                .submit(m, key, ModeSelect::Cbc(chain), Direction::Encrypt)
                .unwrap();
            assert_eq!(out, *c);
        }

        // A second chain seeded from the IV registers as last written.
        for (i, (c, m)) in expected.iter().zip(&msg).enumerate() {
            let chain = if i == 0 {
                Chain::Fresh(IvSource::Reuse)
            } else {
                Chain::Continuing
            };
            let out = accel
                .submit(c, KeySource::Reuse, ModeSelect::Cbc(chain), Direction::Decrypt)
                .unwrap();
            assert_eq!(out, *m);
        }
    }

    #[test]
    fn test_key_reuse_is_transparent() {
        let mmio = board();
        let mut accel = accel(&mmio, WaitPolicy::default());
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
        for _ in 0..16 {
            let key = CipherKey::from(rng.gen::<[u32; 4]>());
            let blocks: [Block; 4] = core::array::from_fn(|_| Block::from(rng.gen::<[u32; 2]>()));

            let mut reused = [Block::default(); 4];
            for (i, b) in blocks.iter().enumerate() {
                let source = if i == 0 {
                    KeySource::Load(&key)
                } else {
                    KeySource::Reuse
                };
                reused[i] = accel
                    .submit(b, source, ModeSelect::Ecb, Direction::Encrypt)
                    .unwrap();
            }
            for (b, r) in blocks.iter().zip(reused) {
                let loaded = accel
                    .submit(b, KeySource::Load(&key), ModeSelect::Ecb, Direction::Encrypt)
                    .unwrap();
                assert_eq!(loaded, r);
            }
        }
    }

    #[test]
    fn test_timeout_marks_channel_desynchronized() {
        let mmio = board();
        let mut accel = accel(&mmio, WaitPolicy { max_polls: 50 });
        mmio.with_bus(|bus| bus.accel.set_stalled(true));

        let block = Block::default();
        assert_eq!(
            accel.submit(&block, KeySource::Load(&ZERO_KEY), ModeSelect::Ecb, Direction::Encrypt),
            Err(KhazadError::DRIVER_KHAZAD_ACCEL_TIMEOUT)
        );
        assert!(!accel.is_synchronized());
        assert_eq!(
            accel.submit(&block, KeySource::Load(&ZERO_KEY), ModeSelect::Ecb, Direction::Encrypt),
            Err(KhazadError::DRIVER_KHAZAD_HANDSHAKE_DESYNC)
        );

        mmio.with_bus(|bus| bus.accel.set_stalled(false));
        accel.reset();
        assert!(accel.is_synchronized());
        assert!(!accel.holds_key());
        assert_eq!(
            accel.submit(&block, KeySource::Load(&ZERO_KEY), ModeSelect::Ecb, Direction::Encrypt),
            Ok(Block::from([0x2325_d00fu32, 0x3e76_a22d]))
        );
    }

    #[test]
    fn test_operator_reset_detected() {
        let mmio = board();
        let mut accel = accel(&mmio, WaitPolicy::default());
        let block = Block::default();
        accel
            .submit(&block, KeySource::Load(&ZERO_KEY), ModeSelect::Ecb, Direction::Encrypt)
            .unwrap();

        mmio.with_bus(|bus| bus.press_reset_button());
        assert_eq!(
            accel.submit(&block, KeySource::Reuse, ModeSelect::Ecb, Direction::Encrypt),
            Err(KhazadError::DRIVER_KHAZAD_HANDSHAKE_DESYNC)
        );
        assert!(!accel.is_synchronized());

        accel.reset();
        assert_eq!(
            accel.submit(&block, KeySource::Reuse, ModeSelect::Ecb, Direction::Encrypt),
            Err(KhazadError::DRIVER_KHAZAD_NO_KEY)
        );
        assert_eq!(
            accel.submit(&block, KeySource::Load(&ZERO_KEY), ModeSelect::Ecb, Direction::Encrypt),
            Ok(Block::from([0x2325_d00fu32, 0x3e76_a22d]))
        );
    }

    #[test]
    fn test_reset_mid_operation() {
        let mmio = board();
        let mut accel = accel(&mmio, WaitPolicy { max_polls: 10 });
        // Reset lands while the first operation is still running.
        mmio.with_bus(|bus| bus.schedule_reset_in(15));
        assert_eq!(
            accel.submit(
                &Block::default(),
                KeySource::Load(&ZERO_KEY),
                ModeSelect::Ecb,
                Direction::Encrypt
            ),
            Err(KhazadError::DRIVER_KHAZAD_ACCEL_TIMEOUT)
        );
        accel.reset();
        accel.set_policy(WaitPolicy::default());
        assert!(accel
            .submit(
                &Block::default(),
                KeySource::Load(&ZERO_KEY),
                ModeSelect::Ecb,
                Direction::Encrypt
            )
            .is_ok());
    }
}
