/*++

Licensed under the Apache-2.0 license.

File Name:

    khazad_pl.rs

Abstract:

    File contains the KHAZAD accelerator implemented in the programmable
    logic, as seen from the processing system over the AXI window.

--*/

use khazad_emu_bus::{
    ActionHandle, Bus, BusError, Clock, ReadOnlyRegister, ReadWriteRegister, Register, Timer,
};
use khazad_emu_crypto::{Khazad, KhazadMode};
use khazad_emu_types::{AccessSize, BusAddr, BusData};
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::register_bitfields;

register_bitfields! [
    u32,

    /// Control Register Fields
    Control [
        SEM OFFSET(0) NUMBITS(1) [],
        FIRST OFFSET(1) NUMBITS(1) [],
        CBC OFFSET(2) NUMBITS(1) [],
        ENC OFFSET(3) NUMBITS(1) [],
        ONLY_DATA OFFSET(4) NUMBITS(1) [],
        RST OFFSET(5) NUMBITS(1) [],
    ],

    /// Status Register Fields
    Status [
        ACK OFFSET(0) NUMBITS(1) [],
        BUSY OFFSET(1) NUMBITS(1) [],
    ],

    /// Data Direction Register Fields
    DataDir [
        DIR OFFSET(0) NUMBITS(1) [
            Input = 0,
            Output = 1,
        ],
    ],
];

/// Latency of the accelerator in clock cycles.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KhazadTiming {
    /// Cycles spent expanding a freshly sampled key
    pub key_schedule_ticks: u64,

    /// Cycles spent on one block
    pub crypt_ticks: u64,
}

impl Default for KhazadTiming {
    fn default() -> Self {
        Self {
            key_schedule_ticks: 18,
            crypt_ticks: 9,
        }
    }
}

/// Result computed at start, published on completion.
struct PendingOp {
    sem: bool,
    output: [u8; 8],
    next_chain: Option<[u8; 8]>,
}

/// KHAZAD accelerator peripheral
pub struct KhazadPl {
    /// Control register
    control: ReadWriteRegister<Control::Register>,

    /// Status register
    status: ReadOnlyRegister<Status::Register>,

    /// Data direction register
    data_dir: ReadWriteRegister<DataDir::Register>,

    /// Key registers
    key: [u32; 4],

    /// IV registers
    iv: [u32; 2],

    /// Input data latch
    data_in: [u32; 2],

    /// Result latch
    data_out: [u32; 2],

    /// Expanded key of the last sampled key
    khazad: Option<Khazad>,

    /// CBC chaining register
    chain: [u8; 8],

    pending: Option<PendingOp>,

    timer: Timer,

    op_complete_action: Option<ActionHandle>,

    timing: KhazadTiming,

    stalled: bool,
}

impl KhazadPl {
    const ADDR_CONTROL: BusAddr = 0x00;
    const ADDR_STATUS: BusAddr = 0x04;
    const ADDR_DATA_DIR: BusAddr = 0x08;
    const ADDR_KEY0: BusAddr = 0x10;
    const ADDR_KEY3: BusAddr = 0x1c;
    const ADDR_IV0: BusAddr = 0x20;
    const ADDR_IV1: BusAddr = 0x24;
    const ADDR_DATA0: BusAddr = 0x30;
    const ADDR_DATA1: BusAddr = 0x34;

    /// Size of the AXI window
    pub const MMAP_SIZE: BusAddr = 0x40;

    /// Create a new accelerator in its power-on state
    ///
    /// # Arguments
    ///
    /// * `clock` - Clock that drives the accelerator
    /// * `timing` - Operation latency
    pub fn new(clock: &Clock, timing: KhazadTiming) -> Self {
        Self {
            control: ReadWriteRegister::new(0),
            status: ReadOnlyRegister::new(0),
            data_dir: ReadWriteRegister::new(0),
            key: [0; 4],
            iv: [0; 2],
            data_in: [0; 2],
            data_out: [0; 2],
            khazad: None,
            chain: [0; 8],
            pending: None,
            timer: Timer::new(clock),
            op_complete_action: None,
            timing,
            stalled: false,
        }
    }

    /// When stalled, started operations never complete.
    pub fn set_stalled(&mut self, stalled: bool) {
        self.stalled = stalled;
    }

    pub fn is_busy(&self) -> bool {
        self.status.reg.is_set(Status::BUSY)
    }

    pub fn timing(&self) -> KhazadTiming {
        self.timing
    }

    fn output_selected(&self) -> bool {
        self.data_dir.reg.matches_all(DataDir::DIR::Output)
    }

    /// On Write callback for `control` register
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the write
    /// * `val` - Data to write
    ///
    /// # Error
    ///
    /// * `BusError` - Exception with cause `BusError::StoreAccessFault`
    fn on_write_control(&mut self, size: AccessSize, val: BusData) -> Result<(), BusError> {
        if size != AccessSize::Word {
            Err(BusError::StoreAccessFault)?
        }

        let prev_sem = self.control.reg.is_set(Control::SEM);
        self.control.reg.set(val);

        if self.control.reg.is_set(Control::RST) {
            log::trace!("khazad: reset");
            self.reset_engine();
            return Ok(());
        }

        let sem = self.control.reg.is_set(Control::SEM);
        if sem == prev_sem {
            return Ok(());
        }

        if self.is_busy() {
            log::warn!("khazad: start ignored while busy");
            return Ok(());
        }

        self.start(sem);
        Ok(())
    }

    /// Sample the inputs and schedule completion of a new operation.
    fn start(&mut self, sem: bool) {
        let mode = if self.control.reg.is_set(Control::ENC) {
            KhazadMode::Encrypt
        } else {
            KhazadMode::Decrypt
        };
        let cbc = self.control.reg.is_set(Control::CBC);

        let mut ticks = self.timing.crypt_ticks;
        if !self.control.reg.is_set(Control::ONLY_DATA) || self.khazad.is_none() {
            self.khazad = Some(Khazad::new(&words_to_bytes(&self.key)));
            ticks += self.timing.key_schedule_ticks;
        }
        let Some(khazad) = &self.khazad else {
            return;
        };

        if cbc && self.control.reg.is_set(Control::FIRST) {
            self.chain = words_to_bytes(&self.iv);
        }

        let input: [u8; 8] = words_to_bytes(&self.data_in);
        let (output, next_chain) = match (cbc, mode) {
            (false, _) => (khazad.crypt(mode, &input), None),
            (true, KhazadMode::Encrypt) => {
                let out = khazad.encrypt(&xor(&input, &self.chain));
                (out, Some(out))
            }
            (true, KhazadMode::Decrypt) => (xor(&khazad.decrypt(&input), &self.chain), Some(input)),
        };

        log::trace!(
            "khazad: start sem={} {:?} cbc={} in={:02x?} ({} ticks)",
            sem as u8,
            mode,
            cbc,
            input,
            ticks
        );

        self.pending = Some(PendingOp {
            sem,
            output,
            next_chain,
        });
        self.status.reg.modify(Status::BUSY::SET);
        if !self.stalled {
            self.op_complete_action = Some(self.timer.schedule_poll_in(ticks));
        }
    }

    /// Reset line: abandon the operation and forget all keyed state.
    fn reset_engine(&mut self) {
        if let Some(action) = self.op_complete_action.take() {
            self.timer.cancel(action);
        }
        self.pending = None;
        self.khazad = None;
        self.chain = [0; 8];
        self.data_out = [0; 2];
        self.status.reg.set(0);
    }
}

impl Bus for KhazadPl {
    /// Read data of specified size from given address
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the read
    /// * `addr` - Address to read from
    ///
    /// # Error
    ///
    /// * `BusError` - `BusError::LoadAccessFault` or `BusError::LoadAddrMisaligned`
    fn read(&mut self, size: AccessSize, addr: BusAddr) -> Result<BusData, BusError> {
        if addr & 3 != 0 {
            Err(BusError::LoadAddrMisaligned)?
        }
        match addr {
            Self::ADDR_CONTROL => self.control.read(size),
            Self::ADDR_STATUS => self.status.read(size),
            Self::ADDR_DATA_DIR => self.data_dir.read(size),
            a if (Self::ADDR_KEY0..=Self::ADDR_KEY3).contains(&a) => {
                self.key[word_index(a, Self::ADDR_KEY0)].read(size)
            }
            Self::ADDR_IV0 | Self::ADDR_IV1 => self.iv[word_index(addr, Self::ADDR_IV0)].read(size),
            Self::ADDR_DATA0 | Self::ADDR_DATA1 => {
                let idx = word_index(addr, Self::ADDR_DATA0);
                if self.output_selected() {
                    self.data_out[idx].read(size)
                } else {
                    self.data_in[idx].read(size)
                }
            }
            _ => Err(BusError::LoadAccessFault),
        }
    }

    /// Write data of specified size to given address
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the write
    /// * `addr` - Address to write
    /// * `val` - Data to write
    ///
    /// # Error
    ///
    /// * `BusError` - `BusError::StoreAccessFault` or `BusError::StoreAddrMisaligned`
    fn write(&mut self, size: AccessSize, addr: BusAddr, val: BusData) -> Result<(), BusError> {
        if addr & 3 != 0 {
            Err(BusError::StoreAddrMisaligned)?
        }
        match addr {
            Self::ADDR_CONTROL => self.on_write_control(size, val),
            Self::ADDR_STATUS => self.status.write(size, val),
            Self::ADDR_DATA_DIR => self.data_dir.write(size, val),
            a if (Self::ADDR_KEY0..=Self::ADDR_KEY3).contains(&a) => {
                self.key[word_index(a, Self::ADDR_KEY0)].write(size, val)
            }
            Self::ADDR_IV0 | Self::ADDR_IV1 => {
                self.iv[word_index(addr, Self::ADDR_IV0)].write(size, val)
            }
            Self::ADDR_DATA0 | Self::ADDR_DATA1 => {
                if size != AccessSize::Word {
                    Err(BusError::StoreAccessFault)?
                }
                // The pins are driven by the accelerator in output direction.
                if self.output_selected() {
                    log::trace!("khazad: data write {val:#x} ignored in output direction");
                    return Ok(());
                }
                self.data_in[word_index(addr, Self::ADDR_DATA0)].write(size, val)
            }
            _ => Err(BusError::StoreAccessFault),
        }
    }

    fn poll(&mut self) {
        if !self.timer.fired(&mut self.op_complete_action) {
            return;
        }
        if let Some(op) = self.pending.take() {
            self.data_out = bytes_to_words(&op.output);
            if let Some(chain) = op.next_chain {
                self.chain = chain;
            }
            self.status
                .reg
                .modify(Status::BUSY::CLEAR + Status::ACK.val(op.sem as u32));
            log::trace!("khazad: done sem={} out={:02x?}", op.sem as u8, op.output);
        }
    }

    fn warm_reset(&mut self) {
        log::trace!("khazad: operator reset");
        self.reset_engine();
        self.control.reg.set(0);
        self.data_dir.reg.set(0);
        self.key = [0; 4];
        self.iv = [0; 2];
        self.data_in = [0; 2];
    }
}

fn word_index(addr: BusAddr, base: BusAddr) -> usize {
    ((addr - base) / 4) as usize
}

fn words_to_bytes<const W: usize, const B: usize>(words: &[u32; W]) -> [u8; B] {
    let mut bytes = [0u8; B];
    for (chunk, word) in bytes.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    bytes
}

fn bytes_to_words(bytes: &[u8; 8]) -> [u32; 2] {
    [
        u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
    ]
}

fn xor(a: &[u8; 8], b: &[u8; 8]) -> [u8; 8] {
    let mut out = *a;
    out.iter_mut().zip(b).for_each(|(o, b)| *o ^= b);
    out
}
