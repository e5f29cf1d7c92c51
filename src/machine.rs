//! A small banked 65C02 machine for the monitor to drive. It is laid out
//! like a Commander X16 (fixed RAM, RAM banks at 0xA000, ROM banks at
//! 0xC000), but has no video, sound or IO chips.

mod board;
mod cpu;

use board::Board;
use cpu::{Cpu, Registers, RESET_VECTOR};
use std::{fmt, fs, io, path::Path};
use xmon::{BankSource, Host, ReadMode, BANKED_WINDOW_START};

#[derive(Debug)]
pub enum LoadError {
    IoError(io::Error),

    /// A .prg file needs at least its 2-byte load address
    MissingHeader,

    /// The program would not fit into fixed RAM at its load address
    DoesNotFit { load_addr: u16, len: usize },
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        LoadError::IoError(e)
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::IoError(e) => write!(f, "{}", e),
            LoadError::MissingHeader => f.write_str("file is too short to contain a load address"),
            LoadError::DoesNotFit { load_addr, len } => write!(
                f,
                "{} bytes at {:#06X} don't fit below {:#06X}",
                len, load_addr, BANKED_WINDOW_START
            ),
        }
    }
}

impl std::error::Error for LoadError {}

pub struct Machine {
    cpu: Cpu,
    board: Board,
}

impl Machine {
    /// Both counts are clamped to 1 - 256, the range a bank register can address
    pub fn new(ram_bank_count: u16, rom_bank_count: u16) -> Machine {
        let clamp = |count: u16| count.max(1).min(0x100);

        Machine {
            cpu: Cpu::new(),
            board: Board::new(clamp(ram_bank_count), clamp(rom_bank_count)),
        }
    }

    /// Loads a program file. Without `load_addr` the file is expected to be
    /// a .prg file that starts with its little-endian load address, otherwise
    /// it is loaded as a raw binary. Returns where the program ended up.
    pub fn load_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        load_addr: Option<u16>,
    ) -> Result<u16, LoadError> {
        let data = fs::read(&path)?;

        match load_addr {
            Some(addr) => self.load(addr, &data).map(|_| addr),
            None => self.load_prg(&data),
        }
    }

    pub fn load_prg(&mut self, prg: &[u8]) -> Result<u16, LoadError> {
        if prg.len() < 2 {
            return Err(LoadError::MissingHeader);
        }

        let load_addr = u16::from_le_bytes([prg[0], prg[1]]);
        self.load(load_addr, &prg[2..])?;
        Ok(load_addr)
    }

    pub fn load(&mut self, load_addr: u16, data: &[u8]) -> Result<(), LoadError> {
        if load_addr as usize + data.len() > BANKED_WINDOW_START as usize {
            return Err(LoadError::DoesNotFit {
                load_addr,
                len: data.len(),
            });
        }

        for (offset, byte) in data.iter().enumerate() {
            self.board.write8(load_addr + offset as u16, *byte);
        }

        log::info!("Loaded {} bytes at {:#06X}", data.len(), load_addr);

        Ok(())
    }

    /// Points the reset vector of every ROM bank at `entry` and resets
    pub fn set_entry(&mut self, entry: u16) {
        let [lo, hi] = entry.to_le_bytes();

        for bank in 0..self.board.rom_bank_count() {
            self.board.write_rom(bank as u8, RESET_VECTOR, lo);
            self.board.write_rom(bank as u8, RESET_VECTOR + 1, hi);
        }

        self.cpu.reset(&self.board);
    }

    pub fn step_instr(&mut self) {
        self.cpu.step_instr(&mut self.board);
    }

    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    pub fn registers(&self) -> &Registers {
        &self.cpu.reg
    }

    /// Side-effect free read of `addr` in `bank`
    pub fn peek(&self, addr: u16, bank: u8) -> u8 {
        self.board.read_banked(addr, bank)
    }
}

impl BankSource for Machine {
    fn ram_bank(&self) -> u8 {
        self.board.ram_bank()
    }

    fn rom_bank(&self) -> u8 {
        self.board.rom_bank()
    }
}

impl Host for Machine {
    fn pc(&self) -> u16 {
        self.cpu.reg.pc
    }

    fn read(&mut self, addr: u16, mode: ReadMode, bank: u8) -> u8 {
        match mode {
            ReadMode::Execute => self.board.read8(addr),
            ReadMode::Peek => self.board.read_banked(addr, bank),
        }
    }

    fn is_populated(&self, bank: u8, addr: u16) -> bool {
        self.board.is_populated(bank, addr)
    }

    fn reset(&mut self) {
        self.cpu.reset(&self.board);
    }
}
