//! The memory map of the machine: 40K of fixed RAM, a window of switchable
//! RAM banks and a window of switchable ROM banks. The active banks are
//! selected by writing to the first two bytes of fixed RAM.

use xmon::{BANKED_WINDOW_START, ROM_WINDOW_START};

/// Writing here selects the RAM bank mapped at 0xA000
pub const RAM_BANK_REG: u16 = 0x0000;

/// Writing here selects the ROM bank mapped at 0xC000
pub const ROM_BANK_REG: u16 = 0x0001;

pub const RAM_BANK_SIZE: usize = (ROM_WINDOW_START - BANKED_WINDOW_START) as usize;
pub const ROM_BANK_SIZE: usize = 0x10000 - ROM_WINDOW_START as usize;

/// What the data bus reads when nothing is mapped
const OPEN_BUS: u8 = 0xFF;

pub struct Board {
    fixed: Box<[u8]>,
    ram_banks: Box<[u8]>,
    rom_banks: Box<[u8]>,
}

impl Board {
    pub fn new(ram_bank_count: u16, rom_bank_count: u16) -> Board {
        Board {
            fixed: vec![0; BANKED_WINDOW_START as usize].into_boxed_slice(),
            ram_banks: vec![0; ram_bank_count as usize * RAM_BANK_SIZE].into_boxed_slice(),
            rom_banks: vec![0; rom_bank_count as usize * ROM_BANK_SIZE].into_boxed_slice(),
        }
    }

    pub fn ram_bank(&self) -> u8 {
        self.fixed[RAM_BANK_REG as usize]
    }

    pub fn rom_bank(&self) -> u8 {
        self.fixed[ROM_BANK_REG as usize]
    }

    pub fn ram_bank_count(&self) -> usize {
        self.ram_banks.len() / RAM_BANK_SIZE
    }

    pub fn rom_bank_count(&self) -> usize {
        self.rom_banks.len() / ROM_BANK_SIZE
    }

    /// Reads through the currently active banks
    pub fn read8(&self, addr: u16) -> u8 {
        self.read_banked(addr, self.bank_at(addr))
    }

    pub fn read16(&self, addr: u16) -> u16 {
        u16::from_le_bytes([self.read8(addr), self.read8(addr.wrapping_add(1))])
    }

    /// Reads `addr` as if `bank` was active. Outside of the banked windows,
    /// `bank` is ignored.
    pub fn read_banked(&self, addr: u16, bank: u8) -> u8 {
        if addr < BANKED_WINDOW_START {
            self.fixed[addr as usize]
        } else if addr < ROM_WINDOW_START {
            self.ram_banks
                .get(ram_offset(addr, bank))
                .copied()
                .unwrap_or(OPEN_BUS)
        } else {
            self.rom_banks
                .get(rom_offset(addr, bank))
                .copied()
                .unwrap_or(OPEN_BUS)
        }
    }

    /// Writes to ROM and to banks that don't exist are dropped
    pub fn write8(&mut self, addr: u16, val: u8) {
        if addr < BANKED_WINDOW_START {
            self.fixed[addr as usize] = val;
        } else if addr < ROM_WINDOW_START {
            if let Some(byte) = self.ram_banks.get_mut(ram_offset(addr, self.ram_bank())) {
                *byte = val;
            }
        } else {
            log::trace!("Ignoring write of {:#04X} to ROM at {:#06X}", val, addr);
        }
    }

    /// Patches ROM contents. The CPU can't do this, only the machine setup.
    pub fn write_rom(&mut self, bank: u8, addr: u16, val: u8) {
        if addr < ROM_WINDOW_START {
            return;
        }

        if let Some(byte) = self.rom_banks.get_mut(rom_offset(addr, bank)) {
            *byte = val;
        }
    }

    pub fn is_populated(&self, bank: u8, addr: u16) -> bool {
        if addr < BANKED_WINDOW_START {
            true
        } else if addr < ROM_WINDOW_START {
            (bank as usize) < self.ram_bank_count()
        } else {
            (bank as usize) < self.rom_bank_count()
        }
    }

    fn bank_at(&self, addr: u16) -> u8 {
        if addr < ROM_WINDOW_START {
            self.ram_bank()
        } else {
            self.rom_bank()
        }
    }
}

fn ram_offset(addr: u16, bank: u8) -> usize {
    bank as usize * RAM_BANK_SIZE + (addr - BANKED_WINDOW_START) as usize
}

fn rom_offset(addr: u16, bank: u8) -> usize {
    bank as usize * ROM_BANK_SIZE + (addr - ROM_WINDOW_START) as usize
}
