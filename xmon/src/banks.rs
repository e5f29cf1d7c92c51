use crate::host::BankSource;

/// Start of the banked window. Everything below is fixed memory.
pub const BANKED_WINDOW_START: u16 = 0xA000;

/// Inside the banked window, RAM banks live below this address and ROM banks above
pub const ROM_WINDOW_START: u16 = 0xC000;

/// Decides which bank backs a displayed address.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BankResolver {
    banked_start: u16,
    rom_start: u16,
}

impl BankResolver {
    /// RAM banks at 0xA000 - 0xBFFF, ROM banks at 0xC000 - 0xFFFF
    pub const X16: BankResolver = BankResolver {
        banked_start: BANKED_WINDOW_START,
        rom_start: ROM_WINDOW_START,
    };

    /// Returns `None` if `rom_start` lies below `banked_start`
    pub fn new(banked_start: u16, rom_start: u16) -> Option<Self> {
        if rom_start < banked_start {
            return None;
        }

        Some(Self {
            banked_start,
            rom_start,
        })
    }

    pub fn is_banked(&self, addr: u16) -> bool {
        addr >= self.banked_start
    }

    /// The bank currently mapped at `addr`, or `None` for fixed memory
    pub fn resolve<B: BankSource + ?Sized>(&self, addr: u16, banks: &B) -> Option<u8> {
        if !self.is_banked(addr) {
            None
        } else if addr < self.rom_start {
            Some(banks.ram_bank())
        } else {
            Some(banks.rom_bank())
        }
    }
}

impl Default for BankResolver {
    fn default() -> Self {
        Self::X16
    }
}
