//! The contract between the monitor and the emulator it is attached to.
//! The monitor never owns the CPU or its memory; everything it needs is
//! read through [`Host`] at the moment it needs it.

/// How a memory read should be performed by the host
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReadMode {
    /// A read as the CPU would see it right now
    Execute,
    /// A side-effect free read for display purposes. Reads of IO registers
    /// must not acknowledge anything.
    Peek,
}

/// Provides the currently active RAM and ROM bank ids
pub trait BankSource {
    fn ram_bank(&self) -> u8;
    fn rom_bank(&self) -> u8;
}

/// Everything the monitor needs from the emulator
pub trait Host: BankSource {
    /// Address of the next instruction the CPU is going to execute
    fn pc(&self) -> u16;

    /// Reads a byte. `bank` is only meaningful for addresses inside a banked
    /// window; hosts are free to ignore it for `ReadMode::Execute`.
    fn read(&mut self, addr: u16, mode: ReadMode, bank: u8) -> u8;

    /// Whether `addr` in `bank` is backed by anything. Used only to show
    /// "no data" instead of garbage; the control logic never depends on it.
    fn is_populated(&self, bank: u8, addr: u16) -> bool {
        let _ = (bank, addr);
        true
    }

    /// Resets the CPU. Afterwards, [`Host::pc`] returns the new PC.
    fn reset(&mut self);
}

// Now, we implement the traits again for mutable references for caller convenience

impl<B: BankSource> BankSource for &mut B {
    fn ram_bank(&self) -> u8 {
        B::ram_bank(self)
    }

    fn rom_bank(&self) -> u8 {
        B::rom_bank(self)
    }
}

impl<H: Host> Host for &mut H {
    fn pc(&self) -> u16 {
        H::pc(self)
    }

    fn read(&mut self, addr: u16, mode: ReadMode, bank: u8) -> u8 {
        H::read(self, addr, mode, bank)
    }

    fn is_populated(&self, bank: u8, addr: u16) -> bool {
        H::is_populated(self, bank, addr)
    }

    fn reset(&mut self) {
        H::reset(self)
    }
}
