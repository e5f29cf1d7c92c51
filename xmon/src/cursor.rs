//! Navigation state of the monitor: where the user is looking, as opposed
//! to where the CPU is executing.

use crate::banks::BankResolver;
use crate::host::BankSource;

/// Lines the code pane moves up per wheel notch
pub const CODE_SCROLL_LINES_UP: u16 = 3;

/// Bytes the data pane moves per wheel notch
pub const DATA_SCROLL_STEP: u32 = 0x200;

/// Which navigation pane last contained the pointer
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Zone {
    None,
    Code,
    Data,
}

impl Default for Zone {
    fn default() -> Self {
        Zone::None
    }
}

/// What the data pane shows
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataView {
    /// CPU address space (16 bit)
    Ram,
    /// Video memory (17 bit)
    Vram,
}

impl DataView {
    pub fn addr_mask(self) -> u32 {
        match self {
            DataView::Ram => 0xFFFF,
            DataView::Vram => 0x1FFFF,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            DataView::Ram => DataView::Vram,
            DataView::Vram => DataView::Ram,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Cursor {
    code: u16,
    /// Cached bank of `code`. `None` if not resolved yet or in fixed memory.
    code_bank: Option<u8>,
    data: u32,
    data_view: DataView,
    /// Bank used by the data pane, paged manually by the user
    bank: u8,
}

impl Cursor {
    pub fn new(code: u16) -> Self {
        Self {
            code,
            code_bank: None,
            data: 0,
            data_view: DataView::Ram,
            bank: 0,
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn code_bank(&self) -> Option<u8> {
        self.code_bank
    }

    pub fn data(&self) -> u32 {
        self.data
    }

    pub fn data_view(&self) -> DataView {
        self.data_view
    }

    pub fn bank(&self) -> u8 {
        self.bank
    }

    /// Moves the code cursor somewhere else entirely. The cached bank is
    /// dropped; see [`Cursor::resolve_bank`].
    pub fn relocate(&mut self, code: u16) {
        self.code = code;
        self.code_bank = None;
    }

    /// Moves the code cursor without touching the cached bank
    pub fn set_code(&mut self, code: u16) {
        self.code = code;
    }

    /// Resolves the bank of the code cursor if it isn't cached yet. Once
    /// resolved, it stays put until the next [`Cursor::relocate`], even if
    /// the active banks change.
    pub fn resolve_bank<B: BankSource + ?Sized>(&mut self, resolver: &BankResolver, banks: &B) {
        if self.code_bank.is_none() {
            self.code_bank = resolver.resolve(self.code, banks);
        }
    }

    pub fn scroll_code_up(&mut self) {
        self.code = self.code.wrapping_sub(CODE_SCROLL_LINES_UP);
    }

    /// `instr_len` is the encoded length of the instruction on the first line
    pub fn scroll_code_down(&mut self, instr_len: u8) {
        self.code = self.code.wrapping_add(instr_len as u16);
    }

    pub fn scroll_data_up(&mut self) {
        self.set_data(self.data.wrapping_sub(DATA_SCROLL_STEP));
    }

    pub fn scroll_data_down(&mut self) {
        self.set_data(self.data.wrapping_add(DATA_SCROLL_STEP));
    }

    /// Sets the data address, masked to the width of the current view
    pub fn set_data(&mut self, data: u32) {
        self.data = data & self.data_view.addr_mask();
    }

    pub fn show_data(&mut self, view: DataView, data: u32) {
        self.data_view = view;
        self.set_data(data);
    }

    pub fn toggle_data_view(&mut self) {
        self.show_data(self.data_view.toggled(), self.data);
    }

    pub fn next_bank(&mut self) {
        self.bank = self.bank.wrapping_add(1);
    }

    pub fn prev_bank(&mut self) {
        self.bank = self.bank.wrapping_sub(1);
    }
}
