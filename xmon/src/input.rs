//! Turns user input into monitor operations. Input is only ever looked at
//! while the monitor is not running, so a running emulation keeps the
//! keyboard to itself.

use crate::cursor::Zone;
use crate::host::{Host, ReadMode};
use crate::monitor::{Monitor, ViewFlags};
use crate::opcode;
use std::collections::VecDeque;
use std::sync::mpsc::Receiver;

/// Discrete control actions, usually bound to function keys
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    StepInto,
    StepOver,
    Run,
    /// Toggle a breakpoint at the code cursor
    ToggleBreakpoint,
    /// Move the code cursor back to the PC
    GoToPc,
    ResetCpu,
    BankNext,
    BankPrev,
    /// Switch the data pane between RAM and VRAM
    ToggleDataView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Action(Action),
    /// A line entered on the monitor console
    Command(String),
    /// The pointer moved, and is now over this pane
    Hover(Zone),
    /// Mouse wheel. Positive values scroll up.
    Wheel(i32),
    /// Whether the user currently wants to see the emulated screen
    ShowScreen(bool),
    Quit,
}

/// A non-blocking queue of input events. `next_event` must return `None`
/// right away when nothing is pending.
pub trait InputSource {
    fn next_event(&mut self) -> Option<InputEvent>;
}

impl InputSource for VecDeque<InputEvent> {
    fn next_event(&mut self) -> Option<InputEvent> {
        self.pop_front()
    }
}

impl InputSource for Receiver<InputEvent> {
    fn next_event(&mut self) -> Option<InputEvent> {
        self.try_recv().ok()
    }
}

impl<I: InputSource + ?Sized> InputSource for &mut I {
    fn next_event(&mut self) -> Option<InputEvent> {
        I::next_event(self)
    }
}

/// For hosts without any monitor input
pub struct NoInput;

impl InputSource for NoInput {
    fn next_event(&mut self) -> Option<InputEvent> {
        None
    }
}

pub(crate) enum Drained {
    Empty,
    Quit,
}

impl Monitor {
    /// Processes everything that is queued up. Stops early on quit.
    pub(crate) fn drain_input<H: Host, I: InputSource + ?Sized>(
        &mut self,
        host: &mut H,
        input: &mut I,
    ) -> Drained {
        while let Some(evt) = input.next_event() {
            match evt {
                InputEvent::Quit => return Drained::Quit,
                InputEvent::Action(action) => self.dispatch(host, action),
                InputEvent::Command(line) => {
                    // Errors already ended up in the notice log
                    let _ = self.execute(&line);
                }
                InputEvent::Hover(zone) => self.zone = zone,
                InputEvent::Wheel(dy) => self.scroll(host, dy),
                InputEvent::ShowScreen(show) => self.view.set(ViewFlags::SHOW_SCREEN, show),
            }
        }

        Drained::Empty
    }

    /// Performs a single action, as if its key was pressed while stopped
    pub fn dispatch<H: Host>(&mut self, host: &mut H, action: Action) {
        match action {
            Action::StepInto => self.step_into(),
            Action::StepOver => self.step_over(host),
            Action::Run => self.run(),
            Action::ToggleBreakpoint => {
                let _ = self.toggle_breakpoint(self.cursor.code());
            }
            Action::GoToPc => self.go_to_pc(&*host),
            Action::ResetCpu => self.reset_cpu(host),
            Action::BankNext => self.cursor.next_bank(),
            Action::BankPrev => self.cursor.prev_bank(),
            Action::ToggleDataView => self.cursor.toggle_data_view(),
        }
    }

    fn scroll<H: Host>(&mut self, host: &mut H, dy: i32) {
        if dy == 0 {
            return;
        }

        match self.zone {
            Zone::Code if dy > 0 => self.cursor.scroll_code_up(),
            Zone::Code => {
                let len = self.first_instruction_len(host);
                self.cursor.scroll_code_down(len);
            }
            Zone::Data if dy > 0 => self.cursor.scroll_data_up(),
            Zone::Data => self.cursor.scroll_data_down(),
            Zone::None => (),
        }
    }

    /// Length of the instruction shown on the first line of the code pane.
    /// Unpopulated memory is shown byte by byte.
    fn first_instruction_len<H: Host>(&self, host: &mut H) -> u8 {
        let addr = self.cursor.code();
        let bank = self.cursor.code_bank().unwrap_or(0);

        if host.is_populated(bank, addr) {
            opcode::instruction_len(host.read(addr, ReadMode::Peek, bank))
        } else {
            1
        }
    }
}
