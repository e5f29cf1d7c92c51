//! xmon is the platform-agnostic core of a machine monitor for banked 65C02
//! systems like the Commander X16. It decides, once per instruction, whether
//! the emulated CPU keeps running, waits for the user, or whether the whole
//! emulator should shut down. It doesn't draw anything or talk to input
//! devices itself; the frontend feeds it [`InputEvent`]s and renders whatever
//! it finds in the monitor state.
//!
//! The emulation loop stays in the hands of the host. Implement [`Host`] for
//! your emulator and call [`Monitor::poll`] before every instruction:
//!
//! ```ignore
//! fn run(machine: &mut Machine, input: &mut Receiver<InputEvent>) {
//!     let mut monitor = Monitor::new();
//!
//!     // Press a hotkey on another thread to get into the monitor
//!     install_hotkey(monitor.break_handle());
//!
//!     loop {
//!         match monitor.poll(machine, input) {
//!             Status::Continue => machine.step_instr(),
//!             Status::Pause => {
//!                 // Draw registers, disassembly at monitor.cursor().code(),
//!                 // memory at monitor.cursor().data() and the notices here.
//!                 // Don't execute anything.
//!             }
//!             Status::Quit => break,
//!         }
//!     }
//! }
//! ```

mod banks;
mod breakpoints;
mod command;
mod cursor;
mod error;
mod host;
mod input;
mod monitor;
mod notice;
pub mod opcode;

pub use banks::{BankResolver, BANKED_WINDOW_START, ROM_WINDOW_START};
pub use breakpoints::{BreakpointStore, MAX_BREAKPOINTS};
pub use command::{parse_addr, parse_cpu_addr, Command, StartupScript, COMMANDS};
pub use cursor::{Cursor, DataView, Zone};
pub use error::CommandError;
pub use host::{BankSource, Host, ReadMode};
pub use input::{Action, InputEvent, InputSource, NoInput};
pub use monitor::{BreakHandle, ExecutionMode, Monitor, MonitorConfig, Status, ViewFlags};
pub use notice::{Notice, NoticeLog, MAX_NOTICES_LOGGED};
