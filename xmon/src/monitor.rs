use crate::banks::BankResolver;
use crate::breakpoints::BreakpointStore;
use crate::cursor::{Cursor, Zone};
use crate::host::{Host, ReadMode};
use crate::input::{Drained, InputSource};
use crate::notice::{Notice, NoticeLog};
use crate::opcode;
use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExecutionMode {
    /// The emulation advances freely
    Run,
    /// Execute exactly one instruction, then stop
    Step,
    /// Halted, waiting for the user
    Stop,
}

/// What the host loop should do after [`Monitor::poll`]. The numeric values
/// are those of the classic `-1 / 0 / 1` debugger status protocol.
#[derive(Debug, Copy, Clone, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i8)]
pub enum Status {
    /// Terminate the emulator
    Quit = -1,
    /// Execute one instruction, then poll again
    Continue = 0,
    /// Don't execute anything, just redraw and poll again
    Pause = 1,
}

bitflags! {
    /// Presentation state that is toggled through monitor input
    #[derive(Default)]
    pub struct ViewFlags: u8 {
        /// Console takes up the whole monitor window
        const FULL_CONSOLE = 0b_0000_0001;
        /// Show the emulated screen instead of the monitor
        const SHOW_SCREEN = 0b_0000_0010;
    }
}

/// Requests a break into the monitor from anywhere, including other threads.
/// The request is picked up by the next [`Monitor::poll`].
#[derive(Clone, Default)]
pub struct BreakHandle(Arc<AtomicBool>);

impl BreakHandle {
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

#[derive(Debug, Copy, Clone)]
pub struct MonitorConfig {
    /// Mode before the first poll. The monitor normally starts out of the way.
    pub start_mode: ExecutionMode,
    pub banks: BankResolver,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            start_mode: ExecutionMode::Run,
            banks: BankResolver::X16,
        }
    }
}

/// The execution controller. Call [`Monitor::poll`] from the emulation loop
/// *before* every instruction; it tells you whether to run, wait or quit.
pub struct Monitor {
    pub(crate) mode: ExecutionMode,
    pub(crate) cursor: Cursor,
    /// False until the first poll put the cursor on the PC
    pub(crate) cursor_synced: bool,
    pub(crate) breakpoints: BreakpointStore,
    /// One-shot break address armed by step-over
    pub(crate) step_over: Option<u16>,
    pub(crate) break_request: BreakHandle,
    pub(crate) resolver: BankResolver,
    pub(crate) zone: Zone,
    pub(crate) view: ViewFlags,
    pub(crate) notices: NoticeLog,
}

impl Monitor {
    pub fn new() -> Self {
        Self::with_config(MonitorConfig::default())
    }

    pub fn with_config(config: MonitorConfig) -> Self {
        Self {
            mode: config.start_mode,
            cursor: Cursor::new(0),
            cursor_synced: false,
            breakpoints: BreakpointStore::new(),
            step_over: None,
            break_request: BreakHandle::default(),
            resolver: config.banks,
            zone: Zone::None,
            view: ViewFlags::empty(),
            notices: NoticeLog::new(),
        }
    }

    /// Call this *before* the host executes an instruction, and only on an
    /// instruction boundary. Breakpoints are checked before any input is
    /// processed, so nothing the user does can swallow a break in the same poll.
    pub fn poll<H: Host, I: InputSource + ?Sized>(&mut self, host: &mut H, input: &mut I) -> Status {
        let pc = host.pc();

        if !self.cursor_synced {
            self.cursor.relocate(pc);
            self.cursor_synced = true;
        }

        if self.mode == ExecutionMode::Step {
            // The host executed exactly one instruction since the step was requested
            self.cursor.set_code(pc);
            self.stop();
        }

        if self.breakpoints.contains(pc) || self.step_over == Some(pc) {
            // Don't touch the cursor if we're already stopped, so the user can
            // scroll around while sitting on a breakpoint
            if self.mode != ExecutionMode::Stop {
                log::debug!("Hit breakpoint at {:#06X}", pc);
                self.cursor.set_code(pc);
            }
            self.stop();
        }

        if self.break_request.take() {
            log::debug!("Break requested at {:#06X}", pc);
            self.stop();
            self.cursor.set_code(pc);
        }

        self.cursor.resolve_bank(&self.resolver, &*host);

        if self.mode != ExecutionMode::Run {
            if let Drained::Quit = self.drain_input(host, input) {
                log::info!("Quit requested from the monitor");
                return Status::Quit;
            }
        }

        if self.mode == ExecutionMode::Stop {
            Status::Pause
        } else {
            Status::Continue
        }
    }

    /// Forces a stop on the next poll, with the cursor on the PC
    pub fn request_break(&mut self) {
        self.break_request.request();
    }

    /// A handle that can request a break without access to the monitor itself
    pub fn break_handle(&self) -> BreakHandle {
        self.break_request.clone()
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn breakpoints(&self) -> &BreakpointStore {
        &self.breakpoints
    }

    /// The return address step-over is waiting for, if any
    pub fn step_over_target(&self) -> Option<u16> {
        self.step_over
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn view_flags(&self) -> ViewFlags {
        self.view
    }

    pub fn bank_resolver(&self) -> &BankResolver {
        &self.resolver
    }

    pub fn notices(&self) -> impl DoubleEndedIterator<Item = &Notice> {
        self.notices.iter()
    }

    /// Hands all pending notices to the caller
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain().collect()
    }

    pub fn step_into(&mut self) {
        self.mode = ExecutionMode::Step;
    }

    /// Runs until the instruction after the current one if it is a JSR,
    /// otherwise behaves exactly like [`Monitor::step_into`]. Breakpoints
    /// inside the called subroutine still fire.
    pub fn step_over<H: Host>(&mut self, host: &mut H) {
        let pc = host.pc();
        let opcode = host.read(pc, ReadMode::Execute, 0);

        if opcode::is_call(opcode) {
            let target = pc.wrapping_add(opcode::JSR_LEN);
            log::debug!("Stepping over JSR at {:#06X}, breaking at {:#06X}", pc, target);
            self.step_over = Some(target);
            self.mode = ExecutionMode::Run;
        } else {
            self.mode = ExecutionMode::Step;
        }
    }

    pub fn run(&mut self) {
        self.mode = ExecutionMode::Run;
    }

    /// Puts the cursor back on the PC and looks up its bank again
    pub fn go_to_pc<H: Host>(&mut self, host: &H) {
        self.cursor.relocate(host.pc());
        self.cursor.resolve_bank(&self.resolver, host);
    }

    /// Resets the CPU. The cursor follows the new PC, its bank is looked up
    /// on the next poll.
    pub fn reset_cpu<H: Host>(&mut self, host: &mut H) {
        host.reset();
        log::info!("CPU reset, PC is now {:#06X}", host.pc());
        self.cursor.relocate(host.pc());
    }

    /// Halts and disarms step-over. Every way into STOP goes through here.
    fn stop(&mut self) {
        self.mode = ExecutionMode::Stop;
        self.step_over = None;
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::test_host::FakeHost;
    use crate::input::{Action, InputEvent, NoInput};
    use std::collections::VecDeque;
    use std::convert::TryFrom;

    fn stopped_at(pc: u16) -> (Monitor, FakeHost) {
        let mut host = FakeHost::new(pc);
        let mut monitor = Monitor::new();
        monitor.request_break();
        assert_eq!(monitor.poll(&mut host, &mut NoInput), Status::Pause);
        (monitor, host)
    }

    fn queue(events: Vec<InputEvent>) -> VecDeque<InputEvent> {
        events.into_iter().collect()
    }

    #[test]
    fn status_codes() {
        assert_eq!(i8::from(Status::Quit), -1);
        assert_eq!(i8::from(Status::Continue), 0);
        assert_eq!(i8::from(Status::Pause), 1);
        assert_eq!(Status::try_from(1i8).ok(), Some(Status::Pause));
        assert!(Status::try_from(2i8).is_err());
    }

    #[test]
    fn resolver_comes_from_config() {
        let mut host = FakeHost::new(0x0801);
        host.ram_bank = 7;
        host.rom_bank = 2;

        let monitor = Monitor::with_config(MonitorConfig {
            banks: BankResolver::new(0x8000, 0xE000).unwrap(),
            ..MonitorConfig::default()
        });

        assert_eq!(monitor.bank_resolver().resolve(0x7FFF, &host), None);
        assert_eq!(monitor.bank_resolver().resolve(0x9000, &host), Some(7));
        assert_eq!(monitor.bank_resolver().resolve(0xE000, &host), Some(2));
        assert_eq!(Monitor::new().bank_resolver().resolve(0x9000, &host), None);
    }

    #[test]
    fn runs_freely_without_breakpoints() {
        let mut host = FakeHost::new(0x0801);
        let mut monitor = Monitor::new();

        for pc in 0x0801..0x0900 {
            host.pc = pc;
            assert_eq!(monitor.poll(&mut host, &mut NoInput), Status::Continue);
        }
        assert_eq!(monitor.mode(), ExecutionMode::Run);
    }

    #[test]
    fn first_poll_puts_cursor_on_pc() {
        let mut host = FakeHost::new(0x0801);
        let mut monitor = Monitor::new();

        monitor.poll(&mut host, &mut NoInput);
        host.pc = 0x0900;
        monitor.poll(&mut host, &mut NoInput);

        assert_eq!(monitor.cursor().code(), 0x0801);
    }

    #[test]
    fn breakpoint_stops() {
        let mut host = FakeHost::new(0x8100);
        let mut monitor = Monitor::new();
        monitor.breakpoints.add(0x810D);

        assert_eq!(monitor.poll(&mut host, &mut NoInput), Status::Continue);

        host.pc = 0x810D;
        assert_eq!(monitor.poll(&mut host, &mut NoInput), Status::Pause);
        assert_eq!(monitor.mode(), ExecutionMode::Stop);
        assert_eq!(monitor.cursor().code(), 0x810D);
    }

    #[test]
    fn scrolling_while_on_breakpoint_sticks() {
        let mut host = FakeHost::new(0x810D);
        let mut monitor = Monitor::new();
        monitor.breakpoints.add(0x810D);
        monitor.poll(&mut host, &mut NoInput);

        let mut input = queue(vec![InputEvent::Hover(Zone::Code), InputEvent::Wheel(1)]);
        monitor.poll(&mut host, &mut input);
        assert_eq!(monitor.cursor().code(), 0x810A);

        // Still sitting on the breakpoint, but the cursor stays where the user put it
        assert_eq!(monitor.poll(&mut host, &mut NoInput), Status::Pause);
        assert_eq!(monitor.cursor().code(), 0x810A);
    }

    #[test]
    fn step_into_executes_one_instruction() {
        let (mut monitor, mut host) = stopped_at(0x0801);

        let mut input = queue(vec![InputEvent::Action(Action::StepInto)]);
        assert_eq!(monitor.poll(&mut host, &mut input), Status::Continue);
        assert_eq!(monitor.mode(), ExecutionMode::Step);

        // The host executes one instruction
        host.pc = 0x0802;
        assert_eq!(monitor.poll(&mut host, &mut NoInput), Status::Pause);
        assert_eq!(monitor.mode(), ExecutionMode::Stop);
        assert_eq!(monitor.cursor().code(), 0x0802);
    }

    #[test]
    fn step_over_jsr_runs_to_return_address() {
        let (mut monitor, mut host) = stopped_at(0x0810);
        host.poke(0x0810, &[0x20, 0x00, 0x09]); // JSR $0900

        let mut input = queue(vec![InputEvent::Action(Action::StepOver)]);
        assert_eq!(monitor.poll(&mut host, &mut input), Status::Continue);
        assert_eq!(monitor.step_over_target(), Some(0x0813));
        assert_eq!(monitor.mode(), ExecutionMode::Run);

        for pc in &[0x0900, 0x0901, 0x0902] {
            host.pc = *pc;
            assert_eq!(monitor.poll(&mut host, &mut NoInput), Status::Continue);
        }

        host.pc = 0x0813;
        assert_eq!(monitor.poll(&mut host, &mut NoInput), Status::Pause);
        assert_eq!(monitor.mode(), ExecutionMode::Stop);
        assert_eq!(monitor.step_over_target(), None);
        assert_eq!(monitor.cursor().code(), 0x0813);
    }

    #[test]
    fn step_over_anything_else_is_a_single_step() {
        let (mut monitor, mut host) = stopped_at(0x0810);
        host.poke(0x0810, &[0x4C, 0x00, 0x09]); // JMP $0900

        let mut input = queue(vec![InputEvent::Action(Action::StepOver)]);
        assert_eq!(monitor.poll(&mut host, &mut input), Status::Continue);
        assert_eq!(monitor.step_over_target(), None);
        assert_eq!(monitor.mode(), ExecutionMode::Step);

        host.pc = 0x0900;
        assert_eq!(monitor.poll(&mut host, &mut NoInput), Status::Pause);
        assert_eq!(monitor.cursor().code(), 0x0900);
    }

    #[test]
    fn breakpoint_inside_stepped_over_subroutine_fires() {
        let (mut monitor, mut host) = stopped_at(0x0810);
        host.poke(0x0810, &[0x20, 0x00, 0x09]);
        monitor.breakpoints.add(0x0901);

        let mut input = queue(vec![InputEvent::Action(Action::StepOver)]);
        monitor.poll(&mut host, &mut input);

        host.pc = 0x0900;
        assert_eq!(monitor.poll(&mut host, &mut NoInput), Status::Continue);
        host.pc = 0x0901;
        assert_eq!(monitor.poll(&mut host, &mut NoInput), Status::Pause);
        assert_eq!(monitor.step_over_target(), None);
    }

    #[test]
    fn step_over_target_wraps() {
        let (mut monitor, mut host) = stopped_at(0xFFFE);
        host.poke(0xFFFE, &[0x20]);

        monitor.step_over(&mut host);
        assert_eq!(monitor.step_over_target(), Some(0x0001));
    }

    #[test]
    fn run_resumes() {
        let (mut monitor, mut host) = stopped_at(0x0801);

        let mut input = queue(vec![InputEvent::Action(Action::Run)]);
        assert_eq!(monitor.poll(&mut host, &mut input), Status::Continue);
        assert_eq!(monitor.mode(), ExecutionMode::Run);
    }

    #[test]
    fn break_request_through_handle() {
        let mut host = FakeHost::new(0x0801);
        let mut monitor = Monitor::new();
        monitor.poll(&mut host, &mut NoInput);

        let handle = monitor.break_handle();
        std::thread::spawn(move || handle.request())
            .join()
            .unwrap();
        assert!(monitor.break_handle().is_pending());

        host.pc = 0x0A00;
        assert_eq!(monitor.poll(&mut host, &mut NoInput), Status::Pause);
        assert_eq!(monitor.cursor().code(), 0x0A00);
        assert!(!monitor.break_handle().is_pending());
    }

    #[test]
    fn break_request_disarms_step_over() {
        let (mut monitor, mut host) = stopped_at(0x0810);
        host.poke(0x0810, &[0x20, 0x00, 0x09]);
        monitor.step_over(&mut host);

        host.pc = 0x0900;
        monitor.request_break();
        assert_eq!(monitor.poll(&mut host, &mut NoInput), Status::Pause);
        assert_eq!(monitor.step_over_target(), None);
    }

    #[test]
    fn input_is_ignored_while_running() {
        let mut host = FakeHost::new(0x0801);
        let mut monitor = Monitor::new();

        let mut input = queue(vec![InputEvent::Quit]);
        assert_eq!(monitor.poll(&mut host, &mut input), Status::Continue);
        assert_eq!(input.len(), 1);
    }

    #[test]
    fn quit_while_stopped() {
        let (mut monitor, mut host) = stopped_at(0x0801);

        let mut input = queue(vec![
            InputEvent::Quit,
            InputEvent::Action(Action::Run),
        ]);
        assert_eq!(monitor.poll(&mut host, &mut input), Status::Quit);
    }

    #[test]
    fn start_stopped() {
        let mut host = FakeHost::new(0x0801);
        let mut monitor = Monitor::with_config(MonitorConfig {
            start_mode: ExecutionMode::Stop,
            ..MonitorConfig::default()
        });

        assert_eq!(monitor.poll(&mut host, &mut NoInput), Status::Pause);
        assert_eq!(monitor.cursor().code(), 0x0801);
    }

    #[test]
    fn cursor_bank_resolves_lazily_and_sticks() {
        let mut host = FakeHost::new(0xA010);
        host.ram_bank = 2;
        let mut monitor = Monitor::new();
        monitor.poll(&mut host, &mut NoInput);
        assert_eq!(monitor.cursor().code_bank(), Some(2));

        host.ram_bank = 5;
        monitor.poll(&mut host, &mut NoInput);
        assert_eq!(monitor.cursor().code_bank(), Some(2));

        monitor.go_to_pc(&host);
        assert_eq!(monitor.cursor().code_bank(), Some(5));
    }

    #[test]
    fn reset_follows_new_pc() {
        let (mut monitor, mut host) = stopped_at(0x0801);
        host.reset_pc = 0xE000;
        host.rom_bank = 3;

        let mut input = queue(vec![InputEvent::Action(Action::ResetCpu)]);
        assert_eq!(monitor.poll(&mut host, &mut input), Status::Pause);
        assert_eq!(host.resets, 1);
        assert_eq!(monitor.cursor().code(), 0xE000);
        assert_eq!(monitor.cursor().code_bank(), None);

        monitor.poll(&mut host, &mut NoInput);
        assert_eq!(monitor.cursor().code_bank(), Some(3));
    }
}
