//! Keyboard input for the monitor. Reading a key blocks, so keys are read
//! on their own thread and handed to the monitor through a channel.

use console::{Key, Term};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use xmon::{Action, BreakHandle, InputEvent, InputSource, Zone};

pub const KEY_HELP: &str = "s step  n over  r run  b bp  h pc  x reset  +/- bank  t ram/vram  \
                            [ ] \\ code/data/none  up/down scroll  : cmd  esc break  q quit";

enum KeyCommand {
    Event(InputEvent),
    /// Only does something while the CPU is running
    Break,
    /// Read a command line
    Prompt,
    Ignore,
}

pub struct KeyInput {
    events: Receiver<InputEvent>,
    /// Shared with the key thread
    running: Arc<AtomicBool>,
    quit_pending: bool,
    consumed: usize,
}

impl KeyInput {
    pub fn spawn(break_handle: BreakHandle) -> KeyInput {
        let (sender, events) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(false));

        let thread_running = Arc::clone(&running);
        thread::spawn(move || {
            read_keys(&Term::stdout(), &sender, &break_handle, &thread_running)
        });

        KeyInput {
            events,
            running,
            quit_pending: false,
            consumed: 0,
        }
    }

    /// Call this with every status the monitor hands out. Keys pressed while
    /// the CPU runs are dropped, except for a quit.
    pub fn set_running(&mut self, running: bool) {
        self.running.store(running, Ordering::Relaxed);

        if running {
            while let Ok(evt) = self.events.try_recv() {
                if evt == InputEvent::Quit {
                    self.quit_pending = true;
                }
            }
        }
    }

    /// How many events the monitor has taken so far. The view uses this to
    /// find out whether it needs to redraw.
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl InputSource for KeyInput {
    fn next_event(&mut self) -> Option<InputEvent> {
        let evt = if self.quit_pending {
            self.quit_pending = false;
            InputEvent::Quit
        } else {
            self.events.next_event()?
        };

        self.consumed += 1;
        Some(evt)
    }
}

fn read_keys(
    term: &Term,
    sender: &Sender<InputEvent>,
    break_handle: &BreakHandle,
    running: &AtomicBool,
) {
    loop {
        let key = match term.read_key() {
            Ok(key) => key,
            Err(err) => {
                log::error!("Can't read keys from the terminal: {}", err);
                quit(sender, break_handle);
                return;
            }
        };

        let evt = match gate(map_key(&key), running.load(Ordering::Relaxed)) {
            KeyCommand::Event(InputEvent::Quit) => {
                quit(sender, break_handle);
                return;
            }
            KeyCommand::Event(evt) => evt,
            KeyCommand::Break => {
                break_handle.request();
                continue;
            }
            KeyCommand::Prompt => match prompt(term) {
                Some(line) => InputEvent::Command(line),
                None => continue,
            },
            KeyCommand::Ignore => continue,
        };

        if sender.send(evt).is_err() {
            // The monitor is gone
            return;
        }
    }
}

/// Input is only looked at while stopped, so quitting needs a break first
fn quit(sender: &Sender<InputEvent>, break_handle: &BreakHandle) {
    let _ = sender.send(InputEvent::Quit);
    break_handle.request();
}

fn prompt(term: &Term) -> Option<String> {
    let line = term.write_str(":").and_then(|_| term.read_line());

    match line {
        Ok(line) => Some(line),
        Err(err) => {
            log::warn!("Could not read command line: {}", err);
            None
        }
    }
}

/// While running only Esc and q get through. Esc is ignored while stopped,
/// so it doesn't move the code view back to the PC.
fn gate(cmd: KeyCommand, running: bool) -> KeyCommand {
    match cmd {
        KeyCommand::Event(InputEvent::Quit) => cmd,
        KeyCommand::Break if running => cmd,
        _ if running => KeyCommand::Ignore,
        KeyCommand::Break => KeyCommand::Ignore,
        _ => cmd,
    }
}

fn map_key(key: &Key) -> KeyCommand {
    use InputEvent as E;

    let evt = match key {
        Key::Escape => return KeyCommand::Break,
        Key::Char(':') => return KeyCommand::Prompt,

        Key::Char('s') => E::Action(Action::StepInto),
        Key::Char('n') => E::Action(Action::StepOver),
        Key::Char('r') => E::Action(Action::Run),
        Key::Char('b') => E::Action(Action::ToggleBreakpoint),
        Key::Char('h') => E::Action(Action::GoToPc),
        Key::Char('x') => E::Action(Action::ResetCpu),
        Key::Char('+') => E::Action(Action::BankNext),
        Key::Char('-') => E::Action(Action::BankPrev),
        Key::Char('t') => E::Action(Action::ToggleDataView),

        Key::Char('[') => E::Hover(Zone::Code),
        Key::Char(']') => E::Hover(Zone::Data),
        Key::Char('\\') => E::Hover(Zone::None),
        Key::ArrowUp => E::Wheel(1),
        Key::ArrowDown => E::Wheel(-1),

        Key::Char('q') => E::Quit,
        _ => return KeyCommand::Ignore,
    };

    KeyCommand::Event(evt)
}
