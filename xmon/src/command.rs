//! The textual command surface of the monitor. Commands are looked up in
//! [`COMMANDS`] by their first word, ignoring case; the first match wins.

use crate::cursor::DataView;
use crate::error::CommandError;
use crate::monitor::{Monitor, ViewFlags};
use crate::notice::Notice;

type Handler = fn(&mut Monitor, &[&str]) -> Result<(), CommandError>;

pub struct Command {
    pub name: &'static str,
    /// Arguments required after the name. With fewer, only the usage is shown.
    pub min_args: usize,
    pub usage: &'static str,
    pub help: &'static str,
    handler: Handler,
}

pub const COMMANDS: &[Command] = &[
    Command {
        name: "bp",
        min_args: 1,
        usage: "bp <address>",
        help: "toggle a breakpoint",
        handler: cmd_bp::toggle,
    },
    Command {
        name: "bpl",
        min_args: 0,
        usage: "bpl",
        help: "list breakpoints",
        handler: cmd_bp::list,
    },
    Command {
        name: "bpc",
        min_args: 0,
        usage: "bpc",
        help: "clear all breakpoints",
        handler: cmd_bp::clear,
    },
    Command {
        name: "d",
        min_args: 1,
        usage: "d <address>",
        help: "show code at address",
        handler: cmd_view::code,
    },
    Command {
        name: "m",
        min_args: 1,
        usage: "m <address>",
        help: "show RAM at address",
        handler: cmd_view::ram,
    },
    Command {
        name: "v",
        min_args: 1,
        usage: "v <address>",
        help: "show VRAM at address",
        handler: cmd_view::vram,
    },
    Command {
        name: "help",
        min_args: 0,
        usage: "help",
        help: "list commands",
        handler: help,
    },
];

pub fn find(name: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|cmd| cmd.name.eq_ignore_ascii_case(name))
}

/// Commands and breakpoints applied once when the monitor starts. Both go
/// through the exact same path as commands typed by the user.
#[derive(Debug, Clone, Default)]
pub struct StartupScript {
    pub commands: Vec<String>,
    /// Addresses, in any syntax `bp` accepts
    pub breakpoints: Vec<String>,
}

impl StartupScript {
    /// Every line this script will run, in order
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.commands.iter().cloned().chain(
            self.breakpoints
                .iter()
                .filter(|bp| !bp.trim().is_empty())
                .map(|bp| format!("bp {}", bp.trim())),
        )
    }
}

impl Monitor {
    /// Runs a command line as if it was typed into the monitor console.
    /// The line is echoed; failures end up in the notice log as well.
    pub fn execute(&mut self, line: &str) -> Result<(), CommandError> {
        self.notices.push(Notice::Echo(line.to_owned()));
        self.run_command(line)
    }

    /// Runs every line of `script`, echoing each one. Failing lines don't
    /// stop the script. Returns how many lines failed.
    pub fn run_startup(&mut self, script: &StartupScript) -> usize {
        let mut failed = 0;

        for line in script.lines() {
            log::info!("Startup: {}", line);
            if self.execute(&line).is_err() {
                failed += 1;
            }
        }

        failed
    }

    /// Toggles a breakpoint through the `bp` command, without echoing
    pub fn toggle_breakpoint(&mut self, addr: u16) -> Result<(), CommandError> {
        self.run_command(&format!("bp {:x}", addr))
    }

    fn run_command(&mut self, line: &str) -> Result<(), CommandError> {
        let argv: Vec<&str> = line.split_whitespace().collect();

        let (name, args) = match argv.split_first() {
            Some((name, args)) => (*name, args),
            None => {
                self.view.toggle(ViewFlags::FULL_CONSOLE);
                return Ok(());
            }
        };

        let result = match find(name) {
            Some(cmd) if args.len() < cmd.min_args => Err(CommandError::Usage(cmd.usage)),
            Some(cmd) => (cmd.handler)(self, args),
            None => Err(CommandError::Unknown(name.to_owned())),
        };

        if let Err(err) = &result {
            match err {
                CommandError::Usage(_) => self.notices.info(err.to_string()),
                _ => {
                    log::warn!("Command '{}' failed: {}", line, err);
                    self.notices.error(err.to_string());
                }
            }
        }

        result
    }
}

/// Accepts `$C000`, `c000`, the `0x` and `0o` prefixed literals and `%1010`
/// for binary. Anything unprefixed is hex, so `0b00` is `$0B00`.
pub fn parse_addr(arg: &str) -> Result<u32, CommandError> {
    let lower = arg.to_ascii_lowercase();

    let parsed = if lower.starts_with("0x") || lower.starts_with("0o") {
        parse_int::parse::<u32>(&lower).ok()
    } else if let Some(bits) = lower.strip_prefix('%') {
        parse_int::parse::<u32>(&format!("0b{}", bits)).ok()
    } else {
        let digits = lower.strip_prefix('$').unwrap_or(&lower);
        u32::from_str_radix(digits, 16).ok()
    };

    parsed.ok_or_else(|| CommandError::InvalidAddress(arg.to_owned()))
}

/// Like [`parse_addr`], but the address has to fit the CPU address space
pub fn parse_cpu_addr(arg: &str) -> Result<u16, CommandError> {
    let addr = parse_addr(arg)?;

    if addr > 0xFFFF {
        return Err(CommandError::InvalidAddress(arg.to_owned()));
    }

    Ok(addr as u16)
}

fn help(dbg: &mut Monitor, _args: &[&str]) -> Result<(), CommandError> {
    for cmd in COMMANDS {
        dbg.notices.info(format!("{:<14} {}", cmd.usage, cmd.help));
    }

    Ok(())
}

mod cmd_bp {
    use super::*;

    pub fn toggle(dbg: &mut Monitor, args: &[&str]) -> Result<(), CommandError> {
        let addr = parse_cpu_addr(args[0])?;

        if dbg.breakpoints.remove(addr) {
            dbg.notices.info(format!("Breakpoint removed at ${:04X}", addr));
        } else if dbg.breakpoints.add(addr) {
            dbg.notices.info(format!("Breakpoint set at ${:04X}", addr));
        } else {
            return Err(CommandError::BreakpointsFull(addr));
        }

        Ok(())
    }

    pub fn list(dbg: &mut Monitor, _args: &[&str]) -> Result<(), CommandError> {
        if dbg.breakpoints.is_empty() {
            dbg.notices.info("No breakpoints");
        }

        let lines: Vec<String> = dbg
            .breakpoints
            .iter()
            .enumerate()
            .map(|(idx, bp)| format!("BP{} ${:04X}", idx, bp))
            .collect();

        for line in lines {
            dbg.notices.info(line);
        }

        Ok(())
    }

    pub fn clear(dbg: &mut Monitor, _args: &[&str]) -> Result<(), CommandError> {
        dbg.breakpoints.clear();
        dbg.notices.info("All breakpoints cleared");
        Ok(())
    }
}

mod cmd_view {
    use super::*;

    pub fn code(dbg: &mut Monitor, args: &[&str]) -> Result<(), CommandError> {
        let addr = parse_cpu_addr(args[0])?;
        // The bank is looked up again on the next poll
        dbg.cursor.relocate(addr);
        Ok(())
    }

    pub fn ram(dbg: &mut Monitor, args: &[&str]) -> Result<(), CommandError> {
        let addr = parse_cpu_addr(args[0])?;
        dbg.cursor.show_data(DataView::Ram, addr as u32);
        Ok(())
    }

    pub fn vram(dbg: &mut Monitor, args: &[&str]) -> Result<(), CommandError> {
        let addr = parse_addr(args[0])?;

        if addr > DataView::Vram.addr_mask() {
            return Err(CommandError::InvalidAddress(args[0].to_owned()));
        }

        dbg.cursor.show_data(DataView::Vram, addr);
        Ok(())
    }
}
