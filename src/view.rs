//! Plain text rendering of the monitor state while the CPU is stopped

use crate::machine::Machine;
use crate::terminal::KEY_HELP;
use console::{style, StyledObject, Term};
use std::io;
use xmon::{opcode, BankSource, DataView, Host, Monitor, Notice, ViewFlags, Zone};

const CODE_LINES: usize = 12;
const DATA_ROWS: u32 = 8;
const DATA_ROW_LEN: u32 = 16;
const NOTICE_LINES: usize = 6;
const FULL_CONSOLE_LINES: usize = 30;

/// Formats u8 as blue (value) and u16 as yellow (address)
pub trait FmtNum {
    fn fmt_val(self) -> StyledObject<String>;
}

impl FmtNum for u8 {
    fn fmt_val(self) -> StyledObject<String> {
        style(format!("{:02X}", self)).blue()
    }
}

impl FmtNum for u16 {
    fn fmt_val(self) -> StyledObject<String> {
        style(format!("${:04X}", self)).yellow()
    }
}

pub fn draw(term: &Term, monitor: &Monitor, machine: &Machine) -> io::Result<()> {
    let lines = if monitor.view_flags().contains(ViewFlags::FULL_CONSOLE) {
        notices(monitor, FULL_CONSOLE_LINES)
    } else {
        let mut lines = status(monitor, machine);
        lines.push(String::new());
        lines.extend(code(monitor, machine));
        lines.push(String::new());
        lines.extend(data(monitor, machine));
        lines.push(String::new());
        lines.extend(notices(monitor, NOTICE_LINES));
        lines
    };

    term.clear_screen()?;
    for line in lines {
        term.write_line(&line)?;
    }
    term.write_line(&style(KEY_HELP).dim().to_string())
}

fn title(text: &str, active: bool) -> String {
    if active {
        style(text).bold().underlined().to_string()
    } else {
        style(text).bold().to_string()
    }
}

fn status(monitor: &Monitor, machine: &Machine) -> Vec<String> {
    let reg = machine.registers();
    let pc_bank = match monitor.bank_resolver().resolve(reg.pc, machine) {
        Some(bank) => format!("{:02X}:", bank),
        None => String::new(),
    };

    let mut lines = vec![
        format!(
            "{} at {}{}{}",
            style("Stopped").red(),
            pc_bank,
            reg.pc.fmt_val(),
            if machine.is_halted() { " (halted)" } else { "" }
        ),
        format!(
            " A: {}  X: {}  Y: {}  SP: {}  Flags: {}",
            reg.a.fmt_val(),
            reg.x.fmt_val(),
            reg.y.fmt_val(),
            reg.sp.fmt_val(),
            style(format!("{:?}", reg.flags)).green()
        ),
        format!(
            " RAM bank: {}  ROM bank: {}",
            machine.ram_bank().fmt_val(),
            machine.rom_bank().fmt_val()
        ),
    ];

    let bps: Vec<String> = monitor
        .breakpoints()
        .iter()
        .map(|bp| bp.fmt_val().to_string())
        .collect();
    if !bps.is_empty() {
        lines.push(format!(" Breakpoints: {}", bps.join(" ")));
    }

    lines
}

fn code(monitor: &Monitor, machine: &Machine) -> Vec<String> {
    let cursor = monitor.cursor();
    let bank = cursor.code_bank().unwrap_or(0);
    let mut lines = vec![title("Code", monitor.zone() == Zone::Code)];
    let mut addr = cursor.code();

    for _ in 0..CODE_LINES {
        let marker = if addr == machine.pc() {
            style(">").green().to_string()
        } else if monitor.breakpoints().contains(addr) {
            style("*").red().to_string()
        } else {
            " ".to_owned()
        };

        let bank_str = match cursor.code_bank() {
            Some(bank) => format!("{:02X}:", bank),
            None => "   ".to_owned(),
        };

        if !machine.is_populated(bank, addr) {
            lines.push(format!("{} {}{} --", marker, bank_str, addr.fmt_val()));
            addr = addr.wrapping_add(1);
            continue;
        }

        let len = opcode::instruction_len(machine.peek(addr, bank)) as u16;
        let bytes: Vec<String> = (0..len)
            .map(|i| machine.peek(addr.wrapping_add(i), bank).fmt_val().to_string())
            .collect();

        lines.push(format!(
            "{} {}{} {}",
            marker,
            bank_str,
            addr.fmt_val(),
            bytes.join(" ")
        ));
        addr = addr.wrapping_add(len);
    }

    lines
}

fn data(monitor: &Monitor, machine: &Machine) -> Vec<String> {
    let cursor = monitor.cursor();
    let active = monitor.zone() == Zone::Data;

    match cursor.data_view() {
        DataView::Vram => vec![
            title("VRAM", active),
            format!(
                " {} this machine has no video memory",
                style(format!("${:05X}", cursor.data())).yellow()
            ),
        ],
        DataView::Ram => {
            let mut lines = vec![title(
                &format!("RAM (bank {:02X})", cursor.bank()),
                active,
            )];

            for row in 0..DATA_ROWS {
                let start = (cursor.data() + row * DATA_ROW_LEN) & 0xFFFF;
                let bytes: Vec<String> = (0..DATA_ROW_LEN)
                    .map(|i| {
                        let addr = ((start + i) & 0xFFFF) as u16;
                        if machine.is_populated(cursor.bank(), addr) {
                            machine.peek(addr, cursor.bank()).fmt_val().to_string()
                        } else {
                            "--".to_owned()
                        }
                    })
                    .collect();

                lines.push(format!(" {} {}", (start as u16).fmt_val(), bytes.join(" ")));
            }

            lines
        }
    }
}

fn notices(monitor: &Monitor, count: usize) -> Vec<String> {
    let mut lines: Vec<String> = monitor
        .notices()
        .rev()
        .take(count)
        .map(|notice| match notice {
            Notice::Echo(_) => style(notice.to_string()).dim().to_string(),
            Notice::Info(_) => notice.to_string(),
            Notice::Error(_) => style(notice.to_string()).red().to_string(),
        })
        .collect();

    lines.reverse();
    lines
}
