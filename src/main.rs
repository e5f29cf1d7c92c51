mod machine;
mod terminal;
mod view;

use clap::Parser;
use console::Term;
use machine::Machine;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use terminal::KeyInput;
use xmon::{ExecutionMode, Host, Monitor, MonitorConfig, StartupScript, Status};

/// How long to wait for input before polling again while stopped
const PAUSE_SLEEP: Duration = Duration::from_millis(10);

#[derive(Parser)]
#[command(about = "A machine monitor for a banked 65C02 machine.")]
struct Args {
    /// Program to run. Unless --load-addr is given, this is a .prg file that
    /// starts with its 2-byte load address.
    program: PathBuf,

    /// Load the program as a raw binary at this address
    #[arg(short = 'a', long, value_parser = parse_cpu_addr)]
    load_addr: Option<u16>,

    /// Where execution starts. Defaults to the load address.
    #[arg(short, long, value_parser = parse_cpu_addr)]
    entry: Option<u16>,

    /// Number of 8K RAM banks mapped at $A000
    #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u16).range(1..=256))]
    ram_banks: u16,

    /// Number of 16K ROM banks mapped at $C000
    #[arg(long, default_value_t = 32, value_parser = clap::value_parser!(u16).range(1..=256))]
    rom_banks: u16,

    /// Set a breakpoint before starting. Can be given multiple times.
    #[arg(short = 'b', long = "bp", value_name = "ADDR")]
    breakpoints: Vec<String>,

    /// Run a monitor command before starting. Can be given multiple times.
    #[arg(short = 'c', long = "cmd", value_name = "COMMAND")]
    commands: Vec<String>,

    /// Start with the CPU stopped
    #[arg(short, long)]
    stop: bool,

    // Same syntax as RUST_LOG, e.g. '--log-level debug' or '--log-level xmon=debug'
    #[arg(short, long)]
    log_level: Option<String>,
}

fn parse_cpu_addr(arg: &str) -> Result<u16, String> {
    xmon::parse_cpu_addr(arg).map_err(|err| err.to_string())
}

fn main() {
    let args = Args::parse();

    // Set up the logger
    let mut logger = env_logger::Builder::from_default_env();
    if let Some(level) = &args.log_level {
        logger.parse_filters(level);
    }
    logger.init();

    let mut machine = Machine::new(args.ram_banks, args.rom_banks);

    let load_addr = machine
        .load_file(&args.program, args.load_addr)
        .unwrap_or_else(|err| {
            log::error!("Failed to load \"{}\": {}", args.program.display(), err);
            std::process::exit(1);
        });

    machine.set_entry(args.entry.unwrap_or(load_addr));

    let mut monitor = Monitor::with_config(MonitorConfig {
        start_mode: if args.stop {
            ExecutionMode::Stop
        } else {
            ExecutionMode::Run
        },
        ..MonitorConfig::default()
    });

    let script = StartupScript {
        commands: args.commands,
        breakpoints: args.breakpoints,
    };
    let failed = monitor.run_startup(&script);
    if failed > 0 {
        log::warn!("{} startup command(s) failed", failed);
    }

    let mut input = KeyInput::spawn(monitor.break_handle());

    run(&mut machine, &mut monitor, &mut input);
}

fn run(machine: &mut Machine, monitor: &mut Monitor, input: &mut KeyInput) {
    let term = Term::stdout();
    let mut redraw = true;
    let mut drawn_at = input.consumed();

    loop {
        match monitor.poll(machine, input) {
            Status::Continue => {
                input.set_running(true);

                if machine.is_halted() {
                    // Nothing left to execute, so show the user where we ended up
                    monitor.request_break();
                } else {
                    machine.step_instr();
                }

                redraw = true;
            }
            Status::Pause => {
                input.set_running(false);

                if redraw || input.consumed() != drawn_at {
                    if let Err(err) = view::draw(&term, monitor, machine) {
                        log::error!("Could not draw monitor: {}", err);
                    }

                    redraw = false;
                    drawn_at = input.consumed();
                }

                thread::sleep(PAUSE_SLEEP);
            }
            Status::Quit => {
                log::info!("Quitting at {:#06X}", machine.pc());
                break;
            }
        }
    }
}
