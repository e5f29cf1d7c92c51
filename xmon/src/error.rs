use std::fmt;

/// Why a monitor command did not do anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// No command with that name exists
    Unknown(String),

    /// Too few arguments. Contains the usage line of the command.
    Usage(&'static str),

    /// An argument could not be parsed as an address
    InvalidAddress(String),

    /// Every breakpoint slot is taken and the address isn't one of them
    BreakpointsFull(u16),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Unknown(_) => f.write_str("unknown command"),
            CommandError::Usage(usage) => write!(f, "usage: {}", usage),
            CommandError::InvalidAddress(arg) => write!(f, "invalid address '{}'", arg),
            CommandError::BreakpointsFull(addr) => {
                write!(f, "no free breakpoint slot for ${:04X}", addr)
            }
        }
    }
}

impl std::error::Error for CommandError {}
