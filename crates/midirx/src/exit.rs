use std::fmt;
use std::io;

use midirx_line::LineError;

pub const SUCCESS: i32 = 0;
/// Input file or device path not found.
pub const FAILURE: i32 = 1;
/// Device is not a serial line, or the port refused a control request.
pub const LINE_ERROR: i32 = 3;
/// Device or input file not readable by this user.
pub const PERMISSION_DENIED: i32 = 50;
/// `--hex` text that is not hex.
pub const DATA_INVALID: i32 = 60;
/// Baud rate zero or not accepted by the port.
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
/// Signal handler setup, ring claim or receive thread failure.
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn line_error(context: &str, err: LineError) -> CliError {
    match err {
        LineError::Open { source, .. } | LineError::Io(source) => io_error(context, source),
        LineError::InvalidBaud(_) | LineError::UnsupportedBaud(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        LineError::NotATerminal(_) | LineError::Serial(_) => {
            CliError::new(LINE_ERROR, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}
