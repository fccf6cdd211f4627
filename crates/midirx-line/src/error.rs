use std::path::PathBuf;

/// Errors that can occur while setting up or reading a serial line.
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    /// The requested baud rate is zero.
    #[error("invalid baud rate {0}")]
    InvalidBaud(u32),

    /// The line driver cannot run at the requested baud rate.
    #[error("baud rate {0} not supported by this line")]
    UnsupportedBaud(u32),

    /// Failed to open the device.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The device exists but is not a terminal.
    #[error("{0} is not a terminal device")]
    NotATerminal(PathBuf),

    /// Ring handle could not be claimed.
    #[error("receive ring error: {0}")]
    Ring(#[from] midirx_ring::RingError),

    /// The serial port rejected a setting or failed a control request.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// An I/O error occurred on the line.
    #[error("line I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LineError>;
