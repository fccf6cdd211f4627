use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::debug;

use crate::config::{LineConfig, LineDriver, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT};
use crate::error::{LineError, Result};

/// Port-level wait used when reads are configured to block indefinitely.
const BLOCKING_WAIT: Duration = Duration::from_secs(1);

/// A serial port configured as a raw 8N1 receive line.
///
/// Reads honor the configured `read_timeout`; an expired wait surfaces as
/// `ErrorKind::TimedOut`. With no timeout, reads block until data arrives.
pub struct SerialDevice {
    port: Box<dyn SerialPort>,
    path: PathBuf,
    read_timeout: Option<Duration>,
}

impl SerialDevice {
    /// Open a serial device for reading at the default line speed.
    ///
    /// Call [`configure_line`](crate::configure_line) before reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        ensure_terminal(&path)?;

        let port = serialport::new(path.to_string_lossy(), DEFAULT_BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(DEFAULT_READ_TIMEOUT)
            .open()
            .map_err(|err| LineError::Open {
                path: path.clone(),
                source: err.into(),
            })?;

        debug!(?path, "opened serial device");
        Ok(Self {
            port,
            path,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
        })
    }

    /// Path the device was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current read timeout. `None` blocks until data arrives.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }
}

impl LineDriver for SerialDevice {
    fn configure(&mut self, config: &LineConfig) -> Result<()> {
        self.port
            .set_baud_rate(config.baud_rate)
            .map_err(|err| baud_error(config.baud_rate, err))?;
        self.port
            .set_timeout(config.read_timeout.unwrap_or(BLOCKING_WAIT))?;

        // Discard anything received before the line was set up.
        self.port.clear(ClearBuffer::Input)?;

        self.read_timeout = config.read_timeout;
        debug!(
            path = ?self.path,
            baud_rate = config.baud_rate,
            read_timeout = ?self.read_timeout,
            "serial line configured"
        );
        Ok(())
    }
}

impl Read for SerialDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.port.read(buf) {
                Err(err) if err.kind() == io::ErrorKind::TimedOut && self.read_timeout.is_none() => {
                    continue
                }
                other => return other,
            }
        }
    }
}

impl std::fmt::Debug for SerialDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialDevice")
            .field("path", &self.path)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

/// Map a `set_baud_rate` failure; a refused rate becomes `UnsupportedBaud`.
fn baud_error(baud_rate: u32, err: serialport::Error) -> LineError {
    match err.kind() {
        serialport::ErrorKind::InvalidInput => LineError::UnsupportedBaud(baud_rate),
        _ => LineError::Serial(err),
    }
}

/// Reject paths that exist but are not terminals (files, `/dev/null`).
#[cfg(unix)]
fn ensure_terminal(path: &Path) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io::IsTerminal;
    use std::os::unix::fs::OpenOptionsExt;

    // O_NONBLOCK: do not wait for carrier.
    let file = OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
        .open(path)
        .map_err(|source| LineError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    if !file.is_terminal() {
        return Err(LineError::NotATerminal(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_terminal(_path: &Path) -> Result<()> {
    Ok(())
}
