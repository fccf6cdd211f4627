use std::time::Duration;

use tracing::info;

use crate::error::{LineError, Result};

/// Default line speed: 38400 baud, the rate serial-to-MIDI bridges run at.
pub const DEFAULT_BAUD_RATE: u32 = 38_400;

/// Native MIDI DIN line speed.
pub const MIDI_BAUD_RATE: u32 = 31_250;

/// Default bound on a single blocking read: 100 ms.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Line parameters. Framing is always 8 data bits, no parity, 1 stop bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineConfig {
    /// Line speed in baud. Default: 38400.
    pub baud_rate: u32,
    /// Upper bound on a blocking read before it reports `TimedOut`.
    /// `None` blocks until data arrives.
    pub read_timeout: Option<Duration>,
}

impl LineConfig {
    /// Configuration for the given speed with default timeouts.
    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Self::default()
        }
    }

    /// Reject settings no driver can honor.
    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            return Err(LineError::InvalidBaud(self.baud_rate));
        }
        Ok(())
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
        }
    }
}

/// Hardware side of line setup: clocks, divisors, termios, whatever the
/// platform needs to start delivering bytes at `config.baud_rate`.
pub trait LineDriver {
    fn configure(&mut self, config: &LineConfig) -> Result<()>;
}

/// Configure a line at `baud_rate` with default settings.
pub fn configure_line<D: LineDriver + ?Sized>(driver: &mut D, baud_rate: u32) -> Result<LineConfig> {
    configure_line_with_config(driver, LineConfig::new(baud_rate))
}

/// Configure a line with explicit settings.
pub fn configure_line_with_config<D: LineDriver + ?Sized>(
    driver: &mut D,
    config: LineConfig,
) -> Result<LineConfig> {
    config.validate()?;
    driver.configure(&config)?;
    info!(baud_rate = config.baud_rate, "line configured");
    Ok(config)
}
