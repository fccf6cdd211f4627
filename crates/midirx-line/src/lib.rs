//! Serial line boundary for midirx.
//!
//! This crate holds the three entry points the outside world calls:
//! - [`configure_line`]: one-time line setup, delegated to a [`LineDriver`]
//! - [`RxEntry::on_byte_received`]: called per received byte from the
//!   interrupt (or the [`RxPump`] thread standing in for it)
//! - [`MidiPort::drain_and_dispatch`]: called periodically from the main loop
//!
//! [`SerialDevice`] drives a real serial port through `serialport`.

pub mod config;
pub mod error;
pub mod fake;
pub mod port;
pub mod pump;
pub mod serial;

pub use config::{
    configure_line, configure_line_with_config, LineConfig, LineDriver, DEFAULT_BAUD_RATE,
    DEFAULT_READ_TIMEOUT, MIDI_BAUD_RATE,
};
pub use error::{LineError, Result};
pub use fake::FakeLine;
pub use port::{MidiPort, RxEntry};
pub use pump::{PumpStats, RxPump};
pub use serial::SerialDevice;
