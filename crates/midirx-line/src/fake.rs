//! In-memory line for tests and demos.
//!
//! Serves queued bytes through `Read`, then reports end of input. Records the
//! configuration it was given instead of touching hardware.

use std::collections::VecDeque;
use std::io::Read;

use tracing::debug;

use crate::config::{LineConfig, LineDriver};
use crate::error::{LineError, Result};

/// Fake line that replays queued bytes.
#[derive(Debug, Default)]
pub struct FakeLine {
    input: VecDeque<u8>,
    configured: Option<LineConfig>,
    /// Rates `configure` accepts. Empty accepts any rate.
    supported: Vec<u32>,
}

impl FakeLine {
    /// Create an empty fake line that accepts any rate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fake line preloaded with `bytes`.
    pub fn with_input(bytes: &[u8]) -> Self {
        let mut line = Self::new();
        line.queue_bytes(bytes);
        line
    }

    /// Restrict the rates `configure` accepts.
    pub fn with_supported_rates(mut self, rates: &[u32]) -> Self {
        self.supported = rates.to_vec();
        self
    }

    /// Queue bytes to be returned by `read`.
    pub fn queue_bytes(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    /// Configuration applied by the last successful `configure`.
    pub fn configured(&self) -> Option<&LineConfig> {
        self.configured.as_ref()
    }

    /// Bytes not yet read.
    pub fn pending(&self) -> usize {
        self.input.len()
    }
}

impl LineDriver for FakeLine {
    fn configure(&mut self, config: &LineConfig) -> Result<()> {
        if !self.supported.is_empty() && !self.supported.contains(&config.baud_rate) {
            return Err(LineError::UnsupportedBaud(config.baud_rate));
        }
        debug!(baud_rate = config.baud_rate, "fake line configured");
        self.configured = Some(*config);
        Ok(())
    }
}

impl Read for FakeLine {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf.len().min(self.input.len());
        for (slot, byte) in buf.iter_mut().zip(self.input.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}
