use midirx_ring::Consumer;
use tracing::{debug, trace};

use crate::handler::{Message, MessageHandler};
use crate::status::{MessageClass, Status, EOX, PITCH_BEND_CENTER};

/// Default payload capacity: 32 bytes. Caps Extended message growth.
pub const DEFAULT_MAX_PAYLOAD: usize = 32;

/// Whether a data byte after a completed message reuses the previous status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunningStatus {
    /// Every message needs its own status byte; extra data bytes are dropped.
    #[default]
    Disabled,
    /// A data byte after a completed channel message starts another message
    /// of the same class and channel. Extended messages never run.
    Enabled,
}

/// What happens to a partially received message when a status byte arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Drop the partial message without dispatch or error and start framing
    /// the new status immediately.
    #[default]
    AbandonOnNewStatus,
}

/// Configuration for the message decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecoderConfig {
    /// Running status mode. Default: disabled.
    pub running_status: RunningStatus,
    /// Handling of interrupted messages. Default: abandon.
    pub status_policy: StatusPolicy,
}

/// Framing counters. All counters wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeStats {
    /// Messages handed to the handler, SysEx included.
    pub dispatched: u32,
    /// Extended messages finalized.
    pub sysex: u32,
    /// Partial channel messages dropped because a new status byte arrived.
    pub abandoned: u32,
    /// Data bytes received with no message in progress.
    pub stray: u32,
    /// Extended payload bytes dropped past the payload capacity.
    pub truncated: u32,
}

/// Byte-driven MIDI message reassembler.
///
/// `P` is the payload capacity; it bounds Extended messages and must be at
/// least 2.
#[derive(Debug, Clone)]
pub struct Decoder<const P: usize = DEFAULT_MAX_PAYLOAD> {
    /// `None` before the first status byte and after an Extended message ends.
    status: Option<Status>,
    /// Data bytes still needed to complete the current message.
    remaining: usize,
    payload: [u8; P],
    /// Next payload slot to fill; equals the payload length so far.
    len: usize,
    /// Extended bytes dropped for the message in progress.
    overrun: usize,
    config: DecoderConfig,
    stats: DecodeStats,
}

impl<const P: usize> Decoder<P> {
    const CAPACITY: usize = {
        assert!(P >= 2, "Decoder payload capacity must be >= 2");
        P
    };

    /// Create a decoder with default configuration.
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    /// Create a decoder with explicit configuration.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            status: None,
            remaining: 0,
            payload: [0; P],
            len: 0,
            overrun: 0,
            config,
            stats: DecodeStats::default(),
        }
    }

    /// Advance the state machine by one byte, dispatching to `handler` if the
    /// byte completes a message.
    pub fn decode<H: MessageHandler + ?Sized>(&mut self, byte: u8, handler: &mut H) {
        match Status::try_from(byte) {
            Ok(status) => self.on_status(byte, status, handler),
            Err(_) => self.on_data(byte, handler),
        }
    }

    /// Decode every byte of `bytes` in order.
    pub fn decode_slice<H: MessageHandler + ?Sized>(&mut self, bytes: &[u8], handler: &mut H) {
        for &byte in bytes {
            self.decode(byte, handler);
        }
    }

    /// Pop and decode bytes until the ring reports empty.
    ///
    /// Returns the number of bytes consumed. Never waits for more input.
    pub fn drain<const N: usize, H: MessageHandler + ?Sized>(
        &mut self,
        consumer: &mut Consumer<'_, N>,
        handler: &mut H,
    ) -> usize {
        let mut consumed = 0usize;
        while let Some(byte) = consumer.dequeue() {
            self.decode(byte, handler);
            consumed += 1;
        }
        consumed
    }

    /// Forget any message in progress. Counters are kept.
    pub fn reset(&mut self) {
        self.status = None;
        self.remaining = 0;
        self.len = 0;
        self.overrun = 0;
    }

    /// Status of the message being framed, if any.
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    /// Data bytes still needed to complete the current message.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Payload bytes received so far for the current message.
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.len]
    }

    /// True when no message is in progress.
    pub fn is_idle(&self) -> bool {
        self.remaining == 0 && !self.in_extended()
    }

    /// Payload capacity in bytes.
    pub const fn capacity(&self) -> usize {
        P
    }

    /// Current decoder configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Framing counters since construction.
    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    fn in_extended(&self) -> bool {
        matches!(self.status, Some(s) if s.class == MessageClass::Extended)
    }

    fn on_status<H: MessageHandler + ?Sized>(&mut self, byte: u8, status: Status, handler: &mut H) {
        if self.in_extended() {
            self.finish_extended(handler);
            // EOX only terminates; it never opens another Extended message.
            if byte == EOX {
                return;
            }
        } else if self.remaining > 0 {
            match self.config.status_policy {
                StatusPolicy::AbandonOnNewStatus => {
                    self.stats.abandoned = self.stats.abandoned.wrapping_add(1);
                    trace!(
                        class = self.status.map(|s| s.class.name()),
                        received = self.len,
                        missing = self.remaining,
                        "abandoning partial message"
                    );
                }
            }
        }

        self.status = Some(status);
        self.remaining = status.class.data_len().unwrap_or(Self::CAPACITY);
        self.len = 0;
        self.overrun = 0;
    }

    fn on_data<H: MessageHandler + ?Sized>(&mut self, byte: u8, handler: &mut H) {
        let Some(status) = self.status else {
            self.drop_stray(byte);
            return;
        };

        if !status.class.is_channel_message() {
            if self.remaining == 0 {
                self.overrun += 1;
                self.stats.truncated = self.stats.truncated.wrapping_add(1);
            } else {
                self.push(byte);
            }
            return;
        }

        if self.remaining == 0 {
            match (self.config.running_status, status.class.data_len()) {
                (RunningStatus::Enabled, Some(len)) => {
                    self.remaining = len;
                    self.len = 0;
                }
                _ => {
                    self.drop_stray(byte);
                    return;
                }
            }
        }

        self.push(byte);
        if self.remaining == 0 {
            self.dispatch(status, handler);
        }
    }

    #[inline]
    fn push(&mut self, byte: u8) {
        self.payload[self.len] = byte;
        self.len += 1;
        self.remaining -= 1;
    }

    fn drop_stray(&mut self, byte: u8) {
        self.stats.stray = self.stats.stray.wrapping_add(1);
        trace!(byte, "dropping data byte with no message in progress");
    }

    fn dispatch<H: MessageHandler + ?Sized>(&mut self, status: Status, handler: &mut H) {
        let channel = status.channel;
        let data0 = self.payload[0];
        let data1 = self.payload[1];

        let message = match status.class {
            MessageClass::NoteOff => Message::NoteOff {
                channel,
                note: data0,
            },
            MessageClass::NoteOn if data1 == 0 => Message::NoteOff {
                channel,
                note: data0,
            },
            MessageClass::NoteOn => Message::NoteOn {
                channel,
                note: data0,
                velocity: data1,
            },
            MessageClass::PolyPressure => Message::PolyPressure {
                channel,
                note: data0,
                pressure: data1,
            },
            MessageClass::ControlChange => Message::ControlChange {
                channel,
                controller: data0,
                value: data1,
            },
            MessageClass::ProgramChange => Message::ProgramChange {
                channel,
                program: data0,
            },
            MessageClass::ChannelPressure => Message::ChannelPressure {
                channel,
                pressure: data0,
            },
            MessageClass::PitchBend => Message::PitchBend {
                channel,
                value: ((i16::from(data1) << 7) | i16::from(data0)) - PITCH_BEND_CENTER,
            },
            // Extended messages complete only in `finish_extended`.
            MessageClass::Extended => return,
        };

        self.stats.dispatched = self.stats.dispatched.wrapping_add(1);
        handler.on_message(message);
    }

    fn finish_extended<H: MessageHandler + ?Sized>(&mut self, handler: &mut H) {
        if self.overrun > 0 {
            debug!(
                captured = self.len,
                dropped = self.overrun,
                "extended message truncated to payload capacity"
            );
        }

        handler.on_message(Message::SysEx(&self.payload[..self.len]));

        self.stats.sysex = self.stats.sysex.wrapping_add(1);
        self.stats.dispatched = self.stats.dispatched.wrapping_add(1);
        self.reset();
    }
}

impl<const P: usize> Default for Decoder<P> {
    fn default() -> Self {
        Self::new()
    }
}
