//! Byte-driven MIDI message reassembly and dispatch.
//!
//! Every message on the wire starts with a status byte (top bit set):
//! - Upper nibble selects the message class (`0x8n`..=`0xFn`)
//! - Lower nibble is the channel (0-15)
//! - A fixed number of data bytes follows (top bit clear), except for the
//!   Extended class, which runs until the next status byte
//!
//! [`Decoder`] consumes bytes one at a time (directly, or by draining a
//! [`midirx_ring::Consumer`]) and invokes a [`MessageHandler`] exactly once
//! per completed message. No allocation happens on the decode path.

pub mod decoder;
pub mod error;
pub mod handler;
pub mod status;

pub use decoder::{
    DecodeStats, Decoder, DecoderConfig, RunningStatus, StatusPolicy, DEFAULT_MAX_PAYLOAD,
};
pub use error::{DecodeError, Result};
pub use handler::{Message, MessageHandler};
pub use status::{MessageClass, Status, EOX, PITCH_BEND_CENTER, SYSEX_START};
