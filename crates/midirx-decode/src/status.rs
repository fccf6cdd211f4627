//! Status byte classification.
//!
//! Status bytes `0x80..=0xEF` carry a channel in the low nibble. `0xF0..=0xFF`
//! all map to the Extended class.

use crate::error::{DecodeError, Result};

/// Top bit marking a status byte.
pub const STATUS_BIT: u8 = 0x80;

/// Start of a system-exclusive (Extended) message.
pub const SYSEX_START: u8 = 0xF0;

/// End of exclusive. Consumed when it terminates an Extended message.
pub const EOX: u8 = 0xF7;

/// Midpoint of the 14-bit pitch bend range.
pub const PITCH_BEND_CENTER: i16 = 0x2000;

/// Message class selected by the upper nibble of a status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageClass {
    /// `0x8n`, 2 data bytes.
    NoteOff = 0,
    /// `0x9n`, 2 data bytes.
    NoteOn = 1,
    /// `0xAn`, 2 data bytes.
    PolyPressure = 2,
    /// `0xBn`, 2 data bytes.
    ControlChange = 3,
    /// `0xCn`, 1 data byte.
    ProgramChange = 4,
    /// `0xDn`, 1 data byte.
    ChannelPressure = 5,
    /// `0xEn`, 2 data bytes.
    PitchBend = 6,
    /// `0xFn`, variable length, terminated by the next status byte.
    Extended = 7,
}

/// Data bytes per class, indexed by `(status >> 4) - 8`. Extended has no
/// fixed length and is bounded by the decoder's payload capacity instead.
const DATA_LENGTH: [Option<usize>; 8] = [
    /* 0x8n NoteOff         */ Some(2),
    /* 0x9n NoteOn          */ Some(2),
    /* 0xAn PolyPressure    */ Some(2),
    /* 0xBn ControlChange   */ Some(2),
    /* 0xCn ProgramChange   */ Some(1),
    /* 0xDn ChannelPressure */ Some(1),
    /* 0xEn PitchBend       */ Some(2),
    /* 0xFn Extended        */ None,
];

const CLASSES: [MessageClass; 8] = [
    MessageClass::NoteOff,
    MessageClass::NoteOn,
    MessageClass::PolyPressure,
    MessageClass::ControlChange,
    MessageClass::ProgramChange,
    MessageClass::ChannelPressure,
    MessageClass::PitchBend,
    MessageClass::Extended,
];

impl MessageClass {
    /// Number of data bytes that complete a message of this class.
    ///
    /// Returns `None` for [`MessageClass::Extended`].
    pub fn data_len(self) -> Option<usize> {
        DATA_LENGTH[self as usize]
    }

    /// True for every class except Extended.
    pub fn is_channel_message(self) -> bool {
        self != MessageClass::Extended
    }

    /// Returns a human-readable name for the class.
    pub fn name(self) -> &'static str {
        match self {
            MessageClass::NoteOff => "NOTE_OFF",
            MessageClass::NoteOn => "NOTE_ON",
            MessageClass::PolyPressure => "POLY_PRESSURE",
            MessageClass::ControlChange => "CONTROL_CHANGE",
            MessageClass::ProgramChange => "PROGRAM_CHANGE",
            MessageClass::ChannelPressure => "CHANNEL_PRESSURE",
            MessageClass::PitchBend => "PITCH_BEND",
            MessageClass::Extended => "EXTENDED",
        }
    }
}

/// A classified status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status {
    pub class: MessageClass,
    /// Low nibble of the status byte.
    pub channel: u8,
}

impl TryFrom<u8> for Status {
    type Error = DecodeError;

    fn try_from(byte: u8) -> Result<Self> {
        if !is_status_byte(byte) {
            return Err(DecodeError::NotAStatusByte(byte));
        }
        Ok(Self {
            class: CLASSES[usize::from((byte >> 4) - 8)],
            channel: byte & 0x0F,
        })
    }
}

/// Returns true if the byte has its top bit set.
#[inline]
pub fn is_status_byte(byte: u8) -> bool {
    byte & STATUS_BIT != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_every_upper_nibble() {
        let expected = [
            (0x80, MessageClass::NoteOff, Some(2)),
            (0x91, MessageClass::NoteOn, Some(2)),
            (0xA2, MessageClass::PolyPressure, Some(2)),
            (0xB3, MessageClass::ControlChange, Some(2)),
            (0xC4, MessageClass::ProgramChange, Some(1)),
            (0xD5, MessageClass::ChannelPressure, Some(1)),
            (0xE6, MessageClass::PitchBend, Some(2)),
            (0xF7, MessageClass::Extended, None),
        ];

        for (byte, class, len) in expected {
            let status = Status::try_from(byte).unwrap();
            assert_eq!(status.class, class, "byte 0x{byte:02X}");
            assert_eq!(status.channel, byte & 0x0F);
            assert_eq!(class.data_len(), len);
        }
    }

    #[test]
    fn data_bytes_are_not_status() {
        assert_eq!(
            Status::try_from(0x7F),
            Err(DecodeError::NotAStatusByte(0x7F))
        );
        assert!(!is_status_byte(0x00));
        assert!(is_status_byte(0xFF));
    }

    #[test]
    fn extended_is_not_a_channel_message() {
        assert!(!MessageClass::Extended.is_channel_message());
        assert!(MessageClass::PitchBend.is_channel_message());
        assert_eq!(MessageClass::ControlChange.name(), "CONTROL_CHANGE");
    }
}
