use crate::status::MessageClass;

/// A completed message, borrowed from the decoder for the duration of dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message<'a> {
    NoteOff {
        channel: u8,
        note: u8,
    },
    NoteOn {
        channel: u8,
        note: u8,
        velocity: u8,
    },
    PolyPressure {
        channel: u8,
        note: u8,
        pressure: u8,
    },
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
    },
    ProgramChange {
        channel: u8,
        program: u8,
    },
    ChannelPressure {
        channel: u8,
        pressure: u8,
    },
    /// Signed bend, `-8192..=8191`, zero at center.
    PitchBend {
        channel: u8,
        value: i16,
    },
    /// Extended payload captured before the terminating status byte.
    SysEx(&'a [u8]),
}

impl Message<'_> {
    /// The message class this message was decoded from.
    ///
    /// A NoteOn with velocity zero is reported as `NoteOff`.
    pub fn class(&self) -> MessageClass {
        match self {
            Message::NoteOff { .. } => MessageClass::NoteOff,
            Message::NoteOn { .. } => MessageClass::NoteOn,
            Message::PolyPressure { .. } => MessageClass::PolyPressure,
            Message::ControlChange { .. } => MessageClass::ControlChange,
            Message::ProgramChange { .. } => MessageClass::ProgramChange,
            Message::ChannelPressure { .. } => MessageClass::ChannelPressure,
            Message::PitchBend { .. } => MessageClass::PitchBend,
            Message::SysEx(_) => MessageClass::Extended,
        }
    }

    /// Channel of a channel message, `None` for SysEx.
    pub fn channel(&self) -> Option<u8> {
        match *self {
            Message::NoteOff { channel, .. }
            | Message::NoteOn { channel, .. }
            | Message::PolyPressure { channel, .. }
            | Message::ControlChange { channel, .. }
            | Message::ProgramChange { channel, .. }
            | Message::ChannelPressure { channel, .. }
            | Message::PitchBend { channel, .. } => Some(channel),
            Message::SysEx(_) => None,
        }
    }

    /// Route this message to the matching per-kind handler method.
    pub fn dispatch_to<H: MessageHandler + ?Sized>(self, handler: &mut H) {
        match self {
            Message::NoteOff { channel, note } => handler.note_off(channel, note),
            Message::NoteOn {
                channel,
                note,
                velocity,
            } => handler.note_on(channel, note, velocity),
            Message::PolyPressure {
                channel,
                note,
                pressure,
            } => handler.poly_pressure(channel, note, pressure),
            Message::ControlChange {
                channel,
                controller,
                value,
            } => handler.control_change(channel, controller, value),
            Message::ProgramChange { channel, program } => handler.program_change(channel, program),
            Message::ChannelPressure { channel, pressure } => {
                handler.channel_pressure(channel, pressure)
            }
            Message::PitchBend { channel, value } => handler.pitch_bend(channel, value),
            Message::SysEx(data) => handler.sysex(data),
        }
    }
}

/// Receives completed messages from a [`Decoder`](crate::Decoder).
///
/// Every method defaults to a no-op, so implementors only override what they
/// consume. [`on_message`](MessageHandler::on_message) sees every message first
/// and by default routes it to the per-kind methods.
///
/// Handlers run synchronously on the draining thread and must not block.
pub trait MessageHandler {
    fn on_message(&mut self, message: Message<'_>) {
        message.dispatch_to(self);
    }

    fn note_on(&mut self, _channel: u8, _note: u8, _velocity: u8) {}

    fn note_off(&mut self, _channel: u8, _note: u8) {}

    /// Polyphonic key pressure. Not wired to anything by default.
    fn poly_pressure(&mut self, _channel: u8, _note: u8, _pressure: u8) {}

    fn control_change(&mut self, _channel: u8, _controller: u8, _value: u8) {}

    fn program_change(&mut self, _channel: u8, _program: u8) {}

    /// Channel pressure (aftertouch). Not wired to anything by default.
    fn channel_pressure(&mut self, _channel: u8, _pressure: u8) {}

    fn pitch_bend(&mut self, _channel: u8, _value: i16) {}

    /// Extended message payload; `data.len()` is the captured byte count.
    fn sysex(&mut self, _data: &[u8]) {}
}

impl<H: MessageHandler + ?Sized> MessageHandler for &mut H {
    fn on_message(&mut self, message: Message<'_>) {
        (**self).on_message(message)
    }

    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        (**self).note_on(channel, note, velocity)
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        (**self).note_off(channel, note)
    }

    fn poly_pressure(&mut self, channel: u8, note: u8, pressure: u8) {
        (**self).poly_pressure(channel, note, pressure)
    }

    fn control_change(&mut self, channel: u8, controller: u8, value: u8) {
        (**self).control_change(channel, controller, value)
    }

    fn program_change(&mut self, channel: u8, program: u8) {
        (**self).program_change(channel, program)
    }

    fn channel_pressure(&mut self, channel: u8, pressure: u8) {
        (**self).channel_pressure(channel, pressure)
    }

    fn pitch_bend(&mut self, channel: u8, value: i16) {
        (**self).pitch_bend(channel, value)
    }

    fn sysex(&mut self, data: &[u8]) {
        (**self).sysex(data)
    }
}
