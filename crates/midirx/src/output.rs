use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use midirx_decode::{Message, MessageHandler};
use serde::{Serialize, Serializer};

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Owned copy of a decoded message, detached from the decoder's buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageRecord {
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
    PitchBend {
        channel: u8,
        value: i16,
    },
    Sysex {
        length: usize,
        #[serde(serialize_with = "serialize_hex")]
        data: Bytes,
    },
}

impl From<Message<'_>> for MessageRecord {
    fn from(message: Message<'_>) -> Self {
        match message {
            Message::NoteOff { channel, note } => Self::NoteOff { channel, note },
            Message::NoteOn {
                channel,
                note,
                velocity,
            } => Self::NoteOn {
                channel,
                note,
                velocity,
            },
            Message::PolyPressure {
                channel,
                note,
                pressure,
            } => Self::PolyPressure {
                channel,
                note,
                pressure,
            },
            Message::ControlChange {
                channel,
                controller,
                value,
            } => Self::ControlChange {
                channel,
                controller,
                value,
            },
            Message::ProgramChange { channel, program } => Self::ProgramChange { channel, program },
            Message::ChannelPressure { channel, pressure } => {
                Self::ChannelPressure { channel, pressure }
            }
            Message::PitchBend { channel, value } => Self::PitchBend { channel, value },
            Message::SysEx(data) => Self::Sysex {
                length: data.len(),
                data: Bytes::copy_from_slice(data),
            },
        }
    }
}

impl MessageRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoteOff { .. } => "note_off",
            Self::NoteOn { .. } => "note_on",
            Self::PolyPressure { .. } => "poly_pressure",
            Self::ControlChange { .. } => "control_change",
            Self::ProgramChange { .. } => "program_change",
            Self::ChannelPressure { .. } => "channel_pressure",
            Self::PitchBend { .. } => "pitch_bend",
            Self::Sysex { .. } => "sysex",
        }
    }

    pub fn channel(&self) -> Option<u8> {
        match *self {
            Self::NoteOff { channel, .. }
            | Self::NoteOn { channel, .. }
            | Self::PolyPressure { channel, .. }
            | Self::ControlChange { channel, .. }
            | Self::ProgramChange { channel, .. }
            | Self::ChannelPressure { channel, .. }
            | Self::PitchBend { channel, .. } => Some(channel),
            Self::Sysex { .. } => None,
        }
    }

    /// Payload fields as `key=value` pairs.
    pub fn detail(&self) -> String {
        match self {
            Self::NoteOff { note, .. } => format!("note={note}"),
            Self::NoteOn { note, velocity, .. } => format!("note={note} velocity={velocity}"),
            Self::PolyPressure { note, pressure, .. } => {
                format!("note={note} pressure={pressure}")
            }
            Self::ControlChange {
                controller, value, ..
            } => format!("controller={controller} value={value}"),
            Self::ProgramChange { program, .. } => format!("program={program}"),
            Self::ChannelPressure { pressure, .. } => format!("pressure={pressure}"),
            Self::PitchBend { value, .. } => format!("value={value}"),
            Self::Sysex { length, data } => format!("length={length} data={}", hex(data)),
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    #[serde(flatten)]
    message: &'a MessageRecord,
    timestamp: String,
}

pub fn print_message(record: &MessageRecord, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                message: record,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "CHANNEL", "DETAIL"])
                .add_row(vec![
                    record.kind().to_string(),
                    channel_label(record.channel()),
                    record.detail(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} channel={} {}",
                record.kind(),
                channel_label(record.channel()),
                record.detail()
            );
        }
    }
}

/// Prints each dispatched message, optionally stopping after `limit`.
pub struct MessagePrinter {
    format: OutputFormat,
    limit: Option<usize>,
    printed: usize,
}

impl MessagePrinter {
    pub fn new(format: OutputFormat, limit: Option<usize>) -> Self {
        Self {
            format,
            limit,
            printed: 0,
        }
    }

    pub fn printed(&self) -> usize {
        self.printed
    }

    pub fn is_done(&self) -> bool {
        self.limit.is_some_and(|limit| self.printed >= limit)
    }
}

impl MessageHandler for MessagePrinter {
    fn on_message(&mut self, message: Message<'_>) {
        if self.is_done() {
            tracing::trace!(
                class = message.class().name(),
                channel = ?message.channel(),
                "message past --count limit skipped"
            );
            return;
        }
        print_message(&MessageRecord::from(message), self.format);
        self.printed = self.printed.saturating_add(1);
    }
}

fn channel_label(channel: Option<u8>) -> String {
    channel.map_or_else(|| "-".to_string(), |ch| ch.to_string())
}

fn hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn serialize_hex<S: Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex(data))
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_json_is_tagged() {
        let record = MessageRecord::from(Message::NoteOn {
            channel: 1,
            note: 0x3C,
            velocity: 0x40,
        });
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "type": "note_on", "channel": 1, "note": 60, "velocity": 64 })
        );
    }

    #[test]
    fn sysex_record_owns_hex_payload() {
        let payload = [0x7E, 0x00, 0x09];
        let record = MessageRecord::from(Message::SysEx(&payload));

        assert_eq!(record.channel(), None);
        assert_eq!(record.detail(), "length=3 data=7E 00 09");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["data"], "7E 00 09");
        assert_eq!(json["length"], 3);
    }

    #[test]
    fn pitch_bend_detail_is_signed() {
        let record = MessageRecord::from(Message::PitchBend {
            channel: 0,
            value: -8192,
        });
        assert_eq!(record.kind(), "pitch_bend");
        assert_eq!(record.detail(), "value=-8192");
    }

    #[test]
    fn printer_stops_at_limit() {
        let mut printer = MessagePrinter::new(OutputFormat::Pretty, Some(1));
        printer.on_message(Message::ProgramChange {
            channel: 0,
            program: 1,
        });
        printer.on_message(Message::ProgramChange {
            channel: 0,
            program: 2,
        });

        assert_eq!(printer.printed(), 1);
        assert!(printer.is_done());
    }
}
