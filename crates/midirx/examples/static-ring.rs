//! Static ring example: a receive thread stands in for the UART interrupt
//! and the main loop drains and dispatches.
//!
//! Run with:
//!   cargo run --example static-ring

use std::thread;
use std::time::Duration;

use midirx::decode::MessageHandler;
use midirx::line::MidiPort;
use midirx::ring::{ByteRing, DEFAULT_CAPACITY};

static RX_RING: ByteRing = ByteRing::new();

/// Note on ch1, CC7 on ch2, a short sysex, pitch bend at center, note off.
const TRAFFIC: &[u8] = &[
    0x91, 0x3C, 0x40, 0xB2, 0x07, 0x64, 0xF0, 0x7E, 0x00, 0x09, 0x01, 0xF7, 0xE0, 0x00, 0x40,
    0x81, 0x3C, 0x00,
];

struct Monitor {
    messages: usize,
}

impl MessageHandler for Monitor {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        self.messages += 1;
        println!("note on   ch={channel} note={note} velocity={velocity}");
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        self.messages += 1;
        println!("note off  ch={channel} note={note}");
    }

    fn control_change(&mut self, channel: u8, controller: u8, value: u8) {
        self.messages += 1;
        println!("cc        ch={channel} controller={controller} value={value}");
    }

    fn pitch_bend(&mut self, channel: u8, value: i16) {
        self.messages += 1;
        println!("bend      ch={channel} value={value}");
    }

    fn sysex(&mut self, data: &[u8]) {
        self.messages += 1;
        println!("sysex     {} bytes: {data:02X?}", data.len());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (mut entry, mut port) = MidiPort::<DEFAULT_CAPACITY>::split(&RX_RING)?;

    let rx = thread::spawn(move || {
        for &byte in TRAFFIC {
            entry.on_byte_received(byte);
            // Roughly one byte time at 31250 baud.
            thread::sleep(Duration::from_micros(320));
        }
    });

    let mut monitor = Monitor { messages: 0 };
    while !rx.is_finished() {
        port.drain_and_dispatch(&mut monitor);
        thread::sleep(Duration::from_millis(1));
    }
    rx.join().map_err(|_| "receive thread panicked")?;
    port.drain_and_dispatch(&mut monitor);

    let stats = port.decoder().stats();
    eprintln!(
        "{} messages, {} stray bytes, {} dropped",
        monitor.messages,
        stats.stray,
        port.overflow_count()
    );
    Ok(())
}
