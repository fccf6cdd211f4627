use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::error::{LineError, Result};
use crate::port::RxEntry;

const READ_CHUNK_SIZE: usize = 256;

/// Byte counts from one pump run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PumpStats {
    /// Bytes read from the source.
    pub received: u64,
    /// Bytes the ring rejected because it was full.
    pub dropped: u64,
}

/// Feeds bytes from any `Read` source into an [`RxEntry`], one
/// `on_byte_received` call per byte.
///
/// Runs on its own thread on hosts without a receive interrupt.
pub struct RxPump<R> {
    inner: R,
}

impl<R: Read> RxPump<R> {
    /// Create a pump over `inner`.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Read until end of input or until `running` is cleared.
    ///
    /// `TimedOut`, `WouldBlock` and `Interrupted` reads are retried after
    /// re-checking `running`, so a source with a read timeout stops promptly.
    pub fn run<const N: usize>(
        &mut self,
        entry: &mut RxEntry<'_, N>,
        running: &AtomicBool,
    ) -> Result<PumpStats> {
        let mut stats = PumpStats::default();
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        info!("receive pump started");
        while running.load(Ordering::SeqCst) {
            let read = match self.inner.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err)
                    if matches!(
                        err.kind(),
                        ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
                    ) =>
                {
                    continue
                }
                Err(err) => return Err(LineError::Io(err)),
            };

            for &byte in &chunk[..read] {
                if !entry.on_byte_received(byte) {
                    stats.dropped += 1;
                }
            }
            stats.received += read as u64;
        }

        debug!(
            received = stats.received,
            dropped = stats.dropped,
            "receive pump stopped"
        );
        Ok(stats)
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Consume the pump and return the inner source.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use midirx_decode::MessageHandler;
    use midirx_ring::ByteRing;

    use super::*;
    use crate::fake::FakeLine;
    use crate::port::MidiPort;

    #[derive(Default)]
    struct Notes(Vec<(u8, u8, u8)>);

    impl MessageHandler for Notes {
        fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
            self.0.push((channel, note, velocity));
        }
    }

    #[test]
    fn pumps_until_eof() {
        let ring = ByteRing::<64>::new();
        let (mut entry, mut port) = MidiPort::<64>::split(&ring).unwrap();
        let running = AtomicBool::new(true);

        let mut pump = RxPump::new(FakeLine::with_input(&[0x90, 0x3C, 0x40, 0x91, 0x3E, 0x41]));
        let stats = pump.run(&mut entry, &running).unwrap();

        assert_eq!(
            stats,
            PumpStats {
                received: 6,
                dropped: 0
            }
        );
        assert_eq!(pump.get_ref().pending(), 0);

        let mut notes = Notes::default();
        port.drain_and_dispatch(&mut notes);
        assert_eq!(notes.0, vec![(0, 0x3C, 0x40), (1, 0x3E, 0x41)]);
    }

    #[test]
    fn counts_drops_when_consumer_falls_behind() {
        let ring = ByteRing::<4>::new();
        let (mut entry, port) = MidiPort::<4>::split(&ring).unwrap();
        let running = AtomicBool::new(true);

        let mut pump = RxPump::new(Cursor::new(vec![0xF8; 10]));
        let stats = pump.run(&mut entry, &running).unwrap();

        assert_eq!(stats.received, 10);
        assert_eq!(stats.dropped, 6);
        assert_eq!(port.overflow_count(), 6);
    }

    #[test]
    fn stops_when_running_cleared() {
        let ring = ByteRing::<8>::new();
        let (mut entry, _port) = MidiPort::<8>::split(&ring).unwrap();
        let running = AtomicBool::new(false);

        let mut pump = RxPump::new(FakeLine::with_input(&[0x90, 0x3C, 0x40]));
        let stats = pump.run(&mut entry, &running).unwrap();

        assert_eq!(stats, PumpStats::default());
        assert_eq!(pump.into_inner().pending(), 3);
    }

    #[test]
    fn retries_timeouts_and_surfaces_hard_errors() {
        struct Flaky {
            calls: usize,
        }

        impl Read for Flaky {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                self.calls += 1;
                match self.calls {
                    1 => Err(ErrorKind::TimedOut.into()),
                    2 => {
                        buf[0] = 0xFE;
                        Ok(1)
                    }
                    _ => Err(std::io::Error::other("line unplugged")),
                }
            }
        }

        let ring = ByteRing::<8>::new();
        let (mut entry, port) = MidiPort::<8>::split(&ring).unwrap();
        let running = AtomicBool::new(true);

        let mut pump = RxPump::new(Flaky { calls: 0 });
        let err = pump.run(&mut entry, &running).unwrap_err();

        assert!(matches!(err, LineError::Io(_)));
        assert_eq!(pump.get_ref().calls, 3);
        assert_eq!(port.pending(), 1);
    }

    #[test]
    fn pump_thread_then_drain_preserves_messages() {
        let ring = ByteRing::<64>::new();
        let (mut entry, mut port) = MidiPort::<64>::split(&ring).unwrap();
        let running = AtomicBool::new(true);

        let wire: Vec<u8> = (0..40u8).flat_map(|n| [0x90, n, 0x40]).collect();

        // Feed in chunks no larger than the ring so nothing overflows.
        let mut notes = Notes::default();
        for chunk in wire.chunks(60) {
            std::thread::scope(|scope| {
                scope.spawn(|| {
                    RxPump::new(Cursor::new(chunk.to_vec()))
                        .run(&mut entry, &running)
                        .unwrap()
                });
            });
            port.drain_and_dispatch(&mut notes);
        }

        let expected: Vec<(u8, u8, u8)> = (0..40u8).map(|n| (0, n, 0x40)).collect();
        assert_eq!(notes.0, expected);
        assert_eq!(port.overflow_count(), 0);
    }
}
