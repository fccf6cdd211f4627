use midirx_decode::{Decoder, DecoderConfig, MessageHandler, DEFAULT_MAX_PAYLOAD};
use midirx_ring::{ByteRing, Consumer, Producer, DEFAULT_CAPACITY};
use tracing::warn;

use crate::error::Result;

/// Receive entry point, owned by interrupt (or receive thread) context.
#[derive(Debug)]
pub struct RxEntry<'r, const N: usize = DEFAULT_CAPACITY> {
    producer: Producer<'r, N>,
}

impl<'r, const N: usize> RxEntry<'r, N> {
    /// Wrap a claimed ring producer.
    pub fn new(producer: Producer<'r, N>) -> Self {
        Self { producer }
    }

    /// Hand one received byte to the main loop.
    ///
    /// Returns `false` when the ring was full and the byte was dropped; the
    /// drop is counted and reported by [`MidiPort::drain_and_dispatch`].
    /// Never blocks, allocates or logs.
    #[inline]
    pub fn on_byte_received(&mut self, byte: u8) -> bool {
        self.producer.enqueue(byte).is_ok()
    }

    /// Bytes dropped for overflow since the ring was created (wrapping).
    pub fn overflow_count(&self) -> u32 {
        self.producer.overflow_count()
    }
}

/// Main-loop side of a MIDI input: the ring consumer plus decoder state.
///
/// One port per physical input; ports share nothing.
#[derive(Debug)]
pub struct MidiPort<'r, const N: usize = DEFAULT_CAPACITY, const P: usize = DEFAULT_MAX_PAYLOAD> {
    consumer: Consumer<'r, N>,
    decoder: Decoder<P>,
    reported_overflows: u32,
}

impl<'r, const N: usize, const P: usize> MidiPort<'r, N, P> {
    /// Claim both ends of `ring` and build a port with default decoding.
    pub fn split(ring: &'r ByteRing<N>) -> Result<(RxEntry<'r, N>, Self)> {
        Self::split_with_config(ring, DecoderConfig::default())
    }

    /// Claim both ends of `ring` and build a port with explicit decoding.
    pub fn split_with_config(
        ring: &'r ByteRing<N>,
        config: DecoderConfig,
    ) -> Result<(RxEntry<'r, N>, Self)> {
        let producer = ring.producer()?;
        let consumer = ring.consumer()?;
        Ok((RxEntry::new(producer), Self::new(consumer, config)))
    }

    /// Build a port around an already claimed consumer.
    pub fn new(consumer: Consumer<'r, N>, config: DecoderConfig) -> Self {
        let reported_overflows = consumer.overflow_count();
        Self {
            consumer,
            decoder: Decoder::with_config(config),
            reported_overflows,
        }
    }

    /// Decode every buffered byte, invoking `handler` once per completed message.
    ///
    /// Returns the number of bytes consumed. Overflow since the previous call
    /// is logged here, outside the receive path.
    pub fn drain_and_dispatch<H: MessageHandler + ?Sized>(&mut self, handler: &mut H) -> usize {
        let consumed = self.decoder.drain(&mut self.consumer, handler);

        let overflows = self.consumer.overflow_count();
        if overflows != self.reported_overflows {
            warn!(
                dropped = overflows.wrapping_sub(self.reported_overflows),
                total = overflows,
                "receive ring overflowed; bytes dropped"
            );
            self.reported_overflows = overflows;
        }

        consumed
    }

    /// Snapshot of bytes waiting in the ring.
    pub fn pending(&self) -> usize {
        self.consumer.len()
    }

    /// Bytes dropped for overflow since the ring was created (wrapping).
    pub fn overflow_count(&self) -> u32 {
        self.consumer.overflow_count()
    }

    /// Borrow the decoder (state and counters).
    pub fn decoder(&self) -> &Decoder<P> {
        &self.decoder
    }

    /// Mutably borrow the decoder, e.g. to `reset` after a line error.
    pub fn decoder_mut(&mut self) -> &mut Decoder<P> {
        &mut self.decoder
    }
}

#[cfg(test)]
mod tests {
    use midirx_decode::{Message, RunningStatus};
    use midirx_ring::RingError;

    use super::*;
    use crate::error::LineError;

    #[derive(Default)]
    struct Log(Vec<String>);

    impl MessageHandler for Log {
        fn on_message(&mut self, message: Message<'_>) {
            self.0.push(format!("{message:?}"));
        }
    }

    #[test]
    fn bytes_flow_from_entry_to_handler() {
        let ring = ByteRing::<64>::new();
        let (mut entry, mut port) = MidiPort::<64>::split(&ring).unwrap();
        let mut log = Log::default();

        for b in [0x91, 0x3C, 0x40] {
            assert!(entry.on_byte_received(b));
        }
        assert_eq!(port.pending(), 3);

        assert_eq!(port.drain_and_dispatch(&mut log), 3);
        assert_eq!(
            log.0,
            vec!["NoteOn { channel: 1, note: 60, velocity: 64 }".to_string()]
        );
        assert_eq!(port.pending(), 0);
    }

    #[test]
    fn overflow_is_reported_not_fatal() {
        let ring = ByteRing::<4>::new();
        let (mut entry, mut port) = MidiPort::<4>::split(&ring).unwrap();
        let mut log = Log::default();

        for b in [0xB0, 0x07, 0x64, 0x90, 0x3C] {
            entry.on_byte_received(b);
        }
        assert_eq!(entry.overflow_count(), 1);

        assert_eq!(port.drain_and_dispatch(&mut log), 4);
        assert_eq!(port.overflow_count(), 1);
        // The partial NoteOn stays pending in the decoder.
        assert_eq!(log.0.len(), 1);
        assert_eq!(port.decoder().remaining(), 2);

        port.decoder_mut().reset();
        assert!(port.decoder().is_idle());
    }

    #[test]
    fn ring_can_only_back_one_port() {
        let ring = ByteRing::<8>::new();
        let _first = MidiPort::<8>::split(&ring).unwrap();

        let err = MidiPort::<8>::split(&ring).unwrap_err();
        assert!(matches!(err, LineError::Ring(RingError::ProducerClaimed)));
    }

    #[test]
    fn split_with_running_status() {
        let ring = ByteRing::<16>::new();
        let config = DecoderConfig {
            running_status: RunningStatus::Enabled,
            ..DecoderConfig::default()
        };
        let (mut entry, mut port) = MidiPort::<16>::split_with_config(&ring, config).unwrap();
        let mut log = Log::default();

        for b in [0xC0, 0x01, 0x02] {
            entry.on_byte_received(b);
        }
        port.drain_and_dispatch(&mut log);

        assert_eq!(log.0.len(), 2);
        assert_eq!(port.decoder().config().running_status, RunningStatus::Enabled);
    }
}
