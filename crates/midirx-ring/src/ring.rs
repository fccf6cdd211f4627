use std::cell::UnsafeCell;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use crate::error::{Result, RingError};

/// Default ring capacity: 64 bytes (log2 capacity 6).
pub const DEFAULT_CAPACITY: usize = 64;

/// What `enqueue` does when the ring is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Drop the incoming byte, count it and report `RingError::Full`.
    /// Unread bytes are never overwritten.
    #[default]
    RejectNew,
}

impl OverflowPolicy {
    /// Short name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            OverflowPolicy::RejectNew => "reject-new",
        }
    }
}

/// Fixed-capacity single-producer/single-consumer byte ring.
///
/// `write` and `read` are free-running counters; the slot for a counter is
/// `counter & (N - 1)`. The number of unread bytes is always
/// `write.wrapping_sub(read)` and never exceeds `N`.
///
/// The producer publishes a slot by storing `write` with `Release` after
/// filling it; the consumer releases a slot by storing `read` with `Release`
/// after copying it out. Each side loads the other's counter with `Acquire`.
pub struct ByteRing<const N: usize = DEFAULT_CAPACITY> {
    buf: UnsafeCell<[u8; N]>,
    write: AtomicUsize,
    read: AtomicUsize,
    overflows: AtomicU32,
    producer_claimed: AtomicBool,
    consumer_claimed: AtomicBool,
}

// SAFETY: slot memory is only written through the single live `Producer` and
// only read through the single live `Consumer`. A slot is never written while
// it holds unread data (the producer checks `write - read < N` against an
// `Acquire` load of `read`), and never read before it is published (the
// consumer checks `read != write` against an `Acquire` load of `write`).
unsafe impl<const N: usize> Sync for ByteRing<N> {}

impl<const N: usize> ByteRing<N> {
    const MASK: usize = {
        assert!(N > 0, "ByteRing capacity must be > 0");
        assert!(N.is_power_of_two(), "ByteRing capacity must be a power of two");
        N - 1
    };

    /// Create an empty ring. Usable in `static` initializers.
    pub const fn new() -> Self {
        let _ = Self::MASK;
        Self {
            buf: UnsafeCell::new([0; N]),
            write: AtomicUsize::new(0),
            read: AtomicUsize::new(0),
            overflows: AtomicU32::new(0),
            producer_claimed: AtomicBool::new(false),
            consumer_claimed: AtomicBool::new(false),
        }
    }

    /// Capacity in bytes.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Claim the producer handle.
    ///
    /// Returns `RingError::ProducerClaimed` while another producer is live.
    pub fn producer(&self) -> Result<Producer<'_, N>> {
        if self.producer_claimed.swap(true, Ordering::AcqRel) {
            return Err(RingError::ProducerClaimed);
        }
        Ok(Producer { ring: self })
    }

    /// Claim the consumer handle.
    ///
    /// Returns `RingError::ConsumerClaimed` while another consumer is live.
    pub fn consumer(&self) -> Result<Consumer<'_, N>> {
        if self.consumer_claimed.swap(true, Ordering::AcqRel) {
            return Err(RingError::ConsumerClaimed);
        }
        Ok(Consumer { ring: self })
    }

    /// Overflow handling for this ring.
    pub const fn overflow_policy(&self) -> OverflowPolicy {
        OverflowPolicy::RejectNew
    }

    /// Number of bytes rejected because the ring was full (wrapping).
    pub fn overflow_count(&self) -> u32 {
        self.overflows.load(Ordering::Relaxed)
    }

    #[inline]
    fn slot(&self, index: usize) -> *mut u8 {
        // SAFETY: `index & MASK < N`, so the offset stays inside the array.
        unsafe { self.buf.get().cast::<u8>().add(index & Self::MASK) }
    }
}

impl<const N: usize> Default for ByteRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for ByteRing<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteRing")
            .field("capacity", &N)
            .field("write", &self.write.load(Ordering::Relaxed))
            .field("read", &self.read.load(Ordering::Relaxed))
            .field("overflows", &self.overflows.load(Ordering::Relaxed))
            .finish()
    }
}

/// Write side of a [`ByteRing`]. Used from interrupt (or receive thread) context.
pub struct Producer<'a, const N: usize = DEFAULT_CAPACITY> {
    ring: &'a ByteRing<N>,
}

impl<const N: usize> Producer<'_, N> {
    /// Append a byte.
    ///
    /// When the ring is full the byte is dropped, the overflow counter is
    /// incremented and `RingError::Full` is returned. Never blocks.
    #[inline]
    pub fn enqueue(&mut self, byte: u8) -> Result<()> {
        let write = self.ring.write.load(Ordering::Relaxed);
        let read = self.ring.read.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N {
            self.ring.overflows.fetch_add(1, Ordering::Relaxed);
            return Err(RingError::Full(byte));
        }

        // SAFETY: the slot at `write` is not visible to the consumer until the
        // `Release` store below, and it holds no unread data (checked above).
        unsafe { self.ring.slot(write).write(byte) };
        self.ring.write.store(write.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// True when the next `enqueue` would be rejected.
    pub fn is_full(&self) -> bool {
        let write = self.ring.write.load(Ordering::Relaxed);
        let read = self.ring.read.load(Ordering::Acquire);
        write.wrapping_sub(read) >= N
    }

    /// Capacity in bytes.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of bytes rejected because the ring was full (wrapping).
    pub fn overflow_count(&self) -> u32 {
        self.ring.overflow_count()
    }
}

impl<const N: usize> Drop for Producer<'_, N> {
    fn drop(&mut self) {
        self.ring.producer_claimed.store(false, Ordering::Release);
    }
}

impl<const N: usize> fmt::Debug for Producer<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer").field("ring", self.ring).finish()
    }
}

/// Read side of a [`ByteRing`]. Used from the main loop.
pub struct Consumer<'a, const N: usize = DEFAULT_CAPACITY> {
    ring: &'a ByteRing<N>,
}

impl<const N: usize> Consumer<'_, N> {
    /// Remove and return the oldest unread byte, or `None` when empty.
    #[inline]
    pub fn dequeue(&mut self) -> Option<u8> {
        let read = self.ring.read.load(Ordering::Relaxed);
        let write = self.ring.write.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        // SAFETY: `read != write`, so the slot was published by the producer's
        // `Release` store, and the producer will not reuse it until `read` advances.
        let byte = unsafe { self.ring.slot(read).read() };
        self.ring.read.store(read.wrapping_add(1), Ordering::Release);
        Some(byte)
    }

    /// Snapshot of the number of unread bytes.
    ///
    /// The producer may append concurrently, so the value is a lower bound by
    /// the time the caller sees it.
    pub fn len(&self) -> usize {
        let read = self.ring.read.load(Ordering::Relaxed);
        let write = self.ring.write.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    /// Snapshot emptiness check.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity in bytes.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of bytes rejected because the ring was full (wrapping).
    pub fn overflow_count(&self) -> u32 {
        self.ring.overflow_count()
    }

    /// Return the overflow count and reset it to zero.
    pub fn take_overflow_count(&mut self) -> u32 {
        self.ring.overflows.swap(0, Ordering::Relaxed)
    }
}

impl<const N: usize> Drop for Consumer<'_, N> {
    fn drop(&mut self) {
        self.ring.consumer_claimed.store(false, Ordering::Release);
    }
}

impl<const N: usize> fmt::Debug for Consumer<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer").field("ring", self.ring).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let ring = ByteRing::<8>::new();
        let mut tx = ring.producer().unwrap();
        let mut rx = ring.consumer().unwrap();

        for b in [0x90, 0x3C, 0x40] {
            tx.enqueue(b).unwrap();
        }

        assert_eq!(rx.len(), 3);
        assert_eq!(rx.dequeue(), Some(0x90));
        assert_eq!(rx.dequeue(), Some(0x3C));
        assert_eq!(rx.dequeue(), Some(0x40));
        assert_eq!(rx.dequeue(), None);
        assert!(rx.is_empty());
    }

    #[test]
    fn fills_to_capacity_without_loss() {
        let ring = ByteRing::<16>::new();
        let mut tx = ring.producer().unwrap();
        let mut rx = ring.consumer().unwrap();

        for b in 0..16u8 {
            tx.enqueue(b).unwrap();
        }
        assert!(tx.is_full());
        assert_eq!(rx.len(), 16);
        assert_eq!(tx.overflow_count(), 0);

        let drained: Vec<u8> = std::iter::from_fn(|| rx.dequeue()).collect();
        assert_eq!(drained, (0..16u8).collect::<Vec<_>>());
    }

    #[test]
    fn full_ring_rejects_new_and_counts() {
        let ring = ByteRing::<4>::new();
        assert_eq!(ring.overflow_policy(), OverflowPolicy::RejectNew);
        let mut tx = ring.producer().unwrap();
        let mut rx = ring.consumer().unwrap();

        for b in 1..=4u8 {
            tx.enqueue(b).unwrap();
        }
        assert_eq!(tx.enqueue(5), Err(RingError::Full(5)));
        assert_eq!(tx.enqueue(6), Err(RingError::Full(6)));
        assert_eq!(rx.overflow_count(), 2);

        // Oldest data survives; the rejected bytes never appear.
        let drained: Vec<u8> = std::iter::from_fn(|| rx.dequeue()).collect();
        assert_eq!(drained, vec![1, 2, 3, 4]);

        assert_eq!(rx.take_overflow_count(), 2);
        assert_eq!(ring.overflow_count(), 0);
    }

    #[test]
    fn wraps_many_times() {
        let ring = ByteRing::<4>::new();
        let mut tx = ring.producer().unwrap();
        let mut rx = ring.consumer().unwrap();

        for round in 0..1000u32 {
            let a = (round % 128) as u8;
            let b = a.wrapping_add(1);
            let c = a.wrapping_add(2);
            tx.enqueue(a).unwrap();
            tx.enqueue(b).unwrap();
            tx.enqueue(c).unwrap();
            assert_eq!(rx.dequeue(), Some(a));
            assert_eq!(rx.dequeue(), Some(b));
            assert_eq!(rx.dequeue(), Some(c));
        }
        assert!(rx.is_empty());
        assert_eq!(rx.overflow_count(), 0);
    }

    #[test]
    fn second_handle_is_rejected_until_drop() {
        let ring = ByteRing::<8>::new();

        let tx = ring.producer().unwrap();
        assert_eq!(ring.producer().unwrap_err(), RingError::ProducerClaimed);
        drop(tx);
        assert!(ring.producer().is_ok());

        let rx = ring.consumer().unwrap();
        assert_eq!(ring.consumer().unwrap_err(), RingError::ConsumerClaimed);
        drop(rx);
        assert!(ring.consumer().is_ok());
    }

    #[test]
    fn static_ring() {
        static RING: ByteRing<32> = ByteRing::new();

        let mut tx = RING.producer().unwrap();
        let mut rx = RING.consumer().unwrap();
        tx.enqueue(0xF0).unwrap();
        assert_eq!(rx.dequeue(), Some(0xF0));
        assert_eq!(RING.capacity(), 32);
    }

    #[test]
    fn cross_thread_preserves_order() {
        const TOTAL: usize = 100_000;
        let ring = ByteRing::<64>::new();
        let mut tx = ring.producer().unwrap();
        let mut rx = ring.consumer().unwrap();

        std::thread::scope(|scope| {
            scope.spawn(move || {
                for i in 0..TOTAL {
                    let byte = (i % 251) as u8;
                    while tx.enqueue(byte).is_err() {
                        std::hint::spin_loop();
                    }
                }
            });

            let mut expected = 0usize;
            while expected < TOTAL {
                match rx.dequeue() {
                    Some(byte) => {
                        assert_eq!(byte, (expected % 251) as u8);
                        expected += 1;
                    }
                    None => std::hint::spin_loop(),
                }
            }
        });

        assert!(rx.is_empty());
    }
}
