//! Lock-free byte ring for handing received bytes from interrupt context to
//! the main loop.
//!
//! Exactly one [`Producer`] and one [`Consumer`] may be live per ring. The
//! producer side is total and O(1): when the ring is full the incoming byte is
//! rejected and an overflow counter is bumped, so unread data is never
//! overwritten.
//!
//! ```
//! use midirx_ring::ByteRing;
//!
//! static RING: ByteRing<64> = ByteRing::new();
//!
//! let mut producer = RING.producer().unwrap();
//! let mut consumer = RING.consumer().unwrap();
//!
//! producer.enqueue(0x90).unwrap();
//! assert_eq!(consumer.dequeue(), Some(0x90));
//! assert!(consumer.is_empty());
//! ```

pub mod error;
pub mod ring;

pub use error::{Result, RingError};
pub use ring::{ByteRing, Consumer, OverflowPolicy, Producer, DEFAULT_CAPACITY};
