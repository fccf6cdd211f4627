//! Real-time serial MIDI receive.
//!
//! midirx moves bytes from a receive interrupt to the main loop through a
//! lock-free ring, reassembles them into MIDI messages and dispatches each
//! completed message to a handler. Nothing on the byte path blocks or
//! allocates.
//!
//! # Crate Structure
//!
//! - [`ring`]: Lock-free single-producer/single-consumer byte ring
//! - [`decode`]: Status classification, message reassembly and dispatch
//! - [`line`]: Line setup, receive entry point, drain-and-dispatch, tty driver

/// Re-export ring types.
pub mod ring {
    pub use midirx_ring::*;
}

/// Re-export decoder types.
pub mod decode {
    pub use midirx_decode::*;
}

/// Re-export line types.
pub mod line {
    pub use midirx_line::*;
}
