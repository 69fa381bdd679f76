//! TCP audio intake
//!
//! Embedded clients stream raw PCM terminated by a 4-byte end marker; the
//! acceptor spawns one receive task per connection and hands complete payloads
//! to the work queue.

mod frame;
mod server;

pub use frame::{END_MARKER, read_framed};
pub use server::IntakeServer;

/// Acknowledgement byte written to the client once its request is finished
pub const DONE_BYTE: u8 = 0x01;
