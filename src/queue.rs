//! Work queue between intake tasks and the pipeline processor
//!
//! An unbounded FIFO: any number of receive tasks enqueue, exactly one
//! pipeline task dequeues. Back-pressure is absorbed by the queue on purpose —
//! traffic is a single human speaking into one device at a time.

use std::net::SocketAddr;

use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// One push-to-talk request: the received PCM payload plus the originating
/// connection, which the pipeline acknowledges and closes when done.
///
/// Ownership of the connection transfers to the pipeline at enqueue time.
#[derive(Debug)]
pub struct AudioRequest {
    /// Raw PCM payload (sentinel stripped)
    pub pcm: Vec<u8>,

    /// The client connection, held open until acknowledgement
    pub conn: TcpStream,

    /// Client address, for logging
    pub peer: SocketAddr,
}

/// Producer half of the work queue
pub type WorkSender = mpsc::UnboundedSender<AudioRequest>;

/// Consumer half of the work queue
pub type WorkReceiver = mpsc::UnboundedReceiver<AudioRequest>;

/// Create the work queue connecting intake tasks to the pipeline
#[must_use]
pub fn work_queue() -> (WorkSender, WorkReceiver) {
    mpsc::unbounded_channel()
}
