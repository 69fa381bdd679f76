//! TCP connection acceptor
//!
//! One lightweight task per accepted connection; the accept loop never blocks
//! on processing.

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};

use crate::audio::pcm_duration_secs;
use crate::queue::{AudioRequest, WorkSender};
use crate::{Error, Result};

use super::frame::read_framed;

/// Listens for embedded clients and feeds complete payloads to the work queue
pub struct IntakeServer {
    listener: TcpListener,
}

impl IntakeServer {
    /// Bind the intake listener
    ///
    /// # Errors
    ///
    /// Returns error if the address cannot be bound
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Intake(format!("failed to bind {addr}: {e}")))?;
        Ok(Self { listener })
    }

    /// The bound local address
    ///
    /// # Errors
    ///
    /// Returns error if the socket address cannot be read
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, spawning a receive task for each
    ///
    /// # Errors
    ///
    /// Returns error if the accept loop fails fatally
    pub async fn run(self, queue: WorkSender) -> Result<()> {
        tracing::info!(addr = %self.local_addr()?, "audio intake listening");

        loop {
            let (conn, peer) = self
                .listener
                .accept()
                .await
                .map_err(|e| Error::Intake(format!("accept failed: {e}")))?;
            let queue = queue.clone();
            tokio::spawn(async move {
                receive_task(conn, peer, &queue).await;
            });
        }
    }
}

/// Receive one framed payload and enqueue it, or close the connection if the
/// client never sent usable audio.
async fn receive_task(mut conn: TcpStream, peer: SocketAddr, queue: &WorkSender) {
    tracing::info!(%peer, "connection accepted");

    let pcm = match read_framed(&mut conn).await {
        Ok(pcm) => pcm,
        Err(e) => {
            tracing::error!(%peer, error = %e, "error receiving audio");
            return;
        }
    };

    if pcm.is_empty() {
        tracing::warn!(%peer, "no audio data received");
        return;
    }

    tracing::info!(
        %peer,
        bytes = pcm.len(),
        duration_secs = %format!("{:.1}", pcm_duration_secs(pcm.len())),
        "end marker received"
    );

    if queue.send(AudioRequest { pcm, conn, peer }).is_err() {
        tracing::error!(%peer, "work queue closed, dropping request");
    }
}
