//! Sentinel-framed payload reading
//!
//! Message boundary is determined solely by the end marker, never inferred
//! from content. Callers must guarantee the payload never contains the 4-byte
//! marker as data; a coincidental match is mis-framed.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::Result;

/// End-of-stream marker terminating an audio payload
pub const END_MARKER: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];

const READ_CHUNK: usize = 4096;

/// Read a framed payload from `reader` until the end marker appears.
///
/// Returns the bytes preceding the marker. If the peer closes the stream
/// before sending the marker, returns whatever partial payload was buffered
/// (possibly empty) — an incomplete transfer, not an error. A connection
/// reset returns an empty payload.
///
/// # Errors
///
/// Returns error on IO failures other than connection reset
pub async fn read_framed<R>(reader: &mut R) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = match reader.read(&mut chunk).await {
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionReset => {
                tracing::warn!("client connection reset");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if n == 0 {
            tracing::warn!(buffered = buf.len(), "client closed before end marker");
            return Ok(buf);
        }

        buf.extend_from_slice(&chunk[..n]);
        if buf.len() >= END_MARKER.len() && buf[buf.len() - END_MARKER.len()..] == END_MARKER {
            buf.truncate(buf.len() - END_MARKER.len());
            return Ok(buf);
        }
    }
}
