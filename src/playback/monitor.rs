//! Playback completion monitor
//!
//! Bounded polling of the speaker's transport state: an initial grace delay
//! lets playback start, then a fixed-interval poll runs until a finished-like
//! state appears or the deadline passes. Never hangs, never errors.

use std::time::Duration;

use tokio::time::Instant;

use super::Speaker;

/// Default deadline for waiting on playback
pub const DEFAULT_PLAYBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// Grace delay before the first transport-state query
const START_GRACE: Duration = Duration::from_secs(1);

/// Interval between transport-state queries
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Wait until the speaker reports playback finished or `timeout` elapses.
///
/// A query error is treated as "not yet finished" and polling continues; a
/// full timeout is logged as a warning. The result never changes the caller's
/// outcome, so nothing is returned.
pub async fn await_finished(speaker: &dyn Speaker, timeout: Duration) {
    let deadline = Instant::now() + timeout;

    // Give the speaker a moment to fetch the artifact and start playing.
    tokio::time::sleep(START_GRACE).await;

    while Instant::now() < deadline {
        match speaker.transport_state().await {
            Ok(state) if state.is_finished() => {
                tracing::info!(?state, "playback finished");
                return;
            }
            Ok(state) => {
                tracing::trace!(?state, "playback still in progress");
            }
            Err(e) => {
                tracing::warn!(error = %e, "error polling transport state");
            }
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    tracing::warn!(timeout_secs = timeout.as_secs(), "playback poll timed out");
}
