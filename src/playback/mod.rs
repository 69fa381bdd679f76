//! Networked speaker control
//!
//! The speaker is an external collaborator, abstracted to play-by-URL plus a
//! transport-state query. The gateway never touches audio output hardware.

mod monitor;
mod sonos;

pub use monitor::{DEFAULT_PLAYBACK_TIMEOUT, await_finished};
pub use sonos::SonosSpeaker;

use async_trait::async_trait;

use crate::Result;

/// Transport state reported by the speaker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportState {
    /// Actively playing
    Playing,
    /// Paused
    Paused,
    /// Stopped
    Stopped,
    /// Nothing loaded
    NoMedia,
    /// Switching tracks or buffering
    Transitioning,
    /// Anything else the device reports
    Other(String),
}

impl TransportState {
    /// Parse the device's wire string
    #[must_use]
    pub fn from_wire(state: &str) -> Self {
        match state {
            "PLAYING" => Self::Playing,
            "PAUSED_PLAYBACK" => Self::Paused,
            "STOPPED" => Self::Stopped,
            "NO_MEDIA_PRESENT" => Self::NoMedia,
            "TRANSITIONING" => Self::Transitioning,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether this state means playback is over
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Stopped | Self::Paused | Self::NoMedia)
    }
}

/// Control surface of a networked speaker
#[async_trait]
pub trait Speaker: Send + Sync {
    /// Instruct the speaker to fetch and play `url`
    async fn play(&self, url: &str) -> Result<()>;

    /// Query the current transport state
    async fn transport_state(&self) -> Result<TransportState>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_states_parse() {
        assert_eq!(TransportState::from_wire("PLAYING"), TransportState::Playing);
        assert_eq!(
            TransportState::from_wire("PAUSED_PLAYBACK"),
            TransportState::Paused
        );
        assert_eq!(TransportState::from_wire("STOPPED"), TransportState::Stopped);
        assert_eq!(
            TransportState::from_wire("NO_MEDIA_PRESENT"),
            TransportState::NoMedia
        );
        assert_eq!(
            TransportState::from_wire("CUSTOM"),
            TransportState::Other("CUSTOM".to_string())
        );
    }

    #[test]
    fn finished_set_is_exact() {
        assert!(TransportState::Stopped.is_finished());
        assert!(TransportState::Paused.is_finished());
        assert!(TransportState::NoMedia.is_finished());
        assert!(!TransportState::Playing.is_finished());
        assert!(!TransportState::Transitioning.is_finished());
        assert!(!TransportState::Other("X".to_string()).is_finished());
    }
}
