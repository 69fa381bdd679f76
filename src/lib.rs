//! Tannoy Gateway - push-to-talk voice gateway for networked speakers
//!
//! An embedded client streams raw PCM over TCP; the gateway transcribes it,
//! obtains a chat reply, synthesizes speech, and plays it on a networked
//! speaker, then acknowledges the client with a single done byte.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  Embedded clients (push-to-talk, PCM over TCP)       │
//! └───────────────────────┬──────────────────────────────┘
//!                         │ sentinel-framed payloads
//! ┌───────────────────────▼──────────────────────────────┐
//! │  Intake acceptor ── work queue ── pipeline (single)  │
//! │        STT → chat → TTS → artifact → playback        │
//! └──────┬────────────────────────────────────┬──────────┘
//!        │ HTTP GET /<artifact>               │ UPnP AVTransport
//! ┌──────▼──────────┐                ┌────────▼─────────┐
//! │  Artifact store │                │  Network speaker │
//! └─────────────────┘                └──────────────────┘
//! ```

pub mod artifacts;
pub mod audio;
pub mod config;
pub mod conversation;
pub mod daemon;
pub mod error;
pub mod intake;
pub mod net;
pub mod pipeline;
pub mod playback;
pub mod providers;
pub mod queue;

pub use artifacts::{ArtifactServer, ArtifactStore};
pub use config::Config;
pub use conversation::{ConversationStore, Role, Snapshot, Turn};
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use intake::{DONE_BYTE, END_MARKER, IntakeServer};
pub use pipeline::{Pipeline, PipelineTiming};
pub use playback::{Speaker, SonosSpeaker, TransportState};
pub use providers::{ChatModel, Synthesizer, Transcriber};
pub use queue::{AudioRequest, WorkReceiver, WorkSender, work_queue};
