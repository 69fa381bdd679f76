//! Single-worker processing pipeline
//!
//! Exactly one pipeline task exists. It dequeues one request at a time and
//! drives it end to end: transcription, completion, synthesis, artifact
//! registration, playback dispatch, playback wait, acknowledgement, and
//! cleanup scheduling. Serializing here guarantees the speaker never receives
//! overlapping play commands and that conversation turns land in arrival
//! order. Every request, success or failure, ends in exactly one
//! acknowledgement attempt and a closed connection.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::artifacts::ArtifactStore;
use crate::audio::pcm_to_wav;
use crate::conversation::ConversationStore;
use crate::intake::DONE_BYTE;
use crate::playback::{Speaker, await_finished};
use crate::providers::{ChatModel, Synthesizer, Transcriber};
use crate::queue::{AudioRequest, WorkReceiver};
use crate::Result;

/// Timing knobs for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineTiming {
    /// Grace period between acknowledgement and artifact deletion
    pub cleanup_delay: Duration,

    /// Deadline for the playback monitor
    pub playback_timeout: Duration,
}

impl Default for PipelineTiming {
    fn default() -> Self {
        Self {
            cleanup_delay: crate::config::CLEANUP_DELAY,
            playback_timeout: crate::playback::DEFAULT_PLAYBACK_TIMEOUT,
        }
    }
}

/// The single worker that owns playback authority
pub struct Pipeline {
    transcriber: Arc<dyn Transcriber>,
    chat: Arc<dyn ChatModel>,
    synthesizer: Arc<dyn Synthesizer>,
    speaker: Arc<dyn Speaker>,
    conversation: Arc<ConversationStore>,
    artifacts: ArtifactStore,
    timing: PipelineTiming,
}

impl Pipeline {
    /// Assemble a pipeline from its collaborators
    #[must_use]
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        chat: Arc<dyn ChatModel>,
        synthesizer: Arc<dyn Synthesizer>,
        speaker: Arc<dyn Speaker>,
        conversation: Arc<ConversationStore>,
        artifacts: ArtifactStore,
        timing: PipelineTiming,
    ) -> Self {
        Self {
            transcriber,
            chat,
            synthesizer,
            speaker,
            conversation,
            artifacts,
            timing,
        }
    }

    /// Process queued requests until the queue closes
    pub async fn run(self, mut queue: WorkReceiver) {
        tracing::info!("pipeline processor running");

        while let Some(request) = queue.recv().await {
            self.handle(request).await;
        }

        tracing::info!("work queue closed, pipeline stopping");
    }

    /// Drive one request end to end, always acknowledging the client
    async fn handle(&self, request: AudioRequest) {
        let AudioRequest { pcm, mut conn, peer } = request;
        tracing::info!(%peer, bytes = pcm.len(), "processing request");

        let artifact = match self.process(&pcm).await {
            Ok(artifact) => artifact,
            Err(e) => {
                tracing::error!(%peer, error = %e, "pipeline error");
                None
            }
        };

        acknowledge(&mut conn).await;
        tracing::info!(%peer, "connection closed");

        // Cleanup is scheduled after acknowledgement; a detached timer task
        // deletes the artifact so the next queued request starts immediately.
        if let Some(filename) = artifact {
            self.artifacts
                .schedule_cleanup(&filename, self.timing.cleanup_delay);
        }
    }

    /// The happy path. Returns the artifact filename when one was produced.
    async fn process(&self, pcm: &[u8]) -> Result<Option<String>> {
        let wav = pcm_to_wav(pcm)?;
        let transcript = self.transcriber.transcribe(&wav).await?;

        if transcript.trim().is_empty() {
            tracing::info!("empty transcription, skipping");
            return Ok(None);
        }

        let snapshot = self.conversation.append_user_turn(transcript).await;
        let reply = self
            .chat
            .complete(&snapshot.system_prompt, &snapshot.turns)
            .await?;
        self.conversation.append_assistant_turn(reply.clone()).await;

        let audio = self.synthesizer.synthesize(&reply).await?;
        let filename = self.artifacts.store(&audio, "mp3").await?;
        let url = self.artifacts.url_for(&filename);

        self.speaker.play(&url).await?;

        // The monitor's outcome never changes the pipeline's: the client is
        // acknowledged whether playback finished or the poll timed out.
        await_finished(self.speaker.as_ref(), self.timing.playback_timeout).await;

        Ok(Some(filename))
    }
}

/// Write the done byte and close the connection.
///
/// A send failure is logged; the connection is closed regardless.
async fn acknowledge(conn: &mut TcpStream) {
    if let Err(e) = conn.write_all(&[DONE_BYTE]).await {
        tracing::warn!(error = %e, "failed to send done byte");
    }
    let _ = conn.shutdown().await;
}
