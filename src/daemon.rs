//! Daemon - the running gateway
//!
//! Wires configuration into the long-lived tasks: the artifact HTTP server,
//! the single pipeline processor, and the TCP intake acceptor.

use std::sync::Arc;

use crate::artifacts::{ArtifactServer, ArtifactStore};
use crate::config::{Config, HISTORY_TIMEOUT};
use crate::conversation::ConversationStore;
use crate::intake::IntakeServer;
use crate::pipeline::{Pipeline, PipelineTiming};
use crate::playback::SonosSpeaker;
use crate::providers::{OpenAiChat, OpenAiSynthesizer, OpenAiTranscriber};
use crate::queue::work_queue;
use crate::{Error, Result, net};

/// The Tannoy daemon - orchestrates intake, processing, and serving
pub struct Daemon {
    config: Config,
}

impl Daemon {
    /// Create a new daemon instance
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the daemon until interrupted
    ///
    /// # Errors
    ///
    /// Returns error if startup or the accept loop fails
    pub async fn run(self) -> Result<()> {
        let config = self.config;

        let lan_ip = net::local_ip();
        tracing::info!(%lan_ip, "server LAN address");

        // Artifact store and the HTTP surface the speaker fetches from
        let base_url = format!("http://{lan_ip}:{}", config.http_port);
        let artifacts = ArtifactStore::new(&config.artifact_dir, base_url)?;
        let http = ArtifactServer::bind(&config.artifact_dir, &format!("0.0.0.0:{}", config.http_port))
            .await?;
        let _http_task = http.spawn();

        // Providers
        let api_key = config.require_api_key()?;
        let transcriber = Arc::new(OpenAiTranscriber::new(
            api_key.clone(),
            config.voice.stt_model.clone(),
        )?);
        let chat = Arc::new(OpenAiChat::new(
            api_key.clone(),
            config.voice.chat_model.clone(),
        )?);
        let synthesizer = Arc::new(OpenAiSynthesizer::new(
            api_key,
            config.voice.tts_model.clone(),
            config.voice.tts_voice.clone(),
        )?);

        // Speaker
        let speaker_addr = config.speaker_addr.as_deref().ok_or_else(|| {
            Error::Config("speaker address required (--speaker or [speaker] addr)".to_string())
        })?;
        let speaker = Arc::new(SonosSpeaker::new(speaker_addr)?);
        tracing::info!(addr = %speaker_addr, "using speaker");

        // Shared conversation state
        let conversation = Arc::new(ConversationStore::new(
            config.system_prompt.clone(),
            HISTORY_TIMEOUT,
        ));

        // Single pipeline worker fed by the work queue
        let (sender, receiver) = work_queue();
        let pipeline = Pipeline::new(
            transcriber,
            chat,
            synthesizer,
            speaker,
            conversation,
            artifacts,
            PipelineTiming::default(),
        );
        tokio::spawn(pipeline.run(receiver));

        // Intake acceptor runs on the main task
        let intake = IntakeServer::bind(&format!("0.0.0.0:{}", config.tcp_port)).await?;
        intake.run(sender).await
    }
}
