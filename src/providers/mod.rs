//! External provider seams
//!
//! Transcription, chat completion, and speech synthesis are opaque external
//! services. The pipeline only sees these traits, so tests can inject mocks.

mod chat;
mod stt;
mod tts;

pub use chat::OpenAiChat;
pub use stt::OpenAiTranscriber;
pub use tts::OpenAiSynthesizer;

use std::time::Duration;

use async_trait::async_trait;

use crate::Result;
use crate::conversation::Turn;

/// Upper bound on any single provider request, so a dead provider surfaces as
/// a failure instead of wedging the pipeline forever
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Converts speech audio to text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe WAV-framed audio to text
    async fn transcribe(&self, wav: &[u8]) -> Result<String>;
}

/// Produces a conversational reply
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete the conversation given a system prompt and ordered turns
    async fn complete(&self, system_prompt: &str, turns: &[Turn]) -> Result<String>;
}

/// Converts text to encoded speech audio
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize text to encoded audio bytes (MP3)
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Build a reqwest client with the provider request timeout applied
pub(crate) fn http_client() -> crate::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}
