//! Shared test doubles for pipeline integration tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use tannoy_gateway::conversation::Turn;
use tannoy_gateway::playback::TransportState;
use tannoy_gateway::{ChatModel, Error, Result, Speaker, Synthesizer, Transcriber};

/// Ordered log of observable events, shared across mocks and client tasks
pub type EventLog = Arc<Mutex<Vec<String>>>;

/// Create an empty event log
pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Record an event
pub fn log_event(log: &EventLog, event: impl Into<String>) {
    log.lock().unwrap().push(event.into());
}

/// Index of the first event matching `needle`, if any
pub fn event_index(log: &EventLog, needle: &str) -> Option<usize> {
    log.lock().unwrap().iter().position(|e| e == needle)
}

/// Transcriber returning scripted transcripts in call order
pub struct MockTranscriber {
    scripts: Mutex<Vec<String>>,
    log: EventLog,
}

impl MockTranscriber {
    pub fn new(scripts: Vec<&str>, log: EventLog) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into_iter().map(String::from).collect()),
            log,
        })
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, wav: &[u8]) -> Result<String> {
        assert_eq!(&wav[0..4], b"RIFF", "payload must be WAV-framed");
        let mut scripts = self.scripts.lock().unwrap();
        let text = if scripts.is_empty() {
            String::new()
        } else {
            scripts.remove(0)
        };
        log_event(&self.log, format!("transcribe:{text}"));
        Ok(text)
    }
}

/// Chat model returning a fixed reply and recording snapshots
pub struct MockChat {
    reply: std::result::Result<String, String>,
    pub calls: Mutex<Vec<(String, Vec<Turn>)>>,
    log: EventLog,
}

impl MockChat {
    pub fn new(reply: &str, log: EventLog) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
            log,
        })
    }

    pub fn failing(message: &str, log: EventLog) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
            log,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for MockChat {
    async fn complete(&self, system_prompt: &str, turns: &[Turn]) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), turns.to_vec()));
        log_event(&self.log, "chat");
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(message) => Err(Error::Chat(message.clone())),
        }
    }
}

/// Synthesizer returning fixed audio bytes
pub struct MockSynthesizer {
    audio: Vec<u8>,
    pub calls: Mutex<Vec<String>>,
}

impl MockSynthesizer {
    pub fn new(audio: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            audio,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(text.to_string());
        Ok(self.audio.clone())
    }
}

/// Speaker that reports playback finished on the first query
pub struct MockSpeaker {
    pub played: Mutex<Vec<String>>,
}

impl MockSpeaker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            played: Mutex::new(Vec::new()),
        })
    }

    pub fn played_urls(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }
}

#[async_trait]
impl Speaker for MockSpeaker {
    async fn play(&self, url: &str) -> Result<()> {
        self.played.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn transport_state(&self) -> Result<TransportState> {
        Ok(TransportState::Stopped)
    }
}
