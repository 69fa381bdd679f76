//! Configuration management for the Tannoy gateway
//!
//! Layered: built-in defaults, then an optional TOML file
//! (`~/.config/tannoy/config.toml`), then environment variables and CLI flags
//! applied by `main.rs`.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::{Error, Result};

/// Default TCP port for audio intake
pub const DEFAULT_TCP_PORT: u16 = 12345;

/// Default HTTP port for artifact serving
pub const DEFAULT_HTTP_PORT: u16 = 8731;

/// Inactivity threshold after which conversation history is cleared
pub const HISTORY_TIMEOUT: Duration = Duration::from_secs(7200);

/// Grace period between acknowledgement and artifact deletion
pub const CLEANUP_DELAY: Duration = Duration::from_secs(30);

/// Default system prompt for the chat model
const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful voice assistant. Keep your responses concise and \
     conversational, suitable for being spoken aloud. Aim for 1-3 sentences \
     unless the user asks for detail.";

/// Tannoy gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port for audio intake from embedded clients
    pub tcp_port: u16,

    /// HTTP port for serving synthesized artifacts to the speaker
    pub http_port: u16,

    /// Directory where synthesized artifacts are written and served from
    pub artifact_dir: PathBuf,

    /// IP address of the networked speaker
    pub speaker_addr: Option<String>,

    /// System prompt for chat completions
    pub system_prompt: String,

    /// Voice/model configuration
    pub voice: VoiceConfig,

    /// `OpenAI` API key (from `OPENAI_API_KEY`)
    pub openai_api_key: Option<String>,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Chat model identifier (e.g. "gpt-4o")
    pub chat_model: String,

    /// STT model identifier (e.g. "gpt-4o-mini-transcribe")
    pub stt_model: String,

    /// TTS model identifier (e.g. "gpt-4o-mini-tts")
    pub tts_model: String,

    /// TTS voice identifier (e.g. "onyx")
    pub tts_voice: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            chat_model: "gpt-4o".to_string(),
            stt_model: "gpt-4o-mini-transcribe".to_string(),
            tts_model: "gpt-4o-mini-tts".to_string(),
            tts_voice: "onyx".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tcp_port: DEFAULT_TCP_PORT,
            http_port: DEFAULT_HTTP_PORT,
            artifact_dir: std::env::temp_dir().join("tannoy-artifacts"),
            speaker_addr: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            voice: VoiceConfig::default(),
            openai_api_key: None,
        }
    }
}

impl Config {
    /// Load configuration: defaults, TOML file overlay, then environment
    ///
    /// # Errors
    ///
    /// Returns error if the config file exists but cannot be read or parsed
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::file_path()
            && path.exists()
        {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
            let file: ConfigFile = toml::from_str(&contents)?;
            config.apply_file(file);
            tracing::debug!(path = %path.display(), "loaded config file");
        }

        if let Ok(key) = std::env::var("OPENAI_API_KEY")
            && !key.is_empty()
        {
            config.openai_api_key = Some(key);
        }

        Ok(config)
    }

    /// Path to the persistent config file, if a home directory exists
    #[must_use]
    pub fn file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "tannoy")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from a parsed config file
    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(port) = file.server.tcp_port {
            self.tcp_port = port;
        }
        if let Some(port) = file.server.http_port {
            self.http_port = port;
        }
        if let Some(dir) = file.server.artifact_dir {
            self.artifact_dir = dir;
        }
        if let Some(addr) = file.speaker.addr {
            self.speaker_addr = Some(addr);
        }
        if let Some(prompt) = file.voice.system_prompt {
            self.system_prompt = prompt;
        }
        if let Some(model) = file.voice.chat_model {
            self.voice.chat_model = model;
        }
        if let Some(model) = file.voice.stt_model {
            self.voice.stt_model = model;
        }
        if let Some(model) = file.voice.tts_model {
            self.voice.tts_model = model;
        }
        if let Some(voice) = file.voice.tts_voice {
            self.voice.tts_voice = voice;
        }
    }

    /// The `OpenAI` API key, or a configuration error if unset
    ///
    /// # Errors
    ///
    /// Returns error if `OPENAI_API_KEY` is not configured
    pub fn require_api_key(&self) -> Result<String> {
        self.openai_api_key
            .clone()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".to_string()))
    }
}

/// Top-level TOML configuration file schema
///
/// All fields are optional — the file is a partial overlay on top of defaults.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    server: ServerFileConfig,

    #[serde(default)]
    speaker: SpeakerFileConfig,

    #[serde(default)]
    voice: VoiceFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
struct ServerFileConfig {
    /// Audio intake TCP port
    tcp_port: Option<u16>,

    /// Artifact HTTP port
    http_port: Option<u16>,

    /// Artifact serving directory
    artifact_dir: Option<PathBuf>,
}

/// Speaker configuration
#[derive(Debug, Default, Deserialize)]
struct SpeakerFileConfig {
    /// Speaker IP address (skips discovery)
    addr: Option<String>,
}

/// Voice/model configuration
#[derive(Debug, Default, Deserialize)]
struct VoiceFileConfig {
    system_prompt: Option<String>,
    chat_model: Option<String>,
    stt_model: Option<String>,
    tts_model: Option<String>,
    tts_voice: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_wire_constants() {
        let config = Config::default();
        assert_eq!(config.tcp_port, 12345);
        assert_eq!(config.http_port, 8731);
        assert_eq!(config.voice.tts_voice, "onyx");
    }

    #[test]
    fn file_overlay_is_partial() {
        let file: ConfigFile = toml::from_str(
            r#"
            [server]
            tcp_port = 9000

            [voice]
            tts_voice = "coral"
            "#,
        )
        .unwrap();

        let mut config = Config::default();
        config.apply_file(file);

        assert_eq!(config.tcp_port, 9000);
        assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
        assert_eq!(config.voice.tts_voice, "coral");
        assert_eq!(config.voice.chat_model, "gpt-4o");
    }

    #[test]
    fn empty_file_keeps_defaults() {
        let file: ConfigFile = toml::from_str("").unwrap();
        let mut config = Config::default();
        config.apply_file(file);
        assert_eq!(config.tcp_port, DEFAULT_TCP_PORT);
        assert!(config.speaker_addr.is_none());
    }
}
