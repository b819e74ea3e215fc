pub mod elevenlabs;
pub mod openai;

use crate::config::Config;
use crate::error::{Error, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;
use std::time::Duration;

pub use elevenlabs::ElevenLabsClient;
pub use openai::OpenAiClient;

/// Token accounting reported by the text provider. Summed across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub cached_tokens: u64,
    pub reasoning_tokens: u64,
}

impl Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, other: TokenUsage) -> TokenUsage {
        TokenUsage {
            input_tokens: self.input_tokens + other.input_tokens,
            output_tokens: self.output_tokens + other.output_tokens,
            total_tokens: self.total_tokens + other.total_tokens,
            cached_tokens: self.cached_tokens + other.cached_tokens,
            reasoning_tokens: self.reasoning_tokens + other.reasoning_tokens,
        }
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: TokenUsage) {
        *self = *self + other;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextRequest<'a> {
    pub model: &'a str,
    pub system: Option<&'a str>,
    pub prompt: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct Generation {
    pub text: String,
    pub usage: TokenUsage,
}

pub trait TextGenerator {
    fn generate(&self, request: &TextRequest<'_>) -> Result<Generation>;
}

#[derive(Debug, Clone, Copy)]
pub struct SpeechRequest<'a> {
    pub model: &'a str,
    pub voice: &'a str,
    pub text: &'a str,
}

/// Turns text into an MP3 byte stream.
pub trait SpeechSynthesizer {
    fn name(&self) -> &str;
    fn synthesize(&self, request: &SpeechRequest<'_>) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    #[default]
    #[value(name = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
    #[value(name = "elevenlabs", alias = "eleven-labs")]
    #[serde(rename = "elevenlabs")]
    ElevenLabs,
}

impl TtsProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            TtsProvider::OpenAi => "openai",
            TtsProvider::ElevenLabs => "elevenlabs",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            TtsProvider::OpenAi => "gpt-4o-mini-tts",
            TtsProvider::ElevenLabs => "eleven_multilingual_v2",
        }
    }

    pub fn default_voice(self) -> &'static str {
        match self {
            TtsProvider::OpenAi => "alloy",
            TtsProvider::ElevenLabs => "21m00Tcm4TlvDq8ikWAM",
        }
    }
}

impl fmt::Display for TtsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TtsProvider {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "openai" => Ok(TtsProvider::OpenAi),
            "elevenlabs" | "eleven-labs" => Ok(TtsProvider::ElevenLabs),
            other => Err(Error::Configuration(format!(
                "unsupported tts provider: {other}"
            ))),
        }
    }
}

/// The speech provider picked once at startup.
pub enum SpeechBackend {
    OpenAi(OpenAiClient),
    ElevenLabs(ElevenLabsClient),
}

impl SpeechBackend {
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = request_timeout(config);
        match config.tts.provider {
            TtsProvider::OpenAi => {
                let key = config.openai_api_key.as_deref().ok_or_else(|| {
                    Error::Configuration("OPENAI_API_KEY is required for openai speech".into())
                })?;
                let client = OpenAiClient::new(key, config.tts.base_url.as_deref(), timeout)?;
                Ok(SpeechBackend::OpenAi(client))
            }
            TtsProvider::ElevenLabs => {
                let key = config.elevenlabs_api_key.as_deref().ok_or_else(|| {
                    Error::Configuration(
                        "ELEVENLABS_API_KEY is required for elevenlabs speech".into(),
                    )
                })?;
                let client = ElevenLabsClient::new(key, config.tts.base_url.as_deref(), timeout)?;
                Ok(SpeechBackend::ElevenLabs(client))
            }
        }
    }
}

impl SpeechSynthesizer for SpeechBackend {
    fn name(&self) -> &str {
        match self {
            SpeechBackend::OpenAi(client) => client.name(),
            SpeechBackend::ElevenLabs(client) => client.name(),
        }
    }

    fn synthesize(&self, request: &SpeechRequest<'_>) -> Result<Vec<u8>> {
        match self {
            SpeechBackend::OpenAi(client) => client.synthesize(request),
            SpeechBackend::ElevenLabs(client) => client.synthesize(request),
        }
    }
}

pub fn text_client(config: &Config) -> Result<OpenAiClient> {
    let key = config.openai_api_key.as_deref().ok_or_else(|| {
        Error::Configuration("OPENAI_API_KEY is required for text generation".into())
    })?;
    OpenAiClient::new(key, config.text.base_url.as_deref(), request_timeout(config))
}

fn request_timeout(config: &Config) -> Duration {
    Duration::from_secs(config.request_timeout_seconds.max(1))
}
