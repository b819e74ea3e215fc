use super::{SpeechRequest, SpeechSynthesizer};
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
const OUTPUT_FORMAT: &str = "mp3_44100_128";
const XI_API_KEY_HEADER: &str = "xi-api-key";

pub struct ElevenLabsClient {
    http: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.0,
            similarity_boost: 0.75,
            style: 0.0,
            use_speaker_boost: true,
        }
    }
}

#[derive(Serialize)]
struct ConvertBody<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

impl ElevenLabsClient {
    pub fn new(api_key: &str, base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Configuration("ELEVENLABS_API_KEY is required".into()));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| Error::Configuration(format!("build http client: {err}")))?;
        let base_url = base_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url,
        })
    }

    fn endpoint(&self, voice_id: &str) -> String {
        format!("{}/v1/text-to-speech/{voice_id}", self.base_url)
    }
}

impl SpeechSynthesizer for ElevenLabsClient {
    fn name(&self) -> &str {
        "elevenlabs"
    }

    fn synthesize(&self, request: &SpeechRequest<'_>) -> Result<Vec<u8>> {
        if request.voice.trim().is_empty() {
            return Err(Error::Configuration("elevenlabs voice id is required".into()));
        }
        if request.text.trim().is_empty() {
            return Err(Error::Validation("speech text is empty".into()));
        }

        let body = ConvertBody {
            text: request.text,
            model_id: request.model,
            voice_settings: VoiceSettings::default(),
        };
        let resp = self
            .http
            .post(self.endpoint(request.voice))
            .query(&[("output_format", OUTPUT_FORMAT)])
            .header(XI_API_KEY_HEADER, &self.api_key)
            .header("accept", "audio/mpeg")
            .json(&body)
            .send()
            .map_err(|err| Error::generation("elevenlabs speech", err))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(Error::generation(
                "elevenlabs speech",
                format!("status {status}: {}", text.trim()),
            ));
        }
        let bytes = resp
            .bytes()
            .map_err(|err| Error::generation("elevenlabs speech", err))?;
        Ok(bytes.to_vec())
    }
}
