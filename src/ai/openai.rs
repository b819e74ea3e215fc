use super::{Generation, SpeechRequest, SpeechSynthesizer, TextGenerator, TextRequest, TokenUsage};
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Blocking client for the OpenAI Responses and speech endpoints.
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: &str, base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Configuration("OPENAI_API_KEY is required".into()));
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

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl TextGenerator for OpenAiClient {
    fn generate(&self, request: &TextRequest<'_>) -> Result<Generation> {
        let url = format!("{}/responses", self.base_url);
        tracing::debug!(model = request.model, %url, "requesting text generation");

        let mut body = json!({
            "model": request.model,
            "input": request.prompt,
        });
        if let Some(system) = request.system.filter(|s| !s.trim().is_empty()) {
            body["instructions"] = Value::String(system.to_string());
        }

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|err| Error::generation("openai responses", err))?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(Error::generation(
                "openai responses",
                format!("status {status}: {}", text.trim()),
            ));
        }

        let value: Value = resp
            .json()
            .map_err(|err| Error::generation("openai responses", format!("parse body: {err}")))?;
        let text = extract_output_text(&value).ok_or_else(|| {
            Error::generation("openai responses", "response carried no output text")
        })?;
        let usage = value
            .get("usage")
            .cloned()
            .map(serde_json::from_value::<ResponseUsage>)
            .transpose()?
            .map(TokenUsage::from)
            .unwrap_or_default();

        Ok(Generation { text, usage })
    }
}

impl SpeechSynthesizer for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    fn synthesize(&self, request: &SpeechRequest<'_>) -> Result<Vec<u8>> {
        let url = format!("{}/audio/speech", self.base_url);
        let body = json!({
            "model": request.model,
            "voice": request.voice,
            "input": request.text,
            "response_format": "mp3",
        });

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|err| Error::generation("openai speech", err))?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(Error::generation(
                "openai speech",
                format!("status {status}: {}", text.trim()),
            ));
        }
        let bytes = resp
            .bytes()
            .map_err(|err| Error::generation("openai speech", err))?;
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ResponseUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
    #[serde(default)]
    input_tokens_details: Option<InputTokenDetails>,
    #[serde(default)]
    output_tokens_details: Option<OutputTokenDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct InputTokenDetails {
    #[serde(default)]
    cached_tokens: u64,
}

#[derive(Debug, Default, Deserialize)]
struct OutputTokenDetails {
    #[serde(default)]
    reasoning_tokens: u64,
}

impl From<ResponseUsage> for TokenUsage {
    fn from(usage: ResponseUsage) -> Self {
        TokenUsage {
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            total_tokens: usage.total_tokens,
            cached_tokens: usage.input_tokens_details.map_or(0, |d| d.cached_tokens),
            reasoning_tokens: usage.output_tokens_details.map_or(0, |d| d.reasoning_tokens),
        }
    }
}

/// Pulls assistant text out of a Responses API payload.
pub fn extract_output_text(value: &Value) -> Option<String> {
    if let Some(text) = value.get("output_text").and_then(Value::as_str) {
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }

    let mut acc = String::new();
    for item in value.get("output").and_then(Value::as_array)? {
        if item.get("type").and_then(Value::as_str) == Some("reasoning") {
            continue;
        }
        let Some(contents) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for content in contents {
            if let Some(text) = content.get("text").and_then(Value::as_str) {
                acc.push_str(text);
            }
        }
    }

    if acc.is_empty() {
        None
    } else {
        Some(acc)
    }
}
