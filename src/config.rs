use crate::ai::TtsProvider;
use crate::error::{Error, Result};
use anyhow::Context;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub text: TextConfig,
    #[serde(default)]
    pub tts: TtsConfig,
    #[serde(default = "default_timeout_seconds")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_min_words")]
    pub min_words: usize,
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
    #[serde(default = "default_games_dir")]
    pub games_dir: PathBuf,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(skip)]
    pub openai_api_key: Option<String>,
    #[serde(skip)]
    pub elevenlabs_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    #[serde(default = "default_text_model")]
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    #[serde(default)]
    pub provider: TtsProvider,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_history_max_entries")]
    pub max_entries: usize,
    #[serde(default = "default_history_prompt_window")]
    pub prompt_window: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_storage_prefix")]
    pub prefix: String,
}

/// Values supplied explicitly on the command line; applied after env.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub topic: Option<String>,
    pub voice: Option<String>,
    pub tts_provider: Option<TtsProvider>,
    pub overwrite: Option<bool>,
}

impl Config {
    /// Resolves the config file, then layers environment variables on top.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_path(path)?,
            None => Self::load_discovered()?,
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_discovered() -> anyhow::Result<Self> {
        let project = Self::project_path();
        if project.exists() {
            return Self::load_from_path(&project);
        }

        if let Ok(path) = Self::default_path() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config at {}", path.display()))?;
        let mut config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("parse config at {}", path.display()))?;
        config.apply_defaults();
        Ok(config)
    }

    pub fn init_default() -> anyhow::Result<PathBuf> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let config = Self::default();
        fs::write(&path, serde_json::to_string_pretty(&config)?)?;
        Ok(path)
    }

    pub fn default_path() -> anyhow::Result<PathBuf> {
        let base = BaseDirs::new().context("unable to resolve home directory")?;
        Ok(base.config_dir().join("curious-cast").join("config.json"))
    }

    /// Applies environment values through `lookup` so callers can substitute the source.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(topic) = non_empty("CURIOUS_CAST_TOPIC") {
            self.topic = Some(topic);
        }
        if let Some(model) = non_empty("CURIOUS_CAST_TEXT_MODEL") {
            self.text.model = model;
        }
        if let Some(provider) = non_empty("CURIOUS_CAST_TTS_PROVIDER") {
            match provider.parse::<TtsProvider>() {
                Ok(provider) => self.tts.provider = provider,
                Err(err) => tracing::warn!(%provider, error = %err, "ignoring CURIOUS_CAST_TTS_PROVIDER"),
            }
        }
        if let Some(model) = non_empty("CURIOUS_CAST_TTS_MODEL") {
            self.tts.model = Some(model);
        }
        if let Some(voice) = non_empty("CURIOUS_CAST_VOICE") {
            self.tts.voice = Some(voice);
        }
        if let Some(raw) = non_empty("CURIOUS_CAST_OVERWRITE") {
            match parse_bool(&raw) {
                Some(value) => self.overwrite = value,
                None => tracing::warn!(value = %raw, "ignoring CURIOUS_CAST_OVERWRITE"),
            }
        }
        if let Some(raw) = non_empty("CURIOUS_CAST_MIN_WORDS") {
            match raw.trim().parse() {
                Ok(value) => self.min_words = value,
                Err(_) => tracing::warn!(value = %raw, "ignoring CURIOUS_CAST_MIN_WORDS"),
            }
        }
        if let Some(root) = non_empty("CURIOUS_CAST_STORAGE_ROOT") {
            self.storage.root = Some(PathBuf::from(root));
        }
        if let Some(bucket) = non_empty("CURIOUS_CAST_S3_BUCKET") {
            self.storage.bucket = Some(bucket);
        }
        if let Some(region) = non_empty("AWS_REGION") {
            self.storage.region = Some(region);
        }
        if let Some(prefix) = non_empty("CURIOUS_CAST_STORAGE_PREFIX") {
            self.storage.prefix = prefix;
        }
        if let Some(path) = non_empty("CURIOUS_CAST_HISTORY_PATH") {
            self.history.path = Some(PathBuf::from(path));
        }

        self.openai_api_key = non_empty("OPENAI_API_KEY");
        self.elevenlabs_api_key = non_empty("ELEVENLABS_API_KEY");
        self.apply_defaults();
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(topic) = overrides.topic {
            self.topic = Some(topic);
        }
        if let Some(voice) = overrides.voice {
            self.tts.voice = Some(voice);
        }
        if let Some(provider) = overrides.tts_provider {
            // Models are provider-specific.
            if provider != self.tts.provider {
                self.tts.model = None;
            }
            self.tts.provider = provider;
        }
        if let Some(overwrite) = overrides.overwrite {
            self.overwrite = overwrite;
        }
    }

    /// The configured topic, if it is non-blank.
    pub fn configured_topic(&self) -> Option<&str> {
        self.topic
            .as_deref()
            .map(str::trim)
            .filter(|topic| !topic.is_empty())
    }

    /// Recent topics shown to the model; never more than history keeps.
    pub fn topic_window(&self) -> usize {
        self.history.prompt_window.min(self.history.max_entries)
    }

    pub fn tts_model(&self) -> &str {
        self.tts
            .model
            .as_deref()
            .unwrap_or_else(|| self.tts.provider.default_model())
    }

    pub fn tts_voice(&self) -> &str {
        self.tts
            .voice
            .as_deref()
            .unwrap_or_else(|| self.tts.provider.default_voice())
    }

    pub fn validate(&self) -> Result<()> {
        if self.text.model.trim().is_empty() {
            return Err(Error::Configuration("text.model is required".into()));
        }
        if self.request_timeout_seconds == 0 {
            return Err(Error::Configuration(
                "request_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.min_words == 0 {
            return Err(Error::Configuration("min_words must be greater than 0".into()));
        }
        Ok(())
    }

    pub fn validate_for_script(&self) -> Result<()> {
        self.validate()?;
        if self.openai_api_key.is_none() {
            return Err(Error::Configuration(
                "OPENAI_API_KEY is required for script generation".into(),
            ));
        }
        Ok(())
    }

    pub fn validate_for_audio(&self) -> Result<()> {
        self.validate()?;
        let key = match self.tts.provider {
            TtsProvider::OpenAi => (&self.openai_api_key, "OPENAI_API_KEY"),
            TtsProvider::ElevenLabs => (&self.elevenlabs_api_key, "ELEVENLABS_API_KEY"),
        };
        if key.0.is_none() {
            return Err(Error::Configuration(format!(
                "{} is required for {} speech synthesis",
                key.1, self.tts.provider
            )));
        }
        if self.tts_voice().trim().is_empty() {
            return Err(Error::Configuration("tts.voice is required".into()));
        }
        Ok(())
    }

    /// True when either a bucket or a local storage root is set.
    pub fn publish_configured(&self) -> bool {
        self.storage.bucket.is_some() || self.storage.root.is_some()
    }

    pub fn validate_for_publish(&self) -> Result<()> {
        if !self.publish_configured() {
            return Err(Error::Configuration(
                "storage.bucket or storage.root is required for publish".into(),
            ));
        }
        Ok(())
    }

    fn apply_defaults(&mut self) {
        if self.tts.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            self.tts.model = None;
        }
        if self.tts.voice.as_deref().is_some_and(|v| v.trim().is_empty()) {
            self.tts.voice = None;
        }
        if self.storage.bucket.as_deref().is_some_and(|b| b.trim().is_empty()) {
            self.storage.bucket = None;
        }
        if self.storage.prefix.trim().is_empty() {
            self.storage.prefix = default_storage_prefix();
        }
    }

    fn project_path() -> PathBuf {
        PathBuf::from("curious-cast.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topic: None,
            text: TextConfig::default(),
            tts: TtsConfig::default(),
            request_timeout_seconds: default_timeout_seconds(),
            min_words: default_min_words(),
            out_dir: default_out_dir(),
            assets_dir: default_assets_dir(),
            games_dir: default_games_dir(),
            overwrite: false,
            history: HistoryConfig::default(),
            storage: StorageConfig::default(),
            openai_api_key: None,
            elevenlabs_api_key: None,
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            model: default_text_model(),
            base_url: None,
        }
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: TtsProvider::default(),
            model: None,
            voice: None,
            base_url: None,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_entries: default_history_max_entries(),
            prompt_window: default_history_prompt_window(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: None,
            bucket: None,
            region: None,
            prefix: default_storage_prefix(),
        }
    }
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "n" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_timeout_seconds() -> u64 {
    120
}

fn default_min_words() -> usize {
    650
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("out")
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets").join("audio")
}

fn default_games_dir() -> PathBuf {
    PathBuf::from("games")
}

fn default_text_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_history_max_entries() -> usize {
    60
}

fn default_history_prompt_window() -> usize {
    30
}

fn default_storage_prefix() -> String {
    "curious-cast".to_string()
}
