use curious_cast::ai::openai::extract_output_text;
use curious_cast::ai::TtsProvider;
use curious_cast::config::{parse_bool, Config, Overrides};
use curious_cast::error::Error;
use serde_json::json;
use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_match_documented_values() {
    let config = Config::default();
    assert_eq!(config.text.model, "gpt-4o-mini");
    assert_eq!(config.min_words, 650);
    assert_eq!(config.request_timeout_seconds, 120);
    assert_eq!(config.history.max_entries, 60);
    assert_eq!(config.history.prompt_window, 30);
    assert_eq!(config.storage.prefix, "curious-cast");
    assert_eq!(config.tts.provider, TtsProvider::OpenAi);
    assert_eq!(config.tts_voice(), "alloy");
    assert!(!config.overwrite);
    assert!(config.validate().is_ok());
}

#[test]
fn file_values_fill_missing_fields_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"topic":"Tide pools","tts":{"provider":"elevenlabs","voice":""},"min_words":500}"#,
    )
    .unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.configured_topic(), Some("Tide pools"));
    assert_eq!(config.min_words, 500);
    assert_eq!(config.tts.provider, TtsProvider::ElevenLabs);
    assert_eq!(config.tts_voice(), TtsProvider::ElevenLabs.default_voice());
    assert_eq!(config.tts_model(), "eleven_multilingual_v2");
    assert_eq!(config.text.model, "gpt-4o-mini");
}

#[test]
fn environment_overrides_file_values() {
    let mut config = Config::default();
    config.topic = Some("From file".into());
    config.apply_env(env(&[
        ("CURIOUS_CAST_TOPIC", "From env"),
        ("CURIOUS_CAST_TTS_PROVIDER", "elevenlabs"),
        ("CURIOUS_CAST_OVERWRITE", "yes"),
        ("CURIOUS_CAST_MIN_WORDS", "700"),
        ("CURIOUS_CAST_STORAGE_ROOT", "/tmp/bucket"),
        ("OPENAI_API_KEY", "sk-test"),
    ]));

    assert_eq!(config.configured_topic(), Some("From env"));
    assert_eq!(config.tts.provider, TtsProvider::ElevenLabs);
    assert!(config.overwrite);
    assert_eq!(config.min_words, 700);
    assert!(config.storage.root.is_some());
    assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
    assert!(config.elevenlabs_api_key.is_none());
}

#[test]
fn invalid_environment_values_are_ignored() {
    let mut config = Config::default();
    config.apply_env(env(&[
        ("CURIOUS_CAST_TTS_PROVIDER", "nope"),
        ("CURIOUS_CAST_MIN_WORDS", "lots"),
        ("CURIOUS_CAST_TOPIC", "   "),
    ]));
    assert_eq!(config.tts.provider, TtsProvider::OpenAi);
    assert_eq!(config.min_words, 650);
    assert_eq!(config.configured_topic(), None);
}

#[test]
fn explicit_overrides_win() {
    let mut config = Config::default();
    config.apply_env(env(&[("CURIOUS_CAST_VOICE", "nova")]));
    config.apply_overrides(Overrides {
        topic: Some("Owls".into()),
        voice: Some("shimmer".into()),
        tts_provider: None,
        overwrite: Some(true),
    });
    assert_eq!(config.configured_topic(), Some("Owls"));
    assert_eq!(config.tts_voice(), "shimmer");
    assert!(config.overwrite);
}

#[test]
fn stage_validation_names_missing_keys() {
    let config = Config::default();
    assert!(matches!(config.validate_for_script(), Err(Error::Configuration(_))));
    assert!(matches!(config.validate_for_audio(), Err(Error::Configuration(_))));
    assert!(matches!(config.validate_for_publish(), Err(Error::Configuration(_))));

    let mut ready = Config::default();
    ready.apply_env(env(&[
        ("OPENAI_API_KEY", "sk-test"),
        ("CURIOUS_CAST_STORAGE_ROOT", "/tmp/bucket"),
    ]));
    assert!(ready.validate_for_script().is_ok());
    assert!(ready.validate_for_audio().is_ok());
    assert!(ready.validate_for_publish().is_ok());
}

#[test]
fn booleans_accept_common_spellings() {
    assert_eq!(parse_bool("TRUE"), Some(true));
    assert_eq!(parse_bool(" 0 "), Some(false));
    assert_eq!(parse_bool("maybe"), None);
}

#[test]
fn provider_names_parse() {
    assert_eq!("OpenAI".parse::<TtsProvider>().unwrap(), TtsProvider::OpenAi);
    assert_eq!("eleven-labs".parse::<TtsProvider>().unwrap(), TtsProvider::ElevenLabs);
    assert!("polly".parse::<TtsProvider>().is_err());
}

#[test]
fn output_text_prefers_top_level_field() {
    let body = json!({"output_text": "Tide Pools", "output": []});
    assert_eq!(extract_output_text(&body).as_deref(), Some("Tide Pools"));
}

#[test]
fn output_text_skips_reasoning_items() {
    let body = json!({
        "output": [
            {"type": "reasoning", "content": [{"type": "output_text", "text": "thinking"}]},
            {"type": "message", "content": [
                {"type": "output_text", "text": "Hello "},
                {"type": "output_text", "text": "kids"}
            ]}
        ]
    });
    assert_eq!(extract_output_text(&body).as_deref(), Some("Hello kids"));
    assert_eq!(extract_output_text(&json!({"output": []})), None);
}

#[test]
fn same_provider_override_keeps_configured_model() {
    let mut config = Config::default();
    config.apply_env(env(&[
        ("CURIOUS_CAST_TTS_PROVIDER", "elevenlabs"),
        ("CURIOUS_CAST_TTS_MODEL", "eleven_turbo_v2"),
    ]));
    config.apply_overrides(Overrides {
        tts_provider: Some(TtsProvider::ElevenLabs),
        ..Overrides::default()
    });
    assert_eq!(config.tts_model(), "eleven_turbo_v2");

    config.apply_overrides(Overrides {
        tts_provider: Some(TtsProvider::OpenAi),
        ..Overrides::default()
    });
    assert_eq!(config.tts_model(), TtsProvider::OpenAi.default_model());
}

#[test]
fn small_history_bound_is_valid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"history":{"max_entries":10}}"#).unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.history.prompt_window, 30);
    assert_eq!(config.topic_window(), 10);
}

#[test]
fn bucket_alone_enables_publish() {
    let mut config = Config::default();
    config.apply_env(env(&[
        ("CURIOUS_CAST_S3_BUCKET", "kids-podcast"),
        ("AWS_REGION", "eu-west-1"),
    ]));
    assert_eq!(config.storage.bucket.as_deref(), Some("kids-podcast"));
    assert_eq!(config.storage.region.as_deref(), Some("eu-west-1"));
    assert!(config.storage.root.is_none());
    assert!(config.publish_configured());
    assert!(config.validate_for_publish().is_ok());
}
