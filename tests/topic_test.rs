mod common;

use chrono::{TimeZone, Utc};
use common::ScriptedGenerator;
use curious_cast::ai::TextGenerator;
use curious_cast::config::Config;
use curious_cast::error::Error;
use curious_cast::podcast::history::{TopicHistory, TopicHistoryEntry};
use curious_cast::podcast::topic::{
    build_topic_prompt, sanitize_topic, select_topic, RECENT_TOPICS_HEADER, TOPIC_SYSTEM_PROMPT,
};

fn history(topics: &[&str]) -> TopicHistory {
    let mut history = TopicHistory::default();
    for (day, topic) in topics.iter().enumerate() {
        let day = day as u32 + 1;
        history.record(
            TopicHistoryEntry {
                topic: topic.to_string(),
                published_at: Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap(),
                episode_id: Some(format!("2026-03-{day:02}")),
            },
            60,
        );
    }
    history
}

#[test]
fn sanitize_keeps_first_line_only() {
    assert_eq!(sanitize_topic("\n  Deep Sea Vents  \nA second idea"), "Deep Sea Vents");
}

#[test]
fn sanitize_strips_surrounding_quotes() {
    assert_eq!(sanitize_topic("\"Octopus Camouflage.\"\nExtra line"), "Octopus Camouflage");
    assert_eq!(sanitize_topic("'Moon Phases'"), "Moon Phases");
    assert_eq!(sanitize_topic("\"'Rainbows'\""), "Rainbows");
}

#[test]
fn sanitize_removes_one_trailing_period() {
    assert_eq!(sanitize_topic("Volcanoes."), "Volcanoes");
    assert_eq!(sanitize_topic("Volcanoes.."), "Volcanoes.");
    assert_eq!(sanitize_topic("Dr. Seuss Science"), "Dr. Seuss Science");
}

#[test]
fn sanitize_drops_unpaired_quotes() {
    assert_eq!(sanitize_topic("\"Comets"), "Comets");
    assert_eq!(sanitize_topic("Comets'"), "Comets");
}

#[test]
fn blank_reply_is_an_empty_topic() {
    for reply in ["   \n", "\".\"", "''"] {
        let mut generator = ScriptedGenerator::new(vec![200]);
        generator.topic_reply = reply.to_string();

        let err = select_topic(&Config::default(), Some(&generator as &dyn TextGenerator), &TopicHistory::default())
            .unwrap_err();

        assert!(matches!(err, Error::EmptyTopic), "reply {reply:?}");
        assert_eq!(generator.requests().len(), 1);
    }
}

#[test]
fn missing_generator_is_a_configuration_error() {
    let err = select_topic(&Config::default(), None, &TopicHistory::default()).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[test]
fn configured_topic_skips_the_generator() {
    let mut config = Config::default();
    config.topic = Some("  Tide Pools ".into());
    let generator = ScriptedGenerator::new(vec![200]);

    let choice = select_topic(&config, Some(&generator as &dyn TextGenerator), &TopicHistory::default()).unwrap();

    assert_eq!(choice.topic, "Tide Pools");
    assert!(!choice.generated);
    assert!(generator.requests().is_empty());
}

#[test]
fn prompt_window_is_capped_by_history_size() {
    let mut config = Config::default();
    config.history.max_entries = 2;
    config.history.prompt_window = 30;
    let generator = ScriptedGenerator::new(vec![200]);

    select_topic(&config, Some(&generator as &dyn TextGenerator), &history(&["Bees", "Comets", "Tides"])).unwrap();

    let requests = generator.requests();
    assert_eq!(requests[0].system.as_deref(), Some(TOPIC_SYSTEM_PROMPT));
    assert!(requests[0].prompt.contains("\n- Tides\n- Comets"));
    assert!(!requests[0].prompt.contains("Bees"));
}

#[test]
fn prompt_without_history_has_no_recent_list() {
    assert!(!build_topic_prompt(&TopicHistory::default(), 30).contains(RECENT_TOPICS_HEADER));
    let prompt = build_topic_prompt(&history(&["Bees", ""]), 30);
    assert!(prompt.ends_with(&format!("{RECENT_TOPICS_HEADER}\n- Bees")));
}
