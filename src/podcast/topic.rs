use super::history::TopicHistory;
use crate::ai::{TextGenerator, TextRequest, TokenUsage};
use crate::config::Config;
use crate::error::{Error, Result};

pub const TOPIC_SYSTEM_PROMPT: &str =
    "You propose safe, accurate science topics for advanced 7-year-olds.";

const TOPIC_PROMPT: &str = "Propose a single science topic for an advanced 7-year-old. \
Examples of topics: animals, cultural celebrations, science, astronomy, history, geography, physics, chemistry, biology, or nature. \
The topic should be interesting and engaging for a 7-year-old. \
The topic should be safe and appropriate for a 7-year-old. \
You may focus on a specific animal, plant, planet, star, or other specific thing to do a deep-dive, or you may focus on a general science topic. \
The topic should be accurate and up to date. \
Reply with a short title only.";

pub const RECENT_TOPICS_HEADER: &str =
    "Recent topics (do not repeat or closely paraphrase any topics in this list):";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicChoice {
    pub topic: String,
    pub usage: TokenUsage,
    /// False when the topic came straight from configuration.
    pub generated: bool,
}

/// Returns the configured topic, or asks `generator` for one steered away from `history`.
pub fn select_topic(
    config: &Config,
    generator: Option<&dyn TextGenerator>,
    history: &TopicHistory,
) -> Result<TopicChoice> {
    if let Some(topic) = config.configured_topic() {
        return Ok(TopicChoice {
            topic: topic.to_string(),
            usage: TokenUsage::default(),
            generated: false,
        });
    }

    let generator = generator.ok_or_else(|| {
        Error::Configuration("a text generator is required to propose a topic".into())
    })?;

    let prompt = build_topic_prompt(history, config.topic_window());
    let generation = generator
        .generate(&TextRequest {
            model: &config.text.model,
            system: Some(TOPIC_SYSTEM_PROMPT),
            prompt: &prompt,
        })
        .map_err(|err| err.at_stage("topic selection"))?;

    let topic = sanitize_topic(&generation.text);
    if topic.is_empty() {
        return Err(Error::EmptyTopic);
    }
    tracing::info!(%topic, "topic proposed");
    Ok(TopicChoice {
        topic,
        usage: generation.usage,
        generated: true,
    })
}

pub fn build_topic_prompt(history: &TopicHistory, window: usize) -> String {
    let recent = history.recent_topics(window);
    if recent.is_empty() {
        return TOPIC_PROMPT.to_string();
    }
    let mut prompt = String::from(TOPIC_PROMPT);
    prompt.push_str("\n\n");
    prompt.push_str(RECENT_TOPICS_HEADER);
    for topic in recent {
        prompt.push_str("\n- ");
        prompt.push_str(topic);
    }
    prompt
}

/// First line only; a leading and a trailing quote (`"` then `'`) and one trailing period removed.
pub fn sanitize_topic(raw: &str) -> String {
    let first_line = raw.trim().lines().next().unwrap_or_default().trim();
    let mut topic = first_line;
    for quote in ['"', '\''] {
        topic = topic.strip_prefix(quote).unwrap_or(topic);
        topic = topic.strip_suffix(quote).unwrap_or(topic);
    }
    let topic = topic.trim();
    topic.strip_suffix('.').unwrap_or(topic).trim().to_string()
}
