use super::calendar::{self, Holiday};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const INTRO: &str = "intro";
pub const TOPIC: &str = "topic";
pub const GAME: &str = "game";
pub const OUTRO: &str = "outro";

/// Canonical order of every episode section, `game` included.
pub const STANDARD_SECTION_IDS: [&str; 4] = [INTRO, TOPIC, GAME, OUTRO];

pub const HOST_NAME: &str = "Jessica";
pub const SHOW_NAME: &str = "Curious World Podcast";

const DEFAULT_TRANSITION: &str = "Continue as if you are finishing the previous thought, no headings, no resets. Do not repeat the greeting.";

const TOPIC_TRANSITION: &str = "Continue directly from the intro with no reset. Do not add another greeting, teaser, or second lead-in. Start teaching the topic in the first sentence.";

const MAX_ANCHOR_SENTENCES: usize = 5;
const SHORT_ANCHOR_SENTENCES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub section_id: String,
    pub prompt: String,
    #[serde(default)]
    pub continuity_context: String,
    #[serde(default)]
    pub transition_instructions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeSection {
    pub section_id: String,
    pub text: String,
}

impl EpisodeSection {
    pub fn new(section_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            text: text.into(),
        }
    }
}

/// Plans `intro`, `topic`, `outro` for `topic` on `date`.
pub fn plan_sections(topic: &str, date: NaiveDate) -> Vec<SectionSpec> {
    vec![
        SectionSpec {
            section_id: INTRO.to_string(),
            prompt: intro_prompt(topic, date),
            continuity_context: String::new(),
            transition_instructions: DEFAULT_TRANSITION.to_string(),
        },
        SectionSpec {
            section_id: TOPIC.to_string(),
            prompt: topic_prompt(topic),
            continuity_context: String::new(),
            transition_instructions: TOPIC_TRANSITION.to_string(),
        },
        SectionSpec {
            section_id: OUTRO.to_string(),
            prompt: outro_prompt(topic, date),
            continuity_context: String::new(),
            transition_instructions: DEFAULT_TRANSITION.to_string(),
        },
    ]
}

fn intro_prompt(topic: &str, date: NaiveDate) -> String {
    let date_label = date.format("%A, %B %-d, %Y");
    let day_phrase = calendar::day_phrase(date);
    let mut prompt = format!(
        "Write a warm, friendly podcast welcome for kids that sounds like welcoming a group of friends. \
         Greet listeners to the \"{SHOW_NAME}\" and introduce the host, {HOST_NAME}. \
         Mention today's date ({date_label}) and say you hope everyone is having a wonderful {day_phrase}. \
         Keep it 3-5 sentences, upbeat, and welcoming. \
         End with exactly one short sentence that introduces {topic:?}. \
         Do not add a second teaser or additional lead-in sentence after that."
    );
    if let Some(holiday) = calendar::holiday_on(date) {
        prompt.push(' ');
        prompt.push_str(&format!("Before introducing {topic:?}, briefly recognize that today is {}. ", holiday.name));
        prompt.push_str(&holiday_wish(holiday, "today"));
    }
    prompt
}

fn topic_prompt(topic: &str) -> String {
    format!(
        "Explain the core idea about {topic:?} in a clear, curious voice, then add a deeper dive. \
         Use relatable analogies and include one surprising fact. \
         Keep it 4-6 short paragraphs total."
    )
}

fn outro_prompt(topic: &str, date: NaiveDate) -> String {
    let date_label = date.format("%A, %B %-d");
    let mut prompt = format!(
        "Wrap up the episode about {topic:?} with a friendly recap and a thoughtful question for listeners. \
         Use first-person voice as {HOST_NAME}. \
         Instead of a mechanical date callout, weave it into a warm wish like: \"I hope everyone has an amazing {date_label}.\" \
         Keep it 3-5 sentences."
    );
    if let Some(holiday) = calendar::holiday_tomorrow(date) {
        prompt.push(' ');
        prompt.push_str(&format!("Also mention that tomorrow is {}. ", holiday.name));
        prompt.push_str(&holiday_wish(holiday, "tomorrow"));
    }
    prompt
}

fn holiday_wish(holiday: Holiday, when: &str) -> String {
    format!(
        "Add one short, kid-friendly sentence about what the holiday celebrates ({}), \
         then include: \"If you're celebrating, I hope you have a wonderful holiday {when}.\"",
        holiday.description
    )
}

/// Builds the user prompt for a single section.
pub fn build_section_prompt(base_prompt: &str, spec: &SectionSpec) -> String {
    let mut out = String::new();
    let base = base_prompt.trim();
    if !base.is_empty() {
        out.push_str(base);
        out.push_str("\n\n");
    }
    out.push_str(&format!("Section ID: {}\n", spec.section_id));
    out.push_str("Section prompt: ");
    out.push_str(spec.prompt.trim());
    out.push('\n');

    let continuity = spec.continuity_context.trim();
    if !continuity.is_empty() {
        out.push_str("Continuity anchor:\n");
        out.push_str(continuity);
        out.push('\n');
    }

    let transition = spec.transition_instructions.trim();
    if !transition.is_empty() {
        out.push_str("Transition instructions: ");
        out.push_str(transition);
    }
    out.trim().to_string()
}

pub fn state_summary(section_id: &str) -> String {
    format!(
        "State summary: The previous section ({section_id}) just ended its main point; flow naturally into the next section."
    )
}

/// The closing sentences of `text` followed by one state-summary line.
pub fn build_continuity_anchor(text: &str, section_id: &str) -> String {
    let sentences = split_sentences(text);
    let keep = if sentences.len() > MAX_ANCHOR_SENTENCES {
        MAX_ANCHOR_SENTENCES
    } else if sentences.len() > SHORT_ANCHOR_SENTENCES {
        SHORT_ANCHOR_SENTENCES
    } else {
        sentences.len()
    };

    let tail = sentences[sentences.len() - keep..].join(" ");
    let tail = tail.trim();
    let summary = state_summary(section_id);
    if tail.is_empty() {
        summary
    } else {
        format!("{tail}\n{summary}")
    }
}

/// Splits on `.`, `!` and `?`. A trailing unterminated fragment counts as a sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let normalized = text.trim().replace('\n', " ");
    let mut sentences = Vec::new();
    let mut current = String::new();
    for ch in normalized.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            let fragment = current.trim();
            if !fragment.is_empty() {
                sentences.push(fragment.to_string());
            }
            current.clear();
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

pub fn section_heading(section_id: &str) -> String {
    match section_id {
        INTRO => "Intro".to_string(),
        TOPIC => "Topic".to_string(),
        GAME => "Brain Game".to_string(),
        OUTRO => "Outro".to_string(),
        other => other
            .split(['-', ' '])
            .filter(|word| !word.is_empty())
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
