#![allow(dead_code)]

use curious_cast::ai::{
    Generation, SpeechRequest, SpeechSynthesizer, TextGenerator, TextRequest, TokenUsage,
};
use curious_cast::error::{Error, Result};
use curious_cast::podcast::games::GAME_SYSTEM_PROMPT;
use curious_cast::podcast::history::{HistoryStore, TopicHistory};
use curious_cast::podcast::topic::TOPIC_SYSTEM_PROMPT;
use std::cell::{Cell, RefCell};

const FILLER: &[&str] = &[
    "Lava", "glows", "bright", "orange", "when", "it", "flows", "down", "the", "hill.",
];

/// `words` words of harmless sentence text.
pub fn filler(words: usize) -> String {
    (0..words)
        .map(|i| FILLER[i % FILLER.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub system: Option<String>,
    pub prompt: String,
}

/// Answers by request shape instead of call order.
///
/// Section and game replies use `words[attempt]` words, where the attempt is
/// counted from intro requests; the last entry repeats.
pub struct ScriptedGenerator {
    pub topic_reply: String,
    pub words: Vec<usize>,
    pub inject: Option<(String, String)>,
    pub fail_section: Option<String>,
    requests: RefCell<Vec<Recorded>>,
    attempts: Cell<usize>,
}

impl ScriptedGenerator {
    pub fn new(words: Vec<usize>) -> Self {
        Self {
            topic_reply: "\"Octopus Camouflage.\"\nExtra line".to_string(),
            words,
            inject: None,
            fail_section: None,
            requests: RefCell::new(Vec::new()),
            attempts: Cell::new(0),
        }
    }

    pub fn injecting(mut self, section_id: &str, text: &str) -> Self {
        self.inject = Some((section_id.to_string(), text.to_string()));
        self
    }

    pub fn failing_on(mut self, section_id: &str) -> Self {
        self.fail_section = Some(section_id.to_string());
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.borrow().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }

    fn current_words(&self) -> usize {
        let index = self.attempts.get().saturating_sub(1);
        self.words
            .get(index)
            .or_else(|| self.words.last())
            .copied()
            .unwrap_or(0)
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, request: &TextRequest<'_>) -> Result<Generation> {
        self.requests.borrow_mut().push(Recorded {
            system: request.system.map(str::to_string),
            prompt: request.prompt.to_string(),
        });
        let usage = TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
            total_tokens: 15,
            ..TokenUsage::default()
        };

        if request.system == Some(TOPIC_SYSTEM_PROMPT) {
            return Ok(Generation {
                text: self.topic_reply.clone(),
                usage,
            });
        }

        let section_id = if request.system == Some(GAME_SYSTEM_PROMPT) {
            "game".to_string()
        } else {
            request
                .prompt
                .lines()
                .find_map(|line| line.strip_prefix("Section ID: "))
                .unwrap_or("unknown")
                .to_string()
        };
        if section_id == "intro" {
            self.attempts.set(self.attempts.get() + 1);
        }
        if self.fail_section.as_deref() == Some(section_id.as_str()) {
            return Err(Error::generation("fake", "scripted failure"));
        }

        let mut text = filler(self.current_words());
        if let Some((target, extra)) = &self.inject {
            if *target == section_id {
                text.push(' ');
                text.push_str(extra);
            }
        }
        Ok(Generation { text, usage })
    }
}

/// Returns `<text>` as the "audio" so concatenation is easy to assert.
#[derive(Default)]
pub struct FakeSynthesizer {
    pub fail: bool,
    calls: RefCell<Vec<String>>,
}

impl FakeSynthesizer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl SpeechSynthesizer for FakeSynthesizer {
    fn name(&self) -> &str {
        "fake"
    }

    fn synthesize(&self, request: &SpeechRequest<'_>) -> Result<Vec<u8>> {
        self.calls.borrow_mut().push(request.text.to_string());
        if self.fail {
            return Err(Error::generation("fake speech", "scripted failure"));
        }
        Ok(format!("<{}>", request.text).into_bytes())
    }
}

#[derive(Default)]
pub struct MemoryHistoryStore {
    pub history: RefCell<TopicHistory>,
    pub saves: Cell<usize>,
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<TopicHistory> {
        Ok(self.history.borrow().clone())
    }

    fn save(&self, history: &TopicHistory) -> Result<()> {
        *self.history.borrow_mut() = history.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
