use super::episode::{safety_check, word_count, Episode};
use super::games::{choose_game, generate_game_round, insert_game_section, GameRules};
use super::generator::{RawTranscript, SectionGenerator};
use super::history::{HistoryStore, TopicHistoryEntry};
use super::sections::{plan_sections, STANDARD_SECTION_IDS};
use super::topic::select_topic;
use crate::ai::{TextGenerator, TokenUsage};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::paths::{self, OutputLayout};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::PathBuf;

pub const EPISODE_SYSTEM_PROMPT: &str = "You are an expert kid's science podcaster for advanced 7-year-olds. \
Be engaging, positive, accurate, and safe. \
Use clear explanations and relatable analogies. \
Avoid scary, graphic, or unsafe content.";

pub const TIGHTEN_NOTE: &str =
    "Tighten to about 800 words (±100) while keeping every section complete.";

pub const TARGET_WORDS: usize = 800;

pub fn base_episode_prompt(topic: &str) -> String {
    format!(
        "We are writing one continuous {TARGET_WORDS}-word audio episode on {topic:?}, one section at a time. \
         Write plain spoken prose for a single narrator: no Markdown headings, no lists, no stage directions. \
         Keep it upbeat, kid-safe, accurate, and easy to follow. Avoid unsafe instructions."
    )
}

/// Where the length retry stands. There is exactly one retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Initial,
    RetriedOnce,
}

impl Attempt {
    pub fn system_prompt(self, base: &str) -> Cow<'_, str> {
        match self {
            Attempt::Initial => Cow::Borrowed(base),
            Attempt::RetriedOnce => Cow::Owned(format!("{base} {TIGHTEN_NOTE}")),
        }
    }

    /// The state after a too-short draft, or `None` once the retry is spent.
    pub fn next(self) -> Option<Attempt> {
        match self {
            Attempt::Initial => Some(Attempt::RetriedOnce),
            Attempt::RetriedOnce => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Draft {
    pub episode: Episode,
    pub markdown: String,
    pub word_count: usize,
    pub attempt: Attempt,
    pub game: String,
}

/// Drafts, validates, renders and safety-checks an episode.
pub struct EpisodeAssembler<'a> {
    pub generator: &'a dyn TextGenerator,
    pub model: &'a str,
    pub min_words: usize,
    pub games: &'a [GameRules],
}

impl EpisodeAssembler<'_> {
    pub fn draft(
        &self,
        topic: &str,
        date: NaiveDate,
        raw: &mut RawTranscript,
        usage: &mut TokenUsage,
    ) -> Result<Draft> {
        let game = choose_game(date, self.games)?;
        let base_prompt = base_episode_prompt(topic);
        let mut attempt = Attempt::Initial;

        loop {
            let system = attempt.system_prompt(EPISODE_SYSTEM_PROMPT);
            let episode = self.draft_once(topic, date, &system, &base_prompt, game, raw, usage)?;
            episode.validate()?;

            let markdown = episode.render_markdown();
            let words = word_count(&markdown);
            if words >= self.min_words {
                tracing::info!(words, "running safety check");
                safety_check(&markdown)?;
                return Ok(Draft {
                    episode,
                    markdown,
                    word_count: words,
                    attempt,
                    game: game.name.clone(),
                });
            }

            match attempt.next() {
                Some(next) => {
                    tracing::warn!(words, minimum = self.min_words, "script too short; retrying once");
                    attempt = next;
                }
                None => {
                    return Err(Error::Length {
                        words,
                        minimum: self.min_words,
                    })
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draft_once(
        &self,
        topic: &str,
        date: NaiveDate,
        system: &str,
        base_prompt: &str,
        game: &GameRules,
        raw: &mut RawTranscript,
        usage: &mut TokenUsage,
    ) -> Result<Episode> {
        let specs = plan_sections(topic, date);
        let generated = SectionGenerator {
            generator: self.generator,
            model: self.model,
            system,
            base_prompt,
        }
        .generate(&specs, raw)?;
        *usage += generated.usage;

        let round = generate_game_round(self.generator, self.model, topic, date, game)?;
        raw.push(format!("game {}", game.name), round.text.as_str());
        *usage += round.usage;

        let mut sections = generated.sections;
        insert_game_section(&mut sections, round.text);
        Ok(Episode {
            title: topic.to_string(),
            sections,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptMeta {
    pub date: String,
    pub topic: String,
    pub title: String,
    pub word_count: usize,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct ScriptReport {
    pub topic: String,
    pub title: String,
    pub word_count: usize,
    pub usage: TokenUsage,
    pub attempt: Attempt,
    pub written: Vec<PathBuf>,
}

/// One `script` run: topic, draft, persist outputs, record history.
pub struct ScriptJob<'a> {
    pub config: &'a Config,
    pub layout: &'a OutputLayout,
    pub games: &'a [GameRules],
    pub generator: &'a dyn TextGenerator,
    pub history: &'a dyn HistoryStore,
    pub now: DateTime<Utc>,
}

impl ScriptJob<'_> {
    pub fn run(&self) -> Result<ScriptReport> {
        let date = self.layout.date();
        tracing::info!(%date, model = %self.config.text.model, "script start");
        paths::check_overwrite(&self.output_paths(), self.config.overwrite)?;

        let mut history = self.history.load()?;
        let choice = select_topic(self.config, Some(self.generator), &history)?;
        tracing::info!(topic = %choice.topic, generated = choice.generated, "topic selected");

        let mut usage = choice.usage;
        let mut raw = RawTranscript::default();
        let assembler = EpisodeAssembler {
            generator: self.generator,
            model: &self.config.text.model,
            min_words: self.config.min_words,
            games: self.games,
        };
        let draft = match assembler.draft(&choice.topic, date, &mut raw, &mut usage) {
            Ok(draft) => draft,
            Err(err) => {
                if !raw.is_empty() {
                    persist_raw_output(self.layout, &raw.render(), self.config.overwrite);
                }
                return Err(err);
            }
        };

        let written = self.write_outputs(&choice.topic, &draft)?;

        history.record(
            TopicHistoryEntry {
                topic: choice.topic.clone(),
                published_at: self.now,
                episode_id: Some(date.format("%Y-%m-%d").to_string()),
            },
            self.config.history.max_entries,
        );
        self.history.save(&history)?;

        tracing::info!(
            %date,
            topic = %choice.topic,
            word_count = draft.word_count,
            game = %draft.game,
            model = %self.config.text.model,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            total_tokens = usage.total_tokens,
            cached_tokens = usage.cached_tokens,
            reasoning_tokens = usage.reasoning_tokens,
            "script generated"
        );

        Ok(ScriptReport {
            topic: choice.topic,
            title: draft.episode.title,
            word_count: draft.word_count,
            usage,
            attempt: draft.attempt,
            written,
        })
    }

    fn output_paths(&self) -> Vec<PathBuf> {
        let mut targets = vec![self.layout.episode_markdown()];
        targets.extend(STANDARD_SECTION_IDS.iter().map(|id| self.layout.section_markdown(id)));
        targets.push(self.layout.episode_meta());
        targets
    }

    fn write_outputs(&self, topic: &str, draft: &Draft) -> Result<Vec<PathBuf>> {
        self.layout.ensure_out_dir()?;

        let meta = ScriptMeta {
            date: self.layout.date().format("%Y-%m-%d").to_string(),
            topic: topic.to_string(),
            title: draft.episode.title.clone(),
            word_count: draft.word_count,
            model: self.config.text.model.clone(),
        };

        let mut files = vec![(
            self.layout.episode_markdown(),
            draft.markdown.clone().into_bytes(),
        )];
        for section in draft.episode.ordered_sections() {
            files.push((
                self.layout.section_markdown(&section.section_id),
                format!("{}\n", section.text.trim()).into_bytes(),
            ));
        }
        files.push((self.layout.episode_meta(), serde_json::to_vec_pretty(&meta)?));

        paths::write_all_guarded(&files, self.config.overwrite)?;
        Ok(files.into_iter().map(|(path, _)| path).collect())
    }
}

/// Saves raw model output next to the episode. Never fails the run.
pub fn persist_raw_output(layout: &OutputLayout, raw: &str, overwrite: bool) -> Option<PathBuf> {
    let path = layout.raw_output();
    if let Err(err) = layout.ensure_out_dir() {
        tracing::warn!(error = %err, "failed to create output dir for raw output");
        return None;
    }
    if let Err(err) = paths::check_overwrite(&[&path], overwrite) {
        tracing::warn!(error = %err, "raw output exists; not overwriting");
        return None;
    }
    match paths::write_atomic(&path, raw.as_bytes()) {
        Ok(()) => {
            tracing::warn!(path = %path.display(), "wrote raw model output for debugging");
            Some(path)
        }
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "failed to write raw model output");
            None
        }
    }
}
