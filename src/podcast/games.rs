use super::calendar;
use super::sections::{EpisodeSection, GAME, OUTRO};
use crate::ai::{Generation, TextGenerator, TextRequest};
use crate::error::{Error, IoContext, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRules {
    pub name: String,
    pub rules: String,
}

impl GameRules {
    pub fn new(name: impl Into<String>, rules: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: rules.into(),
        }
    }
}

/// Weekdays that always play the same game when it is available.
const WEEKDAY_GAMES: &[(Weekday, &str)] = &[
    (Weekday::Sun, "fact-or-fib"),
    (Weekday::Tue, "build-it-brainstorm"),
    (Weekday::Thu, "would-you-rather"),
    (Weekday::Sat, "animal-riddles"),
];

pub const GAME_SYSTEM_PROMPT: &str = "You are a friendly, curious podcast host creating an audio-only daily game for kids ages 7-9.

The following game rules will be provided. Read and follow them exactly.

Your task:
- Produce ONE complete round of the game.
- Speak directly to the listener in a warm, encouraging, upbeat tone.
- Keep language age-appropriate and imaginative.
- Assume this is audio-only (no visuals).

Interaction rules:
- Whenever the listener is asked a question or invited to guess, insert the audio tag:
  [long pause]
- For a quick beat of suspense or a short think, insert the audio tag:
  [short pause]
- After a pause, continue as if the listener responded.
- Respond positively and inclusively, regardless of what the listener may have answered.

If the game has a correct answer:
- Reveal the answer clearly.
- Say that you hope the listener got it right.
- Celebrate the fun of playing and learning, even if they didn't.

General style:
- Curious, upbeat, and kind.
- No sarcasm or negativity.
- Encourage thinking, imagination, and joy.
- Avoid mentioning rules explicitly during gameplay.
- End the game with a positive closing line (e.g., encouragement or fun fact).

Now generate the game round using the provided rules.";

/// Loads one game per non-empty `*.md` file in `dir`, sorted by file name.
pub fn load_game_rules(dir: &Path) -> Result<Vec<GameRules>> {
    let entries = fs::read_dir(dir)
        .io_context(|| format!("read game rules dir {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .io_context(|| format!("read game rules dir {}", dir.display()))?
            .path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("md") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut games = Vec::new();
    for path in paths {
        let raw = fs::read_to_string(&path)
            .io_context(|| format!("read game rules file {}", path.display()))?;
        let rules = raw.trim();
        if rules.is_empty() {
            tracing::debug!(path = %path.display(), "skipping empty game rules");
            continue;
        }
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        games.push(GameRules::new(name, rules));
    }

    if games.is_empty() {
        return Err(Error::Validation(format!(
            "no game rules found in {}",
            dir.display()
        )));
    }
    Ok(games)
}

pub fn preferred_game(weekday: Weekday) -> Option<&'static str> {
    WEEKDAY_GAMES
        .iter()
        .find(|(day, _)| *day == weekday)
        .map(|(_, name)| *name)
}

/// Picks the game for `date`; identical inputs always give the same game.
pub fn choose_game(date: NaiveDate, games: &[GameRules]) -> Result<&GameRules> {
    if games.is_empty() {
        return Err(Error::Validation("no games available".into()));
    }
    let weekday = date.weekday();
    if let Some(name) = preferred_game(weekday) {
        if let Some(game) = games.iter().find(|game| game.name == name) {
            return Ok(game);
        }
    }
    let index = weekday.num_days_from_sunday() as usize % games.len();
    Ok(&games[index])
}

/// Returns `(system, user)` prompts for one round of `rules`.
pub fn build_game_prompt(topic: &str, date: NaiveDate, rules: &GameRules) -> Result<(String, String)> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(Error::Validation("topic is required".into()));
    }
    if rules.rules.trim().is_empty() {
        return Err(Error::Validation(format!(
            "game {:?} has no rules",
            rules.name
        )));
    }
    let user = format!(
        "Topic: {topic}\nWeekday: {}\nGame: {}\n\n\
         Tie the round to today's topic where it fits naturally. \
         Then give a short, friendly summary of the answers before handing back to the show.\n\n\
         Game rules:\n{}",
        calendar::weekday_name(date),
        rules.name,
        rules.rules.trim(),
    );
    Ok((GAME_SYSTEM_PROMPT.to_string(), user))
}

/// Generates the game round with a single call.
pub fn generate_game_round(
    generator: &dyn TextGenerator,
    model: &str,
    topic: &str,
    date: NaiveDate,
    rules: &GameRules,
) -> Result<Generation> {
    let (system, user) = build_game_prompt(topic, date, rules)?;
    tracing::info!(game = %rules.name, "generating game round");
    let mut generation = generator
        .generate(&TextRequest {
            model,
            system: Some(&system),
            prompt: &user,
        })
        .map_err(|err| err.at_stage(format!("section {GAME}")))?;
    generation.text = generation.text.trim().to_string();
    Ok(generation)
}

/// Places the game immediately before `outro`, or last when there is no outro.
pub fn insert_game_section(sections: &mut Vec<EpisodeSection>, text: impl Into<String>) {
    let game = EpisodeSection::new(GAME, text);
    match sections.iter().position(|s| s.section_id == OUTRO) {
        Some(index) => sections.insert(index, game),
        None => sections.push(game),
    }
}
