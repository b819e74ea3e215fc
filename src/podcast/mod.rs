pub mod calendar;
pub mod episode;
pub mod games;
pub mod generator;
pub mod history;
pub mod script;
pub mod sections;
pub mod topic;

pub use episode::{safety_check, word_count, Episode};
pub use games::{choose_game, load_game_rules, GameRules};
pub use history::{FileHistoryStore, HistoryStore, NullHistoryStore, ObjectHistoryStore, TopicHistory, TopicHistoryEntry};
pub use script::{Attempt, EpisodeAssembler, ScriptJob, ScriptMeta, ScriptReport};
pub use sections::{EpisodeSection, SectionSpec};
pub use topic::{select_topic, TopicChoice};
