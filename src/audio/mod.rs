pub mod assemble;
pub mod clips;
pub mod segment;

pub use assemble::{AssemblyReport, AudioAssembler, AudioMode, EpisodeAudio};
pub use clips::PauseClips;
pub use segment::{split_on_pauses, PauseKind, PauseSegment};
