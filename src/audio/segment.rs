use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PauseKind {
    None,
    Short,
    Long,
}

impl PauseKind {
    pub fn marker(self) -> Option<&'static str> {
        match self {
            PauseKind::None => None,
            PauseKind::Short => Some("[short pause]"),
            PauseKind::Long => Some("[long pause]"),
        }
    }
}

/// Text spoken before a pause of `pause` kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PauseSegment {
    pub text: String,
    pub pause: PauseKind,
}

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"\[(short|long) pause\]").expect("valid pause marker regex"))
}

/// Splits `text` at `[short pause]` / `[long pause]` markers.
///
/// Text is kept verbatim, so joining every `text` gives back the input with
/// the markers removed. A trailing `PauseKind::None` segment is only emitted
/// when text follows the last marker.
pub fn split_on_pauses(text: &str) -> Vec<PauseSegment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in marker_regex().captures_iter(text) {
        let (Some(whole), Some(kind)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let pause = if kind.as_str() == "short" {
            PauseKind::Short
        } else {
            PauseKind::Long
        };
        segments.push(PauseSegment {
            text: text[cursor..whole.start()].to_string(),
            pause,
        });
        cursor = whole.end();
    }

    let rest = &text[cursor..];
    if !rest.is_empty() {
        segments.push(PauseSegment {
            text: rest.to_string(),
            pause: PauseKind::None,
        });
    }
    segments
}

/// Pause kinds referenced anywhere in `segments`, in first-seen order.
pub fn referenced_pauses(segments: &[PauseSegment]) -> Vec<PauseKind> {
    let mut kinds = Vec::new();
    for segment in segments {
        if segment.pause != PauseKind::None && !kinds.contains(&segment.pause) {
            kinds.push(segment.pause);
        }
    }
    kinds
}
