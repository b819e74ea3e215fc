use super::segment::PauseKind;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

pub const SHORT_PAUSE_FILE: &str = "pause-short.mp3";
pub const LONG_PAUSE_FILE: &str = "pause-long.mp3";

/// Pre-recorded pause audio, shared by every episode.
#[derive(Debug, Clone)]
pub struct PauseClips {
    pub short: PathBuf,
    pub long: PathBuf,
}

impl PauseClips {
    pub fn resolve(assets_dir: &Path) -> Self {
        Self {
            short: assets_dir.join(SHORT_PAUSE_FILE),
            long: assets_dir.join(LONG_PAUSE_FILE),
        }
    }

    pub fn path_for(&self, kind: PauseKind) -> Option<&Path> {
        match kind {
            PauseKind::None => None,
            PauseKind::Short => Some(&self.short),
            PauseKind::Long => Some(&self.long),
        }
    }

    /// Fails on the first referenced kind whose clip is not a file.
    pub fn ensure_present(&self, kinds: &[PauseKind]) -> Result<()> {
        for kind in kinds {
            let Some(path) = self.path_for(*kind) else {
                continue;
            };
            if !path.is_file() {
                tracing::warn!(path = %path.display(), "pause clip missing");
                return Err(Error::AssetMissing {
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(())
    }
}
