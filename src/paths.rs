use crate::error::{Error, IoContext, Result};
use chrono::{Datelike, NaiveDate};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const EPISODE_MARKDOWN: &str = "episode.md";
const EPISODE_AUDIO: &str = "episode.mp3";
const EPISODE_META: &str = "meta.json";
const EPISODE_RAW: &str = "episode.raw.md";

/// Date-partitioned output locations: `<base>/YYYY/MM/DD/...`.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    base: PathBuf,
    date: NaiveDate,
}

impl OutputLayout {
    pub fn new(base: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self {
            base: base.into(),
            date,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn out_dir(&self) -> PathBuf {
        self.base
            .join(format!("{:04}", self.date.year()))
            .join(format!("{:02}", self.date.month()))
            .join(format!("{:02}", self.date.day()))
    }

    pub fn episode_markdown(&self) -> PathBuf {
        self.out_dir().join(EPISODE_MARKDOWN)
    }

    pub fn episode_audio(&self) -> PathBuf {
        self.out_dir().join(EPISODE_AUDIO)
    }

    pub fn episode_meta(&self) -> PathBuf {
        self.out_dir().join(EPISODE_META)
    }

    pub fn raw_output(&self) -> PathBuf {
        self.out_dir().join(EPISODE_RAW)
    }

    pub fn section_markdown(&self, section_id: &str) -> PathBuf {
        self.out_dir().join(format!("episode.{section_id}.md"))
    }

    pub fn section_audio(&self, section_id: &str) -> PathBuf {
        self.out_dir().join(format!("episode.{section_id}.mp3"))
    }

    pub fn ensure_out_dir(&self) -> Result<PathBuf> {
        let dir = self.out_dir();
        fs::create_dir_all(&dir).io_context(|| format!("create output dir {}", dir.display()))?;
        Ok(dir)
    }
}

/// Fails on the first existing path unless `overwrite` is set. Touches nothing.
pub fn check_overwrite<P: AsRef<Path>>(paths: &[P], overwrite: bool) -> Result<()> {
    if overwrite {
        return Ok(());
    }
    for path in paths {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            continue;
        }
        match fs::symlink_metadata(path) {
            Ok(_) => {
                return Err(Error::OverwriteRefused {
                    path: path.to_path_buf(),
                })
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(Error::io(format!("check {}", path.display()), err));
            }
        }
    }
    Ok(())
}

/// Writes every `(path, contents)` pair after checking the whole set against the guard.
pub fn write_all_guarded(files: &[(PathBuf, Vec<u8>)], overwrite: bool) -> Result<()> {
    let targets: Vec<&PathBuf> = files.iter().map(|(path, _)| path).collect();
    check_overwrite(&targets, overwrite)?;
    for (path, contents) in files {
        write_atomic(path, contents)?;
    }
    Ok(())
}

/// Writes through a sibling temp file and renames it into place.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).io_context(|| format!("create dir {}", dir.display()))?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .io_context(|| format!("create temp file in {}", dir.display()))?;
    temp.write_all(contents)
        .io_context(|| format!("write {}", path.display()))?;
    temp.persist(path)
        .map_err(|err| Error::io(format!("persist {}", path.display()), err.error))?;
    Ok(())
}
