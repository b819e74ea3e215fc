pub mod directory;
pub mod s3;

use crate::error::{Error, Result};
use crate::paths::OutputLayout;
use chrono::{Datelike, NaiveDate};
use std::path::Path;

pub use directory::DirectoryStore;
pub use s3::S3Store;

pub const MP3_CONTENT_TYPE: &str = "audio/mpeg";
pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const CACHE_ARCHIVE: &str = "public, max-age=86400";
pub const CACHE_LATEST: &str = "public, max-age=300";

pub trait ObjectStore {
    fn prefix(&self) -> &str;
    fn upload_file(&self, key: &str, local: &Path, content_type: &str, cache_control: &str) -> Result<()>;
    /// Copies `src_key` to `<prefix>/latest/<filename>`.
    fn copy_to_latest(&self, src_key: &str, filename: &str, content_type: &str, cache_control: &str) -> Result<()>;
    /// `Ok(None)` when the object does not exist.
    fn download_bytes(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn upload_bytes(&self, key: &str, data: &[u8], content_type: &str, cache_control: &str) -> Result<()>;
}

pub fn join_key(prefix: &str, parts: &[&str]) -> String {
    let prefix = prefix.trim_matches('/');
    std::iter::once(prefix)
        .chain(parts.iter().map(|part| part.trim_matches('/')))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn key_for_date(prefix: &str, date: NaiveDate, filename: &str) -> String {
    let year = format!("{:04}", date.year());
    let month = format!("{:02}", date.month());
    let day = format!("{:02}", date.day());
    join_key(prefix, &[year.as_str(), month.as_str(), day.as_str(), filename])
}

pub fn key_for_latest(prefix: &str, filename: &str) -> String {
    join_key(prefix, &["latest", filename])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedObject {
    pub key: String,
    pub latest_key: String,
}

/// Uploads the episode audio (and optionally the script and metadata), promoting each to latest.
pub fn publish_episode<S: ObjectStore + ?Sized>(
    store: &S,
    layout: &OutputLayout,
    include_script: bool,
) -> Result<Vec<PublishedObject>> {
    let mut files = vec![("episode.mp3", layout.episode_audio(), MP3_CONTENT_TYPE)];
    if include_script {
        files.push(("episode.md", layout.episode_markdown(), MARKDOWN_CONTENT_TYPE));
        files.push(("meta.json", layout.episode_meta(), JSON_CONTENT_TYPE));
    }

    let mut published = Vec::with_capacity(files.len());
    for (filename, local, content_type) in files {
        published.push(upload_and_promote(store, layout.date(), filename, &local, content_type)?);
    }
    Ok(published)
}

fn upload_and_promote<S: ObjectStore + ?Sized>(
    store: &S,
    date: NaiveDate,
    filename: &str,
    local: &Path,
    content_type: &str,
) -> Result<PublishedObject> {
    if !local.is_file() {
        return Err(Error::Validation(format!(
            "missing local file {}",
            local.display()
        )));
    }
    let key = key_for_date(store.prefix(), date, filename);
    store.upload_file(&key, local, content_type, CACHE_ARCHIVE)?;
    store.copy_to_latest(&key, filename, content_type, CACHE_LATEST)?;
    tracing::info!(%key, filename, "published");
    Ok(PublishedObject {
        latest_key: key_for_latest(store.prefix(), filename),
        key,
    })
}
