use crate::error::{Error, IoContext, Result};
use crate::storage::ObjectStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const HISTORY_OBJECT: &str = "topic-history.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicHistoryEntry {
    pub topic: String,
    pub published_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_id: Option<String>,
}

/// Previously used topics, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicHistory {
    #[serde(default)]
    pub entries: Vec<TopicHistoryEntry>,
}

impl TopicHistory {
    pub fn from_json(raw: &[u8]) -> Result<Self> {
        let mut history: TopicHistory = serde_json::from_slice(raw)?;
        history.normalize();
        Ok(history)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Up to `limit` non-blank topics, newest first.
    pub fn recent_topics(&self, limit: usize) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.topic.trim())
            .filter(|topic| !topic.is_empty())
            .take(limit)
            .collect()
    }

    /// Inserts `entry` as newest, replacing any entry for the same episode.
    /// Older entries are trimmed first so `entry` survives even when a stored
    /// `published_at` is ahead of it.
    pub fn record(&mut self, entry: TopicHistoryEntry, max_entries: usize) {
        if let Some(id) = entry.episode_id.as_deref() {
            self.entries
                .retain(|existing| existing.episode_id.as_deref() != Some(id));
        }
        self.normalize();
        self.trim(max_entries.saturating_sub(1));
        self.entries.insert(0, entry);
        self.trim(max_entries);
    }

    pub fn trim(&mut self, max_entries: usize) {
        self.entries.truncate(max_entries);
    }

    fn normalize(&mut self) {
        self.entries
            .sort_by(|a, b| b.published_at.cmp(&a.published_at));
    }
}

pub trait HistoryStore {
    fn load(&self) -> Result<TopicHistory>;
    fn save(&self, history: &TopicHistory) -> Result<()>;
}

/// Used when no history location is configured: always empty, never persisted.
pub struct NullHistoryStore;

impl HistoryStore for NullHistoryStore {
    fn load(&self) -> Result<TopicHistory> {
        Ok(TopicHistory::default())
    }

    fn save(&self, _history: &TopicHistory) -> Result<()> {
        tracing::debug!("no topic history location configured; skipping save");
        Ok(())
    }
}

pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> Result<TopicHistory> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(TopicHistory::default())
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to read topic history");
                return Ok(TopicHistory::default());
            }
        };
        match TopicHistory::from_json(&raw) {
            Ok(history) => Ok(history),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to parse topic history");
                Ok(TopicHistory::default())
            }
        }
    }

    fn save(&self, history: &TopicHistory) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .io_context(|| format!("create history dir {}", parent.display()))?;
        }
        crate::paths::write_atomic(&self.path, &history.to_json()?)
    }
}

/// Keeps the history next to published episodes in the object store.
pub struct ObjectHistoryStore<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ObjectStore + ?Sized> ObjectHistoryStore<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn key(&self) -> String {
        crate::storage::join_key(self.store.prefix(), &[HISTORY_OBJECT])
    }
}

impl<S: ObjectStore + ?Sized> HistoryStore for ObjectHistoryStore<'_, S> {
    fn load(&self) -> Result<TopicHistory> {
        let key = self.key();
        let raw = match self.store.download_bytes(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(TopicHistory::default()),
            Err(err) => {
                tracing::warn!(%key, error = %err, "failed to load topic history from storage");
                return Ok(TopicHistory::default());
            }
        };
        match TopicHistory::from_json(&raw) {
            Ok(history) => Ok(history),
            Err(err) => {
                tracing::warn!(%key, error = %err, "failed to parse topic history from storage");
                Ok(TopicHistory::default())
            }
        }
    }

    fn save(&self, history: &TopicHistory) -> Result<()> {
        let key = self.key();
        let data = history.to_json()?;
        self.store
            .upload_bytes(&key, &data, "application/json", "no-cache")
            .map_err(|err| match err {
                Error::Upload { .. } => err,
                other => Error::upload(&key, other),
            })
    }
}
