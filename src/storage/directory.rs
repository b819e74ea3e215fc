use super::{key_for_latest, ObjectStore};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// An object store rooted at a local directory. Each object gets a
/// `<object>.meta.json` sidecar holding its content type and cache policy.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub content_type: String,
    pub cache_control: String,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>, prefix: &str) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.trim_matches('/').to_string(),
        }
    }

    pub fn object_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if key.is_empty() || !safe {
            return Err(Error::upload(key, "invalid object key"));
        }
        Ok(self.root.join(relative))
    }

    pub fn meta_path(&self, key: &str) -> Result<PathBuf> {
        let path = self.object_path(key)?;
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".meta.json");
        Ok(path.with_file_name(name))
    }

    pub fn read_meta(&self, key: &str) -> Result<Option<ObjectMeta>> {
        let path = self.meta_path(key)?;
        match fs::read(&path) {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::upload(key, err)),
        }
    }

    fn write_object(&self, key: &str, data: &[u8], content_type: &str, cache_control: &str) -> Result<()> {
        let path = self.object_path(key)?;
        crate::paths::write_atomic(&path, data).map_err(|err| Error::upload(key, err))?;
        let meta = ObjectMeta {
            content_type: content_type.to_string(),
            cache_control: cache_control.to_string(),
        };
        let meta_bytes = serde_json::to_vec_pretty(&meta)?;
        crate::paths::write_atomic(&self.meta_path(key)?, &meta_bytes)
            .map_err(|err| Error::upload(key, err))
    }
}

impl ObjectStore for DirectoryStore {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn upload_file(&self, key: &str, local: &Path, content_type: &str, cache_control: &str) -> Result<()> {
        let data = fs::read(local)
            .map_err(|err| Error::upload(key, format!("read {}: {err}", local.display())))?;
        self.write_object(key, &data, content_type, cache_control)
    }

    fn copy_to_latest(&self, src_key: &str, filename: &str, content_type: &str, cache_control: &str) -> Result<()> {
        let latest = key_for_latest(&self.prefix, filename);
        let data = self
            .download_bytes(src_key)?
            .ok_or_else(|| Error::upload(src_key, "source object not found"))?;
        self.write_object(&latest, &data, content_type, cache_control)
    }

    fn download_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.object_path(key)?;
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::upload(key, err)),
        }
    }

    fn upload_bytes(&self, key: &str, data: &[u8], content_type: &str, cache_control: &str) -> Result<()> {
        self.write_object(key, data, content_type, cache_control)
    }
}
