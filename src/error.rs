use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("generation failed during {stage}: {message}")]
    Generation { stage: String, message: String },

    #[error("empty topic generated")]
    EmptyTopic,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("missing required section: {0}")]
    MissingSection(String),

    #[error("script has {words} words after retry; minimum is {minimum}")]
    Length { words: usize, minimum: usize },

    #[error("unsafe term detected: {term}")]
    Safety { term: String },

    #[error("pause audio missing: {}", path.display())]
    AssetMissing { path: PathBuf },

    #[error("refusing to overwrite existing file: {} (use --overwrite)", path.display())]
    OverwriteRefused { path: PathBuf },

    #[error("storage operation failed for {key}: {message}")]
    Upload { key: String, message: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn generation(stage: impl Into<String>, message: impl ToString) -> Self {
        Error::Generation {
            stage: stage.into(),
            message: message.to_string(),
        }
    }

    /// Re-labels a provider failure with the pipeline stage that issued the call.
    pub fn at_stage(self, stage: impl Into<String>) -> Self {
        match self {
            Error::Generation {
                stage: inner,
                message,
            } => Error::Generation {
                stage: stage.into(),
                message: format!("{inner}: {message}"),
            },
            other => other,
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    pub fn upload(key: impl Into<String>, message: impl ToString) -> Self {
        Error::Upload {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

/// Attaches a short description to `std::io` failures, mirroring `anyhow::Context`.
pub trait IoContext<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| Error::io(f(), source))
    }
}
