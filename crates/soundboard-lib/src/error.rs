//! Skill error type.
//!
//! Nothing here is retried. Handlers hand the error back to whichever host
//! piece invoked them, which logs it and carries on.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    #[error("cannot read sound directory {path}: {source}")]
    SoundDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sound library is empty")]
    EmptyLibrary,

    #[error("cannot read duration of {path}: {reason}")]
    Metadata { path: PathBuf, reason: String },

    #[error("skill used before initialize()")]
    NotInitialized,

    #[error("no grammar for intent '{0}'")]
    MissingGrammar(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = SkillError> = std::result::Result<T, E>;
