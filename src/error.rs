use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptenvError {
    #[error("{name} can't be null")]
    NullSection { name: String },

    #[error("{name} must be a string or object")]
    InvalidDeclaration { name: String },

    #[error("Invalid saved environments version '{found}' in {path} (expected {expected})")]
    PersistenceVersionMismatch {
        path: PathBuf,
        found: String,
        expected: u64,
    },

    #[error("Could not read saved environments in {path}: {source}")]
    PersistenceReadFailure {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("No {file_name} found in {}", .dir.display())]
    ManifestMissing { file_name: String, dir: PathBuf },

    #[error("Could not read project manifest {path}: {reason}")]
    ManifestReadFailure { path: PathBuf, reason: String },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] confique::Error),

    #[error("Input closed while waiting for {0}")]
    PromptInputClosed(String),

    #[error("Prompt failed: {0}")]
    PromptFailed(#[source] std::io::Error),

    #[error("Invalid import blob: {0}")]
    InvalidImport(String),

    #[error("No child program given, the environment cannot be applied")]
    NoProgram,

    #[error("Could not find '{program}' on PATH: {source}")]
    ExecutableNotFound {
        program: String,
        source: which::Error,
    },

    #[error("Failed to start {path}: {source}")]
    SpawnFailure {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No home directory found; set PROMPTENV_STORE to choose a store location")]
    HomeDirUnavailable,

    #[error("Failed to serialize {what}: {reason}")]
    SerializeFailure { what: &'static str, reason: String },
}
