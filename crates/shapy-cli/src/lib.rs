//! Shapy command-line tools
//!
//! Headless document operations built on the editor core and the headless
//! render surface: export, image placement and project import.

pub mod commands;
pub mod document;

use shapy_core::storage::StorageError;
use shapy_core::{ConfigError, EditorError};
use std::path::PathBuf;
use thiserror::Error;

/// CLI errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{}: not a Shapy document", .0.display())]
    InvalidDocument(PathBuf),
    #[error("unsupported output format: {0:?}")]
    UnknownFormat(String),
    #[error("export produced an unreadable data URL")]
    InvalidDataUrl,
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type CliResult<T> = Result<T, CliError>;
