//! Defines custom error types for the application.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
/// Error type returned when any stage of the preview pipeline fails.
pub enum PreviewError {
    #[error("Failed to read input file {}: {source}", path.display())]
    InputRead { path: PathBuf, source: io::Error },

    #[error("Failed to load template {}: {source}", path.display())]
    TemplateLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to execute template '{name}': {source}")]
    TemplateExecution { name: String, source: tera::Error },

    #[error("Failed to create temporary file in {}: {source}", dir.display())]
    TempFileCreate { dir: PathBuf, source: io::Error },

    #[error("Failed to write temporary file {}: {source}", path.display())]
    TempFileWrite { path: PathBuf, source: io::Error },

    #[error("Failed to report output path: {0}")]
    OutputWrite(#[source] io::Error),

    #[error("OS not supported: {0}")]
    UnsupportedPlatform(String),

    #[error("Opener command '{command}' not found: {source}")]
    OpenerNotFound {
        command: &'static str,
        source: which::Error,
    },

    #[error("Failed to launch {}: {source}", program.display())]
    OpenerLaunch { program: PathBuf, source: io::Error },

    #[error("{} exited with {status}", program.display())]
    OpenerExit { program: PathBuf, status: ExitStatus },
}
