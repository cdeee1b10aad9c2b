mod pipeline;
mod config;

pub use pipeline::Translator;
pub use config::TranslatorConfig;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while compiling or decompiling
#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Cannot open input file {path:?}")]
    InputError { path: PathBuf, source: io::Error },

    #[error("Cannot write output file {path:?}")]
    OutputError { path: PathBuf, source: io::Error },

    #[error(transparent)]
    TableError(#[from] crate::tokens::TableError),

    #[error(transparent)]
    TokenizeError(#[from] crate::text::TokenizeError),

    #[error(transparent)]
    ContainerError(#[from] crate::container::ContainerError),

    #[error(transparent)]
    IoError(#[from] io::Error),
}

/// Result type for translator operations
pub type TranslateResult<T> = Result<T, TranslateError>;
