//! Translator configuration options

use std::path::PathBuf;
use crate::container::DEFAULT_COMMENT;

/// Configuration options for the translator
#[derive(Clone, Debug)]
pub struct TranslatorConfig {
    /// Text stored in the 42-byte header comment of compiled files
    pub comment: String,
    /// Variable name used instead of the one derived from the output path
    pub variable_name: Option<String>,
    /// Reject files whose stored checksum does not match on decompile
    pub verify_checksum: bool,
    /// Token data file used instead of the built-in table
    pub token_table: Option<PathBuf>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            comment: DEFAULT_COMMENT.to_string(),
            variable_name: None,
            verify_checksum: false,
            token_table: None,
        }
    }
}

impl TranslatorConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header comment
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = comment.to_string();
        self
    }

    /// Override the variable name
    pub fn with_variable_name(mut self, name: &str) -> Self {
        self.variable_name = Some(name.to_string());
        self
    }

    /// Enable or disable checksum verification on decompile
    pub fn with_checksum_verification(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }

    /// Load tokens from a data file instead of the built-in table
    pub fn with_token_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_table = Some(path.into());
        self
    }
}
