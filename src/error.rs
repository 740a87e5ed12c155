//! Error types for docrel.

use thiserror::Error;

/// Result type for docrel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for docrel operations.
///
/// Corrupt annotations (unknown entity ids, unknown relation names, mentions
/// outside their sentence) are fatal for the document being processed. Soft
/// degradations such as truncated mentions never surface here.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Dataset loading error.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Tokenizer failure or missing reserved token.
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// A gold label names a relation absent from the vocabulary.
    #[error("document '{title}': relation '{relation}' is not in the relation vocabulary")]
    UnknownRelation {
        /// Title of the offending document.
        title: String,
        /// The relation name found in the label.
        relation: String,
    },

    /// Structural annotation error from the data model.
    #[error(transparent)]
    Core(#[from] docrel_core::Error),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create a dataset error.
    pub fn dataset(msg: impl Into<String>) -> Self {
        Error::Dataset(msg.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a tokenizer error.
    pub fn tokenizer(msg: impl Into<String>) -> Self {
        Error::Tokenizer(msg.into())
    }

    /// True for errors caused by a corrupt annotation rather than by the
    /// environment (files, configuration, tokenizer).
    pub fn is_corrupt_annotation(&self) -> bool {
        matches!(self, Error::UnknownRelation { .. } | Error::Core(_))
    }
}
