//! Error types for docrel-core.

use thiserror::Error;

/// Result type for docrel-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for docrel-core operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A gold label references an entity id outside the document's entity list.
    #[error("document '{title}': label references entity {entity}, but only {entity_count} entities exist")]
    UnknownEntity {
        /// Title of the offending document.
        title: String,
        /// The entity id found in the label.
        entity: usize,
        /// Number of entities in the document.
        entity_count: usize,
    },

    /// A mention points outside the document's sentences or words.
    #[error("document '{title}': entity {entity} mention {mention}: {reason}")]
    InvalidMention {
        /// Title of the offending document.
        title: String,
        /// Entity index.
        entity: usize,
        /// Mention index within the entity.
        mention: usize,
        /// What is wrong with the mention.
        reason: String,
    },

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
