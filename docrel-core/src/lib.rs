//! # docrel-core
//!
//! Annotation data model for document-level relation extraction.
//!
//! This crate provides:
//! - **Document types**: `Document`, `Entity`, `Mention`, `GoldLabel`
//! - **Identifiers**: `EntityId`, `PairId`
//!
//! The serde layout matches the DocRED JSON format (`vertexSet`, `sent_id`,
//! `pos`, `h`/`t`/`r`), so a dataset file deserializes straight into
//! `Vec<Document>`. Both `docrel` and `docrel-cli` depend on this crate.

pub mod document;
pub mod error;

pub use document::{Document, Entity, EntityId, GoldLabel, Mention, PairId, Sentence};
pub use error::{Error, Result};
