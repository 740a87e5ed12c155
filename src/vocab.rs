//! Relation vocabulary: the closed set of relation classes.
//!
//! The vocabulary always contains the `NA` ("no relation") class. Indices are
//! dense (`0..R`) so a class index addresses a slot of a label vector directly.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Name of the "no relation" class.
pub const NA: &str = "NA";

/// Relation name ↔ class index mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationVocab {
    names: Vec<String>,
    index: HashMap<String, usize>,
    na: usize,
}

impl RelationVocab {
    /// Build from an explicit name → index map (DocRED `rel2id.json`).
    ///
    /// Indices must be exactly `0..map.len()` and `NA` must be present.
    pub fn from_map(map: HashMap<String, usize>) -> Result<Self> {
        let size = map.len();
        let mut names: Vec<Option<String>> = vec![None; size];
        for (name, &idx) in &map {
            let slot = names.get_mut(idx).ok_or_else(|| {
                Error::invalid_input(format!(
                    "relation '{}' has index {} outside 0..{}",
                    name, idx, size
                ))
            })?;
            if let Some(existing) = slot.replace(name.clone()) {
                return Err(Error::invalid_input(format!(
                    "relations '{}' and '{}' share index {}",
                    existing, name, idx
                )));
            }
        }
        let na = *map
            .get(NA)
            .ok_or_else(|| Error::invalid_input("relation vocabulary has no 'NA' class"))?;
        // Dense and unique indices mean every slot is filled.
        let names = names.into_iter().flatten().collect();
        Ok(Self {
            names,
            index: map,
            na,
        })
    }

    /// Build from names in order. `NA` is placed first when absent.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered: Vec<String> = names.into_iter().map(Into::into).collect();
        if !ordered.iter().any(|n| n == NA) {
            ordered.insert(0, NA.to_string());
        }
        let mut map = HashMap::with_capacity(ordered.len());
        for (idx, name) in ordered.into_iter().enumerate() {
            if map.insert(name.clone(), idx).is_some() {
                return Err(Error::invalid_input(format!(
                    "duplicate relation name '{}'",
                    name
                )));
            }
        }
        Self::from_map(map)
    }

    /// Parse a JSON object of `{"name": index}`.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let map: HashMap<String, usize> = serde_json::from_str(content)
            .map_err(|e| Error::parse(format!("relation vocabulary JSON: {}", e)))?;
        Self::from_map(map)
    }

    /// Load DocRED's `rel2id.json`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let vocab = Self::from_json_str(&content)?;
        log::info!(
            "Loaded {} relation classes from {}",
            vocab.len(),
            path.display()
        );
        Ok(vocab)
    }

    /// Class index of a relation name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Relation name of a class index.
    #[must_use]
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Class index of `NA`.
    #[must_use]
    pub const fn na_index(&self) -> usize {
        self.na
    }

    /// Vocabulary size `R` (including `NA`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Never true for a constructed vocabulary (it holds `NA`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in class-index order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
