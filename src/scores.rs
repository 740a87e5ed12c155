//! Precomputed pair relevance scores.
//!
//! A first-stage model can score every ordered entity pair of every document.
//! For each split the scores arrive as two files:
//!
//! ```text
//! train_scores.json   [[0.91, 0.02, ...], ...]   one row per document,
//!                                                n·(n−1) scores in pair order
//! train_titles.json   ["Skai TV", ...]           row index → document title
//! ```
//!
//! The table is loaded once, before any worker starts, and is read-only
//! afterwards; share it through an `Arc`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::split::Split;

/// File locations for one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreFiles {
    /// Score matrix file.
    pub scores: PathBuf,
    /// Title list file.
    pub titles: PathBuf,
}

/// File locations for all splits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSources {
    /// Per-split files.
    pub splits: HashMap<Split, ScoreFiles>,
}

impl ScoreSources {
    /// `{dir}/{split}_scores.json` and `{dir}/{split}_titles.json` for every split.
    #[must_use]
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let splits = Split::ALL
            .into_iter()
            .map(|split| {
                let files = ScoreFiles {
                    scores: dir.join(format!("{}_scores.json", split)),
                    titles: dir.join(format!("{}_titles.json", split)),
                };
                (split, files)
            })
            .collect();
        Self { splits }
    }

    /// Paths that do not exist on disk.
    #[must_use]
    pub fn missing(&self) -> Vec<&Path> {
        let mut missing: Vec<&Path> = Split::ALL
            .iter()
            .filter_map(|split| self.splits.get(split))
            .flat_map(|f| [f.scores.as_path(), f.titles.as_path()])
            .filter(|p| !p.exists())
            .collect();
        missing.sort();
        missing
    }

    /// True when every split has both files on disk.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.splits.len() == Split::ALL.len() && self.missing().is_empty()
    }
}

/// Score rows of one split, indexed by document title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitScores {
    rows: Vec<Vec<f32>>,
    titles: HashMap<String, usize>,
}

impl SplitScores {
    /// Pair rows with titles; both lists must have the same length.
    pub fn new(rows: Vec<Vec<f32>>, titles: Vec<String>) -> Result<Self> {
        if rows.len() != titles.len() {
            return Err(Error::invalid_input(format!(
                "{} score rows but {} titles",
                rows.len(),
                titles.len()
            )));
        }
        let titles = titles
            .into_iter()
            .enumerate()
            .map(|(i, title)| (title, i))
            .collect();
        Ok(Self { rows, titles })
    }

    /// Load one split from its files.
    pub fn load(files: &ScoreFiles) -> Result<Self> {
        let rows: Vec<Vec<f32>> = read_json(&files.scores)?;
        let titles: Vec<String> = read_json(&files.titles)?;
        Self::new(rows, titles)
    }

    /// Score row of a document.
    #[must_use]
    pub fn row_for(&self, title: &str) -> Option<&[f32]> {
        self.titles
            .get(title)
            .and_then(|&i| self.rows.get(i))
            .map(Vec::as_slice)
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the split has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Relevance scores for every split.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBook {
    splits: HashMap<Split, SplitScores>,
}

impl ScoreBook {
    /// Build from already loaded splits.
    #[must_use]
    pub fn new(splits: HashMap<Split, SplitScores>) -> Self {
        Self { splits }
    }

    /// Load all splits. Returns `Ok(None)` when any file is missing, in
    /// which case callers fall back to split-driven pair sampling.
    pub fn load(sources: &ScoreSources) -> Result<Option<Self>> {
        if !sources.is_complete() {
            log::warn!(
                "Relevance scores unavailable (missing: {:?}); using split-driven pair sampling",
                sources.missing()
            );
            return Ok(None);
        }
        let mut splits = HashMap::with_capacity(Split::ALL.len());
        for split in Split::ALL {
            if let Some(files) = sources.splits.get(&split) {
                let scores = SplitScores::load(files)?;
                log::info!("Loaded {} score rows for {}", scores.len(), split);
                splits.insert(split, scores);
            }
        }
        Ok(Some(Self { splits }))
    }

    /// Scores of a split.
    #[must_use]
    pub fn split(&self, split: Split) -> Option<&SplitScores> {
        self.splits.get(&split)
    }

    /// Score row of a document in a split.
    ///
    /// Once a book is attached, every document must have a row: a missing
    /// title is an error rather than a silent policy switch, since examples
    /// of one split must share a shape.
    pub fn row(&self, split: Split, title: &str) -> Result<&[f32]> {
        let scores = self.split(split).ok_or_else(|| {
            Error::invalid_input(format!("no relevance scores loaded for {}", split))
        })?;
        scores.row_for(title).ok_or_else(|| {
            Error::invalid_input(format!(
                "document '{}' has no relevance score row in {}",
                title, split
            ))
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::dataset(format!("failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::parse(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_split(dir: &Path, split: Split, rows: &str, titles: &str) {
        std::fs::write(dir.join(format!("{}_scores.json", split)), rows).unwrap();
        std::fs::write(dir.join(format!("{}_titles.json", split)), titles).unwrap();
    }

    #[test]
    fn test_row_lookup() {
        let s = SplitScores::new(
            vec![vec![0.1, 0.2], vec![0.3, 0.4]],
            vec!["a".into(), "b".into()],
        )
        .unwrap();
        assert_eq!(s.row_for("b"), Some(&[0.3_f32, 0.4][..]));
        assert_eq!(s.row_for("c"), None);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_row_title_mismatch() {
        assert!(SplitScores::new(vec![vec![0.1]], vec![]).is_err());
    }

    #[test]
    fn test_missing_files_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        write_split(dir.path(), Split::Train, "[[0.5, 0.5]]", r#"["a"]"#);
        let sources = ScoreSources::from_dir(dir.path());
        assert!(!sources.is_complete());
        assert_eq!(sources.missing().len(), 4);
        assert!(ScoreBook::load(&sources).unwrap().is_none());
    }

    #[test]
    fn test_load_complete_book() {
        let dir = tempfile::tempdir().unwrap();
        for split in Split::ALL {
            write_split(dir.path(), split, "[[0.5, 0.25]]", r#"["doc"]"#);
        }
        let book = ScoreBook::load(&ScoreSources::from_dir(dir.path()))
            .unwrap()
            .unwrap();
        assert_eq!(book.row(Split::Valid, "doc").unwrap(), &[0.5, 0.25]);
        assert!(book.row(Split::Valid, "other").is_err());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        for split in Split::ALL {
            write_split(dir.path(), split, "not json", r#"["doc"]"#);
        }
        assert!(ScoreBook::load(&ScoreSources::from_dir(dir.path())).is_err());
    }
}
