//! Sub-word tokenizer seam.
//!
//! The example builder never splits text itself: every word of a sentence is
//! handed to a [`SubwordTokenizer`] on its own, which keeps word boundaries
//! recoverable after sub-word splitting.
//!
//! ```text
//! word:      "Piraeus"
//! subtokens: ["Pi", "##rae", "##us"]
//! ids:       [14263, 17968, 1361]
//! ```
//!
//! Reserved tokens (document start/end, padding, entity markers) are plain
//! token strings described by [`SpecialTokens`]; the tokenizer maps them to
//! ids like any other token.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Placeholder replaced by the marker index in [`SpecialTokens::marker`].
const MARKER_SLOT: &str = "{}";

/// Upper bound when probing a vocabulary for marker tokens.
const MAX_MARKER_PROBE: usize = 10_000;

/// Reserved token strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecialTokens {
    /// Prefixed to every document.
    pub start: String,
    /// Terminates every document.
    pub end: String,
    /// Fills the sequence up to its capacity.
    pub pad: String,
    /// Stand-in for out-of-vocabulary sub-tokens.
    pub unknown: String,
    /// Marker pattern; `{}` is replaced by the marker index (1-based).
    pub marker: String,
}

impl Default for SpecialTokens {
    fn default() -> Self {
        Self {
            start: "[CLS]".to_string(),
            end: "[SEP]".to_string(),
            pad: "[PAD]".to_string(),
            unknown: "[UNK]".to_string(),
            marker: "[unused{}]".to_string(),
        }
    }
}

impl SpecialTokens {
    /// Marker token for a 1-based marker index.
    #[must_use]
    pub fn marker(&self, index: usize) -> String {
        self.marker.replacen(MARKER_SLOT, &index.to_string(), 1)
    }

    /// The marker pattern must contain exactly one `{}` slot.
    pub fn validate(&self) -> Result<()> {
        if self.marker.matches(MARKER_SLOT).count() != 1 {
            return Err(Error::config(format!(
                "marker pattern '{}' must contain exactly one '{{}}'",
                self.marker
            )));
        }
        for (name, token) in [
            ("start", &self.start),
            ("end", &self.end),
            ("pad", &self.pad),
            ("unknown", &self.unknown),
        ] {
            if token.is_empty() {
                return Err(Error::config(format!("{} token must not be empty", name)));
            }
        }
        Ok(())
    }
}

/// Word-level access to a sub-word tokenizer.
///
/// Implementations must be usable from several worker threads at once.
pub trait SubwordTokenizer: Send + Sync {
    /// Split one word into sub-tokens. May return an empty vector for words
    /// the tokenizer normalizes away.
    fn tokenize(&self, word: &str) -> Result<Vec<String>>;

    /// Map sub-token strings to ids. Unknown strings map to the unknown id.
    fn convert_to_ids(&self, tokens: &[String]) -> Result<Vec<u32>>;

    /// Reserved token strings.
    fn special_tokens(&self) -> &SpecialTokens;

    /// Marker token for a 1-based marker index.
    fn marker_token(&self, index: usize) -> String {
        self.special_tokens().marker(index)
    }

    /// Highest addressable marker index, when known.
    fn marker_capacity(&self) -> Option<usize> {
        None
    }
}

// =============================================================================
// HuggingFace tokenizers
// =============================================================================

/// Adapter over a `tokenizers::Tokenizer`.
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
    special: SpecialTokens,
    unknown_id: u32,
    marker_capacity: usize,
}

impl std::fmt::Debug for HfTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfTokenizer")
            .field("special", &self.special)
            .field("unknown_id", &self.unknown_id)
            .field("marker_capacity", &self.marker_capacity)
            .finish()
    }
}

impl HfTokenizer {
    /// Load a serialized `tokenizer.json`.
    pub fn from_file(path: impl AsRef<Path>, special: SpecialTokens) -> Result<Self> {
        let path = path.as_ref();
        let inner = tokenizers::Tokenizer::from_file(path)
            .map_err(|e| Error::tokenizer(format!("failed to load {}: {}", path.display(), e)))?;
        Self::from_tokenizer(inner, special)
    }

    /// Build a BERT WordPiece tokenizer from a `vocab.txt`.
    pub fn from_vocab(
        path: impl AsRef<Path>,
        lowercase: bool,
        special: SpecialTokens,
    ) -> Result<Self> {
        use tokenizers::models::wordpiece::WordPiece;
        use tokenizers::normalizers::bert::BertNormalizer;
        use tokenizers::pre_tokenizers::bert::BertPreTokenizer;

        let path = path.as_ref();
        let vocab = path
            .to_str()
            .ok_or_else(|| Error::tokenizer(format!("non UTF-8 path {}", path.display())))?;
        let model = WordPiece::from_file(vocab)
            .unk_token(special.unknown.clone())
            .build()
            .map_err(|e| Error::tokenizer(format!("failed to read {}: {}", vocab, e)))?;

        let mut inner = tokenizers::Tokenizer::new(model);
        inner.with_normalizer(Some(BertNormalizer::new(true, true, None, lowercase)));
        inner.with_pre_tokenizer(Some(BertPreTokenizer));
        Self::from_tokenizer(inner, special)
    }

    /// Wrap an already constructed tokenizer.
    pub fn from_tokenizer(inner: tokenizers::Tokenizer, special: SpecialTokens) -> Result<Self> {
        special.validate()?;
        for token in [&special.start, &special.end, &special.pad] {
            if inner.token_to_id(token).is_none() {
                return Err(Error::tokenizer(format!(
                    "reserved token '{}' is missing from the vocabulary",
                    token
                )));
            }
        }
        let unknown_id = inner.token_to_id(&special.unknown).ok_or_else(|| {
            Error::tokenizer(format!(
                "unknown token '{}' is missing from the vocabulary",
                special.unknown
            ))
        })?;
        let marker_capacity = (1..=MAX_MARKER_PROBE)
            .take_while(|&i| inner.token_to_id(&special.marker(i)).is_some())
            .count();
        log::debug!(
            "Tokenizer vocabulary: {} tokens, {} marker tokens",
            inner.get_vocab_size(true),
            marker_capacity
        );
        Ok(Self {
            inner,
            special,
            unknown_id,
            marker_capacity,
        })
    }
}

impl SubwordTokenizer for HfTokenizer {
    fn tokenize(&self, word: &str) -> Result<Vec<String>> {
        let encoding = self
            .inner
            .encode(word, false)
            .map_err(|e| Error::tokenizer(format!("failed to encode '{}': {}", word, e)))?;
        Ok(encoding.get_tokens().to_vec())
    }

    fn convert_to_ids(&self, tokens: &[String]) -> Result<Vec<u32>> {
        Ok(tokens
            .iter()
            .map(|t| self.inner.token_to_id(t).unwrap_or(self.unknown_id))
            .collect())
    }

    fn special_tokens(&self) -> &SpecialTokens {
        &self.special
    }

    fn marker_capacity(&self) -> Option<usize> {
        Some(self.marker_capacity)
    }
}

// =============================================================================
// Mock tokenizer
// =============================================================================

/// A deterministic tokenizer for tests and benchmarks.
///
/// Words are cut into pieces of `piece_width` characters (`0` keeps whole
/// words); continuation pieces get a `##` prefix. Ids follow the BERT layout:
/// pad = 0, markers = their index, unknown = 100, start = 101, end = 102, and
/// vocabulary words from 1000 upwards.
///
/// # Example
///
/// ```rust
/// use docrel::{MockTokenizer, SubwordTokenizer};
///
/// let tok = MockTokenizer::new().with_piece_width(3);
/// assert_eq!(tok.tokenize("Piraeus").unwrap(), vec!["Pir", "##aeu", "##s"]);
/// ```
#[derive(Debug, Clone)]
pub struct MockTokenizer {
    special: SpecialTokens,
    piece_width: usize,
    marker_capacity: usize,
    ids: HashMap<String, u32>,
    next_id: u32,
}

/// Marker tokens a BERT-base-cased vocabulary provides (`[unused1]`..`[unused99]`).
const MOCK_MARKER_CAPACITY: usize = 99;
const MOCK_UNKNOWN_ID: u32 = 100;
const MOCK_FIRST_WORD_ID: u32 = 1000;

impl Default for MockTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTokenizer {
    /// Whole-word tokenizer with the default special tokens.
    #[must_use]
    pub fn new() -> Self {
        Self::with_special_tokens(SpecialTokens::default())
    }

    /// Whole-word tokenizer with custom special tokens.
    #[must_use]
    pub fn with_special_tokens(special: SpecialTokens) -> Self {
        let mut tok = Self {
            special,
            piece_width: 0,
            marker_capacity: MOCK_MARKER_CAPACITY,
            ids: HashMap::new(),
            next_id: MOCK_FIRST_WORD_ID,
        };
        tok.rebuild_reserved();
        tok
    }

    /// Split words into pieces of this many characters.
    #[must_use]
    pub fn with_piece_width(mut self, width: usize) -> Self {
        self.piece_width = width;
        self
    }

    /// Limit the number of marker tokens.
    #[must_use]
    pub fn with_marker_capacity(mut self, capacity: usize) -> Self {
        self.marker_capacity = capacity;
        self.rebuild_reserved();
        self
    }

    /// Register vocabulary tokens; unregistered tokens map to the unknown id.
    #[must_use]
    pub fn with_vocab<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for token in tokens {
            let token = token.into();
            if !self.ids.contains_key(&token) {
                self.ids.insert(token, self.next_id);
                self.next_id += 1;
            }
        }
        self
    }

    fn rebuild_reserved(&mut self) {
        self.ids.retain(|_, id| *id >= MOCK_FIRST_WORD_ID);
        self.ids.insert(self.special.pad.clone(), 0);
        self.ids.insert(self.special.unknown.clone(), MOCK_UNKNOWN_ID);
        self.ids.insert(self.special.start.clone(), 101);
        self.ids.insert(self.special.end.clone(), 102);
        for i in 1..=self.marker_capacity {
            self.ids.insert(self.special.marker(i), i as u32);
        }
    }
}

impl SubwordTokenizer for MockTokenizer {
    fn tokenize(&self, word: &str) -> Result<Vec<String>> {
        let word = word.trim();
        if word.is_empty() {
            return Ok(Vec::new());
        }
        if self.piece_width == 0 {
            return Ok(vec![word.to_string()]);
        }
        let chars: Vec<char> = word.chars().collect();
        Ok(chars
            .chunks(self.piece_width)
            .enumerate()
            .map(|(i, piece)| {
                let piece: String = piece.iter().collect();
                if i == 0 {
                    piece
                } else {
                    format!("##{}", piece)
                }
            })
            .collect())
    }

    fn convert_to_ids(&self, tokens: &[String]) -> Result<Vec<u32>> {
        Ok(tokens
            .iter()
            .map(|t| self.ids.get(t).copied().unwrap_or(MOCK_UNKNOWN_ID))
            .collect())
    }

    fn special_tokens(&self) -> &SpecialTokens {
        &self.special
    }

    fn marker_capacity(&self) -> Option<usize> {
        Some(self.marker_capacity)
    }
}
