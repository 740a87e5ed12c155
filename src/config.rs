//! Example-shaping configuration.
//!
//! Every knob has a default matching the usual DocRED fine-tuning setup, so
//! a TOML file only needs to name what it changes:
//!
//! ```toml
//! token_capacity = 512
//! mention_capacity = 3
//! use_entity_type = true
//!
//! [capacity]
//! train = 90
//! eval = 1800
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sampler::PolicyKind;
use crate::tokenizer::SpecialTokens;

/// Default token capacity (`L`).
pub const DEFAULT_TOKEN_CAPACITY: usize = 512;

/// Default mention-position capacity per entity (`M`).
pub const DEFAULT_MENTION_CAPACITY: usize = 3;

/// Default negatives drawn per positive pair in training mode.
pub const DEFAULT_NEGATIVE_RATIO: usize = 3;

/// Per-policy capacity of the pair arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SampleCapacity {
    /// Capacity for training documents (positives + sampled negatives).
    pub train: usize,
    /// Capacity for exhaustive evaluation.
    pub eval: usize,
    /// Capacity for score-guided selection.
    pub score: usize,
}

impl Default for SampleCapacity {
    fn default() -> Self {
        Self {
            train: 90,
            eval: 1800,
            score: 1800,
        }
    }
}

impl SampleCapacity {
    /// Capacity used by a policy.
    #[must_use]
    pub const fn for_kind(&self, kind: PolicyKind) -> usize {
        match kind {
            PolicyKind::ScoreGuided => self.score,
            PolicyKind::TrainingSampled => self.train,
            PolicyKind::ExhaustiveEval => self.eval,
        }
    }
}

/// Configuration consumed by the example builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExampleConfig {
    /// Token sequence length `L`.
    pub token_capacity: usize,
    /// Mention positions kept per entity `M`.
    pub mention_capacity: usize,
    /// Negatives per positive in training mode.
    pub negative_ratio: usize,
    /// Emit `(head_type, tail_type)` per selected pair.
    pub use_entity_type: bool,
    /// Pair capacities per policy.
    pub capacity: SampleCapacity,
    /// Reserved token strings.
    pub tokens: SpecialTokens,
}

impl Default for ExampleConfig {
    fn default() -> Self {
        Self {
            token_capacity: DEFAULT_TOKEN_CAPACITY,
            mention_capacity: DEFAULT_MENTION_CAPACITY,
            negative_ratio: DEFAULT_NEGATIVE_RATIO,
            use_entity_type: false,
            capacity: SampleCapacity::default(),
            tokens: SpecialTokens::default(),
        }
    }
}

impl ExampleConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded example config from {}", path.display());
        Ok(config)
    }

    /// Check the invariants the builder relies on.
    pub fn validate(&self) -> Result<()> {
        if self.token_capacity < 2 {
            return Err(Error::config(format!(
                "token_capacity must be at least 2 (start + end token), got {}",
                self.token_capacity
            )));
        }
        if self.mention_capacity == 0 {
            return Err(Error::config("mention_capacity must be at least 1"));
        }
        let SampleCapacity { train, eval, score } = self.capacity;
        if train == 0 || eval == 0 || score == 0 {
            return Err(Error::config(format!(
                "sample capacities must be positive (train={}, eval={}, score={})",
                train, eval, score
            )));
        }
        self.tokens.validate()
    }

    /// Pair slots for a policy.
    #[must_use]
    pub const fn capacity_for(&self, kind: PolicyKind) -> usize {
        self.capacity.for_kind(kind)
    }

    /// Builder-style override of `L`.
    #[must_use]
    pub fn with_token_capacity(mut self, capacity: usize) -> Self {
        self.token_capacity = capacity;
        self
    }

    /// Builder-style override of `M`.
    #[must_use]
    pub fn with_mention_capacity(mut self, capacity: usize) -> Self {
        self.mention_capacity = capacity;
        self
    }

    /// Builder-style override of the pair capacities.
    #[must_use]
    pub fn with_capacity(mut self, capacity: SampleCapacity) -> Self {
        self.capacity = capacity;
        self
    }

    /// Enable or disable entity-type pairs.
    #[must_use]
    pub fn with_entity_types(mut self, enabled: bool) -> Self {
        self.use_entity_type = enabled;
        self
    }
}
