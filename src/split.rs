//! Dataset splits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which part of a dataset a document belongs to.
///
/// `Train` selects training behaviour (negative sampling, unlabeled documents
/// dropped); the other splits are evaluation modes. `Test` additionally
/// strips gold labels before processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    /// Training data.
    Train,
    /// Development data.
    Valid,
    /// Held-out test data.
    Test,
}

impl Split {
    /// All splits in canonical order.
    pub const ALL: [Split; 3] = [Split::Train, Split::Valid, Split::Test];

    /// Lowercase name used in file names and on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Valid => "valid",
            Split::Test => "test",
        }
    }

    /// True for the training split.
    #[must_use]
    pub const fn is_train(&self) -> bool {
        matches!(self, Split::Train)
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "train" => Ok(Split::Train),
            "valid" | "dev" | "validation" => Ok(Split::Valid),
            "test" => Ok(Split::Test),
            other => Err(Error::invalid_input(format!(
                "unknown split '{}' (expected train, valid or test)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("train".parse::<Split>().unwrap(), Split::Train);
        assert_eq!("DEV".parse::<Split>().unwrap(), Split::Valid);
        assert_eq!("test".parse::<Split>().unwrap(), Split::Test);
        assert!("holdout".parse::<Split>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for split in Split::ALL {
            assert_eq!(split.to_string().parse::<Split>().unwrap(), split);
        }
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Split::Valid).unwrap(), "\"valid\"");
    }
}
