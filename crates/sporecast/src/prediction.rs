//! Prediction outcome.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Edibility verdict.
///
/// Class label `1` is poisonous and `0` is edible. The mapping is fixed; the
/// classifier artifact is checked against it when it declares class names
/// (see [`crate::persist`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prediction {
    Edible,
    Poisonous,
}

impl Prediction {
    /// Class label of poisonous mushrooms.
    pub const POISONOUS_LABEL: i64 = 1;
    /// Class label of edible mushrooms.
    pub const EDIBLE_LABEL: i64 = 0;

    /// Map a classifier label; `None` for anything but 0 or 1.
    pub fn from_label(label: i64) -> Option<Self> {
        match label {
            Self::POISONOUS_LABEL => Some(Self::Poisonous),
            Self::EDIBLE_LABEL => Some(Self::Edible),
            _ => None,
        }
    }

    /// The classifier label for this outcome.
    pub fn label(self) -> i64 {
        match self {
            Self::Edible => Self::EDIBLE_LABEL,
            Self::Poisonous => Self::POISONOUS_LABEL,
        }
    }

    /// Display text.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Edible => "Edible",
            Self::Poisonous => "Poisonous",
        }
    }

    #[inline]
    pub fn is_poisonous(self) -> bool {
        matches!(self, Self::Poisonous)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
