//! Error types.
//!
//! - [`ValidationError`]: the user's selections are incomplete or invalid.
//!   Recoverable; surfaced back to the form.
//! - [`SchemaMismatchError`]: the trained feature columns disagree with the
//!   attribute schema. Fatal configuration error.
//! - [`ContextError`]: a prediction context could not be assembled.
//! - [`PredictError`]: any failure of a single prediction.
//!
//! Artifact loading errors live in [`crate::persist`].

use std::fmt;

use serde::Serialize;

// =============================================================================
// ValidationError
// =============================================================================

/// Why a single selection was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// The attribute is not part of the schema.
    UnknownAttribute,
    /// The code is not a valid category of the attribute.
    UnknownCategory,
    /// The code is valid but the trained model has no column for it.
    NotTrained,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAttribute => write!(f, "unknown attribute"),
            Self::UnknownCategory => write!(f, "unknown category"),
            Self::NotTrained => write!(f, "category not seen in training"),
        }
    }
}

/// A selection that cannot be encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidSelection {
    pub attribute: String,
    pub code: String,
    pub reason: InvalidReason,
}

/// Incomplete or invalid user selections.
///
/// `missing` lists unselected attributes in schema order; `invalid` lists
/// selections that cannot be encoded, sorted by attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationError {
    pub missing: Vec<String>,
    pub invalid: Vec<InvalidSelection>,
}

impl ValidationError {
    /// Returns true if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("missing selections: {}", self.missing.join(", ")));
        }
        for inv in &self.invalid {
            parts.push(format!("{}={:?}: {}", inv.attribute, inv.code, inv.reason));
        }
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

// =============================================================================
// SchemaMismatchError
// =============================================================================

/// The trained feature columns and the attribute schema disagree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaMismatchError {
    /// Column name has no `_` separating attribute from code.
    #[error("feature column {column:?} is not of the form <attribute>_<code>")]
    MalformedColumn { column: String },

    /// Column names an attribute the schema does not know.
    #[error("feature column {column:?} names unknown attribute {attribute:?}")]
    UnknownAttribute { column: String, attribute: String },

    /// Column names a code the schema does not list for its attribute.
    #[error("feature column {column:?} names unknown category {code:?} of {attribute:?}")]
    UnknownCategory {
        column: String,
        attribute: String,
        code: String,
    },

    /// The same column appears twice.
    #[error("feature column {column:?} appears more than once")]
    DuplicateColumn { column: String },

    /// A schema attribute has no trained column at all.
    #[error("attribute {attribute:?} has no trained feature column")]
    UntrainedAttribute { attribute: String },

    /// No selection exists for the attribute of a trained column.
    #[error("no selection for attribute of feature column {column:?}")]
    MissingSelection { column: String },
}

// =============================================================================
// ContextError / PredictError
// =============================================================================

/// Failure to assemble a prediction context.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatchError),

    /// A component expects a different number of features than there are
    /// trained columns.
    #[error("{component} expects {actual} features but there are {expected} trained columns")]
    DimensionMismatch {
        component: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Failure of a single prediction.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("invalid selections: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatchError),

    /// The classifier returned a label other than 0 or 1.
    #[error("classifier returned unexpected label {0}")]
    Label(i64),
}
