//! sporecast: mushroom edibility prediction from categorical attributes.
//!
//! The user picks one category per attribute (cap shape, odor, habitat, ...).
//! The selections are one-hot encoded against the feature columns the model
//! was trained on, scaled, and classified as edible or poisonous.
//!
//! # Key Types
//!
//! - [`AttributeSchema`] - The fixed attribute and category tables
//! - [`Selections`] - One user's attribute choices
//! - [`ColumnIndex`] - Trained column layout, validated against the schema
//! - [`PredictionContext`] - Encoder, scaler and classifier wired together
//! - [`Artifacts`] - The three model files loaded from disk
//!
//! # Example
//!
//! ```
//! use sporecast::testing::{complete_selections, fixture_context};
//! use sporecast::Prediction;
//!
//! let context = fixture_context();
//! let selections = complete_selections().with("odor", "f");
//! assert_eq!(context.predict(&selections)?, Prediction::Poisonous);
//! # Ok::<(), sporecast::PredictError>(())
//! ```

pub mod classifier;
pub mod encoding;
pub mod error;
pub mod persist;
pub mod pipeline;
pub mod prediction;
pub mod scaler;
pub mod schema;
pub mod selection;
pub mod testing;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use classifier::{Classifier, LogisticRegression};
pub use encoding::{encode, ColumnIndex};
pub use error::{
    ContextError, InvalidReason, InvalidSelection, PredictError, SchemaMismatchError,
    ValidationError,
};
pub use persist::{ArtifactFormat, ArtifactLoadError, ArtifactPaths, Artifacts, FeatureColumns};
pub use pipeline::PredictionContext;
pub use prediction::Prediction;
pub use scaler::{Scaler, StandardScaler};
pub use schema::{Attribute, AttributeSchema, Category};
pub use selection::{SelectionState, Selections};
pub use utils::{run_with_threads, Parallelism};
