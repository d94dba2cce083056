//! Shared fixtures for tests.
//!
//! The fixture model is deliberately small: it only looks at `odor`, calling
//! creosote, fishy, foul, musty, pungent and spicy odors poisonous and
//! almond, anise and no odor edible. Every other column has weight zero.

use std::path::Path;

use ndarray::Array1;

use crate::classifier::LogisticRegression;
use crate::persist::{ArtifactFormat, ArtifactPaths, Artifacts, FeatureColumns, WriteError};
use crate::pipeline::PredictionContext;
use crate::scaler::StandardScaler;
use crate::schema::AttributeSchema;
use crate::selection::Selections;

/// Odor codes the fixture model calls poisonous.
pub const POISONOUS_ODORS: &[&str] = &["c", "f", "m", "p", "s", "y"];

/// Odor codes the fixture model calls edible.
pub const EDIBLE_ODORS: &[&str] = &["a", "l", "n"];

/// Every schema column, attributes in schema order and codes sorted, as
/// one-hot encoding a full training set would produce.
pub fn mushroom_columns() -> Vec<String> {
    AttributeSchema::mushroom()
        .attributes()
        .iter()
        .flat_map(|attribute| {
            let mut codes: Vec<_> = attribute.categories.iter().map(|c| c.code).collect();
            codes.sort_unstable();
            codes
                .into_iter()
                .map(move |code| format!("{}_{}", attribute.name, code))
        })
        .collect()
}

/// A complete selection: the first listed category of every attribute.
pub fn complete_selections() -> Selections {
    AttributeSchema::mushroom()
        .attributes()
        .iter()
        .map(|a| (a.name, a.categories[0].code))
        .collect()
}

/// Scaler dividing every column by two.
pub fn fixture_scaler(n_features: usize) -> StandardScaler {
    StandardScaler::new(None, Some(Array1::from_elem(n_features, 2.0)))
}

/// Logistic model keyed on odor only.
pub fn fixture_classifier(columns: &[String]) -> LogisticRegression {
    let coefficients = columns
        .iter()
        .map(|column| match column.strip_prefix("odor_") {
            Some(code) if POISONOUS_ODORS.contains(&code) => 1.0,
            Some(code) if EDIBLE_ODORS.contains(&code) => -1.0,
            _ => 0.0,
        })
        .collect();
    LogisticRegression::new(coefficients, 0.0, [0, 1])
}

/// The three fixture artifacts over [`mushroom_columns`].
pub fn fixture_artifacts() -> Artifacts {
    let columns = mushroom_columns();
    Artifacts {
        classifier: fixture_classifier(&columns),
        scaler: fixture_scaler(columns.len()),
        columns: FeatureColumns::new(columns),
    }
}

/// A ready context over the fixture artifacts.
pub fn fixture_context() -> PredictionContext {
    match PredictionContext::from_artifacts(fixture_artifacts()) {
        Ok(context) => context,
        Err(err) => panic!("fixture context is invalid: {err}"),
    }
}

/// Write the fixture artifacts into `dir` under the default file names.
pub fn write_fixture_artifacts(
    dir: &Path,
    format: ArtifactFormat,
) -> Result<ArtifactPaths, WriteError> {
    let paths = ArtifactPaths::builder().dir(dir).build();
    fixture_artifacts().save(&paths, format)?;
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_cover_schema() {
        let schema = AttributeSchema::mushroom();
        let total: usize = schema.attributes().iter().map(|a| a.categories.len()).sum();
        assert_eq!(mushroom_columns().len(), total);
        assert_eq!(mushroom_columns()[0], "cap-shape_b");
    }

    #[test]
    fn complete_selections_are_complete() {
        assert!(complete_selections()
            .state(AttributeSchema::mushroom())
            .is_complete());
    }
}
