//! Selection-to-prediction pipeline.
//!
//! [`PredictionContext`] holds everything a prediction needs: the column
//! index built from the trained feature columns, the fitted scaler and the
//! classifier. It is immutable once built and can be shared across threads
//! behind an `Arc`.
//!
//! A prediction runs four steps:
//!
//! 1. Validate the selections. Nothing downstream runs on failure.
//! 2. One-hot encode against the trained column layout.
//! 3. Scale.
//! 4. Classify and map the label (`1` poisonous, `0` edible).

use std::fmt;
use std::sync::Arc;

use crate::classifier::Classifier;
use crate::encoding::ColumnIndex;
use crate::error::{ContextError, PredictError};
use crate::persist::Artifacts;
use crate::prediction::Prediction;
use crate::scaler::Scaler;
use crate::schema::AttributeSchema;
use crate::selection::Selections;
use crate::utils::Parallelism;

/// Loaded artifacts ready to serve predictions.
#[derive(Clone)]
pub struct PredictionContext {
    index: ColumnIndex,
    scaler: Arc<dyn Scaler>,
    classifier: Arc<dyn Classifier>,
}

impl fmt::Debug for PredictionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionContext")
            .field("n_attributes", &self.index.groups().len())
            .field("n_columns", &self.index.n_columns())
            .finish_non_exhaustive()
    }
}

impl PredictionContext {
    /// Build a context.
    ///
    /// Fails if `columns` disagree with `schema`, or if the scaler or the
    /// classifier expect a different number of features than there are
    /// columns.
    pub fn new<S: AsRef<str>>(
        schema: &'static AttributeSchema,
        columns: &[S],
        scaler: Arc<dyn Scaler>,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, ContextError> {
        let index = ColumnIndex::build(schema, columns)?;
        let expected = index.n_columns();

        for (component, actual) in [
            ("scaler", scaler.n_features()),
            ("classifier", classifier.n_features()),
        ] {
            if actual != expected {
                return Err(ContextError::DimensionMismatch {
                    component,
                    expected,
                    actual,
                });
            }
        }

        Ok(Self {
            index,
            scaler,
            classifier,
        })
    }

    /// Build a context for the mushroom schema from loaded artifacts.
    pub fn from_artifacts(artifacts: Artifacts) -> Result<Self, ContextError> {
        Self::new(
            AttributeSchema::mushroom(),
            artifacts.columns.as_slice(),
            Arc::new(artifacts.scaler),
            Arc::new(artifacts.classifier),
        )
    }

    #[inline]
    pub fn index(&self) -> &ColumnIndex {
        &self.index
    }

    #[inline]
    pub fn schema(&self) -> &'static AttributeSchema {
        self.index.schema()
    }

    /// Predict the edibility of one selection set.
    pub fn predict(&self, selections: &Selections) -> Result<Prediction, PredictError> {
        if let Err(err) = self.index.validate(selections) {
            tracing::debug!(
                missing = ?err.missing,
                n_invalid = err.invalid.len(),
                "rejected selections"
            );
            return Err(err.into());
        }

        let encoded = self.index.encode(selections)?;
        let scaled = self.scaler.transform(encoded.view());
        let label = self.classifier.predict(scaled.view());

        Prediction::from_label(label).ok_or(PredictError::Label(label))
    }

    /// Predict many selection sets. Output order matches input order.
    pub fn predict_batch(
        &self,
        batch: &[Selections],
        parallelism: Parallelism,
    ) -> Vec<Result<Prediction, PredictError>> {
        parallelism.maybe_par_map(batch, |selections| self.predict(selections))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ndarray::{Array1, ArrayView1};

    use crate::testing::{complete_selections, fixture_context, mushroom_columns};

    struct CountingScaler {
        n_features: usize,
        calls: AtomicUsize,
    }

    impl Scaler for CountingScaler {
        fn n_features(&self) -> usize {
            self.n_features
        }

        fn transform(&self, row: ArrayView1<'_, f64>) -> Array1<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            row.to_owned()
        }
    }

    struct FixedClassifier {
        n_features: usize,
        label: i64,
        calls: AtomicUsize,
    }

    impl Classifier for FixedClassifier {
        fn n_features(&self) -> usize {
            self.n_features
        }

        fn predict(&self, _row: ArrayView1<'_, f64>) -> i64 {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.label
        }
    }

    struct Fakes {
        context: PredictionContext,
        scaler: Arc<CountingScaler>,
        classifier: Arc<FixedClassifier>,
    }

    fn fakes(label: i64) -> Fakes {
        let columns = mushroom_columns();
        let scaler = Arc::new(CountingScaler {
            n_features: columns.len(),
            calls: AtomicUsize::new(0),
        });
        let classifier = Arc::new(FixedClassifier {
            n_features: columns.len(),
            label,
            calls: AtomicUsize::new(0),
        });
        let context = PredictionContext::new(
            AttributeSchema::mushroom(),
            &columns,
            scaler.clone(),
            classifier.clone(),
        )
        .unwrap();
        Fakes {
            context,
            scaler,
            classifier,
        }
    }

    // =========================================================================
    // Construction
    // =========================================================================

    #[test]
    fn rejects_scaler_dimension_mismatch() {
        let columns = mushroom_columns();
        let err = PredictionContext::new(
            AttributeSchema::mushroom(),
            &columns,
            Arc::new(CountingScaler {
                n_features: columns.len() - 1,
                calls: AtomicUsize::new(0),
            }),
            Arc::new(FixedClassifier {
                n_features: columns.len(),
                label: 0,
                calls: AtomicUsize::new(0),
            }),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ContextError::DimensionMismatch {
                component: "scaler",
                ..
            }
        ));
    }

    #[test]
    fn rejects_column_mismatch() {
        let mut columns = mushroom_columns();
        columns.push("spore-print-color_q".into());
        let fakes = fakes(0);
        let err = PredictionContext::new(
            AttributeSchema::mushroom(),
            &columns,
            fakes.scaler,
            fakes.classifier,
        )
        .unwrap_err();
        assert!(matches!(err, ContextError::SchemaMismatch(_)));
    }

    // =========================================================================
    // predict
    // =========================================================================

    #[test]
    fn missing_habitat_never_reaches_model() {
        let fakes = fakes(1);
        let mut selections = complete_selections();
        selections.clear("habitat");

        let err = fakes.context.predict(&selections).unwrap_err();
        let PredictError::Validation(validation) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(validation.missing, vec!["habitat"]);
        assert_eq!(fakes.scaler.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fakes.classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_code_never_reaches_model() {
        let fakes = fakes(1);
        let selections = complete_selections().with("odor", "q");
        assert!(matches!(
            fakes.context.predict(&selections),
            Err(PredictError::Validation(_))
        ));
        assert_eq!(fakes.scaler.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn label_one_is_poisonous() {
        let fakes = fakes(1);
        assert_eq!(
            fakes.context.predict(&complete_selections()).unwrap(),
            Prediction::Poisonous
        );
        assert_eq!(fakes.scaler.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fakes.classifier.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn label_zero_is_edible() {
        let fakes = fakes(0);
        assert_eq!(
            fakes.context.predict(&complete_selections()).unwrap(),
            Prediction::Edible
        );
    }

    #[test]
    fn unexpected_label_is_error() {
        let fakes = fakes(7);
        assert!(matches!(
            fakes.context.predict(&complete_selections()),
            Err(PredictError::Label(7))
        ));
    }

    #[test]
    fn predict_is_idempotent() {
        let context = fixture_context();
        let selections = complete_selections().with("odor", "f");
        let first = context.predict(&selections).unwrap();
        for _ in 0..5 {
            assert_eq!(context.predict(&selections).unwrap(), first);
        }
    }

    #[test]
    fn fixture_model_reads_odor() {
        let context = fixture_context();
        let foul = complete_selections().with("odor", "f");
        let almond = complete_selections().with("odor", "a");
        assert_eq!(context.predict(&foul).unwrap(), Prediction::Poisonous);
        assert_eq!(context.predict(&almond).unwrap(), Prediction::Edible);
    }

    // =========================================================================
    // predict_batch
    // =========================================================================

    #[test]
    fn batch_matches_single_predictions() {
        let context = fixture_context();
        let mut incomplete = complete_selections();
        incomplete.clear("odor");
        let batch = vec![
            complete_selections().with("odor", "f"),
            incomplete,
            complete_selections().with("odor", "n"),
        ];

        for parallelism in [Parallelism::Sequential, Parallelism::Parallel] {
            let results = context.predict_batch(&batch, parallelism);
            assert_eq!(results.len(), 3);
            assert_eq!(results[0].as_ref().unwrap(), &Prediction::Poisonous);
            assert!(matches!(results[1], Err(PredictError::Validation(_))));
            assert_eq!(results[2].as_ref().unwrap(), &Prediction::Edible);
        }
    }
}
