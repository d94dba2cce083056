//! Binary classifiers.
//!
//! A [`Classifier`] maps a scaled feature row to a class label. The only
//! concrete model is [`LogisticRegression`], which stores one coefficient per
//! feature plus an intercept:
//!
//! ```text
//! decision = coefficients · x + intercept
//! label    = classes[1] if decision > 0 else classes[0]
//! ```

use ndarray::{Array1, ArrayView1};

/// A fitted classifier returning integer class labels.
pub trait Classifier: Send + Sync {
    /// Number of input features.
    fn n_features(&self) -> usize;

    /// Predict the class label of one row.
    fn predict(&self, row: ArrayView1<'_, f64>) -> i64;
}

/// Binary logistic regression.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use sporecast::classifier::{Classifier, LogisticRegression};
///
/// let model = LogisticRegression::new(array![2.0, -1.0], -0.5, [0, 1]);
/// assert_eq!(model.predict(array![1.0, 0.0].view()), 1);
/// assert_eq!(model.predict(array![0.0, 1.0].view()), 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    coefficients: Array1<f64>,
    intercept: f64,
    /// `[negative, positive]` class labels.
    classes: [i64; 2],
    /// Names for `classes`, when the artifact declared them.
    class_names: Option<[String; 2]>,
}

impl LogisticRegression {
    pub fn new(coefficients: Array1<f64>, intercept: f64, classes: [i64; 2]) -> Self {
        Self {
            coefficients,
            intercept,
            classes,
            class_names: None,
        }
    }

    /// Attach names for the negative and positive class.
    pub fn with_class_names(
        mut self,
        negative: impl Into<String>,
        positive: impl Into<String>,
    ) -> Self {
        self.class_names = Some([negative.into(), positive.into()]);
        self
    }

    /// A model with all-zero coefficients.
    pub fn zeros(n_features: usize) -> Self {
        Self::new(Array1::zeros(n_features), 0.0, [0, 1])
    }

    #[inline]
    pub fn coefficients(&self) -> ArrayView1<'_, f64> {
        self.coefficients.view()
    }

    #[inline]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    #[inline]
    pub fn classes(&self) -> [i64; 2] {
        self.classes
    }

    pub fn class_names(&self) -> Option<&[String; 2]> {
        self.class_names.as_ref()
    }

    /// Raw margin for one row.
    #[inline]
    pub fn decision_function(&self, row: ArrayView1<'_, f64>) -> f64 {
        debug_assert_eq!(
            row.len(),
            self.coefficients.len(),
            "not enough features: got {}, need {}",
            row.len(),
            self.coefficients.len()
        );
        row.dot(&self.coefficients) + self.intercept
    }

    /// Probability of the positive class (`classes[1]`).
    #[inline]
    pub fn probability(&self, row: ArrayView1<'_, f64>) -> f64 {
        sigmoid(self.decision_function(row))
    }
}

impl Classifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, row: ArrayView1<'_, f64>) -> i64 {
        if self.decision_function(row) > 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        }
    }
}

/// Numerically stable sigmoid.
#[inline]
fn sigmoid(x: f64) -> f64 {
    let clamped = x.clamp(-500.0, 500.0);
    if clamped >= 0.0 {
        1.0 / (1.0 + (-clamped).exp())
    } else {
        let e = clamped.exp();
        e / (1.0 + e)
    }
}
