//! Feature scaling.
//!
//! The scaler is fitted outside this crate; here it is a pure function from
//! an encoded row to a scaled row. [`StandardScaler`] reproduces the
//! standardisation used at training time: `(x - mean) / scale`.

use ndarray::{Array1, ArrayView1, Zip};

/// A fitted, stateless feature transform.
pub trait Scaler: Send + Sync {
    /// Number of features the scaler was fitted on.
    fn n_features(&self) -> usize;

    /// Scale one row. `row.len()` must equal [`n_features`](Self::n_features).
    fn transform(&self, row: ArrayView1<'_, f64>) -> Array1<f64>;
}

/// Per-feature standardisation.
///
/// Either step can be disabled by leaving `mean` or `scale` empty. A zero
/// scale is treated as `1.0` so constant features pass through centred.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use sporecast::scaler::{Scaler, StandardScaler};
///
/// let scaler = StandardScaler::new(Some(array![0.5, 0.0]), Some(array![0.5, 0.0]));
/// let scaled = scaler.transform(array![1.0, 1.0].view());
/// assert_eq!(scaled, array![1.0, 1.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
    n_features: usize,
}

impl StandardScaler {
    /// Create a scaler.
    ///
    /// # Panics
    ///
    /// Panics if both `mean` and `scale` are given with different lengths.
    pub fn new(mean: Option<Array1<f64>>, scale: Option<Array1<f64>>) -> Self {
        let n_features = match (&mean, &scale) {
            (Some(m), Some(s)) => {
                assert_eq!(
                    m.len(),
                    s.len(),
                    "mean length {} doesn't match scale length {}",
                    m.len(),
                    s.len()
                );
                m.len()
            }
            (Some(m), None) => m.len(),
            (None, Some(s)) => s.len(),
            (None, None) => 0,
        };
        let scale = scale.map(|s| s.mapv(|v| if v == 0.0 { 1.0 } else { v }));
        Self {
            mean,
            scale,
            n_features,
        }
    }

    /// A pass-through scaler over `n_features` features.
    pub fn identity(n_features: usize) -> Self {
        Self {
            mean: None,
            scale: None,
            n_features,
        }
    }

    /// Per-feature means, if centring is enabled.
    #[inline]
    pub fn mean(&self) -> Option<ArrayView1<'_, f64>> {
        self.mean.as_ref().map(|m| m.view())
    }

    /// Per-feature scales, if scaling is enabled.
    #[inline]
    pub fn scale(&self) -> Option<ArrayView1<'_, f64>> {
        self.scale.as_ref().map(|s| s.view())
    }
}

impl Scaler for StandardScaler {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn transform(&self, row: ArrayView1<'_, f64>) -> Array1<f64> {
        debug_assert_eq!(row.len(), self.n_features, "row length mismatch");

        let mut out = row.to_owned();
        if let Some(mean) = &self.mean {
            out -= mean;
        }
        if let Some(scale) = &self.scale {
            Zip::from(&mut out).and(scale).for_each(|x, &s| *x /= s);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn standardises() {
        let scaler = StandardScaler::new(Some(array![0.25, 0.5]), Some(array![0.5, 0.25]));
        let out = scaler.transform(array![1.0, 0.0].view());
        assert_abs_diff_eq!(out[0], 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(out[1], -2.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_scale_treated_as_one() {
        let scaler = StandardScaler::new(Some(array![1.0]), Some(array![0.0]));
        assert_eq!(scaler.scale().unwrap()[0], 1.0);
        assert_eq!(scaler.transform(array![1.0].view()), array![0.0]);
    }

    #[test]
    fn mean_only_and_scale_only() {
        let centre = StandardScaler::new(Some(array![0.5]), None);
        assert_eq!(centre.transform(array![1.0].view()), array![0.5]);

        let scale = StandardScaler::new(None, Some(array![4.0]));
        assert_eq!(scale.transform(array![1.0].view()), array![0.25]);
    }

    #[test]
    fn identity_passes_through() {
        let scaler = StandardScaler::identity(3);
        assert_eq!(scaler.n_features(), 3);
        let row = array![1.0, 0.0, 1.0];
        assert_eq!(scaler.transform(row.view()), row);
    }

    #[test]
    #[should_panic(expected = "doesn't match scale length")]
    fn panics_on_length_mismatch() {
        StandardScaler::new(Some(array![0.0, 0.0]), Some(array![1.0]));
    }
}
