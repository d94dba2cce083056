//! Serialized artifact payloads.
//!
//! Payload structs are shared by both encodings. They stay free of
//! internally tagged enums and skipped fields so Postcard can encode them;
//! only the JSON envelope uses a `type` tag.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::error::ReadError;
use super::format::ArtifactKind;
use crate::classifier::LogisticRegression;
use crate::prediction::Prediction;
use crate::scaler::{Scaler, StandardScaler};

/// Current JSON envelope version.
pub const JSON_FORMAT_VERSION: u32 = 1;

// ============================================================================
// Payloads
// ============================================================================

/// Logistic regression coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierPayload {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Class labels, `[negative, positive]`.
    pub classes: Vec<i64>,
    /// Original target names per class, e.g. `["e", "p"]`.
    #[serde(default)]
    pub class_names: Option<Vec<String>>,
}

/// Standard scaler statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerPayload {
    pub n_features: usize,
    #[serde(default)]
    pub mean: Option<Vec<f64>>,
    #[serde(default)]
    pub scale: Option<Vec<f64>>,
}

/// Ordered one-hot column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureColumnsPayload {
    pub columns: Vec<String>,
}

/// Any artifact payload. Tagged with `type` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArtifactPayload {
    Classifier(ClassifierPayload),
    Scaler(ScalerPayload),
    FeatureColumns(FeatureColumnsPayload),
}

impl ArtifactPayload {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::Classifier(_) => ArtifactKind::Classifier,
            Self::Scaler(_) => ArtifactKind::Scaler,
            Self::FeatureColumns(_) => ArtifactKind::FeatureColumns,
        }
    }
}

/// Top-level JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub sporecast_format: u32,
    pub artifact: ArtifactPayload,
}

impl JsonEnvelope {
    pub fn new(artifact: ArtifactPayload) -> Self {
        Self {
            sporecast_format: JSON_FORMAT_VERSION,
            artifact,
        }
    }
}

// ============================================================================
// Feature columns
// ============================================================================

/// The trained feature-column list, in training order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureColumns(Vec<String>);

impl FeatureColumns {
    pub fn new(columns: Vec<String>) -> Self {
        Self(columns)
    }

    #[inline]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

// ============================================================================
// Conversions
// ============================================================================

fn check_finite(what: &str, values: &[f64]) -> Result<(), ReadError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(ReadError::Validation(format!(
            "{what}[{i}] is not finite ({})",
            values[i]
        ))),
        None => Ok(()),
    }
}

/// Check declared class names against 0 = edible, 1 = poisonous.
///
/// Returns `Ok(false)` when no names are declared.
pub fn check_label_convention(class_names: Option<&[String]>) -> Result<bool, ReadError> {
    let Some(names) = class_names else {
        return Ok(false);
    };
    if names.len() != 2 {
        return Err(ReadError::Validation(format!(
            "expected 2 class names, got {}",
            names.len()
        )));
    }

    let expected = [
        (Prediction::EDIBLE_LABEL, &names[0], ["e", "edible"], "\"e\" or \"edible\""),
        (
            Prediction::POISONOUS_LABEL,
            &names[1],
            ["p", "poisonous"],
            "\"p\" or \"poisonous\"",
        ),
    ];
    for (label, name, accepted, description) in expected {
        let normalized = name.trim().to_ascii_lowercase();
        if !accepted.iter().any(|a| *a == normalized) {
            return Err(ReadError::LabelConvention {
                label,
                name: name.clone(),
                expected: description,
            });
        }
    }
    Ok(true)
}

impl TryFrom<ClassifierPayload> for LogisticRegression {
    type Error = ReadError;

    fn try_from(payload: ClassifierPayload) -> Result<Self, Self::Error> {
        if payload.coefficients.is_empty() {
            return Err(ReadError::Validation("classifier has no coefficients".into()));
        }
        check_finite("coefficients", &payload.coefficients)?;
        check_finite("intercept", &[payload.intercept])?;

        let expected = [Prediction::EDIBLE_LABEL, Prediction::POISONOUS_LABEL];
        if payload.classes != expected {
            return Err(ReadError::Validation(format!(
                "classifier classes must be {expected:?}, got {:?}",
                payload.classes
            )));
        }
        check_label_convention(payload.class_names.as_deref())?;

        let model = LogisticRegression::new(
            Array1::from(payload.coefficients),
            payload.intercept,
            expected,
        );
        Ok(match payload.class_names {
            Some(names) => match <[String; 2]>::try_from(names) {
                Ok([negative, positive]) => model.with_class_names(negative, positive),
                Err(names) => {
                    return Err(ReadError::Validation(format!(
                        "expected 2 class names, got {}",
                        names.len()
                    )))
                }
            },
            None => model,
        })
    }
}

impl From<&LogisticRegression> for ClassifierPayload {
    fn from(model: &LogisticRegression) -> Self {
        Self {
            coefficients: model.coefficients().to_vec(),
            intercept: model.intercept(),
            classes: model.classes().to_vec(),
            class_names: model.class_names().map(|names| names.to_vec()),
        }
    }
}

impl TryFrom<ScalerPayload> for StandardScaler {
    type Error = ReadError;

    fn try_from(payload: ScalerPayload) -> Result<Self, Self::Error> {
        if payload.n_features == 0 {
            return Err(ReadError::Validation("scaler has zero features".into()));
        }
        for (name, values) in [("mean", &payload.mean), ("scale", &payload.scale)] {
            if let Some(values) = values {
                if values.len() != payload.n_features {
                    return Err(ReadError::Validation(format!(
                        "scaler {name} has {} entries, expected {}",
                        values.len(),
                        payload.n_features
                    )));
                }
                check_finite(name, values)?;
            }
        }

        Ok(match (payload.mean, payload.scale) {
            (None, None) => StandardScaler::identity(payload.n_features),
            (mean, scale) => StandardScaler::new(mean.map(Array1::from), scale.map(Array1::from)),
        })
    }
}

impl From<&StandardScaler> for ScalerPayload {
    fn from(scaler: &StandardScaler) -> Self {
        Self {
            n_features: scaler.n_features(),
            mean: scaler.mean().map(|m| m.to_vec()),
            scale: scaler.scale().map(|s| s.to_vec()),
        }
    }
}

impl TryFrom<FeatureColumnsPayload> for FeatureColumns {
    type Error = ReadError;

    fn try_from(payload: FeatureColumnsPayload) -> Result<Self, Self::Error> {
        if payload.columns.is_empty() {
            return Err(ReadError::Validation("feature column list is empty".into()));
        }
        Ok(FeatureColumns(payload.columns))
    }
}

impl From<&FeatureColumns> for FeatureColumnsPayload {
    fn from(columns: &FeatureColumns) -> Self {
        Self {
            columns: columns.0.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
