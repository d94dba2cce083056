//! Artifact persistence.
//!
//! A trained model is three files: the classifier, the scaler, and the
//! ordered feature-column list. Each file is either a JSON envelope
//!
//! ```json
//! {
//!   "sporecast_format": 1,
//!   "artifact": {"type": "scaler", "n_features": 2, "mean": [0.5, 0.5], "scale": [0.5, 0.5]}
//! }
//! ```
//!
//! or a binary frame (see [`format`]). The encoding is detected from the
//! file content, so readers accept either.
//!
//! # Example
//!
//! ```no_run
//! use sporecast::persist::{ArtifactPaths, Artifacts};
//!
//! let paths = ArtifactPaths::builder().dir("artifacts").build();
//! let artifacts = Artifacts::load(&paths)?;
//! println!("{} feature columns", artifacts.columns.len());
//! # Ok::<(), sporecast::persist::ArtifactLoadError>(())
//! ```

pub mod error;
pub mod format;
pub mod payload;

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};

use bon::Builder;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::classifier::{Classifier, LogisticRegression};
use crate::prediction::Prediction;
use crate::scaler::{Scaler, StandardScaler};

pub use error::{ArtifactLoadError, ReadError, WriteError};
pub use format::{ArtifactKind, DecodeError, EncodeError, FormatHeader, HEADER_SIZE, MAGIC};
pub use payload::{
    check_label_convention, ArtifactPayload, ClassifierPayload, FeatureColumns,
    FeatureColumnsPayload, JsonEnvelope, ScalerPayload, JSON_FORMAT_VERSION,
};

/// Default artifact directory.
pub const DEFAULT_ARTIFACT_DIR: &str = "artifacts";
/// Default classifier file name.
pub const DEFAULT_CLASSIFIER_FILE: &str = "logistic_model.json";
/// Default scaler file name.
pub const DEFAULT_SCALER_FILE: &str = "scaler.json";
/// Default feature-column file name.
pub const DEFAULT_COLUMNS_FILE: &str = "feature_columns.json";

// ============================================================================
// Encoding
// ============================================================================

/// On-disk encoding of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// Pretty-printed JSON envelope.
    Json,
    /// Header + Postcard payload.
    Binary,
}

impl ArtifactFormat {
    /// Detect the encoding from the leading bytes.
    pub fn detect(bytes: &[u8]) -> Self {
        if format::is_binary(bytes) {
            Self::Binary
        } else {
            Self::Json
        }
    }
}

#[derive(Deserialize)]
struct VersionProbe {
    sporecast_format: u32,
}

fn decode_postcard<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ReadError> {
    postcard::from_bytes(bytes).map_err(|e| ReadError::Binary(DecodeError::Decoding(e)))
}

/// Decode any artifact payload, JSON or binary.
pub fn read_payload(bytes: &[u8]) -> Result<ArtifactPayload, ReadError> {
    match ArtifactFormat::detect(bytes) {
        ArtifactFormat::Binary => {
            let (header, body) = format::read_frame(&mut Cursor::new(bytes))?;
            Ok(match header.kind {
                ArtifactKind::Classifier => ArtifactPayload::Classifier(decode_postcard(&body)?),
                ArtifactKind::Scaler => ArtifactPayload::Scaler(decode_postcard(&body)?),
                ArtifactKind::FeatureColumns => {
                    ArtifactPayload::FeatureColumns(decode_postcard(&body)?)
                }
            })
        }
        ArtifactFormat::Json => {
            // Check the version before the body so newer files report it.
            let probe: VersionProbe = serde_json::from_slice(bytes)?;
            if probe.sporecast_format > JSON_FORMAT_VERSION {
                return Err(ReadError::UnsupportedFormatVersion(probe.sporecast_format));
            }
            let envelope: JsonEnvelope = serde_json::from_slice(bytes)?;
            Ok(envelope.artifact)
        }
    }
}

/// Encode an artifact payload.
pub fn write_payload<W: Write>(
    writer: &mut W,
    payload: &ArtifactPayload,
    format: ArtifactFormat,
) -> Result<(), WriteError> {
    match format {
        ArtifactFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, &JsonEnvelope::new(payload.clone()))?;
            writer.write_all(b"\n")?;
        }
        ArtifactFormat::Binary => {
            let kind = payload.kind();
            match payload {
                ArtifactPayload::Classifier(p) => format::write_binary(writer, kind, p)?,
                ArtifactPayload::Scaler(p) => format::write_binary(writer, kind, p)?,
                ArtifactPayload::FeatureColumns(p) => format::write_binary(writer, kind, p)?,
            }
        }
    }
    Ok(())
}

// ============================================================================
// Artifact trait
// ============================================================================

/// A runtime type stored as one artifact file.
pub trait Artifact: Sized {
    /// The kind recorded in the file.
    const KIND: ArtifactKind;

    /// Number of features this artifact covers.
    fn n_features(&self) -> usize;

    fn to_payload(&self) -> ArtifactPayload;

    /// Validate and convert a decoded payload.
    fn from_payload(payload: ArtifactPayload) -> Result<Self, ReadError>;
}

fn kind_mismatch<T>(expected: ArtifactKind, payload: &ArtifactPayload) -> Result<T, ReadError> {
    Err(ReadError::KindMismatch {
        expected,
        actual: payload.kind(),
    })
}

impl Artifact for LogisticRegression {
    const KIND: ArtifactKind = ArtifactKind::Classifier;

    fn n_features(&self) -> usize {
        Classifier::n_features(self)
    }

    fn to_payload(&self) -> ArtifactPayload {
        ArtifactPayload::Classifier(self.into())
    }

    fn from_payload(payload: ArtifactPayload) -> Result<Self, ReadError> {
        match payload {
            ArtifactPayload::Classifier(p) => {
                if p.class_names.is_none() {
                    tracing::warn!(
                        edible = Prediction::EDIBLE_LABEL,
                        poisonous = Prediction::POISONOUS_LABEL,
                        "classifier declares no class names; label convention unverified"
                    );
                }
                p.try_into()
            }
            other => kind_mismatch(Self::KIND, &other),
        }
    }
}

impl Artifact for StandardScaler {
    const KIND: ArtifactKind = ArtifactKind::Scaler;

    fn n_features(&self) -> usize {
        Scaler::n_features(self)
    }

    fn to_payload(&self) -> ArtifactPayload {
        ArtifactPayload::Scaler(self.into())
    }

    fn from_payload(payload: ArtifactPayload) -> Result<Self, ReadError> {
        match payload {
            ArtifactPayload::Scaler(p) => p.try_into(),
            other => kind_mismatch(Self::KIND, &other),
        }
    }
}

impl Artifact for FeatureColumns {
    const KIND: ArtifactKind = ArtifactKind::FeatureColumns;

    fn n_features(&self) -> usize {
        self.len()
    }

    fn to_payload(&self) -> ArtifactPayload {
        ArtifactPayload::FeatureColumns(self.into())
    }

    fn from_payload(payload: ArtifactPayload) -> Result<Self, ReadError> {
        match payload {
            ArtifactPayload::FeatureColumns(p) => p.try_into(),
            other => kind_mismatch(Self::KIND, &other),
        }
    }
}

/// Decode and validate an artifact from bytes.
pub fn read_artifact<A: Artifact>(bytes: &[u8]) -> Result<A, ReadError> {
    A::from_payload(read_payload(bytes)?)
}

/// Encode an artifact.
pub fn write_artifact<A: Artifact, W: Write>(
    writer: &mut W,
    artifact: &A,
    format: ArtifactFormat,
) -> Result<(), WriteError> {
    write_payload(writer, &artifact.to_payload(), format)
}

/// Load an artifact file.
pub fn load_artifact<A: Artifact>(path: &Path) -> Result<A, ArtifactLoadError> {
    let fail = |source: ReadError| ArtifactLoadError::new(A::KIND, path, source);

    let bytes = std::fs::read(path).map_err(|e| fail(e.into()))?;
    let format = ArtifactFormat::detect(&bytes);
    let artifact = read_artifact::<A>(&bytes).map_err(fail)?;

    tracing::info!(
        path = %path.display(),
        kind = %A::KIND,
        ?format,
        n_features = artifact.n_features(),
        "loaded artifact"
    );
    Ok(artifact)
}

/// Write an artifact file, replacing any existing one.
pub fn save_artifact<A: Artifact>(
    path: &Path,
    artifact: &A,
    format: ArtifactFormat,
) -> Result<(), WriteError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_artifact(&mut writer, artifact, format)?;
    writer.flush()?;
    Ok(())
}

// ============================================================================
// Artifact set
// ============================================================================

/// Where the three artifact files live.
///
/// Relative file names resolve against `dir`; absolute ones are used as is.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(derive(Clone, Debug))]
pub struct ArtifactPaths {
    #[builder(into, default = PathBuf::from(DEFAULT_ARTIFACT_DIR))]
    pub dir: PathBuf,

    #[builder(into, default = PathBuf::from(DEFAULT_CLASSIFIER_FILE))]
    pub classifier: PathBuf,

    #[builder(into, default = PathBuf::from(DEFAULT_SCALER_FILE))]
    pub scaler: PathBuf,

    #[builder(into, default = PathBuf::from(DEFAULT_COLUMNS_FILE))]
    pub columns: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ArtifactPaths {
    /// Resolve a file name against `dir`.
    pub fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.dir.join(file)
        }
    }

    pub fn classifier_path(&self) -> PathBuf {
        self.resolve(&self.classifier)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.resolve(&self.scaler)
    }

    pub fn columns_path(&self) -> PathBuf {
        self.resolve(&self.columns)
    }
}

/// The three loaded artifacts, checked against each other.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub classifier: LogisticRegression,
    pub scaler: StandardScaler,
    pub columns: FeatureColumns,
}

impl Artifacts {
    /// Load all three files and check their dimensions agree.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactLoadError> {
        let columns: FeatureColumns = load_artifact(&paths.columns_path())?;

        let scaler_path = paths.scaler_path();
        let scaler: StandardScaler = load_artifact(&scaler_path)?;
        check_dimension(ArtifactKind::Scaler, &scaler_path, &scaler, columns.len())?;

        let classifier_path = paths.classifier_path();
        let classifier: LogisticRegression = load_artifact(&classifier_path)?;
        check_dimension(ArtifactKind::Classifier, &classifier_path, &classifier, columns.len())?;

        Ok(Self {
            classifier,
            scaler,
            columns,
        })
    }

    /// Write all three files. `paths.dir` must exist.
    pub fn save(&self, paths: &ArtifactPaths, format: ArtifactFormat) -> Result<(), WriteError> {
        save_artifact(&paths.columns_path(), &self.columns, format)?;
        save_artifact(&paths.scaler_path(), &self.scaler, format)?;
        save_artifact(&paths.classifier_path(), &self.classifier, format)?;
        Ok(())
    }
}

fn check_dimension<A: Artifact>(
    kind: ArtifactKind,
    path: &Path,
    artifact: &A,
    n_columns: usize,
) -> Result<(), ArtifactLoadError> {
    if artifact.n_features() == n_columns {
        return Ok(());
    }
    Err(ArtifactLoadError::new(
        kind,
        path,
        ReadError::Validation(format!(
            "{kind} has {} features but there are {n_columns} feature columns",
            artifact.n_features()
        )),
    ))
}

// ============================================================================
// Tests
// ============================================================================
