//! Web form, JSON API and command-line front end for sporecast.

pub mod app;
pub mod config;
pub mod render;

use anyhow::Context;
use sporecast::{ArtifactPaths, Artifacts, PredictionContext};
use tracing::info;

pub use app::{build_router, AppState, PredictResponse};
pub use config::{load_config, resolve_config, AppConfig};

/// Load the artifacts and build a prediction context.
///
/// # Errors
///
/// Fails if any artifact file is missing, corrupt, or inconsistent with the
/// others or with the attribute schema.
pub fn load_context(paths: &ArtifactPaths) -> anyhow::Result<PredictionContext> {
    let artifacts = Artifacts::load(paths)?;
    let n_columns = artifacts.columns.len();
    let context = PredictionContext::from_artifacts(artifacts).with_context(|| {
        format!(
            "artifacts in {} do not fit the attribute schema",
            paths.dir.display()
        )
    })?;
    info!(
        n_columns,
        n_attributes = context.schema().len(),
        "prediction context ready"
    );
    Ok(context)
}
