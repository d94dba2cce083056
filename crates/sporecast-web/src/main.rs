//! sporecast command-line entry point.
//!
//! Usage:
//!   sporecast serve --config sporecast.yaml
//!   sporecast check
//!   sporecast predict odor=f habitat=d ...
//!   sporecast batch selections.json --threads 4

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sporecast::{run_with_threads, PredictionContext, Selections};
use sporecast_web::{build_router, load_context, resolve_config, AppState, PredictResponse};

#[derive(Parser)]
#[command(
    name = "sporecast",
    version,
    about = "Mushroom edibility predictions from categorical attributes"
)]
struct Cli {
    /// YAML config file. Falls back to SPORECAST_CONFIG, then defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the prediction form and JSON API.
    Serve {
        /// Listen address, overriding the config file.
        #[arg(long)]
        listen: Option<String>,
    },
    /// Load and validate the artifacts, then print a summary.
    Check,
    /// Predict one mushroom from attribute=code pairs.
    Predict {
        #[arg(required = true, value_parser = parse_selection)]
        selections: Vec<(String, String)>,
    },
    /// Predict a JSON array of selection objects.
    Batch {
        /// File holding `[{"odor": "f", ...}, ...]`.
        file: PathBuf,

        /// Worker threads. 0 uses all cores.
        #[arg(long, default_value_t = 0)]
        threads: usize,
    },
}

fn parse_selection(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((attribute, code)) if !attribute.trim().is_empty() => {
            Ok((attribute.trim().to_string(), code.trim().to_string()))
        }
        _ => Err(format!("expected attribute=code, got {s:?}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.config)?;
    let paths = config.artifacts.paths();

    match cli.command {
        Command::Serve { listen } => {
            let listen_addr = listen.unwrap_or(config.listen_addr);
            let context = load_context(&paths)?;
            let app = build_router(AppState::new(context));

            let listener = tokio::net::TcpListener::bind(&listen_addr)
                .await
                .with_context(|| format!("failed to bind {listen_addr}"))?;
            info!(%listen_addr, "sporecast listening");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        Command::Check => {
            let context = load_context(&paths)?;
            let index = context.index();
            println!("artifacts OK ({})", paths.dir.display());
            println!("  feature columns: {}", index.n_columns());
            for group in index.groups() {
                let codes: Vec<_> = group.trained_codes().collect();
                println!("  {:<26} {}", group.attribute().name, codes.join(" "));
            }
        }
        Command::Predict { selections } => {
            let context = load_context(&paths)?;
            let selections: Selections = selections.into_iter().collect();
            let prediction = context.predict(&selections)?;
            println!("{prediction}");
        }
        Command::Batch { file, threads } => {
            let context = load_context(&paths)?;
            let responses = run_batch(&context, &file, threads)?;
            println!("{}", serde_json::to_string_pretty(&responses)?);
        }
    }

    Ok(())
}

/// Predict every selection object in a JSON array file, in file order.
fn run_batch(
    context: &PredictionContext,
    file: &Path,
    threads: usize,
) -> anyhow::Result<Vec<PredictResponse>> {
    let bytes =
        std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let batch: Vec<Selections> = serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not a JSON array of selections", file.display()))?;

    let results =
        run_with_threads(threads, |parallelism| context.predict_batch(&batch, parallelism))?;
    let responses: Vec<PredictResponse> =
        results.into_iter().map(PredictResponse::from).collect();
    info!(n = responses.len(), threads, "batch complete");
    Ok(responses)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::{json, Value};
    use sporecast::persist::ArtifactFormat;
    use sporecast::testing::{complete_selections, write_fixture_artifacts};
    use sporecast::Prediction;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_selection_pairs() {
        assert_eq!(
            parse_selection("odor=f").unwrap(),
            ("odor".to_string(), "f".to_string())
        );
        assert_eq!(
            parse_selection("stalk-root=?").unwrap(),
            ("stalk-root".to_string(), "?".to_string())
        );
        assert!(parse_selection("odor").is_err());
        assert!(parse_selection("=f").is_err());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["sporecast", "check", "--config", "x.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.yaml")));
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn batch_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_fixture_artifacts(dir.path(), ArtifactFormat::Json).unwrap();
        let context = load_context(&paths).unwrap();

        let mut incomplete = complete_selections();
        incomplete.clear("habitat");
        let batch = json!([
            complete_selections().with("odor", "f"),
            incomplete,
            complete_selections().with("odor", "a"),
        ]);
        let file = dir.path().join("batch.json");
        std::fs::write(&file, batch.to_string()).unwrap();

        for threads in [1, 2] {
            let responses = run_batch(&context, &file, threads).unwrap();
            assert_eq!(responses.len(), 3);
            assert_eq!(responses[0].prediction, Some(Prediction::Poisonous));
            assert_eq!(responses[1].prediction, None);
            assert_eq!(responses[1].missing, vec!["habitat".to_string()]);
            assert_eq!(responses[2].prediction, Some(Prediction::Edible));

            let json: Value = serde_json::to_value(&responses).unwrap();
            assert_eq!(json[1]["missing"], json!(["habitat"]));
            assert_eq!(json[2], json!({ "prediction": "Edible" }));
        }
    }

    #[test]
    fn batch_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_fixture_artifacts(dir.path(), ArtifactFormat::Binary).unwrap();
        let context = load_context(&paths).unwrap();
        let file = dir.path().join("batch.json");
        std::fs::write(&file, r#"{"odor": "f"}"#).unwrap();

        let err = run_batch(&context, &file, 1).unwrap_err();
        assert!(err.to_string().contains("not a JSON array"));
    }

    #[test]
    fn batch_threads_default_to_auto() {
        let cli = Cli::try_parse_from(["sporecast", "batch", "in.json"]).unwrap();
        let Command::Batch { threads, .. } = cli.command else {
            panic!("expected batch");
        };
        assert_eq!(threads, 0);
    }
}
