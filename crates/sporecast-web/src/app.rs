//! HTTP routes: the HTML form and a JSON API over the same pipeline.
//!
//! | Route | |
//! |---|---|
//! | `GET /` | empty form |
//! | `POST /predict` | form submission, re-renders the form with the outcome |
//! | `GET /api/schema` | attributes and the options offered for each |
//! | `POST /api/predict` | `{"selections": {...}}` → `{"prediction": ...}` |
//! | `GET /health` | liveness |

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info};

use sporecast::{InvalidSelection, PredictError, Prediction, PredictionContext, Selections};

use crate::render::{self, Outcome};

/// Shared, read-only application state.
#[derive(Debug)]
pub struct AppState {
    pub context: PredictionContext,
}

impl AppState {
    pub fn new(context: PredictionContext) -> Arc<Self> {
        Arc::new(Self { context })
    }
}

/// Build the axum [`Router`] with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(form_handler))
        .route("/predict", post(form_predict_handler))
        .route("/api/schema", get(schema_handler))
        .route("/api/predict", post(api_predict_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Outcome of one prediction, as returned by the API and the `batch` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Prediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalid: Vec<InvalidSelection>,
}

impl PredictResponse {
    fn error(message: impl Into<String>) -> Self {
        Self {
            prediction: None,
            error: Some(message.into()),
            missing: Vec::new(),
            invalid: Vec::new(),
        }
    }

    /// HTTP status matching the outcome.
    pub fn status(&self) -> StatusCode {
        if self.prediction.is_some() {
            StatusCode::OK
        } else if !self.missing.is_empty() || !self.invalid.is_empty() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<Result<Prediction, PredictError>> for PredictResponse {
    fn from(result: Result<Prediction, PredictError>) -> Self {
        match result {
            Ok(prediction) => Self {
                prediction: Some(prediction),
                error: None,
                missing: Vec::new(),
                invalid: Vec::new(),
            },
            Err(PredictError::Validation(err)) => Self {
                missing: err.missing,
                invalid: err.invalid,
                ..Self::error("invalid selections")
            },
            Err(other) => Self::error(other.to_string()),
        }
    }
}

/// `POST /api/predict` body.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub selections: Selections,
}

#[derive(Debug, Serialize)]
struct SchemaResponse {
    attributes: Vec<AttributeInfo>,
}

#[derive(Debug, Serialize)]
struct AttributeInfo {
    name: &'static str,
    display_name: String,
    description: &'static str,
    options: Vec<OptionInfo>,
}

#[derive(Debug, Serialize)]
struct OptionInfo {
    code: &'static str,
    label: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn log_failure(err: &PredictError) {
    if !matches!(err, PredictError::Validation(_)) {
        error!(error = %err, "prediction failed");
    }
}

/// `GET /`
async fn form_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render::page(
        state.context.index(),
        &Selections::new(),
        Outcome::Empty,
    ))
}

/// `POST /predict`
async fn form_predict_handler(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let selections: Selections = fields.into_iter().collect();
    let index = state.context.index();

    match state.context.predict(&selections) {
        Ok(prediction) => {
            info!(%prediction, "form prediction");
            Html(render::page(index, &selections, Outcome::Prediction(prediction))).into_response()
        }
        Err(PredictError::Validation(err)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(render::page(index, &selections, Outcome::Invalid(&err))),
        )
            .into_response(),
        Err(err) => {
            log_failure(&err);
            let message = err.to_string();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render::page(index, &selections, Outcome::Failure(&message))),
            )
                .into_response()
        }
    }
}

/// `GET /api/schema`
async fn schema_handler(State(state): State<Arc<AppState>>) -> Json<SchemaResponse> {
    let attributes = state
        .context
        .index()
        .groups()
        .iter()
        .map(|group| {
            let attribute = group.attribute();
            AttributeInfo {
                name: attribute.name,
                display_name: attribute.display_name(),
                description: attribute.description,
                options: group
                    .trained_codes()
                    .filter_map(|code| attribute.category(code))
                    .map(|c| OptionInfo {
                        code: c.code,
                        label: c.label,
                    })
                    .collect(),
            }
        })
        .collect();
    Json(SchemaResponse { attributes })
}

/// `POST /api/predict`
async fn api_predict_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "rejected prediction request");
            let response = PredictResponse::error(rejection.body_text());
            return (rejection.status(), Json(response)).into_response();
        }
    };
    let result = state.context.predict(&request.selections);
    if let Err(err) = &result {
        log_failure(err);
    }
    let response = PredictResponse::from(result);
    (response.status(), Json(response)).into_response()
}

/// `GET /health`
async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}
