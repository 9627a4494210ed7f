//! # API REST
//!
//! REST API for the triage assistant.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, status codes, CORS)
//!
//! Uses `api-shared` for wire types and `triage-core` for the analysis itself. Analysis is a
//! blocking call chain, so handlers run it on tokio's blocking pool.

#![warn(rust_2018_idioms)]

use api_shared::{AnalyzeReq, ErrorRes, HealthRes, HealthService};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use triage_core::{
    validation::parse_prompt_variant, ConditionReport, ConfidenceLevel, DiagnosisAnalyzer,
    DiagnosisReport, TriageConfig, TriageError, UrgencyLevel,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const NOT_CONFIGURED: &str =
    "Service not configured. Please set GEMINI_API_KEY environment variable.";
const UNAVAILABLE: &str = "Service temporarily unavailable. Please try again later.";
const UNEXPECTED: &str = "An unexpected error occurred";

/// Application state for the REST API server
///
/// Holds the analyzer when configuration succeeded. The server still starts without one so
/// that `/health` can report the problem.
#[derive(Clone, Default)]
pub struct AppState {
    analyzer: Option<Arc<DiagnosisAnalyzer>>,
}

impl AppState {
    pub fn configured(analyzer: DiagnosisAnalyzer) -> Self {
        Self {
            analyzer: Some(Arc::new(analyzer)),
        }
    }

    pub fn unconfigured() -> Self {
        Self { analyzer: None }
    }

    /// Builds state from the process environment, logging configuration failures.
    ///
    /// Call this before entering the async runtime: the model client is blocking.
    pub fn from_env() -> Self {
        match TriageConfig::from_env().and_then(|cfg| DiagnosisAnalyzer::from_config(&cfg)) {
            Ok(analyzer) => {
                tracing::info!("Web application initialised successfully");
                Self::configured(analyzer)
            }
            Err(e) => {
                tracing::error!("Configuration error: {}", e);
                Self::unconfigured()
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.analyzer.is_some()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, analyze),
    components(schemas(
        HealthRes,
        AnalyzeReq,
        ErrorRes,
        DiagnosisReport,
        ConditionReport,
        ConfidenceLevel,
        UrgencyLevel,
    ))
)]
pub struct ApiDoc;

/// Builds the application router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/analyze", post(analyze))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the router until the server fails.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    tracing::info!("++ Starting triage REST API on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

type ApiError = (StatusCode, Json<ErrorRes>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorRes::new(message)))
}

fn triage_error_response(err: &TriageError) -> ApiError {
    let (status, message) = match err {
        TriageError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        TriageError::Gateway { source, .. } => {
            tracing::error!("API error: {}", source);
            (StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE.to_owned())
        }
        other => {
            tracing::error!("Unexpected error: {}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED.to_owned())
        }
    };
    (
        status,
        Json(ErrorRes {
            error: message,
            rule_based_urgent: err.rule_based_urgent(),
        }),
    )
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Reports that the service is alive and whether the model is configured.
#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health(state.is_configured()))
}

#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body = AnalyzeReq,
    responses(
        (status = 200, description = "Symptom analysis", body = DiagnosisReport),
        (status = 400, description = "Missing or invalid input", body = ErrorRes),
        (status = 500, description = "Service not configured or internal error", body = ErrorRes),
        (status = 503, description = "Model unavailable", body = ErrorRes)
    )
)]
/// Analyse a symptom description
///
/// Runs the full triage pipeline. When the model cannot be reached the response is still a
/// well-formed report with a single "Analysis Unavailable" condition, flagged if the symptoms
/// contain an urgent phrase.
///
/// # Errors
/// Returns `400 Bad Request` for a missing body, blank symptoms or an unknown prompt type, and
/// `500 Internal Server Error` if the service is not configured or the analysis task fails.
#[axum::debug_handler]
async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeReq>, JsonRejection>,
) -> Result<Json<DiagnosisReport>, ApiError> {
    let Some(analyzer) = state.analyzer.clone() else {
        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, NOT_CONFIGURED));
    };

    let Json(req) = body.map_err(|rejection| {
        tracing::warn!("Rejected analyze request body: {}", rejection);
        error(StatusCode::BAD_REQUEST, "Symptoms are required")
    })?;

    let symptoms = req.symptoms.trim().to_owned();
    if symptoms.is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "Symptoms are required"));
    }
    let variant =
        parse_prompt_variant(&req.prompt_type).map_err(|e| triage_error_response(&e))?;
    let include_lifestyle = req.include_lifestyle;

    let outcome = tokio::task::spawn_blocking(move || {
        analyzer.analyze(&symptoms, variant, include_lifestyle)
    })
    .await
    .map_err(|e| {
        tracing::error!("Analysis task failed: {}", e);
        error(StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED)
    })?;

    match outcome {
        Ok(result) => Ok(Json(result.to_report())),
        Err(e) => Err(triage_error_response(&e)),
    }
}
