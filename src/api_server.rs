// Axum API server module
//
// REST surface over the optimization engine: catalogue listing and layout
// generation. The engine is CPU-bound, so the optimize handler runs inside
// spawn_blocking and the shared state is immutable after startup.

#[cfg(feature = "api")]
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

#[cfg(feature = "api")]
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

#[cfg(feature = "api")]
use std::path::Path;

#[cfg(feature = "api")]
use std::sync::Arc;

#[cfg(feature = "api")]
use crate::data::{CsvCatalogueStore, CsvCompatibilityStore, LogNotificationSink};

#[cfg(feature = "api")]
use crate::error::EngineError;

#[cfg(feature = "api")]
use crate::orchestrator::{OptimizeRequest, Orchestrator};

// ============================================================================
// Application State
// ============================================================================

#[cfg(feature = "api")]
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

#[cfg(feature = "api")]
impl AppState {
    /// Loads the catalogue and compatibility matrix from `data_dir`
    /// (`plants.csv`, `compatibility.csv`) and builds the immutable engine
    /// state shared by all requests.
    pub fn new(data_dir: &str) -> anyhow::Result<Self> {
        tracing::info!(data_dir, "loading plant catalogue");
        let catalogue = CsvCatalogueStore::load(&Path::new(data_dir).join("plants.csv"))?;

        tracing::info!(data_dir, "loading compatibility matrix");
        let compatibility =
            CsvCompatibilityStore::load(&Path::new(data_dir).join("compatibility.csv"))?;

        let orchestrator = Orchestrator::new(&catalogue, &compatibility)?
            .with_notifier(Arc::new(LogNotificationSink));

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
        })
    }
}

// ============================================================================
// Router
// ============================================================================

#[cfg(feature = "api")]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/plants", get(list_plants))
        .route("/api/gardens/optimize", post(optimize))
        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

#[cfg(feature = "api")]
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(feature = "api")]
async fn list_plants(State(state): State<AppState>) -> impl IntoResponse {
    let plants = state.orchestrator.catalogue().to_vec();
    Json(serde_json::json!({
        "rows": plants.len(),
        "data": plants.iter().map(|p| p.as_ref()).collect::<Vec<_>>(),
    }))
}

#[cfg(feature = "api")]
async fn optimize(
    State(state): State<AppState>,
    Json(request): Json<OptimizeRequest>,
) -> impl IntoResponse {
    let orchestrator = state.orchestrator.clone();

    // CPU-bound generation; keep it off the async worker threads.
    let result = tokio::task::spawn_blocking(move || orchestrator.optimize(request)).await;

    match result {
        Ok(Ok(response)) => (StatusCode::OK, Json(serde_json::json!(response))),
        Ok(Err(error)) => {
            let status = match &error {
                EngineError::Validation(_) => StatusCode::BAD_REQUEST,
                EngineError::Catalogue(_) => StatusCode::SERVICE_UNAVAILABLE,
                EngineError::Evaluation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            tracing::warn!(%error, "optimization request failed");
            (
                status,
                Json(serde_json::json!({
                    "success": false,
                    "error": error.to_string(),
                })),
            )
        }
        Err(join_error) => {
            tracing::error!(%join_error, "optimization task panicked");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "success": false,
                    "error": "internal error",
                })),
            )
        }
    }
}
