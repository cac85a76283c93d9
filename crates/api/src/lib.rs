//! Terra API Server
//!
//! HTTP front end for the fertilizer recommendation pipeline: exposes the
//! latest soil reading, the stage selector options, and the analysis endpoint.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use data_validator::Validator;
use feature_engine::FEATURE_SCHEMA_VERSION;
use inference_engine::{ModelBundle, RecommendationPipeline};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use storage::{FirestoreSource, InMemorySource, SnapshotStore};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod error;
mod routes;
mod settings;

pub use error::{ApiError, ErrorBody};
pub use settings::{
    LoggingConfig, ModelConfig, ServerConfig, StoreBackend, StoreConfig, TerraConfig,
};

/// Application state shared across handlers
pub struct AppState {
    /// Latest-snapshot source
    pub store: SnapshotStore,
    /// Loaded models, read-only after startup
    pub pipeline: RecommendationPipeline,
    pub validator: Validator,
    /// Prometheus handle when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(store: SnapshotStore, pipeline: RecommendationPipeline, validator: Validator) -> Self {
        Self {
            store,
            pipeline,
            validator,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    /// Snapshot store backend
    pub store: String,
    /// Always true once serving; startup fails without a model bundle
    pub model_loaded: bool,
    /// Feature schema the loaded models were checked against
    pub feature_schema_version: u32,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/stages", get(routes::stages::get_stages))
        .route("/api/v1/sensors/latest", get(routes::sensors::get_latest))
        .route(
            "/api/v1/recommendations",
            post(routes::recommendations::create_recommendation),
        )
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus {
            store: state.store.kind().to_string(),
            model_loaded: true,
            feature_schema_version: FEATURE_SCHEMA_VERSION,
        },
    })
}

/// Prometheus exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let level = Level::from_str(&config.level).unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
}

/// Build the configured snapshot store
pub fn build_store(config: &StoreConfig) -> anyhow::Result<SnapshotStore> {
    let store = match config.backend {
        StoreBackend::Firestore => {
            anyhow::ensure!(
                !config.firestore.project_id.is_empty(),
                "store.firestore.project_id must be set for the firestore backend"
            );
            SnapshotStore::Firestore(FirestoreSource::new(config.firestore.clone())?)
        }
        StoreBackend::Memory => SnapshotStore::Memory(match &config.seed {
            Some(seed) => InMemorySource::with_snapshot(seed.clone()),
            None => InMemorySource::new(),
        }),
    };
    Ok(store)
}

/// Load models, connect the store, and serve until shutdown
pub async fn run_server(config: TerraConfig) -> anyhow::Result<()> {
    let store = build_store(&config.store)?;
    let engine = ModelBundle::load(&config.model.manifest_path)?.into_engine()?;
    let pipeline = RecommendationPipeline::new(engine);
    let validator = Validator::new(config.validation.clone());

    let mut state = AppState::new(store, pipeline, validator);
    if config.server.metrics {
        state = state.with_metrics(PrometheusBuilder::new().install_recorder()?);
    }

    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", config.server.addr);

    let listener = tokio::net::TcpListener::bind(&config.server.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
