//! HTTP routes over the query layer.

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use hrsight_snmp::tables::{
    PROCESSES, ProcessRow, STORAGE, StorageRow, process_column, storage_column,
};
use hrsight_snmp::{
    ColumnRow, ColumnSpec, Connector, ProcessorLoadReport, QueryError, ScalarResult,
    SessionOptions, SystemCounts, TableResult, query_column, query_processor_load,
    query_sys_descr, query_system_counts, query_table,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::{ApiConfig, SnmpDefaults};

/// Application state shared across handlers.
struct AppState<C> {
    connector: Arc<C>,
    defaults: Arc<SnmpDefaults>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            connector: Arc::clone(&self.connector),
            defaults: Arc::clone(&self.defaults),
        }
    }
}

/// Query string accepted by every SNMP route.
///
/// Numeric settings arrive as text: a value that does not parse, or a zero port or
/// timeout, falls back to the configured default.
#[derive(Debug, Default, Deserialize)]
pub struct TargetParams {
    pub ip: Option<String>,
    pub community: Option<String>,
    pub version: Option<String>,
    pub port: Option<String>,
    /// Per-attempt timeout in milliseconds.
    pub timeout: Option<String>,
    pub retries: Option<String>,
}

impl TargetParams {
    /// Overlay the supplied settings on `defaults`.
    ///
    /// `retries` is the fallback retry count, which differs between routes.
    fn resolve(
        self,
        defaults: &SnmpDefaults,
        retries: u32,
    ) -> Result<(String, SessionOptions), QueryError> {
        let mut options = defaults.session_options();
        options.retries = retries;

        if let Some(version) = self.version.as_deref() {
            options.version = version.parse()?;
        }
        if let Some(community) = self.community.filter(|c| !c.is_empty()) {
            options.community = community;
        }
        if let Some(port) = parse_nonzero(self.port.as_deref()) {
            options.port = port;
        }
        if let Some(ms) = parse_nonzero(self.timeout.as_deref()) {
            options.timeout = Duration::from_millis(ms);
        }
        if let Some(retries) = self.retries.as_deref().and_then(|r| r.trim().parse().ok()) {
            options.retries = retries;
        }

        Ok((self.ip.unwrap_or_default(), options))
    }
}

/// Parse a numeric parameter, treating garbage and zero as absent.
fn parse_nonzero<T: FromStr + Default + PartialEq>(value: Option<&str>) -> Option<T> {
    value?.trim().parse().ok().filter(|v| *v != T::default())
}

/// Error body returned as `{"error": "..."}`.
#[derive(Debug)]
enum ApiError {
    Query(QueryError),
    UnknownColumn(String),
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        Self::Query(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Query(e) if e.is_config() => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::Query(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            Self::UnknownColumn(name) => {
                (StatusCode::NOT_FOUND, format!("unknown column '{}'", name))
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Create the HTTP router.
pub fn create_router<C: Connector + 'static>(
    connector: Arc<C>,
    defaults: SnmpDefaults,
    cors: bool,
) -> Router {
    let state = AppState {
        connector,
        defaults: Arc::new(defaults),
    };

    let router = Router::new()
        .route("/healthz", get(health_handler))
        .route("/api/snmp/system/descr", get(sys_descr_handler::<C>))
        .route("/api/snmp/system/users", get(system_counts_handler::<C>))
        .route("/api/snmp/hrstorage", get(storage_handler::<C>))
        .route("/api/snmp/hrstorage/:column", get(storage_column_handler::<C>))
        .route("/api/snmp/hrswrun", get(processes_handler::<C>))
        .route("/api/snmp/hrswrun/:column", get(process_column_handler::<C>))
        .route("/api/snmp/hrprocessorload", get(processor_load_handler::<C>))
        .with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Handler for the /healthz endpoint.
async fn health_handler() -> &'static str {
    "ok"
}

async fn sys_descr_handler<C: Connector>(
    State(state): State<AppState<C>>,
    Query(params): Query<TargetParams>,
) -> ApiResult<ScalarResult> {
    let (target, options) = params.resolve(&state.defaults, state.defaults.system_retries)?;
    let result = query_sys_descr(state.connector.as_ref(), &target, &options).await?;
    Ok(Json(result))
}

async fn system_counts_handler<C: Connector>(
    State(state): State<AppState<C>>,
    Query(params): Query<TargetParams>,
) -> ApiResult<SystemCounts> {
    let (target, options) = params.resolve(&state.defaults, state.defaults.system_retries)?;
    let result = query_system_counts(state.connector.as_ref(), &target, &options).await?;
    Ok(Json(result))
}

async fn storage_handler<C: Connector>(
    State(state): State<AppState<C>>,
    Query(params): Query<TargetParams>,
) -> ApiResult<TableResult<StorageRow>> {
    let (target, options) = params.resolve(&state.defaults, state.defaults.retries)?;
    let result = query_table(state.connector.as_ref(), &target, &options, &STORAGE).await?;
    Ok(Json(result))
}

async fn processes_handler<C: Connector>(
    State(state): State<AppState<C>>,
    Query(params): Query<TargetParams>,
) -> ApiResult<TableResult<ProcessRow>> {
    let (target, options) = params.resolve(&state.defaults, state.defaults.retries)?;
    let result = query_table(state.connector.as_ref(), &target, &options, &PROCESSES).await?;
    Ok(Json(result))
}

async fn processor_load_handler<C: Connector>(
    State(state): State<AppState<C>>,
    Query(params): Query<TargetParams>,
) -> ApiResult<ProcessorLoadReport> {
    let (target, options) = params.resolve(&state.defaults, state.defaults.retries)?;
    let result = query_processor_load(state.connector.as_ref(), &target, &options).await?;
    Ok(Json(result))
}

async fn storage_column_handler<C: Connector>(
    State(state): State<AppState<C>>,
    Path(column): Path<String>,
    Query(params): Query<TargetParams>,
) -> ApiResult<TableResult<ColumnRow>> {
    let spec = storage_column(&column).ok_or(ApiError::UnknownColumn(column))?;
    column_listing(&state, params, spec).await
}

async fn process_column_handler<C: Connector>(
    State(state): State<AppState<C>>,
    Path(column): Path<String>,
    Query(params): Query<TargetParams>,
) -> ApiResult<TableResult<ColumnRow>> {
    let spec = process_column(&column).ok_or(ApiError::UnknownColumn(column))?;
    column_listing(&state, params, spec).await
}

async fn column_listing<C: Connector>(
    state: &AppState<C>,
    params: TargetParams,
    spec: &ColumnSpec,
) -> ApiResult<TableResult<ColumnRow>> {
    let (target, options) = params.resolve(&state.defaults, state.defaults.retries)?;
    let result = query_column(state.connector.as_ref(), &target, &options, spec).await?;
    Ok(Json(result))
}

/// HTTP server configuration.
pub struct HttpServer<C> {
    connector: Arc<C>,
    listen_addr: SocketAddr,
    defaults: SnmpDefaults,
    cors: bool,
}

impl<C: Connector + 'static> HttpServer<C> {
    /// Create a new HTTP server.
    pub fn new(connector: C, config: &ApiConfig) -> hrsight_common::Result<Self> {
        Ok(Self {
            connector: Arc::new(connector),
            listen_addr: config.listen_addr()?,
            defaults: config.snmp.clone(),
            cors: config.cors,
        })
    }

    /// Run the HTTP server until the shutdown signal is received.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        let router = create_router(self.connector, self.defaults, self.cors);

        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.listen_addr, e))?;

        info!(addr = %self.listen_addr, cors = self.cors, "HTTP server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                loop {
                    if shutdown.changed().await.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                info!("HTTP server shutting down");
            })
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
