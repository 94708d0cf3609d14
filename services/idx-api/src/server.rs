//! HTTP API for index inspection and byte-range extraction.
//!
//! Routes:
//! - `GET /gfs/latest` — newest fully published run
//! - `GET /gfs/idx/latest/{forecast}` — index for the latest run
//! - `GET /gfs/idx/{year}/{month}/{day}/{cycle}/{forecast}` — index for an
//!   explicit run; `cycle` accepts `06` or `06z`, `forecast` accepts `24`,
//!   `f24`, or `fh024`
//! - `GET /health`
//!
//! Both idx routes take optional `level` and `param` queries: with neither,
//! the full index is returned as JSON; `level` alone filters the JSON to
//! one level; `level` plus `param` switches to extraction and returns the
//! variable's raw bytes.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use gfs_common::{ForecastHour, GfsError, GfsResult, ModelRun};
use grib_idx::IndexMap;

use crate::config::ModelSourceConfig;
use crate::extract;
use crate::resolver;
use crate::store::HttpObjectStore;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LatestRunResponse {
    pub latest_run: String,
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub idx_url: String,
    pub grib_url: String,
    pub model_run: String,
    pub forecast: String,
    pub valid_time: String,
    pub idx_data: IndexMap,
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct IdxQuery {
    pub level: Option<String>,
    pub param: Option<String>,
}

// ============================================================================
// Shared State
// ============================================================================

pub struct ServerState {
    pub config: ModelSourceConfig,
    pub store: HttpObjectStore,
}

// ============================================================================
// Router
// ============================================================================

/// Create the API router.
pub fn create_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/gfs/latest", get(latest_handler))
        .route("/gfs/idx/latest/:forecast", get(idx_latest_handler))
        .route(
            "/gfs/idx/:year/:month/:day/:cycle/:forecast",
            get(idx_run_handler),
        )
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(Extension(state))
}

fn error_response(err: GfsError) -> Response {
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

fn iso8601(dt: chrono::DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /gfs/latest - newest fully published run
async fn latest_handler(Extension(state): Extension<Arc<ServerState>>) -> Response {
    match resolver::latest_complete_run(&state.store, &state.config, Utc::now()).await {
        Ok(run) => Json(LatestRunResponse {
            latest_run: iso8601(run.datetime()),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /gfs/idx/latest/{forecast} - index for the latest complete run
async fn idx_latest_handler(
    Extension(state): Extension<Arc<ServerState>>,
    Path(forecast): Path<String>,
    Query(query): Query<IdxQuery>,
) -> Response {
    let forecast = match ForecastHour::parse_spec(&forecast) {
        Ok(f) => f,
        Err(e) => return error_response(e),
    };

    let run = match resolver::latest_complete_run(&state.store, &state.config, Utc::now()).await
    {
        Ok(run) => run,
        Err(e) => return error_response(e),
    };

    serve_index(&state, run, forecast, query).await
}

/// GET /gfs/idx/{year}/{month}/{day}/{cycle}/{forecast} - explicit run
async fn idx_run_handler(
    Extension(state): Extension<Arc<ServerState>>,
    Path((year, month, day, cycle, forecast)): Path<(i32, u32, u32, String, String)>,
    Query(query): Query<IdxQuery>,
) -> Response {
    let run = match parse_cycle(year, month, day, &cycle) {
        Ok(run) => run,
        Err(e) => return error_response(e),
    };
    let forecast = match ForecastHour::parse_spec(&forecast) {
        Ok(f) => f,
        Err(e) => return error_response(e),
    };

    serve_index(&state, run, forecast, query).await
}

/// GET /health - Health check endpoint
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "idx-api"
    }))
}

// ============================================================================
// Helpers
// ============================================================================

/// Parse the cycle path segment (`06`, `6z`, `18Z`).
fn parse_cycle(year: i32, month: u32, day: u32, cycle: &str) -> GfsResult<ModelRun> {
    let hour: u32 = cycle
        .to_ascii_lowercase()
        .trim_end_matches('z')
        .parse()
        .map_err(|_| GfsError::InvalidPath(format!("bad cycle hour: {}", cycle)))?;
    ModelRun::from_ymd_hour(year, month, day, hour)
}

/// Shared tail of both idx routes: fetch and parse the index, then either
/// return it as JSON or extract a single variable's bytes.
async fn serve_index(
    state: &ServerState,
    run: ModelRun,
    forecast: ForecastHour,
    query: IdxQuery,
) -> Response {
    let mut parsed =
        match extract::fetch_index(&state.store, &state.config.bucket, &run, forecast).await {
            Ok(parsed) => parsed,
            Err(e) => return error_response(e),
        };

    if let Some(param) = &query.param {
        let level = match &query.level {
            Some(level) => level,
            None => {
                return error_response(GfsError::InvalidPath(
                    "param query requires a level query".to_string(),
                ))
            }
        };
        return match extract::fetch_variable(&state.store, &parsed, level, param).await {
            Ok(slice) => {
                ([(header::CONTENT_TYPE, "text/plain")], slice.bytes).into_response()
            }
            Err(e) => error_response(e),
        };
    }

    if let Some(level) = &query.level {
        parsed.retain_level(level);
    }

    Json(IndexResponse {
        idx_url: parsed.idx_url,
        grib_url: parsed.grib_url,
        model_run: iso8601(run.datetime()),
        forecast: format!("+{}", forecast.hours()),
        valid_time: iso8601(run.valid_time(forecast)),
        idx_data: parsed.index,
    })
    .into_response()
}

/// Start the HTTP server.
pub async fn run_server(state: Arc<ServerState>, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!(port = port, "Starting GFS index server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grib_idx::ByteRange;
    use std::collections::HashMap;

    #[test]
    fn test_parse_cycle_variants() {
        for cycle in ["6", "06", "6z", "06Z"] {
            let run = parse_cycle(2023, 4, 8, cycle).unwrap();
            assert_eq!(run, ModelRun::from_ymd_hour(2023, 4, 8, 6).unwrap());
        }
    }

    #[test]
    fn test_parse_cycle_rejects_garbage_and_off_cycle_hours() {
        assert!(matches!(
            parse_cycle(2023, 4, 8, "noon"),
            Err(GfsError::InvalidPath(_))
        ));
        assert!(matches!(
            parse_cycle(2023, 4, 8, "13"),
            Err(GfsError::InvalidRun(_))
        ));
    }

    #[test]
    fn test_index_response_serialization() {
        let mut idx_data: IndexMap = HashMap::new();
        idx_data.entry("surface".to_string()).or_default().insert(
            "TMP".to_string(),
            ByteRange {
                start: 0,
                end: None,
            },
        );

        let response = IndexResponse {
            idx_url: "https://bucket.s3.amazonaws.com/key.idx".to_string(),
            grib_url: "https://bucket.s3.amazonaws.com/key".to_string(),
            model_run: "2023-04-08T12:00:00Z".to_string(),
            forecast: "+24".to_string(),
            valid_time: "2023-04-09T12:00:00Z".to_string(),
            idx_data,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"forecast\":\"+24\""));
        assert!(json.contains("\"model_run\":\"2023-04-08T12:00:00Z\""));
        assert!(json.contains("\"start\":0"));
        assert!(json.contains("\"end\":null"));
    }

    #[test]
    fn test_latest_run_response_serialization() {
        let response = LatestRunResponse {
            latest_run: "2023-04-08T12:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, "{\"latest_run\":\"2023-04-08T12:00:00Z\"}");
    }
}
