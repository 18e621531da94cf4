//! Web layer for reportes-gps
//!
//! This module provides the HTTP server and API endpoints.
//!
//! # Module Structure
//! - `handlers`: HTTP request handlers
//! - `state`: Application state
//! - `types`: Request and response types

mod handlers;
mod state;
mod types;

// Re-export public types
pub use handlers::{create_report, get_stats, healthz, list_reports, local_timestamp};
pub use state::AppState;
pub use types::{CreateReportRequest, ErrorResponse, HealthResponse, ListQuery};

use utoipa::OpenApi;

use crate::storage::{Report, Stats};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Reportes GPS API",
        description = "Receives and serves reports with GPS coordinates and photos",
        version = env!("CARGO_PKG_VERSION"),
        license(name = "MIT")
    ),
    paths(
        handlers::healthz,
        handlers::create_report,
        handlers::list_reports,
        handlers::get_stats,
    ),
    components(schemas(
        CreateReportRequest,
        Report,
        Stats,
        ErrorResponse,
        HealthResponse,
    )),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Reports", description = "Report ingestion and listing"),
        (name = "Statistics", description = "Statistics endpoints"),
    )
)]
pub struct ApiDoc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::{Method, StatusCode, header},
    response::{Html, IntoResponse},
    routing::get,
};
use rust_embed::Embed;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::storage::ReportStore;

#[derive(Embed)]
#[folder = "static/"]
struct StaticAssets;

const MAP_PAGE_MISSING: &str = "<h1>Error: map page not found</h1>";

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/healthz", get(healthz))
        // API routes
        .route("/reportes/", get(list_reports).post(create_report))
        .route("/reportes", get(list_reports).post(create_report))
        .route("/stats", get(get_stats))
        // Pages
        .route("/", get(serve_index))
        .route("/mapa", get(serve_map))
        // Swagger UI, also serves the OpenAPI document
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Photos travel inline as base64 and have no size cap
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .with_state(state)
}

/// Initialize the store and serve HTTP until `shutdown` flips
pub async fn run(config: Config, mut shutdown: tokio::sync::watch::Receiver<bool>) -> Result<()> {
    info!(
        addr = %config.bind_addr(),
        database_path = %config.database_path.display(),
        map_page = %config.map_page.display(),
        "Starting server"
    );

    let store = ReportStore::new(&config.database_path);
    store.initialize()?;

    let state = AppState::new(store, &config.map_page);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;

    info!(addr = %config.bind_addr(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
            info!("Server shutting down");
        })
        .await?;

    Ok(())
}

async fn serve_index() -> impl IntoResponse {
    match StaticAssets::get("index.html") {
        Some(content) => Html(String::from_utf8_lossy(content.data.as_ref()).into_owned())
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Map page, read from disk on every request
async fn serve_map(State(state): State<AppState>) -> impl IntoResponse {
    match tokio::fs::read_to_string(state.map_page.as_ref()).await {
        Ok(page) => Html(page),
        Err(e) => {
            warn!(path = %state.map_page.display(), error = %e, "Map page unavailable");
            Html(MAP_PAGE_MISSING.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app() -> (TempDir, Router) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = ReportStore::new(dir.path().join("reportes.db"));
        store.initialize().expect("Failed to initialize store");
        let state = AppState::new(store, dir.path().join("mapa.html"));
        (dir, router(state))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, bytes) = send(app, request).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, bytes) = send(app, request).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_create_without_timestamp_then_list() {
        let (_dir, app) = test_app();

        let (status, created) = post_json(
            &app,
            "/reportes/",
            json!({
                "latitud": 10.0,
                "longitud": -74.0,
                "foto_base64": "Zm9v",
                "tipo_reporte": "alerta"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["id"], 1);
        let ts = created["timestamp"].as_str().unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f").is_ok());

        let (status, listed) = get_json(&app, "/reportes/").await;
        assert_eq!(status, StatusCode::OK);
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], 1);
        assert_eq!(listed[0]["latitud"], 10.0);
        assert_eq!(listed[0]["longitud"], -74.0);
        assert_eq!(listed[0]["foto_base64"], "Zm9v");
        assert_eq!(listed[0]["tipo_reporte"], "alerta");
        assert_eq!(listed[0]["timestamp"], ts);
    }

    #[tokio::test]
    async fn test_create_defaults_report_type() {
        let (_dir, app) = test_app();

        let (status, created) = post_json(
            &app,
            "/reportes",
            json!({
                "latitud": 4.6,
                "longitud": -74.1,
                "timestamp": "2025-01-01T08:00:00",
                "foto_base64": "",
                "descripcion": "semaforo dañado"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["tipo_reporte"], "general");
        assert_eq!(created["timestamp"], "2025-01-01T08:00:00");
        assert_eq!(created["descripcion"], "semaforo dañado");
    }

    #[tokio::test]
    async fn test_create_accepts_photo_over_default_body_limit() {
        let (_dir, app) = test_app();
        let photo = "A".repeat(3 * 1024 * 1024);

        let (status, created) = post_json(
            &app,
            "/reportes/",
            json!({"latitud": 1.0, "longitud": 2.0, "foto_base64": photo}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["foto_base64"].as_str().map(str::len), Some(photo.len()));

        let (_, listed) = get_json(&app, "/reportes/").await;
        assert_eq!(listed[0]["foto_base64"].as_str().map(str::len), Some(photo.len()));
    }

    #[tokio::test]
    async fn test_list_rejects_bad_query_with_error_body() {
        let (_dir, app) = test_app();

        let (status, body) = get_json(&app, "/reportes/?limit=abc").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("Failed to deserialize query string")
        );
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let (_dir, app) = test_app();

        let (status, body) = post_json(&app, "/reportes/", json!({"latitud": 1.0})).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_listing_is_newest_first_and_matches_stats() {
        let (_dir, app) = test_app();

        let mut ids = Vec::new();
        for i in 0..3 {
            let (_, created) = post_json(
                &app,
                "/reportes/",
                json!({
                    "latitud": i as f64,
                    "longitud": 0.0,
                    "timestamp": format!("client-{}", i),
                    "foto_base64": "Zm9v"
                }),
            )
            .await;
            ids.push(created["id"].as_i64().unwrap());
        }
        assert!(ids.windows(2).all(|w| w[0] < w[1]));

        let (_, listed) = get_json(&app, "/reportes/").await;
        let listed_ids: Vec<i64> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect();
        assert_eq!(listed_ids, vec![3, 2, 1]);

        let (status, stats) = get_json(&app, "/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total_reportes"], 3);
        assert_eq!(stats["ultimo_reporte"], "client-2");
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let (_dir, app) = test_app();
        for _ in 0..4 {
            post_json(
                &app,
                "/reportes/",
                json!({"latitud": 0.0, "longitud": 0.0, "foto_base64": "Zm9v"}),
            )
            .await;
        }

        let (_, page) = get_json(&app, "/reportes/?limit=2&offset=1").await;
        let ids: Vec<i64> = page
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_stats_empty() {
        let (_dir, app) = test_app();

        let (status, stats) = get_json(&app, "/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total_reportes"], 0);
        assert!(stats["ultimo_reporte"].is_null());
    }

    #[tokio::test]
    async fn test_store_failure_is_500_with_message() {
        let dir = TempDir::new().unwrap();
        // A directory where the database file should be cannot be opened
        let state = AppState::new(ReportStore::new(dir.path()), dir.path().join("mapa.html"));
        let app = router(state);

        let (status, body) = get_json(&app, "/stats").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().starts_with("Error: "));
    }

    #[tokio::test]
    async fn test_index_page() {
        let (_dir, app) = test_app();
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(body).unwrap();
        assert!(html.contains("/mapa"));
        assert!(html.contains("/reportes"));
        assert!(html.contains("href=\"/docs\""));
    }

    #[tokio::test]
    async fn test_map_page_missing_and_present() {
        let (dir, app) = test_app();

        let request = Request::builder().uri("/mapa").body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).unwrap(), MAP_PAGE_MISSING);

        std::fs::write(dir.path().join("mapa.html"), "<html>mapa</html>").unwrap();
        let request = Request::builder().uri("/mapa").body(Body::empty()).unwrap();
        let (_, body) = send(&app, request).await;
        assert_eq!(String::from_utf8(body).unwrap(), "<html>mapa</html>");
    }

    #[tokio::test]
    async fn test_healthz() {
        let (_dir, app) = test_app();
        let (status, body) = get_json(&app, "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let (_dir, app) = test_app();
        let (status, doc) = get_json(&app, "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(doc["paths"]["/reportes/"].is_object());
        assert!(doc["paths"]["/stats"].is_object());
    }

    #[tokio::test]
    async fn test_swagger_ui() {
        let (_dir, app) = test_app();
        let request = Request::builder().uri("/docs/").body(Body::empty()).unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8_lossy(&body).contains("swagger"));
    }
}
