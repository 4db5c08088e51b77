mod api;
mod error;
mod images;
mod storage;

use std::path::{Path, PathBuf};

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use api::AppState;

/// Build a cache-controlled static file router.
///
/// Separated so tests can exercise the caching layer with arbitrary directories.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_1DAY: &str = "public, max-age=86400, must-revalidate";
const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Largest accepted upload payload. Phone photos run 5-15 MB.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the full application router.
fn build_app(state: AppState, dist_dir: &Path) -> Router {
    // Derived image variants are written once and never regenerated, so the
    // upload route can use the immutable cache policy. The dist fallback
    // also covers the base map image and the static-mode data.json.
    let static_files = Router::new()
        .nest(
            "/uploads",
            cached_static_router(&state.upload_dir, CACHE_IMMUTABLE),
        )
        .nest(
            "/assets",
            cached_static_router(&dist_dir.join("assets"), CACHE_1DAY),
        )
        .fallback_service(ServeDir::new(dist_dir));

    let index_dist = dist_dir.to_path_buf();
    Router::new()
        .merge(api::api_router(state))
        .route("/", get(move || serve_index(index_dist.clone())))
        .merge(static_files)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let upload_dir =
        PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()));
    std::fs::create_dir_all(&upload_dir).expect("Failed to create upload directory");

    let db_path =
        PathBuf::from(std::env::var("DB_PATH").unwrap_or_else(|_| "data/hydrants.redb".to_string()));
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create database directory");
    }
    let storage = storage::Storage::open(&db_path);

    let dist_dir = PathBuf::from(std::env::var("DIST_DIR").unwrap_or_else(|_| "dist".to_string()));

    let state = AppState {
        storage,
        upload_dir,
    };
    let app = build_app(state, &dist_dir);

    let port = std::env::var("PORT").unwrap_or_else(|_| "4000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    tracing::info!(%addr, "hydrant server listening");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn serve_index(dist_dir: PathBuf) -> Html<String> {
    // Try to serve the built frontend, fall back to a simple message
    match std::fs::read_to_string(dist_dir.join("index.html")) {
        Ok(html) => Html(html),
        Err(_) => Html(
            r#"<!DOCTYPE html>
<html>
<head><title>Campus Hydrant Map</title></head>
<body>
<h1>Campus Hydrant Map</h1>
<p>Frontend not built yet. The API lives under <a href="/api/hydrants">/api/hydrants</a>.</p>
</body>
</html>"#
                .to_string(),
        ),
    }
}
