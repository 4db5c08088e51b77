use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use hydrant_shared::models::Hydrant;

use crate::error::ApiError;
use crate::images;
use crate::storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub upload_dir: PathBuf,
}

/// The REST surface. Mounted at the root; all paths carry the `/api` prefix
/// except the static services added in `main`.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/hydrants", get(list_hydrants).post(create_hydrant))
        .route("/api/hydrants/{id}", patch(update_hydrant).delete(delete_hydrant))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_hydrants(State(state): State<AppState>) -> Result<Json<Vec<Hydrant>>, ApiError> {
    let records = state.storage.list().map_err(ApiError::Storage)?;
    Ok(Json(records))
}

/// Parse a coordinate string, rejecting NaN and infinities.
fn parse_coord(value: Option<&str>) -> Option<f64> {
    value?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coordinate out of a JSON body field — accepts a number or a numeric
/// string, matching what clients historically sent.
fn coord_from_json(value: Option<&serde_json::Value>) -> Option<f64> {
    match value? {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => parse_coord(Some(s)),
        _ => None,
    }
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::invalid_id())
}

async fn create_hydrant(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Hydrant>), ApiError> {
    let mut photo: Option<(String, Vec<u8>)> = None;
    let mut x_field: Option<String> = None;
    let mut y_field: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("photo") => {
                let file_name = field.file_name().unwrap_or("photo").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                photo = Some((file_name, data.to_vec()));
            }
            Some("x_coord") => {
                x_field = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Validation(e.to_string()))?,
                );
            }
            Some("y_coord") => {
                y_field = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Validation(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let (file_name, bytes) = photo
        .ok_or_else(|| ApiError::Validation("Image file is required".to_string()))?;
    let x = parse_coord(x_field.as_deref()).ok_or_else(ApiError::invalid_coordinates)?;
    let y = parse_coord(y_field.as_deref()).ok_or_else(ApiError::invalid_coordinates)?;

    // Both variants must exist before any record does
    let stored = images::process_upload(&state.upload_dir, &file_name, bytes)
        .await
        .map_err(ApiError::ImageProcessing)?;

    let hydrant = state
        .storage
        .insert(x, y, &stored.large_path, &stored.thumb_path)
        .map_err(ApiError::Storage)?;

    tracing::info!(id = hydrant.id, x, y, "hydrant created");
    Ok((StatusCode::CREATED, Json(hydrant)))
}

async fn update_hydrant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Hydrant>, ApiError> {
    let id = parse_id(&id)?;
    let x = coord_from_json(body.get("x_coord")).ok_or_else(ApiError::invalid_coordinates)?;
    let y = coord_from_json(body.get("y_coord")).ok_or_else(ApiError::invalid_coordinates)?;

    let updated = state
        .storage
        .update_coords(id, x, y)
        .map_err(ApiError::Storage)?
        .ok_or(ApiError::NotFound)?;

    tracing::info!(id, x, y, "hydrant moved");
    Ok(Json(updated))
}

async fn delete_hydrant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id)?;

    if let Some(removed) = state.storage.delete(id).map_err(ApiError::Storage)? {
        // Best-effort file cleanup; failures are logged and do not affect
        // the response
        remove_upload(&state.upload_dir, &removed.image_large_path);
        remove_upload(&state.upload_dir, &removed.image_thumb_path);
        tracing::info!(id, "hydrant deleted");
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

fn remove_upload(upload_dir: &FsPath, public_path: &str) {
    let name = public_path.rsplit('/').next().unwrap_or_default();
    if name.is_empty() {
        return;
    }
    let path = upload_dir.join(name);
    if let Err(e) = std::fs::remove_file(&path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove image file");
        }
    }
}
