use hydrant_shared::models::{CoordsUpdate, Hydrant};
use serde::Deserialize;

fn origin() -> String {
    let window = web_sys::window().unwrap();
    window.location().origin().unwrap()
}

/// Fetch the full record list. Live deployments read the REST API; the
/// `static-data` build reads the pre-generated snapshot instead.
#[cfg(not(feature = "static-data"))]
pub async fn fetch_hydrants() -> Result<Vec<Hydrant>, String> {
    let url = format!("{}/api/hydrants", origin());
    let resp = reqwest::Client::new()
        .get(url)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        return Err(format!("Server returned {}", resp.status()));
    }
    resp.json().await.map_err(|e| e.to_string())
}

#[cfg(feature = "static-data")]
pub async fn fetch_hydrants() -> Result<Vec<Hydrant>, String> {
    let url = format!("{}/data.json", origin());
    let resp = reqwest::Client::new()
        .get(url)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        return Err(format!("Snapshot missing ({})", resp.status()));
    }
    resp.json().await.map_err(|e| e.to_string())
}

/// Upload a photo with its map coordinate. The server assigns id, derived
/// image paths, and timestamp, so there is nothing to insert locally until
/// the confirmed record comes back.
#[cfg(not(feature = "static-data"))]
pub async fn create_hydrant(
    x_coord: f64,
    y_coord: f64,
    file_name: String,
    bytes: Vec<u8>,
) -> Result<Hydrant, String> {
    let url = format!("{}/api/hydrants", origin());
    let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
    let form = reqwest::multipart::Form::new()
        .text("x_coord", x_coord.to_string())
        .text("y_coord", y_coord.to_string())
        .part("photo", part);

    let resp = reqwest::Client::new()
        .post(url)
        .multipart(form)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        return Err(error_message(resp).await);
    }
    resp.json().await.map_err(|e| e.to_string())
}

#[cfg(not(feature = "static-data"))]
pub async fn update_coords(id: i64, x_coord: f64, y_coord: f64) -> Result<Hydrant, String> {
    let url = format!("{}/api/hydrants/{}", origin(), id);
    let resp = reqwest::Client::new()
        .patch(url)
        .json(&CoordsUpdate { x_coord, y_coord })
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        return Err(error_message(resp).await);
    }
    resp.json().await.map_err(|e| e.to_string())
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

#[cfg(not(feature = "static-data"))]
pub async fn delete_hydrant(id: i64) -> Result<(), String> {
    let url = format!("{}/api/hydrants/{}", origin(), id);
    let resp = reqwest::Client::new()
        .delete(url)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        return Err(error_message(resp).await);
    }
    let body: DeleteResponse = resp.json().await.map_err(|e| e.to_string())?;
    if body.success {
        Ok(())
    } else {
        Err("Delete was not acknowledged".to_string())
    }
}

/// Pull the `error` field out of a failed response, falling back to the
/// status code.
#[cfg(not(feature = "static-data"))]
async fn error_message(resp: reqwest::Response) -> String {
    let status = resp.status();
    match resp.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("error")
            .and_then(|v| v.as_str())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Server returned {}", status)),
        Err(_) => format!("Server returned {}", status),
    }
}

// The read-only snapshot build compiles the mutation calls down to stubs;
// the edit UI that would reach them is hidden, but the signatures stay so
// the page component compiles identically in both configurations.
#[cfg(feature = "static-data")]
pub async fn create_hydrant(
    _x_coord: f64,
    _y_coord: f64,
    _file_name: String,
    _bytes: Vec<u8>,
) -> Result<Hydrant, String> {
    Err("This deployment is read-only".to_string())
}

#[cfg(feature = "static-data")]
pub async fn update_coords(_id: i64, _x_coord: f64, _y_coord: f64) -> Result<Hydrant, String> {
    Err("This deployment is read-only".to_string())
}

#[cfg(feature = "static-data")]
pub async fn delete_hydrant(_id: i64) -> Result<(), String> {
    Err("This deployment is read-only".to_string())
}
