//! Turn a live hydrant server into a static snapshot.
//!
//! Fetches the record list, writes it to `<out>/data.json` with image paths
//! normalized to `/uploads/<name>`, and downloads both image variants per
//! record into `<out>/uploads/`. The resulting directory can be served by
//! any static host together with a `static-data` frontend build.

use std::io::Write;
use std::path::Path;

use hydrant_shared::models::Hydrant;

const DEFAULT_SERVER_URL: &str = "http://localhost:4000";

/// Reduce a stored image path to its `/uploads/<basename>` form so the
/// snapshot is self-contained regardless of how the server stored it.
fn normalize_public_path(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or_default();
    if name.is_empty() {
        return None;
    }
    Some(format!("/uploads/{name}"))
}

fn download(
    client: &reqwest::blocking::Client,
    server_url: &str,
    public_path: &str,
    uploads_dir: &Path,
) -> Result<(), String> {
    let name = public_path.rsplit('/').next().unwrap_or_default();
    let url = format!("{server_url}{public_path}");
    let resp = client
        .get(&url)
        .send()
        .map_err(|e| format!("{url}: {e}"))?;
    if !resp.status().is_success() {
        return Err(format!("{url}: server returned {}", resp.status()));
    }
    let bytes = resp.bytes().map_err(|e| format!("{url}: {e}"))?;
    let out = uploads_dir.join(name);
    let mut file = std::fs::File::create(&out).map_err(|e| format!("{}: {e}", out.display()))?;
    file.write_all(&bytes)
        .map_err(|e| format!("{}: {e}", out.display()))
}

fn get_arg(flag: &str) -> Option<String> {
    std::env::args().skip_while(|a| a != flag).nth(1)
}

fn main() {
    let server_url = get_arg("--server").unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
    let server_url = server_url.trim_end_matches('/').to_string();
    let out_dir = get_arg("--out").unwrap_or_else(|| "snapshot".to_string());

    let uploads_dir = Path::new(&out_dir).join("uploads");
    std::fs::create_dir_all(&uploads_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create {}: {e}", uploads_dir.display());
        std::process::exit(1);
    });

    let client = reqwest::blocking::Client::new();

    let list_url = format!("{server_url}/api/hydrants");
    eprintln!("Fetching records from {list_url}...");
    let records: Vec<Hydrant> = client
        .get(&list_url)
        .send()
        .unwrap_or_else(|e| {
            eprintln!("Failed to fetch records: {e}");
            std::process::exit(1);
        })
        .json()
        .unwrap_or_else(|e| {
            eprintln!("Failed to parse records: {e}");
            std::process::exit(1);
        });

    let mut exported = Vec::with_capacity(records.len());
    let mut copied = 0usize;
    for record in &records {
        let (Some(large), Some(thumb)) = (
            normalize_public_path(&record.image_large_path),
            normalize_public_path(&record.image_thumb_path),
        ) else {
            eprintln!("Skipping record {}: malformed image path", record.id);
            continue;
        };

        for public_path in [&record.image_large_path, &record.image_thumb_path] {
            match download(&client, &server_url, public_path, &uploads_dir) {
                Ok(()) => copied += 1,
                Err(e) => eprintln!("Warning: failed to download {e}"),
            }
        }

        exported.push(Hydrant {
            image_large_path: large,
            image_thumb_path: thumb,
            ..record.clone()
        });
    }

    let data_path = Path::new(&out_dir).join("data.json");
    let json = serde_json::to_string_pretty(&exported).expect("records always serialize");
    std::fs::write(&data_path, json).unwrap_or_else(|e| {
        eprintln!("Failed to write {}: {e}", data_path.display());
        std::process::exit(1);
    });

    eprintln!(
        "Exported {} records to {} and copied {} image files to {}",
        exported.len(),
        data_path.display(),
        copied,
        uploads_dir.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_public_path() {
        assert_eq!(
            normalize_public_path("/uploads/large-1-pump.jpg").as_deref(),
            Some("/uploads/large-1-pump.jpg")
        );
        // Nested or absolute storage layouts collapse to the basename
        assert_eq!(
            normalize_public_path("/srv/app/uploads/thumb-2.jpg").as_deref(),
            Some("/uploads/thumb-2.jpg")
        );
        assert_eq!(normalize_public_path(""), None);
        assert_eq!(normalize_public_path("/uploads/"), None);
    }
}
