use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

/// Width cap for the large variant. Sources narrower than this are never
/// upscaled.
const LARGE_MAX_WIDTH: u32 = 2048;

/// Width cap for the thumbnail variant.
const THUMB_MAX_WIDTH: u32 = 200;

/// Public URL prefix under which the upload directory is served.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// The two derived variants of one upload, as root-relative URL paths.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredImages {
    pub large_path: String,
    pub thumb_path: String,
}

/// Replace whitespace runs in an uploaded filename with `-`.
pub fn sanitize_filename(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Scale `img` down so its width does not exceed `cap`, preserving aspect
/// ratio. Sources already within the cap are returned unchanged.
fn cap_width(img: &DynamicImage, cap: u32) -> DynamicImage {
    if img.width() <= cap {
        return img.clone();
    }
    // Ceil so the width bound, not the height, is the binding constraint
    let height = ((cap as f64) * (img.height() as f64) / (img.width() as f64))
        .ceil()
        .max(1.0) as u32;
    img.resize(cap, height, FilterType::Triangle)
}

fn decode_resize_write(bytes: &[u8], cap: u32, out: &Path) -> Result<(), String> {
    let format = image::guess_format(bytes).map_err(|e| e.to_string())?;
    let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let resized = cap_width(&img, cap);
    resized
        .save_with_format(out, format)
        .map_err(|e| format!("Failed to write {}: {}", out.display(), e))
}

/// Derive the large and thumb variants from one uploaded payload and write
/// them under `upload_dir`.
///
/// Names are `large-`/`thumb-` + upload timestamp (ms) + the sanitized
/// original filename; collisions inside one millisecond are not deduplicated.
/// The two resizes run concurrently on blocking threads; both must succeed —
/// any failure is fatal and no paths are returned (the caller must not have
/// inserted a record yet).
pub async fn process_upload(
    upload_dir: &Path,
    original_name: &str,
    bytes: Vec<u8>,
) -> Result<StoredImages, String> {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let base_name = format!("{}-{}", timestamp, sanitize_filename(original_name));
    let large_name = format!("large-{}", base_name);
    let thumb_name = format!("thumb-{}", base_name);

    let bytes = Arc::new(bytes);
    let large_out: PathBuf = upload_dir.join(&large_name);
    let thumb_out: PathBuf = upload_dir.join(&thumb_name);

    let large_task = {
        let bytes = Arc::clone(&bytes);
        tokio::task::spawn_blocking(move || decode_resize_write(&bytes, LARGE_MAX_WIDTH, &large_out))
    };
    let thumb_task = {
        let bytes = Arc::clone(&bytes);
        tokio::task::spawn_blocking(move || decode_resize_write(&bytes, THUMB_MAX_WIDTH, &thumb_out))
    };

    let (large_res, thumb_res) = tokio::try_join!(large_task, thumb_task)
        .map_err(|e| format!("Image task panicked: {}", e))?;
    large_res?;
    thumb_res?;

    Ok(StoredImages {
        large_path: format!("{}/{}", PUBLIC_PREFIX, large_name),
        thumb_path: format!("{}/{}", PUBLIC_PREFIX, thumb_name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Encode a solid-color RGB image as PNG bytes.
    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_sanitize_filename_replaces_whitespace() {
        assert_eq!(sanitize_filename("my photo.jpg"), "my-photo.jpg");
        assert_eq!(sanitize_filename("a  b\tc.png"), "a-b-c.png");
        assert_eq!(sanitize_filename("clean.png"), "clean.png");
    }

    #[test]
    fn test_cap_width_downscales_preserving_aspect() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::new(3000, 1500));
        let out = cap_width(&img, 2048);
        assert_eq!(out.width(), 2048);
        assert_eq!(out.height(), 1024);
    }

    #[test]
    fn test_cap_width_never_upscales() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::new(120, 90));
        let out = cap_width(&img, 2048);
        assert_eq!(out.width(), 120);
        assert_eq!(out.height(), 90);
    }

    #[tokio::test]
    async fn test_process_upload_writes_both_variants() {
        let dir = tempfile::tempdir().unwrap();
        let stored = process_upload(dir.path(), "campus pump.png", png_bytes(500, 400))
            .await
            .unwrap();

        assert!(stored.large_path.starts_with("/uploads/large-"));
        assert!(stored.thumb_path.starts_with("/uploads/thumb-"));
        assert!(stored.large_path.ends_with("-campus-pump.png"));
        assert_ne!(stored.large_path, stored.thumb_path);

        let large_file = dir.path().join(stored.large_path.trim_start_matches("/uploads/"));
        let thumb_file = dir.path().join(stored.thumb_path.trim_start_matches("/uploads/"));
        let large = image::open(&large_file).unwrap();
        let thumb = image::open(&thumb_file).unwrap();
        // 500px source: large keeps original size, thumb caps at 200 wide
        assert_eq!(large.width(), 500);
        assert_eq!(large.height(), 400);
        assert_eq!(thumb.width(), 200);
        assert_eq!(thumb.height(), 160);
    }

    #[tokio::test]
    async fn test_process_upload_caps_large_variant() {
        let dir = tempfile::tempdir().unwrap();
        let stored = process_upload(dir.path(), "wide.png", png_bytes(2500, 1000))
            .await
            .unwrap();
        let large_file = dir.path().join(stored.large_path.trim_start_matches("/uploads/"));
        let large = image::open(&large_file).unwrap();
        assert_eq!(large.width(), 2048);
        assert_eq!(large.height(), 819);
    }

    #[tokio::test]
    async fn test_process_upload_rejects_non_image_payload() {
        let dir = tempfile::tempdir().unwrap();
        let result = process_upload(dir.path(), "not-an-image.txt", b"hello".to_vec()).await;
        assert!(result.is_err());
        // No stray files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
