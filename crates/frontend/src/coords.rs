use hydrant_shared::map;

pub const ZOOM_MIN: f64 = 1.0;
pub const ZOOM_MAX: f64 = 8.0;
pub const ZOOM_STEP: f64 = 1.1;

/// Pure function: convert container-relative coordinates to base-image
/// pixels, undoing the zoom/pan CSS transform. Usable in unit tests (no
/// web_sys dependency).
///
/// Only `container_w` is needed because the image renders with
/// `width:100%; height:auto`, so both axes share the same scale factor
/// (`IMAGE_WIDTH_PX / container_w`).
///
/// The result is deliberately not clamped to the image bounds: hydrants may
/// legally sit outside the visible crop.
pub fn container_to_image_px(
    container_x: f64,
    container_y: f64,
    container_w: f64,
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
) -> Option<(f64, f64)> {
    if container_w <= 0.0 || zoom <= 0.0 {
        return None;
    }

    // Undo CSS transform: translate(pan_x, pan_y) scale(zoom)
    let rendered_x = (container_x - pan_x) / zoom;
    let rendered_y = (container_y - pan_y) / zoom;

    let scale = map::IMAGE_WIDTH_PX / container_w;
    Some((rendered_x * scale, rendered_y * scale))
}

/// Get container-relative click coordinates using web_sys, then convert
/// from rendered pixel space to base-image pixel space.
pub fn client_to_image_px(
    client_x: f64,
    client_y: f64,
    container_id: &str,
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
) -> Option<(f64, f64)> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(container_id)?;
    let rect = element.get_bounding_client_rect();

    let container_x = client_x - rect.left();
    let container_y = client_y - rect.top();

    container_to_image_px(container_x, container_y, rect.width(), zoom, pan_x, pan_y)
}

/// Compute new pan offsets so that `cursor` stays over the same content point
/// when zooming from `old_zoom` to `new_zoom`.
pub fn zoom_pan_at_cursor(
    cursor_x: f64,
    cursor_y: f64,
    old_zoom: f64,
    new_zoom: f64,
    old_pan_x: f64,
    old_pan_y: f64,
) -> (f64, f64) {
    let content_x = (cursor_x - old_pan_x) / old_zoom;
    let content_y = (cursor_y - old_pan_y) / old_zoom;
    (
        cursor_x - content_x * new_zoom,
        cursor_y - content_y * new_zoom,
    )
}

/// Clamp pan values so the image bounds stay reachable.
///
/// The base image is rendered at `width: 100%` of the container, so its
/// rendered height is `container_w * IMAGE_ASPECT`, which may exceed the
/// container height. That overflow has to count toward the pan range or the
/// bottom of the map becomes unreachable.
pub fn clamp_pan(pan_x: f64, pan_y: f64, zoom: f64, container_w: f64, container_h: f64) -> (f64, f64) {
    let content_w = container_w * zoom;
    let content_h = container_w * map::IMAGE_ASPECT * zoom;
    let min_pan_x = -(content_w - container_w).max(0.0);
    let min_pan_y = -(content_h - container_h).max(0.0);
    (pan_x.clamp(min_pan_x, 0.0), pan_y.clamp(min_pan_y, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Container a quarter of the native image width: scale factor is 4.
    const CONTAINER_W: f64 = 902.0;

    #[test]
    fn test_container_to_image_px_fit_view() {
        // At zoom=1, pan=0 the container center maps to the image center
        let (x, y) = container_to_image_px(451.0, 321.0, CONTAINER_W, 1.0, 0.0, 0.0).unwrap();
        assert!((x - 1804.0).abs() < 1e-9);
        assert!((y - 1284.0).abs() < 1e-9);
    }

    #[test]
    fn test_container_to_image_px_with_zoom() {
        // At zoom=2 with pan=0, the same click lands at half the coordinate
        let (x, y) = container_to_image_px(451.0, 321.0, CONTAINER_W, 2.0, 0.0, 0.0).unwrap();
        assert!((x - 902.0).abs() < 1e-9);
        assert!((y - 642.0).abs() < 1e-9);
    }

    #[test]
    fn test_container_to_image_px_with_pan() {
        // Pan shifts the content; undoing it recovers the unpanned point
        let (x, y) = container_to_image_px(551.0, 371.0, CONTAINER_W, 1.0, 100.0, 50.0).unwrap();
        assert!((x - 1804.0).abs() < 1e-9);
        assert!((y - 1284.0).abs() < 1e-9);
    }

    #[test]
    fn test_container_to_image_px_does_not_clamp() {
        // Clicks above/left of the image resolve to negative pixel coords —
        // markers outside the crop are legal
        let (x, y) = container_to_image_px(-10.0, -20.0, CONTAINER_W, 1.0, 0.0, 0.0).unwrap();
        assert!(x < 0.0);
        assert!(y < 0.0);
    }

    #[test]
    fn test_container_to_image_px_invalid_container() {
        assert!(container_to_image_px(10.0, 10.0, 0.0, 1.0, 0.0, 0.0).is_none());
        assert!(container_to_image_px(10.0, 10.0, CONTAINER_W, 0.0, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_zoom_pan_at_cursor_keeps_point_fixed() {
        // The content point under the cursor must be the same before and
        // after the zoom step
        let (cursor_x, cursor_y) = (300.0, 200.0);
        let (old_zoom, new_zoom) = (1.0, 2.0);
        let (old_pan_x, old_pan_y) = (-50.0, -30.0);
        let (new_pan_x, new_pan_y) =
            zoom_pan_at_cursor(cursor_x, cursor_y, old_zoom, new_zoom, old_pan_x, old_pan_y);

        let before = (
            (cursor_x - old_pan_x) / old_zoom,
            (cursor_y - old_pan_y) / old_zoom,
        );
        let after = (
            (cursor_x - new_pan_x) / new_zoom,
            (cursor_y - new_pan_y) / new_zoom,
        );
        assert!((before.0 - after.0).abs() < 1e-9);
        assert!((before.1 - after.1).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_pan_fit_view_stays_at_origin() {
        // Container taller than the rendered image at zoom 1: nothing to pan
        let container_h = CONTAINER_W * hydrant_shared::map::IMAGE_ASPECT + 100.0;
        let (px, py) = clamp_pan(0.0, 0.0, 1.0, CONTAINER_W, container_h);
        assert!((px - 0.0).abs() < 0.01);
        assert!((py - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_clamp_pan_prevents_positive_pan() {
        let (px, py) = clamp_pan(50.0, 50.0, 1.0, 800.0, 600.0);
        assert!((px - 0.0).abs() < 0.01);
        assert!((py - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_clamp_pan_allows_reaching_far_edge_when_zoomed() {
        let (container_w, container_h) = (800.0, 600.0);
        let zoom = 2.0;
        let min_x = -(container_w * zoom - container_w);
        let (px, _) = clamp_pan(-10_000.0, 0.0, zoom, container_w, container_h);
        assert!((px - min_x).abs() < 0.01, "pan should clamp at the far edge");
        // Within range, pan passes through untouched
        let (px, _) = clamp_pan(-100.0, 0.0, zoom, container_w, container_h);
        assert!((px - (-100.0)).abs() < 0.01);
    }

    #[test]
    fn test_clamp_pan_accounts_for_rendered_height_overflow() {
        // Wide container: rendered image is taller than the container even
        // at zoom 1, so downward panning must be allowed
        let (container_w, container_h) = (3200.0, 2000.0);
        let rendered_h = container_w * hydrant_shared::map::IMAGE_ASPECT;
        assert!(rendered_h > container_h);
        let min_y = -(rendered_h - container_h);
        let (_, py) = clamp_pan(0.0, -10_000.0, 1.0, container_w, container_h);
        assert!((py - min_y).abs() < 0.01);
    }
}
