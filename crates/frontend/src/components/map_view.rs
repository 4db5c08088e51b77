use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use hydrant_shared::models::Hydrant;
use std::cell::RefCell;
use std::rc::Rc;

use crate::components::hydrant_marker::{HydrantMarker, IconCache};
use crate::coords;

const MAP_CONTAINER_ID: &str = "hydrant-map-container";

/// Drag threshold in pixels — movement below this is treated as a click.
const DRAG_THRESHOLD: f64 = 3.0;

/// Interaction mode. Owned by the page and passed down explicitly; nothing
/// global.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Edit,
}

/// An in-progress marker drag (edit mode only).
#[derive(Debug, Clone, Copy, PartialEq)]
struct MarkerDrag {
    id: i64,
    start_client: (f64, f64),
    /// Set once movement crosses the drag threshold; below it the release
    /// counts as a click.
    moved: bool,
    /// Live position in image pixels while the drag is in flight.
    pos: (f64, f64),
}

// ---------------------------------------------------------------------------
// DOM helpers
// ---------------------------------------------------------------------------

/// Get the bounding client rect of the map container element.
fn container_rect() -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(MAP_CONTAINER_ID)?;
    Some(element.get_bounding_client_rect())
}

/// Apply `clamp_pan` using the live container dimensions.
fn clamp_pan_to_container(pan_x: f64, pan_y: f64, zoom: f64) -> (f64, f64) {
    match container_rect() {
        Some(rect) => coords::clamp_pan(pan_x, pan_y, zoom, rect.width(), rect.height()),
        None => (pan_x, pan_y),
    }
}

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

fn point_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// Where to draw a marker: the live drag position once the drag has crossed
/// the threshold, the record's coordinate otherwise.
fn marker_position(record: &Hydrant, drag: Option<&MarkerDrag>) -> (f64, f64) {
    match drag {
        Some(d) if d.id == record.id && d.moved => d.pos,
        _ => (record.x_coord, record.y_coord),
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[component]
pub fn MapView(
    records: Vec<Hydrant>,
    mode: Mode,
    on_preview: EventHandler<Hydrant>,
    on_add_intent: EventHandler<(f64, f64)>,
    on_move_intent: EventHandler<(i64, f64, f64)>,
    on_delete_intent: EventHandler<Hydrant>,
) -> Element {
    // Zoom / pan state. Initial values fit the image to the container once;
    // everything after is user-driven within the clamp limits.
    let mut zoom = use_signal(|| 1.0_f64);
    let mut pan_x = use_signal(|| 0.0_f64);
    let mut pan_y = use_signal(|| 0.0_f64);

    // Map pan drag state (mouse)
    let mut is_dragging = use_signal(|| false);
    let mut did_drag = use_signal(|| false);
    let mut drag_start_x = use_signal(|| 0.0_f64);
    let mut drag_start_y = use_signal(|| 0.0_f64);
    let mut drag_start_pan_x = use_signal(|| 0.0_f64);
    let mut drag_start_pan_y = use_signal(|| 0.0_f64);

    // Marker drag state (edit mode)
    let mut marker_drag = use_signal(|| None::<MarkerDrag>);

    // Marker markup cache, shared across all markers; lives as long as the
    // map does and is keyed by (representation, photo path)
    let icon_cache = use_hook(|| Rc::new(RefCell::new(IconCache::default())));

    let cur_zoom = *zoom.read();
    let cur_pan_x = *pan_x.read();
    let cur_pan_y = *pan_y.read();
    let dragging = *is_dragging.read();
    let cur_marker_drag = *marker_drag.read();

    let transform_style = format!(
        "transform: translate({cur_pan_x}px, {cur_pan_y}px) scale({cur_zoom}); transform-origin: 0 0;"
    );
    let container_class = if dragging {
        "map-container dragging"
    } else if mode == Mode::Edit {
        "map-container editing"
    } else {
        "map-container"
    };

    let records_for_drop = records.clone();

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "{container_class}",

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();

                let delta_y = wheel_delta_y(evt.data().delta());
                let factor = if delta_y < 0.0 { coords::ZOOM_STEP } else { 1.0 / coords::ZOOM_STEP };
                let old_z = *zoom.read();
                let new_z = (old_z * factor).clamp(coords::ZOOM_MIN, coords::ZOOM_MAX);
                if (new_z - old_z).abs() < 1e-9 {
                    return;
                }

                let Some(rect) = container_rect() else { return };
                let client = evt.data().client_coordinates();
                let cx = client.x - rect.left();
                let cy = client.y - rect.top();

                let (new_px, new_py) =
                    coords::zoom_pan_at_cursor(cx, cy, old_z, new_z, *pan_x.read(), *pan_y.read());
                let (px, py) = coords::clamp_pan(new_px, new_py, new_z, rect.width(), rect.height());

                zoom.set(new_z);
                pan_x.set(px);
                pan_y.set(py);
            },

            onmousedown: move |evt: Event<MouseData>| {
                // Marker presses stop propagation, so reaching here means
                // the press landed on the map itself
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let client = evt.client_coordinates();
                is_dragging.set(true);
                did_drag.set(false);
                drag_start_x.set(client.x);
                drag_start_y.set(client.y);
                drag_start_pan_x.set(*pan_x.read());
                drag_start_pan_y.set(*pan_y.read());
            },

            onmousemove: move |evt: Event<MouseData>| {
                let client = evt.client_coordinates();

                // A marker drag takes priority over map panning. Copy the
                // state out first so the read guard is released before set.
                let cur_drag = *marker_drag.read();
                if let Some(mut drag) = cur_drag {
                    if !drag.moved
                        && point_distance(drag.start_client, (client.x, client.y)) > DRAG_THRESHOLD
                    {
                        drag.moved = true;
                    }
                    if drag.moved {
                        if let Some(pos) = coords::client_to_image_px(
                            client.x, client.y, MAP_CONTAINER_ID,
                            *zoom.read(), *pan_x.read(), *pan_y.read(),
                        ) {
                            drag.pos = pos;
                        }
                    }
                    marker_drag.set(Some(drag));
                    return;
                }

                if !*is_dragging.read() {
                    return;
                }
                let dx = client.x - *drag_start_x.read();
                let dy = client.y - *drag_start_y.read();

                if !*did_drag.read() && (dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD) {
                    did_drag.set(true);
                }
                if *did_drag.read() {
                    let new_px = *drag_start_pan_x.read() + dx;
                    let new_py = *drag_start_pan_y.read() + dy;
                    let (px, py) = clamp_pan_to_container(new_px, new_py, *zoom.read());
                    pan_x.set(px);
                    pan_y.set(py);
                }
            },

            onmouseup: move |evt: Event<MouseData>| {
                // Settle a marker drag: past the threshold it is a Move
                // intent, below it a plain click that previews
                let cur_drag = *marker_drag.read();
                if let Some(drag) = cur_drag {
                    marker_drag.set(None);
                    if drag.moved {
                        on_move_intent.call((drag.id, drag.pos.0, drag.pos.1));
                    } else if let Some(h) = records_for_drop.iter().find(|h| h.id == drag.id) {
                        on_preview.call(h.clone());
                    }
                    return;
                }

                let was_dragging = *is_dragging.read();
                let was_drag = *did_drag.read();
                is_dragging.set(false);

                // A mouseup without drag movement = a click on empty space
                if was_dragging && !was_drag && mode == Mode::Edit {
                    let client = evt.client_coordinates();
                    if let Some((img_x, img_y)) = coords::client_to_image_px(
                        client.x, client.y, MAP_CONTAINER_ID,
                        *zoom.read(), *pan_x.read(), *pan_y.read(),
                    ) {
                        on_add_intent.call((img_x, img_y));
                    }
                }
            },

            onmouseleave: move |_| {
                is_dragging.set(false);
                // Abandon any in-flight marker drag; the marker snaps back
                // because no intent was emitted
                marker_drag.set(None);
            },

            ondoubleclick: move |evt: Event<MouseData>| {
                evt.prevent_default();
                zoom.set(1.0);
                pan_x.set(0.0);
                pan_y.set(0.0);
            },

            // Inner wrapper — CSS transform applies zoom/pan to the base
            // image and markers together
            div {
                class: "map-inner",
                style: "{transform_style}",

                img {
                    class: "base-map",
                    src: "/campus-map.png",
                    draggable: "false",
                    alt: "Campus base map",
                }

                for h in records.iter() {
                    HydrantMarker {
                        key: "{h.id}",
                        hydrant: h.clone(),
                        position: marker_position(h, cur_marker_drag.as_ref()),
                        zoom: cur_zoom,
                        mode,
                        icon_cache: icon_cache.clone(),
                        on_preview: {
                            let record = h.clone();
                            move |_| on_preview.call(record.clone())
                        },
                        on_press: {
                            let id = h.id;
                            let start = (h.x_coord, h.y_coord);
                            move |(cx, cy): (f64, f64)| {
                                marker_drag.set(Some(MarkerDrag {
                                    id,
                                    start_client: (cx, cy),
                                    moved: false,
                                    pos: start,
                                }));
                            }
                        },
                        on_delete: {
                            let record = h.clone();
                            move |_| on_delete_intent.call(record.clone())
                        },
                    }
                }
            }

            div { class: "map-hint",
                if mode == Mode::Edit {
                    "Click the map to add a hydrant · drag a marker to move it"
                } else {
                    "Scroll to zoom · drag to pan · click a marker to preview"
                }
            }
        }
    }
}
