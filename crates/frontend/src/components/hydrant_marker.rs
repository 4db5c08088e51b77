use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use dioxus::prelude::*;
use hydrant_shared::map;
use hydrant_shared::models::Hydrant;

use crate::components::map_view::Mode;

/// Zoom level at which markers switch from the compact pin to the
/// thumbnail card. Strictly below: pin; at or above: card.
pub const THUMB_ZOOM: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Pin,
    ThumbCard,
}

/// Pure choice of representation — depends on zoom alone, never on marker
/// order or count.
pub fn representation(zoom: f64) -> MarkerKind {
    if zoom >= THUMB_ZOOM {
        MarkerKind::ThumbCard
    } else {
        MarkerKind::Pin
    }
}

/// Markup cache keyed by (representation kind, photo path).
///
/// Icon construction must not happen once per zoom tick: entries are built
/// on first use and invalidated only when the photo path changes (a new
/// path is simply a new key).
#[derive(Default, PartialEq)]
pub struct IconCache {
    entries: HashMap<(MarkerKind, String), String>,
}

impl IconCache {
    pub fn markup(&mut self, kind: MarkerKind, thumb_path: &str) -> String {
        self.entries
            .entry((kind, thumb_path.to_string()))
            .or_insert_with(|| match kind {
                MarkerKind::Pin => pin_markup(),
                MarkerKind::ThumbCard => thumb_card_markup(thumb_path),
            })
            .clone()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Directional pin, 34×48, bottom tip at the anchor point.
fn pin_markup() -> String {
    concat!(
        r#"<svg width="34" height="48" viewBox="0 0 34 48" fill="none" xmlns="http://www.w3.org/2000/svg">"#,
        r##"<path d="M17 0C8 0 0 7.4 0 16.5C0 29.2 17 48 17 48C17 48 34 29.2 34 16.5C34 7.4 26 0 17 0Z" fill="#ef4444"/>"##,
        r#"<circle cx="17" cy="16" r="6" fill="white"/>"#,
        r#"</svg>"#
    )
    .to_string()
}

/// Card-style callout: thumbnail in a white frame with a pointer tail whose
/// tip sits at the anchor point.
fn thumb_card_markup(thumb_url: &str) -> String {
    format!(
        concat!(
            r#"<div class="thumb-card">"#,
            r#"<div class="thumb-frame"><img src="{url}" alt="Hydrant"/></div>"#,
            r#"<div class="thumb-tail"></div>"#,
            r#"</div>"#
        ),
        url = thumb_url
    )
}

/// One marker on the map. The wrapper is positioned in percent of the image
/// and counter-scaled by 1/zoom so the marker keeps a constant on-screen
/// size while the map zooms under it.
#[component]
pub fn HydrantMarker(
    hydrant: Hydrant,
    position: (f64, f64),
    zoom: f64,
    mode: Mode,
    icon_cache: Rc<RefCell<IconCache>>,
    on_preview: EventHandler<()>,
    on_press: EventHandler<(f64, f64)>,
    on_delete: EventHandler<()>,
) -> Element {
    let kind = representation(zoom);
    let markup = icon_cache
        .borrow_mut()
        .markup(kind, &hydrant.image_thumb_path);

    let left_pct = position.0 / map::IMAGE_WIDTH_PX * 100.0;
    let top_pct = position.1 / map::IMAGE_HEIGHT_PX * 100.0;
    let style = format!(
        "left:{left_pct}%;top:{top_pct}%;transform:translate(-50%,-100%) scale({});transform-origin:50% 100%;",
        1.0 / zoom
    );
    let class = match kind {
        MarkerKind::Pin => "hydrant-marker pin",
        MarkerKind::ThumbCard => "hydrant-marker thumb",
    };
    let editing = mode == Mode::Edit;

    rsx! {
        div {
            class: "{class}",
            style: "{style}",

            // In edit mode the press starts a possible drag; the map decides
            // click vs drag and previews on a plain click. In view mode the
            // marker just previews.
            onmousedown: move |evt: Event<MouseData>| {
                if editing {
                    evt.stop_propagation();
                    let client = evt.client_coordinates();
                    on_press.call((client.x, client.y));
                }
            },
            onclick: move |evt: Event<MouseData>| {
                if !editing {
                    evt.stop_propagation();
                    on_preview.call(());
                }
            },

            div { dangerous_inner_html: "{markup}" }

            if editing {
                button {
                    class: "marker-delete",
                    title: "Delete hydrant",
                    onmousedown: move |evt: Event<MouseData>| {
                        evt.stop_propagation();
                    },
                    onclick: move |evt: Event<MouseData>| {
                        evt.stop_propagation();
                        on_delete.call(());
                    },
                    "×"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_representation_switches_exactly_at_threshold() {
        assert_eq!(representation(THUMB_ZOOM - 0.001), MarkerKind::Pin);
        assert_eq!(representation(THUMB_ZOOM), MarkerKind::ThumbCard);
        assert_eq!(representation(THUMB_ZOOM + 0.001), MarkerKind::ThumbCard);
    }

    #[test]
    fn test_representation_is_independent_of_anything_else() {
        // Same zoom, any number of calls in any order: same answer
        let zooms = [1.0, 2.9, 3.0, 5.0, 8.0];
        let first: Vec<_> = zooms.iter().map(|z| representation(*z)).collect();
        let again: Vec<_> = zooms.iter().rev().map(|z| representation(*z)).collect();
        assert_eq!(first, again.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_icon_cache_reuses_markup_for_same_path() {
        let mut cache = IconCache::default();
        let a = cache.markup(MarkerKind::ThumbCard, "/uploads/thumb-1.jpg");
        let b = cache.markup(MarkerKind::ThumbCard, "/uploads/thumb-1.jpg");
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1, "repeated lookups must not rebuild");
    }

    #[test]
    fn test_icon_cache_keys_on_kind_and_path() {
        let mut cache = IconCache::default();
        cache.markup(MarkerKind::Pin, "/uploads/thumb-1.jpg");
        cache.markup(MarkerKind::ThumbCard, "/uploads/thumb-1.jpg");
        cache.markup(MarkerKind::ThumbCard, "/uploads/thumb-2.jpg");
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_thumb_card_embeds_photo_path() {
        let markup = thumb_card_markup("/uploads/thumb-7.jpg");
        assert!(markup.contains(r#"src="/uploads/thumb-7.jpg""#));
        assert!(markup.contains("thumb-tail"));
    }

    #[test]
    fn test_pin_markup_is_path_independent() {
        assert_eq!(pin_markup(), pin_markup());
        assert!(pin_markup().contains("svg"));
    }
}
