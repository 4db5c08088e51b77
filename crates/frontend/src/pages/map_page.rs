use dioxus::prelude::*;
use hydrant_shared::models::Hydrant;

use crate::api;
use crate::components::add_dialog::AddDialog;
use crate::components::map_view::{MapView, Mode};
use crate::components::preview_overlay::PreviewOverlay;
use crate::sync::{HydrantList, MoveOutcome};

#[component]
pub fn MapPage() -> Element {
    let mut hydrants = use_signal(HydrantList::default);
    let mut loading = use_signal(|| false);
    // Initial-load failure: persistent banner, empty list, no retry
    let mut load_error = use_signal(|| None::<String>);
    // Operation failures: transient banner, auto-dismissed
    let mut error = use_signal(|| None::<String>);
    let mut banner_seq = use_signal(|| 0u64);

    let mut mode = use_signal(|| Mode::View);
    let mut pending_add = use_signal(|| None::<(f64, f64)>);
    let mut submitting = use_signal(|| false);
    let mut preview = use_signal(|| None::<Hydrant>);

    // Surface a transient error; the sequence number keeps a slow dismissal
    // from clearing a newer message
    let mut show_error = move |msg: String| {
        let seq = *banner_seq.peek() + 1;
        banner_seq.set(seq);
        error.set(Some(msg));
        spawn(async move {
            gloo_timers::future::TimeoutFuture::new(5_000).await;
            if *banner_seq.peek() == seq {
                error.set(None);
            }
        });
    };

    // Initial load: one fetch, no retry
    use_future(move || async move {
        loading.set(true);
        match api::fetch_hydrants().await {
            Ok(records) => hydrants.write().replace_all(records),
            Err(e) => load_error.set(Some(format!("Failed to load hydrants: {e}"))),
        }
        loading.set(false);
    });

    let on_add_intent = move |(x, y): (f64, f64)| {
        // A new intent discards any pending one — no queueing
        pending_add.set(Some((x, y)));
        submitting.set(false);
    };

    let on_submit_add = move |(file_name, bytes): (String, Vec<u8>)| {
        let Some((x, y)) = *pending_add.peek() else { return };
        submitting.set(true);
        spawn(async move {
            match api::create_hydrant(x, y, file_name, bytes).await {
                Ok(record) => {
                    // Only the confirmed record enters local state: the
                    // server owns id and image paths
                    hydrants.write().prepend(record);
                    pending_add.set(None);
                }
                Err(e) => show_error(format!("Failed to add hydrant: {e}")),
            }
            submitting.set(false);
        });
    };

    let on_move_intent = move |(id, x, y): (i64, f64, f64)| {
        // Optimistic: the marker stays where it was dropped while the
        // server confirms
        let ticket = hydrants.write().begin_move(id, x, y);
        let Some(ticket) = ticket else { return };
        spawn(async move {
            let result = api::update_coords(id, x, y).await;
            let outcome = hydrants.write().finish_move(&ticket, result.is_ok());
            if outcome == MoveOutcome::RolledBack {
                let msg = result.err().unwrap_or_else(|| "request failed".to_string());
                show_error(format!("Failed to move hydrant: {msg}"));
            }
        });
    };

    let on_delete_intent = move |record: Hydrant| {
        let confirmed = web_sys::window()
            .map(|w| {
                w.confirm_with_message("Delete this hydrant and its photo?")
                    .unwrap_or(false)
            })
            .unwrap_or(false);
        if !confirmed {
            return;
        }
        spawn(async move {
            match api::delete_hydrant(record.id).await {
                Ok(()) => {
                    // Not optimistic: the record leaves local state only
                    // after the server acknowledged
                    hydrants.write().remove(record.id);
                }
                Err(e) => show_error(format!("Failed to delete hydrant: {e}")),
            }
        });
    };

    let records = hydrants.read().records().to_vec();
    let cur_mode = *mode.read();
    let editable = cfg!(not(feature = "static-data"));

    rsx! {
        div { class: "app",
            header { class: "header",
                div {
                    h1 { "Campus Hydrant Map" }
                    p { class: "subtitle",
                        "Underground fire hydrants and pump connections on the campus map"
                    }
                }
                div { class: "header-right",
                    if *loading.read() {
                        span { class: "loading", "Loading…" }
                    }
                    if editable {
                        div { class: "mode-toggle",
                            button {
                                class: if cur_mode == Mode::View { "active" } else { "" },
                                onclick: move |_| {
                                    mode.set(Mode::View);
                                    pending_add.set(None);
                                },
                                "View"
                            }
                            button {
                                class: if cur_mode == Mode::Edit { "active" } else { "" },
                                onclick: move |_| mode.set(Mode::Edit),
                                "Edit"
                            }
                        }
                    }
                }
            }

            if let Some(msg) = load_error.read().clone() {
                div { class: "banner error", "{msg}" }
            }
            if let Some(msg) = error.read().clone() {
                div { class: "banner error", "{msg}" }
            }

            div { class: "map-panel",
                MapView {
                    records,
                    mode: cur_mode,
                    on_preview: move |h: Hydrant| preview.set(Some(h)),
                    on_add_intent,
                    on_move_intent,
                    on_delete_intent,
                }
            }

            if let Some((x, y)) = *pending_add.read() {
                AddDialog {
                    key: "{x}-{y}",
                    coordinate: (x, y),
                    submitting: *submitting.read(),
                    on_submit: on_submit_add,
                    on_cancel: move |_| pending_add.set(None),
                }
            }

            if let Some(h) = preview.read().clone() {
                PreviewOverlay {
                    large_url: h.image_large_path.clone(),
                    on_close: move |_| preview.set(None),
                }
            }

            footer { class: "footer",
                p {
                    "Community-maintained data; locations may be inaccurate. "
                    "In an emergency follow on-site markings and official guidance."
                }
            }
        }
    }
}
