use dioxus::prelude::*;

/// The pending "add hydrant" intent: the clicked coordinate plus a photo
/// picker. Submission stays disabled until a photo has been chosen.
///
/// The page keys this component by the coordinate, so opening a new intent
/// remounts it and drops any previously chosen photo.
#[component]
pub fn AddDialog(
    coordinate: (f64, f64),
    submitting: bool,
    on_submit: EventHandler<(String, Vec<u8>)>,
    on_cancel: EventHandler<()>,
) -> Element {
    let mut photo = use_signal(|| None::<(String, Vec<u8>)>);

    let (x, y) = coordinate;
    let photo_name = photo.read().as_ref().map(|(name, _)| name.clone());
    let can_submit = photo.read().is_some() && !submitting;

    rsx! {
        div { class: "add-dialog",
            h3 { "New hydrant" }
            p { class: "coord-readout", "x: {x:.1}, y: {y:.1}" }

            label { class: "photo-picker",
                input {
                    r#type: "file",
                    accept: "image/*",
                    onchange: move |evt: Event<FormData>| {
                        if let Some(file) = evt.files().into_iter().next() {
                            spawn(async move {
                                let name = file.name();
                                if let Ok(bytes) = file.read_bytes().await {
                                    photo.set(Some((name, bytes.to_vec())));
                                }
                            });
                        }
                    },
                }
                if let Some(name) = photo_name {
                    span { class: "photo-name", "{name}" }
                } else {
                    span { class: "photo-hint", "Choose a photo" }
                }
            }

            div { class: "dialog-actions",
                button {
                    class: "primary",
                    disabled: !can_submit,
                    onclick: move |_| {
                        if let Some((name, bytes)) = photo.read().clone() {
                            on_submit.call((name, bytes));
                        }
                    },
                    if submitting { "Uploading…" } else { "Add hydrant" }
                }
                button {
                    onclick: move |_| on_cancel.call(()),
                    "Cancel"
                }
            }
        }
    }
}
