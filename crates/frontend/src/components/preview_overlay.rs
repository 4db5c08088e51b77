use dioxus::prelude::*;

/// Full-screen preview of the large image variant. Clicking anywhere closes
/// it.
#[component]
pub fn PreviewOverlay(large_url: String, on_close: EventHandler<()>) -> Element {
    rsx! {
        div {
            class: "preview-overlay",
            onclick: move |_| on_close.call(()),
            img { src: "{large_url}", alt: "Hydrant" }
        }
    }
}
