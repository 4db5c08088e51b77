pub mod add_dialog;
pub mod hydrant_marker;
pub mod map_view;
pub mod preview_overlay;
