pub mod controls;
pub mod settings_modal;
pub mod tree_canvas;
