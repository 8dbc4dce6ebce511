//! State shared between the window manager and the menu subsystem

pub mod window_state;

pub use window_state::WindowState;
