//! Area Window Menu
//!
//! Window context menus derived from client state, and the interactive
//! window chooser that binds a menu action to a clicked window.

pub mod config;
pub mod shared;
pub mod shell;
pub mod wm;
