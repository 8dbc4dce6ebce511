//! Window Manager Module
//!
//! Window menus: state flags, actions, the menu tree and its builder, the
//! interactive window chooser, and the X11 backend they run against.

pub mod action;
pub mod chooser;
pub mod client_flags;
pub mod desktop;
pub mod display;
pub mod ewmh;
pub mod executor;
pub mod menu;
pub mod winmenu;

pub use action::{
    run_action, ActionBinding, ActionContext, ActionExecutor, ActionKind, Toggle, WindowId,
};
pub use chooser::{
    choose_window, ChooseError, ChooseEvent, ChooseOutcome, SelectionPointer, WindowRegistry,
};
pub use client_flags::{BorderFlags, StatusFlags, WindowLayer};
pub use desktop::{DesktopMenuFactory, WorkspaceMenu};
pub use display::{X11Display, X11Selection};
pub use executor::X11Executor;
pub use menu::{Menu, MenuItem, MenuLayout, MenuLayoutEngine, MenuWidget, TextLayout};
pub use winmenu::{build_layer_menu, build_send_to_menu, presence_mask, WindowMenuBuilder};
