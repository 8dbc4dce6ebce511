//! Window state snapshot
//!
//! The read-only view of a managed window the menu builder works from.
//! The window manager owns the live state; a snapshot is taken once per
//! menu build and never mutated while the menu is being derived.

use crate::wm::client_flags::{BorderFlags, StatusFlags, WindowLayer};

/// Snapshot of a client's status, border permissions, layer and desktop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowState {
    pub status: StatusFlags,
    pub border: BorderFlags,
    pub layer: WindowLayer,
    /// Desktop index (0-based)
    pub desktop: u32,
}

impl WindowState {
    pub fn new(status: StatusFlags, border: BorderFlags) -> Self {
        Self {
            status,
            border,
            layer: WindowLayer::Normal,
            desktop: 0,
        }
    }

    /// A mapped top-level window that allows every action
    pub fn mapped() -> Self {
        Self::new(StatusFlags::MAPPED, BorderFlags::all())
    }

    pub fn with_status(mut self, status: StatusFlags) -> Self {
        self.status |= status;
        self
    }

    pub fn without_border(mut self, border: BorderFlags) -> Self {
        self.border.remove(border);
        self
    }

    pub fn on_desktop(mut self, desktop: u32) -> Self {
        self.desktop = desktop;
        self
    }

    pub fn is_dialog(&self) -> bool {
        self.status.contains(StatusFlags::DIALOG)
    }

    pub fn is_sticky(&self) -> bool {
        self.status.contains(StatusFlags::STICKY)
    }

    pub fn is_minimized(&self) -> bool {
        self.status.contains(StatusFlags::MINIMIZED)
    }

    pub fn is_shaded(&self) -> bool {
        self.status.contains(StatusFlags::SHADED)
    }

    pub fn is_maximized(&self) -> bool {
        self.status.is_maximized()
    }

    pub fn can(&self, border: BorderFlags) -> bool {
        self.border.contains(border)
    }
}
