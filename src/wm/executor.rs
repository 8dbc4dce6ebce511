//! Executor Module
//!
//! Carries out menu actions by asking the running window manager through
//! EWMH client messages.

use anyhow::{Context, Result};
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::ConnectionExt as _;

use crate::shared::WindowState;
use crate::wm::action::{ActionBinding, ActionExecutor, ActionKind, Toggle, WindowId};
use crate::wm::client_flags::WindowLayer;
use crate::wm::display::X11Display;
use crate::wm::ewmh::{
    MoveResizeDirection, NET_WM_STATE_ADD, NET_WM_STATE_REMOVE, NET_WM_STATE_TOGGLE,
};

/// EWMH action executor
pub struct X11Executor<'d> {
    display: &'d X11Display,
}

impl<'d> X11Executor<'d> {
    pub fn new(display: &'d X11Display) -> Self {
        Self { display }
    }

    /// Start a keyboard-driven move
    pub fn begin_move(&self, window: WindowId, x: i32, y: i32) -> Result<()> {
        let display = self.display;
        display.atoms.request_moveresize(
            display.conn(),
            display.root(),
            window,
            x,
            y,
            MoveResizeDirection::MoveKeyboard,
        )
    }

    /// Start a keyboard-driven resize
    pub fn begin_resize(&self, window: WindowId, x: i32, y: i32) -> Result<()> {
        let display = self.display;
        display.atoms.request_moveresize(
            display.conn(),
            display.root(),
            window,
            x,
            y,
            MoveResizeDirection::SizeKeyboard,
        )
    }

    fn state(&self, window: WindowId, action: u32, first: u32, second: u32) -> Result<()> {
        let display = self.display;
        display
            .atoms
            .request_state(display.conn(), display.root(), window, action, first, second)
    }

    fn set_layer(&self, window: WindowId, layer: WindowLayer) -> Result<()> {
        let atoms = &self.display.atoms;
        match layer {
            WindowLayer::Above => {
                self.state(window, NET_WM_STATE_REMOVE, atoms.net_wm_state_below, 0)?;
                self.state(window, NET_WM_STATE_ADD, atoms.net_wm_state_above, 0)
            }
            WindowLayer::Normal => self.state(
                window,
                NET_WM_STATE_REMOVE,
                atoms.net_wm_state_above,
                atoms.net_wm_state_below,
            ),
            WindowLayer::Below => {
                self.state(window, NET_WM_STATE_REMOVE, atoms.net_wm_state_above, 0)?;
                self.state(window, NET_WM_STATE_ADD, atoms.net_wm_state_below, 0)
            }
        }
    }

    /// Recorded effect of a toggle binding, or the one the window's
    /// current state calls for
    fn effect(&self, window: WindowId, binding: &ActionBinding) -> Result<Toggle> {
        match binding.toggle_effect() {
            Some(toggle) => Ok(toggle),
            None => {
                let state = self.display.read_window_state(window)?;
                Ok(resolve_toggle(binding.kind(), None, &state))
            }
        }
    }

    fn minimize(&self, window: WindowId, toggle: Toggle) -> Result<()> {
        let display = self.display;
        match toggle {
            Toggle::On => display.atoms.request_iconify(display.conn(), display.root(), window),
            Toggle::Off => display.atoms.request_activate(display.conn(), display.root(), window),
        }
    }
}

/// Effect of a toggle action on a window in `state`
///
/// A recorded effect wins. Otherwise the action flips what the state shows,
/// so a window maximized along either axis is restored.
fn resolve_toggle(kind: ActionKind, toggle: Option<Toggle>, state: &WindowState) -> Toggle {
    toggle.unwrap_or_else(|| {
        let active = match kind {
            ActionKind::Minimize => state.is_minimized(),
            ActionKind::Maximize => state.is_maximized(),
            ActionKind::Shade => state.is_shaded(),
            ActionKind::Stick => state.is_sticky(),
            _ => false,
        };
        Toggle::flipping(active)
    })
}

/// `_NET_WM_STATE` action for a toggle effect
fn state_action(toggle: Toggle) -> u32 {
    match toggle {
        Toggle::On => NET_WM_STATE_ADD,
        Toggle::Off => NET_WM_STATE_REMOVE,
    }
}

impl ActionExecutor for X11Executor<'_> {
    fn execute(&mut self, window: WindowId, binding: &ActionBinding) -> Result<()> {
        let display = self.display;
        let atoms = &display.atoms;

        debug!("Executing {:?} on window 0x{:x}", binding, window);

        match binding.kind() {
            // Move and Resize run through the context's delegates
            ActionKind::None | ActionKind::Move | ActionKind::Resize => Ok(()),
            ActionKind::Close => atoms.request_close(display.conn(), display.root(), window),
            ActionKind::Kill => {
                display.conn().kill_client(window)?;
                display.conn().flush()?;
                Ok(())
            }
            ActionKind::Minimize => {
                let toggle = self.effect(window, binding)?;
                self.minimize(window, toggle)
            }
            ActionKind::Shade => {
                let action = state_action(self.effect(window, binding)?);
                self.state(window, action, atoms.net_wm_state_shaded, 0)
            }
            ActionKind::Maximize => {
                let action = state_action(self.effect(window, binding)?);
                self.state(
                    window,
                    action,
                    atoms.net_wm_state_maximized_horz,
                    atoms.net_wm_state_maximized_vert,
                )
            }
            ActionKind::MaximizeHorizontal => {
                self.state(window, NET_WM_STATE_TOGGLE, atoms.net_wm_state_maximized_horz, 0)
            }
            ActionKind::MaximizeVertical => {
                self.state(window, NET_WM_STATE_TOGGLE, atoms.net_wm_state_maximized_vert, 0)
            }
            ActionKind::Stick => {
                let action = state_action(self.effect(window, binding)?);
                self.state(window, action, atoms.net_wm_state_sticky, 0)
            }
            ActionKind::SetLayer => {
                let layer = binding
                    .layer()
                    .with_context(|| format!("invalid layer {:?}", binding.string_param()))?;
                self.set_layer(window, layer)
            }
            ActionKind::SendToDesktop => {
                let desktop = binding
                    .desktop()
                    .with_context(|| format!("invalid desktop {:?}", binding.numeric_param()))?;
                atoms.request_desktop(display.conn(), display.root(), window, desktop)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::client_flags::StatusFlags;

    #[test]
    fn test_toggle_maps_to_state_action() {
        assert_eq!(state_action(Toggle::On), NET_WM_STATE_ADD);
        assert_eq!(state_action(Toggle::Off), NET_WM_STATE_REMOVE);
    }

    #[test]
    fn test_recorded_effect_wins_over_state() {
        let maximized = WindowState::mapped().with_status(StatusFlags::maximized());
        assert_eq!(
            resolve_toggle(ActionKind::Maximize, Some(Toggle::On), &maximized),
            Toggle::On
        );
    }

    #[test]
    fn test_half_maximized_window_is_restored() {
        let plain = WindowState::mapped();
        assert_eq!(resolve_toggle(ActionKind::Maximize, None, &plain), Toggle::On);

        for axis in [StatusFlags::MAXIMIZED_HORZ, StatusFlags::MAXIMIZED_VERT] {
            let state = plain.with_status(axis);
            assert_eq!(resolve_toggle(ActionKind::Maximize, None, &state), Toggle::Off);
            assert_eq!(
                state_action(resolve_toggle(ActionKind::Maximize, None, &state)),
                NET_WM_STATE_REMOVE
            );
        }
    }

    #[test]
    fn test_unrecorded_effects_follow_state() {
        let plain = WindowState::mapped();
        let all = plain
            .with_status(StatusFlags::MINIMIZED | StatusFlags::SHADED | StatusFlags::STICKY);

        for kind in [ActionKind::Minimize, ActionKind::Shade, ActionKind::Stick] {
            assert_eq!(resolve_toggle(kind, None, &plain), Toggle::On, "{:?}", kind);
            assert_eq!(resolve_toggle(kind, None, &all), Toggle::Off, "{:?}", kind);
        }
    }
}
