//! Display Module
//!
//! X11 connection, atoms and root window, plus the pointer grab, event
//! source and client registry the window chooser runs against.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use crate::shared::WindowState;
use crate::wm::action::WindowId;
use crate::wm::chooser::{ChooseEvent, SelectionPointer, WindowRegistry};
use crate::wm::ewmh::Atoms;

/// Display connection and global state
pub struct X11Display {
    conn: RustConnection,
    root: Window,
    pub atoms: Atoms,
}

impl X11Display {
    /// Connect to the X server (`None` uses `$DISPLAY`)
    pub fn connect(display: Option<&str>) -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(display)
            .context("Failed to connect to X server")?;
        let root = conn.setup().roots[screen_num].root;
        let atoms = Atoms::new(&conn).context("Failed to intern atoms")?;

        info!("Connected to X server (screen {}, root 0x{:x})", screen_num, root);

        Ok(Self { conn, root, atoms })
    }

    pub fn conn(&self) -> &RustConnection {
        &self.conn
    }

    pub fn root(&self) -> Window {
        self.root
    }

    pub fn read_window_state(&self, window: Window) -> Result<WindowState> {
        self.atoms
            .read_window_state(&self.conn, window)
            .with_context(|| format!("Failed to read state of window 0x{:x}", window))
    }

    /// `_NET_NUMBER_OF_DESKTOPS`, if the window manager publishes it
    pub fn desktop_count(&self) -> Result<Option<u32>> {
        self.atoms
            .get_cardinal(&self.conn, self.root, self.atoms.net_number_of_desktops)
    }

    pub fn desktop_names(&self) -> Result<Vec<String>> {
        self.atoms.desktop_names(&self.conn, self.root)
    }

    /// Pointer position in root coordinates
    pub fn pointer_position(&self) -> Result<(i32, i32)> {
        let reply = self.conn.query_pointer(self.root)?.reply()?;
        Ok((i32::from(reply.root_x), i32::from(reply.root_y)))
    }
}

/// Selection grab on a display's root window
pub struct X11Selection<'d> {
    display: &'d X11Display,
}

impl<'d> X11Selection<'d> {
    pub fn new(display: &'d X11Display) -> Self {
        Self { display }
    }
}

/// Grab the pointer, then the keyboard
///
/// A held pointer grab is released again when the keyboard grab fails for
/// any reason, so a failed call never leaves a grab behind.
fn grab_in_order(
    grab_pointer: impl FnOnce() -> Result<()>,
    grab_keyboard: impl FnOnce() -> Result<()>,
    release_pointer: impl FnOnce(),
) -> Result<()> {
    grab_pointer()?;
    if let Err(e) = grab_keyboard() {
        release_pointer();
        return Err(e);
    }
    Ok(())
}

impl SelectionPointer for X11Selection<'_> {
    fn grab_for_selection(&mut self) -> Result<()> {
        let X11Display { conn, root, .. } = self.display;

        let grab_pointer = || -> Result<()> {
            let status = conn
                .grab_pointer(
                    false,
                    *root,
                    EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE,
                    GrabMode::ASYNC,
                    GrabMode::ASYNC,
                    x11rb::NONE,
                    x11rb::NONE,
                    x11rb::CURRENT_TIME,
                )?
                .reply()?
                .status;
            if status != GrabStatus::SUCCESS {
                anyhow::bail!("pointer grab refused: {:?}", status);
            }
            Ok(())
        };

        // Key presses cancel, so the keyboard is grabbed too
        let grab_keyboard = || -> Result<()> {
            let status = conn
                .grab_keyboard(
                    false,
                    *root,
                    x11rb::CURRENT_TIME,
                    GrabMode::ASYNC,
                    GrabMode::ASYNC,
                )?
                .reply()?
                .status;
            if status != GrabStatus::SUCCESS {
                anyhow::bail!("keyboard grab refused: {:?}", status);
            }
            Ok(())
        };

        let release_pointer = || {
            let released = conn
                .ungrab_pointer(x11rb::CURRENT_TIME)
                .and_then(|_| conn.flush());
            if let Err(e) = released {
                warn!("Failed to release pointer grab: {}", e);
            }
        };

        grab_in_order(grab_pointer, grab_keyboard, release_pointer)?;
        debug!("Grabbed pointer and keyboard for window selection");
        Ok(())
    }

    fn ungrab_pointer(&mut self) {
        let conn = &self.display.conn;
        let released = conn
            .ungrab_keyboard(x11rb::CURRENT_TIME)
            .and_then(|_| conn.ungrab_pointer(x11rb::CURRENT_TIME))
            .and_then(|_| conn.flush());
        match released {
            Ok(()) => debug!("Released selection grab"),
            Err(e) => warn!("Failed to release selection grab: {}", e),
        }
    }

    fn wait_for_event(&mut self) -> Result<ChooseEvent> {
        let event = match self.display.conn.wait_for_event()? {
            Event::ButtonPress(press) => ChooseEvent::ButtonPress {
                button: press.detail,
                target: (press.child != x11rb::NONE).then_some(press.child),
            },
            Event::KeyPress(_) => ChooseEvent::KeyPress,
            _ => ChooseEvent::Other,
        };
        Ok(event)
    }
}

impl WindowRegistry for X11Display {
    /// Managed client for a top-level window: itself, or the client a
    /// reparenting window manager put inside its frame
    fn resolve_window_at(&self, handle: WindowId) -> Option<WindowId> {
        let clients = match self.atoms.client_list(&self.conn, self.root) {
            Ok(clients) => clients,
            Err(e) => {
                warn!("Failed to read _NET_CLIENT_LIST: {}", e);
                return None;
            }
        };

        if clients.contains(&handle) {
            return Some(handle);
        }

        let children = self.conn.query_tree(handle).ok()?.reply().ok()?.children;
        children.into_iter().find(|child| clients.contains(child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn run(pointer_ok: bool, keyboard_ok: bool) -> (Result<()>, Vec<&'static str>) {
        let calls = RefCell::new(Vec::new());
        let result = grab_in_order(
            || {
                calls.borrow_mut().push("grab pointer");
                if pointer_ok { Ok(()) } else { Err(anyhow::anyhow!("pointer refused")) }
            },
            || {
                calls.borrow_mut().push("grab keyboard");
                if keyboard_ok { Ok(()) } else { Err(anyhow::anyhow!("connection lost")) }
            },
            || calls.borrow_mut().push("release pointer"),
        );
        (result, calls.into_inner())
    }

    #[test]
    fn test_both_grabs_held() {
        let (result, calls) = run(true, true);
        assert!(result.is_ok());
        assert_eq!(calls, vec!["grab pointer", "grab keyboard"]);
    }

    #[test]
    fn test_keyboard_failure_releases_pointer() {
        let (result, calls) = run(true, false);
        assert_eq!(result.unwrap_err().to_string(), "connection lost");
        assert_eq!(calls, vec!["grab pointer", "grab keyboard", "release pointer"]);
    }

    #[test]
    fn test_pointer_failure_stops_early() {
        let (result, calls) = run(false, true);
        assert!(result.is_err());
        assert_eq!(calls, vec!["grab pointer"]);
    }
}
