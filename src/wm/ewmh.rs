//! EWMH (Extended Window Manager Hints) support
//!
//! Reads client state from EWMH properties and sends the client messages
//! that ask the running window manager to act on a window.

use anyhow::Result;
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::shape::ConnectionExt as _;
use x11rb::protocol::xproto::{ClientMessageEvent, *};

use crate::shared::WindowState;
use crate::wm::client_flags::{BorderFlags, StatusFlags, WindowLayer};

/// `_NET_WM_DESKTOP` value of a window on all desktops
pub const ALL_DESKTOPS: u32 = 0xFFFFFFFF;

/// `_NET_WM_STATE` actions
pub const NET_WM_STATE_REMOVE: u32 = 0;
pub const NET_WM_STATE_ADD: u32 = 1;
pub const NET_WM_STATE_TOGGLE: u32 = 2;

/// Source indication for pager-style requests
const SOURCE_PAGER: u32 = 2;

/// ICCCM IconicState
const ICONIC_STATE: u32 = 3;

/// `_NET_WM_MOVERESIZE` directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResizeDirection {
    SizeKeyboard = 9,
    MoveKeyboard = 10,
}

/// Holds all interned atoms
#[derive(Debug)]
pub struct Atoms {
    pub net_supported: Atom,
    pub net_client_list: Atom,
    pub net_number_of_desktops: Atom,
    pub net_desktop_names: Atom,
    pub net_active_window: Atom,
    pub net_close_window: Atom,
    pub net_wm_moveresize: Atom,
    pub net_wm_desktop: Atom,
    pub net_wm_window_type: Atom,
    pub net_wm_window_type_dialog: Atom,
    pub net_wm_state: Atom,
    pub net_wm_state_hidden: Atom,
    pub net_wm_state_maximized_vert: Atom,
    pub net_wm_state_maximized_horz: Atom,
    pub net_wm_state_shaded: Atom,
    pub net_wm_state_sticky: Atom,
    pub net_wm_state_above: Atom,
    pub net_wm_state_below: Atom,
    pub net_wm_allowed_actions: Atom,
    pub net_wm_action_move: Atom,
    pub net_wm_action_resize: Atom,
    pub net_wm_action_minimize: Atom,
    pub net_wm_action_shade: Atom,
    pub net_wm_action_maximize_horz: Atom,
    pub net_wm_action_maximize_vert: Atom,
    pub wm_protocols: Atom,
    pub wm_delete_window: Atom,
    pub wm_change_state: Atom,
    pub utf8_string: Atom,
}

impl Atoms {
    /// Intern all required atoms
    pub fn new<C: Connection>(conn: &C) -> Result<Self> {
        let intern = |name: &str| -> Result<Atom> {
            Ok(conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
        };

        Ok(Self {
            net_supported: intern("_NET_SUPPORTED")?,
            net_client_list: intern("_NET_CLIENT_LIST")?,
            net_number_of_desktops: intern("_NET_NUMBER_OF_DESKTOPS")?,
            net_desktop_names: intern("_NET_DESKTOP_NAMES")?,
            net_active_window: intern("_NET_ACTIVE_WINDOW")?,
            net_close_window: intern("_NET_CLOSE_WINDOW")?,
            net_wm_moveresize: intern("_NET_WM_MOVERESIZE")?,
            net_wm_desktop: intern("_NET_WM_DESKTOP")?,
            net_wm_window_type: intern("_NET_WM_WINDOW_TYPE")?,
            net_wm_window_type_dialog: intern("_NET_WM_WINDOW_TYPE_DIALOG")?,
            net_wm_state: intern("_NET_WM_STATE")?,
            net_wm_state_hidden: intern("_NET_WM_STATE_HIDDEN")?,
            net_wm_state_maximized_vert: intern("_NET_WM_STATE_MAXIMIZED_VERT")?,
            net_wm_state_maximized_horz: intern("_NET_WM_STATE_MAXIMIZED_HORZ")?,
            net_wm_state_shaded: intern("_NET_WM_STATE_SHADED")?,
            net_wm_state_sticky: intern("_NET_WM_STATE_STICKY")?,
            net_wm_state_above: intern("_NET_WM_STATE_ABOVE")?,
            net_wm_state_below: intern("_NET_WM_STATE_BELOW")?,
            net_wm_allowed_actions: intern("_NET_WM_ALLOWED_ACTIONS")?,
            net_wm_action_move: intern("_NET_WM_ACTION_MOVE")?,
            net_wm_action_resize: intern("_NET_WM_ACTION_RESIZE")?,
            net_wm_action_minimize: intern("_NET_WM_ACTION_MINIMIZE")?,
            net_wm_action_shade: intern("_NET_WM_ACTION_SHADE")?,
            net_wm_action_maximize_horz: intern("_NET_WM_ACTION_MAXIMIZE_HORZ")?,
            net_wm_action_maximize_vert: intern("_NET_WM_ACTION_MAXIMIZE_VERT")?,
            wm_protocols: intern("WM_PROTOCOLS")?,
            wm_delete_window: intern("WM_DELETE_WINDOW")?,
            wm_change_state: intern("WM_CHANGE_STATE")?,
            utf8_string: intern("UTF8_STRING")?,
        })
    }

    /// Read a 32-bit list property; missing properties read as `None`
    pub fn get_u32_list<C: Connection>(
        &self,
        conn: &C,
        window: Window,
        property: Atom,
        type_: impl Into<Atom>,
    ) -> Result<Option<Vec<u32>>> {
        let reply = conn
            .get_property(false, window, property, type_, 0, 1024)?
            .reply()?;
        Ok(reply.value32().map(|values| values.collect()))
    }

    /// Read a single CARDINAL property
    pub fn get_cardinal<C: Connection>(
        &self,
        conn: &C,
        window: Window,
        property: Atom,
    ) -> Result<Option<u32>> {
        Ok(self
            .get_u32_list(conn, window, property, AtomEnum::CARDINAL)?
            .and_then(|values| values.first().copied()))
    }

    /// Snapshot a client's state from its properties
    pub fn read_window_state<C: Connection>(
        &self,
        conn: &C,
        window: Window,
    ) -> Result<WindowState> {
        let mut status = StatusFlags::empty();

        let attributes = conn.get_window_attributes(window)?.reply()?;
        if attributes.map_state == MapState::VIEWABLE {
            status |= StatusFlags::MAPPED;
        }

        // No SHAPE extension means nothing is shaped
        let shaped = match conn.shape_query_extents(window) {
            Ok(cookie) => cookie.reply().map(|r| r.bounding_shaped).unwrap_or(false),
            Err(_) => false,
        };
        if shaped {
            status |= StatusFlags::SHAPED;
        }

        let states = self
            .get_u32_list(conn, window, self.net_wm_state, AtomEnum::ATOM)?
            .unwrap_or_default();
        let mut layer = WindowLayer::Normal;
        for atom in &states {
            match *atom {
                a if a == self.net_wm_state_hidden => status |= StatusFlags::MINIMIZED,
                a if a == self.net_wm_state_maximized_horz => status |= StatusFlags::MAXIMIZED_HORZ,
                a if a == self.net_wm_state_maximized_vert => status |= StatusFlags::MAXIMIZED_VERT,
                a if a == self.net_wm_state_shaded => status |= StatusFlags::SHADED,
                a if a == self.net_wm_state_sticky => status |= StatusFlags::STICKY,
                a if a == self.net_wm_state_above => layer = WindowLayer::Above,
                a if a == self.net_wm_state_below => layer = WindowLayer::Below,
                _ => {}
            }
        }

        let desktop = match self.get_cardinal(conn, window, self.net_wm_desktop)? {
            Some(ALL_DESKTOPS) => {
                status |= StatusFlags::STICKY;
                0
            }
            Some(desktop) => desktop,
            None => 0,
        };

        let types = self
            .get_u32_list(conn, window, self.net_wm_window_type, AtomEnum::ATOM)?
            .unwrap_or_default();
        let transient = self
            .get_u32_list(conn, window, AtomEnum::WM_TRANSIENT_FOR.into(), AtomEnum::WINDOW)?
            .is_some_and(|owners| owners.iter().any(|&w| w != 0));
        if types.contains(&self.net_wm_window_type_dialog) || transient {
            status |= StatusFlags::DIALOG;
        }

        let allowed = self.get_u32_list(conn, window, self.net_wm_allowed_actions, AtomEnum::ATOM)?;
        let border = match allowed {
            Some(actions) => self.border_from_allowed_actions(&actions),
            None => BorderFlags::all(),
        };

        let state = WindowState {
            status,
            border,
            layer,
            desktop,
        };
        debug!("Read state of window 0x{:x}: {:?}", window, state);
        Ok(state)
    }

    /// Map `_NET_WM_ALLOWED_ACTIONS` to border permissions
    pub fn border_from_allowed_actions(&self, actions: &[Atom]) -> BorderFlags {
        let mut border = BorderFlags::empty();
        let allowed = |atom: Atom| actions.contains(&atom);

        if allowed(self.net_wm_action_move) {
            border |= BorderFlags::MOVE;
        }
        if allowed(self.net_wm_action_resize) {
            border |= BorderFlags::RESIZE;
        }
        if allowed(self.net_wm_action_minimize) {
            border |= BorderFlags::MIN;
        }
        if allowed(self.net_wm_action_shade) {
            border |= BorderFlags::SHADE;
        }
        if allowed(self.net_wm_action_maximize_horz) && allowed(self.net_wm_action_maximize_vert) {
            border |= BorderFlags::MAX;
        }
        border
    }

    /// Whether the window manager advertises `atom` in `_NET_SUPPORTED`
    pub fn wm_supports<C: Connection>(&self, conn: &C, root: Window, atom: Atom) -> Result<bool> {
        Ok(self
            .get_u32_list(conn, root, self.net_supported, AtomEnum::ATOM)?
            .is_some_and(|supported| supported.contains(&atom)))
    }

    /// Send a client message about `window` to the root window
    pub fn send_root_message<C: Connection>(
        &self,
        conn: &C,
        root: Window,
        window: Window,
        message_type: Atom,
        data: [u32; 5],
    ) -> Result<()> {
        let event = ClientMessageEvent::new(32, window, message_type, data);
        conn.send_event(
            false,
            root,
            EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
            event,
        )?;
        conn.flush()?;
        Ok(())
    }

    /// Ask the window manager to add, remove or toggle up to two states
    pub fn request_state<C: Connection>(
        &self,
        conn: &C,
        root: Window,
        window: Window,
        action: u32,
        first: Atom,
        second: Atom,
    ) -> Result<()> {
        debug!(
            "_NET_WM_STATE request: window=0x{:x}, action={}, atoms=({}, {})",
            window, action, first, second
        );
        self.send_root_message(
            conn,
            root,
            window,
            self.net_wm_state,
            [action, first, second, SOURCE_PAGER, 0],
        )
    }

    pub fn request_desktop<C: Connection>(
        &self,
        conn: &C,
        root: Window,
        window: Window,
        desktop: u32,
    ) -> Result<()> {
        self.send_root_message(
            conn,
            root,
            window,
            self.net_wm_desktop,
            [desktop, SOURCE_PAGER, 0, 0, 0],
        )
    }

    pub fn request_activate<C: Connection>(
        &self,
        conn: &C,
        root: Window,
        window: Window,
    ) -> Result<()> {
        self.send_root_message(
            conn,
            root,
            window,
            self.net_active_window,
            [SOURCE_PAGER, x11rb::CURRENT_TIME, 0, 0, 0],
        )
    }

    pub fn request_iconify<C: Connection>(
        &self,
        conn: &C,
        root: Window,
        window: Window,
    ) -> Result<()> {
        self.send_root_message(conn, root, window, self.wm_change_state, [ICONIC_STATE, 0, 0, 0, 0])
    }

    pub fn request_moveresize<C: Connection>(
        &self,
        conn: &C,
        root: Window,
        window: Window,
        x: i32,
        y: i32,
        direction: MoveResizeDirection,
    ) -> Result<()> {
        debug!(
            "_NET_WM_MOVERESIZE request: window=0x{:x}, ({}, {}), {:?}",
            window, x, y, direction
        );
        self.send_root_message(
            conn,
            root,
            window,
            self.net_wm_moveresize,
            [x as u32, y as u32, direction as u32, 0, SOURCE_PAGER],
        )
    }

    /// Close through the window manager, or directly via WM_DELETE_WINDOW
    pub fn request_close<C: Connection>(
        &self,
        conn: &C,
        root: Window,
        window: Window,
    ) -> Result<()> {
        if self.wm_supports(conn, root, self.net_close_window)? {
            return self.send_root_message(
                conn,
                root,
                window,
                self.net_close_window,
                [x11rb::CURRENT_TIME, SOURCE_PAGER, 0, 0, 0],
            );
        }

        let event = ClientMessageEvent::new(
            32,
            window,
            self.wm_protocols,
            [self.wm_delete_window, x11rb::CURRENT_TIME, 0, 0, 0],
        );
        if let Err(e) = conn.send_event(false, window, EventMask::NO_EVENT, event) {
            // Window may already be gone, which is what close wanted anyway
            debug!("Failed to send WM_DELETE_WINDOW to window 0x{:x}: {}", window, e);
        }
        conn.flush()?;
        Ok(())
    }

    /// `_NET_CLIENT_LIST` of the root window
    pub fn client_list<C: Connection>(&self, conn: &C, root: Window) -> Result<Vec<Window>> {
        Ok(self
            .get_u32_list(conn, root, self.net_client_list, AtomEnum::WINDOW)?
            .unwrap_or_default())
    }

    /// `_NET_DESKTOP_NAMES` split into names
    pub fn desktop_names<C: Connection>(&self, conn: &C, root: Window) -> Result<Vec<String>> {
        let reply = conn
            .get_property(false, root, self.net_desktop_names, self.utf8_string, 0, 4096)?
            .reply()?;
        Ok(split_names(&reply.value))
    }
}

/// Split a NUL-separated name list
fn split_names(raw: &[u8]) -> Vec<String> {
    let mut names: Vec<String> = raw
        .split(|&b| b == 0)
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect();
    if raw.last() == Some(&0) {
        names.pop();
    }
    if raw.is_empty() {
        names.clear();
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_desktop_names() {
        assert_eq!(split_names(b"Web\0Code\0"), vec!["Web", "Code"]);
        assert_eq!(split_names(b"Web\0Code"), vec!["Web", "Code"]);
        assert_eq!(split_names(b"\0Mail\0"), vec!["", "Mail"]);
        assert!(split_names(b"").is_empty());
    }

    /// Atoms with distinct made-up values
    fn test_atoms() -> Atoms {
        Atoms {
            net_supported: 100,
            net_client_list: 101,
            net_number_of_desktops: 102,
            net_desktop_names: 103,
            net_active_window: 104,
            net_close_window: 105,
            net_wm_moveresize: 106,
            net_wm_desktop: 107,
            net_wm_window_type: 108,
            net_wm_window_type_dialog: 109,
            net_wm_state: 110,
            net_wm_state_hidden: 111,
            net_wm_state_maximized_vert: 112,
            net_wm_state_maximized_horz: 113,
            net_wm_state_shaded: 114,
            net_wm_state_sticky: 115,
            net_wm_state_above: 116,
            net_wm_state_below: 117,
            net_wm_allowed_actions: 118,
            net_wm_action_move: 119,
            net_wm_action_resize: 120,
            net_wm_action_minimize: 121,
            net_wm_action_shade: 122,
            net_wm_action_maximize_horz: 123,
            net_wm_action_maximize_vert: 124,
            wm_protocols: 125,
            wm_delete_window: 126,
            wm_change_state: 127,
            utf8_string: 128,
        }
    }

    #[test]
    fn test_allowed_actions_map_to_border() {
        let atoms = test_atoms();
        let actions = [
            atoms.net_wm_action_move,
            atoms.net_wm_action_resize,
            atoms.net_wm_action_minimize,
            atoms.net_wm_action_shade,
            atoms.net_wm_action_maximize_horz,
            atoms.net_wm_action_maximize_vert,
        ];
        assert_eq!(atoms.border_from_allowed_actions(&actions), BorderFlags::all());
        assert_eq!(atoms.border_from_allowed_actions(&[]), BorderFlags::empty());
        assert_eq!(
            atoms.border_from_allowed_actions(&[atoms.net_wm_action_move, atoms.net_wm_state]),
            BorderFlags::MOVE
        );
    }

    #[test]
    fn test_maximize_needs_both_axes() {
        let atoms = test_atoms();
        let horz = atoms.border_from_allowed_actions(&[atoms.net_wm_action_maximize_horz]);
        let vert = atoms.border_from_allowed_actions(&[atoms.net_wm_action_maximize_vert]);
        assert!(!horz.contains(BorderFlags::MAX));
        assert!(!vert.contains(BorderFlags::MAX));

        let both = atoms.border_from_allowed_actions(&[
            atoms.net_wm_action_maximize_vert,
            atoms.net_wm_action_maximize_horz,
        ]);
        assert_eq!(both, BorderFlags::MAX);
    }
}
