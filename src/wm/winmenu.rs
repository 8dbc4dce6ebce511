//! Window Menu Module
//!
//! Derives a window's context menu from its state. The menu is rebuilt on
//! every invocation so it always reflects the actions currently allowed.

use anyhow::Result;
use tracing::{debug, warn};

use crate::shared::WindowState;
use crate::wm::action::{
    run_action, ActionBinding, ActionContext, ActionExecutor, ActionKind, Toggle,
};
use crate::wm::client_flags::{BorderFlags, StatusFlags, WindowLayer};
use crate::wm::desktop::DesktopMenuFactory;
use crate::wm::menu::{Menu, MenuItem, MenuLayoutEngine, MenuWidget};

/// Desktops addressable by the presence mask
pub const MAX_DESKTOPS: u32 = u32::BITS;

/// Builds window menus against a fixed desktop configuration
pub struct WindowMenuBuilder<'a> {
    desktop_count: u32,
    desktops: &'a dyn DesktopMenuFactory,
}

impl<'a> WindowMenuBuilder<'a> {
    pub fn new(desktop_count: u32, desktops: &'a dyn DesktopMenuFactory) -> Self {
        Self {
            desktop_count,
            desktops,
        }
    }

    /// Build the menu for a state snapshot
    pub fn build(&self, state: &WindowState) -> Menu {
        let status = state.status;
        let mut menu = Menu::new();

        if !state.is_dialog() {
            let stick = if state.is_sticky() { "Unstick" } else { "Stick" };
            menu.push(MenuItem::normal(
                stick,
                ActionBinding::toggle(ActionKind::Stick, Toggle::flipping(state.is_sticky())),
            ));

            menu.push(MenuItem::submenu("Layer", build_layer_menu(state.layer)));

            if !state.is_sticky() {
                menu.push(build_send_to_menu(
                    state.desktop,
                    false,
                    self.desktop_count,
                    self.desktops,
                ));
            }
        }

        if state.can(BorderFlags::MAX) && status.is_visible() {
            let maximized = state.is_maximized();
            let label = if maximized { "Restore" } else { "Maximize" };
            menu.push(MenuItem::normal(
                label,
                ActionBinding::toggle(ActionKind::Maximize, Toggle::flipping(maximized)),
            ));

            if !maximized {
                menu.push(MenuItem::normal(
                    "Maximize-x",
                    ActionBinding::plain(ActionKind::MaximizeHorizontal),
                ));
                menu.push(MenuItem::normal(
                    "Maximize-y",
                    ActionBinding::plain(ActionKind::MaximizeVertical),
                ));
            }
        }

        if state.is_shaded() {
            menu.push(MenuItem::normal(
                "Unshade",
                ActionBinding::toggle(ActionKind::Shade, Toggle::Off),
            ));
        } else if state.can(BorderFlags::SHADE) {
            menu.push(MenuItem::normal(
                "Shade",
                ActionBinding::toggle(ActionKind::Shade, Toggle::On),
            ));
        }

        if state.is_minimized() {
            menu.push(MenuItem::normal(
                "Restore",
                ActionBinding::toggle(ActionKind::Minimize, Toggle::Off),
            ));
        } else if state.can(BorderFlags::MIN) {
            menu.push(MenuItem::normal(
                "Minimize",
                ActionBinding::toggle(ActionKind::Minimize, Toggle::On),
            ));
        }

        let pinned = status.intersects(StatusFlags::MINIMIZED | StatusFlags::maximized());
        if !pinned && status.is_visible() {
            if state.can(BorderFlags::RESIZE) {
                menu.push(MenuItem::normal("Resize", ActionBinding::plain(ActionKind::Resize)));
            }
            if state.can(BorderFlags::MOVE) {
                menu.push(MenuItem::normal("Move", ActionBinding::plain(ActionKind::Move)));
            }
        }

        if !state.is_dialog() {
            menu.push(MenuItem::Separator);
            menu.push(MenuItem::normal("Kill", ActionBinding::plain(ActionKind::Kill)));
            menu.push(MenuItem::normal("Close", ActionBinding::plain(ActionKind::Close)));
        }

        debug!("Built window menu with {} items ({:?})", menu.len(), status);
        menu
    }

    /// Width and height the layout engine gives this window's menu
    pub fn menu_size(&self, state: &WindowState, layout: &dyn MenuLayoutEngine) -> (u32, u32) {
        let mut menu = self.build(state);
        layout.initialize(&mut menu);
        menu.size().unwrap_or((0, 0))
    }

    /// Build, lay out and show the menu, then run whatever was chosen
    pub fn show(
        &self,
        state: &WindowState,
        context: &ActionContext<'_>,
        layout: &dyn MenuLayoutEngine,
        widget: &mut dyn MenuWidget,
        executor: &mut dyn ActionExecutor,
    ) -> Result<()> {
        let mut menu = self.build(state);
        layout.initialize(&mut menu);

        debug!(
            "Showing window menu for window 0x{:x} at ({}, {})",
            context.window, context.x, context.y
        );

        match widget.show(context, &menu)? {
            Some(binding) => run_action(context, &binding, executor),
            None => {
                debug!("Window menu dismissed");
                Ok(())
            }
        }
    }
}

/// Layer submenu: Above, Normal, Below with the current layer bracketed
pub fn build_layer_menu(current: WindowLayer) -> Menu {
    let mut menu = Menu::new();
    for layer in WindowLayer::DISPLAY_ORDER {
        let label = if layer == current {
            format!("[{}]", layer.label())
        } else {
            layer.label().to_string()
        };
        menu.push(MenuItem::normal(label, ActionBinding::set_layer(layer)));
    }
    menu
}

/// Desktops a window counts as present on; sticky windows are on all of them
pub fn presence_mask(desktop: u32, sticky: bool, desktop_count: u32) -> u32 {
    let count = if desktop_count > MAX_DESKTOPS {
        warn!(
            "Desktop count {} exceeds presence mask width, using {}",
            desktop_count, MAX_DESKTOPS
        );
        MAX_DESKTOPS
    } else {
        desktop_count
    };

    (0..count)
        .filter(|&i| sticky || desktop == i)
        .fold(0u32, |mask, i| mask | (1 << i))
}

/// "Send To" submenu around the desktop factory's menu
pub fn build_send_to_menu(
    desktop: u32,
    sticky: bool,
    desktop_count: u32,
    factory: &dyn DesktopMenuFactory,
) -> MenuItem {
    let mask = presence_mask(desktop, sticky, desktop_count);
    MenuItem::submenu("Send To", factory.create_desktop_menu(mask))
}
