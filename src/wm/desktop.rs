//! Desktop Menu Module
//!
//! Builds the desktop list used by the "Send To" submenu.

use tracing::debug;

use crate::wm::action::ActionBinding;
use crate::wm::menu::{Menu, MenuItem};

/// Builds a desktop menu given the desktops a window is present on
pub trait DesktopMenuFactory {
    /// Bit `i` of `presence` is set when the window is on desktop `i`
    fn create_desktop_menu(&self, presence: u32) -> Menu;
}

/// Desktop menu over a list of workspace names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceMenu {
    names: Vec<String>,
}

impl WorkspaceMenu {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// "Workspace 1" .. "Workspace N"
    pub fn numbered(count: u32) -> Self {
        Self::new((0..count).map(|i| format!("Workspace {}", i + 1)).collect())
    }

    /// Use `names` where given and number the rest
    pub fn with_fallback(count: u32, names: &[String]) -> Self {
        let names = (0..count as usize)
            .map(|i| match names.get(i) {
                Some(name) if !name.is_empty() => name.clone(),
                _ => format!("Workspace {}", i + 1),
            })
            .collect();
        Self::new(names)
    }

    pub fn count(&self) -> u32 {
        self.names.len() as u32
    }
}

impl DesktopMenuFactory for WorkspaceMenu {
    fn create_desktop_menu(&self, presence: u32) -> Menu {
        debug!("Creating desktop menu (presence=0b{:b})", presence);

        let mut menu = Menu::new();
        for (index, name) in self.names.iter().enumerate() {
            // Desktops past the mask width are never marked present
            let present = index < u32::BITS as usize && presence & (1 << index) != 0;
            let label = if present {
                format!("[{}]", name)
            } else {
                name.clone()
            };
            menu.push(MenuItem::normal(label, ActionBinding::send_to_desktop(index as u32)));
        }
        menu
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::action::ActionKind;

    #[test]
    fn test_present_desktops_are_bracketed() {
        let menu = WorkspaceMenu::numbered(3).create_desktop_menu(0b010);
        assert_eq!(menu.labels(), vec!["Workspace 1", "[Workspace 2]", "Workspace 3"]);

        let binding = menu.items[2].binding().unwrap();
        assert_eq!(binding.kind(), ActionKind::SendToDesktop);
        assert_eq!(binding.desktop(), Some(2));
    }

    #[test]
    fn test_desktops_beyond_mask_width_are_listed() {
        let menu = WorkspaceMenu::numbered(40).create_desktop_menu(u32::MAX);
        assert_eq!(menu.len(), 40);

        let labels = menu.labels();
        assert_eq!(labels[31], "[Workspace 32]");
        assert_eq!(labels[32], "Workspace 33");
        assert_eq!(labels[39], "Workspace 40");
        assert_eq!(menu.items[39].binding().and_then(|b| b.desktop()), Some(39));
    }

    #[test]
    fn test_fallback_names_fill_gaps() {
        let names = vec!["Web".to_string(), String::new()];
        let desktops = WorkspaceMenu::with_fallback(3, &names);
        assert_eq!(desktops.count(), 3);
        assert_eq!(
            desktops.create_desktop_menu(0).labels(),
            vec!["Web", "Workspace 2", "Workspace 3"]
        );
    }
}
