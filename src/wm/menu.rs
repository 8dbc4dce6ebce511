//! Menu Module
//!
//! Generic menu tree populated by the window menu builder, plus the seams
//! to the widget that lays it out and shows it.

use std::fmt;

use anyhow::Result;
use serde::Serialize;

use crate::config::LayoutConfig;
use crate::wm::action::{ActionBinding, ActionContext};

/// Menu item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MenuItem {
    Normal { label: String, binding: ActionBinding },
    Separator,
    Submenu { label: String, menu: Menu },
}

impl MenuItem {
    pub fn normal(label: impl Into<String>, binding: ActionBinding) -> Self {
        Self::Normal {
            label: label.into(),
            binding,
        }
    }

    pub fn submenu(label: impl Into<String>, menu: Menu) -> Self {
        Self::Submenu {
            label: label.into(),
            menu,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Normal { label, .. } | Self::Submenu { label, .. } => Some(label),
            Self::Separator => None,
        }
    }

    pub fn binding(&self) -> Option<&ActionBinding> {
        match self {
            Self::Normal { binding, .. } => Some(binding),
            _ => None,
        }
    }

    pub fn child(&self) -> Option<&Menu> {
        match self {
            Self::Submenu { menu, .. } => Some(menu),
            _ => None,
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, Self::Separator)
    }
}

/// Layout computed by the widget (never by the builder)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuLayout {
    pub width: u32,
    pub height: u32,
    pub item_height: u32,
}

/// Ordered menu tree; each menu owns its items and submenus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Menu {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub items: Vec<MenuItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<MenuLayout>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: MenuItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MenuItem> {
        self.items.iter()
    }

    /// Labels in display order, separators shown as "-"
    pub fn labels(&self) -> Vec<&str> {
        self.items
            .iter()
            .map(|item| item.label().unwrap_or("-"))
            .collect()
    }

    /// First submenu with the given label
    pub fn submenu(&self, label: &str) -> Option<&Menu> {
        self.items
            .iter()
            .find(|item| item.label() == Some(label))
            .and_then(MenuItem::child)
    }

    /// First normal item with the given label
    pub fn find(&self, label: &str) -> Option<&MenuItem> {
        self.items
            .iter()
            .find(|item| matches!(item, MenuItem::Normal { .. }) && item.label() == Some(label))
    }

    /// Width and height, once laid out
    pub fn size(&self) -> Option<(u32, u32)> {
        self.layout.map(|l| (l.width, l.height))
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for item in &self.items {
            let indent = "  ".repeat(depth);
            match item {
                MenuItem::Normal { label, .. } => writeln!(f, "{}{}", indent, label)?,
                MenuItem::Separator => writeln!(f, "{}----", indent)?,
                MenuItem::Submenu { label, menu } => {
                    writeln!(f, "{}{} >", indent, label)?;
                    menu.write_tree(f, depth + 1)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

/// Computes the layout fields of a menu tree
pub trait MenuLayoutEngine {
    fn initialize(&self, menu: &mut Menu);
}

/// Shows a laid-out menu and returns the chosen binding
pub trait MenuWidget {
    fn show(&mut self, context: &ActionContext<'_>, menu: &Menu) -> Result<Option<ActionBinding>>;
}

/// Fixed-metric text layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLayout {
    pub char_width: u32,
    pub item_height: u32,
    pub separator_height: u32,
    pub padding: u32,
}

impl TextLayout {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            char_width: config.char_width,
            item_height: config.item_height,
            separator_height: config.separator_height,
            padding: config.padding,
        }
    }
}

impl Default for TextLayout {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl MenuLayoutEngine for TextLayout {
    fn initialize(&self, menu: &mut Menu) {
        let mut text_width = 0u32;
        let mut height = 0u32;

        for item in &mut menu.items {
            match item {
                MenuItem::Normal { label, .. } => {
                    text_width = text_width.max(label.chars().count() as u32 * self.char_width);
                    height += self.item_height;
                }
                MenuItem::Separator => height += self.separator_height,
                MenuItem::Submenu { label, menu } => {
                    // Room for the submenu arrow
                    let chars = label.chars().count() as u32 + 2;
                    text_width = text_width.max(chars * self.char_width);
                    height += self.item_height;
                    self.initialize(menu);
                }
            }
        }

        menu.layout = Some(MenuLayout {
            width: text_width + 2 * self.padding,
            height: height + 2 * self.padding,
            item_height: self.item_height,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::action::ActionKind;

    fn sample() -> Menu {
        let mut layer = Menu::new();
        layer.push(MenuItem::normal("Above", ActionBinding::plain(ActionKind::None)));

        let mut menu = Menu::new();
        menu.push(MenuItem::normal("Close", ActionBinding::plain(ActionKind::Close)));
        menu.push(MenuItem::Separator);
        menu.push(MenuItem::submenu("Layer", layer));
        menu
    }

    #[test]
    fn test_labels_and_lookup() {
        let menu = sample();
        assert_eq!(menu.labels(), vec!["Close", "-", "Layer"]);
        assert_eq!(menu.submenu("Layer").map(Menu::len), Some(1));
        assert!(menu.submenu("Close").is_none());
        assert_eq!(
            menu.find("Close").and_then(MenuItem::binding).map(ActionBinding::kind),
            Some(ActionKind::Close)
        );
        assert!(menu.find("Layer").is_none());
    }

    #[test]
    fn test_text_layout_sizes_tree() {
        let layout = TextLayout {
            char_width: 10,
            item_height: 20,
            separator_height: 5,
            padding: 2,
        };
        let mut menu = sample();
        layout.initialize(&mut menu);

        // "Layer" plus arrow is the widest entry: 7 chars
        assert_eq!(menu.size(), Some((70 + 4, 20 + 5 + 20 + 4)));
        assert_eq!(menu.submenu("Layer").and_then(Menu::size), Some((50 + 4, 20 + 4)));
    }

    #[test]
    fn test_text_layout_of_empty_menu_is_padding() {
        let layout = TextLayout::default();
        let mut menu = Menu::new();
        layout.initialize(&mut menu);
        let pad = 2 * layout.padding;
        assert_eq!(menu.size(), Some((pad, pad)));
    }

    #[test]
    fn test_display_indents_submenus() {
        let text = sample().to_string();
        assert_eq!(text, "Close\n----\nLayer >\n  Above\n");
    }
}
