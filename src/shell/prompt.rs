//! Terminal menu prompt
//!
//! Shows a menu as a numbered list and reads the selection from a line
//! of input. Submenus open in place; an empty line or `q` dismisses.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::debug;

use crate::wm::action::{ActionBinding, ActionContext};
use crate::wm::menu::{Menu, MenuItem, MenuWidget};

pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn print_menu(&mut self, menu: &Menu) -> Result<()> {
        let mut number = 0;
        for item in menu.iter() {
            match item {
                MenuItem::Separator => writeln!(self.output, "    ----")?,
                MenuItem::Normal { label, .. } => {
                    number += 1;
                    writeln!(self.output, "{:>3} {}", number, label)?;
                }
                MenuItem::Submenu { label, .. } => {
                    number += 1;
                    writeln!(self.output, "{:>3} {} >", number, label)?;
                }
            }
        }
        write!(self.output, "> ")?;
        self.output.flush()?;
        Ok(())
    }

    /// Selectable items (everything but separators) by 1-based number
    fn selectable(menu: &Menu, number: usize) -> Option<&MenuItem> {
        menu.iter()
            .filter(|item| !item.is_separator())
            .nth(number.checked_sub(1)?)
    }

    fn choose(&mut self, menu: &Menu) -> Result<Option<ActionBinding>> {
        loop {
            self.print_menu(menu)?;

            let mut line = String::new();
            let read = self.input.read_line(&mut line).context("Failed to read selection")?;
            let answer = line.trim();
            if read == 0 || answer.is_empty() || answer == "q" {
                return Ok(None);
            }

            let item = answer
                .parse::<usize>()
                .ok()
                .and_then(|number| Self::selectable(menu, number));

            match item {
                Some(MenuItem::Normal { binding, .. }) => return Ok(Some(binding.clone())),
                Some(MenuItem::Submenu { label, menu: child }) => {
                    writeln!(self.output, "{}:", label)?;
                    if let Some(binding) = self.choose(child)? {
                        return Ok(Some(binding));
                    }
                }
                _ => writeln!(self.output, "no such item: {}", answer)?,
            }
        }
    }
}

impl<R: BufRead, W: Write> MenuWidget for TerminalPrompt<R, W> {
    fn show(&mut self, context: &ActionContext<'_>, menu: &Menu) -> Result<Option<ActionBinding>> {
        debug!("Prompting for window 0x{:x}", context.window);
        writeln!(self.output, "Window 0x{:x}", context.window)?;
        self.choose(menu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::action::{ActionKind, WindowId};
    use crate::wm::client_flags::WindowLayer;
    use crate::wm::winmenu::build_layer_menu;
    use std::io::Cursor;

    fn sample() -> Menu {
        let mut menu = Menu::new();
        menu.push(MenuItem::submenu("Layer", build_layer_menu(WindowLayer::Normal)));
        menu.push(MenuItem::Separator);
        menu.push(MenuItem::normal("Close", ActionBinding::plain(ActionKind::Close)));
        menu
    }

    fn prompt(input: &str) -> (Option<ActionBinding>, String) {
        let noop = |_: WindowId, _: i32, _: i32| -> Result<()> { Ok(()) };
        let context = ActionContext::new(0xabc, 0, 0, &noop, &noop);
        let mut widget = TerminalPrompt::new(Cursor::new(input.to_string()), Vec::new());
        let chosen = widget.show(&context, &sample()).unwrap();
        let output = String::from_utf8(widget.into_output()).unwrap();
        (chosen, output)
    }

    #[test]
    fn test_numbers_skip_separators() {
        let (chosen, output) = prompt("2\n");
        assert_eq!(chosen.map(|b| b.kind()), Some(ActionKind::Close));
        assert!(output.starts_with("Window 0xabc\n  1 Layer >\n    ----\n  2 Close\n"));
    }

    #[test]
    fn test_submenu_selection() {
        let (chosen, _) = prompt("1\n3\n");
        assert_eq!(chosen, Some(ActionBinding::set_layer(WindowLayer::Below)));
    }

    #[test]
    fn test_dismiss_and_retry() {
        assert_eq!(prompt("\n").0, None);
        assert_eq!(prompt("").0, None);
        assert_eq!(prompt("q\n").0, None);

        let (chosen, output) = prompt("9\n2\n");
        assert_eq!(chosen.map(|b| b.kind()), Some(ActionKind::Close));
        assert!(output.contains("no such item: 9"));
    }

    #[test]
    fn test_dismissed_submenu_returns_to_parent() {
        let (chosen, _) = prompt("1\n\n2\n");
        assert_eq!(chosen.map(|b| b.kind()), Some(ActionKind::Close));
    }
}
