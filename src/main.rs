//! Area Window Menu
//!
//! Builds, sizes and shows window menus for clients of a running EWMH
//! window manager, and runs actions on interactively chosen windows.

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use area_winmenu::config::Config;
use area_winmenu::shell::TerminalPrompt;
use area_winmenu::wm::{
    choose_window, ActionBinding, ActionContext, ChooseOutcome, TextLayout, WindowId,
    WindowMenuBuilder, WorkspaceMenu, X11Display, X11Executor, X11Selection,
};

const USAGE: &str = "\
usage: area-winmenu <command>

commands:
  menu <window> [--json]     print the window menu
  size <window>              print the menu size as WIDTHxHEIGHT
  show <window> [<x> <y>]    pick an entry from the menu and run it
  choose <action> [<param>]  click a window to run an action on it

actions: close kill move resize minimize restore shade unshade maximize
         maximize-x maximize-y stick unstick layer <above|normal|below>
         sendto <desktop>";

/// Parse a window ID in decimal or 0x-prefixed hex
fn parse_window_id(arg: &str) -> Result<WindowId> {
    let parsed = match arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        Some(hex) => WindowId::from_str_radix(hex, 16),
        None => arg.parse(),
    };
    parsed.with_context(|| format!("invalid window id '{}'", arg))
}

fn arg<'a>(args: &'a [String], index: usize, what: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("missing {}\n\n{}", what, USAGE))
}

fn parse_coordinate(arg: Option<&String>) -> Result<Option<i32>> {
    arg.map(|a| a.parse::<i32>().with_context(|| format!("invalid coordinate '{}'", a)))
        .transpose()
}

/// Desktop menu from the window manager's desktops, falling back to config
fn workspace_menu(display: &X11Display, config: &Config) -> Result<WorkspaceMenu> {
    let count = display
        .desktop_count()?
        .unwrap_or(config.menu.desktop_count);
    let mut names = display.desktop_names()?;
    if names.is_empty() {
        names = config.menu.desktop_names.clone();
    }
    debug!("Using {} desktops ({:?})", count, names);
    Ok(WorkspaceMenu::with_fallback(count, &names))
}

fn run(args: &[String], config: &Config) -> Result<()> {
    let command = args.first().map(String::as_str);

    let display = X11Display::connect(None)?;
    let desktops = workspace_menu(&display, config)?;
    let builder = WindowMenuBuilder::new(desktops.count(), &desktops);
    let layout = TextLayout::from_config(&config.layout);

    let ops = X11Executor::new(&display);
    let move_op = |w: WindowId, x: i32, y: i32| ops.begin_move(w, x, y);
    let resize_op = |w: WindowId, x: i32, y: i32| ops.begin_resize(w, x, y);

    match command {
        Some("menu") => {
            let window = parse_window_id(arg(args, 1, "window id")?)?;
            let menu = builder.build(&display.read_window_state(window)?);
            if args.iter().any(|a| a == "--json") {
                println!("{}", serde_json::to_string_pretty(&menu)?);
            } else {
                print!("{}", menu);
            }
        }
        Some("size") => {
            let window = parse_window_id(arg(args, 1, "window id")?)?;
            let (width, height) = builder.menu_size(&display.read_window_state(window)?, &layout);
            println!("{}x{}", width, height);
        }
        Some("show") => {
            let window = parse_window_id(arg(args, 1, "window id")?)?;
            let state = display.read_window_state(window)?;
            let (x, y) = match (parse_coordinate(args.get(2))?, parse_coordinate(args.get(3))?) {
                (Some(x), Some(y)) => (x, y),
                _ => display.pointer_position()?,
            };

            let context = ActionContext::new(window, x, y, &move_op, &resize_op);
            let stdin = std::io::stdin();
            let mut widget = TerminalPrompt::new(stdin.lock(), std::io::stdout());
            let mut executor = X11Executor::new(&display);
            builder.show(&state, &context, &layout, &mut widget, &mut executor)?;
        }
        Some("choose") => {
            let name = arg(args, 1, "action")?;
            let binding = ActionBinding::parse(name, args.get(2).map(String::as_str))?;
            let (x, y) = display.pointer_position()?;
            let context = ActionContext::new(display.root(), x, y, &move_op, &resize_op);

            println!("Click a window for {:?} (any key cancels)", binding.kind());
            let mut pointer = X11Selection::new(&display);
            let mut executor = X11Executor::new(&display);
            match choose_window(&mut pointer, &display, &context, &binding, &mut executor)? {
                ChooseOutcome::Resolved(Some(window)) => {
                    info!("Ran {:?} on window 0x{:x}", binding.kind(), window);
                }
                ChooseOutcome::Resolved(None) => info!("No managed window chosen"),
                ChooseOutcome::Cancelled => info!("Cancelled"),
            }
        }
        Some(other) => anyhow::bail!("unknown command '{}'\n\n{}", other, USAGE),
        None => anyhow::bail!("{}", USAGE),
    }

    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "area_winmenu=info,warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::load()?;
    run(&args, &config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window_id() {
        assert_eq!(parse_window_id("0x1a00004").unwrap(), 0x1a00004);
        assert_eq!(parse_window_id("0X10").unwrap(), 16);
        assert_eq!(parse_window_id("4194308").unwrap(), 4194308);
        assert!(parse_window_id("0xzz").is_err());
        assert!(parse_window_id("window").is_err());
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate(Some(&"-12".to_string())).unwrap(), Some(-12));
        assert_eq!(parse_coordinate(None).unwrap(), None);
        assert!(parse_coordinate(Some(&"left".to_string())).is_err());
    }
}
