//! Action Module
//!
//! Window actions bound to menu items, the per-invocation action context,
//! and dispatch of a binding against a target window.

use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::wm::client_flags::WindowLayer;

/// X11 window ID
pub type WindowId = u32;

/// Delegate that starts an interactive move or resize at root coordinates
pub type WindowOp<'a> = &'a dyn Fn(WindowId, i32, i32) -> Result<()>;

/// Action kind
///
/// Toggle pairs (minimize/restore, shade/unshade, maximize/restore,
/// stick/unstick) are a single kind each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    None,
    Close,
    Kill,
    Resize,
    Move,
    Minimize,
    Shade,
    Maximize,
    MaximizeHorizontal,
    MaximizeVertical,
    Stick,
    SetLayer,
    SendToDesktop,
}

impl ActionKind {
    pub fn is_toggle(self) -> bool {
        matches!(self, Self::Minimize | Self::Shade | Self::Maximize | Self::Stick)
    }

    /// Parse a command-line action name
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "none" => Self::None,
            "close" => Self::Close,
            "kill" => Self::Kill,
            "resize" => Self::Resize,
            "move" => Self::Move,
            "minimize" | "restore" => Self::Minimize,
            "shade" | "unshade" => Self::Shade,
            "maximize" => Self::Maximize,
            "maximize-x" | "maxh" => Self::MaximizeHorizontal,
            "maximize-y" | "maxv" => Self::MaximizeVertical,
            "stick" | "unstick" => Self::Stick,
            "layer" => Self::SetLayer,
            "sendto" | "send-to" => Self::SendToDesktop,
            _ => return None,
        };
        Some(kind)
    }
}

/// Effect of a toggle action, fixed when the binding is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    /// Minimize, shade, maximize, stick
    On,
    /// Restore, unshade, restore, unstick
    Off,
}

impl Toggle {
    /// The toggle that flips a state which is currently `active`
    pub fn flipping(active: bool) -> Self {
        if active { Self::Off } else { Self::On }
    }
}

/// An action kind with its parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ActionBinding {
    kind: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    string_param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    numeric_param: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    toggle: Option<Toggle>,
}

impl ActionBinding {
    pub(crate) fn plain(kind: ActionKind) -> Self {
        Self {
            kind,
            string_param: None,
            numeric_param: None,
            toggle: None,
        }
    }

    pub fn none() -> Self {
        Self::plain(ActionKind::None)
    }

    /// Toggle binding with its effect already decided
    pub fn toggle(kind: ActionKind, toggle: Toggle) -> Self {
        debug_assert!(kind.is_toggle(), "{:?} is not a toggle action", kind);
        Self {
            toggle: Some(toggle),
            ..Self::plain(kind)
        }
    }

    pub fn set_layer(layer: WindowLayer) -> Self {
        Self {
            string_param: Some(layer.name().to_string()),
            ..Self::plain(ActionKind::SetLayer)
        }
    }

    pub fn send_to_desktop(desktop: u32) -> Self {
        Self {
            numeric_param: Some(i64::from(desktop)),
            ..Self::plain(ActionKind::SendToDesktop)
        }
    }

    /// Build a binding from a command-line action name and optional parameter
    pub fn parse(name: &str, param: Option<&str>) -> Result<Self> {
        let kind = ActionKind::from_name(name)
            .with_context(|| format!("unknown action '{}'", name))?;

        match kind {
            ActionKind::SetLayer => {
                let layer = param
                    .context("layer action requires above, normal or below")?
                    .parse::<WindowLayer>()?;
                Ok(Self::set_layer(layer))
            }
            ActionKind::SendToDesktop => {
                let desktop = param
                    .context("sendto action requires a desktop index")?
                    .parse::<u32>()
                    .context("desktop index must be a non-negative integer")?;
                Ok(Self::send_to_desktop(desktop))
            }
            _ => {
                let toggle = match name {
                    "restore" | "unshade" | "unstick" => Some(Toggle::Off),
                    "minimize" | "shade" | "stick" => Some(Toggle::On),
                    _ => None,
                };
                Ok(match toggle {
                    Some(toggle) => Self::toggle(kind, toggle),
                    None => Self::plain(kind),
                })
            }
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn string_param(&self) -> Option<&str> {
        self.string_param.as_deref()
    }

    pub fn numeric_param(&self) -> Option<i64> {
        self.numeric_param
    }

    /// Effect decided at build time, if any
    pub fn toggle_effect(&self) -> Option<Toggle> {
        self.toggle
    }

    /// Target layer of a `SetLayer` binding
    pub fn layer(&self) -> Option<WindowLayer> {
        self.string_param.as_deref()?.parse().ok()
    }

    /// Target desktop of a `SendToDesktop` binding
    pub fn desktop(&self) -> Option<u32> {
        self.numeric_param.and_then(|n| u32::try_from(n).ok())
    }
}

/// Everything an action needs from the menu invocation that triggered it
#[derive(Clone, Copy)]
pub struct ActionContext<'a> {
    /// Window the menu was opened for
    pub window: WindowId,
    /// Root coordinates of the invocation
    pub x: i32,
    pub y: i32,
    move_op: WindowOp<'a>,
    resize_op: WindowOp<'a>,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        window: WindowId,
        x: i32,
        y: i32,
        move_op: WindowOp<'a>,
        resize_op: WindowOp<'a>,
    ) -> Self {
        Self {
            window,
            x,
            y,
            move_op,
            resize_op,
        }
    }

    /// Same context retargeted at another window
    pub fn with_window(&self, window: WindowId) -> Self {
        Self { window, ..*self }
    }

    pub fn start_move(&self) -> Result<()> {
        (self.move_op)(self.window, self.x, self.y)
    }

    pub fn start_resize(&self) -> Result<()> {
        (self.resize_op)(self.window, self.x, self.y)
    }
}

impl fmt::Debug for ActionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("window", &self.window)
            .field("x", &self.x)
            .field("y", &self.y)
            .finish_non_exhaustive()
    }
}

/// Low-level executor for everything except interactive move/resize
pub trait ActionExecutor {
    fn execute(&mut self, window: WindowId, binding: &ActionBinding) -> Result<()>;
}

/// Run a binding against the context's window
pub fn run_action(
    context: &ActionContext<'_>,
    binding: &ActionBinding,
    executor: &mut dyn ActionExecutor,
) -> Result<()> {
    debug!(
        "Running {:?} on window 0x{:x} at ({}, {})",
        binding.kind(),
        context.window,
        context.x,
        context.y
    );

    match binding.kind() {
        ActionKind::None => Ok(()),
        ActionKind::Move => context.start_move(),
        ActionKind::Resize => context.start_resize(),
        _ => executor.execute(context.window, binding),
    }
}
