//! Client Flags
//!
//! Bitfield flags for client status and border permissions, plus the
//! stacking layer a client lives in.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

bitflags! {
    /// Client status flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StatusFlags: u32 {
        const MAPPED          = 1 << 0;
        const SHAPED          = 1 << 1;
        const MINIMIZED       = 1 << 2;
        const MAXIMIZED_HORZ  = 1 << 3;
        const MAXIMIZED_VERT  = 1 << 4;
        const STICKY          = 1 << 5;
        const SHADED          = 1 << 6;
        const DIALOG          = 1 << 7;
    }
}

impl StatusFlags {
    pub fn maximized() -> Self {
        Self::MAXIMIZED_HORZ | Self::MAXIMIZED_VERT
    }

    /// Maximized in at least one axis
    pub fn is_maximized(&self) -> bool {
        self.intersects(Self::maximized())
    }

    /// Mapped, or collapsed to its title bar
    pub fn is_visible(&self) -> bool {
        self.intersects(Self::MAPPED | Self::SHADED)
    }
}

bitflags! {
    /// Border permissions - which actions policy allows on a client
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BorderFlags: u32 {
        const RESIZE  = 1 << 0;
        const MOVE    = 1 << 1;
        const MIN     = 1 << 2;
        const SHADE   = 1 << 3;
        const MAX     = 1 << 4;
    }
}

impl Default for BorderFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// Window layer (for stacking)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum WindowLayer {
    Below = 0,
    #[default]
    Normal = 1,
    Above = 2,
}

impl WindowLayer {
    /// Layers in menu display order (top to bottom)
    pub const DISPLAY_ORDER: [WindowLayer; 3] =
        [WindowLayer::Above, WindowLayer::Normal, WindowLayer::Below];

    /// Name carried by layer actions
    pub fn name(self) -> &'static str {
        match self {
            Self::Above => "above",
            Self::Normal => "normal",
            Self::Below => "below",
        }
    }

    /// Menu label
    pub fn label(self) -> &'static str {
        match self {
            Self::Above => "Above",
            Self::Normal => "Normal",
            Self::Below => "Below",
        }
    }
}

impl fmt::Display for WindowLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WindowLayer {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "above" => Ok(Self::Above),
            "normal" => Ok(Self::Normal),
            "below" => Ok(Self::Below),
            other => anyhow::bail!("unknown layer '{}' (expected above, normal or below)", other),
        }
    }
}
