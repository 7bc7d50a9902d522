//! Colors and the node palette
//!
//! `NodeColor` is the serializable color used by configuration files and the
//! painting seam. It round-trips through hex strings so config files stay
//! readable, and converts to peniko for vello rendering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use vello::peniko::Color;

/// Error produced when a hex color string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("color `{0}` must start with '#'")]
    MissingHash(String),
    #[error("color `{0}` must have 3, 6 or 8 hex digits")]
    BadLength(String),
    #[error("color `{0}` contains a non-hex digit")]
    BadDigit(String),
}

/// RGBA color with 8 bits per channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl NodeColor {
    /// Create from RGB (opaque)
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create from RGBA
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Convert to peniko Color
    pub fn to_peniko(&self) -> Color {
        Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    /// Create from egui Color32
    pub fn from_egui(color: egui::Color32) -> Self {
        Self {
            r: color.r(),
            g: color.g(),
            b: color.b(),
            a: color.a(),
        }
    }
}

impl Default for NodeColor {
    fn default() -> Self {
        Self::rgb(0, 0, 0)
    }
}

impl fmt::Display for NodeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for NodeColor {
    type Err = ColorParseError;

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let hex = value
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(value.to_string()))?;

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadDigit(value.to_string()));
        }

        let channel = |digits: &str| {
            u8::from_str_radix(digits, 16).map_err(|_| ColorParseError::BadDigit(value.to_string()))
        };

        match hex.len() {
            3 => Ok(Self::rgb(
                channel(&hex[0..1].repeat(2))?,
                channel(&hex[1..2].repeat(2))?,
                channel(&hex[2..3].repeat(2))?,
            )),
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            8 => Ok(Self::rgba(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => Err(ColorParseError::BadLength(value.to_string())),
        }
    }
}

impl TryFrom<String> for NodeColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodeColor> for String {
    fn from(color: NodeColor) -> Self {
        color.to_string()
    }
}

/// Colors used to paint nodes and connection curves
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Outline stroke of a selected node
    pub highlight: NodeColor,
    /// Outline stroke of an unselected node
    pub base: NodeColor,
    /// Node body fill
    pub window: NodeColor,
    pub socket_fill: NodeColor,
    pub socket_outline: NodeColor,
    /// Stroke of the curve shown while dragging from a socket
    pub preview_stroke: NodeColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            highlight: NodeColor::rgb(0x5a, 0x9b, 0xe6),
            base: NodeColor::rgb(0x1e, 0x1e, 0x1e),
            window: NodeColor::rgb(0x32, 0x32, 0x32),
            socket_fill: NodeColor::rgb(0x80, 0x80, 0x80),
            socket_outline: NodeColor::rgb(0, 0, 0),
            preview_stroke: NodeColor::rgb(0xff, 0xff, 0xff),
        }
    }
}

impl Palette {
    /// Derive a palette from a host egui theme
    ///
    /// Socket colors and the preview stroke keep their defaults; only the
    /// theme-driven outline and body colors follow the host.
    pub fn from_visuals(visuals: &egui::Visuals) -> Self {
        Self {
            highlight: NodeColor::from_egui(visuals.selection.stroke.color),
            base: NodeColor::from_egui(visuals.widgets.noninteractive.bg_stroke.color),
            window: NodeColor::from_egui(visuals.window_fill),
            ..Self::default()
        }
    }
}
