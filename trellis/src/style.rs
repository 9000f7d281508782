//! Style values and the injected theme.
//!
//! Strategies never reach for global style state. Class names come from a
//! `Theme` handed to each strategy when it is constructed, so two layouts in
//! the same process can be styled differently.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dom::{HostTree, NodeId};

/// A CSS length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Length {
    /// Pixels.
    Px(f32),
    /// Percentage of the containing block.
    Pct(f32),
}

impl Length {
    pub const ZERO: Length = Length::Px(0.0);

    pub const fn px(value: f32) -> Self {
        Length::Px(value)
    }

    pub const fn pct(value: f32) -> Self {
        Length::Pct(value)
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Length::Px(v) | Length::Pct(v) => *v == 0.0,
        }
    }
}

impl Default for Length {
    fn default() -> Self {
        Length::ZERO
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(v) => write!(f, "{v}px"),
            Length::Pct(v) => write!(f, "{v}%"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid length: {0:?}")]
pub struct ParseLengthError(pub String);

impl FromStr for Length {
    type Err = ParseLengthError;

    /// Accepts `8px`, `50%` or a bare number (pixels).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (number, pct) = if let Some(n) = text.strip_suffix("px") {
            (n, false)
        } else if let Some(n) = text.strip_suffix('%') {
            (n, true)
        } else {
            (text, false)
        };
        let value: f32 = number
            .trim()
            .parse()
            .map_err(|_| ParseLengthError(s.to_string()))?;
        Ok(if pct { Length::Pct(value) } else { Length::Px(value) })
    }
}

impl TryFrom<String> for Length {
    type Error = ParseLengthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Length> for String {
    fn from(length: Length) -> Self {
        length.to_string()
    }
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Visual separation between stacked items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Separator {
    #[default]
    None,
    /// A single line between adjacent items.
    Line,
}

/// Transition effect applied when a card is activated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    #[default]
    None,
    /// Fade when switching to a different card.
    FadeIn,
    /// Fade on every activation, including re-activating the current card.
    FadeInAll,
}

/// Padding around a region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl Insets {
    pub fn new(top: Length, right: Length, bottom: Length, left: Length) -> Self {
        Self { top, right, bottom, left }
    }

    /// Same insets on all sides.
    pub fn uniform(value: Length) -> Self {
        Self::new(value, value, value, value)
    }

    /// Symmetric insets (horizontal, vertical).
    pub fn symmetric(horizontal: Length, vertical: Length) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Write the insets as padding onto a node.
    pub fn apply_padding(&self, host: &dyn HostTree, node: NodeId) {
        host.set_style(node, "padding-top", &self.top.to_string());
        host.set_style(node, "padding-right", &self.right.to_string());
        host.set_style(node, "padding-bottom", &self.bottom.to_string());
        host.set_style(node, "padding-left", &self.left.to_string());
    }
}

// =========================================================================
// Theme
// =========================================================================

/// Class names used by the vertical-stack strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackStyles {
    pub wrap: String,
    pub first: String,
    pub middle: String,
    pub last: String,
    pub only: String,
    pub align_left: String,
    pub align_center: String,
    pub align_right: String,
    pub separator_line: String,
}

impl Default for StackStyles {
    fn default() -> Self {
        Self {
            wrap: "stack-wrap".into(),
            first: "stack-first".into(),
            middle: "stack-middle".into(),
            last: "stack-last".into(),
            only: "stack-only".into(),
            align_left: "stack-align-left".into(),
            align_center: "stack-align-center".into(),
            align_right: "stack-align-right".into(),
            separator_line: "stack-separator-line".into(),
        }
    }
}

/// Class names used by the zoned strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneStyles {
    pub layout: String,
    pub zone: String,
    pub item: String,
    pub left: String,
    pub right: String,
    pub top: String,
    pub bottom: String,
}

impl Default for ZoneStyles {
    fn default() -> Self {
        Self {
            layout: "zones".into(),
            zone: "zones-zone".into(),
            item: "zones-item".into(),
            left: "zones-left".into(),
            right: "zones-right".into(),
            top: "zones-top".into(),
            bottom: "zones-bottom".into(),
        }
    }
}

/// Class names used by the card-fit strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardStyles {
    pub layout: String,
    pub fade: String,
}

impl Default for CardStyles {
    fn default() -> Self {
        Self {
            layout: "card-fit".into(),
            fade: "card-fade".into(),
        }
    }
}

/// All strategy class names, constructed once and injected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default)]
    pub stack: StackStyles,
    #[serde(default)]
    pub zones: ZoneStyles,
    #[serde(default)]
    pub card: CardStyles,
}

impl Theme {
    /// Prefix every class name, e.g. `"app-"` turns `stack-wrap` into
    /// `app-stack-wrap`.
    pub fn prefixed(prefix: &str) -> Self {
        let p = |s: &str| format!("{prefix}{s}");
        let base = Self::default();
        Self {
            stack: StackStyles {
                wrap: p(&base.stack.wrap),
                first: p(&base.stack.first),
                middle: p(&base.stack.middle),
                last: p(&base.stack.last),
                only: p(&base.stack.only),
                align_left: p(&base.stack.align_left),
                align_center: p(&base.stack.align_center),
                align_right: p(&base.stack.align_right),
                separator_line: p(&base.stack.separator_line),
            },
            zones: ZoneStyles {
                layout: p(&base.zones.layout),
                zone: p(&base.zones.zone),
                item: p(&base.zones.item),
                left: p(&base.zones.left),
                right: p(&base.zones.right),
                top: p(&base.zones.top),
                bottom: p(&base.zones.bottom),
            },
            card: CardStyles {
                layout: p(&base.card.layout),
                fade: p(&base.card.fade),
            },
        }
    }
}
