//! Placement Data
//!
//! Per-component hints that tell a strategy how to place a component. Each
//! strategy owns a baseline (its container-level default) and composes it
//! with whatever override the component carries. Composition always builds a
//! new value; the baseline is never touched.
//!
//! A component carries a single `LayoutData` with one optional section per
//! strategy, so the same component can be moved between containers that use
//! different layouts without losing its hints.

use serde::{Deserialize, Serialize};

use crate::style::{Effect, HAlign, Length, Separator};

/// Field-wise merge where the override wins whenever it has a value.
pub trait Compose {
    fn compose(&self, over: &Self) -> Self;
}

/// Placement hints a component carries for whichever layout manages it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutData {
    /// Extra class applied to the component's placement wrapper.
    pub extra_style: Option<String>,
    pub stack: Option<StackData>,
    pub zone: Option<ZoneData>,
    pub card: Option<CardData>,
}

impl LayoutData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extra_style(mut self, class: impl Into<String>) -> Self {
        self.extra_style = Some(class.into());
        self
    }

    pub fn stack(mut self, data: StackData) -> Self {
        self.stack = Some(data);
        self
    }

    /// Target a zone of a zoned layout.
    pub fn zone(mut self, zone: usize) -> Self {
        self.zone = Some(ZoneData { zone });
        self
    }

    pub fn card(mut self, data: CardData) -> Self {
        self.card = Some(data);
        self
    }
}

// =========================================================================
// Vertical stack
// =========================================================================

/// Vertical-stack hints. Every field is optional so a component only needs
/// to state what differs from the container baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackData {
    pub spacing_above: Option<Length>,
    pub spacing_below: Option<Length>,
    pub padding_side: Option<Length>,
    pub align: Option<HAlign>,
    pub separator: Option<Separator>,
}

impl StackData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spacing above the item when it has a preceding item.
    pub fn spacing_above(mut self, spacing: Length) -> Self {
        self.spacing_above = Some(spacing);
        self
    }

    /// Spacing below the item when it has a following item.
    pub fn spacing_below(mut self, spacing: Length) -> Self {
        self.spacing_below = Some(spacing);
        self
    }

    /// Same spacing above and below.
    pub fn spacing(self, spacing: Length) -> Self {
        self.spacing_above(spacing).spacing_below(spacing)
    }

    /// Padding left and right of the component. Lets a separator line run to
    /// the container edge while the component itself is inset.
    pub fn padding_side(mut self, padding: Length) -> Self {
        self.padding_side = Some(padding);
        self
    }

    pub fn align(mut self, align: HAlign) -> Self {
        self.align = Some(align);
        self
    }

    pub fn separator(mut self, separator: Separator) -> Self {
        self.separator = Some(separator);
        self
    }

    /// Fill every unset field with its default.
    pub fn resolve(&self) -> ResolvedStackData {
        ResolvedStackData {
            spacing_above: self.spacing_above.unwrap_or(Length::ZERO),
            spacing_below: self.spacing_below.unwrap_or(Length::ZERO),
            padding_side: self.padding_side.unwrap_or(Length::ZERO),
            align: self.align.unwrap_or(HAlign::Center),
            separator: self.separator.unwrap_or(Separator::None),
        }
    }
}

impl Compose for StackData {
    fn compose(&self, over: &Self) -> Self {
        Self {
            spacing_above: over.spacing_above.or(self.spacing_above),
            spacing_below: over.spacing_below.or(self.spacing_below),
            padding_side: over.padding_side.or(self.padding_side),
            align: over.align.or(self.align),
            separator: over.separator.or(self.separator),
        }
    }
}

/// Fully resolved vertical-stack hints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStackData {
    pub spacing_above: Length,
    pub spacing_below: Length,
    pub padding_side: Length,
    pub align: HAlign,
    pub separator: Separator,
}

// =========================================================================
// Zones
// =========================================================================

/// Zoned-layout hint: which zone the component belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneData {
    pub zone: usize,
}

impl Compose for ZoneData {
    fn compose(&self, over: &Self) -> Self {
        *over
    }
}

// =========================================================================
// Cards
// =========================================================================

/// Card-fit hints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardData {
    pub effect: Option<Effect>,
}

impl CardData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// The effect to use, defaulting to none.
    pub fn resolved_effect(&self) -> Effect {
        self.effect.unwrap_or_default()
    }
}

impl Compose for CardData {
    fn compose(&self, over: &Self) -> Self {
        Self {
            effect: over.effect.or(self.effect),
        }
    }
}

/// Compose a baseline with an optional override.
pub fn compose_with<T: Compose + Clone>(baseline: &T, over: Option<&T>) -> T {
    match over {
        Some(over) => baseline.compose(over),
        None => baseline.clone(),
    }
}
