//! Zoned (action bar) layout.
//!
//! The target is split into an ordered list of zones, each a host element
//! with its own horizontal alignment and item gap. Children pick a zone with
//! `LayoutData::zone`; children without one go to zone 0. A child naming a
//! zone that does not exist is logged and left out of the cycle.
//!
//! Zone elements are built on the first cycle after the target is set and
//! reused until a child is removed, which forces a rebuild on the next
//! cycle. Within a zone every child sits in its own cell, appended in item
//! order; the cell follows the child's visibility.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::Strategy;
use crate::component::{ComponentId, ComponentRef};
use crate::dom::{HostTree, NodeId};
use crate::engine::Engine;
use crate::error::LayoutError;
use crate::placement::Placement;
use crate::style::{HAlign, Insets, Length, VAlign, ZoneStyles};

const DEFAULT_SPACING: Length = Length::px(4.0);

fn default_spacing() -> Length {
    DEFAULT_SPACING
}

/// A slot in a zoned layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub align: HAlign,
    /// Gap between items in the zone.
    #[serde(default = "default_spacing")]
    pub spacing: Length,
}

impl Zone {
    pub fn new(align: HAlign) -> Self {
        Self {
            align,
            spacing: DEFAULT_SPACING,
        }
    }

    pub fn left() -> Self {
        Self::new(HAlign::Left)
    }

    pub fn center() -> Self {
        Self::new(HAlign::Center)
    }

    pub fn right() -> Self {
        Self::new(HAlign::Right)
    }

    pub fn spacing(mut self, spacing: Length) -> Self {
        self.spacing = spacing;
        self
    }
}

impl Default for Zone {
    fn default() -> Self {
        Self::left()
    }
}

/// Zoned layout configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZonedConfig {
    pub zones: Vec<Zone>,
    /// Vertical alignment of the whole bar.
    pub valign: VAlign,
    /// Padding applied to the target.
    pub insets: Option<Insets>,
}

impl ZonedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// `count` zones sharing one spacing: the first left aligned, the last
    /// right aligned and any in between centred.
    pub fn evenly(count: usize, spacing: Length) -> Self {
        let zones = (0..count)
            .map(|i| {
                let align = if i == 0 {
                    HAlign::Left
                } else if i + 1 < count {
                    HAlign::Center
                } else {
                    HAlign::Right
                };
                Zone::new(align).spacing(spacing)
            })
            .collect();
        Self {
            zones,
            ..Self::default()
        }
    }

    pub fn zone(mut self, zone: Zone) -> Self {
        self.zones.push(zone);
        self
    }

    pub fn valign(mut self, valign: VAlign) -> Self {
        self.valign = valign;
        self
    }

    pub fn insets(mut self, insets: Insets) -> Self {
        self.insets = Some(insets);
        self
    }
}

#[derive(Debug)]
struct ZoneEl {
    el: NodeId,
    members: Vec<ComponentId>,
}

/// Distributes children across configured zones.
#[derive(Debug)]
pub struct Zoned {
    config: ZonedConfig,
    styles: ZoneStyles,
    zones: RefCell<Vec<ZoneEl>>,
    built: Cell<bool>,
    cells: RefCell<HashMap<ComponentId, NodeId>>,
}

impl Zoned {
    /// A config without zones gets a single left-aligned zone.
    pub fn new(mut config: ZonedConfig, styles: ZoneStyles) -> Self {
        if config.zones.is_empty() {
            config.zones.push(Zone::left());
        }
        Self {
            config,
            styles,
            zones: RefCell::new(Vec::new()),
            built: Cell::new(false),
            cells: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ZonedConfig {
        &self.config
    }

    /// Host elements of the zones, in zone order. Empty until the first cycle.
    pub fn zone_elements(&self) -> Vec<NodeId> {
        self.zones.borrow().iter().map(|z| z.el).collect()
    }

    fn invalidate(&self) {
        self.built.set(false);
    }

    fn build_zones(&self, host: &Rc<dyn HostTree>, target: NodeId) -> Result<(), LayoutError> {
        let stale: Vec<NodeId> = self.zones.borrow_mut().drain(..).map(|z| z.el).collect();
        for el in stale {
            host.remove(el);
        }
        self.cells.borrow_mut().clear();

        let mut zones = Vec::with_capacity(self.config.zones.len());
        for (index, zone) in self.config.zones.iter().enumerate() {
            let el = host.create_element("div");
            host.add_class(el, &self.styles.zone);
            host.set_attribute(el, "data-zone", &index.to_string());
            host.set_style(el, "gap", &zone.spacing.to_string());
            match zone.align {
                HAlign::Left => host.add_class(el, &self.styles.left),
                HAlign::Right => host.add_class(el, &self.styles.right),
                HAlign::Center => {}
            }
            host.insert_child(target, el, None)?;
            zones.push(ZoneEl {
                el,
                members: Vec::new(),
            });
        }
        tracing::debug!("zoned: built {} zones", zones.len());
        *self.zones.borrow_mut() = zones;
        self.built.set(true);
        Ok(())
    }

    fn add_to_zone(&self, engine: &Engine, zone: usize, component: &ComponentRef) -> Result<(), LayoutError> {
        let host = engine.host();
        let id = component.id();
        let zone_el = {
            let mut zones = self.zones.borrow_mut();
            let Some(entry) = zones.get_mut(zone) else {
                return Ok(());
            };
            if entry.members.contains(&id) {
                return Ok(());
            }
            entry.members.push(id);
            entry.el
        };

        if component.root().is_some_and(|root| host.contains(zone_el, root)) {
            return Ok(());
        }

        let old_cell = self.cells.borrow_mut().remove(&id);
        if let Some(old_cell) = old_cell {
            host.remove(old_cell);
        }

        let cell = host.create_element("div");
        host.add_class(cell, &self.styles.item);
        host.insert_child(zone_el, cell, None)?;
        let placed = match component.root() {
            Some(root) => host.insert_child(cell, root, None).map(|_| root),
            None => component.render(host, cell, None),
        };
        let root = match placed {
            Ok(root) => root,
            Err(err) => {
                host.remove(cell);
                return Err(err);
            }
        };

        if component.is_hidden() {
            host.set_visible(cell, false);
        }
        self.cells.borrow_mut().insert(id, cell);
        engine.retain(Placement::new(cell, Some(root), component.clone()));
        Ok(())
    }

    fn set_cell_visible(&self, engine: &Engine, component: &ComponentRef, visible: bool) {
        let cell = self.cells.borrow().get(&component.id()).copied();
        if let Some(cell) = cell {
            engine.host().set_visible(cell, visible);
        }
    }
}

impl Default for Zoned {
    fn default() -> Self {
        Self::new(ZonedConfig::evenly(2, DEFAULT_SPACING), ZoneStyles::default())
    }
}

impl Strategy for Zoned {
    fn name(&self) -> &'static str {
        "zoned"
    }

    fn on_layout(&self, engine: &Engine, target: NodeId) {
        let host = engine.host();
        host.add_class(target, &self.styles.layout);
        if let Some(insets) = &self.config.insets {
            insets.apply_padding(host.as_ref(), target);
        }
        match self.config.valign {
            VAlign::Top => host.add_class(target, &self.styles.top),
            VAlign::Bottom => host.add_class(target, &self.styles.bottom),
            VAlign::Middle => {}
        }

        if !self.built.get() {
            if let Err(err) = self.build_zones(host, target) {
                engine.report(&err);
                return;
            }
        }

        let count = self.config.zones.len();
        for component in engine.items() {
            let zone = component
                .layout_data()
                .and_then(|d| d.zone)
                .map_or(0, |z| z.zone);
            if zone >= count {
                tracing::error!(
                    component = %component.name(),
                    id = %component.id(),
                    zone,
                    zones = count,
                    "component assigned to a zone that does not exist"
                );
                continue;
            }
            if let Err(err) = self.add_to_zone(engine, zone, &component) {
                engine.report(&err);
            }
        }
    }

    fn remove_child(&self, engine: &Engine, component: &ComponentRef, _target: NodeId) {
        let cell = self.cells.borrow_mut().remove(&component.id());
        if let Some(cell) = cell {
            engine.host().remove(cell);
        }
        engine.forget(component.id());
    }

    fn on_target_set(&self, _engine: &Engine) {
        self.invalidate();
    }

    fn on_component_shown(&self, engine: &Engine, component: &ComponentRef) {
        self.set_cell_visible(engine, component, true);
    }

    fn on_component_hidden(&self, engine: &Engine, component: &ComponentRef) {
        self.set_cell_visible(engine, component, false);
    }

    fn on_component_removed(&self, _engine: &Engine, _component: &ComponentRef) {
        self.invalidate();
    }
}
