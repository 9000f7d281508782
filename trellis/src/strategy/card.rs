//! Card Fit
//!
//! Exactly one child, the active item, is placed and shown; every other
//! child is left unrendered by the placement step. The active item is sized
//! to fill the target, either with absolute positioning pinned to the edges
//! or with percentage sizes.
//!
//! `activate` switches the active item. Activating a child that has not been
//! rendered defers the placement cycle to a later turn of the scheduler, and
//! the returned `Completion` resolves once that cycle has run.

use std::cell::RefCell;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Strategy;
use crate::completion::{ActivateOutcome, Completion};
use crate::component::ComponentRef;
use crate::data::{compose_with, CardData};
use crate::dom::{HostTree, NodeId};
use crate::engine::Engine;
use crate::error::LayoutError;
use crate::style::{CardStyles, Effect, Length};

/// Card-fit configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    pub fit_width: bool,
    pub fit_height: bool,
    /// Size with `width: 100%` instead of pinning left and right.
    pub percent_width: bool,
    /// Size with `height: 100%` instead of pinning top and bottom.
    pub percent_height: bool,
    /// Hints every child starts from.
    pub baseline: CardData,
    /// How long the fade class stays on the target.
    pub fade_millis: u64,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            fit_width: true,
            fit_height: true,
            percent_width: false,
            percent_height: false,
            baseline: CardData::default(),
            fade_millis: 500,
        }
    }
}

impl CardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit_width(mut self, fit: bool) -> Self {
        self.fit_width = fit;
        self
    }

    pub fn fit_height(mut self, fit: bool) -> Self {
        self.fit_height = fit;
        self
    }

    pub fn percent_width(mut self, percent: bool) -> Self {
        self.percent_width = percent;
        self
    }

    pub fn percent_height(mut self, percent: bool) -> Self {
        self.percent_height = percent;
        self
    }

    pub fn effect(mut self, effect: Effect) -> Self {
        self.baseline = self.baseline.effect(effect);
        self
    }

    pub fn fade_duration(mut self, duration: Duration) -> Self {
        self.fade_millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_millis)
    }
}

/// Shows one child at a time.
#[derive(Default)]
pub struct CardFit {
    config: CardConfig,
    styles: CardStyles,
    active: RefCell<Option<ComponentRef>>,
}

impl CardFit {
    pub fn new(config: CardConfig, styles: CardStyles) -> Self {
        Self {
            config,
            styles,
            active: RefCell::new(None),
        }
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    fn is_active(&self, component: &ComponentRef) -> bool {
        self.active
            .borrow()
            .as_ref()
            .is_some_and(|c| c.id() == component.id())
    }

    /// Add the fade class to `el` and schedule its removal.
    fn fade(&self, engine: &Engine, el: Option<NodeId>) {
        let Some(el) = el else {
            return;
        };
        let host = engine.host().clone();
        host.add_class(el, &self.styles.fade);
        let class = self.styles.fade.clone();
        engine
            .runtime()
            .scheduler()
            .schedule(self.config.fade(), Box::new(move || host.remove_class(el, &class)));
    }

    /// Make `component` the active card without a transition.
    fn promote(&self, engine: &Engine, component: &ComponentRef) {
        *self.active.borrow_mut() = Some(component.clone());
        if let Some(aware) = component.activation() {
            aware.on_activated();
        }
        component.show();
        engine.mark_dirty();
    }

    fn size_active(&self, host: &dyn HostTree) {
        let root = self.active.borrow().as_ref().and_then(|c| c.root());
        let Some(root) = root else {
            return;
        };
        let zero = Length::ZERO.to_string();
        let full = Length::pct(100.0).to_string();
        if self.config.fit_height {
            if self.config.percent_height {
                host.set_style(root, "height", &full);
            } else {
                host.set_style(root, "position", "absolute");
                host.set_style(root, "top", &zero);
                host.set_style(root, "bottom", &zero);
            }
        }
        if self.config.fit_width {
            if self.config.percent_width {
                host.set_style(root, "width", &full);
            } else {
                host.set_style(root, "position", "absolute");
                host.set_style(root, "left", &zero);
                host.set_style(root, "right", &zero);
            }
        }
    }
}

impl Strategy for CardFit {
    fn name(&self) -> &'static str {
        "card-fit"
    }

    fn on_layout(&self, engine: &Engine, target: NodeId) {
        let items = engine.items();
        let Some(first) = items.first() else {
            return;
        };
        let host = engine.host();
        host.add_class(target, &self.styles.layout);
        {
            let mut active = self.active.borrow_mut();
            if active.is_none() {
                *active = Some(first.clone());
            }
        }

        engine.render_all(target);

        let config = &self.config;
        let absolute = (config.fit_width || config.fit_height)
            && !(config.percent_width && config.percent_height);
        if absolute && host.style(target, "position").is_none_or(|p| p.is_empty()) {
            host.set_style(target, "position", "relative");
        }
        self.size_active(host.as_ref());
    }

    fn render_component(
        &self,
        engine: &Engine,
        component: &ComponentRef,
        index: usize,
        target: NodeId,
        size: usize,
    ) -> Result<(), LayoutError> {
        if !self.is_active(component) {
            return Ok(());
        }
        engine.place(component, index, target, size).map(|_| ())
    }

    fn on_component_activated(&self, engine: &Engine, component: &ComponentRef) {
        let _ = self.activate(engine, component);
    }

    fn on_component_removed(&self, engine: &Engine, component: &ComponentRef) {
        if !self.is_active(component) {
            return;
        }
        *self.active.borrow_mut() = None;
        // Still listed means the whole target is being detached.
        if engine.contains_item(component) {
            return;
        }
        if let Some(next) = engine.items().into_iter().next() {
            tracing::debug!("card-fit: active card removed, promoting {}", next.name());
            self.promote(engine, &next);
        }
    }

    fn activate(&self, engine: &Engine, component: &ComponentRef) -> Completion {
        let Some(target) = engine.target() else {
            return Completion::ready(ActivateOutcome::NotPresent);
        };
        if !engine.contains_item(component) {
            return Completion::ready(ActivateOutcome::NotPresent);
        }

        let over = component.layout_data().and_then(|d| d.card);
        let effect = compose_with(&self.config.baseline, over.as_ref()).resolved_effect();

        if self.is_active(component) {
            if effect == Effect::FadeInAll {
                self.fade(engine, target.layout_target());
            }
            if let Some(aware) = component.activation() {
                aware.on_reactivated();
            }
            return Completion::ready(ActivateOutcome::AlreadyActivated);
        }

        let previous = self.active.replace(Some(component.clone()));
        if let Some(previous) = previous {
            previous.hide();
        }
        if let Some(aware) = component.activation() {
            aware.on_activated();
        }
        if matches!(effect, Effect::FadeIn | Effect::FadeInAll) {
            self.fade(engine, target.layout_target());
        }
        component.show();

        if target.is_rendered() {
            engine.mark_dirty();
            // An unrendered child may finish constructing on a later turn, so
            // its first placement is deferred.
            return engine.perform_layout(!component.is_rendered());
        }
        Completion::ready(ActivateOutcome::Activated)
    }

    fn active_item(&self) -> Option<ComponentRef> {
        self.active.borrow().clone()
    }
}
