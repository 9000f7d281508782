//! Layout Strategies
//!
//! The engine owns the placement cycle; a `Strategy` decides what placement
//! means. Every hook has a default that reproduces the plain behaviour, so a
//! strategy only overrides the steps it changes:
//!
//! - `on_layout`: the placement step for one cycle (default: `Engine::render_all`)
//! - `render_component`: place one component (default: `Engine::place`)
//! - `after_render`, `on_after_layout`: post-placement hooks
//! - `on_target_set`, `on_component_*`: notifications routed from the target
//!   and its children
//! - `activate`, `active_item`: single-active-item strategies
//!
//! Hooks receive the engine by reference. Strategies keep their own state in
//! `Cell` / `RefCell` and must not hold a borrow across a call back into the
//! engine or into a component, since either can re-enter the strategy.

mod card;
mod minimal;
mod stack;
mod zoned;

pub use card::{CardConfig, CardFit};
pub use minimal::Minimal;
pub use stack::{StackConfig, VerticalStack};
pub use zoned::{Zone, Zoned, ZonedConfig};

use crate::completion::{ActivateOutcome, Completion};
use crate::component::ComponentRef;
use crate::dom::NodeId;
use crate::engine::Engine;
use crate::error::LayoutError;

pub trait Strategy {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Place the target's children under `target`.
    fn on_layout(&self, engine: &Engine, target: NodeId) {
        engine.render_all(target);
    }

    /// Place a single component that is not correctly attached.
    fn render_component(
        &self,
        engine: &Engine,
        component: &ComponentRef,
        index: usize,
        target: NodeId,
        size: usize,
    ) -> Result<(), LayoutError> {
        engine.place(component, index, target, size).map(|_| ())
    }

    /// Called by `Engine::render_all` once every component has been visited.
    fn after_render(&self, _engine: &Engine, _target: NodeId) {}

    /// Called after children have been reconfigured.
    fn on_after_layout(&self, _engine: &Engine) {}

    /// Detach whatever holds `component` from `target` when it is removed.
    fn remove_child(&self, engine: &Engine, component: &ComponentRef, target: NodeId) {
        engine.remove_child(component, target);
    }

    fn on_target_set(&self, _engine: &Engine) {}

    fn on_component_added(&self, _engine: &Engine, _component: &ComponentRef) {}

    fn on_component_removed(&self, _engine: &Engine, _component: &ComponentRef) {}

    fn on_component_shown(&self, _engine: &Engine, _component: &ComponentRef) {}

    fn on_component_hidden(&self, _engine: &Engine, _component: &ComponentRef) {}

    /// A child asked to be made active.
    fn on_component_activated(&self, _engine: &Engine, _component: &ComponentRef) {}

    /// Make `component` the active item. Strategies without an active item
    /// report `NotPresent`.
    fn activate(&self, _engine: &Engine, _component: &ComponentRef) -> Completion {
        Completion::ready(ActivateOutcome::NotPresent)
    }

    fn active_item(&self) -> Option<ComponentRef> {
        None
    }
}
