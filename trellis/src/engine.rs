//! Layout Engine
//!
//! The engine runs placement cycles for one layout target at a time.
//!
//! # Cycle
//!
//! State is two flags plus a first-cycle marker:
//!
//! - `dirty`: a cycle is owed (starts `true`, so the first `layout()` runs)
//! - `running`: re-entrancy guard; also held while a deferred cycle is queued
//! - `first_layout`: cleared after the first completed cycle
//!
//! `layout(force)` runs a cycle only when not running, dirty (or forced) and
//! the target is rendered. A cycle styles the target node, hands it to the
//! strategy's placement step, tells the target, reconfigures every child (so
//! nested containers lay out after this placement finished), runs the
//! strategy's post-layout hook and finally reports completion to the target.
//!
//! # Reconciliation
//!
//! `render_all` visits children in target order and only places those whose
//! root is missing or not under the target node. Attached children are never
//! re-rendered.
//!
//! # Deferred cycles
//!
//! `perform_layout(true)` queues the cycle on the runtime's scheduler and
//! returns a pending `Completion`. Requests arriving while a cycle is running
//! or queued are coalesced onto that completion instead of starting another.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::completion::{ActivateOutcome, Completion, Resolver};
use crate::component::{ComponentId, ComponentListener, ComponentRef, ListenerKey};
use crate::container::LayoutTarget;
use crate::dom::{HostTree, NodeId};
use crate::error::LayoutError;
use crate::event::HostEvent;
use crate::placement::{DefaultRenderer, Placement, PlacementRenderer};
use crate::schedule::Scheduler;
use crate::strategy::Strategy;
use crate::style::Length;

// =========================================================================
// Runtime
// =========================================================================

/// Receives errors that were contained during a placement pass.
pub trait ExceptionSink {
    fn report(&self, error: &LayoutError);
}

/// Reports contained errors through `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ExceptionSink for LogSink {
    fn report(&self, error: &LayoutError) {
        tracing::error!("uncaught error during layout: {}", error);
    }
}

/// The host services a layout runs against.
#[derive(Clone)]
pub struct Runtime {
    host: Rc<dyn HostTree>,
    scheduler: Rc<dyn Scheduler>,
    sink: Rc<dyn ExceptionSink>,
}

impl Runtime {
    pub fn new(host: Rc<dyn HostTree>, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            host,
            scheduler,
            sink: Rc::new(LogSink),
        }
    }

    /// Replace the exception sink.
    pub fn sink(mut self, sink: Rc<dyn ExceptionSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn host(&self) -> &Rc<dyn HostTree> {
        &self.host
    }

    pub fn scheduler(&self) -> &Rc<dyn Scheduler> {
        &self.scheduler
    }

    pub fn report(&self, error: &LayoutError) {
        self.sink.report(error);
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime").finish_non_exhaustive()
    }
}

/// Options shared by every strategy.
#[derive(Clone, Default)]
pub struct LayoutOptions {
    /// Class applied to the target node, to each child root and to each
    /// placement node.
    pub target_style: Option<String>,
    /// Fixed height applied to the target node on every placement pass.
    pub target_height: Option<Length>,
    /// Replaces the default render-or-move placement.
    pub renderer: Option<Rc<dyn PlacementRenderer>>,
}

impl LayoutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_style(mut self, class: impl Into<String>) -> Self {
        self.target_style = Some(class.into());
        self
    }

    pub fn target_height(mut self, height: Length) -> Self {
        self.target_height = Some(height);
        self
    }

    pub fn renderer(mut self, renderer: Rc<dyn PlacementRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }
}

impl fmt::Debug for LayoutOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutOptions")
            .field("target_style", &self.target_style)
            .field("target_height", &self.target_height)
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}

// =========================================================================
// Engine
// =========================================================================

struct PendingCycle {
    resolver: Resolver,
    completion: Completion,
}

/// The layout core. Always lives in an `Rc`; see `Layout` for the public
/// handle.
pub struct Engine {
    me: Weak<Engine>,
    runtime: Runtime,
    strategy: Box<dyn Strategy>,
    options: LayoutOptions,
    target: RefCell<Option<Weak<dyn LayoutTarget>>>,
    dirty: Cell<bool>,
    running: Cell<bool>,
    first_layout: Cell<bool>,
    placements: RefCell<Vec<Placement>>,
    pending: RefCell<Option<PendingCycle>>,
    target_key: ListenerKey,
    child_key: ListenerKey,
    target_watcher: Rc<TargetWatcher>,
    child_watcher: Rc<ChildWatcher>,
}

impl Engine {
    pub fn new(runtime: Runtime, strategy: Box<dyn Strategy>, options: LayoutOptions) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            me: me.clone(),
            runtime,
            strategy,
            options,
            target: RefCell::new(None),
            dirty: Cell::new(true),
            running: Cell::new(false),
            first_layout: Cell::new(true),
            placements: RefCell::new(Vec::new()),
            pending: RefCell::new(None),
            target_key: ListenerKey::new(),
            child_key: ListenerKey::new(),
            target_watcher: Rc::new(TargetWatcher { engine: me.clone() }),
            child_watcher: Rc::new(ChildWatcher { engine: me.clone() }),
        })
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn host(&self) -> &Rc<dyn HostTree> {
        self.runtime.host()
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// The current layout target, if one is set and still alive.
    pub fn target(&self) -> Option<Rc<dyn LayoutTarget>> {
        self.target.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// The target's children in order (empty without a target).
    pub fn items(&self) -> Vec<ComponentRef> {
        self.target().map(|t| t.items()).unwrap_or_default()
    }

    /// Whether `component` is one of the target's children.
    pub fn contains_item(&self, component: &ComponentRef) -> bool {
        let id = component.id();
        self.items().iter().any(|c| c.id() == id)
    }

    pub fn item_by_id(&self, id: ComponentId) -> Option<ComponentRef> {
        self.items().into_iter().find(|c| c.id() == id)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn is_first_layout(&self) -> bool {
        self.first_layout.get()
    }

    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    /// Placement records in placement order.
    pub fn placements(&self) -> Vec<Placement> {
        self.placements.borrow().clone()
    }

    /// Report a contained error to the runtime's sink.
    pub fn report(&self, error: &LayoutError) {
        self.runtime.report(error);
    }

    // ---------------------------------------------------------------------
    // Cycle
    // ---------------------------------------------------------------------

    /// Run a placement cycle. Returns whether one ran.
    pub fn layout(&self, force: bool) -> bool {
        if self.running.get() {
            tracing::trace!("{}: layout skipped, already running", self.strategy.name());
            return false;
        }
        self.execute(force)
    }

    fn execute(&self, force: bool) -> bool {
        if force {
            self.mark_dirty();
        }
        let Some(target) = self.target() else {
            return false;
        };
        if !self.dirty.get() || !target.is_rendered() {
            return false;
        }
        let Some(target_el) = target.layout_target() else {
            return false;
        };

        tracing::trace!("{}: layout start (first = {})", self.strategy.name(), self.first_layout.get());
        self.running.set(true);

        let host = self.host();
        if let Some(style) = &self.options.target_style {
            host.add_class(target_el, style);
        }
        if let Some(height) = self.options.target_height {
            host.set_style(target_el, "height", &height.to_string());
        }

        self.strategy.on_layout(self, target_el);
        target.on_layout_executed();

        for item in target.items() {
            item.reconfigure();
        }

        self.strategy.on_after_layout(self);
        target.on_layout_complete(self.first_layout.get());

        self.running.set(false);
        self.first_layout.set(false);
        self.dirty.set(false);
        tracing::trace!("{}: layout end", self.strategy.name());

        self.resolve_pending();
        true
    }

    /// Run a cycle now, or on a later turn of the scheduler when `defer` is
    /// set. Requests made while a cycle is running or queued share that
    /// cycle's completion.
    pub fn perform_layout(&self, defer: bool) -> Completion {
        if self.running.get() {
            tracing::warn!("{}: layout requested while running, coalescing", self.strategy.name());
            return self.pending_completion();
        }
        if !defer {
            self.execute(false);
            return Completion::ready(ActivateOutcome::Activated);
        }

        let completion = self.pending_completion();
        self.running.set(true);
        tracing::trace!("{}: layout deferred", self.strategy.name());
        let me = self.me.clone();
        self.runtime.scheduler().defer(Box::new(move || {
            if let Some(engine) = me.upgrade() {
                engine.run_deferred();
            }
        }));
        completion
    }

    fn run_deferred(&self) {
        tracing::trace!("{}: running deferred layout", self.strategy.name());
        self.running.set(false);
        self.execute(false);
        self.resolve_pending();
    }

    /// The outstanding completion, created if there is none.
    fn pending_completion(&self) -> Completion {
        let mut pending = self.pending.borrow_mut();
        match pending.as_ref() {
            Some(cycle) => cycle.completion.clone(),
            None => {
                let (resolver, completion) = Completion::pending();
                *pending = Some(PendingCycle {
                    resolver,
                    completion: completion.clone(),
                });
                completion
            }
        }
    }

    fn resolve_pending(&self) {
        let pending = self.pending.borrow_mut().take();
        if let Some(cycle) = pending {
            cycle.resolver.resolve(ActivateOutcome::Activated);
        }
    }

    // ---------------------------------------------------------------------
    // Placement
    // ---------------------------------------------------------------------

    /// Default placement step: place every child that is not attached under
    /// `target`, then run the strategy's after-render hook. A child that fails
    /// to render is reported and skipped.
    pub fn render_all(&self, target: NodeId) {
        let host = self.host();
        let items = self.items();
        let size = items.len();
        for (index, component) in items.iter().enumerate() {
            let attached = component.root().is_some_and(|root| host.contains(target, root));
            if attached {
                continue;
            }
            if let Err(err) = self.strategy.render_component(self, component, index, target, size) {
                self.report(&err);
            }
        }
        self.strategy.after_render(self, target);
    }

    /// Render or move `component` into `target` through the configured
    /// renderer and retain the resulting record.
    pub fn place(
        &self,
        component: &ComponentRef,
        index: usize,
        target: NodeId,
        size: usize,
    ) -> Result<Placement, LayoutError> {
        let placement = match &self.options.renderer {
            Some(renderer) => renderer.render_component(self.host(), component, index, target, size)?,
            None => DefaultRenderer.render_component(self.host(), component, index, target, size)?,
        };
        self.retain(placement.clone());
        Ok(placement)
    }

    /// Keep a placement record, styling its node with the layout's class and
    /// the component's extra style. Replaces any earlier record for the same
    /// component.
    pub fn retain(&self, placement: Placement) {
        let host = self.host();
        if let Some(style) = &self.options.target_style {
            host.add_class(placement.layout_el(), style);
        }
        let extra = placement.component().layout_data().and_then(|d| d.extra_style);
        if let Some(extra) = extra.filter(|s| !s.is_empty()) {
            host.add_class(placement.layout_el(), &extra);
        }

        let mut records = self.placements.borrow_mut();
        let id = placement.component_id();
        records.retain(|p| p.component_id() != id);
        records.push(placement);
    }

    /// Detach the child of `target` that holds `component` and prune every
    /// record placed inside it.
    pub fn remove_child(&self, component: &ComponentRef, target: NodeId) {
        let host = self.host();
        if let Some(root) = component.root() {
            let holder = host
                .children(target)
                .into_iter()
                .find(|child| host.contains(*child, root));
            if let Some(holder) = holder {
                host.remove(holder);
                self.placements
                    .borrow_mut()
                    .retain(|p| !host.contains(holder, p.layout_el()));
            }
        }
        self.forget(component.id());
    }

    /// Drop the record for a component.
    pub fn forget(&self, id: ComponentId) {
        self.placements.borrow_mut().retain(|p| p.component_id() != id);
    }

    // ---------------------------------------------------------------------
    // Target
    // ---------------------------------------------------------------------

    /// Replace the layout target. The old target's children are treated as
    /// removed and the new target's as added; no cycle runs.
    pub fn set_target(&self, target: Option<Rc<dyn LayoutTarget>>) {
        let current = self.target();
        let same = match (&current, &target) {
            (Some(a), Some(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            (None, None) => true,
            _ => false,
        };
        if same {
            return;
        }

        if let Some(old) = current {
            tracing::debug!("{}: detaching from {}", self.strategy.name(), old.id());
            old.listeners().remove(self.target_key);
            if let (Some(style), Some(el)) = (&self.options.target_style, old.layout_target()) {
                self.host().remove_class(el, style);
            }
            for item in old.items() {
                self.on_component_remove(&item);
            }
        }

        *self.target.borrow_mut() = target.as_ref().map(Rc::downgrade);

        if let Some(new) = &target {
            tracing::debug!("{}: attaching to {}", self.strategy.name(), new.id());
            let watcher: Weak<dyn ComponentListener> =
                Rc::downgrade(&self.target_watcher) as Weak<dyn ComponentListener>;
            new.listeners().add(self.target_key, watcher);
            for item in new.items() {
                self.on_component_add(&item);
            }
        }

        self.strategy.on_target_set(self);
    }

    fn on_component_add(&self, component: &ComponentRef) {
        if let (Some(style), Some(root)) = (&self.options.target_style, component.root()) {
            self.host().add_class(root, style);
        }
        let watcher: Weak<dyn ComponentListener> =
            Rc::downgrade(&self.child_watcher) as Weak<dyn ComponentListener>;
        component.listeners().add(self.child_key, watcher);
        self.mark_dirty();
        self.strategy.on_component_added(self, component);
    }

    fn on_component_remove(&self, component: &ComponentRef) {
        if let (Some(style), Some(root)) = (&self.options.target_style, component.root()) {
            self.host().remove_class(root, style);
        }
        component.listeners().remove(self.child_key);
        match self.target().and_then(|t| t.layout_target()) {
            Some(target_el) => self.strategy.remove_child(self, component, target_el),
            None => self.forget(component.id()),
        }
        self.mark_dirty();
        self.strategy.on_component_removed(self, component);
    }

    // ---------------------------------------------------------------------
    // Activation and events
    // ---------------------------------------------------------------------

    pub fn activate(&self, component: &ComponentRef) -> Completion {
        self.strategy.activate(self, component)
    }

    pub fn active_item(&self) -> Option<ComponentRef> {
        self.strategy.active_item()
    }

    /// Forward a host event to the first placement whose node contains the
    /// event's origin. Hover events are ignored.
    pub fn on_host_event(&self, event: &HostEvent) {
        if event.kind.is_hover() {
            return;
        }
        let host = self.host();
        let hit = self
            .placements
            .borrow()
            .iter()
            .find(|p| host.contains(p.layout_el(), event.target))
            .cloned();
        if let Some(placement) = hit {
            placement.on_host_event(event);
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("strategy", &self.strategy.name())
            .field("dirty", &self.dirty.get())
            .field("running", &self.running.get())
            .field("first_layout", &self.first_layout.get())
            .field("placements", &self.placements.borrow().len())
            .finish()
    }
}

// =========================================================================
// Watchers
// =========================================================================

/// Listens to the layout target for add/remove/resize.
struct TargetWatcher {
    engine: Weak<Engine>,
}

impl ComponentListener for TargetWatcher {
    fn on_add(&self, _source: ComponentId, added: &ComponentRef) {
        if let Some(engine) = self.engine.upgrade() {
            engine.on_component_add(added);
        }
    }

    fn on_remove(&self, _source: ComponentId, removed: &ComponentRef) {
        if let Some(engine) = self.engine.upgrade() {
            engine.on_component_remove(removed);
        }
    }

    fn on_resize(&self, _source: ComponentId) {
        if let Some(engine) = self.engine.upgrade() {
            engine.mark_dirty();
        }
    }
}

/// Listens to each child for show/hide/activate.
struct ChildWatcher {
    engine: Weak<Engine>,
}

impl ChildWatcher {
    fn with_child(&self, source: ComponentId, f: impl FnOnce(&Engine, &ComponentRef)) {
        let Some(engine) = self.engine.upgrade() else {
            return;
        };
        if let Some(component) = engine.item_by_id(source) {
            f(&engine, &component);
        }
    }
}

impl ComponentListener for ChildWatcher {
    fn on_show(&self, source: ComponentId) {
        self.with_child(source, |engine, component| {
            engine.mark_dirty();
            engine.strategy.on_component_shown(engine, component);
        });
    }

    fn on_hide(&self, source: ComponentId) {
        self.with_child(source, |engine, component| {
            engine.mark_dirty();
            engine.strategy.on_component_hidden(engine, component);
        });
    }

    fn on_activate(&self, source: ComponentId) {
        self.with_child(source, |engine, component| {
            engine.strategy.on_component_activated(engine, component);
        });
    }
}

// =========================================================================
// Layout
// =========================================================================

/// Public handle to a layout. Cloning shares the same engine.
#[derive(Clone, Debug)]
pub struct Layout {
    engine: Rc<Engine>,
}

impl Layout {
    pub fn new(runtime: Runtime, strategy: impl Strategy + 'static) -> Self {
        Self::with_options(runtime, strategy, LayoutOptions::default())
    }

    pub fn with_options(runtime: Runtime, strategy: impl Strategy + 'static, options: LayoutOptions) -> Self {
        Self {
            engine: Engine::new(runtime, Box::new(strategy), options),
        }
    }

    pub fn engine(&self) -> &Rc<Engine> {
        &self.engine
    }

    pub fn runtime(&self) -> &Runtime {
        self.engine.runtime()
    }

    pub fn set_target(&self, target: Option<Rc<dyn LayoutTarget>>) {
        self.engine.set_target(target);
    }

    pub fn target(&self) -> Option<Rc<dyn LayoutTarget>> {
        self.engine.target()
    }

    /// Run a placement cycle if one is owed (or `force`). Returns whether a
    /// cycle ran.
    pub fn layout(&self, force: bool) -> bool {
        self.engine.layout(force)
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn is_dirty(&self) -> bool {
        self.engine.is_dirty()
    }

    pub fn mark_dirty(&self) {
        self.engine.mark_dirty();
    }

    pub fn activate(&self, component: &ComponentRef) -> Completion {
        self.engine.activate(component)
    }

    pub fn active_item(&self) -> Option<ComponentRef> {
        self.engine.active_item()
    }

    pub fn on_host_event(&self, event: &HostEvent) {
        self.engine.on_host_event(event);
    }

    pub fn placements(&self) -> Vec<Placement> {
        self.engine.placements()
    }
}
