//! Component Protocol
//!
//! Components are the units a layout places. They are shared (`Rc`) between
//! the container that owns them and the layout that places them, so every
//! method takes `&self` and implementations keep their state in `Cell` /
//! `RefCell`.
//!
//! # Events
//!
//! Components publish show/hide/activate (and, for containers, add/remove/
//! resize) through a `Listeners` registry. Registries hold `Weak` references
//! keyed by `ListenerKey`, so a layout listening to its children never keeps
//! them alive and never forms an ownership cycle with them.
//!
//! # Capabilities
//!
//! Optional behaviour is discovered through capability queries rather than
//! type inspection: `activation()` returns the component's `ActivationAware`
//! facet if it has one.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::data::LayoutData;
use crate::dom::{HostTree, NodeId};
use crate::error::LayoutError;
use crate::event::HostEvent;

static COMPONENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
static LISTENER_KEY_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u64);

impl ComponentId {
    /// Create a new unique component ID.
    pub fn new() -> Self {
        Self(COMPONENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Shared handle to a component.
pub type ComponentRef = Rc<dyn Component>;

/// Components that want to know when a layout makes them the active item.
pub trait ActivationAware {
    /// The component has just become the active item.
    fn on_activated(&self);

    /// The component was activated again while already active.
    fn on_reactivated(&self);
}

/// A placeable UI component.
pub trait Component {
    fn id(&self) -> ComponentId;

    /// Human-readable identity used in logs.
    fn name(&self) -> &str {
        "component"
    }

    /// Render the component's root node under `parent` at `index`
    /// (`None` appends) and return the root.
    fn render(
        &self,
        host: &Rc<dyn HostTree>,
        parent: NodeId,
        index: Option<usize>,
    ) -> Result<NodeId, LayoutError>;

    /// The rendered root node, `None` until first render.
    fn root(&self) -> Option<NodeId>;

    fn is_rendered(&self) -> bool {
        self.root().is_some()
    }

    fn show(&self);

    fn hide(&self);

    fn is_hidden(&self) -> bool;

    fn listeners(&self) -> &Listeners;

    /// Re-run any nested layout. Called after the parent's placement pass.
    fn reconfigure(&self) {}

    /// Per-component placement hints.
    fn layout_data(&self) -> Option<LayoutData> {
        None
    }

    /// Capability query for activation awareness.
    fn activation(&self) -> Option<&dyn ActivationAware> {
        None
    }

    /// An input event delegated to this component by a layout.
    fn on_host_event(&self, _event: &HostEvent) {}
}

// =========================================================================
// Listeners
// =========================================================================

/// Receives component and container events. All methods default to no-ops.
pub trait ComponentListener {
    fn on_show(&self, _source: ComponentId) {}

    fn on_hide(&self, _source: ComponentId) {}

    /// The component asked to be made active by its layout.
    fn on_activate(&self, _source: ComponentId) {}

    /// A container was resized.
    fn on_resize(&self, _source: ComponentId) {}

    /// A child was added to a container.
    fn on_add(&self, _source: ComponentId, _added: &ComponentRef) {}

    /// A child was removed from a container.
    fn on_remove(&self, _source: ComponentId, _removed: &ComponentRef) {}

    fn on_dispose(&self, _source: ComponentId) {}
}

/// Registration key for a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerKey(u64);

impl ListenerKey {
    pub fn new() -> Self {
        Self(LISTENER_KEY_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ListenerKey {
    fn default() -> Self {
        Self::new()
    }
}

/// A registry of weakly held listeners.
#[derive(Default)]
pub struct Listeners {
    entries: RefCell<Vec<(ListenerKey, Weak<dyn ComponentListener>)>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Re-registering a key replaces the previous entry.
    pub fn add(&self, key: ListenerKey, listener: Weak<dyn ComponentListener>) {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|(k, _)| *k != key);
        entries.push((key, listener));
    }

    pub fn remove(&self, key: ListenerKey) {
        self.entries.borrow_mut().retain(|(k, _)| *k != key);
    }

    pub fn contains(&self, key: ListenerKey) -> bool {
        self.entries.borrow().iter().any(|(k, _)| *k == key)
    }

    /// Number of live listeners.
    pub fn len(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(_, l)| l.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke `f` on every live listener in registration order.
    ///
    /// The registry is not borrowed while listeners run, so a listener may
    /// add or remove registrations (including its own).
    pub fn emit(&self, f: impl Fn(&dyn ComponentListener)) {
        let live: Vec<Rc<dyn ComponentListener>> = {
            let mut entries = self.entries.borrow_mut();
            entries.retain(|(_, l)| l.strong_count() > 0);
            entries.iter().filter_map(|(_, l)| l.upgrade()).collect()
        };
        for listener in live {
            f(listener.as_ref());
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}

// =========================================================================
// Leaf
// =========================================================================

/// The simplest component: a single element with an optional class.
///
/// Keeps counters for renders, reconfigures and activations, and records
/// delegated events, which makes it useful for checking what a layout did.
pub struct Leaf {
    id: ComponentId,
    name: String,
    tag: String,
    class: Option<String>,
    data: Option<LayoutData>,
    activation_aware: bool,
    host: RefCell<Option<Rc<dyn HostTree>>>,
    root: Cell<Option<NodeId>>,
    hidden: Cell<bool>,
    listeners: Listeners,
    renders: Cell<usize>,
    reconfigures: Cell<usize>,
    activations: Cell<usize>,
    reactivations: Cell<usize>,
    events: RefCell<Vec<HostEvent>>,
}

impl Leaf {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ComponentId::new(),
            name: name.into(),
            tag: "div".into(),
            class: None,
            data: None,
            activation_aware: false,
            host: RefCell::new(None),
            root: Cell::new(None),
            hidden: Cell::new(false),
            listeners: Listeners::new(),
            renders: Cell::new(0),
            reconfigures: Cell::new(0),
            activations: Cell::new(0),
            reactivations: Cell::new(0),
            events: RefCell::new(Vec::new()),
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn data(mut self, data: LayoutData) -> Self {
        self.data = Some(data);
        self
    }

    /// Start hidden.
    pub fn hidden(self) -> Self {
        self.hidden.set(true);
        self
    }

    /// Opt in to the `ActivationAware` capability.
    pub fn activation_aware(mut self) -> Self {
        self.activation_aware = true;
        self
    }

    /// Ask whichever layout manages this leaf to make it active.
    pub fn request_activation(&self) {
        let id = self.id;
        self.listeners.emit(|l| l.on_activate(id));
    }

    pub fn render_count(&self) -> usize {
        self.renders.get()
    }

    pub fn reconfigure_count(&self) -> usize {
        self.reconfigures.get()
    }

    pub fn activation_count(&self) -> usize {
        self.activations.get()
    }

    pub fn reactivation_count(&self) -> usize {
        self.reactivations.get()
    }

    /// Events delegated to this leaf so far.
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.borrow().clone()
    }

    fn apply_visibility(&self) {
        let host = self.host.borrow().clone();
        if let (Some(host), Some(root)) = (host, self.root.get()) {
            host.set_visible(root, !self.hidden.get());
        }
    }
}

impl Component for Leaf {
    fn id(&self) -> ComponentId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn render(
        &self,
        host: &Rc<dyn HostTree>,
        parent: NodeId,
        index: Option<usize>,
    ) -> Result<NodeId, LayoutError> {
        let el = host.create_element(&self.tag);
        if let Some(class) = &self.class {
            host.add_class(el, class);
        }
        host.set_attribute(el, "data-component", &self.name);
        host.insert_child(parent, el, index)?;

        *self.host.borrow_mut() = Some(host.clone());
        self.root.set(Some(el));
        self.renders.set(self.renders.get() + 1);
        self.apply_visibility();
        Ok(el)
    }

    fn root(&self) -> Option<NodeId> {
        self.root.get()
    }

    fn show(&self) {
        if !self.hidden.replace(false) {
            return;
        }
        self.apply_visibility();
        let id = self.id;
        self.listeners.emit(|l| l.on_show(id));
    }

    fn hide(&self) {
        if self.hidden.replace(true) {
            return;
        }
        self.apply_visibility();
        let id = self.id;
        self.listeners.emit(|l| l.on_hide(id));
    }

    fn is_hidden(&self) -> bool {
        self.hidden.get()
    }

    fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    fn reconfigure(&self) {
        self.reconfigures.set(self.reconfigures.get() + 1);
    }

    fn layout_data(&self) -> Option<LayoutData> {
        self.data.clone()
    }

    fn activation(&self) -> Option<&dyn ActivationAware> {
        if self.activation_aware {
            Some(self)
        } else {
            None
        }
    }

    fn on_host_event(&self, event: &HostEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

impl ActivationAware for Leaf {
    fn on_activated(&self) {
        self.activations.set(self.activations.get() + 1);
    }

    fn on_reactivated(&self) {
        self.reactivations.set(self.reactivations.get() + 1);
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaf")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("root", &self.root.get())
            .field("hidden", &self.hidden.get())
            .finish()
    }
}
