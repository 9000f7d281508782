//! Layout Targets
//!
//! A `LayoutTarget` is a component whose children a layout places. It
//! exposes the ordered child list and the host node children go under, and
//! hears about cycle progress. Children are owned by the target; the layout
//! only reads the list and learns about changes through the target's
//! `on_add` / `on_remove` / `on_resize` events.
//!
//! `Container` is the stock target: a single element owning a `Layout`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::component::{Component, ComponentId, ComponentRef, Listeners};
use crate::data::LayoutData;
use crate::dom::{HostTree, NodeId};
use crate::engine::Layout;
use crate::error::LayoutError;
use crate::event::HostEvent;

/// The contract a component satisfies to be laid out.
pub trait LayoutTarget: Component {
    /// Children in placement order.
    fn items(&self) -> Vec<ComponentRef>;

    fn item_at(&self, index: usize) -> Option<ComponentRef> {
        self.items().get(index).cloned()
    }

    fn item_count(&self) -> usize {
        self.items().len()
    }

    /// The node children are placed under, once rendered.
    fn layout_target(&self) -> Option<NodeId>;

    /// The placement step of a cycle has finished.
    fn on_layout_executed(&self) {}

    /// A cycle has finished, including reconfiguring children.
    fn on_layout_complete(&self, _first_layout: bool) {}
}

// =========================================================================
// Container
// =========================================================================

/// A component that lays out its children with a `Layout`.
pub struct Container {
    id: ComponentId,
    name: String,
    tag: String,
    class: Option<String>,
    data: Option<LayoutData>,
    layout: Layout,
    items: RefCell<Vec<ComponentRef>>,
    root: Cell<Option<NodeId>>,
    hidden: Cell<bool>,
    listeners: Listeners,
}

/// Builder for `Container`.
pub struct ContainerBuilder {
    name: String,
    tag: String,
    class: Option<String>,
    data: Option<LayoutData>,
    layout: Layout,
}

impl ContainerBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Placement hints for the layout this container is placed by.
    pub fn data(mut self, data: LayoutData) -> Self {
        self.data = Some(data);
        self
    }

    /// Build the container and make it its layout's target.
    pub fn build(self) -> Rc<Container> {
        let container = Rc::new(Container {
            id: ComponentId::new(),
            name: self.name,
            tag: self.tag,
            class: self.class,
            data: self.data,
            layout: self.layout,
            items: RefCell::new(Vec::new()),
            root: Cell::new(None),
            hidden: Cell::new(false),
            listeners: Listeners::new(),
        });
        let target: Rc<dyn LayoutTarget> = container.clone();
        container.layout.set_target(Some(target));
        container
    }
}

impl Container {
    /// An unnamed container laid out by `layout`.
    pub fn new(layout: Layout) -> Rc<Self> {
        Self::builder(layout).build()
    }

    pub fn builder(layout: Layout) -> ContainerBuilder {
        ContainerBuilder {
            name: "container".into(),
            tag: "div".into(),
            class: None,
            data: None,
            layout,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn host(&self) -> &Rc<dyn HostTree> {
        self.layout.runtime().host()
    }

    /// Append a child. Returns `false` if it is already a child.
    pub fn add(&self, component: ComponentRef) -> bool {
        let index = self.items.borrow().len();
        self.insert(index, component)
    }

    /// Insert a child at `index` (clamped to the child count). Returns
    /// `false` if it is already a child.
    pub fn insert(&self, index: usize, component: ComponentRef) -> bool {
        let id = component.id();
        if self.items.borrow().iter().any(|c| c.id() == id) {
            tracing::warn!("{}: {} ({}) is already a child", self.name, component.name(), id);
            return false;
        }

        if let Some(root) = component.root() {
            self.host().remove(root);
        }
        {
            let mut items = self.items.borrow_mut();
            let index = index.min(items.len());
            items.insert(index, component.clone());
        }

        let source = self.id;
        self.listeners.emit(|l| l.on_add(source, &component));
        if self.is_rendered() {
            self.layout.layout(false);
        }
        true
    }

    /// Remove a child. Returns `false` if it was not a child.
    pub fn remove(&self, component: &ComponentRef) -> bool {
        let id = component.id();
        let removed = {
            let mut items = self.items.borrow_mut();
            items
                .iter()
                .position(|c| c.id() == id)
                .map(|pos| items.remove(pos))
        };
        let Some(removed) = removed else {
            return false;
        };

        let source = self.id;
        self.listeners.emit(|l| l.on_remove(source, &removed));
        if self.is_rendered() {
            self.layout.layout(false);
        }
        true
    }

    /// Tell the layout the container changed size.
    pub fn notify_resize(&self) {
        let source = self.id;
        self.listeners.emit(|l| l.on_resize(source));
        if self.is_rendered() {
            self.layout.layout(false);
        }
    }
}

impl LayoutTarget for Container {
    fn items(&self) -> Vec<ComponentRef> {
        self.items.borrow().clone()
    }

    fn item_count(&self) -> usize {
        self.items.borrow().len()
    }

    fn layout_target(&self) -> Option<NodeId> {
        self.root.get()
    }
}

impl Component for Container {
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
        if self.hidden.get() {
            host.set_visible(el, false);
        }
        self.root.set(Some(el));

        self.layout.layout(true);
        Ok(el)
    }

    fn root(&self) -> Option<NodeId> {
        self.root.get()
    }

    fn show(&self) {
        if !self.hidden.replace(false) {
            return;
        }
        if let Some(root) = self.root.get() {
            self.host().set_visible(root, true);
        }
        let id = self.id;
        self.listeners.emit(|l| l.on_show(id));
    }

    fn hide(&self) {
        if self.hidden.replace(true) {
            return;
        }
        if let Some(root) = self.root.get() {
            self.host().set_visible(root, false);
        }
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
        self.layout.layout(false);
    }

    fn layout_data(&self) -> Option<LayoutData> {
        self.data.clone()
    }

    fn on_host_event(&self, event: &HostEvent) {
        self.layout.on_host_event(event);
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("items", &self.items.borrow().len())
            .field("root", &self.root.get())
            .finish()
    }
}
