//! Placement records and the pluggable renderer that produces them.

use std::fmt;
use std::rc::Rc;

use crate::component::{ComponentId, ComponentRef};
use crate::dom::{HostTree, NodeId};
use crate::error::LayoutError;
use crate::event::HostEvent;

/// The result of placing one component: the node the layout put under its
/// host (a wrapper, or the component root itself) and the component's root.
#[derive(Clone)]
pub struct Placement {
    layout_el: NodeId,
    component_el: Option<NodeId>,
    component: ComponentRef,
}

impl Placement {
    pub fn new(layout_el: NodeId, component_el: Option<NodeId>, component: ComponentRef) -> Self {
        Self {
            layout_el,
            component_el,
            component,
        }
    }

    /// The node owned by the layout. Event delegation tests ancestry against it.
    pub fn layout_el(&self) -> NodeId {
        self.layout_el
    }

    pub fn component_el(&self) -> Option<NodeId> {
        self.component_el
    }

    pub fn component(&self) -> &ComponentRef {
        &self.component
    }

    pub fn component_id(&self) -> ComponentId {
        self.component.id()
    }

    /// Forward a delegated host event to the placed component.
    pub fn on_host_event(&self, event: &HostEvent) {
        self.component.on_host_event(event);
    }
}

impl fmt::Debug for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Placement")
            .field("layout_el", &self.layout_el)
            .field("component_el", &self.component_el)
            .field("component", &self.component.id())
            .finish()
    }
}

/// Renders or moves a component into a target node.
pub trait PlacementRenderer {
    /// Place `component` under `target` at `index`. `size` is the number of
    /// items being placed in this pass.
    fn render_component(
        &self,
        host: &Rc<dyn HostTree>,
        component: &ComponentRef,
        index: usize,
        target: NodeId,
        size: usize,
    ) -> Result<Placement, LayoutError>;
}

/// Re-parents an existing root at the index, otherwise renders fresh.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRenderer;

impl PlacementRenderer for DefaultRenderer {
    fn render_component(
        &self,
        host: &Rc<dyn HostTree>,
        component: &ComponentRef,
        index: usize,
        target: NodeId,
        _size: usize,
    ) -> Result<Placement, LayoutError> {
        let root = match component.root() {
            Some(root) => {
                host.insert_child(target, root, Some(index))?;
                root
            }
            None => component.render(host, target, Some(index))?,
        };
        Ok(Placement::new(root, Some(root), component.clone()))
    }
}
