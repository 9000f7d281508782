//! Host View Tree
//!
//! The layout engine never owns the visual tree. It drives a host through the
//! `HostTree` trait: create nodes, toggle classes and styles, move nodes
//! around and ask ancestry questions. Nodes are opaque `NodeId` handles.
//!
//! `Dom` is an in-memory arena implementation. It is what the tests run
//! against and is a reasonable host for headless rendering.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::LayoutError;

/// Opaque handle to a node in a host tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Get the raw numeric value.
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The host view-tree primitives consumed by the engine.
///
/// All methods take `&self`: hosts are shared between the layout, its
/// strategies and every component, so implementations use interior
/// mutability and must not call back into the engine.
pub trait HostTree {
    /// Create a detached element.
    fn create_element(&self, tag: &str) -> NodeId;

    fn add_class(&self, node: NodeId, class: &str);

    fn remove_class(&self, node: NodeId, class: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Set an inline style property (e.g. `padding-top` to `8px`).
    fn set_style(&self, node: NodeId, property: &str, value: &str);

    fn clear_style(&self, node: NodeId, property: &str);

    fn style(&self, node: NodeId, property: &str) -> Option<String>;

    fn set_attribute(&self, node: NodeId, name: &str, value: &str);

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children of `node` in document order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn child_count(&self, node: NodeId) -> usize {
        self.children(node).len()
    }

    /// Insert `child` under `parent` at `index`.
    ///
    /// The child is detached from any previous parent first. `None`, or an
    /// index at or beyond the current child count, appends.
    fn insert_child(
        &self,
        parent: NodeId,
        child: NodeId,
        index: Option<usize>,
    ) -> Result<(), LayoutError>;

    /// Detach `node` from its parent. Detached nodes stay valid and may be
    /// inserted again.
    fn remove(&self, node: NodeId);

    /// Inclusive ancestry test: true when `node` is `ancestor` or lies
    /// somewhere beneath it.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    fn set_visible(&self, node: NodeId, visible: bool) {
        if visible {
            self.clear_style(node, "display");
        } else {
            self.set_style(node, "display", "none");
        }
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.style(node, "display").as_deref() != Some("none")
    }
}

// =========================================================================
// Dom
// =========================================================================

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    styles: BTreeMap<String, String>,
    attributes: BTreeMap<String, String>,
}

/// In-memory arena host tree.
///
/// Nodes are never freed; removal only detaches. Node ids index the arena.
#[derive(Debug, Default)]
pub struct Dom {
    nodes: RefCell<Vec<NodeData>>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag name of a node, if it exists.
    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.with_node(node, |n| n.tag.clone())
    }

    /// Class list of a node in insertion order.
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.with_node(node, |n| n.classes.clone()).unwrap_or_default()
    }

    /// Number of nodes ever created.
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Render the subtree under `node` as indented text. Handy for debugging
    /// layouts in tests.
    pub fn outline(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.outline_into(node, 0, &mut out);
        out
    }

    fn outline_into(&self, node: NodeId, depth: usize, out: &mut String) {
        let line = self.with_node(node, |n| {
            let mut line = format!("{}<{}", "  ".repeat(depth), n.tag);
            if !n.classes.is_empty() {
                line.push_str(&format!(" class=\"{}\"", n.classes.join(" ")));
            }
            if !n.styles.is_empty() {
                let style: Vec<String> = n.styles.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                line.push_str(&format!(" style=\"{}\"", style.join("; ")));
            }
            line.push('>');
            line
        });
        if let Some(line) = line {
            out.push_str(&line);
            out.push('\n');
        }
        for child in self.children(node) {
            self.outline_into(child, depth + 1, out);
        }
    }

    fn with_node<R>(&self, node: NodeId, f: impl FnOnce(&NodeData) -> R) -> Option<R> {
        let nodes = self.nodes.borrow();
        nodes.get(node.0 as usize).map(f)
    }

    fn with_node_mut<R>(&self, node: NodeId, f: impl FnOnce(&mut NodeData) -> R) -> Option<R> {
        let mut nodes = self.nodes.borrow_mut();
        nodes.get_mut(node.0 as usize).map(f)
    }

    fn exists(&self, node: NodeId) -> bool {
        (node.0 as usize) < self.nodes.borrow().len()
    }

    fn detach(nodes: &mut [NodeData], node: NodeId) {
        let Some(parent) = nodes.get(node.0 as usize).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = nodes.get_mut(parent.0 as usize) {
            p.children.retain(|c| *c != node);
        }
        if let Some(n) = nodes.get_mut(node.0 as usize) {
            n.parent = None;
        }
    }
}

impl HostTree for Dom {
    fn create_element(&self, tag: &str) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        let id = NodeId(nodes.len() as u64);
        nodes.push(NodeData {
            tag: tag.to_ascii_lowercase(),
            ..NodeData::default()
        });
        id
    }

    fn add_class(&self, node: NodeId, class: &str) {
        if class.is_empty() {
            return;
        }
        self.with_node_mut(node, |n| {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_string());
            }
        });
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        self.with_node_mut(node, |n| n.classes.retain(|c| c != class));
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.with_node(node, |n| n.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        self.with_node_mut(node, |n| {
            n.styles.insert(property.to_string(), value.to_string());
        });
    }

    fn clear_style(&self, node: NodeId, property: &str) {
        self.with_node_mut(node, |n| {
            n.styles.remove(property);
        });
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.with_node(node, |n| n.styles.get(property).cloned()).flatten()
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        self.with_node_mut(node, |n| {
            n.attributes.insert(name.to_string(), value.to_string());
        });
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.with_node(node, |n| n.attributes.get(name).cloned()).flatten()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.with_node(node, |n| n.parent).flatten()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.with_node(node, |n| n.children.clone()).unwrap_or_default()
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.with_node(node, |n| n.children.len()).unwrap_or(0)
    }

    fn insert_child(
        &self,
        parent: NodeId,
        child: NodeId,
        index: Option<usize>,
    ) -> Result<(), LayoutError> {
        if !self.exists(parent) {
            return Err(LayoutError::UnknownNode(parent));
        }
        if !self.exists(child) {
            return Err(LayoutError::UnknownNode(child));
        }
        if self.contains(child, parent) {
            return Err(LayoutError::Cycle { parent, child });
        }

        let mut nodes = self.nodes.borrow_mut();
        Self::detach(&mut nodes, child);
        let siblings = &mut nodes[parent.0 as usize].children;
        match index {
            Some(i) if i < siblings.len() => siblings.insert(i, child),
            _ => siblings.push(child),
        }
        nodes[child.0 as usize].parent = Some(parent);
        Ok(())
    }

    fn remove(&self, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        Self::detach(&mut nodes, node);
    }
}
