//! Layout error types.

use thiserror::Error;

use crate::dom::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("cannot insert {child} into its own descendant {parent}")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("render failed for {component}: {reason}")]
    Render { component: String, reason: String },

    #[error("{0} has not been rendered")]
    NotRendered(String),
}

impl LayoutError {
    /// Convenience for component implementations reporting a failed render.
    pub fn render(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Render {
            component: component.into(),
            reason: reason.into(),
        }
    }
}
