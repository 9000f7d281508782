//! Host input events routed through layouts to the owning child.

use crate::dom::NodeId;

/// Kind of host input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Click,
    DoubleClick,
    MouseDown,
    MouseUp,
    MouseMove,
    MouseOver,
    MouseOut,
    MouseEnter,
    MouseLeave,
    KeyDown,
    KeyUp,
    KeyPress,
    Focus,
    Blur,
    Input,
    Change,
    Scroll,
    /// Anything the host reports that has no dedicated variant.
    Other(String),
}

impl EventKind {
    /// Pointer enter/leave style events. Layouts do not delegate these.
    pub fn is_hover(&self) -> bool {
        matches!(
            self,
            EventKind::MouseOver | EventKind::MouseOut | EventKind::MouseEnter | EventKind::MouseLeave
        )
    }
}

/// An input event raised by the host at a particular node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEvent {
    pub kind: EventKind,
    /// The node the event originated at.
    pub target: NodeId,
}

impl HostEvent {
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self { kind, target }
    }

    pub fn click(target: NodeId) -> Self {
        Self::new(EventKind::Click, target)
    }
}
