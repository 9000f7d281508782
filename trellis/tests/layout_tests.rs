//! Integration tests for the placement cycle.
//!
//! These drive a `Container` end to end through the public API: rendering,
//! reconciliation, re-entrancy, error containment, event delegation and
//! target replacement.

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use common::{Broken, Harness, Recorder, capture_logs, component_ref};
use trellis::{
    ActivateOutcome, CardConfig, CardFit, Completion, Component, ComponentRef, Container, Engine, EventKind, HostEvent,
    HostTree, Layout, LayoutData, LayoutError, LayoutOptions, Leaf, Length, Minimal, NodeId, Placement,
    PlacementRenderer, StackConfig, Strategy, VerticalStack,
};
use trellis::style::{CardStyles, StackStyles};

fn minimal(h: &Harness) -> Rc<Container> {
    Container::new(Layout::new(h.runtime.clone(), Minimal))
}

#[test]
fn test_clean_cycle_is_idempotent() {
    let h = Harness::new();
    let container = minimal(&h);
    let a = Rc::new(Leaf::new("a"));
    container.add(a.clone());
    h.render(&container);

    assert_eq!(a.reconfigure_count(), 1);
    assert!(!container.layout().is_dirty());
    assert!(!container.layout().layout(false));
    assert_eq!(a.reconfigure_count(), 1);
    assert_eq!(container.layout().placements().len(), 1);

    assert!(container.layout().layout(true));
    assert_eq!(a.reconfigure_count(), 2);
}

#[test]
fn test_layout_requires_rendered_target() {
    let h = Harness::new();
    let container = minimal(&h);
    let a = Rc::new(Leaf::new("a"));
    container.add(a.clone());

    assert!(!container.layout().layout(true));
    assert!(container.layout().is_dirty());
    assert_eq!(a.reconfigure_count(), 0);
}

#[test]
fn test_cycle_reports_progress_to_target() {
    let h = Harness::new();
    let a = Rc::new(Leaf::new("a"));
    let recorder = Recorder::new(Layout::new(h.runtime.clone(), Minimal), vec![component_ref(&a)]);

    assert!(!recorder.layout().layout(true));
    assert_eq!(recorder.executed(), 0);

    let root = h.mount(recorder.as_ref());
    assert_eq!(h.dom.children(root), vec![a.root().unwrap()]);
    assert_eq!(recorder.executed(), 1);
    assert_eq!(recorder.completed(), 1);

    assert!(!recorder.layout().layout(false));
    assert!(recorder.layout().layout(true));
    assert_eq!(recorder.executed(), 2);
    assert_eq!(recorder.first_flags(), vec![true, false]);
}

struct Reentrant {
    nested: Rc<Cell<Option<bool>>>,
}

impl Strategy for Reentrant {
    fn name(&self) -> &'static str {
        "reentrant"
    }

    fn on_layout(&self, engine: &Engine, target: NodeId) {
        self.nested.set(Some(engine.layout(true)));
        assert!(engine.is_running());
        engine.render_all(target);
    }
}

#[test]
fn test_nested_layout_request_is_rejected() {
    let h = Harness::new();
    let nested = Rc::new(Cell::new(None));
    let layout = Layout::new(h.runtime.clone(), Reentrant { nested: nested.clone() });
    let container = Container::new(layout);
    container.add(Rc::new(Leaf::new("a")));
    container.add(Rc::new(Leaf::new("b")));
    h.render(&container);

    assert_eq!(nested.get(), Some(false));
    assert_eq!(container.layout().placements().len(), 2);
    assert!(!container.layout().is_dirty());
    assert!(!container.layout().is_running());
}

/// Requests a deferred cycle from inside a synchronous one.
struct Requesting {
    requested: Rc<RefCell<Option<Completion>>>,
}

impl Strategy for Requesting {
    fn name(&self) -> &'static str {
        "requesting"
    }

    fn on_layout(&self, engine: &Engine, target: NodeId) {
        let done = engine.perform_layout(true);
        assert_eq!(done.try_outcome(), None);
        assert!(engine.is_running());
        *self.requested.borrow_mut() = Some(done);
        engine.render_all(target);
    }
}

#[test]
fn test_request_during_cycle_resolves_with_it() {
    let h = Harness::new();
    let requested = Rc::new(RefCell::new(None));
    let layout = Layout::new(h.runtime.clone(), Requesting { requested: requested.clone() });
    let engine = layout.engine().clone();
    let container = Container::new(layout);
    let a = Rc::new(Leaf::new("a"));
    container.add(a.clone());

    let (_, logs) = capture_logs(|| h.render(&container));

    assert!(logs.contains("WARN"), "logs: {logs}");
    assert!(logs.contains("coalescing"), "logs: {logs}");
    assert!(!engine.is_running());
    assert_eq!(h.ev.pending(), 0);
    assert_eq!(a.reconfigure_count(), 1);
    let done = requested.borrow_mut().take().unwrap();
    assert_eq!(done.try_outcome(), Some(ActivateOutcome::Activated));
}

#[test]
fn test_reconciliation_keeps_attached_nodes() {
    let h = Harness::new();
    let container = minimal(&h);
    let leaves: Vec<Rc<Leaf>> = (0..3).map(|i| Rc::new(Leaf::new(format!("leaf{i}")))).collect();
    for leaf in &leaves {
        container.add(leaf.clone());
    }
    let root = h.render(&container);
    let before = h.dom.children(root);

    container.layout().layout(true);
    container.layout().layout(true);

    assert_eq!(h.dom.children(root), before);
    for leaf in &leaves {
        assert_eq!(leaf.render_count(), 1);
    }
}

#[test]
fn test_render_failure_is_contained() {
    let h = Harness::new();
    let container = minimal(&h);
    let a = Rc::new(Leaf::new("a"));
    let c = Rc::new(Leaf::new("c"));
    container.add(a.clone());
    container.add(Broken::new());
    container.add(c.clone());
    let root = h.render(&container);

    assert_eq!(h.sink.errors(), vec![LayoutError::render("broken", "template missing")]);
    assert_eq!(h.dom.children(root), vec![a.root().unwrap(), c.root().unwrap()]);
    assert_eq!(a.reconfigure_count(), 1);
    assert!(!container.layout().is_dirty());
}

#[test]
fn test_render_failure_logged_by_default_sink() {
    let (_, logs) = capture_logs(|| {
        let dom = Rc::new(trellis::Dom::new());
        let runtime = trellis::Runtime::new(dom.clone(), Rc::new(trellis::EventLoop::new()));
        let container = Container::new(Layout::new(runtime, Minimal));
        container.add(Broken::new());
        let host: Rc<dyn HostTree> = dom.clone();
        let body = host.create_element("body");
        container.render(&host, body, None).unwrap();
    });

    assert!(logs.contains("ERROR"), "logs: {logs}");
    assert!(logs.contains("template missing"), "logs: {logs}");
}

#[test]
fn test_events_delegate_to_owning_child() {
    let h = Harness::new();
    let container = minimal(&h);
    let a = Rc::new(Leaf::new("a"));
    let b = Rc::new(Leaf::new("b"));
    container.add(a.clone());
    container.add(b.clone());
    h.render(&container);

    // An event raised deep inside b's subtree.
    let inner = h.dom.create_element("span");
    h.dom.insert_child(b.root().unwrap(), inner, None).unwrap();
    container.layout().on_host_event(&HostEvent::click(inner));

    assert!(a.events().is_empty());
    assert_eq!(b.events(), vec![HostEvent::click(inner)]);
}

#[test]
fn test_hover_and_stray_events_are_dropped() {
    let h = Harness::new();
    let container = minimal(&h);
    let a = Rc::new(Leaf::new("a"));
    container.add(a.clone());
    h.render(&container);

    let root = a.root().unwrap();
    container.layout().on_host_event(&HostEvent::new(EventKind::MouseOver, root));
    container.layout().on_host_event(&HostEvent::new(EventKind::MouseLeave, root));
    let stray = h.dom.create_element("div");
    container.layout().on_host_event(&HostEvent::click(stray));

    assert!(a.events().is_empty());
}

#[test]
fn test_nested_container_lays_out_with_parent() {
    let h = Harness::new();
    let outer = minimal(&h);
    let inner = minimal(&h);
    let leaf = Rc::new(Leaf::new("leaf"));
    inner.add(leaf.clone());
    outer.add(inner.clone());
    let outer_root = h.render(&outer);

    let inner_root = inner.root().unwrap();
    assert_eq!(h.dom.parent(inner_root), Some(outer_root));
    assert_eq!(h.dom.parent(leaf.root().unwrap()), Some(inner_root));
    assert_eq!(leaf.reconfigure_count(), 1);

    outer.layout().on_host_event(&HostEvent::click(leaf.root().unwrap()));
    assert_eq!(leaf.events().len(), 1);
}

#[test]
fn test_detaching_target_removes_children() {
    let h = Harness::new();
    let container = minimal(&h);
    container.add(Rc::new(Leaf::new("a")));
    container.add(Rc::new(Leaf::new("b")));
    let root = h.render(&container);

    container.layout().set_target(None);

    assert_eq!(h.dom.child_count(root), 0);
    assert!(container.layout().placements().is_empty());
    assert!(container.layout().target().is_none());
    assert!(!container.layout().layout(true));
}

#[test]
fn test_target_style_and_extra_style() {
    let h = Harness::new();
    let options = LayoutOptions::new()
        .target_style("managed")
        .target_height(Length::px(120.0));
    let container = Container::new(Layout::with_options(h.runtime.clone(), Minimal, options));
    let wide = Rc::new(Leaf::new("wide").data(LayoutData::new().extra_style("wide")));
    container.add(wide.clone());
    let root = h.render(&container);

    let leaf_root = wide.root().unwrap();
    assert!(h.dom.has_class(root, "managed"));
    assert_eq!(h.dom.style(root, "height").as_deref(), Some("120px"));
    assert!(h.dom.has_class(leaf_root, "managed"));
    assert!(h.dom.has_class(leaf_root, "wide"));

    container.remove(&component_ref(&wide));
    assert!(!h.dom.has_class(leaf_root, "managed"));
}

struct Sectioned;

impl PlacementRenderer for Sectioned {
    fn render_component(
        &self,
        host: &Rc<dyn HostTree>,
        component: &ComponentRef,
        index: usize,
        target: NodeId,
        _size: usize,
    ) -> Result<Placement, LayoutError> {
        let section = host.create_element("section");
        host.insert_child(target, section, Some(index))?;
        let root = match component.root() {
            Some(root) => {
                host.insert_child(section, root, None)?;
                root
            }
            None => component.render(host, section, None)?,
        };
        Ok(Placement::new(section, Some(root), component.clone()))
    }
}

#[test]
fn test_custom_renderer() {
    let h = Harness::new();
    let options = LayoutOptions::new().renderer(Rc::new(Sectioned));
    let container = Container::new(Layout::with_options(h.runtime.clone(), Minimal, options));
    let a = Rc::new(Leaf::new("a"));
    container.add(a.clone());
    let root = h.render(&container);

    let section = h.dom.children(root)[0];
    assert_eq!(h.dom.tag(section).as_deref(), Some("section"));
    assert_eq!(h.dom.parent(a.root().unwrap()), Some(section));
    assert_eq!(container.layout().placements()[0].layout_el(), section);

    container.remove(&component_ref(&a));
    assert_eq!(h.dom.child_count(root), 0);
}

#[test]
fn test_resize_triggers_layout() {
    let h = Harness::new();
    let container = minimal(&h);
    let a = Rc::new(Leaf::new("a"));
    container.add(a.clone());
    h.render(&container);
    assert_eq!(a.reconfigure_count(), 1);

    container.notify_resize();
    assert_eq!(a.reconfigure_count(), 2);
    assert!(!container.layout().engine().is_first_layout());
}

#[test]
fn test_child_moves_between_containers() {
    let h = Harness::new();
    let stack = VerticalStack::new(StackConfig::new(), StackStyles::default());
    let left = Container::new(Layout::new(h.runtime.clone(), stack));
    let right = minimal(&h);
    let leaf = Rc::new(Leaf::new("leaf"));
    left.add(leaf.clone());
    h.render(&left);
    let right_root = h.render(&right);

    left.remove(&component_ref(&leaf));
    right.add(leaf.clone());

    assert_eq!(h.dom.parent(leaf.root().unwrap()), Some(right_root));
    assert_eq!(leaf.render_count(), 1);
    assert!(left.layout().placements().is_empty());
}

#[test]
fn test_coalesced_activation_shares_outcome() {
    let h = Harness::new();
    let layout = Layout::new(h.runtime.clone(), CardFit::new(CardConfig::new(), CardStyles::default()));
    let container = Container::new(layout);
    let cards: Vec<Rc<Leaf>> = (0..3).map(|i| Rc::new(Leaf::new(format!("card{i}")))).collect();
    for card in &cards {
        container.add(card.clone());
    }
    h.render(&container);

    let (pending, logs) = capture_logs(|| {
        let first = container.layout().activate(&component_ref(&cards[1]));
        let second = container.layout().activate(&component_ref(&cards[2]));
        (first, second)
    });
    let (first, second) = pending;
    assert!(logs.contains("coalescing"), "logs: {logs}");
    assert_eq!(first.try_outcome(), None);
    assert!(container.layout().is_running());

    h.ev.run_pending();

    assert_eq!(first.try_outcome(), Some(ActivateOutcome::Activated));
    assert_eq!(second.try_outcome(), Some(ActivateOutcome::Activated));
    let active = container.layout().active_item().unwrap();
    assert_eq!(active.id(), cards[2].id());
    assert!(cards[2].is_rendered());
    assert!(cards[1].is_hidden());
}

#[test]
fn test_minimal_activate_is_not_present() {
    let h = Harness::new();
    let container = minimal(&h);
    let a = Rc::new(Leaf::new("a"));
    container.add(a.clone());
    h.render(&container);

    let done = container.layout().activate(&component_ref(&a));
    assert_eq!(done.try_outcome(), Some(ActivateOutcome::NotPresent));
    assert!(container.layout().active_item().is_none());
}
