//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use trellis::{
    Component, ComponentId, ComponentRef, Container, Dom, EventLoop, ExceptionSink, HostTree, Layout, LayoutError,
    LayoutTarget, Listeners, NodeId, Runtime,
};

/// A dom, an event loop and a runtime over both, with a collecting sink.
pub struct Harness {
    pub dom: Rc<Dom>,
    pub ev: Rc<EventLoop>,
    pub sink: Rc<CollectingSink>,
    pub runtime: Runtime,
}

impl Harness {
    pub fn new() -> Self {
        let dom = Rc::new(Dom::new());
        let ev = Rc::new(EventLoop::new());
        let sink = Rc::new(CollectingSink::default());
        let runtime = Runtime::new(dom.clone(), ev.clone()).sink(sink.clone());
        Self { dom, ev, sink, runtime }
    }

    pub fn host(&self) -> Rc<dyn HostTree> {
        self.dom.clone()
    }

    /// Render `container` under a fresh body element.
    pub fn render(&self, container: &Rc<Container>) -> NodeId {
        let body = self.dom.create_element("body");
        container
            .render(&self.host(), body, None)
            .expect("container renders")
    }

    /// Render any component under a fresh body element.
    pub fn mount(&self, component: &dyn Component) -> NodeId {
        let body = self.dom.create_element("body");
        component.render(&self.host(), body, None).expect("component renders")
    }
}

/// Records every error reported during placement.
#[derive(Default)]
pub struct CollectingSink {
    errors: RefCell<Vec<LayoutError>>,
}

impl CollectingSink {
    pub fn errors(&self) -> Vec<LayoutError> {
        self.errors.borrow().clone()
    }
}

impl ExceptionSink for CollectingSink {
    fn report(&self, error: &LayoutError) {
        self.errors.borrow_mut().push(error.clone());
    }
}

/// A component whose render always fails.
pub struct Broken {
    id: ComponentId,
    listeners: Listeners,
}

impl Broken {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            id: ComponentId::new(),
            listeners: Listeners::new(),
        })
    }
}

impl Component for Broken {
    fn id(&self) -> ComponentId {
        self.id
    }

    fn name(&self) -> &str {
        "broken"
    }

    fn render(&self, _host: &Rc<dyn HostTree>, _parent: NodeId, _index: Option<usize>) -> Result<NodeId, LayoutError> {
        Err(LayoutError::render("broken", "template missing"))
    }

    fn root(&self) -> Option<NodeId> {
        None
    }

    fn show(&self) {}

    fn hide(&self) {}

    fn is_hidden(&self) -> bool {
        false
    }

    fn listeners(&self) -> &Listeners {
        &self.listeners
    }
}

/// A layout target with a fixed child list that counts cycle callbacks.
pub struct Recorder {
    id: ComponentId,
    layout: Layout,
    items: Vec<ComponentRef>,
    root: Cell<Option<NodeId>>,
    listeners: Listeners,
    executed: Cell<usize>,
    completed: Cell<usize>,
    first: RefCell<Vec<bool>>,
}

impl Recorder {
    pub fn new(layout: Layout, items: Vec<ComponentRef>) -> Rc<Self> {
        let recorder = Rc::new(Self {
            id: ComponentId::new(),
            layout,
            items,
            root: Cell::new(None),
            listeners: Listeners::new(),
            executed: Cell::new(0),
            completed: Cell::new(0),
            first: RefCell::new(Vec::new()),
        });
        let target: Rc<dyn LayoutTarget> = recorder.clone();
        recorder.layout.set_target(Some(target));
        recorder
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn executed(&self) -> usize {
        self.executed.get()
    }

    pub fn completed(&self) -> usize {
        self.completed.get()
    }

    /// The `first_layout` flag of every completed cycle, in order.
    pub fn first_flags(&self) -> Vec<bool> {
        self.first.borrow().clone()
    }
}

impl Component for Recorder {
    fn id(&self) -> ComponentId {
        self.id
    }

    fn name(&self) -> &str {
        "recorder"
    }

    fn render(&self, host: &Rc<dyn HostTree>, parent: NodeId, index: Option<usize>) -> Result<NodeId, LayoutError> {
        let el = host.create_element("div");
        host.insert_child(parent, el, index)?;
        self.root.set(Some(el));
        self.layout.layout(true);
        Ok(el)
    }

    fn root(&self) -> Option<NodeId> {
        self.root.get()
    }

    fn show(&self) {}

    fn hide(&self) {}

    fn is_hidden(&self) -> bool {
        false
    }

    fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    fn reconfigure(&self) {
        self.layout.layout(false);
    }
}

impl LayoutTarget for Recorder {
    fn items(&self) -> Vec<ComponentRef> {
        self.items.clone()
    }

    fn layout_target(&self) -> Option<NodeId> {
        self.root.get()
    }

    fn on_layout_executed(&self) {
        self.executed.set(self.executed.get() + 1);
    }

    fn on_layout_complete(&self, first_layout: bool) {
        self.completed.set(self.completed.get() + 1);
        self.first.borrow_mut().push(first_layout);
    }
}

pub fn component_ref<C: Component + 'static>(component: &Rc<C>) -> ComponentRef {
    component.clone()
}

// =========================================================================
// Log capture
// =========================================================================

#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().expect("log buffer lock");
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber that writes every event into a buffer and
/// return the captured text alongside the result.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer.contents())
}
