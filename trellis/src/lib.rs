//! Trellis: layout and reconciliation for trees of stateful UI components.
//!
//! A `Layout` decides, whenever its container is invalidated, which children
//! must be rendered into or moved within the host view tree, applies a
//! placement strategy and routes host input events to the child they belong
//! to. It never owns the view tree: hosts implement `HostTree`.
//!
//! # Architecture
//!
//! - `Engine` runs the placement cycle (dirty / running / first-layout state,
//!   reconciliation, placement records, event delegation, deferred cycles).
//! - A `Strategy` decides what placement means: `Minimal`, `VerticalStack`,
//!   `Zoned` or `CardFit`.
//! - A `LayoutTarget` (usually a `Container`) exposes the children and the
//!   node they go under.
//! - A `Runtime` bundles the host tree, a `Scheduler` for deferred work and
//!   an `ExceptionSink` for errors contained during placement.
//!
//! Everything runs on one UI thread; shared state is `Rc` + `Cell`/`RefCell`.
//!
//! # Usage
//!
//! ```ignore
//! use std::rc::Rc;
//! use trellis::*;
//!
//! let dom = Rc::new(Dom::new());
//! let runtime = Runtime::new(dom.clone(), Rc::new(EventLoop::new()));
//! let stack = VerticalStack::new(StackConfig::new().spacing(Length::px(8.0)), Default::default());
//! let container = Container::new(Layout::new(runtime, stack));
//! container.add(Rc::new(Leaf::new("title")));
//!
//! let host: Rc<dyn HostTree> = dom.clone();
//! let body = host.create_element("body");
//! container.render(&host, body, None)?;
//! ```

// Host primitives
pub mod dom;
pub mod event;

// Components and targets
pub mod component;
pub mod container;

// Placement data and styling
pub mod data;
pub mod style;

// Engine
pub mod completion;
pub mod engine;
pub mod placement;
pub mod schedule;

// Strategies
pub mod strategy;

mod error;

pub use completion::{ActivateOutcome, Completion};
pub use component::{
    ActivationAware, Component, ComponentId, ComponentListener, ComponentRef, Leaf, ListenerKey, Listeners,
};
pub use container::{Container, LayoutTarget};
pub use data::{CardData, LayoutData, StackData, ZoneData};
pub use dom::{Dom, HostTree, NodeId};
pub use engine::{Engine, ExceptionSink, Layout, LayoutOptions, LogSink, Runtime};
pub use error::LayoutError;
pub use event::{EventKind, HostEvent};
pub use placement::{DefaultRenderer, Placement, PlacementRenderer};
pub use schedule::{EventLoop, Scheduler, TokioScheduler};
pub use strategy::{CardConfig, CardFit, Minimal, StackConfig, Strategy, VerticalStack, Zone, Zoned, ZonedConfig};
pub use style::{Effect, HAlign, Insets, Length, Separator, Theme, VAlign};
