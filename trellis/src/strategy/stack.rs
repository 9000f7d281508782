//! Vertical Stack
//!
//! Each child is placed inside its own wrapper element. Wrappers carry the
//! child's alignment and side padding, mirror its visibility (so a hidden
//! child leaves no gap) and get a positional class: `only`, `first`,
//! `middle` or `last`.
//!
//! Positions are computed over the visible wrappers only and recomputed
//! whenever a child is placed, shown, hidden or removed. With one visible
//! wrapper it is `only`; otherwise the first is `first`, the last is `last`
//! and the rest are `middle`. Spacing above the first and below the last
//! wrapper is suppressed unless `spacing_includes_first_and_last` is set.
//! Separator lines are drawn above every visible wrapper except the first.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Strategy;
use crate::component::{ComponentId, ComponentRef};
use crate::data::{compose_with, ResolvedStackData, StackData};
use crate::dom::{HostTree, NodeId};
use crate::engine::Engine;
use crate::error::LayoutError;
use crate::placement::Placement;
use crate::style::{HAlign, Length, Separator, StackStyles};

/// Vertical-stack configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Apply spacing above the first and below the last item too.
    pub spacing_includes_first_and_last: bool,
    /// Hints every child starts from.
    pub baseline: StackData,
}

impl StackConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spacing_includes_first_and_last(mut self, include: bool) -> Self {
        self.spacing_includes_first_and_last = include;
        self
    }

    pub fn spacing_above(mut self, spacing: Length) -> Self {
        self.baseline = self.baseline.spacing_above(spacing);
        self
    }

    pub fn spacing_below(mut self, spacing: Length) -> Self {
        self.baseline = self.baseline.spacing_below(spacing);
        self
    }

    pub fn spacing(mut self, spacing: Length) -> Self {
        self.baseline = self.baseline.spacing(spacing);
        self
    }

    pub fn padding_side(mut self, padding: Length) -> Self {
        self.baseline = self.baseline.padding_side(padding);
        self
    }

    pub fn align(mut self, align: HAlign) -> Self {
        self.baseline = self.baseline.align(align);
        self
    }

    pub fn separator(mut self, separator: Separator) -> Self {
        self.baseline = self.baseline.separator(separator);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Only,
    First,
    Middle,
    Last,
}

#[derive(Debug, Clone, Copy)]
struct Wrapper {
    el: NodeId,
    hidden: bool,
    data: ResolvedStackData,
}

/// Stacks children top to bottom, one wrapper per child.
#[derive(Debug, Default)]
pub struct VerticalStack {
    config: StackConfig,
    styles: StackStyles,
    wrappers: RefCell<HashMap<ComponentId, Wrapper>>,
}

impl VerticalStack {
    pub fn new(config: StackConfig, styles: StackStyles) -> Self {
        Self {
            config,
            styles,
            wrappers: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    fn resolve(&self, component: &ComponentRef) -> ResolvedStackData {
        let over = component.layout_data().and_then(|d| d.stack);
        compose_with(&self.config.baseline, over.as_ref()).resolve()
    }

    fn set_hidden(&self, engine: &Engine, component: &ComponentRef, hidden: bool) {
        let el = {
            let mut wrappers = self.wrappers.borrow_mut();
            let Some(wrapper) = wrappers.get_mut(&component.id()) else {
                return;
            };
            wrapper.hidden = hidden;
            wrapper.el
        };
        engine.host().set_visible(el, !hidden);
        self.apply_positional(engine);
    }

    /// Reclassify the visible wrappers in item order.
    fn apply_positional(&self, engine: &Engine) {
        let items = engine.items();
        let visible: Vec<Wrapper> = {
            let wrappers = self.wrappers.borrow();
            items
                .iter()
                .filter_map(|c| wrappers.get(&c.id()))
                .filter(|w| !w.hidden)
                .copied()
                .collect()
        };
        if visible.is_empty() {
            return;
        }

        let host = engine.host().as_ref();
        let edges = self.config.spacing_includes_first_and_last;
        if let [only] = visible.as_slice() {
            self.position(host, only.el, Position::Only);
            host.remove_class(only.el, &self.styles.separator_line);
            Self::spacing(host, only, edges, edges);
            return;
        }

        let last = visible.len() - 1;
        for (index, wrapper) in visible.iter().enumerate() {
            if index == 0 {
                host.remove_class(wrapper.el, &self.styles.separator_line);
            } else if wrapper.data.separator == Separator::Line {
                host.add_class(wrapper.el, &self.styles.separator_line);
            }
            let (position, above, below) = match index {
                0 => (Position::First, edges, true),
                i if i == last => (Position::Last, true, edges),
                _ => (Position::Middle, true, true),
            };
            self.position(host, wrapper.el, position);
            Self::spacing(host, wrapper, above, below);
        }
    }

    fn position(&self, host: &dyn HostTree, el: NodeId, position: Position) {
        let styles = &self.styles;
        for (class, pos) in [
            (&styles.only, Position::Only),
            (&styles.first, Position::First),
            (&styles.middle, Position::Middle),
            (&styles.last, Position::Last),
        ] {
            if pos == position {
                host.add_class(el, class);
            } else {
                host.remove_class(el, class);
            }
        }
    }

    fn spacing(host: &dyn HostTree, wrapper: &Wrapper, above: bool, below: bool) {
        let top = if above { wrapper.data.spacing_above } else { Length::ZERO };
        let bottom = if below { wrapper.data.spacing_below } else { Length::ZERO };
        host.set_style(wrapper.el, "padding-top", &top.to_string());
        host.set_style(wrapper.el, "padding-bottom", &bottom.to_string());
    }
}

impl Strategy for VerticalStack {
    fn name(&self) -> &'static str {
        "vertical-stack"
    }

    fn render_component(
        &self,
        engine: &Engine,
        component: &ComponentRef,
        index: usize,
        target: NodeId,
        _size: usize,
    ) -> Result<(), LayoutError> {
        let host = engine.host();
        let data = self.resolve(component);

        let stale = self.wrappers.borrow_mut().remove(&component.id());
        if let Some(stale) = stale {
            host.remove(stale.el);
        }

        let el = host.create_element("div");
        host.add_class(el, &self.styles.wrap);
        host.insert_child(target, el, Some(index))?;
        host.set_style(el, "padding-left", &data.padding_side.to_string());
        host.set_style(el, "padding-right", &data.padding_side.to_string());
        let align = match data.align {
            HAlign::Left => &self.styles.align_left,
            HAlign::Center => &self.styles.align_center,
            HAlign::Right => &self.styles.align_right,
        };
        host.add_class(el, align);

        let placed = match component.root() {
            Some(root) => host.insert_child(el, root, Some(0)).map(|_| root),
            None => component.render(host, el, Some(0)),
        };
        let root = match placed {
            Ok(root) => root,
            Err(err) => {
                host.remove(el);
                return Err(err);
            }
        };

        let hidden = component.is_hidden();
        if hidden {
            host.set_visible(el, false);
        }
        self.wrappers
            .borrow_mut()
            .insert(component.id(), Wrapper { el, hidden, data });
        engine.retain(Placement::new(el, Some(root), component.clone()));
        self.apply_positional(engine);
        Ok(())
    }

    fn on_component_shown(&self, engine: &Engine, component: &ComponentRef) {
        self.set_hidden(engine, component, false);
    }

    fn on_component_hidden(&self, engine: &Engine, component: &ComponentRef) {
        self.set_hidden(engine, component, true);
    }

    fn on_component_removed(&self, engine: &Engine, component: &ComponentRef) {
        let removed = self.wrappers.borrow_mut().remove(&component.id());
        if removed.is_some() {
            self.apply_positional(engine);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::component::{Component, Leaf};
    use crate::container::Container;
    use crate::data::LayoutData;
    use crate::dom::Dom;
    use crate::engine::{Layout, Runtime};
    use crate::schedule::EventLoop;

    struct Fixture {
        dom: Rc<Dom>,
        container: Rc<Container>,
        items: Vec<Rc<Leaf>>,
    }

    impl Fixture {
        fn new(config: StackConfig, items: Vec<Leaf>) -> Self {
            let dom = Rc::new(Dom::new());
            let runtime = Runtime::new(dom.clone(), Rc::new(EventLoop::new()));
            let layout = Layout::new(runtime, VerticalStack::new(config, StackStyles::default()));
            let container = Container::new(layout);
            let items: Vec<Rc<Leaf>> = items.into_iter().map(Rc::new).collect();
            for item in &items {
                container.add(item.clone());
            }
            let host: Rc<dyn HostTree> = dom.clone();
            let body = dom.create_element("body");
            container.render(&host, body, None).unwrap();
            Self { dom, container, items }
        }

        fn wrapper(&self, index: usize) -> NodeId {
            let root = self.items[index].root().unwrap();
            self.dom.parent(root).unwrap()
        }

        fn has(&self, index: usize, class: &str) -> bool {
            self.dom.has_class(self.wrapper(index), class)
        }

        fn padding(&self, index: usize) -> (String, String) {
            let el = self.wrapper(index);
            (
                self.dom.style(el, "padding-top").unwrap_or_default(),
                self.dom.style(el, "padding-bottom").unwrap_or_default(),
            )
        }
    }

    fn leaves(n: usize) -> Vec<Leaf> {
        (0..n).map(|i| Leaf::new(format!("item{i}"))).collect()
    }

    #[test]
    fn test_three_items_spacing_and_positions() {
        let config = StackConfig::new()
            .spacing(Length::px(8.0))
            .separator(Separator::Line);
        let f = Fixture::new(config, leaves(3));

        assert!(f.has(0, "stack-first"));
        assert!(f.has(1, "stack-middle"));
        assert!(f.has(2, "stack-last"));
        assert_eq!(f.padding(0), ("0px".to_string(), "8px".to_string()));
        assert_eq!(f.padding(1), ("8px".to_string(), "8px".to_string()));
        assert_eq!(f.padding(2), ("8px".to_string(), "0px".to_string()));

        assert!(!f.has(0, "stack-separator-line"));
        assert!(f.has(1, "stack-separator-line"));
    }

    #[test]
    fn test_single_item_is_only() {
        let config = StackConfig::new()
            .spacing(Length::px(8.0))
            .spacing_includes_first_and_last(true);
        let f = Fixture::new(config, leaves(1));
        assert!(f.has(0, "stack-only"));
        assert_eq!(f.padding(0), ("8px".to_string(), "8px".to_string()));
    }

    #[test]
    fn test_hiding_reclassifies_visible_items() {
        let f = Fixture::new(StackConfig::new().spacing(Length::px(4.0)), leaves(3));
        f.items[2].hide();

        assert!(!f.dom.is_visible(f.wrapper(2)));
        assert!(f.has(0, "stack-first"));
        assert!(f.has(1, "stack-last"));
        assert!(!f.has(1, "stack-middle"));

        f.items[0].hide();
        assert!(f.has(1, "stack-only"));

        f.items[0].show();
        f.items[2].show();
        assert!(f.has(1, "stack-middle"));
        assert!(f.dom.is_visible(f.wrapper(2)));
    }

    #[test]
    fn test_all_hidden_keeps_last_classification() {
        let f = Fixture::new(StackConfig::new().spacing(Length::px(4.0)), leaves(2));
        assert!(f.has(0, "stack-first"));
        assert!(f.has(1, "stack-last"));

        f.items[0].hide();
        assert!(f.has(1, "stack-only"));
        let padding = f.padding(1);

        f.items[1].hide();
        assert!(!f.dom.is_visible(f.wrapper(0)));
        assert!(!f.dom.is_visible(f.wrapper(1)));
        assert!(f.has(0, "stack-first"));
        assert!(f.has(1, "stack-only"));
        assert_eq!(f.padding(1), padding);
        assert_eq!(f.padding(0), ("0px".to_string(), "4px".to_string()));

        f.container.layout().layout(true);
        assert!(f.has(1, "stack-only"));
    }

    #[test]
    fn test_hidden_component_starts_with_hidden_wrapper() {
        let f = Fixture::new(StackConfig::new(), vec![Leaf::new("a"), Leaf::new("b").hidden()]);
        assert!(!f.dom.is_visible(f.wrapper(1)));
        assert!(f.has(0, "stack-only"));
    }

    #[test]
    fn test_component_data_overrides_baseline() {
        let data = LayoutData::new().stack(
            StackData::new()
                .align(HAlign::Right)
                .padding_side(Length::px(12.0)),
        );
        let f = Fixture::new(
            StackConfig::new().align(HAlign::Left),
            vec![Leaf::new("a"), Leaf::new("b").data(data)],
        );

        assert!(f.has(0, "stack-align-left"));
        assert!(f.has(1, "stack-align-right"));
        assert_eq!(f.dom.style(f.wrapper(1), "padding-left").as_deref(), Some("12px"));
        assert_eq!(f.dom.style(f.wrapper(0), "padding-left").as_deref(), Some("0px"));
    }

    #[test]
    fn test_removal_drops_wrapper() {
        let f = Fixture::new(StackConfig::new(), leaves(3));
        let root = f.container.root().unwrap();
        let middle: ComponentRef = f.items[1].clone();
        f.container.remove(&middle);

        assert_eq!(f.dom.child_count(root), 2);
        assert!(f.has(0, "stack-first"));
        assert!(f.has(2, "stack-last"));
        assert_eq!(f.container.layout().placements().len(), 2);
    }

    #[test]
    fn test_config_from_json() {
        let config: StackConfig = serde_json::from_str(
            r#"{"spacing_includes_first_and_last": true, "baseline": {"spacing_above": "6px", "separator": "line"}}"#,
        )
        .unwrap();
        assert!(config.spacing_includes_first_and_last);
        assert_eq!(config.baseline.spacing_above, Some(Length::px(6.0)));
        assert_eq!(config.baseline.separator, Some(Separator::Line));
    }
}
