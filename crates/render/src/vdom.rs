//! Virtual DOM produced by the renderer
//!
//! Platform-agnostic output: a host either patches it into a live canvas
//! or serializes it with [`crate::html::render_to_html`]. Event handlers are
//! declarative [`HandlerAction`]s the host routes back into the interaction
//! controller or the flow executor.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use weave_ir::DataContext;
use weave_style::StyleMap;

/// Virtual node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VNode {
    Element(VElement),
    Text(String),
    Fragment(Vec<VNode>),
    /// Renders nothing (hidden components)
    Empty,
}

/// DOM events a handler can listen to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Click,
    DoubleClick,
    ContextMenu,
    MouseEnter,
    MouseLeave,
    KeyDown,
    Input,
    Blur,
    Submit,
    Change,
}

impl EventKind {
    /// DOM attribute name (`onclick`)
    pub fn attribute(&self) -> &'static str {
        match self {
            EventKind::Click => "onclick",
            EventKind::DoubleClick => "ondblclick",
            EventKind::ContextMenu => "oncontextmenu",
            EventKind::MouseEnter => "onmouseenter",
            EventKind::MouseLeave => "onmouseleave",
            EventKind::KeyDown => "onkeydown",
            EventKind::Input => "oninput",
            EventKind::Blur => "onblur",
            EventKind::Submit => "onsubmit",
            EventKind::Change => "onchange",
        }
    }
}

/// What the host should do when a handler fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum HandlerAction {
    Select { id: String },
    HoverEnter { id: String },
    HoverLeave { id: String },
    ContextMenu { id: String },
    BeginTextEdit { id: String },
    TextEditInput { id: String },
    TextEditKey { id: String },
    CommitTextEdit { id: String },
    RunFlow {
        component_id: String,
        trigger: String,
        /// Row context when the component sits inside a repeated row
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
    SelectTab { id: String, index: usize },
    ToggleAccordionItem { id: String, index: usize },
    StepCarousel { id: String, delta: i32, count: usize },
    SetModalOpen { id: String, open: bool },
    ToggleDropdown { id: String },
    ToggleNavMenu { id: String },
    SetRepeaterPage { id: String, page: usize },
}

impl HandlerAction {
    /// Row data a flow should run against
    pub fn row_context(&self) -> Option<DataContext> {
        match self {
            HandlerAction::RunFlow { data: Some(data), .. } => DataContext::from_value(data),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handler {
    pub event: EventKind,
    pub action: HandlerAction,
}

/// Drop target declaration for the drag-and-drop engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTarget {
    /// Accepted component type names
    pub accepts: Vec<String>,
    pub parent_id: String,
    /// Insertion index for drops on the target itself
    pub index: usize,
}

/// Drag source declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragSource {
    pub component_id: String,
    pub parent_id: Option<String>,
    pub index: usize,
}

/// Virtual element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VElement {
    pub tag: String,

    /// Reconciliation key (the component id for component roots)
    pub key: Option<String>,

    pub attributes: BTreeMap<String, String>,

    pub class_names: Vec<String>,

    pub style: StyleMap,

    pub handlers: Vec<Handler>,

    pub drop_target: Option<DropTarget>,

    pub drag_source: Option<DragSource>,

    pub children: Vec<VNode>,
}

impl VElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set an attribute only when the value is present
    pub fn attr_opt(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.attr(name, v),
            None => self,
        }
    }

    /// Boolean attribute (`disabled`, `checked`)
    pub fn flag(self, name: &str, on: bool) -> Self {
        if on { self.attr(name, "") } else { self }
    }

    pub fn class(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.is_empty() && !self.class_names.contains(&name) {
            self.class_names.push(name);
        }
        self
    }

    pub fn style(mut self, property: &str, value: impl Into<String>) -> Self {
        self.style.set(property, value);
        self
    }

    pub fn on(mut self, event: EventKind, action: HandlerAction) -> Self {
        self.handlers.push(Handler { event, action });
        self
    }

    pub fn child(mut self, node: impl Into<VNode>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = VNode>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(VNode::Text(text.into()))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.class_names.iter().any(|c| c == name)
    }

    pub fn handler(&self, event: EventKind) -> Option<&HandlerAction> {
        self.handlers
            .iter()
            .find(|h| h.event == event)
            .map(|h| &h.action)
    }
}

impl From<VElement> for VNode {
    fn from(element: VElement) -> Self {
        VNode::Element(element)
    }
}

impl From<String> for VNode {
    fn from(text: String) -> Self {
        VNode::Text(text)
    }
}

impl From<&str> for VNode {
    fn from(text: &str) -> Self {
        VNode::Text(text.to_string())
    }
}

impl VNode {
    pub fn as_element(&self) -> Option<&VElement> {
        match self {
            VNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            VNode::Empty => true,
            VNode::Fragment(nodes) => nodes.iter().all(VNode::is_empty),
            _ => false,
        }
    }

    /// Concatenated text of the subtree
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            VNode::Text(t) => out.push_str(t),
            VNode::Element(el) => el.children.iter().for_each(|c| c.collect_text(out)),
            VNode::Fragment(nodes) => nodes.iter().for_each(|c| c.collect_text(out)),
            VNode::Empty => {}
        }
    }

    /// Depth-first search for elements matching a predicate
    pub fn find_all<'a>(&'a self, pred: &dyn Fn(&VElement) -> bool) -> Vec<&'a VElement> {
        let mut out = Vec::new();
        self.visit(&mut |el| {
            if pred(el) {
                out.push(el);
            }
        });
        out
    }

    pub fn find(&self, pred: &dyn Fn(&VElement) -> bool) -> Option<&VElement> {
        self.find_all(pred).into_iter().next()
    }

    /// Element keyed by a component id
    pub fn find_by_key(&self, key: &str) -> Option<&VElement> {
        self.find(&|el| el.key.as_deref() == Some(key))
    }

    pub fn find_by_class(&self, class: &str) -> Vec<&VElement> {
        self.find_all(&|el| el.has_class(class))
    }

    fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a VElement)) {
        match self {
            VNode::Element(el) => {
                f(el);
                el.children.iter().for_each(|c| c.visit(f));
            }
            VNode::Fragment(nodes) => nodes.iter().for_each(|c| c.visit(f)),
            VNode::Text(_) | VNode::Empty => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VNode {
        VElement::new("div")
            .key("root")
            .class("weave-c-root")
            .child(VElement::new("span").key("a").text("Hello "))
            .child(VNode::Fragment(vec![
                VElement::new("b").class("x").text("world").into(),
                VNode::Empty,
            ]))
            .into()
    }

    #[test]
    fn test_text_content() {
        assert_eq!(sample().text_content(), "Hello world");
    }

    #[test]
    fn test_find() {
        let tree = sample();
        assert_eq!(tree.find_by_key("a").unwrap().tag, "span");
        assert_eq!(tree.find_by_class("x").len(), 1);
        assert!(tree.find_by_key("missing").is_none());
    }

    #[test]
    fn test_builder_dedupes_classes() {
        let el = VElement::new("div").class("a").class("a").class("").flag("hidden", false);
        assert_eq!(el.class_names, vec!["a".to_string()]);
        assert!(el.attributes.is_empty());
    }

    #[test]
    fn test_empty() {
        assert!(VNode::Empty.is_empty());
        assert!(VNode::Fragment(vec![VNode::Empty]).is_empty());
        assert!(!sample().is_empty());
    }
}
