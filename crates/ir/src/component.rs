//! App component tree
//!
//! This module contains `AppComponent`, the tree node the renderer walks,
//! the closed `ComponentType` enumeration, the `Children` wrapper that keeps
//! malformed children data visible instead of silently dropping it, and the
//! `ComponentPatch` applied by the update callback.

use crate::props::Props;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use weave_core::{Breakpoint, ComponentId};

static EMPTY_PROPS: LazyLock<Props> = LazyLock::new(Props::new);

// ============================================================================
// ComponentType
// ============================================================================

/// Closed enumeration of component variants
///
/// Serialized as camelCase strings. Unrecognised names are preserved in
/// `Unknown` so they survive a load/save cycle and render as a plain `div`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentType {
    // Layout
    Container,
    Section,
    Row,
    Column,
    Grid,
    Div,
    Stack,
    Flexbox,
    Card,
    Form,
    Header,
    Footer,
    Sidebar,
    // Text
    Text,
    Heading,
    Paragraph,
    Label,
    Blockquote,
    Code,
    Link,
    Button,
    // Media
    Image,
    Video,
    Icon,
    Divider,
    Spacer,
    Embed,
    Map,
    // Form controls
    Input,
    Textarea,
    Select,
    Checkbox,
    Radio,
    Switch,
    // Navigation & interactive
    Navbar,
    NavMenu,
    Breadcrumb,
    Tabs,
    Accordion,
    Carousel,
    Modal,
    Dropdown,
    // Data display
    List,
    ListItem,
    Table,
    Badge,
    Avatar,
    Progress,
    Alert,
    Pagination,
    /// A type this build does not know about
    Unknown(String),
}

/// Every known component type, in declaration order
const ALL_TYPES: &[ComponentType] = &[
    ComponentType::Container,
    ComponentType::Section,
    ComponentType::Row,
    ComponentType::Column,
    ComponentType::Grid,
    ComponentType::Div,
    ComponentType::Stack,
    ComponentType::Flexbox,
    ComponentType::Card,
    ComponentType::Form,
    ComponentType::Header,
    ComponentType::Footer,
    ComponentType::Sidebar,
    ComponentType::Text,
    ComponentType::Heading,
    ComponentType::Paragraph,
    ComponentType::Label,
    ComponentType::Blockquote,
    ComponentType::Code,
    ComponentType::Link,
    ComponentType::Button,
    ComponentType::Image,
    ComponentType::Video,
    ComponentType::Icon,
    ComponentType::Divider,
    ComponentType::Spacer,
    ComponentType::Embed,
    ComponentType::Map,
    ComponentType::Input,
    ComponentType::Textarea,
    ComponentType::Select,
    ComponentType::Checkbox,
    ComponentType::Radio,
    ComponentType::Switch,
    ComponentType::Navbar,
    ComponentType::NavMenu,
    ComponentType::Breadcrumb,
    ComponentType::Tabs,
    ComponentType::Accordion,
    ComponentType::Carousel,
    ComponentType::Modal,
    ComponentType::Dropdown,
    ComponentType::List,
    ComponentType::ListItem,
    ComponentType::Table,
    ComponentType::Badge,
    ComponentType::Avatar,
    ComponentType::Progress,
    ComponentType::Alert,
    ComponentType::Pagination,
];

impl ComponentType {
    /// All known component types
    pub fn all() -> &'static [ComponentType] {
        ALL_TYPES
    }

    /// Wire name (camelCase)
    pub fn as_str(&self) -> &str {
        match self {
            ComponentType::Container => "container",
            ComponentType::Section => "section",
            ComponentType::Row => "row",
            ComponentType::Column => "column",
            ComponentType::Grid => "grid",
            ComponentType::Div => "div",
            ComponentType::Stack => "stack",
            ComponentType::Flexbox => "flexbox",
            ComponentType::Card => "card",
            ComponentType::Form => "form",
            ComponentType::Header => "header",
            ComponentType::Footer => "footer",
            ComponentType::Sidebar => "sidebar",
            ComponentType::Text => "text",
            ComponentType::Heading => "heading",
            ComponentType::Paragraph => "paragraph",
            ComponentType::Label => "label",
            ComponentType::Blockquote => "blockquote",
            ComponentType::Code => "code",
            ComponentType::Link => "link",
            ComponentType::Button => "button",
            ComponentType::Image => "image",
            ComponentType::Video => "video",
            ComponentType::Icon => "icon",
            ComponentType::Divider => "divider",
            ComponentType::Spacer => "spacer",
            ComponentType::Embed => "embed",
            ComponentType::Map => "map",
            ComponentType::Input => "input",
            ComponentType::Textarea => "textarea",
            ComponentType::Select => "select",
            ComponentType::Checkbox => "checkbox",
            ComponentType::Radio => "radio",
            ComponentType::Switch => "switch",
            ComponentType::Navbar => "navbar",
            ComponentType::NavMenu => "navMenu",
            ComponentType::Breadcrumb => "breadcrumb",
            ComponentType::Tabs => "tabs",
            ComponentType::Accordion => "accordion",
            ComponentType::Carousel => "carousel",
            ComponentType::Modal => "modal",
            ComponentType::Dropdown => "dropdown",
            ComponentType::List => "list",
            ComponentType::ListItem => "listItem",
            ComponentType::Table => "table",
            ComponentType::Badge => "badge",
            ComponentType::Avatar => "avatar",
            ComponentType::Progress => "progress",
            ComponentType::Alert => "alert",
            ComponentType::Pagination => "pagination",
            ComponentType::Unknown(name) => name.as_str(),
        }
    }

    /// Whether other components can be dropped inside this one
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ComponentType::Container
                | ComponentType::Section
                | ComponentType::Row
                | ComponentType::Column
                | ComponentType::Grid
                | ComponentType::Div
                | ComponentType::Stack
                | ComponentType::Flexbox
                | ComponentType::Card
                | ComponentType::Form
                | ComponentType::Header
                | ComponentType::Footer
                | ComponentType::Sidebar
                | ComponentType::Navbar
                | ComponentType::NavMenu
                | ComponentType::Tabs
                | ComponentType::Accordion
                | ComponentType::Carousel
                | ComponentType::Modal
                | ComponentType::Dropdown
                | ComponentType::List
                | ComponentType::ListItem
        )
    }

    /// Types accepted by a drop target of this type
    ///
    /// Container-like types accept every type; leaf types accept nothing.
    pub fn accepts(&self) -> &'static [ComponentType] {
        if self.is_container() { ALL_TYPES } else { &[] }
    }

    /// Whether the type supports double-click in-place text editing
    pub fn is_text_editable(&self) -> bool {
        matches!(
            self,
            ComponentType::Text
                | ComponentType::Heading
                | ComponentType::Paragraph
                | ComponentType::Label
                | ComponentType::Blockquote
        )
    }

    /// Whether the type can be bound to a table and repeat its children
    pub fn supports_data_binding(&self) -> bool {
        matches!(self, ComponentType::Section | ComponentType::Grid)
    }

    /// Whether this is a type the build does not know
    pub fn is_unknown(&self) -> bool {
        matches!(self, ComponentType::Unknown(_))
    }
}

impl From<String> for ComponentType {
    fn from(name: String) -> Self {
        ALL_TYPES
            .iter()
            .find(|t| t.as_str() == name)
            .cloned()
            .unwrap_or(ComponentType::Unknown(name))
    }
}

impl From<&str> for ComponentType {
    fn from(name: &str) -> Self {
        ComponentType::from(name.to_string())
    }
}

impl From<ComponentType> for String {
    fn from(t: ComponentType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Children
// ============================================================================

/// A component's children
///
/// Anything that does not deserialize as a list of components is kept as
/// `Invalid` so the renderer can flag it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Children {
    Nodes(Vec<AppComponent>),
    Invalid(Value),
}

impl Default for Children {
    fn default() -> Self {
        Children::Nodes(Vec::new())
    }
}

impl Children {
    /// The child list, or the offending value when it is not a list.
    ///
    /// `null` counts as an empty list.
    pub fn nodes(&self) -> Result<&[AppComponent], &Value> {
        match self {
            Children::Nodes(nodes) => Ok(nodes),
            Children::Invalid(Value::Null) => Ok(&[]),
            Children::Invalid(value) => Err(value),
        }
    }

    /// Mutable child list; invalid data is replaced by an empty list
    pub fn nodes_mut(&mut self) -> &mut Vec<AppComponent> {
        if !matches!(self, Children::Nodes(_)) {
            *self = Children::Nodes(Vec::new());
        }
        match self {
            Children::Nodes(nodes) => nodes,
            Children::Invalid(_) => unreachable!("children normalised to a list above"),
        }
    }

    /// Number of valid children
    pub fn len(&self) -> usize {
        self.nodes().map(|n| n.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the children data is malformed
    pub fn is_invalid(&self) -> bool {
        self.nodes().is_err()
    }
}

impl From<Vec<AppComponent>> for Children {
    fn from(nodes: Vec<AppComponent>) -> Self {
        Children::Nodes(nodes)
    }
}

/// Describe a JSON value's kind for diagnostics
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// AppComponent
// ============================================================================

/// A node in the page's component tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppComponent {
    /// Stable identifier, unique within a page
    pub id: ComponentId,

    /// Component variant
    #[serde(rename = "type")]
    pub component_type: ComponentType,

    /// Props; `None` when the serialized node omitted them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Props>,

    /// Ordered children, exclusively owned
    #[serde(default)]
    pub children: Children,

    /// Attached style class names, in cascade order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub class_names: Vec<String>,

    /// Explicit per-breakpoint property overrides (`{"mobile": {...}}`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub style_overrides: BTreeMap<String, Map<String, Value>>,

    /// Legacy flat style object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Map<String, Value>>,

    /// Trigger name → flow graph
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub action_flows: Map<String, Value>,
}

impl AppComponent {
    /// Create a new component with empty props
    pub fn new(id: impl Into<String>, component_type: impl Into<ComponentType>) -> Self {
        Self {
            id: id.into(),
            component_type: component_type.into(),
            props: Some(Props::new()),
            children: Children::default(),
            class_names: Vec::new(),
            style_overrides: BTreeMap::new(),
            style: None,
            action_flows: Map::new(),
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set a prop
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props_mut().insert(key.into(), value.into());
        self
    }

    /// Replace all props
    pub fn with_props(mut self, props: Props) -> Self {
        self.props = Some(props);
        self
    }

    /// Append a child
    pub fn with_child(mut self, child: AppComponent) -> Self {
        self.children.nodes_mut().push(child);
        self
    }

    /// Attach a style class
    pub fn with_class(mut self, name: impl Into<String>) -> Self {
        self.class_names.push(name.into());
        self
    }

    /// Add an explicit override for a breakpoint
    pub fn with_override(
        mut self,
        breakpoint: Breakpoint,
        property: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.style_overrides
            .entry(breakpoint.as_str().to_string())
            .or_default()
            .insert(property.into(), value.into());
        self
    }

    /// Attach a flow graph for a trigger
    pub fn with_flow(mut self, trigger: impl Into<String>, flow: Value) -> Self {
        self.action_flows.insert(trigger.into(), flow);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Props, or an empty map for malformed nodes
    pub fn props(&self) -> &Props {
        self.props.as_ref().unwrap_or(&EMPTY_PROPS)
    }

    /// Mutable props, created if missing
    pub fn props_mut(&mut self) -> &mut Props {
        self.props.get_or_insert_with(Props::new)
    }

    /// Whether the serialized node carried props
    pub fn has_props(&self) -> bool {
        self.props.is_some()
    }

    /// Valid children (empty if the children data is malformed)
    pub fn child_nodes(&self) -> &[AppComponent] {
        self.children.nodes().unwrap_or(&[])
    }

    /// Explicit overrides that apply at a breakpoint, narrowest winning
    pub fn overrides_at(&self, breakpoint: Breakpoint) -> Map<String, Value> {
        let mut merged = Map::new();
        for bp in breakpoint.cascade() {
            if let Some(bag) = self.style_overrides.get(bp.as_str()) {
                for (k, v) in bag {
                    merged.insert(k.clone(), v.clone());
                }
            }
        }
        merged
    }

    // ========================================================================
    // Tree traversal
    // ========================================================================

    /// Find a descendant (or self) by id
    pub fn find(&self, id: &str) -> Option<&AppComponent> {
        if self.id == id {
            return Some(self);
        }
        self.child_nodes().iter().find_map(|c| c.find(id))
    }

    /// Find a mutable descendant (or self) by id
    pub fn find_mut(&mut self, id: &str) -> Option<&mut AppComponent> {
        if self.id == id {
            return Some(self);
        }
        match &mut self.children {
            Children::Nodes(nodes) => nodes.iter_mut().find_map(|c| c.find_mut(id)),
            Children::Invalid(_) => None,
        }
    }

    /// Whether `id` is this node or one of its descendants
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Visit this node and every descendant depth-first
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a AppComponent)) {
        visit(self);
        for child in self.child_nodes() {
            child.walk(visit);
        }
    }

    /// Number of nodes in this subtree
    pub fn subtree_size(&self) -> usize {
        1 + self
            .child_nodes()
            .iter()
            .map(AppComponent::subtree_size)
            .sum::<usize>()
    }
}

// ============================================================================
// ComponentPatch
// ============================================================================

/// Partial update applied through the update callback
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentPatch {
    /// Props merged key-wise into the existing props
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Props>,

    /// Replacement child list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<AppComponent>>,
}

impl ComponentPatch {
    /// Patch that sets props
    pub fn props(props: Props) -> Self {
        Self {
            props: Some(props),
            children: None,
        }
    }

    /// Patch that replaces children
    pub fn children(children: Vec<AppComponent>) -> Self {
        Self {
            props: None,
            children: Some(children),
        }
    }

    /// Apply to a component. Applying the same patch twice is a no-op the
    /// second time.
    pub fn apply(&self, component: &mut AppComponent) {
        if let Some(props) = &self.props {
            component.props_mut().merge(props);
        }
        if let Some(children) = &self.children {
            component.children = Children::Nodes(children.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_none() && self.children.is_none()
    }
}

// ============================================================================
// Tests
// ============================================================================
