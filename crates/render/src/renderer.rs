//! # Component Renderer
//!
//! Recursive dispatcher turning an [`AppComponent`] tree into a [`VNode`]
//! tree. Per node:
//!
//! 1. Preparation: props defaulting for malformed nodes, data context
//!    pickup and repeater mount registration. This runs before any
//!    visibility branch so hidden repeaters keep their fetch state.
//! 2. Visibility: preview is authoritative, design mode can force-show a
//!    failing component dimmed and outlined.
//! 3. Style merge, dispatch on the component type, then decoration with
//!    the class hooks, merged style and interaction handlers.
//!
//! Nothing propagates out of a render pass: malformed data is logged and
//! rendered as best it can be.

use crate::actions::{declared_triggers, event_for_trigger};
use crate::binding::BindingScope;
use crate::config::RenderConfig;
use crate::drop_zone::{drag_source_for, drop_target_for};
use crate::interactions::{InteractionController, UiState, WidgetState};
use crate::repeater::RepeaterRegistry;
use crate::vdom::{EventKind, HandlerAction, VElement, VNode};
use crate::visibility::evaluate_visibility;
use crate::widgets;
use std::collections::{BTreeMap, HashSet};
use weave_core::{Breakpoint, RenderMode};
use weave_ir::{
    AppComponent, ClassStore, ComponentUpdater, DataContext, DatabaseConnection, Props,
    SelectionStore, TableService, TokenStore, VariableStore, json_kind, resolve_classes,
};
use weave_style::{InheritedStyle, MergeContext, MergedStyle, StyleMap, format_number, merge_style};

// ============================================================================
// Options and session
// ============================================================================

/// Per-call render inputs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    pub is_preview: bool,
    /// Parent of the rendered node, for drag sources
    pub parent_id: Option<String>,
    /// Index of the rendered node within its parent
    pub index: usize,
    pub breakpoint: Breakpoint,
    /// Custom design canvas width in pixels
    pub canvas_width: Option<f32>,
}

impl RenderOptions {
    pub fn design() -> Self {
        Self::default()
    }

    pub fn preview() -> Self {
        Self {
            is_preview: true,
            ..Default::default()
        }
    }

    pub fn with_breakpoint(mut self, breakpoint: Breakpoint) -> Self {
        self.breakpoint = breakpoint;
        self
    }

    pub fn with_canvas_width(mut self, width: f32) -> Self {
        self.canvas_width = Some(width);
        self
    }

    pub fn mode(&self) -> RenderMode {
        RenderMode::from_preview_flag(self.is_preview)
    }
}

/// State that outlives a single render pass
#[derive(Debug, Default)]
pub struct RenderSession {
    pub config: RenderConfig,
    pub ui: UiState,
    pub repeaters: RepeaterRegistry,
}

impl RenderSession {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Run the fetches the last pass queued; returns how many completed
    pub async fn fetch_pending(&self, tables: &dyn TableService) -> usize {
        self.repeaters.fetch_pending(tables).await
    }

    /// Controller for routing handler actions back into this session
    pub fn controller<'s>(
        &'s self,
        mode: RenderMode,
        selection: &'s dyn SelectionStore,
        updater: &'s dyn ComponentUpdater,
    ) -> InteractionController<'s> {
        InteractionController::new(mode, &self.ui, selection, updater)
    }
}

// ============================================================================
// Frames
// ============================================================================

/// What a node inherits from its ancestors
#[derive(Clone, Copy)]
pub(crate) struct Frame<'s> {
    pub mode: RenderMode,
    pub breakpoint: Breakpoint,
    pub canvas_width: Option<f32>,
    pub parent_id: Option<&'s str>,
    pub index: usize,
    pub inherited: &'s InheritedStyle,
    pub data: Option<&'s DataContext>,
}

/// Everything a render strategy needs for one node
pub(crate) struct Cx<'r, 'a> {
    pub renderer: &'r Renderer<'a>,
    pub component: &'r AppComponent,
    pub props: &'r Props,
    pub frame: Frame<'r>,
    /// Frame handed to this node's children
    pub child_frame: Frame<'r>,
    pub binding: BindingScope<'r>,
}

impl<'r, 'a> Cx<'r, 'a> {
    pub fn id(&self) -> &str {
        &self.component.id
    }

    pub fn mode(&self) -> RenderMode {
        self.frame.mode
    }

    pub fn is_design(&self) -> bool {
        self.frame.mode.is_design()
    }

    pub fn is_preview(&self) -> bool {
        self.frame.mode.is_preview()
    }

    pub fn config(&self) -> &RenderConfig {
        &self.renderer.session.config
    }

    pub fn widget(&self) -> WidgetState {
        self.renderer.session.ui.widget(&self.component.id)
    }

    /// Widget state, seeded from props the first time the widget renders
    pub fn seeded_widget(&self, init: impl FnOnce() -> WidgetState) -> WidgetState {
        let ui = &self.renderer.session.ui;
        ui.update_widget_or(&self.component.id, init, |_| {});
        ui.widget(&self.component.id)
    }

    /// Substitute bindings in a template
    pub fn bind(&self, template: &str) -> String {
        self.binding.bind(template)
    }

    /// A string prop with bindings substituted
    pub fn text(&self, key: &str) -> Option<String> {
        self.props.get_str(key).map(|s| self.bind(s))
    }

    /// First of several string props that is set
    pub fn text_any(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.text(k))
    }

    /// Visible text of a text-like node: the edit draft while editing, the
    /// bound content otherwise, `placeholder` in design mode when empty
    pub fn content(&self, placeholder: &str) -> String {
        if self.is_design() {
            if let crate::interactions::TextEditState::Editing { id, draft, .. } =
                self.renderer.session.ui.edit_state()
            {
                if id == self.component.id {
                    return draft;
                }
            }
        }
        match self.props.content() {
            Some(content) => self.bind(content),
            None if self.is_design() => placeholder.to_string(),
            None => String::new(),
        }
    }

    /// Render the node's children in order
    pub fn render_children(&self) -> Vec<VNode> {
        self.component
            .child_nodes()
            .iter()
            .enumerate()
            .map(|(index, child)| self.render_child(child, index))
            .collect()
    }

    pub fn render_child(&self, child: &AppComponent, index: usize) -> VNode {
        self.renderer.render_node(
            child,
            Frame {
                index,
                ..self.child_frame
            },
        )
    }

    /// Render a child bound to a row
    pub fn render_with_data(&self, child: &AppComponent, index: usize, data: &DataContext) -> VNode {
        self.renderer.render_node(
            child,
            Frame {
                index,
                data: Some(data),
                ..self.child_frame
            },
        )
    }

    /// Render a reusable component by id
    pub fn render_reusable(&self, id: &str) -> Option<VNode> {
        let component = self.renderer.reusable.and_then(|r| r.get(id))?;
        Some(self.renderer.render_node(
            component,
            Frame {
                parent_id: None,
                index: 0,
                ..self.child_frame
            },
        ))
    }

    /// Empty-container hint shown on the design canvas
    pub fn drop_placeholder(&self, label: &str) -> VElement {
        let mut placeholder = VElement::new("div")
            .class("weave-drop-placeholder")
            .attr("data-drop-placeholder", "true")
            .text(label);
        placeholder.drop_target = drop_target_for(self.component);
        placeholder
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Renders component trees against a set of collaborator stores
pub struct Renderer<'a> {
    classes: &'a dyn ClassStore,
    tokens: &'a dyn TokenStore,
    variables: Option<&'a dyn VariableStore>,
    selection: Option<&'a dyn SelectionStore>,
    reusable: Option<&'a BTreeMap<String, AppComponent>>,
    pub(crate) session: &'a RenderSession,
}

impl<'a> Renderer<'a> {
    pub fn new(
        classes: &'a dyn ClassStore,
        tokens: &'a dyn TokenStore,
        session: &'a RenderSession,
    ) -> Self {
        Self {
            classes,
            tokens,
            variables: None,
            selection: None,
            reusable: None,
            session,
        }
    }

    pub fn with_variables(mut self, variables: &'a dyn VariableStore) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Mark selected and hovered nodes on the design canvas
    pub fn with_selection(mut self, selection: &'a dyn SelectionStore) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_reusable(mut self, components: &'a BTreeMap<String, AppComponent>) -> Self {
        self.reusable = Some(components);
        self
    }

    /// Render one component subtree
    pub fn render(&self, component: &AppComponent, options: &RenderOptions) -> VNode {
        let inherited = InheritedStyle::new();
        self.render_node(
            component,
            Frame {
                mode: options.mode(),
                breakpoint: options.breakpoint,
                canvas_width: options.canvas_width,
                parent_id: options.parent_id.as_deref(),
                index: options.index,
                inherited: &inherited,
                data: None,
            },
        )
    }

    /// Render a page's root components as one pass
    ///
    /// Repeaters not reached by this pass are unmounted and widget state
    /// of removed components is dropped.
    pub fn render_page(&self, roots: &[AppComponent], options: &RenderOptions) -> VNode {
        self.session.repeaters.begin_pass();
        let children = roots
            .iter()
            .enumerate()
            .map(|(index, root)| {
                self.render(
                    root,
                    &RenderOptions {
                        parent_id: None,
                        index,
                        ..options.clone()
                    },
                )
            })
            .collect::<Vec<_>>();
        self.session.repeaters.end_pass();

        let mut ids = HashSet::new();
        for root in roots {
            root.walk(&mut |c| {
                ids.insert(c.id.clone());
            });
        }
        self.session.ui.retain_widgets(|id| ids.contains(id));

        tracing::debug!(
            roots = roots.len(),
            mode = ?options.mode(),
            breakpoint = options.breakpoint.as_str(),
            "page rendered"
        );
        VElement::new("div")
            .class("weave-page")
            .attr("data-mode", if options.is_preview { "preview" } else { "design" })
            .attr("data-breakpoint", options.breakpoint.as_str())
            .children(children)
            .into()
    }

    pub(crate) fn render_node(&self, component: &AppComponent, frame: Frame<'_>) -> VNode {
        // Preparation
        if !component.has_props() {
            tracing::warn!(id = %component.id, kind = %component.component_type, "component has no props; rendering with defaults");
        }
        let props = component.props();
        let injected = match frame.data {
            Some(_) => None,
            None => props.get("dataContext").and_then(DataContext::from_value),
        };
        let data = frame.data.or(injected.as_ref());
        if component.component_type.supports_data_binding() {
            if let Some(connection) = DatabaseConnection::from_props(props) {
                self.session.repeaters.mount(&component.id, &connection);
            }
        }

        // Visibility
        let binding = BindingScope::new(frame.mode)
            .with_data(data)
            .with_variables(self.variables);
        let visible = evaluate_visibility(props, &binding).is_visible();
        let dimmed = !visible;
        if !visible {
            let reveal = frame.mode.is_design()
                && (self.session.config.reveal_hidden_in_design || props.get_bool("showInDesign"));
            if !reveal {
                tracing::debug!(id = %component.id, "component hidden");
                return VNode::Empty;
            }
        }

        // Style
        let classes = resolve_classes(&component.class_names, self.classes, frame.breakpoint);
        if !classes.missing.is_empty() {
            tracing::debug!(id = %component.id, missing = ?classes.missing, "unknown style classes");
        }
        let ctx = MergeContext::new(
            frame.mode,
            frame.breakpoint,
            &classes,
            frame.inherited,
            self.tokens,
        )
        .with_inset(self.session.config.canvas_safe_inset);
        let MergedStyle {
            style, inherited, ..
        } = merge_style(&ctx, component);

        let cx = Cx {
            renderer: self,
            component,
            props,
            frame: Frame { data, ..frame },
            child_frame: Frame {
                parent_id: Some(&component.id),
                index: 0,
                inherited: &inherited,
                data,
                ..frame
            },
            binding,
        };
        let element = widgets::render_widget(&cx);
        self.decorate(element, &cx, style, dimmed)
    }

    fn decorate(&self, mut el: VElement, cx: &Cx<'_, '_>, style: StyleMap, dimmed: bool) -> VNode {
        let component = cx.component;
        let id = component.id.as_str();

        el.key = Some(id.to_string());
        el = el.class(format!("weave-c-{id}"));
        for name in &component.class_names {
            let name = name.trim();
            if !name.is_empty() {
                el = el.class(name);
            }
        }
        let mut merged = style;
        merged.extend(&el.style);
        el.style = merged;
        el = el
            .attr("data-component-id", id)
            .attr("data-component-type", component.component_type.as_str());

        if let Err(value) = component.children.nodes() {
            tracing::warn!(id, found = json_kind(value), "children is not a list");
            el = el.child(
                VElement::new("div")
                    .class("weave-invalid-children")
                    .attr("role", "alert")
                    .text(format!("Invalid children: expected a list, found {}", json_kind(value))),
            );
        }

        if dimmed {
            el.style
                .set("opacity", format_number(self.session.config.hidden_opacity));
            el.style.set("outline", "1px dashed #f59e0b");
            el = el.attr("data-visibility-mismatch", "true");
        }

        if cx.is_design() {
            el = self.design_handlers(el, cx);
        } else {
            for trigger in declared_triggers(component) {
                if let Some(event) = event_for_trigger(&trigger) {
                    if el.handler(event).is_none() {
                        el = el.on(
                            event,
                            HandlerAction::RunFlow {
                                component_id: id.to_string(),
                                trigger,
                                data: cx.frame.data.map(DataContext::to_value),
                            },
                        );
                    }
                }
            }
        }
        el.into()
    }

    fn design_handlers(&self, mut el: VElement, cx: &Cx<'_, '_>) -> VElement {
        let component = cx.component;
        let id = component.id.clone();
        el = el
            .on(EventKind::Click, HandlerAction::Select { id: id.clone() })
            .on(EventKind::MouseEnter, HandlerAction::HoverEnter { id: id.clone() })
            .on(EventKind::MouseLeave, HandlerAction::HoverLeave { id: id.clone() })
            .on(EventKind::ContextMenu, HandlerAction::ContextMenu { id: id.clone() });

        if component.component_type.is_text_editable() && !cx.props.is_component_locked() {
            if self.session.ui.is_editing(&id) {
                el = el
                    .attr("contenteditable", "true")
                    .on(EventKind::Input, HandlerAction::TextEditInput { id: id.clone() })
                    .on(EventKind::KeyDown, HandlerAction::TextEditKey { id: id.clone() })
                    .on(EventKind::Blur, HandlerAction::CommitTextEdit { id: id.clone() });
            } else {
                el = el.on(EventKind::DoubleClick, HandlerAction::BeginTextEdit { id: id.clone() });
            }
        }

        el.drag_source = Some(drag_source_for(component, cx.frame.parent_id, cx.frame.index));
        if el.drop_target.is_none() {
            el.drop_target = drop_target_for(component);
        }

        if let Some(selection) = self.selection {
            el = el
                .flag("data-selected", selection.is_selected(&id))
                .flag(
                    "data-hovered",
                    selection.hovered_id().as_deref() == Some(id.as_str()),
                );
        }
        el
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::render_to_html;
    use crate::interactions::EventData;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use weave_ir::{
        ComponentType, FieldDef, FieldType, InMemoryClassStore, InMemorySelection,
        InMemoryTokenStore, InMemoryVariables, PageTree, Record, StyleClass, TableProject,
        TableRegistry, TableSchema, VariableScope,
    };

    struct Stores {
        classes: InMemoryClassStore,
        tokens: InMemoryTokenStore,
        session: RenderSession,
    }

    impl Stores {
        fn new() -> Self {
            Self {
                classes: InMemoryClassStore::default(),
                tokens: InMemoryTokenStore::default(),
                session: RenderSession::default(),
            }
        }

        fn renderer(&self) -> Renderer<'_> {
            Renderer::new(&self.classes, &self.tokens, &self.session)
        }
    }

    fn element(node: &VNode) -> &VElement {
        node.as_element().expect("element")
    }

    #[test]
    fn test_class_hooks_and_key() {
        let mut stores = Stores::new();
        stores
            .classes
            .insert(StyleClass::new("card").with_style("padding", 12));
        let button = AppComponent::new("btn-1", ComponentType::Button)
            .with_prop("text", "Save")
            .with_class("card");
        let node = stores.renderer().render(&button, &RenderOptions::design());
        let el = element(&node);
        assert_eq!(el.tag, "button");
        assert_eq!(el.key.as_deref(), Some("btn-1"));
        assert!(el.has_class("weave-c-btn-1"));
        assert!(el.has_class("card"));
        assert_eq!(el.style.get("paddingTop"), Some("12px"));
        assert_eq!(node.text_content(), "Save");
    }

    #[test]
    fn test_design_handlers_and_drag_drop() {
        let stores = Stores::new();
        let tree = AppComponent::new("root", ComponentType::Container)
            .with_child(AppComponent::new("t1", ComponentType::Text).with_prop("content", "Hi"));
        let node = stores.renderer().render(&tree, &RenderOptions::design());
        let root = element(&node);
        assert_eq!(
            root.handler(EventKind::Click),
            Some(&HandlerAction::Select { id: "root".into() })
        );
        assert!(root.drop_target.is_some());

        let text = node.find_by_key("t1").unwrap();
        assert_eq!(
            text.handler(EventKind::DoubleClick),
            Some(&HandlerAction::BeginTextEdit { id: "t1".into() })
        );
        let source = text.drag_source.as_ref().unwrap();
        assert_eq!(source.parent_id.as_deref(), Some("root"));
        assert!(text.drop_target.is_none());
    }

    #[test]
    fn test_preview_has_no_design_handlers() {
        let stores = Stores::new();
        let text = AppComponent::new("t1", ComponentType::Text).with_prop("content", "Hi");
        let node = stores.renderer().render(&text, &RenderOptions::preview());
        let el = element(&node);
        assert!(el.handlers.is_empty());
        assert!(el.drag_source.is_none());
    }

    #[test]
    fn test_preview_flow_handlers() {
        let stores = Stores::new();
        let button = AppComponent::new("b", ComponentType::Button)
            .with_flow("onClick", json!({"nodes": [], "edges": []}));
        let node = stores.renderer().render(&button, &RenderOptions::preview());
        assert_eq!(
            element(&node).handler(EventKind::Click),
            Some(&HandlerAction::RunFlow {
                component_id: "b".into(),
                trigger: "onClick".into(),
                data: None,
            })
        );
    }

    #[test]
    fn test_hidden_component_preview_vs_design() {
        let stores = Stores::new();
        let text = AppComponent::new("t", ComponentType::Text)
            .with_prop("content", "secret")
            .with_prop("hidden", true);
        let renderer = stores.renderer();

        assert_eq!(renderer.render(&text, &RenderOptions::preview()), VNode::Empty);

        let node = renderer.render(&text, &RenderOptions::design());
        let el = element(&node);
        assert_eq!(el.get_attr("data-visibility-mismatch"), Some("true"));
        assert_eq!(el.style.get("opacity"), Some("0.4"));
    }

    #[test]
    fn test_hidden_reveal_can_be_disabled() {
        let mut stores = Stores::new();
        stores.session = RenderSession::new(RenderConfig::default().without_hidden_reveal());
        let hidden = AppComponent::new("t", ComponentType::Text).with_prop("hidden", true);
        assert_eq!(
            stores.renderer().render(&hidden, &RenderOptions::design()),
            VNode::Empty
        );
        let shown = hidden.with_prop("showInDesign", true);
        assert!(stores.renderer().render(&shown, &RenderOptions::design()).as_element().is_some());
    }

    #[test]
    fn test_malformed_node_renders_with_defaults() {
        let stores = Stores::new();
        let mut text = AppComponent::new("t", ComponentType::Text);
        text.props = None;
        let node = stores.renderer().render(&text, &RenderOptions::preview());
        assert!(node.as_element().is_some());
    }

    #[test]
    fn test_invalid_children_marker() {
        let stores = Stores::new();
        let container: AppComponent = serde_json::from_value(json!({
            "id": "c",
            "type": "container",
            "props": {},
            "children": "oops"
        }))
        .unwrap();
        let node = stores.renderer().render(&container, &RenderOptions::design());
        let markers = node.find_by_class("weave-invalid-children");
        assert_eq!(markers.len(), 1);
        assert!(node.text_content().contains("found string"));
    }

    #[test]
    fn test_unknown_type_falls_back_to_div() {
        let stores = Stores::new();
        let node = stores
            .renderer()
            .render(&AppComponent::new("x", ComponentType::Unknown("hologram".into())), &RenderOptions::preview());
        let el = element(&node);
        assert_eq!(el.tag, "div");
        assert_eq!(el.get_attr("data-component-type"), Some("hologram"));
    }

    #[test]
    fn test_inherited_typography_reaches_children() {
        let stores = Stores::new();
        let tree = AppComponent::new("s", ComponentType::Section)
            .with_prop("color", "#ff0000")
            .with_child(AppComponent::new("t", ComponentType::Text).with_prop("content", "x"));
        let node = stores.renderer().render(&tree, &RenderOptions::preview());
        assert_eq!(node.find_by_key("t").unwrap().style.get("color"), Some("#ff0000"));
    }

    #[test]
    fn test_text_editing_round_trip() {
        let stores = Stores::new();
        let selection = InMemorySelection::new();
        let page = PageTree::new(vec![
            AppComponent::new("t", ComponentType::Text).with_prop("content", "Hello"),
        ]);
        let controller = stores.session.controller(RenderMode::Design, &selection, &page);
        let lookup = |id: &str| page.find(id);

        controller
            .dispatch(&HandlerAction::BeginTextEdit { id: "t".into() }, &EventData::default(), &lookup)
            .unwrap();
        controller.edit_input("Hello there");

        let node = stores.renderer().render(&page.find("t").unwrap(), &RenderOptions::design());
        let el = element(&node);
        assert_eq!(el.get_attr("contenteditable"), Some("true"));
        assert_eq!(node.text_content(), "Hello there");

        controller.key_down("Enter", false).unwrap();
        assert_eq!(page.find("t").unwrap().props().content(), Some("Hello there"));
    }

    #[test]
    fn test_variables_bind_into_text() {
        let stores = Stores::new();
        let vars = InMemoryVariables::new();
        vars.set(VariableScope::App, "user", json!({"name": "Ada"})).unwrap();
        let text = AppComponent::new("t", ComponentType::Text).with_prop("content", "Hi {{user.name}}");
        let node = stores
            .renderer()
            .with_variables(&vars)
            .render(&text, &RenderOptions::preview());
        assert_eq!(node.text_content(), "Hi Ada");
    }

    #[test]
    fn test_selection_flags() {
        let stores = Stores::new();
        let selection = InMemorySelection::new();
        selection.set_selection(vec!["t".into()]);
        let text = AppComponent::new("t", ComponentType::Text);
        let node = stores
            .renderer()
            .with_selection(&selection)
            .render(&text, &RenderOptions::design());
        assert_eq!(element(&node).get_attr("data-selected"), Some(""));
    }

    fn orders(n: usize) -> TableProject {
        let mut table = TableProject::new(
            "Orders",
            TableSchema {
                fields: vec![
                    FieldDef::new("f1", "customer", FieldType::Text),
                    FieldDef::new("f2", "total", FieldType::Number),
                ],
            },
        );
        for i in 0..n {
            table = table.with_record(Record::new(
                i as u64,
                json!({"customer": format!("Customer {i}"), "total": i * 10})
                    .as_object()
                    .cloned()
                    .unwrap(),
            ));
        }
        table
    }

    fn bound_section() -> AppComponent {
        AppComponent::new("list", ComponentType::Section)
            .with_prop("databaseConnection", json!({"tableName": "Orders"}))
            .with_prop("pagination", json!({"enabled": true, "itemsPerPage": 10}))
            .with_prop("emptyState", json!({"message": "No orders yet"}))
            .with_child(
                AppComponent::new("row-text", ComponentType::Text).with_prop("content", "{{customer}}"),
            )
    }

    async fn rendered(tables: &TableRegistry, options: RenderOptions, page: Option<usize>) -> (Stores, VNode) {
        let stores = Stores::new();
        let tree = vec![bound_section()];
        stores.renderer().render_page(&tree, &options);
        stores.session.fetch_pending(tables).await;
        if let Some(page) = page {
            stores.session.ui.update_widget("list", |w| w.page = page);
        }
        let node = stores.renderer().render_page(&tree, &options);
        (stores, node)
    }

    #[tokio::test]
    async fn test_repeater_page_two() {
        let tables = TableRegistry::new(vec![orders(25)]);
        let (_, node) = rendered(&tables, RenderOptions::preview(), Some(2)).await;
        let items = node.find_by_class("weave-repeater-item");
        assert_eq!(items.len(), 10);
        assert_eq!(items[0].key.as_deref(), Some("list-row-10"));
        assert_eq!(items[9].key.as_deref(), Some("list-row-19"));

        let tables = TableRegistry::new(vec![orders(14)]);
        let (_, node) = rendered(&tables, RenderOptions::preview(), Some(2)).await;
        assert_eq!(node.find_by_class("weave-repeater-item").len(), 4);
        assert_eq!(node.find_by_class("weave-pagination").len(), 1);
    }

    #[tokio::test]
    async fn test_flow_in_repeated_row_carries_row_context() {
        let tables = TableRegistry::new(vec![orders(3)]);
        let stores = Stores::new();
        let tree = vec![bound_section().with_child(
            AppComponent::new("buy", ComponentType::Button)
                .with_prop("text", "Buy")
                .with_flow("onClick", json!({"nodes": [], "edges": []})),
        )];
        let options = RenderOptions::preview();
        stores.renderer().render_page(&tree, &options);
        stores.session.fetch_pending(&tables).await;
        let node = stores.renderer().render_page(&tree, &options);

        let buttons = node.find_all(&|e| e.key.as_deref() == Some("buy"));
        assert_eq!(buttons.len(), 3);
        let action = buttons[1].handler(EventKind::Click).unwrap();
        let row = action.row_context().unwrap();
        assert_eq!(row.record_index, Some(1));
        assert_eq!(row.lookup("customer"), Some(&json!("Customer 1")));
        assert_eq!(row.lookup("f1"), Some(&json!("Customer 1")));
    }

    #[tokio::test]
    async fn test_scenario_empty_table() {
        let tables = TableRegistry::new(vec![orders(0)]);

        let (_, preview) = rendered(&tables, RenderOptions::preview(), None).await;
        assert!(preview.find_by_class("weave-repeater-item").is_empty());
        assert_eq!(preview.find_by_class("weave-empty-state").len(), 1);
        assert!(preview.text_content().contains("No orders yet"));

        let (_, design) = rendered(&tables, RenderOptions::design(), None).await;
        let rows = design.find_by_class("weave-repeater-item").len();
        assert!((3..=8).contains(&rows), "simulated rows: {rows}");
        assert!(design.find_by_class("weave-empty-state").is_empty());
        assert!(design.text_content().contains("{{customer}}"));
    }

    #[tokio::test]
    async fn test_repeater_loading_then_error() {
        let stores = Stores::new();
        let tree = vec![bound_section()];
        let node = stores.renderer().render_page(&tree, &RenderOptions::preview());
        assert_eq!(node.find_by_class("weave-repeater-loading").len(), 1);

        stores.session.fetch_pending(&TableRegistry::default()).await;
        let node = stores.renderer().render_page(&tree, &RenderOptions::preview());
        assert_eq!(node.find_by_class("weave-repeater-error").len(), 1);
    }

    #[test]
    fn test_render_page_html() {
        let stores = Stores::new();
        let tree = vec![
            AppComponent::new("h", ComponentType::Heading)
                .with_prop("content", "Welcome")
                .with_prop("level", 1),
        ];
        let html = render_to_html(&stores.renderer().render_page(&tree, &RenderOptions::preview()));
        assert!(html.starts_with("<div class=\"weave-page\""));
        assert!(html.contains("<h1 data-key=\"h\""));
        assert!(html.contains(">Welcome</h1>"));
    }
}
