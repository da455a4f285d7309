//! Data-bound containers and tables
//!
//! A section or grid with a `databaseConnection` is a repeater: its
//! children are a template rendered once per row, each copy bound to that
//! row's [`DataContext`]. Without a connection it is a plain container.

use super::pagination_controls;
use crate::binding::value_to_text;
use crate::renderer::Cx;
use crate::repeater::{EmptyState, RepeaterView, RowPage, plan_view};
use crate::vdom::{VElement, VNode};
use serde_json::Value;
use weave_ir::{ComponentType, DatabaseConnection, DataContext};

pub(super) fn repeatable(cx: &Cx<'_, '_>, tag: &str) -> VElement {
    let root = VElement::new(tag);
    let Some(connection) = DatabaseConnection::from_props(cx.props) else {
        let children = cx.render_children();
        if children.is_empty() && cx.is_design() {
            return root.child(cx.drop_placeholder("Drop components here"));
        }
        return root.children(children);
    };

    let root = root
        .class("weave-repeater")
        .attr("data-table", connection.label());
    let view = match cx.renderer.session.repeaters.instance(cx.id()) {
        Some(instance) => plan_view(
            &instance,
            cx.props,
            cx.mode(),
            cx.widget().current_page(),
            cx.config(),
        ),
        None => RepeaterView::Loading,
    };

    match view {
        RepeaterView::Loading => root.child(
            VElement::new("div")
                .class("weave-repeater-loading")
                .attr("aria-busy", "true")
                .text("Loading..."),
        ),
        RepeaterView::Error(message) => root.child(
            VElement::new("div")
                .class("weave-repeater-error")
                .attr("role", "alert")
                .text(format!("Failed to load data: {message}")),
        ),
        RepeaterView::Empty(empty) => root.child(empty_state(cx, empty)),
        RepeaterView::Rows(page) => rows(cx, root, page),
    }
}

fn empty_message(message: &str) -> VElement {
    VElement::new("div")
        .class("weave-empty-state")
        .child(VElement::new("p").class("weave-empty-message").text(message))
}

fn empty_state(cx: &Cx<'_, '_>, empty: EmptyState) -> VElement {
    match empty {
        EmptyState::Message(message) => empty_message(&cx.bind(&message)),
        EmptyState::Component(id) => match cx.render_reusable(&id) {
            Some(node) => VElement::new("div").class("weave-empty-state").child(node),
            None => {
                tracing::warn!(repeater = %cx.id(), component = %id, "empty-state component not found");
                empty_message(crate::repeater::DEFAULT_EMPTY_MESSAGE)
            }
        },
        EmptyState::Image { src, caption } => {
            let mut el = VElement::new("div").class("weave-empty-state").child(
                VElement::new("img")
                    .class("weave-empty-image")
                    .attr("src", src)
                    .attr("alt", caption.clone().unwrap_or_default()),
            );
            if let Some(caption) = caption {
                el = el.child(VElement::new("p").class("weave-empty-caption").text(caption));
            }
            el
        }
    }
}

fn rows(cx: &Cx<'_, '_>, root: VElement, page: RowPage) -> VElement {
    let template = cx.component.child_nodes();
    let is_grid = cx.component.component_type == ComponentType::Grid;

    let mut root = root.attr("data-row-count", page.total.to_string());
    if page.simulated {
        root = root.attr("data-simulated", "true");
    }
    if template.is_empty() && cx.is_design() {
        return root.child(cx.drop_placeholder("Drop a row template here"));
    }

    for row in &page.rows {
        root = root.child(row_item(cx, template, row, is_grid));
    }
    if let Some(current) = page.page {
        if page.page_count > 1 {
            root = root.child(pagination_controls(cx.id(), current, page.page_count));
        }
    }
    root
}

fn row_item(cx: &Cx<'_, '_>, template: &[weave_ir::AppComponent], row: &DataContext, is_grid: bool) -> VNode {
    let index = row.record_index.unwrap_or_default();
    let children: Vec<VNode> = template
        .iter()
        .enumerate()
        .map(|(i, child)| cx.render_with_data(child, i, row))
        .collect();
    VElement::new("div")
        .key(format!("{}-row-{index}", cx.id()))
        .class("weave-repeater-item")
        .class(if is_grid { "weave-repeater-cell" } else { "" })
        .attr("data-record-index", index.to_string())
        .children(children)
        .into()
}

/// `{key, label}` for a column given as a string or an object
fn column(cx: &Cx<'_, '_>, value: &Value) -> (String, String) {
    match value {
        Value::Object(obj) => {
            let get = |k: &str| obj.get(k).and_then(Value::as_str).map(str::to_string);
            let key = get("key")
                .or_else(|| get("field"))
                .or_else(|| get("accessor"))
                .unwrap_or_default();
            let label = get("label")
                .or_else(|| get("header"))
                .or_else(|| get("title"))
                .map(|s| cx.bind(&s))
                .unwrap_or_else(|| key.clone());
            (key, label)
        }
        other => {
            let key = value_to_text(other);
            (key.clone(), key)
        }
    }
}

pub(super) fn table(cx: &Cx<'_, '_>) -> VElement {
    let rows = cx.props.get_array("rows").or_else(|| cx.props.get_array("data"));
    let mut columns: Vec<(String, String)> = cx
        .props
        .get_array("columns")
        .map(|cols| cols.iter().map(|c| column(cx, c)).collect())
        .unwrap_or_default();
    // Infer columns from the first row
    if columns.is_empty() {
        if let Some(first) = rows.and_then(|r| r.first()).and_then(Value::as_object) {
            columns = first.keys().map(|k| (k.clone(), k.clone())).collect();
        }
    }

    let table = VElement::new("table").class("weave-table");
    if columns.is_empty() {
        return if cx.is_design() {
            table.child(
                VElement::new("caption")
                    .class("weave-table-empty")
                    .text("Add columns to this table"),
            )
        } else {
            table
        };
    }

    let mut head = VElement::new("tr");
    for (_, label) in &columns {
        head = head.child(VElement::new("th").attr("scope", "col").text(label.clone()));
    }
    let mut body = VElement::new("tbody");
    for row in rows.into_iter().flatten() {
        let mut tr = VElement::new("tr");
        for (key, _) in &columns {
            let cell = match row {
                Value::Object(obj) => obj.get(key).map(value_to_text).unwrap_or_default(),
                Value::Array(cells) => key
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| cells.get(i))
                    .map(value_to_text)
                    .unwrap_or_default(),
                _ => String::new(),
            };
            tr = tr.child(VElement::new("td").text(cx.bind(&cell)));
        }
        body = body.child(tr);
    }
    table
        .flag("data-striped", cx.props.get_bool("striped"))
        .child(VElement::new("thead").child(head))
        .child(body)
}
