//! Layout containers

use crate::binding::value_to_text;
use crate::renderer::Cx;
use crate::vdom::{VElement, VNode};

/// Children, or a drop placeholder for an empty container on the canvas
fn body(cx: &Cx<'_, '_>) -> Vec<VNode> {
    let children = cx.render_children();
    if children.is_empty() && cx.is_design() {
        return vec![cx.drop_placeholder("Drop components here").into()];
    }
    children
}

pub(super) fn block(cx: &Cx<'_, '_>, tag: &str) -> VElement {
    VElement::new(tag).children(body(cx))
}

pub(super) fn card(cx: &Cx<'_, '_>) -> VElement {
    let mut card = VElement::new("div").class("weave-card");
    if let Some(src) = cx.text("image") {
        card = card.child(
            VElement::new("img")
                .class("weave-card-image")
                .attr("src", src)
                .attr("alt", cx.text("imageAlt").unwrap_or_default()),
        );
    }
    if let Some(title) = cx.text("title") {
        card = card.child(VElement::new("h3").class("weave-card-title").text(title));
    }
    if let Some(description) = cx.text("description") {
        card = card.child(VElement::new("p").class("weave-card-description").text(description));
    }
    let has_header = !card.children.is_empty();
    let children = cx.render_children();
    if children.is_empty() && !has_header && cx.is_design() {
        return card.child(cx.drop_placeholder("Drop components here"));
    }
    card.children(children)
}

pub(super) fn form(cx: &Cx<'_, '_>) -> VElement {
    VElement::new("form")
        .attr_opt("name", cx.text("name"))
        .attr_opt("action", cx.text("action"))
        .attr("method", cx.text("method").unwrap_or_else(|| "post".to_string()))
        .flag("novalidate", cx.props.get_bool("noValidate"))
        .children(body(cx))
}

pub(super) fn list(cx: &Cx<'_, '_>) -> VElement {
    let ordered = cx.props.get_bool("ordered")
        || cx.props.get_str("listType").is_some_and(|t| t == "ordered" || t == "ol");
    let list = VElement::new(if ordered { "ol" } else { "ul" }).class("weave-list");
    let children = cx.render_children();
    if !children.is_empty() {
        return list.children(children);
    }
    let items: Vec<VNode> = cx
        .props
        .get_array("items")
        .map(|items| {
            items
                .iter()
                .map(|item| {
                    let text = match item {
                        serde_json::Value::Object(obj) => obj
                            .get("text")
                            .or_else(|| obj.get("label"))
                            .map(value_to_text)
                            .unwrap_or_default(),
                        other => value_to_text(other),
                    };
                    VElement::new("li").text(cx.bind(&text)).into()
                })
                .collect()
        })
        .unwrap_or_default();
    if items.is_empty() && cx.is_design() {
        return list.child(cx.drop_placeholder("Drop list items here"));
    }
    list.children(items)
}

pub(super) fn list_item(cx: &Cx<'_, '_>) -> VElement {
    let mut item = VElement::new("li");
    let content = cx.content("");
    if !content.is_empty() {
        item = item.text(content);
    }
    let children = cx.render_children();
    if children.is_empty() && item.children.is_empty() && cx.is_design() {
        return item.text("List item");
    }
    item.children(children)
}
