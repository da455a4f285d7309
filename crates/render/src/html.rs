//! HTML serialization of the virtual DOM
//!
//! Static output for the CLI and snapshot tests. Handlers serialize to
//! `data-on-*` attributes holding the action JSON so a client script can
//! rehydrate them; drop targets and drag sources become `data-drop-*` and
//! `draggable` attributes.

use crate::vdom::{VElement, VNode};

/// Elements that never have children or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Escape text content
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value (double-quoted)
pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Serialize a node tree to HTML
pub fn render_to_html(node: &VNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

/// Wrap rendered markup into a standalone document
pub fn render_document(title: &str, body: &VNode) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_text(title),
        render_to_html(body)
    )
}

fn write_node(node: &VNode, out: &mut String) {
    match node {
        VNode::Element(el) => write_element(el, out),
        VNode::Text(text) => out.push_str(&escape_text(text)),
        VNode::Fragment(nodes) => nodes.iter().for_each(|n| write_node(n, out)),
        VNode::Empty => {}
    }
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    if !value.is_empty() {
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
}

fn write_element(el: &VElement, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);

    if let Some(key) = &el.key {
        write_attr(out, "data-key", key);
    }
    if !el.class_names.is_empty() {
        write_attr(out, "class", &el.class_names.join(" "));
    }
    if !el.style.is_empty() {
        write_attr(out, "style", &el.style.to_css());
    }
    for (name, value) in &el.attributes {
        if value.is_empty() {
            // Boolean attribute
            out.push(' ');
            out.push_str(name);
        } else {
            write_attr(out, name, value);
        }
    }
    for handler in &el.handlers {
        if let Ok(json) = serde_json::to_string(&handler.action) {
            let name = format!("data-{}", handler.event.attribute().replacen("on", "on-", 1));
            write_attr(out, &name, &json);
        }
    }
    if let Some(target) = &el.drop_target {
        write_attr(out, "data-drop-parent", &target.parent_id);
        write_attr(out, "data-drop-index", &target.index.to_string());
        write_attr(out, "data-drop-accepts", &target.accepts.join(","));
    }
    if el.drag_source.is_some() {
        write_attr(out, "draggable", "true");
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&el.tag.as_str()) {
        return;
    }
    for child in &el.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}
