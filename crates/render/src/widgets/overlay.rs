//! Disclosure and overlay widgets
//!
//! Open/closed state lives in the session's [`crate::interactions::UiState`]
//! keyed by component id. Initial state comes from props (`defaultOpen`,
//! `defaultSlide`, `isOpen`) the first time a widget renders.

use super::{item_text, prop_items};
use crate::interactions::WidgetState;
use crate::renderer::Cx;
use crate::vdom::{EventKind, HandlerAction, VElement, VNode};
use serde_json::Value;
use std::collections::BTreeSet;

/// Indices open by default: a number, an array of numbers or `true` for all
fn default_open(cx: &Cx<'_, '_>, count: usize) -> BTreeSet<usize> {
    match cx.props.get("defaultOpen") {
        Some(Value::Bool(true)) => (0..count).collect(),
        Some(Value::Number(n)) => n.as_u64().map(|i| i as usize).into_iter().collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_u64)
            .map(|i| i as usize)
            .collect(),
        _ => BTreeSet::new(),
    }
}

pub(super) fn accordion(cx: &Cx<'_, '_>) -> VElement {
    let items = prop_items(cx, "items");
    let children = cx.component.child_nodes();
    let from_children = items.is_empty();
    let count = if from_children { children.len() } else { items.len() };

    let state = cx.seeded_widget(|| WidgetState {
        open_items: default_open(cx, count),
        ..Default::default()
    });

    let mut root = VElement::new("div").class("weave-accordion");
    if count == 0 && cx.is_design() {
        return root.child(cx.drop_placeholder("Drop accordion sections here"));
    }
    for i in 0..count {
        let open = state.open_items.contains(&i);
        let (title, body): (String, Option<VNode>) = if from_children {
            let child = &children[i];
            let title = child
                .props()
                .get_str("title")
                .or_else(|| child.props().get_str("label"))
                .map(|s| cx.bind(s))
                .unwrap_or_else(|| format!("Section {}", i + 1));
            (title, open.then(|| cx.render_child(child, i)))
        } else {
            let item = items[i];
            let title = item_text(cx, item, &["title", "label"]).unwrap_or_else(|| format!("Section {}", i + 1));
            let body = item_text(cx, item, &["content", "text"]).unwrap_or_default();
            (title, open.then(|| VNode::Text(body)))
        };

        let header = VElement::new("button")
            .attr("type", "button")
            .class("weave-accordion-header")
            .attr("aria-expanded", open.to_string())
            .on(
                EventKind::Click,
                HandlerAction::ToggleAccordionItem {
                    id: cx.id().to_string(),
                    index: i,
                },
            )
            .text(title);
        let mut section = VElement::new("div")
            .class("weave-accordion-item")
            .class(if open { "weave-accordion-open" } else { "" })
            .child(header);
        if let Some(body) = body {
            section = section.child(VElement::new("div").class("weave-accordion-panel").child(body));
        }
        root = root.child(section);
    }
    root
}

pub(super) fn carousel(cx: &Cx<'_, '_>) -> VElement {
    let children = cx.component.child_nodes();
    let images = cx.props.get_array("images").cloned().unwrap_or_default();
    let count = if children.is_empty() { images.len() } else { children.len() };

    let initial = cx.props.get_f64("defaultSlide").unwrap_or(0.0).max(0.0) as usize;
    let state = cx.seeded_widget(|| WidgetState {
        slide: initial,
        ..Default::default()
    });
    let root = VElement::new("div")
        .class("weave-carousel")
        .attr("aria-roledescription", "carousel");
    if count == 0 {
        return if cx.is_design() {
            root.child(cx.drop_placeholder("Drop slides here"))
        } else {
            root
        };
    }
    let active = state.slide.min(count - 1);

    let slide = if children.is_empty() {
        let src = images[active]
            .as_str()
            .or_else(|| images[active].get("src").and_then(Value::as_str))
            .map(|s| cx.bind(s))
            .unwrap_or_default();
        VElement::new("img").attr("src", src).attr("alt", format!("Slide {}", active + 1)).into()
    } else {
        cx.render_child(&children[active], active)
    };

    let step = |delta: i32, label: &str, class: &str| {
        VElement::new("button")
            .attr("type", "button")
            .class(class)
            .attr("aria-label", label)
            .on(
                EventKind::Click,
                HandlerAction::StepCarousel {
                    id: cx.id().to_string(),
                    delta,
                    count,
                },
            )
    };

    let mut dots = VElement::new("div").class("weave-carousel-dots");
    for i in 0..count {
        let delta = i as i32 - active as i32;
        dots = dots.child(
            step(delta, &format!("Go to slide {}", i + 1), "weave-carousel-dot")
                .class(if i == active { "weave-carousel-dot-active" } else { "" })
                .attr("aria-current", (i == active).to_string()),
        );
    }

    root.child(
        VElement::new("div")
            .class("weave-carousel-slide")
            .attr("data-slide", active.to_string())
            .child(slide),
    )
    .child(step(-1, "Previous slide", "weave-carousel-prev").text("\u{2039}"))
    .child(step(1, "Next slide", "weave-carousel-next").text("\u{203a}"))
    .child(dots)
}

fn modal_dialog(cx: &Cx<'_, '_>, close: bool) -> VElement {
    let mut dialog = VElement::new("div")
        .class("weave-modal-dialog")
        .attr("role", "dialog")
        .attr("aria-modal", "true");
    let mut header = VElement::new("div").class("weave-modal-header");
    if let Some(title) = cx.text("title") {
        header = header.child(VElement::new("h2").class("weave-modal-title").text(title));
    }
    if close {
        header = header.child(
            VElement::new("button")
                .attr("type", "button")
                .class("weave-modal-close")
                .attr("aria-label", "Close")
                .on(
                    EventKind::Click,
                    HandlerAction::SetModalOpen {
                        id: cx.id().to_string(),
                        open: false,
                    },
                )
                .text("\u{00d7}"),
        );
    }
    dialog = dialog.child(header);
    let children = cx.render_children();
    let body = VElement::new("div").class("weave-modal-body");
    let body = if children.is_empty() && cx.is_design() {
        body.child(cx.drop_placeholder("Drop modal content here"))
    } else {
        body.children(children)
    };
    dialog.child(body)
}

/// On the canvas the dialog is always laid out inline so it can be edited;
/// in preview it opens from a trigger button
pub(super) fn modal(cx: &Cx<'_, '_>) -> VElement {
    if cx.is_design() {
        return VElement::new("div")
            .class("weave-modal")
            .class("weave-modal-inline")
            .child(VElement::new("span").class("weave-modal-badge").text("Modal"))
            .child(modal_dialog(cx, false));
    }

    let initially_open = cx.props.get_bool("isOpen") || cx.props.get_bool("defaultOpen");
    let state = cx.seeded_widget(|| WidgetState {
        modal_open: initially_open,
        ..Default::default()
    });
    let trigger = VElement::new("button")
        .attr("type", "button")
        .class("weave-modal-trigger")
        .on(
            EventKind::Click,
            HandlerAction::SetModalOpen {
                id: cx.id().to_string(),
                open: true,
            },
        )
        .text(cx.text("triggerText").unwrap_or_else(|| "Open".to_string()));
    let root = VElement::new("div").class("weave-modal").child(trigger);
    if !state.modal_open {
        return root;
    }
    root.child(
        VElement::new("div")
            .class("weave-modal-overlay")
            .on(
                EventKind::Click,
                HandlerAction::SetModalOpen {
                    id: cx.id().to_string(),
                    open: false,
                },
            )
            .child(modal_dialog(cx, true)),
    )
}

pub(super) fn dropdown(cx: &Cx<'_, '_>) -> VElement {
    let open = cx.widget().dropdown_open;
    let toggle = VElement::new("button")
        .attr("type", "button")
        .class("weave-dropdown-toggle")
        .attr("aria-haspopup", "true")
        .attr("aria-expanded", open.to_string())
        .on(
            EventKind::Click,
            HandlerAction::ToggleDropdown {
                id: cx.id().to_string(),
            },
        )
        .text(cx.text_any(&["label", "text"]).unwrap_or_else(|| "Menu".to_string()));
    let root = VElement::new("div").class("weave-dropdown").child(toggle);
    if !open {
        return root;
    }

    let mut menu = VElement::new("div").class("weave-dropdown-menu").attr("role", "menu");
    for item in prop_items(cx, "items") {
        let label = item_text(cx, item, &["label", "text"]).unwrap_or_default();
        menu = menu.child(match item_text(cx, item, &["href", "url"]) {
            Some(href) => VElement::new("a")
                .class("weave-dropdown-item")
                .attr("role", "menuitem")
                .attr("href", href)
                .text(label),
            None => VElement::new("button")
                .attr("type", "button")
                .class("weave-dropdown-item")
                .attr("role", "menuitem")
                .text(label),
        });
    }
    root.child(menu.children(cx.render_children()))
}

pub(super) fn alert(cx: &Cx<'_, '_>) -> VElement {
    let variant = cx.props.get_str("variant").unwrap_or("info");
    let mut alert = VElement::new("div")
        .class("weave-alert")
        .class(format!("weave-alert-{variant}"))
        .attr("role", "alert");
    if let Some(title) = cx.text("title") {
        alert = alert.child(VElement::new("strong").class("weave-alert-title").text(title));
    }
    let message = cx
        .text_any(&["message", "description"])
        .unwrap_or_else(|| cx.content(""));
    if !message.is_empty() {
        alert = alert.child(VElement::new("p").class("weave-alert-message").text(message));
    }
    alert.children(cx.render_children())
}
