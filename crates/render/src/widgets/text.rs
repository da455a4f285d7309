//! Text-like components
//!
//! Text, heading, paragraph, label and blockquote are editable in place;
//! their visible text comes from [`Cx::content`] so an edit draft shows
//! while editing.

use crate::renderer::Cx;
use crate::vdom::VElement;
use weave_style::heading_level;

pub(super) fn text(cx: &Cx<'_, '_>) -> VElement {
    let tag = if cx.props.get_bool("inline") { "span" } else { "div" };
    VElement::new(tag).class("weave-text").text(cx.content("Text"))
}

pub(super) fn heading(cx: &Cx<'_, '_>) -> VElement {
    let level = heading_level(cx.props);
    VElement::new(format!("h{level}")).text(cx.content("Heading"))
}

pub(super) fn paragraph(cx: &Cx<'_, '_>) -> VElement {
    VElement::new("p").text(cx.content("Paragraph text"))
}

pub(super) fn label(cx: &Cx<'_, '_>) -> VElement {
    VElement::new("label")
        .attr_opt("for", cx.text_any(&["htmlFor", "for"]))
        .text(cx.content("Label"))
}

pub(super) fn blockquote(cx: &Cx<'_, '_>) -> VElement {
    let quote = VElement::new("blockquote").child(VElement::new("p").text(cx.content("Quote")));
    match cx.text_any(&["author", "cite"]) {
        Some(author) => quote.child(
            VElement::new("footer")
                .class("weave-blockquote-cite")
                .text(author),
        ),
        None => quote,
    }
}

/// Code is shown verbatim; `{{...}}` inside a snippet is not a binding
pub(super) fn code(cx: &Cx<'_, '_>) -> VElement {
    let source = cx
        .props
        .get_str("code")
        .or_else(|| cx.props.content())
        .unwrap_or(if cx.is_design() { "// code" } else { "" });
    let language = cx.props.get_str("language");
    VElement::new("pre").class("weave-code").child(
        VElement::new("code")
            .attr_opt("data-language", language)
            .class(language.map(|l| format!("language-{l}")).unwrap_or_default())
            .text(source),
    )
}

pub(super) fn link(cx: &Cx<'_, '_>) -> VElement {
    let href = cx.text_any(&["href", "url"]).unwrap_or_else(|| "#".to_string());
    let new_tab = cx.props.get_bool("openInNewTab")
        || cx.props.get_str("target").is_some_and(|t| t == "_blank");
    let label = cx
        .text_any(&["text", "label"])
        .unwrap_or_else(|| cx.content("Link"));
    VElement::new("a")
        .attr("href", href)
        .attr_opt("target", new_tab.then_some("_blank"))
        .attr_opt("rel", new_tab.then_some("noopener noreferrer"))
        .text(label)
}

pub(super) fn button(cx: &Cx<'_, '_>) -> VElement {
    let label = cx
        .text_any(&["text", "label", "content"])
        .unwrap_or_else(|| "Button".to_string());
    let kind = cx
        .props
        .get_str("buttonType")
        .filter(|t| matches!(*t, "button" | "submit" | "reset"))
        .unwrap_or("button");
    let variant = cx.props.get_str("variant").unwrap_or("primary");
    VElement::new("button")
        .attr("type", kind)
        .class("weave-btn")
        .class(format!("weave-btn-{variant}"))
        .flag("disabled", cx.props.get_bool("disabled"))
        .text(label)
}

pub(super) fn badge(cx: &Cx<'_, '_>) -> VElement {
    let variant = cx.props.get_str("variant").unwrap_or("default");
    VElement::new("span")
        .class("weave-badge")
        .class(format!("weave-badge-{variant}"))
        .text(cx.text_any(&["text", "label", "content"]).unwrap_or_else(|| {
            if cx.is_design() { "Badge".to_string() } else { String::new() }
        }))
}
