//! Form controls

use super::option_pair;
use crate::renderer::Cx;
use crate::vdom::VElement;
use serde_json::Value;

fn control_id(cx: &Cx<'_, '_>) -> String {
    format!("weave-field-{}", cx.id())
}

/// Wrap a control with its `props.label` when one is set
fn field(cx: &Cx<'_, '_>, control: VElement) -> VElement {
    let Some(text) = cx.text("label") else {
        return control;
    };
    let mut label = VElement::new("label").attr("for", control_id(cx)).text(text);
    if cx.props.get_bool("required") {
        label = label.child(VElement::new("span").class("weave-required").text(" *"));
    }
    VElement::new("div").class("weave-field").child(label).child(control)
}

/// Attributes shared by every control
fn common(cx: &Cx<'_, '_>, el: VElement) -> VElement {
    el.attr("id", control_id(cx))
        .attr_opt("name", cx.text("name"))
        .flag("required", cx.props.get_bool("required"))
        .flag("disabled", cx.props.get_bool("disabled"))
}

fn default_value(cx: &Cx<'_, '_>) -> Option<String> {
    cx.text_any(&["value", "defaultValue"])
}

pub(super) fn input(cx: &Cx<'_, '_>) -> VElement {
    let kind = cx
        .props
        .get_str("inputType")
        .or_else(|| cx.props.get_str("type"))
        .unwrap_or("text");
    let control = common(cx, VElement::new("input"))
        .attr("type", kind)
        .attr_opt("placeholder", cx.text("placeholder"))
        .attr_opt("value", default_value(cx))
        .flag("readonly", cx.props.get_bool("readOnly"));
    field(cx, control)
}

pub(super) fn textarea(cx: &Cx<'_, '_>) -> VElement {
    let rows = cx.props.get_f64("rows").filter(|r| *r >= 1.0).unwrap_or(4.0) as usize;
    let control = common(cx, VElement::new("textarea"))
        .attr("rows", rows.to_string())
        .attr_opt("placeholder", cx.text("placeholder"))
        .text(default_value(cx).unwrap_or_default());
    field(cx, control)
}

pub(super) fn select(cx: &Cx<'_, '_>) -> VElement {
    let selected = default_value(cx);
    let mut control = common(cx, VElement::new("select"));
    if let Some(placeholder) = cx.text("placeholder") {
        control = control.child(
            VElement::new("option")
                .attr("value", "")
                .flag("disabled", true)
                .flag("selected", selected.is_none())
                .text(placeholder),
        );
    }
    for option in cx.props.get_array("options").into_iter().flatten() {
        let (label, value) = option_pair(cx, option);
        control = control.child(
            VElement::new("option")
                .flag("selected", selected.as_deref() == Some(value.as_str()))
                .attr("value", value)
                .text(label),
        );
    }
    field(cx, control)
}

fn checked(cx: &Cx<'_, '_>) -> bool {
    cx.props.get_bool("checked") || cx.props.get_bool("defaultChecked")
}

pub(super) fn checkbox(cx: &Cx<'_, '_>) -> VElement {
    VElement::new("label")
        .class("weave-checkbox")
        .child(
            common(cx, VElement::new("input"))
                .attr("type", "checkbox")
                .flag("checked", checked(cx)),
        )
        .child(VElement::new("span").text(cx.text("label").unwrap_or_default()))
}

pub(super) fn radio(cx: &Cx<'_, '_>) -> VElement {
    let options = cx.props.get_array("options").cloned().unwrap_or_default();
    if options.is_empty() {
        return VElement::new("label")
            .class("weave-radio")
            .child(
                common(cx, VElement::new("input"))
                    .attr("type", "radio")
                    .attr_opt("value", default_value(cx))
                    .flag("checked", checked(cx)),
            )
            .child(VElement::new("span").text(cx.text("label").unwrap_or_default()));
    }
    let name = cx.text("name").unwrap_or_else(|| cx.id().to_string());
    let selected = default_value(cx);
    let group = VElement::new("div")
        .class("weave-radio-group")
        .attr("role", "radiogroup")
        .attr_opt("aria-label", cx.text("label"));
    options.iter().enumerate().fold(group, |group, (i, option)| {
        let (label, value) = option_pair(cx, option);
        group.child(
            VElement::new("label").class("weave-radio").child(
                VElement::new("input")
                    .attr("type", "radio")
                    .attr("id", format!("{}-{i}", control_id(cx)))
                    .attr("name", name.clone())
                    .flag("checked", selected.as_deref() == Some(value.as_str()))
                    .flag("disabled", cx.props.get_bool("disabled"))
                    .attr("value", value),
            )
            .text(label),
        )
    })
}

pub(super) fn switch(cx: &Cx<'_, '_>) -> VElement {
    let on = checked(cx) || cx.props.get("value").is_some_and(|v| v == &Value::Bool(true));
    VElement::new("label")
        .class("weave-switch")
        .child(
            common(cx, VElement::new("input"))
                .attr("type", "checkbox")
                .attr("role", "switch")
                .attr("aria-checked", on.to_string())
                .flag("checked", on),
        )
        .child(VElement::new("span").class("weave-switch-track"))
        .child(VElement::new("span").text(cx.text("label").unwrap_or_default()))
}
