//! Render strategies, one per component type
//!
//! Each strategy builds the node's root element and its inner structure.
//! The dispatcher decorates the root afterwards (key, class hooks, merged
//! style, handlers), so strategies only deal with what is specific to the
//! type.

mod data;
mod form;
mod layout;
mod media;
mod navigation;
mod overlay;
mod text;

use crate::renderer::Cx;
use crate::vdom::VElement;
use weave_ir::ComponentType;

pub(crate) use navigation::pagination_controls;

/// Dispatch on the component type
pub(crate) fn render_widget(cx: &Cx<'_, '_>) -> VElement {
    use ComponentType as T;
    match &cx.component.component_type {
        T::Container | T::Row | T::Column | T::Div | T::Stack | T::Flexbox => layout::block(cx, "div"),
        T::Section => data::repeatable(cx, "section"),
        T::Grid => data::repeatable(cx, "div"),
        T::Card => layout::card(cx),
        T::Form => layout::form(cx),
        T::Header => layout::block(cx, "header"),
        T::Footer => layout::block(cx, "footer"),
        T::Sidebar => layout::block(cx, "aside"),
        T::List => layout::list(cx),
        T::ListItem => layout::list_item(cx),

        T::Text => text::text(cx),
        T::Heading => text::heading(cx),
        T::Paragraph => text::paragraph(cx),
        T::Label => text::label(cx),
        T::Blockquote => text::blockquote(cx),
        T::Code => text::code(cx),
        T::Link => text::link(cx),
        T::Button => text::button(cx),
        T::Badge => text::badge(cx),

        T::Image => media::image(cx),
        T::Video => media::video(cx),
        T::Icon => media::icon(cx),
        T::Divider => media::divider(cx),
        T::Spacer => media::spacer(cx),
        T::Embed => media::embed(cx),
        T::Map => media::map(cx),
        T::Avatar => media::avatar(cx),
        T::Progress => media::progress(cx),

        T::Input => form::input(cx),
        T::Textarea => form::textarea(cx),
        T::Select => form::select(cx),
        T::Checkbox => form::checkbox(cx),
        T::Radio => form::radio(cx),
        T::Switch => form::switch(cx),

        T::Navbar => navigation::navbar(cx),
        T::NavMenu => navigation::nav_menu(cx),
        T::Breadcrumb => navigation::breadcrumb(cx),
        T::Tabs => navigation::tabs(cx),
        T::Pagination => navigation::pagination(cx),

        T::Accordion => overlay::accordion(cx),
        T::Carousel => overlay::carousel(cx),
        T::Modal => overlay::modal(cx),
        T::Dropdown => overlay::dropdown(cx),
        T::Alert => overlay::alert(cx),

        T::Table => data::table(cx),

        T::Unknown(name) => {
            tracing::warn!(id = %cx.component.id, kind = %name, "unknown component type; rendering as div");
            VElement::new("div")
                .class("weave-unknown")
                .children(cx.render_children())
        }
    }
}

/// `{label, value}` pair from a string or an object option
pub(crate) fn option_pair(cx: &Cx<'_, '_>, option: &serde_json::Value) -> (String, String) {
    match option {
        serde_json::Value::Object(obj) => {
            let get = |key: &str| obj.get(key).and_then(serde_json::Value::as_str).map(|s| cx.bind(s));
            let value = get("value").or_else(|| get("id")).unwrap_or_default();
            let label = get("label").or_else(|| get("text")).unwrap_or_else(|| value.clone());
            (label, value)
        }
        other => {
            let text = crate::binding::value_to_text(other);
            let text = cx.bind(&text);
            (text.clone(), text)
        }
    }
}

/// `props.items` (or another list prop) as objects
pub(crate) fn prop_items<'p>(cx: &'p Cx<'_, '_>, key: &str) -> Vec<&'p serde_json::Map<String, serde_json::Value>> {
    cx.props
        .get_array(key)
        .map(|items| items.iter().filter_map(serde_json::Value::as_object).collect())
        .unwrap_or_default()
}

/// Bound string field of an item object
pub(crate) fn item_text(cx: &Cx<'_, '_>, item: &serde_json::Map<String, serde_json::Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| item.get(*k).and_then(serde_json::Value::as_str))
        .map(|s| cx.bind(s))
}
