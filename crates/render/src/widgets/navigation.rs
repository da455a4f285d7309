//! Navigation components: navbar, menus, breadcrumbs, tabs, pagination

use super::{item_text, prop_items};
use crate::interactions::WidgetState;
use crate::renderer::Cx;
use crate::vdom::{EventKind, HandlerAction, VElement, VNode};
use weave_core::Breakpoint;

fn nav_links(cx: &Cx<'_, '_>) -> Vec<VNode> {
    prop_items(cx, "links")
        .into_iter()
        .map(|link| {
            VElement::new("a")
                .class("weave-nav-link")
                .attr(
                    "href",
                    item_text(cx, link, &["href", "url"]).unwrap_or_else(|| "#".to_string()),
                )
                .text(item_text(cx, link, &["label", "text"]).unwrap_or_default())
                .into()
        })
        .collect()
}

/// Whether the navbar shows the hamburger instead of its links
///
/// On the design canvas the custom canvas width decides; without one, and
/// always in preview, the breakpoint does.
pub(crate) fn navbar_collapsed(cx: &Cx<'_, '_>) -> bool {
    let threshold = cx
        .props
        .get_f64("mobileBreakpoint")
        .unwrap_or(f64::from(cx.config().mobile_breakpoint));
    match (cx.is_design(), cx.frame.canvas_width) {
        (true, Some(width)) => f64::from(width) < threshold,
        _ => cx.frame.breakpoint == Breakpoint::Mobile,
    }
}

pub(super) fn navbar(cx: &Cx<'_, '_>) -> VElement {
    let mut brand = VElement::new("div").class("weave-nav-brand");
    if let Some(logo) = cx.text("logo") {
        brand = brand.child(VElement::new("img").attr("src", logo).attr("alt", "Logo"));
    }
    if let Some(name) = cx.text_any(&["brand", "brandName", "logoText"]) {
        brand = brand.child(VElement::new("span").text(name));
    }

    let mut items = nav_links(cx);
    items.extend(cx.render_children());

    let collapsed = navbar_collapsed(cx);
    let nav = VElement::new("nav")
        .class("weave-navbar")
        .attr("data-collapsed", collapsed.to_string())
        .child(brand);
    if !collapsed {
        return nav.child(VElement::new("div").class("weave-nav-links").children(items));
    }

    let open = cx.widget().nav_menu_open;
    let toggle = VElement::new("button")
        .attr("type", "button")
        .class("weave-nav-toggle")
        .attr("aria-label", "Toggle menu")
        .attr("aria-expanded", open.to_string())
        .on(
            EventKind::Click,
            HandlerAction::ToggleNavMenu {
                id: cx.id().to_string(),
            },
        )
        .text("\u{2630}");
    let nav = nav.child(toggle);
    if open {
        nav.child(VElement::new("div").class("weave-nav-menu").children(items))
    } else {
        nav
    }
}

pub(super) fn nav_menu(cx: &Cx<'_, '_>) -> VElement {
    let vertical = cx.props.get_str("orientation") == Some("vertical");
    let mut menu = VElement::new("ul")
        .class("weave-nav-menu")
        .attr("role", "menubar")
        .attr(
            "aria-orientation",
            if vertical { "vertical" } else { "horizontal" },
        );
    for link in nav_links(cx) {
        menu = menu.child(VElement::new("li").attr("role", "none").child(link));
    }
    for child in cx.render_children() {
        menu = menu.child(VElement::new("li").attr("role", "none").child(child));
    }
    menu
}

pub(super) fn breadcrumb(cx: &Cx<'_, '_>) -> VElement {
    let separator = cx.text("separator").unwrap_or_else(|| "/".to_string());
    let items = prop_items(cx, "items");
    let last = items.len().saturating_sub(1);
    let mut list = VElement::new("ol").class("weave-breadcrumb-list");
    for (i, item) in items.iter().enumerate() {
        let label = item_text(cx, item, &["label", "text"]).unwrap_or_default();
        let mut li = VElement::new("li").class("weave-breadcrumb-item");
        li = if i == last {
            li.child(VElement::new("span").attr("aria-current", "page").text(label))
        } else {
            li.child(
                VElement::new("a")
                    .attr(
                        "href",
                        item_text(cx, item, &["href", "url"]).unwrap_or_else(|| "#".to_string()),
                    )
                    .text(label),
            )
            .child(
                VElement::new("span")
                    .class("weave-breadcrumb-separator")
                    .attr("aria-hidden", "true")
                    .text(separator.clone()),
            )
        };
        list = list.child(li);
    }
    VElement::new("nav").attr("aria-label", "Breadcrumb").child(list)
}

/// Tab labels from `props.tabs`, else from the children's titles
fn tab_labels(cx: &Cx<'_, '_>) -> Vec<String> {
    if let Some(tabs) = cx.props.get_array("tabs").filter(|t| !t.is_empty()) {
        return tabs
            .iter()
            .enumerate()
            .map(|(i, tab)| match tab {
                serde_json::Value::String(s) => cx.bind(s),
                serde_json::Value::Object(obj) => {
                    item_text(cx, obj, &["label", "title"]).unwrap_or_else(|| format!("Tab {}", i + 1))
                }
                _ => format!("Tab {}", i + 1),
            })
            .collect();
    }
    cx.component
        .child_nodes()
        .iter()
        .enumerate()
        .map(|(i, child)| {
            child
                .props()
                .get_str("title")
                .or_else(|| child.props().get_str("label"))
                .map(|s| cx.bind(s))
                .unwrap_or_else(|| format!("Tab {}", i + 1))
        })
        .collect()
}

pub(super) fn tabs(cx: &Cx<'_, '_>) -> VElement {
    let labels = tab_labels(cx);
    let children = cx.component.child_nodes();
    let count = labels.len().max(children.len());
    let default_tab = cx.props.get_f64("defaultTab").unwrap_or(0.0).max(0.0) as usize;
    let state = cx.seeded_widget(|| WidgetState {
        active_tab: default_tab,
        ..Default::default()
    });
    let active = state.active_tab.min(count.saturating_sub(1));

    let mut list = VElement::new("div").class("weave-tab-list").attr("role", "tablist");
    for (i, label) in labels.iter().enumerate() {
        list = list.child(
            VElement::new("button")
                .attr("type", "button")
                .attr("role", "tab")
                .class("weave-tab")
                .class(if i == active { "weave-tab-active" } else { "" })
                .attr("aria-selected", (i == active).to_string())
                .on(
                    EventKind::Click,
                    HandlerAction::SelectTab {
                        id: cx.id().to_string(),
                        index: i,
                    },
                )
                .text(label.clone()),
        );
    }

    let mut panel = VElement::new("div").class("weave-tab-panel").attr("role", "tabpanel");
    if let Some(child) = children.get(active) {
        panel = panel.child(cx.render_child(child, active));
    } else if let Some(content) = cx
        .props
        .get_array("tabs")
        .and_then(|tabs| tabs.get(active))
        .and_then(|tab| tab.get("content"))
        .and_then(serde_json::Value::as_str)
    {
        panel = panel.text(cx.bind(content));
    } else if cx.is_design() {
        panel = panel.child(cx.drop_placeholder("Drop tab content here"));
    }
    VElement::new("div").class("weave-tabs").child(list).child(panel)
}

/// Page buttons for `page` of `page_count`, routed to `id`'s widget state
pub(crate) fn pagination_controls(id: &str, page: usize, page_count: usize) -> VElement {
    let page_count = page_count.max(1);
    let page = page.clamp(1, page_count);
    let button = |label: String, target: usize, disabled: bool| {
        VElement::new("button")
            .attr("type", "button")
            .class("weave-pagination-button")
            .flag("disabled", disabled)
            .on(
                EventKind::Click,
                HandlerAction::SetRepeaterPage {
                    id: id.to_string(),
                    page: target,
                },
            )
            .text(label)
    };

    let mut nav = VElement::new("nav")
        .class("weave-pagination")
        .attr("aria-label", "Pagination")
        .child(button("Previous".into(), page.saturating_sub(1).max(1), page <= 1));
    for entry in page_window(page, page_count) {
        nav = match entry {
            Some(n) if n == page => nav.child(
                button(n.to_string(), n, false)
                    .class("weave-pagination-active")
                    .attr("aria-current", "page"),
            ),
            Some(n) => nav.child(button(n.to_string(), n, false)),
            None => nav.child(VElement::new("span").class("weave-pagination-gap").text("...")),
        };
    }
    nav.child(button("Next".into(), (page + 1).min(page_count), page >= page_count))
}

/// Page numbers to show; `None` marks a gap
fn page_window(page: usize, page_count: usize) -> Vec<Option<usize>> {
    if page_count <= 7 {
        return (1..=page_count).map(Some).collect();
    }
    let mut out = vec![Some(1)];
    let start = page.saturating_sub(1).max(2);
    let end = (page + 1).min(page_count - 1);
    if start > 2 {
        out.push(None);
    }
    out.extend((start..=end).map(Some));
    if end < page_count - 1 {
        out.push(None);
    }
    out.push(Some(page_count));
    out
}

pub(super) fn pagination(cx: &Cx<'_, '_>) -> VElement {
    let total = cx.props.get_f64("totalPages").unwrap_or(1.0).max(1.0) as usize;
    let initial = cx.props.get_f64("currentPage").unwrap_or(1.0).max(1.0) as usize;
    let state = cx.seeded_widget(|| WidgetState {
        page: initial,
        ..Default::default()
    });
    pagination_controls(cx.id(), state.current_page(), total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{RenderOptions, RenderSession, Renderer};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use weave_ir::{AppComponent, ComponentType, InMemoryClassStore, InMemoryTokenStore};

    fn navbar() -> AppComponent {
        AppComponent::new("nav", ComponentType::Navbar)
            .with_prop("brand", "Acme")
            .with_prop("links", json!([{"label": "Home", "href": "/"}, {"label": "About", "href": "/about"}]))
    }

    fn render_with(session: &RenderSession, component: &AppComponent, options: RenderOptions) -> VNode {
        let classes = InMemoryClassStore::default();
        let tokens = InMemoryTokenStore::default();
        Renderer::new(&classes, &tokens, session).render(component, &options)
    }

    fn collapsed(node: &VNode) -> bool {
        node.as_element().unwrap().get_attr("data-collapsed") == Some("true")
    }

    #[test]
    fn test_navbar_collapse_rules() {
        let session = RenderSession::default();
        let nav = navbar();
        assert!(!collapsed(&render_with(&session, &nav, RenderOptions::design())));
        assert!(collapsed(&render_with(
            &session,
            &nav,
            RenderOptions::design().with_canvas_width(600.0)
        )));
        assert!(!collapsed(&render_with(
            &session,
            &nav,
            RenderOptions::design().with_canvas_width(900.0)
        )));
        // Custom threshold
        let wide = nav.clone().with_prop("mobileBreakpoint", 1024);
        assert!(collapsed(&render_with(
            &session,
            &wide,
            RenderOptions::design().with_canvas_width(900.0)
        )));
        // Preview follows the breakpoint only
        assert!(!collapsed(&render_with(
            &session,
            &nav,
            RenderOptions::preview().with_canvas_width(300.0)
        )));
        assert!(collapsed(&render_with(
            &session,
            &nav,
            RenderOptions::preview().with_breakpoint(Breakpoint::Mobile)
        )));
    }

    #[test]
    fn test_collapsed_menu_opens_via_widget_state() {
        let session = RenderSession::default();
        let options = RenderOptions::preview().with_breakpoint(Breakpoint::Mobile);
        let node = render_with(&session, &navbar(), options.clone());
        assert!(node.find_by_class("weave-nav-menu").is_empty());
        assert!(!node.text_content().contains("About"));

        session.ui.update_widget("nav", |w| w.nav_menu_open = true);
        let node = render_with(&session, &navbar(), options);
        assert_eq!(node.find_by_class("weave-nav-menu").len(), 1);
        assert!(node.text_content().contains("About"));
    }

    #[test]
    fn test_tabs_show_active_panel() {
        let session = RenderSession::default();
        let tabs = AppComponent::new("tabs", ComponentType::Tabs)
            .with_child(AppComponent::new("p1", ComponentType::Text).with_prop("title", "One").with_prop("content", "first"))
            .with_child(AppComponent::new("p2", ComponentType::Text).with_prop("title", "Two").with_prop("content", "second"));
        let node = render_with(&session, &tabs, RenderOptions::preview());
        assert!(node.find_by_key("p1").is_some());
        assert!(node.find_by_key("p2").is_none());

        session.ui.update_widget("tabs", |w| w.active_tab = 1);
        let node = render_with(&session, &tabs, RenderOptions::preview());
        assert!(node.find_by_key("p2").is_some());
        let selected: Vec<_> = node
            .find_all(&|e| e.get_attr("aria-selected") == Some("true"))
            .iter()
            .map(|e| e.children.clone())
            .collect();
        assert_eq!(selected, vec![vec![VNode::Text("Two".into())]]);
    }

    #[test]
    fn test_default_tab_is_seeded_once() {
        let session = RenderSession::default();
        let tabs = AppComponent::new("tabs", ComponentType::Tabs)
            .with_prop("tabs", json!([{"label": "A", "content": "a"}, {"label": "B", "content": "b"}]))
            .with_prop("defaultTab", 1);
        assert!(render_with(&session, &tabs, RenderOptions::preview()).text_content().ends_with('b'));
        session.ui.update_widget("tabs", |w| w.active_tab = 0);
        assert!(render_with(&session, &tabs, RenderOptions::preview()).text_content().ends_with('a'));
    }

    #[test]
    fn test_page_window() {
        assert_eq!(page_window(2, 3), vec![Some(1), Some(2), Some(3)]);
        assert_eq!(
            page_window(5, 10),
            vec![Some(1), None, Some(4), Some(5), Some(6), None, Some(10)]
        );
        assert_eq!(page_window(1, 10), vec![Some(1), Some(2), None, Some(10)]);
    }

    #[test]
    fn test_pagination_controls_bounds() {
        let nav = VNode::from(pagination_controls("list", 1, 3));
        let buttons = nav.find_by_class("weave-pagination-button");
        assert_eq!(buttons.len(), 5);
        assert_eq!(buttons[0].get_attr("disabled"), Some(""));
        assert_eq!(
            buttons[4].handler(EventKind::Click),
            Some(&HandlerAction::SetRepeaterPage {
                id: "list".into(),
                page: 2
            })
        );
    }
}
