//! Media and decorative components

use crate::renderer::Cx;
use crate::vdom::VElement;
use weave_style::format_number;

fn placeholder(label: &str) -> VElement {
    VElement::new("div").class("weave-media-placeholder").text(label)
}

pub(super) fn image(cx: &Cx<'_, '_>) -> VElement {
    let src = cx
        .text_any(&["src", "url", "imageUrl"])
        .unwrap_or_else(|| cx.config().placeholder_image.clone());
    let mut img = VElement::new("img")
        .attr("src", src)
        .attr("alt", cx.text_any(&["alt", "altText"]).unwrap_or_default())
        .attr("loading", "lazy");
    if let Some(fit) = cx.props.get_str("objectFit") {
        img = img.style("objectFit", fit);
    }
    img
}

/// YouTube watch and short links as an embed URL
fn youtube_embed(url: &str) -> Option<String> {
    let id = if let Some((_, rest)) = url.split_once("youtube.com/watch?v=") {
        rest
    } else if let Some((_, rest)) = url.split_once("youtu.be/") {
        rest
    } else {
        return None;
    };
    let id = id.split(['&', '?', '#']).next().filter(|s| !s.is_empty())?;
    Some(format!("https://www.youtube.com/embed/{id}"))
}

pub(super) fn video(cx: &Cx<'_, '_>) -> VElement {
    let Some(src) = cx.text_any(&["src", "url", "videoUrl"]) else {
        return if cx.is_design() {
            placeholder("Video")
        } else {
            VElement::new("video")
        };
    };
    if let Some(embed) = youtube_embed(&src) {
        return VElement::new("iframe")
            .attr("src", embed)
            .attr("title", cx.text("title").unwrap_or_else(|| "Video".to_string()))
            .attr("allow", "accelerometer; autoplay; encrypted-media; picture-in-picture")
            .flag("allowfullscreen", true);
    }
    let controls = cx.props.get("controls").is_none() || cx.props.get_bool("controls");
    VElement::new("video")
        .attr("src", src)
        .attr_opt("poster", cx.text("poster"))
        .flag("controls", controls)
        // Browsers only autoplay muted video
        .flag("autoplay", cx.props.get_bool("autoplay"))
        .flag("muted", cx.props.get_bool("muted") || cx.props.get_bool("autoplay"))
        .flag("loop", cx.props.get_bool("loop"))
        .flag("playsinline", true)
}

pub(super) fn icon(cx: &Cx<'_, '_>) -> VElement {
    let name = cx.text_any(&["icon", "name"]).unwrap_or_else(|| "star".to_string());
    VElement::new("span")
        .class("weave-icon")
        .class(format!("weave-icon-{name}"))
        .attr("data-icon", name)
        .attr_opt("aria-label", cx.text("label"))
        .flag("aria-hidden", cx.props.get_str("label").is_none())
}

pub(super) fn divider(cx: &Cx<'_, '_>) -> VElement {
    if cx.props.get_str("orientation") == Some("vertical") {
        VElement::new("div")
            .class("weave-divider-vertical")
            .attr("role", "separator")
            .attr("aria-orientation", "vertical")
    } else {
        VElement::new("hr")
    }
}

pub(super) fn spacer(_cx: &Cx<'_, '_>) -> VElement {
    VElement::new("div").class("weave-spacer").attr("aria-hidden", "true")
}

pub(super) fn embed(cx: &Cx<'_, '_>) -> VElement {
    let frame = VElement::new("iframe")
        .attr("title", cx.text("title").unwrap_or_else(|| "Embedded content".to_string()))
        .attr("sandbox", "allow-scripts allow-same-origin allow-popups allow-forms")
        .attr("loading", "lazy");
    if let Some(src) = cx.text_any(&["src", "url"]) {
        return frame.attr("src", src);
    }
    if let Some(html) = cx.props.get_str("html") {
        return frame.attr("srcdoc", html);
    }
    if cx.is_design() {
        placeholder("Embed: set a URL or HTML snippet")
    } else {
        VElement::new("div")
    }
}

pub(super) fn map(cx: &Cx<'_, '_>) -> VElement {
    let query = match (cx.props.get_f64("latitude"), cx.props.get_f64("longitude")) {
        (Some(lat), Some(lng)) => Some(format!("{},{}", format_number(lat), format_number(lng))),
        _ => cx.text_any(&["address", "location"]),
    };
    let Some(query) = query else {
        return if cx.is_design() {
            placeholder("Map: set an address")
        } else {
            VElement::new("div")
        };
    };
    let zoom = cx.props.get_f64("zoom").unwrap_or(14.0).clamp(1.0, 20.0);
    VElement::new("iframe")
        .attr(
            "src",
            format!(
                "https://maps.google.com/maps?q={}&z={}&output=embed",
                urlencoding::encode(&query),
                format_number(zoom.round())
            ),
        )
        .attr("title", format!("Map of {query}"))
        .attr("loading", "lazy")
        .attr("referrerpolicy", "no-referrer-when-downgrade")
}

fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|w| w.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

pub(super) fn avatar(cx: &Cx<'_, '_>) -> VElement {
    let name = cx.text_any(&["name", "alt"]).unwrap_or_default();
    let root = VElement::new("div").class("weave-avatar");
    match cx.text_any(&["src", "imageUrl"]) {
        Some(src) => root.child(
            VElement::new("img")
                .class("weave-avatar-img")
                .attr("src", src)
                .attr("alt", name),
        ),
        None => {
            let text = initials(&name);
            root.child(
                VElement::new("span")
                    .class("weave-avatar-initials")
                    .text(if text.is_empty() { "?".to_string() } else { text }),
            )
        }
    }
}

pub(super) fn progress(cx: &Cx<'_, '_>) -> VElement {
    let max = cx.props.get_f64("max").filter(|m| *m > 0.0).unwrap_or(100.0);
    let value = cx.props.get_f64("value").unwrap_or(0.0).clamp(0.0, max);
    let percent = value / max * 100.0;
    let mut bar = VElement::new("div")
        .class("weave-progress")
        .attr("role", "progressbar")
        .attr("aria-valuemin", "0")
        .attr("aria-valuemax", format_number(max))
        .attr("aria-valuenow", format_number(value))
        .child(
            VElement::new("div")
                .class("weave-progress-bar")
                .style("width", format!("{}%", format_number(percent))),
        );
    if cx.props.get_bool("showLabel") {
        bar = bar.child(
            VElement::new("span")
                .class("weave-progress-label")
                .text(format!("{}%", format_number(percent.round()))),
        );
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{RenderOptions, RenderSession, Renderer};
    use crate::vdom::VNode;
    use pretty_assertions::assert_eq;
    use weave_ir::{AppComponent, ComponentType, InMemoryClassStore, InMemoryTokenStore};

    fn render(component: &AppComponent, options: RenderOptions) -> VNode {
        let classes = InMemoryClassStore::default();
        let tokens = InMemoryTokenStore::default();
        let session = RenderSession::default();
        Renderer::new(&classes, &tokens, &session).render(component, &options)
    }

    #[test]
    fn test_image_placeholder_src() {
        let node = render(&AppComponent::new("i", ComponentType::Image), RenderOptions::preview());
        let src = node.as_element().unwrap().get_attr("src").unwrap().to_string();
        assert!(src.starts_with("https://placehold.co"));
    }

    #[test]
    fn test_youtube_embed() {
        assert_eq!(
            youtube_embed("https://www.youtube.com/watch?v=abc123&t=10"),
            Some("https://www.youtube.com/embed/abc123".to_string())
        );
        assert_eq!(
            youtube_embed("https://youtu.be/xyz"),
            Some("https://www.youtube.com/embed/xyz".to_string())
        );
        assert_eq!(youtube_embed("https://cdn.example.com/clip.mp4"), None);
    }

    #[test]
    fn test_map_query_is_encoded() {
        let map = AppComponent::new("m", ComponentType::Map).with_prop("address", "10 Downing St, London");
        let node = render(&map, RenderOptions::preview());
        let src = node.as_element().unwrap().get_attr("src").unwrap();
        assert!(src.contains("q=10%20Downing%20St%2C%20London"));
        assert!(src.contains("z=14"));
    }

    #[test]
    fn test_avatar_initials() {
        assert_eq!(initials("ada lovelace byron"), "AL");
        let avatar = AppComponent::new("a", ComponentType::Avatar).with_prop("name", "Grace Hopper");
        assert_eq!(render(&avatar, RenderOptions::preview()).text_content(), "GH");
    }

    #[test]
    fn test_progress_width() {
        let p = AppComponent::new("p", ComponentType::Progress)
            .with_prop("value", 30)
            .with_prop("max", 60)
            .with_prop("showLabel", true);
        let node = render(&p, RenderOptions::preview());
        let bar = &node.find_by_class("weave-progress-bar")[0];
        assert_eq!(bar.style.get("width"), Some("50%"));
        assert_eq!(node.text_content(), "50%");
    }
}
