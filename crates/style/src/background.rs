//! Layered background compositor
//!
//! A component can stack up to three background layers: an image, a
//! gradient and a solid fill, each with its own opacity. The stacking order
//! comes from `backgroundLayerOrder` (first entry on top). Layers compile to
//! one comma-separated `background` value plus aligned size, position and
//! repeat lists.

use crate::color::{apply_opacity, apply_opacity_to_gradient, opacity_factor, white_overlay};
use crate::css::StyleMap;
use serde_json::{Map, Value};
use weave_ir::{TokenStore, is_blank, resolve_token_value, value_as_f64};

/// Kind of background layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Image,
    Gradient,
    Fill,
}

impl LayerKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "image" => Some(LayerKind::Image),
            "gradient" => Some(LayerKind::Gradient),
            "fill" | "color" | "solid" => Some(LayerKind::Fill),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Image => "image",
            LayerKind::Gradient => "gradient",
            LayerKind::Fill => "fill",
        }
    }
}

/// Default stacking order, top first
pub const DEFAULT_LAYER_ORDER: [LayerKind; 3] = [LayerKind::Image, LayerKind::Gradient, LayerKind::Fill];

/// Parse `backgroundLayerOrder`; unknown or missing entries fall back to
/// the default order, duplicates are dropped
pub fn parse_layer_order(value: Option<&Value>) -> Vec<LayerKind> {
    let mut order: Vec<LayerKind> = Vec::with_capacity(3);
    if let Some(Value::Array(items)) = value {
        for kind in items.iter().filter_map(Value::as_str).filter_map(LayerKind::parse) {
            if !order.contains(&kind) {
                order.push(kind);
            }
        }
    }
    for kind in DEFAULT_LAYER_ORDER {
        if !order.contains(&kind) {
            order.push(kind);
        }
    }
    order
}

/// Raw background inputs after precedence resolution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackgroundInput {
    pub color: Option<Value>,
    pub gradient: Option<Value>,
    pub image: Option<Value>,
    pub layer_order: Option<Value>,
    pub size: Option<Value>,
    pub position: Option<Value>,
    pub repeat: Option<Value>,
}

impl BackgroundInput {
    /// Read the background keys from a flattened property map
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let pick = |key: &str| map.get(key).filter(|v| !is_blank(v)).cloned();
        Self {
            color: pick("backgroundColor"),
            gradient: pick("backgroundGradient"),
            image: pick("backgroundImage"),
            layer_order: pick("backgroundLayerOrder"),
            size: pick("backgroundSize"),
            position: pick("backgroundPosition"),
            repeat: pick("backgroundRepeat"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.gradient.is_none() && self.image.is_none()
    }
}

/// One composed layer
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedLayer {
    pub kind: LayerKind,
    /// `background` entries; an image faded below full opacity has two
    pub terms: Vec<String>,
    pub size: String,
    pub position: String,
    pub repeat: String,
    /// Opacity factor in `0.0..=1.0`
    pub opacity: f64,
}

/// Result of composition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposedBackground {
    pub layers: Vec<ComposedLayer>,
    /// Set instead of `layers` when there is no image or gradient
    pub background_color: Option<String>,
}

impl ComposedBackground {
    fn list(&self, f: impl Fn(&ComposedLayer) -> &str) -> String {
        self.layers
            .iter()
            .flat_map(|l| std::iter::repeat_n(f(l), l.terms.len()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The `background` shorthand value
    pub fn background(&self) -> Option<String> {
        if self.layers.is_empty() {
            return None;
        }
        Some(
            self.layers
                .iter()
                .flat_map(|l| l.terms.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }

    pub fn sizes(&self) -> String {
        self.list(|l| &l.size)
    }

    pub fn positions(&self) -> String {
        self.list(|l| &l.position)
    }

    pub fn repeats(&self) -> String {
        self.list(|l| &l.repeat)
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty() && self.background_color.is_none()
    }

    /// Write the composed properties into a style map
    pub fn apply_to(&self, style: &mut StyleMap) {
        if let Some(background) = self.background() {
            style.set("background", background);
            style.set("backgroundSize", self.sizes());
            style.set("backgroundPosition", self.positions());
            style.set("backgroundRepeat", self.repeats());
        } else if let Some(color) = &self.background_color {
            style.set("backgroundColor", color.clone());
        }
    }
}

/// `(value, opacity factor, object)` from a string or `{value, opacity}`
fn layer_source<'a>(value: &'a Value, value_keys: &[&str]) -> Option<(String, f64, Option<&'a Map<String, Value>>)> {
    match value {
        Value::String(s) if !is_blank(value) => Some((s.trim().to_string(), 1.0, None)),
        Value::Object(obj) => {
            let inner = value_keys
                .iter()
                .find_map(|k| obj.get(*k).filter(|v| !is_blank(v)))?
                .as_str()?
                .trim()
                .to_string();
            let opacity = obj
                .get("opacity")
                .and_then(value_as_f64)
                .map(opacity_factor)
                .unwrap_or(1.0);
            Some((inner, opacity, Some(obj)))
        }
        _ => None,
    }
}

fn obj_str(obj: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    obj?.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn value_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn css_url(src: &str) -> String {
    if src.starts_with("url(") {
        src.to_string()
    } else {
        format!("url({src})")
    }
}

/// Compose the background layers
pub fn compose_background(input: &BackgroundInput, tokens: &dyn TokenStore) -> ComposedBackground {
    let resolve = |v: &Option<Value>| v.as_ref().map(|v| resolve_token_value(v, tokens));
    let color = resolve(&input.color);
    let gradient = resolve(&input.gradient);
    let image = resolve(&input.image);

    let fill = color
        .as_ref()
        .and_then(|v| layer_source(v, &["value", "color"]))
        .map(|(c, opacity, _)| apply_opacity(&c, opacity));
    let gradient = gradient
        .as_ref()
        .and_then(|v| layer_source(v, &["value", "gradient"]));
    let image = image
        .as_ref()
        .and_then(|v| layer_source(v, &["value", "url", "src"]));

    if gradient.is_none() && image.is_none() {
        return ComposedBackground {
            layers: Vec::new(),
            background_color: fill,
        };
    }

    let mut layers = Vec::with_capacity(3);
    for kind in parse_layer_order(input.layer_order.as_ref()) {
        match kind {
            LayerKind::Image => {
                if let Some((src, opacity, obj)) = &image {
                    let mut terms = Vec::with_capacity(2);
                    if *opacity < 1.0 {
                        terms.push(white_overlay(*opacity));
                    }
                    terms.push(css_url(src));
                    layers.push(ComposedLayer {
                        kind,
                        terms,
                        size: obj_str(*obj, "size")
                            .or_else(|| value_str(input.size.as_ref()))
                            .unwrap_or_else(|| "cover".to_string()),
                        position: obj_str(*obj, "position")
                            .or_else(|| value_str(input.position.as_ref()))
                            .unwrap_or_else(|| "center".to_string()),
                        repeat: obj_str(*obj, "repeat")
                            .or_else(|| value_str(input.repeat.as_ref()))
                            .unwrap_or_else(|| "no-repeat".to_string()),
                        opacity: *opacity,
                    });
                }
            }
            LayerKind::Gradient => {
                if let Some((g, opacity, _)) = &gradient {
                    layers.push(plain_layer(kind, apply_opacity_to_gradient(g, *opacity), *opacity));
                }
            }
            LayerKind::Fill => {
                if let Some(c) = &fill {
                    layers.push(plain_layer(kind, format!("linear-gradient({c},{c})"), 1.0));
                }
            }
        }
    }
    ComposedBackground {
        layers,
        background_color: None,
    }
}

fn plain_layer(kind: LayerKind, term: String, opacity: f64) -> ComposedLayer {
    ComposedLayer {
        kind,
        terms: vec![term],
        size: "auto".to_string(),
        position: "0% 0%".to_string(),
        repeat: "no-repeat".to_string(),
        opacity,
    }
}

/// Split a comma-separated CSS list at top level (commas inside
/// parentheses do not split)
pub fn split_top_level(list: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in list.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                out.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        out.push(current.trim().to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use weave_ir::InMemoryTokenStore;

    fn compose(input: BackgroundInput) -> ComposedBackground {
        compose_background(&input, &InMemoryTokenStore::default())
    }

    fn three_layers(order: Value) -> BackgroundInput {
        BackgroundInput {
            image: Some(json!({"value": "hero.jpg", "opacity": 80})),
            gradient: Some(json!({"value": "linear-gradient(#000, #fff)", "opacity": 50})),
            color: Some(json!({"type": "solid", "value": "#336699", "opacity": 40})),
            layer_order: Some(order),
            ..Default::default()
        }
    }

    #[test]
    fn test_image_over_fill() {
        let bg = compose(BackgroundInput {
            image: Some(json!({"value": "img.png", "opacity": 50})),
            color: Some(json!("#ff0000")),
            ..Default::default()
        });
        let css = bg.background().unwrap();
        let terms = split_top_level(&css);
        assert_eq!(
            terms,
            vec![
                "linear-gradient(rgba(255,255,255,0.5),rgba(255,255,255,0.5))",
                "url(img.png)",
                "linear-gradient(#ff0000,#ff0000)",
            ]
        );
        assert_eq!(bg.sizes(), "cover, cover, auto");
        assert_eq!(bg.repeats(), "no-repeat, no-repeat, no-repeat");
    }

    #[test]
    fn test_fill_only_degrades_to_color() {
        let bg = compose(BackgroundInput {
            color: Some(json!({"type": "solid", "value": "#000000", "opacity": 50})),
            ..Default::default()
        });
        assert!(bg.layers.is_empty());
        assert_eq!(bg.background_color.as_deref(), Some("rgba(0,0,0,0.5)"));
        let mut style = StyleMap::new();
        bg.apply_to(&mut style);
        assert_eq!(style.get("backgroundColor"), Some("rgba(0,0,0,0.5)"));
        assert!(!style.contains("background"));
    }

    #[test]
    fn test_deleted_layers_skipped() {
        let input = BackgroundInput::from_map(
            json!({
                "backgroundImage": "__deleted__",
                "backgroundGradient": "",
                "backgroundColor": "#fff"
            })
            .as_object()
            .unwrap(),
        );
        let bg = compose(input);
        assert!(bg.layers.is_empty());
        assert_eq!(bg.background_color.as_deref(), Some("#fff"));
    }

    #[test]
    fn test_layer_order_only_changes_stacking() {
        let default = compose(three_layers(json!(["image", "gradient", "fill"])));
        let reversed = compose(three_layers(json!(["fill", "gradient", "image"])));

        let mut flipped = reversed.layers.clone();
        flipped.reverse();
        assert_eq!(flipped, default.layers);

        let a = split_top_level(&default.background().unwrap());
        let b = split_top_level(&reversed.background().unwrap());
        assert_eq!(a.len(), 4);
        assert_eq!(b.len(), 4);
        let mut sorted_a = a.clone();
        let mut sorted_b = b.clone();
        sorted_a.sort();
        sorted_b.sort();
        assert_eq!(sorted_a, sorted_b);
        assert_eq!(split_top_level(&reversed.sizes()).len(), 4);
    }

    #[test]
    fn test_gradient_opacity_baked() {
        let bg = compose(three_layers(json!(["gradient"])));
        assert_eq!(bg.layers[0].kind, LayerKind::Gradient);
        assert_eq!(
            bg.layers[0].terms[0],
            "linear-gradient(rgba(0,0,0,0.5), rgba(255,255,255,0.5))"
        );
        assert_eq!(bg.layers[2].terms[0], "linear-gradient(rgba(51,102,153,0.4),rgba(51,102,153,0.4))");
    }

    #[test]
    fn test_parse_layer_order_fills_gaps() {
        assert_eq!(
            parse_layer_order(Some(&json!(["fill", "bogus", "fill"]))),
            vec![LayerKind::Fill, LayerKind::Image, LayerKind::Gradient]
        );
        assert_eq!(parse_layer_order(None), DEFAULT_LAYER_ORDER.to_vec());
    }

    #[test]
    fn test_token_backed_fill() {
        let tokens = InMemoryTokenStore::from_tokens(vec![weave_ir::DesignToken::new(
            "color.brand",
            "#123456",
        )]);
        let input = BackgroundInput {
            color: Some(json!({"tokenRef": "color.brand", "value": "#000"})),
            gradient: Some(json!("linear-gradient(red, blue)")),
            ..Default::default()
        };
        let bg = compose_background(&input, &tokens);
        assert_eq!(
            bg.background().unwrap(),
            "linear-gradient(red, blue), linear-gradient(#123456,#123456)"
        );
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("a(1, 2), b , c(d(e, f))"),
            vec!["a(1, 2)", "b", "c(d(e, f))"]
        );
        assert!(split_top_level("").is_empty());
    }
}
