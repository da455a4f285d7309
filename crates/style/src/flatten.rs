//! Property-family flattening
//!
//! Props group style values into families (`spacingControl`, `layout`,
//! `positionControl`, `border`, `effects`, `typography`) next to flat
//! properties. Flattening turns both into one camelCase property map so
//! precedence can be applied per property.

use serde_json::{Map, Value};
use weave_ir::is_blank;

/// Family objects recognised in props
pub const STYLE_FAMILIES: &[&str] = &[
    "spacingControl",
    "layout",
    "positionControl",
    "border",
    "effects",
    "typography",
];

/// Flat properties read straight from props (or from a class bag)
pub const FLAT_STYLE_PROPERTIES: &[&str] = &[
    // dimension
    "width",
    "height",
    "minWidth",
    "maxWidth",
    "minHeight",
    "maxHeight",
    // layout
    "display",
    "flexDirection",
    "justifyContent",
    "alignItems",
    "alignContent",
    "alignSelf",
    "flexWrap",
    "flexGrow",
    "flexShrink",
    "flexBasis",
    "gap",
    "rowGap",
    "columnGap",
    "gridTemplateColumns",
    "gridTemplateRows",
    "gridColumn",
    "gridRow",
    "order",
    // position
    "position",
    "top",
    "right",
    "bottom",
    "left",
    "zIndex",
    // spacing longhands
    "marginTop",
    "marginRight",
    "marginBottom",
    "marginLeft",
    "paddingTop",
    "paddingRight",
    "paddingBottom",
    "paddingLeft",
    // border longhands
    "borderWidth",
    "borderStyle",
    "borderColor",
    "borderRadius",
    "borderTopLeftRadius",
    "borderTopRightRadius",
    "borderBottomRightRadius",
    "borderBottomLeftRadius",
    // effects
    "opacity",
    "boxShadow",
    "filter",
    "transform",
    "transition",
    "cursor",
    "overflow",
    "overflowX",
    "overflowY",
    // typography
    "fontFamily",
    "fontSize",
    "fontWeight",
    "fontStyle",
    "lineHeight",
    "letterSpacing",
    "textTransform",
    "color",
    "textAlign",
    "textDecoration",
    "whiteSpace",
    // background inputs
    "backgroundColor",
    "backgroundGradient",
    "backgroundImage",
    "backgroundLayerOrder",
    "backgroundSize",
    "backgroundPosition",
    "backgroundRepeat",
];

const SIDES: [(&str, &str); 4] = [
    ("top", "Top"),
    ("right", "Right"),
    ("bottom", "Bottom"),
    ("left", "Left"),
];

const CORNERS: [(&str, &str); 4] = [
    ("topLeft", "TopLeft"),
    ("topRight", "TopRight"),
    ("bottomRight", "BottomRight"),
    ("bottomLeft", "BottomLeft"),
];

fn put(out: &mut Map<String, Value>, key: String, value: &Value) {
    if !value.is_null() {
        out.insert(key, value.clone());
    }
}

/// `margin`/`padding`: scalar → four longhands, `{top, ...}` → per side
fn flatten_box(out: &mut Map<String, Value>, prefix: &str, value: &Value) {
    match value {
        Value::Object(sides) if !sides.contains_key("unit") && !sides.contains_key("tokenRef") => {
            for (key, suffix) in SIDES {
                if let Some(v) = sides.get(key) {
                    put(out, format!("{prefix}{suffix}"), v);
                }
            }
        }
        other => {
            for (_, suffix) in SIDES {
                put(out, format!("{prefix}{suffix}"), other);
            }
        }
    }
}

fn flatten_border(out: &mut Map<String, Value>, border: &Map<String, Value>) {
    for (key, prop) in [
        ("width", "borderWidth"),
        ("style", "borderStyle"),
        ("color", "borderColor"),
    ] {
        if let Some(v) = border.get(key) {
            put(out, prop.to_string(), v);
        }
    }
    match border.get("radius") {
        Some(Value::Object(corners))
            if !corners.contains_key("unit") && !corners.contains_key("tokenRef") =>
        {
            for (key, mid) in CORNERS {
                if let Some(v) = corners.get(key) {
                    put(out, format!("border{mid}Radius"), v);
                }
            }
        }
        Some(v) => put(out, "borderRadius".to_string(), v),
        None => {}
    }
}

/// Flatten a props-like map (component props, class bag, legacy style)
pub fn flatten_style(source: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();

    // Flat properties first so family objects win when both are present
    for key in FLAT_STYLE_PROPERTIES {
        if let Some(v) = source.get(*key) {
            put(&mut out, key.to_string(), v);
        }
    }
    for key in ["margin", "padding"] {
        if let Some(v) = source.get(key) {
            flatten_box(&mut out, key, v);
        }
    }

    if let Some(Value::Object(spacing)) = source.get("spacingControl") {
        for key in ["margin", "padding"] {
            if let Some(v) = spacing.get(key) {
                flatten_box(&mut out, key, v);
            }
        }
    }
    for family in ["layout", "positionControl", "effects", "typography"] {
        if let Some(Value::Object(values)) = source.get(family) {
            for (k, v) in values {
                put(&mut out, k.clone(), v);
            }
        }
    }
    if let Some(Value::Object(border)) = source.get("border") {
        flatten_border(&mut out, border);
    }
    out
}

/// Whether props carry any style (family objects or flat properties)
pub fn has_prop_styles(props: &Map<String, Value>) -> bool {
    STYLE_FAMILIES
        .iter()
        .any(|f| props.get(*f).is_some_and(|v| !is_blank(v)))
        || FLAT_STYLE_PROPERTIES
            .iter()
            .chain(["margin", "padding"].iter())
            .any(|p| props.get(*p).is_some_and(|v| !is_blank(v)))
}
