//! CSS property tables and the computed style map
//!
//! Properties are keyed by their camelCase names throughout the engine and
//! converted to kebab-case only when a declaration string is emitted.

use heck::ToKebabCase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Properties that flow from parent to child
pub const INHERITABLE_PROPERTIES: &[&str] = &[
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
];

/// Numeric properties emitted without a unit
pub const UNITLESS_PROPERTIES: &[&str] = &[
    "fontWeight",
    "lineHeight",
    "opacity",
    "zIndex",
    "flexGrow",
    "flexShrink",
    "order",
];

/// Width/height properties subject to the design-canvas clamp
pub const WIDTH_PROPERTIES: &[&str] = &["width", "minWidth", "maxWidth"];
pub const HEIGHT_PROPERTIES: &[&str] = &["height", "minHeight", "maxHeight"];

/// Properties whose values are lengths
pub const LENGTH_PROPERTIES: &[&str] = &[
    "width",
    "height",
    "minWidth",
    "maxWidth",
    "minHeight",
    "maxHeight",
    "margin",
    "marginTop",
    "marginRight",
    "marginBottom",
    "marginLeft",
    "padding",
    "paddingTop",
    "paddingRight",
    "paddingBottom",
    "paddingLeft",
    "gap",
    "rowGap",
    "columnGap",
    "top",
    "right",
    "bottom",
    "left",
    "borderWidth",
    "borderRadius",
    "borderTopLeftRadius",
    "borderTopRightRadius",
    "borderBottomRightRadius",
    "borderBottomLeftRadius",
    "fontSize",
    "letterSpacing",
    "flexBasis",
];

/// Inputs consumed by the background compositor rather than emitted as-is
pub const BACKGROUND_KEYS: &[&str] = &[
    "backgroundColor",
    "backgroundGradient",
    "backgroundImage",
    "backgroundLayerOrder",
    "backgroundSize",
    "backgroundPosition",
    "backgroundRepeat",
];

/// Layout-critical properties AI-generated components keep inline even in
/// class mode
pub const CRITICAL_LAYOUT_PROPERTIES: &[&str] = &[
    "display",
    "flexDirection",
    "flexWrap",
    "justifyContent",
    "alignItems",
    "gridTemplateColumns",
    "gridTemplateRows",
    "gap",
    "width",
    "height",
    "minWidth",
    "maxWidth",
    "minHeight",
    "maxHeight",
    "backgroundColor",
    "backgroundGradient",
    "backgroundImage",
];

pub fn is_inheritable(property: &str) -> bool {
    INHERITABLE_PROPERTIES.contains(&property)
}

pub fn is_unitless(property: &str) -> bool {
    UNITLESS_PROPERTIES.contains(&property)
}

pub fn is_length(property: &str) -> bool {
    LENGTH_PROPERTIES.contains(&property)
}

pub fn is_background_key(property: &str) -> bool {
    BACKGROUND_KEYS.contains(&property)
}

pub fn is_critical_layout(property: &str) -> bool {
    CRITICAL_LAYOUT_PROPERTIES.contains(&property)
}

/// Shorthand whose lock also locks this longhand (`paddingTop` → `padding`)
pub fn lock_shorthand(property: &str) -> Option<&'static str> {
    ["padding", "margin", "border", "background"]
        .into_iter()
        .find(|s| property.len() > s.len() && property.starts_with(s))
}

/// camelCase property name to its CSS spelling
pub fn css_property_name(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }
    let kebab = property.to_kebab_case();
    // Vendor prefixes (`WebkitLineClamp`, `msFilter`) keep their leading dash
    if ["webkit-", "moz-", "ms-"].iter().any(|p| kebab.starts_with(p)) {
        format!("-{kebab}")
    } else {
        kebab
    }
}

/// Final CSS values keyed by camelCase property
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap(BTreeMap<String, String>);

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.0.insert(property.into(), value.into());
    }

    /// Set only if absent
    pub fn set_default(&mut self, property: &str, value: impl Into<String>) {
        self.0
            .entry(property.to_string())
            .or_insert_with(|| value.into());
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0.get(property).map(String::as_str)
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        self.0.remove(property)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.0.contains_key(property)
    }

    pub fn extend(&mut self, other: &StyleMap) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inline declaration block (`color: #111; font-size: 24px`)
    pub fn to_css(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}: {}", css_property_name(k), v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
