//! Style classes
//!
//! A style class is a named, reusable property bag with optional tablet and
//! mobile overrides. Components attach classes by name through `classNames`.

use crate::props::is_blank;
use crate::stores::ClassStore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use weave_core::Breakpoint;

/// A named style class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleClass {
    /// Unique class name
    pub name: String,

    /// Desktop (base) styles
    #[serde(default)]
    pub styles: Map<String, Value>,

    /// Applied at tablet and mobile
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub tablet_styles: Map<String, Value>,

    /// Applied at mobile only
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub mobile_styles: Map<String, Value>,
}

impl StyleClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set a desktop style
    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.styles.insert(property.into(), value.into());
        self
    }

    /// Set a style for a specific breakpoint's bag
    pub fn with_breakpoint_style(
        mut self,
        breakpoint: Breakpoint,
        property: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.bag_mut(breakpoint).insert(property.into(), value.into());
        self
    }

    /// The raw bag for a breakpoint
    pub fn bag(&self, breakpoint: Breakpoint) -> &Map<String, Value> {
        match breakpoint {
            Breakpoint::Desktop => &self.styles,
            Breakpoint::Tablet => &self.tablet_styles,
            Breakpoint::Mobile => &self.mobile_styles,
        }
    }

    fn bag_mut(&mut self, breakpoint: Breakpoint) -> &mut Map<String, Value> {
        match breakpoint {
            Breakpoint::Desktop => &mut self.styles,
            Breakpoint::Tablet => &mut self.tablet_styles,
            Breakpoint::Mobile => &mut self.mobile_styles,
        }
    }

    /// Styles in effect at a breakpoint; narrower bags win per property.
    /// Blank values never override a wider bag.
    pub fn resolve_at(&self, breakpoint: Breakpoint) -> Map<String, Value> {
        let mut resolved = Map::new();
        for bp in breakpoint.cascade() {
            for (key, value) in self.bag(*bp) {
                if !is_blank(value) {
                    resolved.insert(key.clone(), value.clone());
                }
            }
        }
        resolved
    }

    /// Whether the class defines anything at any breakpoint
    pub fn is_empty(&self) -> bool {
        [&self.styles, &self.tablet_styles, &self.mobile_styles]
            .iter()
            .all(|bag| bag.values().all(is_blank))
    }
}

/// Merged view over a component's attached classes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedClasses {
    /// Property values, later classes winning
    pub values: Map<String, Value>,

    /// Class names that could not be found in the store
    pub missing: Vec<String>,
}

impl ResolvedClasses {
    /// Class mode: at least one non-blank value resolved
    pub fn has_styles(&self) -> bool {
        !self.values.is_empty()
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.values.get(property)
    }

    pub fn defines(&self, property: &str) -> bool {
        self.values.contains_key(property)
    }
}

/// Resolve attached classes at a breakpoint, in `classNames` order
pub fn resolve_classes(
    names: &[String],
    store: &dyn ClassStore,
    breakpoint: Breakpoint,
) -> ResolvedClasses {
    let mut out = ResolvedClasses::default();
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        match store.class(name) {
            Some(class) => {
                for (key, value) in class.resolve_at(breakpoint) {
                    out.values.insert(key, value);
                }
            }
            None => out.missing.push(name.to_string()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::InMemoryClassStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn card_class() -> StyleClass {
        StyleClass::new("card")
            .with_style("padding", 24)
            .with_style("color", "#111")
            .with_breakpoint_style(Breakpoint::Tablet, "padding", 16)
            .with_breakpoint_style(Breakpoint::Mobile, "padding", 8)
            .with_breakpoint_style(Breakpoint::Mobile, "color", "")
    }

    #[test]
    fn test_resolve_cascade() {
        let class = card_class();
        assert_eq!(class.resolve_at(Breakpoint::Desktop).get("padding"), Some(&json!(24)));
        assert_eq!(class.resolve_at(Breakpoint::Tablet).get("padding"), Some(&json!(16)));
        let mobile = class.resolve_at(Breakpoint::Mobile);
        assert_eq!(mobile.get("padding"), Some(&json!(8)));
        // Blank mobile colour does not clear the desktop one
        assert_eq!(mobile.get("color"), Some(&json!("#111")));
    }

    #[test]
    fn test_multiple_classes_later_wins() {
        let store = InMemoryClassStore::from_classes(vec![
            card_class(),
            StyleClass::new("dark").with_style("color", "#fff"),
        ]);
        let resolved = resolve_classes(
            &["card".to_string(), "dark".to_string(), "ghost".to_string()],
            &store,
            Breakpoint::Desktop,
        );
        assert_eq!(resolved.get("color"), Some(&json!("#fff")));
        assert_eq!(resolved.get("padding"), Some(&json!(24)));
        assert_eq!(resolved.missing, vec!["ghost".to_string()]);
        assert!(resolved.has_styles());
    }

    #[test]
    fn test_empty_class_is_not_class_mode() {
        let store = InMemoryClassStore::from_classes(vec![StyleClass::new("empty")]);
        let resolved = resolve_classes(&["empty".to_string()], &store, Breakpoint::Mobile);
        assert!(!resolved.has_styles());
        assert!(store.class("empty").map(|c| c.is_empty()).unwrap_or(false));
    }

    #[test]
    fn test_deserialize_class() {
        let class: StyleClass = serde_json::from_value(json!({
            "name": "hero",
            "styles": {"fontSize": 32},
            "mobileStyles": {"fontSize": 20}
        }))
        .unwrap();
        assert_eq!(class.resolve_at(Breakpoint::Mobile).get("fontSize"), Some(&json!(20)));
        assert!(class.tablet_styles.is_empty());
    }
}
