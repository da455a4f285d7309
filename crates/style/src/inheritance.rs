//! Style inheritance propagation
//!
//! Typographic properties a node sets explicitly (inline or through a class)
//! flow down to its children. Defaults never propagate: only values an
//! author actually set count, so a heading's default weight does not leak
//! into its descendants as if it were explicit.

use crate::css::INHERITABLE_PROPERTIES;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use weave_ir::is_blank;

/// Where an inherited value was set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InheritOrigin {
    Inline,
    Class,
}

/// The ancestor that set an inherited value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritSource {
    pub component_id: String,
    pub origin: InheritOrigin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InheritedValue {
    pub value: Value,
    pub source: InheritSource,
}

/// Inherited style context passed from parent to children
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InheritedStyle(BTreeMap<String, InheritedValue>);

impl InheritedStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, property: &str) -> Option<&InheritedValue> {
        self.0.get(property)
    }

    /// Raw value for a property
    pub fn value(&self, property: &str) -> Option<&Value> {
        self.0.get(property).map(|v| &v.value)
    }

    pub fn insert(&mut self, property: impl Into<String>, value: InheritedValue) {
        self.0.insert(property.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InheritedValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A node's explicit style sources
pub struct ExplicitSources<'a> {
    pub component_id: &'a str,
    /// Flattened own props, overrides included
    pub own: &'a Map<String, Value>,
    /// Flattened class values at the current breakpoint
    pub classes: &'a Map<String, Value>,
    pub class_mode: bool,
    pub is_locked: &'a dyn Fn(&str) -> bool,
}

/// Compute the context a node passes to its children
///
/// The node's own explicit values are chosen with the same precedence the
/// merge engine uses and win over the incoming context.
pub fn propagate(incoming: &InheritedStyle, sources: &ExplicitSources<'_>) -> InheritedStyle {
    fn present(map: &Map<String, Value>, key: &str) -> Option<Value> {
        map.get(key).filter(|v| !is_blank(v)).cloned()
    }

    let mut out = incoming.clone();
    for property in INHERITABLE_PROPERTIES {
        let chosen = if (sources.is_locked)(property) {
            present(sources.own, property).map(|v| (v, InheritOrigin::Inline))
        } else if sources.class_mode {
            present(sources.classes, property).map(|v| (v, InheritOrigin::Class))
        } else {
            present(sources.own, property).map(|v| (v, InheritOrigin::Inline))
        };
        if let Some((value, origin)) = chosen {
            out.insert(
                *property,
                InheritedValue {
                    value,
                    source: InheritSource {
                        component_id: sources.component_id.to_string(),
                        origin,
                    },
                },
            );
        }
    }
    out
}
