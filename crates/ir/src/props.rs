//! Component props
//!
//! Props are an open, string-keyed JSON map holding both semantic values
//! (`content`, `href`, `src`) and style-family sub-objects (`spacingControl`,
//! `typography`, `border`, `backgroundColor`, ...). `Props` wraps the map with
//! typed accessors and the lock/deletion conventions used by the style engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::{Deref, DerefMut};

/// Key holding the per-property lock set (`{"fontSize": true}`)
pub const LOCKED_PROPS_KEY: &str = "__lockedProps";

/// Sentinel stored when the author explicitly deleted a value
pub const DELETED_SENTINEL: &str = "__deleted__";

/// Keys flagging a component as produced by the AI generator
const AI_GENERATED_KEYS: &[&str] = &["aiGenerated", "__aiGenerated"];

/// Check whether a value counts as "not set"
///
/// Null, empty/whitespace strings, the deletion sentinel and empty objects
/// are blank. Numbers and booleans never are.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            let s = s.trim();
            s.is_empty() || s == DELETED_SENTINEL
        }
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Check whether a value is the deletion sentinel
pub fn is_deleted(value: &Value) -> bool {
    matches!(value, Value::String(s) if s == DELETED_SENTINEL)
}

/// Interpret a JSON value as a number (numbers and numeric strings)
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Interpret a JSON value as a boolean (`true`, `"true"`, `1`)
pub fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" | "" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::Null => Some(false),
        _ => None,
    }
}

/// Component props map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props(pub Map<String, Value>);

impl Props {
    /// Create empty props
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build props from a JSON value (non-objects give empty props)
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::new(),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Get a string prop (blank strings are `None`)
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() && s != DELETED_SENTINEL => {
                Some(s.as_str())
            }
            _ => None,
        }
    }

    /// Get a boolean prop, defaulting to false
    pub fn get_bool(&self, key: &str) -> bool {
        self.0.get(key).and_then(value_as_bool).unwrap_or(false)
    }

    /// Get a numeric prop
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(value_as_f64)
    }

    /// Get a nested object prop
    pub fn get_object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    /// Get an array prop
    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.0.get(key).and_then(Value::as_array)
    }

    /// Walk a path of object keys (`["typography", "fontSize"]`)
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.0.get(*first)?;
        for key in rest {
            current = current.as_object()?.get(*key)?;
        }
        Some(current)
    }

    /// Check if a property is in the `__lockedProps` set
    pub fn is_locked(&self, key: &str) -> bool {
        self.get_object(LOCKED_PROPS_KEY)
            .and_then(|locked| locked.get(key))
            .and_then(value_as_bool)
            .unwrap_or(false)
    }

    /// All locked property names
    pub fn locked_keys(&self) -> Vec<&str> {
        self.get_object(LOCKED_PROPS_KEY)
            .map(|locked| {
                locked
                    .iter()
                    .filter(|(_, v)| value_as_bool(v).unwrap_or(false))
                    .map(|(k, _)| k.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Lock a property (builder-style)
    pub fn with_locked(mut self, key: &str) -> Self {
        let entry = self
            .0
            .entry(LOCKED_PROPS_KEY.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(locked) = entry {
            locked.insert(key.to_string(), Value::Bool(true));
        }
        self
    }

    /// Whether the component came from the AI generator
    pub fn is_ai_generated(&self) -> bool {
        AI_GENERATED_KEYS.iter().any(|k| self.get_bool(k))
    }

    /// Whether the whole component is locked against editing
    pub fn is_component_locked(&self) -> bool {
        self.get_bool("locked")
    }

    /// Text content (`content`, falling back to `text`)
    pub fn content(&self) -> Option<&str> {
        self.get_str("content").or_else(|| self.get_str("text"))
    }

    /// Merge another props map on top of this one (key-wise replace)
    pub fn merge(&mut self, other: &Props) {
        for (k, v) in other.0.iter() {
            self.0.insert(k.clone(), v.clone());
        }
    }
}

impl Deref for Props {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Props {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Map<String, Value>> for Props {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!("")));
        assert!(is_blank(&json!("   ")));
        assert!(is_blank(&json!(DELETED_SENTINEL)));
        assert!(is_blank(&json!({})));
        assert!(!is_blank(&json!(0)));
        assert!(!is_blank(&json!(false)));
        assert!(!is_blank(&json!("#111")));
    }

    #[test]
    fn test_value_coercions() {
        assert_eq!(value_as_f64(&json!("42")), Some(42.0));
        assert_eq!(value_as_f64(&json!(1.5)), Some(1.5));
        assert_eq!(value_as_f64(&json!("abc")), None);
        assert_eq!(value_as_bool(&json!("true")), Some(true));
        assert_eq!(value_as_bool(&json!(0)), Some(false));
        assert_eq!(value_as_bool(&json!([1])), None);
    }

    #[test]
    fn test_locked_props() {
        let props = Props::new()
            .with("fontSize", 24)
            .with_locked("fontSize");
        assert!(props.is_locked("fontSize"));
        assert!(!props.is_locked("color"));
        assert_eq!(props.locked_keys(), vec!["fontSize"]);
    }

    #[test]
    fn test_locked_props_false_entries_ignored() {
        let props = Props::from_value(json!({
            "__lockedProps": {"color": false, "width": true}
        }));
        assert!(!props.is_locked("color"));
        assert!(props.is_locked("width"));
    }

    #[test]
    fn test_get_path() {
        let props = Props::from_value(json!({
            "typography": {"fontSize": 18, "color": "#222"}
        }));
        assert_eq!(props.get_path(&["typography", "fontSize"]), Some(&json!(18)));
        assert_eq!(props.get_path(&["typography", "missing"]), None);
        assert_eq!(props.get_path(&[]), None);
    }

    #[test]
    fn test_content_fallback() {
        let props = Props::new().with("text", "Hello");
        assert_eq!(props.content(), Some("Hello"));
        let props = Props::new().with("content", "Hi").with("text", "Hello");
        assert_eq!(props.content(), Some("Hi"));
        let props = Props::new().with("content", "");
        assert_eq!(props.content(), None);
    }

    #[test]
    fn test_ai_generated_flag() {
        assert!(Props::new().with("aiGenerated", true).is_ai_generated());
        assert!(Props::new().with("__aiGenerated", "true").is_ai_generated());
        assert!(!Props::new().is_ai_generated());
    }

    #[test]
    fn test_merge_replaces_keys() {
        let mut props = Props::new().with("content", "old").with("href", "/a");
        props.merge(&Props::new().with("content", "new"));
        assert_eq!(props.get_str("content"), Some("new"));
        assert_eq!(props.get_str("href"), Some("/a"));
    }
}
