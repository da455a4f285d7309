//! Design tokens
//!
//! Tokens are design-system values keyed by id (`color.primary`,
//! `font-body`). A prop can reference a token with `{tokenRef, value}`, where
//! `value` is the last-known-good fallback used when the token is gone.

use crate::stores::TokenStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A design-system token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignToken {
    pub id: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TokenCategory>,
}

impl DesignToken {
    pub fn new(id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: TokenCategory) -> Self {
        self.category = Some(category);
        self
    }
}

/// Token category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenCategory {
    Color,
    Typography,
    Spacing,
    Radius,
    Shadow,
    #[serde(other)]
    Other,
}

/// A `{tokenRef, value}` reference found in a prop
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRef<'a> {
    pub token_id: &'a str,
    pub fallback: Option<&'a Value>,
}

impl<'a> TokenRef<'a> {
    /// Recognise a token reference
    pub fn parse(value: &'a Value) -> Option<Self> {
        let obj = value.as_object()?;
        let token_id = obj.get("tokenRef")?.as_str()?;
        Some(Self {
            token_id,
            fallback: obj.get("value"),
        })
    }
}

/// Resolve a prop value through the token store
///
/// Token references yield the live token value, else their fallback, else
/// `Null`. Anything else is returned unchanged.
pub fn resolve_token_value(value: &Value, store: &dyn TokenStore) -> Value {
    match TokenRef::parse(value) {
        Some(reference) => match store.token(reference.token_id) {
            Some(token) => token.value,
            None => {
                tracing::debug!(token = reference.token_id, "token missing, using fallback");
                reference.fallback.cloned().unwrap_or(Value::Null)
            }
        },
        None => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::InMemoryTokenStore;
    use serde_json::json;

    #[test]
    fn test_token_ref_parse() {
        let v = json!({"tokenRef": "color.primary", "value": "#00f"});
        let r = TokenRef::parse(&v).unwrap();
        assert_eq!(r.token_id, "color.primary");
        assert_eq!(r.fallback, Some(&json!("#00f")));
        assert!(TokenRef::parse(&json!("#00f")).is_none());
    }

    #[test]
    fn test_resolve_live_token() {
        let store = InMemoryTokenStore::from_tokens(vec![
            DesignToken::new("color.primary", "#3b82f6").with_category(TokenCategory::Color),
        ]);
        let v = json!({"tokenRef": "color.primary", "value": "#00f"});
        assert_eq!(resolve_token_value(&v, &store), json!("#3b82f6"));
    }

    #[test]
    fn test_resolve_missing_token_uses_fallback() {
        let store = InMemoryTokenStore::default();
        let v = json!({"tokenRef": "color.gone", "value": "#00f"});
        assert_eq!(resolve_token_value(&v, &store), json!("#00f"));
        let v = json!({"tokenRef": "color.gone"});
        assert_eq!(resolve_token_value(&v, &store), Value::Null);
    }

    #[test]
    fn test_plain_values_pass_through() {
        let store = InMemoryTokenStore::default();
        assert_eq!(resolve_token_value(&json!(12), &store), json!(12));
    }

    #[test]
    fn test_unknown_category_deserializes() {
        let t: DesignToken =
            serde_json::from_value(json!({"id": "x", "value": 1, "category": "motion"})).unwrap();
        assert_eq!(t.category, Some(TokenCategory::Other));
    }
}
