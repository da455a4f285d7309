//! Data binding
//!
//! Substitutes `{{field}}` tokens in text props. Tokens resolve against the
//! row data context first, then page and app variables. A token nothing
//! resolves becomes a plausible sample value in preview and `[field]` in
//! design mode.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use weave_ir::{DataContext, RenderMode, VariableStore};
use weave_style::format_number;

static BINDING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("binding pattern is valid"));

/// Where a binding can be resolved
#[derive(Clone, Copy)]
pub struct BindingScope<'a> {
    pub data: Option<&'a DataContext>,
    pub variables: Option<&'a dyn VariableStore>,
    pub mode: RenderMode,
}

impl<'a> BindingScope<'a> {
    pub fn new(mode: RenderMode) -> Self {
        Self {
            data: None,
            variables: None,
            mode,
        }
    }

    pub fn with_data(mut self, data: Option<&'a DataContext>) -> Self {
        self.data = data;
        self
    }

    pub fn with_variables(mut self, variables: Option<&'a dyn VariableStore>) -> Self {
        self.variables = variables;
        self
    }

    /// Resolve one expression (the text between the braces)
    pub fn resolve(&self, expr: &str) -> Option<Value> {
        let expr = expr.trim();
        match self.variables {
            Some(store) => store.resolve_binding(expr, self.data),
            None => self.data.and_then(|d| d.lookup(expr).cloned()),
        }
    }

    /// Substitute every token in a template
    pub fn bind(&self, template: &str) -> String {
        if !template.contains("{{") {
            return template.to_string();
        }
        BINDING
            .replace_all(template, |caps: &regex::Captures<'_>| {
                let expr = &caps[1];
                match self.resolve(expr) {
                    Some(value) if !value.is_null() => value_to_text(&value),
                    _ => self.unresolved(expr),
                }
            })
            .into_owned()
    }

    fn unresolved(&self, expr: &str) -> String {
        tracing::debug!(binding = expr, mode = ?self.mode, "unresolved binding");
        if self.mode.is_preview() {
            sample_value(expr)
        } else {
            format!("[{}]", expr.trim())
        }
    }
}

/// Whether a string contains a binding token
pub fn has_binding(text: &str) -> bool {
    BINDING.is_match(text)
}

/// Field names referenced by a template
pub fn binding_fields(text: &str) -> Vec<String> {
    BINDING
        .captures_iter(text)
        .map(|c| c[1].trim().to_string())
        .collect()
}

/// Display text for a bound value
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Plausible sample for an unresolved field, chosen from its name
pub fn sample_value(field: &str) -> String {
    let name = field.rsplit('.').next().unwrap_or(field).to_ascii_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));
    let sample = if has(&["email"]) {
        "john.doe@example.com"
    } else if has(&["phone", "mobile", "tel"]) {
        "+1 (555) 123-4567"
    } else if has(&["price", "amount", "cost", "total"]) {
        "$99.99"
    } else if has(&["date", "created", "updated", "time"]) {
        "2024-01-15"
    } else if has(&["image", "avatar", "photo", "url", "link"]) {
        "https://example.com"
    } else if has(&["title", "heading"]) {
        "Sample Title"
    } else if has(&["description", "summary", "bio", "content"]) {
        "This is a sample description."
    } else if has(&["count", "quantity", "qty", "number"]) {
        "42"
    } else if has(&["name", "author", "user"]) {
        "John Doe"
    } else {
        "Sample text"
    };
    sample.to_string()
}
