//! Visibility conditions
//!
//! `props.visibilityCondition` is `{field | variable, operator, value}`. The
//! left operand is resolved through the binding scope; the legacy `hidden`
//! and `visible` props are honoured when no condition is set. Evaluation
//! errors fail open: the component stays visible.

use crate::binding::BindingScope;
use serde::Deserialize;
use serde_json::Value;
use weave_core::{WeaveError, WeaveResult};
use weave_ir::{Props, is_blank, value_as_bool, value_as_f64};

/// Outcome of a visibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    pub fn is_visible(&self) -> bool {
        matches!(self, Visibility::Visible)
    }

    fn from_bool(visible: bool) -> Self {
        if visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }
}

/// A parsed `visibilityCondition`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityCondition {
    #[serde(default, alias = "variable", alias = "binding")]
    pub field: Option<String>,
    #[serde(default = "default_operator")]
    pub operator: String,
    #[serde(default)]
    pub value: Value,
}

fn default_operator() -> String {
    "isTrue".to_string()
}

impl VisibilityCondition {
    pub fn from_props(props: &Props) -> Option<Self> {
        let raw = props.get("visibilityCondition").filter(|v| !is_blank(v))?;
        match serde_json::from_value(raw.clone()) {
            Ok(condition) => Some(condition),
            Err(e) => {
                tracing::warn!(error = %e, "malformed visibility condition ignored");
                None
            }
        }
    }

    /// The bound left operand
    fn left(&self, scope: &BindingScope<'_>) -> Value {
        let Some(field) = self.field.as_deref() else {
            return Value::Null;
        };
        let expr = field
            .trim()
            .trim_start_matches("{{")
            .trim_end_matches("}}")
            .trim();
        scope.resolve(expr).unwrap_or(Value::Null)
    }

    pub fn evaluate(&self, scope: &BindingScope<'_>) -> WeaveResult<bool> {
        let left = self.left(scope);
        let right = match &self.value {
            Value::String(s) if s.contains("{{") => Value::String(scope.bind(s)),
            other => other.clone(),
        };
        evaluate_operator(&self.operator, &left, &right)
    }
}

/// Whether a component is visible
pub fn evaluate_visibility(props: &Props, scope: &BindingScope<'_>) -> Visibility {
    if let Some(condition) = VisibilityCondition::from_props(props) {
        return match condition.evaluate(scope) {
            Ok(visible) => Visibility::from_bool(visible),
            Err(e) => {
                tracing::warn!(error = %e, "visibility condition failed; showing component");
                Visibility::Visible
            }
        };
    }
    if props.get("hidden").and_then(value_as_bool) == Some(true) {
        return Visibility::Hidden;
    }
    if props.get("visible").and_then(value_as_bool) == Some(false) {
        return Visibility::Hidden;
    }
    Visibility::Visible
}

/// JavaScript-style truthiness
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Emptiness: arrays by length, objects by key count, otherwise falsiness
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        other => !is_truthy(other),
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn length_of(value: &Value) -> usize {
    match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => 0,
    }
}

fn loose_equals(left: &Value, right: &Value) -> bool {
    if left.is_boolean() || right.is_boolean() {
        return match (value_as_bool(left), value_as_bool(right)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
    }
    if let (Some(a), Some(b)) = (value_as_f64(left), value_as_f64(right)) {
        return a == b;
    }
    as_text(left) == as_text(right)
}

fn numbers(operator: &str, left: &Value, right: &Value) -> WeaveResult<(f64, f64)> {
    match (value_as_f64(left), value_as_f64(right)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(WeaveError::condition(
            operator,
            format!("non-numeric operands {left} and {right}"),
        )),
    }
}

fn expected_len(operator: &str, right: &Value) -> WeaveResult<usize> {
    value_as_f64(right)
        .filter(|n| *n >= 0.0)
        .map(|n| n as usize)
        .ok_or_else(|| WeaveError::condition(operator, format!("invalid length {right}")))
}

fn contains(left: &Value, right: &Value) -> bool {
    match left {
        Value::Array(items) => items.iter().any(|item| loose_equals(item, right)),
        Value::Object(map) => map.contains_key(&as_text(right)),
        other => as_text(other).contains(&as_text(right)),
    }
}

/// Apply a visibility operator
pub fn evaluate_operator(operator: &str, left: &Value, right: &Value) -> WeaveResult<bool> {
    Ok(match operator {
        "equals" => loose_equals(left, right),
        "notEquals" => !loose_equals(left, right),
        "greaterThan" => {
            let (a, b) = numbers(operator, left, right)?;
            a > b
        }
        "lessThan" => {
            let (a, b) = numbers(operator, left, right)?;
            a < b
        }
        "greaterThanOrEqual" => {
            let (a, b) = numbers(operator, left, right)?;
            a >= b
        }
        "lessThanOrEqual" => {
            let (a, b) = numbers(operator, left, right)?;
            a <= b
        }
        "contains" => contains(left, right),
        "notContains" => !contains(left, right),
        "startsWith" => as_text(left).starts_with(&as_text(right)),
        "endsWith" => as_text(left).ends_with(&as_text(right)),
        "isEmpty" => is_empty_value(left),
        "isNotEmpty" => !is_empty_value(left),
        "isTrue" => value_as_bool(left).unwrap_or_else(|| is_truthy(left)),
        "isFalse" => !value_as_bool(left).unwrap_or_else(|| is_truthy(left)),
        "lengthEquals" => length_of(left) == expected_len(operator, right)?,
        "lengthGreaterThan" => length_of(left) > expected_len(operator, right)?,
        "lengthLessThan" => length_of(left) < expected_len(operator, right)?,
        "hasKey" => left
            .as_object()
            .is_some_and(|map| map.contains_key(&as_text(right))),
        other => {
            tracing::debug!(operator = other, "unknown operator; using truthiness");
            is_truthy(left)
        }
    })
}
