//! App and page variables
//!
//! Variables are the mutable state action flows write to and `{{...}}`
//! bindings read from. App-scoped variables outlive page switches;
//! page-scoped ones belong to the current page.

use crate::data::DataContext;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use weave_core::{Persistable, WeaveError, WeaveResult};

/// Variable scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableScope {
    #[default]
    App,
    Page,
}

impl VariableScope {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "page" => VariableScope::Page,
            _ => VariableScope::App,
        }
    }
}

/// Mutation applied by a `setVariable` node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableOperation {
    #[default]
    Set,
    Increment,
    Decrement,
    Toggle,
    Append,
    Remove,
}

impl VariableOperation {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "set" | "" => Some(VariableOperation::Set),
            "increment" | "add" => Some(VariableOperation::Increment),
            "decrement" | "subtract" => Some(VariableOperation::Decrement),
            "toggle" => Some(VariableOperation::Toggle),
            "append" | "push" => Some(VariableOperation::Append),
            "remove" => Some(VariableOperation::Remove),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VariableOperation::Set => "set",
            VariableOperation::Increment => "increment",
            VariableOperation::Decrement => "decrement",
            VariableOperation::Toggle => "toggle",
            VariableOperation::Append => "append",
            VariableOperation::Remove => "remove",
        }
    }

    /// Compute the next value of a variable
    ///
    /// Increment/decrement default the step to 1 and treat a missing
    /// variable as 0. Append/remove work on arrays; a missing variable is an
    /// empty array.
    pub fn apply(&self, name: &str, current: Option<&Value>, operand: &Value) -> WeaveResult<Value> {
        let number = |v: Option<&Value>| -> WeaveResult<f64> {
            match v {
                None | Some(Value::Null) => Ok(0.0),
                Some(v) => crate::props::value_as_f64(v)
                    .ok_or_else(|| WeaveError::variable(name, format!("{v} is not a number"))),
            }
        };
        let step = || match operand {
            Value::Null => Ok(1.0),
            v => crate::props::value_as_f64(v)
                .ok_or_else(|| WeaveError::variable(name, format!("step {v} is not a number"))),
        };

        match self {
            VariableOperation::Set => Ok(operand.clone()),
            VariableOperation::Increment => Ok(number_value(number(current)? + step()?)),
            VariableOperation::Decrement => Ok(number_value(number(current)? - step()?)),
            VariableOperation::Toggle => {
                let now = current.and_then(crate::props::value_as_bool).unwrap_or(false);
                Ok(Value::Bool(!now))
            }
            VariableOperation::Append => {
                let mut items = array_of(name, current)?;
                items.push(operand.clone());
                Ok(Value::Array(items))
            }
            VariableOperation::Remove => {
                let mut items = array_of(name, current)?;
                items.retain(|item| item != operand);
                Ok(Value::Array(items))
            }
        }
    }
}

fn array_of(name: &str, current: Option<&Value>) -> WeaveResult<Vec<Value>> {
    match current {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(other) => Err(WeaveError::variable(
            name,
            format!("expected an array, found {other}"),
        )),
    }
}

/// Integral results stay integers on the wire
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

/// Walk a dotted path (`user.address.city`, `items.0`) into a value map
pub fn lookup_path<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    if let Some(v) = root.get(path) {
        return Some(v);
    }
    let mut parts = path.split('.');
    let mut current = root.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Split `app.count` / `page.count` into a forced scope and the rest
pub fn split_scope(expr: &str) -> (Option<VariableScope>, &str) {
    if let Some(rest) = expr.strip_prefix("app.") {
        (Some(VariableScope::App), rest)
    } else if let Some(rest) = expr.strip_prefix("page.") {
        (Some(VariableScope::Page), rest)
    } else {
        (None, expr)
    }
}

// ============================================================================
// Snapshot & in-memory store
// ============================================================================

/// Persisted variable values for both scopes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableSnapshot {
    #[serde(default)]
    pub app: Map<String, Value>,
    #[serde(default)]
    pub page: Map<String, Value>,
}

impl Persistable for VariableSnapshot {
    fn file_extension() -> &'static str {
        "vars.json"
    }
}

/// Single-threaded variable store backed by `RefCell`
#[derive(Debug, Default)]
pub struct InMemoryVariables {
    state: RefCell<VariableSnapshot>,
}

impl InMemoryVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: VariableSnapshot) -> Self {
        Self {
            state: RefCell::new(snapshot),
        }
    }

    pub fn snapshot(&self) -> VariableSnapshot {
        self.state.borrow().clone()
    }

    /// Drop page-scoped variables (page switch)
    pub fn clear_page(&self) {
        self.state.borrow_mut().page.clear();
    }
}

impl crate::stores::VariableStore for InMemoryVariables {
    fn get(&self, scope: VariableScope, path: &str) -> Option<Value> {
        let state = self.state.borrow();
        let map = match scope {
            VariableScope::App => &state.app,
            VariableScope::Page => &state.page,
        };
        lookup_path(map, path).cloned()
    }

    fn set(&self, scope: VariableScope, name: &str, value: Value) -> WeaveResult<()> {
        if name.trim().is_empty() {
            return Err(WeaveError::variable(name, "variable name cannot be empty"));
        }
        tracing::debug!(?scope, name, "set variable");
        let mut state = self.state.borrow_mut();
        let map = match scope {
            VariableScope::App => &mut state.app,
            VariableScope::Page => &mut state.page,
        };
        map.insert(name.to_string(), value);
        Ok(())
    }
}

/// Resolve a binding against a local data context and the variable store
///
/// Lookup order: the local data context, then page variables, then app
/// variables. An `app.` or `page.` prefix pins the scope.
pub fn resolve_in_scopes<S: crate::stores::VariableStore + ?Sized>(
    store: &S,
    expr: &str,
    local: Option<&DataContext>,
) -> Option<Value> {
    let expr = expr.trim();
    let (scope, path) = split_scope(expr);
    match scope {
        Some(scope) => store.get(scope, path),
        None => local
            .and_then(|ctx| ctx.lookup(path).cloned())
            .or_else(|| store.get(VariableScope::Page, path))
            .or_else(|| store.get(VariableScope::App, path)),
    }
}
