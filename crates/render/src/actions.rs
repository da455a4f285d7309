//! # Action Execution
//!
//! Components declare behaviour in two shapes:
//!
//! - **Flows** in `actionFlows`: one node/edge graph per trigger, run
//!   depth-first from the start node. Sibling branches run concurrently,
//!   each branch in order.
//! - **Legacy actions** in `props.actions`: a flat list filtered by trigger
//!   and run in order.
//!
//! Actions only run in preview. Every node is fallible on its own: a
//! failure is logged, shown to the user through the [`Notifier`] and stops
//! that node's downstream edges. Side effects of earlier nodes stay.

use crate::binding::value_to_text;
use crate::expression;
use crate::vdom::EventKind;
use crate::visibility::{evaluate_operator, is_truthy};
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{LocalBoxFuture, join_all};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;
use weave_core::{WeaveError, WeaveResult};
use weave_ir::{AppComponent, DataContext, Props, VariableOperation, VariableScope, VariableStore};

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("token pattern is valid"));

const DEFAULT_TRIGGER: &str = "onClick";
const DEFAULT_DELAY_MS: u64 = 1000;

// ============================================================================
// Triggers
// ============================================================================

/// Triggers a component has behaviour for, flows first
pub fn declared_triggers(component: &AppComponent) -> Vec<String> {
    let mut triggers: Vec<String> = component.action_flows.keys().cloned().collect();
    for action in legacy_actions(component.props()) {
        if !triggers.contains(&action.trigger) {
            triggers.push(action.trigger);
        }
    }
    triggers
}

/// DOM event a trigger name listens to
pub fn event_for_trigger(trigger: &str) -> Option<EventKind> {
    Some(match trigger {
        "onClick" | "click" => EventKind::Click,
        "onDoubleClick" | "doubleClick" | "dblclick" => EventKind::DoubleClick,
        "onSubmit" | "submit" => EventKind::Submit,
        "onChange" | "change" => EventKind::Change,
        "onHover" | "onMouseEnter" | "hover" | "mouseEnter" => EventKind::MouseEnter,
        "onMouseLeave" | "mouseLeave" => EventKind::MouseLeave,
        _ => return None,
    })
}

// ============================================================================
// Flow model
// ============================================================================

/// One step of a flow or a legacy action list
#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    pub id: String,
    /// Action kind (`navigate`, `apiCall`, ...)
    pub kind: String,
    pub data: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawNode {
    id: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    data: Map<String, Value>,
}

impl FlowNode {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            data: match data {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }

    /// Editor nodes are often typed `custom`/`action` with the real kind in
    /// `data.actionType` or `data.type`
    fn from_raw(raw: RawNode) -> Self {
        let from_data = raw
            .data
            .get("actionType")
            .or_else(|| raw.data.get("type"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let kind = match raw.kind {
            Some(kind) if !matches!(kind.as_str(), "" | "custom" | "action" | "default") => kind,
            _ => from_data.unwrap_or_default(),
        };
        Self {
            id: raw.id,
            kind,
            data: raw.data,
        }
    }

    pub fn is_start(&self) -> bool {
        self.data.get("isStart").and_then(Value::as_bool) == Some(true)
            || matches!(self.kind.as_str(), "start" | "trigger")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    pub source: String,
    pub target: String,
    /// `true`/`false` on condition nodes, `success`/`failure` on API calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
}

/// A flow graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flow {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

#[derive(Deserialize)]
struct RawFlow {
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default)]
    edges: Vec<FlowEdge>,
}

/// Which outgoing edges a finished node follows
#[derive(Debug, Clone, Copy, PartialEq)]
enum Route {
    All,
    /// Edges with this handle plus unlabelled edges
    Branch(&'static str),
}

impl Flow {
    pub fn from_value(value: &Value) -> WeaveResult<Self> {
        let raw: RawFlow = serde_json::from_value(value.clone())?;
        Ok(Self {
            nodes: raw.nodes.into_iter().map(FlowNode::from_raw).collect(),
            edges: raw.edges,
        })
    }

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// The flagged start node, else the first node nothing points to
    pub fn start_node(&self) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.is_start()).or_else(|| {
            self.nodes
                .iter()
                .find(|n| !self.edges.iter().any(|e| e.target == n.id))
        })
    }

    fn has_handle(&self, id: &str, handle: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == id && e.source_handle.as_deref() == Some(handle))
    }

    fn successors(&self, id: &str, route: Route) -> Vec<&FlowNode> {
        self.edges
            .iter()
            .filter(|e| e.source == id)
            .filter(|e| match (route, e.source_handle.as_deref()) {
                (Route::All, _) => true,
                (Route::Branch(h), handle) => handle.is_none_or(|eh| eh == h),
            })
            .filter_map(|e| self.node(&e.target))
            .collect()
    }
}

/// A legacy `props.actions` entry
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyAction {
    pub trigger: String,
    pub step: FlowNode,
}

/// `props.actions`, skipping entries without a type
///
/// Parameters may sit on the entry itself or under `config`.
pub fn legacy_actions(props: &Props) -> Vec<LegacyAction> {
    let Some(actions) = props.get_array("actions") else {
        return Vec::new();
    };
    actions
        .iter()
        .enumerate()
        .filter_map(|(i, action)| {
            let obj = action.as_object()?;
            let kind = obj
                .get("type")
                .or_else(|| obj.get("actionType"))
                .and_then(Value::as_str)?
                .to_string();
            let trigger = obj
                .get("trigger")
                .or_else(|| obj.get("event"))
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_TRIGGER)
                .to_string();
            let mut data = obj.clone();
            if let Some(Value::Object(config)) = obj.get("config") {
                data.extend(config.clone());
            }
            let id = obj
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("action-{i}"));
            Some(LegacyAction {
                trigger,
                step: FlowNode { id, kind, data },
            })
        })
        .collect()
}

// ============================================================================
// Host
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as JSON, or as a string when it is not JSON
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|_| Value::String(self.body.clone()))
    }
}

#[async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, request: HttpRequest) -> WeaveResult<HttpResponse>;
}

pub trait Navigator {
    fn open_url(&self, url: &str, new_tab: bool);

    /// `query` is already encoded (`a=1&b=2`), empty when there is none
    fn navigate_to_page(&self, page_id: &str, query: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "success" => NoticeLevel::Success,
            "warning" | "warn" => NoticeLevel::Warning,
            "error" | "danger" => NoticeLevel::Error,
            _ => NoticeLevel::Info,
        }
    }
}

/// Fire-and-forget user notifications (toasts)
pub trait Notifier {
    fn notify(&self, level: NoticeLevel, message: &str);
}

pub trait Clipboard {
    fn write_text(&self, text: &str) -> WeaveResult<()>;
}

/// Side-effect surface flows run against
#[derive(Clone, Copy)]
pub struct ActionHost<'a> {
    pub http: &'a dyn HttpClient,
    pub navigator: &'a dyn Navigator,
    pub notifier: &'a dyn Notifier,
    pub clipboard: &'a dyn Clipboard,
    pub variables: &'a dyn VariableStore,
}

// ============================================================================
// Executor
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Completed,
    /// Followed the named branch
    Branched(String),
    Failed(String),
}

/// One executed node
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub node_id: String,
    pub kind: String,
    pub outcome: StepOutcome,
}

/// Runs flows and legacy actions for one component event
pub struct FlowExecutor<'a> {
    host: ActionHost<'a>,
    data: Option<&'a DataContext>,
    log: RefCell<Vec<StepRecord>>,
}

impl<'a> FlowExecutor<'a> {
    pub fn new(host: ActionHost<'a>) -> Self {
        Self {
            host,
            data: None,
            log: RefCell::new(Vec::new()),
        }
    }

    /// Row the triggering component was rendered for
    pub fn with_data(mut self, data: Option<&'a DataContext>) -> Self {
        self.data = data;
        self
    }

    /// Executed steps in completion order
    pub fn log(&self) -> Vec<StepRecord> {
        self.log.borrow().clone()
    }

    /// Run what a component declares for a trigger; returns the number of
    /// steps executed
    pub async fn run_trigger(&self, component: &AppComponent, trigger: &str) -> usize {
        let before = self.log.borrow().len();
        match component.action_flows.get(trigger) {
            Some(value) => match Flow::from_value(value) {
                Ok(flow) => self.run_flow(&flow).await,
                Err(err) => {
                    tracing::error!(component = %component.id, trigger, error = %err, "invalid action flow");
                    self.host.notifier.notify(NoticeLevel::Error, &err.to_string());
                }
            },
            None => {
                let steps: Vec<FlowNode> = legacy_actions(component.props())
                    .into_iter()
                    .filter(|a| a.trigger == trigger)
                    .map(|a| a.step)
                    .collect();
                self.run_actions(&steps).await;
            }
        }
        self.log.borrow().len() - before
    }

    pub async fn run_flow(&self, flow: &Flow) {
        let Some(start) = flow.start_node() else {
            tracing::warn!(nodes = flow.nodes.len(), "flow has no start node");
            return;
        };
        self.visit(flow, start, Vec::new()).await;
    }

    /// Run steps in order, stopping at the first failure
    pub async fn run_actions(&self, steps: &[FlowNode]) {
        for step in steps {
            if let Err(err) = self.execute(step, None).await {
                self.fail(step, &err);
                return;
            }
            self.record(step, StepOutcome::Completed);
        }
    }

    fn visit<'f>(&'f self, flow: &'f Flow, node: &'f FlowNode, path: Vec<&'f str>) -> LocalBoxFuture<'f, ()> {
        async move {
            let route = match self.execute(node, Some(flow)).await {
                Ok(route) => route,
                Err(err) => {
                    self.fail(node, &err);
                    return;
                }
            };
            self.record(
                node,
                match route {
                    Route::All => StepOutcome::Completed,
                    Route::Branch(h) => StepOutcome::Branched(h.to_string()),
                },
            );

            let mut path = path;
            path.push(node.id.as_str());
            let next: Vec<&FlowNode> = flow
                .successors(&node.id, route)
                .into_iter()
                .filter(|n| {
                    let seen = path.contains(&n.id.as_str());
                    if seen {
                        tracing::warn!(from = %node.id, to = %n.id, "flow cycle; edge skipped");
                    }
                    !seen
                })
                .collect();
            join_all(next.into_iter().map(|n| self.visit(flow, n, path.clone()))).await;
        }
        .boxed_local()
    }

    fn record(&self, node: &FlowNode, outcome: StepOutcome) {
        self.log.borrow_mut().push(StepRecord {
            node_id: node.id.clone(),
            kind: node.kind.clone(),
            outcome,
        });
    }

    fn fail(&self, node: &FlowNode, err: &WeaveError) {
        tracing::error!(node = %node.id, kind = %node.kind, error = %err, "action failed");
        self.host.notifier.notify(NoticeLevel::Error, &err.to_string());
        self.record(node, StepOutcome::Failed(err.to_string()));
    }

    // ------------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------------

    fn resolve(&self, expr: &str) -> Option<Value> {
        self.host.variables.resolve_binding(expr, self.data)
    }

    /// Substitute `{{...}}` tokens; unresolved tokens become empty
    fn bind(&self, template: &str) -> String {
        TOKEN
            .replace_all(template, |caps: &regex::Captures<'_>| {
                self.resolve(&caps[1]).map(|v| value_to_text(&v)).unwrap_or_default()
            })
            .into_owned()
    }

    /// A value parameter: a lone token keeps the variable's JSON type
    fn bind_value(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => match TOKEN.captures(s) {
                Some(caps) if caps[0].len() == s.trim().len() => {
                    self.resolve(&caps[1]).unwrap_or(Value::Null)
                }
                _ => Value::String(self.bind(s)),
            },
            Value::Array(items) => Value::Array(items.iter().map(|v| self.bind_value(v)).collect()),
            Value::Object(obj) => Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), self.bind_value(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn text(&self, node: &FlowNode, keys: &[&str]) -> Option<String> {
        keys.iter()
            .find_map(|k| node.data.get(*k).and_then(Value::as_str))
            .map(|s| self.bind(s))
            .filter(|s| !s.trim().is_empty())
    }

    fn required(&self, node: &FlowNode, keys: &[&str]) -> WeaveResult<String> {
        self.text(node, keys)
            .ok_or_else(|| WeaveError::action(&node.kind, format!("missing '{}'", keys[0])))
    }

    fn flag(node: &FlowNode, key: &str) -> bool {
        node.data.get(key).and_then(weave_ir::value_as_bool).unwrap_or(false)
    }

    fn scope(node: &FlowNode) -> VariableScope {
        node.data
            .get("scope")
            .or_else(|| node.data.get("variableScope"))
            .and_then(Value::as_str)
            .map(VariableScope::parse)
            .unwrap_or_default()
    }

    /// Store a node's result when it names a result variable
    fn store_result(&self, node: &FlowNode, value: Value) -> WeaveResult<()> {
        match self.text(node, &["resultVariable", "outputVariable", "saveTo"]) {
            Some(name) => self.host.variables.set(Self::scope(node), &name, value),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------------
    // Node kinds
    // ------------------------------------------------------------------------

    async fn execute(&self, node: &FlowNode, flow: Option<&Flow>) -> WeaveResult<Route> {
        tracing::debug!(node = %node.id, kind = %node.kind, "running action");
        match node.kind.as_str() {
            "start" | "trigger" => Ok(Route::All),
            "navigate" | "openUrl" => self.navigate(node),
            "navigatePage" | "navigateToPage" => self.navigate_page(node),
            "toast" | "showToast" | "notification" => {
                let message = self.required(node, &["message", "text"])?;
                let level = node
                    .data
                    .get("variant")
                    .or_else(|| node.data.get("toastType"))
                    .and_then(Value::as_str)
                    .map(NoticeLevel::parse)
                    .unwrap_or_default();
                self.host.notifier.notify(level, &message);
                Ok(Route::All)
            }
            "delay" | "wait" => {
                let ms = ["duration", "delay", "ms"]
                    .iter()
                    .find_map(|k| node.data.get(*k).and_then(weave_ir::value_as_f64))
                    .map(|ms| ms.max(0.0) as u64)
                    .unwrap_or(DEFAULT_DELAY_MS);
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(Route::All)
            }
            "setVariable" => self.set_variable(node),
            "evaluate" | "expression" => {
                let value = self.evaluate(node)?;
                self.store_result(node, value)?;
                Ok(Route::All)
            }
            "condition" => Ok(Route::Branch(if self.condition(node)? { "true" } else { "false" })),
            "apiCall" => self.api_call(node, flow).await,
            "copyToClipboard" | "copy" => {
                let text = self.required(node, &["text", "value", "content"])?;
                self.host.clipboard.write_text(&text)?;
                Ok(Route::All)
            }
            "webhook" => {
                let url = self.required(node, &["url", "webhookUrl"])?;
                let payload = node
                    .data
                    .get("payload")
                    .or_else(|| node.data.get("body"))
                    .map(|v| self.bind_value(v))
                    .unwrap_or(Value::Object(Map::new()));
                let request = HttpRequest {
                    method: self.text(node, &["method"]).unwrap_or_else(|| "POST".into()).to_uppercase(),
                    url: url.clone(),
                    headers: BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())]),
                    body: Some(payload),
                };
                let response = self.host.http.send(request).await?;
                if !response.is_success() {
                    return Err(WeaveError::Http {
                        url,
                        message: format!("status {}", response.status),
                    });
                }
                Ok(Route::All)
            }
            "" => Err(WeaveError::action("unknown", "node has no action type")),
            other => Err(WeaveError::action(other, "unsupported action type")),
        }
    }

    fn navigate(&self, node: &FlowNode) -> WeaveResult<Route> {
        let url = self.required(node, &["url", "href"])?;
        let new_tab = Self::flag(node, "openInNewTab")
            || Self::flag(node, "newTab")
            || node.data.get("target").and_then(Value::as_str) == Some("_blank");
        self.host.navigator.open_url(&url, new_tab);
        Ok(Route::All)
    }

    fn navigate_page(&self, node: &FlowNode) -> WeaveResult<Route> {
        let page_id = self.required(node, &["pageId", "page"])?;
        let pairs: Vec<(String, String)> = match node.data.get("queryParams").or_else(|| node.data.get("params")) {
            Some(Value::Object(obj)) => obj
                .iter()
                .map(|(k, v)| (k.clone(), value_to_text(&self.bind_value(v))))
                .collect(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_object)
                .filter_map(|p| {
                    let key = p.get("key").and_then(Value::as_str)?;
                    let value = p.get("value").map(|v| value_to_text(&self.bind_value(v)));
                    Some((key.to_string(), value.unwrap_or_default()))
                })
                .collect(),
            _ => Vec::new(),
        };
        let query = pairs
            .iter()
            .filter(|(k, _)| !k.is_empty())
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        self.host.navigator.navigate_to_page(&page_id, &query);
        Ok(Route::All)
    }

    fn set_variable(&self, node: &FlowNode) -> WeaveResult<Route> {
        let name = self.required(node, &["variableName", "variable", "name"])?;
        let op_name = node.data.get("operation").and_then(Value::as_str).unwrap_or("set");
        let operation = VariableOperation::parse(op_name)
            .ok_or_else(|| WeaveError::variable(&name, format!("unknown operation '{op_name}'")))?;
        let operand = node
            .data
            .get("value")
            .map(|v| self.bind_value(v))
            .unwrap_or(Value::Null);
        let next = self
            .host
            .variables
            .apply(Self::scope(node), &name, operation, &operand)?;
        tracing::debug!(variable = %name, operation = operation.as_str(), value = %next, "variable updated");
        Ok(Route::All)
    }

    /// Replace tokens with literals so the expression parser sees values
    fn expression_source(&self, source: &str) -> String {
        TOKEN
            .replace_all(source, |caps: &regex::Captures<'_>| match self.resolve(&caps[1]) {
                Some(v @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => v.to_string(),
                Some(Value::String(s)) => Value::String(s).to_string(),
                Some(other) => Value::String(other.to_string()).to_string(),
                None => "null".to_string(),
            })
            .into_owned()
    }

    fn evaluate(&self, node: &FlowNode) -> WeaveResult<Value> {
        let source = node
            .data
            .get("expression")
            .or_else(|| node.data.get("code"))
            .and_then(Value::as_str)
            .ok_or_else(|| WeaveError::action(&node.kind, "missing 'expression'"))?;
        expression::evaluate(&self.expression_source(source), &|name| self.resolve(name))
    }

    fn condition(&self, node: &FlowNode) -> WeaveResult<bool> {
        if node.data.contains_key("expression") || node.data.get("condition").is_some_and(Value::is_string) {
            let source = node
                .data
                .get("expression")
                .or_else(|| node.data.get("condition"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            let value = expression::evaluate(&self.expression_source(source), &|name| self.resolve(name))?;
            return Ok(is_truthy(&value));
        }
        let structured = node
            .data
            .get("condition")
            .and_then(Value::as_object)
            .unwrap_or(&node.data);
        let operator = structured.get("operator").and_then(Value::as_str).unwrap_or("equals");
        let left = structured.get("left").or_else(|| structured.get("variable")).map(|v| self.bind_value(v));
        let right = structured.get("right").or_else(|| structured.get("value")).map(|v| self.bind_value(v));
        evaluate_operator(
            operator,
            &left.unwrap_or(Value::Null),
            &right.unwrap_or(Value::Null),
        )
    }

    async fn api_call(&self, node: &FlowNode, flow: Option<&Flow>) -> WeaveResult<Route> {
        let url = self.required(node, &["url", "endpoint"])?;
        let method = self
            .text(node, &["method"])
            .unwrap_or_else(|| "GET".into())
            .to_uppercase();
        let headers: BTreeMap<String, String> = node
            .data
            .get("headers")
            .and_then(Value::as_object)
            .map(|h| {
                h.iter()
                    .map(|(k, v)| (k.clone(), value_to_text(&self.bind_value(v))))
                    .collect()
            })
            .unwrap_or_default();
        let body = node
            .data
            .get("body")
            .filter(|b| !b.is_null() && method != "GET")
            .map(|b| match b {
                // A string body holding JSON is sent as JSON
                Value::String(s) => {
                    let bound = self.bind(s);
                    serde_json::from_str(&bound).unwrap_or(Value::String(bound))
                }
                other => self.bind_value(other),
            });
        let request = HttpRequest {
            method,
            url: url.clone(),
            headers,
            body,
        };

        let result = match self.host.http.send(request).await {
            Ok(response) if response.is_success() => Ok(response.json()),
            Ok(response) => Err(WeaveError::Http {
                url,
                message: format!("status {}: {}", response.status, response.body),
            }),
            Err(err) => Err(err),
        };
        let handles_failure = flow.is_some_and(|f| f.has_handle(&node.id, "failure"));
        match result {
            Ok(body) => {
                self.store_result(node, serde_json::json!({"success": true, "data": body}))?;
                Ok(Route::Branch("success"))
            }
            Err(err) if handles_failure => {
                tracing::warn!(node = %node.id, error = %err, "api call failed; taking failure branch");
                self.store_result(node, serde_json::json!({"success": false, "error": err.to_string()}))?;
                Ok(Route::Branch("failure"))
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::VecDeque;
    use weave_ir::{ComponentType, InMemoryVariables};
    use crate::vdom::HandlerAction;

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
        responses: RefCell<VecDeque<WeaveResult<HttpResponse>>>,
        requests: RefCell<Vec<HttpRequest>>,
    }

    impl Recorder {
        fn respond(&self, status: u16, body: &str) {
            self.responses.borrow_mut().push_back(Ok(HttpResponse {
                status,
                body: body.to_string(),
            }));
        }

        fn events(&self) -> Vec<String> {
            self.events.borrow().clone()
        }
    }

    #[async_trait(?Send)]
    impl HttpClient for Recorder {
        async fn send(&self, request: HttpRequest) -> WeaveResult<HttpResponse> {
            self.events.borrow_mut().push(format!("http {} {}", request.method, request.url));
            self.requests.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(WeaveError::action("http", "no response queued")))
        }
    }

    impl Navigator for Recorder {
        fn open_url(&self, url: &str, new_tab: bool) {
            self.events.borrow_mut().push(format!("open {url} {new_tab}"));
        }

        fn navigate_to_page(&self, page_id: &str, query: &str) {
            self.events.borrow_mut().push(format!("page {page_id}?{query}"));
        }
    }

    impl Notifier for Recorder {
        fn notify(&self, level: NoticeLevel, message: &str) {
            self.events.borrow_mut().push(format!("{level:?}: {message}"));
        }
    }

    impl Clipboard for Recorder {
        fn write_text(&self, text: &str) -> WeaveResult<()> {
            self.events.borrow_mut().push(format!("copy {text}"));
            Ok(())
        }
    }

    fn host<'a>(recorder: &'a Recorder, variables: &'a InMemoryVariables) -> ActionHost<'a> {
        ActionHost {
            http: recorder,
            navigator: recorder,
            notifier: recorder,
            clipboard: recorder,
            variables,
        }
    }

    fn flow(value: Value) -> Flow {
        Flow::from_value(&value).unwrap()
    }

    #[test]
    fn test_triggers_and_events() {
        let button = AppComponent::new("b", ComponentType::Button)
            .with_flow("onClick", json!({"nodes": [], "edges": []}))
            .with_prop(
                "actions",
                json!([
                    {"trigger": "onClick", "type": "toast", "message": "hi"},
                    {"trigger": "onHover", "type": "toast", "message": "hover"},
                    {"type": "navigate", "url": "/x"},
                    {"trigger": "onClick"}
                ]),
            );
        assert_eq!(declared_triggers(&button), vec!["onClick", "onHover"]);
        assert_eq!(legacy_actions(button.props()).len(), 3);
        assert_eq!(event_for_trigger("onHover"), Some(EventKind::MouseEnter));
        assert_eq!(event_for_trigger("onSubmit"), Some(EventKind::Submit));
        assert_eq!(event_for_trigger("onLoad"), None);
    }

    #[test]
    fn test_node_kind_resolution_and_start() {
        let f = flow(json!({
            "nodes": [
                {"id": "a", "type": "custom", "data": {"actionType": "toast", "message": "x"}},
                {"id": "s", "type": "trigger"},
                {"id": "b", "type": "navigate", "data": {"url": "/"}}
            ],
            "edges": [{"source": "s", "target": "a"}]
        }));
        assert_eq!(f.node("a").unwrap().kind, "toast");
        assert_eq!(f.start_node().unwrap().id, "s");

        let unflagged = flow(json!({
            "nodes": [{"id": "x", "type": "toast"}, {"id": "y", "type": "toast"}],
            "edges": [{"source": "y", "target": "x"}]
        }));
        assert_eq!(unflagged.start_node().unwrap().id, "y");
    }

    #[tokio::test]
    async fn test_condition_branches() {
        let recorder = Recorder::default();
        let variables = InMemoryVariables::new();
        variables.set(VariableScope::App, "count", json!(5)).unwrap();
        let f = flow(json!({
            "nodes": [
                {"id": "start", "type": "start"},
                {"id": "check", "type": "condition", "data": {"expression": "{{count}} > 3"}},
                {"id": "big", "type": "toast", "data": {"message": "big {{count}}"}},
                {"id": "small", "type": "toast", "data": {"message": "small"}}
            ],
            "edges": [
                {"source": "start", "target": "check"},
                {"source": "check", "target": "big", "sourceHandle": "true"},
                {"source": "check", "target": "small", "sourceHandle": "false"}
            ]
        }));
        let executor = FlowExecutor::new(host(&recorder, &variables));
        executor.run_flow(&f).await;
        assert_eq!(recorder.events(), vec!["Info: big 5"]);
        assert_eq!(executor.log()[1].outcome, StepOutcome::Branched("true".into()));
    }

    #[tokio::test]
    async fn test_structured_condition() {
        let recorder = Recorder::default();
        let variables = InMemoryVariables::new();
        variables.set(VariableScope::Page, "role", json!("admin")).unwrap();
        let f = flow(json!({
            "nodes": [
                {"id": "c", "type": "condition", "data": {"isStart": true, "condition": {"left": "{{role}}", "operator": "equals", "right": "guest"}}},
                {"id": "no", "type": "toast", "data": {"message": "not a guest"}}
            ],
            "edges": [{"source": "c", "target": "no", "sourceHandle": "false"}]
        }));
        FlowExecutor::new(host(&recorder, &variables)).run_flow(&f).await;
        assert_eq!(recorder.events(), vec!["Info: not a guest"]);
    }

    #[tokio::test]
    async fn test_failure_stops_only_downstream() {
        let recorder = Recorder::default();
        let variables = InMemoryVariables::new();
        let f = flow(json!({
            "nodes": [
                {"id": "s", "type": "start"},
                {"id": "bad", "type": "navigate", "data": {}},
                {"id": "after-bad", "type": "copyToClipboard", "data": {"text": "never"}},
                {"id": "good", "type": "copyToClipboard", "data": {"text": "ok"}}
            ],
            "edges": [
                {"source": "s", "target": "bad"},
                {"source": "bad", "target": "after-bad"},
                {"source": "s", "target": "good"}
            ]
        }));
        let executor = FlowExecutor::new(host(&recorder, &variables));
        executor.run_flow(&f).await;
        let events = recorder.events();
        assert!(events.contains(&"copy ok".to_string()));
        assert!(!events.contains(&"copy never".to_string()));
        assert!(events.iter().any(|e| e.starts_with("Error: Action 'navigate' failed")));
        let failed: Vec<_> = executor
            .log()
            .into_iter()
            .filter(|r| matches!(r.outcome, StepOutcome::Failed(_)))
            .map(|r| r.node_id)
            .collect();
        assert_eq!(failed, vec!["bad"]);
    }

    #[tokio::test]
    async fn test_branches_are_sequential_within() {
        let recorder = Recorder::default();
        let variables = InMemoryVariables::new();
        let f = flow(json!({
            "nodes": [
                {"id": "s", "type": "start"},
                {"id": "wait", "type": "delay", "data": {"duration": 20}},
                {"id": "after-wait", "type": "copyToClipboard", "data": {"text": "slow"}},
                {"id": "fast", "type": "copyToClipboard", "data": {"text": "fast"}}
            ],
            "edges": [
                {"source": "s", "target": "wait"},
                {"source": "wait", "target": "after-wait"},
                {"source": "s", "target": "fast"}
            ]
        }));
        FlowExecutor::new(host(&recorder, &variables)).run_flow(&f).await;
        assert_eq!(recorder.events(), vec!["copy fast", "copy slow"]);
    }

    #[tokio::test]
    async fn test_api_call_result_and_failure_branch() {
        let recorder = Recorder::default();
        recorder.respond(200, r#"{"id": 7}"#);
        recorder.respond(500, "boom");
        let variables = InMemoryVariables::new();
        let f = flow(json!({
            "nodes": [
                {"id": "s", "type": "start"},
                {"id": "ok", "type": "apiCall", "data": {"url": "https://api.test/items", "method": "post", "body": "{\"n\": {{n}}}", "resultVariable": "created"}},
                {"id": "again", "type": "apiCall", "data": {"url": "https://api.test/fail"}},
                {"id": "oops", "type": "toast", "data": {"message": "failed", "variant": "warning"}},
                {"id": "yay", "type": "toast", "data": {"message": "done"}}
            ],
            "edges": [
                {"source": "s", "target": "ok"},
                {"source": "ok", "target": "again", "sourceHandle": "success"},
                {"source": "again", "target": "yay", "sourceHandle": "success"},
                {"source": "again", "target": "oops", "sourceHandle": "failure"}
            ]
        }));
        variables.set(VariableScope::App, "n", json!(3)).unwrap();
        FlowExecutor::new(host(&recorder, &variables)).run_flow(&f).await;

        assert_eq!(
            recorder.events(),
            vec![
                "http POST https://api.test/items",
                "http GET https://api.test/fail",
                "Warning: failed"
            ]
        );
        assert_eq!(recorder.requests.borrow()[0].body, Some(json!({"n": 3})));
        assert_eq!(
            variables.get(VariableScope::App, "created"),
            Some(json!({"success": true, "data": {"id": 7}}))
        );
    }

    #[tokio::test]
    async fn test_unlabelled_edges_follow_api_failure() {
        let recorder = Recorder::default();
        recorder.respond(503, "down");
        let variables = InMemoryVariables::new();
        let f = flow(json!({
            "nodes": [
                {"id": "s", "type": "start"},
                {"id": "call", "type": "apiCall", "data": {"url": "https://api.test/down"}},
                {"id": "oops", "type": "toast", "data": {"message": "failed", "variant": "error"}},
                {"id": "always", "type": "toast", "data": {"message": "finished"}},
                {"id": "yay", "type": "toast", "data": {"message": "done"}}
            ],
            "edges": [
                {"source": "s", "target": "call"},
                {"source": "call", "target": "oops", "sourceHandle": "failure"},
                {"source": "call", "target": "always"},
                {"source": "call", "target": "yay", "sourceHandle": "success"}
            ]
        }));
        let executor = FlowExecutor::new(host(&recorder, &variables));
        executor.run_flow(&f).await;

        assert_eq!(
            recorder.events(),
            vec!["http GET https://api.test/down", "Error: failed", "Info: finished"]
        );
        let call = executor.log().into_iter().find(|r| r.node_id == "call").unwrap();
        assert_eq!(call.outcome, StepOutcome::Branched("failure".into()));
    }

    #[tokio::test]
    async fn test_set_variable_and_evaluate() {
        let recorder = Recorder::default();
        let variables = InMemoryVariables::new();
        variables.set(VariableScope::Page, "count", json!(1)).unwrap();
        let steps = vec![
            FlowNode::new("inc", "setVariable", json!({"variableName": "count", "scope": "page", "operation": "increment", "value": 2})),
            FlowNode::new("calc", "evaluate", json!({"expression": "{{count}} * 10", "resultVariable": "total"})),
            FlowNode::new("push", "setVariable", json!({"name": "tags", "operation": "append", "value": "{{total}}"})),
        ];
        FlowExecutor::new(host(&recorder, &variables)).run_actions(&steps).await;
        assert_eq!(variables.get(VariableScope::Page, "count"), Some(json!(3)));
        assert_eq!(variables.get(VariableScope::App, "total"), Some(json!(30)));
        assert_eq!(variables.get(VariableScope::App, "tags"), Some(json!([30])));
    }

    #[tokio::test]
    async fn test_navigate_page_encodes_query() {
        let recorder = Recorder::default();
        let variables = InMemoryVariables::new();
        let steps = vec![
            FlowNode::new("p", "navigatePage", json!({"pageId": "checkout", "queryParams": {"q": "a b", "ref": "x&y"}})),
            FlowNode::new("n", "navigate", json!({"url": "https://example.com", "openInNewTab": true})),
        ];
        FlowExecutor::new(host(&recorder, &variables)).run_actions(&steps).await;
        assert_eq!(
            recorder.events(),
            vec!["page checkout?q=a%20b&ref=x%26y", "open https://example.com true"]
        );
    }

    #[tokio::test]
    async fn test_legacy_actions_by_trigger() {
        let recorder = Recorder::default();
        let variables = InMemoryVariables::new();
        let component = AppComponent::new("b", ComponentType::Button).with_prop(
            "actions",
            json!([
                {"trigger": "onClick", "type": "webhook", "config": {"url": "https://hooks.test/a", "payload": {"from": "button"}}},
                {"trigger": "onHover", "type": "toast", "message": "hover"},
                {"trigger": "onClick", "type": "toast", "message": "after hook"}
            ]),
        );
        recorder.respond(204, "");
        let executor = FlowExecutor::new(host(&recorder, &variables));
        let ran = executor.run_trigger(&component, "onClick").await;
        assert_eq!(ran, 2);
        assert_eq!(recorder.events(), vec!["http POST https://hooks.test/a", "Info: after hook"]);
        assert_eq!(recorder.requests.borrow()[0].body, Some(json!({"from": "button"})));
    }

    #[tokio::test]
    async fn test_legacy_failure_stops_the_list() {
        let recorder = Recorder::default();
        let variables = InMemoryVariables::new();
        let steps = vec![
            FlowNode::new("bad", "teleport", json!({})),
            FlowNode::new("next", "toast", json!({"message": "unreached"})),
        ];
        let executor = FlowExecutor::new(host(&recorder, &variables));
        executor.run_actions(&steps).await;
        assert_eq!(executor.log().len(), 1);
        assert_eq!(
            recorder.events(),
            vec!["Error: Action 'teleport' failed: unsupported action type"]
        );
    }

    #[tokio::test]
    async fn test_row_data_in_bindings() {
        let recorder = Recorder::default();
        let variables = InMemoryVariables::new();
        let row = DataContext::for_row(
            json!({"email": "ada@example.com"}).as_object().cloned().unwrap(),
            0,
            Default::default(),
        );
        // The row travels with the rendered handler
        let fired = HandlerAction::RunFlow {
            component_id: "copy".into(),
            trigger: "onClick".into(),
            data: Some(row.to_value()),
        };
        let context = fired.row_context();
        let steps = vec![FlowNode::new("c", "copyToClipboard", json!({"text": "{{email}}"}))];
        FlowExecutor::new(host(&recorder, &variables))
            .with_data(context.as_ref())
            .run_actions(&steps)
            .await;
        assert_eq!(recorder.events(), vec!["copy ada@example.com"]);
    }
}
