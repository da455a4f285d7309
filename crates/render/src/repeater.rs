//! Dynamic data repeater
//!
//! A `section` or `grid` with `props.databaseConnection` repeats its
//! children once per table row. Fetching is split from rendering: a render
//! pass mounts instances and queues fetch requests, the host drives
//! [`RepeaterRegistry::fetch_pending`] (or completes requests itself) and
//! renders again. Completions for instances that were unmounted or
//! remounted with another connection are dropped.

use crate::config::RenderConfig;
use futures::future::join_all;
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ops::Range;
use weave_core::{RenderMode, WeaveResult};
use weave_ir::{
    DataContext, DatabaseConnection, ParentConnection, Props, TableProject, TableService,
    value_as_bool, value_as_f64,
};

// ============================================================================
// Instance state
// ============================================================================

/// Fetch state of one mounted repeater
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepeaterInstance {
    pub connection: DatabaseConnection,
    pub loading: bool,
    pub error: Option<String>,
    pub table: Option<TableProject>,
    /// Normalized rows (keyed by field id and field name)
    pub rows: Vec<Map<String, Value>>,
    generation: u64,
    requested: bool,
    seen: bool,
}

impl RepeaterInstance {
    /// Field names from the fetched schema
    pub fn field_names(&self) -> Vec<String> {
        self.table
            .as_ref()
            .map(|t| t.schema.field_names())
            .unwrap_or_default()
    }

    fn parent_connection(&self) -> ParentConnection {
        ParentConnection {
            table_name: self
                .table
                .as_ref()
                .map(|t| t.name.clone())
                .unwrap_or_else(|| self.connection.label()),
            fields: self.field_names(),
        }
    }
}

/// A fetch the host should perform
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub instance_id: String,
    pub generation: u64,
    pub connection: DatabaseConnection,
}

/// Per-instance repeater state; nothing is shared between instances
#[derive(Debug, Default)]
pub struct RepeaterRegistry {
    instances: RefCell<HashMap<String, RepeaterInstance>>,
    next_generation: Cell<u64>,
}

impl RepeaterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a render pass; instances not mounted again are dropped by
    /// [`Self::end_pass`]
    pub fn begin_pass(&self) {
        for instance in self.instances.borrow_mut().values_mut() {
            instance.seen = false;
        }
    }

    /// Register a repeater for this pass
    pub fn mount(&self, id: &str, connection: &DatabaseConnection) {
        let mut instances = self.instances.borrow_mut();
        if let Some(instance) = instances.get_mut(id) {
            instance.seen = true;
            if &instance.connection == connection {
                return;
            }
            tracing::debug!(repeater = id, table = %connection.label(), "connection changed; refetching");
        }
        let generation = self.next_generation.get() + 1;
        self.next_generation.set(generation);
        instances.insert(
            id.to_string(),
            RepeaterInstance {
                connection: connection.clone(),
                loading: true,
                generation,
                seen: true,
                ..Default::default()
            },
        );
    }

    /// Drop instances the last pass did not mount
    pub fn end_pass(&self) {
        self.instances.borrow_mut().retain(|id, instance| {
            if !instance.seen {
                tracing::debug!(repeater = %id, "repeater unmounted");
            }
            instance.seen
        });
    }

    pub fn unmount(&self, id: &str) {
        self.instances.borrow_mut().remove(id);
    }

    pub fn is_mounted(&self, id: &str) -> bool {
        self.instances.borrow().contains_key(id)
    }

    /// Snapshot of an instance's state
    pub fn instance(&self, id: &str) -> Option<RepeaterInstance> {
        self.instances.borrow().get(id).cloned()
    }

    /// Fetches not yet handed to the host
    pub fn take_pending(&self) -> Vec<FetchRequest> {
        let mut instances = self.instances.borrow_mut();
        let mut pending: Vec<FetchRequest> = instances
            .iter_mut()
            .filter(|(_, i)| i.loading && !i.requested)
            .map(|(id, instance)| {
                instance.requested = true;
                FetchRequest {
                    instance_id: id.clone(),
                    generation: instance.generation,
                    connection: instance.connection.clone(),
                }
            })
            .collect();
        pending.sort_by(|a, b| a.instance_id.cmp(&b.instance_id));
        pending
    }

    /// Store a fetch result; returns false when the result was dropped
    pub fn complete(&self, request: &FetchRequest, result: WeaveResult<TableProject>) -> bool {
        let mut instances = self.instances.borrow_mut();
        let Some(instance) = instances
            .get_mut(&request.instance_id)
            .filter(|i| i.generation == request.generation)
        else {
            tracing::debug!(repeater = %request.instance_id, "dropping result for unmounted repeater");
            return false;
        };
        instance.loading = false;
        match result {
            Ok(table) => {
                instance.rows = table.normalized_rows();
                instance.error = None;
                tracing::debug!(
                    repeater = %request.instance_id,
                    table = %table.name,
                    rows = instance.rows.len(),
                    "table rows loaded"
                );
                instance.table = Some(table);
            }
            Err(e) => {
                tracing::error!(repeater = %request.instance_id, error = %e, "table fetch failed");
                instance.error = Some(e.to_string());
                instance.rows.clear();
            }
        }
        true
    }

    /// Run every pending fetch concurrently and store the results
    ///
    /// Returns the number of results applied.
    pub async fn fetch_pending(&self, service: &dyn TableService) -> usize {
        let requests = self.take_pending();
        let results = join_all(requests.into_iter().map(|request| async move {
            let result = service.fetch_connection(&request.connection).await;
            (request, result)
        }))
        .await;
        results
            .into_iter()
            .map(|(request, result)| self.complete(&request, result))
            .filter(|applied| *applied)
            .count()
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// `props.pagination`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub enabled: bool,
    pub items_per_page: usize,
}

impl Pagination {
    pub fn from_props(props: &Props, default_size: usize) -> Self {
        let obj = props.get_object("pagination");
        let enabled = obj
            .and_then(|o| o.get("enabled"))
            .and_then(value_as_bool)
            .unwrap_or(false);
        let items_per_page = obj
            .and_then(|o| o.get("itemsPerPage"))
            .and_then(value_as_f64)
            .filter(|n| *n >= 1.0)
            .map(|n| n as usize)
            .unwrap_or(default_size)
            .max(1);
        Self {
            enabled,
            items_per_page,
        }
    }

    /// Row range shown on a 1-based page
    pub fn slice(&self, total: usize, page: usize) -> Range<usize> {
        let page = page.max(1);
        let start = ((page - 1) * self.items_per_page).min(total);
        let end = (page * self.items_per_page).min(total);
        start..end
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.items_per_page).max(1)
    }
}

// ============================================================================
// Empty state
// ============================================================================

pub const DEFAULT_EMPTY_MESSAGE: &str = "No data available";

/// What a preview repeater with no rows shows
#[derive(Debug, Clone, PartialEq)]
pub enum EmptyState {
    Message(String),
    /// Reference to a reusable component
    Component(String),
    Image { src: String, caption: Option<String> },
}

impl EmptyState {
    pub fn from_props(props: &Props) -> Self {
        let Some(obj) = props.get_object("emptyState") else {
            return match props.get_str("emptyMessage") {
                Some(message) if !message.trim().is_empty() => EmptyState::Message(message.into()),
                _ => EmptyState::Message(DEFAULT_EMPTY_MESSAGE.into()),
            };
        };
        let text = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let kind = text("type").unwrap_or_default();
        let component = text("componentId").or_else(|| text("component"));
        let image = text("imageUrl").or_else(|| text("image"));
        match (kind.as_str(), component, image) {
            ("component", Some(id), _) | ("", Some(id), _) => EmptyState::Component(id),
            ("image", _, Some(src)) | ("", None, Some(src)) => EmptyState::Image {
                src,
                caption: text("caption").or_else(|| text("message")),
            },
            _ => EmptyState::Message(text("message").unwrap_or_else(|| DEFAULT_EMPTY_MESSAGE.into())),
        }
    }
}

// ============================================================================
// Row planning
// ============================================================================

/// What a repeater renders this pass
#[derive(Debug, Clone, PartialEq)]
pub enum RepeaterView {
    Loading,
    Error(String),
    Empty(EmptyState),
    Rows(RowPage),
}

/// Row contexts for the visible page
#[derive(Debug, Clone, PartialEq)]
pub struct RowPage {
    pub rows: Vec<DataContext>,
    /// Total rows before pagination
    pub total: usize,
    /// Current 1-based page; `None` when pagination is off or in design mode
    pub page: Option<usize>,
    pub page_count: usize,
    /// Rows were synthesized from the schema
    pub simulated: bool,
}

/// Decide what a repeater shows for its current state
pub fn plan_view(
    instance: &RepeaterInstance,
    props: &Props,
    mode: RenderMode,
    page: usize,
    config: &RenderConfig,
) -> RepeaterView {
    if let Some(error) = &instance.error {
        return RepeaterView::Error(error.clone());
    }
    if instance.loading {
        return RepeaterView::Loading;
    }
    let connection = instance.parent_connection();

    if mode.is_design() {
        let (count, simulated) = if instance.rows.is_empty() {
            (config.simulated_row_count(connection.fields.len()), true)
        } else {
            (instance.rows.len(), false)
        };
        let fields = instance
            .table
            .as_ref()
            .map(|t| t.schema.fields.as_slice())
            .unwrap_or_default();
        let rows = (0..count)
            .map(|i| DataContext::placeholders(i, fields, connection.clone()))
            .collect();
        return RepeaterView::Rows(RowPage {
            rows,
            total: count,
            page: None,
            page_count: 1,
            simulated,
        });
    }

    let total = instance.rows.len();
    if total == 0 {
        return RepeaterView::Empty(EmptyState::from_props(props));
    }
    let pagination = Pagination::from_props(props, config.default_items_per_page);
    let (range, page, page_count) = if pagination.enabled {
        let page = page.max(1);
        (pagination.slice(total, page), Some(page), pagination.page_count(total))
    } else {
        (0..total, None, 1)
    };
    let rows = instance.rows[range.clone()]
        .iter()
        .zip(range)
        .map(|(row, index)| DataContext::for_row(row.clone(), index, connection.clone()))
        .collect();
    RepeaterView::Rows(RowPage {
        rows,
        total,
        page,
        page_count,
        simulated: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use uuid::Uuid;
    use weave_core::WeaveError;
    use weave_ir::{FieldDef, FieldType, Record, TableRegistry, TableSchema};

    fn products(n: usize) -> TableProject {
        let mut table = TableProject::new(
            "Products",
            TableSchema {
                fields: vec![
                    FieldDef::new("f1", "title", FieldType::Text),
                    FieldDef::new("f2", "price", FieldType::Number),
                ],
            },
        );
        for i in 0..n {
            table = table.with_record(Record::new(
                i as u64,
                json!({"f1": format!("Item {i}"), "f2": i}).as_object().cloned().unwrap(),
            ));
        }
        table
    }

    fn by_name() -> DatabaseConnection {
        DatabaseConnection {
            table_id: None,
            table_name: Some("Products".into()),
        }
    }

    fn loaded(n: usize) -> RepeaterInstance {
        let registry = RepeaterRegistry::new();
        registry.mount("r", &by_name());
        let request = registry.take_pending().remove(0);
        registry.complete(&request, Ok(products(n)));
        registry.instance("r").unwrap()
    }

    fn paged() -> Props {
        Props::new().with("pagination", json!({"enabled": true, "itemsPerPage": 10}))
    }

    fn row_count(view: &RepeaterView) -> usize {
        match view {
            RepeaterView::Rows(page) => page.rows.len(),
            _ => 0,
        }
    }

    #[test]
    fn test_page_two_row_count() {
        let config = RenderConfig::default();
        for n in [0usize, 5, 10, 11, 15, 20, 25, 40] {
            let view = plan_view(&loaded(n), &paged(), RenderMode::Preview, 2, &config);
            let expected = if n <= 10 { 0 } else { 10.min(n - 10) };
            assert_eq!(row_count(&view), expected, "N = {n}");
        }
    }

    #[test]
    fn test_page_two_uses_global_indices() {
        let view = plan_view(&loaded(15), &paged(), RenderMode::Preview, 2, &RenderConfig::default());
        let RepeaterView::Rows(page) = view else {
            panic!("expected rows");
        };
        assert_eq!(page.page, Some(2));
        assert_eq!(page.page_count, 2);
        assert_eq!(page.rows[0].record_index, Some(10));
        assert_eq!(page.rows[0].lookup("title"), Some(&json!("Item 10")));
    }

    #[test]
    fn test_design_shows_all_rows_as_placeholders() {
        let view = plan_view(&loaded(25), &paged(), RenderMode::Design, 2, &RenderConfig::default());
        let RepeaterView::Rows(page) = view else {
            panic!("expected rows");
        };
        assert_eq!(page.rows.len(), 25);
        assert!(!page.simulated);
        assert_eq!(page.rows[3].lookup("title"), Some(&json!("{{title}}")));
    }

    #[test]
    fn test_design_placeholders_bind_by_id_and_name() {
        for n in [0, 4] {
            let view = plan_view(&loaded(n), &paged(), RenderMode::Design, 1, &RenderConfig::default());
            let RepeaterView::Rows(page) = view else {
                panic!("expected rows");
            };
            let row = &page.rows[0];
            assert_eq!(row.lookup("f1"), Some(&json!("{{title}}")), "N = {n}");
            assert_eq!(row.lookup("title"), Some(&json!("{{title}}")), "N = {n}");
            assert_eq!(row.lookup("f2"), Some(&json!("{{price}}")), "N = {n}");
        }
    }

    #[test]
    fn test_zero_rows_preview_empty_design_simulated() {
        let config = RenderConfig::default();
        let instance = loaded(0);
        let props = Props::new().with("emptyState", json!({"message": "Nothing yet"}));

        let preview = plan_view(&instance, &props, RenderMode::Preview, 1, &config);
        assert_eq!(
            preview,
            RepeaterView::Empty(EmptyState::Message("Nothing yet".into()))
        );

        let design = plan_view(&instance, &props, RenderMode::Design, 1, &config);
        let RepeaterView::Rows(page) = design else {
            panic!("expected simulated rows");
        };
        assert!(page.simulated);
        assert!((3..=8).contains(&page.rows.len()));
    }

    #[test]
    fn test_empty_state_variants() {
        let state = |v: Value| EmptyState::from_props(&Props::new().with("emptyState", v));
        assert_eq!(
            EmptyState::from_props(&Props::new()),
            EmptyState::Message(DEFAULT_EMPTY_MESSAGE.into())
        );
        assert_eq!(
            state(json!({"type": "component", "componentId": "empty-card"})),
            EmptyState::Component("empty-card".into())
        );
        assert_eq!(
            state(json!({"image": "/empty.png", "caption": "No orders"})),
            EmptyState::Image {
                src: "/empty.png".into(),
                caption: Some("No orders".into())
            }
        );
    }

    #[test]
    fn test_pagination_defaults() {
        let p = Pagination::from_props(&Props::new().with("pagination", json!({"enabled": true})), 10);
        assert_eq!(p.items_per_page, 10);
        assert_eq!(p.page_count(0), 1);
        assert_eq!(p.page_count(21), 3);
        assert_eq!(p.slice(21, 3), 20..21);
        assert_eq!(p.slice(21, 9), 21..21);
    }

    #[tokio::test]
    async fn test_fetch_pending_loads_rows() {
        let mut registry_tables = TableRegistry::default();
        registry_tables.add(products(3));
        let registry = RepeaterRegistry::new();
        registry.mount("r", &by_name());
        assert!(registry.instance("r").unwrap().loading);

        assert_eq!(registry.fetch_pending(&registry_tables).await, 1);
        let instance = registry.instance("r").unwrap();
        assert!(!instance.loading);
        assert_eq!(instance.rows.len(), 3);
        // Rows carry both field ids and names
        assert_eq!(instance.rows[0].get("title"), instance.rows[0].get("f1"));

        // Already fetched; nothing pending
        assert_eq!(registry.fetch_pending(&registry_tables).await, 0);
    }

    #[tokio::test]
    async fn test_fetch_error_is_per_instance() {
        let registry = RepeaterRegistry::new();
        registry.mount("missing", &DatabaseConnection {
            table_id: Some(Uuid::new_v4().to_string()),
            table_name: None,
        });
        registry.mount("ok", &by_name());
        let mut tables = TableRegistry::default();
        tables.add(products(2));
        registry.fetch_pending(&tables).await;

        assert!(registry.instance("missing").unwrap().error.is_some());
        assert_eq!(registry.instance("ok").unwrap().rows.len(), 2);
        assert!(matches!(
            plan_view(&registry.instance("missing").unwrap(), &Props::new(), RenderMode::Preview, 1, &RenderConfig::default()),
            RepeaterView::Error(_)
        ));
    }

    #[test]
    fn test_results_for_unmounted_instances_are_dropped() {
        let registry = RepeaterRegistry::new();
        registry.mount("r", &by_name());
        let request = registry.take_pending().remove(0);

        registry.begin_pass();
        registry.end_pass();
        assert!(!registry.is_mounted("r"));
        assert!(!registry.complete(&request, Ok(products(2))));

        // Remounting starts a new generation; the stale request stays dropped
        registry.mount("r", &by_name());
        assert!(!registry.complete(&request, Ok(products(2))));
        assert!(registry.instance("r").unwrap().loading);
    }

    #[test]
    fn test_connection_change_refetches() {
        let registry = RepeaterRegistry::new();
        registry.mount("r", &by_name());
        let first = registry.take_pending().remove(0);
        registry.complete(&first, Ok(products(1)));

        registry.begin_pass();
        registry.mount("r", &by_name());
        registry.end_pass();
        assert!(registry.take_pending().is_empty());

        let other = DatabaseConnection {
            table_id: None,
            table_name: Some("Orders".into()),
        };
        registry.mount("r", &other);
        let pending = registry.take_pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].connection, other);
    }

    struct Failing;

    #[async_trait(?Send)]
    impl TableService for Failing {
        async fn get_table_project(&self, _id: Uuid) -> WeaveResult<Option<TableProject>> {
            Err(WeaveError::data_fetch("products", "connection refused"))
        }

        async fn find_table_by_name(&self, _name: &str) -> WeaveResult<Option<TableProject>> {
            Err(WeaveError::data_fetch("products", "connection refused"))
        }
    }

    #[tokio::test]
    async fn test_service_error_recorded() {
        let registry = RepeaterRegistry::new();
        registry.mount("r", &by_name());
        registry.fetch_pending(&Failing).await;
        let error = registry.instance("r").unwrap().error.unwrap();
        assert!(error.contains("connection refused"));
    }
}
