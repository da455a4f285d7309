//! Collaborator contracts
//!
//! The renderer reads classes, tokens, variables and tables through these
//! traits and writes back only through `ComponentUpdater` and the variable
//! mutators. In-memory implementations back the CLI and the tests.

use crate::class::StyleClass;
use crate::component::{AppComponent, ComponentPatch};
use crate::data::{DataContext, DatabaseConnection, TableProject};
use crate::token::DesignToken;
use crate::variables::{VariableOperation, VariableScope, resolve_in_scopes};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;
use weave_core::{ComponentId, Persistable, Position, WeaveError, WeaveResult};

// ============================================================================
// Traits
// ============================================================================

/// Lookup of style classes by name
pub trait ClassStore {
    fn class(&self, name: &str) -> Option<StyleClass>;
}

/// Lookup of design tokens by id
pub trait TokenStore {
    fn token(&self, id: &str) -> Option<DesignToken>;
}

/// App/page variable storage
pub trait VariableStore {
    /// Read a variable (dotted paths walk into objects)
    fn get(&self, scope: VariableScope, path: &str) -> Option<Value>;

    /// Overwrite a variable
    fn set(&self, scope: VariableScope, name: &str, value: Value) -> WeaveResult<()>;

    /// Resolve a `{{...}}` expression body against a local data context and
    /// the variable scopes
    fn resolve_binding(&self, expr: &str, local: Option<&DataContext>) -> Option<Value> {
        resolve_in_scopes(self, expr, local)
    }

    /// Apply a mutation and return the new value
    fn apply(
        &self,
        scope: VariableScope,
        name: &str,
        operation: VariableOperation,
        operand: &Value,
    ) -> WeaveResult<Value> {
        let current = self.get(scope, name);
        let next = operation.apply(name, current.as_ref(), operand)?;
        self.set(scope, name, next.clone())?;
        Ok(next)
    }
}

/// Async access to connected tables
#[async_trait(?Send)]
pub trait TableService {
    async fn get_table_project(&self, id: Uuid) -> WeaveResult<Option<TableProject>>;

    async fn find_table_by_name(&self, name: &str) -> WeaveResult<Option<TableProject>>;

    /// Resolve a connection, preferring the table id
    async fn fetch_connection(&self, connection: &DatabaseConnection) -> WeaveResult<TableProject> {
        if let Some(id) = connection.table_uuid() {
            if let Some(table) = self.get_table_project(id).await? {
                return Ok(table);
            }
        }
        if let Some(name) = connection.table_name.as_deref() {
            if let Some(table) = self.find_table_by_name(name).await? {
                return Ok(table);
            }
        }
        Err(WeaveError::TableNotFound(connection.label()))
    }
}

/// Mutation callback into the host's component tree
pub trait ComponentUpdater {
    fn update_component(&self, id: &str, patch: ComponentPatch) -> WeaveResult<()>;
}

/// A request to open the context menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenuRequest {
    pub component_id: ComponentId,
    pub position: Position,
}

/// Editor selection state owned by the host
pub trait SelectionStore {
    fn selected_ids(&self) -> Vec<ComponentId>;
    fn set_selection(&self, ids: Vec<ComponentId>);
    fn hovered_id(&self) -> Option<ComponentId>;
    fn set_hovered(&self, id: Option<ComponentId>);
    fn current_page_id(&self) -> Option<String>;
    fn open_properties_panel(&self, id: &str);
    fn open_context_menu(&self, request: ContextMenuRequest);

    fn is_selected(&self, id: &str) -> bool {
        self.selected_ids().iter().any(|s| s == id)
    }
}

// ============================================================================
// In-memory implementations
// ============================================================================

/// Class store backed by a map
#[derive(Debug, Clone, Default)]
pub struct InMemoryClassStore {
    classes: HashMap<String, StyleClass>,
}

impl InMemoryClassStore {
    pub fn from_classes(classes: impl IntoIterator<Item = StyleClass>) -> Self {
        Self {
            classes: classes.into_iter().map(|c| (c.name.clone(), c)).collect(),
        }
    }

    pub fn insert(&mut self, class: StyleClass) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassStore for InMemoryClassStore {
    fn class(&self, name: &str) -> Option<StyleClass> {
        self.classes.get(name).cloned()
    }
}

/// Token store backed by a map
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenStore {
    tokens: HashMap<String, DesignToken>,
}

impl InMemoryTokenStore {
    pub fn from_tokens(tokens: impl IntoIterator<Item = DesignToken>) -> Self {
        Self {
            tokens: tokens.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    pub fn insert(&mut self, token: DesignToken) {
        self.tokens.insert(token.id.clone(), token);
    }
}

impl TokenStore for InMemoryTokenStore {
    fn token(&self, id: &str) -> Option<DesignToken> {
        self.tokens.get(id).cloned()
    }
}

/// Tables loaded from a fixture file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRegistry {
    #[serde(default)]
    pub tables: Vec<TableProject>,
}

impl TableRegistry {
    pub fn new(tables: Vec<TableProject>) -> Self {
        Self { tables }
    }

    pub fn add(&mut self, table: TableProject) -> Uuid {
        let id = table.id;
        self.tables.push(table);
        id
    }
}

impl Persistable for TableRegistry {
    fn file_extension() -> &'static str {
        "tables.json"
    }
}

#[async_trait(?Send)]
impl TableService for TableRegistry {
    async fn get_table_project(&self, id: Uuid) -> WeaveResult<Option<TableProject>> {
        Ok(self.tables.iter().find(|t| t.id == id).cloned())
    }

    async fn find_table_by_name(&self, name: &str) -> WeaveResult<Option<TableProject>> {
        Ok(self
            .tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .cloned())
    }
}

/// Component tree owned in memory; applies patches in place
#[derive(Debug, Default)]
pub struct PageTree {
    roots: RefCell<Vec<AppComponent>>,
    history: RefCell<Vec<(ComponentId, ComponentPatch)>>,
}

impl PageTree {
    pub fn new(roots: Vec<AppComponent>) -> Self {
        Self {
            roots: RefCell::new(roots),
            history: RefCell::new(Vec::new()),
        }
    }

    /// Current tree
    pub fn roots(&self) -> Vec<AppComponent> {
        self.roots.borrow().clone()
    }

    pub fn find(&self, id: &str) -> Option<AppComponent> {
        self.roots.borrow().iter().find_map(|r| r.find(id).cloned())
    }

    /// Patches applied so far, oldest first
    pub fn history(&self) -> Vec<(ComponentId, ComponentPatch)> {
        self.history.borrow().clone()
    }
}

impl ComponentUpdater for PageTree {
    fn update_component(&self, id: &str, patch: ComponentPatch) -> WeaveResult<()> {
        let mut roots = self.roots.borrow_mut();
        let target = roots
            .iter_mut()
            .find_map(|r| r.find_mut(id))
            .ok_or_else(|| WeaveError::ComponentNotFound(id.to_string()))?;
        patch.apply(target);
        tracing::debug!(component = id, "component updated");
        self.history.borrow_mut().push((id.to_string(), patch));
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SelectionState {
    selected: Vec<ComponentId>,
    hovered: Option<ComponentId>,
    page_id: Option<String>,
    panel_for: Option<ComponentId>,
    context_menu: Option<ContextMenuRequest>,
}

/// Selection store for hosts without their own editor state
#[derive(Debug, Default)]
pub struct InMemorySelection {
    state: RefCell<SelectionState>,
}

impl InMemorySelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(page_id: impl Into<String>) -> Self {
        let store = Self::default();
        store.state.borrow_mut().page_id = Some(page_id.into());
        store
    }

    /// Component whose properties panel is open
    pub fn properties_panel(&self) -> Option<ComponentId> {
        self.state.borrow().panel_for.clone()
    }

    pub fn context_menu(&self) -> Option<ContextMenuRequest> {
        self.state.borrow().context_menu.clone()
    }

    /// Selected ids as a set
    pub fn selected_set(&self) -> BTreeSet<ComponentId> {
        self.state.borrow().selected.iter().cloned().collect()
    }
}

impl SelectionStore for InMemorySelection {
    fn selected_ids(&self) -> Vec<ComponentId> {
        self.state.borrow().selected.clone()
    }

    fn set_selection(&self, ids: Vec<ComponentId>) {
        self.state.borrow_mut().selected = ids;
    }

    fn hovered_id(&self) -> Option<ComponentId> {
        self.state.borrow().hovered.clone()
    }

    fn set_hovered(&self, id: Option<ComponentId>) {
        self.state.borrow_mut().hovered = id;
    }

    fn current_page_id(&self) -> Option<String> {
        self.state.borrow().page_id.clone()
    }

    fn open_properties_panel(&self, id: &str) {
        self.state.borrow_mut().panel_for = Some(id.to_string());
    }

    fn open_context_menu(&self, request: ContextMenuRequest) {
        self.state.borrow_mut().context_menu = Some(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentType;
    use crate::data::{FieldDef, FieldType, TableSchema};
    use crate::props::Props;
    use crate::variables::InMemoryVariables;
    use serde_json::json;

    fn registry() -> TableRegistry {
        TableRegistry::new(vec![TableProject::new(
            "Products",
            TableSchema {
                fields: vec![FieldDef::new("f1", "title", FieldType::Text)],
            },
        )])
    }

    #[tokio::test]
    async fn test_fetch_connection_prefers_id() {
        let reg = registry();
        let id = reg.tables[0].id;
        let conn = DatabaseConnection {
            table_id: Some(id.to_string()),
            table_name: Some("Other".into()),
        };
        assert_eq!(reg.fetch_connection(&conn).await.unwrap().id, id);
    }

    #[tokio::test]
    async fn test_fetch_connection_falls_back_to_name() {
        let reg = registry();
        let conn = DatabaseConnection {
            table_id: Some("not-a-uuid".into()),
            table_name: Some("products".into()),
        };
        assert_eq!(reg.fetch_connection(&conn).await.unwrap().name, "Products");

        let conn = DatabaseConnection {
            table_id: None,
            table_name: Some("Missing".into()),
        };
        let err = reg.fetch_connection(&conn).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_page_tree_update() {
        let tree = PageTree::new(vec![
            AppComponent::new("root", ComponentType::Container)
                .with_child(AppComponent::new("t", ComponentType::Text)),
        ]);
        tree.update_component("t", ComponentPatch::props(Props::new().with("content", "Hi")))
            .unwrap();
        assert_eq!(
            tree.find("t").and_then(|c| c.props().content().map(str::to_string)),
            Some("Hi".to_string())
        );
        assert_eq!(tree.history().len(), 1);
        assert!(
            tree.update_component("nope", ComponentPatch::default())
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn test_variable_store_apply() {
        let vars = InMemoryVariables::new();
        let next = vars
            .apply(VariableScope::Page, "clicks", VariableOperation::Increment, &Value::Null)
            .unwrap();
        assert_eq!(next, json!(1));
        assert_eq!(vars.resolve_binding("clicks", None), Some(json!(1)));
    }

    #[test]
    fn test_selection_store() {
        let sel = InMemorySelection::with_page("home");
        sel.set_selection(vec!["a".into(), "b".into()]);
        assert!(sel.is_selected("a"));
        sel.set_hovered(Some("b".into()));
        assert_eq!(sel.hovered_id().as_deref(), Some("b"));
        assert_eq!(sel.current_page_id().as_deref(), Some("home"));
        sel.open_context_menu(ContextMenuRequest {
            component_id: "a".into(),
            position: Position::new(10.0, 20.0),
        });
        assert_eq!(sel.context_menu().map(|c| c.component_id), Some("a".to_string()));
    }
}
