//! Connected tables and per-row data context
//!
//! This module contains the table model consumed by the data repeater
//! (`TableProject`, `TableSchema`, `FieldDef`, `Record`), the
//! `databaseConnection` prop, and the `DataContext` carried down a repeated
//! subtree.

use crate::props::Props;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Key carrying the row index inside a serialized data context
pub const RECORD_INDEX_KEY: &str = "_recordIndex";

/// Key carrying the parent table connection inside a serialized data context
pub const PARENT_CONNECTION_KEY: &str = "_parentConnection";

// ============================================================================
// Table schema
// ============================================================================

/// Column data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Boolean,
    Date,
    Email,
    Url,
    Image,
    Json,
    #[serde(other)]
    Other,
}

/// A column of a connected table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

impl FieldDef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            field_type,
        }
    }
}

/// Table schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl TableSchema {
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

/// A stored row; `data` may be keyed by field id or by field name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Value,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<Value>, data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// A connected table with its rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableProject {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub schema: TableSchema,
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TableProject {
    pub fn new(name: impl Into<String>, schema: TableSchema) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            schema,
            records: Vec::new(),
            updated_at: Some(Utc::now()),
        }
    }

    pub fn with_record(mut self, record: Record) -> Self {
        self.records.push(record);
        self
    }

    /// Rows normalized so both field ids and field names are keys
    pub fn normalized_rows(&self) -> Vec<Map<String, Value>> {
        self.records
            .iter()
            .map(|r| normalize_record(r, &self.schema))
            .collect()
    }
}

/// Normalize a record so every schema field is reachable by id and by name
///
/// The record id is exposed as `id` unless the data already defines it.
pub fn normalize_record(record: &Record, schema: &TableSchema) -> Map<String, Value> {
    let mut row = record.data.clone();
    for field in &schema.fields {
        let value = record
            .data
            .get(&field.id)
            .or_else(|| record.data.get(&field.name))
            .cloned();
        if let Some(value) = value {
            row.entry(field.id.clone()).or_insert_with(|| value.clone());
            row.entry(field.name.clone()).or_insert(value);
        }
    }
    row.entry("id".to_string())
        .or_insert_with(|| record.id.clone());
    row
}

// ============================================================================
// Database connection prop
// ============================================================================

/// `props.databaseConnection` on a section or grid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConnection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
}

impl DatabaseConnection {
    /// Read the connection from props; `None` when neither key is set
    pub fn from_props(props: &Props) -> Option<Self> {
        let obj = props.get_object("databaseConnection")?;
        let pick = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let conn = Self {
            table_id: pick("tableId"),
            table_name: pick("tableName"),
        };
        if conn.table_id.is_none() && conn.table_name.is_none() {
            None
        } else {
            Some(conn)
        }
    }

    /// The table id when it parses as a UUID
    pub fn table_uuid(&self) -> Option<Uuid> {
        self.table_id.as_deref().and_then(|s| Uuid::parse_str(s).ok())
    }

    /// Human-readable key used in logs and pending-fetch requests
    pub fn label(&self) -> String {
        self.table_name
            .clone()
            .or_else(|| self.table_id.clone())
            .unwrap_or_default()
    }
}

// ============================================================================
// Data context
// ============================================================================

/// Table a repeated subtree is bound to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentConnection {
    pub table_name: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Per-row values available to `{{field}}` bindings in a repeated subtree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataContext {
    pub values: Map<String, Value>,
    pub record_index: Option<usize>,
    pub parent_connection: Option<ParentConnection>,
}

impl DataContext {
    /// Context for a real row
    pub fn for_row(row: Map<String, Value>, index: usize, connection: ParentConnection) -> Self {
        Self {
            values: row,
            record_index: Some(index),
            parent_connection: Some(connection),
        }
    }

    /// Design-mode context: every field maps to its own `{{name}}` token,
    /// reachable by field id as well as by name
    pub fn placeholders(index: usize, fields: &[FieldDef], connection: ParentConnection) -> Self {
        let token = |name: &str| Value::String(format!("{{{{{name}}}}}"));
        let mut values = Map::new();
        for field in fields {
            values.insert(field.id.clone(), token(&field.name));
            values.insert(field.name.clone(), token(&field.name));
        }
        for name in &connection.fields {
            if !values.contains_key(name) {
                values.insert(name.clone(), token(name));
            }
        }
        Self {
            values,
            record_index: Some(index),
            parent_connection: Some(connection),
        }
    }

    /// Parse a host-injected `props.dataContext`
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let mut values = obj.clone();
        let record_index = values
            .remove(RECORD_INDEX_KEY)
            .and_then(|v| v.as_u64())
            .map(|n| n as usize);
        let parent_connection = values
            .remove(PARENT_CONNECTION_KEY)
            .and_then(|v| serde_json::from_value(v).ok());
        Some(Self {
            values,
            record_index,
            parent_connection,
        })
    }

    /// Serialized form with the underscore metadata keys
    pub fn to_value(&self) -> Value {
        let mut obj = self.values.clone();
        if let Some(index) = self.record_index {
            obj.insert(RECORD_INDEX_KEY.to_string(), Value::from(index));
        }
        if let Some(conn) = &self.parent_connection {
            if let Ok(v) = serde_json::to_value(conn) {
                obj.insert(PARENT_CONNECTION_KEY.to_string(), v);
            }
        }
        Value::Object(obj)
    }

    /// Look up a field, following dotted paths into nested objects
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        crate::variables::lookup_path(&self.values, path)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
