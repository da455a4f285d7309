//! Serialization and deserialization for Weave pages
//!
//! This module provides saving and loading of page files, including JSON
//! serialization, file I/O, and schema version migration.

use crate::{Page, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use weave_core::{WeaveError, WeaveResult};

// ============================================================================
// Constants
// ============================================================================

/// File extension for Weave page files
pub const PAGE_EXTENSION: &str = "weave";

// ============================================================================
// Page File Wrapper
// ============================================================================

/// Wrapper for page files that includes version information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFile {
    /// Schema version for migration purposes
    pub schema_version: u32,

    /// The page data
    pub page: Page,
}

impl PageFile {
    pub fn new(page: Page) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            page,
        }
    }

    /// Check if migration is needed
    pub fn needs_migration(&self) -> bool {
        self.schema_version < SCHEMA_VERSION
    }

    /// Migrate to the latest schema version
    pub fn migrate(&mut self) -> WeaveResult<()> {
        while self.schema_version < SCHEMA_VERSION {
            self.migrate_one_version()?;
        }
        Ok(())
    }

    fn migrate_one_version(&mut self) -> WeaveResult<()> {
        match self.schema_version {
            0 => {
                // v0 pages kept legacy `text` instead of `content` on text nodes
                for root in &mut self.page.components {
                    migrate_text_to_content(root);
                }
                self.schema_version = 1;
            }
            _ => {
                self.schema_version = SCHEMA_VERSION;
            }
        }
        self.page.schema_version = self.schema_version;
        Ok(())
    }
}

fn migrate_text_to_content(component: &mut crate::AppComponent) {
    if component.component_type.is_text_editable() {
        let props = component.props_mut();
        if !props.contains_key("content") {
            if let Some(text) = props.remove("text") {
                props.insert("content".to_string(), text);
            }
        }
    }
    if let crate::Children::Nodes(children) = &mut component.children {
        for child in children {
            migrate_text_to_content(child);
        }
    }
}

// ============================================================================
// Save Functions
// ============================================================================

/// Save a page to a file
///
/// ```rust,ignore
/// use weave_ir::{Page, save_page};
///
/// let page = Page::new("Home");
/// save_page(&page, "home.weave").unwrap();
/// ```
pub fn save_page(page: &Page, path: impl AsRef<Path>) -> WeaveResult<()> {
    let path = path.as_ref();
    let json = save_page_to_string(page).map_err(|e| WeaveError::FileWrite {
        path: path.to_path_buf(),
        message: format!("Failed to serialize page: {}", e),
    })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| WeaveError::FileWrite {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
    }

    std::fs::write(path, json).map_err(|e| WeaveError::FileWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Save a page to a pretty JSON string
pub fn save_page_to_string(page: &Page) -> WeaveResult<String> {
    let file = PageFile::new(page.clone());
    serde_json::to_string_pretty(&file).map_err(Into::into)
}

// ============================================================================
// Load Functions
// ============================================================================

/// Load a page from a file
pub fn load_page(path: impl AsRef<Path>) -> WeaveResult<Page> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(WeaveError::PageNotFound(path.to_path_buf()));
    }

    let json = std::fs::read_to_string(path).map_err(|e| WeaveError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    load_page_from_string(&json).map_err(|e| match e {
        WeaveError::JsonSerialization(je) => WeaveError::FileRead {
            path: path.to_path_buf(),
            message: format!("Invalid page file format: {}", je),
        },
        other => other,
    })
}

/// Load a page from a JSON string
///
/// Accepts a wrapped `PageFile`, a bare `Page`, or a bare component array.
pub fn load_page_from_string(json: &str) -> WeaveResult<Page> {
    if let Ok(mut file) = serde_json::from_str::<PageFile>(json) {
        if file.needs_migration() {
            tracing::info!(from = file.schema_version, to = SCHEMA_VERSION, "migrating page");
            file.migrate()?;
        }
        return Ok(file.page);
    }

    if let Ok(page) = serde_json::from_str::<Page>(json) {
        return Ok(page);
    }

    let value: serde_json::Value = serde_json::from_str(json)?;
    match value {
        serde_json::Value::Array(_) => {
            let components = serde_json::from_value(value)?;
            let mut page = Page::new("Untitled");
            page.components = components;
            Ok(page)
        }
        _ => Err(WeaveError::InvalidPageFormat(
            "expected a page object or a component array".to_string(),
        )),
    }
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Check if a path looks like a page file (`.weave` or `.json`)
pub fn is_page_file(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .map(|ext| ext == PAGE_EXTENSION || ext == "json")
        .unwrap_or(false)
}

/// Get the default file name for a page
pub fn default_file_name(page_name: &str) -> String {
    let safe_name: String = page_name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("{}.{}", safe_name.to_lowercase(), PAGE_EXTENSION)
}

/// Ensure a path has the page extension
pub fn ensure_extension(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.extension().is_none_or(|e| e != PAGE_EXTENSION) {
        path.with_extension(PAGE_EXTENSION)
    } else {
        path.to_path_buf()
    }
}

/// Summary of a page file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePreview {
    pub id: String,
    pub name: String,
    pub component_count: usize,
    pub class_count: usize,
    pub token_count: usize,
    pub reusable_count: usize,
    pub schema_version: u32,
}

impl PagePreview {
    pub fn of(page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            name: page.name.clone(),
            component_count: page.component_count(),
            class_count: page.classes.len(),
            token_count: page.tokens.len(),
            reusable_count: page.reusable_components.len(),
            schema_version: page.schema_version,
        }
    }
}

/// Load a page and summarise it
pub fn preview_page(path: impl AsRef<Path>) -> WeaveResult<PagePreview> {
    let page = load_page(path)?;
    Ok(PagePreview::of(&page))
}

// ============================================================================
// Tests
// ============================================================================
