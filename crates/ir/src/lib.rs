//! # Weave IR
//!
//! This crate provides the data model the Weave renderer consumes: the app
//! component tree, style classes, design tokens, connected tables, variables
//! and page documents, plus the collaborator traits the renderer reads them
//! through.
//!
//! ## Core Concepts
//!
//! - **AppComponent**: a node of the page tree (`type`, `props`, `children`)
//! - **StyleClass**: a reusable property bag with tablet/mobile overrides
//! - **DesignToken**: a design-system value props can reference by id
//! - **TableProject**: a connected table whose rows feed data repeaters
//! - **Page**: the persisted document bundling all of the above
//!

pub mod class;
pub mod component;
pub mod data;
pub mod page;
pub mod props;
pub mod serialization;
pub mod stores;
pub mod token;
pub mod validation;
pub mod variables;

pub use class::{ResolvedClasses, StyleClass, resolve_classes};
pub use component::{AppComponent, Children, ComponentPatch, ComponentType, json_kind};
pub use data::{
    DataContext, DatabaseConnection, FieldDef, FieldType, ParentConnection, Record, TableProject,
    TableSchema, normalize_record,
};
pub use page::Page;
pub use props::{
    DELETED_SENTINEL, LOCKED_PROPS_KEY, Props, is_blank, is_deleted, value_as_bool, value_as_f64,
};
pub use serialization::{PagePreview, load_page, load_page_from_string, preview_page, save_page};
pub use stores::{
    ClassStore, ComponentUpdater, ContextMenuRequest, InMemoryClassStore, InMemorySelection,
    InMemoryTokenStore, PageTree, SelectionStore, TableRegistry, TableService, TokenStore,
    VariableStore,
};
pub use token::{DesignToken, TokenCategory, TokenRef, resolve_token_value};
pub use validation::{ValidationResult, ValidationRule, Validator};
pub use variables::{InMemoryVariables, VariableOperation, VariableScope, VariableSnapshot};

pub use weave_core::{
    Breakpoint, ComponentId, Position, Rect, RenderMode, Size, WeaveError, WeaveResult,
};

/// Current schema version for page files
pub const SCHEMA_VERSION: u32 = 1;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        AppComponent, Breakpoint, ClassStore, ComponentPatch, ComponentType, ComponentUpdater,
        DataContext, Page, Props, RenderMode, StyleClass, TableService, TokenStore, VariableStore,
        WeaveError, WeaveResult,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version() {
        assert_eq!(SCHEMA_VERSION, 1);
    }
}
