//! Page documents
//!
//! A `Page` bundles a component tree with the classes, tokens and reusable
//! components it references. It is what the CLI loads and renders.

use crate::SCHEMA_VERSION;
use crate::class::StyleClass;
use crate::component::AppComponent;
use crate::stores::{InMemoryClassStore, InMemoryTokenStore};
use crate::token::DesignToken;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use weave_core::ComponentId;

/// A page of the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub name: String,

    /// Root components, in document order
    #[serde(default)]
    pub components: Vec<AppComponent>,

    #[serde(default)]
    pub classes: Vec<StyleClass>,

    #[serde(default)]
    pub tokens: Vec<DesignToken>,

    /// Components referenced by id from empty states and component refs
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub reusable_components: BTreeMap<String, AppComponent>,

    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: slug(&name),
            name,
            components: Vec::new(),
            classes: Vec::new(),
            tokens: Vec::new(),
            reusable_components: BTreeMap::new(),
            schema_version: SCHEMA_VERSION,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_component(mut self, component: AppComponent) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_class(mut self, class: StyleClass) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_token(mut self, token: DesignToken) -> Self {
        self.tokens.push(token);
        self
    }

    pub fn with_reusable(mut self, component: AppComponent) -> Self {
        self.reusable_components
            .insert(component.id.clone(), component);
        self
    }

    /// Mark as modified
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Find a component anywhere in the tree
    pub fn find(&self, id: &str) -> Option<&AppComponent> {
        self.components.iter().find_map(|c| c.find(id))
    }

    /// Total number of components in the tree
    pub fn component_count(&self) -> usize {
        self.components.iter().map(AppComponent::subtree_size).sum()
    }

    /// Every component id, depth-first
    pub fn all_ids(&self) -> Vec<ComponentId> {
        let mut ids = Vec::new();
        for root in &self.components {
            root.walk(&mut |c| ids.push(c.id.clone()));
        }
        ids
    }

    /// Class store over this page's classes
    pub fn class_store(&self) -> InMemoryClassStore {
        InMemoryClassStore::from_classes(self.classes.iter().cloned())
    }

    /// Token store over this page's tokens
    pub fn token_store(&self) -> InMemoryTokenStore {
        InMemoryTokenStore::from_tokens(self.tokens.iter().cloned())
    }
}

fn slug(name: &str) -> String {
    let mut out = String::new();
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentType;
    use crate::stores::ClassStore;

    #[test]
    fn test_new_page_slug() {
        let page = Page::new("About Us!");
        assert_eq!(page.id, "about-us");
        assert_eq!(page.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_find_and_count() {
        let page = Page::new("Home").with_component(
            AppComponent::new("root", ComponentType::Container)
                .with_child(AppComponent::new("a", ComponentType::Text))
                .with_child(AppComponent::new("b", ComponentType::Button)),
        );
        assert_eq!(page.component_count(), 3);
        assert_eq!(page.all_ids(), vec!["root", "a", "b"]);
        assert!(page.find("b").is_some());
    }

    #[test]
    fn test_class_store_from_page() {
        let page = Page::new("Home").with_class(StyleClass::new("hero").with_style("padding", 8));
        assert!(page.class_store().class("hero").is_some());
    }

    #[test]
    fn test_minimal_json_defaults() {
        let page: Page = serde_json::from_str(r#"{"id": "p", "name": "P"}"#).unwrap();
        assert!(page.components.is_empty());
        assert_eq!(page.schema_version, SCHEMA_VERSION);
    }
}
