//! Validation rules and utilities for Weave pages
//!
//! This module checks page documents before rendering: component ids,
//! children shape, props presence, class and token references, and data
//! connections.

use crate::component::json_kind;
use crate::token::TokenRef;
use crate::{AppComponent, Page};
use serde_json::Value;
use std::collections::HashSet;
use weave_core::{Validatable, WeaveError, WeaveResult};

// ============================================================================
// ValidationResult
// ============================================================================

/// Result of a validation operation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the validation passed
    pub valid: bool,

    /// List of errors (empty if valid)
    pub errors: Vec<ValidationError>,

    /// List of warnings (non-fatal issues)
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, error: ValidationError) {
        self.valid = false;
        self.errors.push(error);
    }

    /// Add a warning to the result
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Merge another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Convert to WeaveResult (fails if any errors)
    pub fn to_result(self) -> WeaveResult<()> {
        if self.valid {
            Ok(())
        } else {
            let msg = self
                .errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            Err(WeaveError::validation(msg))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

// ============================================================================
// ValidationError / ValidationWarning
// ============================================================================

/// A validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: ValidationErrorCode,
    pub message: String,
    /// Path to the problematic element (e.g. `components.hero.children`)
    pub path: Option<String>,
}

impl ValidationError {
    pub fn new(code: ValidationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "[{}] {}", path, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

/// Error codes for validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorCode {
    EmptyComponentId,
    DuplicateComponentId,
    InvalidChildren,
    DuplicateClassName,
    EmptyPageName,
}

/// A validation warning (non-fatal issue)
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub code: ValidationWarningCode,
    pub message: String,
    pub path: Option<String>,
}

impl ValidationWarning {
    pub fn new(code: ValidationWarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "[{}] Warning: {}", path, self.message)
        } else {
            write!(f, "Warning: {}", self.message)
        }
    }
}

/// Warning codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationWarningCode {
    MissingProps,
    UnknownComponentType,
    ChildrenOnLeaf,
    UnknownClass,
    UnknownToken,
    UnboundDataConnection,
    UnknownReusableComponent,
}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// Trait for validation rules
pub trait ValidationRule {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn validate(&self, page: &Page) -> ValidationResult;
}

// ============================================================================
// Validator
// ============================================================================

/// Page validator that runs multiple validation rules
#[derive(Default)]
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a validator with default rules
    pub fn with_default_rules() -> Self {
        let mut validator = Self::new();
        validator.add_rule(Box::new(PageMetaRule));
        validator.add_rule(Box::new(ComponentIdsRule));
        validator.add_rule(Box::new(ComponentShapeRule));
        validator.add_rule(Box::new(ClassReferencesRule));
        validator.add_rule(Box::new(TokenReferencesRule));
        validator.add_rule(Box::new(DataConnectionRule));
        validator
    }

    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Names of the installed rules
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Validate a page with all rules
    pub fn validate(&self, page: &Page) -> ValidationResult {
        let mut result = ValidationResult::ok();
        for rule in &self.rules {
            result.merge(rule.validate(page));
        }
        result
    }

    pub fn validate_result(&self, page: &Page) -> WeaveResult<()> {
        self.validate(page).to_result()
    }
}

impl Validatable for Page {
    fn validate(&self) -> WeaveResult<()> {
        Validator::with_default_rules().validate_result(self)
    }

    fn validation_errors(&self) -> Vec<String> {
        Validator::with_default_rules()
            .validate(self)
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect()
    }
}

/// Visit every component in the page, reusable components included
fn for_each_component<'a>(page: &'a Page, mut visit: impl FnMut(&'a AppComponent)) {
    for root in page.components.iter().chain(page.reusable_components.values()) {
        root.walk(&mut |c| visit(c));
    }
}

fn component_path(c: &AppComponent) -> String {
    format!("components.{}", c.id)
}

// ============================================================================
// Built-in Validation Rules
// ============================================================================

/// Rule: page has a name
pub struct PageMetaRule;

impl ValidationRule for PageMetaRule {
    fn name(&self) -> &'static str {
        "page_meta"
    }

    fn description(&self) -> &'static str {
        "Validates page metadata"
    }

    fn validate(&self, page: &Page) -> ValidationResult {
        let mut result = ValidationResult::ok();
        if page.name.trim().is_empty() {
            result.add_error(ValidationError::new(
                ValidationErrorCode::EmptyPageName,
                "Page name cannot be empty",
            ));
        }
        result
    }
}

/// Rule: component ids are non-empty and unique
pub struct ComponentIdsRule;

impl ValidationRule for ComponentIdsRule {
    fn name(&self) -> &'static str {
        "component_ids"
    }

    fn description(&self) -> &'static str {
        "Validates that component ids are non-empty and unique within the page"
    }

    fn validate(&self, page: &Page) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let mut seen: HashSet<&str> = HashSet::new();

        for root in &page.components {
            root.walk(&mut |c| {
                if c.id.trim().is_empty() {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::EmptyComponentId,
                            format!("A {} component has an empty id", c.component_type),
                        )
                        .with_path("components"),
                    );
                } else if !seen.insert(c.id.as_str()) {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::DuplicateComponentId,
                            format!("Duplicate component id: '{}'", c.id),
                        )
                        .with_path(component_path(c)),
                    );
                }
            });
        }
        result
    }
}

/// Rule: props present, children well-formed, types known
pub struct ComponentShapeRule;

impl ValidationRule for ComponentShapeRule {
    fn name(&self) -> &'static str {
        "component_shape"
    }

    fn description(&self) -> &'static str {
        "Validates component props, children and types"
    }

    fn validate(&self, page: &Page) -> ValidationResult {
        let mut result = ValidationResult::ok();
        for_each_component(page, |c| {
            let path = component_path(c);
            if !c.has_props() {
                result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::MissingProps,
                        format!("Component '{}' has no props; rendering with defaults", c.id),
                    )
                    .with_path(&path),
                );
            }
            if c.component_type.is_unknown() {
                result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::UnknownComponentType,
                        format!("Unknown component type '{}'", c.component_type),
                    )
                    .with_path(&path),
                );
            }
            match c.children.nodes() {
                Err(found) => result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::InvalidChildren,
                        format!("Children must be an array, found {}", json_kind(found)),
                    )
                    .with_path(format!("{path}.children")),
                ),
                Ok(nodes) if !nodes.is_empty() && !c.component_type.is_container() => {
                    result.add_warning(
                        ValidationWarning::new(
                            ValidationWarningCode::ChildrenOnLeaf,
                            format!(
                                "'{}' is a {} and does not render children",
                                c.id, c.component_type
                            ),
                        )
                        .with_path(format!("{path}.children")),
                    )
                }
                Ok(_) => {}
            }
        });
        result
    }
}

/// Rule: class names resolve and class definitions are unique
pub struct ClassReferencesRule;

impl ValidationRule for ClassReferencesRule {
    fn name(&self) -> &'static str {
        "class_references"
    }

    fn description(&self) -> &'static str {
        "Validates that attached classes exist and class names are unique"
    }

    fn validate(&self, page: &Page) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let mut defined: HashSet<&str> = HashSet::new();
        for class in &page.classes {
            if !defined.insert(class.name.as_str()) {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::DuplicateClassName,
                        format!("Duplicate class name: '{}'", class.name),
                    )
                    .with_path(format!("classes.{}", class.name)),
                );
            }
        }
        for_each_component(page, |c| {
            for name in &c.class_names {
                if !defined.contains(name.as_str()) {
                    result.add_warning(
                        ValidationWarning::new(
                            ValidationWarningCode::UnknownClass,
                            format!("Class '{}' is not defined", name),
                        )
                        .with_path(format!("{}.classNames", component_path(c))),
                    );
                }
            }
        });
        result
    }
}

/// Rule: token references point at defined tokens
pub struct TokenReferencesRule;

fn collect_token_refs<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    if let Some(r) = TokenRef::parse(value) {
        out.push(r.token_id);
        return;
    }
    match value {
        Value::Object(map) => map.values().for_each(|v| collect_token_refs(v, out)),
        Value::Array(items) => items.iter().for_each(|v| collect_token_refs(v, out)),
        _ => {}
    }
}

impl ValidationRule for TokenReferencesRule {
    fn name(&self) -> &'static str {
        "token_references"
    }

    fn description(&self) -> &'static str {
        "Warns about token references whose token is missing (the fallback value is used)"
    }

    fn validate(&self, page: &Page) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let defined: HashSet<&str> = page.tokens.iter().map(|t| t.id.as_str()).collect();
        for_each_component(page, |c| {
            let mut refs = Vec::new();
            for value in c.props().values() {
                collect_token_refs(value, &mut refs);
            }
            for token in refs {
                if !defined.contains(token) {
                    result.add_warning(
                        ValidationWarning::new(
                            ValidationWarningCode::UnknownToken,
                            format!("Token '{}' is not defined", token),
                        )
                        .with_path(format!("{}.props", component_path(c))),
                    );
                }
            }
        });
        result
    }
}

/// Rule: data connections only on types that repeat, and empty-state
/// component references resolve
pub struct DataConnectionRule;

impl ValidationRule for DataConnectionRule {
    fn name(&self) -> &'static str {
        "data_connections"
    }

    fn description(&self) -> &'static str {
        "Validates databaseConnection placement and empty-state references"
    }

    fn validate(&self, page: &Page) -> ValidationResult {
        let mut result = ValidationResult::ok();
        for_each_component(page, |c| {
            let props = c.props();
            if props.contains_key("databaseConnection")
                && !c.component_type.supports_data_binding()
            {
                result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::UnboundDataConnection,
                        format!(
                            "'{}' is a {}; only sections and grids repeat table rows",
                            c.id, c.component_type
                        ),
                    )
                    .with_path(component_path(c)),
                );
            }
            if let Some(reference) = props
                .get_path(&["emptyState", "componentId"])
                .and_then(Value::as_str)
            {
                if !page.reusable_components.contains_key(reference) {
                    result.add_warning(
                        ValidationWarning::new(
                            ValidationWarningCode::UnknownReusableComponent,
                            format!("Empty state references unknown component '{}'", reference),
                        )
                        .with_path(format!("{}.props.emptyState", component_path(c))),
                    );
                }
            }
        });
        result
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ComponentType, DesignToken, StyleClass};
    use serde_json::json;

    fn valid_page() -> Page {
        Page::new("Home")
            .with_class(StyleClass::new("hero").with_style("padding", 8))
            .with_token(DesignToken::new("color.primary", "#00f"))
            .with_component(
                AppComponent::new("root", ComponentType::Section)
                    .with_class("hero")
                    .with_child(AppComponent::new("t", ComponentType::Text).with_prop(
                        "color",
                        json!({"tokenRef": "color.primary", "value": "#00f"}),
                    )),
            )
    }

    #[test]
    fn test_valid_page() {
        let result = Validator::with_default_rules().validate(&valid_page());
        assert!(result.valid, "{:?}", result.errors);
        assert!(!result.has_warnings(), "{:?}", result.warnings);
        assert!(valid_page().is_valid());
    }

    #[test]
    fn test_duplicate_and_empty_ids() {
        let page = Page::new("Home")
            .with_component(AppComponent::new("a", ComponentType::Text))
            .with_component(AppComponent::new("a", ComponentType::Text))
            .with_component(AppComponent::new("", ComponentType::Text));
        let result = ComponentIdsRule.validate(&page);
        let codes: Vec<_> = result.errors.iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            vec![
                ValidationErrorCode::DuplicateComponentId,
                ValidationErrorCode::EmptyComponentId
            ]
        );
    }

    #[test]
    fn test_invalid_children_and_missing_props() {
        let comp: AppComponent =
            serde_json::from_value(json!({"id": "r", "type": "row", "children": {"x": 1}}))
                .unwrap();
        let page = Page::new("Home").with_component(comp);
        let result = ComponentShapeRule.validate(&page);
        assert!(result.has_errors());
        assert!(result.errors[0].message.contains("object"));
        assert_eq!(result.warnings[0].code, ValidationWarningCode::MissingProps);
    }

    #[test]
    fn test_unknown_references_warn() {
        let page = Page::new("Home").with_component(
            AppComponent::new("g", ComponentType::Text)
                .with_class("ghost")
                .with_prop("color", json!({"tokenRef": "nope", "value": "#000"}))
                .with_prop("databaseConnection", json!({"tableName": "T"})),
        );
        let result = Validator::with_default_rules().validate(&page);
        assert!(result.valid);
        let codes: Vec<_> = result.warnings.iter().map(|w| w.code).collect();
        assert!(codes.contains(&ValidationWarningCode::UnknownClass));
        assert!(codes.contains(&ValidationWarningCode::UnknownToken));
        assert!(codes.contains(&ValidationWarningCode::UnboundDataConnection));
    }

    #[test]
    fn test_to_result_joins_messages() {
        let page = Page::new("").with_component(AppComponent::new("", ComponentType::Text));
        let err = Validator::with_default_rules().validate_result(&page).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("Page name cannot be empty"));
        assert!(text.contains("empty id"));
    }
}
