//! Error types for Weave
//!
//! This module provides unified error handling across the rendering core:
//! malformed component data, style and binding resolution, condition and
//! expression evaluation, action execution, data fetching, IO and
//! serialization.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Weave
#[derive(Debug, Error)]
pub enum WeaveError {
    // ========================================================================
    // Component Tree Errors
    // ========================================================================
    /// A component node is missing required data (e.g. `props`)
    #[error("Malformed component '{id}': {message}")]
    MalformedComponent { id: String, message: String },

    /// A component's `children` value is not an array
    #[error("Invalid children for component '{id}': expected an array, found {found}")]
    InvalidChildren { id: String, found: String },

    /// Component lookup failed
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// A drop could not be applied
    #[error("Invalid drop: {0}")]
    InvalidDrop(String),

    // ========================================================================
    // Style Errors
    // ========================================================================
    /// A style class referenced by a component does not exist
    #[error("Style class not found: {0}")]
    ClassNotFound(String),

    /// A design token referenced by a component does not exist
    #[error("Design token not found: {0}")]
    TokenNotFound(String),

    /// A style value could not be interpreted
    #[error("Invalid style value for '{property}': {message}")]
    InvalidStyleValue { property: String, message: String },

    // ========================================================================
    // Binding & Evaluation Errors
    // ========================================================================
    /// A `{{...}}` binding could not be resolved
    #[error("Failed to resolve binding '{expression}': {message}")]
    Binding { expression: String, message: String },

    /// A visibility condition could not be evaluated
    #[error("Condition evaluation failed ({operator}): {message}")]
    Condition { operator: String, message: String },

    /// An expression could not be parsed or evaluated
    #[error("Expression error at position {position}: {message}")]
    Expression { position: usize, message: String },

    // ========================================================================
    // Action Errors
    // ========================================================================
    /// An action or flow node failed
    #[error("Action '{action}' failed: {message}")]
    Action { action: String, message: String },

    /// An HTTP request issued by an action failed
    #[error("HTTP request to '{url}' failed: {message}")]
    Http { url: String, message: String },

    /// A variable referenced by an action does not exist or has the wrong type
    #[error("Variable error for '{name}': {message}")]
    Variable { name: String, message: String },

    // ========================================================================
    // Data Errors
    // ========================================================================
    /// A connected table could not be found
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Fetching rows for a dynamic section or grid failed
    #[error("Data fetch failed for '{table}': {message}")]
    DataFetch { table: String, message: String },

    // ========================================================================
    // IO & Serialization Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Invalid page file format
    #[error("Invalid page file format: {0}")]
    InvalidPageFormat(String),

    /// Page file not found
    #[error("Page not found at path: {0}")]
    PageNotFound(PathBuf),

    // ========================================================================
    // Validation & Configuration Errors
    // ========================================================================
    /// General validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl WeaveError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        WeaveError::Validation(msg.into())
    }

    /// Create a malformed component error
    pub fn malformed(id: impl Into<String>, msg: impl Into<String>) -> Self {
        WeaveError::MalformedComponent {
            id: id.into(),
            message: msg.into(),
        }
    }

    /// Create a binding resolution error
    pub fn binding(expression: impl Into<String>, msg: impl Into<String>) -> Self {
        WeaveError::Binding {
            expression: expression.into(),
            message: msg.into(),
        }
    }

    /// Create a condition evaluation error
    pub fn condition(operator: impl Into<String>, msg: impl Into<String>) -> Self {
        WeaveError::Condition {
            operator: operator.into(),
            message: msg.into(),
        }
    }

    /// Create an expression error
    pub fn expression(position: usize, msg: impl Into<String>) -> Self {
        WeaveError::Expression {
            position,
            message: msg.into(),
        }
    }

    /// Create an action failure
    pub fn action(action: impl Into<String>, msg: impl Into<String>) -> Self {
        WeaveError::Action {
            action: action.into(),
            message: msg.into(),
        }
    }

    /// Create a variable error
    pub fn variable(name: impl Into<String>, msg: impl Into<String>) -> Self {
        WeaveError::Variable {
            name: name.into(),
            message: msg.into(),
        }
    }

    /// Create a data fetch error
    pub fn data_fetch(table: impl Into<String>, msg: impl Into<String>) -> Self {
        WeaveError::DataFetch {
            table: table.into(),
            message: msg.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        WeaveError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        WeaveError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error describes bad component data
    pub fn is_component_error(&self) -> bool {
        matches!(
            self,
            WeaveError::MalformedComponent { .. }
                | WeaveError::InvalidChildren { .. }
                | WeaveError::ComponentNotFound(_)
                | WeaveError::InvalidDrop(_)
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            WeaveError::ComponentNotFound(_)
                | WeaveError::ClassNotFound(_)
                | WeaveError::TokenNotFound(_)
                | WeaveError::TableNotFound(_)
                | WeaveError::PageNotFound(_)
        )
    }

    /// Check if this error came from evaluating a binding, condition or expression
    pub fn is_evaluation_error(&self) -> bool {
        matches!(
            self,
            WeaveError::Binding { .. }
                | WeaveError::Condition { .. }
                | WeaveError::Expression { .. }
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            WeaveError::Io(_) | WeaveError::FileRead { .. } | WeaveError::FileWrite { .. }
        )
    }
}

/// Result type alias using WeaveError
pub type WeaveResult<T> = Result<T, WeaveError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> WeaveResult<T>;
}

impl<T, E: Into<WeaveError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> WeaveResult<T> {
        self.map_err(|e| {
            let err: WeaveError = e.into();
            WeaveError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_component_error() {
        let err = WeaveError::malformed("btn-1", "missing props");
        assert!(err.is_component_error());
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Malformed component 'btn-1': missing props"
        );
    }

    #[test]
    fn test_invalid_children_error() {
        let err = WeaveError::InvalidChildren {
            id: "row-1".to_string(),
            found: "string".to_string(),
        };
        assert!(err.is_component_error());
        assert_eq!(
            err.to_string(),
            "Invalid children for component 'row-1': expected an array, found string"
        );
    }

    #[test]
    fn test_not_found_errors() {
        let err = WeaveError::TableNotFound("Products".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Table not found: Products");

        let err = WeaveError::ClassNotFound("hero".to_string());
        assert!(err.is_not_found());
    }

    #[test]
    fn test_evaluation_errors() {
        let err = WeaveError::condition("greaterThan", "'abc' is not a number");
        assert!(err.is_evaluation_error());
        assert_eq!(
            err.to_string(),
            "Condition evaluation failed (greaterThan): 'abc' is not a number"
        );

        let err = WeaveError::expression(4, "unexpected token ')'");
        assert!(err.is_evaluation_error());
        assert_eq!(
            err.to_string(),
            "Expression error at position 4: unexpected token ')'"
        );
    }

    #[test]
    fn test_action_error() {
        let err = WeaveError::action("apiCall", "status 500");
        assert!(!err.is_evaluation_error());
        assert_eq!(err.to_string(), "Action 'apiCall' failed: status 500");
    }

    #[test]
    fn test_error_with_context() {
        let err = WeaveError::with_context("Loading page", "Permission denied");
        assert_eq!(err.to_string(), "Loading page: Permission denied");
    }

    #[test]
    fn test_result_ext_context() {
        let res: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = res.with_context("Reading tables").unwrap_err();
        assert_eq!(err.to_string(), "Reading tables: IO error: missing");
    }

    #[test]
    fn test_io_error_classification() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WeaveError = io_err.into();
        assert!(err.is_io());
    }
}
