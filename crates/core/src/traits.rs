//! Core traits for Weave
//!
//! This module defines the fundamental traits that data types throughout
//! the workspace implement to provide consistent behavior for validation
//! and persistence.

use crate::error::{WeaveError, WeaveResult};
use serde::{Serialize, de::DeserializeOwned};

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return validation errors if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use weave_core::{Validatable, WeaveResult, WeaveError};
///
/// struct Node {
///     id: String,
/// }
///
/// impl Validatable for Node {
///     fn validate(&self) -> WeaveResult<()> {
///         if self.id.is_empty() {
///             return Err(WeaveError::validation("Component id cannot be empty"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or a `WeaveError` describing the problem.
    fn validate(&self) -> WeaveResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

// ============================================================================
// Persistable Trait
// ============================================================================

/// Trait for types that can be serialized to and deserialized from files
///
/// Page documents, table fixtures and variable snapshots implement this to
/// be saved and loaded as JSON.
pub trait Persistable: Serialize + DeserializeOwned + Sized {
    /// Get the file extension for this type (without the dot)
    fn file_extension() -> &'static str;

    /// Get the schema version for migration purposes
    fn schema_version() -> u32 {
        1
    }

    /// Save to a JSON string
    fn to_json(&self) -> WeaveResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Load from a JSON string
    fn from_json(json: &str) -> WeaveResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Save to a file
    fn save_to_file(&self, path: &std::path::Path) -> WeaveResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| WeaveError::FileWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from a file
    fn load_from_file(path: &std::path::Path) -> WeaveResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| WeaveError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    struct TestValidatable {
        valid: bool,
    }

    impl Validatable for TestValidatable {
        fn validate(&self) -> WeaveResult<()> {
            if self.valid {
                Ok(())
            } else {
                Err(WeaveError::validation("Invalid state"))
            }
        }
    }

    #[test]
    fn test_validatable_trait() {
        let valid = TestValidatable { valid: true };
        assert!(valid.is_valid());
        assert!(valid.validation_errors().is_empty());

        let invalid = TestValidatable { valid: false };
        assert!(!invalid.is_valid());
        assert_eq!(
            invalid.validation_errors(),
            vec!["Validation error: Invalid state".to_string()]
        );
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Snapshot {
        name: String,
        count: u32,
    }

    impl Persistable for Snapshot {
        fn file_extension() -> &'static str {
            "snap"
        }
    }

    #[test]
    fn test_persistable_json_round() {
        let snap = Snapshot {
            name: "vars".to_string(),
            count: 3,
        };
        let json = snap.to_json().unwrap();
        assert!(json.contains("\"count\": 3"));
        assert_eq!(Snapshot::from_json(&json).unwrap(), snap);
        assert_eq!(Snapshot::schema_version(), 1);
    }

    #[test]
    fn test_persistable_missing_file() {
        let err = Snapshot::load_from_file(std::path::Path::new("/nonexistent/x.snap"))
            .unwrap_err();
        assert!(err.is_io());
    }
}
