//! # Weave Core
//!
//! Core types, traits, and error handling for the Weave rendering core.
//!
//! This crate provides the foundational building blocks used throughout
//! the Weave workspace, including:
//!
//! - **Types**: Geometry primitives (Position, Size, Rect), responsive
//!   breakpoints and the design/preview render mode
//! - **Traits**: Common behaviors like `Validatable` and `Persistable`
//! - **Errors**: Unified error handling with `WeaveError` and `WeaveResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{ResultExt, WeaveError, WeaveResult};
pub use traits::{Persistable, Validatable};
pub use types::{Breakpoint, ComponentId, Position, Rect, RenderMode, Size};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
