//! # Weave Style
//!
//! Style engine for Weave.
//!
//! This crate turns a component's raw style inputs (own props, attached
//! classes, breakpoint overrides, inherited typography and type defaults)
//! into the final CSS property map the renderer emits.
//!
//! ## Features
//!
//! - **Dimension resolution**: numbers, strings and `{value, unit}` objects to CSS lengths
//! - **Style merging**: per-property precedence with locks and class mode
//! - **Layered backgrounds**: image, gradient and fill layers with opacity and order
//! - **Inheritance**: explicit typography passed from parent to children
//!

// ============================================================================
// Modules
// ============================================================================

pub mod background;
pub mod color;
pub mod css;
pub mod defaults;
pub mod dimension;
pub mod flatten;
pub mod inheritance;
pub mod merge;

// ============================================================================
// Re-exports
// ============================================================================

pub use background::{BackgroundInput, ComposedBackground, LayerKind, compose_background};
pub use color::Rgba;
pub use css::{StyleMap, css_property_name};
pub use defaults::{heading_level, type_defaults};
pub use dimension::{Axis, DimensionOptions, format_number, resolve_dimension};
pub use flatten::{flatten_style, has_prop_styles};
pub use inheritance::{InheritOrigin, InheritSource, InheritedStyle, InheritedValue};
pub use merge::{MergeContext, MergedStyle, StyleSource, merge_style};
