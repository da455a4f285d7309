//! # Weave Render
//!
//! Component renderer for Weave.
//!
//! This crate walks an app component tree and produces a platform-agnostic
//! virtual DOM for either the design canvas or the live preview, together
//! with everything that reacts to it afterwards.
//!
//! ## Features
//!
//! - **Rendering**: one strategy per component type, merged styles, class hooks
//! - **Bindings**: `{{field}}` substitution from row data and variables
//! - **Visibility**: conditional display, authoritative in preview
//! - **Data repeaters**: async table fetches, pagination and empty states
//! - **Interactions**: selection, hover, context menu, in-place text editing,
//!   widget state and drag-and-drop
//! - **Actions**: flow graphs and legacy action lists, preview only
//!

// ============================================================================
// Modules
// ============================================================================

pub mod actions;
pub mod binding;
pub mod config;
pub mod drop_zone;
pub mod expression;
pub mod html;
pub mod http;
pub mod interactions;
pub mod renderer;
pub mod repeater;
pub mod vdom;
pub mod visibility;

mod widgets;

// ============================================================================
// Re-exports
// ============================================================================

pub use actions::{
    ActionHost, Clipboard, Flow, FlowEdge, FlowExecutor, FlowNode, HttpClient, HttpRequest,
    HttpResponse, LegacyAction, Navigator, NoticeLevel, Notifier, StepOutcome, StepRecord,
    declared_triggers, event_for_trigger, legacy_actions,
};
pub use binding::{BindingScope, has_binding, value_to_text};
pub use config::RenderConfig;
pub use drop_zone::{DragItem, DropRequest, apply_drop, plan_drop};
pub use html::{render_document, render_to_html};
pub use http::ReqwestClient;
pub use interactions::{
    CanvasViewport, EventData, InteractionController, Modifiers, TextEditState, UiState,
    WidgetState,
};
pub use renderer::{RenderOptions, RenderSession, Renderer};
pub use repeater::{EmptyState, Pagination, RepeaterRegistry, RepeaterView};
pub use vdom::{DragSource, DropTarget, EventKind, Handler, HandlerAction, VElement, VNode};
pub use visibility::{Visibility, evaluate_visibility};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
