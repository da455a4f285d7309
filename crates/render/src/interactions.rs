//! Interaction controller
//!
//! Routes canvas events into the host's selection store and component
//! updater, and owns the transient UI state the renderer reads back:
//! per-widget state (tabs, accordions, carousels, modals, dropdowns, the
//! navbar menu, repeater pages) and the in-place text editing session.
//! Design-only handlers are no-ops in preview mode.

use crate::vdom::HandlerAction;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use weave_core::{Position, Rect, WeaveResult};
use weave_ir::{
    AppComponent, ComponentPatch, ComponentUpdater, ContextMenuRequest, Props, RenderMode,
    SelectionStore,
};

// ============================================================================
// UI state
// ============================================================================

/// Transient state of one interactive widget
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetState {
    pub active_tab: usize,
    pub open_items: BTreeSet<usize>,
    pub slide: usize,
    pub modal_open: bool,
    pub dropdown_open: bool,
    pub nav_menu_open: bool,
    /// Current repeater page, 1-based (0 = first page)
    pub page: usize,
}

impl WidgetState {
    pub fn current_page(&self) -> usize {
        self.page.max(1)
    }
}

/// In-place text editing session
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TextEditState {
    #[default]
    Viewing,
    Editing {
        id: String,
        draft: String,
        original: String,
    },
}

impl TextEditState {
    pub fn editing_id(&self) -> Option<&str> {
        match self {
            TextEditState::Editing { id, .. } => Some(id),
            TextEditState::Viewing => None,
        }
    }
}

/// UI state shared by the renderer and the controller
#[derive(Debug, Default)]
pub struct UiState {
    widgets: RefCell<HashMap<String, WidgetState>>,
    edit: RefCell<TextEditState>,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State of a widget (default when never touched)
    pub fn widget(&self, id: &str) -> WidgetState {
        self.widgets.borrow().get(id).cloned().unwrap_or_default()
    }

    /// Mutate a widget's state; `init` seeds it when never touched
    pub fn update_widget_or(
        &self,
        id: &str,
        init: impl FnOnce() -> WidgetState,
        f: impl FnOnce(&mut WidgetState),
    ) {
        let mut widgets = self.widgets.borrow_mut();
        f(widgets.entry(id.to_string()).or_insert_with(init));
    }

    pub fn update_widget(&self, id: &str, f: impl FnOnce(&mut WidgetState)) {
        self.update_widget_or(id, WidgetState::default, f);
    }

    pub fn edit_state(&self) -> TextEditState {
        self.edit.borrow().clone()
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.edit.borrow().editing_id() == Some(id)
    }

    /// Forget widgets that no longer exist
    pub fn retain_widgets(&self, keep: impl Fn(&str) -> bool) {
        self.widgets.borrow_mut().retain(|id, _| keep(id));
    }
}

// ============================================================================
// Events
// ============================================================================

/// Modifier keys held during a click
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// The canvas scroll container, in client coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasViewport {
    pub rect: Rect,
    pub scroll: Position,
}

/// Event details a host passes along with a handler action
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventData {
    pub modifiers: Modifiers,
    pub cursor: Position,
    /// Bounding box of the element the event fired on
    pub element: Option<Rect>,
    pub canvas: Option<CanvasViewport>,
    pub key: Option<String>,
    pub text: Option<String>,
}

/// Context menu position: below the element's bottom-left corner, in canvas
/// content coordinates, clamped inside the visible canvas
pub fn snap_context_menu(
    cursor: Position,
    element: Option<Rect>,
    canvas: Option<CanvasViewport>,
) -> Position {
    let (Some(element), Some(canvas)) = (element, canvas) else {
        return cursor;
    };
    let anchor = element.bottom_left();
    let x = anchor.x - canvas.rect.position.x + canvas.scroll.x;
    let y = anchor.y - canvas.rect.position.y + canvas.scroll.y;
    Position::new(
        x.clamp(canvas.scroll.x, canvas.scroll.x + canvas.rect.size.width),
        y.clamp(canvas.scroll.y, canvas.scroll.y + canvas.rect.size.height),
    )
}

// ============================================================================
// Controller
// ============================================================================

pub struct InteractionController<'a> {
    mode: RenderMode,
    state: &'a UiState,
    selection: &'a dyn SelectionStore,
    updater: &'a dyn ComponentUpdater,
}

impl<'a> InteractionController<'a> {
    pub fn new(
        mode: RenderMode,
        state: &'a UiState,
        selection: &'a dyn SelectionStore,
        updater: &'a dyn ComponentUpdater,
    ) -> Self {
        Self {
            mode,
            state,
            selection,
            updater,
        }
    }

    /// Select on click; a modifier toggles the id in the selection
    pub fn click(&self, id: &str, modifiers: Modifiers) {
        if self.mode.is_preview() {
            return;
        }
        let mut selected = self.selection.selected_ids();
        if modifiers.any() {
            if let Some(pos) = selected.iter().position(|s| s == id) {
                selected.remove(pos);
            } else {
                selected.push(id.to_string());
            }
        } else {
            selected = vec![id.to_string()];
        }
        tracing::debug!(component = id, count = selected.len(), "selection changed");
        self.selection.set_selection(selected);
        self.selection.open_properties_panel(id);
    }

    pub fn hover_enter(&self, id: &str) {
        if self.mode.is_design() {
            self.selection.set_hovered(Some(id.to_string()));
        }
    }

    pub fn hover_leave(&self, id: &str) {
        if self.mode.is_design() && self.selection.hovered_id().as_deref() == Some(id) {
            self.selection.set_hovered(None);
        }
    }

    pub fn context_menu(
        &self,
        id: &str,
        cursor: Position,
        element: Option<Rect>,
        canvas: Option<CanvasViewport>,
    ) {
        if self.mode.is_preview() {
            return;
        }
        self.selection.open_context_menu(ContextMenuRequest {
            component_id: id.to_string(),
            position: snap_context_menu(cursor, element, canvas),
        });
    }

    // ------------------------------------------------------------------------
    // Text editing
    // ------------------------------------------------------------------------

    /// Enter editing on double-click; returns whether editing started
    pub fn begin_edit(&self, component: &AppComponent) -> bool {
        let props = component.props();
        if self.mode.is_preview() || props.is_component_locked() {
            return false;
        }
        let content = props.content().unwrap_or_default().to_string();
        *self.state.edit.borrow_mut() = TextEditState::Editing {
            id: component.id.clone(),
            draft: content.clone(),
            original: content,
        };
        true
    }

    pub fn edit_input(&self, text: &str) {
        if let TextEditState::Editing { draft, .. } = &mut *self.state.edit.borrow_mut() {
            *draft = text.to_string();
        }
    }

    /// Enter (without shift) commits, Escape cancels
    pub fn key_down(&self, key: &str, shift: bool) -> WeaveResult<()> {
        match key {
            "Enter" if !shift => self.commit_edit(),
            "Escape" => {
                self.cancel_edit();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn blur(&self) -> WeaveResult<()> {
        self.commit_edit()
    }

    /// Write the draft back through the updater and return to viewing.
    ///
    /// A failed update leaves the editor open with the draft intact.
    pub fn commit_edit(&self) -> WeaveResult<()> {
        let previous = std::mem::take(&mut *self.state.edit.borrow_mut());
        if let TextEditState::Editing { id, draft, original } = previous {
            if draft != original {
                let patch = ComponentPatch::props(Props::new().with("content", draft.clone()));
                if let Err(err) = self.updater.update_component(&id, patch) {
                    tracing::warn!(component = %id, error = %err, "text edit not committed");
                    *self.state.edit.borrow_mut() = TextEditState::Editing { id, draft, original };
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    pub fn cancel_edit(&self) {
        *self.state.edit.borrow_mut() = TextEditState::Viewing;
    }

    // ------------------------------------------------------------------------
    // Widget state
    // ------------------------------------------------------------------------

    pub fn select_tab(&self, id: &str, index: usize) {
        self.state.update_widget(id, |w| w.active_tab = index);
    }

    pub fn toggle_accordion_item(&self, id: &str, index: usize) {
        self.state.update_widget(id, |w| {
            if !w.open_items.remove(&index) {
                w.open_items.insert(index);
            }
        });
    }

    /// Move the carousel, wrapping at both ends
    pub fn step_carousel(&self, id: &str, delta: i32, count: usize) {
        if count == 0 {
            return;
        }
        self.state.update_widget(id, |w| {
            let next = (w.slide as i64 + delta as i64).rem_euclid(count as i64);
            w.slide = next as usize;
        });
    }

    pub fn set_modal_open(&self, id: &str, open: bool) {
        self.state.update_widget(id, |w| w.modal_open = open);
    }

    pub fn toggle_dropdown(&self, id: &str) {
        self.state.update_widget(id, |w| w.dropdown_open = !w.dropdown_open);
    }

    pub fn toggle_nav_menu(&self, id: &str) {
        self.state.update_widget(id, |w| w.nav_menu_open = !w.nav_menu_open);
    }

    pub fn set_page(&self, id: &str, page: usize) {
        self.state.update_widget(id, |w| w.page = page.max(1));
    }

    /// Route a declared handler action; returns false for actions the
    /// controller does not own (flows)
    pub fn dispatch(
        &self,
        action: &HandlerAction,
        event: &EventData,
        lookup: &dyn Fn(&str) -> Option<AppComponent>,
    ) -> WeaveResult<bool> {
        match action {
            HandlerAction::Select { id } => self.click(id, event.modifiers),
            HandlerAction::HoverEnter { id } => self.hover_enter(id),
            HandlerAction::HoverLeave { id } => self.hover_leave(id),
            HandlerAction::ContextMenu { id } => {
                self.context_menu(id, event.cursor, event.element, event.canvas)
            }
            HandlerAction::BeginTextEdit { id } => {
                if let Some(component) = lookup(id) {
                    self.begin_edit(&component);
                }
            }
            HandlerAction::TextEditInput { .. } => {
                if let Some(text) = &event.text {
                    self.edit_input(text);
                }
            }
            HandlerAction::TextEditKey { .. } => {
                if let Some(key) = &event.key {
                    self.key_down(key, event.modifiers.shift)?;
                }
            }
            HandlerAction::CommitTextEdit { .. } => self.blur()?,
            HandlerAction::SelectTab { id, index } => self.select_tab(id, *index),
            HandlerAction::ToggleAccordionItem { id, index } => self.toggle_accordion_item(id, *index),
            HandlerAction::StepCarousel { id, delta, count } => self.step_carousel(id, *delta, *count),
            HandlerAction::SetModalOpen { id, open } => self.set_modal_open(id, *open),
            HandlerAction::ToggleDropdown { id } => self.toggle_dropdown(id),
            HandlerAction::ToggleNavMenu { id } => self.toggle_nav_menu(id),
            HandlerAction::SetRepeaterPage { id, page } => self.set_page(id, *page),
            HandlerAction::RunFlow { .. } => return Ok(false),
        }
        Ok(true)
    }
}
