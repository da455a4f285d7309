//! Style merge engine
//!
//! Computes the final CSS value of every property a component touches.
//! Sources, per property and highest first:
//!
//! 1. locked own value or a breakpoint override (blank means unset)
//! 2. class value in class mode, or the own value outside it
//! 3. inherited value (typographic properties only)
//! 4. per-type default
//!
//! Background inputs follow the same chain and are then handed to the
//! compositor as one unit.

use crate::background::{BackgroundInput, compose_background};
use crate::css::{
    BACKGROUND_KEYS, StyleMap, is_background_key, is_critical_layout, is_inheritable, is_length,
    is_unitless, lock_shorthand,
};
use crate::defaults::type_defaults;
use crate::dimension::{Axis, DimensionOptions, format_number, resolve_dimension};
use crate::flatten::{flatten_style, has_prop_styles};
use crate::inheritance::{ExplicitSources, InheritedStyle, propagate};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use weave_ir::{AppComponent, Breakpoint, RenderMode, ResolvedClasses, TokenStore, is_blank, resolve_token_value};

/// Which source supplied a property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleSource {
    Locked,
    Override,
    Class,
    Inline,
    Inherited,
    Default,
}

/// Inputs shared by every property of one merge
pub struct MergeContext<'a> {
    pub breakpoint: Breakpoint,
    pub mode: RenderMode,
    pub classes: &'a ResolvedClasses,
    pub inherited: &'a InheritedStyle,
    pub tokens: &'a dyn TokenStore,
    pub canvas_safe_inset: f32,
}

impl<'a> MergeContext<'a> {
    pub fn new(
        mode: RenderMode,
        breakpoint: Breakpoint,
        classes: &'a ResolvedClasses,
        inherited: &'a InheritedStyle,
        tokens: &'a dyn TokenStore,
    ) -> Self {
        Self {
            breakpoint,
            mode,
            classes,
            inherited,
            tokens,
            canvas_safe_inset: DimensionOptions::default().canvas_safe_inset,
        }
    }

    pub fn with_inset(mut self, inset: f32) -> Self {
        self.canvas_safe_inset = inset;
        self
    }
}

/// Result of a merge
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedStyle {
    pub style: StyleMap,
    /// Whether attached classes put the node in class mode
    pub class_mode: bool,
    pub sources: BTreeMap<String, StyleSource>,
    /// Context to pass to the node's children
    pub inherited: InheritedStyle,
}

impl MergedStyle {
    pub fn source(&self, property: &str) -> Option<StyleSource> {
        self.sources.get(property).copied()
    }
}

struct Sources {
    own: Map<String, Value>,
    overrides: Map<String, Value>,
    classes: Map<String, Value>,
    defaults: Map<String, Value>,
    class_mode: bool,
    ai_generated: bool,
}

impl Sources {
    /// Candidate values in precedence order
    fn candidates<'s>(
        &'s self,
        property: &str,
        locked: bool,
        inherited: &'s InheritedStyle,
    ) -> Vec<(&'s Value, StyleSource)> {
        if locked {
            let source = if self.overrides.contains_key(property) {
                StyleSource::Override
            } else {
                StyleSource::Locked
            };
            return self.own.get(property).map(|v| (v, source)).into_iter().collect();
        }

        let mut out = Vec::with_capacity(4);
        if self.class_mode {
            if let Some(v) = self.classes.get(property) {
                out.push((v, StyleSource::Class));
            }
            if self.ai_generated && is_critical_layout(property) {
                if let Some(v) = self.own.get(property) {
                    out.push((v, StyleSource::Inline));
                }
            }
        } else if let Some(v) = self.own.get(property) {
            out.push((v, StyleSource::Inline));
        }
        if is_inheritable(property) {
            if let Some(v) = inherited.value(property) {
                out.push((v, StyleSource::Inherited));
            }
        }
        if let Some(v) = self.defaults.get(property) {
            out.push((v, StyleSource::Default));
        }
        out
    }
}

/// Merge the style of one component
pub fn merge_style(ctx: &MergeContext<'_>, component: &AppComponent) -> MergedStyle {
    let props = component.props();

    // Legacy flat `style` only counts when props carry no style of their own
    let mut own = if has_prop_styles(props) {
        flatten_style(props)
    } else {
        component
            .style
            .as_ref()
            .map(flatten_style)
            .unwrap_or_default()
    };
    let overrides = flatten_style(&component.overrides_at(ctx.breakpoint));
    for (k, v) in &overrides {
        own.insert(k.clone(), v.clone());
    }

    let sources = Sources {
        own,
        overrides,
        classes: flatten_style(&ctx.classes.values),
        defaults: type_defaults(&component.component_type, props, ctx.tokens),
        class_mode: ctx.classes.has_styles(),
        ai_generated: props.is_ai_generated(),
    };
    let is_locked = |property: &str| {
        props.is_locked(property)
            || lock_shorthand(property).is_some_and(|s| props.is_locked(s))
            || sources.overrides.contains_key(property)
    };

    let mut properties: BTreeSet<&str> = BTreeSet::new();
    properties.extend(sources.own.keys().map(String::as_str));
    properties.extend(sources.classes.keys().map(String::as_str));
    properties.extend(sources.defaults.keys().map(String::as_str));
    properties.extend(ctx.inherited.iter().map(|(k, _)| k));

    let mut merged = MergedStyle {
        class_mode: sources.class_mode,
        ..Default::default()
    };

    for property in properties.iter().copied().filter(|p| !is_background_key(p)) {
        let locked = is_locked(property);
        let chosen = sources
            .candidates(property, locked, ctx.inherited)
            .into_iter()
            .find_map(|(value, source)| {
                css_value(ctx, property, value, locked).map(|css| (css, source))
            });
        if let Some((css, source)) = chosen {
            merged.style.set(property, css);
            merged.sources.insert(property.to_string(), source);
        }
    }

    let mut background = Map::new();
    for key in BACKGROUND_KEYS {
        let locked = is_locked(key);
        let chosen = sources
            .candidates(key, locked, ctx.inherited)
            .into_iter()
            .find(|(value, _)| !is_blank(value));
        if let Some((value, source)) = chosen {
            background.insert(key.to_string(), value.clone());
            merged.sources.insert(key.to_string(), source);
        }
    }
    let input = BackgroundInput::from_map(&background);
    if !input.is_empty() {
        compose_background(&input, ctx.tokens).apply_to(&mut merged.style);
    }

    merged.inherited = propagate(
        ctx.inherited,
        &ExplicitSources {
            component_id: &component.id,
            own: &sources.own,
            classes: &sources.classes,
            class_mode: sources.class_mode,
            is_locked: &is_locked,
        },
    );

    tracing::debug!(
        component = %component.id,
        class_mode = merged.class_mode,
        properties = merged.style.len(),
        "merged style"
    );
    merged
}

/// Convert one raw value to CSS; `None` means "try the next source"
fn css_value(ctx: &MergeContext<'_>, property: &str, value: &Value, locked: bool) -> Option<String> {
    let value = resolve_token_value(value, ctx.tokens);
    if is_length(property) {
        let opts = DimensionOptions {
            is_preview: ctx.mode.is_preview(),
            locked,
            axis: Axis::of(property),
            canvas_safe_inset: ctx.canvas_safe_inset,
        };
        return resolve_dimension(&value, &opts);
    }
    if is_blank(&value) {
        return None;
    }
    match &value {
        Value::Number(n) => {
            let n = n.as_f64()?;
            if property == "opacity" && n > 1.0 {
                Some(format_number(n / 100.0))
            } else {
                Some(format_number(n))
            }
        }
        Value::String(s) => Some(s.trim().to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(obj) if obj.contains_key("value") && !is_unitless(property) => {
            resolve_dimension(&value, &DimensionOptions::default().with_locked(locked))
        }
        Value::Object(obj) => obj.get("value").and_then(|v| match v {
            Value::Number(n) => n.as_f64().map(format_number),
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }),
        _ => None,
    }
}
