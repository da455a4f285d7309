//! Dimension/unit resolution
//!
//! Converts raw numbers, strings, `{value, unit}` objects and token
//! references into CSS length strings. Values that mean "not set" resolve to
//! `None` so a lower-priority source can supply the property instead.

use serde_json::Value;
use weave_ir::{TokenStore, is_deleted, resolve_token_value, value_as_f64};

/// Keywords that stay meaningful when paired with the `auto` unit
const SIZING_KEYWORDS: &[&str] = &["fit-content", "min-content", "max-content"];

/// Units that are relative to the viewport
const VIEWPORT_UNITS: &[&str] = &[
    "vw", "vh", "vmin", "vmax", "dvw", "dvh", "svw", "svh", "lvw", "lvh",
];

/// Which box axis a dimension applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    Width,
    Height,
    #[default]
    Other,
}

impl Axis {
    /// Axis of a camelCase property name
    pub fn of(property: &str) -> Self {
        if crate::css::WIDTH_PROPERTIES.contains(&property) {
            Axis::Width
        } else if crate::css::HEIGHT_PROPERTIES.contains(&property) {
            Axis::Height
        } else {
            Axis::Other
        }
    }
}

/// Options for a single resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionOptions {
    pub is_preview: bool,
    pub locked: bool,
    pub axis: Axis,
    /// Fallback for `--canvas-safe-inset`, in px
    pub canvas_safe_inset: f32,
}

impl Default for DimensionOptions {
    fn default() -> Self {
        Self {
            is_preview: false,
            locked: false,
            axis: Axis::Other,
            canvas_safe_inset: 24.0,
        }
    }
}

impl DimensionOptions {
    pub fn preview() -> Self {
        Self {
            is_preview: true,
            ..Default::default()
        }
    }

    pub fn design() -> Self {
        Self::default()
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_inset(mut self, inset: f32) -> Self {
        self.canvas_safe_inset = inset;
        self
    }
}

/// Format a number without a trailing `.0` (`42.0` → `"42"`)
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        let rounded = (n * 1000.0).round() / 1000.0;
        format!("{}", rounded)
    }
}

/// Resolve a dimension value to a CSS length
pub fn resolve_dimension(value: &Value, opts: &DimensionOptions) -> Option<String> {
    let resolved = match value {
        Value::Null => None,
        Value::Number(n) => n.as_f64().and_then(|n| px(n, opts)),
        Value::String(s) => resolve_str(s, opts),
        Value::Object(obj) => {
            let unit = obj.get("unit").and_then(Value::as_str).unwrap_or("px").trim();
            let inner = obj.get("value").unwrap_or(&Value::Null);
            resolve_value_unit(inner, unit, opts)
        }
        _ => None,
    }?;
    Some(clamp(resolved, opts))
}

/// Resolve through the token store first, then as a dimension
pub fn resolve_dimension_with_tokens(
    value: &Value,
    opts: &DimensionOptions,
    tokens: &dyn TokenStore,
) -> Option<String> {
    resolve_dimension(&resolve_token_value(value, tokens), opts)
}

fn px(n: f64, opts: &DimensionOptions) -> Option<String> {
    if n == 0.0 && !opts.locked {
        None
    } else {
        Some(format!("{}px", format_number(n)))
    }
}

fn resolve_str(s: &str, opts: &DimensionOptions) -> Option<String> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("auto") || is_deleted(&Value::String(s.to_string())) {
        return None;
    }
    match s.parse::<f64>() {
        Ok(n) => px(n, opts),
        Err(_) => Some(s.to_string()),
    }
}

fn resolve_value_unit(inner: &Value, unit: &str, opts: &DimensionOptions) -> Option<String> {
    if unit.eq_ignore_ascii_case("auto") {
        return inner
            .as_str()
            .map(str::trim)
            .filter(|v| SIZING_KEYWORDS.contains(v))
            .map(str::to_string);
    }
    match inner {
        Value::String(s) if SIZING_KEYWORDS.contains(&s.trim()) => Some(s.trim().to_string()),
        Value::String(s) if s.trim().is_empty() => None,
        _ => {
            let n = value_as_f64(inner)?;
            if n == 0.0 && !opts.locked {
                return None;
            }
            Some(format!("{}{}", format_number(n), unit))
        }
    }
}

fn is_relative(css: &str) -> bool {
    let css = css.trim();
    if css.ends_with('%') {
        return css[..css.len() - 1].trim().parse::<f64>().is_ok();
    }
    VIEWPORT_UNITS.iter().any(|unit| {
        css.strip_suffix(unit)
            .map(|num| num.trim().parse::<f64>().is_ok())
            .unwrap_or(false)
    })
}

/// Keep percentage/viewport sizes inside the editable canvas
fn clamp(css: String, opts: &DimensionOptions) -> String {
    if opts.is_preview || opts.axis == Axis::Other || !is_relative(&css) {
        return css;
    }
    format!(
        "min({}, calc(100% - var(--canvas-safe-inset, {}px)))",
        css,
        format_number(opts.canvas_safe_inset as f64)
    )
}
