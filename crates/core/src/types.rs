//! Core types used throughout Weave
//!
//! This module contains the fundamental types shared by the component model,
//! the style engine and the renderer: identifiers, canvas geometry, responsive
//! breakpoints and the render mode.

use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers
// ============================================================================

/// Component identifiers are stable strings chosen by the builder
pub type ComponentId = String;

// ============================================================================
// Geometry Types
// ============================================================================

/// Position on the 2D canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Create a new position
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Create a position at the origin (0, 0)
    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Add an offset to this position
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// Size of an element or menu
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a new size
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Create a zero size
    pub fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }
}

/// Bounding rectangle of a rendered element (client coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub position: Position,
    pub size: Size,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(position: Position, size: Size) -> Self {
        Self { position, size }
    }

    /// Create a rectangle from coordinates and dimensions
    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Position::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Check if a point is contained within this rectangle
    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.position.x
            && point.x <= self.position.x + self.size.width
            && point.y >= self.position.y
            && point.y <= self.position.y + self.size.height
    }

    /// Get the top-left corner
    pub fn top_left(&self) -> Position {
        self.position
    }

    /// Get the bottom-left corner
    pub fn bottom_left(&self) -> Position {
        Position::new(self.position.x, self.position.y + self.size.height)
    }

    /// Get the right edge x coordinate
    pub fn right(&self) -> f32 {
        self.position.x + self.size.width
    }

    /// Get the bottom edge y coordinate
    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.height
    }
}

// ============================================================================
// Breakpoints
// ============================================================================

/// Responsive breakpoint supplied by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl Breakpoint {
    /// Parse a breakpoint name (case-insensitive); unknown names are `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "desktop" | "base" | "default" => Some(Breakpoint::Desktop),
            "tablet" => Some(Breakpoint::Tablet),
            "mobile" | "phone" => Some(Breakpoint::Mobile),
            _ => None,
        }
    }

    /// Key used in per-breakpoint property bags
    pub fn as_str(&self) -> &'static str {
        match self {
            Breakpoint::Desktop => "desktop",
            Breakpoint::Tablet => "tablet",
            Breakpoint::Mobile => "mobile",
        }
    }

    /// Breakpoints whose bags apply at this breakpoint, widest first.
    ///
    /// Narrower bags are applied last so they win per property.
    pub fn cascade(&self) -> &'static [Breakpoint] {
        match self {
            Breakpoint::Desktop => &[Breakpoint::Desktop],
            Breakpoint::Tablet => &[Breakpoint::Desktop, Breakpoint::Tablet],
            Breakpoint::Mobile => &[
                Breakpoint::Desktop,
                Breakpoint::Tablet,
                Breakpoint::Mobile,
            ],
        }
    }

    /// Pick the breakpoint for a viewport width in pixels
    pub fn for_width(width: f32) -> Self {
        if width < 768.0 {
            Breakpoint::Mobile
        } else if width < 1024.0 {
            Breakpoint::Tablet
        } else {
            Breakpoint::Desktop
        }
    }
}

impl std::fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Render Mode
// ============================================================================

/// Whether output is the editable canvas or the published page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Design,
    Preview,
}

impl RenderMode {
    /// Build from the host's `isPreview` flag
    pub fn from_preview_flag(is_preview: bool) -> Self {
        if is_preview {
            RenderMode::Preview
        } else {
            RenderMode::Design
        }
    }

    pub fn is_preview(&self) -> bool {
        matches!(self, RenderMode::Preview)
    }

    pub fn is_design(&self) -> bool {
        matches!(self, RenderMode::Design)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_offset() {
        let pos = Position::new(10.0, 20.0);
        let new_pos = pos.offset(5.0, -10.0);
        assert_eq!(new_pos, Position::new(15.0, 10.0));
    }

    #[test]
    fn test_position_add_sub() {
        let p1 = Position::new(10.0, 20.0);
        let p2 = Position::new(5.0, 5.0);
        assert_eq!(p1 + p2, Position::new(15.0, 25.0));
        assert_eq!(p1 - p2, Position::new(5.0, 15.0));
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::from_xywh(10.0, 10.0, 100.0, 50.0);
        assert!(rect.contains(Position::new(50.0, 30.0)));
        assert!(!rect.contains(Position::new(5.0, 30.0)));
        assert!(!rect.contains(Position::new(150.0, 30.0)));
    }

    #[test]
    fn test_rect_edges() {
        let rect = Rect::from_xywh(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.top_left(), Position::new(10.0, 20.0));
        assert_eq!(rect.bottom_left(), Position::new(10.0, 70.0));
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
    }

    #[test]
    fn test_breakpoint_parse() {
        assert_eq!(Breakpoint::parse("Mobile"), Some(Breakpoint::Mobile));
        assert_eq!(Breakpoint::parse("tablet"), Some(Breakpoint::Tablet));
        assert_eq!(Breakpoint::parse("desktop"), Some(Breakpoint::Desktop));
        assert_eq!(Breakpoint::parse("watch"), None);
    }

    #[test]
    fn test_breakpoint_cascade_narrowest_last() {
        assert_eq!(Breakpoint::Desktop.cascade(), &[Breakpoint::Desktop]);
        assert_eq!(
            Breakpoint::Mobile.cascade().last(),
            Some(&Breakpoint::Mobile)
        );
        assert_eq!(Breakpoint::Tablet.cascade().len(), 2);
    }

    #[test]
    fn test_breakpoint_for_width() {
        assert_eq!(Breakpoint::for_width(375.0), Breakpoint::Mobile);
        assert_eq!(Breakpoint::for_width(800.0), Breakpoint::Tablet);
        assert_eq!(Breakpoint::for_width(1440.0), Breakpoint::Desktop);
    }

    #[test]
    fn test_breakpoint_serde() {
        let json = serde_json::to_string(&Breakpoint::Tablet).unwrap();
        assert_eq!(json, "\"tablet\"");
        let bp: Breakpoint = serde_json::from_str("\"mobile\"").unwrap();
        assert_eq!(bp, Breakpoint::Mobile);
    }

    #[test]
    fn test_render_mode() {
        assert!(RenderMode::from_preview_flag(true).is_preview());
        assert!(RenderMode::from_preview_flag(false).is_design());
        assert_eq!(RenderMode::default(), RenderMode::Design);
    }
}
