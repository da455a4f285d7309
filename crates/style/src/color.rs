//! Colour parsing and opacity math

use crate::dimension::format_number;
use regex::Regex;
use std::sync::LazyLock;

static COLOR_STOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#[0-9a-fA-F]{3,8}\b|rgba?\([^)]*\)").expect("colour stop pattern is valid")
});

/// An sRGB colour with alpha in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba {
        r: 255,
        g: 255,
        b: 255,
        a: 1.0,
    };

    /// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()` and `rgba()`
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = s.to_ascii_lowercase();
        let body = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let parts: Vec<&str> = body
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() < 3 {
            return None;
        }
        let channel = |p: &str| -> Option<u8> {
            let v = match p.strip_suffix('%') {
                Some(pct) => pct.parse::<f64>().ok()? * 2.55,
                None => p.parse::<f64>().ok()?,
            };
            Some(v.round().clamp(0.0, 255.0) as u8)
        };
        let a = match parts.get(3) {
            Some(p) => match p.strip_suffix('%') {
                Some(pct) => pct.parse::<f64>().ok()? / 100.0,
                None => p.parse::<f64>().ok()?,
            },
            None => 1.0,
        };
        Some(Self {
            r: channel(parts[0])?,
            g: channel(parts[1])?,
            b: channel(parts[2])?,
            a: a.clamp(0.0, 1.0),
        })
    }

    /// Multiply alpha by a factor in `0.0..=1.0`
    pub fn with_alpha_factor(self, factor: f64) -> Self {
        Self {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn to_css(&self) -> String {
        format!(
            "rgba({},{},{},{})",
            self.r,
            self.g,
            self.b,
            format_number(self.a)
        )
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expand = |c: &str| u8::from_str_radix(&c.repeat(2), 16).ok();
    let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 | 4 => Some(Rgba {
            r: expand(&hex[0..1])?,
            g: expand(&hex[1..2])?,
            b: expand(&hex[2..3])?,
            a: if hex.len() == 4 {
                expand(&hex[3..4])? as f64 / 255.0
            } else {
                1.0
            },
        }),
        6 | 8 => Some(Rgba {
            r: pair(0)?,
            g: pair(2)?,
            b: pair(4)?,
            a: if hex.len() == 8 {
                pair(6)? as f64 / 255.0
            } else {
                1.0
            },
        }),
        _ => None,
    }
}

/// Convert a 0–100 opacity to a `0.0..=1.0` factor
pub fn opacity_factor(percent: f64) -> f64 {
    (percent / 100.0).clamp(0.0, 1.0)
}

/// Bake an opacity factor into a colour
///
/// Full opacity returns the colour untouched. Colours that cannot be parsed
/// (named colours, `var(...)`) are returned untouched as well.
pub fn apply_opacity(color: &str, factor: f64) -> String {
    if factor >= 1.0 {
        return color.to_string();
    }
    match Rgba::parse(color) {
        Some(rgba) => rgba.with_alpha_factor(factor).to_css(),
        None => {
            tracing::debug!(color, "cannot apply opacity to unparsed colour");
            color.to_string()
        }
    }
}

/// Rewrite every colour stop in a gradient with the opacity baked in
pub fn apply_opacity_to_gradient(gradient: &str, factor: f64) -> String {
    if factor >= 1.0 {
        return gradient.to_string();
    }
    COLOR_STOP
        .replace_all(gradient, |caps: &regex::Captures<'_>| {
            apply_opacity(&caps[0], factor)
        })
        .into_owned()
}

/// The white overlay that fades an image layer to the given opacity
pub fn white_overlay(factor: f64) -> String {
    let c = Rgba::WHITE.with_alpha_factor(1.0 - factor).to_css();
    format!("linear-gradient({c},{c})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgba::parse("#fff"), Some(Rgba::WHITE));
        let c = Rgba::parse("#ff000080").unwrap();
        assert_eq!((c.r, c.g, c.b), (255, 0, 0));
        assert!((c.a - 0.502).abs() < 0.01);
        assert_eq!(Rgba::parse("#12"), None);
        assert_eq!(Rgba::parse("#zzzzzz"), None);
    }

    #[test]
    fn test_parse_rgb_functions() {
        assert_eq!(
            Rgba::parse("rgb(10, 20, 30)"),
            Some(Rgba { r: 10, g: 20, b: 30, a: 1.0 })
        );
        assert_eq!(
            Rgba::parse("rgba(10,20,30,0.5)"),
            Some(Rgba { r: 10, g: 20, b: 30, a: 0.5 })
        );
        assert_eq!(
            Rgba::parse("rgb(10 20 30 / 50%)"),
            Some(Rgba { r: 10, g: 20, b: 30, a: 0.5 })
        );
        assert_eq!(Rgba::parse("red"), None);
    }

    #[test]
    fn test_apply_opacity() {
        assert_eq!(apply_opacity("#ff0000", 1.0), "#ff0000");
        assert_eq!(apply_opacity("#ff0000", 0.5), "rgba(255,0,0,0.5)");
        assert_eq!(apply_opacity("rgba(0,0,0,0.5)", 0.5), "rgba(0,0,0,0.25)");
        assert_eq!(apply_opacity("red", 0.5), "red");
    }

    #[test]
    fn test_gradient_stops_rewritten() {
        let g = "linear-gradient(90deg, #000 0%, rgb(255, 255, 255) 100%)";
        assert_eq!(
            apply_opacity_to_gradient(g, 0.5),
            "linear-gradient(90deg, rgba(0,0,0,0.5) 0%, rgba(255,255,255,0.5) 100%)"
        );
        assert_eq!(apply_opacity_to_gradient(g, 1.0), g);
    }

    #[test]
    fn test_white_overlay() {
        assert_eq!(
            white_overlay(0.5),
            "linear-gradient(rgba(255,255,255,0.5),rgba(255,255,255,0.5))"
        );
        assert_eq!(
            white_overlay(0.25),
            "linear-gradient(rgba(255,255,255,0.75),rgba(255,255,255,0.75))"
        );
    }
}
