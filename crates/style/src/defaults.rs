//! Per-type default styles
//!
//! Defaults are the lowest-priority source. Where a design token exists for
//! a concern (brand colour, body font, radius) the token wins over the
//! hard-coded fallback.

use serde_json::{Map, Value, json};
use weave_ir::{ComponentType, Props, TokenStore};

/// Token ids consulted by the defaults
pub mod tokens {
    pub const PRIMARY: &str = "color.primary";
    pub const TEXT: &str = "color.text";
    pub const BORDER: &str = "color.border";
    pub const SURFACE: &str = "color.surface";
    pub const FONT_BODY: &str = "font-body";
    pub const FONT_HEADING: &str = "font-heading";
    pub const RADIUS: &str = "radius.md";
}

struct Defaults<'a> {
    map: Map<String, Value>,
    tokens: &'a dyn TokenStore,
}

impl<'a> Defaults<'a> {
    fn set(&mut self, property: &str, value: Value) -> &mut Self {
        self.map.insert(property.to_string(), value);
        self
    }

    /// Token value, else the fallback
    fn token(&mut self, property: &str, token: &str, fallback: Value) -> &mut Self {
        let value = self.tokens.token(token).map(|t| t.value).unwrap_or(fallback);
        self.set(property, value)
    }

    /// Token value only when the token exists
    fn token_only(&mut self, property: &str, token: &str) -> &mut Self {
        if let Some(t) = self.tokens.token(token) {
            self.map.insert(property.to_string(), t.value);
        }
        self
    }

    fn padding(&mut self, vertical: i64, horizontal: i64) -> &mut Self {
        self.set("paddingTop", json!(vertical))
            .set("paddingBottom", json!(vertical))
            .set("paddingLeft", json!(horizontal))
            .set("paddingRight", json!(horizontal))
    }

    fn flex(&mut self, direction: &str, gap: i64) -> &mut Self {
        self.set("display", json!("flex"))
            .set("flexDirection", json!(direction))
            .set("gap", json!(gap))
    }

    fn outlined(&mut self) -> &mut Self {
        self.set("borderWidth", json!(1))
            .set("borderStyle", json!("solid"))
            .token("borderColor", tokens::BORDER, json!("#d1d5db"))
    }
}

/// Heading font size by level (`h1`..`h6`)
pub fn heading_size(level: u8) -> i64 {
    match level {
        1 => 32,
        2 => 28,
        3 => 24,
        4 => 20,
        5 => 18,
        _ => 16,
    }
}

/// Heading level from props (`level: 2` or `"h2"`), default 2
pub fn heading_level(props: &Props) -> u8 {
    let raw = props
        .get_f64("level")
        .or_else(|| {
            props
                .get_str("level")
                .and_then(|s| s.trim_start_matches(['h', 'H']).parse::<f64>().ok())
        })
        .unwrap_or(2.0);
    raw.clamp(1.0, 6.0) as u8
}

/// Default style values for a component type
pub fn type_defaults(
    component_type: &ComponentType,
    props: &Props,
    token_store: &dyn TokenStore,
) -> Map<String, Value> {
    let mut d = Defaults {
        map: Map::new(),
        tokens: token_store,
    };
    match component_type {
        ComponentType::Text | ComponentType::Label | ComponentType::Code => {
            d.token_only("fontFamily", tokens::FONT_BODY)
                .token_only("color", tokens::TEXT);
        }
        ComponentType::Paragraph => {
            d.token_only("fontFamily", tokens::FONT_BODY)
                .token_only("color", tokens::TEXT)
                .set("lineHeight", json!(1.6));
        }
        ComponentType::Heading => {
            d.token_only("fontFamily", tokens::FONT_HEADING)
                .set("fontWeight", json!(700))
                .set("fontSize", json!(heading_size(heading_level(props))));
        }
        ComponentType::Blockquote => {
            d.set("fontStyle", json!("italic"))
                .set("paddingLeft", json!(16))
                .set("borderStyle", json!("none none none solid"))
                .set("borderWidth", json!(4))
                .token("borderColor", tokens::BORDER, json!("#d1d5db"));
        }
        ComponentType::Link => {
            d.token("color", tokens::PRIMARY, json!("#3b82f6"))
                .set("textDecoration", json!("underline"))
                .set("cursor", json!("pointer"));
        }
        ComponentType::Button => {
            d.padding(10, 20)
                .token("backgroundColor", tokens::PRIMARY, json!("#3b82f6"))
                .set("color", json!("#ffffff"))
                .token("borderRadius", tokens::RADIUS, json!(6))
                .set("borderStyle", json!("none"))
                .set("cursor", json!("pointer"))
                .set("fontWeight", json!(500));
        }
        ComponentType::Container => {
            d.set("width", json!("100%")).padding(16, 16);
        }
        ComponentType::Section => {
            d.set("width", json!("100%")).padding(48, 24);
        }
        ComponentType::Row => {
            d.flex("row", 16).set("flexWrap", json!("wrap"));
        }
        ComponentType::Column | ComponentType::Form => {
            d.flex("column", 12);
        }
        ComponentType::Stack => {
            d.flex("column", 8);
        }
        ComponentType::Flexbox => {
            d.set("display", json!("flex"));
        }
        ComponentType::Grid => {
            let columns = props.get_f64("columns").unwrap_or(3.0).max(1.0) as i64;
            d.set("display", json!("grid"))
                .set(
                    "gridTemplateColumns",
                    json!(format!("repeat({columns}, minmax(0, 1fr))")),
                )
                .set("gap", json!(16));
        }
        ComponentType::Card => {
            d.padding(16, 16)
                .outlined()
                .token("borderRadius", tokens::RADIUS, json!(8))
                .token("backgroundColor", tokens::SURFACE, json!("#ffffff"));
        }
        ComponentType::Header | ComponentType::Footer => {
            d.flex("row", 16)
                .set("alignItems", json!("center"))
                .set("justifyContent", json!("space-between"))
                .padding(16, 24);
        }
        ComponentType::Sidebar => {
            d.flex("column", 8).set("width", json!(240)).padding(16, 16);
        }
        ComponentType::Navbar => {
            d.flex("row", 24)
                .set("alignItems", json!("center"))
                .set("justifyContent", json!("space-between"))
                .padding(12, 24);
        }
        ComponentType::NavMenu | ComponentType::Breadcrumb | ComponentType::Pagination => {
            d.flex("row", 8).set("alignItems", json!("center"));
        }
        ComponentType::Divider => {
            d.set("width", json!("100%"))
                .set("height", json!(1))
                .token("backgroundColor", tokens::BORDER, json!("#e5e7eb"));
        }
        ComponentType::Spacer => {
            d.set("height", json!(props.get_f64("size").unwrap_or(24.0)));
        }
        ComponentType::Image | ComponentType::Video | ComponentType::Embed => {
            d.set("maxWidth", json!("100%"));
        }
        ComponentType::Map => {
            d.set("width", json!("100%")).set("height", json!(300));
        }
        ComponentType::Input | ComponentType::Textarea | ComponentType::Select => {
            d.padding(8, 12)
                .outlined()
                .token("borderRadius", tokens::RADIUS, json!(4))
                .token_only("fontFamily", tokens::FONT_BODY);
        }
        ComponentType::Badge => {
            d.padding(2, 8)
                .set("borderRadius", json!(9999))
                .set("fontSize", json!(12))
                .token("backgroundColor", tokens::PRIMARY, json!("#3b82f6"))
                .set("color", json!("#ffffff"));
        }
        ComponentType::Avatar => {
            let size = props.get_f64("size").unwrap_or(40.0);
            d.set("width", json!(size))
                .set("height", json!(size))
                .set("borderRadius", json!("50%"))
                .set("overflow", json!("hidden"));
        }
        ComponentType::Alert => {
            d.padding(12, 16)
                .token("borderRadius", tokens::RADIUS, json!(6))
                .outlined();
        }
        ComponentType::Modal => {
            d.padding(24, 24)
                .token("backgroundColor", tokens::SURFACE, json!("#ffffff"))
                .token("borderRadius", tokens::RADIUS, json!(8));
        }
        ComponentType::Progress => {
            d.set("width", json!("100%")).set("height", json!(8));
        }
        _ => {}
    }
    d.map
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_ir::{DesignToken, InMemoryTokenStore};

    #[test]
    fn test_button_uses_primary_token() {
        let tokens = InMemoryTokenStore::from_tokens(vec![DesignToken::new(tokens::PRIMARY, "#10b981")]);
        let d = type_defaults(&ComponentType::Button, &Props::new(), &tokens);
        assert_eq!(d.get("backgroundColor"), Some(&json!("#10b981")));
        let d = type_defaults(&ComponentType::Button, &Props::new(), &InMemoryTokenStore::default());
        assert_eq!(d.get("backgroundColor"), Some(&json!("#3b82f6")));
    }

    #[test]
    fn test_text_defaults_are_token_only() {
        let d = type_defaults(&ComponentType::Text, &Props::new(), &InMemoryTokenStore::default());
        assert!(d.is_empty());
        let tokens = InMemoryTokenStore::from_tokens(vec![DesignToken::new(tokens::FONT_BODY, "Inter")]);
        let d = type_defaults(&ComponentType::Text, &Props::new(), &tokens);
        assert_eq!(d.get("fontFamily"), Some(&json!("Inter")));
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level(&Props::new().with("level", "h1")), 1);
        assert_eq!(heading_level(&Props::new().with("level", 9)), 6);
        assert_eq!(heading_level(&Props::new()), 2);
        let d = type_defaults(
            &ComponentType::Heading,
            &Props::new().with("level", 1),
            &InMemoryTokenStore::default(),
        );
        assert_eq!(d.get("fontSize"), Some(&json!(32)));
        assert_eq!(d.get("fontWeight"), Some(&json!(700)));
    }

    #[test]
    fn test_grid_columns() {
        let d = type_defaults(
            &ComponentType::Grid,
            &Props::new().with("columns", 4),
            &InMemoryTokenStore::default(),
        );
        assert_eq!(d.get("gridTemplateColumns"), Some(&json!("repeat(4, minmax(0, 1fr))")));
    }
}
