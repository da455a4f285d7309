//! Render configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use weave_core::{WeaveError, WeaveResult};

const DEFAULT_PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x400?text=Image";

/// Tunables for a render pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RenderConfig {
    /// Fallback for `--canvas-safe-inset`, in px
    pub canvas_safe_inset: f32,

    /// Page size when `pagination.itemsPerPage` is missing
    pub default_items_per_page: usize,

    /// Bounds for simulated design rows
    pub simulated_rows_min: usize,
    pub simulated_rows_max: usize,

    /// Navbar collapse width when `props.mobileBreakpoint` is missing
    pub mobile_breakpoint: f32,

    /// Show components whose visibility condition fails, dimmed, in design mode
    pub reveal_hidden_in_design: bool,

    /// Opacity of revealed hidden components
    pub hidden_opacity: f64,

    /// Image shown for image components without a source in design mode
    pub placeholder_image: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            canvas_safe_inset: 24.0,
            default_items_per_page: 10,
            simulated_rows_min: 3,
            simulated_rows_max: 8,
            mobile_breakpoint: 768.0,
            reveal_hidden_in_design: true,
            hidden_opacity: 0.4,
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> WeaveResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| WeaveError::InvalidConfig(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> WeaveResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| WeaveError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }

    fn check(&self) -> WeaveResult<()> {
        if self.simulated_rows_min > self.simulated_rows_max {
            return Err(WeaveError::InvalidConfig(format!(
                "simulated_rows_min ({}) exceeds simulated_rows_max ({})",
                self.simulated_rows_min, self.simulated_rows_max
            )));
        }
        if self.default_items_per_page == 0 {
            return Err(WeaveError::InvalidConfig(
                "default_items_per_page must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_canvas_safe_inset(mut self, inset: f32) -> Self {
        self.canvas_safe_inset = inset;
        self
    }

    pub fn with_items_per_page(mut self, items: usize) -> Self {
        self.default_items_per_page = items.max(1);
        self
    }

    pub fn with_simulated_rows(mut self, min: usize, max: usize) -> Self {
        self.simulated_rows_min = min.min(max);
        self.simulated_rows_max = max.max(min);
        self
    }

    pub fn with_mobile_breakpoint(mut self, width: f32) -> Self {
        self.mobile_breakpoint = width;
        self
    }

    /// Hide failing components in design mode instead of dimming them
    pub fn without_hidden_reveal(mut self) -> Self {
        self.reveal_hidden_in_design = false;
        self
    }

    pub fn with_placeholder_image(mut self, url: impl Into<String>) -> Self {
        self.placeholder_image = url.into();
        self
    }

    /// Simulated row count for a schema with `field_count` fields
    pub fn simulated_row_count(&self, field_count: usize) -> usize {
        let span = self.simulated_rows_max - self.simulated_rows_min + 1;
        self.simulated_rows_min + field_count % span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.default_items_per_page, 10);
        assert_eq!(config.simulated_row_count(0), 3);
        assert_eq!(config.simulated_row_count(5), 8);
        assert_eq!(config.simulated_row_count(6), 3);
    }

    #[test]
    fn test_partial_toml() {
        let config = RenderConfig::from_toml_str(
            "default_items_per_page = 5\nreveal_hidden_in_design = false\n",
        )
        .unwrap();
        assert_eq!(config.default_items_per_page, 5);
        assert!(!config.reveal_hidden_in_design);
        assert_eq!(config.canvas_safe_inset, 24.0);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let err = RenderConfig::from_toml_str("simulated_rows_min = 9\nsimulated_rows_max = 2\n")
            .unwrap_err();
        assert!(matches!(err, WeaveError::InvalidConfig(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mobile_breakpoint = 640.0").unwrap();
        let config = RenderConfig::load(file.path()).unwrap();
        assert_eq!(config.mobile_breakpoint, 640.0);
    }

    #[test]
    fn test_builder() {
        let config = RenderConfig::new()
            .with_simulated_rows(5, 2)
            .with_items_per_page(0)
            .without_hidden_reveal();
        assert_eq!((config.simulated_rows_min, config.simulated_rows_max), (2, 5));
        assert_eq!(config.default_items_per_page, 1);
        assert!(!config.reveal_hidden_in_design);
    }
}
