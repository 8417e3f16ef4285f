//! Editor configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use crate::shapes::{SerializableColor, Textbox};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Size and background of newly created documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkspaceConfig {
    pub width: f64,
    pub height: f64,
    pub background: SerializableColor,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 1200.0,
            background: SerializableColor::white(),
        }
    }
}

/// Ambient tool state: what new shapes and text inherit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolDefaults {
    pub fill: SerializableColor,
    pub stroke: SerializableColor,
    pub stroke_width: f64,
    pub stroke_dash_array: Vec<f64>,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u16,
}

impl Default for ToolDefaults {
    fn default() -> Self {
        Self {
            fill: SerializableColor::black(),
            stroke: SerializableColor::black(),
            stroke_width: 2.0,
            stroke_dash_array: Vec::new(),
            font_family: "Arial".to_string(),
            font_size: Textbox::DEFAULT_FONT_SIZE,
            font_weight: Textbox::DEFAULT_FONT_WEIGHT,
        }
    }
}

/// Zoom limits and the auto-fit ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    /// Fraction of the container the workspace occupies after auto-zoom.
    pub fit_ratio: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.2,
            max_zoom: 1.0,
            zoom_step: 0.05,
            fit_ratio: 0.85,
        }
    }
}

/// Per-editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub workspace: WorkspaceConfig,
    pub tool: ToolDefaults,
    pub viewport: ViewportConfig,
    /// Offset applied on each axis by every paste.
    pub paste_offset: f64,
    pub autosave_debounce_ms: u64,
    /// Maximum number of history snapshots; unlimited when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            workspace: WorkspaceConfig::default(),
            tool: ToolDefaults::default(),
            viewport: ViewportConfig::default(),
            paste_offset: 10.0,
            autosave_debounce_ms: 500,
            history_limit: None,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Check ranges that would break the viewport or history.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.viewport.validate()?;
        self.workspace.validate()?;
        if self.history_limit == Some(0) {
            return Err(ConfigError::Invalid("historyLimit must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Replace every invalid section with its default.
    ///
    /// Used for configs built in code, which never went through
    /// [`EditorConfig::from_json`].
    pub fn sanitized(mut self) -> Self {
        if let Err(e) = self.viewport.validate() {
            log::warn!("{e}; using default viewport limits");
            self.viewport = ViewportConfig::default();
        }
        if let Err(e) = self.workspace.validate() {
            log::warn!("{e}; using default workspace");
            self.workspace = WorkspaceConfig::default();
        }
        if self.history_limit == Some(0) {
            log::warn!("historyLimit 0 ignored; history is unlimited");
            self.history_limit = None;
        }
        self
    }
}

impl ViewportConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom range [{}, {}] is empty or non-positive",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.zoom_step.is_nan() || self.zoom_step <= 0.0 {
            return Err(ConfigError::Invalid("zoomStep must be positive".to_string()));
        }
        if !(self.fit_ratio > 0.0 && self.fit_ratio <= 1.0) {
            return Err(ConfigError::Invalid("fitRatio must be in (0, 1]".to_string()));
        }
        Ok(())
    }
}

impl WorkspaceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(ConfigError::Invalid("workspace size must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = EditorConfig::from_json("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.workspace.width, 1200.0);
        assert_eq!(config.tool.stroke_width, 2.0);
        assert_eq!(config.autosave_debounce_ms, 500);
    }

    #[test]
    fn test_partial_override() {
        let config = EditorConfig::from_json(
            r##"{"workspace":{"width":800,"background":"#ff0000"},"viewport":{"zoomStep":0.1},"historyLimit":20}"##,
        )
        .unwrap();
        assert_eq!(config.workspace.width, 800.0);
        assert_eq!(config.workspace.height, 1200.0);
        assert_eq!(config.workspace.background, SerializableColor::new(255, 0, 0, 255));
        assert_eq!(config.viewport.zoom_step, 0.1);
        assert_eq!(config.viewport.max_zoom, 1.0);
        assert_eq!(config.history_limit, Some(20));
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        assert!(matches!(
            EditorConfig::from_json(r#"{"viewport":{"minZoom":2.0}}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(EditorConfig::from_json(r#"{"historyLimit":0}"#).is_err());
        assert!(EditorConfig::from_json(r#"{"workspace":{"width":-1}}"#).is_err());
        assert!(matches!(EditorConfig::from_json("[]"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_sanitized_resets_only_broken_sections() {
        let mut config = EditorConfig {
            paste_offset: 25.0,
            history_limit: Some(0),
            ..EditorConfig::default()
        };
        config.viewport.min_zoom = 1.0;
        config.viewport.max_zoom = 0.5;
        config.workspace.width = f64::NAN;

        let config = config.sanitized();
        assert_eq!(config.viewport, ViewportConfig::default());
        assert_eq!(config.workspace, WorkspaceConfig::default());
        assert_eq!(config.history_limit, None);
        assert_eq!(config.paste_offset, 25.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shapy.json");
        std::fs::write(&path, r#"{"pasteOffset":20}"#).unwrap();
        assert_eq!(EditorConfig::from_file(&path).unwrap().paste_offset, 20.0);
        assert!(matches!(
            EditorConfig::from_file(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
