//! Reader configuration.
//!
//! Loaded from a JSON file; every field has a default, so `{}` is a valid configuration.
//!
//! ```json
//! {
//!   "columns": "utf8_bytes",
//!   "reuse_open_panels": false,
//!   "layout": { "content": [{ "componentType": "editor", "componentState": { "id": 3 } }] }
//! }
//! ```

use crate::panel::ComponentConfig;
use reader_core::{ColumnEncoding, DecoderConfig, Theme};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    /// Reading the configuration file failed.
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    /// The configuration is not valid JSON or has the wrong shape.
    Json(#[from] serde_json::Error),
}

/// Startup layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Components opened at startup, in order. Empty means one editor on the main file.
    pub content: Vec<ComponentConfig>,
}

/// Reader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// How annotation columns are counted.
    pub columns: ColumnEncoding,
    /// Focus an already open panel instead of opening the same file again.
    pub reuse_open_panels: bool,
    /// Startup layout.
    pub layout: LayoutConfig,
    /// Theme replacing the built-in palette.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            columns: ColumnEncoding::default(),
            reuse_open_panels: true,
            layout: LayoutConfig::default(),
            theme: None,
        }
    }
}

impl ReaderConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "loaded reader configuration");
        Ok(config)
    }

    /// Decoder options derived from this configuration.
    pub fn decoder(&self) -> DecoderConfig {
        DecoderConfig {
            columns: self.columns,
        }
    }

    /// The effective theme.
    pub fn theme(&self) -> Theme {
        self.theme.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::ComponentKind;
    use reader_core::FileId;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = ReaderConfig::from_json("{}").unwrap();
        assert_eq!(config, ReaderConfig::default());
        assert!(config.reuse_open_panels);
        assert_eq!(config.columns, ColumnEncoding::Chars);
    }

    #[test]
    fn test_layout_content() {
        let config = ReaderConfig::from_json(
            r#"{
                "columns": "utf8_bytes",
                "layout": { "content": [{ "componentType": "editor", "componentState": { "id": 3 } }] }
            }"#,
        )
        .unwrap();
        assert_eq!(config.decoder().columns, ColumnEncoding::Utf8Bytes);
        assert_eq!(config.layout.content.len(), 1);
        assert_eq!(config.layout.content[0].component_type, ComponentKind::Editor);
        assert_eq!(config.layout.content[0].component_state.id, Some(FileId(3)));
    }

    #[test]
    fn test_unknown_component_type_is_rejected() {
        let err = ReaderConfig::from_json(
            r#"{ "layout": { "content": [{ "componentType": "terminal" }] } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
