mod loader;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ppm::PpmFormat;

pub use loader::load_config;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "raycaster.yaml";

/// Main render configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct RenderConfig {
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub preview: PreviewSettings,
}

/// Shading options
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RenderSettings {
    /// Depth budget handed to the shader for each primary ray
    #[serde(default = "default_recursion_depth")]
    pub recursion_depth: u32,
    /// Spread pixels across the rayon thread pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_recursion_depth() -> u32 {
    crate::DEFAULT_RECURSION_DEPTH
}

fn default_parallel() -> bool {
    true
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            recursion_depth: default_recursion_depth(),
            parallel: default_parallel(),
        }
    }
}

/// Image output options
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: PpmFormat,
}

/// Terminal preview options
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PreviewSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Emit 24-bit ANSI color codes
    #[serde(default = "default_colored")]
    pub colored: bool,
    /// Cap on preview columns; the terminal width is used otherwise
    #[serde(default)]
    pub max_width: Option<usize>,
}

fn default_colored() -> bool {
    true
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            colored: default_colored(),
            max_width: None,
        }
    }
}

impl RenderConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        load_config(path)
    }

    /// Load the given file, or `raycaster.yaml` if it exists, or defaults
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.recursion_depth == 0 {
            return Err(ConfigError::Validation(
                "render.recursion_depth must be at least 1".to_string(),
            ));
        }
        if self.render.recursion_depth > crate::MAX_RECURSION_DEPTH {
            return Err(ConfigError::Validation(format!(
                "render.recursion_depth must be at most {}",
                crate::MAX_RECURSION_DEPTH
            )));
        }
        if self.preview.max_width == Some(0) {
            return Err(ConfigError::Validation(
                "preview.max_width must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_config_default() {
        let config = RenderConfig::default();
        assert_eq!(config.render.recursion_depth, 1);
        assert!(config.render.parallel);
        assert_eq!(config.output.format, PpmFormat::P6);
        assert!(!config.preview.enabled);
        assert!(config.preview.colored);
        assert!(config.preview.max_width.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ppm_format_serde() {
        assert_eq!(serde_json::to_string(&PpmFormat::P6).unwrap(), "\"p6\"");
        assert_eq!(serde_json::to_string(&PpmFormat::P3).unwrap(), "\"p3\"");

        let p3: PpmFormat = serde_json::from_str("\"p3\"").unwrap();
        assert_eq!(p3, PpmFormat::P3);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: RenderConfig = serde_yaml::from_str("preview:\n  enabled: true\n").unwrap();
        assert!(config.preview.enabled);
        assert!(config.preview.colored);
        assert_eq!(config.render, RenderSettings::default());
    }

    #[test]
    fn test_validate_rejects_zero_depth() {
        let mut config = RenderConfig::default();
        config.render.recursion_depth = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_depth_bounds() {
        let mut config = RenderConfig::default();
        config.render.recursion_depth = crate::MAX_RECURSION_DEPTH;
        assert!(config.validate().is_ok());

        config.render.recursion_depth = crate::MAX_RECURSION_DEPTH + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.render.recursion_depth = 1_000_000;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_zero_preview_width() {
        let mut config = RenderConfig::default();
        config.preview.max_width = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("bad".to_string());
        assert_eq!(err.to_string(), "Configuration validation error: bad");

        let err = ConfigError::NotFound("x.yaml".to_string());
        assert_eq!(err.to_string(), "Configuration file not found: x.yaml");
    }
}
