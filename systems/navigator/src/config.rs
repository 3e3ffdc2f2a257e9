//! TOML configuration for the spatial query components of one room.

use std::path::{Path, PathBuf};

use office_spatial_core::{NavigationConfig, VisionConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bucket side length of the proximity index, in world units.
pub const DEFAULT_PROXIMITY_CELL_SIZE: f32 = 2.0;

/// Grouped configuration for vision, navigation and proximity queries.
///
/// Every section is optional in the file, so a partial document only
/// overrides the keys it names:
///
/// ```toml
/// proximity_cell_size = 1.5
///
/// [vision]
/// range = 10.0
/// fov_degrees = 90.0
///
/// [navigation]
/// smoothing = false
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Bucket side length of the proximity index.
    pub proximity_cell_size: f32,
    /// Line-of-sight and field-of-view parameters.
    pub vision: VisionConfig,
    /// Path request parameters.
    pub navigation: NavigationConfig,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            proximity_cell_size: DEFAULT_PROXIMITY_CELL_SIZE,
            vision: VisionConfig::default(),
            navigation: NavigationConfig::default(),
        }
    }
}

impl SpatialConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads and parses a configuration file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialises the configuration as pretty-printed TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Errors raised while loading a [`SpatialConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The document is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration could not be rendered as TOML.
    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_documents_keep_defaults() {
        let config = SpatialConfig::from_toml_str(
            "proximity_cell_size = 1.5\n[vision]\nfov_degrees = 90.0\n",
        )
        .expect("valid config");
        assert_eq!(config.proximity_cell_size, 1.5);
        assert_eq!(config.vision.fov_degrees, 90.0);
        assert_eq!(config.vision.range, VisionConfig::default().range);
        assert_eq!(config.navigation, NavigationConfig::default());
    }

    #[test]
    fn empty_document_is_the_default() {
        let config = SpatialConfig::from_toml_str("").expect("empty config");
        assert_eq!(config, SpatialConfig::default());
    }

    #[test]
    fn rendered_config_parses_back() {
        let mut config = SpatialConfig::default();
        config.navigation.smoothing = false;
        config.vision.ray_count = 12;
        let text = config.to_toml().expect("render");
        assert_eq!(SpatialConfig::from_toml_str(&text).expect("parse"), config);
    }

    #[test]
    fn wrong_types_are_reported() {
        let error = SpatialConfig::from_toml_str("[navigation]\nsmoothing = \"yes\"\n")
            .expect_err("string is not a bool");
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[navigation]\nmax_path_length = 40").expect("write config");
        let config = SpatialConfig::from_path(file.path()).expect("load config");
        assert_eq!(config.navigation.max_path_length, 40);

        let missing = SpatialConfig::from_path(Path::new("/definitely/not/here.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
