//! Store configuration
//!
//! Default colors and name prefixes applied to newly created annotations.
//! Configuration can be loaded from a JSON file, environment variables,
//! or created programmatically.

use crate::annotation::Color;
use std::fs;
use std::io;
use std::path::Path;

const POINT_COLOR_VAR: &str = "PIPEMAP_POINT_COLOR";
const PATH_COLOR_VAR: &str = "PIPEMAP_PATH_COLOR";
const REGION_COLOR_VAR: &str = "PIPEMAP_REGION_COLOR";
const POINT_PREFIX_VAR: &str = "PIPEMAP_POINT_PREFIX";
const PATH_PREFIX_VAR: &str = "PIPEMAP_PATH_PREFIX";
const REGION_PREFIX_VAR: &str = "PIPEMAP_REGION_PREFIX";

/// Defaults for annotations created without an explicit name or color
///
/// Default names are `"{prefix} {n}"` where `n` is the 1-based creation
/// order within the kind.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Marker color for new points
    pub point_color: Color,
    /// Line color for new paths
    pub path_color: Color,
    /// Outline color for new regions
    pub region_color: Color,
    /// Name prefix for new points
    pub point_prefix: String,
    /// Name prefix for new paths
    pub path_prefix: String,
    /// Name prefix for new regions
    pub region_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            point_color: Color::BLUE,
            path_color: Color::RED,
            region_color: Color::GREEN,
            point_prefix: "Point".to_string(),
            path_prefix: "Path".to_string(),
            region_prefix: "Region".to_string(),
        }
    }
}

impl StoreConfig {
    /// Sets the default point color.
    pub fn with_point_color(mut self, color: Color) -> Self {
        self.point_color = color;
        self
    }

    /// Sets the default path color.
    pub fn with_path_color(mut self, color: Color) -> Self {
        self.path_color = color;
        self
    }

    /// Sets the default region color.
    pub fn with_region_color(mut self, color: Color) -> Self {
        self.region_color = color;
        self
    }

    /// Sets all three name prefixes at once.
    pub fn with_prefixes(
        mut self,
        point: impl Into<String>,
        path: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        self.point_prefix = point.into();
        self.path_prefix = path.into();
        self.region_prefix = region.into();
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// Environment variables (all optional):
    /// - `PIPEMAP_POINT_COLOR`, `PIPEMAP_PATH_COLOR`, `PIPEMAP_REGION_COLOR`: hex colors
    /// - `PIPEMAP_POINT_PREFIX`, `PIPEMAP_PATH_PREFIX`, `PIPEMAP_REGION_PREFIX`: name prefixes
    ///
    /// # Errors
    /// Returns an error if a color variable is not a valid hex color or a
    /// prefix variable is blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(color) = env_color(POINT_COLOR_VAR)? {
            config.point_color = color;
        }
        if let Some(color) = env_color(PATH_COLOR_VAR)? {
            config.path_color = color;
        }
        if let Some(color) = env_color(REGION_COLOR_VAR)? {
            config.region_color = color;
        }
        if let Some(prefix) = env_prefix(POINT_PREFIX_VAR)? {
            config.point_prefix = prefix;
        }
        if let Some(prefix) = env_prefix(PATH_PREFIX_VAR)? {
            config.path_prefix = prefix;
        }
        if let Some(prefix) = env_prefix(REGION_PREFIX_VAR)? {
            config.region_prefix = prefix;
        }

        Ok(config)
    }

    /// Loads configuration from a JSON file.
    ///
    /// Keys that are absent keep their default values:
    /// ```json
    /// { "path_color": "#FFA500", "path_prefix": "Pipe" }
    /// ```
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// Parses configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, prefix) in [
            ("point_prefix", &self.point_prefix),
            ("path_prefix", &self.path_prefix),
            ("region_prefix", &self.region_prefix),
        ] {
            if prefix.trim().is_empty() {
                return Err(ConfigError::InvalidValue(key.to_string()));
            }
        }
        Ok(())
    }
}

fn env_color(var: &str) -> Result<Option<Color>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .parse::<Color>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(var.to_string())),
        Err(_) => Ok(None),
    }
}

fn env_prefix(var: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(var) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::InvalidValue(var.to_string())),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(_) => Ok(None),
    }
}

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid value for a configuration key or environment variable
    #[error("invalid value for configuration key: {0}")]
    InvalidValue(String),
    /// I/O error reading or writing a configuration file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Malformed configuration JSON
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const ALL_VARS: [&str; 6] = [
        POINT_COLOR_VAR,
        PATH_COLOR_VAR,
        REGION_COLOR_VAR,
        POINT_PREFIX_VAR,
        PATH_PREFIX_VAR,
        REGION_PREFIX_VAR,
    ];

    // Saves and restores environment variables around a test
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new(var_names: &[&str]) -> Self {
            let vars = var_names
                .iter()
                .map(|name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in var_names {
                env::remove_var(name);
            }
            Self { vars }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (name, value) in &self.vars {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.point_color, Color::BLUE);
        assert_eq!(config.path_color, Color::RED);
        assert_eq!(config.region_color, Color::GREEN);
        assert_eq!(config.point_prefix, "Point");
    }

    #[test]
    fn test_builder_methods() {
        let config = StoreConfig::default()
            .with_point_color(Color::BLACK)
            .with_path_color(Color::YELLOW)
            .with_region_color(Color::WHITE)
            .with_prefixes("Landmark", "Pipe", "Site");
        assert_eq!(config.point_color, Color::BLACK);
        assert_eq!(config.path_color, Color::YELLOW);
        assert_eq!(config.region_color, Color::WHITE);
        assert_eq!(config.path_prefix, "Pipe");
    }

    #[test]
    #[serial]
    fn test_from_env() {
        let _guard = EnvGuard::new(&ALL_VARS);
        env::set_var(PATH_COLOR_VAR, "#FFA500");
        env::set_var(POINT_PREFIX_VAR, " Landmark ");

        let config = StoreConfig::from_env().unwrap();
        assert_eq!(config.path_color, Color::rgb(255, 165, 0));
        assert_eq!(config.point_prefix, "Landmark");
        assert_eq!(config.point_color, Color::BLUE); // default
        assert_eq!(config.region_prefix, "Region"); // default
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_color() {
        let _guard = EnvGuard::new(&ALL_VARS);
        env::set_var(REGION_COLOR_VAR, "greenish");

        match StoreConfig::from_env() {
            Err(ConfigError::InvalidValue(key)) => assert_eq!(key, REGION_COLOR_VAR),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn test_from_env_blank_prefix() {
        let _guard = EnvGuard::new(&ALL_VARS);
        env::set_var(PATH_PREFIX_VAR, "   ");
        assert!(StoreConfig::from_env().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let config = StoreConfig::from_json(r##"{ "path_color": "#00FF00", "path_prefix": "Pipe" }"##)
            .unwrap();
        assert_eq!(config.path_color, Color::GREEN);
        assert_eq!(config.path_prefix, "Pipe");
        assert_eq!(config.point_prefix, "Point");
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(matches!(
            StoreConfig::from_json(r#"{ "point_color": "blue" }"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            StoreConfig::from_json(r#"{ "region_prefix": "" }"#),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("pipemap.json");

        let config = StoreConfig::default()
            .with_path_color(Color::rgb(1, 2, 3))
            .with_prefixes("P", "L", "R");
        config.save_to_file(&path).unwrap();

        let loaded = StoreConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_from_file_missing() {
        let result = StoreConfig::from_file("/nonexistent/pipemap.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
