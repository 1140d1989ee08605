//! Export configuration: naming, dialect and output layout
//!
//! The configuration is an immutable value passed explicitly to every stage.
//! It is stored as RON on disk.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assembly::MaterialRecord;

/// Configuration error types
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error during file operations
    Io(String),
    /// Error during serialization
    Serialize(String),
    /// Error during deserialization
    Deserialize(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO error: {}", msg),
            ConfigError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
            ConfigError::Deserialize(msg) => write!(f, "Deserialization error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Target ROS generation; only the simulation control plugin differs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dialect {
    #[default]
    Ros1,
    Ros2,
}

impl Dialect {
    pub fn plugin_name(&self) -> &'static str {
        match self {
            Dialect::Ros1 => "control",
            Dialect::Ros2 => "gazebo_ros2_control",
        }
    }

    pub fn plugin_filename(&self) -> &'static str {
        match self {
            Dialect::Ros1 => "libgazebo_ros_control.so",
            Dialect::Ros2 => "libgazebo_ros2_control.so",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::Ros1 => "ROS 1",
            Dialect::Ros2 => "ROS 2",
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub robot_name: String,
    /// Package name; `<robot_name>_description` when unset
    pub package_name: Option<String>,
    /// Name of the occurrence component that becomes the root link
    pub root_link_name: String,
    pub dialect: Dialect,
    /// Emit and include the simulation fragment
    pub simulation: bool,
    /// Scale applied to mesh files (written in millimetres)
    pub mesh_scale: f64,
    /// Material for links whose occurrence has no appearance
    pub default_material: MaterialRecord,
    pub urdf_dir: String,
    pub mesh_dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            robot_name: "robot".to_string(),
            package_name: None,
            root_link_name: "base_link".to_string(),
            dialect: Dialect::default(),
            simulation: true,
            mesh_scale: 0.001,
            default_material: MaterialRecord::silver(),
            urdf_dir: "urdf".to_string(),
            mesh_dir: "meshes".to_string(),
        }
    }
}

impl ExportConfig {
    /// Configuration for a design whose root component is `root_component`.
    ///
    /// The robot name is the first word of the component name, lower-cased
    /// (`"Arm Robot v3"` gives `arm`).
    pub fn for_robot(root_component: &str) -> Self {
        let robot_name = root_component
            .split_whitespace()
            .next()
            .unwrap_or("robot")
            .to_lowercase();
        Self {
            robot_name,
            ..Self::default()
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_simulation(mut self, simulation: bool) -> Self {
        self.simulation = simulation;
        self
    }

    pub fn package_name(&self) -> String {
        self.package_name
            .clone()
            .unwrap_or_else(|| format!("{}_description", self.robot_name))
    }

    /// `package://<package>/<mesh_dir>/<stem>.stl`
    pub fn mesh_uri(&self, stem: &str) -> String {
        format!(
            "package://{}/{}/{}.stl",
            self.package_name(),
            self.mesh_dir,
            stem
        )
    }

    /// `$(find <package>)/<urdf_dir>/<file>`, as used by xacro includes
    pub fn include_path(&self, file: &str) -> String {
        format!("$(find {})/{}/{}", self.package_name(), self.urdf_dir, file)
    }

    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config: Self =
            ron::from_str(&content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        tracing::info!("Loaded export config from {:?}", path);
        Ok(config)
    }

    /// Save configuration as pretty-printed RON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        tracing::info!("Saved export config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_robot_uses_first_word_lowercased() {
        let config = ExportConfig::for_robot("Arm Robot v3");
        assert_eq!(config.robot_name, "arm");
        assert_eq!(config.package_name(), "arm_description");
        assert_eq!(config.root_link_name, "base_link");
    }

    #[test]
    fn test_explicit_package_name_wins() {
        let config = ExportConfig {
            package_name: Some("my_pkg".to_string()),
            ..ExportConfig::default()
        };
        assert_eq!(config.package_name(), "my_pkg");
        assert_eq!(config.mesh_uri("base_link"), "package://my_pkg/meshes/base_link.stl");
        assert_eq!(
            config.include_path("materials.xacro"),
            "$(find my_pkg)/urdf/materials.xacro"
        );
    }

    #[test]
    fn test_dialect_plugins() {
        assert_eq!(Dialect::Ros1.plugin_filename(), "libgazebo_ros_control.so");
        assert_eq!(Dialect::Ros2.plugin_name(), "gazebo_ros2_control");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.ron");
        let config = ExportConfig::for_robot("walker").with_dialect(Dialect::Ros2);
        config.save(&path).unwrap();
        let loaded = ExportConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ExportConfig = ron::from_str("(robot_name: \"crab\")").unwrap();
        assert_eq!(config.robot_name, "crab");
        assert!(config.simulation);
        assert_eq!(config.mesh_scale, 0.001);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ExportConfig::load(dir.path().join("missing.ron"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
