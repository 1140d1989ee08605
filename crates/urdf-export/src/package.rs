//! ROS package skeleton around the exported documents

use std::path::{Path, PathBuf};

use crate::config::{Dialect, ExportConfig};
use crate::error::{ExportError, Result};

/// Name used throughout the templates; replaced with the robot's names
const PLACEHOLDER: &str = "robot_template";
const PLACEHOLDER_PACKAGE: &str = "robot_template_description";

const PACKAGE_DIRS: [&str; 4] = ["launch", "config", "worlds", "meshes"];

struct Template {
    path: &'static str,
    content: &'static str,
}

const ROS1_TEMPLATES: &[Template] = &[
    Template {
        path: "package.xml",
        content: include_str!("../templates/ros1/package.xml"),
    },
    Template {
        path: "CMakeLists.txt",
        content: include_str!("../templates/ros1/CMakeLists.txt"),
    },
    Template {
        path: "launch/display.launch",
        content: include_str!("../templates/ros1/launch/display.launch"),
    },
    Template {
        path: "launch/gazebo.launch",
        content: include_str!("../templates/ros1/launch/gazebo.launch"),
    },
];

const ROS2_TEMPLATES: &[Template] = &[
    Template {
        path: "package.xml",
        content: include_str!("../templates/ros2/package.xml"),
    },
    Template {
        path: "CMakeLists.txt",
        content: include_str!("../templates/ros2/CMakeLists.txt"),
    },
    Template {
        path: "launch/display.launch.py",
        content: include_str!("../templates/ros2/launch/display.launch.py"),
    },
    Template {
        path: "launch/gazebo.launch.py",
        content: include_str!("../templates/ros2/launch/gazebo.launch.py"),
    },
    Template {
        path: "launch/gz-sim.launch.py",
        content: include_str!("../templates/ros2/launch/gz-sim.launch.py"),
    },
];

fn templates(dialect: Dialect) -> &'static [Template] {
    match dialect {
        Dialect::Ros1 => ROS1_TEMPLATES,
        Dialect::Ros2 => ROS2_TEMPLATES,
    }
}

/// Writes `package.xml`, `CMakeLists.txt` and launch files under a package root
#[derive(Debug, Clone)]
pub struct PackageWriter<'a> {
    root: PathBuf,
    config: &'a ExportConfig,
}

impl<'a> PackageWriter<'a> {
    pub fn new(root: impl Into<PathBuf>, config: &'a ExportConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn urdf_dir(&self) -> PathBuf {
        self.root.join(&self.config.urdf_dir)
    }

    pub fn mesh_dir(&self) -> PathBuf {
        self.root.join(&self.config.mesh_dir)
    }

    fn render(&self, content: &str) -> String {
        content
            .replace(PLACEHOLDER_PACKAGE, &self.config.package_name())
            .replace(PLACEHOLDER, &self.config.robot_name)
    }

    /// Create the package directories; existing ones are left alone
    pub fn create_dirs(&self) -> Result<()> {
        let dirs = PACKAGE_DIRS
            .iter()
            .map(|d| self.root.join(d))
            .chain([self.urdf_dir(), self.mesh_dir()]);
        for dir in dirs {
            std::fs::create_dir_all(&dir).map_err(|e| ExportError::io(&dir, e))?;
        }
        Ok(())
    }

    /// Write the dialect's template files, returning their paths
    pub fn write(&self) -> Result<Vec<PathBuf>> {
        self.create_dirs()?;

        let mut written = Vec::new();
        for template in templates(self.config.dialect) {
            let path = self.root.join(template.path);
            std::fs::write(&path, self.render(template.content))
                .map_err(|e| ExportError::io(&path, e))?;
            written.push(path);
        }

        tracing::info!(
            "Wrote {} package skeleton for '{}' at {:?}",
            self.config.dialect.display_name(),
            self.config.package_name(),
            self.root
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ros1_skeleton() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::for_robot("Crab v2");
        let written = PackageWriter::new(dir.path(), &config).write().unwrap();
        assert_eq!(written.len(), 4);

        for sub in ["launch", "config", "worlds", "meshes", "urdf"] {
            assert!(dir.path().join(sub).is_dir(), "missing {}", sub);
        }

        let package = std::fs::read_to_string(dir.path().join("package.xml")).unwrap();
        assert!(package.contains("<name>crab_description</name>"));
        assert!(!package.contains(PLACEHOLDER));

        let launch = std::fs::read_to_string(dir.path().join("launch/display.launch")).unwrap();
        assert!(launch.contains("$(find crab_description)/urdf/crab.xacro"));
    }

    #[test]
    fn test_ros2_skeleton_has_python_launch_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::for_robot("crab").with_dialect(Dialect::Ros2);
        PackageWriter::new(dir.path(), &config).write().unwrap();

        for file in ["display.launch.py", "gazebo.launch.py", "gz-sim.launch.py"] {
            let text = std::fs::read_to_string(dir.path().join("launch").join(file)).unwrap();
            assert!(text.contains("'crab_description'"));
            assert!(text.contains("'crab.xacro'"));
        }
        let cmake = std::fs::read_to_string(dir.path().join("CMakeLists.txt")).unwrap();
        assert!(cmake.contains("project(crab_description)"));
        assert!(cmake.contains("ament_package()"));
    }

    #[test]
    fn test_existing_directories_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::default();
        let writer = PackageWriter::new(dir.path(), &config);
        std::fs::create_dir_all(writer.mesh_dir()).unwrap();
        std::fs::write(writer.mesh_dir().join("base_link.stl"), b"solid").unwrap();

        writer.write().unwrap();
        writer.write().unwrap();
        assert!(writer.mesh_dir().join("base_link.stl").exists());
    }

    #[test]
    fn test_explicit_package_name() {
        let config = ExportConfig {
            package_name: Some("my_pkg".to_string()),
            ..ExportConfig::for_robot("crab")
        };
        let writer = PackageWriter::new("/tmp/unused", &config);
        assert_eq!(
            writer.render("$(find robot_template_description)/urdf/robot_template.xacro"),
            "$(find my_pkg)/urdf/crab.xacro"
        );
    }
}
