//! Document serialization
//!
//! Every writer walks the resolved tree in its stored order, so the same
//! input always yields byte-identical text. Lengths are converted from
//! centimetres to metres and inertia from kg·cm² to kg·m² here and nowhere
//! else.

mod gazebo;
mod materials;
mod transmission;
mod urdf;
mod xml;

pub use gazebo::{gazebo_material_name, write_gazebo};
pub use materials::{collect_materials, write_materials_xacro};
pub use transmission::write_transmissions;
pub use urdf::write_robot_xacro;

use std::path::{Path, PathBuf};

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::tree::ResolvedTree;

/// Centimetres per metre
pub const CM_PER_M: f64 = 100.0;
/// kg·cm² per kg·m²
pub const KG_CM2_PER_KG_M2: f64 = 10_000.0;

/// Digits written for lengths in metres and for angles
pub const LENGTH_DECIMALS: i32 = 9;
pub const ANGLE_DECIMALS: i32 = 9;
pub const MASS_DECIMALS: i32 = 9;
/// Digits written for inertia in kg·m²
pub const INERTIA_DECIMALS_SI: i32 = 12;

pub fn robot_file_name(config: &ExportConfig) -> String {
    format!("{}.xacro", config.robot_name)
}

pub fn materials_file_name() -> String {
    "materials.xacro".to_string()
}

pub fn transmissions_file_name(config: &ExportConfig) -> String {
    format!("{}.trans", config.robot_name)
}

pub fn gazebo_file_name(config: &ExportConfig) -> String {
    format!("{}.gazebo", config.robot_name)
}

/// The rendered documents of one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Documents {
    pub robot: String,
    pub materials: String,
    pub transmissions: String,
    /// Present when simulation output is enabled
    pub gazebo: Option<String>,
}

impl Documents {
    /// Render all documents in memory; nothing touches the filesystem
    pub fn render(tree: &ResolvedTree, config: &ExportConfig) -> Result<Self> {
        let render_err = |e: std::io::Error| ExportError::io(robot_file_name(config), e);
        let gazebo = if config.simulation {
            Some(write_gazebo(tree, config).map_err(render_err)?)
        } else {
            None
        };
        Ok(Self {
            robot: write_robot_xacro(tree, config).map_err(render_err)?,
            materials: write_materials_xacro(tree, config).map_err(render_err)?,
            transmissions: write_transmissions(tree, config).map_err(render_err)?,
            gazebo,
        })
    }

    /// File names paired with their contents, in write order
    pub fn files(&self, config: &ExportConfig) -> Vec<(String, &str)> {
        let mut files = vec![
            (robot_file_name(config), self.robot.as_str()),
            (materials_file_name(), self.materials.as_str()),
            (transmissions_file_name(config), self.transmissions.as_str()),
        ];
        if let Some(gazebo) = &self.gazebo {
            files.push((gazebo_file_name(config), gazebo.as_str()));
        }
        files
    }

    /// Write every document into `dir`, creating it if needed.
    ///
    /// Stops at the first failure; files already written stay in place.
    pub fn write_to(&self, dir: &Path, config: &ExportConfig) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir).map_err(|e| ExportError::io(dir, e))?;
        let mut written = Vec::new();
        for (name, content) in self.files(config) {
            let path = dir.join(name);
            std::fs::write(&path, content).map_err(|e| ExportError::io(&path, e))?;
            tracing::debug!("Wrote {:?}", path);
            written.push(path);
        }
        tracing::info!("Wrote {} documents to {:?}", written.len(), dir);
        Ok(written)
    }
}

pub fn render_documents(tree: &ResolvedTree, config: &ExportConfig) -> Result<Documents> {
    Documents::render(tree, config)
}
