//! End-to-end export: snapshot in, ROS description package out

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::assembly::AssemblySource;
use crate::config::ExportConfig;
use crate::error::Result;
use crate::export::Documents;
use crate::package::PackageWriter;
use crate::stl::MeshExporter;
use crate::tree::{KinematicTree, ResolvedTree, build_tree, resolve_frames};

/// Everything derived from a snapshot before any file is written
#[derive(Debug, Clone)]
pub struct RobotModel {
    pub tree: KinematicTree,
    pub resolved: ResolvedTree,
    pub documents: Documents,
}

/// Files produced by [`export_package`]
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub package_root: PathBuf,
    pub meshes: Vec<PathBuf>,
    pub documents: Vec<PathBuf>,
    pub package_files: Vec<PathBuf>,
}

impl ExportReport {
    pub fn file_count(&self) -> usize {
        self.meshes.len() + self.documents.len() + self.package_files.len()
    }
}

/// Validate the assembly and render all documents in memory
pub fn build_robot<S: AssemblySource + ?Sized>(
    source: &S,
    config: &ExportConfig,
) -> Result<RobotModel> {
    let tree = build_tree(source, config)?;
    let resolved = resolve_frames(&tree);
    let documents = Documents::render(&resolved, config)?;
    tracing::info!(
        "Built robot '{}': {} links, {} joints",
        config.robot_name,
        tree.link_count(),
        tree.joint_count()
    );
    Ok(RobotModel {
        tree,
        resolved,
        documents,
    })
}

/// Export a complete description package to `<out_dir>/<package_name>`.
///
/// Every validation error is raised before the first write. A failure while
/// writing aborts the remaining writes; files already written are kept.
pub fn export_package<S, M>(
    source: &S,
    config: &ExportConfig,
    out_dir: &Path,
    mesh_exporter: &M,
) -> Result<ExportReport>
where
    S: AssemblySource + ?Sized,
    M: MeshExporter + ?Sized,
{
    let model = build_robot(source, config)?;

    let package_root = out_dir.join(config.package_name());
    let package = PackageWriter::new(&package_root, config);
    package.create_dirs()?;

    let mesh_dir = package.mesh_dir();
    let mut meshes = Vec::new();
    let mut stems = HashSet::new();
    for link in model.tree.links() {
        if !stems.insert(link.mesh_stem.as_str()) {
            tracing::debug!("Mesh '{}' already written, skipping link '{}'", link.mesh_stem, link.name);
            continue;
        }
        let Some(occurrence) = source.find_occurrence(&link.occurrence) else {
            tracing::warn!("Occurrence '{}' disappeared from the source", link.occurrence);
            continue;
        };
        meshes.push(mesh_exporter.export(occurrence, &link.mesh_stem, &mesh_dir)?);
    }
    tracing::info!("Exported {} meshes to {:?}", meshes.len(), mesh_dir);

    let documents = model.documents.write_to(&package.urdf_dir(), config)?;
    let package_files = package.write()?;

    Ok(ExportReport {
        package_root,
        meshes,
        documents,
        package_files,
    })
}
