//! Mesh export as binary STL

use std::io::BufReader;
use std::path::{Path, PathBuf};

use glam::DVec3;

use crate::assembly::Occurrence;

/// Millimetres per centimetre; meshes are written in mm and scaled by 0.001
pub const MM_PER_CM: f64 = 10.0;

/// Writes one mesh file per link
pub trait MeshExporter {
    /// Export the visible bodies of `occurrence` to `<dir>/<file_stem>.stl`
    fn export(&self, occurrence: &Occurrence, file_stem: &str, dir: &Path)
    -> Result<PathBuf, StlError>;
}

/// Writes the snapshot's body tessellation as binary STL
#[derive(Debug, Clone, Copy)]
pub struct StlMeshExporter {
    /// Factor from snapshot units (cm) to file units
    pub unit_scale: f64,
}

impl Default for StlMeshExporter {
    fn default() -> Self {
        Self {
            unit_scale: MM_PER_CM,
        }
    }
}

/// Skips mesh output entirely
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMeshExporter;

impl MeshExporter for NoMeshExporter {
    fn export(
        &self,
        _occurrence: &Occurrence,
        file_stem: &str,
        dir: &Path,
    ) -> Result<PathBuf, StlError> {
        Ok(dir.join(format!("{}.stl", file_stem)))
    }
}

fn face_normal(v0: DVec3, v1: DVec3, v2: DVec3) -> [f32; 3] {
    let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
    if normal == DVec3::ZERO {
        [0.0, 0.0, 1.0]
    } else {
        normal.as_vec3().to_array()
    }
}

impl StlMeshExporter {
    fn triangles(&self, occurrence: &Occurrence) -> Vec<stl_io::Triangle> {
        occurrence
            .visible_bodies()
            .flat_map(|body| body.triangles.iter())
            .map(|tri| {
                let [v0, v1, v2] = (*tri).map(|v| DVec3::from(v) * self.unit_scale);
                stl_io::Triangle {
                    normal: stl_io::Normal::new(face_normal(v0, v1, v2)),
                    vertices: [
                        stl_io::Vertex::new(v0.as_vec3().to_array()),
                        stl_io::Vertex::new(v1.as_vec3().to_array()),
                        stl_io::Vertex::new(v2.as_vec3().to_array()),
                    ],
                }
            })
            .collect()
    }
}

impl MeshExporter for StlMeshExporter {
    fn export(
        &self,
        occurrence: &Occurrence,
        file_stem: &str,
        dir: &Path,
    ) -> Result<PathBuf, StlError> {
        let path = dir.join(format!("{}.stl", file_stem));
        let triangles = self.triangles(occurrence);
        if triangles.is_empty() {
            tracing::warn!("Occurrence '{}' has no tessellation, writing an empty mesh", occurrence.name);
        }

        let mut file = std::fs::File::create(&path)
            .map_err(|e| StlError::Io(format!("{}: {}", path.display(), e)))?;
        stl_io::write_stl(&mut file, triangles.iter())
            .map_err(|e| StlError::Write(e.to_string()))?;
        tracing::debug!("Wrote {} triangles to {:?}", triangles.len(), path);
        Ok(path)
    }
}

/// Read back the triangles of an STL file (file units)
pub fn load_stl_triangles(path: impl AsRef<Path>) -> Result<Vec<[[f32; 3]; 3]>, StlError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| StlError::Io(e.to_string()))?;
    let mut reader = BufReader::new(file);
    let mesh = stl_io::read_stl(&mut reader).map_err(|e| StlError::Parse(e.to_string()))?;

    Ok(mesh
        .faces
        .iter()
        .map(|face| {
            face.vertices.map(|i| {
                let v = mesh.vertices[i];
                [v[0], v[1], v[2]]
            })
        })
        .collect())
}

/// STL-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum StlError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Write error: {0}")]
    Write(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{Body, BodyMassRecord};

    fn occurrence() -> Occurrence {
        let mut body = Body::new(BodyMassRecord::point_mass(1.0, [0.0, 0.0, 0.0]));
        body.triangles = vec![[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 2.0, 0.0]]];
        let mut hidden = body.clone();
        hidden.visible = false;
        hidden.triangles = vec![[[5.0, 5.0, 5.0], [6.0, 5.0, 5.0], [5.0, 6.0, 5.0]]];

        let mut occ = Occurrence::new("arm:1");
        occ.bodies = vec![body, hidden];
        occ
    }

    #[test]
    fn test_writes_visible_triangles_in_millimetres() {
        let dir = tempfile::tempdir().unwrap();
        let path = StlMeshExporter::default()
            .export(&occurrence(), "arm_1", dir.path())
            .unwrap();
        assert_eq!(path, dir.path().join("arm_1.stl"));

        let triangles = load_stl_triangles(&path).unwrap();
        assert_eq!(triangles.len(), 1);
        assert_eq!(triangles[0][1], [10.0, 0.0, 0.0]);
        assert_eq!(triangles[0][2], [0.0, 20.0, 0.0]);
    }

    #[test]
    fn test_face_normal() {
        let n = face_normal(DVec3::ZERO, DVec3::X, DVec3::Y);
        assert_eq!(n, [0.0, 0.0, 1.0]);
        let degenerate = face_normal(DVec3::ZERO, DVec3::X, DVec3::X * 2.0);
        assert_eq!(degenerate, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = StlMeshExporter::default().export(
            &occurrence(),
            "arm_1",
            &dir.path().join("missing"),
        );
        assert!(matches!(result, Err(StlError::Io(_))));
    }
}
