//! Assembly snapshot: what the CAD host reports about the current design
//!
//! The exporter never talks to a live CAD session. Instead the host's query
//! results (occurrences, body mass properties, joints, appearances) are
//! captured in an [`AssemblySnapshot`] and read through [`AssemblySource`].

use std::path::Path;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::inertia::InertiaMatrix;
use crate::types::Pose;

/// Query interface of the CAD host
pub trait AssemblySource {
    /// Name of the design's root component (used to derive the robot name)
    fn root_component_name(&self) -> &str;
    /// All occurrences, in the order the host enumerates them
    fn occurrences(&self) -> &[Occurrence];
    /// All joints, in the order the host enumerates them
    fn joints(&self) -> &[JointRecord];
    /// Appearance colours referenced by occurrences
    fn materials(&self) -> &[MaterialRecord];

    fn find_occurrence(&self, name: &str) -> Option<&Occurrence> {
        self.occurrences().iter().find(|o| o.name == name)
    }
}

fn visible() -> bool {
    true
}

/// Mass properties of one body, expressed in the assembly frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyMassRecord {
    /// Mass in kg
    pub mass: f64,
    /// Center of mass in cm
    pub center_of_mass: [f64; 3],
    /// Inertia about the assembly origin, `[xx, yy, zz, xy, yz, xz]` in kg·cm²
    pub inertia: [f64; 6],
}

impl BodyMassRecord {
    pub fn new(mass: f64, center_of_mass: [f64; 3], inertia: [f64; 6]) -> Self {
        Self {
            mass,
            center_of_mass,
            inertia,
        }
    }

    /// A point mass: its inertia about the origin is pure parallel-axis term
    pub fn point_mass(mass: f64, center_of_mass: [f64; 3]) -> Self {
        let term = InertiaMatrix::parallel_axis_term(mass, DVec3::from(center_of_mass));
        Self::new(mass, center_of_mass, term.to_components())
    }

    /// A solid cuboid aligned with the assembly axes
    pub fn cuboid(mass: f64, center_of_mass: [f64; 3], size: [f64; 3]) -> Self {
        let about_origin = InertiaMatrix::from_box(mass, DVec3::from(size))
            .shift_from_frame(mass, DVec3::from(center_of_mass));
        Self::new(mass, center_of_mass, about_origin.to_components())
    }

    pub fn com(&self) -> DVec3 {
        DVec3::from(self.center_of_mass)
    }

    pub fn inertia_about_origin(&self) -> InertiaMatrix {
        InertiaMatrix::from_components(self.inertia)
    }
}

/// A solid body of an occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub name: String,
    pub mass_properties: BodyMassRecord,
    #[serde(default = "visible")]
    pub visible: bool,
    /// Tessellation in assembly coordinates (cm), used for mesh export
    #[serde(default)]
    pub triangles: Vec<[[f64; 3]; 3]>,
}

impl Body {
    pub fn new(mass_properties: BodyMassRecord) -> Self {
        Self {
            name: String::new(),
            mass_properties,
            visible: true,
            triangles: Vec::new(),
        }
    }
}

/// A placed component instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Occurrence name as reported by the host, e.g. `arm:1`
    pub name: String,
    /// Component name, e.g. `arm`; defaults to the occurrence name
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub bodies: Vec<Body>,
    #[serde(default = "visible")]
    pub visible: bool,
    /// Appearance name
    #[serde(default)]
    pub material: Option<String>,
}

impl Occurrence {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            component: None,
            bodies: Vec::new(),
            visible: true,
            material: None,
        }
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn with_body(mut self, mass_properties: BodyMassRecord) -> Self {
        self.bodies.push(Body::new(mass_properties));
        self
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn component_name(&self) -> &str {
        self.component.as_deref().unwrap_or(&self.name)
    }

    /// Bodies that take part in the export; none when the occurrence is hidden
    pub fn visible_bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies
            .iter()
            .filter(move |b| self.visible && b.visible)
    }
}

/// Joint kinds the CAD host can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceJointKind {
    Rigid,
    Revolute,
    Slider,
    Cylindrical,
    PinSlot,
    Planar,
    Ball,
}

impl SourceJointKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceJointKind::Rigid => "Rigid",
            SourceJointKind::Revolute => "Revolute",
            SourceJointKind::Slider => "Slider",
            SourceJointKind::Cylindrical => "Cylindrical",
            SourceJointKind::PinSlot => "PinSlot",
            SourceJointKind::Planar => "Planar",
            SourceJointKind::Ball => "Ball",
        }
    }
}

fn default_axis() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}

/// A joint as reported by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointRecord {
    pub name: String,
    pub kind: SourceJointKind,
    /// Parent occurrence name
    pub parent: String,
    /// Child occurrence name
    pub child: String,
    /// Joint origin in the parent link's frame (cm, rad)
    #[serde(default)]
    pub origin: Pose,
    /// Motion axis in assembly coordinates
    #[serde(default = "default_axis")]
    pub axis: [f64; 3],
    /// Lower motion limit (rad for revolute, cm for slider)
    #[serde(default)]
    pub lower: Option<f64>,
    /// Upper motion limit (rad for revolute, cm for slider)
    #[serde(default)]
    pub upper: Option<f64>,
}

impl JointRecord {
    /// Create a builder for constructing joint records with fluent API
    pub fn builder(
        name: impl Into<String>,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) -> JointRecordBuilder {
        JointRecordBuilder::new(name, parent, child)
    }
}

/// Builder for joint records
#[derive(Debug, Clone)]
pub struct JointRecordBuilder {
    record: JointRecord,
}

impl JointRecordBuilder {
    pub fn new(name: impl Into<String>, parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            record: JointRecord {
                name: name.into(),
                kind: SourceJointKind::Rigid,
                parent: parent.into(),
                child: child.into(),
                origin: Pose::default(),
                axis: default_axis(),
                lower: None,
                upper: None,
            },
        }
    }

    pub fn kind(mut self, kind: SourceJointKind) -> Self {
        self.record.kind = kind;
        self
    }

    pub fn rigid(self) -> Self {
        self.kind(SourceJointKind::Rigid)
    }

    pub fn revolute(self) -> Self {
        self.kind(SourceJointKind::Revolute)
    }

    pub fn slider(self) -> Self {
        self.kind(SourceJointKind::Slider)
    }

    /// Set the joint origin position (cm)
    pub fn xyz(mut self, x: f64, y: f64, z: f64) -> Self {
        self.record.origin.xyz = [x, y, z];
        self
    }

    /// Set the joint origin rotation (roll, pitch, yaw)
    pub fn rpy(mut self, roll: f64, pitch: f64, yaw: f64) -> Self {
        self.record.origin.rpy = [roll, pitch, yaw];
        self
    }

    pub fn axis_xyz(mut self, x: f64, y: f64, z: f64) -> Self {
        self.record.axis = [x, y, z];
        self
    }

    pub fn limits(mut self, lower: f64, upper: f64) -> Self {
        self.record.lower = Some(lower);
        self.record.upper = Some(upper);
        self
    }

    pub fn lower(mut self, lower: f64) -> Self {
        self.record.lower = Some(lower);
        self
    }

    pub fn upper(mut self, upper: f64) -> Self {
        self.record.upper = Some(upper);
        self
    }

    pub fn build(self) -> JointRecord {
        self.record
    }
}

/// Named RGBA colour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub name: String,
    pub rgba: [f64; 4],
}

impl MaterialRecord {
    pub fn new(name: impl Into<String>, rgba: [f64; 4]) -> Self {
        Self {
            name: name.into(),
            rgba,
        }
    }

    /// The exporter's fallback appearance
    pub fn silver() -> Self {
        Self::new("silver", [0.7, 0.7, 0.7, 1.0])
    }
}

/// Errors loading a snapshot file
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid RON snapshot: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("Invalid JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported snapshot format: {0} (expected .ron or .json)")]
    UnsupportedFormat(String),
}

/// Serialized capture of the host's query results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblySnapshot {
    pub root_component: String,
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
    #[serde(default)]
    pub joints: Vec<JointRecord>,
    #[serde(default)]
    pub materials: Vec<MaterialRecord>,
}

impl AssemblySnapshot {
    pub fn new(root_component: impl Into<String>) -> Self {
        Self {
            root_component: root_component.into(),
            ..Default::default()
        }
    }

    pub fn with_occurrence(mut self, occurrence: Occurrence) -> Self {
        self.occurrences.push(occurrence);
        self
    }

    pub fn with_joint(mut self, joint: JointRecord) -> Self {
        self.joints.push(joint);
        self
    }

    pub fn with_material(mut self, material: MaterialRecord) -> Self {
        self.materials.push(material);
        self
    }

    /// Load a snapshot, choosing the format by file extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let snapshot = match extension.as_str() {
            "ron" => Self::from_ron_str(&content)?,
            "json" => Self::from_json_str(&content)?,
            other => return Err(SnapshotError::UnsupportedFormat(other.to_string())),
        };
        tracing::info!(
            "Loaded snapshot {:?}: {} occurrences, {} joints",
            path,
            snapshot.occurrences.len(),
            snapshot.joints.len()
        );
        Ok(snapshot)
    }

    pub fn from_ron_str(content: &str) -> Result<Self, SnapshotError> {
        Ok(ron::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(content)?)
    }
}

impl AssemblySource for AssemblySnapshot {
    fn root_component_name(&self) -> &str {
        &self.root_component
    }

    fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    fn joints(&self) -> &[JointRecord] {
        &self.joints
    }

    fn materials(&self) -> &[MaterialRecord] {
        &self.materials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_occurrence_has_no_visible_bodies() {
        let occ = Occurrence::new("arm:1")
            .with_body(BodyMassRecord::point_mass(1.0, [0.0, 0.0, 0.0]))
            .hidden();
        assert_eq!(occ.visible_bodies().count(), 0);
    }

    #[test]
    fn test_hidden_body_is_skipped() {
        let mut occ = Occurrence::new("arm:1")
            .with_body(BodyMassRecord::point_mass(1.0, [0.0, 0.0, 0.0]))
            .with_body(BodyMassRecord::point_mass(2.0, [1.0, 0.0, 0.0]));
        occ.bodies[0].visible = false;
        let masses: Vec<f64> = occ
            .visible_bodies()
            .map(|b| b.mass_properties.mass)
            .collect();
        assert_eq!(masses, vec![2.0]);
    }

    #[test]
    fn test_component_name_defaults_to_occurrence_name() {
        assert_eq!(Occurrence::new("arm:1").component_name(), "arm:1");
        assert_eq!(
            Occurrence::new("base_link:1")
                .with_component("base_link")
                .component_name(),
            "base_link"
        );
    }

    #[test]
    fn test_snapshot_ron_defaults() {
        let snapshot = AssemblySnapshot::from_ron_str(
            r#"(
                root_component: "Robot v3",
                occurrences: [
                    (
                        name: "base_link:1",
                        component: Some("base_link"),
                        bodies: [
                            (mass_properties: (mass: 1.0, center_of_mass: (0.0, 0.0, 1.0), inertia: (1.0, 1.0, 1.0, 0.0, 0.0, 0.0))),
                        ],
                    ),
                ],
                joints: [
                    (name: "Rev1", kind: Revolute, parent: "base_link:1", child: "arm:1", lower: Some(-1.0), upper: Some(1.0)),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(snapshot.root_component_name(), "Robot v3");
        let occ = &snapshot.occurrences[0];
        assert!(occ.visible);
        assert!(occ.bodies[0].visible);
        let joint = &snapshot.joints[0];
        assert_eq!(joint.axis, [0.0, 0.0, 1.0]);
        assert_eq!(joint.origin, Pose::default());
        assert_eq!(joint.kind, SourceJointKind::Revolute);
    }

    #[test]
    fn test_snapshot_json() {
        let snapshot = AssemblySnapshot::from_json_str(
            r#"{"root_component": "bot", "occurrences": [{"name": "base_link"}], "joints": []}"#,
        )
        .unwrap();
        assert_eq!(snapshot.occurrences.len(), 1);
        assert!(snapshot.materials.is_empty());
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.yaml");
        std::fs::write(&path, "root_component: x").unwrap();
        assert!(matches!(
            AssemblySnapshot::load(&path),
            Err(SnapshotError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_cuboid_is_consistent_with_point_mass_offset() {
        let body = BodyMassRecord::cuboid(2.0, [3.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let about_com = body.inertia_about_origin().shift_to_frame(2.0, body.com());
        assert!(about_com.abs_diff_eq(&InertiaMatrix::from_box(2.0, glam::DVec3::ONE), 1e-6));
    }
}
