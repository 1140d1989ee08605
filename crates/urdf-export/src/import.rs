//! Read a produced robot description back into internal units
//!
//! Used to check that a written document describes the same tree: lengths
//! return to centimetres and inertia to kg·cm².

use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use glam::DVec3;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::export::{CM_PER_M, KG_CM2_PER_KG_M2};
use crate::inertia::InertiaMatrix;
use crate::inertial::InertialRecord;
use crate::types::{JointLimits, JointType, Pose};

/// Errors that can occur while reading a description
#[derive(Debug, Clone, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to parse URDF: {0}")]
    UrdfParse(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Unsupported joint type '{joint_type}' for joint '{joint}'")]
    UnsupportedJointType { joint: String, joint_type: String },
}

/// A link as read from a document
#[derive(Debug, Clone, PartialEq)]
pub struct DescribedLink {
    pub name: String,
    pub mass: f64,
    /// cm, link frame
    pub center_of_mass: DVec3,
    /// kg·cm² about the center of mass
    pub inertia: InertiaMatrix,
    /// Origin of the first visual (cm, rad)
    pub visual_origin: Pose,
    pub mesh: Option<String>,
    pub material: Option<String>,
}

impl DescribedLink {
    pub fn inertial(&self) -> InertialRecord {
        InertialRecord::new(self.mass, self.center_of_mass, self.inertia)
    }
}

/// A joint as read from a document
#[derive(Debug, Clone, PartialEq)]
pub struct DescribedJoint {
    pub name: String,
    pub joint_type: JointType,
    pub parent: String,
    pub child: String,
    /// cm, rad
    pub origin: Pose,
    pub axis: DVec3,
    /// Position limits in rad or cm
    pub limits: Option<JointLimits>,
}

/// Robot description in internal units
#[derive(Debug, Clone, PartialEq)]
pub struct RobotDescription {
    pub name: String,
    pub links: Vec<DescribedLink>,
    pub joints: Vec<DescribedJoint>,
}

impl RobotDescription {
    pub fn link(&self, name: &str) -> Option<&DescribedLink> {
        self.links.iter().find(|l| l.name == name)
    }

    pub fn joint(&self, name: &str) -> Option<&DescribedJoint> {
        self.joints.iter().find(|j| j.name == name)
    }
}

fn is_xacro(name: &[u8]) -> bool {
    name.starts_with(b"xacro:")
}

/// Plain description text plus what urdf-rs cannot tell us
struct Prepared {
    xml: String,
    /// Joints whose `<limit>` carries `lower`/`upper` attributes
    ranged_joints: HashSet<String>,
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn has_range(limit: &BytesStart) -> bool {
    limit
        .attributes()
        .flatten()
        .any(|a| matches!(a.key.as_ref(), b"lower" | b"upper"))
}

/// Drop `xacro:*` elements, which are not part of the description schema,
/// and note which joint limits state a range.
///
/// urdf-rs fills missing `lower`/`upper` with zero, so an explicit `[0, 0]`
/// range is only distinguishable from an unbounded limit here.
fn prepare(xml: &str) -> Result<Prepared, ImportError> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut skip_depth = 0usize;
    let mut joint: Option<String> = None;
    let mut ranged_joints = HashSet::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ImportError::UrdfParse(e.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) if skip_depth > 0 || is_xacro(e.name().as_ref()) => {
                skip_depth += 1;
                continue;
            }
            Event::End(_) if skip_depth > 0 => {
                skip_depth -= 1;
                continue;
            }
            Event::Empty(ref e) if is_xacro(e.name().as_ref()) => continue,
            _ if skip_depth > 0 => continue,
            Event::Start(ref e) if e.name().as_ref() == b"joint" => {
                joint = attr_value(e, b"name");
            }
            Event::End(ref e) if e.name().as_ref() == b"joint" => joint = None,
            Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"limit" => {
                if let Some(name) = joint.as_ref().filter(|_| has_range(e)) {
                    ranged_joints.insert(name.clone());
                }
            }
            _ => {}
        }
        writer
            .write_event(event)
            .map_err(|e| ImportError::UrdfParse(e.to_string()))?;
    }

    let xml = String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| ImportError::UrdfParse(e.to_string()))?;
    Ok(Prepared { xml, ranged_joints })
}

fn pose_to_cm(pose: &urdf_rs::Pose) -> Pose {
    Pose::from(pose).scaled(CM_PER_M)
}

fn convert_inertia(inertia: &urdf_rs::Inertia) -> InertiaMatrix {
    InertiaMatrix {
        ixx: inertia.ixx,
        iyy: inertia.iyy,
        izz: inertia.izz,
        ixy: inertia.ixy,
        iyz: inertia.iyz,
        ixz: inertia.ixz,
    }
    .scaled(KG_CM2_PER_KG_M2)
}

fn convert_link(link: &urdf_rs::Link) -> DescribedLink {
    let visual = link.visual.first();
    let mesh = visual.and_then(|v| match &v.geometry {
        urdf_rs::Geometry::Mesh { filename, .. } => Some(filename.clone()),
        _ => None,
    });
    DescribedLink {
        name: link.name.clone(),
        mass: link.inertial.mass.value,
        center_of_mass: DVec3::from(link.inertial.origin.xyz.0) * CM_PER_M,
        inertia: convert_inertia(&link.inertial.inertia),
        visual_origin: visual.map(|v| pose_to_cm(&v.origin)).unwrap_or_default(),
        mesh,
        material: visual.and_then(|v| v.material.as_ref().map(|m| m.name.clone())),
    }
}

fn convert_joint(joint: &urdf_rs::Joint, ranged: bool) -> Result<DescribedJoint, ImportError> {
    let joint_type =
        JointType::try_from(&joint.joint_type).map_err(|joint_type| {
            ImportError::UnsupportedJointType {
                joint: joint.name.clone(),
                joint_type,
            }
        })?;

    let limits = if joint_type.has_limits() {
        let scale = if joint_type.is_linear() { CM_PER_M } else { 1.0 };
        let limit = &joint.limit;
        Some(JointLimits {
            lower: ranged.then_some(limit.lower * scale),
            upper: ranged.then_some(limit.upper * scale),
            effort: limit.effort,
            velocity: limit.velocity,
        })
    } else {
        None
    };

    Ok(DescribedJoint {
        name: joint.name.clone(),
        joint_type,
        parent: joint.parent.link.clone(),
        child: joint.child.link.clone(),
        origin: pose_to_cm(&joint.origin),
        axis: DVec3::from(joint.axis.xyz.0),
        limits,
    })
}

/// Parse a main description document
pub fn read_description(xml: &str) -> Result<RobotDescription, ImportError> {
    let prepared = prepare(xml)?;
    let robot = urdf_rs::read_from_string(&prepared.xml)
        .map_err(|e| ImportError::UrdfParse(e.to_string()))?;

    let joints = robot
        .joints
        .iter()
        .map(|j| convert_joint(j, prepared.ranged_joints.contains(&j.name)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RobotDescription {
        name: robot.name.clone(),
        links: robot.links.iter().map(convert_link).collect(),
        joints,
    })
}

pub fn read_description_file(path: impl AsRef<Path>) -> Result<RobotDescription, ImportError> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path)
        .map_err(|e| ImportError::Io(format!("{}: {}", path.display(), e)))?;
    read_description(&xml)
}
