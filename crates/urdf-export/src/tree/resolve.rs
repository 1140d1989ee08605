//! Frame resolution: express every link and joint in its own local frame

use std::collections::HashMap;

use glam::DVec3;

use crate::assembly::MaterialRecord;
use crate::inertia::round_to;
use crate::inertial::InertialRecord;
use crate::transform::RigidTransform;
use crate::types::{JointLimits, JointType, Pose};

use super::KinematicTree;

/// Decimal digits kept on joint axis components
pub const AXIS_DECIMALS: i32 = 6;

/// A link with its mass properties in its own frame
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLink {
    pub name: String,
    pub mesh_stem: String,
    pub material: MaterialRecord,
    /// Assembly-to-link transform; the root's is the identity
    pub frame: RigidTransform,
    /// Mass properties in the link frame, tensor about the center of mass
    pub inertial: InertialRecord,
}

impl ResolvedLink {
    /// Express the link's inertial record back in assembly coordinates
    pub fn unresolve_inertial(&self) -> InertialRecord {
        self.inertial.transformed(&self.frame.inverse())
    }

    /// Placement of the link's meshes, which are exported in assembly coordinates
    pub fn mesh_origin(&self) -> Pose {
        Pose::from_transform(&self.frame)
    }
}

/// A joint ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedJoint {
    pub name: String,
    pub joint_type: JointType,
    pub parent: String,
    pub child: String,
    /// Child frame in the parent frame (cm, rad)
    pub origin: Pose,
    /// Unit axis in the joint (child) frame, as `<axis>` expects it.
    /// Components are rounded to [`AXIS_DECIMALS`] digits.
    pub axis: DVec3,
    pub limits: Option<JointLimits>,
}

/// Tree with all quantities in link-local frames, in traversal order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedTree {
    pub links: Vec<ResolvedLink>,
    pub joints: Vec<ResolvedJoint>,
}

impl ResolvedTree {
    pub fn root(&self) -> Option<&ResolvedLink> {
        self.links.first()
    }

    pub fn link(&self, name: &str) -> Option<&ResolvedLink> {
        self.links.iter().find(|l| l.name == name)
    }

    pub fn joint(&self, name: &str) -> Option<&ResolvedJoint> {
        self.joints.iter().find(|j| j.name == name)
    }
}

/// Compute every link's assembly-to-local transform and re-express inertial
/// records and joint axes in it.
///
/// Walks root to leaves: with the joint origin `T` given in the parent frame,
/// the child frame is `A_child = T⁻¹ ∘ A_parent`.
pub fn resolve_frames(tree: &KinematicTree) -> ResolvedTree {
    let mut frames: HashMap<&str, RigidTransform> = HashMap::new();
    if let Some(root) = tree.root() {
        frames.insert(root.name.as_str(), RigidTransform::IDENTITY);
    }

    let mut joints = Vec::with_capacity(tree.joint_count());
    for joint in tree.joints() {
        let parent_frame = frames
            .get(joint.parent.as_str())
            .copied()
            .unwrap_or(RigidTransform::IDENTITY);
        let child_frame = joint.origin.to_transform().inverse().compose(&parent_frame);
        frames.insert(joint.child.as_str(), child_frame);

        let axis = child_frame.apply_to_vector(joint.axis).normalize_or_zero();
        joints.push(ResolvedJoint {
            name: joint.name.clone(),
            joint_type: joint.joint_type,
            parent: joint.parent.clone(),
            child: joint.child.clone(),
            origin: joint.origin,
            axis: DVec3::new(
                round_to(axis.x, AXIS_DECIMALS),
                round_to(axis.y, AXIS_DECIMALS),
                round_to(axis.z, AXIS_DECIMALS),
            ),
            limits: joint.limits,
        });
    }

    let links = tree
        .links()
        .iter()
        .map(|link| {
            let frame = frames
                .get(link.name.as_str())
                .copied()
                .unwrap_or(RigidTransform::IDENTITY);
            ResolvedLink {
                name: link.name.clone(),
                mesh_stem: link.mesh_stem.clone(),
                material: link.material.clone(),
                frame,
                inertial: link.inertial.transformed(&frame),
            }
        })
        .collect();

    ResolvedTree { links, joints }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{AssemblySnapshot, BodyMassRecord, JointRecord, Occurrence};
    use crate::config::ExportConfig;
    use crate::tree::build_tree;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn rotated_arm() -> ResolvedTree {
        // arm frame sits 10 cm along x, turned a quarter turn about z
        let snapshot = AssemblySnapshot::new("bot")
            .with_occurrence(
                Occurrence::new("base_link")
                    .with_body(BodyMassRecord::cuboid(2.0, [0.0, 0.0, 1.0], [4.0, 4.0, 2.0])),
            )
            .with_occurrence(
                Occurrence::new("arm")
                    .with_body(BodyMassRecord::cuboid(0.5, [10.0, 3.0, 0.0], [1.0, 6.0, 1.0])),
            )
            .with_joint(
                JointRecord::builder("shoulder", "base_link", "arm")
                    .revolute()
                    .xyz(10.0, 0.0, 0.0)
                    .rpy(0.0, 0.0, FRAC_PI_2)
                    .axis_xyz(0.0, 1.0, 0.0)
                    .limits(-1.0, 1.0)
                    .build(),
            );
        resolve_frames(&build_tree(&snapshot, &ExportConfig::default()).unwrap())
    }

    #[test]
    fn test_root_frame_is_identity() {
        let resolved = rotated_arm();
        let root = resolved.root().unwrap();
        assert!(root.frame.is_identity(1e-12));
        assert_abs_diff_eq!(root.inertial.center_of_mass.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_child_inertial_in_local_frame() {
        let resolved = rotated_arm();
        let arm = resolved.link("arm").unwrap();
        // assembly (10, 3, 0) is 3 cm along the arm's local x
        let com = arm.inertial.center_of_mass;
        assert_abs_diff_eq!(com.x, 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(com.y, 0.0, epsilon = 1e-9);
        // the long side (assembly y) is local x, so ixx is now the small moment
        let about_com = arm.inertial.inertia;
        assert_abs_diff_eq!(about_com.ixx, 0.5 / 12.0 * 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(about_com.iyy, 0.5 / 12.0 * 37.0, epsilon = 1e-6);
    }

    #[test]
    fn test_axis_rotated_into_joint_frame() {
        let resolved = rotated_arm();
        let shoulder = resolved.joint("shoulder").unwrap();
        assert_eq!(shoulder.axis, DVec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_unresolve_recovers_assembly_record() {
        let resolved = rotated_arm();
        let arm = resolved.link("arm").unwrap();
        let back = arm.unresolve_inertial();
        assert_abs_diff_eq!(back.center_of_mass.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(back.center_of_mass.y, 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(back.inertia.iyy, 0.5 / 12.0 * 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_mesh_origin_is_inverse_placement() {
        let resolved = rotated_arm();
        let origin = resolved.link("arm").unwrap().mesh_origin();
        // assembly origin seen from the arm: 10 cm behind along local y after the turn
        assert_abs_diff_eq!(origin.xyz[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(origin.xyz[1], 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(origin.rpy[2], -FRAC_PI_2, epsilon = 1e-9);
    }
}
