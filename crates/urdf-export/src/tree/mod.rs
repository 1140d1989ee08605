//! Kinematic tree: links connected by joints, rooted and acyclic
//!
//! Links and joints are stored in breadth-first order from the root; every
//! consumer iterates these vectors and never the lookup maps, which keeps the
//! output independent of hash ordering.

mod builder;
mod resolve;

pub use builder::*;
pub use resolve::*;

use std::collections::HashMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::assembly::MaterialRecord;
use crate::inertial::InertialRecord;
use crate::transform::RigidTransform;
use crate::types::{JointLimits, JointType, Pose};

/// A rigid body of the robot, one per surviving occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    /// Occurrence the link was built from
    pub occurrence: String,
    pub mesh_stem: String,
    pub material: MaterialRecord,
    /// Aggregated mass properties in assembly coordinates
    pub inertial: InertialRecord,
}

/// A joint connecting two links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeJoint {
    pub name: String,
    pub joint_type: JointType,
    pub parent: String,
    pub child: String,
    /// Child frame in the parent link's frame (cm, rad)
    pub origin: Pose,
    /// Unit motion axis in assembly coordinates.
    ///
    /// Not yet in the form a document needs: `<axis>` is read in the child
    /// link frame, so [`resolve_frames`] rotates it by that frame first.
    pub axis: DVec3,
    /// Position limits in source units (rad or cm)
    pub limits: Option<JointLimits>,
}

/// Rooted link/joint graph
#[derive(Debug, Clone, Default)]
pub struct KinematicTree {
    links: Vec<Link>,
    joints: Vec<TreeJoint>,
    link_index: HashMap<String, usize>,
    /// Parent joint index per link
    parent: HashMap<String, usize>,
    /// Child joint indices per link, in attach order
    children: HashMap<String, Vec<usize>>,
}

impl KinematicTree {
    /// Assemble a tree from links and joints already in traversal order.
    ///
    /// The first link is the root. Callers are expected to have validated
    /// the structure; see [`build_tree`].
    pub(crate) fn from_ordered(links: Vec<Link>, joints: Vec<TreeJoint>) -> Self {
        let link_index = links
            .iter()
            .enumerate()
            .map(|(i, link)| (link.name.clone(), i))
            .collect();
        let mut parent = HashMap::new();
        let mut children: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, joint) in joints.iter().enumerate() {
            parent.insert(joint.child.clone(), i);
            children.entry(joint.parent.clone()).or_default().push(i);
        }
        Self {
            links,
            joints,
            link_index,
            parent,
            children,
        }
    }

    pub fn root(&self) -> Option<&Link> {
        self.links.first()
    }

    /// Links in breadth-first order, root first
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Joints in breadth-first order
    pub fn joints(&self) -> &[TreeJoint] {
        &self.joints
    }

    pub fn link(&self, name: &str) -> Option<&Link> {
        self.link_index.get(name).map(|&i| &self.links[i])
    }

    pub fn parent_joint(&self, link: &str) -> Option<&TreeJoint> {
        self.parent.get(link).map(|&i| &self.joints[i])
    }

    pub fn child_joints(&self, link: &str) -> impl Iterator<Item = &TreeJoint> {
        self.children
            .get(link)
            .into_iter()
            .flatten()
            .map(|&i| &self.joints[i])
    }

    /// Link names from `link` up to the root, inclusive
    pub fn chain_to_root(&self, link: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = self.link(link).map(|l| l.name.as_str());
        while let Some(name) = current {
            chain.push(name.to_string());
            current = self.parent_joint(name).map(|j| j.parent.as_str());
        }
        chain
    }

    /// Pose of the link frame in assembly coordinates (link-local to assembly)
    pub fn world_transform(&self, link: &str) -> RigidTransform {
        let mut transform = RigidTransform::IDENTITY;
        for name in self.chain_to_root(link).iter().rev() {
            if let Some(joint) = self.parent_joint(name) {
                transform = transform.compose(&joint.origin.to_transform());
            }
        }
        transform
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }
}
