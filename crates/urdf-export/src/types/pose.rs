//! Pose type definition

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::transform::RigidTransform;

/// Pose (position and orientation)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub xyz: [f64; 3],
    pub rpy: [f64; 3], // roll, pitch, yaw in radians
}

impl Pose {
    pub fn new(xyz: [f64; 3], rpy: [f64; 3]) -> Self {
        Self { xyz, rpy }
    }

    pub fn from_position(xyz: [f64; 3]) -> Self {
        Self { xyz, rpy: [0.0; 3] }
    }

    pub fn to_transform(&self) -> RigidTransform {
        RigidTransform::from_rpy(DVec3::from(self.rpy), DVec3::from(self.xyz))
    }

    pub fn from_transform(transform: &RigidTransform) -> Self {
        Self {
            xyz: transform.translation.to_array(),
            rpy: transform.rpy().to_array(),
        }
    }

    /// Get position as DVec3
    pub fn position(&self) -> DVec3 {
        DVec3::from(self.xyz)
    }

    /// Scale the translation, e.g. for a length unit change
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            xyz: (self.position() * factor).to_array(),
            rpy: self.rpy,
        }
    }
}

impl From<&urdf_rs::Pose> for Pose {
    fn from(urdf_pose: &urdf_rs::Pose) -> Self {
        Self {
            xyz: urdf_pose.xyz.0,
            rpy: urdf_pose.rpy.0,
        }
    }
}
