//! Rigid transforms (rotation + translation) in double precision
//!
//! Right-handed, lengths in centimetres. `compose(a, b)` applies `b` first,
//! then `a`, matching matrix multiplication order.

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

/// Tolerance used when comparing transforms for equality
pub const TRANSFORM_EPSILON: f64 = 1e-9;

/// A proper rigid transform: `p' = rotation * p + translation`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    pub rotation: DMat3,
    pub translation: DVec3,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl RigidTransform {
    pub const IDENTITY: Self = Self {
        rotation: DMat3::IDENTITY,
        translation: DVec3::ZERO,
    };

    pub fn new(rotation: DMat3, translation: DVec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn from_translation(translation: DVec3) -> Self {
        Self {
            rotation: DMat3::IDENTITY,
            translation,
        }
    }

    /// Build from URDF-style fixed-axis roll/pitch/yaw: `R = Rz(yaw) * Ry(pitch) * Rx(roll)`
    pub fn from_rpy(rpy: DVec3, translation: DVec3) -> Self {
        let rotation = DMat3::from_rotation_z(rpy.z)
            * DMat3::from_rotation_y(rpy.y)
            * DMat3::from_rotation_x(rpy.x);
        Self {
            rotation,
            translation,
        }
    }

    /// Transform equivalent to applying `other` first, then `self`
    pub fn compose(&self, other: &RigidTransform) -> RigidTransform {
        RigidTransform {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    /// Exact inverse; the rotation part is orthonormal so its transpose is its inverse
    pub fn inverse(&self) -> RigidTransform {
        let rotation = self.rotation.transpose();
        RigidTransform {
            rotation,
            translation: -(rotation * self.translation),
        }
    }

    pub fn apply_to_point(&self, point: DVec3) -> DVec3 {
        self.rotation * point + self.translation
    }

    /// Vectors are direction-only and ignore the translation
    pub fn apply_to_vector(&self, vector: DVec3) -> DVec3 {
        self.rotation * vector
    }

    /// Roll/pitch/yaw of the rotation part (inverse of [`RigidTransform::from_rpy`])
    pub fn rpy(&self) -> DVec3 {
        let m = &self.rotation;
        // Row/column access: element (row i, col j) is m.col(j)[i]
        let r00 = m.x_axis.x;
        let r10 = m.x_axis.y;
        let r20 = m.x_axis.z;
        let r01 = m.y_axis.x;
        let r11 = m.y_axis.y;
        let r21 = m.y_axis.z;
        let r22 = m.z_axis.z;

        let pitch = (-r20).clamp(-1.0, 1.0).asin();
        if pitch.cos() > 1e-9 {
            let roll = r21.atan2(r22);
            let yaw = r10.atan2(r00);
            DVec3::new(roll, pitch, yaw)
        } else {
            // Gimbal lock: only roll - yaw (or roll + yaw) is observable
            DVec3::new(0.0, pitch, (-r01).atan2(r11))
        }
    }

    pub fn approx_eq(&self, other: &RigidTransform, epsilon: f64) -> bool {
        self.translation.abs_diff_eq(other.translation, epsilon)
            && self.rotation.abs_diff_eq(other.rotation, epsilon)
    }

    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.approx_eq(&Self::IDENTITY, epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    fn sample() -> RigidTransform {
        RigidTransform::from_rpy(DVec3::new(0.3, -0.7, 1.9), DVec3::new(12.5, -3.0, 7.25))
    }

    #[test]
    fn test_compose_with_inverse_is_identity() {
        let t = sample();
        assert!(t.compose(&t.inverse()).is_identity(TRANSFORM_EPSILON));
        assert!(t.inverse().compose(&t).is_identity(TRANSFORM_EPSILON));
    }

    #[test]
    fn test_compose_is_associative() {
        let a = sample();
        let b = RigidTransform::from_rpy(DVec3::new(FRAC_PI_4, 0.0, 0.2), DVec3::new(1.0, 2.0, 3.0));
        let c = RigidTransform::from_translation(DVec3::new(-4.0, 0.5, 0.0));
        let left = a.compose(&b).compose(&c);
        let right = a.compose(&b.compose(&c));
        assert!(left.approx_eq(&right, TRANSFORM_EPSILON));
    }

    #[test]
    fn test_compose_applies_right_operand_first() {
        let rotate = RigidTransform::from_rpy(DVec3::new(0.0, 0.0, FRAC_PI_2), DVec3::ZERO);
        let shift = RigidTransform::from_translation(DVec3::new(10.0, 0.0, 0.0));
        // shift then rotate: (10,0,0) -> (0,10,0)
        let p = rotate.compose(&shift).apply_to_point(DVec3::ZERO);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_vectors_ignore_translation() {
        let t = RigidTransform::from_translation(DVec3::new(5.0, 5.0, 5.0));
        assert_eq!(t.apply_to_vector(DVec3::X), DVec3::X);
        assert_eq!(t.apply_to_point(DVec3::X), DVec3::new(6.0, 5.0, 5.0));
    }

    #[test]
    fn test_rpy_round_trip() {
        let rpy = DVec3::new(0.3, -0.7, 1.9);
        let t = RigidTransform::from_rpy(rpy, DVec3::ZERO);
        let back = t.rpy();
        assert_abs_diff_eq!(back.x, rpy.x, epsilon = 1e-12);
        assert_abs_diff_eq!(back.y, rpy.y, epsilon = 1e-12);
        assert_abs_diff_eq!(back.z, rpy.z, epsilon = 1e-12);
    }

    #[test]
    fn test_rpy_gimbal_lock_reproduces_rotation() {
        let t = RigidTransform::from_rpy(DVec3::new(0.4, FRAC_PI_2, 0.1), DVec3::ZERO);
        let rebuilt = RigidTransform::from_rpy(t.rpy(), DVec3::ZERO);
        assert!(rebuilt.approx_eq(&t, 1e-9));
    }
}
