//! Inertia tensor representation and rigid-body tensor algebra
//!
//! Components follow the tensor convention: the off-diagonal entries are the
//! matrix entries (`ixy = -∫xy dm`), as in URDF.

use std::ops::{Add, Sub};

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

/// Decimal digits kept after a parallel-axis shift
pub const INERTIA_DECIMALS: i32 = 6;

/// Symmetric 3x3 inertia tensor (kg·cm² internally)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InertiaMatrix {
    pub ixx: f64,
    pub iyy: f64,
    pub izz: f64,
    pub ixy: f64,
    pub iyz: f64,
    pub ixz: f64,
}

impl InertiaMatrix {
    /// Build from the CAD component order `[xx, yy, zz, xy, yz, xz]`
    pub fn from_components(c: [f64; 6]) -> Self {
        Self {
            ixx: c[0],
            iyy: c[1],
            izz: c[2],
            ixy: c[3],
            iyz: c[4],
            ixz: c[5],
        }
    }

    /// Components in CAD order `[xx, yy, zz, xy, yz, xz]`
    pub fn to_components(&self) -> [f64; 6] {
        [self.ixx, self.iyy, self.izz, self.ixy, self.iyz, self.ixz]
    }

    pub fn to_mat3(&self) -> DMat3 {
        DMat3::from_cols(
            DVec3::new(self.ixx, self.ixy, self.ixz),
            DVec3::new(self.ixy, self.iyy, self.iyz),
            DVec3::new(self.ixz, self.iyz, self.izz),
        )
    }

    /// Symmetrises the off-diagonal terms while reading them back
    pub fn from_mat3(m: &DMat3) -> Self {
        Self {
            ixx: m.x_axis.x,
            iyy: m.y_axis.y,
            izz: m.z_axis.z,
            ixy: 0.5 * (m.y_axis.x + m.x_axis.y),
            iyz: 0.5 * (m.z_axis.y + m.y_axis.z),
            ixz: 0.5 * (m.z_axis.x + m.x_axis.z),
        }
    }

    /// Inertia of a point mass at displacement `d`:
    /// `mass * [[y²+z², -xy, -xz], [-xy, x²+z², -yz], [-xz, -yz, x²+y²]]`
    pub fn parallel_axis_term(mass: f64, d: DVec3) -> Self {
        Self {
            ixx: mass * (d.y * d.y + d.z * d.z),
            iyy: mass * (d.x * d.x + d.z * d.z),
            izz: mass * (d.x * d.x + d.y * d.y),
            ixy: -mass * d.x * d.y,
            iyz: -mass * d.y * d.z,
            ixz: -mass * d.x * d.z,
        }
    }

    /// Move a tensor about a reference point to the point displaced by `d`
    /// from it, where `d` is the body's center of mass: `I' = I - m·S(d)`.
    ///
    /// The result is rounded to [`INERTIA_DECIMALS`] to suppress noise.
    pub fn shift_to_frame(&self, mass: f64, d: DVec3) -> Self {
        (*self - Self::parallel_axis_term(mass, d)).rounded(INERTIA_DECIMALS)
    }

    /// Inverse of [`InertiaMatrix::shift_to_frame`] without rounding: `I + m·S(d)`
    pub fn shift_from_frame(&self, mass: f64, d: DVec3) -> Self {
        *self + Self::parallel_axis_term(mass, d)
    }

    /// Change of basis `R · I · Rᵗ`
    pub fn rotate(&self, rotation: &DMat3) -> Self {
        Self::from_mat3(&(*rotation * self.to_mat3() * rotation.transpose()))
    }

    pub fn rounded(&self, decimals: i32) -> Self {
        Self {
            ixx: round_to(self.ixx, decimals),
            iyy: round_to(self.iyy, decimals),
            izz: round_to(self.izz, decimals),
            ixy: round_to(self.ixy, decimals),
            iyz: round_to(self.iyz, decimals),
            ixz: round_to(self.ixz, decimals),
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            ixx: self.ixx * factor,
            iyy: self.iyy * factor,
            izz: self.izz * factor,
            ixy: self.ixy * factor,
            iyz: self.iyz * factor,
            ixz: self.ixz * factor,
        }
    }

    /// Calculate inertia of a solid cuboid about its own center
    pub fn from_box(mass: f64, size: DVec3) -> Self {
        let (x2, y2, z2) = (size.x * size.x, size.y * size.y, size.z * size.z);
        Self {
            ixx: mass / 12.0 * (y2 + z2),
            iyy: mass / 12.0 * (x2 + z2),
            izz: mass / 12.0 * (x2 + y2),
            ..Default::default()
        }
    }

    pub fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.to_components()
            .iter()
            .zip(other.to_components())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Add for InertiaMatrix {
    type Output = InertiaMatrix;

    fn add(self, rhs: Self) -> Self {
        Self {
            ixx: self.ixx + rhs.ixx,
            iyy: self.iyy + rhs.iyy,
            izz: self.izz + rhs.izz,
            ixy: self.ixy + rhs.ixy,
            iyz: self.iyz + rhs.iyz,
            ixz: self.ixz + rhs.ixz,
        }
    }
}

impl Sub for InertiaMatrix {
    type Output = InertiaMatrix;

    fn sub(self, rhs: Self) -> Self {
        Self {
            ixx: self.ixx - rhs.ixx,
            iyy: self.iyy - rhs.iyy,
            izz: self.izz - rhs.izz,
            ixy: self.ixy - rhs.ixy,
            iyz: self.iyz - rhs.iyz,
            ixz: self.ixz - rhs.ixz,
        }
    }
}

/// Round to a fixed number of decimal digits, normalising `-0.0` to `0.0`
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor + 0.0
}
