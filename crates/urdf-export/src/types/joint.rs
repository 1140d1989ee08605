//! Joint-related type definitions

use serde::{Deserialize, Serialize};

use crate::assembly::SourceJointKind;

/// Effort written into every joint limit (N or Nm)
pub const JOINT_EFFORT: f64 = 100.0;
/// Velocity written into every joint limit (rad/s or m/s)
pub const JOINT_VELOCITY: f64 = 100.0;

/// Joint type in the robot description vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum JointType {
    #[default]
    Fixed,
    Revolute,
    Continuous,
    Prismatic,
}

impl JointType {
    /// Map a host joint kind; unbounded revolute joints become continuous.
    ///
    /// Returns `None` for kinds the description cannot express.
    pub fn from_source(kind: SourceJointKind, bounded: bool) -> Option<Self> {
        match kind {
            SourceJointKind::Rigid => Some(JointType::Fixed),
            SourceJointKind::Revolute if bounded => Some(JointType::Revolute),
            SourceJointKind::Revolute => Some(JointType::Continuous),
            SourceJointKind::Slider => Some(JointType::Prismatic),
            SourceJointKind::Cylindrical
            | SourceJointKind::PinSlot
            | SourceJointKind::Planar
            | SourceJointKind::Ball => None,
        }
    }

    /// Check if this joint type has an axis
    pub fn has_axis(&self) -> bool {
        matches!(
            self,
            JointType::Revolute | JointType::Continuous | JointType::Prismatic
        )
    }

    /// Check if this joint type has a limit element
    pub fn has_limits(&self) -> bool {
        matches!(self, JointType::Revolute | JointType::Prismatic)
    }

    /// Actuated joints get a transmission
    pub fn is_actuated(&self) -> bool {
        !matches!(self, JointType::Fixed)
    }

    /// Limits of prismatic joints are lengths and follow the unit conversion
    pub fn is_linear(&self) -> bool {
        matches!(self, JointType::Prismatic)
    }

    /// Name of the type in the description schema
    pub fn urdf_name(&self) -> &'static str {
        match self {
            JointType::Fixed => "fixed",
            JointType::Revolute => "revolute",
            JointType::Continuous => "continuous",
            JointType::Prismatic => "prismatic",
        }
    }

    pub fn from_urdf_name(name: &str) -> Option<Self> {
        match name {
            "fixed" => Some(JointType::Fixed),
            "revolute" => Some(JointType::Revolute),
            "continuous" => Some(JointType::Continuous),
            "prismatic" => Some(JointType::Prismatic),
            _ => None,
        }
    }
}

/// Joint limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimits {
    /// Lower position limit (rad or cm); `None` for an unbounded slider
    pub lower: Option<f64>,
    /// Upper position limit (rad or cm); `None` for an unbounded slider
    pub upper: Option<f64>,
    /// Maximum effort (N or Nm)
    pub effort: f64,
    /// Maximum velocity (rad/s or m/s)
    pub velocity: f64,
}

impl Default for JointLimits {
    fn default() -> Self {
        Self {
            lower: None,
            upper: None,
            effort: JOINT_EFFORT,
            velocity: JOINT_VELOCITY,
        }
    }
}

impl JointLimits {
    /// Create limits with specified range
    pub fn with_range(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
            ..Self::default()
        }
    }

    /// Limits carrying only effort and velocity
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn range(&self) -> Option<(f64, f64)> {
        self.lower.zip(self.upper)
    }
}

impl TryFrom<&urdf_rs::JointType> for JointType {
    type Error = String;

    fn try_from(urdf_type: &urdf_rs::JointType) -> Result<Self, Self::Error> {
        match urdf_type {
            urdf_rs::JointType::Fixed => Ok(JointType::Fixed),
            urdf_rs::JointType::Revolute => Ok(JointType::Revolute),
            urdf_rs::JointType::Continuous => Ok(JointType::Continuous),
            urdf_rs::JointType::Prismatic => Ok(JointType::Prismatic),
            other => Err(format!("{other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_mapping() {
        assert_eq!(
            JointType::from_source(SourceJointKind::Rigid, false),
            Some(JointType::Fixed)
        );
        assert_eq!(
            JointType::from_source(SourceJointKind::Revolute, true),
            Some(JointType::Revolute)
        );
        assert_eq!(
            JointType::from_source(SourceJointKind::Revolute, false),
            Some(JointType::Continuous)
        );
        assert_eq!(
            JointType::from_source(SourceJointKind::Slider, false),
            Some(JointType::Prismatic)
        );
        assert_eq!(JointType::from_source(SourceJointKind::Ball, true), None);
    }

    #[test]
    fn test_emission_rules() {
        assert!(!JointType::Fixed.has_limits());
        assert!(!JointType::Fixed.has_axis());
        assert!(!JointType::Fixed.is_actuated());
        assert!(JointType::Continuous.has_axis());
        assert!(!JointType::Continuous.has_limits());
        assert!(JointType::Prismatic.has_limits());
        assert!(JointType::Prismatic.is_linear());
    }

    #[test]
    fn test_urdf_names_round_trip() {
        for joint_type in [
            JointType::Fixed,
            JointType::Revolute,
            JointType::Continuous,
            JointType::Prismatic,
        ] {
            assert_eq!(
                JointType::from_urdf_name(joint_type.urdf_name()),
                Some(joint_type)
            );
        }
        assert_eq!(JointType::from_urdf_name("planar"), None);
    }

    #[test]
    fn test_default_limits_use_fixed_effort_and_velocity() {
        let limits = JointLimits::with_range(-1.0, 1.0);
        assert_eq!(limits.effort, 100.0);
        assert_eq!(limits.velocity, 100.0);
        assert_eq!(limits.range(), Some((-1.0, 1.0)));
        assert_eq!(JointLimits::unbounded().range(), None);
    }
}
