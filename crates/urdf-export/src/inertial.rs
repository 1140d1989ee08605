//! Per-link inertial aggregation

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::assembly::Body;
use crate::error::{ExportError, Result};
use crate::inertia::InertiaMatrix;
use crate::transform::RigidTransform;

/// Combined mass properties of one link.
///
/// `inertia` is taken about `center_of_mass`, with axes parallel to the
/// frame the record is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InertialRecord {
    /// kg
    pub mass: f64,
    /// cm
    pub center_of_mass: DVec3,
    /// kg·cm²
    pub inertia: InertiaMatrix,
}

impl InertialRecord {
    pub fn new(mass: f64, center_of_mass: DVec3, inertia: InertiaMatrix) -> Self {
        Self {
            mass,
            center_of_mass,
            inertia,
        }
    }

    /// Tensor about the origin of the record's frame
    pub fn inertia_about_origin(&self) -> InertiaMatrix {
        self.inertia.shift_from_frame(self.mass, self.center_of_mass)
    }

    /// Re-express the record in the frame reached through `transform`.
    ///
    /// The tensor stays about the center of mass, so only its axes turn.
    pub fn transformed(&self, transform: &RigidTransform) -> Self {
        Self {
            mass: self.mass,
            center_of_mass: transform.apply_to_point(self.center_of_mass),
            inertia: self.inertia.rotate(&transform.rotation),
        }
    }

    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.mass - other.mass).abs() <= epsilon
            && self.center_of_mass.abs_diff_eq(other.center_of_mass, epsilon)
            && self.inertia.abs_diff_eq(&other.inertia, epsilon)
    }
}

/// Sum the visible bodies of a link into one record in assembly coordinates.
///
/// Bodies are accumulated in the order given so results are reproducible.
/// Fails with [`ExportError::DegenerateMass`] when there are no bodies or the
/// total mass is not positive.
pub fn aggregate_bodies<'a>(
    link: &str,
    bodies: impl IntoIterator<Item = &'a Body>,
) -> Result<InertialRecord> {
    let mut count = 0usize;
    let mut mass = 0.0;
    let mut weighted_com = DVec3::ZERO;
    let mut about_origin = InertiaMatrix::default();

    for body in bodies {
        let record = &body.mass_properties;
        count += 1;
        mass += record.mass;
        weighted_com += record.mass * record.com();
        about_origin = about_origin + record.inertia_about_origin();
    }

    if count == 0 {
        return Err(ExportError::DegenerateMass {
            link: link.to_string(),
            reason: "no visible bodies".to_string(),
        });
    }
    if mass <= 0.0 || !mass.is_finite() {
        return Err(ExportError::DegenerateMass {
            link: link.to_string(),
            reason: format!("total mass {} kg", mass),
        });
    }

    let center_of_mass = weighted_com / mass;
    // Σ(I_i - m_i·S(c_i) + m_i·S(c_i - c)) collapses to ΣI_i - M·S(c)
    let inertia = about_origin.shift_to_frame(mass, center_of_mass);
    tracing::debug!(
        "Aggregated {} bodies for '{}': mass {:.6} kg, com {:?}",
        count,
        link,
        mass,
        center_of_mass
    );

    Ok(InertialRecord::new(mass, center_of_mass, inertia))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::BodyMassRecord;
    use approx::assert_abs_diff_eq;

    fn body(record: BodyMassRecord) -> Body {
        Body::new(record)
    }

    #[test]
    fn test_two_point_masses() {
        let bodies = [
            body(BodyMassRecord::point_mass(1.0, [0.0, 0.0, 0.0])),
            body(BodyMassRecord::point_mass(3.0, [4.0, 0.0, 0.0])),
        ];
        let record = aggregate_bodies("arm", &bodies).unwrap();
        assert_eq!(record.mass, 4.0);
        assert_abs_diff_eq!(record.center_of_mass.x, 3.0, epsilon = 1e-12);
        // 1·3² + 3·1² about the combined center, around y and z
        assert_abs_diff_eq!(record.inertia.iyy, 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.inertia.izz, 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.inertia.ixx, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_matches_per_body_shift() {
        let parts = [
            (2.0, [1.0, 2.0, 3.0], [2.0, 1.0, 1.0]),
            (0.5, [-4.0, 0.5, 1.0], [1.0, 3.0, 2.0]),
        ];
        let bodies: Vec<Body> = parts
            .iter()
            .map(|&(m, com, size)| body(BodyMassRecord::cuboid(m, com, size)))
            .collect();
        let record = aggregate_bodies("arm", &bodies).unwrap();
        let c = record.center_of_mass;

        let expected = parts
            .iter()
            .map(|&(m, com, size)| {
                InertiaMatrix::from_box(m, DVec3::from(size))
                    .shift_from_frame(m, DVec3::from(com) - c)
            })
            .fold(InertiaMatrix::default(), |acc, i| acc + i);
        assert!(record.inertia.abs_diff_eq(&expected, 1e-5));
    }

    #[test]
    fn test_no_bodies_is_degenerate() {
        let err = aggregate_bodies("empty", std::iter::empty()).unwrap_err();
        assert!(matches!(err, ExportError::DegenerateMass { ref link, .. } if link == "empty"));
    }

    #[test]
    fn test_zero_mass_is_degenerate() {
        let bodies = [body(BodyMassRecord::point_mass(0.0, [1.0, 0.0, 0.0]))];
        assert!(matches!(
            aggregate_bodies("ghost", &bodies),
            Err(ExportError::DegenerateMass { .. })
        ));
    }

    #[test]
    fn test_transformed_round_trip() {
        let bodies = [body(BodyMassRecord::cuboid(1.5, [2.0, -1.0, 4.0], [1.0, 2.0, 3.0]))];
        let record = aggregate_bodies("arm", &bodies).unwrap();
        let t = RigidTransform::from_rpy(DVec3::new(0.2, -0.4, 1.0), DVec3::new(5.0, 0.0, -2.0));
        let back = record.transformed(&t).transformed(&t.inverse());
        assert!(back.approx_eq(&record, 1e-9));
    }
}
