//! Maps scalar values from a source point cloud onto a target point cloud
//! through distance-weighted kernels, and provides the nearest-point distance
//! queries used for plane placement and surface-patch membership.

use crate::engine::config::Kernel;
use nalgebra::Point3;
use thiserror::Error;

/// Dielectric constant applied when mapping atomic properties onto the
/// molecular surface.
pub const SURFACE_DIELECTRIC: f64 = 2.0;
/// Dielectric constant of the aqueous medium, applied for projections onto
/// reference planes.
pub const WATER_DIELECTRIC: f64 = 78.0;
/// Ionic strength in mM assumed when an observation does not provide one.
pub const DEFAULT_IONIC_STRENGTH_MM: f64 = 50.0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("no target points to project onto")]
    EmptyTarget,

    #[error("no source points to project from")]
    EmptySource,

    #[error("no plane points to measure distances against")]
    EmptyPlane,

    #[error("each source point needs a value: {points} points, {values} values")]
    SizeMismatch { points: usize, values: usize },
}

/// Projects `values` living on `source` points onto every `target` point.
///
/// For each target point the Euclidean distances to all source points are
/// computed, floored at `min_distance`, and the source values are aggregated
/// under the chosen kernel. `ionic_strength_mm` feeds the Debye screening
/// length `0.304 / sqrt(I/1000)` nm used by the two screened kernels.
pub fn project(
    target: &[Point3<f64>],
    source: &[Point3<f64>],
    values: &[f64],
    kernel: Kernel,
    min_distance: f64,
    dielectric: f64,
    ionic_strength_mm: f64,
) -> Result<Vec<f64>, ProjectionError> {
    if target.is_empty() {
        return Err(ProjectionError::EmptyTarget);
    }
    if source.is_empty() {
        return Err(ProjectionError::EmptySource);
    }
    if values.len() < source.len() {
        return Err(ProjectionError::SizeMismatch {
            points: source.len(),
            values: values.len(),
        });
    }

    // Debye screening length for monovalent ions, in nm.
    let debye = 0.304 / (ionic_strength_mm / 1000.0).sqrt();
    let coulomb_weight = 1.0 / (4.0 * std::f64::consts::PI * dielectric);

    let mut mapped = Vec::with_capacity(target.len());
    let mut distances = Vec::with_capacity(source.len());

    for t in target {
        distances.clear();
        distances.extend(source.iter().map(|s| (s - t).norm().max(min_distance)));

        let mut v = 0.0;
        for (d, value) in distances.iter().zip(values) {
            v += match kernel {
                Kernel::InverseDistance => value / d,
                Kernel::ExpHalfDistance => value * 10f64.powf(-d / 2.0),
                Kernel::SoftenedInverse => value / (1.0 + d),
                Kernel::ExpDistance => value * 10f64.powf(-d),
                Kernel::InverseSixthPower => value / d.powi(6),
                Kernel::Coulomb => coulomb_weight * value / (d * d),
                // Distances arrive in Angstrom and the screening length is in
                // nm, hence the 0.1 scaling.
                Kernel::DebyeHueckel => {
                    (value / (dielectric * (d * 0.1))) * 10f64.powf((d * -0.1) / debye) * 1000.0
                }
                Kernel::ScreenedCoulomb => {
                    coulomb_weight * value / (d * d) * 10f64.powf(-d / debye) * 1000.0
                }
            };
        }
        mapped.push(v);
    }
    Ok(mapped)
}

/// For every query point, the distance to its nearest plane point.
pub fn abs_distance(
    plane: &[Point3<f64>],
    queries: &[Point3<f64>],
) -> Result<Vec<f64>, ProjectionError> {
    if plane.is_empty() {
        return Err(ProjectionError::EmptyPlane);
    }
    Ok(queries
        .iter()
        .map(|q| {
            plane
                .iter()
                .map(|p| (p - q).norm())
                .fold(f64::INFINITY, f64::min)
        })
        .collect())
}

/// The smallest distance between any plane point and any query point.
pub fn min_abs_distance(
    plane: &[Point3<f64>],
    queries: &[Point3<f64>],
) -> Result<f64, ProjectionError> {
    if queries.is_empty() {
        return Err(ProjectionError::EmptyTarget);
    }
    Ok(abs_distance(plane, queries)?
        .into_iter()
        .fold(f64::INFINITY, f64::min))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn single_source() -> (Vec<Point3<f64>>, Vec<Point3<f64>>, Vec<f64>) {
        let target = vec![
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(0.0, 3.0, 0.0),
            Point3::new(0.0, 0.0, 0.1),
        ];
        let source = vec![Point3::origin()];
        let values = vec![4.0];
        (target, source, values)
    }

    #[test]
    fn inverse_distance_with_single_source_is_value_over_distance() {
        let (target, source, values) = single_source();
        let mapped = project(
            &target,
            &source,
            &values,
            Kernel::InverseDistance,
            0.5,
            WATER_DIELECTRIC,
            DEFAULT_IONIC_STRENGTH_MM,
        )
        .unwrap();
        assert_relative_eq!(mapped[0], 4.0 / 2.0);
        assert_relative_eq!(mapped[1], 4.0 / 3.0);
        // Distance floored at min_distance.
        assert_relative_eq!(mapped[2], 4.0 / 0.5);
    }

    #[test]
    fn exponential_kernels_decay_by_powers_of_ten() {
        let target = vec![Point3::new(0.0, 0.0, 2.0)];
        let source = vec![Point3::origin()];
        let mapped = project(
            &target,
            &source,
            &[1.0],
            Kernel::ExpDistance,
            0.0,
            WATER_DIELECTRIC,
            DEFAULT_IONIC_STRENGTH_MM,
        )
        .unwrap();
        assert_relative_eq!(mapped[0], 0.01, epsilon = 1e-12);

        let mapped = project(
            &target,
            &source,
            &[1.0],
            Kernel::ExpHalfDistance,
            0.0,
            WATER_DIELECTRIC,
            DEFAULT_IONIC_STRENGTH_MM,
        )
        .unwrap();
        assert_relative_eq!(mapped[0], 0.1, epsilon = 1e-12);
    }

    #[test]
    fn coulomb_kernel_carries_the_dielectric_weight() {
        let target = vec![Point3::new(2.0, 0.0, 0.0)];
        let source = vec![Point3::origin()];
        let mapped = project(
            &target,
            &source,
            &[8.0],
            Kernel::Coulomb,
            0.0,
            2.0,
            DEFAULT_IONIC_STRENGTH_MM,
        )
        .unwrap();
        let expected = (1.0 / (4.0 * std::f64::consts::PI * 2.0)) * 8.0 / 4.0;
        assert_relative_eq!(mapped[0], expected, epsilon = 1e-12);
    }

    #[test]
    fn screened_kernels_shrink_with_ionic_strength() {
        let target = vec![Point3::new(5.0, 0.0, 0.0)];
        let source = vec![Point3::origin()];
        let low = project(
            &target,
            &source,
            &[1.0],
            Kernel::ScreenedCoulomb,
            0.0,
            WATER_DIELECTRIC,
            10.0,
        )
        .unwrap()[0];
        let high = project(
            &target,
            &source,
            &[1.0],
            Kernel::ScreenedCoulomb,
            0.0,
            WATER_DIELECTRIC,
            1000.0,
        )
        .unwrap()[0];
        assert!(high < low, "screening should damp the potential: {high} >= {low}");
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let p = vec![Point3::origin()];
        assert_eq!(
            project(&[], &p, &[1.0], Kernel::InverseDistance, 0.0, 78.0, 50.0),
            Err(ProjectionError::EmptyTarget)
        );
        assert_eq!(
            project(&p, &[], &[], Kernel::InverseDistance, 0.0, 78.0, 50.0),
            Err(ProjectionError::EmptySource)
        );
    }

    #[test]
    fn fewer_values_than_source_points_is_a_size_mismatch() {
        let p = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        assert_eq!(
            project(&p, &p, &[1.0], Kernel::InverseDistance, 0.0, 78.0, 50.0),
            Err(ProjectionError::SizeMismatch {
                points: 2,
                values: 1
            })
        );
    }

    #[test]
    fn abs_distance_finds_the_nearest_plane_point() {
        let plane = vec![Point3::origin(), Point3::new(10.0, 0.0, 0.0)];
        let queries = vec![Point3::new(9.0, 0.0, 0.0), Point3::new(0.0, 2.0, 0.0)];
        let d = abs_distance(&plane, &queries).unwrap();
        assert_relative_eq!(d[0], 1.0);
        assert_relative_eq!(d[1], 2.0);
        assert_relative_eq!(min_abs_distance(&plane, &queries).unwrap(), 1.0);
    }

    #[test]
    fn distance_queries_reject_empty_plane() {
        let queries = vec![Point3::origin()];
        assert_eq!(
            abs_distance(&[], &queries),
            Err(ProjectionError::EmptyPlane)
        );
    }
}
