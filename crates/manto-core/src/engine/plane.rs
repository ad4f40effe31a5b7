//! Builds square planar point grids positioned relative to a molecule: the
//! grid is centered far out along a direction vector, then pulled back so its
//! minimum distance to the atom cloud equals the requested clearance.

use crate::engine::projection;
use nalgebra::{Point3, Vector3};
use tracing::{info, warn};

/// Offset of the provisional plane center along the direction vector. Large
/// enough that the in-plane basis construction never degenerates against the
/// molecule extent; the grid is translated back afterwards.
const CENTER_OFFSET: f64 = 400.0;

/// Builds a `count x count` grid (`count = ceil(size / density)`) of plane
/// points perpendicular to `direction`, whose minimum distance to `positions`
/// equals `distance`.
///
/// The edge length is rounded up to an integer multiple of the grid spacing.
/// Non-positive resolution parameters yield an empty grid with a logged
/// warning; this is a known edge case, not specially handled.
pub fn build_plane(
    positions: &[Point3<f64>],
    direction: &Vector3<f64>,
    size: f64,
    density: f64,
    distance: f64,
) -> Vec<Point3<f64>> {
    let count = (size / density).ceil();
    if !count.is_finite() || count <= 0.0 {
        warn!(size, density, "plane resolution yields no grid points");
        return Vec::new();
    }
    let rounded = density * count;
    if rounded != size {
        info!("plane size recalculated to {rounded}");
    }
    let size = rounded;
    let count = count as usize;

    let dir = direction.normalize();
    let center = centroid(positions);
    let plane_center = center + dir * CENTER_OFFSET;

    let (v1, v2) = in_plane_basis(&dir);

    // Edge point of the grid, stepping back half an edge along both in-plane
    // axes.
    let edge = plane_center - v1 * (size / 2.0) - v2 * (size / 2.0);

    let mut grid = Vec::with_capacity(count * count);
    for i in 0..count {
        for j in 0..count {
            grid.push(edge + v1 * (density * i as f64) + v2 * (density * j as f64));
        }
    }

    if positions.is_empty() {
        warn!("no reference atoms, returning uncorrected plane");
        return grid;
    }
    let Ok(min_distance) = projection::min_abs_distance(&grid, positions) else {
        return grid;
    };

    // Pull the grid back until it touches the atom cloud, then push it out by
    // the requested clearance.
    let correction = dir * min_distance;
    let residual = distance - (min_distance - correction.norm());
    let shift = dir * residual - correction;

    grid.iter().map(|p| p + shift).collect()
}

fn centroid(positions: &[Point3<f64>]) -> Point3<f64> {
    if positions.is_empty() {
        return Point3::origin();
    }
    let sum: Vector3<f64> = positions.iter().map(|p| p.coords).sum();
    Point3::from(sum / positions.len() as f64)
}

/// Chooses an orthonormal in-plane basis for a unit direction vector.
///
/// Three candidate seed vectors are completed against the direction and the
/// one whose cross-product reconstruction of the direction carries the least
/// error wins; this keeps the basis stable when the direction approaches an
/// axis. A direction with an exactly zero z component would degenerate all
/// three candidates, so it falls back to a basis built from the least-aligned
/// coordinate axis.
fn in_plane_basis(dir: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    if dir.z == 0.0 {
        return fallback_basis(dir);
    }

    let seeds = [(1.0, 1.0), (1.0, 0.0), (0.0, 1.0)];
    let mut best: Option<(f64, Vector3<f64>, Vector3<f64>)> = None;

    for (x, y) in seeds {
        let z = -((x * dir.x + y * dir.y) / dir.z);
        let v1 = Vector3::new(x, y, z).normalize();
        let v2 = dir.cross(&v1).normalize();
        let reconstructed = v1.cross(&v2).normalize();
        let diff = reconstructed - dir;
        let mut error = diff.x.abs() + diff.y.abs() + diff.z.abs();
        if !error.is_finite() {
            error = f64::INFINITY;
        }
        match &best {
            Some((best_error, _, _)) if *best_error <= error => {}
            _ => best = Some((error, v1, v2)),
        }
    }

    match best {
        Some((error, v1, v2)) if error.is_finite() => (v1, v2),
        _ => fallback_basis(dir),
    }
}

fn fallback_basis(dir: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let axes = [Vector3::x(), Vector3::y(), Vector3::z()];
    let axis = axes
        .into_iter()
        .min_by(|a, b| {
            let da = a.dot(dir).abs();
            let db = b.dot(dir).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or_else(Vector3::x);
    let v2 = dir.cross(&axis).normalize();
    let v1 = v2.cross(dir).normalize();
    (v1, v2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube_positions() -> Vec<Point3<f64>> {
        let mut out = Vec::new();
        for x in [-1.0, 1.0] {
            for y in [-1.0, 1.0] {
                for z in [-1.0, 1.0] {
                    out.push(Point3::new(x, y, z));
                }
            }
        }
        out
    }

    #[test]
    fn grid_has_count_squared_points() {
        let dir = Vector3::new(0.3, -0.2, 0.93).normalize();
        let plane = build_plane(&cube_positions(), &dir, 10.0, 5.0, 3.0);
        assert_eq!(plane.len(), 4); // ceil(10/5) = 2 per edge

        let plane = build_plane(&cube_positions(), &dir, 11.0, 5.0, 3.0);
        assert_eq!(plane.len(), 9); // size rounds up to 15, 3 per edge
    }

    #[test]
    fn minimum_clearance_matches_the_requested_distance() {
        let dir = Vector3::new(0.1, 0.2, 0.97).normalize();
        let positions = cube_positions();
        let clearance = 5.0;
        let plane = build_plane(&positions, &dir, 20.0, 1.0, clearance);
        let min = projection::min_abs_distance(&plane, &positions).unwrap();

        // The grid diagonal bounds how far the nearest grid point can sit
        // from the true closest approach.
        let half_diagonal = (1.0f64.powi(2) + 1.0f64.powi(2)).sqrt() / 2.0;
        assert!(
            min >= clearance - half_diagonal,
            "clearance {min} fell below {clearance} - {half_diagonal}"
        );
        assert!(min <= clearance + half_diagonal + 1e-6);
    }

    #[test]
    fn grid_points_are_coplanar_and_perpendicular_to_direction() {
        let dir = Vector3::new(0.4, 0.1, 0.91).normalize();
        let plane = build_plane(&cube_positions(), &dir, 10.0, 2.0, 2.0);
        let first = plane[0];
        for p in &plane[1..] {
            let in_plane = p - first;
            assert_relative_eq!(in_plane.dot(&dir), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn axis_aligned_direction_still_produces_a_plane() {
        let dir = Vector3::new(1.0, 0.0, 0.0);
        let plane = build_plane(&cube_positions(), &dir, 10.0, 5.0, 2.0);
        assert_eq!(plane.len(), 4);
        let first = plane[0];
        for p in &plane[1..] {
            assert_relative_eq!((p - first).dot(&dir), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn non_positive_resolution_returns_an_empty_grid() {
        let dir = Vector3::z();
        assert!(build_plane(&cube_positions(), &dir, 0.0, 5.0, 1.0).is_empty());
        assert!(build_plane(&cube_positions(), &dir, 10.0, 0.0, 1.0).is_empty());
    }
}
