//! Sphere descriptors: plane projections evaluated for every orientation as
//! for the plane kind, but the 34-statistic rows are averaged across all
//! orientations instead of selecting one.

use super::{GroupContext, average_rows, push_bins, push_sign_split};
use crate::core::math::array;
use crate::core::models::descriptor::{Descriptor, DescriptorGroup, GroupKind};
use crate::engine::config::ProjectionParams;
use crate::engine::error::CalcError;
use crate::engine::plane::build_plane;
use crate::engine::projection::{self, DEFAULT_IONIC_STRENGTH_MM, SURFACE_DIELECTRIC, WATER_DIELECTRIC};
use nalgebra::Vector3;

/// Solvent-contact margin added to the configured clearance when collecting
/// near-surface plane points (one water diameter, roughly).
const CONTACT_MARGIN: f64 = 2.8;

pub fn calc(
    ctx: &GroupContext,
    proj: &ProjectionParams,
    orientations: &[Vector3<f64>],
) -> Result<DescriptorGroup, CalcError> {
    if orientations.is_empty() {
        return Err(CalcError::NoOrientations);
    }
    let surface = ctx.molecule.surface().ok_or(CalcError::MissingSurface)?;
    let positions = ctx.molecule.atom_positions();
    let values = super::value_map(ctx, SURFACE_DIELECTRIC, DEFAULT_IONIC_STRENGTH_MM)?;

    let mut detail = Vec::with_capacity(orientations.len());
    for direction in orientations {
        let plane = build_plane(&positions, direction, proj.size, proj.density, proj.distance);
        let mapped = projection::project(
            &plane,
            surface,
            &values,
            proj.kernel,
            0.0,
            WATER_DIELECTRIC,
            ctx.condition.ionic_strength,
        )?;
        let plane_to_surface = projection::abs_distance(surface, &plane)?;
        detail.push(statistic_row(ctx, proj, &mapped, &plane_to_surface));
    }

    let descriptors = average_rows(&detail);
    Ok(DescriptorGroup {
        kind: GroupKind::Sphere,
        descriptors,
        detail,
        orientation_index: None,
        orientations: super::to_arrays(orientations),
    })
}

fn statistic_row(
    ctx: &GroupContext,
    proj: &ProjectionParams,
    mapped: &[f64],
    plane_to_surface: &[f64],
) -> Vec<Descriptor> {
    let suffix = ctx.set.descriptor.suffix();

    // The contact list collects the distances themselves here, not the mapped
    // values; kept from the reference data sets.
    let contact_limit = CONTACT_MARGIN + proj.distance;
    let contact_distances: Vec<f64> = plane_to_surface
        .iter()
        .filter(|d| **d < contact_limit)
        .copied()
        .collect();

    let size_a = contact_distances.len() as f64;
    let size = mapped.len() as f64;
    let res = ctx.set.surface.resolution.powi(2);

    let mut row = Vec::with_capacity(GroupKind::Sphere.descriptor_count());
    row.push(Descriptor::new(format!("nSurfA{suffix}"), size_a));
    row.push(Descriptor::new(format!("relSurfA{suffix}"), size_a / size));
    row.push(Descriptor::new(format!("totalSurfA{suffix}"), size_a / res));
    row.push(Descriptor::new(format!("nSurfP{suffix}"), size));

    let sum: f64 = mapped.iter().sum();
    let sum_a: f64 = contact_distances.iter().sum();
    let mean = sum / size;
    let mean_a = sum_a / size_a;

    row.push(Descriptor::new(format!("sum{suffix}"), sum));
    row.push(Descriptor::new(format!("sumSurfA{suffix}"), sum_a));
    row.push(Descriptor::new(format!("mean{suffix}"), mean));
    row.push(Descriptor::new(format!("meanA{suffix}"), mean_a));

    let sorted_map = array::sorted(mapped);
    let median = sorted_map[sorted_map.len() / 2];
    let median_a = sorted_map[contact_distances.len() / 2];
    let max = array::max_value(mapped);
    let min = array::min_value(mapped);

    row.push(Descriptor::new(format!("median{suffix}"), median));
    row.push(Descriptor::new(format!("medianSurfA{suffix}"), median_a));
    row.push(Descriptor::new(format!("meanRes{suffix}"), mean / res));
    row.push(Descriptor::new(format!("meanResA{suffix}"), mean_a / res));
    row.push(Descriptor::new(format!("max{suffix}"), max));
    row.push(Descriptor::new(format!("min{suffix}"), min));
    row.push(Descriptor::new(
        format!("devA{suffix}"),
        (max - min) / median,
    ));
    row.push(Descriptor::new(format!("devB{suffix}"), max));

    push_sign_split(&mut row, mapped, &suffix);
    push_bins(&mut row, mapped, &suffix, ctx.set.descriptor.bin_width, 1.0);
    row
}
