//! Plane descriptors: the surface value map is projected onto a reference
//! plane per candidate orientation, each plane reduced to 32 statistics, and
//! the best orientation kept.

use super::{GroupContext, descriptor_position, push_bins, push_sign_split, select_orientation};
use crate::core::math::array;
use crate::core::models::descriptor::{Descriptor, DescriptorGroup, GroupKind};
use crate::engine::config::ProjectionParams;
use crate::engine::error::CalcError;
use crate::engine::plane::build_plane;
use crate::engine::projection::{self, WATER_DIELECTRIC};
use nalgebra::Vector3;
use tracing::debug;

/// Plane points closer than this to the surface (plus the configured
/// clearance) count towards the contact-area statistics.
const CONTACT_MARGIN: f64 = 10.0;

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
    let ionic_strength = ctx.condition.ionic_strength;
    let surface_values = super::value_map(ctx, WATER_DIELECTRIC, ionic_strength)?;

    let mut detail = Vec::with_capacity(orientations.len());
    for direction in orientations {
        let plane = build_plane(&positions, direction, proj.size, proj.density, proj.distance);
        let mapped = projection::project(
            &plane,
            surface,
            &surface_values,
            proj.kernel,
            0.0,
            WATER_DIELECTRIC,
            ionic_strength,
        )?;
        let plane_to_surface = projection::abs_distance(surface, &plane)?;
        detail.push(statistic_row(ctx, proj, &mapped, &plane_to_surface));
    }

    let position = descriptor_position(&detail[0], &proj.select_id);
    let index = select_orientation(&detail, position, proj.select_mode);
    debug!(position, index, "plane orientation selected");

    Ok(DescriptorGroup {
        kind: GroupKind::Plane,
        descriptors: detail[index].clone(),
        detail,
        orientation_index: Some(index),
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

    let contact_limit = CONTACT_MARGIN + proj.distance;
    let in_contact: Vec<f64> = mapped
        .iter()
        .zip(plane_to_surface)
        .filter(|(_, d)| **d < contact_limit)
        .map(|(v, _)| *v)
        .collect();

    let res = ctx.set.surface.resolution.powi(2);
    let size_a = in_contact.len() as f64 * (res * res);
    let size = mapped.len() as f64 * (res * res);

    let mut row = Vec::with_capacity(GroupKind::Plane.descriptor_count());
    row.push(Descriptor::new(format!("relSurfA{suffix}"), size_a / size));
    row.push(Descriptor::new(format!("totalSurfA{suffix}"), size_a));
    row.push(Descriptor::new(
        format!("nSurfP{suffix}"),
        in_contact.len() as f64,
    ));

    let sum: f64 = mapped.iter().sum();
    let sum_a: f64 = in_contact.iter().sum();
    let mean = sum / size;
    let mean_a = sum_a / size_a;

    row.push(Descriptor::new(format!("sum{suffix}"), sum));
    row.push(Descriptor::new(format!("sumSurfA{suffix}"), sum_a));
    row.push(Descriptor::new(format!("densSurfA{suffix}"), sum_a / size_a));
    row.push(Descriptor::new(format!("mean{suffix}"), mean));
    row.push(Descriptor::new(format!("meanSurfA{suffix}"), mean_a));

    let sorted_map = array::sorted(mapped);
    let median = sorted_map[sorted_map.len() / 2];
    // The contact median indexes the full sorted map, as the reference data
    // sets were produced.
    let median_a = sorted_map[in_contact.len() / 2];
    let max = array::max_value(mapped);
    let min = array::min_value(mapped);

    row.push(Descriptor::new(format!("median{suffix}"), median));
    row.push(Descriptor::new(format!("medianSurfA{suffix}"), median_a));
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
