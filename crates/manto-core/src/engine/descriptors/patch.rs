//! Patch descriptors: the whole-surface value map restricted, per candidate
//! orientation, to the surface patch facing a reference plane; 28 statistics
//! per patch, best orientation kept.

use super::{GroupContext, descriptor_position, push_bins, push_sign_split, select_orientation};
use crate::core::math::array;
use crate::core::models::descriptor::{Descriptor, DescriptorGroup, GroupKind};
use crate::core::models::molecule::Molecule;
use crate::engine::config::ProjectionParams;
use crate::engine::error::CalcError;
use crate::engine::plane::build_plane;
use crate::engine::projection::{self, DEFAULT_IONIC_STRENGTH_MM, SURFACE_DIELECTRIC};
use nalgebra::Vector3;
use tracing::debug;

/// Edge length and spacing of the reference plane used for patch membership;
/// the plane only serves as a distance reference, so the values are not
/// critical.
const REFERENCE_PLANE_SIZE: f64 = 100.0;
const REFERENCE_PLANE_DENSITY: f64 = 5.0;

pub fn calc(
    ctx: &GroupContext,
    proj: &ProjectionParams,
    orientations: &[Vector3<f64>],
) -> Result<DescriptorGroup, CalcError> {
    if orientations.is_empty() {
        return Err(CalcError::NoOrientations);
    }
    let values = super::value_map(ctx, SURFACE_DIELECTRIC, DEFAULT_IONIC_STRENGTH_MM)?;

    let mut detail = Vec::with_capacity(orientations.len());
    for direction in orientations {
        let membership = surface_patch_membership(ctx.molecule, direction, proj.size)?;
        let patch_values: Vec<f64> = values
            .iter()
            .zip(&membership)
            .filter(|(_, inside)| **inside)
            .map(|(v, _)| *v)
            .collect();
        detail.push(statistic_row(ctx, &patch_values)?);
    }

    let position = descriptor_position(&detail[0], &proj.select_id);
    let index = select_orientation(&detail, position, proj.select_mode);
    debug!(position, index, "patch orientation selected");

    Ok(DescriptorGroup {
        kind: GroupKind::Patch,
        descriptors: detail[index].clone(),
        detail,
        orientation_index: Some(index),
        orientations: super::to_arrays(orientations),
    })
}

/// Flags, per surface point, whether it lies within `size` of the reference
/// plane built along `direction`: the membership test for one surface patch.
pub(crate) fn surface_patch_membership(
    molecule: &Molecule,
    direction: &Vector3<f64>,
    size: f64,
) -> Result<Vec<bool>, CalcError> {
    let surface = molecule.surface().ok_or(CalcError::MissingSurface)?;
    let plane = build_plane(
        &molecule.atom_positions(),
        direction,
        REFERENCE_PLANE_SIZE,
        REFERENCE_PLANE_DENSITY,
        0.0,
    );
    let distances = projection::abs_distance(&plane, surface)?;
    Ok(distances.iter().map(|d| *d < size).collect())
}

fn statistic_row(ctx: &GroupContext, values: &[f64]) -> Result<Vec<Descriptor>, CalcError> {
    if values.is_empty() {
        return Err(CalcError::EmptyValueMap);
    }
    let suffix = ctx.set.descriptor.suffix();

    let size = values.len() as f64;
    let res = ctx.set.surface.resolution.powi(2);

    let mut row = Vec::with_capacity(GroupKind::Patch.descriptor_count());
    row.push(Descriptor::new(format!("totalSurf{suffix}"), size / res));
    row.push(Descriptor::new(format!("nSurfP{suffix}"), size));

    let sum: f64 = values.iter().sum();
    let mean = sum / size;
    row.push(Descriptor::new(format!("sumSurf{suffix}"), sum));
    row.push(Descriptor::new(format!("mean{suffix}"), mean));

    let sorted = array::sorted(values);
    let median = sorted[sorted.len() / 2];
    let max = array::max_value(values);
    let min = array::min_value(values);

    row.push(Descriptor::new(format!("medianSurf{suffix}"), median));
    row.push(Descriptor::new(format!("meanRes{suffix}"), mean / res));
    row.push(Descriptor::new(format!("max{suffix}"), max));
    row.push(Descriptor::new(format!("min{suffix}"), min));
    row.push(Descriptor::new(
        format!("devA{suffix}"),
        (max - min) / median,
    ));
    row.push(Descriptor::new(format!("devB{suffix}"), max));

    push_sign_split(&mut row, values, &suffix);
    push_bins(&mut row, values, &suffix, ctx.set.descriptor.bin_width, res);
    Ok(row)
}
