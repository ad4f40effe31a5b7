//! Shape descriptors: global geometry of the molecule from the radii between
//! its mass-weighted center and the surface points, plus atomic mass/charge
//! totals. No projection engine involved.

use super::GroupContext;
use crate::core::math::array;
use crate::core::models::descriptor::{Descriptor, DescriptorGroup, GroupKind};
use crate::engine::error::CalcError;
use crate::engine::projection;

pub fn calc(ctx: &GroupContext) -> Result<DescriptorGroup, CalcError> {
    let surface = ctx.molecule.surface().ok_or(CalcError::MissingSurface)?;
    if surface.is_empty() {
        return Err(CalcError::EmptyValueMap);
    }
    let suffix = ctx.set.descriptor.suffix();

    let center = ctx.molecule.mass_center();
    let radii = projection::abs_distance(&[center], surface)?;

    let sorted = array::sorted(&radii);
    let median = sorted[sorted.len() / 2];
    let max = array::max_value(&radii);
    let min = array::min_value(&radii);

    let res = ctx.set.surface.resolution.powi(2);
    let n_points = radii.len() as f64;
    let n_atom = ctx.molecule.atom_count() as f64;
    let n_residue = ctx.molecule.residue_count() as f64;
    let mass = ctx.molecule.total_mass();
    let charge = ctx.molecule.total_charge();

    let mut row = Vec::with_capacity(GroupKind::Shape.descriptor_count());
    row.push(Descriptor::new(format!("shapeMax{suffix}"), max / median));
    row.push(Descriptor::new(format!("shapeMin{suffix}"), min / median));
    row.push(Descriptor::new(
        format!("shapeFactor{suffix}"),
        (max - min) / median,
    ));
    row.push(Descriptor::new(format!("nSurfP{suffix}"), n_points));
    row.push(Descriptor::new(format!("surfArea{suffix}"), n_points * res));
    row.push(Descriptor::new(format!("nAtom{suffix}"), n_atom));
    row.push(Descriptor::new(format!("nAAcid{suffix}"), n_residue));
    row.push(Descriptor::new(format!("mass{suffix}"), mass));
    row.push(Descriptor::new(
        format!("dens{suffix}"),
        mass / (n_points * res),
    ));
    row.push(Descriptor::new(format!("charge{suffix}"), charge));
    row.push(Descriptor::new(
        format!("chargeDens{suffix}"),
        charge / n_atom,
    ));

    Ok(DescriptorGroup {
        kind: GroupKind::Shape,
        descriptors: row.clone(),
        detail: vec![row],
        orientation_index: None,
        orientations: Vec::new(),
    })
}
