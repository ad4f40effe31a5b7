//! Whole-surface descriptors: one 28-statistic row over the complete surface
//! value map, no orientation search.

use super::{GroupContext, push_bins, push_sign_split};
use crate::core::math::array;
use crate::core::models::descriptor::{Descriptor, DescriptorGroup, GroupKind};
use crate::engine::error::CalcError;
use crate::engine::projection::{DEFAULT_IONIC_STRENGTH_MM, SURFACE_DIELECTRIC};

pub fn calc(ctx: &GroupContext) -> Result<DescriptorGroup, CalcError> {
    let values = super::value_map(ctx, SURFACE_DIELECTRIC, DEFAULT_IONIC_STRENGTH_MM)?;
    if values.is_empty() {
        return Err(CalcError::EmptyValueMap);
    }
    let row = statistic_row(ctx, &values);
    Ok(DescriptorGroup {
        kind: GroupKind::Surface,
        descriptors: row.clone(),
        detail: vec![row],
        orientation_index: None,
        orientations: Vec::new(),
    })
}

fn statistic_row(ctx: &GroupContext, values: &[f64]) -> Vec<Descriptor> {
    let suffix = ctx.set.descriptor.suffix();

    let size = values.len() as f64;
    let res = ctx.set.surface.resolution.powi(2);

    let mut row = Vec::with_capacity(GroupKind::Surface.descriptor_count());
    row.push(Descriptor::new(format!("totalSurf{suffix}"), size / res));
    row.push(Descriptor::new(format!("nSurfP{suffix}"), size));

    let sum: f64 = values.iter().sum();
    let mean = sum / size;
    row.push(Descriptor::new(format!("sum{suffix}"), sum));
    row.push(Descriptor::new(format!("mean{suffix}"), mean));

    let sorted = array::sorted(values);
    let median = sorted[sorted.len() / 2];
    let max = array::max_value(values);
    let min = array::min_value(values);

    row.push(Descriptor::new(format!("median{suffix}"), median));
    row.push(Descriptor::new(format!("meanRes{suffix}"), mean / res));
    row.push(Descriptor::new(format!("max{suffix}"), max));
    row.push(Descriptor::new(format!("min{suffix}"), min));
    row.push(Descriptor::new(
        format!("devA{suffix}"),
        (max - min) / median,
    ));
    row.push(Descriptor::new(format!("devB{suffix}"), (max - min) / mean));

    push_sign_split(&mut row, values, &suffix);
    push_bins(&mut row, values, &suffix, ctx.set.descriptor.bin_width, res);
    row
}
