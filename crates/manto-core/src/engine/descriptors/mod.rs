//! Per-kind descriptor aggregation: each kind reduces mapped surface values
//! to a fixed ordered statistic row, orientation-searching kinds additionally
//! evaluate every candidate orientation and keep one row.

pub mod patch;
pub mod plane;
pub mod shape;
pub mod sphere;
pub mod surface;

mod selection;

use crate::core::models::descriptor::{Descriptor, DescriptorGroup};
use crate::core::models::molecule::Molecule;
use crate::core::models::observation::Condition;
use crate::engine::config::{DescriptorKind, DescriptorSet, SurfaceProperty};
use crate::engine::error::CalcError;
use crate::engine::projection;
use nalgebra::Vector3;

/// Everything a descriptor-group calculation needs to see: the molecule, the
/// definition being applied, and the observation's measurement conditions.
#[derive(Clone, Copy)]
pub struct GroupContext<'a> {
    pub molecule: &'a Molecule,
    pub set: &'a DescriptorSet,
    pub condition: &'a Condition,
}

/// Computes one descriptor group; the dispatch over kinds is exhaustive.
pub fn calc_group(
    ctx: &GroupContext,
    orientations: &[Vector3<f64>],
) -> Result<DescriptorGroup, CalcError> {
    match &ctx.set.kind {
        DescriptorKind::Plane(p) => plane::calc(ctx, p, orientations),
        DescriptorKind::Patch(p) => patch::calc(ctx, p, orientations),
        DescriptorKind::Sphere(p) => sphere::calc(ctx, p, orientations),
        DescriptorKind::Surface => surface::calc(ctx),
        DescriptorKind::Shape => shape::calc(ctx),
    }
}

/// Maps the configured atomic property onto the molecular surface.
///
/// "esp" projects per-atom charges (PQR occupancies) from the atom positions;
/// "hyd" projects per-residue hydrophobicity constants from the residue mass
/// centers.
pub(crate) fn value_map(
    ctx: &GroupContext,
    dielectric: f64,
    ionic_strength_mm: f64,
) -> Result<Vec<f64>, CalcError> {
    let surface = ctx.molecule.surface().ok_or(CalcError::MissingSurface)?;
    let mapped = match ctx.set.surface.property {
        SurfaceProperty::Esp => projection::project(
            surface,
            &ctx.molecule.atom_positions(),
            &ctx.molecule.occupancies(),
            ctx.set.surface.kernel,
            0.0,
            dielectric,
            ionic_strength_mm,
        )?,
        SurfaceProperty::Hyd => projection::project(
            surface,
            &ctx.molecule.residue_mass_centers(),
            &ctx.molecule.hydrophobicity_constants(),
            ctx.set.surface.kernel,
            0.0,
            dielectric,
            ionic_strength_mm,
        )?,
    };
    Ok(mapped)
}

pub(crate) fn to_arrays(orientations: &[Vector3<f64>]) -> Vec<[f64; 3]> {
    orientations.iter().map(|v| [v.x, v.y, v.z]).collect()
}

/// Appends the positive/negative split block shared by the plane, patch,
/// sphere and surface statistic rows.
///
/// TODO: nNeg and relNeg are derived from the positive split; confirm against
/// reference data sets before changing.
pub(crate) fn push_sign_split(row: &mut Vec<Descriptor>, values: &[f64], suffix: &str) {
    let mut n_pos = 0usize;
    let mut n_neg = 0usize;
    let mut sum_pos = 0.0;
    let mut sum_neg = 0.0;
    for v in values {
        if *v > 0.0 {
            n_pos += 1;
            sum_pos += v;
        }
        if *v < 0.0 {
            n_neg += 1;
            sum_neg += v;
        }
    }

    let total = values.len() as f64;
    row.push(Descriptor::new(format!("nPos{suffix}"), n_pos as f64));
    row.push(Descriptor::new(format!("nNeg{suffix}"), n_pos as f64));
    row.push(Descriptor::new(
        format!("relPos{suffix}"),
        n_pos as f64 / total,
    ));
    row.push(Descriptor::new(
        format!("relNeg{suffix}"),
        n_pos as f64 / total,
    ));
    row.push(Descriptor::new(format!("sumPos{suffix}"), sum_pos));
    row.push(Descriptor::new(format!("sumNeg{suffix}"), sum_neg));
    row.push(Descriptor::new(
        format!("averPos{suffix}"),
        sum_pos / n_pos as f64,
    ));
    row.push(Descriptor::new(
        format!("averNeg{suffix}"),
        sum_neg / n_neg as f64,
    ));
}

const BIN_COUNT: usize = 10;

/// Appends the ten histogram bins over `[-5w, +5w)` in steps of the bin
/// width `w`, with counts divided by `scale`.
pub(crate) fn push_bins(
    row: &mut Vec<Descriptor>,
    values: &[f64],
    suffix: &str,
    bin_width: f64,
    scale: f64,
) {
    for i in 1..=BIN_COUNT {
        let low = -(bin_width * BIN_COUNT as f64) * 0.5 + i as f64 * bin_width;
        let high = low + bin_width;
        let count = values.iter().filter(|v| **v >= low && **v < high).count();
        row.push(Descriptor::new(
            format!("binAbs{suffix}_{}", i - 1),
            count as f64 / scale,
        ));
    }
}

/// Per-column mean across all detail rows, labeled with row 0's names.
pub(crate) fn average_rows(detail: &[Vec<Descriptor>]) -> Vec<Descriptor> {
    let Some(first) = detail.first() else {
        return Vec::new();
    };
    let m = detail.len() as f64;
    first
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let sum: f64 = detail
                .iter()
                .filter_map(|row| row.get(i).map(|d| d.value()))
                .sum();
            Descriptor::new(d.name(), sum / m)
        })
        .collect()
}

pub(crate) use selection::{descriptor_position, select_orientation};
