use super::atom::Atom;
use crate::core::tables;
use nalgebra::{Point3, Vector3};

/// A group of atoms sharing a residue, identified by its three-letter code.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub code: String,
    pub atoms: Vec<Atom>,
}

impl Residue {
    pub fn new(code: &str, atoms: Vec<Atom>) -> Self {
        Self {
            code: code.to_string(),
            atoms,
        }
    }
}

/// A molecule as the descriptor engine sees it: an ordered list of residues
/// and an optional surface point cloud.
///
/// The surface is produced by an external provider and cached here once
/// assigned; it must be cleared whenever the underlying structure changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    residues: Vec<Residue>,
    surface: Option<Vec<Point3<f64>>>,
}

impl Molecule {
    pub fn new(residues: Vec<Residue>) -> Self {
        Self {
            residues,
            surface: None,
        }
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.residues.iter().flat_map(|r| r.atoms.iter())
    }

    pub fn atom_count(&self) -> usize {
        self.residues.iter().map(|r| r.atoms.len()).sum()
    }

    pub fn atom_positions(&self) -> Vec<Point3<f64>> {
        self.atoms().map(|a| a.position).collect()
    }

    /// Per-atom occupancy values; PQR files code the atom charge as occupancy.
    pub fn occupancies(&self) -> Vec<f64> {
        self.atoms().map(|a| a.occupancy).collect()
    }

    pub fn atom_masses(&self) -> Vec<f64> {
        self.atoms().map(|a| a.mass()).collect()
    }

    pub fn total_mass(&self) -> f64 {
        self.atoms().map(|a| a.mass()).sum()
    }

    pub fn total_charge(&self) -> f64 {
        self.atoms().map(|a| a.occupancy).sum()
    }

    /// Geometric center of all atoms.
    pub fn center(&self) -> Point3<f64> {
        let positions = self.atom_positions();
        let weights = vec![1.0; positions.len()];
        weighted_center(&positions, &weights)
    }

    /// Mass-weighted center of all atoms.
    pub fn mass_center(&self) -> Point3<f64> {
        weighted_center(&self.atom_positions(), &self.atom_masses())
    }

    /// One mass-weighted center per residue, in residue order.
    pub fn residue_mass_centers(&self) -> Vec<Point3<f64>> {
        self.residues
            .iter()
            .map(|r| {
                let positions: Vec<Point3<f64>> = r.atoms.iter().map(|a| a.position).collect();
                let masses: Vec<f64> = r.atoms.iter().map(|a| a.mass()).collect();
                weighted_center(&positions, &masses)
            })
            .collect()
    }

    /// One geometric center per residue, in residue order.
    pub fn residue_geometric_centers(&self) -> Vec<Point3<f64>> {
        self.residues
            .iter()
            .map(|r| {
                let positions: Vec<Point3<f64>> = r.atoms.iter().map(|a| a.position).collect();
                let weights = vec![1.0; positions.len()];
                weighted_center(&positions, &weights)
            })
            .collect()
    }

    /// One hydrophobicity constant per residue; unknown codes map to 0.0.
    pub fn hydrophobicity_constants(&self) -> Vec<f64> {
        self.residues
            .iter()
            .map(|r| tables::hydrophobicity_constant(&r.code))
            .collect()
    }

    pub fn surface(&self) -> Option<&[Point3<f64>]> {
        self.surface.as_deref()
    }

    pub fn assign_surface(&mut self, points: Vec<Point3<f64>>) {
        self.surface = Some(points);
    }

    pub fn clear_surface(&mut self) {
        self.surface = None;
    }
}

/// Weighted center of a point cloud: `sum(p_i * w_i) / sum(w_i)`.
/// Returns the origin for an empty cloud.
pub fn weighted_center(positions: &[Point3<f64>], weights: &[f64]) -> Point3<f64> {
    let total: f64 = weights.iter().sum();
    if positions.is_empty() || total == 0.0 {
        return Point3::origin();
    }
    let sum: Vector3<f64> = positions
        .iter()
        .zip(weights)
        .map(|(p, w)| p.coords * *w)
        .sum();
    Point3::from(sum / total)
}
