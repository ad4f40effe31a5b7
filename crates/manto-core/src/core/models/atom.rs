use crate::core::tables;
use nalgebra::Point3;

/// Represents an atom in a molecular structure.
///
/// This struct carries the minimal information the descriptor engine needs:
/// identity, 3-D position, and the partial charge. Structures imported from
/// PQR files encode the partial charge in the occupancy column, which is why
/// the field keeps that name throughout the library.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom within its residue (e.g., "CA", "N", "O").
    pub name: String,
    /// The element symbol used for atomic mass lookup (e.g., "C", "FE").
    pub element: String,
    /// The 3-D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// The occupancy value, used as a surrogate for the partial atomic charge
    /// in elementary charge units (PQR convention).
    pub occupancy: f64,
}

impl Atom {
    /// Creates a new `Atom` with zero occupancy.
    pub fn new(name: &str, element: &str, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            element: element.to_string(),
            position,
            occupancy: 0.0,
        }
    }

    /// The atomic mass of this atom's element; 0.0 for unknown elements.
    pub fn mass(&self) -> f64 {
        tables::atomic_mass(&self.element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_has_zero_occupancy() {
        let atom = Atom::new("CA", "C", Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.name, "CA");
        assert_eq!(atom.element, "C");
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.occupancy, 0.0);
    }

    #[test]
    fn mass_comes_from_the_element_table() {
        let atom = Atom::new("NZ", "N", Point3::origin());
        assert_eq!(atom.mass(), 14.007);

        let unknown = Atom::new("X1", "Xx", Point3::origin());
        assert_eq!(unknown.mass(), 0.0);
    }
}
