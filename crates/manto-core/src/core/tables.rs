use phf::phf_map;

/// Average atomic masses in unified atomic mass units, keyed by the
/// upper-case element symbol. Covers the elements that occur in protein
/// structures and common cofactors/counter ions.
static ATOMIC_MASS: phf::Map<&'static str, f64> = phf_map! {
    "H" => 1.008,
    "C" => 12.011,
    "N" => 14.007,
    "O" => 15.999,
    "S" => 32.06,
    "P" => 30.974,
    "SE" => 78.971,
    "F" => 18.998,
    "CL" => 35.45,
    "BR" => 79.904,
    "I" => 126.904,
    "NA" => 22.990,
    "K" => 39.098,
    "MG" => 24.305,
    "CA" => 40.078,
    "MN" => 54.938,
    "FE" => 55.845,
    "CU" => 63.546,
    "ZN" => 65.38,
};

/// Hydropathy constants per three-letter residue code, after
/// Kyte, J., & Doolittle, R. F. (1982). A simple method for displaying the
/// hydropathic character of a protein. J. Mol. Biol., 157(1), 105-132.
static HYDROPHOBICITY: phf::Map<&'static str, f64> = phf_map! {
    "TRP" => 7.9,
    "PHE" => 7.5,
    "LEU" => 6.6,
    "ILE" => 4.3,
    "TYR" => 7.1,
    "VAL" => 5.1,
    "MET" => 2.5,
    "PRO" => 2.2,
    "CYS" => 0.0,
    "ARG" => -1.1,
    "ALA" => -0.3,
    "LYS" => -3.6,
    "GLY" => 1.2,
    "ASP" => -1.4,
    "GLU" => 0.0,
    "HIS" => -1.3,
    "THR" => -2.2,
    "SER" => -0.6,
    "ASN" => -0.2,
    "GLN" => -0.2,
};

/// Looks up the atomic mass for an element symbol (case-insensitive).
/// Unknown symbols map to 0.0.
pub fn atomic_mass(element: &str) -> f64 {
    ATOMIC_MASS
        .get(element.trim().to_ascii_uppercase().as_str())
        .copied()
        .unwrap_or(0.0)
}

/// Looks up the hydrophobicity constant for a three-letter residue code
/// (case-insensitive). Unknown or missing codes map to 0.0.
pub fn hydrophobicity_constant(residue_code: &str) -> f64 {
    HYDROPHOBICITY
        .get(residue_code.trim().to_ascii_uppercase().as_str())
        .copied()
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_mass_is_case_insensitive() {
        assert_eq!(atomic_mass("C"), 12.011);
        assert_eq!(atomic_mass("c"), 12.011);
        assert_eq!(atomic_mass("Fe"), 55.845);
        assert_eq!(atomic_mass("fe"), 55.845);
    }

    #[test]
    fn unknown_element_has_zero_mass() {
        assert_eq!(atomic_mass("Xx"), 0.0);
        assert_eq!(atomic_mass(""), 0.0);
    }

    #[test]
    fn hydrophobicity_covers_all_twenty_residues() {
        assert_eq!(HYDROPHOBICITY.len(), 20);
        assert_eq!(hydrophobicity_constant("TRP"), 7.9);
        assert_eq!(hydrophobicity_constant("lys"), -3.6);
    }

    #[test]
    fn unknown_residue_code_maps_to_zero() {
        assert_eq!(hydrophobicity_constant("UNK"), 0.0);
        assert_eq!(hydrophobicity_constant(""), 0.0);
    }
}
