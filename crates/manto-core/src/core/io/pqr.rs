//! PQR structure import.
//!
//! PQR is the whitespace-delimited PDB variant produced by pdb2pqr/APBS in
//! which the occupancy and temperature columns are replaced by the per-atom
//! charge and radius. The charge lands in [`Atom::occupancy`], which is the
//! convention the descriptor engine relies on.

use crate::core::models::atom::Atom;
use crate::core::models::molecule::{Molecule, Residue};
use crate::core::tables;
use nalgebra::Point3;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PqrError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("no ATOM or HETATM records found")]
    Empty,
}

/// Reads a PQR structure from any buffered reader.
pub fn read_from(reader: &mut impl BufRead) -> Result<Molecule, PqrError> {
    let mut residues: Vec<Residue> = Vec::new();
    let mut current_key: Option<(String, String, String)> = None;

    for (line_index, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let line_number = line_index + 1;

        let record = line.split_whitespace().next().unwrap_or("");
        if record != "ATOM" && record != "HETATM" {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        // ATOM serial name resName [chain] resSeq x y z charge radius
        let (name, res_name, chain, res_seq, tail) = match fields.len() {
            11 => (
                fields[2],
                fields[3],
                fields[4],
                fields[5],
                &fields[6..11],
            ),
            10 => (fields[2], fields[3], "", fields[4], &fields[5..10]),
            _ => {
                return Err(PqrError::Parse {
                    line: line_number,
                    message: format!("expected 10 or 11 fields, found {}", fields.len()),
                });
            }
        };

        let mut numbers = [0.0f64; 5];
        for (slot, field) in numbers.iter_mut().zip(tail.iter()) {
            *slot = field.parse().map_err(|_| PqrError::Parse {
                line: line_number,
                message: format!("invalid number '{field}'"),
            })?;
        }
        let [x, y, z, charge, _radius] = numbers;

        let mut atom = Atom::new(name, &element_from_atom_name(name), Point3::new(x, y, z));
        atom.occupancy = charge;

        let key = (
            res_name.to_string(),
            chain.to_string(),
            res_seq.to_string(),
        );
        if current_key.as_ref() != Some(&key) {
            residues.push(Residue::new(res_name, Vec::new()));
            current_key = Some(key);
        }
        residues
            .last_mut()
            .expect("residue pushed above")
            .atoms
            .push(atom);
    }

    if residues.is_empty() {
        return Err(PqrError::Empty);
    }
    Ok(Molecule::new(residues))
}

/// Reads a PQR structure from a file path.
pub fn read_file(path: impl AsRef<Path>) -> Result<Molecule, PqrError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_from(&mut reader)
}

/// Derives an element symbol from a PQR atom name.
///
/// PQR carries no element column. The leading alphabetic characters of the
/// atom name are matched against the mass table, preferring a two-letter
/// symbol (FE, ZN, ...) over a one-letter one.
fn element_from_atom_name(name: &str) -> String {
    let letters: String = name
        .chars()
        .skip_while(|c| c.is_ascii_digit())
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return String::new();
    }

    let upper = letters.to_ascii_uppercase();
    if upper.len() >= 2 {
        let two = &upper[..2];
        if tables::atomic_mass(two) > 0.0 && !matches!(&two[..1], "H" | "C" | "N" | "O" | "S") {
            return two.to_string();
        }
    }
    upper[..1].to_string()
}
