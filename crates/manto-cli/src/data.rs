//! Project data access: settings files, structures, precomputed surface
//! point files, and the JSON-backed descriptor checkpoint.

use crate::config::RunConfig;
use crate::error::{CliError, Result};
use mantoqsar::core::io::pqr;
use mantoqsar::core::models::molecule::Molecule;
use mantoqsar::core::models::observation::Observation;
use mantoqsar::engine::batch::{CheckpointStore, ObservationResult, SurfaceProvider};
use mantoqsar::engine::config::{DescriptorSet, SurfaceParams};
use mantoqsar::engine::error::CalcError;
use nalgebra::Point3;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn parse_error(path: &Path, message: impl ToString) -> CliError {
    CliError::Parse {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

pub fn load_observations(path: &Path) -> Result<Vec<Observation>> {
    let text = fs::read_to_string(path)?;
    let observations: Vec<Observation> =
        serde_json::from_str(&text).map_err(|e| parse_error(path, e))?;
    info!(count = observations.len(), "loaded observation settings");
    Ok(observations)
}

pub fn load_descriptor_sets(path: &Path) -> Result<Vec<DescriptorSet>> {
    let text = fs::read_to_string(path)?;
    let sets: Vec<DescriptorSet> = serde_json::from_str(&text).map_err(|e| parse_error(path, e))?;
    info!(count = sets.len(), "loaded descriptor settings");
    Ok(sets)
}

pub fn load_run_config(path: &Path) -> Result<RunConfig> {
    if !path.exists() {
        info!(path = %path.display(), "no model configuration file, using defaults");
        return Ok(RunConfig::default());
    }
    let text = fs::read_to_string(path)?;
    toml::from_str(&text).map_err(|e| parse_error(path, e))
}

/// Imports one structure per observation. A failed import is logged and the
/// molecule left empty, so the remaining observations still compute.
pub fn load_molecules(project: &Path, observations: &[Observation]) -> Vec<Molecule> {
    observations
        .iter()
        .map(|obs| {
            let path = project.join(&obs.file);
            match pqr::read_file(&path) {
                Ok(molecule) => molecule,
                Err(error) => {
                    warn!(
                        observation = %obs.name,
                        path = %path.display(),
                        %error,
                        "structure import failed, observation will produce empty descriptors"
                    );
                    Molecule::default()
                }
            }
        })
        .collect()
}

/// Serves surface point clouds from `<structure stem>.surf` files next to
/// each structure: one `x y z` triple per line.
pub struct FileSurfaceProvider {
    project: PathBuf,
}

impl FileSurfaceProvider {
    pub fn new(project: &Path) -> Self {
        Self {
            project: project.to_path_buf(),
        }
    }
}

impl SurfaceProvider for FileSurfaceProvider {
    fn surface(
        &self,
        observation: &Observation,
        _molecule: &Molecule,
        _params: &SurfaceParams,
    ) -> std::result::Result<Vec<Point3<f64>>, CalcError> {
        let path = self
            .project
            .join(&observation.file)
            .with_extension("surf");
        let text = fs::read_to_string(&path).map_err(|e| {
            CalcError::SurfaceProvider(format!("{}: {e}", path.display()))
        })?;

        let mut points = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 3 {
                return Err(CalcError::SurfaceProvider(format!(
                    "{}:{}: expected three coordinates",
                    path.display(),
                    index + 1
                )));
            }
            let mut coords = [0.0f64; 3];
            for (slot, field) in coords.iter_mut().zip(&fields) {
                *slot = field.parse().map_err(|_| {
                    CalcError::SurfaceProvider(format!(
                        "{}:{}: invalid coordinate '{field}'",
                        path.display(),
                        index + 1
                    ))
                })?;
            }
            points.push(Point3::new(coords[0], coords[1], coords[2]));
        }
        Ok(points)
    }
}

/// Persists the per-observation descriptor groups as a JSON document,
/// rewritten after every completed observation so an interrupted batch can
/// resume.
pub struct JsonCheckpointStore {
    path: PathBuf,
}

impl JsonCheckpointStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn load(&self) -> std::result::Result<Vec<ObservationResult>, CalcError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)
            .map_err(|e| CalcError::Checkpoint(format!("{}: {e}", self.path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| CalcError::Checkpoint(format!("{}: {e}", self.path.display())))
    }

    fn save(&self, results: &[ObservationResult]) -> std::result::Result<(), CalcError> {
        let text = serde_json::to_string(results)
            .map_err(|e| CalcError::Checkpoint(e.to_string()))?;
        fs::write(&self.path, text)
            .map_err(|e| CalcError::Checkpoint(format!("{}: {e}", self.path.display())))
    }
}
