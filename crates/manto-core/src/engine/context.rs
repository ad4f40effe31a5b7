use crate::core::models::molecule::Molecule;
use crate::core::models::observation::Observation;
use crate::engine::config::DescriptorSet;
use crate::engine::error::CalcError;

/// The mutable state of one screening run, passed explicitly to every
/// computation instead of living in process-wide storage.
///
/// Observations and molecules are parallel lists: entry `i` of each belongs
/// to the same measured sample.
#[derive(Debug, Clone)]
pub struct ScreenContext {
    pub descriptor_sets: Vec<DescriptorSet>,
    pub observations: Vec<Observation>,
    pub molecules: Vec<Molecule>,
}

impl ScreenContext {
    pub fn new(
        descriptor_sets: Vec<DescriptorSet>,
        observations: Vec<Observation>,
        molecules: Vec<Molecule>,
    ) -> Result<Self, CalcError> {
        if observations.len() != molecules.len() {
            return Err(CalcError::ObservationMoleculeMismatch {
                observations: observations.len(),
                molecules: molecules.len(),
            });
        }
        Ok(Self {
            descriptor_sets,
            observations,
            molecules,
        })
    }

    pub fn observation_count(&self) -> usize {
        self.observations.len()
    }

    pub fn active_count(&self) -> usize {
        self.observations.iter().filter(|o| o.is_active()).count()
    }

    pub fn model_count(&self) -> usize {
        self.observations.iter().filter(|o| o.is_model()).count()
    }

    pub fn predict_count(&self) -> usize {
        self.observations
            .iter()
            .filter(|o| o.is_active() && o.is_predict())
            .count()
    }

    /// Responses of the model rows (active, not predict), in row order.
    pub fn model_property(&self) -> Vec<f64> {
        self.observations
            .iter()
            .filter(|o| o.is_model())
            .filter_map(|o| o.response)
            .collect()
    }

    /// Responses of the predict rows (active and predict), in row order.
    pub fn predict_property(&self) -> Vec<f64> {
        self.observations
            .iter()
            .filter(|o| o.is_active() && o.is_predict())
            .filter_map(|o| o.response)
            .collect()
    }
}
