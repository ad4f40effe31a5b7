//! Model ensemble: many independently partitioned ERM fits over the same
//! descriptor matrix, aggregated per observation by the median of the
//! surviving members' responses.

use super::erm::ReplacementModel;
use super::{ModelError, RowRole};
use crate::core::math::array;
use crate::core::math::matrix::Matrix;
use crate::engine::progress::{ProgressReporter, ScreenEvent};
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleConfig {
    /// Number of independently fit members.
    pub members: usize,
    /// Descriptor count per member model.
    pub model_size: usize,
    /// Probability that a row takes part in a member's fit at all.
    pub select_fraction: f64,
    /// Probability that a participating row is held out for validation.
    pub predict_fraction: f64,
    /// Members below these thresholds are ignored during aggregation.
    pub min_model_r_square: f64,
    pub min_predictive_r_square: f64,
    /// Fit against log2 of the response, reversed before reporting.
    pub log_scale: bool,
    /// Normalize descriptor columns by their maximum absolute value.
    pub normalize: bool,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            members: 50,
            model_size: super::erm::DEFAULT_MODEL_SIZE,
            select_fraction: 1.0,
            predict_fraction: 0.15,
            min_model_r_square: 0.5,
            min_predictive_r_square: 0.2,
            log_scale: true,
            normalize: true,
        }
    }
}

/// The ensemble over one descriptor matrix and response vector. Members read
/// shared inputs and own their partitions; aggregation filters by the quality
/// thresholds and reduces per observation by median.
pub struct ModelEnsemble {
    config: EnsembleConfig,
    matrix: Matrix,
    predict_matrix: Option<Matrix>,
    property: Vec<f64>,
    predict_property: Vec<f64>,
    normalization: Vec<f64>,
    members: Vec<ReplacementModel>,
}

impl ModelEnsemble {
    pub fn new(
        matrix: Matrix,
        property: Vec<f64>,
        config: EnsembleConfig,
    ) -> Result<Self, ModelError> {
        if property.len() != matrix.rows() {
            return Err(ModelError::PropertyMismatch {
                property: property.len(),
                rows: matrix.rows(),
            });
        }
        let normalization = if config.normalize {
            matrix.normalization_factors()
        } else {
            Vec::new()
        };
        let matrix = if config.normalize {
            matrix.normalize(&normalization)
        } else {
            matrix
        };
        Ok(Self {
            config,
            matrix,
            predict_matrix: None,
            property,
            predict_property: Vec::new(),
            normalization,
            members: Vec::new(),
        })
    }

    /// Attaches the externally predicted rows (active and predict
    /// observations) and their measured responses.
    pub fn set_predict_data(&mut self, matrix: Matrix, property: Vec<f64>) {
        self.predict_matrix = Some(if self.config.normalize {
            matrix.normalize(&self.normalization)
        } else {
            matrix
        });
        self.predict_property = property;
    }

    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    pub fn members(&self) -> &[ReplacementModel] {
        &self.members
    }

    /// The descriptor matrix in original units, as members consume it.
    fn model_matrix(&self) -> Matrix {
        if self.config.normalize {
            self.matrix.denormalize(&self.normalization)
        } else {
            self.matrix.clone()
        }
    }

    fn prediction_matrix(&self) -> Option<Matrix> {
        let m = self.predict_matrix.as_ref()?;
        Some(if self.config.normalize {
            m.denormalize(&self.normalization)
        } else {
            m.clone()
        })
    }

    fn scaled_property(&self) -> Vec<f64> {
        if self.config.log_scale {
            self.property.iter().map(|v| v.log2()).collect()
        } else {
            self.property.clone()
        }
    }

    fn reverse_scale(&self, values: Vec<f64>) -> Vec<f64> {
        if self.config.log_scale {
            values.into_iter().map(|v| 2f64.powf(v)).collect()
        } else {
            values
        }
    }

    /// Random row partition: rows fail the selection draw entirely, and
    /// selected rows split between training and holdout by the predict draw.
    fn random_partition(&self, rng: &mut impl Rng) -> Vec<RowRole> {
        (0..self.matrix.rows())
            .map(|_| {
                if rng.r#gen::<f64>() <= self.config.select_fraction {
                    if rng.r#gen::<f64>() <= self.config.predict_fraction {
                        RowRole::Holdout
                    } else {
                        RowRole::Train
                    }
                } else {
                    RowRole::Excluded
                }
            })
            .collect()
    }

    fn fit_member(&self, rng: &mut impl Rng) -> Result<ReplacementModel, ModelError> {
        let mut member = ReplacementModel::new(
            self.model_matrix(),
            self.scaled_property(),
            self.random_partition(rng),
        )?;
        member.set_model_size(self.config.model_size);
        member.fit_with_rng(rng)?;
        Ok(member)
    }

    /// Fits every member in sequence, reporting after each.
    pub fn fit(&mut self, reporter: &ProgressReporter) -> Result<(), ModelError> {
        self.fit_with_rng(&mut rand::thread_rng(), reporter)
    }

    pub fn fit_with_rng(
        &mut self,
        rng: &mut impl Rng,
        reporter: &ProgressReporter,
    ) -> Result<(), ModelError> {
        info!(members = self.config.members, "fitting regression ensemble");
        self.members.clear();
        for index in 0..self.config.members {
            let member = self.fit_member(rng)?;
            self.members.push(member);
            reporter.report(ScreenEvent::ModelFitted { index });
        }
        reporter.report(ScreenEvent::EnsembleCompleted);
        Ok(())
    }

    /// Fits the members on the worker pool; no member is visible until the
    /// whole ensemble completes.
    pub fn fit_parallel(&mut self, reporter: &ProgressReporter) -> Result<(), ModelError> {
        info!(
            members = self.config.members,
            "fitting regression ensemble in parallel"
        );
        let members: Result<Vec<ReplacementModel>, ModelError> = (0..self.config.members)
            .into_par_iter()
            .map(|_| self.fit_member(&mut rand::thread_rng()))
            .collect();
        self.members = members?;
        reporter.report(ScreenEvent::EnsembleCompleted);
        Ok(())
    }

    /// The members passing both quality thresholds.
    fn surviving(&self) -> Vec<&ReplacementModel> {
        self.members
            .iter()
            .filter(|m| {
                let model_ok = m
                    .model_r_square()
                    .is_some_and(|r| r > self.config.min_model_r_square);
                let predictive_ok = m
                    .predictive_r_square()
                    .is_some_and(|r| r > self.config.min_predictive_r_square);
                model_ok && predictive_ok
            })
            .collect()
    }

    pub fn surviving_count(&self) -> usize {
        self.surviving().len()
    }

    /// Median fitted response per model observation across the surviving
    /// members, in original response units. `None` when no member survives.
    pub fn model_response(&self) -> Option<Vec<f64>> {
        let matrix = self.model_matrix();
        let rows: Vec<Vec<f64>> = self
            .surviving()
            .iter()
            .filter_map(|m| m.predict(&matrix))
            .map(|r| self.reverse_scale(r))
            .collect();
        if rows.is_empty() {
            debug!("no ensemble member passed the quality thresholds");
            return None;
        }
        Some(median_by_observation(&rows))
    }

    /// Median predicted response per predict observation across the surviving
    /// members. `None` without predict data or surviving members.
    pub fn predict_response(&self) -> Option<Vec<f64>> {
        let matrix = self.prediction_matrix()?;
        let rows: Vec<Vec<f64>> = self
            .surviving()
            .iter()
            .filter_map(|m| m.predict(&matrix))
            .map(|r| self.reverse_scale(r))
            .collect();
        if rows.is_empty() {
            return None;
        }
        Some(median_by_observation(&rows))
    }

    /// `1 - RSS/TSS` of the aggregated model response against the measured
    /// responses.
    pub fn r_square(&self) -> Option<f64> {
        let aggregated = self.model_response()?;
        r_square_against(&self.property, &aggregated, array::mean(&self.property))
    }

    /// `1 - RSS/TSS` of the aggregated predictions against the predict
    /// responses, referenced to the model-property mean. `None` when there is
    /// nothing to predict: reported as "no data" rather than failing.
    pub fn predictive_r_square(&self) -> Option<f64> {
        if self.predict_property.is_empty() {
            return None;
        }
        let aggregated = self.predict_response()?;
        r_square_against(
            &self.predict_property,
            &aggregated,
            array::mean(&self.property),
        )
    }

    /// Per-column sum of absolute coefficients across surviving members,
    /// indexed to the full descriptor matrix.
    pub fn descriptor_importance(&self) -> Vec<f64> {
        let mut importance = vec![0.0; self.matrix.cols()];
        for member in self.surviving() {
            let Some(selected) = member.selected() else {
                continue;
            };
            let Some(coefficients) = member.coefficients() else {
                continue;
            };
            for (slot, column) in selected.iter().enumerate() {
                importance[*column] += coefficients[slot + 1].abs();
            }
        }
        importance
    }

    /// How often each column was selected by a surviving member.
    pub fn selection_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.matrix.cols()];
        for member in self.surviving() {
            let Some(selected) = member.selected() else {
                continue;
            };
            for column in selected {
                counts[*column] += 1;
            }
        }
        counts
    }
}

/// Per-observation median across member response vectors, skipping NaN and
/// infinite entries; an observation every member omits reads as NaN.
fn median_by_observation(rows: &[Vec<f64>]) -> Vec<f64> {
    let n = rows.first().map_or(0, |r| r.len());
    (0..n)
        .map(|i| {
            let mut values: Vec<f64> = rows
                .iter()
                .filter_map(|r| r.get(i).copied())
                .filter(|v| v.is_finite())
                .collect();
            if values.is_empty() {
                return f64::NAN;
            }
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let middle = values.len() / 2;
            if values.len() % 2 == 1 {
                values[middle]
            } else {
                (values[middle - 1] + values[middle]) / 2.0
            }
        })
        .collect()
}

fn r_square_against(actual: &[f64], predicted: &[f64], reference_mean: f64) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }
    let rss: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (p - a) * (p - a))
        .sum();
    let tss: f64 = actual
        .iter()
        .map(|a| (a - reference_mean) * (a - reference_mean))
        .sum();
    if tss == 0.0 {
        return None;
    }
    Some(1.0 - rss / tss)
}
