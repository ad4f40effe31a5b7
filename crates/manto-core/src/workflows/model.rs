//! The model fitting workflow: builds the ensemble from a screened
//! descriptor matrix and reports the aggregate statistics.

use crate::core::math::matrix::Matrix;
use crate::engine::progress::ProgressReporter;
use crate::engine::regression::ModelError;
use crate::engine::regression::ensemble::{EnsembleConfig, ModelEnsemble};
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct ModelResult {
    /// Ensemble R-square of the aggregated model response; `None` when no
    /// member passed the quality thresholds.
    pub r_square: Option<f64>,
    /// Ensemble R-square over the predict rows; `None` without predict data.
    pub predictive_r_square: Option<f64>,
    pub model_response: Option<Vec<f64>>,
    pub predict_response: Option<Vec<f64>>,
    /// Sum of absolute coefficients per descriptor column across surviving
    /// members.
    pub descriptor_importance: Vec<f64>,
    /// Selection count per descriptor column across surviving members.
    pub selection_counts: Vec<usize>,
    pub surviving_members: usize,
    pub total_members: usize,
}

/// Fits the regression ensemble and collects its aggregate report.
#[instrument(skip_all, name = "model_workflow")]
pub fn fit_ensemble(
    model_matrix: Matrix,
    model_property: Vec<f64>,
    predict_matrix: Option<(Matrix, Vec<f64>)>,
    config: EnsembleConfig,
    reporter: &ProgressReporter,
    parallel: bool,
) -> Result<ModelResult, ModelError> {
    let mut ensemble = ModelEnsemble::new(model_matrix, model_property, config)?;
    if let Some((matrix, property)) = predict_matrix {
        ensemble.set_predict_data(matrix, property);
    }

    if parallel {
        ensemble.fit_parallel(reporter)?;
    } else {
        ensemble.fit(reporter)?;
    }

    let result = ModelResult {
        r_square: ensemble.r_square(),
        predictive_r_square: ensemble.predictive_r_square(),
        model_response: ensemble.model_response(),
        predict_response: ensemble.predict_response(),
        descriptor_importance: ensemble.descriptor_importance(),
        selection_counts: ensemble.selection_counts(),
        surviving_members: ensemble.surviving_count(),
        total_members: ensemble.members().len(),
    };
    info!(
        surviving = result.surviving_members,
        total = result.total_members,
        r_square = ?result.r_square,
        "ensemble fit finished"
    );
    Ok(result)
}
