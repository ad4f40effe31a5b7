//! The descriptor screening workflow: surfaces, per-observation descriptor
//! groups, and the assembled matrices, in one call.

use crate::core::math::matrix::Matrix;
use crate::engine::batch::{
    self, CheckpointStore, ObservationResult, SurfaceProvider,
};
use crate::engine::context::ScreenContext;
use crate::engine::error::CalcError;
use crate::engine::progress::ProgressReporter;
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenOptions {
    /// Compute observations on the worker pool instead of sequentially.
    /// The sequential path is the one that checkpoints after every
    /// observation.
    pub parallel: bool,
}

#[derive(Debug, Clone)]
pub struct ScreenResult {
    pub results: Vec<ObservationResult>,
    pub descriptor_names: Vec<String>,
    pub descriptor_matrix: Matrix,
    pub model_matrix: Matrix,
    pub predict_matrix: Matrix,
    pub model_property: Vec<f64>,
    pub predict_property: Vec<f64>,
}

/// Runs the full descriptor batch for every observation in the context.
///
/// Surfaces are prepared up front so the batch itself reads shared data
/// immutably; the sequential path persists through `store` after every
/// observation and resumes from whatever the store already holds.
#[instrument(skip_all, name = "screen_workflow")]
pub fn run(
    ctx: &mut ScreenContext,
    provider: &dyn SurfaceProvider,
    store: Option<&dyn CheckpointStore>,
    reporter: &ProgressReporter,
    options: ScreenOptions,
) -> Result<ScreenResult, CalcError> {
    if ctx.descriptor_sets.is_empty() {
        return Err(CalcError::NoDescriptorSets);
    }
    info!(
        observations = ctx.observation_count(),
        descriptor_sets = ctx.descriptor_sets.len(),
        "starting descriptor screening"
    );

    batch::prepare_surfaces(ctx, provider)?;

    let results = if options.parallel {
        batch::run_parallel(ctx, reporter)
    } else {
        batch::run_sequential(ctx, store, reporter)?
    };

    let result = ScreenResult {
        descriptor_names: batch::descriptor_names(&results),
        descriptor_matrix: batch::descriptor_matrix(&results),
        model_matrix: batch::model_descriptor_matrix(ctx, &results),
        predict_matrix: batch::predict_descriptor_matrix(ctx, &results),
        model_property: ctx.model_property(),
        predict_property: ctx.predict_property(),
        results,
    };
    info!(
        rows = result.descriptor_matrix.rows(),
        columns = result.descriptor_matrix.cols(),
        "descriptor screening finished"
    );
    Ok(result)
}
