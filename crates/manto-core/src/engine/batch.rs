//! Batch orchestration: computes every configured descriptor group for every
//! observation, sequentially with checkpointed resume or on a worker pool,
//! and assembles the resulting descriptor matrices.

use crate::core::math::matrix::Matrix;
use crate::core::math::sphere;
use crate::core::models::descriptor::DescriptorGroup;
use crate::core::models::molecule::Molecule;
use crate::core::models::observation::Observation;
use crate::engine::config::SurfaceParams;
use crate::engine::context::ScreenContext;
use crate::engine::descriptors::{self, GroupContext};
use crate::engine::error::CalcError;
use crate::engine::progress::{ProgressReporter, ScreenEvent};
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use tracing::{info, warn};

/// One observation's descriptor groups, one per configured descriptor set;
/// empty for inactive observations.
pub type ObservationResult = Vec<DescriptorGroup>;

/// Supplies cached surface point clouds for molecules. Surface generation
/// itself lives outside the engine.
pub trait SurfaceProvider {
    fn surface(
        &self,
        observation: &Observation,
        molecule: &Molecule,
        params: &SurfaceParams,
    ) -> Result<Vec<Point3<f64>>, CalcError>;
}

/// Persists completed observation results so an interrupted batch can resume
/// from the last finished observation.
pub trait CheckpointStore {
    fn load(&self) -> Result<Vec<ObservationResult>, CalcError>;
    fn save(&self, results: &[ObservationResult]) -> Result<(), CalcError>;
}

/// Ensures every active observation's molecule has a surface assigned, using
/// the first descriptor set's surface parameters (all sets share one surface).
pub fn prepare_surfaces(
    ctx: &mut ScreenContext,
    provider: &dyn SurfaceProvider,
) -> Result<(), CalcError> {
    let params = ctx
        .descriptor_sets
        .first()
        .map(|set| set.surface.clone())
        .ok_or(CalcError::NoDescriptorSets)?;

    for i in 0..ctx.observation_count() {
        if !ctx.observations[i].is_active() || ctx.molecules[i].surface().is_some() {
            continue;
        }
        let points = provider.surface(&ctx.observations[i], &ctx.molecules[i], &params)?;
        ctx.molecules[i].assign_surface(points);
    }
    Ok(())
}

/// Computes all descriptor groups for one observation, walking the descriptor
/// sets in order and maintaining the current orientation set across them.
///
/// A failed group is logged and replaced by its kind's zero-filled
/// placeholder so one bad calculation never aborts the batch or breaks row
/// alignment.
pub fn calc_observation(ctx: &ScreenContext, index: usize) -> ObservationResult {
    let observation = &ctx.observations[index];
    let molecule = &ctx.molecules[index];

    let mut orientations: Vec<Vector3<f64>> = sphere::sphere_points(120);
    let mut groups = Vec::with_capacity(ctx.descriptor_sets.len());

    for set in &ctx.descriptor_sets {
        if let Some(projection) = set.projection() {
            if projection.reuse_orientations {
                info!("using orientations identified by the previous descriptor set");
            } else {
                orientations = sphere::sphere_points(projection.orientations);
            }
        }

        let group_ctx = GroupContext {
            molecule,
            set,
            condition: &observation.condition,
        };
        let group = match descriptors::calc_group(&group_ctx, &orientations) {
            Ok(group) => group,
            Err(error) => {
                warn!(
                    observation = index,
                    %error,
                    "descriptor group calculation failed, substituting placeholder"
                );
                DescriptorGroup::placeholder(set.group_kind())
            }
        };
        groups.push(group);
    }
    groups
}

/// Sequential batch: observations are processed in order and each completed
/// result is persisted before the next starts, so a crash loses at most one
/// observation's work. Resumes from the checkpoint prefix when one exists.
pub fn run_sequential(
    ctx: &ScreenContext,
    store: Option<&dyn CheckpointStore>,
    reporter: &ProgressReporter,
) -> Result<Vec<ObservationResult>, CalcError> {
    let mut results = match store {
        Some(store) => store.load()?,
        None => Vec::new(),
    };
    results.truncate(ctx.observation_count());
    if !results.is_empty() {
        info!(
            completed = results.len(),
            "resuming descriptor calculation from checkpoint"
        );
    }

    for index in results.len()..ctx.observation_count() {
        let groups = if ctx.observations[index].is_active() {
            calc_observation(ctx, index)
        } else {
            Vec::new()
        };
        results.push(groups);
        if let Some(store) = store {
            store.save(&results)?;
        }
        reporter.report(ScreenEvent::ObservationCompleted { index });
    }

    reporter.report(ScreenEvent::BatchCompleted);
    Ok(results)
}

/// Parallel batch: one task per observation on the global worker pool.
/// Results are collected by index, so order is restored and no partial
/// results become visible before the whole batch completes.
pub fn run_parallel(ctx: &ScreenContext, reporter: &ProgressReporter) -> Vec<ObservationResult> {
    let results: Vec<ObservationResult> = (0..ctx.observation_count())
        .into_par_iter()
        .map(|index| {
            if ctx.observations[index].is_active() {
                calc_observation(ctx, index)
            } else {
                Vec::new()
            }
        })
        .collect();

    reporter.report(ScreenEvent::BatchCompleted);
    results
}

/// Dense matrix over all observations: rows in observation order, columns the
/// concatenation of all group values. Inactive or failed observations keep
/// their zero-filled rows.
pub fn descriptor_matrix(results: &[ObservationResult]) -> Matrix {
    let column_count = results
        .iter()
        .find(|r| !r.is_empty())
        .map(|r| r.iter().map(|g| g.len()).sum())
        .unwrap_or(0);

    let mut matrix = Matrix::zeros(results.len(), column_count);
    for (row, groups) in results.iter().enumerate() {
        fill_row(&mut matrix, row, groups);
    }
    matrix
}

/// Rows restricted to model observations (active, not predict).
pub fn model_descriptor_matrix(ctx: &ScreenContext, results: &[ObservationResult]) -> Matrix {
    selected_matrix(ctx, results, |o| o.is_model())
}

/// Rows restricted to predict observations (active and predict).
pub fn predict_descriptor_matrix(ctx: &ScreenContext, results: &[ObservationResult]) -> Matrix {
    selected_matrix(ctx, results, |o| o.is_active() && o.is_predict())
}

fn selected_matrix(
    ctx: &ScreenContext,
    results: &[ObservationResult],
    keep: impl Fn(&Observation) -> bool,
) -> Matrix {
    let column_count = results
        .iter()
        .find(|r| !r.is_empty())
        .map(|r| r.iter().map(|g| g.len()).sum())
        .unwrap_or(0);
    let rows = ctx.observations.iter().filter(|o| keep(o)).count();

    let mut matrix = Matrix::zeros(rows, column_count);
    let mut row = 0;
    for (observation, groups) in ctx.observations.iter().zip(results) {
        if !keep(observation) {
            continue;
        }
        fill_row(&mut matrix, row, groups);
        row += 1;
    }
    matrix
}

fn fill_row(matrix: &mut Matrix, row: usize, groups: &[DescriptorGroup]) {
    let mut col = 0;
    for group in groups {
        for descriptor in &group.descriptors {
            if col >= matrix.cols() {
                return;
            }
            matrix.set(row, col, descriptor.value());
            col += 1;
        }
    }
}

/// Descriptor column labels, taken from the first non-empty observation.
pub fn descriptor_names(results: &[ObservationResult]) -> Vec<String> {
    results
        .iter()
        .find(|r| !r.is_empty())
        .map(|groups| groups.iter().flat_map(|g| g.names()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::descriptor::{Descriptor, GroupKind};
    use crate::core::models::observation::Condition;

    fn observation(response: Option<f64>, predict: bool) -> Observation {
        Observation {
            name: "o".to_string(),
            file: "o.pqr".to_string(),
            species: None,
            condition: Condition::default(),
            response,
            active: true,
            predict,
            note: None,
        }
    }

    fn group(values: &[f64]) -> DescriptorGroup {
        DescriptorGroup {
            kind: GroupKind::Shape,
            descriptors: values
                .iter()
                .map(|v| Descriptor::new("d", *v))
                .collect(),
            detail: Vec::new(),
            orientation_index: None,
            orientations: Vec::new(),
        }
    }

    #[test]
    fn matrix_rows_follow_observation_order_with_zero_fill() {
        let results = vec![
            vec![group(&[1.0, 2.0]), group(&[3.0])],
            Vec::new(),
            vec![group(&[4.0, 5.0]), group(&[6.0])],
        ];
        let m = descriptor_matrix(&results);
        assert_eq!((m.rows(), m.cols()), (3, 3));
        assert_eq!(m.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(m.row(1), &[0.0, 0.0, 0.0]);
        assert_eq!(m.row(2), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn model_and_predict_matrices_split_by_flags() {
        let ctx = ScreenContext::new(
            vec![],
            vec![
                observation(Some(1.0), false),
                observation(Some(2.0), true),
                observation(None, false),
            ],
            vec![Molecule::default(); 3],
        )
        .unwrap();
        let results = vec![
            vec![group(&[1.0])],
            vec![group(&[2.0])],
            Vec::new(),
        ];

        let model = model_descriptor_matrix(&ctx, &results);
        assert_eq!((model.rows(), model.cols()), (1, 1));
        assert_eq!(model.get(0, 0), 1.0);

        let predict = predict_descriptor_matrix(&ctx, &results);
        assert_eq!((predict.rows(), predict.cols()), (1, 1));
        assert_eq!(predict.get(0, 0), 2.0);
    }

    #[test]
    fn names_come_from_the_first_computed_observation() {
        let results = vec![Vec::new(), vec![group(&[1.0, 2.0])]];
        assert_eq!(descriptor_names(&results), vec!["d", "d"]);
        assert!(descriptor_names(&[Vec::new()]).is_empty());
    }
}
