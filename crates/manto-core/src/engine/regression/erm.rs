//! Enhanced Replacement Method (ERM) after Mercader et al.: a greedy
//! descriptor-subset search that repeatedly swaps the selected column at one
//! position for the best alternative, picking the next target position from
//! the relative standard errors of the fitted coefficients, until the
//! produced index vectors recur.

use super::{ModelError, RowRole};
use crate::core::math::array;
use crate::core::math::matrix::Matrix;
use rand::Rng;
use tracing::{debug, info, warn};

pub const DEFAULT_MODEL_SIZE: usize = 7;

/// Condition estimates below this treat the normal-equation matrix as
/// effectively singular.
const RCOND_LIMIT: f64 = 1e-25;
/// Error reported for a degenerate candidate in the forward search; large
/// enough that the candidate is never kept.
const SWEEP_SENTINEL_FORWARD: f64 = 1e8;
/// Stand-in fit error when the residual degenerates during coefficient
/// ranking.
const FIT_SENTINEL_FORWARD: f64 = 1e6;
/// Inverse-search counterpart: small enough that the candidate is never kept
/// when maximizing.
const SENTINEL_INVERSE: f64 = 1e-26;
/// Relative coefficient errors start primed high so degenerate fits rank
/// every position as replaceable.
const COEFF_PRIME: f64 = 10_000.0;
const COEFF_NAN: f64 = 9.9;
/// Columns whose absolute values never exceed this are excluded from the
/// search.
const EMPTY_COLUMN_TOLERANCE: f64 = 1e-8;
const MAX_REFINEMENT_SWEEPS: usize = 100;
const MAX_SEED_RESAMPLES: usize = 1000;
/// Selections are only kept when they beat this; a run that never produces a
/// sub-sentinel error leaves the model unfit.
const INITIAL_BEST_ERROR: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
struct Record {
    error: f64,
    indices: Vec<usize>,
}

/// One ERM regression over a fixed row partition. Immutable once fit.
#[derive(Debug, Clone)]
pub struct ReplacementModel {
    matrix: Matrix,
    property: Vec<f64>,
    partition: Vec<RowRole>,
    model_size: usize,
    excluded: Vec<bool>,
    selected: Option<Vec<usize>>,
    best_error: f64,
}

impl ReplacementModel {
    pub fn new(
        matrix: Matrix,
        property: Vec<f64>,
        partition: Vec<RowRole>,
    ) -> Result<Self, ModelError> {
        if partition.len() != matrix.rows() {
            return Err(ModelError::PartitionMismatch {
                partition: partition.len(),
                rows: matrix.rows(),
            });
        }
        if property.len() != matrix.rows() {
            return Err(ModelError::PropertyMismatch {
                property: property.len(),
                rows: matrix.rows(),
            });
        }
        Ok(Self {
            matrix,
            property,
            partition,
            model_size: DEFAULT_MODEL_SIZE,
            excluded: Vec::new(),
            selected: None,
            best_error: INITIAL_BEST_ERROR,
        })
    }

    pub fn set_model_size(&mut self, size: usize) {
        self.model_size = size;
    }

    pub fn model_size(&self) -> usize {
        self.model_size
    }

    pub fn partition(&self) -> &[RowRole] {
        &self.partition
    }

    pub fn selected(&self) -> Option<&[usize]> {
        self.selected.as_deref()
    }

    /// The unbiased residual standard error of the retained selection.
    pub fn residual_standard_error(&self) -> Option<f64> {
        self.selected.as_ref().map(|_| self.best_error)
    }

    fn rows_with(&self, role: RowRole) -> Vec<usize> {
        self.partition
            .iter()
            .enumerate()
            .filter(|(_, r)| **r == role)
            .map(|(i, _)| i)
            .collect()
    }

    fn submatrix(&self, role: RowRole) -> Matrix {
        let rows: Vec<Vec<f64>> = self
            .rows_with(role)
            .into_iter()
            .map(|i| self.matrix.row(i).to_vec())
            .collect();
        if rows.is_empty() {
            Matrix::zeros(0, self.matrix.cols())
        } else {
            Matrix::from_rows(&rows)
        }
    }

    fn subproperty(&self, role: RowRole) -> Vec<f64> {
        self.rows_with(role)
            .into_iter()
            .map(|i| self.property[i])
            .collect()
    }

    pub fn train_matrix(&self) -> Matrix {
        self.submatrix(RowRole::Train)
    }

    pub fn train_property(&self) -> Vec<f64> {
        self.subproperty(RowRole::Train)
    }

    pub fn holdout_matrix(&self) -> Matrix {
        self.submatrix(RowRole::Holdout)
    }

    pub fn holdout_property(&self) -> Vec<f64> {
        self.subproperty(RowRole::Holdout)
    }

    /// Fits the model: random seed, then the full replacement search.
    pub fn fit(&mut self) -> Result<(), ModelError> {
        self.fit_with_rng(&mut rand::thread_rng())
    }

    pub fn fit_with_rng(&mut self, rng: &mut impl Rng) -> Result<(), ModelError> {
        self.prepare()?;
        let seed = self.random_seed(rng);
        self.erm(seed);
        Ok(())
    }

    /// Fits via the inverse entry point: a deterministic seed walking the
    /// usable columns in order, escaped through the error-maximizing search
    /// when the seed is rank deficient, then the regular replacement search.
    pub fn fit_inverse(&mut self, rng: &mut impl Rng) -> Result<(), ModelError> {
        self.prepare()?;
        let mut seed: Vec<usize> = (0..self.matrix.cols())
            .filter(|c| !self.excluded[*c])
            .take(self.model_size)
            .collect();

        if self.rank_deficient(&seed) {
            debug!("seed selection is rank deficient, resampling");
            for _ in 0..MAX_SEED_RESAMPLES {
                seed = self.random_seed(rng);
                if !self.rank_deficient(&seed) {
                    break;
                }
            }
        }

        let escaped = self.rmt_inverse(seed);
        self.erm(escaped);
        Ok(())
    }

    fn prepare(&mut self) -> Result<(), ModelError> {
        self.excluded = excluded_columns(&self.train_matrix());
        let available = self.excluded.iter().filter(|e| !**e).count();
        if available < self.model_size {
            return Err(ModelError::TooFewDescriptors {
                available,
                requested: self.model_size,
            });
        }
        Ok(())
    }

    fn random_seed(&self, rng: &mut impl Rng) -> Vec<usize> {
        let mut seed = Vec::with_capacity(self.model_size);
        while seed.len() < self.model_size {
            let candidate = rng.gen_range(0..self.matrix.cols());
            if !self.excluded[candidate] && !seed.contains(&candidate) {
                seed.push(candidate);
            }
        }
        seed
    }

    fn rank_deficient(&self, indices: &[usize]) -> bool {
        let Ok(x) = self.train_matrix().columns(indices) else {
            return true;
        };
        design(&x).rank() < indices.len() + 1
    }

    /// The replacement search proper. Every evaluated index vector is
    /// recorded; the lowest-error vector seen across the whole run becomes
    /// the selection.
    fn erm(&mut self, seed: Vec<usize>) {
        let k = seed.len();
        if k == 0 {
            return;
        }
        info!(start = ?seed, "starting replacement search");

        let mut working = seed;

        for start in 0..k {
            let mut history = vec![Record {
                error: self.residual_error(&working, false),
                indices: working.clone(),
            }];
            let mut visited = vec![start];

            let error = self.replace_at(&mut working, start, false);
            history.push(Record {
                error,
                indices: working.clone(),
            });

            if k == 1 {
                // A single position has nothing to rank; keep the best of
                // the two records.
                self.update_best(&history);
                continue;
            }

            let mut current = working.clone();
            let mut coeff = self.coefficient_errors(&current, false);
            let mut pos = position_of_extreme(&coeff, &visited, true);
            visited.push(pos);

            // First full pass over the remaining positions.
            for step in 2..k {
                let error = self.replace_at(&mut current, pos, false);
                history.push(Record {
                    error,
                    indices: current.clone(),
                });
                if step + 1 == k {
                    visited.clear();
                    break;
                }
                coeff = self.coefficient_errors(&current, false);
                pos = position_of_extreme(&coeff, &visited, true);
                visited.push(pos);
            }

            // Ranked replacement sweeps until the index vectors recur.
            for sweep in 1..MAX_REFINEMENT_SWEEPS {
                pos = position_of_extreme(&coeff, &visited, true);
                set_first(&mut visited, pos);

                for step in 1..=k {
                    let error = self.replace_at(&mut current, pos, false);
                    history.push(Record {
                        error,
                        indices: current.clone(),
                    });
                    if step == k {
                        visited.clear();
                        break;
                    }
                    coeff = self.coefficient_errors(&current, false);
                    pos = position_of_extreme(&coeff, &visited, true);
                    visited.push(pos);
                }

                if sweep > 3 && recurred(&history, 2 * k) {
                    debug!("primary replacement loop converged");
                    break;
                }
            }

            // Forced-replacement sweeps: the occupant always changes, which
            // shakes the search out of shallow minima.
            for _ in 0..MAX_REFINEMENT_SWEEPS {
                pos = position_of_extreme(&coeff, &visited, true);
                set_first(&mut visited, pos);

                for step in 0..k {
                    let error = self.forced_replace_at(&mut current, pos);
                    history.push(Record {
                        error,
                        indices: current.clone(),
                    });
                    if step + 1 == k {
                        visited.clear();
                    }
                    coeff = self.coefficient_errors(&current, false);
                    pos = position_of_extreme(&coeff, &visited, true);
                    visited.push(pos);
                }

                if recurred(&history, 4 * k) {
                    debug!("forced replacement loop converged");
                    break;
                }
            }

            // Final ranked sweeps restart from the best vector seen so far.
            if let Some(best) = min_record(&history) {
                current = best.indices.clone();
            }
            for _ in 0..MAX_REFINEMENT_SWEEPS {
                pos = position_of_extreme(&coeff, &visited, true);
                set_first(&mut visited, pos);

                for step in 0..k {
                    let error = self.replace_at(&mut current, pos, false);
                    history.push(Record {
                        error,
                        indices: current.clone(),
                    });
                    if step + 1 == k {
                        visited.clear();
                    }
                    coeff = self.coefficient_errors(&current, false);
                    pos = position_of_extreme(&coeff, &visited, true);
                    visited.push(pos);
                }

                if recurred(&history, 2 * k) {
                    debug!("final replacement loop converged");
                    break;
                }
            }

            self.update_best(&history);
        }
        info!(selected = ?self.selected, "replacement search finished");
    }

    /// The error-maximizing companion search, used only to escape
    /// rank-deficient seed selections. Returns the maximal-error vector
    /// encountered.
    fn rmt_inverse(&self, seed: Vec<usize>) -> Vec<usize> {
        let k = seed.len();
        if k == 0 {
            return seed;
        }
        info!(start = ?seed, "starting inverse replacement search");

        let mut working = seed.clone();
        let mut best: Option<Record> = None;

        for start in 0..k {
            let mut history = vec![Record {
                error: self.residual_error(&working, false),
                indices: working.clone(),
            }];
            let mut visited = vec![start];

            let error = self.replace_at(&mut working, start, true);
            history.push(Record {
                error,
                indices: working.clone(),
            });

            if k > 1 {
                let mut current = working.clone();
                let mut coeff = self.coefficient_errors(&current, true);
                let mut pos = position_of_extreme(&coeff, &visited, false);
                visited.push(pos);

                for step in 2..k {
                    let error = self.replace_at(&mut current, pos, true);
                    history.push(Record {
                        error,
                        indices: current.clone(),
                    });
                    if step + 1 == k {
                        visited.clear();
                        break;
                    }
                    coeff = self.coefficient_errors(&current, true);
                    pos = position_of_extreme(&coeff, &visited, false);
                    visited.push(pos);
                }

                for sweep in 1..MAX_REFINEMENT_SWEEPS {
                    pos = position_of_extreme(&coeff, &visited, false);
                    set_first(&mut visited, pos);

                    for step in 1..=k {
                        let error = self.replace_at(&mut current, pos, true);
                        history.push(Record {
                            error,
                            indices: current.clone(),
                        });
                        if step == k {
                            visited.clear();
                            break;
                        }
                        coeff = self.coefficient_errors(&current, true);
                        pos = position_of_extreme(&coeff, &visited, false);
                        visited.push(pos);
                    }

                    if sweep > 3 && recurred(&history, 2 * k) {
                        debug!("inverse replacement loop converged");
                        break;
                    }
                }
            }

            if let Some(max) = history.iter().max_by(|a, b| {
                a.error
                    .partial_cmp(&b.error)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }) {
                let replace = best.as_ref().is_none_or(|b| max.error > b.error);
                if replace {
                    best = Some(max.clone());
                }
            }
        }

        best.map(|r| r.indices).unwrap_or(working)
    }

    fn update_best(&mut self, history: &[Record]) {
        let Some(best) = min_record(history) else {
            return;
        };
        if best.error < self.best_error {
            self.best_error = best.error;
            self.selected = Some(best.indices.clone());
        }
    }

    /// Tries every usable column not currently selected at `position`, keeps
    /// the one with minimal (maximal, for the inverse search) residual error,
    /// and returns that error. The previous occupant always leaves.
    fn replace_at(&self, indices: &mut [usize], position: usize, inverse: bool) -> f64 {
        self.replace_impl(indices, position, inverse, true)
    }

    /// As [`Self::replace_at`] but ignoring the excluded-column flags.
    fn forced_replace_at(&self, indices: &mut [usize], position: usize) -> f64 {
        self.replace_impl(indices, position, false, false)
    }

    fn replace_impl(
        &self,
        indices: &mut [usize],
        position: usize,
        inverse: bool,
        respect_excluded: bool,
    ) -> f64 {
        let occupied: Vec<usize> = indices.to_vec();
        let mut best: Option<(f64, usize)> = None;

        for candidate in 0..self.matrix.cols() {
            if occupied.contains(&candidate) {
                continue;
            }
            if respect_excluded && self.excluded.get(candidate).copied().unwrap_or(false) {
                continue;
            }
            indices[position] = candidate;
            let error = self.residual_error(indices, inverse);
            let better = match best {
                None => true,
                Some((e, _)) => {
                    if inverse {
                        error > e
                    } else {
                        error < e
                    }
                }
            };
            if better {
                best = Some((error, candidate));
            }
        }

        match best {
            Some((error, candidate)) => {
                indices[position] = candidate;
                error
            }
            None => {
                indices[position] = occupied[position];
                self.residual_error(indices, inverse)
            }
        }
    }

    /// Ordinary-least-squares residual standard error
    /// `sqrt(RSS / (n - k - 1))` over the training rows for the given column
    /// selection. Degenerate systems report the sentinel for the running
    /// search direction.
    fn residual_error(&self, indices: &[usize], inverse: bool) -> f64 {
        let y = self.train_property();
        let n = y.len();
        let k = indices.len();

        let Ok(x) = self.train_matrix().columns(indices) else {
            return sweep_sentinel(inverse);
        };
        let xx = design(&x);
        let xxt = xx.transpose();
        let Ok(xtx) = xxt.mul(&xx) else {
            return sweep_sentinel(inverse);
        };
        let Ok(inv) = xtx.invert() else {
            return sweep_sentinel(inverse);
        };

        let rcond = 1.0 / (inv.norm1() * xtx.norm1());
        if rcond < RCOND_LIMIT || rcond.is_nan() {
            return sweep_sentinel(inverse);
        }

        let p = Matrix::column_vector(&y);
        let Ok(coefficients) = inv.mul(&xxt).and_then(|a| a.mul(&p)) else {
            return sweep_sentinel(inverse);
        };
        let Ok(fitted) = xx.mul(&coefficients) else {
            return sweep_sentinel(inverse);
        };

        let rss: f64 = (0..n)
            .map(|i| {
                let r = y[i] - fitted.get(i, 0);
                r * r
            })
            .sum();
        let error = (rss / (n as f64 - k as f64 - 1.0)).sqrt();

        if error.is_nan() || error.is_infinite() {
            sweep_sentinel(inverse)
        } else {
            error
        }
    }

    /// Relative standard errors of the fitted coefficients in percent,
    /// intercept excluded: `sqrt(covariance diagonal) / |coefficient| * 100`.
    /// Degenerate fits return the primed vector, ranking every position as
    /// replaceable.
    fn coefficient_errors(&self, indices: &[usize], inverse: bool) -> Vec<f64> {
        let k = indices.len();
        let mut coeff = vec![COEFF_PRIME; k];

        let y = self.train_property();
        let n = y.len();

        let Ok(x) = self.train_matrix().columns(indices) else {
            return coeff;
        };
        let xx = design(&x);
        let xxt = xx.transpose();
        let Ok(xtx) = xxt.mul(&xx) else {
            return coeff;
        };
        let Ok(inv) = xtx.invert() else {
            return coeff;
        };

        let rcond = 1.0 / (inv.norm1() * xtx.norm1());
        if rcond < RCOND_LIMIT || rcond.is_nan() {
            return coeff;
        }

        let p = Matrix::column_vector(&y);
        let Ok(raw) = inv.mul(&xxt).and_then(|a| a.mul(&p)) else {
            return coeff;
        };

        // NaN coefficients are pinned to 1.0 before the residual pass.
        let mut cleaned = raw.clone();
        for i in 0..cleaned.rows() {
            if cleaned.get(i, 0).is_nan() {
                cleaned.set(i, 0, 1.0);
            }
        }

        let Ok(fitted) = xx.mul(&cleaned) else {
            return coeff;
        };
        let rss: f64 = (0..n)
            .map(|i| {
                let r = y[i] - fitted.get(i, 0);
                r * r
            })
            .sum();
        let mut s_err = (rss / (n as f64 - k as f64 - 1.0)).sqrt();
        if s_err.is_nan() || s_err.is_infinite() {
            s_err = if inverse {
                SENTINEL_INVERSE
            } else {
                FIT_SENTINEL_FORWARD
            };
        }

        let covariance = inv.scale(s_err * s_err);
        let diagonal = covariance.diagonal();
        for i in 0..k {
            let err = (diagonal[i + 1].sqrt() / cleaned.get(i + 1, 0)).abs() * 100.0;
            coeff[i] = if err.is_nan() { COEFF_NAN } else { err };
        }
        coeff
    }

    /// Greedy forward selection up to `max_descriptors`, returning the best
    /// error and index vector at each size.
    pub fn stepwise(&self, max_descriptors: usize) -> Vec<(f64, Vec<usize>)> {
        let mut results = Vec::with_capacity(max_descriptors);
        let mut selected: Vec<usize> = Vec::new();

        for _ in 0..max_descriptors {
            let mut best: Option<(f64, Vec<usize>)> = None;
            for candidate in 0..self.matrix.cols() {
                let mut trial = selected.clone();
                trial.push(candidate);
                let error = self.residual_error(&trial, false);
                let better = best.as_ref().is_none_or(|(e, _)| error < *e);
                if better {
                    best = Some((error, trial));
                }
            }
            let Some((error, indices)) = best else {
                break;
            };
            selected = indices.clone();
            results.push((error, indices));
        }
        results
    }

    fn fitted_coefficients(&self) -> Option<Matrix> {
        let selected = self.selected.as_ref()?;
        let x = self.train_matrix().columns(selected).ok()?;
        let xx = design(&x);
        let xxt = xx.transpose();
        let xtx = xxt.mul(&xx).ok()?;
        let inv = xtx.invert().ok()?;
        let p = Matrix::column_vector(&self.train_property());
        inv.mul(&xxt).ok()?.mul(&p).ok()
    }

    /// Fitted OLS coefficients, intercept first, in selection order.
    /// `None` before a successful fit.
    pub fn coefficients(&self) -> Option<Vec<f64>> {
        let coef = self.fitted_coefficients()?;
        Some((0..coef.rows()).map(|i| coef.get(i, 0)).collect())
    }

    /// Predicted responses for the rows of `matrix` (full column layout).
    /// `None` before a successful fit.
    pub fn predict(&self, matrix: &Matrix) -> Option<Vec<f64>> {
        let selected = self.selected.as_ref()?;
        let coefficients = self.fitted_coefficients()?;
        let x = matrix.columns(selected).ok()?;
        let xx = design(&x);
        let response = xx.mul(&coefficients).ok()?;
        Some((0..response.rows()).map(|i| response.get(i, 0)).collect())
    }

    /// `1 - RSS/TSS` of the fitted responses against the training rows.
    pub fn model_r_square(&self) -> Option<f64> {
        let y = self.train_property();
        let fitted = self.predict(&self.train_matrix())?;
        r_square(&y, &fitted, array::mean(&y))
    }

    /// `1 - RSS/TSS` of the predictions against the held-out rows, with the
    /// total sum of squares referenced to the training mean. `None` when the
    /// partition holds nothing out.
    pub fn predictive_r_square(&self) -> Option<f64> {
        let holdout = self.holdout_matrix();
        if holdout.rows() == 0 {
            return None;
        }
        let y = self.holdout_property();
        let predicted = self.predict(&holdout)?;
        r_square(&y, &predicted, array::mean(&self.train_property()))
    }
}

/// Prepends the intercept column of ones.
fn design(x: &Matrix) -> Matrix {
    let mut xx = Matrix::zeros(x.rows(), x.cols() + 1);
    for i in 0..x.rows() {
        xx.set(i, 0, 1.0);
        for j in 0..x.cols() {
            xx.set(i, j + 1, x.get(i, j));
        }
    }
    xx
}

/// Flags the columns whose values never leave the dead zone; those never
/// enter a selection.
fn excluded_columns(matrix: &Matrix) -> Vec<bool> {
    (0..matrix.cols())
        .map(|j| {
            !(0..matrix.rows()).any(|i| matrix.get(i, j).abs() > EMPTY_COLUMN_TOLERANCE)
        })
        .collect()
}

fn sweep_sentinel(inverse: bool) -> f64 {
    if inverse {
        SENTINEL_INVERSE
    } else {
        SWEEP_SENTINEL_FORWARD
    }
}

/// First position with the extreme value among those not yet visited.
fn position_of_extreme(coeff: &[f64], visited: &[usize], maximize: bool) -> usize {
    let mut best: Option<(f64, usize)> = None;
    for (i, value) in coeff.iter().enumerate() {
        if visited.contains(&i) {
            continue;
        }
        let better = match best {
            None => true,
            Some((b, _)) => {
                if maximize {
                    *value > b
                } else {
                    *value < b
                }
            }
        };
        if better {
            best = Some((*value, i));
        }
    }
    match best {
        Some((_, i)) => i,
        None => {
            warn!("no unvisited position available, defaulting to 0");
            0
        }
    }
}

fn set_first(visited: &mut Vec<usize>, pos: usize) {
    if visited.is_empty() {
        visited.push(pos);
    } else {
        visited[0] = pos;
    }
}

/// True when the newest record equals the one `spacing` entries back: the
/// search has entered a cycle of that period.
fn recurred(history: &[Record], spacing: usize) -> bool {
    if history.len() <= spacing + 1 {
        return false;
    }
    history[history.len() - 1] == history[history.len() - spacing]
}

fn min_record(history: &[Record]) -> Option<&Record> {
    history.iter().min_by(|a, b| {
        a.error
            .partial_cmp(&b.error)
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

fn r_square(actual: &[f64], predicted: &[f64], reference_mean: f64) -> Option<f64> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// 12 rows, 8 columns. The response is an exact linear combination of
    /// columns 2 and 5 plus an intercept; the remaining columns are small
    /// independent wiggles that cannot reproduce the generating terms.
    fn exact_pair_model() -> ReplacementModel {
        let rows: Vec<Vec<f64>> = (0..12)
            .map(|i| {
                let t = i as f64;
                (0..8)
                    .map(|j| match j {
                        2 => (t * 1.7).sin() * 5.0 + t,
                        5 => (t * 0.9).cos() * 3.0 - t * 0.5,
                        _ => (t * 0.31 + j as f64 * 1.37).sin() * 0.5,
                    })
                    .collect()
            })
            .collect();
        let matrix = Matrix::from_rows(&rows);
        let property: Vec<f64> = (0..12)
            .map(|i| 3.0 * matrix.get(i, 2) - 2.0 * matrix.get(i, 5) + 7.0)
            .collect();
        let partition = vec![RowRole::Train; 12];
        let mut model = ReplacementModel::new(matrix, property, partition).unwrap();
        model.set_model_size(2);
        model
    }

    #[test]
    fn recovers_the_generating_columns_exactly() {
        let mut model = exact_pair_model();
        model.fit_with_rng(&mut StdRng::seed_from_u64(11)).unwrap();

        let mut selected = model.selected().unwrap().to_vec();
        selected.sort_unstable();
        assert_eq!(selected, vec![2, 5]);

        let coefficients = model.coefficients().unwrap();
        assert_relative_eq!(coefficients[0], 7.0, epsilon = 1e-6);
        for (slot, column) in model.selected().unwrap().iter().enumerate() {
            let expected = if *column == 2 { 3.0 } else { -2.0 };
            assert_relative_eq!(coefficients[slot + 1], expected, epsilon = 1e-6);
        }

        assert_relative_eq!(model.model_r_square().unwrap(), 1.0, epsilon = 1e-9);
        assert!(model.residual_standard_error().unwrap() < 1e-6);
    }

    #[test]
    fn inverse_entry_point_reaches_the_same_selection() {
        let mut model = exact_pair_model();
        model.fit_inverse(&mut StdRng::seed_from_u64(3)).unwrap();
        let mut selected = model.selected().unwrap().to_vec();
        selected.sort_unstable();
        assert_eq!(selected, vec![2, 5]);
    }

    #[test]
    fn predict_before_fit_returns_no_result() {
        let model = exact_pair_model();
        assert!(model.predict(&model.train_matrix()).is_none());
        assert!(model.coefficients().is_none());
        assert!(model.model_r_square().is_none());
    }

    fn single_column_model(partition: Vec<RowRole>) -> ReplacementModel {
        let rows: Vec<Vec<f64>> = (0..16)
            .map(|i| vec![1.0, i as f64 + (i as f64 * 0.7).sin(), 1.0])
            .collect();
        let matrix = Matrix::from_rows(&rows);
        let property: Vec<f64> = (0..16).map(|i| 2.0 * matrix.get(i, 1) + 1.0).collect();
        let mut model = ReplacementModel::new(matrix, property, partition).unwrap();
        model.set_model_size(1);
        model
    }

    #[test]
    fn predictive_r_square_uses_the_holdout_rows() {
        let mut partition = vec![RowRole::Train; 16];
        for role in partition.iter_mut().skip(12) {
            *role = RowRole::Holdout;
        }
        let mut model = single_column_model(partition);
        model.fit_with_rng(&mut StdRng::seed_from_u64(5)).unwrap();

        assert_eq!(model.selected().unwrap(), &[1]);
        assert_relative_eq!(model.predictive_r_square().unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn predictive_r_square_is_no_data_without_holdout_rows() {
        let mut model = single_column_model(vec![RowRole::Train; 16]);
        model.fit_with_rng(&mut StdRng::seed_from_u64(5)).unwrap();
        assert!(model.selected().is_some());
        assert!(model.predictive_r_square().is_none());
    }

    #[test]
    fn excluded_rows_never_reach_the_fit() {
        let mut partition = vec![RowRole::Train; 16];
        partition[0] = RowRole::Excluded;
        partition[1] = RowRole::Excluded;
        let model = single_column_model(partition);
        assert_eq!(model.train_matrix().rows(), 14);
        assert_eq!(model.train_property().len(), 14);
        assert_eq!(model.holdout_matrix().rows(), 0);
    }

    #[test]
    fn all_zero_columns_are_excluded_from_seeding() {
        let rows: Vec<Vec<f64>> = (0..8)
            .map(|i| vec![0.0, i as f64, 1e-12])
            .collect();
        let matrix = Matrix::from_rows(&rows);
        let excluded = excluded_columns(&matrix);
        assert_eq!(excluded, vec![true, false, true]);
    }

    #[test]
    fn too_few_usable_columns_is_an_error() {
        let rows: Vec<Vec<f64>> = (0..8).map(|i| vec![0.0, i as f64, 0.0]).collect();
        let matrix = Matrix::from_rows(&rows);
        let property = vec![1.0; 8];
        let mut model =
            ReplacementModel::new(matrix, property, vec![RowRole::Train; 8]).unwrap();
        model.set_model_size(2);
        let result = model.fit_with_rng(&mut StdRng::seed_from_u64(1));
        assert!(matches!(
            result,
            Err(ModelError::TooFewDescriptors {
                available: 1,
                requested: 2
            })
        ));
    }

    #[test]
    fn partition_length_must_match_row_count() {
        let matrix = Matrix::zeros(4, 2);
        let result = ReplacementModel::new(matrix, vec![0.0; 4], vec![RowRole::Train; 3]);
        assert!(matches!(result, Err(ModelError::PartitionMismatch { .. })));
    }

    #[test]
    fn stepwise_grows_the_selection_one_column_at_a_time() {
        let model = exact_pair_model();
        let steps = model.stepwise(2);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].1.len(), 1);
        assert_eq!(steps[1].1.len(), 2);
        let mut last = steps[1].1.clone();
        last.sort_unstable();
        assert_eq!(last, vec![2, 5]);
        assert!(steps[1].0 < 1e-6);
    }
}
