//! Penalized generalized linear models.
//!
//! The models are fitted by iteratively reweighted least squares: at every outer iteration
//! the loss is replaced by its second order expansion around the current latent predictor,
//! and the resulting weighted least squares problem is solved by cyclic coordinate descent
//! with soft-thresholding for the L1 penalty. The objective is
//! `1/n sum_i loss(y_i, b0 + x_i.beta) + lambda |beta|_1`, the intercept is not penalized.

use crate::{
    dot, mean_std, soft_threshold, ColumnMajorMatrix, ConvergencePolicy, FitError, FitResult,
    GlmParams, Loss,
};
use ordered_float::OrderedFloat;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Floor of the hessian, so the working response stays finite on (nearly) separable data.
static MIN_HESSIAN: f64 = 1e-6;

/// Below this standard deviation (relative to the mean) a column is considered constant.
static CONSTANT_COLUMN_TOL: f64 = 1e-10;

/// Intercept and coefficients of a linear predictor, in the scale of the raw features.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn latent(&self, x: &[f64]) -> f64 {
        self.intercept + dot(&self.coefficients, x)
    }

    pub fn latent_matrix(&self, x: &ColumnMajorMatrix<f64>) -> Vec<f64> {
        assert_eq!(x.n_cols(), self.coefficients.len());
        let mut latent = vec![self.intercept; x.n_rows()];
        for (column, &coef) in x.columns().zip(&self.coefficients) {
            if coef == 0. {
                continue;
            }
            for (l, &v) in latent.iter_mut().zip(column) {
                *l += coef * v;
            }
        }
        latent
    }

    /// Predictions in the response scale of the loss.
    pub fn predict(&self, loss: &impl Loss, x: &ColumnMajorMatrix<f64>) -> Vec<f64> {
        self.latent_matrix(x)
            .into_iter()
            .map(|l| loss.inverse_link(l))
            .collect()
    }

    /// Number of features actually used by the model.
    pub fn n_nonzero(&self) -> usize {
        self.coefficients.iter().filter(|&&c| c != 0.).count()
    }
}

/// Result of a single fit.
#[derive(Debug, Clone)]
pub struct GlmFit {
    pub model: LinearModel,
    pub converged: bool,
    pub n_iter: usize,
}

/// Result of a fit where the regularization was chosen by cross-validation.
#[derive(Debug, Clone)]
pub struct CvFit {
    pub model: LinearModel,
    pub lambda: f64,
    pub converged: bool,
}

/// Columns centered and scaled to unit variance. Constant columns are replaced by zeros.
struct StandardizedColumns {
    columns: Vec<Vec<f64>>,
    means: Vec<f64>,
    // 0 for the constant columns
    scales: Vec<f64>,
}

impl StandardizedColumns {
    fn new(x: &ColumnMajorMatrix<f64>) -> Self {
        let mut columns = Vec::with_capacity(x.n_cols());
        let mut means = Vec::with_capacity(x.n_cols());
        let mut scales = Vec::with_capacity(x.n_cols());
        for column in x.columns() {
            let (m, s) = mean_std(column);
            if s > CONSTANT_COLUMN_TOL * m.abs().max(1.) {
                columns.push(column.iter().map(|&v| (v - m) / s).collect());
                scales.push(s);
            } else {
                columns.push(vec![0.; column.len()]);
                scales.push(0.);
            }
            means.push(m);
        }
        StandardizedColumns {
            columns,
            means,
            scales,
        }
    }

    /// Express a model fitted on the standardized columns in the raw scale.
    fn to_raw(&self, intercept: f64, beta: &[f64]) -> LinearModel {
        let coefficients: Vec<f64> = beta
            .iter()
            .zip(&self.scales)
            .map(|(&b, &s)| if s > 0. { b / s } else { 0. })
            .collect();
        let intercept = intercept - dot(&coefficients, &self.means);
        LinearModel {
            intercept,
            coefficients,
        }
    }
}

/// Fit a GLM with an L1 penalty of strength `lambda`. `lambda = 0` gives the unpenalized fit.
pub fn fit_glm(
    loss: &impl Loss,
    x: &ColumnMajorMatrix<f64>,
    target: &[f64],
    lambda: f64,
    params: &GlmParams,
) -> FitResult<GlmFit> {
    if x.n_rows() != target.len() {
        return Err(FitError::ShapeMismatch {
            n_rows: x.n_rows(),
            n_targets: target.len(),
        });
    }
    if target.is_empty() {
        return Err(FitError::EmptyDataset);
    }
    let n_rows = target.len();
    let n_cols = x.n_cols();
    let standardized = StandardizedColumns::new(x);
    let columns = &standardized.columns;

    let mut intercept = 0.;
    let mut beta = vec![0.; n_cols];
    let mut latent = vec![0.; n_rows];
    let mut converged = false;
    let mut n_iter = 0;

    for iter in 0..params.max_iter {
        n_iter = iter + 1;
        let (grad, hessian) = loss.calc_gradient_hessian(target, &latent);

        // Quadratic approximation: weights h/n, working residual -g/h
        let weights: Vec<f64> = hessian
            .iter()
            .map(|&h| h.max(MIN_HESSIAN) / n_rows as f64)
            .collect();
        let mut residual: Vec<f64> = grad
            .iter()
            .zip(&hessian)
            .map(|(&g, &h)| -g / h.max(MIN_HESSIAN))
            .collect();
        let sum_weights: f64 = weights.iter().sum();
        let weighted_norms: Vec<f64> = columns
            .iter()
            .map(|column| {
                column
                    .iter()
                    .zip(&weights)
                    .map(|(&v, &w)| w * v * v)
                    .sum()
            })
            .collect();

        let old_intercept = intercept;
        let old_beta = beta.clone();

        for _ in 0..params.max_inner_iter {
            let delta = dot(&weights, &residual) / sum_weights;
            intercept += delta;
            for r in residual.iter_mut() {
                *r -= delta;
            }
            let mut max_delta = delta.abs();

            for (j, column) in columns.iter().enumerate() {
                let norm = weighted_norms[j];
                if norm <= 0. {
                    continue;
                }
                let rho: f64 = column
                    .iter()
                    .zip(&weights)
                    .zip(&residual)
                    .map(|((&v, &w), &r)| w * v * r)
                    .sum::<f64>()
                    + norm * beta[j];
                let new_beta = soft_threshold(rho, lambda) / norm;
                let delta = new_beta - beta[j];
                if delta != 0. {
                    for (r, &v) in residual.iter_mut().zip(column) {
                        *r -= delta * v;
                    }
                    beta[j] = new_beta;
                    max_delta = max_delta.max(delta.abs());
                }
            }
            if max_delta < params.tol {
                break;
            }
        }

        for (i, l) in latent.iter_mut().enumerate() {
            *l = intercept;
            for (column, &b) in columns.iter().zip(&beta) {
                *l += b * column[i];
            }
        }

        let change = beta
            .iter()
            .zip(&old_beta)
            .map(|(a, b)| (a - b).abs())
            .fold((intercept - old_intercept).abs(), f64::max);
        if change < params.tol {
            converged = true;
            break;
        }
    }

    if !converged {
        match params.convergence {
            ConvergencePolicy::AcceptBestEffort => {
                debug!(
                    "GLM did not converge after {} iterations on {} rows (lambda={}), keeping the last iterate",
                    n_iter, n_rows, lambda
                );
            }
            ConvergencePolicy::Fail => return Err(FitError::NotConverged { n_iter }),
        }
    }

    Ok(GlmFit {
        model: standardized.to_raw(intercept, &beta),
        converged,
        n_iter,
    })
}

/// Assign every row to a fold. The assignment only depends on the seed and, when
/// `stratify` is set, on the labels, so that every fold keeps the proportion of each class.
pub(crate) fn assign_folds(target: &[f64], n_folds: usize, seed: u64, stratify: bool) -> Vec<usize> {
    let mut order: Vec<usize> = (0..target.len()).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    order.shuffle(&mut rng);
    if stratify {
        // Stable sort: the rows of a label stay shuffled
        order.sort_by_key(|&i| OrderedFloat(target[i]));
    }
    let mut folds = vec![0; target.len()];
    for (pos, &i) in order.iter().enumerate() {
        folds[i] = pos % n_folds;
    }
    folds
}

/// Choose the L1 strength among `lambdas` by k-fold cross-validation, then refit on all the
/// rows. With a single candidate there is nothing to choose and the cross-validation is skipped.
pub fn fit_glm_cv(
    loss: &impl Loss,
    x: &ColumnMajorMatrix<f64>,
    target: &[f64],
    lambdas: &[f64],
    params: &GlmParams,
    seed: u64,
) -> FitResult<CvFit> {
    assert!(!lambdas.is_empty(), "no regularization to try");
    let n_rows = target.len();
    let n_folds = params.n_folds.min(n_rows);

    let lambda = if lambdas.len() == 1 || n_folds < 2 {
        lambdas[0]
    } else {
        let folds = assign_folds(target, n_folds, seed, loss.is_classification());
        let splits: Vec<(Vec<usize>, Vec<usize>)> = (0..n_folds)
            .map(|fold| {
                (0..n_rows).partition::<Vec<usize>, _>(|&i| folds[i] != fold)
            })
            .filter(|(train, test)| !train.is_empty() && !test.is_empty())
            .collect();

        let mut best: Option<(f64, f64)> = None;
        for &lambda in lambdas {
            let mut total_loss = 0.;
            let mut n_scored = 0;
            for (train, test) in &splits {
                let y_train: Vec<f64> = train.iter().map(|&i| target[i]).collect();
                let y_test: Vec<f64> = test.iter().map(|&i| target[i]).collect();
                let fit = fit_glm(loss, &x.select_rows(train), &y_train, lambda, params)?;
                let predictions = fit.model.predict(loss, &x.select_rows(test));
                total_loss += loss.calc_loss(&y_test, &predictions) * test.len() as f64;
                n_scored += test.len();
            }
            let score = total_loss / n_scored.max(1) as f64;
            trace!("cross-validation lambda={} score={}", lambda, score);
            // Strict comparison: on ties the first candidate wins
            if best.map_or(true, |(_, best_score)| score < best_score) {
                best = Some((lambda, score));
            }
        }
        best.map_or(lambdas[0], |(lambda, _)| lambda)
    };

    let fit = fit_glm(loss, x, target, lambda, params)?;
    Ok(CvFit {
        model: fit.model,
        lambda,
        converged: fit.converged,
    })
}
