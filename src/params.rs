use crate::{
    FitError, FitResult, DEFAULT_MAX_DEPTH, DEFAULT_MAX_INNER_ITER, DEFAULT_MAX_ITER,
    DEFAULT_MIN_IMPURITY_DECREASE, DEFAULT_MIN_SAMPLES_LEAF, DEFAULT_N_FEATURE_SEARCH,
    DEFAULT_N_FOLDS, DEFAULT_N_SCREEN_GRID, DEFAULT_N_SPLIT_GRID, DEFAULT_TOL,
};

/// What to do when the GLM solver reaches its iteration limit.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum ConvergencePolicy {
    /// Keep the last iterate. Small or nearly separable leaves often never converge, and the
    /// split is still judged on its impurity.
    AcceptBestEffort,
    /// Return `FitError::NotConverged`.
    Fail,
}

/// Parameters of the GLM solver used in the leaves.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GlmParams {
    /// Number of folds for the choice of the regularization strength
    pub n_folds: usize,
    /// Maximum number of IRLS iterations
    pub max_iter: usize,
    /// Maximum number of coordinate descent sweeps inside one IRLS iteration
    pub max_inner_iter: usize,
    /// Stop when no coefficient moves more than this
    pub tol: f64,
    pub convergence: ConvergencePolicy,
}

impl Default for GlmParams {
    fn default() -> Self {
        GlmParams {
            n_folds: DEFAULT_N_FOLDS,
            max_iter: DEFAULT_MAX_ITER,
            max_inner_iter: DEFAULT_MAX_INNER_ITER,
            tol: DEFAULT_TOL,
            convergence: ConvergencePolicy::AcceptBestEffort,
        }
    }
}

/// Parameters of a GLM tree.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// A split is kept only if it reduces the impurity by at least this amount
    pub min_impurity_decrease: f64,
    /// Only used for reporting
    pub feature_names: Option<Vec<String>>,
    /// Restrict the split candidates to these columns. All the columns if None.
    pub split_features: Option<Vec<usize>>,
    /// Number of thresholds per feature for the screening of the features
    pub n_screen_grid: usize,
    /// Number of features kept after the screening
    pub n_feature_search: usize,
    /// Number of thresholds per feature for the final search
    pub n_split_grid: usize,
    /// Candidate L1 strengths for the leaves, chosen by cross-validation
    pub reg_lambda: Vec<f64>,
    /// Clip the inputs of a leaf to the range seen during its training
    pub clip_predict: bool,
    /// Seed of the cross-validation folds
    pub random_state: u64,
    pub glm: GlmParams,
}

impl TreeParams {
    pub fn new() -> Self {
        TreeParams {
            max_depth: DEFAULT_MAX_DEPTH,
            min_samples_leaf: DEFAULT_MIN_SAMPLES_LEAF,
            min_impurity_decrease: DEFAULT_MIN_IMPURITY_DECREASE,
            feature_names: None,
            split_features: None,
            n_screen_grid: DEFAULT_N_SCREEN_GRID,
            n_feature_search: DEFAULT_N_FEATURE_SEARCH,
            n_split_grid: DEFAULT_N_SPLIT_GRID,
            reg_lambda: vec![0.],
            clip_predict: true,
            random_state: 0,
            glm: GlmParams::default(),
        }
    }

    /// Check the parameters against a dataset with `n_features` columns.
    pub fn validate(&self, n_features: usize) -> FitResult<()> {
        macro_rules! ensure {
            ($cond: expr, $($arg: tt)+) => {
                if !$cond {
                    return Err(FitError::InvalidParams(format!($($arg)+)));
                }
            };
        }

        ensure!(self.min_samples_leaf >= 1, "min_samples_leaf must be at least 1");
        ensure!(
            self.min_impurity_decrease >= 0.,
            "min_impurity_decrease must be positive, got {}",
            self.min_impurity_decrease
        );
        ensure!(self.n_screen_grid >= 1, "n_screen_grid must be at least 1");
        ensure!(self.n_feature_search >= 1, "n_feature_search must be at least 1");
        ensure!(self.n_split_grid >= 1, "n_split_grid must be at least 1");
        ensure!(!self.reg_lambda.is_empty(), "reg_lambda can't be empty");
        ensure!(
            self.reg_lambda.iter().all(|&l| l >= 0. && l.is_finite()),
            "reg_lambda must be positive and finite, got {:?}",
            self.reg_lambda
        );
        ensure!(self.glm.n_folds >= 2, "n_folds must be at least 2");
        ensure!(self.glm.max_iter >= 1, "max_iter must be at least 1");
        ensure!(self.glm.max_inner_iter >= 1, "max_inner_iter must be at least 1");
        ensure!(self.glm.tol > 0., "tol must be strictly positive");
        if let Some(split_features) = &self.split_features {
            ensure!(!split_features.is_empty(), "split_features can't be empty");
            for &feature_id in split_features {
                ensure!(
                    feature_id < n_features,
                    "split feature {} out of range, there are {} features",
                    feature_id,
                    n_features
                );
            }
        }
        if let Some(names) = &self.feature_names {
            ensure!(
                names.len() == n_features,
                "{} feature names for {} features",
                names.len(),
                n_features
            );
        }
        Ok(())
    }

    /// The columns we are allowed to split on, sorted and without duplicates.
    pub(crate) fn candidate_features(&self, n_features: usize) -> Vec<usize> {
        match &self.split_features {
            None => (0..n_features).collect(),
            Some(features) => {
                let mut features = features.clone();
                features.sort_unstable();
                features.dedup();
                features
            }
        }
    }

    /// The smallest regularization, used for the cheap fits of the screening.
    pub(crate) fn screening_lambda(&self) -> f64 {
        self.reg_lambda.iter().cloned().fold(std::f64::INFINITY, f64::min)
    }
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = TreeParams::default();
        assert_eq!(params.max_depth, 2);
        assert_eq!(params.min_samples_leaf, 10);
        assert_eq!(params.n_split_grid, 20);
        assert!(params.clip_predict);
        assert!(params.validate(3).is_ok());
    }

    #[test]
    fn test_invalid_params() {
        let mut params = TreeParams::default();
        params.min_samples_leaf = 0;
        assert!(params.validate(3).is_err());

        let mut params = TreeParams::default();
        params.reg_lambda = vec![];
        assert!(params.validate(3).is_err());

        let mut params = TreeParams::default();
        params.reg_lambda = vec![0.1, -1.];
        assert!(params.validate(3).is_err());

        let mut params = TreeParams::default();
        params.min_impurity_decrease = std::f64::NAN;
        assert!(params.validate(3).is_err());

        let mut params = TreeParams::default();
        params.split_features = Some(vec![0, 3]);
        match params.validate(3) {
            Err(FitError::InvalidParams(msg)) => assert!(msg.contains("out of range")),
            e => panic!("unexpected {:?}", e),
        }

        let mut params = TreeParams::default();
        params.feature_names = Some(vec!["a".to_string()]);
        assert!(params.validate(3).is_err());

        let mut params = TreeParams::default();
        params.glm.n_folds = 1;
        assert!(params.validate(3).is_err());

        let mut params = TreeParams::default();
        params.glm.max_inner_iter = 0;
        assert!(params.validate(3).is_err());
    }

    #[test]
    fn test_candidate_features() {
        let mut params = TreeParams::default();
        assert_eq!(params.candidate_features(3), vec![0, 1, 2]);
        params.split_features = Some(vec![2, 0, 2]);
        assert_eq!(params.candidate_features(3), vec![0, 2]);
    }

    #[test]
    fn test_screening_lambda() {
        let mut params = TreeParams::default();
        params.reg_lambda = vec![0.1, 0.01, 1.];
        assert_eq!(params.screening_lambda(), 0.01);
    }

    #[test]
    fn test_serde() {
        let params = TreeParams::default();
        let json = serde_json::to_string(&params).unwrap();
        let back: TreeParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);
    }
}
