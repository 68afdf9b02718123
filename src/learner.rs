use crate::{
    binary_entropy, fit_glm, fit_glm_cv, mean_std, BinaryLogLoss, ColumnMajorMatrix, FitError,
    FitResult, LinearModel, Loss, RegLoss, TreeParams, EPSILON, MIN_CLASS_COUNT,
    SHOULD_NOT_HAPPEN,
};
use ord_subset::OrdSubsetIterExt;

/// What a leaf predicts: a value, or the probability of the positive class.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum Task {
    Regression,
    Classification,
}

impl Task {
    fn inverse_link(self, latent: f64) -> f64 {
        match self {
            Task::Regression => RegLoss::default().inverse_link(latent),
            Task::Classification => BinaryLogLoss::default().inverse_link(latent),
        }
    }
}

/// Centering and scaling computed on the training rows of a leaf.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Standardizer {
    pub means: Vec<f64>,
    /// Standard deviation plus `EPSILON`
    pub scales: Vec<f64>,
}

impl Standardizer {
    pub fn fit(x: &ColumnMajorMatrix<f64>) -> Self {
        let (means, scales) = x
            .columns()
            .map(|column| {
                let (m, s) = mean_std(column);
                // The exact value keeps a constant column at exactly 0 once centered
                let is_constant = column.iter().all(|&v| v == column[0]);
                (if is_constant { column[0] } else { m }, s + EPSILON)
            })
            .unzip();
        Standardizer { means, scales }
    }

    pub fn transform_row(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(&self.means)
            .zip(&self.scales)
            .map(|((&v, &m), &s)| (v - m) / s)
            .collect()
    }

    pub fn transform(&self, x: &ColumnMajorMatrix<f64>) -> ColumnMajorMatrix<f64> {
        let columns = x
            .columns()
            .zip(&self.means)
            .zip(&self.scales)
            .map(|((column, &m), &s)| column.iter().map(|&v| (v - m) / s).collect())
            .collect();
        ColumnMajorMatrix::from_columns(columns)
    }
}

/// Per-feature range seen during the training of a leaf.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClipBounds {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

impl ClipBounds {
    pub fn from_matrix(x: &ColumnMajorMatrix<f64>) -> FitResult<Self> {
        if x.n_rows() == 0 {
            return Err(FitError::EmptyDataset);
        }
        let min = x
            .columns()
            .map(|column| column.iter().cloned().ord_subset_min().expect(SHOULD_NOT_HAPPEN))
            .collect();
        let max = x
            .columns()
            .map(|column| column.iter().cloned().ord_subset_max().expect(SHOULD_NOT_HAPPEN))
            .collect();
        Ok(ClipBounds { min, max })
    }

    pub fn clip(&self, x: &mut [f64]) {
        for ((v, &min), &max) in x.iter_mut().zip(&self.min).zip(&self.max) {
            *v = v.max(min).min(max);
        }
    }
}

/// A GLM fitted on the rows of a leaf, with everything needed to transform a new input.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FittedLeaf {
    pub model: LinearModel,
    pub task: Task,
    pub normalization: Option<Standardizer>,
    /// Applied after the normalization, so in the same space as the model inputs
    pub clip: Option<ClipBounds>,
    /// Regularization chosen for this leaf
    pub lambda: f64,
}

impl FittedLeaf {
    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut x = match &self.normalization {
            Some(normalization) => normalization.transform_row(x),
            None => x.to_vec(),
        };
        if let Some(clip) = &self.clip {
            clip.clip(&mut x);
        }
        self.task.inverse_link(self.model.latent(&x))
    }
}

/// The model held by a leaf.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum LeafModel {
    /// Degenerate leaf: the same value whatever the input
    Constant(f64),
    Fitted(FittedLeaf),
}

impl LeafModel {
    pub fn predict(&self, x: &[f64]) -> f64 {
        match self {
            LeafModel::Constant(value) => *value,
            LeafModel::Fitted(leaf) => leaf.predict(x),
        }
    }

    pub fn predict_matrix(&self, x: &ColumnMajorMatrix<f64>) -> Vec<f64> {
        (0..x.n_rows())
            .map(|i| self.predict(&x.row(i).to_vec()))
            .collect()
    }
}

/// Diagnostic model fitted on the whole dataset.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RootFit {
    pub model: LinearModel,
    pub impurity: f64,
}

/// Model of a (candidate) leaf and its impurity on its own rows.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LeafFit {
    pub model: LeafModel,
    pub impurity: f64,
}

/// How much work a leaf fit is worth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchStage {
    /// Ranking of the features: one fit at the smallest regularization, no cross-validation
    Screening,
    /// Real candidate leaves: regularization chosen by cross-validation
    Final,
}

/// Everything the tree builder needs to know about a kind of GLM.
///
/// The builder is shared between the regression and the classification, only the learner
/// changes.
pub trait LeafLearner: Sync + Send {
    type Loss: Loss;

    fn loss(&self) -> &Self::Loss;

    /// Check the target before any fitting.
    fn check_target(&self, target: &[f64]) -> FitResult<()> {
        match target.first() {
            Some(&first) if target.iter().any(|&v| v != first) => Ok(()),
            Some(_) => Err(FitError::ConstantTarget),
            None => Err(FitError::EmptyDataset),
        }
    }

    /// Unpenalized GLM on all the rows, kept as a baseline.
    fn fit_root(
        &self,
        x: &ColumnMajorMatrix<f64>,
        target: &[f64],
        params: &TreeParams,
    ) -> FitResult<RootFit> {
        let fit = fit_glm(self.loss(), x, target, 0., &params.glm)?;
        let predictions = fit.model.predict(self.loss(), x);
        Ok(RootFit {
            impurity: self.impurity(target, &predictions),
            model: fit.model,
        })
    }

    fn fit_leaf(
        &self,
        x: &ColumnMajorMatrix<f64>,
        target: &[f64],
        params: &TreeParams,
        stage: SearchStage,
    ) -> FitResult<LeafFit>;

    fn impurity(&self, target: &[f64], predictions: &[f64]) -> f64 {
        self.loss().calc_loss(target, predictions)
    }
}

/// A leaf needs at least one row, and a target for each of them.
fn check_leaf_input(x: &ColumnMajorMatrix<f64>, target: &[f64]) -> FitResult<()> {
    if x.n_rows() != target.len() {
        return Err(FitError::ShapeMismatch {
            n_rows: x.n_rows(),
            n_targets: target.len(),
        });
    }
    if target.is_empty() {
        return Err(FitError::EmptyDataset);
    }
    Ok(())
}

/// Fit the penalized GLM of a leaf. Return the model and the regularization used.
fn fit_penalized(
    loss: &impl Loss,
    x: &ColumnMajorMatrix<f64>,
    target: &[f64],
    params: &TreeParams,
    stage: SearchStage,
) -> FitResult<(LinearModel, f64)> {
    match stage {
        SearchStage::Screening => {
            let lambda = params.screening_lambda();
            let fit = fit_glm(loss, x, target, lambda, &params.glm)?;
            Ok((fit.model, lambda))
        }
        SearchStage::Final => {
            let fit = fit_glm_cv(
                loss,
                x,
                target,
                &params.reg_lambda,
                &params.glm,
                params.random_state,
            )?;
            Ok((fit.model, fit.lambda))
        }
    }
}

/// Linear regression in the leaves, Lasso with internal standardization.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RegressionLearner {
    loss: RegLoss,
}

impl RegressionLearner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeafLearner for RegressionLearner {
    type Loss = RegLoss;

    fn loss(&self) -> &RegLoss {
        &self.loss
    }

    fn fit_leaf(
        &self,
        x: &ColumnMajorMatrix<f64>,
        target: &[f64],
        params: &TreeParams,
        stage: SearchStage,
    ) -> FitResult<LeafFit> {
        check_leaf_input(x, target)?;
        let (model, lambda) = fit_penalized(&self.loss, x, target, params, stage)?;
        let clip = if params.clip_predict {
            Some(ClipBounds::from_matrix(x)?)
        } else {
            None
        };
        let model = LeafModel::Fitted(FittedLeaf {
            model,
            task: Task::Regression,
            normalization: None,
            clip,
            lambda,
        });
        let impurity = self.impurity(target, &model.predict_matrix(x));
        Ok(LeafFit { model, impurity })
    }
}

/// Logistic regression in the leaves, on standardized features.
///
/// Leaves with a single class, or too few samples of a class, predict their positive rate.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClassificationLearner {
    loss: BinaryLogLoss,
    /// Minimum number of samples of each class to fit a model
    pub min_class_count: usize,
}

impl ClassificationLearner {
    pub fn new() -> Self {
        ClassificationLearner {
            loss: BinaryLogLoss::default(),
            min_class_count: MIN_CLASS_COUNT,
        }
    }
}

impl Default for ClassificationLearner {
    fn default() -> Self {
        Self::new()
    }
}

impl LeafLearner for ClassificationLearner {
    type Loss = BinaryLogLoss;

    fn loss(&self) -> &BinaryLogLoss {
        &self.loss
    }

    fn check_target(&self, target: &[f64]) -> FitResult<()> {
        if let Some(row) = target.iter().position(|&y| y != 0. && y != 1.) {
            return Err(FitError::InvalidValue(format!(
                "label of row {} is {}, expected 0 or 1",
                row, target[row]
            )));
        }
        match target.first() {
            Some(&first) if target.iter().any(|&v| v != first) => Ok(()),
            Some(_) => Err(FitError::ConstantTarget),
            None => Err(FitError::EmptyDataset),
        }
    }

    fn fit_leaf(
        &self,
        x: &ColumnMajorMatrix<f64>,
        target: &[f64],
        params: &TreeParams,
        stage: SearchStage,
    ) -> FitResult<LeafFit> {
        check_leaf_input(x, target)?;
        let n_pos = target.iter().filter(|&&y| y == 1.).count();
        let n_neg = target.len() - n_pos;
        if n_pos < self.min_class_count.max(1) || n_neg < self.min_class_count.max(1) {
            let p = n_pos as f64 / target.len() as f64;
            return Ok(LeafFit {
                model: LeafModel::Constant(p),
                impurity: binary_entropy(p),
            });
        }

        let normalization = Standardizer::fit(x);
        let normalized = normalization.transform(x);
        let (model, lambda) = fit_penalized(&self.loss, &normalized, target, params, stage)?;
        let predictions = model.predict(&self.loss, &normalized);
        let clip = if params.clip_predict {
            Some(ClipBounds::from_matrix(&normalized)?)
        } else {
            None
        };
        Ok(LeafFit {
            impurity: self.impurity(target, &predictions),
            model: LeafModel::Fitted(FittedLeaf {
                model,
                task: Task::Classification,
                normalization: Some(normalization),
                clip,
                lambda,
            }),
        })
    }
}
