use crate::split::{SplitCandidate, SplitSearch};
use crate::{
    ClassificationLearner, ColumnMajorMatrix, Dataset, FitResult, LeafFit, LeafLearner,
    LeafModel, LinearModel, PredictError, PredictResult, RegressionLearner, SearchStage,
    TreeParams, DEFAULT_DECISION_THRESHOLD,
};
use either::Either;
use rayon::prelude::*;
use std::fmt::Write;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SplitNode {
    pub node_id: usize,
    pub depth: usize,
    pub split_feature_id: usize,
    pub split_val: f64,
    /// Impurity decrease of the split
    pub decrease: f64,
    pub impurity: f64,
    pub sample_indices: Vec<usize>,
    pub left_child: Box<Node>,
    pub right_child: Box<Node>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LeafNode {
    pub node_id: usize,
    pub depth: usize,
    pub impurity: f64,
    pub sample_indices: Vec<usize>,
    pub model: LeafModel,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Node {
    Split(SplitNode),
    Leaf(LeafNode),
}

impl Node {
    pub fn node_id(&self) -> usize {
        match self {
            Node::Split(split) => split.node_id,
            Node::Leaf(leaf) => leaf.node_id,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Node::Split(split) => split.depth,
            Node::Leaf(leaf) => leaf.depth,
        }
    }

    pub fn impurity(&self) -> f64 {
        match self {
            Node::Split(split) => split.impurity,
            Node::Leaf(leaf) => leaf.impurity,
        }
    }

    pub fn sample_indices(&self) -> &[usize] {
        match self {
            Node::Split(split) => &split.sample_indices,
            Node::Leaf(leaf) => &leaf.sample_indices,
        }
    }

    pub fn is_leaf(&self) -> bool {
        match self {
            Node::Split(_) => false,
            Node::Leaf(_) => true,
        }
    }

    /// Leaf reached by a row.
    pub fn find_leaf(&self, features: &[f64]) -> &LeafNode {
        match self {
            Node::Split(split) => {
                let val = features[split.split_feature_id];
                if val <= split.split_val {
                    split.left_child.find_leaf(features)
                } else {
                    split.right_child.find_leaf(features)
                }
            }
            Node::Leaf(leaf) => leaf,
        }
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        self.find_leaf(features).model.predict(features)
    }

    /// Number ids in pre-order, starting at `next_id`.
    fn assign_ids(&mut self, next_id: &mut usize) {
        match self {
            Node::Split(split) => {
                split.node_id = *next_id;
                *next_id += 1;
                split.left_child.assign_ids(next_id);
                split.right_child.assign_ids(next_id);
            }
            Node::Leaf(leaf) => {
                leaf.node_id = *next_id;
                *next_id += 1;
            }
        }
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a LeafNode>) {
        match self {
            Node::Split(split) => {
                split.left_child.collect_leaves(leaves);
                split.right_child.collect_leaves(leaves);
            }
            Node::Leaf(leaf) => leaves.push(leaf),
        }
    }

    fn max_depth(&self) -> usize {
        match self {
            Node::Split(split) => split
                .left_child
                .max_depth()
                .max(split.right_child.max_depth()),
            Node::Leaf(leaf) => leaf.depth,
        }
    }
}

/// Recursive construction of the nodes. Shared by the regression and the classification.
struct TreeBuilder<'a, L: LeafLearner> {
    dataset: &'a Dataset,
    learner: &'a L,
    params: &'a TreeParams,
}

impl<'a, L: LeafLearner> TreeBuilder<'a, L> {
    /// Decide whether a node is split or becomes a leaf.
    ///
    /// `fit` is the model already fitted on these rows by the search of the parent, if any.
    fn evaluate(
        &self,
        indices: &[usize],
        depth: usize,
        impurity: f64,
        fit: Option<LeafFit>,
    ) -> FitResult<Either<SplitCandidate, LeafFit>> {
        let can_split = depth < self.params.max_depth
            && indices.len() >= self.params.min_samples_leaf.saturating_mul(2);
        let split = if can_split {
            SplitSearch::new(self.dataset, self.learner, self.params, indices, impurity)
                .best_split()?
        } else {
            None
        };

        match split {
            Some(split) => Ok(Either::Left(split)),
            None => {
                let fit = match fit {
                    Some(fit) => fit,
                    None => {
                        let x = self.dataset.features.select_rows(indices);
                        let target: Vec<f64> =
                            indices.iter().map(|&i| self.dataset.target[i]).collect();
                        self.learner
                            .fit_leaf(&x, &target, self.params, SearchStage::Final)?
                    }
                };
                Ok(Either::Right(fit))
            }
        }
    }

    fn build(
        &self,
        indices: Vec<usize>,
        depth: usize,
        impurity: f64,
        fit: Option<LeafFit>,
    ) -> FitResult<Node> {
        match self.evaluate(&indices, depth, impurity, fit)? {
            Either::Right(fit) => {
                debug!(
                    "leaf at depth {} with {} samples, impurity {:.6}",
                    depth,
                    indices.len(),
                    fit.impurity
                );
                Ok(Node::Leaf(LeafNode {
                    node_id: 0,
                    depth,
                    impurity: fit.impurity,
                    sample_indices: indices,
                    model: fit.model,
                }))
            }
            Either::Left(split) => {
                debug!(
                    "split at depth {} with {} samples: feature {} <= {:.6}, decrease {:.6}",
                    depth,
                    indices.len(),
                    split.feature_id,
                    split.threshold,
                    split.decrease
                );
                let SplitCandidate {
                    feature_id,
                    threshold,
                    decrease,
                    left_indices,
                    right_indices,
                    left,
                    right,
                } = split;
                let (left_impurity, right_impurity) = (left.impurity, right.impurity);
                let (left_child, right_child) = rayon::join(
                    || self.build(left_indices, depth + 1, left_impurity, Some(left)),
                    || self.build(right_indices, depth + 1, right_impurity, Some(right)),
                );
                Ok(Node::Split(SplitNode {
                    node_id: 0,
                    depth,
                    split_feature_id: feature_id,
                    split_val: threshold,
                    decrease,
                    impurity,
                    sample_indices: indices,
                    left_child: Box::new(left_child?),
                    right_child: Box::new(right_child?),
                }))
            }
        }
    }
}

/// A fitted model tree.
///
/// `L` is the kind of GLM in the leaves, see `GlmTreeRegressor` and `GlmTreeClassifier`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GlmTree<L> {
    root: Node,
    root_model: LinearModel,
    root_impurity: f64,
    n_features: usize,
    n_samples: usize,
    params: TreeParams,
    learner: L,
}

pub type GlmTreeRegressor = GlmTree<RegressionLearner>;
pub type GlmTreeClassifier = GlmTree<ClassificationLearner>;

impl<L: LeafLearner> GlmTree<L> {
    /// Grow a tree on the whole dataset.
    ///
    /// The input and the parameters are checked before any fitting.
    pub fn build(dataset: &Dataset, params: &TreeParams, learner: L) -> FitResult<Self> {
        dataset.check()?;
        params.validate(dataset.n_features())?;
        learner.check_target(&dataset.target)?;
        info!(
            "Building a GLM tree on {} samples and {} features",
            dataset.n_rows(),
            dataset.n_features()
        );

        let root_fit = learner.fit_root(&dataset.features, &dataset.target, params)?;
        debug!("root GLM impurity {:.6}", root_fit.impurity);

        let builder = TreeBuilder {
            dataset,
            learner: &learner,
            params,
        };
        let indices: Vec<usize> = (0..dataset.n_rows()).collect();
        let mut root = builder.build(indices, 0, root_fit.impurity, None)?;
        root.assign_ids(&mut 0);

        let tree = GlmTree {
            root,
            root_model: root_fit.model,
            root_impurity: root_fit.impurity,
            n_features: dataset.n_features(),
            n_samples: dataset.n_rows(),
            params: params.clone(),
            learner,
        };
        info!(
            "GLM tree built: {} leaves, depth {}",
            tree.n_leaves(),
            tree.depth()
        );
        Ok(tree)
    }
}

impl<L: LeafLearner> GlmTree<L> {
    fn check_dimension(&self, got: usize) -> PredictResult<()> {
        if got != self.n_features {
            return Err(PredictError::DimensionMismatch {
                expected: self.n_features,
                got,
            });
        }
        Ok(())
    }

    /// Prediction for a single row: a value for a regression, a probability for a
    /// classification.
    pub fn predict_row(&self, features: &[f64]) -> PredictResult<f64> {
        self.check_dimension(features.len())?;
        Ok(self.root.predict(features))
    }

    pub fn predict(&self, features: &ColumnMajorMatrix<f64>) -> PredictResult<Vec<f64>> {
        self.check_dimension(features.n_cols())?;
        Ok((0..features.n_rows())
            .into_par_iter()
            .map(|i| self.root.predict(&features.row(i).to_vec()))
            .collect())
    }

    /// Id of the leaf reached by every row.
    pub fn apply(&self, features: &ColumnMajorMatrix<f64>) -> PredictResult<Vec<usize>> {
        self.check_dimension(features.n_cols())?;
        Ok((0..features.n_rows())
            .map(|i| self.root.find_leaf(&features.row(i).to_vec()).node_id)
            .collect())
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Unpenalized GLM fitted on all the samples. It is never used for the predictions.
    pub fn root_model(&self) -> &LinearModel {
        &self.root_model
    }

    pub fn root_impurity(&self) -> f64 {
        self.root_impurity
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    pub fn learner(&self) -> &L {
        &self.learner
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_leaves(&self) -> usize {
        self.leaves().len()
    }

    pub fn depth(&self) -> usize {
        self.root.max_depth()
    }

    /// The leaves, from left to right.
    pub fn leaves(&self) -> Vec<&LeafNode> {
        let mut leaves = Vec::new();
        self.root.collect_leaves(&mut leaves);
        leaves
    }

    /// Impurity decrease brought by every feature, weighted by the fraction of samples of the
    /// split nodes and normalized to sum to 1. All zeros if the tree has no useful split.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut importances = vec![0.; self.n_features];
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if let Node::Split(split) = node {
                let weight = split.sample_indices.len() as f64 / self.n_samples as f64;
                importances[split.split_feature_id] += weight * split.decrease;
                stack.push(&*split.left_child);
                stack.push(&*split.right_child);
            }
        }
        let total: f64 = importances.iter().sum();
        if total > 0. {
            for importance in importances.iter_mut() {
                *importance /= total;
            }
        }
        importances
    }

    fn feature_name(&self, feature_id: usize) -> String {
        match &self.params.feature_names {
            Some(names) => names[feature_id].clone(),
            None => format!("feature_{}", feature_id),
        }
    }

    /// Human readable listing of the rules of the tree.
    pub fn export_text(&self) -> String {
        let mut out = String::new();
        self.write_node(&self.root, 0, &mut out);
        out
    }

    fn write_node(&self, node: &Node, indent: usize, out: &mut String) {
        let prefix = "|   ".repeat(indent);
        match node {
            Node::Split(split) => {
                let name = self.feature_name(split.split_feature_id);
                // Writing in a String can't fail
                let _ = writeln!(out, "{}|--- {} <= {:.4}", prefix, name, split.split_val);
                self.write_node(&split.left_child, indent + 1, out);
                let _ = writeln!(out, "{}|--- {} >  {:.4}", prefix, name, split.split_val);
                self.write_node(&split.right_child, indent + 1, out);
            }
            Node::Leaf(leaf) => {
                let model = match &leaf.model {
                    LeafModel::Constant(value) => format!("constant {:.4}", value),
                    LeafModel::Fitted(fitted) => format!(
                        "glm with {} non-zero coefficients, lambda {}",
                        fitted.model.n_nonzero(),
                        fitted.lambda
                    ),
                };
                let _ = writeln!(
                    out,
                    "{}|--- leaf {}: {}, samples {}, impurity {:.4}",
                    prefix,
                    leaf.node_id,
                    model,
                    leaf.sample_indices.len(),
                    leaf.impurity
                );
            }
        }
    }
}

impl GlmTree<ClassificationLearner> {
    /// `[1 - p, p]` for every row.
    pub fn predict_proba(&self, features: &ColumnMajorMatrix<f64>) -> PredictResult<Vec<[f64; 2]>> {
        Ok(self
            .predict(features)?
            .into_iter()
            .map(|p| [1. - p, p])
            .collect())
    }

    /// 1 if the probability of the positive class is at least 0.5, 0 otherwise.
    pub fn predict_label(&self, features: &ColumnMajorMatrix<f64>) -> PredictResult<Vec<f64>> {
        Ok(self
            .predict(features)?
            .into_iter()
            .map(|p| if p >= DEFAULT_DECISION_THRESHOLD { 1. } else { 0. })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    macro_rules! assert_close {
        ($a : expr, $b: expr, $delta: expr) => {{
            let (a, b, delta) = ($a, $b, $delta);
            assert!(
                (a - b).abs() <= delta,
                "Difference = {:.6} > {:.6} too important between {:.6} and {:.6}",
                a - b,
                delta,
                a,
                b
            );
        }};
    }

    /// 200 samples, feature 0 on a regular grid of [0, 1), the others random.
    /// The target is linear with a jump of 5 at x0 = 0.5.
    fn jump_dataset() -> Dataset {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let rows: Vec<Vec<f64>> = (0..200)
            .map(|i| vec![i as f64 / 200., rng.gen(), rng.gen()])
            .collect();
        let target = rows
            .iter()
            .map(|row| {
                let jump = if row[0] > 0.5 { 5. } else { 0. };
                2. * row[0] + row[1] + jump
            })
            .collect();
        Dataset::from_rows(rows, target).unwrap()
    }

    fn classification_dataset() -> Dataset {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let rows: Vec<Vec<f64>> = (0..300)
            .map(|_| vec![rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)])
            .collect();
        let target = rows
            .iter()
            .map(|row| {
                let latent = if row[0] <= 0. { 4. * row[1] } else { -4. * row[1] };
                let p = sigmoid(latent);
                if rng.gen::<f64>() < p {
                    1.
                } else {
                    0.
                }
            })
            .collect();
        Dataset::from_rows(rows, target).unwrap()
    }

    #[test]
    fn test_regression_jump() {
        let dataset = jump_dataset();
        let mut params = TreeParams::default();
        params.max_depth = 1;
        let tree = GlmTree::build(&dataset, &params, RegressionLearner::new()).unwrap();

        let split = match tree.root() {
            Node::Split(split) => split,
            Node::Leaf(_) => panic!("the root should be split"),
        };
        assert_eq!(split.split_feature_id, 0);
        assert!(
            (split.split_val - 0.5).abs() <= 0.05,
            "threshold {} too far from the jump",
            split.split_val
        );
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.depth(), 1);
        assert!(split.decrease > 0.);

        // Better than the single linear model
        let error = rmse(&dataset.target, &tree.predict(&dataset.features).unwrap());
        let root_predictions = tree
            .root_model()
            .predict(&RegLoss::default(), &dataset.features);
        let root_error = rmse(&dataset.target, &root_predictions);
        assert!(error < root_error, "rmse {} vs {}", error, root_error);
        assert_eq!(tree.feature_importances(), vec![1., 0., 0.]);
    }

    #[test]
    fn test_max_depth_zero() {
        let dataset = jump_dataset();
        let mut params = TreeParams::default();
        params.max_depth = 0;
        let tree = GlmTree::build(&dataset, &params, RegressionLearner::new()).unwrap();
        assert!(tree.root().is_leaf());
        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.root().sample_indices().len(), 200);
        assert_eq!(tree.apply(&dataset.features).unwrap(), vec![0; 200]);
        assert_eq!(tree.feature_importances(), vec![0.; 3]);
    }

    #[test]
    fn test_min_samples_leaf_never_split() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let rows: Vec<Vec<f64>> = (0..20).map(|_| vec![rng.gen(), rng.gen()]).collect();
        let target = rows.iter().map(|row| row[0] - row[1]).collect();
        let dataset = Dataset::from_rows(rows, target).unwrap();
        let mut params = TreeParams::default();
        params.min_samples_leaf = usize::MAX;
        let tree = GlmTree::build(&dataset, &params, RegressionLearner::new()).unwrap();
        assert!(tree.root().is_leaf());
        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.params().min_samples_leaf, usize::MAX);
    }

    #[test]
    fn test_structure() {
        let dataset = jump_dataset();
        let params = TreeParams::default();
        let tree = GlmTree::build(&dataset, &params, RegressionLearner::new()).unwrap();
        assert!(tree.depth() <= params.max_depth);
        for leaf in tree.leaves() {
            assert!(leaf.sample_indices.len() >= params.min_samples_leaf);
        }

        // Every training row reaches the leaf that holds it
        let ids = tree.apply(&dataset.features).unwrap();
        let leaves = tree.leaves();
        for (row, id) in ids.into_iter().enumerate() {
            let leaf = leaves
                .iter()
                .find(|leaf| leaf.node_id == id)
                .expect("apply returns leaf ids");
            assert!(leaf.sample_indices.contains(&row));
        }
        let n_samples: usize = leaves.iter().map(|leaf| leaf.sample_indices.len()).sum();
        assert_eq!(n_samples, 200);
    }

    #[test]
    fn test_idempotence() {
        let dataset = jump_dataset();
        let mut params = TreeParams::default();
        params.reg_lambda = vec![0.001, 0.01, 0.1];
        params.random_state = 7;
        let tree1 = GlmTree::build(&dataset, &params, RegressionLearner::new()).unwrap();
        let tree2 = GlmTree::build(&dataset, &params, RegressionLearner::new()).unwrap();
        assert_eq!(tree1.root(), tree2.root());
        assert_eq!(tree1.root_model(), tree2.root_model());
        assert_eq!(
            tree1.predict(&dataset.features).unwrap(),
            tree2.predict(&dataset.features).unwrap()
        );
    }

    #[test]
    fn test_classification_idempotence() {
        let dataset = classification_dataset();
        let mut params = TreeParams::default();
        params.max_depth = 2;
        params.reg_lambda = vec![0.01, 0.1, 1.];
        params.random_state = 11;
        let tree1 = GlmTree::build(&dataset, &params, ClassificationLearner::new()).unwrap();
        let tree2 = GlmTree::build(&dataset, &params, ClassificationLearner::new()).unwrap();
        assert!(!tree1.root().is_leaf());
        assert_eq!(tree1.root(), tree2.root());
        assert_eq!(tree1.root_model(), tree2.root_model());
        assert_eq!(
            tree1.predict_proba(&dataset.features).unwrap(),
            tree2.predict_proba(&dataset.features).unwrap()
        );
    }

    #[test]
    fn test_serde() {
        let dataset = jump_dataset();
        let tree = GlmTree::build(&dataset, &TreeParams::default(), RegressionLearner::new())
            .unwrap();
        let json = serde_json::to_string(&tree).unwrap();
        let tree2: GlmTreeRegressor = serde_json::from_str(&json).unwrap();
        assert_eq!(tree.n_leaves(), tree2.n_leaves());
        assert_eq!(tree.params(), tree2.params());
        let predictions = tree.predict(&dataset.features).unwrap();
        let predictions2 = tree2.predict(&dataset.features).unwrap();
        for (p1, p2) in predictions.into_iter().zip(predictions2) {
            assert_close!(p1, p2, 1e-9);
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let dataset = jump_dataset();
        let tree = GlmTree::build(&dataset, &TreeParams::default(), RegressionLearner::new())
            .unwrap();
        assert_eq!(
            tree.predict_row(&[0.1, 0.2]),
            Err(PredictError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        );
        let features = ColumnMajorMatrix::from_rows(vec![vec![0.1; 4]]);
        assert!(tree.predict(&features).is_err());
        assert!(tree.apply(&features).is_err());
        assert!(tree.predict_row(&[0.1, 0.2, 0.3]).is_ok());
    }

    #[test]
    fn test_clip_extrapolation() {
        let dataset = jump_dataset();
        let mut params = TreeParams::default();
        params.max_depth = 0;
        let tree = GlmTree::build(&dataset, &params, RegressionLearner::new()).unwrap();
        let max = [0.995, 0.5, 0.5];
        let out = [10., 0.5, 0.5];
        assert_eq!(tree.predict_row(&out).unwrap(), tree.predict_row(&max).unwrap());

        params.clip_predict = false;
        let tree = GlmTree::build(&dataset, &params, RegressionLearner::new()).unwrap();
        assert!(tree.predict_row(&out).unwrap() > tree.predict_row(&max).unwrap());
    }

    #[test]
    fn test_input_errors() {
        let dataset = jump_dataset();
        let params = TreeParams::default();

        let constant = Dataset::new(dataset.features.clone(), vec![1.; 200]).unwrap();
        assert_eq!(
            GlmTree::build(&constant, &params, RegressionLearner::new()).unwrap_err(),
            FitError::ConstantTarget
        );

        let mismatch = Dataset {
            features: dataset.features.clone(),
            target: vec![1., 2.],
        };
        assert_eq!(
            GlmTree::build(&mismatch, &params, RegressionLearner::new()).unwrap_err(),
            FitError::ShapeMismatch {
                n_rows: 200,
                n_targets: 2
            }
        );

        let mut params = TreeParams::default();
        params.split_features = Some(vec![5]);
        match GlmTree::build(&dataset, &params, RegressionLearner::new()) {
            Err(FitError::InvalidParams(_)) => {}
            e => panic!("unexpected {:?}", e),
        }

        // Not a binary target
        match GlmTree::build(&dataset, &TreeParams::default(), ClassificationLearner::new()) {
            Err(FitError::InvalidValue(_)) => {}
            e => panic!("unexpected {:?}", e),
        }
    }

    #[test]
    fn test_classification() {
        let dataset = classification_dataset();
        let mut params = TreeParams::default();
        params.max_depth = 1;
        params.min_samples_leaf = 20;
        let tree = GlmTree::build(&dataset, &params, ClassificationLearner::new()).unwrap();
        assert_eq!(tree.learner().min_class_count, MIN_CLASS_COUNT);

        let split = match tree.root() {
            Node::Split(split) => split,
            Node::Leaf(_) => panic!("the root should be split"),
        };
        assert_eq!(split.split_feature_id, 0);
        assert!(split.split_val.abs() < 0.2, "threshold {}", split.split_val);

        let proba = tree.predict_proba(&dataset.features).unwrap();
        let labels = tree.predict_label(&dataset.features).unwrap();
        let mut n_correct = 0;
        for ((p, label), target) in proba.iter().zip(&labels).zip(&dataset.target) {
            assert_close!(p[0] + p[1], 1., 1e-12);
            assert!(p[1] >= 0. && p[1] <= 1.);
            assert_eq!(*label, if p[1] >= 0.5 { 1. } else { 0. });
            if label == target {
                n_correct += 1;
            }
        }
        assert!(n_correct > 200, "accuracy {}/300", n_correct);
        assert!(tree.root_impurity() > tree.leaves()[0].impurity.min(tree.leaves()[1].impurity));
    }

    #[test]
    fn test_classification_degenerate_leaf() {
        // Only positives on the left of 0.3
        let rows: Vec<Vec<f64>> = (0..100).map(|i| vec![i as f64 / 100.]).collect();
        let target: Vec<f64> = (0..100)
            .map(|i| if i < 30 || i % 2 == 0 { 1. } else { 0. })
            .collect();
        let dataset = Dataset::from_rows(rows, target).unwrap();
        let mut params = TreeParams::default();
        params.max_depth = 1;
        params.min_samples_leaf = 8;
        let tree = GlmTree::build(&dataset, &params, ClassificationLearner::new()).unwrap();

        let pure_leaf = tree
            .leaves()
            .into_iter()
            .find(|leaf| leaf.sample_indices.iter().all(|&i| dataset.target[i] == 1.))
            .expect("a leaf with only positives");
        assert_eq!(pure_leaf.model, LeafModel::Constant(1.));
        assert_eq!(pure_leaf.impurity, 0.);
        assert_eq!(pure_leaf.model.predict(&[0.9]), 1.);
    }

    #[test]
    fn test_export_text() {
        let dataset = jump_dataset();
        let mut params = TreeParams::default();
        params.max_depth = 1;
        params.feature_names = Some(vec!["x".to_string(), "y".to_string(), "z".to_string()]);
        let tree = GlmTree::build(&dataset, &params, RegressionLearner::new()).unwrap();
        let text = tree.export_text();
        assert!(text.starts_with("|--- x <= "));
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("|   |--- leaf 1: glm"));
        assert!(text.contains("|   |--- leaf 2: glm"));
    }
}
