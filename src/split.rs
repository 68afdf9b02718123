use crate::{
    quantile_sorted, sorted_copy, Dataset, FitResult, LeafFit, LeafLearner, SearchStage,
    TreeParams,
};
use itertools::Itertools;
use ord_subset::OrdSubsetIterExt;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use std::cmp::Reverse;

/// Store the result of a valid split of a node, with the models of both children.
#[derive(Debug, Clone)]
pub(crate) struct SplitCandidate {
    pub feature_id: usize,
    pub threshold: f64,
    pub decrease: f64,
    pub left_indices: Vec<usize>,
    pub right_indices: Vec<usize>,
    pub left: LeafFit,
    pub right: LeafFit,
}

/// Empirical quantiles of `values` at the levels `k / (n_grid + 1)`, `k = 1..=n_grid`.
///
/// Duplicates are removed, and so are the thresholds that would leave nothing on the right.
pub(crate) fn candidate_thresholds(values: &[f64], n_grid: usize) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let sorted = sorted_copy(values);
    let max = sorted[sorted.len() - 1];
    (1..=n_grid)
        .map(|k| quantile_sorted(&sorted, k as f64 / (n_grid + 1) as f64))
        .filter(|&threshold| threshold < max)
        .dedup()
        .collect()
}

/// Rows going left (`x <= threshold`) and right, in the order of `indices`.
fn partition(
    dataset: &Dataset,
    indices: &[usize],
    feature_id: usize,
    threshold: f64,
) -> (Vec<usize>, Vec<usize>) {
    let column = dataset.features.column(feature_id);
    indices.iter().partition(|&&i| column[i] <= threshold)
}

/// Search of the best split of one node.
pub(crate) struct SplitSearch<'a, L: LeafLearner> {
    dataset: &'a Dataset,
    learner: &'a L,
    params: &'a TreeParams,
    indices: &'a [usize],
    parent_impurity: f64,
}

impl<'a, L: LeafLearner> SplitSearch<'a, L> {
    pub fn new(
        dataset: &'a Dataset,
        learner: &'a L,
        params: &'a TreeParams,
        indices: &'a [usize],
        parent_impurity: f64,
    ) -> Self {
        SplitSearch {
            dataset,
            learner,
            params,
            indices,
            parent_impurity,
        }
    }

    fn thresholds(&self, feature_id: usize, n_grid: usize) -> Vec<f64> {
        let column = self.dataset.features.column(feature_id);
        let values: Vec<f64> = self.indices.iter().map(|&i| column[i]).collect();
        candidate_thresholds(&values, n_grid)
    }

    fn fit_child(&self, indices: &[usize], stage: SearchStage) -> FitResult<LeafFit> {
        let x = self.dataset.features.select_rows(indices);
        let target: Vec<f64> = indices.iter().map(|&i| self.dataset.target[i]).collect();
        self.learner.fit_leaf(&x, &target, self.params, stage)
    }

    /// Fit both children of a split. `None` if a side is too small.
    pub fn evaluate(
        &self,
        feature_id: usize,
        threshold: f64,
        stage: SearchStage,
    ) -> FitResult<Option<SplitCandidate>> {
        let (left_indices, right_indices) =
            partition(self.dataset, self.indices, feature_id, threshold);
        if left_indices.len() < self.params.min_samples_leaf
            || right_indices.len() < self.params.min_samples_leaf
        {
            return Ok(None);
        }

        let left = self.fit_child(&left_indices, stage)?;
        let right = self.fit_child(&right_indices, stage)?;
        let n_left = left_indices.len() as f64;
        let n_right = right_indices.len() as f64;
        let decrease = self.parent_impurity
            - (n_left * left.impurity + n_right * right.impurity) / (n_left + n_right);
        Ok(Some(SplitCandidate {
            feature_id,
            threshold,
            decrease,
            left_indices,
            right_indices,
            left,
            right,
        }))
    }

    /// Keep the `n_feature_search` features with the best decrease on the coarse grid.
    ///
    /// The result is sorted by feature index.
    pub fn screen(&self, features: Vec<usize>) -> FitResult<Vec<usize>> {
        if features.len() <= self.params.n_feature_search {
            return Ok(features);
        }

        let scores = features
            .par_iter()
            .map(|&feature_id| -> FitResult<Option<f64>> {
                let mut decreases = Vec::new();
                for threshold in self.thresholds(feature_id, self.params.n_screen_grid) {
                    if let Some(candidate) =
                        self.evaluate(feature_id, threshold, SearchStage::Screening)?
                    {
                        decreases.push(candidate.decrease);
                    }
                }
                Ok(decreases
                    .into_iter()
                    .filter(|decrease| decrease.is_finite())
                    .ord_subset_max())
            })
            .collect::<FitResult<Vec<_>>>()?;

        let mut ranked: Vec<(usize, f64)> = features
            .into_iter()
            .zip(scores)
            .filter_map(|(feature_id, score)| score.map(|score| (feature_id, score)))
            .collect();
        // Stable sort, the lowest index wins on ties
        ranked.sort_by_key(|&(_, score)| Reverse(OrderedFloat(score)));
        for (rank, (feature_id, score)) in ranked.iter().enumerate() {
            trace!("screening rank {}: feature {} decrease {:.6}", rank, feature_id, score);
        }

        let kept = ranked
            .into_iter()
            .take(self.params.n_feature_search)
            .map(|(feature_id, _)| feature_id)
            .sorted()
            .collect();
        Ok(kept)
    }

    /// Every candidate of the fine grid, by feature and then by threshold.
    pub fn search(&self, features: &[usize]) -> FitResult<Vec<SplitCandidate>> {
        let grid: Vec<(usize, f64)> = features
            .iter()
            .flat_map(|&feature_id| {
                self.thresholds(feature_id, self.params.n_split_grid)
                    .into_iter()
                    .map(move |threshold| (feature_id, threshold))
            })
            .collect();
        let candidates = grid
            .par_iter()
            .map(|&(feature_id, threshold)| self.evaluate(feature_id, threshold, SearchStage::Final))
            .collect::<FitResult<Vec<_>>>()?;
        Ok(candidates.into_iter().flatten().collect())
    }

    /// Best split of the node, or None if no split is good enough.
    pub fn best_split(&self) -> FitResult<Option<SplitCandidate>> {
        let features = self
            .params
            .candidate_features(self.dataset.n_features());
        let features = self.screen(features)?;

        let mut best: Option<SplitCandidate> = None;
        for candidate in self.search(&features)? {
            if !candidate.decrease.is_finite() {
                continue;
            }
            // Only a strictly better candidate replaces the current one
            if best
                .as_ref()
                .map_or(true, |best| candidate.decrease > best.decrease)
            {
                best = Some(candidate);
            }
        }

        match best {
            Some(best) if best.decrease >= self.params.min_impurity_decrease => Ok(Some(best)),
            _ => Ok(None),
        }
    }
}
