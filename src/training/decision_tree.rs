//! Regression tree implementation

use crate::error::{CropYieldError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf {
        value: f64,
        n_samples: usize,
    },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Best split found for one node
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Running sums used to evaluate squared-error impurity without revisiting samples
#[derive(Debug, Clone, Copy, Default)]
struct Moments {
    count: usize,
    sum: f64,
    sq_sum: f64,
}

impl Moments {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        values.fold(Self::default(), |m, v| m.push(v))
    }

    fn push(self, v: f64) -> Self {
        Self {
            count: self.count + 1,
            sum: self.sum + v,
            sq_sum: self.sq_sum + v * v,
        }
    }

    fn minus(self, other: Self) -> Self {
        Self {
            count: self.count - other.count,
            sum: self.sum - other.sum,
            sq_sum: self.sq_sum - other.sq_sum,
        }
    }

    fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.sum / self.count as f64 }
    }

    /// Var = E[X²] - E[X]²
    fn variance(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let n = self.count as f64;
        (self.sq_sum / n - (self.sum / n).powi(2)).max(0.0)
    }
}

/// Regression tree minimizing squared error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Tree root
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Maximum features to consider per split
    pub max_features: Option<usize>,
    /// Seed for the per-split feature draw
    pub random_state: Option<u64>,
    /// Number of features
    n_features: usize,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            random_state: None,
            n_features: 0,
            feature_importances: None,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(CropYieldError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        if n_samples == 0 {
            return Err(CropYieldError::TrainingError("cannot fit a tree on zero samples".to_string()));
        }

        self.n_features = n_features;
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state.unwrap_or(0));
        let mut importances = vec![0.0; n_features];

        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, y, &indices, 0, &mut importances, &mut rng));

        // Normalize feature importances
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let node = Moments::of(indices.iter().map(|&i| y[i]));
        let impurity = node.variance();

        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || indices.iter().all(|&i| y[i] == y[indices[0]]);

        if should_stop {
            return TreeNode::Leaf { value: node.mean(), n_samples };
        }

        let features = self.candidate_features(rng);
        let Some(split) = self.find_best_split(x, y, indices, &features, impurity) else {
            return TreeNode::Leaf { value: node.mean(), n_samples };
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, split.feature_idx]] <= split.threshold);

        // A NaN threshold sends every row one way
        if left_indices.is_empty() || right_indices.is_empty() {
            return TreeNode::Leaf { value: node.mean(), n_samples };
        }

        importances[split.feature_idx] += n_samples as f64 * split.gain;

        let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1, importances, rng));
        let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1, importances, rng));

        TreeNode::Split {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            left,
            right,
            n_samples,
            impurity,
        }
    }

    /// Features examined at one node, in ascending index order
    fn candidate_features(&self, rng: &mut ChaCha8Rng) -> Vec<usize> {
        match self.max_features {
            Some(k) if k < self.n_features => {
                let mut drawn = index::sample(rng, self.n_features, k.max(1)).into_vec();
                drawn.sort_unstable();
                drawn
            }
            _ => (0..self.n_features).collect(),
        }
    }

    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        features: &[usize],
        parent_impurity: f64,
    ) -> Option<SplitCandidate> {
        // Each feature is scanned independently; the fold keeps the earliest feature on ties
        let per_feature: Vec<Option<SplitCandidate>> = features
            .par_iter()
            .map(|&feature_idx| self.best_split_for_feature(x, y, indices, feature_idx, parent_impurity))
            .collect();

        per_feature
            .into_iter()
            .flatten()
            .fold(None, |best: Option<SplitCandidate>, candidate| match best {
                Some(b) if b.gain >= candidate.gain => Some(b),
                _ => Some(candidate),
            })
    }

    /// Sorted sweep over one feature using prefix sums of the target
    fn best_split_for_feature(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        feature_idx: usize,
        parent_impurity: f64,
    ) -> Option<SplitCandidate> {
        let mut pairs: Vec<(f64, f64)> = indices.iter().map(|&i| (x[[i, feature_idx]], y[i])).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = pairs.len();
        let total = Moments::of(pairs.iter().map(|p| p.1));
        let mut left = Moments::default();
        let mut best: Option<SplitCandidate> = None;

        for k in 0..n.saturating_sub(1) {
            left = left.push(pairs[k].1);
            let (current, next) = (pairs[k].0, pairs[k + 1].0);
            if current == next {
                continue;
            }

            let right = total.minus(left);
            if left.count < self.min_samples_leaf || right.count < self.min_samples_leaf {
                continue;
            }

            let weighted = (left.count as f64 * left.variance() + right.count as f64 * right.variance()) / n as f64;
            let gain = parent_impurity - weighted;

            if gain > best.map_or(0.0, |b| b.gain) {
                let mut threshold = (current + next) / 2.0;
                if threshold >= next {
                    threshold = current;
                }
                best = Some(SplitCandidate { feature_idx, threshold, gain });
            }
        }

        best
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(CropYieldError::ModelNotFitted)?;

        if x.ncols() != self.n_features {
            return Err(CropYieldError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok(x.rows().into_iter().map(|row| Self::predict_sample(root, row)).collect())
    }

    fn predict_sample(mut node: &TreeNode, sample: ArrayView1<f64>) -> f64 {
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                    node = if sample[*feature_idx] <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Get tree depth
    pub fn get_depth(&self) -> usize {
        self.root.as_ref().map_or(0, Self::node_depth)
    }

    fn node_depth(node: &TreeNode) -> usize {
        match node {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => 1 + Self::node_depth(left).max(Self::node_depth(right)),
        }
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, Self::count_leaves)
    }

    fn count_leaves(node: &TreeNode) -> usize {
        match node {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => Self::count_leaves(left) + Self::count_leaves(right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_regressor_fits_training_points() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        let predictions = tree.predict(&x).unwrap();
        for (p, a) in predictions.iter().zip(y.iter()) {
            assert!((p - a).abs() < 1e-9, "{} vs {}", p, a);
        }
        assert_eq!(tree.get_n_leaves(), 5);
    }

    #[test]
    fn test_threshold_is_midpoint() {
        let x = array![[0.0], [0.0], [10.0], [10.0]];
        let y = array![1.0, 1.0, 5.0, 5.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        match tree.root.as_ref().unwrap() {
            TreeNode::Split { threshold, .. } => assert_eq!(*threshold, 5.0),
            other => panic!("expected a split, got {:?}", other),
        }
        assert_eq!(tree.predict(&array![[4.9], [5.1]]).unwrap().to_vec(), vec![1.0, 5.0]);
    }

    #[test]
    fn test_max_depth() {
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]];
        let y = array![0.0, 1.0, 2.0, 3.0];

        let mut tree = DecisionTree::new().with_max_depth(1);
        tree.fit(&x, &y).unwrap();

        assert!(tree.get_depth() <= 2);
    }

    #[test]
    fn test_min_samples_leaf() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![0.0, 0.0, 0.0, 9.0];

        let mut tree = DecisionTree::new().with_min_samples_leaf(2);
        tree.fit(&x, &y).unwrap();

        // the lone outlier cannot be isolated
        assert_eq!(tree.predict(&array![[4.0]]).unwrap()[0], 4.5);
    }

    #[test]
    fn test_feature_importances() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]];
        let y = array![1.0, 2.0, 3.0, 4.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        let importances = tree.feature_importances().unwrap();
        assert_eq!(importances[0], 1.0);
        assert_eq!(importances[1], 0.0);
    }

    #[test]
    fn test_predict_checks_width() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let y = array![1.0, 2.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        assert!(matches!(tree.predict(&array![[1.0]]), Err(CropYieldError::ShapeError { .. })));
    }

    #[test]
    fn test_non_finite_feature_becomes_leaf() {
        let x = array![[f64::NEG_INFINITY], [f64::NEG_INFINITY], [f64::NEG_INFINITY], [f64::NAN]];
        let y = array![1.0, 1.0, 1.0, 100.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.get_n_leaves(), 1);
        assert_eq!(tree.predict(&array![[0.0]]).unwrap()[0], 25.75);
    }

    #[test]
    fn test_predict_before_fit() {
        let tree = DecisionTree::new();
        assert!(matches!(tree.predict(&array![[1.0]]), Err(CropYieldError::ModelNotFitted)));
    }
}
