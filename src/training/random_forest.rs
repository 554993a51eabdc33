//! Random forest regressor

use crate::error::{CropYieldError, Result};
use super::config::{MaxFeatures, ModelConfig};
use super::decision_tree::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Bagged ensemble of regression trees, prediction is the mean over trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Individual trees, in build order
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features examined per split
    pub max_features: MaxFeatures,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random state
    pub random_state: u64,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
    /// Number of features
    n_features: usize,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::from_config(&ModelConfig::default())
    }
}

impl RandomForest {
    /// Create an unfitted forest
    pub fn new(n_estimators: usize) -> Self {
        Self::from_config(&ModelConfig::default().with_n_estimators(n_estimators))
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators: config.n_estimators,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
            max_features: config.max_features,
            bootstrap: config.bootstrap,
            random_state: config.random_state,
            feature_importances: None,
            n_features: 0,
        }
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Set max features strategy
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Fit the forest to training data
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
            return Err(CropYieldError::TrainingError("cannot fit a forest on zero samples".to_string()));
        }

        if self.n_estimators == 0 {
            return Err(CropYieldError::TrainingError("n_estimators must be at least 1".to_string()));
        }

        self.n_features = n_features;
        let max_features = self.max_features.resolve(n_features);
        let base_seed = self.random_state;

        // Each tree owns its seed, so the result does not depend on thread scheduling
        let trees: Vec<DecisionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| -> Result<DecisionTree> {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(tree_idx as u64));

                let sample_indices: Vec<usize> = if self.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };

                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot = y.select(Axis(0), &sample_indices);

                let mut tree = DecisionTree::new()
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf)
                    .with_max_features(max_features)
                    .with_random_state(rng.next_u64());
                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }

                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = trees;
        self.compute_feature_importances();

        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        if self.trees.is_empty() {
            return;
        }

        let mut total_importances = Array1::<f64>::zeros(self.n_features);
        for imp in self.trees.iter().filter_map(|t| t.feature_importances()) {
            total_importances += imp;
        }
        total_importances /= self.trees.len() as f64;

        // Normalize
        let total = total_importances.sum();
        if total > 0.0 {
            total_importances /= total;
        }

        self.feature_importances = Some(total_importances);
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(CropYieldError::ModelNotFitted);
        }

        let all_predictions = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<Array1<f64>>>>()?;

        // Summed in tree order so repeated calls agree bit for bit
        let mut sum = Array1::<f64>::zeros(x.nrows());
        for preds in &all_predictions {
            sum += preds;
        }

        Ok(sum / all_predictions.len() as f64)
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Get number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}
