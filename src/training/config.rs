//! Model configuration

use serde::{Deserialize, Serialize};

/// Number of trees in the forest
pub const DEFAULT_N_ESTIMATORS: usize = 200;

/// Seed used when none is given
pub const DEFAULT_RANDOM_STATE: u64 = 42;

/// Strategy for the number of features examined at each split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Square root of n_features
    Sqrt,
    /// Log2 of n_features
    Log2,
    /// Fraction of n_features
    Fraction(f64),
    /// Fixed number
    Fixed(usize),
    /// All features
    All,
}

impl MaxFeatures {
    /// Resolve to a concrete count, at least 1 and at most `n_features`
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = match *self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2().ceil() as usize,
            MaxFeatures::Fraction(f) => (n_features as f64 * f).ceil() as usize,
            MaxFeatures::Fixed(n) => n,
            MaxFeatures::All => n_features,
        };
        n.clamp(1, n_features.max(1))
    }
}

/// Configuration of the yield regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Number of trees
    pub n_estimators: usize,

    /// Seed for bootstrap sampling and feature draws
    pub random_state: u64,

    /// Maximum depth per tree (None = grow until pure)
    pub max_depth: Option<usize>,

    /// Minimum samples to split a node
    pub min_samples_split: usize,

    /// Minimum samples in a leaf
    pub min_samples_leaf: usize,

    /// Features examined per split
    pub max_features: MaxFeatures,

    /// Bootstrap-sample rows for each tree
    pub bootstrap: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            random_state: DEFAULT_RANDOM_STATE,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
        }
    }
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set number of trees
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    /// Builder method to set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Builder method to set max depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }
}
