//! Yield model assembly and fitting

use crate::dataset::schema::{CATEGORICAL_FEATURES, NUMERIC_FEATURES, TARGET_COLUMN};
use crate::dataset::{schema, TrainingDataset};
use crate::error::{CropYieldError, Result};
use crate::preprocessing::{ColumnTransformer, OneHotEncoder, StandardScaler, Transformer};
use super::config::ModelConfig;
use super::random_forest::RandomForest;
use chrono::{DateTime, Utc};
use ndarray::Array1;
use polars::prelude::*;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Unfitted preprocessing + regressor pair
#[derive(Debug)]
pub struct YieldPipeline {
    transformer: ColumnTransformer,
    forest: RandomForest,
}

/// Build the unfitted pipeline: one-hot over crop/region, standardization over the numeric
/// features, then the random forest.
pub fn build_model(config: &ModelConfig) -> YieldPipeline {
    let transformer = ColumnTransformer::new()
        .with_step(OneHotEncoder::new(CATEGORICAL_FEATURES))
        .with_step(StandardScaler::new(NUMERIC_FEATURES));

    YieldPipeline {
        transformer,
        forest: RandomForest::from_config(config),
    }
}

impl YieldPipeline {
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.transformer.step_names()
    }

    /// Fit the transformer stages and then the forest, consuming the pipeline
    pub fn fit(mut self, features: &DataFrame, target: &Array1<f64>) -> Result<TrainedModel> {
        let start = Instant::now();

        let x = self.transformer.fit_transform(features)?;
        debug!(rows = x.nrows(), columns = x.ncols(), "Transformed training matrix");

        self.forest.fit(&x, target)?;

        Ok(TrainedModel {
            feature_names: self.transformer.feature_names_out(),
            transformer: self.transformer,
            forest: self.forest,
            training_rows: x.nrows(),
            trained_at: Utc::now(),
            fit_duration: start.elapsed(),
        })
    }
}

/// Fitted transformer + forest, immutable once built
#[derive(Debug)]
pub struct TrainedModel {
    transformer: ColumnTransformer,
    forest: RandomForest,
    feature_names: Vec<String>,
    training_rows: usize,
    trained_at: DateTime<Utc>,
    fit_duration: Duration,
}

impl TrainedModel {
    /// Predict `yield_10kt` for every row of a frame carrying the feature columns
    pub fn predict_frame(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let x = self.transformer.transform(df)?;
        self.forest.predict(&x)
    }

    pub fn n_trees(&self) -> usize {
        self.forest.n_trees()
    }

    /// Names of the transformed feature columns, one-hot blocks first
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Impurity-based importances paired with their feature names
    pub fn feature_importances(&self) -> Vec<(String, f64)> {
        match self.forest.feature_importances() {
            Some(importances) => self
                .feature_names
                .iter()
                .cloned()
                .zip(importances.iter().copied())
                .collect(),
            None => Vec::new(),
        }
    }

    /// The `k` most important features, highest first
    pub fn top_features(&self, k: usize) -> Vec<(String, f64)> {
        let mut ranked = self.feature_importances();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);
        ranked
    }

    pub fn training_rows(&self) -> usize {
        self.training_rows
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn fit_duration(&self) -> Duration {
        self.fit_duration
    }
}

/// Fit a fresh pipeline on the cleaned dataset.
///
/// Every feature column and the target must be present; all missing names are reported
/// together.
pub fn train_model(dataset: &TrainingDataset, config: &ModelConfig) -> Result<TrainedModel> {
    let required: Vec<&str> = schema::feature_columns().chain([TARGET_COLUMN]).collect();
    let missing = dataset.missing_columns(required.iter().copied());
    if !missing.is_empty() {
        return Err(CropYieldError::SchemaError { missing });
    }

    if dataset.is_empty() {
        return Err(CropYieldError::EmptyDataset);
    }

    let frame = dataset.frame();
    let features = frame.select(schema::feature_columns())?;
    let target = target_values(frame)?;

    info!(
        rows = dataset.len(),
        n_estimators = config.n_estimators,
        random_state = config.random_state,
        "Training yield model"
    );

    let model = build_model(config).fit(&features, &target)?;

    info!(
        n_trees = model.n_trees(),
        n_features = model.feature_names().len(),
        elapsed_ms = model.fit_duration().as_millis() as u64,
        "Model trained"
    );

    Ok(model)
}

fn target_values(frame: &DataFrame) -> Result<Array1<f64>> {
    let series = frame
        .column(TARGET_COLUMN)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;

    series
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| CropYieldError::DataError(format!("missing target value at row {}", row)))
        })
        .collect::<Result<Vec<f64>>>()
        .map(Array1::from_vec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> TrainingDataset {
        let frame = df!(
            "作物" => &["小麦", "小麦", "玉米", "玉米", "水稻", "水稻"],
            "地区" => &["河南", "山东", "河南", "山东", "湖南", "湖南"],
            "年份" => &["2019", "2020", "2019", "2020", "2019", "2020"],
            "播种面积(千公顷)" => &["5600", "4000", "3800", "4100", "4000", "3950"],
            "产量(万吨)" => &["3700", "2560", "2250", "2600", "2600", "2640"],
            "平均价格(元/吨)" => &["2300", "2310", "2000", "2050", "2600", "2620"],
        )
        .unwrap();
        TrainingDataset::from_frame(frame).unwrap()
    }

    #[test]
    fn test_build_model_is_unfitted() {
        let pipeline = build_model(&ModelConfig::default());
        assert_eq!(pipeline.step_names(), vec!["one_hot", "standard_scaler"]);
        assert_eq!(pipeline.forest().n_estimators, 200);
        assert!(!pipeline.forest().is_fitted());
    }

    #[test]
    fn test_train_model_introspection() {
        let model = train_model(&dataset(), &ModelConfig::default().with_n_estimators(12)).unwrap();

        assert_eq!(model.n_trees(), 12);
        assert_eq!(model.training_rows(), 6);
        assert_eq!(
            model.feature_names(),
            &[
                "crop_小麦", "crop_水稻", "crop_玉米",
                "region_山东", "region_河南", "region_湖南",
                "year", "sown_area_kha", "avg_price_yuan_per_ton",
            ]
        );

        let total: f64 = model.feature_importances().iter().map(|(_, v)| v).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(model.top_features(3).len(), 3);
    }

    #[test]
    fn test_missing_columns_are_all_reported() {
        let frame = df!(
            "作物" => &["小麦"],
            "年份" => &["2020"],
            "播种面积(千公顷)" => &["10"],
        )
        .unwrap();
        let dataset = TrainingDataset::from_frame(frame).unwrap();

        match train_model(&dataset, &ModelConfig::default()) {
            Err(CropYieldError::SchemaError { missing }) => {
                assert_eq!(missing, vec!["region", "avg_price_yuan_per_ton", "yield_10kt"]);
            }
            other => panic!("expected SchemaError, got {:?}", other),
        }
    }

    #[test]
    fn test_retraining_gives_identical_predictions() {
        let data = dataset();
        let config = ModelConfig::default().with_n_estimators(20);
        let a = train_model(&data, &config).unwrap();
        let b = train_model(&data, &config).unwrap();

        let probe = data.frame().select(schema::feature_columns()).unwrap();
        assert_eq!(a.predict_frame(&probe).unwrap(), b.predict_frame(&probe).unwrap());
    }
}
