use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cropyield::dataset::TrainingDataset;
use cropyield::inference::{predict, PredictionRequest};
use cropyield::training::{train_model, ModelConfig};
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const CROPS: [&str; 5] = ["wheat", "corn", "rice", "soybean", "cotton"];
const REGIONS: [&str; 8] = ["henan", "shandong", "heilongjiang", "jiangsu", "hunan", "xinjiang", "hebei", "anhui"];

fn create_yield_data(n_rows: usize) -> TrainingDataset {
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let crops: Vec<&str> = (0..n_rows).map(|_| CROPS[rng.gen_range(0..CROPS.len())]).collect();
    let regions: Vec<&str> = (0..n_rows).map(|_| REGIONS[rng.gen_range(0..REGIONS.len())]).collect();
    let years: Vec<i64> = (0..n_rows).map(|_| rng.gen_range(2000..2023)).collect();
    let areas: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(10.0..6000.0)).collect();
    let prices: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(1800.0..16000.0)).collect();
    let yields: Vec<f64> = areas
        .iter()
        .zip(&years)
        .map(|(a, y)| a * (0.5 + 0.01 * (*y - 2000) as f64) + rng.gen::<f64>() * 50.0)
        .collect();

    let frame = df!(
        "crop" => crops,
        "region" => regions,
        "year" => years,
        "sown_area_kha" => areas,
        "avg_price_yuan_per_ton" => prices,
        "yield_10kt" => yields,
    )
    .unwrap();

    TrainingDataset::from_frame(frame).unwrap()
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10);

    for n_rows in [250, 1000, 4000].iter() {
        let dataset = create_yield_data(*n_rows);
        let config = ModelConfig::default().with_n_estimators(50);

        group.bench_with_input(BenchmarkId::new("fit", n_rows), &dataset, |b, dataset| {
            b.iter(|| train_model(black_box(dataset), &config).unwrap())
        });
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    let dataset = create_yield_data(1000);
    let model = train_model(&dataset, &ModelConfig::default()).unwrap();
    let request = PredictionRequest {
        crop: "wheat".to_string(),
        region: "henan".to_string(),
        year: 2021,
        sown_area_kha: 5600.0,
        avg_price_yuan_per_ton: 2400.0,
    };

    group.bench_function("single_row", |b| {
        b.iter(|| predict(&model, black_box(&request)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_training, bench_prediction);
criterion_main!(benches);
