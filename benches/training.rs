use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use polars::prelude::*;
use pumpguard::inference::Predictor;
use pumpguard::preprocessing::{prepare_frame, PreparedData};
use pumpguard::sensor::SensorReading;
use pumpguard::training::{Trainer, TrainingConfig};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn random_readings(n_rows: usize, seed: u64) -> Vec<SensorReading> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n_rows)
        .map(|_| {
            SensorReading::new(
                rng.gen::<f64>() * 10.0,
                30.0 + rng.gen::<f64>() * 60.0,
                6.0 + rng.gen::<f64>() * 10.0,
            )
        })
        .collect()
}

fn create_sensor_data(n_rows: usize) -> PreparedData {
    let readings = random_readings(n_rows, 7);
    let df = df!(
        "vibration" => readings.iter().map(|r| r.vibration).collect::<Vec<_>>(),
        "temperature" => readings.iter().map(|r| r.temperature).collect::<Vec<_>>(),
        "current" => readings.iter().map(|r| r.current).collect::<Vec<_>>()
    )
    .unwrap();
    prepare_frame(&df).unwrap()
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10); // Fewer samples for training benchmarks

    for n_rows in [1000, 5000, 10000].iter() {
        let data = create_sensor_data(*n_rows);
        let trainer = Trainer::new(TrainingConfig::new().with_n_estimators(50));

        group.bench_with_input(BenchmarkId::new("fit", n_rows), &data, |b, data| {
            b.iter(|| trainer.fit(black_box(data)).unwrap())
        });
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    // Train model once
    let outcome = Trainer::default().fit(&create_sensor_data(5000)).unwrap();
    let predictor = Predictor::from_bundle(outcome.bundle).unwrap();

    group.bench_function("predict_one", |b| {
        let reading = SensorReading::new(7.5, 72.0, 12.5);
        b.iter(|| predictor.predict(black_box(&reading)).unwrap())
    });

    for n_rows in [100, 1000, 10000].iter() {
        let readings = random_readings(*n_rows, 11);

        group.bench_with_input(BenchmarkId::new("predict_batch", n_rows), &readings, |b, readings| {
            b.iter(|| predictor.predict_batch(black_box(readings)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_training, bench_prediction);
criterion_main!(benches);
