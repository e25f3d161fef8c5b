use beliefnet::{
    builders::{LayerBuilder, LayerConfig, LayerRegistry},
    layers::{AutoEncoder, NeuralNetwork},
    persistence::{restore_layer, save_layer, SnapshotFormat},
    BeliefError,
};
use ndarray::{array, Array2};
use tempfile::tempdir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn worker_batch(worker: usize) -> Array2<f64> {
    if worker % 2 == 0 {
        array![[1.0, 1.0, 0.0, 0.0], [1.0, 0.0, 0.0, 0.0]]
    } else {
        array![[0.0, 0.0, 1.0, 1.0], [0.0, 0.0, 0.0, 1.0]]
    }
}

#[test]
fn test_workers_merge_into_aggregate() {
    init_logging();
    let registry = LayerRegistry::default();
    let config = LayerConfig::new(4, 2);

    // Every worker starts from the same seeded parameters
    let mut aggregate = registry.build("autoencoder", config.clone()).unwrap();
    let mut workers: Vec<Box<dyn NeuralNetwork>> = (0..4)
        .map(|_| registry.build("autoencoder", config.clone()).unwrap())
        .collect();

    for (i, worker) in workers.iter_mut().enumerate() {
        worker.train(worker_batch(i), 0.2, None).unwrap();
    }

    // Running average over the workers: merging the k-th peer with weight 1/k
    for (k, worker) in workers.iter().enumerate() {
        aggregate.merge(worker.as_ref(), k + 1).unwrap();
    }

    let n = workers.len() as f64;
    let mut mean = Array2::<f64>::zeros((4, 2));
    for worker in &workers {
        mean = mean + worker.base().weights();
    }
    mean /= n;

    for (a, m) in aggregate.base().weights().iter().zip(mean.iter()) {
        assert!((a - m).abs() < 1e-12, "aggregate {} vs mean {}", a, m);
    }
}

#[test]
fn test_checkpoint_to_file_and_restore_by_kind() {
    init_logging();
    let dir = tempdir().unwrap();
    let path = dir.path().join("layer.bin");

    let mut layer: AutoEncoder = LayerBuilder::new()
        .n_visible(4)
        .n_hidden(3)
        .seed(21)
        .build()
        .unwrap();
    layer.train(worker_batch(0), 0.1, None).unwrap();
    layer.base_mut().regularize_weights(2, 0.1).unwrap();
    save_layer(&layer, &path, SnapshotFormat::Bincode).unwrap();

    let registry = LayerRegistry::with_defaults();
    let mut restored = registry.build_empty(layer.kind()).unwrap();
    restore_layer(restored.as_mut(), &path, SnapshotFormat::Bincode).unwrap();

    assert_eq!(restored.base().weights(), layer.base().weights());
    assert_eq!(restored.base().hidden_bias(), layer.base().hidden_bias());
    assert_eq!(restored.base().visible_bias(), layer.base().visible_bias());
    assert_eq!(restored.base().rng().seed(), 21);

    let batch = worker_batch(1);
    assert_eq!(
        restored.reconstruct(batch.view()).unwrap(),
        layer.reconstruct(batch.view()).unwrap()
    );
}

#[test]
fn test_restore_missing_file() {
    let dir = tempdir().unwrap();
    let mut layer = AutoEncoder::new(2, 2, None, None, None, None).unwrap();
    let before = layer.clone();

    let err = restore_layer(&mut layer, dir.path().join("missing.bin"), SnapshotFormat::Json).unwrap_err();
    assert!(matches!(err, BeliefError::IoError(_)));
    assert_eq!(layer, before);
}

#[test]
fn test_config_file_drives_construction() {
    init_logging();
    let dir = tempdir().unwrap();
    let path = dir.path().join("layer.json");
    std::fs::write(
        &path,
        r#"{
            "n_visible": 3,
            "n_hidden": 2,
            "rng": 9,
            "momentum": 0.3,
            "weight_init": { "Uniform": { "low": -0.5, "high": 0.5 } },
            "input": { "v": 1, "dim": [2, 3], "data": [1.0, 0.0, 1.0, 0.0, 1.0, 0.0] }
        }"#,
    )
    .unwrap();

    let config = LayerConfig::from_json_file(&path).unwrap();
    let layer = LayerRegistry::default().build("autoencoder", config).unwrap();

    assert_eq!(layer.base().rng().seed(), 9);
    assert_eq!(layer.base().momentum(), 0.3);
    assert!(layer.base().weights().iter().all(|&w| (-0.5..=0.5).contains(&w)));
    assert!(layer.loss().unwrap().is_finite());
}
