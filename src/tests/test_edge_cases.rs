use ndarray::{arr2, Array2};
use crate::error::BeliefError;
use crate::layers::BaseLayer;

fn saturated_layer() -> BaseLayer {
    // Hidden unit sits at 0.5 for a zero input, which drives the visible
    // pre-activation to 500 and the reconstruction to exactly 1.0
    BaseLayer::new(1, 1, Some(arr2(&[[1000.0]])), None, None, None).unwrap()
}

#[test]
fn test_log_of_zero_propagates_infinity() {
    let mut layer = saturated_layer();
    layer.set_input(arr2(&[[0.0]])).unwrap();

    let loss = layer.reconstruction_cross_entropy().unwrap();
    assert!(loss.is_infinite() && loss > 0.0, "expected +inf, got {}", loss);
}

#[test]
fn test_zero_times_log_zero_is_nan() {
    let mut layer = saturated_layer();
    layer.set_input(arr2(&[[1.0]])).unwrap();

    let loss = layer.reconstruction_cross_entropy().unwrap();
    assert!(loss.is_nan());
}

#[test]
fn test_empty_batch_loss() {
    let mut layer = BaseLayer::new(3, 2, None, None, None, None).unwrap();
    layer.set_input(Array2::zeros((0, 3))).unwrap();
    assert!(matches!(
        layer.reconstruction_cross_entropy(),
        Err(BeliefError::PreconditionViolation(_))
    ));
}

#[test]
fn test_regularize_with_large_batch() {
    let mut layer = BaseLayer::new(1, 1, Some(arr2(&[[-1.0]])), None, None, None).unwrap();
    layer.regularize_weights(usize::MAX, 0.1).unwrap();
    // The batch term vanishes, leaving min(w, w * l2)
    assert!((layer.weights()[[0, 0]] + 1.0).abs() < 1e-12);
}

#[test]
fn test_error_display() {
    let err = BeliefError::construction_failed("rbm", BeliefError::UnknownLayerKind("rbm".to_string()));
    assert_eq!(
        err.to_string(),
        "Failed to construct layer 'rbm': Unknown layer kind 'rbm'"
    );
    assert!(std::error::Error::source(&err).is_some());

    let io: BeliefError = std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
    assert!(matches!(io, BeliefError::IoError(ref msg) if msg.contains("disk full")));
}
