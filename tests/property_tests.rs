#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;
    use beliefnet::layers::{BaseLayer, LayerRng};
    use beliefnet::BeliefError;
    use ndarray::{Array1, Array2};

    // Strategy for generating valid layer sizes
    fn layer_size_strategy() -> impl Strategy<Value = (usize, usize)> {
        (1usize..=40, 1usize..=40)
    }

    // Strategy for generating weight matrices of a given shape
    fn weight_matrix_strategy(rows: usize, cols: usize) -> impl Strategy<Value = Array2<f64>> {
        prop::collection::vec(-10.0f64..10.0, rows * cols)
            .prop_map(move |v| Array2::from_shape_vec((rows, cols), v).unwrap())
    }

    proptest! {
        #[test]
        fn test_fan_in_initialization_bounds((visible, hidden) in layer_size_strategy(), seed in any::<u64>()) {
            let layer = BaseLayer::new(visible, hidden, None, None, None, Some(LayerRng::seeded(seed))).unwrap();
            let a = 1.0 / visible as f64;

            prop_assert_eq!(layer.weights().dim(), (visible, hidden));
            for &w in layer.weights().iter() {
                prop_assert!(w >= -a && w <= a, "weight {} outside fan-in bound {}", w, a);
            }
        }

        #[test]
        fn test_same_seed_same_weights((visible, hidden) in layer_size_strategy(), seed in any::<u64>()) {
            let a = BaseLayer::new(visible, hidden, None, None, None, Some(LayerRng::seeded(seed))).unwrap();
            let b = BaseLayer::new(visible, hidden, None, None, None, Some(LayerRng::seeded(seed))).unwrap();
            for (x, y) in a.weights().iter().zip(b.weights().iter()) {
                prop_assert_eq!(x.to_bits(), y.to_bits());
            }
        }

        #[test]
        fn test_wrong_hidden_bias_rejected(hidden in 1usize..20, offset in 1usize..5) {
            let bias = Array1::zeros(hidden + offset);
            let result = BaseLayer::new(4, hidden, None, Some(bias), None, None);
            let is_dimension_mismatch = matches!(result, Err(BeliefError::DimensionMismatch { .. }));
            prop_assert!(is_dimension_mismatch);
        }

        #[test]
        fn test_merge_moves_towards_peer(
            ours in weight_matrix_strategy(3, 2),
            theirs in weight_matrix_strategy(3, 2),
            batch_size in 1usize..50,
        ) {
            let mut a = BaseLayer::new(3, 2, Some(ours.clone()), None, None, None).unwrap();
            let b = BaseLayer::new(3, 2, Some(theirs.clone()), None, None, None).unwrap();
            a.merge(&b, batch_size).unwrap();

            let n = batch_size as f64;
            for ((merged, o), t) in a.weights().iter().zip(ours.iter()).zip(theirs.iter()) {
                let expected = o + (t - o) / n;
                prop_assert!((merged - expected).abs() < 1e-12);
                // The merged value lies between the two inputs
                prop_assert!(*merged >= o.min(*t) - 1e-12 && *merged <= o.max(*t) + 1e-12);
            }
        }

        #[test]
        fn test_regularize_matches_formula(
            weights in weight_matrix_strategy(2, 3),
            batch_size in 1usize..64,
            momentum in 0.0f64..1.0,
            l2 in 0.0f64..1.0,
        ) {
            let mut layer = BaseLayer::new(2, 3, Some(weights.clone()), None, None, None).unwrap();
            layer.set_momentum(momentum);
            layer.set_l2(l2);
            layer.regularize_weights(batch_size, 0.1).unwrap();

            let n = batch_size as f64;
            for (got, w) in layer.weights().iter().zip(weights.iter()) {
                let expected = w / n * (1.0 - momentum) + w.min(w * l2);
                prop_assert!((got - expected).abs() < 1e-12);
            }
        }

        #[test]
        fn test_loss_is_finite_and_repeatable(
            rows in 1usize..8,
            bits in prop::collection::vec(any::<bool>(), 8 * 5),
            seed in any::<u64>(),
        ) {
            let data: Vec<f64> = bits.iter().take(rows * 5).map(|&b| if b { 1.0 } else { 0.0 }).collect();
            let input = Array2::from_shape_vec((rows, 5), data).unwrap();
            let mut layer = BaseLayer::new(5, 3, None, None, None, Some(LayerRng::seeded(seed))).unwrap();
            layer.set_input(input).unwrap();

            let first = layer.reconstruction_cross_entropy().unwrap();
            let second = layer.reconstruction_cross_entropy().unwrap();
            prop_assert!(first.is_finite() && first >= 0.0);
            prop_assert_eq!(first.to_bits(), second.to_bits());
        }
    }
}
