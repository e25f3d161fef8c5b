use ndarray::Array2;

/// Logistic function `1 / (1 + e^(-x))`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Apply the logistic function to a batch in-place.
pub fn sigmoid_batch(inputs: &mut Array2<f64>) {
    inputs.mapv_inplace(sigmoid);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sigmoid_midpoint_and_symmetry() {
        assert_eq!(sigmoid(0.0), 0.5);
        let x = 1.7;
        assert!((sigmoid(x) + sigmoid(-x) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sigmoid_saturates_without_clamping() {
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(-1000.0), 0.0);
    }

    #[test]
    fn test_batch_helpers() {
        let mut data = array![[0.0, 0.0], [0.0, 0.0]];
        sigmoid_batch(&mut data);
        assert!(data.iter().all(|&v| v == 0.5));
    }
}
