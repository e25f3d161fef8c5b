use ndarray::{Array1, Array2, ArrayView2, Axis};

use super::base::BaseLayer;
use super::initialization::LayerRng;
use super::traits::{BuildableLayer, NeuralNetwork};
use crate::builders::LayerConfig;
use crate::error::{BeliefError, Result};

/// Tied-weight sigmoid autoencoder.
///
/// Encodes with `sigmoid(x . W + hidden_bias)` and decodes with
/// `sigmoid(h . W^T + visible_bias)`. Training takes one step along the
/// gradient of the reconstruction cross-entropy; inputs are used as given.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoEncoder {
    base: BaseLayer,
}

impl AutoEncoder {
    pub fn new(
        n_visible: usize,
        n_hidden: usize,
        weights: Option<Array2<f64>>,
        hidden_bias: Option<Array1<f64>>,
        visible_bias: Option<Array1<f64>>,
        rng: Option<LayerRng>,
    ) -> Result<Self> {
        Ok(AutoEncoder {
            base: BaseLayer::new(n_visible, n_hidden, weights, hidden_bias, visible_bias, rng)?,
        })
    }

    pub fn with_input(
        input: Array2<f64>,
        n_visible: usize,
        n_hidden: usize,
        weights: Option<Array2<f64>>,
        hidden_bias: Option<Array1<f64>>,
        visible_bias: Option<Array1<f64>>,
        rng: Option<LayerRng>,
    ) -> Result<Self> {
        Ok(AutoEncoder {
            base: BaseLayer::with_input(input, n_visible, n_hidden, weights, hidden_bias, visible_bias, rng)?,
        })
    }

    /// Hidden representation of `x`
    pub fn encode(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.base.propagate_up(x)
    }

    /// Visible reconstruction of hidden activations `h`
    pub fn decode(&self, h: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.base.propagate_down(h)
    }
}

impl NeuralNetwork for AutoEncoder {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn base(&self) -> &BaseLayer {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseLayer {
        &mut self.base
    }

    fn reconstruct(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        let hidden = self.encode(x)?;
        self.decode(hidden.view())
    }

    fn loss_function(&self, _params: Option<&[f64]>) -> Result<f64> {
        self.base.reconstruction_cross_entropy()
    }

    fn train(&mut self, input: Array2<f64>, learning_rate: f64, _params: Option<&[f64]>) -> Result<()> {
        if input.nrows() == 0 {
            return Err(BeliefError::PreconditionViolation(
                "input batch has no examples".to_string(),
            ));
        }
        self.base.set_input(input)?;

        let (weight_grad, hidden_grad, visible_grad) = {
            let x = self.base.input().ok_or_else(|| {
                BeliefError::PreconditionViolation("training input was not stored".to_string())
            })?;

            let hidden = self.base.propagate_up(x.view())?;
            let reconstruction = self.base.propagate_down(hidden.view())?;

            // Cross-entropy gradients w.r.t. the visible and hidden pre-activations
            let visible_delta = x - &reconstruction;
            let hidden_delta = visible_delta.dot(self.base.weights()) * &hidden * &hidden.mapv(|h| 1.0 - h);

            let batch = x.nrows() as f64;
            let weight_grad = (x.t().dot(&hidden_delta) + visible_delta.t().dot(&hidden)) / batch;
            let no_examples = || BeliefError::PreconditionViolation("input batch has no examples".to_string());
            let hidden_grad = hidden_delta.mean_axis(Axis(0)).ok_or_else(no_examples)?;
            let visible_grad = visible_delta.mean_axis(Axis(0)).ok_or_else(no_examples)?;
            (weight_grad, hidden_grad, visible_grad)
        };

        self.base.weights_mut().scaled_add(learning_rate, &weight_grad);
        self.base.hidden_bias_mut().scaled_add(learning_rate, &hidden_grad);
        self.base.visible_bias_mut().scaled_add(learning_rate, &visible_grad);
        Ok(())
    }
}

impl BuildableLayer for AutoEncoder {
    const KIND: &'static str = "autoencoder";

    fn from_config(config: LayerConfig) -> Result<Self> {
        Ok(AutoEncoder {
            base: BaseLayer::from_config(config)?,
        })
    }

    fn empty() -> Self {
        AutoEncoder {
            base: BaseLayer::empty(),
        }
    }
}
