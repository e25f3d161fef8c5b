use log::{debug, warn};
use ndarray::{Array1, Array2, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis, ErrorKind, ShapeError, Zip};

use super::initialization::{LayerRng, WeightInit};
use crate::activations::sigmoid_batch;
use crate::builders::LayerConfig;
use crate::error::{BeliefError, Result};
use crate::persistence::LayerState;

/// Default sparsity target of a freshly constructed layer.
pub const DEFAULT_SPARSITY: f64 = 0.01;
/// Default momentum of a freshly constructed layer.
pub const DEFAULT_MOMENTUM: f64 = 0.1;
/// Default L2 regularization constant of a freshly constructed layer.
pub const DEFAULT_L2: f64 = 0.1;

/// Shared state of a single trainable layer in a layered probabilistic network.
///
/// Holds a `[n_visible x n_hidden]` weight matrix, one bias per hidden and per
/// visible unit, the hyperparameters used by regularization, a deterministic
/// random source and, while training, the current input batch.
///
/// Concrete layers (see [`crate::layers::NeuralNetwork`]) embed a `BaseLayer`
/// and implement their own training on top of the utilities here.
///
/// A `BaseLayer` has no internal locking. Every mutating operation takes
/// `&mut self`; sharing one instance between threads needs external
/// synchronization.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseLayer {
    n_visible: usize,
    n_hidden: usize,
    weights: Array2<f64>,
    hidden_bias: Array1<f64>,
    visible_bias: Array1<f64>,
    rng: LayerRng,
    input: Option<Array2<f64>>,
    sparsity: f64,
    momentum: f64,
    l2: f64,
}

impl BaseLayer {
    /// Create a new layer.
    ///
    /// * `weights` - used verbatim when given, otherwise drawn with [`WeightInit::FanIn`].
    /// * `hidden_bias` / `visible_bias` - zeros when absent; must match the unit counts.
    /// * `rng` - defaults to a generator seeded with [`crate::layers::DEFAULT_SEED`].
    ///
    /// Nothing is built when any argument is rejected.
    pub fn new(
        n_visible: usize,
        n_hidden: usize,
        weights: Option<Array2<f64>>,
        hidden_bias: Option<Array1<f64>>,
        visible_bias: Option<Array1<f64>>,
        rng: Option<LayerRng>,
    ) -> Result<Self> {
        Self::with_init(n_visible, n_hidden, weights, hidden_bias, visible_bias, rng, WeightInit::FanIn)
    }

    /// Same as [`BaseLayer::new`] with a selectable initialization policy for
    /// the case where no weights are supplied.
    pub fn with_init(
        n_visible: usize,
        n_hidden: usize,
        weights: Option<Array2<f64>>,
        hidden_bias: Option<Array1<f64>>,
        visible_bias: Option<Array1<f64>>,
        rng: Option<LayerRng>,
        init: WeightInit,
    ) -> Result<Self> {
        if n_visible == 0 || n_hidden == 0 {
            return Err(BeliefError::InvalidParameter {
                name: "size".to_string(),
                reason: format!(
                    "Layer sizes must be greater than 0 (visible {}, hidden {})",
                    n_visible, n_hidden
                ),
            });
        }

        let hidden_bias = match hidden_bias {
            None => Array1::zeros(n_hidden),
            Some(bias) if bias.len() != n_hidden => {
                return Err(BeliefError::DimensionMismatch {
                    expected: format!("hidden bias of length {}", n_hidden),
                    actual: format!("length {}", bias.len()),
                });
            }
            Some(bias) => bias,
        };

        let visible_bias = match visible_bias {
            None => Array1::zeros(n_visible),
            Some(bias) if bias.len() != n_visible => {
                return Err(BeliefError::DimensionMismatch {
                    expected: format!("visible bias of length {}", n_visible),
                    actual: format!("length {}", bias.len()),
                });
            }
            Some(bias) => bias,
        };

        if let Some(weights) = &weights {
            if weights.dim() != (n_visible, n_hidden) {
                return Err(BeliefError::DimensionMismatch {
                    expected: format!("weights of shape {:?}", (n_visible, n_hidden)),
                    actual: format!("{:?}", weights.dim()),
                });
            }
        }

        let mut rng = rng.unwrap_or_default();
        let weights = match weights {
            Some(weights) => weights,
            None => init.initialize_weights((n_visible, n_hidden), &mut rng)?,
        };

        debug!(
            "created layer: visible={} hidden={} seed={}",
            n_visible,
            n_hidden,
            rng.seed()
        );

        Ok(BaseLayer {
            n_visible,
            n_hidden,
            weights,
            hidden_bias,
            visible_bias,
            rng,
            input: None,
            sparsity: DEFAULT_SPARSITY,
            momentum: DEFAULT_MOMENTUM,
            l2: DEFAULT_L2,
        })
    }

    /// Create a layer that already holds a training batch.
    pub fn with_input(
        input: Array2<f64>,
        n_visible: usize,
        n_hidden: usize,
        weights: Option<Array2<f64>>,
        hidden_bias: Option<Array1<f64>>,
        visible_bias: Option<Array1<f64>>,
        rng: Option<LayerRng>,
    ) -> Result<Self> {
        let mut layer = Self::new(n_visible, n_hidden, weights, hidden_bias, visible_bias, rng)?;
        layer.set_input(input)?;
        Ok(layer)
    }

    /// Build from a builder configuration.
    ///
    /// Without an input batch the layer keeps its own default hyperparameters.
    /// With an input batch the configured sparsity, l2 and momentum are
    /// assigned after construction.
    pub fn from_config(config: LayerConfig) -> Result<Self> {
        let LayerConfig {
            n_visible,
            n_hidden,
            weights,
            hidden_bias,
            visible_bias,
            rng,
            input,
            sparsity,
            l2,
            momentum,
            weight_init,
        } = config;

        match input {
            None => Self::with_init(
                n_visible,
                n_hidden,
                weights,
                hidden_bias,
                visible_bias,
                Some(rng),
                weight_init,
            ),
            Some(input) => {
                let mut layer = Self::with_init(
                    n_visible,
                    n_hidden,
                    weights,
                    hidden_bias,
                    visible_bias,
                    Some(rng),
                    weight_init,
                )?;
                layer.set_input(input)?;
                layer.sparsity = sparsity;
                layer.l2 = l2;
                layer.momentum = momentum;
                Ok(layer)
            }
        }
    }

    /// Placeholder with no units, meant to be filled by [`BaseLayer::update`]
    /// or by loading a snapshot.
    pub fn empty() -> Self {
        BaseLayer {
            n_visible: 0,
            n_hidden: 0,
            weights: Array2::zeros((0, 0)),
            hidden_bias: Array1::zeros(0),
            visible_bias: Array1::zeros(0),
            rng: LayerRng::default(),
            input: None,
            sparsity: DEFAULT_SPARSITY,
            momentum: DEFAULT_MOMENTUM,
            l2: DEFAULT_L2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.n_visible == 0 && self.n_hidden == 0
    }

    pub fn n_visible(&self) -> usize {
        self.n_visible
    }

    pub fn n_hidden(&self) -> usize {
        self.n_hidden
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    /// Mutable view of the weights. Values may change, the shape may not.
    pub fn weights_mut(&mut self) -> ArrayViewMut2<'_, f64> {
        self.weights.view_mut()
    }

    pub fn set_weights(&mut self, weights: Array2<f64>) -> Result<()> {
        if weights.dim() != self.weights.dim() {
            return Err(BeliefError::dimension_mismatch(
                format!("{:?}", self.weights.dim()),
                format!("{:?}", weights.dim()),
            ));
        }
        self.weights = weights;
        Ok(())
    }

    pub fn hidden_bias(&self) -> &Array1<f64> {
        &self.hidden_bias
    }

    pub fn hidden_bias_mut(&mut self) -> ArrayViewMut1<'_, f64> {
        self.hidden_bias.view_mut()
    }

    pub fn set_hidden_bias(&mut self, bias: Array1<f64>) -> Result<()> {
        if bias.len() != self.n_hidden {
            return Err(BeliefError::dimension_mismatch(
                format!("hidden bias of length {}", self.n_hidden),
                format!("length {}", bias.len()),
            ));
        }
        self.hidden_bias = bias;
        Ok(())
    }

    pub fn visible_bias(&self) -> &Array1<f64> {
        &self.visible_bias
    }

    pub fn visible_bias_mut(&mut self) -> ArrayViewMut1<'_, f64> {
        self.visible_bias.view_mut()
    }

    pub fn set_visible_bias(&mut self, bias: Array1<f64>) -> Result<()> {
        if bias.len() != self.n_visible {
            return Err(BeliefError::dimension_mismatch(
                format!("visible bias of length {}", self.n_visible),
                format!("length {}", bias.len()),
            ));
        }
        self.visible_bias = bias;
        Ok(())
    }

    /// Replace weights and both biases at once, resizing the layer.
    ///
    /// The unit counts are taken from `weights`. A stored input batch that no
    /// longer fits the new visible count is dropped.
    pub fn set_parameters(
        &mut self,
        weights: Array2<f64>,
        hidden_bias: Array1<f64>,
        visible_bias: Array1<f64>,
    ) -> Result<()> {
        let (n_visible, n_hidden) = weights.dim();
        if n_visible == 0 || n_hidden == 0 {
            return Err(BeliefError::invalid_parameter(
                "weights",
                "weight matrix must have at least one row and one column",
            ));
        }
        if hidden_bias.len() != n_hidden || visible_bias.len() != n_visible {
            return Err(BeliefError::DimensionMismatch {
                expected: format!("biases of length ({}, {})", n_hidden, n_visible),
                actual: format!("({}, {})", hidden_bias.len(), visible_bias.len()),
            });
        }

        self.n_visible = n_visible;
        self.n_hidden = n_hidden;
        self.weights = weights;
        self.hidden_bias = hidden_bias;
        self.visible_bias = visible_bias;
        self.drop_stale_input();
        Ok(())
    }

    pub fn input(&self) -> Option<&Array2<f64>> {
        self.input.as_ref()
    }

    /// Replace the current training batch. The batch must have one column per
    /// visible unit.
    pub fn set_input(&mut self, input: Array2<f64>) -> Result<()> {
        if input.ncols() != self.n_visible {
            return Err(BeliefError::DimensionMismatch {
                expected: format!("input with {} columns", self.n_visible),
                actual: format!("{} columns", input.ncols()),
            });
        }
        self.input = Some(input);
        Ok(())
    }

    pub fn clear_input(&mut self) -> Option<Array2<f64>> {
        self.input.take()
    }

    pub fn rng(&self) -> &LayerRng {
        &self.rng
    }

    pub fn rng_mut(&mut self) -> &mut LayerRng {
        &mut self.rng
    }

    pub fn set_rng(&mut self, rng: LayerRng) {
        self.rng = rng;
    }

    pub fn sparsity(&self) -> f64 {
        self.sparsity
    }

    pub fn set_sparsity(&mut self, sparsity: f64) {
        self.sparsity = sparsity;
    }

    pub fn momentum(&self) -> f64 {
        self.momentum
    }

    pub fn set_momentum(&mut self, momentum: f64) {
        self.momentum = momentum;
    }

    pub fn l2(&self) -> f64 {
        self.l2
    }

    pub fn set_l2(&mut self, l2: f64) {
        self.l2 = l2;
    }

    /// Overwrite every parameter, hyperparameter, dimension and the random
    /// source with those of `other`. This is a copy, not a merge.
    pub fn update(&mut self, other: &BaseLayer) {
        self.n_visible = other.n_visible;
        self.n_hidden = other.n_hidden;
        self.weights = other.weights.clone();
        self.hidden_bias = other.hidden_bias.clone();
        self.visible_bias = other.visible_bias.clone();
        self.rng = other.rng.clone();
        self.sparsity = other.sparsity;
        self.momentum = other.momentum;
        self.l2 = other.l2;
        self.drop_stale_input();
        debug!(
            "updated layer from peer: visible={} hidden={}",
            self.n_visible, self.n_hidden
        );
    }

    fn drop_stale_input(&mut self) {
        if matches!(&self.input, Some(input) if input.ncols() != self.n_visible) {
            self.input = None;
        }
    }

    /// Hidden activations `sigmoid(x . W + hidden_bias)`.
    pub fn propagate_up(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_visible {
            return Err(BeliefError::DimensionMismatch {
                expected: format!("{} visible columns", self.n_visible),
                actual: format!("{} columns", x.ncols()),
            });
        }
        let mut hidden = x.dot(&self.weights) + &self.hidden_bias;
        sigmoid_batch(&mut hidden);
        Ok(hidden)
    }

    /// Visible reconstruction `sigmoid(h . W^T + visible_bias)`.
    pub fn propagate_down(&self, h: ArrayView2<f64>) -> Result<Array2<f64>> {
        if h.ncols() != self.n_hidden {
            return Err(BeliefError::DimensionMismatch {
                expected: format!("{} hidden columns", self.n_hidden),
                actual: format!("{} columns", h.ncols()),
            });
        }
        let mut visible = h.dot(&self.weights.t()) + &self.visible_bias;
        sigmoid_batch(&mut visible);
        Ok(visible)
    }

    /// Reconstruction cross-entropy of the current input batch.
    ///
    /// Runs one up-down sigmoid pass and returns the negative mean, over
    /// examples, of the summed per-feature binary cross-entropy.
    ///
    /// Fails with [`BeliefError::PreconditionViolation`] when no input is set.
    /// Probabilities are not clamped: a reconstruction of exactly 0 or 1 where
    /// the input disagrees yields an infinite or NaN loss.
    pub fn reconstruction_cross_entropy(&self) -> Result<f64> {
        let input = self.input.as_ref().ok_or_else(|| {
            BeliefError::PreconditionViolation(
                "no input set; call set_input before evaluating the reconstruction loss".to_string(),
            )
        })?;

        let hidden = self.propagate_up(input.view())?;
        let visible = self.propagate_down(hidden.view())?;

        let inner = Zip::from(input)
            .and(&visible)
            .map_collect(|&x, &v| x * v.ln() + (1.0 - x) * (1.0 - v).ln());

        let loss = -inner.sum_axis(Axis(1)).mean().ok_or_else(|| {
            BeliefError::PreconditionViolation("input batch has no examples".to_string())
        })?;

        if !loss.is_finite() {
            warn!("reconstruction cross-entropy is not finite: {}", loss);
        }
        Ok(loss)
    }

    /// Element-wise shrinkage of the weights:
    /// `W <- (W / batch_size) * (1 - momentum) + min(W, W * l2)`.
    ///
    /// `_learning_rate` is accepted for signature compatibility with callers
    /// that pass their current rate; it does not enter the computation.
    pub fn regularize_weights(&mut self, batch_size: usize, _learning_rate: f64) -> Result<()> {
        if batch_size < 1 {
            return Err(BeliefError::invalid_parameter(
                "batch_size",
                "Batch size must be at least 1",
            ));
        }

        let batch_size = batch_size as f64;
        let decay = 1.0 - self.momentum;
        let l2 = self.l2;
        self.weights
            .mapv_inplace(|w| w / batch_size * decay + w.min(w * l2));

        debug!("regularized weights: batch_size={} momentum={} l2={}", batch_size, self.momentum, l2);
        Ok(())
    }

    /// Move this layer's parameters towards `other`'s by `1 / batch_size` of
    /// the difference: `P <- P + (P_other - P) / batch_size` for the weights
    /// and both biases.
    ///
    /// Shapes are compared before anything is written; a mismatch is reported
    /// as ndarray's incompatible-shape error and leaves this layer untouched.
    pub fn merge(&mut self, other: &BaseLayer, batch_size: usize) -> Result<()> {
        if batch_size == 0 {
            return Err(BeliefError::invalid_parameter(
                "batch_size",
                "Batch size must be at least 1",
            ));
        }

        ensure_same_shape("weights", self.weights.shape(), other.weights.shape())?;
        ensure_same_shape("hidden bias", self.hidden_bias.shape(), other.hidden_bias.shape())?;
        ensure_same_shape("visible bias", self.visible_bias.shape(), other.visible_bias.shape())?;

        let n = batch_size as f64;
        Zip::from(&mut self.weights)
            .and(&other.weights)
            .for_each(|p, &o| *p += (o - *p) / n);
        Zip::from(&mut self.hidden_bias)
            .and(&other.hidden_bias)
            .for_each(|p, &o| *p += (o - *p) / n);
        Zip::from(&mut self.visible_bias)
            .and(&other.visible_bias)
            .for_each(|p, &o| *p += (o - *p) / n);

        debug!("merged peer layer: batch_size={}", batch_size);
        Ok(())
    }

    pub(crate) fn to_state(&self) -> LayerState {
        LayerState {
            n_visible: self.n_visible,
            n_hidden: self.n_hidden,
            weights: self.weights.clone(),
            hidden_bias: self.hidden_bias.clone(),
            visible_bias: self.visible_bias.clone(),
            sparsity: self.sparsity,
            momentum: self.momentum,
            l2: self.l2,
            rng: self.rng.clone(),
        }
    }

    /// Rebuild a layer from a decoded snapshot. A snapshot with no units at
    /// all restores an empty placeholder; a snapshot with units on only one
    /// side is rejected.
    pub(crate) fn from_state(state: LayerState) -> Result<Self> {
        let LayerState {
            n_visible,
            n_hidden,
            weights,
            hidden_bias,
            visible_bias,
            sparsity,
            momentum,
            l2,
            rng,
        } = state;

        if (n_visible == 0) != (n_hidden == 0) {
            return Err(BeliefError::InvalidParameter {
                name: "size".to_string(),
                reason: format!(
                    "snapshot has {} visible and {} hidden units; both must be 0 or both positive",
                    n_visible, n_hidden
                ),
            });
        }

        if weights.dim() != (n_visible, n_hidden)
            || hidden_bias.len() != n_hidden
            || visible_bias.len() != n_visible
        {
            return Err(BeliefError::DimensionMismatch {
                expected: format!("parameters for a {}x{} layer", n_visible, n_hidden),
                actual: format!(
                    "weights {:?}, hidden bias {}, visible bias {}",
                    weights.dim(),
                    hidden_bias.len(),
                    visible_bias.len()
                ),
            });
        }

        Ok(BaseLayer {
            n_visible,
            n_hidden,
            weights,
            hidden_bias,
            visible_bias,
            rng,
            input: None,
            sparsity,
            momentum,
            l2,
        })
    }
}

impl Default for BaseLayer {
    fn default() -> Self {
        Self::empty()
    }
}

fn ensure_same_shape(what: &str, ours: &[usize], theirs: &[usize]) -> Result<()> {
    if ours != theirs {
        let err = ShapeError::from_kind(ErrorKind::IncompatibleShape);
        return Err(BeliefError::Shape(format!(
            "{} for {}: {:?} vs {:?}",
            err, what, ours, theirs
        )));
    }
    Ok(())
}
