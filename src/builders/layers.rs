use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::registry::LayerRegistry;
use crate::error::{BeliefError, Result};
use crate::layers::{
    BuildableLayer, LayerRng, NeuralNetwork, WeightInit, DEFAULT_MOMENTUM, DEFAULT_SPARSITY,
};

/// L2 constant the builder applies when it builds a layer with training data.
pub const DEFAULT_BUILDER_L2: f64 = 0.01;

/// Everything needed to construct a layer.
///
/// Can be assembled with [`LayerBuilder`] or read from JSON; missing fields
/// take their defaults. In JSON the random source is written as its seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub n_visible: usize,
    pub n_hidden: usize,
    pub weights: Option<Array2<f64>>,
    pub hidden_bias: Option<Array1<f64>>,
    pub visible_bias: Option<Array1<f64>>,
    #[serde(with = "seed_only")]
    pub rng: LayerRng,
    pub input: Option<Array2<f64>>,
    pub sparsity: f64,
    pub l2: f64,
    pub momentum: f64,
    pub weight_init: WeightInit,
}

impl LayerConfig {
    pub fn new(n_visible: usize, n_hidden: usize) -> Self {
        LayerConfig {
            n_visible,
            n_hidden,
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

mod seed_only {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::layers::LayerRng;

    pub fn serialize<S: Serializer>(rng: &LayerRng, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(rng.seed())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LayerRng, D::Error> {
        u64::deserialize(deserializer).map(LayerRng::seeded)
    }
}

impl Default for LayerConfig {
    fn default() -> Self {
        LayerConfig {
            n_visible: 0,
            n_hidden: 0,
            weights: None,
            hidden_bias: None,
            visible_bias: None,
            rng: LayerRng::default(),
            input: None,
            sparsity: DEFAULT_SPARSITY,
            l2: DEFAULT_BUILDER_L2,
            momentum: DEFAULT_MOMENTUM,
            weight_init: WeightInit::FanIn,
        }
    }
}

/// Fluent builder shared by every layer type.
///
/// ```rust
/// use beliefnet::builders::LayerBuilder;
/// use beliefnet::layers::{AutoEncoder, NeuralNetwork};
///
/// let layer: AutoEncoder = LayerBuilder::new()
///     .n_visible(6)
///     .n_hidden(3)
///     .seed(42)
///     .build()
///     .unwrap();
/// assert_eq!(layer.base().weights().dim(), (6, 3));
/// ```
pub struct LayerBuilder {
    n_visible: Option<usize>,
    n_hidden: Option<usize>,
    config: LayerConfig,
}

impl LayerBuilder {
    /// Create a new layer builder
    pub fn new() -> Self {
        LayerBuilder {
            n_visible: None,
            n_hidden: None,
            config: LayerConfig::default(),
        }
    }

    /// Set the number of visible units
    pub fn n_visible(mut self, n: usize) -> Self {
        self.n_visible = Some(n);
        self
    }

    /// Set the number of hidden units
    pub fn n_hidden(mut self, n: usize) -> Self {
        self.n_hidden = Some(n);
        self
    }

    pub fn weights(mut self, weights: Array2<f64>) -> Self {
        self.config.weights = Some(weights);
        self
    }

    pub fn hidden_bias(mut self, bias: Array1<f64>) -> Self {
        self.config.hidden_bias = Some(bias);
        self
    }

    pub fn visible_bias(mut self, bias: Array1<f64>) -> Self {
        self.config.visible_bias = Some(bias);
        self
    }

    pub fn rng(mut self, rng: LayerRng) -> Self {
        self.config.rng = rng;
        self
    }

    /// Shorthand for `rng(LayerRng::seeded(seed))`
    pub fn seed(self, seed: u64) -> Self {
        self.rng(LayerRng::seeded(seed))
    }

    /// Supply training data; switches to the with-input construction path
    pub fn input(mut self, input: Array2<f64>) -> Self {
        self.config.input = Some(input);
        self
    }

    pub fn sparsity(mut self, sparsity: f64) -> Self {
        self.config.sparsity = sparsity;
        self
    }

    pub fn l2(mut self, l2: f64) -> Self {
        self.config.l2 = l2;
        self
    }

    pub fn momentum(mut self, momentum: f64) -> Self {
        self.config.momentum = momentum;
        self
    }

    pub fn weight_init(mut self, init: WeightInit) -> Self {
        self.config.weight_init = init;
        self
    }

    /// Finish configuration without building
    pub fn into_config(self) -> Result<LayerConfig> {
        let n_visible = self.n_visible.ok_or_else(|| BeliefError::InvalidParameter {
            name: "n_visible".to_string(),
            reason: "Number of visible units not specified".to_string(),
        })?;

        let n_hidden = self.n_hidden.ok_or_else(|| BeliefError::InvalidParameter {
            name: "n_hidden".to_string(),
            reason: "Number of hidden units not specified".to_string(),
        })?;

        Ok(LayerConfig {
            n_visible,
            n_hidden,
            ..self.config
        })
    }

    /// Build a layer of type `L`
    pub fn build<L: BuildableLayer>(self) -> Result<L> {
        let config = self.into_config()?;
        L::from_config(config).map_err(|err| BeliefError::construction_failed(L::KIND, err))
    }

    /// Build the layer registered under `kind`
    pub fn build_kind(self, registry: &LayerRegistry, kind: &str) -> Result<Box<dyn NeuralNetwork>> {
        let config = self.into_config()?;
        registry.build(kind, config)
    }

    /// Unconfigured layer of type `L`, ignoring everything set on the builder
    pub fn build_empty<L: BuildableLayer>(self) -> L {
        L::empty()
    }
}

impl Default for LayerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
