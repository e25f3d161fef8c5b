use std::io::{Read, Write};

use ndarray::{Array2, ArrayView2};

use super::base::BaseLayer;
use crate::builders::LayerConfig;
use crate::error::Result;
use crate::persistence::{self, SnapshotFormat};

/// Trait implemented by every concrete layer of a layered network.
///
/// Implementors own a [`BaseLayer`] and supply the three variant-specific
/// operations. Everything else (loss evaluation, regularization, merging,
/// persistence) is shared through the base.
pub trait NeuralNetwork: Send + Sync {
    /// Type tag used by the registry and written into snapshots
    fn kind(&self) -> &'static str;

    /// Shared parameter state
    fn base(&self) -> &BaseLayer;

    /// Mutable shared parameter state
    fn base_mut(&mut self) -> &mut BaseLayer;

    /// Reconstruct `x` through the layer
    fn reconstruct(&self, x: ArrayView2<f64>) -> Result<Array2<f64>>;

    /// Loss of the layer on its current input; `params` carries
    /// variant-specific extras
    fn loss_function(&self, params: Option<&[f64]>) -> Result<f64>;

    /// Train one iteration on `input`
    fn train(&mut self, input: Array2<f64>, learning_rate: f64, params: Option<&[f64]>) -> Result<()>;

    fn loss(&self) -> Result<f64> {
        self.loss_function(None)
    }

    /// Batch-weighted average of this layer's parameters with `other`'s
    fn merge(&mut self, other: &dyn NeuralNetwork, batch_size: usize) -> Result<()> {
        self.base_mut().merge(other.base(), batch_size)
    }

    /// Copy all parameters of `other` into this layer
    fn update_from(&mut self, other: &dyn NeuralNetwork) {
        self.base_mut().update(other.base());
    }

    /// Write a bincode snapshot of this layer to `sink`
    fn write(&self, sink: &mut dyn Write) -> Result<()> {
        persistence::write_layer(self.kind(), self.base(), sink, SnapshotFormat::Bincode)
    }

    /// Replace this layer's state with a bincode snapshot read from `source`
    fn load(&mut self, source: &mut dyn Read) -> Result<()> {
        let kind = self.kind();
        persistence::load_layer(kind, self.base_mut(), source, SnapshotFormat::Bincode)
    }
}

/// A layer the generic builder and registry know how to construct.
pub trait BuildableLayer: NeuralNetwork + Sized + 'static {
    /// Registry tag for this layer type
    const KIND: &'static str;

    /// Build from a configuration; implementors delegate to
    /// [`BaseLayer::from_config`]
    fn from_config(config: LayerConfig) -> Result<Self>;

    /// Unconfigured instance to be filled by `update_from` or `load`
    fn empty() -> Self;
}
