//! # Layers Module
//!
//! The base layer shared by every trainable layer of a layered probabilistic
//! network, the contract concrete layers implement, and the weight
//! initialization policies.
//!
//! - [`BaseLayer`] - parameters, hyperparameters, loss, regularization, merge
//! - [`NeuralNetwork`] - `reconstruct` / `loss_function` / `train` contract
//! - [`BuildableLayer`] - hook used by the builder and the registry
//! - [`AutoEncoder`] - tied-weight sigmoid autoencoder
//! - [`WeightInit`], [`LayerRng`] - initialization

pub mod autoencoder;
pub mod base;
pub mod initialization;
pub mod traits;

pub use autoencoder::AutoEncoder;
pub use base::{BaseLayer, DEFAULT_L2, DEFAULT_MOMENTUM, DEFAULT_SPARSITY};
pub use initialization::{LayerRng, WeightInit, DEFAULT_SEED};
pub use traits::{BuildableLayer, NeuralNetwork};
