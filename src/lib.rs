//! # beliefnet - Trainable base layer for layered probabilistic networks
//!
//! beliefnet provides the shared building block of deep belief networks and
//! stacked autoencoders: a single layer with a visible and a hidden side, its
//! parameters, and the operations every layer variant needs regardless of how
//! it is trained.
//!
//! ## Key Features
//!
//! - **Parameter store**: weights, hidden and visible biases, sparsity, momentum and L2
//! - **Fan-in initialization**: uniform weights in `[-1/n_visible, 1/n_visible]` from a seeded generator
//! - **Reconstruction cross-entropy**: one up-down sigmoid pass scored against the input
//! - **Regularization and merge**: in-place weight shrinkage and batch-weighted averaging of peer layers
//! - **Generic construction**: one builder and a type-tag registry for every layer type
//! - **Snapshots**: versioned, kind-tagged persistence in bincode or JSON
//!
//! ## Quick Start
//!
//! ```rust
//! use beliefnet::builders::LayerBuilder;
//! use beliefnet::layers::{AutoEncoder, NeuralNetwork};
//! use ndarray::array;
//!
//! let mut layer: AutoEncoder = LayerBuilder::new()
//!     .n_visible(3)
//!     .n_hidden(2)
//!     .build()
//!     .unwrap();
//!
//! let batch = array![[1.0, 0.0, 1.0], [0.0, 1.0, 0.0]];
//! layer.train(batch, 0.1, None).unwrap();
//! let loss = layer.loss().unwrap();
//! assert!(loss.is_finite());
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Sigmoid nonlinearity
//! - [`builders`] - Layer builder, configuration and registry
//! - [`error`] - Error types and result handling
//! - [`layers`] - Base layer, layer contract and concrete layers
//! - [`persistence`] - Layer snapshots
//!
//! ## Thread safety
//!
//! Layers are `Send + Sync` but carry no internal locks. An orchestrator that
//! trains one layer per worker and merges them afterwards owns the
//! synchronization.

pub mod activations;
pub mod builders;
pub mod error;
pub mod layers;
pub mod persistence;

pub use error::{BeliefError, Result};

#[cfg(test)]
mod tests;
