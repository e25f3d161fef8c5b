//! # Activation Functions Module
//!
//! Element-wise nonlinearities used by the layer passes. Layers in a belief
//! network are built from logistic units, so the sigmoid is the only
//! activation the base layer needs.
//!
//! ## Usage Example
//!
//! ```rust
//! use beliefnet::activations::{sigmoid, sigmoid_batch};
//! use ndarray::array;
//!
//! assert_eq!(sigmoid(0.0), 0.5);
//!
//! let mut data = array![[0.0, 1.0], [-1.0, 2.0]];
//! sigmoid_batch(&mut data);
//! ```
//!
//! ## Numerical behaviour
//!
//! `sigmoid` saturates to exactly `0.0` or `1.0` for large-magnitude inputs.
//! Callers taking `ln` of the result (the reconstruction cross-entropy) will
//! then see `-inf`; nothing here clamps it.

pub mod functions;

pub use functions::{sigmoid, sigmoid_batch};
