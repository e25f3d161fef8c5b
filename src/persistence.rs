//! Snapshots of layer state.
//!
//! A snapshot is an explicit, versioned record of everything needed to
//! rebuild a layer: dimensions, weights, both biases, hyperparameters and the
//! full state of its random source. The record is tagged with the concrete layer
//! kind so a snapshot of one layer type is never loaded into another.
//!
//! Writes encode the whole snapshot in memory before touching the sink, and
//! loads decode and validate everything before touching the target layer, so
//! a failed load leaves the layer unchanged.
//!
//! ```rust
//! use beliefnet::builders::LayerBuilder;
//! use beliefnet::layers::{AutoEncoder, BuildableLayer, NeuralNetwork};
//!
//! let layer: AutoEncoder = LayerBuilder::new().n_visible(4).n_hidden(2).build().unwrap();
//! let mut buffer = Vec::new();
//! layer.write(&mut buffer).unwrap();
//!
//! let mut restored = AutoEncoder::empty();
//! restored.load(&mut buffer.as_slice()).unwrap();
//! assert_eq!(restored.base().weights(), layer.base().weights());
//! ```

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use log::info;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{BeliefError, Result};
use crate::layers::{BaseLayer, LayerRng, NeuralNetwork};

/// Current snapshot schema version.
pub const FORMAT_VERSION: u32 = 1;

/// Encodings a snapshot can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotFormat {
    /// Compact binary encoding
    #[default]
    Bincode,
    /// Human-readable JSON, useful for debugging
    Json,
}

/// Parameter state of a layer, field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerState {
    pub n_visible: usize,
    pub n_hidden: usize,
    pub weights: Array2<f64>,
    pub hidden_bias: Array1<f64>,
    pub visible_bias: Array1<f64>,
    pub sparsity: f64,
    pub momentum: f64,
    pub l2: f64,
    pub rng: LayerRng,
}

/// Versioned, kind-tagged envelope around a [`LayerState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub format_version: u32,
    pub kind: String,
    pub state: LayerState,
}

impl LayerSnapshot {
    pub fn new(kind: &str, base: &BaseLayer) -> Self {
        LayerSnapshot {
            format_version: FORMAT_VERSION,
            kind: kind.to_string(),
            state: base.to_state(),
        }
    }

    pub fn capture(layer: &dyn NeuralNetwork) -> Self {
        Self::new(layer.kind(), layer.base())
    }

    pub fn encode(&self, format: SnapshotFormat) -> Result<Vec<u8>> {
        let bytes = match format {
            SnapshotFormat::Bincode => bincode::serialize(self)?,
            SnapshotFormat::Json => serde_json::to_vec(self)?,
        };
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8], format: SnapshotFormat) -> Result<Self> {
        let snapshot: LayerSnapshot = match format {
            SnapshotFormat::Bincode => bincode::deserialize(bytes)?,
            SnapshotFormat::Json => serde_json::from_slice(bytes)?,
        };

        if snapshot.format_version != FORMAT_VERSION {
            return Err(BeliefError::SerializationError(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.format_version, FORMAT_VERSION
            )));
        }
        Ok(snapshot)
    }

    /// Rebuild the base layer this snapshot describes.
    pub fn into_base(self) -> Result<BaseLayer> {
        BaseLayer::from_state(self.state)
    }
}

/// Encode the state of `base` (a layer of type `kind`) and write it to `sink`.
pub fn write_layer(
    kind: &str,
    base: &BaseLayer,
    sink: &mut dyn Write,
    format: SnapshotFormat,
) -> Result<()> {
    let bytes = LayerSnapshot::new(kind, base).encode(format)?;
    sink.write_all(&bytes)?;
    sink.flush()?;
    info!("wrote {} snapshot ({} bytes, {:?})", kind, bytes.len(), format);
    Ok(())
}

/// Read a snapshot from `source` and copy it into `base`.
///
/// The snapshot must carry the tag `kind`. `base` is only modified once the
/// whole snapshot has been read, decoded and validated.
pub fn load_layer(
    kind: &str,
    base: &mut BaseLayer,
    source: &mut dyn Read,
    format: SnapshotFormat,
) -> Result<()> {
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;

    let snapshot = LayerSnapshot::decode(&bytes, format)?;
    if snapshot.kind != kind {
        return Err(BeliefError::InvalidParameter {
            name: "kind".to_string(),
            reason: format!("snapshot holds a '{}' layer, not '{}'", snapshot.kind, kind),
        });
    }

    let restored = snapshot.into_base()?;
    base.update(&restored);
    info!(
        "loaded {} snapshot: visible={} hidden={}",
        kind,
        base.n_visible(),
        base.n_hidden()
    );
    Ok(())
}

/// Save a layer's snapshot to a file at `path`.
pub fn save_layer<P: AsRef<Path>>(layer: &dyn NeuralNetwork, path: P, format: SnapshotFormat) -> Result<()> {
    let mut file = fs::File::create(path)?;
    write_layer(layer.kind(), layer.base(), &mut file, format)
}

/// Load a layer's state from a snapshot file at `path`.
pub fn restore_layer<P: AsRef<Path>>(
    layer: &mut dyn NeuralNetwork,
    path: P,
    format: SnapshotFormat,
) -> Result<()> {
    let mut file = fs::File::open(path)?;
    let kind = layer.kind();
    load_layer(kind, layer.base_mut(), &mut file, format)
}
