pub mod layers;
pub mod registry;

pub use layers::{LayerBuilder, LayerConfig, DEFAULT_BUILDER_L2};
pub use registry::LayerRegistry;
