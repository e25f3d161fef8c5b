use std::collections::BTreeMap;
use std::fmt;

use log::debug;

use super::layers::LayerConfig;
use crate::error::{BeliefError, Result};
use crate::layers::{AutoEncoder, BuildableLayer, NeuralNetwork};

type BuildFn = Box<dyn Fn(LayerConfig) -> Result<Box<dyn NeuralNetwork>> + Send + Sync>;
type EmptyFn = Box<dyn Fn() -> Box<dyn NeuralNetwork> + Send + Sync>;

struct Factory {
    build: BuildFn,
    empty: EmptyFn,
}

/// Maps layer type tags to construction closures.
///
/// Lets callers build layers whose concrete type is only known at runtime,
/// e.g. from a configuration file or a snapshot's kind tag.
pub struct LayerRegistry {
    factories: BTreeMap<String, Factory>,
}

impl LayerRegistry {
    /// Registry with no layer types
    pub fn new() -> Self {
        LayerRegistry {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with every layer type shipped by this crate
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register::<AutoEncoder>();
        registry
    }

    /// Register `L` under [`BuildableLayer::KIND`]
    pub fn register<L: BuildableLayer>(&mut self) -> &mut Self {
        self.register_with(
            L::KIND,
            |config| Ok(Box::new(L::from_config(config)?) as Box<dyn NeuralNetwork>),
            || Box::new(L::empty()) as Box<dyn NeuralNetwork>,
        )
    }

    /// Register custom closures under `kind`, replacing any previous entry
    pub fn register_with<B, E>(&mut self, kind: impl Into<String>, build: B, empty: E) -> &mut Self
    where
        B: Fn(LayerConfig) -> Result<Box<dyn NeuralNetwork>> + Send + Sync + 'static,
        E: Fn() -> Box<dyn NeuralNetwork> + Send + Sync + 'static,
    {
        let kind = kind.into();
        debug!("registering layer kind '{}'", kind);
        self.factories.insert(
            kind,
            Factory {
                build: Box::new(build),
                empty: Box::new(empty),
            },
        );
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered tags in sorted order
    pub fn kinds(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    fn factory(&self, kind: &str) -> Result<&Factory> {
        self.factories.get(kind).ok_or_else(|| {
            BeliefError::construction_failed(kind, BeliefError::UnknownLayerKind(kind.to_string()))
        })
    }

    /// Build the layer registered under `kind` from `config`
    pub fn build(&self, kind: &str, config: LayerConfig) -> Result<Box<dyn NeuralNetwork>> {
        let factory = self.factory(kind)?;
        (factory.build)(config).map_err(|err| BeliefError::construction_failed(kind, err))
    }

    /// Unconfigured layer registered under `kind`
    pub fn build_empty(&self, kind: &str) -> Result<Box<dyn NeuralNetwork>> {
        let factory = self.factory(kind)?;
        Ok((factory.empty)())
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for LayerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
