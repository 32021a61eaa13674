use crate::datasource::{Datasource, DatasourceError, Parameters};
use crate::memory::MemoryDatasource;
use std::collections::BTreeMap;
use std::fmt;

/// Builds a datasource from document parameters.
pub type DatasourceFactory =
    Box<dyn Fn(&Parameters) -> Result<Box<dyn Datasource>, DatasourceError> + Send + Sync>;

/// Maps the `type` parameter of a datasource to the factory that builds it.
///
/// The registry is an ordinary value owned by the caller; there is no
/// process-wide plugin table.
#[derive(Default)]
pub struct DatasourceRegistry {
    factories: BTreeMap<String, DatasourceFactory>,
}

impl DatasourceRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `memory` datasource.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(MemoryDatasource::TYPE, |params| {
            Ok(Box::new(MemoryDatasource::from_params(params)?) as Box<dyn Datasource>)
        });
        registry
    }

    /// Registers a factory, replacing any previous one for `type_name`.
    pub fn register<F>(&mut self, type_name: &str, factory: F)
    where
        F: Fn(&Parameters) -> Result<Box<dyn Datasource>, DatasourceError> + Send + Sync + 'static,
    {
        self.factories
            .insert(type_name.to_string(), Box::new(factory));
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    pub fn plugin_names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Creates a datasource for `params` using its `type` entry.
    pub fn create(&self, params: &Parameters) -> Result<Box<dyn Datasource>, DatasourceError> {
        let type_name = params.get("type").ok_or(DatasourceError::MissingType)?;
        let factory = self
            .factories
            .get(type_name)
            .ok_or_else(|| DatasourceError::UnknownType(type_name.clone()))?;
        factory(params)
    }
}

impl fmt::Debug for DatasourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasourceRegistry")
            .field("plugins", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
