pub mod datasource;
pub mod memory;
pub mod registry;

pub use datasource::{Datasource, DatasourceError, Feature, Parameters, Value};
pub use memory::MemoryDatasource;
pub use registry::{DatasourceFactory, DatasourceRegistry};
