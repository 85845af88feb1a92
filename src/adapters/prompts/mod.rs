//! Tool prompt source adapters.
//!
//! - `InMemoryToolPromptSource` - Fixed list, for tests and built-in catalogs
//! - `YamlToolCatalog` - Tool definitions in a YAML file

mod in_memory;
mod yaml_catalog;

pub use in_memory::InMemoryToolPromptSource;
pub use yaml_catalog::YamlToolCatalog;
