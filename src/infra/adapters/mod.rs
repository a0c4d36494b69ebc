pub mod json_catalog;
pub mod layer_file;
pub mod tracing_sink;

pub use json_catalog::{CatalogError, JsonTableCatalog};
pub use layer_file::{LayerFileError, load_layer, save_layer};
pub use tracing_sink::TracingInvalidationSink;
