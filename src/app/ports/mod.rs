pub mod invalidation_sink;
pub mod table_catalog;

pub use invalidation_sink::InvalidationSink;
pub use table_catalog::TableCatalog;

#[cfg(test)]
pub use invalidation_sink::MockInvalidationSink;
#[cfg(test)]
pub use table_catalog::MockTableCatalog;
