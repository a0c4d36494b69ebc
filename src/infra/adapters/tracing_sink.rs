use layerscope_app::ports::InvalidationSink;
use layerscope_domain::{AffectedTable, Layer};

/// Reports invalidations to the log instead of a cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingInvalidationSink;

impl InvalidationSink for TracingInvalidationSink {
    fn tables_affected(&self, layer: &Layer, tables: &[AffectedTable]) {
        let names: Vec<String> = tables
            .iter()
            .map(|t| t.qualified_name().to_string())
            .collect();
        tracing::info!(
            layer = ?layer.id,
            kind = %layer.kind,
            tables = ?names,
            "invalidate maps using tables"
        );
    }
}
