use layerscope_domain::{AffectedTable, Layer};

/// Receives the tables whose cached rendering state a layer change touches.
#[cfg_attr(test, mockall::automock)]
pub trait InvalidationSink: Send + Sync {
    fn tables_affected(&self, layer: &Layer, tables: &[AffectedTable]);
}
