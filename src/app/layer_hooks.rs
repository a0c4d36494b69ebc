use std::sync::Arc;

use layerscope_domain::{ActingUser, AffectedTable, Layer, LayerNodeStyle};

use crate::layer_tables::affected_tables;
use crate::ports::{InvalidationSink, TableCatalog};
use crate::resolver::ResolveError;

#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// Sorted by schema then name.
    pub affected: Vec<AffectedTable>,
    pub node_style: Option<LayerNodeStyle>,
}

/// Lifecycle hooks the persistence layer runs around layer writes.
pub struct LayerHooks {
    catalog: Arc<dyn TableCatalog>,
    sink: Arc<dyn InvalidationSink>,
}

impl LayerHooks {
    pub fn new(catalog: Arc<dyn TableCatalog>, sink: Arc<dyn InvalidationSink>) -> Self {
        Self { catalog, sink }
    }

    /// Only data layers read user tables; base layers still notify the sink
    /// with an empty set so the maps holding them get refreshed.
    pub fn before_save(&self, layer: &Layer, user: &ActingUser) -> Result<SaveOutcome, ResolveError> {
        let affected = self.notify(layer, user)?;
        Ok(SaveOutcome {
            affected,
            node_style: layer.node_style(),
        })
    }

    pub fn before_destroy(&self, layer: &Layer, user: &ActingUser) -> Result<Vec<AffectedTable>, ResolveError> {
        self.notify(layer, user)
    }

    fn notify(&self, layer: &Layer, user: &ActingUser) -> Result<Vec<AffectedTable>, ResolveError> {
        let mut affected: Vec<AffectedTable> = if layer.is_data_layer() {
            affected_tables(layer, user, self.catalog.as_ref())?
                .into_iter()
                .collect()
        } else {
            user.validate()?;
            Vec::new()
        };
        affected.sort_by(|a, b| (&a.schema, &a.name).cmp(&(&b.schema, &b.name)));

        tracing::info!(
            kind = %layer.kind,
            tables = affected.len(),
            "layer change affects tables"
        );
        self.sink.tables_affected(layer, &affected);
        Ok(affected)
    }
}
