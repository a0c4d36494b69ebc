use std::sync::Mutex;

use layerscope_domain::{AffectedTable, Identifier, Layer, UserTable};

use crate::ports::{InvalidationSink, TableCatalog};

/// Catalog backed by a fixed list of tables.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    tables: Vec<UserTable>,
}

impl StaticCatalog {
    pub fn new(tables: Vec<UserTable>) -> Self {
        Self { tables }
    }
}

impl TableCatalog for StaticCatalog {
    fn tables_in_schema(&self, schema: &Identifier) -> Vec<UserTable> {
        self.tables
            .iter()
            .filter(|t| schema.matches(&t.owner.username))
            .cloned()
            .collect()
    }
}

/// Sink that records every notification for later inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<(Layer, Vec<AffectedTable>)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<(Layer, Vec<AffectedTable>)> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }
}

impl InvalidationSink for RecordingSink {
    fn tables_affected(&self, layer: &Layer, tables: &[AffectedTable]) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push((layer.clone(), tables.to_vec()));
        }
    }
}
