use std::fs;
use std::path::{Path, PathBuf};

use layerscope_app::ports::TableCatalog;
use layerscope_domain::{Identifier, UserTable};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {message}")]
    ReadError { path: PathBuf, message: String },
    #[error("invalid catalog {path}: {message}")]
    InvalidFormat { path: PathBuf, message: String },
}

/// Catalog snapshot stored as a JSON array of tables.
#[derive(Debug, Clone, Default)]
pub struct JsonTableCatalog {
    tables: Vec<UserTable>,
}

impl JsonTableCatalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|e| CatalogError::ReadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let tables: Vec<UserTable> =
            serde_json::from_str(&content).map_err(|e| CatalogError::InvalidFormat {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        tracing::debug!(path = %path.display(), tables = tables.len(), "loaded table catalog");
        Ok(Self { tables })
    }

    pub fn tables(&self) -> &[UserTable] {
        &self.tables
    }
}

impl TableCatalog for JsonTableCatalog {
    fn tables_in_schema(&self, schema: &Identifier) -> Vec<UserTable> {
        self.tables
            .iter()
            .filter(|table| schema.matches(&table.owner.username))
            .cloned()
            .collect()
    }
}
