use std::fmt;

use serde::{Deserialize, Serialize};

use super::identifier::Identifier;

/// A `schema.table` reference. `schema` is only ever `None` between reading a
/// reference out of SQL and qualifying it for the acting user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedTableName {
    pub schema: Option<Identifier>,
    pub table: Identifier,
}

impl QualifiedTableName {
    pub fn new(schema: Identifier, table: Identifier) -> Self {
        Self {
            schema: Some(schema),
            table,
        }
    }

    pub fn unqualified(table: Identifier) -> Self {
        Self {
            schema: None,
            table,
        }
    }

    /// Fills in `default_schema` when no schema was written.
    pub fn qualify(self, default_schema: &Identifier) -> Self {
        Self {
            schema: Some(self.schema.unwrap_or_else(|| default_schema.clone())),
            table: self.table,
        }
    }
}

impl fmt::Display for QualifiedTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.table),
            None => write!(f, "{}", self.table),
        }
    }
}
