use layerscope_domain::{Identifier, UserTable};

/// Read-only view of the platform's table registry.
#[cfg_attr(test, mockall::automock)]
pub trait TableCatalog: Send + Sync {
    /// Tables owned by the user whose schema is `schema`. Implementations
    /// match the schema with [`Identifier::matches`].
    fn tables_in_schema(&self, schema: &Identifier) -> Vec<UserTable>;
}
