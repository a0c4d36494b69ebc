use std::collections::HashSet;

use layerscope_domain::{ActingUser, ActingUserError, AffectedTable, QualifiedTableName, UserTable};

use crate::ports::TableCatalog;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid acting user: {0}")]
    InvalidActingUser(#[from] ActingUserError),
}

/// Maps qualified names onto catalog tables the acting user can see.
pub struct TableResolver<'c> {
    catalog: &'c dyn TableCatalog,
}

impl<'c> TableResolver<'c> {
    pub fn new(catalog: &'c dyn TableCatalog) -> Self {
        Self { catalog }
    }

    /// Names that match no visible table are dropped: queries routinely read
    /// tables outside the platform (`pg_catalog`, PostGIS metadata).
    pub fn resolve(
        &self,
        names: &HashSet<QualifiedTableName>,
        user: &ActingUser,
    ) -> Result<HashSet<AffectedTable>, ResolveError> {
        user.validate()?;
        let own_schema = user.schema();

        let mut resolved = HashSet::new();
        for name in names {
            let schema = name.schema.as_ref().unwrap_or(&own_schema);
            let before = resolved.len();
            resolved.extend(
                self.catalog
                    .tables_in_schema(schema)
                    .iter()
                    .filter(|table| name.table.matches(&table.name) && is_visible(table, user))
                    .map(AffectedTable::from),
            );
            if resolved.len() == before {
                tracing::debug!(%name, "reference does not resolve to a visible table");
            }
        }

        Ok(resolved)
    }
}

/// Own tables are always visible; other users' tables only within a shared
/// organization.
pub fn is_visible(table: &UserTable, user: &ActingUser) -> bool {
    if table.owner.username == user.username {
        return true;
    }
    match (&table.owner.organization, &user.organization) {
        (Some(table_org), Some(user_org)) => table_org == user_org,
        _ => false,
    }
}
