use std::collections::HashSet;

use layerscope_domain::{ActingUser, AffectedTable, Identifier, Layer, QualifiedTableName};

use crate::ports::TableCatalog;
use crate::renamer::{RenameOutcome, TableRename, TableRenamer};
use crate::resolver::{ResolveError, TableResolver};
use crate::table_refs::TableReferenceExtractor;

/// Qualified names a layer reads: every `FROM`/`JOIN` source of its query
/// plus its explicit `table_name` option.
pub fn affected_table_names(layer: &Layer, user: &ActingUser) -> HashSet<QualifiedTableName> {
    let mut names = layer
        .query()
        .map(|query| TableReferenceExtractor::new().extract_from_sql(query, user))
        .unwrap_or_default();

    if let Some(table_name) = layer.table_name().filter(|name| !name.trim().is_empty()) {
        names.insert(
            QualifiedTableName::unqualified(Identifier::from_raw(table_name)).qualify(&user.schema()),
        );
    }

    names
}

/// Catalog tables a layer reads, as seen by `user`.
pub fn affected_tables(
    layer: &Layer,
    user: &ActingUser,
    catalog: &dyn TableCatalog,
) -> Result<HashSet<AffectedTable>, ResolveError> {
    user.validate()?;
    let names = affected_table_names(layer, user);
    TableResolver::new(catalog).resolve(&names, user)
}

pub fn uses_private_tables(
    layer: &Layer,
    user: &ActingUser,
    catalog: &dyn TableCatalog,
) -> Result<bool, ResolveError> {
    Ok(affected_tables(layer, user, catalog)?
        .iter()
        .any(AffectedTable::is_private))
}

/// Renames `old_name` to `new_name` in the layer's query, tile style and
/// table name. Persisting the layer is up to the caller.
pub fn rename_table(layer: &mut Layer, old_name: &str, new_name: &str) -> RenameOutcome {
    TableRenamer::new().rename(layer, &TableRename::new(old_name, new_name))
}
