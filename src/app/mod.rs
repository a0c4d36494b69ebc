//! Affected-table resolution and table renaming for map layers.

pub mod layer_hooks;
pub mod layer_tables;
pub mod ports;
pub mod renamer;
pub mod resolver;
pub mod sql_lexer;
pub mod statement;
pub mod table_refs;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use layer_hooks::{LayerHooks, SaveOutcome};
pub use layer_tables::{affected_table_names, affected_tables, rename_table, uses_private_tables};
pub use renamer::{RenameOutcome, TableRename, TableRenamer};
pub use resolver::{ResolveError, TableResolver};
pub use sql_lexer::{LexError, SqlLexer, Token, TokenKind, Tokenized};
pub use statement::{SqlStatement, split_statements};
pub use table_refs::{TableReference, TableReferenceExtractor};
