//! Identifier-safe table renaming across a layer's structured options.
//!
//! Every rewrite is a splice of exact byte spans found by scanning, never a
//! textual search-and-replace. In queries only the spans the table reference
//! extractor reports are candidates, so `roads_2`, string contents and
//! comments are never touched.

use layerscope_domain::layer::{QUERY, TABLE_NAME, TILE_STYLE};
use layerscope_domain::{Identifier, Layer, is_identifier_char, quote_ident};

use crate::sql_lexer::{SqlLexer, Token};
use crate::statement::{SqlStatement, split_statements};
use crate::table_refs::TableReferenceExtractor;

/// Which option fields a rename rewrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameOutcome {
    pub query: bool,
    pub tile_style: bool,
    pub table_name: bool,
}

impl RenameOutcome {
    pub fn changed(&self) -> bool {
        self.query || self.tile_style || self.table_name
    }
}

/// A table rename: raw stored names, plus the owning schema when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRename {
    pub schema: Option<String>,
    pub old_name: String,
    pub new_name: String,
}

impl TableRename {
    pub fn new(old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            schema: None,
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }

    /// References qualified with another schema are left alone.
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}

pub struct TableRenamer {
    lexer: SqlLexer,
    extractor: TableReferenceExtractor,
}

#[derive(Debug, PartialEq, Eq)]
struct Splice {
    start: usize,
    end: usize,
    replacement: String,
}

impl TableRenamer {
    pub fn new() -> Self {
        Self {
            lexer: SqlLexer::new(),
            extractor: TableReferenceExtractor::new(),
        }
    }

    /// Rewrites `query`, `tile_style` and `table_name` in place. Fields
    /// without an occurrence keep their exact bytes. Base layers read no
    /// user tables and are left as they are.
    pub fn rename(&self, layer: &mut Layer, rename: &TableRename) -> RenameOutcome {
        if !layer.is_data_layer() || rename.old_name == rename.new_name {
            return RenameOutcome::default();
        }
        let mut outcome = RenameOutcome::default();

        if let Some(query) = layer.query().and_then(|q| self.rename_in_query(q, rename)) {
            layer.set_option_str(QUERY, query);
            outcome.query = true;
        }

        if let Some(style) = layer
            .tile_style()
            .and_then(|s| rename_in_tile_style(s, &rename.old_name, &rename.new_name))
        {
            layer.set_option_str(TILE_STYLE, style);
            outcome.tile_style = true;
        }

        if layer.table_name() == Some(rename.old_name.as_str()) {
            layer.set_option_str(TABLE_NAME, rename.new_name.clone());
            outcome.table_name = true;
        }

        tracing::debug!(
            old = %rename.old_name,
            new = %rename.new_name,
            ?outcome,
            "renamed table in layer options"
        );
        outcome
    }

    /// `None` when no `FROM`/`JOIN` source of `sql` names the old table.
    ///
    /// Only source names and the `old.column` qualifiers that point at them
    /// change. Schemas, bare columns and aliases sharing the name are kept.
    pub fn rename_in_query(&self, sql: &str, rename: &TableRename) -> Option<String> {
        let tokenized = self.lexer.tokenize(sql);
        if let Some(error) = &tokenized.error {
            tracing::debug!(%error, "query only partially scanned for rename");
        }

        let mut splices: Vec<Splice> = split_statements(&tokenized.tokens)
            .iter()
            .flat_map(|statement| self.statement_splices(statement, rename))
            .collect();
        splices.sort_by_key(|splice| splice.start);
        apply_splices(sql, splices)
    }

    fn statement_splices(&self, statement: &SqlStatement<'_>, rename: &TableRename) -> Vec<Splice> {
        let references = self.extractor.extract_references(statement);
        let mut splices = Vec::new();
        let mut referenced_by_name = false;

        for reference in &references {
            let table = &reference.name.table;
            if !table.matches(&rename.old_name) || !in_schema(reference.name.schema.as_ref(), rename) {
                continue;
            }
            referenced_by_name |= reference.alias.is_none();
            splices.push(Splice {
                start: reference.table_span.start,
                end: reference.table_span.end,
                replacement: render_replacement(table, &rename.new_name),
            });
        }

        // `old.column` only means the renamed table when it is in scope under
        // its own name and no other source borrowed that name as an alias.
        let shadowed = references
            .iter()
            .filter_map(|r| r.alias.as_ref())
            .any(|alias| alias.matches(&rename.old_name));
        if !referenced_by_name || shadowed {
            return splices;
        }

        let tokens: Vec<&Token> = statement.significant().collect();
        for (i, token) in tokens.iter().enumerate() {
            let Some(ident) = token.identifier() else {
                continue;
            };
            let qualifies_column = tokens.get(i + 1).is_some_and(|next| next.is_punct('.'));
            let inside_source_name = references.iter().any(|r| r.span.contains(&token.start));
            if !ident.matches(&rename.old_name) || !qualifies_column || inside_source_name {
                continue;
            }

            // `schema.old.column`
            let qualifier = (i >= 2 && tokens[i - 1].is_punct('.'))
                .then(|| tokens[i - 2].identifier())
                .flatten();
            if !in_schema(qualifier.as_ref(), rename) {
                continue;
            }

            splices.push(Splice {
                start: token.start,
                end: token.end,
                replacement: render_replacement(&ident, &rename.new_name),
            });
        }

        splices
    }
}

impl Default for TableRenamer {
    fn default() -> Self {
        Self::new()
    }
}

/// A reference qualified with a schema other than the rename's is left alone.
fn in_schema(schema: Option<&Identifier>, rename: &TableRename) -> bool {
    match (schema, rename.schema.as_deref()) {
        (Some(schema), Some(wanted)) => schema.matches(wanted),
        _ => true,
    }
}

/// Keeps the original token's quoting, and quotes the new name whenever a
/// bare form would not read back as the same name.
fn render_replacement(original: &Identifier, new_name: &str) -> String {
    if original.is_quoted() {
        quote_ident(new_name)
    } else {
        Identifier::from_raw(new_name).render()
    }
}

/// Rewrites `#old` selectors in CartoCSS. The name must be followed by a
/// boundary; quoted strings and comments are skipped.
pub fn rename_in_tile_style(style: &str, old_name: &str, new_name: &str) -> Option<String> {
    let bytes = style.as_bytes();
    let mut splices = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = style[i + 2..].find("*/").map_or(bytes.len(), |end| i + 2 + end + 2);
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = style[i..].find('\n').map_or(bytes.len(), |end| i + end);
            }
            b'#' => {
                let start = i + 1;
                let end = start + old_name.len();
                if style.get(start..end) == Some(old_name) && is_selector_boundary(style[end..].chars().next()) {
                    splices.push(Splice {
                        start,
                        end,
                        replacement: new_name.to_string(),
                    });
                    i = end;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    apply_splices(style, splices)
}

/// CartoCSS selectors may contain hyphens, so `-` continues the name.
fn is_selector_boundary(next: Option<char>) -> bool {
    next.is_none_or(|c| !(is_identifier_char(c) || c == '-'))
}

fn apply_splices(text: &str, splices: Vec<Splice>) -> Option<String> {
    if splices.is_empty() {
        return None;
    }
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for splice in splices {
        out.push_str(&text[cursor..splice.start]);
        out.push_str(&splice.replacement);
        cursor = splice.end;
    }
    out.push_str(&text[cursor..]);
    Some(out)
}
