//! Best-effort discovery of the tables a query reads.
//!
//! Only `FROM` and `JOIN` sources are recognized. Each source is a name,
//! optionally qualified, optionally aliased; a comma continues the list.
//! Parenthesized sources (subqueries, function calls) yield no name of their
//! own, but scanning walks into them so inner `FROM`s are still found.

use std::collections::HashSet;
use std::ops::Range;

use layerscope_domain::{ActingUser, Identifier, QualifiedTableName};

use crate::sql_lexer::{SqlLexer, Token, TokenKind};
use crate::statement::{SqlStatement, split_statements};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReference {
    pub name: QualifiedTableName,
    pub alias: Option<Identifier>,
    /// Byte span of the whole name in the source text, schema included.
    pub span: Range<usize>,
    /// Byte span of the table part alone.
    pub table_span: Range<usize>,
}

/// Words that end a source list or cannot start a table name.
const RESERVED: &[&str] = &[
    "SELECT",
    "FROM",
    "WHERE",
    "JOIN",
    "LEFT",
    "RIGHT",
    "INNER",
    "OUTER",
    "CROSS",
    "FULL",
    "NATURAL",
    "ON",
    "USING",
    "AND",
    "OR",
    "GROUP",
    "ORDER",
    "HAVING",
    "LIMIT",
    "OFFSET",
    "FETCH",
    "FOR",
    "WINDOW",
    "UNION",
    "INTERSECT",
    "EXCEPT",
    "RETURNING",
    "VALUES",
    "SET",
    "INTO",
    "WITH",
    "AS",
    "ONLY",
    "LATERAL",
    "TABLESAMPLE",
];

/// Functions whose argument syntax uses `FROM` without naming a table.
const FROM_ARGUMENT_FUNCTIONS: &[&str] = &["EXTRACT", "SUBSTRING", "TRIM", "OVERLAY", "POSITION"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParenKind {
    Plain,
    /// Arguments of a function in `FROM_ARGUMENT_FUNCTIONS`.
    FromArguments,
    /// A subquery or function call standing in a source list.
    Source,
}

enum SourceParse {
    Table(TableReference),
    /// Stopped on the `(` of a parenthesized source.
    Parenthesized,
    Stop,
}

pub struct TableReferenceExtractor {
    lexer: SqlLexer,
}

impl TableReferenceExtractor {
    pub fn new() -> Self {
        Self {
            lexer: SqlLexer::new(),
        }
    }

    /// Qualified names read by every statement in `sql`.
    ///
    /// A lex error ends discovery at the failing position; references found
    /// before it are kept.
    pub fn extract_from_sql(&self, sql: &str, user: &ActingUser) -> HashSet<QualifiedTableName> {
        let tokenized = self.lexer.tokenize(sql);
        if let Some(error) = &tokenized.error {
            tracing::debug!(%error, "query only partially scanned for table references");
        }

        split_statements(&tokenized.tokens)
            .iter()
            .flat_map(|statement| self.extract(statement, user))
            .collect()
    }

    /// Names read by one statement, qualified with the acting user's schema
    /// where no schema was written.
    pub fn extract(&self, statement: &SqlStatement<'_>, user: &ActingUser) -> HashSet<QualifiedTableName> {
        let schema = user.schema();
        self.extract_references(statement)
            .into_iter()
            .map(|reference| reference.name.qualify(&schema))
            .collect()
    }

    /// Raw references in order of appearance, schema left as written.
    pub fn extract_references(&self, statement: &SqlStatement<'_>) -> Vec<TableReference> {
        let tokens: Vec<&Token> = statement.significant().collect();
        let mut refs = Vec::new();
        let mut parens: Vec<ParenKind> = Vec::new();
        let mut source_pending = false;
        let mut i = 0;

        while i < tokens.len() {
            let token = tokens[i];

            if token.is_punct('(') {
                let kind = if source_pending {
                    ParenKind::Source
                } else if i > 0
                    && FROM_ARGUMENT_FUNCTIONS
                        .iter()
                        .any(|f| tokens[i - 1].is_keyword(f))
                {
                    ParenKind::FromArguments
                } else {
                    ParenKind::Plain
                };
                source_pending = false;
                parens.push(kind);
                i += 1;
                continue;
            }
            source_pending = false;

            if token.is_punct(')') {
                i += 1;
                // After a parenthesized source: skip its alias, then a comma
                // resumes the source list.
                if parens.pop() == Some(ParenKind::Source) {
                    Self::skip_alias(&tokens, &mut i);
                    if i < tokens.len() && tokens[i].is_punct(',') {
                        let (next, pending) = Self::parse_source_list(&tokens, i + 1, &mut refs);
                        i = next;
                        source_pending = pending;
                    }
                }
                continue;
            }

            let in_from_arguments = parens.last() == Some(&ParenKind::FromArguments);
            let starts_sources = (token.is_keyword("FROM")
                && !in_from_arguments
                && !Self::follows_distinct(&tokens, i))
                || token.is_keyword("JOIN");

            if starts_sources {
                let (next, pending) = Self::parse_source_list(&tokens, i + 1, &mut refs);
                i = next;
                source_pending = pending;
                continue;
            }

            i += 1;
        }

        refs
    }

    /// Parses `source [, source]*` from `start`. Returns where scanning should
    /// resume and whether it stopped on the `(` of a parenthesized source.
    fn parse_source_list(tokens: &[&Token], start: usize, refs: &mut Vec<TableReference>) -> (usize, bool) {
        let mut i = start;
        loop {
            while i < tokens.len() && (tokens[i].is_keyword("ONLY") || tokens[i].is_keyword("LATERAL")) {
                i += 1;
            }
            match Self::parse_table_reference(tokens, &mut i) {
                SourceParse::Table(reference) => refs.push(reference),
                SourceParse::Parenthesized => return (i, true),
                SourceParse::Stop => return (i, false),
            }
            if i < tokens.len() && tokens[i].is_punct(',') {
                i += 1;
                continue;
            }
            return (i, false);
        }
    }

    fn parse_table_reference(tokens: &[&Token], i: &mut usize) -> SourceParse {
        if *i >= tokens.len() {
            return SourceParse::Stop;
        }
        if tokens[*i].is_punct('(') {
            return SourceParse::Parenthesized;
        }

        let start = tokens[*i].start;
        let Some(first) = Self::name_at(tokens, *i) else {
            return SourceParse::Stop;
        };
        let mut parts = vec![first];
        let mut table_span = tokens[*i].start..tokens[*i].end;
        *i += 1;

        // schema.table, or db.schema.table where only the last two count
        while *i + 1 < tokens.len() && tokens[*i].is_punct('.') {
            let Some(part) = tokens[*i + 1].identifier() else {
                break;
            };
            parts.push(part);
            table_span = tokens[*i + 1].start..tokens[*i + 1].end;
            *i += 2;
        }

        // Set-returning function call such as generate_series(1, 3)
        if *i < tokens.len() && tokens[*i].is_punct('(') {
            return SourceParse::Parenthesized;
        }

        let Some(table) = parts.pop() else {
            return SourceParse::Stop;
        };
        let schema = parts.pop();
        let alias = Self::skip_alias(tokens, i);

        SourceParse::Table(TableReference {
            name: QualifiedTableName { schema, table },
            alias,
            span: start..table_span.end,
            table_span,
        })
    }

    /// Consumes `[AS] alias [(column, ...)]` if present.
    fn skip_alias(tokens: &[&Token], i: &mut usize) -> Option<Identifier> {
        if *i >= tokens.len() {
            return None;
        }

        let alias = if tokens[*i].is_keyword("AS") {
            *i += 1;
            let alias = tokens.get(*i).and_then(|t| t.identifier());
            if alias.is_some() {
                *i += 1;
            }
            alias
        } else if let Some(alias) = Self::name_at(tokens, *i) {
            *i += 1;
            Some(alias)
        } else {
            None
        };

        // Column alias list: AS g(n)
        if alias.is_some() && *i < tokens.len() && tokens[*i].is_punct('(') {
            let mut depth = 0usize;
            while *i < tokens.len() {
                if tokens[*i].is_punct('(') {
                    depth += 1;
                } else if tokens[*i].is_punct(')') {
                    depth -= 1;
                    if depth == 0 {
                        *i += 1;
                        break;
                    }
                }
                *i += 1;
            }
        }

        alias
    }

    /// Identifier at `i` that may name a table or alias.
    fn name_at(tokens: &[&Token], i: usize) -> Option<Identifier> {
        let token = tokens.get(i)?;
        match &token.kind {
            TokenKind::Word(word) if Self::is_reserved(word) => None,
            _ => token.identifier(),
        }
    }

    fn is_reserved(word: &str) -> bool {
        RESERVED.iter().any(|kw| word.eq_ignore_ascii_case(kw))
    }

    /// `IS [NOT] DISTINCT FROM` compares values, it names no source.
    fn follows_distinct(tokens: &[&Token], i: usize) -> bool {
        i >= 2
            && tokens[i - 1].is_keyword("DISTINCT")
            && (tokens[i - 2].is_keyword("IS") || tokens[i - 2].is_keyword("NOT"))
    }
}

impl Default for TableReferenceExtractor {
    fn default() -> Self {
        Self::new()
    }
}
