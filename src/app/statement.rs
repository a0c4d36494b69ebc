use crate::sql_lexer::Token;

/// Tokens of one `;`-delimited statement, terminator excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement<'a> {
    pub tokens: &'a [Token],
}

impl SqlStatement<'_> {
    /// Tokens other than whitespace and comments.
    pub fn significant(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| !t.is_trivia())
    }
}

/// Splits on `;` tokens. The lexer never emits `;` from inside strings,
/// quoted identifiers or comments, so every `Punct(';')` is a terminator.
/// Statements with nothing but whitespace and comments are dropped.
pub fn split_statements(tokens: &[Token]) -> Vec<SqlStatement<'_>> {
    tokens
        .split(|t| t.is_punct(';'))
        .map(|tokens| SqlStatement { tokens })
        .filter(|statement| statement.significant().next().is_some())
        .collect()
}
