//! Lightweight PostgreSQL lexer shared by table extraction and renaming.
//!
//! Handles:
//! - Double-quoted identifiers ("..." with "" escapes)
//! - String literals ('...', E'...', $tag$...$tag$)
//! - Line comments (--)
//! - Block comments (/* */)
//! - Cast operator (::)
//!
//! Token spans are byte offsets into the input so callers can splice text
//! back together without re-scanning.

use layerscope_domain::Identifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare word: keyword or unquoted identifier, as written.
    Word(String),
    /// Inner text of a double-quoted identifier, escapes collapsed.
    QuotedIdent(String),
    Operator(String),
    Punct(char),
    StringLiteral,
    Number,
    Comment,
    Whitespace,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// Case-insensitive keyword test. Quoted identifiers are never keywords.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.kind, TokenKind::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    pub fn identifier(&self) -> Option<Identifier> {
        match &self.kind {
            TokenKind::Word(w) => Some(Identifier::unquoted(w.clone())),
            TokenKind::QuotedIdent(q) => Some(Identifier::quoted(q.clone())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unterminated string literal starting at byte {0}")]
    UnterminatedString(usize),
    #[error("unterminated quoted identifier starting at byte {0}")]
    UnterminatedQuotedIdentifier(usize),
    #[error("unterminated dollar-quoted string starting at byte {0}")]
    UnterminatedDollarQuote(usize),
    #[error("unterminated block comment starting at byte {0}")]
    UnterminatedBlockComment(usize),
}

/// Result of lexing: every token up to the first error, plus that error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
    pub error: Option<LexError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexerState {
    Normal,
    InSingleQuote,
    InDoubleQuote,
    InDollarQuote,
    InLineComment,
    InBlockComment,
    InEscapeString,
}

pub struct SqlLexer;

impl SqlLexer {
    pub fn new() -> Self {
        Self
    }

    pub fn tokenize(&self, text: &str) -> Tokenized {
        let chars: Vec<char> = text.chars().collect();
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let end_pos = chars.len();
        let span = |from: usize, to: usize| text[offsets[from]..offsets[to]].to_string();

        let mut tokens = Vec::new();
        let mut pos = 0;
        let mut state = LexerState::Normal;
        let mut token_start = 0;
        let mut dollar_tag = String::new();
        let mut block_depth = 0usize;

        let push = |tokens: &mut Vec<Token>, kind: TokenKind, from: usize, to: usize| {
            tokens.push(Token {
                kind,
                text: span(from, to),
                start: offsets[from],
                end: offsets[to],
            });
        };

        while pos < end_pos {
            let c = chars[pos];

            match state {
                LexerState::Normal => {
                    if c.is_whitespace() {
                        let start = pos;
                        while pos < end_pos && chars[pos].is_whitespace() {
                            pos += 1;
                        }
                        push(&mut tokens, TokenKind::Whitespace, start, pos);
                        continue;
                    }

                    // Line comment: --
                    if c == '-' && pos + 1 < end_pos && chars[pos + 1] == '-' {
                        token_start = pos;
                        state = LexerState::InLineComment;
                        pos += 2;
                        continue;
                    }

                    // Block comment: /*
                    if c == '/' && pos + 1 < end_pos && chars[pos + 1] == '*' {
                        token_start = pos;
                        block_depth = 1;
                        state = LexerState::InBlockComment;
                        pos += 2;
                        continue;
                    }

                    // Escape string: E'...'
                    if (c == 'E' || c == 'e')
                        && pos + 1 < end_pos
                        && chars[pos + 1] == '\''
                        && !Self::continues_word(&chars, pos)
                    {
                        token_start = pos;
                        state = LexerState::InEscapeString;
                        pos += 2;
                        continue;
                    }

                    // Dollar-quoted string: $tag$...$tag$ or $$...$$
                    if c == '$' {
                        let tag_start = pos;
                        pos += 1;
                        let mut tag = String::new();
                        while pos < end_pos && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                            tag.push(chars[pos]);
                            pos += 1;
                        }
                        if pos < end_pos
                            && chars[pos] == '$'
                            && !tag.starts_with(|t: char| t.is_ascii_digit())
                        {
                            pos += 1;
                            token_start = tag_start;
                            dollar_tag = tag;
                            state = LexerState::InDollarQuote;
                            continue;
                        }
                        // Positional parameter ($1) or stray $
                        pos = tag_start + 1;
                        while pos < end_pos && chars[pos].is_ascii_digit() {
                            pos += 1;
                        }
                        push(
                            &mut tokens,
                            TokenKind::Operator(span(tag_start, pos)),
                            tag_start,
                            pos,
                        );
                        continue;
                    }

                    // Single-quoted string: '...'
                    if c == '\'' {
                        token_start = pos;
                        state = LexerState::InSingleQuote;
                        pos += 1;
                        continue;
                    }

                    // Double-quoted identifier: "..."
                    if c == '"' {
                        token_start = pos;
                        state = LexerState::InDoubleQuote;
                        pos += 1;
                        continue;
                    }

                    // Cast operator: ::
                    if c == ':' && pos + 1 < end_pos && chars[pos + 1] == ':' {
                        push(&mut tokens, TokenKind::Operator("::".to_string()), pos, pos + 2);
                        pos += 2;
                        continue;
                    }

                    // Other operators; a "--" or "/*" inside the run starts a comment
                    if Self::is_operator_char(c) {
                        let start = pos;
                        while pos < end_pos && Self::is_operator_char(chars[pos]) {
                            if pos > start && Self::starts_comment(&chars, pos) {
                                break;
                            }
                            pos += 1;
                        }
                        push(&mut tokens, TokenKind::Operator(span(start, pos)), start, pos);
                        continue;
                    }

                    // Punctuation: ( ) , ; . [ ]
                    if Self::is_punctuation(c) {
                        push(&mut tokens, TokenKind::Punct(c), pos, pos + 1);
                        pos += 1;
                        continue;
                    }

                    // Number
                    if c.is_ascii_digit() {
                        let start = pos;
                        while pos < end_pos && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                            pos += 1;
                        }
                        push(&mut tokens, TokenKind::Number, start, pos);
                        continue;
                    }

                    // Keyword or unquoted identifier
                    if c.is_alphabetic() || c == '_' {
                        let start = pos;
                        while pos < end_pos
                            && (chars[pos].is_alphanumeric() || chars[pos] == '_' || chars[pos] == '$')
                        {
                            pos += 1;
                        }
                        push(&mut tokens, TokenKind::Word(span(start, pos)), start, pos);
                        continue;
                    }

                    push(&mut tokens, TokenKind::Unknown, pos, pos + 1);
                    pos += 1;
                }

                LexerState::InSingleQuote => {
                    // Handle escaped single quotes: ''
                    if c == '\'' {
                        if pos + 1 < end_pos && chars[pos + 1] == '\'' {
                            pos += 2;
                            continue;
                        }
                        push(&mut tokens, TokenKind::StringLiteral, token_start, pos + 1);
                        state = LexerState::Normal;
                    }
                    pos += 1;
                }

                LexerState::InDoubleQuote => {
                    // Handle escaped double quotes: ""
                    if c == '"' {
                        if pos + 1 < end_pos && chars[pos + 1] == '"' {
                            pos += 2;
                            continue;
                        }
                        let inner = span(token_start + 1, pos).replace("\"\"", "\"");
                        push(&mut tokens, TokenKind::QuotedIdent(inner), token_start, pos + 1);
                        state = LexerState::Normal;
                    }
                    pos += 1;
                }

                LexerState::InDollarQuote => {
                    // Look for closing $tag$
                    if c == '$' {
                        let tag_start = pos;
                        pos += 1;
                        let mut closing_tag = String::new();
                        while pos < end_pos && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                            closing_tag.push(chars[pos]);
                            pos += 1;
                        }
                        if pos < end_pos && chars[pos] == '$' && closing_tag == dollar_tag {
                            pos += 1;
                            push(&mut tokens, TokenKind::StringLiteral, token_start, pos);
                            state = LexerState::Normal;
                            dollar_tag.clear();
                            continue;
                        }
                        // Not the closing tag, continue in dollar quote
                        pos = tag_start + 1;
                        continue;
                    }
                    pos += 1;
                }

                LexerState::InLineComment => {
                    if c == '\n' {
                        push(&mut tokens, TokenKind::Comment, token_start, pos);
                        state = LexerState::Normal;
                        // Don't consume newline, let Normal state handle it
                        continue;
                    }
                    pos += 1;
                }

                LexerState::InBlockComment => {
                    // PostgreSQL block comments nest
                    if c == '/' && pos + 1 < end_pos && chars[pos + 1] == '*' {
                        block_depth += 1;
                        pos += 2;
                        continue;
                    }
                    if c == '*' && pos + 1 < end_pos && chars[pos + 1] == '/' {
                        pos += 2;
                        block_depth -= 1;
                        if block_depth == 0 {
                            push(&mut tokens, TokenKind::Comment, token_start, pos);
                            state = LexerState::Normal;
                        }
                        continue;
                    }
                    pos += 1;
                }

                LexerState::InEscapeString => {
                    // Handle backslash escapes in E'...'
                    if c == '\\' && pos + 1 < end_pos {
                        pos += 2;
                        continue;
                    }
                    if c == '\'' {
                        if pos + 1 < end_pos && chars[pos + 1] == '\'' {
                            pos += 2;
                            continue;
                        }
                        push(&mut tokens, TokenKind::StringLiteral, token_start, pos + 1);
                        state = LexerState::Normal;
                    }
                    pos += 1;
                }
            }
        }

        let start_byte = offsets[token_start];
        let error = match state {
            LexerState::Normal => None,
            LexerState::InLineComment => {
                // A line comment may legitimately run to end of input
                push(&mut tokens, TokenKind::Comment, token_start, end_pos);
                None
            }
            LexerState::InSingleQuote | LexerState::InEscapeString => {
                Some(LexError::UnterminatedString(start_byte))
            }
            LexerState::InDoubleQuote => Some(LexError::UnterminatedQuotedIdentifier(start_byte)),
            LexerState::InDollarQuote => Some(LexError::UnterminatedDollarQuote(start_byte)),
            LexerState::InBlockComment => Some(LexError::UnterminatedBlockComment(start_byte)),
        };

        Tokenized { tokens, error }
    }

    fn continues_word(chars: &[char], pos: usize) -> bool {
        pos > 0 && (chars[pos - 1].is_alphanumeric() || chars[pos - 1] == '_')
    }

    fn starts_comment(chars: &[char], pos: usize) -> bool {
        pos + 1 < chars.len()
            && ((chars[pos] == '-' && chars[pos + 1] == '-')
                || (chars[pos] == '/' && chars[pos + 1] == '*'))
    }

    fn is_operator_char(c: char) -> bool {
        matches!(
            c,
            '+' | '-' | '*' | '/' | '<' | '>' | '=' | '!' | '%' | '&' | '|' | '^' | '~' | ':' | '#'
                | '@' | '?'
        )
    }

    fn is_punctuation(c: char) -> bool {
        matches!(c, '(' | ')' | ',' | ';' | '.' | '[' | ']')
    }
}

impl Default for SqlLexer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexer() -> SqlLexer {
        SqlLexer::new()
    }

    fn words(tokenized: &Tokenized) -> Vec<&str> {
        tokenized
            .tokens
            .iter()
            .filter_map(|t| match &t.kind {
                TokenKind::Word(w) => Some(w.as_str()),
                _ => None,
            })
            .collect()
    }

    mod tokenization {
        use super::*;

        #[test]
        fn simple_select_returns_words() {
            let tokenized = lexer().tokenize("SELECT * FROM users");

            assert_eq!(words(&tokenized), vec!["SELECT", "FROM", "users"]);
            assert!(tokenized.error.is_none());
        }

        #[test]
        fn spans_cover_source_text() {
            let sql = "select * from roads";
            let tokenized = lexer().tokenize(sql);

            let rebuilt: String = tokenized.tokens.iter().map(|t| &sql[t.start..t.end]).collect();
            assert_eq!(rebuilt, sql);
        }

        #[test]
        fn spans_are_byte_offsets_with_multibyte_text() {
            let sql = "select 'é' from roads";
            let tokenized = lexer().tokenize(sql);

            let roads = tokenized.tokens.last().unwrap();
            assert_eq!(&sql[roads.start..roads.end], "roads");
        }

        #[test]
        fn cast_operator_returns_operator_token() {
            let tokenized = lexer().tokenize("SELECT col::integer");

            let has_cast = tokenized
                .tokens
                .iter()
                .any(|t| matches!(&t.kind, TokenKind::Operator(op) if op == "::"));
            assert!(has_cast);
        }

        #[test]
        fn keyword_matching_is_case_insensitive() {
            let tokenized = lexer().tokenize("select");

            assert!(tokenized.tokens[0].is_keyword("SELECT"));
        }

        #[test]
        fn positional_parameter_is_not_a_dollar_quote() {
            let tokenized = lexer().tokenize("SELECT * FROM roads WHERE id = $1");

            assert!(tokenized.error.is_none());
            assert_eq!(words(&tokenized), vec!["SELECT", "FROM", "roads", "WHERE", "id"]);
        }
    }

    mod quoted_identifiers {
        use super::*;

        #[test]
        fn hyphenated_identifier_stays_whole() {
            let tokenized = lexer().tokenize("SELECT * FROM \"table-1\"");

            let last = tokenized.tokens.last().unwrap();
            assert_eq!(last.kind, TokenKind::QuotedIdent("table-1".to_string()));
            assert_eq!(last.text, "\"table-1\"");
        }

        #[test]
        fn escaped_double_quote_is_collapsed() {
            let tokenized = lexer().tokenize("\"a\"\"b\"");

            assert_eq!(
                tokenized.tokens[0].kind,
                TokenKind::QuotedIdent("a\"b".to_string())
            );
        }

        #[test]
        fn quoted_keyword_is_not_a_keyword() {
            let tokenized = lexer().tokenize("\"from\"");

            assert!(!tokenized.tokens[0].is_keyword("FROM"));
        }

        #[test]
        fn unterminated_identifier_returns_error_and_prior_tokens() {
            let tokenized = lexer().tokenize("SELECT * FROM \"broken");

            assert_eq!(
                tokenized.error,
                Some(LexError::UnterminatedQuotedIdentifier(14))
            );
            assert_eq!(words(&tokenized), vec!["SELECT", "FROM"]);
        }
    }

    mod string_literals {
        use super::*;

        #[test]
        fn word_in_string_is_not_tokenized() {
            let tokenized = lexer().tokenize("SELECT 'FROM roads'");

            assert_eq!(words(&tokenized), vec!["SELECT"]);
        }

        #[test]
        fn escaped_single_quote_returns_single_literal() {
            let tokenized = lexer().tokenize("SELECT 'O''Brien'");

            let literals: Vec<_> = tokenized
                .tokens
                .iter()
                .filter(|t| t.kind == TokenKind::StringLiteral)
                .collect();
            assert_eq!(literals.len(), 1);
            assert_eq!(literals[0].text, "'O''Brien'");
        }

        #[test]
        fn tagged_dollar_quote_returns_string_literal() {
            let tokenized = lexer().tokenize("SELECT $tag$FROM roads$tag$");

            assert_eq!(words(&tokenized), vec!["SELECT"]);
            assert_eq!(tokenized.tokens.last().unwrap().text, "$tag$FROM roads$tag$");
        }

        #[test]
        fn escape_string_honours_backslash() {
            let tokenized = lexer().tokenize("SELECT E'it\\'s' FROM roads");

            assert_eq!(words(&tokenized), vec!["SELECT", "FROM", "roads"]);
        }

        #[test]
        fn identifier_ending_in_e_is_not_an_escape_string() {
            let tokenized = lexer().tokenize("SELECT name'x'");

            assert_eq!(words(&tokenized), vec!["SELECT", "name"]);
        }

        #[test]
        fn unterminated_string_returns_error() {
            let tokenized = lexer().tokenize("SELECT 'oops FROM roads");

            assert_eq!(tokenized.error, Some(LexError::UnterminatedString(7)));
        }
    }

    mod comments {
        use super::*;

        #[test]
        fn line_comment_hides_its_text() {
            let tokenized = lexer().tokenize("SELECT 1 -- FROM roads;\nFROM other");

            assert_eq!(words(&tokenized), vec!["SELECT", "FROM", "other"]);
            assert!(tokenized.tokens.iter().all(|t| !t.is_punct(';')));
        }

        #[test]
        fn line_comment_at_end_of_input_is_not_an_error() {
            let tokenized = lexer().tokenize("SELECT 1 -- trailing");

            assert!(tokenized.error.is_none());
            assert_eq!(tokenized.tokens.last().unwrap().kind, TokenKind::Comment);
        }

        #[test]
        fn block_comment_hides_its_text() {
            let tokenized = lexer().tokenize("/* FROM roads; */ FROM other");

            assert_eq!(words(&tokenized), vec!["FROM", "other"]);
        }

        #[test]
        fn nested_block_comment_closes_at_outer_end() {
            let tokenized = lexer().tokenize("/* a /* b */ c */ FROM other");

            assert_eq!(words(&tokenized), vec!["FROM", "other"]);
        }

        #[test]
        fn comment_start_inside_operator_run_is_recognized() {
            let tokenized = lexer().tokenize("SELECT 1+-- note\n2");

            assert!(tokenized.tokens.iter().any(|t| t.kind == TokenKind::Comment));
        }

        #[test]
        fn unterminated_block_comment_returns_error() {
            let tokenized = lexer().tokenize("SELECT 1 /* open");

            assert_eq!(tokenized.error, Some(LexError::UnterminatedBlockComment(9)));
        }
    }
}
