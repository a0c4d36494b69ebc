use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use unicode_casefold::UnicodeCaseFold;

/// A SQL identifier as written in query text.
///
/// Unquoted identifiers follow PostgreSQL folding: `Roads`, `roads` and
/// `"roads"` name the same relation, while `"Roads"` does not. Equality and
/// hashing go through [`Identifier::key`] so sets of identifiers collapse the
/// same way the database would.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identifier {
    name: String,
    quoted: bool,
}

impl Identifier {
    pub fn unquoted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quoted: false,
        }
    }

    /// `name` is the inner text, with `""` escapes already collapsed.
    pub fn quoted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quoted: true,
        }
    }

    /// Builds an identifier for a raw database name (a username or a stored
    /// table name), quoting it only when the bare form would not survive.
    pub fn from_raw(name: impl Into<String>) -> Self {
        let name = name.into();
        let quoted = needs_quoting(&name);
        Self { name, quoted }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// Comparison key: case-folded for unquoted names, verbatim for quoted.
    pub fn key(&self) -> String {
        if self.quoted {
            self.name.clone()
        } else {
            fold_case(&self.name)
        }
    }

    /// Whether this identifier refers to the stored name `raw`.
    pub fn matches(&self, raw: &str) -> bool {
        self.key() == raw
    }

    /// SQL text for this identifier.
    pub fn render(&self) -> String {
        let must_quote = if self.quoted {
            needs_quoting(&self.name)
        } else {
            !is_plain_identifier(&self.name)
        };
        if must_quote {
            quote_ident(&self.name)
        } else {
            self.name.clone()
        }
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// True when `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(is_identifier_char)
}

/// True when a bare `name` would be misread: empty, outside the unquoted
/// grammar, or carrying upper case that PostgreSQL would fold away.
pub fn needs_quoting(name: &str) -> bool {
    !is_plain_identifier(name) || name.chars().any(|c| c.is_ascii_uppercase())
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Doubles any embedded double quotes and wraps in double quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn fold_case(name: &str) -> String {
    name.chars().case_fold().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    mod grammar {
        use super::*;

        #[rstest]
        #[case("roads", true)]
        #[case("_tmp", true)]
        #[case("table_name2", true)]
        #[case("Roads", true)]
        #[case("2roads", false)]
        #[case("user-x", false)]
        #[case("with space", false)]
        #[case("", false)]
        fn plain_identifier(#[case] input: &str, #[case] expected: bool) {
            assert_eq!(is_plain_identifier(input), expected);
        }

        #[rstest]
        #[case("roads", false)]
        #[case("Roads", true)]
        #[case("user-x", true)]
        #[case("", true)]
        fn quoting_required(#[case] input: &str, #[case] expected: bool) {
            assert_eq!(needs_quoting(input), expected);
        }
    }

    mod equality {
        use super::*;

        #[test]
        fn unquoted_names_compare_case_insensitively() {
            assert_eq!(Identifier::unquoted("Roads"), Identifier::unquoted("roads"));
        }

        #[test]
        fn quoted_lowercase_equals_unquoted() {
            assert_eq!(Identifier::quoted("roads"), Identifier::unquoted("ROADS"));
        }

        #[test]
        fn quoted_mixed_case_is_distinct() {
            assert_ne!(Identifier::quoted("Roads"), Identifier::unquoted("roads"));
        }

        #[test]
        fn matches_applies_folding_only_when_unquoted() {
            assert!(Identifier::unquoted("ROADS").matches("roads"));
            assert!(!Identifier::quoted("ROADS").matches("roads"));
            assert!(Identifier::quoted("t-1").matches("t-1"));
        }
    }

    mod render {
        use super::*;

        #[test]
        fn hyphenated_name_is_quoted() {
            assert_eq!(Identifier::from_raw("user-x").render(), "\"user-x\"");
        }

        #[test]
        fn plain_name_stays_bare() {
            assert_eq!(Identifier::from_raw("owner").render(), "owner");
            assert_eq!(Identifier::quoted("owner").render(), "owner");
        }

        #[test]
        fn unquoted_upper_case_stays_bare() {
            assert_eq!(Identifier::unquoted("Roads").render(), "Roads");
        }

        #[test]
        fn quoted_upper_case_keeps_quotes() {
            assert_eq!(Identifier::quoted("Roads").render(), "\"Roads\"");
        }

        #[test]
        fn embedded_quote_is_doubled() {
            assert_eq!(Identifier::quoted("a\"b").render(), "\"a\"\"b\"");
        }
    }
}
