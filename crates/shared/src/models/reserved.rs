//! Reserved words of the target SQL dialect and the renaming rule applied to
//! field names that collide with them.

use std::borrow::Cow;
use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Prefix inserted in front of a field name that is a reserved word
pub const RESERVED_PREFIX: &str = "F_";

/// SQLite keywords (https://www.sqlite.org/lang_keywords.html)
pub const SQLITE_KEYWORDS: &[&str] = &[
    "ABORT", "ACTION", "ADD", "AFTER", "ALL", "ALTER", "ALWAYS", "ANALYZE", "AND", "AS", "ASC",
    "ATTACH", "AUTOINCREMENT", "BEFORE", "BEGIN", "BETWEEN", "BY", "CASCADE", "CASE", "CAST",
    "CHECK", "COLLATE", "COLUMN", "COMMIT", "CONFLICT", "CONSTRAINT", "CREATE", "CROSS",
    "CURRENT", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "DATABASE", "DEFAULT",
    "DEFERRABLE", "DEFERRED", "DELETE", "DESC", "DETACH", "DISTINCT", "DO", "DROP", "EACH",
    "ELSE", "END", "ESCAPE", "EXCEPT", "EXCLUDE", "EXCLUSIVE", "EXISTS", "EXPLAIN", "FAIL",
    "FILTER", "FIRST", "FOLLOWING", "FOR", "FOREIGN", "FROM", "FULL", "GENERATED", "GLOB",
    "GROUP", "GROUPS", "HAVING", "IF", "IGNORE", "IMMEDIATE", "IN", "INDEX", "INDEXED",
    "INITIALLY", "INNER", "INSERT", "INSTEAD", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN",
    "KEY", "LAST", "LEFT", "LIKE", "LIMIT", "MATCH", "MATERIALIZED", "NATURAL", "NO", "NOT",
    "NOTHING", "NOTNULL", "NULL", "NULLS", "OF", "OFFSET", "ON", "OR", "ORDER", "OTHERS",
    "OUTER", "OVER", "PARTITION", "PLAN", "PRAGMA", "PRECEDING", "PRIMARY", "QUERY", "RAISE",
    "RANGE", "RECURSIVE", "REFERENCES", "REGEXP", "REINDEX", "RELEASE", "RENAME", "REPLACE",
    "RESTRICT", "RETURNING", "RIGHT", "ROLLBACK", "ROW", "ROWS", "SAVEPOINT", "SELECT", "SET",
    "TABLE", "TEMP", "TEMPORARY", "THEN", "TIES", "TO", "TRANSACTION", "TRIGGER", "UNBOUNDED",
    "UNION", "UNIQUE", "UPDATE", "USING", "VACUUM", "VALUES", "VIEW", "VIRTUAL", "WHEN",
    "WHERE", "WINDOW", "WITH", "WITHOUT",
];

static SQLITE_RESERVED: Lazy<ReservedWords> =
    Lazy::new(|| ReservedWords::new(SQLITE_KEYWORDS.iter().copied(), RESERVED_PREFIX));

/// A case-insensitive reserved word set with a fixed renaming prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedWords {
    words: HashSet<String>,
    prefix: String,
}

impl ReservedWords {
    pub fn new<I, S>(words: I, prefix: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words.into_iter().map(|w| w.as_ref().to_ascii_uppercase()).collect(),
            prefix: prefix.to_string(),
        }
    }

    /// The SQLite keyword table
    pub fn sqlite() -> Self {
        SQLITE_RESERVED.clone()
    }

    /// A table that renames nothing
    pub fn none() -> Self {
        Self::new(std::iter::empty::<&str>(), RESERVED_PREFIX)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.words.contains(&name.to_ascii_uppercase())
    }

    /// `name` itself, or `name` with the prefix inserted when it is reserved
    pub fn rename<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if self.is_reserved(name) {
            Cow::Owned(format!("{}{}", self.prefix, name))
        } else {
            Cow::Borrowed(name)
        }
    }
}

impl Default for ReservedWords {
    fn default() -> Self {
        Self::sqlite()
    }
}
