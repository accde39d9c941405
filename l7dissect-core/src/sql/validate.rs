//! Cheap lexical gate: does this text look like a SQL statement?
//!
//! A matching command byte alone is weak evidence. Truncated captures and
//! unrelated binary payloads share command byte values, so the statement text
//! must also start with a known verb before it is reported as SQL.

/// Statement verbs accepted as the start of a SQL text.
pub const SQL_VERBS: [&str; 9] = [
    "select", "insert", "update", "delete", "drop", "create", "alter", "set", "commit",
];

/// Return the verb the text starts with (case-insensitive), if any.
///
/// This is a plain prefix test: leading whitespace or comments are not
/// skipped, and `"settings"` matches `"set"`.
pub fn sql_verb(text: &str) -> Option<&'static str> {
    let bytes = text.as_bytes();
    SQL_VERBS.iter().copied().find(|verb| {
        bytes.len() >= verb.len() && bytes[..verb.len()].eq_ignore_ascii_case(verb.as_bytes())
    })
}

/// Check whether the text starts with a known SQL verb.
#[inline]
pub fn is_sql(text: &str) -> bool {
    sql_verb(text).is_some()
}
