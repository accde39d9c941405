//! SQL text handling: the verb gate applied to statement text found in
//! command payloads, and content-key normalization.

mod lexer;
mod normalize;
mod validate;

pub use normalize::{
    normalize_statement, truncate_at_char_boundary, SqlNormalizer, PLACEHOLDER,
    TRUNCATION_MARKER,
};
pub use validate::{is_sql, sql_verb, SQL_VERBS};
