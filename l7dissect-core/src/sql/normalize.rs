//! Content-key derivation for SQL statements.
//!
//! Statements that differ only in literal values map to the same key, so that
//! downstream aggregation groups `SELECT * FROM t WHERE id = 1` together with
//! `select * from t where id=2`.

use std::sync::Arc;

use tracing::trace;

use super::lexer::{Lexer, Token};
use crate::cache::{CacheStats, ContentKeyCache, LruContentKeyCache, NoCache};
use crate::config::NormalizerConfig;
use crate::error::ConfigError;

/// Placeholder written for every literal and bind parameter.
pub const PLACEHOLDER: &str = "?";

/// Marker appended when a statement exceeds the token limit.
pub const TRUNCATION_MARKER: &str = " ...";

/// Shared SQL normalizer with a memoizing content-key cache.
///
/// Construct once and share it through an `Arc`; every method takes `&self`.
pub struct SqlNormalizer {
    config: NormalizerConfig,
    cache: Box<dyn ContentKeyCache>,
}

impl SqlNormalizer {
    /// Create a normalizer from a validated configuration.
    ///
    /// A `cache_capacity` of zero disables memoization.
    pub fn new(config: NormalizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let cache: Box<dyn ContentKeyCache> = if config.cache_capacity == 0 {
            Box::new(NoCache)
        } else {
            Box::new(LruContentKeyCache::new(config.cache_capacity))
        };
        Ok(Self { config, cache })
    }

    /// Create a normalizer with a caller-supplied cache.
    pub fn with_cache(
        config: NormalizerConfig,
        cache: Box<dyn ContentKeyCache>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, cache })
    }

    /// Derive the content key of a raw statement.
    pub fn normalize(&self, raw: &str) -> Arc<str> {
        let text = truncate_at_char_boundary(raw, self.config.max_statement_len);
        let max_tokens = self.config.max_tokens;
        let (key, hit) = self.cache.get_or_insert_with(
            text,
            Box::new(move || Arc::from(normalize_statement(text, max_tokens))),
        );
        trace!(hit, len = text.len(), "normalized statement");
        key
    }

    /// Cache statistics, or None when caching is disabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.stats()
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }
}

impl Default for SqlNormalizer {
    fn default() -> Self {
        Self {
            config: NormalizerConfig::default(),
            cache: Box::new(LruContentKeyCache::new(
                NormalizerConfig::default().cache_capacity,
            )),
        }
    }
}

impl std::fmt::Debug for SqlNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlNormalizer")
            .field("config", &self.config)
            .field("cache", &self.cache.stats())
            .finish()
    }
}

/// Cut `text` to at most `max_len` bytes without splitting a character.
pub fn truncate_at_char_boundary(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Normalize one statement without caching.
///
/// Literals become `?`, keywords are uppercased, value lists collapse to
/// `(?)` and whitespace is canonicalized. At most `max_tokens` tokens are
/// written; a longer statement ends with [`TRUNCATION_MARKER`].
pub fn normalize_statement(text: &str, max_tokens: usize) -> String {
    let mut tokens = collapse(Lexer::new(text));

    while tokens.last() == Some(&Token::Semicolon) {
        tokens.pop();
    }

    let truncated = tokens.len() > max_tokens;
    tokens.truncate(max_tokens);

    let mut out = String::with_capacity(text.len().min(1024));
    let mut prev: Option<Token<'_>> = None;
    for token in tokens {
        if prev.is_some_and(|p| needs_space(p, token)) {
            out.push(' ');
        }
        write_token(&mut out, token);
        prev = Some(token);
    }
    if truncated {
        out.push_str(TRUNCATION_MARKER);
    }
    out
}

/// Collapse literal-only parenthesized groups, and repeated row groups after
/// `VALUES`, while the token stream is being collected.
fn collapse<'a>(lexer: Lexer<'a>) -> Vec<Token<'a>> {
    let mut out: Vec<Token<'a>> = Vec::new();
    let mut opens: Vec<usize> = Vec::new();

    for token in lexer {
        match token {
            Token::Open => {
                opens.push(out.len());
                out.push(token);
            }
            Token::Close => {
                let Some(start) = opens.pop() else {
                    out.push(token);
                    continue;
                };
                let inner = &out[start + 1..];
                let literal_only = inner.contains(&Token::Literal)
                    && inner
                        .iter()
                        .all(|t| matches!(t, Token::Literal | Token::Comma));
                if literal_only {
                    out.truncate(start + 1);
                    out.push(Token::Literal);
                }
                out.push(Token::Close);

                // VALUES (?, NOW()), (?, NOW()) -> VALUES (?, NOW())
                if repeats_previous_row(&out, start) {
                    out.truncate(start - 1);
                }
            }
            _ => out.push(token),
        }
    }
    out
}

/// The group at `out[start..]` follows `VALUES <row> ,` and matches that row.
///
/// Earlier repeats are already dropped, so the previous row always sits
/// directly after the keyword.
fn repeats_previous_row(out: &[Token<'_>], start: usize) -> bool {
    let Some(prev_close) = start.checked_sub(2) else {
        return false;
    };
    if out[start - 1] != Token::Comma || out[prev_close] != Token::Close {
        return false;
    }

    let mut depth = 0usize;
    let mut prev_open = None;
    for (i, token) in out[..=prev_close].iter().enumerate().rev() {
        match token {
            Token::Close => depth += 1,
            Token::Open => {
                depth -= 1;
                if depth == 0 {
                    prev_open = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(prev_open) = prev_open else {
        return false;
    };

    prev_open > 0
        && matches!(out[prev_open - 1], Token::Keyword("VALUES" | "VALUE"))
        && out[prev_open..=prev_close] == out[start..]
}

fn needs_space(prev: Token<'_>, next: Token<'_>) -> bool {
    match (prev, next) {
        (Token::Open | Token::Dot, _) => false,
        (_, Token::Close | Token::Comma | Token::Dot | Token::Semicolon) => false,
        // Function call: COUNT(*), my_func(?)
        (Token::Ident(_), Token::Open) => false,
        _ => true,
    }
}

fn write_token(out: &mut String, token: Token<'_>) {
    match token {
        Token::Keyword(kw) => out.push_str(kw),
        Token::Ident(ident) => out.push_str(ident),
        Token::Literal => out.push_str(PLACEHOLDER),
        Token::Op(op) => out.push_str(op),
        Token::Open => out.push('('),
        Token::Close => out.push(')'),
        Token::Comma => out.push(','),
        Token::Dot => out.push('.'),
        Token::Semicolon => out.push(';'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(sql: &str) -> String {
        normalize_statement(sql, 512)
    }

    #[test]
    fn test_literals_replaced() {
        assert_eq!(norm("SELECT 1"), "SELECT ?");
        assert_eq!(
            norm("select * from users where name = 'bob' and age > 30"),
            "SELECT * FROM users WHERE name = ? AND age > ?"
        );
        assert_eq!(norm("SELECT -1.5e3, +2, 0xff, x'00', TRUE"), "SELECT ?, ?, ?, ?, ?");
    }

    #[test]
    fn test_same_shape_same_key() {
        assert_eq!(norm("SELECT 1"), norm("SELECT 2"));
        assert_eq!(
            norm("select * from t where id=1"),
            norm("SELECT  *  FROM t\n WHERE id = 999 -- comment")
        );
        assert_ne!(norm("SELECT 1"), norm("INSERT INTO t VALUES (1)"));
        assert_ne!(norm("SELECT a FROM t"), norm("SELECT a FROM u"));
    }

    #[test]
    fn test_binary_minus_kept() {
        assert_eq!(norm("SELECT a - 1 FROM t"), "SELECT a - ? FROM t");
        assert_eq!(norm("SELECT a-1"), "SELECT a - ?");
        assert_eq!(norm("SELECT a = -1"), "SELECT a = ?");
    }

    #[test]
    fn test_value_lists_collapse() {
        assert_eq!(
            norm("INSERT INTO t (a, b) VALUES (1, 'x'), (2, 'y'), (3, 'z')"),
            "INSERT INTO t(a, b) VALUES (?)"
        );
        assert_eq!(
            norm("SELECT * FROM t WHERE id IN (1, 2, 3)"),
            "SELECT * FROM t WHERE id IN (?)"
        );
        assert_eq!(
            norm("SELECT * FROM t WHERE id IN (1)"),
            norm("SELECT * FROM t WHERE id IN (1,2,3,4,5)")
        );
    }

    #[test]
    fn test_null_is_a_literal() {
        assert_eq!(norm("INSERT INTO t VALUES (1, NULL)"), "INSERT INTO t VALUES (?)");
        assert_eq!(
            norm("INSERT INTO t VALUES (1, NULL)"),
            norm("INSERT INTO t VALUES (1, 2)")
        );
        assert_eq!(
            norm("SELECT * FROM t WHERE id IN (1, NULL)"),
            "SELECT * FROM t WHERE id IN (?)"
        );
        assert_eq!(norm("SELECT a FROM t WHERE b IS NULL"), "SELECT a FROM t WHERE b IS ?");
    }

    #[test]
    fn test_repeated_rows_collapse() {
        let two = norm("INSERT INTO t (a, b) VALUES (1, NOW()), (2, NOW())");
        let three = norm("INSERT INTO t (a, b) VALUES (1, NOW()), (2, NOW()), (3, NOW())");
        assert_eq!(two, "INSERT INTO t(a, b) VALUES (?, NOW())");
        assert_eq!(two, three);
        assert_eq!(
            norm("INSERT INTO t VALUES (1, DEFAULT), (2, DEFAULT), (3, DEFAULT)"),
            "INSERT INTO t VALUES (?, DEFAULT)"
        );

        // rows of different shape are kept
        assert_eq!(
            norm("INSERT INTO t VALUES (1, NOW()), (2, 3)"),
            "INSERT INTO t VALUES (?, NOW()), (?)"
        );
        // only value lists merge
        assert_eq!(norm("SELECT f(a), (b), (b)"), "SELECT f(a), (b), (b)");
    }

    #[test]
    fn test_spaced_sign() {
        assert_eq!(norm("SELECT * FROM t WHERE a = - 1"), "SELECT * FROM t WHERE a = ?");
        assert_eq!(norm("SELECT * FROM t WHERE a = - 1"), norm("SELECT * FROM t WHERE a = 1"));
    }

    #[test]
    fn test_spacing() {
        assert_eq!(norm("SELECT COUNT( * ) FROM db . t"), "SELECT COUNT(*) FROM db.t");
        assert_eq!(norm("select `order`.id from `order`;"), "SELECT `order`.id FROM `order`");
        assert_eq!(norm("SELECT f(a,b)"), "SELECT f(a, b)");
        assert_eq!(norm("SELECT 1; SELECT 2;"), "SELECT ?; SELECT ?");
    }

    #[test]
    fn test_identifier_case_kept() {
        assert_eq!(norm("select MyCol from MyTable"), "SELECT MyCol FROM MyTable");
    }

    #[test]
    fn test_bind_parameters() {
        assert_eq!(
            norm("UPDATE t SET a = ?, b = :b WHERE c = $1 AND d = @v"),
            "UPDATE t SET a = ?, b = ? WHERE c = ? AND d = @v"
        );
    }

    #[test]
    fn test_token_limit() {
        assert_eq!(normalize_statement("SELECT a, b FROM t", 3), "SELECT a, ...");
        assert_eq!(normalize_statement("SELECT a", 2), "SELECT a");
        assert_eq!(normalize_statement("SELECT a", 1), "SELECT ...");
    }

    #[test]
    fn test_unterminated_input() {
        assert_eq!(norm("SELECT 'abc"), "SELECT ?");
        assert_eq!(norm("SELECT a /* open"), "SELECT a");
        assert_eq!(norm(""), "");
        assert_eq!(norm("((("), "(((");
        assert_eq!(norm(")))"), ")))");
    }

    #[test]
    fn test_truncate_at_char_boundary() {
        assert_eq!(truncate_at_char_boundary("abc", 10), "abc");
        assert_eq!(truncate_at_char_boundary("abc", 2), "ab");
        // 'é' is two bytes
        assert_eq!(truncate_at_char_boundary("aé", 2), "a");
        assert_eq!(truncate_at_char_boundary("é", 0), "");
    }

    #[test]
    fn test_normalizer_cache_transparent() {
        let normalizer = SqlNormalizer::default();
        let cold = normalizer.normalize("SELECT * FROM t WHERE id = 7");
        let warm = normalizer.normalize("SELECT * FROM t WHERE id = 7");
        assert_eq!(cold, warm);
        assert_eq!(&*cold, "SELECT * FROM t WHERE id = ?");

        let stats = normalizer.cache_stats().unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_normalizer_without_cache() {
        let config = NormalizerConfig::default().with_cache_capacity(0);
        let normalizer = SqlNormalizer::new(config).unwrap();
        assert_eq!(&*normalizer.normalize("SELECT 1"), "SELECT ?");
        assert!(normalizer.cache_stats().is_none());
    }

    #[test]
    fn test_normalizer_statement_length_bound() {
        let config = NormalizerConfig::default().with_max_statement_len(8);
        let normalizer = SqlNormalizer::new(config).unwrap();
        assert_eq!(&*normalizer.normalize("SELECT a FROM t"), "SELECT a");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = NormalizerConfig::default().with_max_tokens(0);
        assert!(SqlNormalizer::new(config).is_err());
    }
}
