//! Configuration for the normalizer and the dispatch pipelines.

use crate::error::ConfigError;

/// Configuration for [`SqlNormalizer`](crate::sql::SqlNormalizer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Maximum number of cached content keys. Zero disables the cache.
    pub cache_capacity: usize,
    /// Maximum number of lexical tokens kept in a content key.
    pub max_tokens: usize,
    /// Statements longer than this (bytes) are cut before normalization.
    pub max_statement_len: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            // ~10k distinct statements
            cache_capacity: 10_000,
            max_tokens: 512,
            // 16 KB
            max_statement_len: 16 * 1024,
        }
    }
}

impl NormalizerConfig {
    pub fn with_cache_capacity(mut self, cache_capacity: usize) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_max_statement_len(mut self, max_statement_len: usize) -> Self {
        self.max_statement_len = max_statement_len;
        self
    }

    /// Check that all limits are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tokens == 0 {
            return Err(ConfigError::ZeroLimit { field: "max_tokens" });
        }
        if self.max_statement_len == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_statement_len",
            });
        }
        Ok(())
    }
}

/// Configuration for protocol dispatch pipelines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Register the catch-all generic dissector for each direction.
    pub use_fallback: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { use_fallback: true }
    }
}

impl PipelineConfig {
    pub fn with_fallback(mut self, use_fallback: bool) -> Self {
        self.use_fallback = use_fallback;
        self
    }
}
