//! Fuzz target for SQL content-key normalization.
//!
//! The lexer must terminate on unbalanced quotes, open comments and stray
//! bytes, and the result must be stable: normalizing twice gives the same key.

#![no_main]

use libfuzzer_sys::fuzz_target;
use l7dissect_core::sql::{is_sql, normalize_statement};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let _ = is_sql(&text);

    let key = normalize_statement(&text, 64);
    assert_eq!(key, normalize_statement(&text, 64));
});
