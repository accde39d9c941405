//! Lexical scanner for SQL statement text.
//!
//! Only as much of the MySQL lexical grammar as normalization needs: words,
//! quoted identifiers, literals, bind parameters, punctuation and operators.
//! Whitespace and comments are dropped. Every literal collapses to
//! [`Token::Literal`]. The scanner accepts any input: unterminated strings and
//! comments run to the end of the text.

use std::cmp::Ordering;

/// A lexical token borrowed from the statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// Reserved word, uppercased.
    Keyword(&'static str),
    /// Identifier, backtick-quoted identifier or user variable, as written.
    Ident(&'a str),
    /// String, numeric, boolean or NULL literal, or a bind parameter.
    Literal,
    /// Operator.
    Op(&'a str),
    Open,
    Close,
    Comma,
    Dot,
    Semicolon,
}

/// Keywords recognized by the normalizer (sorted, uppercase).
const KEYWORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BEGIN", "BETWEEN", "BY", "CASE",
    "COLLATE", "COLUMN", "COMMIT", "CREATE", "CROSS", "DATABASE", "DEFAULT", "DELETE", "DESC",
    "DISTINCT", "DROP", "DUPLICATE", "ELSE", "END", "ESCAPE", "EXISTS", "EXPLAIN", "FOR",
    "FORCE", "FROM", "FULL", "GROUP", "HAVING", "IF", "IGNORE", "IN", "INDEX", "INNER",
    "INSERT", "INTERVAL", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE", "LIMIT", "LOCK", "MODE",
    "NATURAL", "NOT", "OFFSET", "ON", "OR", "ORDER", "OUTER", "PRIMARY", "REGEXP",
    "REPLACE", "RIGHT", "ROLLBACK", "SCHEMA", "SELECT", "SET", "SHARE", "SHOW", "START",
    "TABLE", "THEN", "TRANSACTION", "TRUNCATE", "UNION", "UNIQUE", "UPDATE", "USE", "USING",
    "VALUE", "VALUES", "VIEW", "WHEN", "WHERE", "WITH", "XOR",
];

/// Multi-character operators, longest first.
const OPERATORS: &[&str] = &[
    "<=>", "->>", "<=", ">=", "<>", "!=", ":=", "||", "&&", "<<", ">>", "->",
];

/// Look up a reserved word, case-insensitively.
pub(crate) fn keyword(word: &str) -> Option<&'static str> {
    KEYWORDS
        .binary_search_by(|k| cmp_ignore_case(k, word))
        .ok()
        .map(|i| KEYWORDS[i])
}

/// Compare an uppercase table entry with an arbitrary-case word.
fn cmp_ignore_case(upper: &str, word: &str) -> Ordering {
    upper
        .bytes()
        .cmp(word.bytes().map(|b| b.to_ascii_uppercase()))
}

#[inline]
fn is_word_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

#[inline]
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

#[inline]
fn is_blank(b: u8) -> bool {
    b.is_ascii_whitespace() || b < 0x20 || b == 0x7f
}

/// Streaming tokenizer over one statement.
pub(crate) struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    last: Option<Token<'a>>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            last: None,
        }
    }

    #[inline]
    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    /// A `+`/`-` here would be a sign rather than a binary operator.
    fn sign_allowed(&self) -> bool {
        matches!(
            self.last,
            None | Some(Token::Open | Token::Comma | Token::Op(_) | Token::Keyword(_))
        )
    }

    /// The previous token ends a value, so `.` is member access.
    fn after_operand(&self) -> bool {
        matches!(
            self.last,
            Some(Token::Ident(_) | Token::Literal | Token::Close)
        )
    }

    fn skip_line(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) {
        self.pos += 2;
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'*' && self.peek(1) == Some(b'/') {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }

    /// Skip a quoted string starting at the opening quote.
    fn skip_string(&mut self, quote: u8) {
        self.pos += 1;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b == b'\\' {
                self.pos += 2;
                continue;
            }
            if b == quote {
                if self.peek(1) == Some(quote) {
                    self.pos += 2;
                    continue;
                }
                self.pos += 1;
                return;
            }
            self.pos += 1;
        }
        self.pos = self.pos.min(self.bytes.len());
    }

    /// Backtick-quoted identifier, quotes included.
    fn quoted_ident(&mut self) -> Token<'a> {
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'`' {
                if self.peek(1) == Some(b'`') {
                    self.pos += 2;
                    continue;
                }
                self.pos += 1;
                return Token::Ident(&self.src[start..self.pos]);
            }
            self.pos += 1;
        }
        Token::Ident(&self.src[start..])
    }

    fn skip_digits(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
    }

    fn skip_word(&mut self) {
        while self.pos < self.bytes.len() && is_word_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
    }

    /// Consume `e10`, `E-3`, `e+7` if present.
    fn skip_exponent(&mut self) {
        if !matches!(self.peek(0), Some(b'e' | b'E')) {
            return;
        }
        let mut ahead = 1;
        if matches!(self.peek(ahead), Some(b'+' | b'-')) {
            ahead += 1;
        }
        if self.peek(ahead).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += ahead;
            self.skip_digits();
        }
    }

    /// Number starting at a digit or at `.digit`.
    ///
    /// MySQL identifiers may start with digits (`1col`), so a digit run that
    /// continues into word characters is an identifier.
    fn number_or_ident(&mut self) -> Token<'a> {
        let start = self.pos;

        if self.bytes[start] == b'0' && matches!(self.peek(1), Some(b'x' | b'X' | b'b' | b'B')) {
            self.skip_word();
            let digits = &self.bytes[start + 2..self.pos];
            let valid = match self.bytes[start + 1] {
                b'x' | b'X' => !digits.is_empty() && digits.iter().all(u8::is_ascii_hexdigit),
                _ => !digits.is_empty() && digits.iter().all(|b| matches!(b, b'0' | b'1')),
            };
            return if valid {
                Token::Literal
            } else {
                Token::Ident(&self.src[start..self.pos])
            };
        }

        self.skip_digits();
        if self.peek(0) == Some(b'.') {
            self.pos += 1;
            self.skip_digits();
        }
        self.skip_exponent();

        if self.peek(0).is_some_and(is_word_byte) {
            self.skip_word();
            return Token::Ident(&self.src[start..self.pos]);
        }
        Token::Literal
    }

    fn word(&mut self) -> Token<'a> {
        let start = self.pos;
        self.skip_word();
        let word = &self.src[start..self.pos];

        // Introducers: x'..', b'..', N'..', _utf8mb4'..'
        if self.peek(0) == Some(b'\'')
            && (word.starts_with('_')
                || ["x", "b", "n"].iter().any(|p| word.eq_ignore_ascii_case(p)))
        {
            self.skip_string(b'\'');
            return Token::Literal;
        }

        if ["true", "false", "null"].iter().any(|lit| word.eq_ignore_ascii_case(lit)) {
            return Token::Literal;
        }

        match keyword(word) {
            Some(kw) => Token::Keyword(kw),
            None => Token::Ident(word),
        }
    }

    fn operator(&mut self) -> Token<'a> {
        let rest = &self.bytes[self.pos..];
        let len = OPERATORS
            .iter()
            .find(|op| rest.starts_with(op.as_bytes()))
            .map_or(1, |op| op.len());
        let start = self.pos;
        self.pos += len;
        Token::Op(&self.src[start..self.pos])
    }

    fn scan(&mut self) -> Option<Token<'a>> {
        loop {
            while self.pos < self.bytes.len() && is_blank(self.bytes[self.pos]) {
                self.pos += 1;
            }
            let b = *self.bytes.get(self.pos)?;

            let token = match b {
                b'#' => {
                    self.skip_line();
                    continue;
                }
                b'-' if self.peek(1) == Some(b'-') && self.peek(2).map_or(true, is_blank) => {
                    self.skip_line();
                    continue;
                }
                b'/' if self.peek(1) == Some(b'*') => {
                    self.skip_block_comment();
                    continue;
                }
                b'\'' | b'"' => {
                    self.skip_string(b);
                    Token::Literal
                }
                b'`' => self.quoted_ident(),
                b'0'..=b'9' => self.number_or_ident(),
                b'.' if !self.after_operand() && self.starts_number(0) => self.number_or_ident(),
                b'+' | b'-'
                    if self.sign_allowed() && self.starts_number(1 + self.blanks_at(1)) =>
                {
                    let sign = self.pos;
                    self.pos += 1 + self.blanks_at(1);
                    match self.number_or_ident() {
                        Token::Literal => Token::Literal,
                        // `-1col` is an operator and an identifier
                        _ => {
                            self.pos = sign + 1;
                            Token::Op(&self.src[sign..sign + 1])
                        }
                    }
                }
                b'?' => {
                    self.pos += 1;
                    Token::Literal
                }
                b':' if self.peek(1).is_some_and(|c| c.is_ascii_alphabetic() || c == b'_') => {
                    self.pos += 1;
                    self.skip_word();
                    Token::Literal
                }
                b'$' if self.peek(1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.pos += 1;
                    self.skip_digits();
                    Token::Literal
                }
                b'@' => {
                    let start = self.pos;
                    self.pos += 1;
                    if self.peek(0) == Some(b'@') {
                        self.pos += 1;
                    }
                    while self.pos < self.bytes.len()
                        && (is_word_byte(self.bytes[self.pos]) || self.bytes[self.pos] == b'.')
                    {
                        self.pos += 1;
                    }
                    Token::Ident(&self.src[start..self.pos])
                }
                b'(' => self.punct(Token::Open),
                b')' => self.punct(Token::Close),
                b',' => self.punct(Token::Comma),
                b'.' => self.punct(Token::Dot),
                b';' => self.punct(Token::Semicolon),
                b if is_word_start(b) => self.word(),
                _ => self.operator(),
            };
            return Some(token);
        }
    }

    /// Number of blank bytes starting `ahead` bytes from the cursor.
    fn blanks_at(&self, ahead: usize) -> usize {
        self.bytes
            .get(self.pos + ahead..)
            .map_or(0, |rest| rest.iter().take_while(|&&b| is_blank(b)).count())
    }

    fn starts_number(&self, ahead: usize) -> bool {
        match self.peek(ahead) {
            Some(c) if c.is_ascii_digit() => true,
            Some(b'.') => self.peek(ahead + 1).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    fn punct(&mut self, token: Token<'a>) -> Token<'a> {
        self.pos += 1;
        token
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.scan()?;
        self.last = Some(token);
        Some(token)
    }
}
