use thiserror::Error;

/// Lexical error with the byte offset it occurred at.
#[derive(Debug, Clone, Error)]
#[error("{msg} at offset {at}")]
pub struct SyntaxError {
    pub msg: String,
    pub at: usize,
}

/// Low-level cursor over source text. Shared by the configuration-file
/// parser and the path-expression parser.
pub struct Cursor<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn err(&self, msg: impl Into<String>) -> SyntaxError {
        SyntaxError {
            msg: msg.into(),
            at: self.i,
        }
    }

    /// An identifier: `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn parse_identifier(&mut self) -> Result<String, SyntaxError> {
        let start = self.i;
        if let Some(c) = self.peek_char() {
            if c == '_' || c.is_ascii_alphabetic() {
                self.i += c.len_utf8();
            }
        }
        if self.i == start {
            return Err(self.err("identifier expected"));
        }
        while let Some(c) = self.peek_char() {
            if c == '_' || c.is_ascii_alphanumeric() {
                self.i += 1;
            } else {
                break;
            }
        }
        Ok(self.s[start..self.i].to_string())
    }

    /// An optionally signed integer or float literal. Returns the raw slice
    /// and whether it contained a fractional part.
    pub fn parse_number(&mut self) -> Result<(&'a str, bool), SyntaxError> {
        let start = self.i;
        if self.peek_char() == Some('-') {
            self.i += 1;
        }
        let digits_start = self.i;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else {
                break;
            }
        }
        if self.i == digits_start {
            return Err(self.err("number expected"));
        }
        let mut is_float = false;
        if self.peek_char() == Some('.') {
            is_float = true;
            self.i += 1;
            let frac_start = self.i;
            while let Some(c) = self.peek_char() {
                if c.is_ascii_digit() {
                    self.i += 1;
                } else {
                    break;
                }
            }
            if self.i == frac_start {
                return Err(self.err("digits expected after decimal point"));
            }
        }
        Ok((&self.s[start..self.i], is_float))
    }

    /// A double-quoted string literal, unescaped. Interpolation markers
    /// `\(...)` are left to the caller: the returned segments alternate
    /// literal text and raw interpolation sources.
    pub fn parse_string_segments(&mut self) -> Result<Vec<StringSegment>, SyntaxError> {
        if !self.consume_char('"') {
            return Err(self.err("expected '\"'"));
        }
        let mut segments = Vec::new();
        let mut lit = String::new();
        while let Some(c) = self.peek_char() {
            self.i += c.len_utf8();
            match c {
                '"' => {
                    segments.push(StringSegment::Literal(lit));
                    return Ok(segments);
                }
                '\\' => {
                    let nc = self.peek_char().ok_or_else(|| self.err("unterminated string"))?;
                    self.i += nc.len_utf8();
                    match nc {
                        'n' => lit.push('\n'),
                        't' => lit.push('\t'),
                        'r' => lit.push('\r'),
                        '\\' => lit.push('\\'),
                        '"' => lit.push('"'),
                        '(' => {
                            let inner = self.capture_balanced(')')?;
                            segments.push(StringSegment::Literal(std::mem::take(&mut lit)));
                            segments.push(StringSegment::Interpolation(inner.to_string()));
                        }
                        _ => return Err(self.err(format!("unknown escape '\\{nc}'"))),
                    }
                }
                _ => lit.push(c),
            }
        }
        Err(self.err("unterminated string"))
    }

    /// Capture up to (and consume) the matching `close`, honoring nested
    /// parentheses. Used for interpolation bodies.
    fn capture_balanced(&mut self, close: char) -> Result<&'a str, SyntaxError> {
        let start = self.i;
        let mut depth = 0usize;
        while let Some(c) = self.peek_char() {
            if c == close && depth == 0 {
                let inner = &self.s[start..self.i];
                self.i += c.len_utf8();
                return Ok(inner);
            }
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
            self.i += c.len_utf8();
        }
        Err(self.err(format!("expected '{close}'")))
    }

    pub fn expect(&mut self, c: char) -> Result<(), SyntaxError> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(self.err(format!("expected '{c}'")))
        }
    }

    pub fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consume `lit` only if it is followed by a non-identifier character,
    /// so `stringify` is not read as the keyword `string`.
    pub fn consume_keyword(&mut self, lit: &str) -> bool {
        if !self.s[self.i..].starts_with(lit) {
            return false;
        }
        let after = self.s[self.i + lit.len()..].chars().next();
        if matches!(after, Some(c) if c == '_' || c.is_ascii_alphanumeric()) {
            return false;
        }
        self.i += lit.len();
        true
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    /// Skip whitespace and `//` line comments.
    pub fn skip_ws(&mut self) {
        loop {
            while let Some(c) = self.peek_char() {
                if c.is_whitespace() {
                    self.i += c.len_utf8();
                } else {
                    break;
                }
            }
            if self.s[self.i..].starts_with("//") {
                while let Some(c) = self.peek_char() {
                    self.i += c.len_utf8();
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }
            return;
        }
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}

/// One piece of a string literal: literal text or the raw source of a
/// `\(...)` interpolation.
#[derive(Debug, Clone, PartialEq)]
pub enum StringSegment {
    Literal(String),
    Interpolation(String),
}
