//! # Syntax Normalizer
//!
//! Parses configuration text written in either strict JSON or the relaxed,
//! human-editable Hjson-style syntax, and produces a [`CanonicalDocument`].
//!
//! Strict JSON is a subset of the relaxed grammar, so a single recursive
//! descent parser serves both. The relaxed extensions are:
//!
//! - `#`, `//` line comments and `/* */` block comments
//! - unquoted and single-quoted keys
//! - newlines as separators, and trailing commas
//! - omitted braces around a root mapping
//! - quoteless string values, which run to the end of the line
//! - `'''` multi-line strings with common indentation removed
//!
//! `true`, `false`, `null` and numbers are only recognized when nothing but
//! a separator, a closing delimiter or a comment follows them on the line.
//! Otherwise the text is a quoteless string: `3 apples` is a string.
//!
//! Duplicate keys in one mapping are a syntax error in both syntaxes.

use serde_json::{Map, Value};

use crate::document::{canonical_number, CanonicalDocument};
use crate::error::SyntaxError;

/// Deepest nesting of mappings and sequences accepted.
pub const MAX_DEPTH: usize = 128;

/// Parse configuration text into a canonical document.
///
/// Empty or comment-only text yields an empty mapping.
///
/// # Errors
///
/// Returns [`SyntaxError`] with the 1-based line and column of the first
/// offending character.
pub fn normalize(text: &str) -> Result<CanonicalDocument, SyntaxError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut parser = Parser::new(text);
    let root = parser.parse_root()?;
    tracing::trace!(chars = parser.chars.len(), "normalized configuration text");
    Ok(CanonicalDocument::from_canonical(root))
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Cursor helpers
    // -----------------------------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn starts_with(&self, idx: usize, pat: &str) -> bool {
        pat.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(idx + i) == Some(c))
    }

    fn is_comment_start(&self, idx: usize) -> bool {
        match self.peek_at(idx) {
            Some('#') => true,
            Some('/') => matches!(self.peek_at(idx + 1), Some('/') | Some('*')),
            _ => false,
        }
    }

    fn line_end(&self, from: usize) -> usize {
        (from..self.chars.len())
            .find(|&i| self.chars[i] == '\n')
            .unwrap_or(self.chars.len())
    }

    /// 1-based line and column of a char index.
    fn location(&self, idx: usize) -> (usize, usize) {
        let mut line = 1;
        let mut column = 1;
        for &c in self.chars.iter().take(idx) {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        (line, column)
    }

    fn error_at(&self, idx: usize, message: impl Into<String>) -> SyntaxError {
        let (line, column) = self.location(idx);
        SyntaxError::new(line, column, message)
    }

    fn describe_current(&self) -> String {
        match self.peek() {
            Some(c) => format!("'{}'", c.escape_default()),
            None => "end of input".to_string(),
        }
    }

    /// Skip whitespace and comments. Returns true if a newline was crossed.
    fn skip_insignificant(&mut self) -> Result<bool, SyntaxError> {
        let mut saw_newline = false;
        loop {
            match self.peek() {
                Some('\n') => {
                    saw_newline = true;
                    self.pos += 1;
                }
                Some(c) if c.is_whitespace() => self.pos += 1,
                Some('#') => self.pos = self.line_end(self.pos),
                Some('/') if self.peek_at(self.pos + 1) == Some('/') => {
                    self.pos = self.line_end(self.pos);
                }
                Some('/') if self.peek_at(self.pos + 1) == Some('*') => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        if self.at_end() {
                            return Err(self.error_at(start, "unterminated block comment"));
                        }
                        if self.starts_with(self.pos, "*/") {
                            self.pos += 2;
                            break;
                        }
                        if self.chars[self.pos] == '\n' {
                            saw_newline = true;
                        }
                        self.pos += 1;
                    }
                }
                _ => return Ok(saw_newline),
            }
        }
    }

    fn enter(&mut self) -> Result<(), SyntaxError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error_at(
                self.pos,
                format!("nesting exceeds maximum depth of {MAX_DEPTH}"),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Grammar
    // -----------------------------------------------------------------------

    fn parse_root(&mut self) -> Result<Value, SyntaxError> {
        self.skip_insignificant()?;
        if self.at_end() {
            return Ok(Value::Object(Map::new()));
        }

        let root = if matches!(self.peek(), Some('{') | Some('[')) || !self.looks_like_member() {
            self.parse_value()?
        } else {
            self.parse_members(None)?
        };

        self.skip_insignificant()?;
        if !self.at_end() {
            return Err(self.error_at(
                self.pos,
                format!("unexpected {} after document root", self.describe_current()),
            ));
        }
        Ok(root)
    }

    /// True if the cursor is at `key:`, which marks a braceless root mapping.
    fn looks_like_member(&mut self) -> bool {
        let saved = self.pos;
        let is_member = self.parse_key().is_ok()
            && self.skip_insignificant().is_ok()
            && self.peek() == Some(':');
        self.pos = saved;
        is_member
    }

    fn parse_value(&mut self) -> Result<Value, SyntaxError> {
        self.skip_insignificant()?;
        match self.peek() {
            None => Err(self.error_at(self.pos, "expected a value, found end of input")),
            Some('{') => {
                let open = self.pos;
                self.pos += 1;
                self.parse_members(Some(open))
            }
            Some('[') => self.parse_sequence(),
            Some('"') => self.parse_quoted('"').map(Value::String),
            Some('\'') if self.starts_with(self.pos, "'''") => {
                self.parse_multiline().map(Value::String)
            }
            Some('\'') => self.parse_quoted('\'').map(Value::String),
            Some(c @ (',' | ':' | ']' | '}')) => Err(self.error_at(
                self.pos,
                format!("expected a value, found '{c}'"),
            )),
            Some(_) => self.parse_bare(),
        }
    }

    /// Parse mapping members. `open` is the index of the `{`, or `None` for a
    /// braceless root mapping that ends at end of input.
    fn parse_members(&mut self, open: Option<usize>) -> Result<Value, SyntaxError> {
        self.enter()?;
        let mut map = Map::new();

        loop {
            self.skip_insignificant()?;
            match (open, self.peek()) {
                (Some(_), Some('}')) => {
                    self.pos += 1;
                    break;
                }
                (None, None) => break,
                (Some(open), None) => {
                    let (line, column) = self.location(open);
                    return Err(self.error_at(
                        self.pos,
                        format!("unbalanced '{{' opened at line {line}, column {column}: expected '}}'"),
                    ));
                }
                (None, Some('}')) => {
                    return Err(self.error_at(self.pos, "unbalanced '}' without matching '{'"));
                }
                _ => {}
            }

            let key_start = self.pos;
            let key = self.parse_key()?;
            self.skip_insignificant()?;
            if self.peek() != Some(':') {
                return Err(self.error_at(
                    self.pos,
                    format!("expected ':' after key '{key}', found {}", self.describe_current()),
                ));
            }
            self.pos += 1;

            let value = self.parse_value()?;
            if map.contains_key(&key) {
                return Err(self.error_at(key_start, format!("duplicate key '{key}'")));
            }
            map.insert(key, value);

            let close = if open.is_some() { Some('}') } else { None };
            self.expect_separator(close, "mapping member")?;
        }

        self.depth -= 1;
        Ok(Value::Object(map))
    }

    fn parse_sequence(&mut self) -> Result<Value, SyntaxError> {
        let open = self.pos;
        self.pos += 1;
        self.enter()?;
        let mut items = Vec::new();

        loop {
            self.skip_insignificant()?;
            match self.peek() {
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                None => {
                    let (line, column) = self.location(open);
                    return Err(self.error_at(
                        self.pos,
                        format!("unbalanced '[' opened at line {line}, column {column}: expected ']'"),
                    ));
                }
                _ => {}
            }
            items.push(self.parse_value()?);
            self.expect_separator(Some(']'), "sequence element")?;
        }

        self.depth -= 1;
        Ok(Value::Array(items))
    }

    /// After a member or element: accept `,`, a newline, or the closing
    /// delimiter (left unconsumed).
    fn expect_separator(&mut self, close: Option<char>, what: &str) -> Result<(), SyntaxError> {
        let saw_newline = self.skip_insignificant()?;
        match self.peek() {
            Some(',') => {
                self.pos += 1;
                Ok(())
            }
            None => Ok(()),
            Some(c) if Some(c) == close => Ok(()),
            Some(_) if saw_newline => Ok(()),
            Some(c) => {
                let expected = match close {
                    Some(d) => format!("',' or '{d}'"),
                    None => "',' or a newline".to_string(),
                };
                Err(self.error_at(
                    self.pos,
                    format!("expected {expected} after {what}, found '{}'", c.escape_default()),
                ))
            }
        }
    }

    fn parse_key(&mut self) -> Result<String, SyntaxError> {
        match self.peek() {
            Some('"') => self.parse_quoted('"'),
            Some('\'') => self.parse_quoted('\''),
            _ => {
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c.is_whitespace() || matches!(c, ',' | ':' | '[' | ']' | '{' | '}') {
                        break;
                    }
                    self.pos += 1;
                }
                if self.pos == start {
                    return Err(self.error_at(
                        start,
                        format!("expected a key, found {}", self.describe_current()),
                    ));
                }
                Ok(self.chars[start..self.pos].iter().collect())
            }
        }
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, SyntaxError> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();

        loop {
            let Some(c) = self.peek() else {
                return Err(self.error_at(start, "unterminated string"));
            };
            match c {
                c if c == quote => {
                    self.pos += 1;
                    return Ok(out);
                }
                '\\' => {
                    self.pos += 1;
                    out.push(self.parse_escape()?);
                }
                c if (c as u32) < 0x20 => {
                    return Err(self.error_at(
                        self.pos,
                        format!("unescaped control character '{}' in string", c.escape_default()),
                    ));
                }
                c => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    /// Cursor is just past the backslash.
    fn parse_escape(&mut self) -> Result<char, SyntaxError> {
        let at = self.pos.saturating_sub(1);
        let Some(c) = self.peek() else {
            return Err(self.error_at(at, "unterminated escape sequence"));
        };
        self.pos += 1;
        let decoded = match c {
            '"' => '"',
            '\'' => '\'',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{0008}',
            'f' => '\u{000c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => {
                let high = self.parse_hex4(at)?;
                if (0xD800..0xDC00).contains(&high) {
                    if !self.starts_with(self.pos, "\\u") {
                        return Err(self.error_at(at, "unpaired high surrogate in \\u escape"));
                    }
                    self.pos += 2;
                    let low = self.parse_hex4(at)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(self.error_at(at, "invalid low surrogate in \\u escape"));
                    }
                    let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(combined)
                        .ok_or_else(|| self.error_at(at, "invalid \\u escape"));
                }
                if (0xDC00..0xE000).contains(&high) {
                    return Err(self.error_at(at, "unpaired low surrogate in \\u escape"));
                }
                return char::from_u32(high).ok_or_else(|| self.error_at(at, "invalid \\u escape"));
            }
            other => {
                return Err(self.error_at(
                    at,
                    format!("invalid escape sequence '\\{}'", other.escape_default()),
                ));
            }
        };
        Ok(decoded)
    }

    fn parse_hex4(&mut self, at: usize) -> Result<u32, SyntaxError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error_at(at, "\\u escape requires four hex digits"))?;
            code = code * 16 + digit;
            self.pos += 1;
        }
        Ok(code)
    }

    /// `'''` multi-line string. Indentation up to the column of the opening
    /// quotes is removed from every line.
    fn parse_multiline(&mut self) -> Result<String, SyntaxError> {
        let start = self.pos;
        let indent = self.location(start).1 - 1;
        self.pos += 3;

        while matches!(self.peek(), Some(' ' | '\t' | '\r')) {
            self.pos += 1;
        }
        let strip_first = if self.peek() == Some('\n') {
            self.pos += 1;
            true
        } else {
            false
        };

        let body_start = self.pos;
        loop {
            if self.at_end() {
                return Err(self.error_at(start, "unterminated multi-line string"));
            }
            if self.starts_with(self.pos, "'''") {
                break;
            }
            self.pos += 1;
        }
        let raw: String = self.chars[body_start..self.pos]
            .iter()
            .filter(|&&c| c != '\r')
            .collect();
        self.pos += 3;

        let mut lines: Vec<String> = raw
            .split('\n')
            .enumerate()
            .map(|(i, line)| {
                if i == 0 && !strip_first {
                    line.to_string()
                } else {
                    strip_indent(line, indent)
                }
            })
            .collect();
        if lines.len() > 1 && lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        Ok(lines.join("\n"))
    }

    /// A keyword, a number, or a quoteless string.
    fn parse_bare(&mut self) -> Result<Value, SyntaxError> {
        let start = self.pos;

        let mut token_end = start;
        while let Some(c) = self.peek_at(token_end) {
            if c.is_whitespace() || matches!(c, ',' | ']' | '}') || self.is_comment_start(token_end) {
                break;
            }
            token_end += 1;
        }

        // Look past same-line whitespace only; the line end is not scanned
        // unless the token turns out to be a quoteless string.
        let mut after = token_end;
        while matches!(self.peek_at(after), Some(c) if c != '\n' && c.is_whitespace()) {
            after += 1;
        }
        let terminated = match self.peek_at(after) {
            None | Some('\n' | ',' | ']' | '}') => true,
            Some(_) => self.is_comment_start(after),
        };

        if terminated && token_end > start {
            let token: String = self.chars[start..token_end].iter().collect();
            let literal = match token.as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                "null" => Some(Value::Null),
                other => match parse_number(other) {
                    Some(NumberLiteral::Int(n)) => Some(Value::Number(n.into())),
                    Some(NumberLiteral::Float(f)) => match canonical_number(f) {
                        Some(n) => Some(Value::Number(n)),
                        None => {
                            return Err(self.error_at(start, format!("number out of range: {other}")));
                        }
                    },
                    None => None,
                },
            };
            if let Some(value) = literal {
                self.pos = token_end;
                return Ok(value);
            }
        }

        let line_end = self.line_end(start);
        let text: String = self.chars[start..line_end].iter().collect();
        self.pos = line_end;
        Ok(Value::String(text.trim_end().to_string()))
    }
}

fn strip_indent(line: &str, indent: usize) -> String {
    let mut removed = 0;
    let mut rest = line;
    while removed < indent {
        match rest.chars().next() {
            Some(c) if c == ' ' || c == '\t' => {
                rest = &rest[c.len_utf8()..];
                removed += 1;
            }
            _ => break,
        }
    }
    rest.to_string()
}

enum NumberLiteral {
    Int(i64),
    Float(f64),
}

/// Parse a JSON number literal. Returns `None` if the token is not one.
fn parse_number(token: &str) -> Option<NumberLiteral> {
    let bytes = token.as_bytes();
    let mut i = 0;
    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }
    let int_start = i;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    let int_len = i - int_start;
    if int_len == 0 || (int_len > 1 && bytes[int_start] == b'0') {
        return None;
    }
    let mut integral = true;
    if bytes.get(i) == Some(&b'.') {
        integral = false;
        i += 1;
        let frac_start = i;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        if i == frac_start {
            return None;
        }
    }
    if matches!(bytes.get(i), Some(b'e') | Some(b'E')) {
        integral = false;
        i += 1;
        if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
            i += 1;
        }
        let exp_start = i;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        if i == exp_start {
            return None;
        }
    }
    if i != bytes.len() {
        return None;
    }
    if integral {
        if let Ok(n) = token.parse::<i64>() {
            return Some(NumberLiteral::Int(n));
        }
    }
    token.parse::<f64>().ok().map(NumberLiteral::Float)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> Value {
        normalize(text).unwrap().into_value()
    }

    fn parse_err(text: &str) -> SyntaxError {
        normalize(text).unwrap_err()
    }

    #[test]
    fn strict_json_document() {
        let v = parse(r#"{"rules": {"roles": ["Admin", "Guest"]}, "n": 3, "ok": true, "x": null}"#);
        assert_eq!(
            v,
            json!({"rules": {"roles": ["Admin", "Guest"]}, "n": 3, "ok": true, "x": null})
        );
    }

    #[test]
    fn relaxed_document_matches_strict_equivalent() {
        let relaxed = r#"
        # security rules
        {
          rules: {
            // the roles
            roles: [
              Admin
              'Guest',
            ],
            /* no filters
               yet */
          },
        }
        "#;
        let strict = r#"{"rules": {"roles": ["Admin", "Guest"]}}"#;
        assert_eq!(normalize(relaxed).unwrap(), normalize(strict).unwrap());
    }

    #[test]
    fn braceless_root_mapping() {
        let v = parse("variables: {\n  hour: hour_replace\n  limit: 10\n}\n");
        assert_eq!(v, json!({"variables": {"hour": "hour_replace", "limit": 10}}));
    }

    #[test]
    fn empty_and_comment_only_input_is_empty_mapping() {
        assert_eq!(parse(""), json!({}));
        assert_eq!(parse("  \n\t"), json!({}));
        assert_eq!(parse("# nothing\n// here\n/* at all */"), json!({}));
        assert!(normalize("").unwrap().is_empty());
    }

    #[test]
    fn quoteless_strings_run_to_end_of_line() {
        let v = parse("{\n  a: hello world  \n  b: 3 apples\n  c: C# rocks\n  d: http://x.y/z\n}");
        assert_eq!(
            v,
            json!({"a": "hello world", "b": "3 apples", "c": "C# rocks", "d": "http://x.y/z"})
        );
    }

    #[test]
    fn keywords_and_numbers_need_a_terminator() {
        let v = parse("{\n a: true # yes\n b: null\n c: 12, d: false\n e: truer\n f: -1.5e2\n}");
        assert_eq!(
            v,
            json!({"a": true, "b": null, "c": 12, "d": false, "e": "truer", "f": -150})
        );
    }

    #[test]
    fn numbers_are_canonical() {
        assert_eq!(parse("[1, 1.0, 1e0, 10E-1]"), json!([1, 1, 1, 1]));
        let v = parse("[2.5, -0, 9223372036854775807]");
        assert_eq!(v[0], json!(2.5));
        assert_eq!(v[1], json!(0));
        assert_eq!(v[2], json!(i64::MAX));
    }

    #[test]
    fn leading_zero_is_not_a_number() {
        assert_eq!(parse("{\n code: 007\n}"), json!({"code": "007"}));
    }

    #[test]
    fn multiline_strings_strip_indentation() {
        let text = "{\n  sql:\n    '''\n    SELECT *\n      FROM t\n    '''\n}";
        assert_eq!(parse(text), json!({"sql": "SELECT *\n  FROM t"}));
    }

    #[test]
    fn multiline_string_on_one_line() {
        assert_eq!(parse("{ a: '''inline''' }"), json!({"a": "inline"}));
    }

    #[test]
    fn escapes_in_both_quote_styles() {
        let v = parse(r#"{"a": "tab\there", 'b': 'it\'s', "c": "é😀", "d": "a\/b"}"#);
        assert_eq!(v, json!({"a": "tab\there", "b": "it's", "c": "é😀", "d": "a/b"}));
    }

    #[test]
    fn invalid_escape_is_rejected() {
        let err = parse_err(r#"{"a": "bad \q escape"}"#);
        assert!(err.message.contains("invalid escape"), "{err}");
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 12);
    }

    #[test]
    fn lone_surrogates_are_rejected() {
        assert!(parse_err(r#"["\ud83d"]"#).message.contains("surrogate"));
        assert!(parse_err(r#"["\ude00"]"#).message.contains("surrogate"));
    }

    #[test]
    fn unbalanced_delimiters_are_rejected() {
        let err = parse_err("{\n  \"a\": [1, 2\n");
        assert!(err.message.contains("unbalanced '['"), "{err}");

        let err = parse_err("{\"a\": 1");
        assert!(err.message.contains("unbalanced '{'"), "{err}");

        let err = parse_err("{\"a\": 1}}");
        assert!(err.message.contains("after document root"), "{err}");

        let err = parse_err("a: 1\n}");
        assert!(err.message.contains("unbalanced '}'"), "{err}");
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let err = parse_err("{\n  \"a\": 1,\n  a: 2\n}");
        assert!(err.message.contains("duplicate key 'a'"), "{err}");
        assert_eq!((err.line, err.column), (3, 3));
    }

    #[test]
    fn duplicate_keys_in_separate_mappings_are_fine() {
        let v = parse(r#"[{"a": 1}, {"a": 2}]"#);
        assert_eq!(v, json!([{"a": 1}, {"a": 2}]));
    }

    #[test]
    fn members_on_one_line_need_commas() {
        let err = parse_err(r#"{"a": "x" "b": 2}"#);
        assert!(err.message.contains("expected ',' or '}'"), "{err}");

        // An unterminated bare value swallows the rest of the line.
        assert!(normalize(r#"{"a": 1 "b": 2}"#).is_err());
    }

    #[test]
    fn double_comma_is_rejected() {
        assert!(normalize("[1,,2]").is_err());
        assert!(normalize("{a: 1,, b: 2}").is_err());
    }

    #[test]
    fn missing_colon_is_rejected() {
        let err = parse_err("{ rules {} }");
        assert!(err.message.contains("expected ':' after key 'rules'"), "{err}");
    }

    #[test]
    fn unterminated_constructs() {
        assert!(parse_err(r#"{"a": "open}"#).message.contains("unterminated string"));
        assert!(parse_err("{ a: 1 /* open").message.contains("unterminated block comment"));
        assert!(parse_err("{ a: '''open").message.contains("unterminated multi-line"));
    }

    #[test]
    fn control_characters_in_quoted_strings_are_rejected() {
        let err = parse_err("{\"a\": \"line\nbreak\"}");
        assert!(err.message.contains("control character"), "{err}");
    }

    #[test]
    fn excessive_nesting_is_rejected() {
        let deep = "[".repeat(MAX_DEPTH + 1) + &"]".repeat(MAX_DEPTH + 1);
        assert!(parse_err(&deep).message.contains("maximum depth"));
        let ok = "[".repeat(MAX_DEPTH) + &"]".repeat(MAX_DEPTH);
        assert!(normalize(&ok).is_ok());
    }

    #[test]
    fn scalar_roots_are_accepted() {
        assert_eq!(parse("42"), json!(42));
        assert_eq!(parse("\"text\""), json!("text"));
        assert_eq!(parse("[]"), json!([]));
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        assert_eq!(parse("\u{feff}{\"a\": 1}"), json!({"a": 1}));
    }

    #[test]
    fn insertion_order_is_preserved() {
        let doc = normalize("{ z: 1\n a: 2\n m: 3 }").unwrap();
        let keys: Vec<&String> = doc.as_value().as_object().unwrap().keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn parse_number_grammar() {
        assert!(matches!(parse_number("0"), Some(NumberLiteral::Int(0))));
        assert!(matches!(parse_number("-7"), Some(NumberLiteral::Int(-7))));
        assert!(matches!(parse_number("-12.5e1"), Some(NumberLiteral::Float(f)) if f == -125.0));
        assert!(matches!(parse_number("1E+2"), Some(NumberLiteral::Float(f)) if f == 100.0));
        assert!(matches!(
            parse_number("99999999999999999999"),
            Some(NumberLiteral::Float(_))
        ));
        for bad in ["", "-", "01", "1.", ".5", "1e", "+1", "inf", "NaN", "0x10", "1_000"] {
            assert!(parse_number(bad).is_none(), "{bad:?}");
        }
    }

    #[test]
    fn overflowing_exponent_is_rejected() {
        let err = parse_err("[1e400]");
        assert!(err.message.contains("out of range"), "{err}");
    }

    fn one_line_array(n: usize) -> String {
        let items = vec!["1"; n].join(",");
        format!(r#"{{"variables":{{"a":[{items}],"b":true,"c":null}}}}"#)
    }

    #[test]
    fn minified_literals_parse_on_one_line() {
        let doc = normalize(&one_line_array(3)).unwrap();
        assert_eq!(
            doc.as_value(),
            &json!({"variables": {"a": [1, 1, 1], "b": true, "c": null}})
        );
    }

    #[test]
    fn single_line_input_normalizes_in_linear_time() {
        let small = one_line_array(25_000);
        let large = one_line_array(200_000);

        // Warm up allocations before timing.
        normalize(&small).unwrap();

        let started = std::time::Instant::now();
        normalize(&small).unwrap();
        let small_elapsed = started.elapsed();

        let started = std::time::Instant::now();
        let doc = normalize(&large).unwrap();
        let large_elapsed = started.elapsed();

        assert_eq!(doc.as_value()["variables"]["a"].as_array().map(Vec::len), Some(200_000));
        // Eight times the input: linear is about 8x, quadratic about 64x.
        assert!(
            large_elapsed < small_elapsed * 24 + std::time::Duration::from_millis(50),
            "8x input took {large_elapsed:?} vs {small_elapsed:?}"
        );
    }
}
