//! Reading SQF literals into [`SqfValue`] trees.
//!
//! Text coming back from the host is often wrapped in one extra layer of
//! double quotes with every inner quote doubled (the result of `str` on an
//! array). [`decode`] removes that layer first, then parses what remains.

use crate::error::{DecodeError, DecodeResult};
use crate::value::{SqfMap, SqfValue};

/// Deepest array nesting the parser accepts.
pub const MAX_DEPTH: usize = 128;

/// Decode SQF text into a value tree.
///
/// If the text starts with a double quote, one host quote layer is removed:
/// the leading quote, a trailing quote when present, then every `""` pair
/// collapses to `"`. The unwrapped text is parsed when it starts with `[`;
/// any other unwrapped text is returned as a plain string. Text that is not
/// wrapped is parsed directly as a literal.
///
/// # Errors
///
/// Returns a [`DecodeError`] when the (unwrapped) text is not a well-formed
/// literal.
pub fn decode(text: &str) -> DecodeResult<SqfValue> {
    let trimmed = text.trim();
    match unwrap_host_quotes(trimmed) {
        Some(inner) if inner.trim_start().starts_with('[') => parse_literal(&inner),
        Some(inner) => Ok(SqfValue::String(inner)),
        None => parse_literal(trimmed),
    }
}

/// Decode SQF text and interpret the result as a pair-list map.
///
/// # Errors
///
/// Fails when the text does not decode, or when the decoded value is not a
/// valid pair list (see [`decode_as_map`]).
pub fn decode_map(text: &str) -> DecodeResult<SqfMap> {
    decode_as_map(&decode(text)?)
}

/// Interpret a decoded value as a list of `[key, value]` pairs.
///
/// Every element must be a two-element array with a string key. A value
/// that is a non-empty array whose first element is itself a two-element
/// array is treated as a nested pair list and converted recursively; every
/// other value is kept as-is. A value that is already a map is returned
/// unchanged.
///
/// # Errors
///
/// - [`DecodeError::NotAnArray`] if `value` is not an array.
/// - [`DecodeError::InvalidPair`] if an element is not a two-element array.
/// - [`DecodeError::InvalidKey`] if a key is not a string.
pub fn decode_as_map(value: &SqfValue) -> DecodeResult<SqfMap> {
    let entries = match value {
        SqfValue::Array(entries) => entries,
        SqfValue::Map(map) => return Ok(map.clone()),
        _ => return Err(DecodeError::NotAnArray),
    };

    let mut map = SqfMap::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let Some([key, value]) = entry.as_array() else {
            return Err(DecodeError::InvalidPair { index });
        };
        let Some(key) = key.as_str() else {
            return Err(DecodeError::InvalidKey { index });
        };

        let value = if looks_like_pair_list(value) {
            SqfValue::Map(decode_as_map(value)?)
        } else {
            value.clone()
        };
        map.insert(key.to_owned(), value);
    }
    Ok(map)
}

/// Remove one host quote layer, if present.
///
/// Returns `None` when `text` does not start with a double quote.
#[must_use]
pub fn unwrap_host_quotes(text: &str) -> Option<String> {
    let rest = text.strip_prefix('"')?;
    let rest = rest.strip_suffix('"').unwrap_or(rest);
    Some(rest.replace("\"\"", "\""))
}

fn looks_like_pair_list(value: &SqfValue) -> bool {
    value
        .as_array()
        .and_then(<[SqfValue]>::first)
        .is_some_and(SqfValue::is_pair)
}

fn parse_literal(text: &str) -> DecodeResult<SqfValue> {
    let mut parser = Parser::new(text);
    parser.skip_whitespace();
    let value = parser.parse_value(0)?;
    parser.skip_whitespace();
    if parser.peek().is_some() {
        return Err(DecodeError::TrailingInput {
            position: parser.pos,
        });
    }
    Ok(value)
}

/// Recursive-descent reader over a single literal.
///
/// `pos` is always on a char boundary of `input`.
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        self.input.get(self.pos..).unwrap_or_default()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos = self.pos.saturating_add(c.len_utf8());
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Consume characters while `accept` holds and return them.
    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&accept) {
            self.bump();
        }
        self.input.get(start..self.pos).unwrap_or_default()
    }

    fn parse_value(&mut self, depth: usize) -> DecodeResult<SqfValue> {
        let position = self.pos;
        match self.peek() {
            None => Err(DecodeError::UnexpectedEnd),
            Some('[') => self.parse_array(depth),
            Some(quote @ ('"' | '\'')) => self.parse_string(quote).map(SqfValue::String),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.parse_number(),
            Some(c) if c.is_alphabetic() => self.parse_word(),
            Some(',' | ']') => Err(DecodeError::EmptyElement { position }),
            Some(found) => Err(DecodeError::UnexpectedCharacter { found, position }),
        }
    }

    fn parse_array(&mut self, depth: usize) -> DecodeResult<SqfValue> {
        if depth >= MAX_DEPTH {
            return Err(DecodeError::TooDeep { max: MAX_DEPTH });
        }
        self.bump();
        self.skip_whitespace();

        let mut items = Vec::new();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(SqfValue::Array(items));
        }

        loop {
            self.skip_whitespace();
            items.push(self.parse_value(depth.saturating_add(1))?);
            self.skip_whitespace();
            let position = self.pos;
            match self.bump() {
                Some(',') => {},
                Some(']') => return Ok(SqfValue::Array(items)),
                Some(found) => return Err(DecodeError::UnexpectedCharacter { found, position }),
                None => return Err(DecodeError::UnexpectedEnd),
            }
        }
    }

    /// Read a quoted string; a doubled quote stands for one literal quote.
    fn parse_string(&mut self, quote: char) -> DecodeResult<String> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(DecodeError::UnexpectedEnd),
                Some(c) if c == quote => {
                    if self.peek() == Some(quote) {
                        self.bump();
                        out.push(quote);
                    } else {
                        return Ok(out);
                    }
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_number(&mut self) -> DecodeResult<SqfValue> {
        let position = self.pos;
        let literal =
            self.take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+'));
        parse_number_literal(literal)
            .map(SqfValue::Number)
            .ok_or_else(|| DecodeError::InvalidNumber {
                literal: literal.to_owned(),
                position,
            })
    }

    fn parse_word(&mut self) -> DecodeResult<SqfValue> {
        let position = self.pos;
        let word = self.take_while(|c| c.is_alphanumeric() || c == '_');
        if word.eq_ignore_ascii_case("true") {
            Ok(SqfValue::Bool(true))
        } else if word.eq_ignore_ascii_case("false") {
            Ok(SqfValue::Bool(false))
        } else {
            Err(DecodeError::UnsupportedLiteral {
                literal: word.to_owned(),
                position,
            })
        }
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal number.
fn parse_number_literal(literal: &str) -> Option<f64> {
    let (negative, unsigned) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal.strip_prefix('+').unwrap_or(literal)),
    };

    if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        let magnitude = u64::from_str_radix(hex, 16).ok()?;
        #[allow(clippy::cast_precision_loss)]
        let magnitude = magnitude as f64;
        return Some(if negative { -magnitude } else { magnitude });
    }

    // Rust's float grammar also accepts words like "inf"; the host does not.
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let magnitude: f64 = unsigned.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> SqfValue {
        SqfValue::from(text)
    }

    fn n(number: f64) -> SqfValue {
        SqfValue::Number(number)
    }

    #[test]
    fn decodes_host_wrapped_nested_arrays() {
        let value = decode(r#""[""data1"", ""data2"", [""data3"", ""data4""]]""#).unwrap();
        assert_eq!(
            value,
            SqfValue::Array(vec![
                s("data1"),
                s("data2"),
                SqfValue::Array(vec![s("data3"), s("data4")]),
            ])
        );
    }

    #[test]
    fn decodes_numbers_as_floats() {
        let value =
            decode(r#""[""data1"", ""data2"", [""data3"", 34, [""data5"",22]]]""#).unwrap();
        assert_eq!(
            value,
            SqfValue::Array(vec![
                s("data1"),
                s("data2"),
                SqfValue::Array(vec![
                    s("data3"),
                    n(34.0),
                    SqfValue::Array(vec![s("data5"), n(22.0)]),
                ]),
            ])
        );
    }

    #[test]
    fn decodes_unwrapped_literal() {
        let value = decode(r#"["a", 1.5, true, []]"#).unwrap();
        assert_eq!(
            value,
            SqfValue::Array(vec![s("a"), n(1.5), SqfValue::Bool(true), SqfValue::Array(vec![])])
        );
    }

    #[test]
    fn decodes_embedded_quotes() {
        let value = decode(r#"["He said ""Hi there!"""]"#).unwrap();
        assert_eq!(value, SqfValue::Array(vec![s(r#"He said "Hi there!""#)]));
    }

    #[test]
    fn decodes_single_quoted_strings() {
        let value = decode("['it''s', 'x']").unwrap();
        assert_eq!(value, SqfValue::Array(vec![s("it's"), s("x")]));
    }

    #[test]
    fn booleans_are_case_insensitive() {
        assert_eq!(decode("[TRUE, False]").unwrap(), SqfValue::from(vec![true, false]));
    }

    #[test]
    fn numbers_with_sign_exponent_and_hex() {
        assert_eq!(
            decode("[-2, +3.5, 1e3, .5, 0x1F, -0x10]").unwrap(),
            SqfValue::Array(vec![n(-2.0), n(3.5), n(1000.0), n(0.5), n(31.0), n(-16.0)])
        );
    }

    #[test]
    fn wrapped_plain_text_is_a_string() {
        assert_eq!(decode(r#""hello ""world""""#).unwrap(), s(r#"hello "world""#));
        assert_eq!(decode(r#""""#).unwrap(), s(""));
    }

    #[test]
    fn rejects_missing_element() {
        let err = decode(r#""[""data1"", ""data2"", [, ""data4""]]""#).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyElement { .. }));
    }

    #[test]
    fn rejects_trailing_comma() {
        assert!(matches!(decode("[1, 2,]").unwrap_err(), DecodeError::EmptyElement { .. }));
    }

    #[test]
    fn rejects_unterminated_input() {
        assert_eq!(decode("[1, 2").unwrap_err(), DecodeError::UnexpectedEnd);
        assert_eq!(decode(r#"["abc"#).unwrap_err(), DecodeError::UnexpectedEnd);
        assert_eq!(decode("").unwrap_err(), DecodeError::UnexpectedEnd);
    }

    #[test]
    fn rejects_trailing_input() {
        assert!(matches!(decode("[1] [2]").unwrap_err(), DecodeError::TrailingInput { .. }));
    }

    #[test]
    fn rejects_unknown_words_and_bad_numbers() {
        assert!(matches!(decode("[nil]").unwrap_err(), DecodeError::UnsupportedLiteral { .. }));
        assert!(matches!(decode("[1.2.3]").unwrap_err(), DecodeError::InvalidNumber { .. }));
        assert!(matches!(decode("[-inf]").unwrap_err(), DecodeError::InvalidNumber { .. }));
    }

    #[test]
    fn rejects_excessive_nesting() {
        let deep = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        assert_eq!(decode(&deep).unwrap_err(), DecodeError::TooDeep { max: MAX_DEPTH });
    }

    #[test]
    fn map_basic() {
        let map = decode_map(r#""[[""key1"", ""value1""], [""key2"", 2]]""#).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["key1"], s("value1"));
        assert_eq!(map["key2"], n(2.0));
    }

    #[test]
    fn map_nested() {
        let map = decode_map(
            r#""[[""key1"", ""value1""], [""key2"", [[""nested1"", ""nv1""], [""nested2"", 5]]]]""#,
        )
        .unwrap();
        let nested = map["key2"].as_map().unwrap();
        assert_eq!(nested["nested1"], s("nv1"));
        assert_eq!(nested["nested2"], n(5.0));
    }

    #[test]
    fn map_keeps_plain_arrays() {
        let map = decode_map(r#"[["list", [1, 2, 3]], ["empty", []]]"#).unwrap();
        assert_eq!(map["list"], SqfValue::from(vec![1, 2, 3]));
        assert_eq!(map["empty"], SqfValue::Array(vec![]));
    }

    #[test]
    fn map_rejects_wrong_pair_arity() {
        let err = decode_map(r#""[[""key1"", ""value1"", ""extra""]]""#).unwrap_err();
        assert_eq!(err, DecodeError::InvalidPair { index: 0 });
    }

    #[test]
    fn map_rejects_non_string_key() {
        let err = decode_map(r#"[["a", 1], [2, "b"]]"#).unwrap_err();
        assert_eq!(err, DecodeError::InvalidKey { index: 1 });
    }

    #[test]
    fn map_rejects_non_array() {
        assert_eq!(decode_as_map(&s("x")).unwrap_err(), DecodeError::NotAnArray);
        assert_eq!(decode_as_map(&n(1.0)).unwrap_err(), DecodeError::NotAnArray);
    }

    #[test]
    fn nested_map_errors_propagate() {
        let err = decode_map(r#"[["outer", [["a", 1], ["b"]]]]"#).unwrap_err();
        assert_eq!(err, DecodeError::InvalidPair { index: 1 });
    }

    #[test]
    fn unwrap_keeps_unterminated_tail() {
        assert_eq!(unwrap_host_quotes(r#""abc"#).as_deref(), Some("abc"));
        assert_eq!(unwrap_host_quotes("abc"), None);
    }
}
