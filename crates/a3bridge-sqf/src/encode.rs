//! Writing [`SqfValue`] trees as SQF literals.

use crate::value::SqfValue;

/// Separator between array elements.
const SEPARATOR: &str = ", ";

/// Double every `"` so the text can sit inside a double-quoted literal.
#[must_use]
pub fn escape_quotes(text: &str) -> String {
    text.replace('"', "\"\"")
}

/// Quote and escape `text` as an SQF string literal.
#[must_use]
pub fn quote(text: &str) -> String {
    format!("\"{}\"", escape_quotes(text))
}

/// Encode a value as SQF text.
///
/// Strings are double-quoted with embedded quotes doubled, numbers and
/// booleans are written bare, arrays become `[a, b]`, and maps become a
/// pair list `[["key", value], ...]` ordered by key. Non-finite numbers
/// have no SQF spelling and are written as quoted strings.
#[must_use]
pub fn encode(value: &SqfValue) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &SqfValue) {
    match value {
        SqfValue::String(text) => out.push_str(&quote(text)),
        SqfValue::Number(number) => out.push_str(&format_number(*number)),
        SqfValue::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
        SqfValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(SEPARATOR);
                }
                write_value(out, item);
            }
            out.push(']');
        },
        SqfValue::Map(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('[');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push_str(SEPARATOR);
                }
                out.push('[');
                out.push_str(&quote(key));
                out.push_str(SEPARATOR);
                if let Some(value) = map.get(key) {
                    write_value(out, value);
                }
                out.push(']');
            }
            out.push(']');
        },
    }
}

fn format_number(number: f64) -> String {
    if number.is_finite() {
        number.to_string()
    } else {
        quote(&number.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode;
    use crate::value::SqfMap;

    #[test]
    fn escapes_embedded_quotes() {
        assert_eq!(escape_quotes(r#"He said "Hi there!""#), r#"He said ""Hi there!"""#);
        assert_eq!(escape_quotes("plain"), "plain");
    }

    #[test]
    fn encodes_scalars() {
        assert_eq!(encode(&SqfValue::from("a\"b")), r#""a""b""#);
        assert_eq!(encode(&SqfValue::from(34)), "34");
        assert_eq!(encode(&SqfValue::Number(-1.25)), "-1.25");
        assert_eq!(encode(&SqfValue::from(false)), "false");
        assert_eq!(encode(&SqfValue::Number(f64::NAN)), r#""NaN""#);
    }

    #[test]
    fn encodes_nested_arrays() {
        let value = SqfValue::Array(vec![
            SqfValue::from("a"),
            SqfValue::Array(vec![SqfValue::from(1), SqfValue::from(true)]),
            SqfValue::Array(vec![]),
        ]);
        assert_eq!(encode(&value), r#"["a", [1, true], []]"#);
    }

    #[test]
    fn encodes_maps_as_pair_lists() {
        let mut inner = SqfMap::new();
        inner.insert("x".into(), SqfValue::from(1));
        let mut map = SqfMap::new();
        map.insert("name".into(), SqfValue::from("Bob \"B\""));
        map.insert("nested".into(), SqfValue::Map(inner));
        map.insert("alive".into(), SqfValue::from(true));

        let text = encode(&SqfValue::Map(map.clone()));
        assert_eq!(
            text,
            r#"[["alive", true], ["name", "Bob ""B"""], ["nested", [["x", 1]]]]"#
        );
        assert_eq!(decode::decode_map(&text).unwrap(), map);
    }

    #[test]
    fn decode_inverts_encode() {
        let value = SqfValue::Array(vec![
            SqfValue::from("quote \" inside"),
            SqfValue::Number(0.1),
            SqfValue::Number(-3e-7),
            SqfValue::from(true),
            SqfValue::Array(vec![SqfValue::from(""), SqfValue::Array(vec![])]),
        ]);
        assert_eq!(decode::decode(&encode(&value)).unwrap(), value);
    }

    #[test]
    fn decode_inverts_encode_for_scalars() {
        for value in [SqfValue::from("text"), SqfValue::from(12), SqfValue::from(false)] {
            assert_eq!(decode::decode(&encode(&value)).unwrap(), value);
        }
    }
}
