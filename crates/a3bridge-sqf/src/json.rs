//! Conversion between [`SqfValue`] and [`serde_json::Value`].
//!
//! Handlers that build responses with serde can hand the result to
//! [`encode_json`] instead of assembling SQF text by hand.

use serde_json::{Map, Number, Value};

use crate::encode::{encode, quote};
use crate::value::SqfValue;

/// Encode a JSON value as SQF text.
///
/// Objects become pair lists in their own key order, arrays become SQF
/// arrays, and `null` is written as the quoted string `"null"`.
#[must_use]
pub fn encode_json(value: &Value) -> String {
    match value {
        Value::Object(object) => {
            let pairs: Vec<String> = object
                .iter()
                .map(|(key, value)| format!("[{}, {}]", quote(key), encode_json(value)))
                .collect();
            format!("[{}]", pairs.join(", "))
        },
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(encode_json).collect();
            format!("[{}]", items.join(", "))
        },
        other => encode(&SqfValue::from(other)),
    }
}

impl From<&Value> for SqfValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::String("null".to_owned()),
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => number
                .as_f64()
                .map_or_else(|| Self::String(number.to_string()), Self::Number),
            Value::String(text) => Self::String(text.clone()),
            Value::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            Value::Object(object) => Self::Map(
                object
                    .iter()
                    .map(|(key, value)| (key.clone(), Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for SqfValue {
    fn from(value: Value) -> Self {
        Self::from(&value)
    }
}

impl From<&SqfValue> for Value {
    fn from(value: &SqfValue) -> Self {
        match value {
            SqfValue::String(text) => Self::String(text.clone()),
            SqfValue::Bool(flag) => Self::Bool(*flag),
            SqfValue::Number(number) => number_to_json(*number),
            SqfValue::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            SqfValue::Map(map) => Self::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Self::from(value)))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

impl From<SqfValue> for Value {
    fn from(value: SqfValue) -> Self {
        Self::from(&value)
    }
}

/// Whole numbers within the exactly representable range become JSON
/// integers; everything else stays a float. Non-finite values become `null`.
fn number_to_json(number: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if number.fract() == 0.0 && number.abs() <= MAX_EXACT {
        #[allow(clippy::cast_possible_truncation)]
        return Value::Number(Number::from(number as i64));
    }
    Number::from_f64(number).map_or(Value::Null, Value::Number)
}
