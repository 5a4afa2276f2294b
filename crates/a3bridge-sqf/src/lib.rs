//! a3bridge SQF - the literal format shared with the Arma 3 host.
//!
//! This crate provides:
//! - [`SqfValue`], the value tree exchanged with scripts
//! - [`decode`] and [`decode_map`] for reading host text, including the
//!   extra quote layer the host adds when an array is stringified
//! - [`encode`] and [`encode_json`] for writing replies
//!
//! # Example
//!
//! ```rust
//! use a3bridge_sqf::{SqfValue, decode, encode};
//!
//! let value = decode(r#""[""a"", 1]""#).unwrap();
//! assert_eq!(value, SqfValue::Array(vec![SqfValue::from("a"), SqfValue::from(1)]));
//! assert_eq!(encode(&value), r#"["a", 1]"#);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod decode;
pub mod encode;
pub mod error;
pub mod json;
pub mod value;

pub use decode::{decode, decode_as_map, decode_map, unwrap_host_quotes};
pub use encode::{encode, escape_quotes, quote};
pub use error::{DecodeError, DecodeResult};
pub use json::encode_json;
pub use value::{SqfMap, SqfValue};
