//! Bencode encoding and decoding ([BEP-3]).
//!
//! Bencode is the serialization format of `.torrent` files. It has four data
//! types:
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! Dictionaries are held in a [`BTreeMap`](std::collections::BTreeMap) keyed
//! by raw bytes, so iteration order is already the canonical order required
//! on the wire. Encoding the same logical dictionary always yields the same
//! bytes no matter in which order its keys were inserted.
//!
//! # Examples
//!
//! ```
//! use twt_gen::bencode::{decode, encode, Value};
//! use bytes::Bytes;
//! use std::collections::BTreeMap;
//!
//! let mut dict = BTreeMap::new();
//! dict.insert(Bytes::from_static(b"spam"), Value::string("eggs"));
//! dict.insert(Bytes::from_static(b"cow"), Value::Integer(3));
//!
//! let encoded = encode(&Value::Dict(dict));
//! assert_eq!(encoded, b"d3:cowi3e4:spam4:eggse");
//!
//! let decoded = decode(&encoded).unwrap();
//! assert_eq!(decoded.get(b"cow").and_then(Value::as_integer), Some(3));
//! ```
//!
//! # Error Handling
//!
//! Encoding cannot fail. Decoding reports a [`BencodeError`] carrying the
//! byte offset at which the input stopped making sense:
//!
//! - [`BencodeError::UnexpectedEof`] - a string or container runs past the input
//! - [`BencodeError::InvalidInteger`] - malformed integer (leading zeros, `-0`, ...)
//! - [`BencodeError::InvalidStringLength`] - non-numeric string length prefix
//! - [`BencodeError::UnexpectedChar`] - a value starts with an unknown byte
//! - [`BencodeError::DuplicateKey`] / [`BencodeError::UnsortedKey`] - dictionary key problems
//! - [`BencodeError::NestingTooDeep`] - recursion limit exceeded (max 64 levels)
//! - [`BencodeError::TrailingData`] - extra data after the value
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod decode;
mod encode;
mod error;
mod value;

pub use decode::{decode, decode_strict, MAX_DEPTH};
pub use encode::{encode, encode_into};
pub use error::BencodeError;
pub use value::Value;
